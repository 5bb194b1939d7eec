//! File-system primitives used by navigation and clipboard transfer
//!
//! All functions here are blocking; callers run them on worker tasks
//! (`spawn_blocking`) when they sit on an async path.

use crate::entry::is_hidden_name;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

/// Parent of `path`, or `None` at the filesystem root.
pub fn parent_directory(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

pub fn home_directory() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// Validates a directory before a batch of write operations against it.
///
/// This is the acquisition half of scoped access: it fails fast when the
/// destination is missing or not a directory, before any item of the
/// batch has been touched. Release is structural (nothing to hold).
pub fn ensure_writable_dir(dir: &Path) -> io::Result<()> {
    let metadata = fs::metadata(dir)?;
    if !metadata.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a directory: {}", dir.display()),
        ));
    }
    Ok(())
}

/// Creates `name` under `dir` and returns the new path.
pub fn create_folder(dir: &Path, name: &str) -> io::Result<PathBuf> {
    ensure_writable_dir(dir)?;
    let path = dir.join(name);
    fs::create_dir(&path)?;
    Ok(path)
}

/// Renames `path` to `new_name` within its parent directory.
pub fn rename_item(path: &Path, new_name: &str) -> io::Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "cannot rename the root")
    })?;
    let new_path = parent.join(new_name);
    fs::rename(path, &new_path)?;
    Ok(new_path)
}

/// Moves `source` to `destination`, falling back to copy-then-delete when
/// a plain rename fails (e.g. across mount points).
pub fn move_item(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_item(source, destination)?;
            remove_item(source)
        }
    }
}

/// Copies a file, or a directory tree recursively.
pub fn copy_item(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(source)?;
    if metadata.is_dir() {
        fs::create_dir(destination)?;
        for dirent in fs::read_dir(source)? {
            let dirent = dirent?;
            copy_item(&dirent.path(), &destination.join(dirent.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(source, destination).map(|_| ())
    }
}

fn remove_item(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Moves `path` to the system trash.
pub fn move_to_trash(path: &Path) -> io::Result<()> {
    trash::delete(path).map_err(|e| io::Error::other(format!("trash error: {}", e)))
}

/// Total byte size of all non-hidden files under `path`, recursively.
/// Unreadable subtrees contribute 0; this is best-effort data.
pub fn folder_size(path: &Path) -> u64 {
    let mut total = 0;
    let Ok(read) = fs::read_dir(path) else {
        return 0;
    };
    for dirent in read.flatten() {
        let name = dirent.file_name();
        if is_hidden_name(&name.to_string_lossy()) {
            continue;
        }
        let Ok(metadata) = dirent.metadata() else {
            continue;
        };
        if metadata.is_dir() {
            total += folder_size(&dirent.path());
        } else {
            total += metadata.len();
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parent_directory_stops_at_root() {
        assert_eq!(
            parent_directory(Path::new("/a/b")),
            Some(PathBuf::from("/a"))
        );
        assert_eq!(parent_directory(Path::new("/a")), Some(PathBuf::from("/")));
        assert_eq!(parent_directory(Path::new("/")), None);
    }

    #[test]
    fn test_create_folder() {
        let dir = TempDir::new().unwrap();
        let created = create_folder(dir.path(), "new folder").unwrap();
        assert!(created.is_dir());
        assert!(create_folder(dir.path(), "new folder").is_err());
    }

    #[test]
    fn test_ensure_writable_dir_rejects_files_and_missing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();

        assert!(ensure_writable_dir(dir.path()).is_ok());
        assert!(ensure_writable_dir(&file).is_err());
        assert!(ensure_writable_dir(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_rename_item() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("old.txt");
        fs::write(&old, b"contents").unwrap();

        let renamed = rename_item(&old, "new.txt").unwrap();
        assert_eq!(renamed, dir.path().join("new.txt"));
        assert!(!old.exists());
        assert_eq!(fs::read(&renamed).unwrap(), b"contents");
    }

    #[test]
    fn test_copy_item_recurses_into_directories() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("tree");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();
        fs::write(src.join("nested/b.txt"), b"b").unwrap();

        let dst = dir.path().join("tree-copy");
        copy_item(&src, &dst).unwrap();

        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"a");
        assert_eq!(fs::read(dst.join("nested/b.txt")).unwrap(), b"b");
        assert!(src.exists());
    }

    #[test]
    fn test_move_item() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.txt");
        fs::write(&src, b"payload").unwrap();
        let dst = dir.path().join("dst.txt");

        move_item(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn test_folder_size_sums_files_recursively() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.bin"), vec![0u8; 100]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.bin"), vec![0u8; 50]).unwrap();
        // hidden files are not counted
        fs::write(dir.path().join(".hidden"), vec![0u8; 999]).unwrap();

        assert_eq!(folder_size(dir.path()), 150);
    }

    #[test]
    fn test_folder_size_of_unreadable_path_is_zero() {
        assert_eq!(folder_size(Path::new("/nonexistent/nowhere")), 0);
    }
}
