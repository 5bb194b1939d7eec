//! Directory entries and directory listing

use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for an [`Entry`], stable for the process lifetime.
///
/// Re-enumeration produces new entries with new ids, so ids held across a
/// reload must not be assumed to survive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    fn next() -> Self {
        EntryId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// Immutable metadata record for one file-system object at a point in time.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: EntryId,
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
    /// Byte size; 0 for directories (recursive sizes live in a side table).
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub parent: Option<PathBuf>,
    pub is_symlink: bool,
}

impl Entry {
    /// Builds an entry from a path without following symlinks.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::symlink_metadata(path)?;
        let is_symlink = metadata.file_type().is_symlink();

        let kind = if is_symlink {
            EntryKind::Symlink
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        let size = match kind {
            EntryKind::File => metadata.len(),
            _ => 0,
        };

        let modified: DateTime<Utc> = metadata.modified()?.into();
        // Creation time is not available on every filesystem.
        let created: DateTime<Utc> = metadata
            .created()
            .map(Into::into)
            .unwrap_or(modified);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(Entry {
            id: EntryId::next(),
            path: path.to_path_buf(),
            name,
            kind,
            size,
            modified,
            created,
            parent: path.parent().map(Path::to_path_buf),
            is_symlink,
        })
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Returns true for names the explorer treats as hidden.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Enumerates the entries of `path`, applying hidden-file filtering.
///
/// Individual entries that cannot be read (permission errors, broken
/// metadata) are skipped; only failure to open the directory itself is an
/// error. No recursion, no sorting.
pub fn list_directory(path: &Path, show_hidden: bool) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for dirent in fs::read_dir(path)? {
        let dirent = match dirent {
            Ok(d) => d,
            Err(_) => continue,
        };

        let child = dirent.path();
        let name = match child.file_name().map(|n| n.to_string_lossy().into_owned()) {
            Some(name) => name,
            None => continue,
        };

        if !show_hidden && is_hidden_name(&name) {
            continue;
        }

        match Entry::from_path(&child) {
            Ok(entry) => entries.push(entry),
            Err(_) => continue,
        }
    }

    Ok(entries)
}
