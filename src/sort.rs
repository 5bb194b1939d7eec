//! Entry ordering

use crate::entry::{Entry, EntryKind};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Modified,
    Size,
    Kind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        SortSpec { field, direction }
    }

    pub fn toggle_direction(&mut self) {
        self.direction = match self.direction {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        };
    }
}

fn kind_rank(kind: EntryKind) -> u8 {
    match kind {
        EntryKind::Directory => 0,
        EntryKind::File => 1,
        EntryKind::Symlink => 2,
    }
}

fn name_key(entry: &Entry) -> String {
    entry.name.to_lowercase()
}

/// Effective size for sorting: files use their byte size, directories use
/// the background-computed recursive size when one has landed, else 0.
fn effective_size(entry: &Entry, folder_sizes: &HashMap<PathBuf, u64>) -> u64 {
    if entry.is_directory() {
        folder_sizes.get(&entry.path).copied().unwrap_or(0)
    } else {
        entry.size
    }
}

/// Sorts entries in place according to `spec`.
///
/// For the name field, directories order before non-directories as a
/// structural tie-break applied ahead of the comparison; other fields
/// compare entries uniformly. Case-insensitivity is Unicode lowercase
/// folding, not locale-aware collation. Descending order reverses the
/// ascending result wholesale.
pub fn sort_entries(entries: &mut [Entry], spec: SortSpec, folder_sizes: &HashMap<PathBuf, u64>) {
    match spec.field {
        SortField::Name => {
            entries.sort_by_cached_key(|e| (!e.is_directory(), name_key(e)));
        }
        SortField::Modified => {
            entries.sort_by_cached_key(|e| (e.modified, name_key(e)));
        }
        SortField::Size => {
            entries.sort_by_cached_key(|e| (effective_size(e, folder_sizes), name_key(e)));
        }
        SortField::Kind => {
            entries.sort_by_cached_key(|e| (kind_rank(e.kind), name_key(e)));
        }
    }

    if spec.direction == SortDirection::Descending {
        entries.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    fn entry(name: &str, kind: EntryKind, size: u64, modified_secs: i64) -> Entry {
        let path = Path::new("/t").join(name);
        Entry {
            id: crate::entry::test_support::fresh_id(),
            name: name.to_string(),
            kind,
            size,
            modified: Utc.timestamp_opt(modified_secs, 0).unwrap(),
            created: Utc.timestamp_opt(modified_secs, 0).unwrap(),
            parent: path.parent().map(Path::to_path_buf),
            is_symlink: kind == EntryKind::Symlink,
            path,
        }
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_name_sort_puts_directories_first() {
        let mut entries = vec![
            entry("beta.txt", EntryKind::File, 1, 0),
            entry("Zeta", EntryKind::Directory, 0, 0),
            entry("alpha.txt", EntryKind::File, 1, 0),
            entry("Arch", EntryKind::Directory, 0, 0),
        ];
        sort_entries(&mut entries, SortSpec::default(), &HashMap::new());
        assert_eq!(names(&entries), vec!["Arch", "Zeta", "alpha.txt", "beta.txt"]);
    }

    #[test]
    fn test_name_sort_is_case_insensitive() {
        let mut entries = vec![
            entry("banana.txt", EntryKind::File, 1, 0),
            entry("Apple.txt", EntryKind::File, 1, 0),
            entry("cherry.txt", EntryKind::File, 1, 0),
        ];
        sort_entries(&mut entries, SortSpec::default(), &HashMap::new());
        assert_eq!(
            names(&entries),
            vec!["Apple.txt", "banana.txt", "cherry.txt"]
        );
    }

    #[test]
    fn test_size_sort_uses_computed_folder_sizes() {
        let mut entries = vec![
            entry("big_dir", EntryKind::Directory, 0, 0),
            entry("small.txt", EntryKind::File, 10, 0),
            entry("unknown_dir", EntryKind::Directory, 0, 0),
        ];
        let mut sizes = HashMap::new();
        sizes.insert(Path::new("/t").join("big_dir"), 1000u64);

        let spec = SortSpec::new(SortField::Size, SortDirection::Ascending);
        sort_entries(&mut entries, spec, &sizes);
        // unknown_dir has no computed size yet and counts as 0
        assert_eq!(names(&entries), vec!["unknown_dir", "small.txt", "big_dir"]);
    }

    #[test]
    fn test_descending_reverses() {
        let mut entries = vec![
            entry("a.txt", EntryKind::File, 1, 0),
            entry("b.txt", EntryKind::File, 1, 0),
        ];
        let spec = SortSpec::new(SortField::Name, SortDirection::Descending);
        sort_entries(&mut entries, spec, &HashMap::new());
        assert_eq!(names(&entries), vec!["b.txt", "a.txt"]);
    }

    #[test]
    fn test_modified_sort_orders_oldest_first() {
        let mut entries = vec![
            entry("new.txt", EntryKind::File, 1, 300),
            entry("old.txt", EntryKind::File, 1, 100),
            entry("mid.txt", EntryKind::File, 1, 200),
        ];
        let spec = SortSpec::new(SortField::Modified, SortDirection::Ascending);
        sort_entries(&mut entries, spec, &HashMap::new());
        assert_eq!(names(&entries), vec!["old.txt", "mid.txt", "new.txt"]);
    }

    #[test]
    fn test_kind_sort_groups_by_kind() {
        let mut entries = vec![
            entry("link", EntryKind::Symlink, 0, 0),
            entry("file.txt", EntryKind::File, 1, 0),
            entry("dir", EntryKind::Directory, 0, 0),
        ];
        let spec = SortSpec::new(SortField::Kind, SortDirection::Ascending);
        sort_entries(&mut entries, spec, &HashMap::new());
        assert_eq!(names(&entries), vec!["dir", "file.txt", "link"]);
    }
}
