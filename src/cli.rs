// CLI module for argument parsing

use crate::sort::{SortDirection, SortField, SortSpec};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Fex - a Finder-style file explorer core for the terminal
///
/// Lists a directory the way a file manager would: folders first,
/// background folder sizes, live reload on disk changes, and a
/// depth-bounded name search.
#[derive(Parser, Debug, Clone)]
#[command(name = "fex")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to open
    ///
    /// If not specified, defaults to the current directory.
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Show hidden files (files starting with .)
    #[arg(long = "hidden", action = ArgAction::SetTrue)]
    pub show_hidden: bool,

    /// Sort entries by specified criteria
    #[arg(short = 's', long = "sort", value_enum, default_value = "name")]
    pub sort_by: SortOrder,

    /// Reverse sort order
    #[arg(short = 'r', long = "reverse", action = ArgAction::SetTrue)]
    pub reverse: bool,

    /// Keep running and re-print the listing when the directory changes
    #[arg(short = 'w', long = "watch", action = ArgAction::SetTrue)]
    pub watch: bool,

    /// Search for entries whose name contains the given text, instead of
    /// listing the directory
    #[arg(short = 'q', long = "search")]
    pub search: Option<String>,

    /// How many directory levels below the root a search may descend
    #[arg(long = "depth", default_value_t = 2)]
    pub depth: usize,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SortOrder {
    /// Sort by name (folders first, case-insensitive)
    #[default]
    Name,
    /// Sort by modification date
    Date,
    /// Sort by size (folders use their computed size)
    Size,
    /// Sort by kind
    Kind,
}

impl From<SortOrder> for SortField {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Name => SortField::Name,
            SortOrder::Date => SortField::Modified,
            SortOrder::Size => SortField::Size,
            SortOrder::Kind => SortField::Kind,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            field: self.sort_by.into(),
            direction: if self.reverse {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.directory.exists() {
            return Err(format!(
                "Directory does not exist: {}",
                self.directory.display()
            ));
        }

        if !self.directory.is_dir() {
            return Err(format!(
                "Path is not a directory: {}",
                self.directory.display()
            ));
        }

        if self.watch && self.search.is_some() {
            return Err("--watch cannot be combined with --search".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(directory: &str) -> Args {
        Args {
            directory: PathBuf::from(directory),
            show_hidden: false,
            sort_by: SortOrder::Name,
            reverse: false,
            watch: false,
            search: None,
            depth: 2,
        }
    }

    #[test]
    fn test_sort_order_conversion() {
        assert_eq!(SortField::from(SortOrder::Name), SortField::Name);
        assert_eq!(SortField::from(SortOrder::Date), SortField::Modified);
        assert_eq!(SortField::from(SortOrder::Size), SortField::Size);
        assert_eq!(SortField::from(SortOrder::Kind), SortField::Kind);
    }

    #[test]
    fn test_sort_spec_respects_reverse() {
        let mut args = args_for(".");
        assert_eq!(args.sort_spec().direction, SortDirection::Ascending);
        args.reverse = true;
        assert_eq!(args.sort_spec().direction, SortDirection::Descending);
    }

    #[test]
    fn test_validate_nonexistent_directory() {
        let args = args_for("/nonexistent/path/12345");
        let result = args.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("does not exist"));
    }

    #[test]
    fn test_validate_rejects_file_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, b"x").unwrap();

        let args = args_for(file.to_str().unwrap());
        let result = args.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("not a directory"));
    }

    #[test]
    fn test_validate_watch_and_search_are_exclusive() {
        let mut args = args_for(".");
        args.watch = true;
        args.search = Some("report".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_success() {
        assert!(args_for(".").validate().is_ok());
    }
}
