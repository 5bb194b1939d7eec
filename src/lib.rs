//! Fex - a Finder-style file explorer core
//!
//! This crate provides the navigation, selection, change-notification and
//! clipboard-transfer machinery of a file explorer, independent of any
//! particular front end.

pub mod cli;
pub mod clipboard;
pub mod debounce;
pub mod entry;
pub mod error;
pub mod fs_ops;
pub mod history;
pub mod navigation;
pub mod search;
pub mod selection;
pub mod session;
pub mod settings;
pub mod sort;
pub mod watcher;

// Re-export primary types for convenience
pub use clipboard::{ClipboardAction, ClipboardCoordinator, ConflictResolution, PasteOutcome};
pub use entry::{Entry, EntryId, EntryKind};
pub use error::{ExplorerError, Result};
pub use navigation::{ControllerEvent, NavigationController, Snapshot};
pub use search::SearchEngine;
pub use selection::{GridDirection, LinearDirection, SelectionModel};
pub use session::Session;
pub use settings::Settings;
pub use sort::{SortDirection, SortField, SortSpec};
