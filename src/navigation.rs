//! Navigation controller: current location, history, listing, selection

use crate::entry::{self, Entry, EntryId};
use crate::error::{ExplorerError, Result};
use crate::fs_ops;
use crate::history::NavigationHistory;
use crate::selection::{GridDirection, LinearDirection, SelectionModel};
use crate::settings::Settings;
use crate::sort::{sort_entries, SortDirection, SortField, SortSpec};
use crate::watcher::ChangeWatcher;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, watch};

/// Immutable view of the controller's published state. A new snapshot is
/// emitted on the watch channel after every mutation; consumers never
/// observe intermediate states.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub current_path: PathBuf,
    pub entries: Vec<Entry>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub selected: HashSet<EntryId>,
    /// Best-effort recursive sizes for directories, keyed by path.
    pub folder_sizes: HashMap<PathBuf, u64>,
}

/// What a call to [`NavigationController::run_once`] applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A listing for the current path was applied.
    Reloaded,
    /// Listing the current path failed; content was cleared.
    ReloadFailed,
    /// A background folder-size computation landed.
    SizesUpdated,
    /// The change watcher reported a burst; a refresh was issued.
    ChangeDetected,
    /// A reload finished for a path that is no longer current.
    StaleDiscarded,
}

enum Internal {
    Loaded {
        target: PathBuf,
        result: io::Result<Vec<Entry>>,
    },
    FolderSize {
        path: PathBuf,
        bytes: u64,
    },
}

/// Owns the mutable session state of one explorer window: current path,
/// back/forward history, the live entry listing, its selection, and the
/// directory change watcher.
///
/// All mutation happens on the task that owns the controller. Blocking
/// I/O (listing, folder sizes) runs on worker tasks whose results come
/// back as internal events; [`run_once`](Self::run_once) applies one
/// event at a time. In-flight reloads are tagged with their target path,
/// and results whose target no longer matches the current path are
/// discarded, so a slow earlier reload can never overwrite a later
/// navigation.
pub struct NavigationController {
    current_path: PathBuf,
    history: NavigationHistory,
    entries: Vec<Entry>,
    selection: SelectionModel,
    folder_sizes: HashMap<PathBuf, u64>,
    sort: SortSpec,
    is_loading: bool,
    error: Option<String>,
    settings: Settings,
    watcher: ChangeWatcher,
    watch_rx: mpsc::UnboundedReceiver<()>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl NavigationController {
    /// Starts at the settings' last opened folder when it still exists,
    /// otherwise at the home directory. Does not load anything yet; call
    /// [`initial_load`](Self::initial_load).
    pub fn new(settings: Settings) -> Self {
        let start = settings
            .last_opened_folder
            .clone()
            .filter(|p| p.is_dir())
            .unwrap_or_else(fs_ops::home_directory);
        Self::with_start_path(start, settings)
    }

    pub fn with_start_path(start: PathBuf, settings: Settings) -> Self {
        let (watch_tx, watch_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        let mut controller = NavigationController {
            history: NavigationHistory::new(start.clone()),
            current_path: start,
            entries: Vec::new(),
            selection: SelectionModel::new(),
            folder_sizes: HashMap::new(),
            sort: SortSpec::default(),
            is_loading: false,
            error: None,
            settings,
            watcher: ChangeWatcher::new(watch_tx),
            watch_rx,
            internal_tx,
            internal_rx,
            snapshot_tx: watch::channel(Snapshot {
                current_path: PathBuf::new(),
                entries: Vec::new(),
                is_loading: false,
                error: None,
                can_go_back: false,
                can_go_forward: false,
                selected: HashSet::new(),
                folder_sizes: HashMap::new(),
            })
            .0,
        };
        controller.publish();
        controller
    }

    /// Loads the starting location and begins watching it.
    pub fn initial_load(&mut self) {
        self.begin_load();
    }

    // ── Observable state ───────────────────────────────────────────

    /// Snapshot stream; a new value is published after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn folder_sizes(&self) -> &HashMap<PathBuf, u64> {
        &self.folder_sizes
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// Ordered ids of the current listing, for selection movement.
    pub fn entry_order(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Paths of the selected entries, in listing order.
    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|e| self.selection.contains(e.id))
            .map(|e| e.path.clone())
            .collect()
    }

    // ── Navigation ─────────────────────────────────────────────────

    /// Navigates to `path`, truncating forward history. Fails fast
    /// without touching any state when the path does not exist.
    pub fn navigate(&mut self, path: &Path) -> Result<()> {
        if !fs_ops::path_exists(path) {
            self.error = Some(format!("Path does not exist: {}", path.display()));
            self.publish();
            return Err(ExplorerError::PathNotFound(path.to_path_buf()));
        }

        tracing::debug!(path = %path.display(), "navigate");
        self.history.push(path.to_path_buf());
        self.current_path = path.to_path_buf();
        self.selection.clear();
        self.begin_load();
        Ok(())
    }

    /// No-op at the filesystem root.
    pub fn navigate_to_parent(&mut self) -> Result<()> {
        match fs_ops::parent_directory(&self.current_path) {
            Some(parent) => self.navigate(&parent),
            None => Ok(()),
        }
    }

    /// Moves back in history; pure index movement. Returns false when
    /// there is nowhere to go.
    pub fn back(&mut self) -> bool {
        let Some(path) = self.history.back().map(Path::to_path_buf) else {
            return false;
        };
        tracing::debug!(path = %path.display(), "back");
        self.current_path = path;
        self.selection.clear();
        self.begin_load();
        true
    }

    /// Moves forward in history; pure index movement.
    pub fn forward(&mut self) -> bool {
        let Some(path) = self.history.forward().map(Path::to_path_buf) else {
            return false;
        };
        tracing::debug!(path = %path.display(), "forward");
        self.current_path = path;
        self.selection.clear();
        self.begin_load();
        true
    }

    /// Re-runs the load for the current path. History and selection are
    /// untouched beyond dropping ids that vanish from the new listing.
    pub fn refresh(&mut self) {
        self.trigger_reload();
    }

    // ── Event pump ─────────────────────────────────────────────────

    /// Waits for the next worker result or watcher signal and applies it.
    pub async fn run_once(&mut self) -> ControllerEvent {
        tokio::select! {
            Some(internal) = self.internal_rx.recv() => self.apply(internal),
            Some(()) = self.watch_rx.recv() => {
                tracing::debug!(path = %self.current_path.display(), "change burst, refreshing");
                self.refresh();
                ControllerEvent::ChangeDetected
            }
        }
    }

    /// Pumps events until no reload is outstanding.
    pub async fn wait_until_idle(&mut self) {
        while self.is_loading {
            self.run_once().await;
        }
    }

    // ── Sorting ────────────────────────────────────────────────────

    pub fn set_sort_field(&mut self, field: SortField) {
        self.sort.field = field;
        self.resort();
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.sort.direction = direction;
        self.resort();
    }

    pub fn toggle_sort_direction(&mut self) {
        self.sort.toggle_direction();
        self.resort();
    }

    fn resort(&mut self) {
        sort_entries(&mut self.entries, self.sort, &self.folder_sizes);
        self.publish();
    }

    // ── Selection commands ─────────────────────────────────────────

    pub fn toggle_selection(&mut self, id: EntryId) {
        self.selection.toggle(id);
        self.publish();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.publish();
    }

    pub fn select_all(&mut self) {
        let ids = self.entry_order();
        self.selection.select_all(ids);
        self.publish();
    }

    pub fn select_range(&mut self, from: EntryId, to: EntryId) {
        let order = self.entry_order();
        self.selection.range(from, to, &order);
        self.publish();
    }

    pub fn move_selection(&mut self, direction: LinearDirection) {
        let order = self.entry_order();
        self.selection.move_linear(direction, &order);
        self.publish();
    }

    pub fn move_selection_grid(&mut self, direction: GridDirection, columns: usize) {
        let order = self.entry_order();
        self.selection.move_grid(direction, columns, &order);
        self.publish();
    }

    // ── Settings ───────────────────────────────────────────────────

    pub fn show_hidden(&self) -> bool {
        self.settings.show_hidden_files
    }

    pub fn set_show_hidden(&mut self, show: bool) {
        self.settings.show_hidden_files = show;
        self.persist_settings();
        self.refresh();
    }

    // ── File operations ────────────────────────────────────────────

    /// Creates a folder in the current directory, then refreshes.
    pub fn create_folder(&mut self, name: &str) -> Result<PathBuf> {
        match fs_ops::create_folder(&self.current_path, name) {
            Ok(path) => {
                self.refresh();
                Ok(path)
            }
            Err(err) => {
                self.error = Some(format!("Failed to create folder: {}", err));
                self.publish();
                Err(ExplorerError::item_failed(&self.current_path.join(name), err))
            }
        }
    }

    /// Renames the entry with `id`, then refreshes.
    pub fn rename_entry(&mut self, id: EntryId, new_name: &str) -> Result<PathBuf> {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return Err(ExplorerError::PathNotFound(self.current_path.clone()));
        };
        let path = entry.path.clone();
        match fs_ops::rename_item(&path, new_name) {
            Ok(new_path) => {
                self.refresh();
                Ok(new_path)
            }
            Err(err) => {
                self.error = Some(format!("Failed to rename item: {}", err));
                self.publish();
                Err(ExplorerError::item_failed(&path, err))
            }
        }
    }

    /// Moves every selected entry to the trash. Per-item failures never
    /// abort the batch; they are returned aggregated, in listing order.
    pub fn delete_selected(&mut self) -> Vec<(PathBuf, String)> {
        let targets = self.selected_paths();
        let mut failures = Vec::new();
        for path in targets {
            if let Err(err) = fs_ops::move_to_trash(&path) {
                failures.push((path, err.to_string()));
            }
        }
        if !failures.is_empty() {
            self.error = Some(format!("Failed to delete {} item(s)", failures.len()));
        }
        self.selection.clear();
        self.refresh();
        failures
    }

    /// Opens a directory by navigating into it; anything else is handed
    /// to the OS default application.
    pub fn open_entry(&mut self, id: EntryId) -> Result<()> {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return Ok(());
        };
        if entry.is_directory() {
            let path = entry.path.clone();
            self.navigate(&path)
        } else {
            open::that(&entry.path).map_err(|e| ExplorerError::item_failed(&entry.path, e))
        }
    }

    // ── Internals ──────────────────────────────────────────────────

    /// (Re)starts the watcher on the current path and kicks off a reload.
    fn begin_load(&mut self) {
        self.watcher.start(&self.current_path);
        self.trigger_reload();
    }

    fn trigger_reload(&mut self) {
        self.is_loading = true;
        self.error = None;
        self.publish();

        let target = self.current_path.clone();
        let show_hidden = self.settings.show_hidden_files;
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let listing_path = target.clone();
            let result = tokio::task::spawn_blocking(move || {
                entry::list_directory(&listing_path, show_hidden)
            })
            .await
            .unwrap_or_else(|join_err| Err(io::Error::other(join_err.to_string())));
            let _ = tx.send(Internal::Loaded { target, result });
        });
    }

    fn apply(&mut self, internal: Internal) -> ControllerEvent {
        match internal {
            Internal::Loaded { target, result } => self.apply_loaded(target, result),
            Internal::FolderSize { path, bytes } => {
                // merged into the side table only; the listing is not
                // re-sorted as sizes trickle in
                self.folder_sizes.insert(path, bytes);
                self.publish();
                ControllerEvent::SizesUpdated
            }
        }
    }

    fn apply_loaded(
        &mut self,
        target: PathBuf,
        result: io::Result<Vec<Entry>>,
    ) -> ControllerEvent {
        if target != self.current_path {
            tracing::debug!(
                target = %target.display(),
                current = %self.current_path.display(),
                "discarding stale reload"
            );
            return ControllerEvent::StaleDiscarded;
        }

        match result {
            Ok(mut entries) => {
                sort_entries(&mut entries, self.sort, &self.folder_sizes);
                self.entries = entries;
                self.is_loading = false;
                self.error = None;

                let present: HashSet<EntryId> = self.entries.iter().map(|e| e.id).collect();
                self.selection.retain_present(&present);
                if self.selection.is_empty() {
                    if let Some(first) = self.entries.first() {
                        self.selection.select_only(first.id);
                    }
                }

                self.settings.last_opened_folder = Some(self.current_path.clone());
                self.persist_settings();
                self.spawn_size_computations();
                self.publish();
                ControllerEvent::Reloaded
            }
            Err(err) => {
                let error = ExplorerError::ListingFailed {
                    path: target,
                    source: err,
                };
                tracing::warn!(%error, "listing failed");
                self.error = Some(error.to_string());
                self.entries.clear();
                self.selection.clear();
                self.is_loading = false;
                self.watcher.stop();
                self.publish();
                ControllerEvent::ReloadFailed
            }
        }
    }

    /// One independent worker per sub-directory whose size is unknown;
    /// each completion writes only its own keyed slot.
    fn spawn_size_computations(&self) {
        for entry in self.entries.iter().filter(|e| e.is_directory()) {
            if self.folder_sizes.contains_key(&entry.path) {
                continue;
            }
            let path = entry.path.clone();
            let tx = self.internal_tx.clone();
            tokio::spawn(async move {
                let walk_path = path.clone();
                let bytes = tokio::task::spawn_blocking(move || fs_ops::folder_size(&walk_path))
                    .await
                    .unwrap_or(0);
                let _ = tx.send(Internal::FolderSize { path, bytes });
            });
        }
    }

    fn persist_settings(&self) {
        if let Err(err) = self.settings.save() {
            tracing::warn!(%err, "failed to persist settings");
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(Snapshot {
            current_path: self.current_path.clone(),
            entries: self.entries.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            can_go_back: self.history.can_go_back(),
            can_go_forward: self.history.can_go_forward(),
            selected: self.selection.ids().clone(),
            folder_sizes: self.folder_sizes.clone(),
        });
    }
}
