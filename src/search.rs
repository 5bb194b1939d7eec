//! Debounced, cancellable recursive name search

use crate::entry::{self, Entry, EntryId};
use crate::selection::SelectionModel;
use crate::sort::{sort_entries, SortSpec};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const SEARCH_DEBOUNCE: Duration = Duration::from_millis(150);

struct SearchOutcome {
    generation: u64,
    entries: Vec<Entry>,
}

/// Runs depth-bounded recursive name searches independently of the main
/// listing. Each new query cancels the previous one and re-arms a 150 ms
/// debounce; completed results are sorted like regular listings.
///
/// Search results own their own selection state, separate from the main
/// listing's.
pub struct SearchEngine {
    query: String,
    results: Vec<Entry>,
    is_searching: bool,
    selection: SelectionModel,
    sort: SortSpec,
    debounce: Duration,
    generation: u64,
    cancel: Option<Arc<AtomicBool>>,
    tx: mpsc::UnboundedSender<SearchOutcome>,
    rx: mpsc::UnboundedReceiver<SearchOutcome>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::with_debounce(SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        SearchEngine {
            query: String::new(),
            results: Vec::new(),
            is_searching: false,
            selection: SelectionModel::new(),
            sort: SortSpec::default(),
            debounce,
            generation: 0,
            cancel: None,
            tx,
            rx,
        }
    }

    pub fn results(&self) -> &[Entry] {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionModel {
        &mut self.selection
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        sort_entries(&mut self.results, self.sort, &HashMap::new());
    }

    /// Ordered ids of the current results, for selection movement.
    pub fn result_order(&self) -> Vec<EntryId> {
        self.results.iter().map(|e| e.id).collect()
    }

    /// Starts a search for `query` rooted at `root`. An empty query
    /// clears results synchronously. Must be called within a tokio
    /// runtime.
    pub fn search(&mut self, query: &str, root: &Path, max_depth: usize) {
        self.cancel_in_flight();
        self.query = query.to_string();

        if query.is_empty() {
            self.results.clear();
            self.selection.clear();
            self.is_searching = false;
            return;
        }

        self.generation += 1;
        self.is_searching = true;

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(Arc::clone(&cancel));

        let generation = self.generation;
        let needle = query.to_lowercase();
        let root = root.to_path_buf();
        let debounce = self.debounce;
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if cancel.load(Ordering::Relaxed) {
                return;
            }

            let traversal_cancel = Arc::clone(&cancel);
            let entries = tokio::task::spawn_blocking(move || {
                let mut found = Vec::new();
                search_recursive(&root, &needle, 0, max_depth, &traversal_cancel, &mut found);
                found
            })
            .await
            .unwrap_or_default();

            if cancel.load(Ordering::Relaxed) {
                return;
            }
            let _ = tx.send(SearchOutcome {
                generation,
                entries,
            });
        });
    }

    /// Clears the query, results and any in-flight traversal.
    pub fn clear(&mut self) {
        self.cancel_in_flight();
        self.query.clear();
        self.results.clear();
        self.selection.clear();
        self.is_searching = false;
    }

    /// Waits for the next completed traversal and applies it if it is
    /// still current. Returns true when results were updated.
    pub async fn next_results(&mut self) -> bool {
        let Some(outcome) = self.rx.recv().await else {
            return false;
        };
        self.apply(outcome)
    }

    /// Convenience driver: pumps completions until the active search
    /// finishes.
    pub async fn wait_until_done(&mut self) {
        while self.is_searching {
            if !self.next_results().await {
                continue;
            }
        }
    }

    fn apply(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                generation = outcome.generation,
                "discarding results of a superseded search"
            );
            return false;
        }

        let mut entries = outcome.entries;
        sort_entries(&mut entries, self.sort, &HashMap::new());

        let present: HashSet<EntryId> = entries.iter().map(|e| e.id).collect();
        self.selection.retain_present(&present);

        self.results = entries;
        self.is_searching = false;
        true
    }

    fn cancel_in_flight(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first traversal from `dir` (depth 0 at the search root).
///
/// Cancellation is advisory: the flag is checked at the start of each
/// directory visit and before each entry, so a cancelled search stops
/// promptly without finishing the current directory. Directories that
/// fail to list are skipped silently.
fn search_recursive(
    dir: &Path,
    needle: &str,
    depth: usize,
    max_depth: usize,
    cancel: &AtomicBool,
    out: &mut Vec<Entry>,
) {
    if cancel.load(Ordering::Relaxed) {
        return;
    }
    let Ok(entries) = entry::list_directory(dir, false) else {
        return;
    };
    for item in entries {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        let is_dir = item.is_directory();
        let child: Option<PathBuf> = is_dir.then(|| item.path.clone());

        if item.name.to_lowercase().contains(needle) {
            out.push(item);
        }
        if let Some(child) = child {
            if depth + 1 <= max_depth {
                search_recursive(&child, needle, depth + 1, max_depth, cancel, out);
            }
        }
    }
}
