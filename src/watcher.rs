//! Debounced directory change watching

use crate::debounce::Coalescer;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Watches a single directory for OS-level mutation events and emits one
/// `()` on the changed channel per burst of activity, after 200 ms of
/// quiescence.
///
/// States: idle -> watching -> (pending while a burst is open) -> watching,
/// back to idle on [`stop`](Self::stop) or when the watched path stops
/// being a directory.
pub struct ChangeWatcher {
    changed_tx: mpsc::UnboundedSender<()>,
    active: Option<ActiveWatch>,
}

struct ActiveWatch {
    // Dropping the notify watcher closes the OS watch handle and, via the
    // callback closure, the raw event channel.
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
    path: PathBuf,
}

impl ChangeWatcher {
    /// `changed_tx` receives exactly one message per debounced change burst.
    pub fn new(changed_tx: mpsc::UnboundedSender<()>) -> Self {
        ChangeWatcher {
            changed_tx,
            active: None,
        }
    }

    /// Starts watching `path`, replacing any prior watch. Remains idle if
    /// `path` is not a directory or the OS handle cannot be acquired.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&mut self, path: &Path) {
        self.stop();

        if !path.is_dir() {
            tracing::debug!(path = %path.display(), "not a directory, watcher stays idle");
            return;
        }

        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let callback = move |result: Result<Event, notify::Error>| {
            if let Ok(event) = result {
                if is_mutation(&event.kind) {
                    let _ = raw_tx.send(());
                }
            }
        };

        let mut watcher = match notify::recommended_watcher(callback) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to create watcher");
                return;
            }
        };
        if let Err(err) = watcher.watch(path, RecursiveMode::NonRecursive) {
            tracing::warn!(path = %path.display(), %err, "failed to open watch handle");
            return;
        }

        let changed_tx = self.changed_tx.clone();
        let watched = path.to_path_buf();
        let task = tokio::spawn(async move {
            let mut coalescer = Coalescer::new(raw_rx, DEBOUNCE_WINDOW);
            while coalescer.next_burst().await.is_some() {
                // The directory may have been deleted or replaced since
                // the burst started; in that case emit nothing and end.
                if !watched.is_dir() {
                    tracing::debug!(path = %watched.display(), "watched path gone, ending watch");
                    break;
                }
                if changed_tx.send(()).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(path = %path.display(), "watching for changes");
        self.active = Some(ActiveWatch {
            _watcher: watcher,
            task,
            path: path.to_path_buf(),
        });
    }

    /// Stops watching and cancels any pending debounce. Idempotent.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(path = %active.path.display(), "stopping watcher");
            active.task.abort();
        }
    }

    /// A watch whose debounce task has ended (watched directory deleted)
    /// no longer counts as watching, even before the next start/stop.
    pub fn is_watching(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.task.is_finished())
    }

    pub fn watched_path(&self) -> Option<&Path> {
        self.active
            .as_ref()
            .filter(|a| !a.task.is_finished())
            .map(|a| a.path.as_path())
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn is_mutation(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
