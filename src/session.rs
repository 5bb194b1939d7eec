//! Window session: wires navigation, search and the shared clipboard

use crate::clipboard::{ClipboardCoordinator, ConflictResolution, PasteOutcome};
use crate::error::Result;
use crate::navigation::NavigationController;
use crate::search::SearchEngine;
use crate::settings::Settings;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// One explorer window's worth of state, plus the clipboard coordinator
/// shared across every window of the process.
///
/// Each window owns its own controller and search engine; only the
/// clipboard is process-wide, which is what makes copy-in-one-window,
/// paste-in-another work. No global state: spawning a second window is
/// [`new_window`](Self::new_window), not a singleton lookup.
pub struct Session {
    pub explorer: NavigationController,
    pub search: SearchEngine,
    clipboard: Arc<Mutex<ClipboardCoordinator>>,
}

impl Session {
    /// Falls back to a detached clipboard when the OS clipboard is
    /// unavailable (headless environments).
    pub fn new(settings: Settings) -> Self {
        let coordinator = ClipboardCoordinator::new().unwrap_or_else(|err| {
            tracing::warn!(%err, "system clipboard unavailable, running detached");
            ClipboardCoordinator::detached()
        });
        Self::with_clipboard(settings, Arc::new(Mutex::new(coordinator)))
    }

    /// Like [`new`](Self::new), but starting at `start` instead of the
    /// settings' last opened folder.
    pub fn new_at(start: PathBuf, settings: Settings) -> Self {
        let mut session = Self::new(Settings::in_memory());
        session.explorer = NavigationController::with_start_path(start, settings);
        session
    }

    /// A second window sharing this session's clipboard.
    pub fn new_window(&self, settings: Settings) -> Self {
        Self::with_clipboard(settings, Arc::clone(&self.clipboard))
    }

    pub fn with_clipboard(
        settings: Settings,
        clipboard: Arc<Mutex<ClipboardCoordinator>>,
    ) -> Self {
        Session {
            explorer: NavigationController::new(settings),
            search: SearchEngine::new(),
            clipboard,
        }
    }

    pub fn clipboard(&self) -> Arc<Mutex<ClipboardCoordinator>> {
        Arc::clone(&self.clipboard)
    }

    /// Captures the selected paths, in listing order, as a pending copy.
    pub fn copy_selection(&self) {
        let paths = self.explorer.selected_paths();
        if paths.is_empty() {
            return;
        }
        self.lock_clipboard().copy(paths);
    }

    /// Captures the selected paths, in listing order, as a pending move.
    pub fn cut_selection(&self) {
        let paths = self.explorer.selected_paths();
        if paths.is_empty() {
            return;
        }
        self.lock_clipboard().cut(paths);
    }

    /// Pastes the clipboard into the current directory, then refreshes.
    /// Conflicting items are reported back unresolved.
    pub async fn paste(&mut self) -> Result<PasteOutcome> {
        let destination = self.explorer.current_path().to_path_buf();
        let outcome = self.run_paste(destination, None).await?;
        self.explorer.refresh();
        Ok(outcome)
    }

    /// Pastes applying `resolution` to every conflict, then refreshes.
    pub async fn paste_resolving(
        &mut self,
        resolution: ConflictResolution,
    ) -> Result<PasteOutcome> {
        let destination = self.explorer.current_path().to_path_buf();
        let outcome = self.run_paste(destination, Some(resolution)).await?;
        self.explorer.refresh();
        Ok(outcome)
    }

    /// The transfer itself is blocking fs work, so it runs off the async
    /// thread while holding the clipboard lock for the whole batch.
    async fn run_paste(
        &self,
        destination: PathBuf,
        resolution: Option<ConflictResolution>,
    ) -> Result<PasteOutcome> {
        let clipboard = Arc::clone(&self.clipboard);
        tokio::task::spawn_blocking(move || {
            let mut guard = clipboard.lock().unwrap_or_else(|e| e.into_inner());
            match resolution {
                Some(resolution) => guard.paste_with_resolution(&destination, resolution),
                None => guard.paste(&destination),
            }
        })
        .await
        .unwrap_or_else(|join_err| {
            Err(crate::error::ExplorerError::Clipboard(join_err.to_string()))
        })
    }

    fn lock_clipboard(&self) -> std::sync::MutexGuard<'_, ClipboardCoordinator> {
        self.clipboard.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    fn session_at(path: &std::path::Path) -> Session {
        let clipboard = Arc::new(Mutex::new(ClipboardCoordinator::detached()));
        let mut session = Session::with_clipboard(Settings::in_memory(), clipboard);
        session.explorer = NavigationController::with_start_path(
            path.to_path_buf(),
            Settings::in_memory(),
        );
        session.explorer.initial_load();
        session
    }

    async fn settle(session: &mut Session) {
        timeout(Duration::from_secs(5), session.explorer.wait_until_idle())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_copy_paste_between_windows() {
        let root = TempDir::new().unwrap();
        let left = root.path().join("left");
        let right = root.path().join("right");
        fs::create_dir(&left).unwrap();
        fs::create_dir(&right).unwrap();
        fs::write(left.join("doc.txt"), b"shared").unwrap();

        let mut first = session_at(&left);
        settle(&mut first).await;
        first.explorer.select_all();
        first.copy_selection();

        let mut second = Session::with_clipboard(Settings::in_memory(), first.clipboard());
        second.explorer =
            NavigationController::with_start_path(right.clone(), Settings::in_memory());
        second.explorer.initial_load();
        settle(&mut second).await;

        let outcome = second.paste().await.unwrap();
        assert!(outcome.all_succeeded());
        assert_eq!(fs::read(right.join("doc.txt")).unwrap(), b"shared");
        // copy leaves the source in place
        assert!(left.join("doc.txt").exists());
    }

    #[tokio::test]
    async fn test_cut_paste_moves_items() {
        let root = TempDir::new().unwrap();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dst).unwrap();
        fs::write(src.join("move-me.txt"), b"m").unwrap();

        let mut session = session_at(&src);
        settle(&mut session).await;
        session.explorer.select_all();
        session.cut_selection();

        session.explorer.navigate(&dst).unwrap();
        settle(&mut session).await;

        let outcome = session.paste().await.unwrap();
        assert!(outcome.all_succeeded());
        assert!(!src.join("move-me.txt").exists());
        assert!(dst.join("move-me.txt").exists());
        // a completed cut leaves nothing to paste again
        assert!(!session.lock_clipboard().has_content());
    }

    #[tokio::test]
    async fn test_paste_conflict_then_keep_both() {
        let root = TempDir::new().unwrap();
        let src = root.path().join("src");
        let dst = root.path().join("dst");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dst).unwrap();
        fs::write(src.join("report.txt"), b"new").unwrap();
        fs::write(dst.join("report.txt"), b"old").unwrap();

        let mut session = session_at(&src);
        settle(&mut session).await;
        session.explorer.select_all();
        session.copy_selection();

        session.explorer.navigate(&dst).unwrap();
        settle(&mut session).await;

        let outcome = session.paste().await.unwrap();
        assert!(outcome.has_conflicts());
        assert_eq!(fs::read(dst.join("report.txt")).unwrap(), b"old");

        let outcome = session
            .paste_resolving(ConflictResolution::KeepBoth)
            .await
            .unwrap();
        assert!(outcome.failed.is_empty());
        assert_eq!(fs::read(dst.join("report copy 1.txt")).unwrap(), b"new");
        assert_eq!(fs::read(dst.join("report.txt")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_empty_selection_does_not_clobber_clipboard() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("dir");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("kept.txt"), b"k").unwrap();

        let mut session = session_at(&dir);
        settle(&mut session).await;
        session.explorer.select_all();
        session.copy_selection();

        session.explorer.clear_selection();
        session.copy_selection();
        assert!(session.lock_clipboard().has_content());
    }
}
