//! Copy/cut/paste coordination with conflict resolution

use crate::error::{ExplorerError, Result};
use crate::fs_ops;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardAction {
    Copy,
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Leave the existing destination untouched and omit the item.
    Skip,
    /// Best-effort trash the existing destination, then proceed.
    Replace,
    /// Generate a non-colliding `"{base} copy {n}"` name, then proceed.
    KeepBoth,
}

/// The source paths and action captured at copy/cut time.
#[derive(Debug, Clone)]
pub struct ClipboardSnapshot {
    pub paths: Vec<PathBuf>,
    pub action: ClipboardAction,
}

/// Result of a paste batch. Items are reported in clipboard order.
#[derive(Debug, Default)]
pub struct PasteOutcome {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    /// Destinations that already existed; resolution was not applied.
    pub conflicts: Vec<PathBuf>,
}

impl PasteOutcome {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty() && self.conflicts.is_empty()
    }
}

/// Access to the OS clipboard as a list of file paths.
///
/// The process-wide clipboard is shared with other applications, so this
/// sits behind a trait: production uses [`OsClipboard`], headless
/// environments fall back to [`NullClipboard`], tests substitute a fake.
pub trait SystemClipboard: Send {
    fn write_paths(&mut self, paths: &[PathBuf]) -> Result<()>;
    fn read_paths(&mut self) -> Result<Vec<PathBuf>>;
    fn clear(&mut self) -> Result<()>;
}

/// `arboard`-backed clipboard carrying paths as newline-separated text.
pub struct OsClipboard {
    inner: arboard::Clipboard,
}

impl OsClipboard {
    pub fn new() -> Result<Self> {
        let inner =
            arboard::Clipboard::new().map_err(|e| ExplorerError::Clipboard(e.to_string()))?;
        Ok(OsClipboard { inner })
    }
}

impl SystemClipboard for OsClipboard {
    fn write_paths(&mut self, paths: &[PathBuf]) -> Result<()> {
        let text = paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        self.inner
            .set_text(text)
            .map_err(|e| ExplorerError::Clipboard(e.to_string()))
    }

    fn read_paths(&mut self) -> Result<Vec<PathBuf>> {
        let text = match self.inner.get_text() {
            Ok(text) => text,
            // an empty or non-text clipboard is not an error
            Err(_) => return Ok(Vec::new()),
        };
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .filter(|p| p.is_absolute() && p.exists())
            .collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.inner
            .clear()
            .map_err(|e| ExplorerError::Clipboard(e.to_string()))
    }
}

/// No-op clipboard for environments without one (CI, headless servers).
/// Copy/cut still work through the internal snapshot.
#[derive(Debug, Default)]
pub struct NullClipboard;

impl SystemClipboard for NullClipboard {
    fn write_paths(&mut self, _paths: &[PathBuf]) -> Result<()> {
        Ok(())
    }

    fn read_paths(&mut self) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Owns the clipboard snapshot and performs paste with conflict handling.
///
/// The internal snapshot is authoritative for paste when present; the
/// system clipboard is consulted only when the snapshot is empty, so that
/// another application changing the clipboard after a cut cannot redirect
/// the pending move. Paste applies items sequentially in snapshot order
/// and is partial-failure tolerant: per-item errors are recorded, never
/// abort the batch.
pub struct ClipboardCoordinator {
    snapshot: Option<ClipboardSnapshot>,
    system: Box<dyn SystemClipboard>,
}

impl ClipboardCoordinator {
    pub fn new() -> Result<Self> {
        Ok(Self::with_system(Box::new(OsClipboard::new()?)))
    }

    /// A coordinator without OS clipboard mirroring.
    pub fn detached() -> Self {
        Self::with_system(Box::new(NullClipboard))
    }

    pub fn with_system(system: Box<dyn SystemClipboard>) -> Self {
        ClipboardCoordinator {
            snapshot: None,
            system,
        }
    }

    pub fn copy(&mut self, paths: Vec<PathBuf>) {
        self.capture(paths, ClipboardAction::Copy);
    }

    pub fn cut(&mut self, paths: Vec<PathBuf>) {
        self.capture(paths, ClipboardAction::Cut);
    }

    fn capture(&mut self, paths: Vec<PathBuf>, action: ClipboardAction) {
        if let Err(err) = self.system.write_paths(&paths) {
            // keep the internal snapshot even if mirroring fails
            tracing::warn!(%err, "failed to mirror clipboard to the system");
        }
        self.snapshot = Some(ClipboardSnapshot { paths, action });
    }

    pub fn snapshot(&self) -> Option<&ClipboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn has_content(&mut self) -> bool {
        if self.snapshot.as_ref().is_some_and(|s| !s.paths.is_empty()) {
            return true;
        }
        self.system
            .read_paths()
            .map(|paths| !paths.is_empty())
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        if let Err(err) = self.system.clear() {
            tracing::warn!(%err, "failed to clear system clipboard");
        }
    }

    /// Pastes into `destination` without resolving conflicts: an existing
    /// destination records the source as a conflict and skips it.
    ///
    /// The snapshot is cleared only after a cut where every item
    /// succeeded; a partial cut keeps the clipboard for retry.
    pub fn paste(&mut self, destination: &Path) -> Result<PasteOutcome> {
        let (paths, action) = self.sources()?;
        fs_ops::ensure_writable_dir(destination)
            .map_err(|e| ExplorerError::item_failed(destination, e))?;

        let mut outcome = PasteOutcome::default();
        for source in &paths {
            let Some(name) = source.file_name() else {
                outcome
                    .failed
                    .push((source.clone(), "source has no file name".to_string()));
                continue;
            };
            let target = destination.join(name);
            if target.exists() {
                outcome.conflicts.push(source.clone());
                continue;
            }
            match transfer(source, &target, action) {
                Ok(()) => outcome.succeeded.push(target),
                Err(err) => outcome.failed.push((source.clone(), err.to_string())),
            }
        }

        if action == ClipboardAction::Cut && outcome.all_succeeded() {
            self.clear();
        }
        Ok(outcome)
    }

    /// Pastes into `destination` applying `resolution` to conflicts.
    ///
    /// Resolved conflicts are not failures: after this call the snapshot
    /// is cleared on cut whenever nothing actually failed.
    pub fn paste_with_resolution(
        &mut self,
        destination: &Path,
        resolution: ConflictResolution,
    ) -> Result<PasteOutcome> {
        let (paths, action) = self.sources()?;
        fs_ops::ensure_writable_dir(destination)
            .map_err(|e| ExplorerError::item_failed(destination, e))?;

        let mut outcome = PasteOutcome::default();
        for source in &paths {
            let Some(name) = source.file_name() else {
                outcome
                    .failed
                    .push((source.clone(), "source has no file name".to_string()));
                continue;
            };
            let mut target = destination.join(name);
            if target.exists() {
                match resolution {
                    ConflictResolution::Skip => continue,
                    ConflictResolution::Replace => {
                        // best-effort: if trashing fails the transfer below
                        // overwrites plain files anyway
                        if let Err(err) = fs_ops::move_to_trash(&target) {
                            tracing::warn!(path = %target.display(), %err, "could not trash existing destination");
                        }
                    }
                    ConflictResolution::KeepBoth => {
                        target = unique_destination(&target);
                    }
                }
            }
            match transfer(source, &target, action) {
                Ok(()) => outcome.succeeded.push(target),
                Err(err) => outcome.failed.push((source.clone(), err.to_string())),
            }
        }

        if action == ClipboardAction::Cut && outcome.failed.is_empty() {
            self.clear();
        }
        Ok(outcome)
    }

    /// Paths and action for the next paste: the internal snapshot when it
    /// has content, otherwise the system clipboard (treated as a copy).
    fn sources(&mut self) -> Result<(Vec<PathBuf>, ClipboardAction)> {
        if let Some(snapshot) = &self.snapshot {
            if !snapshot.paths.is_empty() {
                return Ok((snapshot.paths.clone(), snapshot.action));
            }
        }
        let external = self.system.read_paths()?;
        if external.is_empty() {
            return Err(ExplorerError::NothingToPaste);
        }
        Ok((external, ClipboardAction::Copy))
    }
}

fn transfer(source: &Path, target: &Path, action: ClipboardAction) -> std::io::Result<()> {
    match action {
        ClipboardAction::Copy => fs_ops::copy_item(source, target),
        ClipboardAction::Cut => fs_ops::move_item(source, target),
    }
}

/// Finds a non-colliding sibling of `desired` by appending " copy {n}"
/// to the stem, keeping the extension. Terminates at the first name the
/// filesystem reports as absent.
pub fn unique_destination(desired: &Path) -> PathBuf {
    let directory = desired.parent().unwrap_or_else(|| Path::new(""));
    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = desired.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 1u32;
    loop {
        let name = match &extension {
            Some(ext) => format!("{} copy {}.{}", stem, n, ext),
            None => format!("{} copy {}", stem, n),
        };
        let candidate = directory.join(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
