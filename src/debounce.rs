//! Coalescing of event bursts into single notifications

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Collapses bursts of trigger events into one notification per burst.
///
/// A burst starts with the first received trigger and ends after `window`
/// of quiescence; every trigger received inside the window re-arms it.
/// Works the same under real timers and under tokio's paused test clock.
pub struct Coalescer {
    rx: mpsc::UnboundedReceiver<()>,
    window: Duration,
}

impl Coalescer {
    pub fn new(rx: mpsc::UnboundedReceiver<()>, window: Duration) -> Self {
        Coalescer { rx, window }
    }

    /// Waits for the next burst to complete. Returns `None` once the
    /// trigger channel closes; a burst interrupted by channel closure
    /// emits nothing.
    pub async fn next_burst(&mut self) -> Option<()> {
        self.rx.recv().await?;
        loop {
            match timeout(self.window, self.rx.recv()).await {
                // another trigger inside the window: re-arm
                Ok(Some(())) => continue,
                Ok(None) => return None,
                // window elapsed with no further triggers
                Err(_) => return Some(()),
            }
        }
    }
}
