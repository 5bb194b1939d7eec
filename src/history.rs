//! Back/forward navigation history

use std::path::{Path, PathBuf};

/// Ordered sequence of visited paths with a current index, using standard
/// browser-history semantics: navigating somewhere new while not at the
/// tail discards everything after the current position.
#[derive(Debug)]
pub struct NavigationHistory {
    visited: Vec<PathBuf>,
    index: usize,
}

impl NavigationHistory {
    pub fn new(initial: PathBuf) -> Self {
        NavigationHistory {
            visited: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &Path {
        &self.visited[self.index]
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.visited.len()
    }

    /// Records a navigation to a new path, truncating forward history.
    pub fn push(&mut self, path: PathBuf) {
        self.visited.truncate(self.index + 1);
        self.visited.push(path);
        self.index = self.visited.len() - 1;
    }

    /// Moves back one step; pure index movement, no truncation.
    pub fn back(&mut self) -> Option<&Path> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Moves forward one step; pure index movement, no truncation.
    pub fn forward(&mut self) -> Option<&Path> {
        if !self.can_go_forward() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }
}
