//! Selection state over an ordered listing

use crate::entry::EntryId;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearDirection {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Flat set of selected entry ids plus an anchor for range operations.
///
/// The model is topology-agnostic: movement operations take the ordered id
/// list of whatever surface owns this selection (main listing, search
/// results), and grid movement takes the column count computed by the UI.
#[derive(Debug, Default)]
pub struct SelectionModel {
    selected: HashSet<EntryId>,
    anchor: Option<EntryId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        SelectionModel::default()
    }

    pub fn ids(&self) -> &HashSet<EntryId> {
        &self.selected
    }

    pub fn anchor(&self) -> Option<EntryId> {
        self.anchor
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn toggle(&mut self, id: EntryId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        self.anchor = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    pub fn select_all<I: IntoIterator<Item = EntryId>>(&mut self, ids: I) {
        self.selected = ids.into_iter().collect();
    }

    /// Replaces the selection with a single id.
    pub fn select_only(&mut self, id: EntryId) {
        self.selected.clear();
        self.selected.insert(id);
        self.anchor = Some(id);
    }

    /// Selects every id between `from` and `to` in `order`, inclusive,
    /// regardless of which endpoint comes first. Ids missing from `order`
    /// make this a no-op.
    pub fn range(&mut self, from: EntryId, to: EntryId, order: &[EntryId]) {
        let (Some(a), Some(b)) = (position(order, from), position(order, to)) else {
            return;
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for id in &order[lo..=hi] {
            self.selected.insert(*id);
        }
        self.anchor = Some(to);
    }

    /// Single-selection move to the previous/next index, clamped at the
    /// ends. With nothing selected, selects the first item.
    pub fn move_linear(&mut self, direction: LinearDirection, order: &[EntryId]) {
        let step = match direction {
            LinearDirection::Previous => Step::Back(1),
            LinearDirection::Next => Step::Forward(1),
        };
        self.move_by(step, order);
    }

    /// Same clamped movement as [`move_linear`](Self::move_linear) but
    /// stepping by `columns` for vertical moves. `columns` comes from the
    /// caller; deriving it from viewport width is the UI's business.
    pub fn move_grid(&mut self, direction: GridDirection, columns: usize, order: &[EntryId]) {
        let columns = columns.max(1);
        let step = match direction {
            GridDirection::Up => Step::Back(columns),
            GridDirection::Down => Step::Forward(columns),
            GridDirection::Left => Step::Back(1),
            GridDirection::Right => Step::Forward(1),
        };
        self.move_by(step, order);
    }

    /// Drops ids that are no longer present in the current listing.
    /// Called after every reload; stale ids disappear silently.
    pub fn retain_present(&mut self, present: &HashSet<EntryId>) {
        self.selected.retain(|id| present.contains(id));
        if let Some(anchor) = self.anchor {
            if !present.contains(&anchor) {
                self.anchor = None;
            }
        }
    }

    fn move_by(&mut self, step: Step, order: &[EntryId]) {
        if order.is_empty() {
            return;
        }
        let next = match self.current_position(order) {
            None => 0,
            Some(index) => match step {
                Step::Back(n) => index.saturating_sub(n),
                Step::Forward(n) => (index + n).min(order.len() - 1),
            },
        };
        self.select_only(order[next]);
    }

    /// The position movement starts from: the anchor when it is still in
    /// the listing, otherwise the first selected id that is.
    fn current_position(&self, order: &[EntryId]) -> Option<usize> {
        if let Some(anchor) = self.anchor {
            if let Some(index) = position(order, anchor) {
                return Some(index);
            }
        }
        order.iter().position(|id| self.selected.contains(id))
    }
}

#[derive(Clone, Copy)]
enum Step {
    Back(usize),
    Forward(usize),
}

fn position(order: &[EntryId], id: EntryId) -> Option<usize> {
    order.iter().position(|candidate| *candidate == id)
}
