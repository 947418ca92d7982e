//! Bulk row selection.
//!
//! The selection set is the only stored state. Everything the dependent
//! controls show (master checkbox, bulk-action enablement) is recomputed from
//! it with a linear scan after every mutation, so it can never go stale.

use std::collections::HashSet;

use compact_str::CompactString;
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, trace};

/// Derived selection state of a row collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionState {
    NoneSelected,
    SomeSelected,
    AllSelected,
}

/// What the dependent controls must show after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionSnapshot {
    pub state: SelectionState,
    pub selected: usize,
    pub total: usize,
}

impl SelectionSnapshot {
    /// Master checkbox is checked exactly when every row is.
    #[inline]
    pub const fn master_checked(&self) -> bool {
        matches!(self.state, SelectionState::AllSelected)
    }

    /// Master checkbox shows the mixed mark when some but not all rows are.
    #[inline]
    pub const fn master_indeterminate(&self) -> bool {
        matches!(self.state, SelectionState::SomeSelected)
    }

    #[inline]
    pub const fn bulk_actions_enabled(&self) -> bool {
        !matches!(self.state, SelectionState::NoneSelected)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStateMachine {
    /// Row identifiers in display order.
    rows: IndexSet<CompactString>,
    /// Selected row identifiers.
    selected: HashSet<CompactString>,
}

impl SelectionStateMachine {
    pub fn new<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        Self {
            rows: rows.into_iter().map(Into::into).collect(),
            selected: HashSet::new(),
        }
    }

    /// Per-row toggle. Unknown rows are ignored.
    pub fn toggle_row(&mut self, id: &str, checked: bool) -> SelectionSnapshot {
        if !self.rows.contains(id) {
            debug!("selection: ignoring toggle for unknown row '{}'", id);
            return self.snapshot();
        }
        if checked {
            self.selected.insert(CompactString::from(id));
        } else {
            self.selected.remove(id);
        }
        let snapshot = self.snapshot();
        trace!("selection: row '{}' -> {} ({:?})", id, checked, snapshot.state);
        snapshot
    }

    /// Master toggle: force every row to `checked`, then recompute once.
    pub fn toggle_all(&mut self, checked: bool) -> SelectionSnapshot {
        if checked {
            self.selected = self.rows.iter().cloned().collect();
        } else {
            self.selected.clear();
        }
        let snapshot = self.snapshot();
        debug!("selection: master -> {} ({:?})", checked, snapshot.state);
        snapshot
    }

    /// Recompute the derived state from the selection set.
    pub fn snapshot(&self) -> SelectionSnapshot {
        let total = self.rows.len();
        let selected = self
            .rows
            .iter()
            .filter(|id| self.selected.contains(*id))
            .count();

        let state = match selected {
            0 => SelectionState::NoneSelected,
            n if n == total => SelectionState::AllSelected,
            _ => SelectionState::SomeSelected,
        };

        SelectionSnapshot {
            state,
            selected,
            total,
        }
    }

    #[inline]
    pub fn state(&self) -> SelectionState {
        self.snapshot().state
    }

    #[inline]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Selected row ids in display order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|id| self.selected.contains(*id))
            .map(CompactString::as_str)
            .collect()
    }

    #[inline]
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }
}
