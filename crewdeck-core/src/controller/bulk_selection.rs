//! Row checkboxes of one table, kept consistent with the selection state
//! machine.
//!
//! The machine holds the truth. After every change the row highlight, the
//! row checkboxes, the master checkbox and the bulk-action buttons are all
//! rewritten from one snapshot before the event returns.

use compact_str::{CompactString, ToCompactString};
use tracing::debug;

use crate::model::selection::{SelectionSnapshot, SelectionStateMachine};
use crate::view::tree::{Element, NodeId, Tag, ViewTree};

/// Class of buttons enabled only while rows are selected.
pub const BULK_ACTION_CLASS: &str = "bulk-action-btn";

/// Class added to a selected row.
pub const ROW_ACTIVE_CLASS: &str = "table-active";

/// One row checkbox. The machine keys rows by checkbox node, so two rows
/// sharing a `value` still toggle independently.
#[derive(Debug)]
struct Row {
    key: CompactString,
    /// Checkbox `value`, what export sends for this row
    export_id: CompactString,
    checkbox: NodeId,
}

#[derive(Debug)]
pub struct BulkSelection {
    table: NodeId,
    master: Option<NodeId>,
    /// Display order
    rows: Vec<Row>,
    bulk_buttons: Vec<NodeId>,
    machine: SelectionStateMachine,
}

impl BulkSelection {
    /// Bind every table that has row checkboxes in its body. Bulk-action
    /// buttons go to the table named by their `data-table`, or to the first
    /// bound table.
    pub fn bind_all(view: &mut ViewTree) -> Vec<Self> {
        let tables = view.query_all(|el| el.tag == Tag::Table);
        let mut bound: Vec<Self> = tables
            .into_iter()
            .filter_map(|table| Self::bind(view, table))
            .collect();
        if bound.is_empty() {
            return bound;
        }

        for button in view.query_all(|el| el.has_class(BULK_ACTION_CLASS)) {
            let wanted = view.get(button).and_then(|el| el.data("table"));
            let owner = wanted
                .and_then(|dom_id| {
                    bound.iter().position(|sel| {
                        view.get(sel.table)
                            .is_some_and(|el| el.dom_id() == Some(dom_id))
                    })
                })
                .unwrap_or(0);
            bound[owner].bulk_buttons.push(button);
        }

        for selection in &bound {
            selection.render(view, selection.machine.snapshot());
        }
        bound
    }

    /// Bind one table. `None` when its body has no checkboxes.
    pub fn bind(view: &ViewTree, table: NodeId) -> Option<Self> {
        let body = view.query_first_within(table, |el| el.tag == Tag::Tbody)?;
        let rows: Vec<Row> = view
            .query_all_within(body, Element::is_checkbox)
            .into_iter()
            .filter_map(|checkbox| {
                let el = view.get(checkbox)?;
                let key = checkbox.to_compact_string();
                let export_id = if el.value.is_empty() {
                    key.clone()
                } else {
                    CompactString::from(el.value.as_str())
                };
                Some(Row {
                    key,
                    export_id,
                    checkbox,
                })
            })
            .collect();
        if rows.is_empty() {
            return None;
        }

        let master = view
            .query_first_within(table, |el| el.tag == Tag::Thead)
            .and_then(|head| view.query_first_within(head, Element::is_checkbox));

        let mut machine = SelectionStateMachine::new(rows.iter().map(|row| row.key.clone()));
        // adopt server-rendered checks
        for row in &rows {
            if view.get(row.checkbox).is_some_and(|el| el.checked) {
                machine.toggle_row(&row.key, true);
            }
        }

        debug!(
            "selection: bound table {} with {} row(s), master {:?}",
            table,
            rows.len(),
            master
        );
        Some(Self {
            table,
            master,
            rows,
            bulk_buttons: Vec::new(),
            machine,
        })
    }

    #[inline]
    pub const fn table(&self) -> NodeId {
        self.table
    }

    #[inline]
    pub fn machine(&self) -> &SelectionStateMachine {
        &self.machine
    }

    /// Whether a change on `node` belongs to this table.
    pub fn owns(&self, node: NodeId) -> bool {
        self.master == Some(node) || self.rows.iter().any(|row| row.checkbox == node)
    }

    /// Checkbox change event. `None` when the checkbox is not ours.
    pub fn on_change(
        &mut self,
        view: &mut ViewTree,
        target: NodeId,
        checked: bool,
    ) -> Option<SelectionSnapshot> {
        let snapshot = if self.master == Some(target) {
            self.machine.toggle_all(checked)
        } else {
            let row = self.rows.iter().find(|row| row.checkbox == target)?;
            self.machine.toggle_row(&row.key, checked)
        };
        self.render(view, snapshot);
        Some(snapshot)
    }

    /// Export ids of the selected rows, in display order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| self.machine.is_selected(&row.key))
            .map(|row| row.export_id.as_str())
            .collect()
    }

    /// Write the machine's state into every dependent control.
    fn render(&self, view: &mut ViewTree, snapshot: SelectionSnapshot) {
        for row in &self.rows {
            let selected = self.machine.is_selected(&row.key);
            view.set_checked(row.checkbox, selected);
            if let Some(tr) = view.closest(row.checkbox, |el| el.tag == Tag::Tr) {
                if selected {
                    view.add_class(tr, ROW_ACTIVE_CLASS);
                } else {
                    view.remove_class(tr, ROW_ACTIVE_CLASS);
                }
            }
        }

        if let Some(master) = self.master {
            view.set_checked(master, snapshot.master_checked());
            if snapshot.master_indeterminate() {
                view.set_attr(master, "data-indeterminate", "true");
            } else {
                view.remove_attr(master, "data-indeterminate");
            }
        }

        for button in &self.bulk_buttons {
            view.set_disabled(*button, !snapshot.bulk_actions_enabled());
        }
    }
}
