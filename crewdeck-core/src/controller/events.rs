//! Inbound page events and outbound effects

use compact_str::CompactString;
use serde::Serialize;

use crate::view::tree::{NodeId, SelectedFile};

/// A key press with the modifiers the shortcuts care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: CompactString,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: &str) -> Self {
        Self {
            key: CompactString::from(key),
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    #[inline]
    pub const fn has_command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// User and platform events delivered to the page, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Markup is ready; behaviors bind to their controls.
    Loaded,
    /// Text control changed to `value`.
    Input { target: NodeId, value: String },
    /// Checkbox changed to `checked`.
    Change { target: NodeId, checked: bool },
    /// File input selection changed.
    FileChosen {
        target: NodeId,
        file: Option<SelectedFile>,
    },
    Click { target: NodeId },
    Submit { form: NodeId },
    Key(KeyPress),
}

/// Effects on the world outside the view tree, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum PageEffect {
    /// Full page navigation.
    Navigate { url: String },
    /// A form was submitted as a GET navigation to `url`.
    SubmitForm { form: NodeId, url: String },
    /// Keyboard focus moved to the node.
    Focus { node: NodeId },
    /// The node lost keyboard focus.
    Blur { node: NodeId },
    /// Event default action suppressed (shortcut keys, rejected submits).
    PreventDefault,
}
