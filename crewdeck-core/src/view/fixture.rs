//! JSON page fixtures and scripted event sessions for replay.
//!
//! A fixture describes the server-rendered markup plus the host's clipboard
//! situation. A script is a list of events at offsets from page start;
//! targets are named by DOM id.
//!
//! ```json
//! { "url": "https://crew.example/admin/crew", "secure_context": false,
//!   "body": [ { "tag": "form", "children": [
//!       { "tag": "input", "id": "q", "attrs": { "name": "search" } } ] } ] }
//! ```
//! ```json
//! [ { "at": "0ms", "event": "loaded" },
//!   { "at": "40ms", "event": "input", "target": "q", "value": "anna" } ]
//! ```

use std::path::Path;
use std::time::Duration;

use clipport::MemoryMode;
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::controller::events::{KeyPress, PageEvent};
use crate::error::{AppError, AppResult};
use crate::view::tree::{Element, NodeId, SelectedFile, Tag, ViewTree};

/// How the simulated clipboard behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipboardBehavior {
    #[default]
    Accept,
    Reject(CompactString),
    Refuse,
    Raise(CompactString),
}

impl From<ClipboardBehavior> for MemoryMode {
    fn from(b: ClipboardBehavior) -> Self {
        match b {
            ClipboardBehavior::Accept => Self::Accept,
            ClipboardBehavior::Reject(detail) => Self::Reject(detail),
            ClipboardBehavior::Refuse => Self::Refuse,
            ClipboardBehavior::Raise(detail) => Self::Raise(detail),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub tag: Tag,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub attrs: IndexMap<String, String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    pub url: String,
    /// Whether the secure clipboard path is available.
    #[serde(default)]
    pub secure_context: bool,
    #[serde(default)]
    pub clipboard: ClipboardBehavior,
    #[serde(default)]
    pub body: Vec<NodeSpec>,
}

impl PageFixture {
    pub fn from_json(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub async fn read(path: &Path) -> AppResult<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json(&text)
            .map_err(|e| e.with_context(format!("page fixture {}", path.display())))
    }

    pub fn location(&self) -> AppResult<Url> {
        Url::parse(&self.url).map_err(|e| AppError::url(&self.url, e))
    }

    /// Build the view tree the fixture describes.
    pub fn build(&self) -> ViewTree {
        let mut view = ViewTree::new();
        let body = view.body();
        for spec in &self.body {
            insert_spec(&mut view, body, spec);
        }
        debug!("fixture: built view with {} node(s)", view.len());
        view
    }
}

fn insert_spec(view: &mut ViewTree, parent: NodeId, spec: &NodeSpec) {
    let mut el = Element::new(spec.tag)
        .class(&spec.class)
        .text(spec.text.as_str())
        .value(spec.value.as_str())
        .checked(spec.checked);
    if let Some(id) = &spec.id {
        el = el.attr("id", id.as_str());
    }
    for (name, value) in &spec.attrs {
        el = el.attr(name, value.as_str());
    }
    el.disabled = spec.disabled;

    let node = view.insert(parent, el);
    for child in &spec.children {
        insert_spec(view, node, child);
    }
}

/// One line of an event script.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedEvent {
    /// Offset from page start.
    #[serde(with = "humantime_serde", default)]
    pub at: Duration,
    #[serde(flatten)]
    pub event: EventSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventSpec {
    Loaded,
    Input {
        target: String,
        value: String,
    },
    Change {
        target: String,
        checked: bool,
    },
    File {
        target: String,
        #[serde(default)]
        file: Option<SelectedFile>,
    },
    Click {
        target: String,
    },
    Submit {
        target: String,
    },
    Key {
        key: CompactString,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
    },
}

impl EventSpec {
    /// Resolve DOM ids against `view`.
    pub fn resolve(&self, view: &ViewTree) -> AppResult<PageEvent> {
        let node = |dom_id: &str| {
            view.by_dom_id(dom_id)
                .ok_or_else(|| AppError::fixture(format!("no element with id '{dom_id}'")))
        };
        Ok(match self {
            Self::Loaded => PageEvent::Loaded,
            Self::Input { target, value } => PageEvent::Input {
                target: node(target.as_str())?,
                value: value.clone(),
            },
            Self::Change { target, checked } => PageEvent::Change {
                target: node(target.as_str())?,
                checked: *checked,
            },
            Self::File { target, file } => PageEvent::FileChosen {
                target: node(target.as_str())?,
                file: file.clone(),
            },
            Self::Click { target } => PageEvent::Click {
                target: node(target.as_str())?,
            },
            Self::Submit { target } => PageEvent::Submit {
                form: node(target.as_str())?,
            },
            Self::Key { key, ctrl, meta } => PageEvent::Key(KeyPress {
                key: key.clone(),
                ctrl: *ctrl,
                meta: *meta,
            }),
        })
    }
}

/// Events ordered by offset; equal offsets keep script order.
pub fn parse_script(text: &str) -> AppResult<Vec<ScriptedEvent>> {
    let mut events: Vec<ScriptedEvent> = serde_json::from_str(text)?;
    events.sort_by_key(|e| e.at);
    Ok(events)
}

pub async fn read_script(path: &Path) -> AppResult<Vec<ScriptedEvent>> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_script(&text).map_err(|e| e.with_context(format!("event script {}", path.display())))
}
