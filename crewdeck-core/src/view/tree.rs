//! In-memory model of the server-rendered page the behavior layer augments.
//!
//! Nodes live in a slab arena. A [`NodeId`] carries the generation of the
//! node it was issued for, so a handle kept past `remove` (in a timer, a
//! pending copy) resolves to nothing instead of to whatever reused the slot.

use std::fmt;

use clipport::{ClipResult, HolderHost};
use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slab::Slab;
use smallvec::SmallVec;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Body,
    Div,
    Form,
    Input,
    Textarea,
    Button,
    Label,
    Small,
    Span,
    Strong,
    I,
    A,
    Table,
    Thead,
    Tbody,
    Tr,
    Th,
    Td,
}

/// File currently chosen in an `input[type=file]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: CompactString,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: Tag,
    pub classes: SmallVec<[CompactString; 4]>,
    pub attrs: IndexMap<CompactString, String>,
    pub text: String,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
    pub file: Option<SelectedFile>,
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            classes: SmallVec::new(),
            attrs: IndexMap::new(),
            text: String::new(),
            value: String::new(),
            checked: false,
            disabled: false,
            file: None,
            generation: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        for c in class.split_whitespace() {
            if !self.has_class(c) {
                self.classes.push(CompactString::from(c));
            }
        }
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(CompactString::from(name), value.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    #[inline]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[inline]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// `data-*` attribute lookup, `data("status")` reads `data-status`.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name.strip_prefix("data-") == Some(key))
            .map(|(_, value)| value.as_str())
    }

    /// Element `id` attribute.
    #[inline]
    pub fn dom_id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.get_attr("name")
    }

    /// `type` of an input, `text` when unset.
    pub fn input_type(&self) -> &str {
        self.get_attr("type").unwrap_or("text")
    }

    #[inline]
    pub fn is_checkbox(&self) -> bool {
        self.tag == Tag::Input && self.input_type() == "checkbox"
    }

    #[inline]
    pub fn is_file_input(&self) -> bool {
        self.tag == Tag::Input && self.input_type() == "file"
    }

    /// `button[type=submit]` or `input[type=submit]`. The type must be explicit.
    pub fn is_submit_control(&self) -> bool {
        match self.tag {
            Tag::Button => self.get_attr("type") == Some("submit"),
            Tag::Input => self.input_type() == "submit",
            _ => false,
        }
    }

    /// Interactive elements whose clicks never count as row clicks.
    #[inline]
    pub fn is_interactive(&self) -> bool {
        matches!(self.tag, Tag::Button | Tag::A | Tag::Input)
    }
}

/// The page view: element arena plus focus and text selection.
#[derive(Debug)]
pub struct ViewTree {
    nodes: Slab<Element>,
    body: NodeId,
    next_generation: u32,
    focused: Option<NodeId>,
    selection: Option<NodeId>,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Slab::with_capacity(64),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            next_generation: 0,
            focused: None,
            selection: None,
        };
        tree.body = tree.create(Element::new(Tag::Body));
        tree
    }

    #[inline]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Allocate a detached node.
    pub fn create(&mut self, mut element: Element) -> NodeId {
        self.next_generation = self.next_generation.wrapping_add(1);
        element.generation = self.next_generation;
        element.parent = None;
        element.children.clear();
        let index = self.nodes.insert(element);
        NodeId {
            index: index as u32,
            generation: self.next_generation,
        }
    }

    /// Allocate a node and append it under `parent`.
    pub fn insert(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.create(element);
        self.append_child(parent, id);
        id
    }

    /// Move `child` to the end of `parent`'s children. Returns false when
    /// either handle is stale or the move would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) || self.is_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes
            .get(id.index as usize)
            .filter(|el| el.generation == id.generation)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes
            .get_mut(id.index as usize)
            .filter(|el| el.generation == id.generation)
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|el| el.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |el| el.children.as_slice())
    }

    /// True when the node is reachable from `body`.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(node) = cur {
            if node == self.body {
                return true;
            }
            cur = self.parent(node);
        }
        false
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|c| *c != id);
            }
            if let Some(el) = self.get_mut(id) {
                el.parent = None;
            }
        }
    }

    /// Detach `id` and free it with its whole subtree. Focus and selection
    /// inside the subtree are cleared. Returns false for a stale handle or
    /// for `body`.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.body || !self.contains(id) {
            return false;
        }
        self.detach(id);

        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if self.focused == Some(node) {
                self.focused = None;
            }
            if self.selection == Some(node) {
                self.selection = None;
            }
            let el = self.nodes.remove(node.index as usize);
            stack.extend(el.children);
        }
        trace!("view: removed subtree at {}", id);
        true
    }

    /// Number of live nodes, attached or not, including `body`.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `id` itself or its nearest ancestor matching `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(node) = cur {
            let el = self.get(node)?;
            if pred(el) {
                return Some(node);
            }
            cur = el.parent;
        }
        None
    }

    /// Descendants of `root` (excluding `root`) in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn query_all_within(&self, root: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(&pred))
            .collect()
    }

    pub fn query_first_within(
        &self,
        root: NodeId,
        pred: impl Fn(&Element) -> bool,
    ) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.get(*id).is_some_and(&pred))
    }

    /// Attached nodes matching `pred`, in document order.
    #[inline]
    pub fn query_all(&self, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.query_all_within(self.body, pred)
    }

    #[inline]
    pub fn query_first(&self, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.query_first_within(self.body, pred)
    }

    /// Attached node with the given `id` attribute.
    pub fn by_dom_id(&self, dom_id: &str) -> Option<NodeId> {
        self.query_first(|el| el.dom_id() == Some(dom_id))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.get_mut(id)
            && !el.has_class(class)
        {
            el.classes.push(CompactString::from(class));
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.get_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.attrs.insert(CompactString::from(name), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.get_mut(id) {
            el.attrs.shift_remove(name);
        }
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|el| el.value.as_str())
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.value = value.into();
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.text = text.into();
        }
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if let Some(el) = self.get_mut(id) {
            el.checked = checked;
        }
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        if let Some(el) = self.get_mut(id) {
            el.disabled = disabled;
        }
    }

    /// Set or clear the chosen file; clearing also empties the value.
    pub fn set_file(&mut self, id: NodeId, file: Option<SelectedFile>) {
        if let Some(el) = self.get_mut(id) {
            el.value = file.as_ref().map(|f| f.name.to_string()).unwrap_or_default();
            el.file = file;
        }
    }

    #[inline]
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Focus an attached node that does not opt out with `tabindex=-1`.
    pub fn focus(&mut self, id: NodeId) -> bool {
        let focusable = self.is_attached(id)
            && self
                .get(id)
                .is_some_and(|el| el.get_attr("tabindex") != Some("-1"));
        if focusable {
            self.focused = Some(id);
        }
        focusable
    }

    pub fn blur(&mut self, id: NodeId) {
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// Selected text, when a node's full content is selected.
    pub fn selection(&self) -> Option<&str> {
        self.selection
            .and_then(|id| self.get(id))
            .map(|el| el.value.as_str())
    }
}

/// Class marking the off-screen copy holder.
pub const COPY_HOLDER_CLASS: &str = "copy-holder";

impl HolderHost for ViewTree {
    type Holder = NodeId;

    fn attach_holder(&mut self, text: &str) -> ClipResult<NodeId> {
        let holder = Element::new(Tag::Textarea)
            .class(COPY_HOLDER_CLASS)
            .attr("readonly", "")
            .attr("tabindex", "-1")
            .attr("aria-hidden", "true")
            .attr("style", "position: fixed; left: -999999px; top: -999999px")
            .value(text);
        Ok(self.insert(self.body, holder))
    }

    fn select_holder(&mut self, holder: NodeId) {
        if self.is_attached(holder) {
            self.selection = Some(holder);
        }
    }

    fn selected_text(&self) -> Option<String> {
        self.selection().map(str::to_owned)
    }

    fn detach_holder(&mut self, holder: NodeId) {
        self.remove(holder);
    }
}
