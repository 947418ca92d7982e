//! Toast notification lifecycle.
//!
//! The manager exclusively owns its queue and the nodes it renders. An entry
//! is in the display surface exactly while it is in the queue: every path
//! that removes one (expiry, explicit dismissal, close button) removes both
//! in the same call and releases the expiry timer.

use std::collections::VecDeque;

use compact_str::CompactString;
use tracing::{debug, trace};

use crate::config::TOAST_DISPLAY;
use crate::controller::context::PageContext;
use crate::model::toast::{Severity, ToastEntry, ToastId};
use crate::util::timer::TimerKind;
use crate::view::tree::{Element, NodeId, Tag, ViewTree};

/// Class of the shared fixed-position container.
pub const SURFACE_CLASS: &str = "toast-container";

#[derive(Debug)]
pub struct ToastManager {
    /// Active entries, oldest first. Not capped.
    queue: VecDeque<ToastEntry>,
    surface: Option<NodeId>,
    brand: CompactString,
    next_id: u64,
}

impl ToastManager {
    pub fn new(brand: impl Into<CompactString>) -> Self {
        Self {
            queue: VecDeque::new(),
            surface: None,
            brand: brand.into(),
            next_id: 0,
        }
    }

    /// Show `message` and schedule its removal after [`TOAST_DISPLAY`].
    pub fn notify(
        &mut self,
        cx: &mut PageContext,
        message: impl Into<CompactString>,
        severity: Severity,
    ) -> ToastId {
        self.next_id += 1;
        let id = ToastId(self.next_id);
        let message = message.into();

        let surface = self.ensure_surface(&mut cx.view);
        let node = render(&mut cx.view, surface, &self.brand, &message, severity);
        let expiry = cx
            .timers
            .schedule(cx.now, TOAST_DISPLAY, TimerKind::ToastExpiry(id));

        debug!("toast: {} [{}] {}", id, severity, message);
        self.queue.push_back(ToastEntry {
            id,
            message,
            severity,
            created_at: cx.now,
            node,
            expiry,
        });
        id
    }

    /// `notify` with a free-form severity name; unknown names render as info.
    pub fn notify_named(
        &mut self,
        cx: &mut PageContext,
        message: impl Into<CompactString>,
        severity: &str,
    ) -> ToastId {
        self.notify(cx, message, Severity::parse_lossy(severity))
    }

    /// Remove an entry before it expires. No-op for an unknown or already
    /// removed id.
    pub fn dismiss(&mut self, cx: &mut PageContext, id: ToastId) -> bool {
        let Some(entry) = self.take(id) else {
            trace!("toast: dismiss of {} ignored, already gone", id);
            return false;
        };
        cx.timers.cancel(entry.expiry);
        cx.view.remove(entry.node);
        debug!("toast: dismissed {}", id);
        true
    }

    /// Timer callback. The expiry handle has already been released by the
    /// timer table.
    pub fn expire(&mut self, cx: &mut PageContext, id: ToastId) {
        if let Some(entry) = self.take(id) {
            cx.view.remove(entry.node);
            debug!("toast: expired {}", id);
        }
    }

    /// Close-button click inside a rendered toast.
    pub fn dismiss_by_node(&mut self, cx: &mut PageContext, target: NodeId) -> bool {
        let toast_node = cx.view.closest(target, |el| el.has_class("toast"));
        let id = toast_node.and_then(|node| {
            self.queue
                .iter()
                .find(|entry| entry.node == node)
                .map(|entry| entry.id)
        });
        match id {
            Some(id) => self.dismiss(cx, id),
            None => false,
        }
    }

    fn take(&mut self, id: ToastId) -> Option<ToastEntry> {
        let pos = self.queue.iter().position(|entry| entry.id == id)?;
        self.queue.remove(pos)
    }

    /// Reuse the page's container if one exists, create it otherwise.
    fn ensure_surface(&mut self, view: &mut ViewTree) -> NodeId {
        if let Some(surface) = self.surface
            && view.is_attached(surface)
        {
            return surface;
        }

        let surface = view
            .query_first(|el| el.has_class(SURFACE_CLASS))
            .unwrap_or_else(|| {
                debug!("toast: creating display surface");
                let container = Element::new(Tag::Div)
                    .class(SURFACE_CLASS)
                    .class("position-fixed top-0 end-0 p-3")
                    .attr("style", "z-index: 9999");
                view.insert(view.body(), container)
            });
        self.surface = Some(surface);
        surface
    }

    #[inline]
    pub fn surface(&self) -> Option<NodeId> {
        self.surface
    }

    pub fn entries(&self) -> impl Iterator<Item = &ToastEntry> {
        self.queue.iter()
    }

    pub fn get(&self, id: ToastId) -> Option<&ToastEntry> {
        self.queue.iter().find(|entry| entry.id == id)
    }

    #[inline]
    pub fn contains(&self, id: ToastId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Build the toast node and append it to the surface.
fn render(
    view: &mut ViewTree,
    surface: NodeId,
    brand: &str,
    message: &str,
    severity: Severity,
) -> NodeId {
    let toast = view.insert(
        surface,
        Element::new(Tag::Div)
            .class("toast")
            .class(&format!("toast-{}", severity.as_str()))
            .attr("role", "alert"),
    );

    let header = view.insert(toast, Element::new(Tag::Div).class("toast-header"));
    view.insert(
        header,
        Element::new(Tag::I)
            .class("fas me-2")
            .class(severity.icon_class()),
    );
    view.insert(header, Element::new(Tag::Strong).class("me-auto").text(brand));
    view.insert(
        header,
        Element::new(Tag::Button)
            .class("btn-close")
            .attr("type", "button")
            .attr("data-bs-dismiss", "toast"),
    );

    // message goes in as text, never as markup
    view.insert(toast, Element::new(Tag::Div).class("toast-body").text(message));
    toast
}
