//! Copy-link buttons.
//!
//! A copy request is registered as an intent before the clipboard is
//! touched. The intent is removed by the first settlement, so each request
//! runs exactly one continuation; any later settlement for the same id is
//! ignored.

use std::collections::HashMap;
use std::fmt;

use clipport::{ClipResult, ClipboardPort, CopyTicket};
use compact_str::CompactString;
use futures::future::BoxFuture;
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::config::COPY_FEEDBACK;
use crate::controller::context::PageContext;
use crate::controller::toast_manager::ToastManager;
use crate::model::toast::Severity;
use crate::util::timer::{TimerHandle, TimerKind};
use crate::view::tree::{NodeId, Tag};

pub const COPY_FAILED_MESSAGE: &str = "Failed to copy link. Please try again.";

/// Label shown on a button while it is in its "copied" look.
pub const COPIED_LABEL: &str = "Copied!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CopyRequestId(u64);

impl fmt::Display for CopyRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "copy-{}", self.0)
    }
}

/// Which link a button copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyTarget {
    /// Public profile link of a crew member, `#profileUrl<id>`.
    Profile { crew_id: Option<CompactString> },
    /// Admin-only private link, `#privateProfileUrl`.
    PrivateProfile,
}

impl CopyTarget {
    /// DOM id of the input holding the link.
    pub fn source_id(&self) -> String {
        match self {
            Self::Profile { crew_id } => {
                format!("profileUrl{}", crew_id.as_deref().unwrap_or_default())
            }
            Self::PrivateProfile => "privateProfileUrl".to_owned(),
        }
    }

    pub const fn success_message(&self) -> &'static str {
        match self {
            Self::Profile { .. } => "Profile link copied to clipboard!",
            Self::PrivateProfile => "Private profile link copied to clipboard!",
        }
    }
}

/// A secure-path write still in flight. The host drives the future and
/// hands its outcome back through [`CopyActions::settle`].
pub struct PendingCopy {
    pub id: CopyRequestId,
    pub future: BoxFuture<'static, ClipResult<()>>,
}

impl fmt::Debug for PendingCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCopy").field("id", &self.id).finish()
    }
}

#[derive(Debug)]
struct CopyIntent {
    target: CopyTarget,
    button: Option<NodeId>,
}

/// Saved look of a button in its "copied" state.
#[derive(Debug)]
struct Feedback {
    label: String,
    outline: Option<CompactString>,
    timer: TimerHandle,
}

#[derive(Debug, Default)]
pub struct CopyActions {
    next_id: u64,
    intents: HashMap<CopyRequestId, CopyIntent>,
    feedback: HashMap<NodeId, Feedback>,
}

impl CopyActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the link for `target`, triggered from `origin` (the clicked
    /// node, if any).
    ///
    /// Returns the in-flight write when the secure path is used. A legacy
    /// copy settles before this returns. A missing link input is a silent
    /// no-op.
    pub fn begin(
        &mut self,
        cx: &mut PageContext,
        toasts: &mut ToastManager,
        port: &ClipboardPort,
        target: CopyTarget,
        origin: Option<NodeId>,
    ) -> Option<PendingCopy> {
        let source_id = target.source_id();
        let Some(source) = cx.view.by_dom_id(&source_id) else {
            debug!("copy: no #{} on this page", source_id);
            return None;
        };
        let text = cx.view.value(source).unwrap_or_default().to_owned();
        let button = origin.and_then(|node| cx.view.closest(node, |el| el.tag == Tag::Button));

        self.next_id += 1;
        let id = CopyRequestId(self.next_id);
        self.intents.insert(id, CopyIntent { target, button });
        trace!("copy: {} started from #{}", id, source_id);

        match port.copy(&text, &mut cx.view) {
            CopyTicket::Settled(result) => {
                self.settle(cx, toasts, id, result);
                None
            }
            CopyTicket::Pending(future) => Some(PendingCopy { id, future }),
        }
    }

    /// Run the continuation for `id`. Returns false for an unknown or
    /// already settled request.
    pub fn settle(
        &mut self,
        cx: &mut PageContext,
        toasts: &mut ToastManager,
        id: CopyRequestId,
        result: ClipResult<()>,
    ) -> bool {
        let Some(intent) = self.intents.remove(&id) else {
            debug!("copy: duplicate settlement for {} ignored", id);
            return false;
        };

        match result {
            Ok(()) => {
                debug!("copy: {} succeeded", id);
                if let Some(button) = intent.button {
                    self.show_copied(cx, button);
                }
                toasts.notify(cx, intent.target.success_message(), Severity::Success);
            }
            Err(err) => {
                let path = if err.is_legacy_failure() { "fallback" } else { "secure" };
                error!("copy: {} failed on the {} path: {}", id, path, err.detail());
                toasts.notify(cx, COPY_FAILED_MESSAGE, Severity::Error);
            }
        }
        true
    }

    /// Requests whose continuation has not run yet.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.intents.len()
    }

    fn show_copied(&mut self, cx: &mut PageContext, button: NodeId) {
        let timer = cx
            .timers
            .schedule(cx.now, COPY_FEEDBACK, TimerKind::CopyFeedbackRevert(button));

        // a second copy while the first look is showing keeps the first
        // saved look and restarts the revert
        if let Some(active) = self.feedback.get_mut(&button) {
            cx.timers.cancel(active.timer);
            active.timer = timer;
            return;
        }

        let Some(el) = cx.view.get(button) else {
            cx.timers.cancel(timer);
            return;
        };
        let label = el.text.clone();
        let outline = el
            .classes
            .iter()
            .find(|c| c.starts_with("btn-outline-"))
            .cloned();

        if let Some(outline) = &outline {
            cx.view.remove_class(button, outline);
        }
        cx.view.add_class(button, "btn-success");
        cx.view.set_text(button, COPIED_LABEL);
        self.feedback.insert(
            button,
            Feedback {
                label,
                outline,
                timer,
            },
        );
    }

    /// Revert timer fired for `button`.
    pub fn revert_feedback(&mut self, cx: &mut PageContext, button: NodeId, fired: TimerHandle) {
        match self.feedback.get(&button) {
            Some(active) if active.timer == fired => {}
            _ => return,
        }
        let Some(saved) = self.feedback.remove(&button) else {
            return;
        };
        cx.view.set_text(button, saved.label);
        cx.view.remove_class(button, "btn-success");
        if let Some(outline) = &saved.outline {
            cx.view.add_class(button, outline);
        }
        trace!("copy: {} back to its normal look", button);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tree::{COPY_HOLDER_CLASS, Element, ViewTree};
    use clipport::{ClipError, MemoryClipboard, MemoryMode, SecureClipboard};
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    struct Harness {
        cx: PageContext,
        toasts: ToastManager,
        copies: CopyActions,
        clipboard: MemoryClipboard,
        button: NodeId,
        icon: NodeId,
    }

    fn harness() -> Harness {
        let mut view = ViewTree::new();
        let body = view.body();
        view.insert(
            body,
            Element::new(Tag::Input)
                .attr("id", "profileUrl42")
                .value("https://crew.example/p/42"),
        );
        view.insert(
            body,
            Element::new(Tag::Input)
                .attr("id", "privateProfileUrl")
                .value("https://crew.example/private/abc"),
        );
        let button = view.insert(
            body,
            Element::new(Tag::Button)
                .class("btn btn-sm btn-outline-secondary")
                .text("Copy"),
        );
        let icon = view.insert(button, Element::new(Tag::I).class("fas fa-copy"));
        Harness {
            cx: PageContext::new(view, Url::parse("https://crew.example/admin/crew/42").unwrap()),
            toasts: ToastManager::new("Maricheck"),
            copies: CopyActions::new(),
            clipboard: MemoryClipboard::default(),
            button,
            icon,
        }
    }

    fn profile() -> CopyTarget {
        CopyTarget::Profile {
            crew_id: Some("42".into()),
        }
    }

    impl Harness {
        fn legacy(&self) -> ClipboardPort {
            ClipboardPort::legacy_only(Arc::new(self.clipboard.clone()))
        }

        fn secure(&self) -> ClipboardPort {
            let backend = Arc::new(self.clipboard.clone());
            let secure: Arc<dyn SecureClipboard> = backend.clone();
            ClipboardPort::new(Some(secure), backend)
        }

        fn begin(&mut self, port: &ClipboardPort, target: CopyTarget) -> Option<PendingCopy> {
            let origin = Some(self.icon);
            self.copies
                .begin(&mut self.cx, &mut self.toasts, port, target, origin)
        }

        fn last_toast(&self) -> (Severity, String) {
            let entry = self.toasts.entries().last().unwrap();
            (entry.severity, entry.message.to_string())
        }

        fn button(&self) -> &Element {
            self.cx.view.get(self.button).unwrap()
        }
    }

    #[test]
    fn legacy_success_runs_continuation_inline() {
        let mut h = harness();
        let port = h.legacy();

        assert!(h.begin(&port, profile()).is_none());

        assert_eq!(h.clipboard.contents().as_deref(), Some("https://crew.example/p/42"));
        assert_eq!(
            h.last_toast(),
            (Severity::Success, "Profile link copied to clipboard!".to_owned())
        );
        assert_eq!(h.button().text, COPIED_LABEL);
        assert!(h.button().has_class("btn-success"));
        assert!(!h.button().has_class("btn-outline-secondary"));
        assert!(h.cx.view.query_first(|el| el.has_class(COPY_HOLDER_CLASS)).is_none());
        assert_eq!(h.copies.in_flight(), 0);
    }

    #[test]
    fn legacy_failure_shows_error_and_leaves_button() {
        let mut h = harness();
        h.clipboard.set_mode(MemoryMode::Raise("boom".into()));
        let port = h.legacy();

        h.begin(&port, CopyTarget::PrivateProfile);

        assert_eq!(h.last_toast(), (Severity::Error, COPY_FAILED_MESSAGE.to_owned()));
        assert_eq!(h.button().text, "Copy");
        assert!(h.cx.view.query_first(|el| el.has_class(COPY_HOLDER_CLASS)).is_none());
    }

    #[tokio::test]
    async fn secure_path_settles_once() {
        let mut h = harness();
        let port = h.secure();

        let pending = h.begin(&port, CopyTarget::PrivateProfile).unwrap();
        assert!(h.toasts.is_empty());
        assert_eq!(h.copies.in_flight(), 1);

        let result = pending.future.await;
        assert!(h.copies.settle(&mut h.cx, &mut h.toasts, pending.id, result));
        assert!(!h.copies.settle(
            &mut h.cx,
            &mut h.toasts,
            pending.id,
            Err(ClipError::rejected("late"))
        ));

        assert_eq!(h.toasts.len(), 1);
        assert_eq!(
            h.last_toast(),
            (Severity::Success, "Private profile link copied to clipboard!".to_owned())
        );
        assert_eq!(
            h.clipboard.contents().as_deref(),
            Some("https://crew.example/private/abc")
        );
    }

    #[tokio::test]
    async fn secure_rejection_is_surfaced() {
        let mut h = harness();
        h.clipboard.set_mode(MemoryMode::Reject("denied".into()));
        let port = h.secure();

        let pending = h.begin(&port, profile()).unwrap();
        let result = pending.future.await;
        h.copies.settle(&mut h.cx, &mut h.toasts, pending.id, result);

        assert_eq!(h.last_toast(), (Severity::Error, COPY_FAILED_MESSAGE.to_owned()));
    }

    #[test]
    fn missing_source_is_silent() {
        let mut h = harness();
        let port = h.legacy();
        let target = CopyTarget::Profile {
            crew_id: Some("7".into()),
        };
        assert!(h.begin(&port, target).is_none());
        assert!(h.toasts.is_empty());
        assert_eq!(h.copies.in_flight(), 0);
        assert!(h.clipboard.contents().is_none());
    }

    #[test]
    fn feedback_reverts_after_delay() {
        let mut h = harness();
        let port = h.legacy();
        let t0 = h.cx.now;
        h.begin(&port, profile());

        // second copy one second later restarts the revert
        h.cx.now = t0 + Duration::from_secs(1);
        h.begin(&port, profile());
        assert_eq!(h.button().text, COPIED_LABEL);

        let mut fired = Vec::new();
        while let Some(timer) = h.cx.timers.pop_due(t0 + Duration::from_secs(3)) {
            fired.push(timer);
        }
        let revert: Vec<_> = fired
            .iter()
            .filter(|t| matches!(t.kind, TimerKind::CopyFeedbackRevert(_)))
            .collect();
        assert_eq!(revert.len(), 1);
        assert_eq!(revert[0].deadline, t0 + Duration::from_secs(3));

        h.copies.revert_feedback(&mut h.cx, h.button, revert[0].handle);
        assert_eq!(h.button().text, "Copy");
        assert!(h.button().has_class("btn-outline-secondary"));
        assert!(!h.button().has_class("btn-success"));
    }

    #[test]
    fn source_id_without_crew_id() {
        let target = CopyTarget::Profile { crew_id: None };
        assert_eq!(target.source_id(), "profileUrl");
        assert_eq!(CopyTarget::PrivateProfile.source_id(), "privateProfileUrl");
    }
}
