//! src/controller/page.rs
//! ============================================================================
//! # Page: event dispatcher for one loaded page
//!
//! Owns the page context and every behavior bound to it. Events, due timers
//! and clipboard settlements each run to completion before the caller can
//! deliver the next one; the effects they produced are returned in order.
//!
//! Secure-path clipboard writes are not driven here. They are parked in an
//! outbox ([`Page::take_pending_copies`]) for the event loop to run, and
//! their outcome comes back through [`Page::settle_copy`].

use clipport::{ClipResult, ClipboardPort};
use compact_str::CompactString;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::config::{ALERT_AUTO_HIDE, Config, ExportConfig, UploadConfig};
use crate::controller::bulk_selection::BulkSelection;
use crate::controller::context::PageContext;
use crate::controller::copy_actions::{CopyActions, CopyRequestId, CopyTarget, PendingCopy};
use crate::controller::events::{PageEffect, PageEvent};
use crate::controller::form_guard::SubmitGuard;
use crate::controller::keyboard::{handle_key, is_search_input};
use crate::controller::navigation::{
    badge_status, export_url, form_submission_url, resolve, row_href, status_filter_url,
};
use crate::controller::search_submit::SearchSubmitController;
use crate::controller::toast_manager::ToastManager;
use crate::controller::upload::{show_file_preview, validate_upload};
use crate::error::{AppError, AppResult};
use crate::model::toast::ToastId;
use crate::util::timer::{FiredTimer, TimerKind};
use crate::view::tree::{Element, NodeId, SelectedFile, ViewTree};

/// Class of server-rendered alerts that close themselves.
pub const DISMISSIBLE_ALERT_CLASS: &str = "alert-dismissible";

#[derive(Debug)]
pub struct Page {
    cx: PageContext,
    toasts: ToastManager,
    searches: Vec<SearchSubmitController>,
    selections: Vec<BulkSelection>,
    copies: CopyActions,
    guard: SubmitGuard,
    clipboard: ClipboardPort,
    upload: UploadConfig,
    export: ExportConfig,
    outbox: Vec<PendingCopy>,
    loaded: bool,
}

impl Page {
    pub fn new(view: ViewTree, location: Url, clipboard: ClipboardPort, config: &Config) -> Self {
        Self {
            cx: PageContext::new(view, location),
            toasts: ToastManager::new(config.page.brand.clone()),
            searches: Vec::new(),
            selections: Vec::new(),
            copies: CopyActions::new(),
            guard: SubmitGuard::new(),
            clipboard,
            upload: config.upload.clone(),
            export: config.export.clone(),
            outbox: Vec::new(),
            loaded: false,
        }
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Run one event to completion.
    ///
    /// Missing targets and stale nodes are swallowed here. Any other
    /// error is returned for the caller to log; effects produced before it
    /// stay queued and come out with the next call.
    pub fn handle(&mut self, now: Instant, event: PageEvent) -> AppResult<Vec<PageEffect>> {
        self.advance(now);
        trace!("page: handling {:?}", event);
        match self.dispatch(event) {
            Ok(()) => {}
            Err(err) if err.is_silent() => debug!("page: behavior absent: {}", err),
            Err(err) => return Err(err),
        }
        Ok(self.cx.take_effects())
    }

    /// Fire every timer due at `now`, earliest first.
    pub fn fire_timers(&mut self, now: Instant) -> Vec<PageEffect> {
        self.advance(now);
        while let Some(fired) = self.cx.timers.pop_due(now) {
            // work scheduled from a callback is relative to its own deadline
            self.cx.now = fired.deadline;
            if let Err(err) = self.on_timer(fired) {
                if err.is_silent() {
                    debug!("page: timer {:?}: {}", fired.kind, err);
                } else {
                    warn!("page: timer {:?} failed: {}", fired.kind, err);
                }
            }
        }
        self.cx.now = now;
        self.cx.take_effects()
    }

    /// Deliver the outcome of a secure clipboard write.
    pub fn settle_copy(
        &mut self,
        now: Instant,
        id: CopyRequestId,
        result: ClipResult<()>,
    ) -> Vec<PageEffect> {
        self.advance(now);
        self.copies
            .settle(&mut self.cx, &mut self.toasts, id, result);
        self.cx.take_effects()
    }

    /// Show a toast on behalf of an outside caller.
    pub fn notify(&mut self, now: Instant, message: &str, severity: &str) -> ToastId {
        self.advance(now);
        self.toasts.notify_named(&mut self.cx, message, severity)
    }

    pub fn dismiss_toast(&mut self, id: ToastId) -> bool {
        self.toasts.dismiss(&mut self.cx, id)
    }

    /// Secure-path writes started since the last call.
    pub fn take_pending_copies(&mut self) -> Vec<PendingCopy> {
        std::mem::take(&mut self.outbox)
    }

    #[inline]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.cx.timers.next_deadline()
    }

    /// No timers pending and no copy waiting for its outcome.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.cx.timers.is_empty() && self.copies.in_flight() == 0 && self.outbox.is_empty()
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[inline]
    pub fn view(&self) -> &ViewTree {
        &self.cx.view
    }

    #[inline]
    pub fn context(&self) -> &PageContext {
        &self.cx
    }

    #[inline]
    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    #[inline]
    pub fn selections(&self) -> &[BulkSelection] {
        &self.selections
    }

    #[inline]
    pub fn searches(&self) -> &[SearchSubmitController] {
        &self.searches
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    fn advance(&mut self, now: Instant) {
        self.cx.now = self.cx.now.max(now);
    }

    fn dispatch(&mut self, event: PageEvent) -> AppResult<()> {
        match event {
            PageEvent::Loaded => {
                self.on_load();
                Ok(())
            }
            PageEvent::Input { target, value } => self.on_input(target, value),
            PageEvent::Change { target, checked } => self.on_change(target, checked),
            PageEvent::FileChosen { target, file } => self.on_file_chosen(target, file),
            PageEvent::Click { target } => self.on_click(target),
            PageEvent::Submit { form } => self.on_submit(form),
            PageEvent::Key(key) => {
                handle_key(&mut self.cx, &key);
                Ok(())
            }
        }
    }

    /// Bind every behavior to the markup. A second load is ignored.
    fn on_load(&mut self) {
        if self.loaded {
            debug!("page: already loaded");
            return;
        }
        self.loaded = true;

        self.searches = self
            .cx
            .view
            .query_all(is_search_input)
            .into_iter()
            .map(SearchSubmitController::bind)
            .collect();
        self.selections = BulkSelection::bind_all(&mut self.cx.view);

        let alerts = self
            .cx
            .view
            .query_all(|el| el.has_class(DISMISSIBLE_ALERT_CLASS));
        for alert in &alerts {
            self.cx
                .timers
                .schedule(self.cx.now, ALERT_AUTO_HIDE, TimerKind::AlertClose(*alert));
        }

        info!(
            "page: loaded {} ({} search field(s), {} selectable table(s), {} alert(s), clipboard {:?})",
            self.cx.location,
            self.searches.len(),
            self.selections.len(),
            alerts.len(),
            self.clipboard.strategy()
        );
    }

    fn live(&self, target: NodeId) -> AppResult<()> {
        if self.cx.view.contains(target) {
            Ok(())
        } else {
            Err(AppError::StaleNode(target))
        }
    }

    fn on_input(&mut self, target: NodeId, value: String) -> AppResult<()> {
        self.live(target)?;
        self.cx.view.set_value(target, value.as_str());
        if let Some(search) = self.searches.iter_mut().find(|s| s.input() == target) {
            search.on_input(&mut self.cx, &value);
        }
        Ok(())
    }

    fn on_change(&mut self, target: NodeId, checked: bool) -> AppResult<()> {
        self.live(target)?;
        self.cx.view.set_checked(target, checked);
        if let Some(selection) = self.selections.iter_mut().find(|s| s.owns(target)) {
            selection.on_change(&mut self.cx.view, target, checked);
        }
        Ok(())
    }

    fn on_file_chosen(&mut self, target: NodeId, file: Option<SelectedFile>) -> AppResult<()> {
        self.live(target)?;
        self.cx.view.set_file(target, file);
        if validate_upload(&mut self.cx, &mut self.toasts, target, &self.upload) {
            show_file_preview(&mut self.cx.view, target);
        }
        Ok(())
    }

    fn on_click(&mut self, target: NodeId) -> AppResult<()> {
        self.live(target)?;
        let view = &self.cx.view;

        if view
            .closest(target, |el| {
                el.has_class("btn-close") && el.data("bs-dismiss") == Some("toast")
            })
            .is_some()
        {
            self.toasts.dismiss_by_node(&mut self.cx, target);
            return Ok(());
        }

        if let Some(action) = view.closest(target, |el| el.data("copy").is_some()) {
            return self.on_copy_click(action, target);
        }

        if let Some(trigger) = view.closest(target, |el| el.data("export").is_some()) {
            let url = self.export_target(trigger)?;
            self.navigate(url);
            return Ok(());
        }

        if let Some(status) = badge_status(view, target) {
            let url = status_filter_url(&self.cx.location, status);
            self.navigate(url.into());
            return Ok(());
        }

        if let Some(href) = row_href(view, target) {
            let url = resolve(&self.cx.location, href)?;
            self.navigate(url.into());
        }
        Ok(())
    }

    fn on_copy_click(&mut self, action: NodeId, origin: NodeId) -> AppResult<()> {
        let el = self
            .cx
            .view
            .get(action)
            .ok_or(AppError::StaleNode(action))?;
        let target = match el.data("copy") {
            Some("private") => CopyTarget::PrivateProfile,
            Some("profile") => CopyTarget::Profile {
                crew_id: el.data("crew-id").map(CompactString::from),
            },
            other => {
                debug!("page: unknown copy action {:?}", other);
                return Ok(());
            }
        };

        let pending = self.copies.begin(
            &mut self.cx,
            &mut self.toasts,
            &self.clipboard,
            target,
            Some(origin),
        );
        self.outbox.extend(pending);
        Ok(())
    }

    /// Export link for a `[data-export=<kind>]` trigger, carrying the rows
    /// selected in the table named by `data-table` (else the first table).
    fn export_target(&self, trigger: NodeId) -> AppResult<String> {
        let el = self
            .cx
            .view
            .get(trigger)
            .ok_or(AppError::StaleNode(trigger))?;
        let kind = el.data("export").unwrap_or_default();
        let format = el.data("format").unwrap_or_default();

        let selection = match el.data("table") {
            Some(dom_id) => self.selections.iter().find(|s| {
                self.cx
                    .view
                    .get(s.table())
                    .is_some_and(|t| t.dom_id() == Some(dom_id))
            }),
            None => self.selections.first(),
        };
        let ids = selection.map(BulkSelection::selected_ids).unwrap_or_default();
        Ok(export_url(&self.export.base_path, kind, format, &ids))
    }

    fn on_submit(&mut self, form: NodeId) -> AppResult<()> {
        self.live(form)?;
        let file_inputs = self.cx.view.query_all_within(form, Element::is_file_input);
        for input in file_inputs {
            if !validate_upload(&mut self.cx, &mut self.toasts, input, &self.upload) {
                debug!("page: submit of {} prevented by upload check", form);
                self.cx.emit(PageEffect::PreventDefault);
                return Ok(());
            }
        }

        self.guard.on_submit(&mut self.cx, form);
        let url = form_submission_url(&self.cx.view, form, &self.cx.location)?;
        self.cx.emit(PageEffect::SubmitForm {
            form,
            url: url.into(),
        });
        Ok(())
    }

    fn navigate(&mut self, url: String) {
        debug!("page: navigate to {}", url);
        self.cx.emit(PageEffect::Navigate { url });
    }

    fn on_timer(&mut self, fired: FiredTimer) -> AppResult<()> {
        match fired.kind {
            TimerKind::ToastExpiry(id) => self.toasts.expire(&mut self.cx, id),
            TimerKind::SearchDebounce(input) => {
                let search = self
                    .searches
                    .iter_mut()
                    .find(|s| s.input() == input)
                    .ok_or_else(|| AppError::missing_target("search input"))?;
                search.on_timer(&mut self.cx, fired.handle)?;
            }
            TimerKind::AlertClose(alert) => {
                if self.cx.view.remove(alert) {
                    debug!("page: alert {} closed", alert);
                }
            }
            TimerKind::SubmitReenable(button) => {
                self.guard.restore(&mut self.cx, button, fired.handle);
            }
            TimerKind::CopyFeedbackRevert(button) => {
                self.copies.revert_feedback(&mut self.cx, button, fired.handle);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SEARCH_DEBOUNCE, TOAST_DISPLAY};
    use crate::controller::events::KeyPress;
    use crate::model::toast::Severity;
    use crate::view::fixture::PageFixture;
    use clipport::{MemoryClipboard, MemoryMode};
    use std::sync::Arc;
    use std::time::Duration;

    const PAGE: &str = r#"{
        "url": "https://crew.example/admin/crew?page=2",
        "body": [
            { "tag": "div", "id": "flash", "class": "alert alert-success alert-dismissible", "text": "Saved" },
            { "tag": "form", "id": "searchForm", "attrs": { "action": "/admin/crew" }, "children": [
                { "tag": "input", "id": "q", "attrs": { "name": "search" } }
            ] },
            { "tag": "button", "id": "bulkDelete", "class": "btn bulk-action-btn" },
            { "tag": "button", "id": "exportCsv", "attrs": { "data-export": "crew", "data-format": "csv" } },
            { "tag": "span", "id": "badgeActive", "class": "badge bg-success", "attrs": { "data-status": "active" } },
            { "tag": "table", "id": "crewTable", "children": [
                { "tag": "thead", "children": [ { "tag": "tr", "children": [ { "tag": "th", "children": [
                    { "tag": "input", "id": "selectAll", "attrs": { "type": "checkbox" } } ] } ] } ] },
                { "tag": "tbody", "children": [
                    { "tag": "tr", "id": "row7", "attrs": { "data-href": "/admin/crew/7" }, "children": [
                        { "tag": "td", "children": [
                            { "tag": "input", "id": "cb7", "attrs": { "type": "checkbox" }, "value": "7" } ] },
                        { "tag": "td", "id": "name7", "text": "Anna" },
                        { "tag": "td", "children": [
                            { "tag": "button", "id": "copy7", "class": "btn btn-outline-secondary",
                              "attrs": { "data-copy": "profile", "data-crew-id": "7" }, "text": "Copy" },
                            { "tag": "input", "id": "profileUrl7", "value": "https://crew.example/p/7" } ] }
                    ] },
                    { "tag": "tr", "id": "row9", "children": [
                        { "tag": "td", "children": [
                            { "tag": "input", "id": "cb9", "attrs": { "type": "checkbox" }, "value": "9" } ] } ] }
                ] }
            ] },
            { "tag": "form", "id": "uploadForm", "attrs": { "method": "post", "action": "/admin/crew/7/documents" }, "children": [
                { "tag": "div", "class": "form-group", "children": [
                    { "tag": "label", "class": "form-label", "text": "Passport" },
                    { "tag": "input", "id": "passport", "attrs": { "type": "file", "name": "passport" } } ] },
                { "tag": "button", "id": "uploadBtn", "attrs": { "type": "submit" }, "text": "Upload" }
            ] }
        ]
    }"#;

    const MB: u64 = 1024 * 1024;

    struct Harness {
        page: Page,
        clipboard: MemoryClipboard,
        t0: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let fixture = PageFixture::from_json(PAGE).unwrap();
            let clipboard = MemoryClipboard::default();
            let port = ClipboardPort::legacy_only(Arc::new(clipboard.clone()));
            let mut page = Page::new(
                fixture.build(),
                fixture.location().unwrap(),
                port,
                &Config::default(),
            );
            let t0 = page.context().now;
            page.handle(t0, PageEvent::Loaded).unwrap();
            Self {
                page,
                clipboard,
                t0,
            }
        }

        fn node(&self, dom_id: &str) -> NodeId {
            self.page.view().by_dom_id(dom_id).unwrap()
        }

        fn el(&self, dom_id: &str) -> &Element {
            self.page.view().get(self.node(dom_id)).unwrap()
        }

        fn at(&self, ms: u64) -> Instant {
            self.t0 + Duration::from_millis(ms)
        }

        fn send(&mut self, ms: u64, event: PageEvent) -> Vec<PageEffect> {
            let mut effects = self.page.fire_timers(self.at(ms));
            effects.extend(self.page.handle(self.at(ms), event).unwrap());
            effects
        }

        fn click(&mut self, ms: u64, dom_id: &str) -> Vec<PageEffect> {
            let target = self.node(dom_id);
            self.send(ms, PageEvent::Click { target })
        }

        fn change(&mut self, ms: u64, dom_id: &str, checked: bool) -> Vec<PageEffect> {
            let target = self.node(dom_id);
            self.send(ms, PageEvent::Change { target, checked })
        }
    }

    fn navigate(url: &str) -> PageEffect {
        PageEffect::Navigate {
            url: url.to_owned(),
        }
    }

    #[test]
    fn load_binds_behaviors() {
        let h = Harness::new();
        assert_eq!(h.page.searches().len(), 1);
        assert_eq!(h.page.selections().len(), 1);
        assert_eq!(h.page.selections()[0].machine().total_rows(), 2);
        assert!(h.el("bulkDelete").disabled);
        // alert close timer
        assert_eq!(h.page.next_deadline(), Some(h.at(5000)));
    }

    #[test]
    fn second_load_does_not_rebind() {
        let mut h = Harness::new();
        h.send(10, PageEvent::Loaded);
        assert_eq!(h.page.context().timers.len(), 1);
    }

    #[test]
    fn alert_closes_after_delay() {
        let mut h = Harness::new();
        h.page.fire_timers(h.at(4999));
        assert!(h.page.view().by_dom_id("flash").is_some());
        h.page.fire_timers(h.at(5000));
        assert!(h.page.view().by_dom_id("flash").is_none());
    }

    #[test]
    fn search_input_debounces_to_submit() {
        let mut h = Harness::new();
        let q = h.node("q");
        h.send(0, PageEvent::Input { target: q, value: "ann".into() });
        h.send(300, PageEvent::Input { target: q, value: "anna".into() });

        let debounce = SEARCH_DEBOUNCE.as_millis() as u64;
        assert!(h.page.fire_timers(h.at(300 + debounce - 1)).is_empty());
        let effects = h.page.fire_timers(h.at(300 + debounce));
        assert_eq!(
            effects,
            vec![PageEffect::SubmitForm {
                form: h.node("searchForm"),
                url: "https://crew.example/admin/crew?search=anna".to_owned(),
            }]
        );
    }

    #[test]
    fn selection_export_and_bulk_buttons() {
        let mut h = Harness::new();
        assert_eq!(
            h.click(0, "exportCsv"),
            vec![navigate("/admin/crew/export?format=csv")]
        );

        h.change(10, "cb9", true);
        assert!(!h.el("bulkDelete").disabled);
        assert!(!h.el("selectAll").checked);

        h.change(20, "selectAll", true);
        assert!(h.el("cb7").checked);
        assert!(h.el("row7").has_class("table-active"));
        assert_eq!(
            h.click(30, "exportCsv"),
            vec![navigate("/admin/crew/export?format=csv&ids=7,9")]
        );

        h.change(40, "selectAll", false);
        assert!(h.el("bulkDelete").disabled);
        assert!(!h.el("cb9").checked);
    }

    #[test]
    fn badge_and_row_navigation() {
        let mut h = Harness::new();
        assert_eq!(
            h.click(0, "badgeActive"),
            vec![navigate("https://crew.example/admin/crew?page=2&status=active")]
        );
        assert_eq!(
            h.click(10, "name7"),
            vec![navigate("https://crew.example/admin/crew/7")]
        );
        // checkbox inside the row does not navigate
        assert!(h.click(20, "cb7").is_empty());
    }

    #[test]
    fn copy_button_uses_legacy_clipboard() {
        let mut h = Harness::new();
        assert!(h.click(0, "copy7").is_empty());

        assert_eq!(h.clipboard.contents().as_deref(), Some("https://crew.example/p/7"));
        let toast = h.page.toasts().entries().next().unwrap();
        assert_eq!(toast.severity, Severity::Success);
        assert_eq!(h.el("copy7").text, "Copied!");
        assert!(h.page.take_pending_copies().is_empty());

        h.page.fire_timers(h.at(2000));
        assert_eq!(h.el("copy7").text, "Copy");
        assert!(h.el("copy7").has_class("btn-outline-secondary"));
    }

    #[test]
    fn copy_failure_shows_error_toast() {
        let mut h = Harness::new();
        h.clipboard.set_mode(MemoryMode::Refuse);
        h.click(0, "copy7");

        let toast = h.page.toasts().entries().next().unwrap();
        assert_eq!(toast.severity, Severity::Error);
        assert_eq!(toast.message, "Failed to copy link. Please try again.");
        assert_eq!(h.el("copy7").text, "Copy");
    }

    #[test]
    fn toast_close_button_dismisses() {
        let mut h = Harness::new();
        let id = h.page.notify(h.at(0), "Heads up", "warning");
        let close = h
            .page
            .view()
            .query_first(|el| el.has_class("btn-close"))
            .unwrap();
        h.send(10, PageEvent::Click { target: close });
        assert!(!h.page.toasts().contains(id));
        assert!(!h.page.dismiss_toast(id));
    }

    #[test]
    fn toast_expires_with_page_timers() {
        let mut h = Harness::new();
        let id = h.page.notify(h.at(100), "Saved", "success");
        h.page.fire_timers(h.at(100) + TOAST_DISPLAY - Duration::from_millis(1));
        assert!(h.page.toasts().contains(id));
        h.page.fire_timers(h.at(100) + TOAST_DISPLAY);
        assert!(!h.page.toasts().contains(id));
    }

    #[test]
    fn oversized_upload_is_rejected_on_choice_and_submit() {
        let mut h = Harness::new();
        let passport = h.node("passport");
        h.send(
            0,
            PageEvent::FileChosen {
                target: passport,
                file: Some(SelectedFile {
                    name: "passport.pdf".into(),
                    size: 16 * MB + 1,
                }),
            },
        );
        assert_eq!(h.el("passport").value, "");
        assert_eq!(h.page.toasts().len(), 1);

        // the browser-side value is forced back in; submit checks again
        h.page.cx.view.set_file(
            passport,
            Some(SelectedFile {
                name: "passport.pdf".into(),
                size: 17 * MB,
            }),
        );
        let form = h.node("uploadForm");
        let effects = h.send(10, PageEvent::Submit { form });
        assert_eq!(effects, vec![PageEffect::PreventDefault]);
        assert!(!h.el("uploadBtn").disabled);
    }

    #[test]
    fn disallowed_file_type_is_rejected_without_preview() {
        let mut h = Harness::new();
        let passport = h.node("passport");
        h.send(
            0,
            PageEvent::FileChosen {
                target: passport,
                file: Some(SelectedFile {
                    name: "passport.exe".into(),
                    size: MB,
                }),
            },
        );

        assert!(h.el("passport").file.is_none());
        assert!(h.page.view().query_first(|el| el.has_class("file-info")).is_none());
        let toast = h.page.toasts().entries().next().unwrap();
        assert_eq!(toast.severity, Severity::Error);
        assert!(toast.message.starts_with("File type not allowed."));
    }

    #[test]
    fn valid_upload_previews_and_submits_with_guard() {
        let mut h = Harness::new();
        let passport = h.node("passport");
        h.send(
            0,
            PageEvent::FileChosen {
                target: passport,
                file: Some(SelectedFile {
                    name: "passport.pdf".into(),
                    size: 16 * MB,
                }),
            },
        );
        let preview = h
            .page
            .view()
            .query_first(|el| el.has_class("file-info"))
            .unwrap();
        assert_eq!(
            h.page.view().get(preview).unwrap().text,
            "Selected: passport.pdf (16.00 MB)"
        );

        let form = h.node("uploadForm");
        let effects = h.send(100, PageEvent::Submit { form });
        assert_eq!(
            effects,
            vec![PageEffect::SubmitForm {
                form,
                url: "https://crew.example/admin/crew/7/documents".to_owned(),
            }]
        );
        assert!(h.el("uploadBtn").disabled);
        assert_eq!(h.el("uploadBtn").text, "Processing...");

        h.page.fire_timers(h.at(10_100));
        assert!(!h.el("uploadBtn").disabled);
        assert_eq!(h.el("uploadBtn").text, "Upload");
    }

    #[test]
    fn shortcuts_focus_and_clear_search() {
        let mut h = Harness::new();
        let q = h.node("q");
        let effects = h.send(0, PageEvent::Key(KeyPress::ctrl("k")));
        assert_eq!(
            effects,
            vec![PageEffect::PreventDefault, PageEffect::Focus { node: q }]
        );

        h.send(10, PageEvent::Input { target: q, value: "anna".into() });
        h.send(20, PageEvent::Key(KeyPress::plain("Escape")));
        assert_eq!(h.el("q").value, "");

        // the pending debounce reads the cleared field and submits it
        let effects = h.page.fire_timers(h.at(510));
        assert!(matches!(
            &effects[..],
            [PageEffect::SubmitForm { url, .. }] if url == "https://crew.example/admin/crew?search="
        ));
    }

    #[test]
    fn stale_target_is_silent() {
        let mut h = Harness::new();
        let flash = h.node("flash");
        h.page.fire_timers(h.at(5000));
        let effects = h.page.handle(h.at(5001), PageEvent::Click { target: flash });
        assert!(effects.unwrap().is_empty());
    }
}
