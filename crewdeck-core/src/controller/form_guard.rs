//! "Processing..." state for submit buttons.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::SUBMIT_REENABLE;
use crate::controller::context::PageContext;
use crate::util::timer::{TimerHandle, TimerKind};
use crate::view::tree::{Element, NodeId, Tag};

pub const PROCESSING_LABEL: &str = "Processing...";

#[derive(Debug)]
struct Saved {
    label: String,
    timer: TimerHandle,
}

/// Disables a form's submit button while its submission is in flight and
/// gives it back after [`SUBMIT_REENABLE`] in case the page never unloads.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    saved: HashMap<NodeId, Saved>,
}

/// Buttons show their label as text, `input[type=submit]` as its value.
fn label_of(el: &Element) -> &str {
    if el.tag == Tag::Button {
        &el.text
    } else {
        &el.value
    }
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form submitted. Returns the button put into processing state, if the
    /// form has one.
    pub fn on_submit(&mut self, cx: &mut PageContext, form: NodeId) -> Option<NodeId> {
        let button = cx.view.query_first_within(form, Element::is_submit_control)?;
        let label = label_of(cx.view.get(button)?).to_owned();
        let timer = cx
            .timers
            .schedule(cx.now, SUBMIT_REENABLE, TimerKind::SubmitReenable(button));

        match self.saved.get_mut(&button) {
            // resubmitted while processing: keep the real label
            Some(saved) => {
                cx.timers.cancel(saved.timer);
                saved.timer = timer;
            }
            None => {
                self.saved.insert(button, Saved { label, timer });
            }
        }

        set_label(cx, button, PROCESSING_LABEL.to_owned());
        cx.view.set_disabled(button, true);
        debug!("submit: {} processing", button);
        Some(button)
    }

    /// Re-enable timer fired.
    pub fn restore(&mut self, cx: &mut PageContext, button: NodeId, fired: TimerHandle) {
        match self.saved.get(&button) {
            Some(saved) if saved.timer == fired => {}
            _ => return,
        }
        if let Some(saved) = self.saved.remove(&button) {
            set_label(cx, button, saved.label);
            cx.view.set_disabled(button, false);
            trace!("submit: {} restored", button);
        }
    }

    #[inline]
    pub fn is_processing(&self, button: NodeId) -> bool {
        self.saved.contains_key(&button)
    }
}

fn set_label(cx: &mut PageContext, button: NodeId, label: String) {
    let is_button = cx.view.get(button).is_some_and(|el| el.tag == Tag::Button);
    if is_button {
        cx.view.set_text(button, label);
    } else {
        cx.view.set_value(button, label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tree::ViewTree;
    use std::time::Duration;
    use url::Url;

    fn form(submit: Element) -> (PageContext, NodeId, NodeId) {
        let mut view = ViewTree::new();
        let form = view.insert(view.body(), Element::new(Tag::Form));
        view.insert(
            form,
            Element::new(Tag::Button).attr("type", "button").text("Cancel"),
        );
        let button = view.insert(form, submit);
        let cx = PageContext::new(view, Url::parse("https://crew.example/apply").unwrap());
        (cx, form, button)
    }

    fn fire(cx: &mut PageContext, guard: &mut SubmitGuard, at: Duration) {
        let deadline = cx.now + at;
        while let Some(t) = cx.timers.pop_due(deadline) {
            if let TimerKind::SubmitReenable(button) = t.kind {
                guard.restore(cx, button, t.handle);
            }
        }
    }

    #[test]
    fn button_processing_then_restored() {
        let (mut cx, form, button) = form(
            Element::new(Tag::Button).attr("type", "submit").text("Save crew"),
        );
        let mut guard = SubmitGuard::new();

        assert_eq!(guard.on_submit(&mut cx, form), Some(button));
        let el = cx.view.get(button).unwrap();
        assert_eq!(el.text, PROCESSING_LABEL);
        assert!(el.disabled);

        fire(&mut cx, &mut guard, SUBMIT_REENABLE - Duration::from_millis(1));
        assert!(guard.is_processing(button));

        fire(&mut cx, &mut guard, SUBMIT_REENABLE);
        let el = cx.view.get(button).unwrap();
        assert_eq!(el.text, "Save crew");
        assert!(!el.disabled);
        assert!(!guard.is_processing(button));
    }

    #[test]
    fn input_submit_uses_value() {
        let (mut cx, form, button) = form(
            Element::new(Tag::Input).attr("type", "submit").value("Upload"),
        );
        let mut guard = SubmitGuard::new();
        guard.on_submit(&mut cx, form);
        assert_eq!(cx.view.value(button), Some(PROCESSING_LABEL));

        fire(&mut cx, &mut guard, SUBMIT_REENABLE);
        assert_eq!(cx.view.value(button), Some("Upload"));
    }

    #[test]
    fn double_submit_keeps_original_label() {
        let (mut cx, form, button) = form(
            Element::new(Tag::Button).attr("type", "submit").text("Send"),
        );
        let mut guard = SubmitGuard::new();
        guard.on_submit(&mut cx, form);
        guard.on_submit(&mut cx, form);
        assert_eq!(cx.timers.len(), 1);

        fire(&mut cx, &mut guard, SUBMIT_REENABLE);
        assert_eq!(cx.view.get(button).unwrap().text, "Send");
    }

    #[test]
    fn button_without_explicit_type_is_left_alone() {
        let (mut cx, form, button) = form(Element::new(Tag::Button).text("Send"));
        let mut guard = SubmitGuard::new();

        assert_eq!(guard.on_submit(&mut cx, form), None);
        let el = cx.view.get(button).unwrap();
        assert_eq!(el.text, "Send");
        assert!(!el.disabled);
        assert!(cx.timers.is_empty());
    }

    #[test]
    fn form_without_submit_control() {
        let mut view = ViewTree::new();
        let form = view.insert(view.body(), Element::new(Tag::Form));
        let mut cx = PageContext::new(view, Url::parse("https://crew.example/").unwrap());
        assert_eq!(SubmitGuard::new().on_submit(&mut cx, form), None);
        assert!(cx.timers.is_empty());
    }
}
