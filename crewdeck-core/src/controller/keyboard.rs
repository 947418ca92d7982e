//! Page-wide keyboard shortcuts for the search field.

use tracing::debug;

use crate::controller::context::PageContext;
use crate::controller::events::{KeyPress, PageEffect};
use crate::view::tree::{Element, NodeId, Tag};

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl/Cmd+K moved focus to the search field.
    FocusSearch(NodeId),
    /// Escape cleared and blurred the focused search field.
    ClearSearch(NodeId),
}

pub fn is_search_input(el: &Element) -> bool {
    el.tag == Tag::Input && el.name() == Some("search")
}

/// Apply the shortcuts to one key press.
///
/// Clearing the field with Escape is not an input event, so it schedules no
/// search; a submission already pending reads the cleared value when it
/// fires.
pub fn handle_key(cx: &mut PageContext, key: &KeyPress) -> Option<Shortcut> {
    if key.has_command_modifier() && key.key == "k" {
        cx.emit(PageEffect::PreventDefault);
        let search = cx.view.query_first(is_search_input)?;
        if cx.view.focus(search) {
            cx.emit(PageEffect::Focus { node: search });
            debug!("shortcut: focus search {}", search);
            return Some(Shortcut::FocusSearch(search));
        }
        return None;
    }

    if key.key == "Escape" {
        let search = cx.view.query_first(is_search_input)?;
        if cx.view.focused() != Some(search) {
            return None;
        }
        cx.view.set_value(search, "");
        cx.view.blur(search);
        cx.emit(PageEffect::Blur { node: search });
        debug!("shortcut: cleared search {}", search);
        return Some(Shortcut::ClearSearch(search));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tree::ViewTree;
    use url::Url;

    fn page() -> (PageContext, NodeId) {
        let mut view = ViewTree::new();
        let form = view.insert(view.body(), Element::new(Tag::Form));
        let search = view.insert(
            form,
            Element::new(Tag::Input).attr("name", "search").value("anna"),
        );
        let cx = PageContext::new(view, Url::parse("https://crew.example/admin/crew").unwrap());
        (cx, search)
    }

    #[test]
    fn ctrl_k_focuses_search() {
        let (mut cx, search) = page();
        assert_eq!(
            handle_key(&mut cx, &KeyPress::ctrl("k")),
            Some(Shortcut::FocusSearch(search))
        );
        assert_eq!(cx.view.focused(), Some(search));
        assert_eq!(
            cx.take_effects(),
            vec![PageEffect::PreventDefault, PageEffect::Focus { node: search }]
        );
    }

    #[test]
    fn cmd_k_works_too() {
        let (mut cx, search) = page();
        let key = KeyPress {
            meta: true,
            ..KeyPress::plain("k")
        };
        assert_eq!(handle_key(&mut cx, &key), Some(Shortcut::FocusSearch(search)));
    }

    #[test]
    fn plain_k_is_ignored() {
        let (mut cx, _) = page();
        assert_eq!(handle_key(&mut cx, &KeyPress::plain("k")), None);
        assert!(cx.effects().is_empty());
    }

    #[test]
    fn escape_clears_only_when_focused() {
        let (mut cx, search) = page();
        assert_eq!(handle_key(&mut cx, &KeyPress::plain("Escape")), None);
        assert_eq!(cx.view.value(search), Some("anna"));

        cx.view.focus(search);
        assert_eq!(
            handle_key(&mut cx, &KeyPress::plain("Escape")),
            Some(Shortcut::ClearSearch(search))
        );
        assert_eq!(cx.view.value(search), Some(""));
        assert_eq!(cx.view.focused(), None);
        assert_eq!(cx.take_effects(), vec![PageEffect::Blur { node: search }]);
    }

    #[test]
    fn page_without_search_still_prevents_default() {
        let mut cx = PageContext::new(
            ViewTree::new(),
            Url::parse("https://crew.example/").unwrap(),
        );
        assert_eq!(handle_key(&mut cx, &KeyPress::ctrl("k")), None);
        assert_eq!(cx.take_effects(), vec![PageEffect::PreventDefault]);
    }
}
