//! URLs handed to the backend: form submissions, the status filter, export
//! links and row links.

use url::Url;
use url::form_urlencoded;

use crate::error::{AppError, AppResult};
use crate::view::tree::{Element, NodeId, Tag, ViewTree};

/// Query parameter written by a status badge click.
pub const STATUS_PARAM: &str = "status";

/// Current URL with `name=value` set: the first existing occurrence is
/// replaced in place, later duplicates are dropped, and a missing parameter
/// is appended. Every other parameter keeps its position.
pub fn with_query_param(location: &Url, name: &str, value: &str) -> Url {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = location
        .query_pairs()
        .filter_map(|(k, v)| {
            if k != name {
                return Some((k.into_owned(), v.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((k.into_owned(), value.to_owned()))
        })
        .collect();

    let mut url = location.clone();
    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (k, v) in &pairs {
            query.append_pair(k, v);
        }
        if !replaced {
            query.append_pair(name, value);
        }
    }
    url
}

/// Destination of a status badge click.
#[inline]
pub fn status_filter_url(location: &Url, status: &str) -> Url {
    with_query_param(location, STATUS_PARAM, status)
}

/// Export link: `<base>/<kind>/export`, `format=csv` only for CSV, then the
/// selected row ids comma-joined. Each id is percent-encoded, the commas
/// are not.
pub fn export_url<S: AsRef<str>>(base_path: &str, kind: &str, format: &str, ids: &[S]) -> String {
    let mut url = format!("{}/{}/export", base_path.trim_end_matches('/'), kind);
    if format == "csv" {
        url.push_str("?format=csv");
    }
    if !ids.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str("ids=");
        let joined = ids
            .iter()
            .map(|id| form_urlencoded::byte_serialize(id.as_ref().as_bytes()).collect::<String>())
            .collect::<Vec<_>>()
            .join(",");
        url.push_str(&joined);
    }
    url
}

/// Resolve an href found in the markup against the current page.
pub fn resolve(location: &Url, href: &str) -> AppResult<Url> {
    location.join(href).map_err(|e| AppError::url(href, e))
}

/// Submission URL for `form`: its `action` (the current page when absent).
/// A GET form gets its query rebuilt from the form's successful controls; a
/// POST form carries them in the body, so only the action is returned.
pub fn form_submission_url(view: &ViewTree, form: NodeId, location: &Url) -> AppResult<Url> {
    let el = view.get(form).ok_or(AppError::StaleNode(form))?;
    let mut url = match el.get_attr("action").filter(|a| !a.is_empty()) {
        Some(action) => resolve(location, action)?,
        None => location.clone(),
    };
    url.set_fragment(None);
    if el
        .get_attr("method")
        .is_some_and(|m| m.eq_ignore_ascii_case("post"))
    {
        return Ok(url);
    }
    url.set_query(None);

    let controls = view.query_all_within(form, is_successful_control);
    if !controls.is_empty() {
        let mut query = url.query_pairs_mut();
        for id in controls {
            if let Some(control) = view.get(id)
                && let Some(name) = control.name()
            {
                query.append_pair(name, &control.value);
            }
        }
    }
    Ok(url)
}

/// Named, enabled controls that contribute to a submission. Buttons and
/// file inputs are left out; checkboxes only when checked.
fn is_successful_control(el: &Element) -> bool {
    let named = el.name().is_some_and(|n| !n.is_empty());
    if !named || el.disabled {
        return false;
    }
    match el.tag {
        Tag::Textarea => true,
        Tag::Input => match el.input_type() {
            "checkbox" | "radio" => el.checked,
            "file" | "submit" | "button" | "reset" | "image" => false,
            _ => true,
        },
        _ => false,
    }
}

/// Link of the `tr[data-href]` row a click landed in, unless the click hit
/// a button, link or input inside the row.
pub fn row_href(view: &ViewTree, target: NodeId) -> Option<&str> {
    if view.closest(target, Element::is_interactive).is_some() {
        return None;
    }
    let row = view.closest(target, |el| el.tag == Tag::Tr && el.data("href").is_some())?;
    view.get(row)?.data("href")
}

/// Status value of the `.badge[data-status]` a click landed in.
pub fn badge_status(view: &ViewTree, target: NodeId) -> Option<&str> {
    let badge = view.closest(target, |el| el.has_class("badge") && el.data("status").is_some())?;
    view.get(badge)?.data("status")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn status_is_set_preserving_other_params() {
        let here = url("https://crew.example/admin/crew?search=anna&page=2");
        let next = status_filter_url(&here, "active");
        assert_eq!(
            next.as_str(),
            "https://crew.example/admin/crew?search=anna&page=2&status=active"
        );
    }

    #[test]
    fn status_replaces_in_place_and_drops_duplicates() {
        let here = url("https://crew.example/list?status=old&page=1&status=older");
        let next = status_filter_url(&here, "new");
        assert_eq!(next.query(), Some("status=new&page=1"));
    }

    #[test]
    fn status_on_bare_url() {
        let next = status_filter_url(&url("https://crew.example/list"), "on leave");
        assert_eq!(next.query(), Some("status=on+leave"));
    }

    #[test]
    fn export_url_shapes() {
        let none: [&str; 0] = [];
        assert_eq!(export_url("/admin", "crew", "xlsx", &none), "/admin/crew/export");
        assert_eq!(
            export_url("/admin", "crew", "csv", &none),
            "/admin/crew/export?format=csv"
        );
        assert_eq!(
            export_url("/admin/", "crew", "csv", &["4", "9"]),
            "/admin/crew/export?format=csv&ids=4,9"
        );
        assert_eq!(
            export_url("/admin", "vessels", "pdf", &["a b", "c&d"]),
            "/admin/vessels/export?ids=a+b,c%26d"
        );
    }

    #[test]
    fn form_url_collects_successful_controls() {
        let mut view = ViewTree::new();
        let form = view.insert(
            view.body(),
            Element::new(Tag::Form).attr("action", "/admin/crew"),
        );
        view.insert(
            form,
            Element::new(Tag::Input).attr("name", "search").value("anna k"),
        );
        view.insert(
            form,
            Element::new(Tag::Input)
                .attr("type", "checkbox")
                .attr("name", "archived")
                .value("1"),
        );
        view.insert(
            form,
            Element::new(Tag::Input)
                .attr("type", "submit")
                .attr("name", "go")
                .value("Go"),
        );
        let hidden = view.insert(
            form,
            Element::new(Tag::Input).attr("name", "status").value("active"),
        );

        let here = url("https://crew.example/admin/crew?status=stale#top");
        let out = form_submission_url(&view, form, &here).unwrap();
        assert_eq!(
            out.as_str(),
            "https://crew.example/admin/crew?search=anna+k&status=active"
        );

        view.set_disabled(hidden, true);
        let out = form_submission_url(&view, form, &here).unwrap();
        assert_eq!(out.query(), Some("search=anna+k"));
    }

    #[test]
    fn form_without_action_submits_to_current_page() {
        let mut view = ViewTree::new();
        let form = view.insert(view.body(), Element::new(Tag::Form));
        view.insert(form, Element::new(Tag::Input).attr("name", "search"));

        let here = url("https://crew.example/admin/crew?search=old");
        let out = form_submission_url(&view, form, &here).unwrap();
        assert_eq!(out.as_str(), "https://crew.example/admin/crew?search=");
    }

    #[test]
    fn post_form_keeps_action_only() {
        let mut view = ViewTree::new();
        let form = view.insert(
            view.body(),
            Element::new(Tag::Form)
                .attr("method", "POST")
                .attr("action", "/admin/crew/7/edit?tab=docs"),
        );
        view.insert(form, Element::new(Tag::Input).attr("name", "name").value("Anna"));

        let out = form_submission_url(&view, form, &url("https://crew.example/")).unwrap();
        assert_eq!(out.as_str(), "https://crew.example/admin/crew/7/edit?tab=docs");
    }

    #[test]
    fn row_click_skips_interactive_targets() {
        let mut view = ViewTree::new();
        let table = view.insert(view.body(), Element::new(Tag::Table));
        let tbody = view.insert(table, Element::new(Tag::Tbody));
        let row = view.insert(tbody, Element::new(Tag::Tr).attr("data-href", "/crew/7"));
        let cell = view.insert(row, Element::new(Tag::Td).text("Anna"));
        let btn_cell = view.insert(row, Element::new(Tag::Td));
        let button = view.insert(btn_cell, Element::new(Tag::Button));
        let icon = view.insert(button, Element::new(Tag::I));

        assert_eq!(row_href(&view, cell), Some("/crew/7"));
        assert_eq!(row_href(&view, row), Some("/crew/7"));
        assert_eq!(row_href(&view, icon), None);
        assert_eq!(row_href(&view, tbody), None);
    }

    #[test]
    fn badge_status_from_nested_click() {
        let mut view = ViewTree::new();
        let badge = view.insert(
            view.body(),
            Element::new(Tag::Span)
                .class("badge bg-success")
                .attr("data-status", "active"),
        );
        let icon = view.insert(badge, Element::new(Tag::I));
        assert_eq!(badge_status(&view, icon), Some("active"));
        assert_eq!(badge_status(&view, view.body()), None);
    }
}
