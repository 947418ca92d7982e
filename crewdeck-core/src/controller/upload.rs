//! File input checks: size limit, extension allow-list and the
//! "Selected: ..." preview next to the field label.

use compact_str::CompactString;
use tracing::{debug, info};

use crate::config::UploadConfig;
use crate::controller::context::PageContext;
use crate::controller::toast_manager::ToastManager;
use crate::error::{AppError, AppResult};
use crate::model::toast::Severity;
use crate::util::humanize::{file_extension, format_file_size, megabytes};
use crate::view::tree::{Element, NodeId, Tag, ViewTree};

/// Class of the preview line under a file field.
pub const FILE_INFO_CLASS: &str = "file-info";

/// Type and size check of the file currently chosen in `input`. No file
/// passes. An empty allow-list accepts every type. A file of exactly the
/// limit passes; one byte more is rejected.
pub fn check_upload(view: &ViewTree, input: NodeId, config: &UploadConfig) -> AppResult<()> {
    let el = view.get(input).ok_or(AppError::StaleNode(input))?;
    let Some(file) = &el.file else {
        return Ok(());
    };
    if !config.allowed_extensions.is_empty()
        && !validate_file_type(&file.name, &config.allowed_extensions)
    {
        return Err(AppError::FileTypeRejected {
            name: file.name.clone(),
        });
    }
    let limit = config.max_size_bytes();
    if file.size > limit {
        return Err(AppError::UploadRejected {
            name: file.name.clone(),
            size: file.size,
            limit,
        });
    }
    debug!("upload: '{}' accepted ({})", file.name, format_file_size(file.size));
    Ok(())
}

/// Check `input` and, on rejection, clear it and tell the user.
///
/// Returns false when the enclosing form must not be submitted.
pub fn validate_upload(
    cx: &mut PageContext,
    toasts: &mut ToastManager,
    input: NodeId,
    config: &UploadConfig,
) -> bool {
    match check_upload(&cx.view, input, config) {
        Ok(()) => true,
        Err(err) if err.is_silent() => true,
        Err(err) => {
            info!("upload: {}", err);
            let message = match err {
                AppError::FileTypeRejected { .. } => format!(
                    "File type not allowed. Allowed types: {}",
                    config.allowed_extensions.join(", ")
                ),
                _ => format!("File size must be less than {}MB", config.max_size_mb),
            };
            cx.view.set_file(input, None);
            remove_file_preview(&mut cx.view, input);
            toasts.notify(cx, message, Severity::Error);
            false
        }
    }
}

/// Whether `name`'s extension is in `allowed` (compared lower-cased).
pub fn validate_file_type(name: &str, allowed: &[CompactString]) -> bool {
    let ext = file_extension(name);
    allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext))
}

/// The `.form-label` of the field group holding `input`.
fn field_label(view: &ViewTree, input: NodeId) -> Option<NodeId> {
    let group = view.closest(input, |el| {
        el.has_class("form-group") || el.has_class("col-md-6")
    })?;
    view.query_first_within(group, |el| el.has_class("form-label"))
}

/// Create or update the preview line for the chosen file. Nothing happens
/// without a file or without a label to anchor to.
pub fn show_file_preview(view: &mut ViewTree, input: NodeId) -> Option<NodeId> {
    let file = view.get(input)?.file.clone()?;
    let label = field_label(view, input)?;
    let anchor = view.parent(label)?;

    let info = match view.query_first_within(anchor, |el| el.has_class(FILE_INFO_CLASS)) {
        Some(info) => info,
        None => view.insert(
            anchor,
            Element::new(Tag::Small).class("file-info text-success d-block mt-1"),
        ),
    };
    let text = format!("Selected: {} ({} MB)", file.name, megabytes(file.size));
    debug!("upload: preview {}", text);
    view.set_text(info, text);
    Some(info)
}

fn remove_file_preview(view: &mut ViewTree, input: NodeId) {
    let info = field_label(view, input)
        .and_then(|label| view.parent(label))
        .and_then(|anchor| view.query_first_within(anchor, |el| el.has_class(FILE_INFO_CLASS)));
    if let Some(info) = info {
        view.remove(info);
    }
}
