use crate::error::ClipResult;

/// The platform's synchronous "copy current selection" command.
///
/// `Ok(false)` means the command ran but declined to copy; `Err` means it
/// raised.
pub trait LegacyCopyCommand: Send + Sync {
    fn exec_copy(&self, selection: Option<&str>) -> ClipResult<bool>;
}
