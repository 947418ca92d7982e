//! Host view seam used by the legacy fallback.

use std::fmt;

use tracing::trace;

use crate::error::ClipResult;

/// A view tree that can carry a temporary, off-screen text holder.
pub trait HolderHost {
    type Holder: Copy + fmt::Debug;

    /// Create an unfocusable off-screen holder containing `text` and insert it
    /// into the tree.
    fn attach_holder(&mut self, text: &str) -> ClipResult<Self::Holder>;

    /// Make the holder's full content the current selection.
    fn select_holder(&mut self, holder: Self::Holder);

    /// Text currently selected in the host, if any.
    fn selected_text(&self) -> Option<String>;

    /// Remove the holder from the tree. Must tolerate an already-removed holder.
    fn detach_holder(&mut self, holder: Self::Holder);
}

/// Scoped holder: attached on construction, detached on drop.
///
/// Drop runs on every exit path out of the copy, unwinding included, so the
/// holder can never outlive the operation that created it.
pub struct HolderGuard<'a, H: HolderHost> {
    host: &'a mut H,
    holder: H::Holder,
}

impl<'a, H: HolderHost> HolderGuard<'a, H> {
    pub fn attach(host: &'a mut H, text: &str) -> ClipResult<Self> {
        let holder = host.attach_holder(text)?;
        trace!("clipport: attached holder {:?}", holder);
        Ok(Self { host, holder })
    }

    #[inline]
    pub fn holder(&self) -> H::Holder {
        self.holder
    }

    /// Select the holder's content and return what the host now has selected.
    pub fn select(&mut self) -> Option<String> {
        self.host.select_holder(self.holder);
        self.host.selected_text()
    }
}

impl<H: HolderHost> Drop for HolderGuard<'_, H> {
    fn drop(&mut self) {
        self.host.detach_holder(self.holder);
        trace!("clipport: detached holder {:?}", self.holder);
    }
}
