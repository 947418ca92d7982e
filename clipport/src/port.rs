//! Strategy selection and the copy operation itself.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::error::{ClipError, ClipResult};
use crate::host::{HolderGuard, HolderHost};
use crate::legacy::LegacyCopyCommand;
use crate::secure::SecureClipboard;

/// Which path a port will use for every copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStrategy {
    Secure,
    Legacy,
}

/// Outcome of [`ClipboardPort::copy`].
///
/// A ticket is consumed exactly once, so exactly one outcome is observed per
/// copy request.
pub enum CopyTicket {
    /// Legacy path: the copy already finished.
    Settled(ClipResult<()>),

    /// Secure path: resolves when the platform settles the write. There is no
    /// cancellation; the future always yields success or failure.
    Pending(BoxFuture<'static, ClipResult<()>>),
}

impl CopyTicket {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Wait for the outcome regardless of which path produced the ticket.
    pub async fn resolve(self) -> ClipResult<()> {
        match self {
            Self::Settled(result) => result,
            Self::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for CopyTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settled(result) => f.debug_tuple("Settled").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Copies text to the clipboard.
///
/// The secure capability is resolved once at construction: `Some` means the
/// host runs in a secure context and every copy goes through it, `None`
/// means every copy uses the off-screen holder and the legacy command.
#[derive(Clone)]
pub struct ClipboardPort {
    secure: Option<Arc<dyn SecureClipboard>>,
    legacy: Arc<dyn LegacyCopyCommand>,
}

impl ClipboardPort {
    pub fn new(
        secure: Option<Arc<dyn SecureClipboard>>,
        legacy: Arc<dyn LegacyCopyCommand>,
    ) -> Self {
        Self { secure, legacy }
    }

    /// Port without a secure context.
    pub fn legacy_only(legacy: Arc<dyn LegacyCopyCommand>) -> Self {
        Self::new(None, legacy)
    }

    #[inline]
    pub fn strategy(&self) -> CopyStrategy {
        if self.secure.is_some() {
            CopyStrategy::Secure
        } else {
            CopyStrategy::Legacy
        }
    }

    /// Start copying `text`.
    ///
    /// On the legacy path the holder is attached to `host` and detached again
    /// before this returns, whatever the command does.
    pub fn copy<H: HolderHost>(&self, text: &str, host: &mut H) -> CopyTicket {
        match &self.secure {
            Some(secure) => {
                debug!("clipport: secure write of {} byte(s)", text.len());
                let secure = Arc::clone(secure);
                let text = text.to_owned();
                CopyTicket::Pending(async move { secure.write_text(&text).await }.boxed())
            }
            None => {
                debug!("clipport: legacy copy of {} byte(s)", text.len());
                CopyTicket::Settled(copy_via_holder(self.legacy.as_ref(), text, host))
            }
        }
    }
}

impl fmt::Debug for ClipboardPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipboardPort")
            .field("strategy", &self.strategy())
            .finish()
    }
}

fn copy_via_holder<H: HolderHost>(
    legacy: &dyn LegacyCopyCommand,
    text: &str,
    host: &mut H,
) -> ClipResult<()> {
    let mut guard = HolderGuard::attach(host, text)?;
    let selection = guard.select();

    let outcome = match legacy.exec_copy(selection.as_deref()) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ClipError::CommandRefused),
        Err(err) => Err(err),
    };

    if let Err(err) = &outcome {
        warn!("clipport: legacy copy via {:?} failed: {}", guard.holder(), err);
    }

    outcome
}
