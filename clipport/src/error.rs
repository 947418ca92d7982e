//! Clipboard failure taxonomy

use compact_str::CompactString;
use thiserror::Error;

pub type ClipResult<T> = Result<T, ClipError>;

/// Why a copy did not reach the clipboard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipError {
    #[error("Secure clipboard write rejected: {0}")]
    SecureWriteRejected(CompactString),

    #[error("Legacy copy command reported failure")]
    CommandRefused,

    #[error("Legacy copy command raised: {0}")]
    CommandRaised(CompactString),

    #[error("Copy holder could not be attached: {0}")]
    HolderUnavailable(CompactString),
}

impl ClipError {
    /// Create a rejection reported by the secure platform path
    #[inline]
    pub fn rejected(detail: impl Into<CompactString>) -> Self {
        Self::SecureWriteRejected(detail.into())
    }

    /// Create an error raised by the legacy command
    #[inline]
    pub fn raised(detail: impl Into<CompactString>) -> Self {
        Self::CommandRaised(detail.into())
    }

    /// Platform-reported detail for diagnostics
    #[must_use]
    pub fn detail(&self) -> CompactString {
        match self {
            Self::SecureWriteRejected(detail)
            | Self::CommandRaised(detail)
            | Self::HolderUnavailable(detail) => detail.clone(),
            Self::CommandRefused => CompactString::const_new("copy command returned false"),
        }
    }

    /// True when the failure came from the legacy fallback path
    #[inline]
    pub fn is_legacy_failure(&self) -> bool {
        matches!(
            self,
            Self::CommandRefused | Self::CommandRaised(_) | Self::HolderUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_carries_platform_message() {
        let err = ClipError::rejected("NotAllowedError: Document is not focused");
        assert_eq!(err.detail(), "NotAllowedError: Document is not focused");
        assert!(!err.is_legacy_failure());
    }

    #[test]
    fn refused_command_has_synthetic_detail() {
        let err = ClipError::CommandRefused;
        assert!(err.is_legacy_failure());
        assert!(!err.detail().is_empty());
    }
}
