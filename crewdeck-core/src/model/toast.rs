//! Toast entries and severities

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::util::timer::TimerHandle;
use crate::view::tree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ToastId(pub(crate) u64);

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    #[default]
    Info = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    /// Parse a severity name, falling back to `Info` for anything unknown.
    pub fn parse_lossy(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Icon classes rendered in the toast header.
    pub const fn icon_class(self) -> &'static str {
        match self {
            Self::Info => "fa-info-circle text-info",
            Self::Success => "fa-check-circle text-success",
            Self::Warning => "fa-exclamation-triangle text-warning",
            Self::Error => "fa-exclamation-circle text-danger",
        }
    }
}

impl FromStr for Severity {
    type Err = CompactString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(CompactString::from(other)),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification in the active queue. It is rendered exactly while it
/// is queued.
#[derive(Debug, Clone)]
pub struct ToastEntry {
    pub id: ToastId,
    pub message: CompactString,
    pub severity: Severity,
    pub created_at: Instant,
    pub(crate) node: NodeId,
    pub(crate) expiry: TimerHandle,
}

impl ToastEntry {
    #[inline]
    pub const fn node(&self) -> NodeId {
        self.node
    }
}
