//! # clipport - copy-to-clipboard port
//!
//! Copies text to the system clipboard through one of two strategies,
//! chosen once when the port is built:
//!
//! - **secure**: the platform's asynchronous clipboard write, available only
//!   in a secure context. Settles later through a [`CopyTicket::Pending`].
//! - **legacy**: an off-screen text holder is attached to the host view,
//!   selected, copied with the synchronous legacy command and detached again.
//!   Settles immediately through a [`CopyTicket::Settled`].
//!
//! Every `copy` yields exactly one outcome, and the legacy holder is detached
//! on every exit path (including a panicking command).

pub mod error;
pub mod host;
pub mod legacy;
pub mod memory;
pub mod port;
pub mod secure;

pub use error::{ClipError, ClipResult};
pub use host::{HolderGuard, HolderHost};
pub use legacy::LegacyCopyCommand;
pub use memory::{MemoryClipboard, MemoryMode};
pub use port::{ClipboardPort, CopyStrategy, CopyTicket};
pub use secure::SecureClipboard;
