//! In-process clipboard backend.
//!
//! Serves both seams so headless hosts (the replay CLI, tests) can run the
//! full copy flow. The mode decides how the next copies behave.

use std::sync::Arc;

use async_trait::async_trait;
use compact_str::CompactString;
use parking_lot::Mutex;

use crate::error::{ClipError, ClipResult};
use crate::legacy::LegacyCopyCommand;
use crate::secure::SecureClipboard;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MemoryMode {
    #[default]
    Accept,
    /// Secure writes are rejected with this detail.
    Reject(CompactString),
    /// The legacy command returns `false`.
    Refuse,
    /// The legacy command raises with this detail.
    Raise(CompactString),
}

#[derive(Debug, Default)]
struct Inner {
    mode: MemoryMode,
    contents: Option<CompactString>,
    writes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryClipboard {
    pub fn with_mode(mode: MemoryMode) -> Self {
        let clipboard = Self::default();
        clipboard.set_mode(mode);
        clipboard
    }

    pub fn set_mode(&self, mode: MemoryMode) {
        self.inner.lock().mode = mode;
    }

    pub fn contents(&self) -> Option<CompactString> {
        self.inner.lock().contents.clone()
    }

    /// Number of successful writes.
    pub fn writes(&self) -> u64 {
        self.inner.lock().writes
    }

    fn store(&self, text: &str) {
        let mut inner = self.inner.lock();
        inner.contents = Some(CompactString::from(text));
        inner.writes += 1;
    }
}

#[async_trait]
impl SecureClipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> ClipResult<()> {
        let mode = self.inner.lock().mode.clone();
        match mode {
            MemoryMode::Reject(detail) => Err(ClipError::SecureWriteRejected(detail)),
            _ => {
                self.store(text);
                Ok(())
            }
        }
    }
}

impl LegacyCopyCommand for MemoryClipboard {
    fn exec_copy(&self, selection: Option<&str>) -> ClipResult<bool> {
        let mode = self.inner.lock().mode.clone();
        match (mode, selection) {
            (MemoryMode::Refuse, _) | (_, None) => Ok(false),
            (MemoryMode::Raise(detail), _) => Err(ClipError::CommandRaised(detail)),
            (_, Some(text)) => {
                self.store(text);
                Ok(true)
            }
        }
    }
}
