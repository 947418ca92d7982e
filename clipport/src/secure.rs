use async_trait::async_trait;

use crate::error::ClipResult;

/// The platform's asynchronous clipboard write, only present in a secure
/// context. Resolves once the platform accepts or rejects the request.
#[async_trait]
pub trait SecureClipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> ClipResult<()>;
}
