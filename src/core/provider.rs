use async_trait::async_trait;

use crate::core::error::ProviderError;
use crate::core::message::ChatTurn;

/// Text completion backend. One exchange in, one reply out; callers own any
/// fallback behavior, so implementations never retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, ProviderError>;
}

/// Image synthesis backend. Returns the raw encoded image bytes for a prompt.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ProviderError>;
}
