mod workers_ai;

pub use workers_ai::{extract_image_bytes, WorkersAiChat, WorkersAiImage};

use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::error::ProviderError;
use crate::core::provider::{ChatBackend, ImageBackend};

/// Build both Workers AI backends from config. Fails when credentials are
/// missing so the CLI can complain before any request goes out.
pub fn create_backends(
    config: &AppConfig,
) -> Result<(Arc<dyn ChatBackend>, Arc<dyn ImageBackend>), ProviderError> {
    let account_id = config
        .account_id
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ProviderError::MissingCredentials(
                "CLOUDFLARE_ACCOUNT_ID not set. Set via env var or config file.".into(),
            )
        })?;
    let api_token = config
        .api_token
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ProviderError::MissingCredentials(
                "CLOUDFLARE_API_TOKEN not set. Set via env var or config file.".into(),
            )
        })?;

    let chat = Arc::new(WorkersAiChat::new(
        &config.api_base,
        account_id,
        api_token,
        &config.chat_model,
    ));
    let image = Arc::new(WorkersAiImage::new(
        &config.api_base,
        account_id,
        api_token,
        &config.image_model,
    ));
    Ok((chat, image))
}

#[cfg(test)]
mod tests;
