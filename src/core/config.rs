use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::error::ConfigError;

/// Cloudflare REST API base (Workers AI runs under /accounts/{id}/ai/run/).
const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const DEFAULT_CHAT_MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";
const DEFAULT_IMAGE_MODEL: &str = "@cf/stabilityai/stable-diffusion-xl-base-1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Cloudflare account the Workers AI models run under
    #[serde(default)]
    pub account_id: Option<String>,

    /// API token with Workers AI permission
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Text model for chat replies and prompt rewrites
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Image synthesis model
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Character width of art generated from conversation turns
    #[serde(default = "default_columns")]
    pub columns: u32,

    #[serde(default)]
    pub debug: bool,
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> String {
    ".asciigen".into()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.into()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.into()
}

fn default_columns() -> u32 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            data_dir: default_data_dir(),
            account_id: None,
            api_token: None,
            api_base: default_api_base(),
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            columns: default_columns(),
            debug: false,
        }
    }
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig::default();
    config.working_dir = wd.clone();

    // Try loading global config
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("asciigen").join("config.json");
        if global_path.exists() {
            let content = std::fs::read_to_string(&global_path)
                .map_err(|e| ConfigError::File(e.to_string()))?;
            let file_config: AppConfig = serde_json::from_str(&content)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            merge_config(&mut config, file_config);
        }
    }

    // Try loading local project config
    let local_path = wd.join("asciigen.json");
    if local_path.exists() {
        let content = std::fs::read_to_string(&local_path)
            .map_err(|e| ConfigError::File(e.to_string()))?;
        let file_config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        merge_config(&mut config, file_config);
    }

    // Auto-detect credentials from environment
    detect_credentials(&mut config);

    if config.columns == 0 {
        return Err(ConfigError::Invalid("columns must be greater than zero".into()));
    }

    Ok(config)
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.account_id.is_some() {
        base.account_id = overlay.account_id;
    }
    if overlay.api_token.is_some() {
        base.api_token = overlay.api_token;
    }
    if overlay.api_base != default_api_base() {
        base.api_base = overlay.api_base;
    }
    if overlay.chat_model != default_chat_model() {
        base.chat_model = overlay.chat_model;
    }
    if overlay.image_model != default_image_model() {
        base.image_model = overlay.image_model;
    }
    if overlay.columns != default_columns() {
        base.columns = overlay.columns;
    }
    if overlay.debug {
        base.debug = true;
    }
}

fn detect_credentials(config: &mut AppConfig) {
    if config.account_id.is_none() {
        if let Ok(id) = std::env::var("CLOUDFLARE_ACCOUNT_ID") {
            if !id.is_empty() {
                config.account_id = Some(id);
            }
        }
    }

    if config.api_token.is_some() {
        return;
    }

    let env_vars = ["CLOUDFLARE_API_TOKEN", "ASCIIGEN_API_TOKEN"];
    for env_var in &env_vars {
        if let Ok(token) = std::env::var(env_var) {
            if !token.is_empty() {
                config.api_token = Some(token);
                return;
            }
        }
    }
}

impl AppConfig {
    pub fn data_path(&self) -> PathBuf {
        self.working_dir.join(&self.data_dir)
    }

    pub fn has_credentials(&self) -> bool {
        self.account_id.as_ref().map_or(false, |v| !v.is_empty())
            && self.api_token.as_ref().map_or(false, |v| !v.is_empty())
    }
}
