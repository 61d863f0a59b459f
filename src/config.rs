use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Mockingbird";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Model used for question generation and answer evaluation.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const GENERATION_TEMPERATURE: f32 = 0.9;
pub const MAX_COMPLETION_TOKENS: u32 = 1500;
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 60;

/// Get the application data directory
/// ~/Mockingbird/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Default location of the chat and account database.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("mockingbird.db")
}

/// Log filter applied when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,mockingbird=debug"
}

/// Settings for the text completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: GENERATION_TEMPERATURE,
            max_tokens: MAX_COMPLETION_TOKENS,
            timeout_secs: DEFAULT_COMPLETION_TIMEOUT_SECS,
        }
    }
}

impl GenerationConfig {
    /// Build a config from the environment. `OPENAI_API_KEY` carries the
    /// credential; `OPENAI_BASE_URL` overrides the endpoint for
    /// compatible providers.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_BASE_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            ..Self::default()
        }
    }
}
