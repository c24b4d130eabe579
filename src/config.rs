use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub slot_max_bytes: usize,
    pub max_upload_bytes: usize,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let parsed = |key: &str, default: u64| {
            var(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let api_key = var("GEMINI_API_KEY")
            .or_else(|| var("API_KEY"))
            .filter(|k| !k.trim().is_empty())
            .context("GEMINI_API_KEY (or API_KEY) must be set")?;

        let gemini = GeminiConfig {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".into()),
            base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".into())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: parsed("ANALYSIS_TIMEOUT_SECS", 45).max(1),
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: var("APP_PORT")
                .and_then(|v| v.trim().parse::<u16>().ok())
                .unwrap_or(8080),
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            slot_max_bytes: parsed("SLOT_MAX_BYTES", 5 * 1024 * 1024) as usize,
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 20 * 1024 * 1024) as usize,
            gemini,
        })
    }
}
