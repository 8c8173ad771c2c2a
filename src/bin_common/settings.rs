//! Chat client settings
//!
//! Loaded in three layers, later ones winning:
//! 1. YAML file (missing file means defaults)
//! 2. environment (`WS_CHAT_URL`, `WS_CHAT_TOKEN`, `WS_CHAT_RETRY_DELAY_MS`), `.env` included
//! 3. a URL given on the command line

use anyhow::{Context, Result};
use resocket::add_query_param;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const URL_ENV: &str = "WS_CHAT_URL";
pub const TOKEN_ENV: &str = "WS_CHAT_TOKEN";
pub const RETRY_DELAY_ENV: &str = "WS_CHAT_RETRY_DELAY_MS";

/// Settings for the `ws_chat` binary
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// WebSocket endpoint of the chat channel
    pub url: String,
    /// Delay between reconnection attempts, in milliseconds
    pub retry_delay_ms: u64,
    /// Optional API token, sent as the `token` query parameter
    pub token: Option<String>,
    /// Bound of the client's lifecycle event channel
    pub event_capacity: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5000/ws".to_string(),
            retry_delay_ms: 1000,
            token: None,
            event_capacity: 256,
        }
    }
}

impl ChatSettings {
    /// Load settings from `path`, falling back to defaults if it does not exist
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Full load: file, `.env` and environment, then the CLI URL
    pub fn load(path: &Path, cli_url: Option<&str>) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut settings = Self::from_file(path)?;
        settings.apply_overrides(|key| std::env::var(key).ok())?;

        if let Some(url) = cli_url {
            settings.url = url.to_string();
        }
        Ok(settings)
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(URL_ENV) {
            self.url = url;
        }
        if let Some(token) = lookup(TOKEN_ENV) {
            self.token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(delay) = lookup(RETRY_DELAY_ENV) {
            self.retry_delay_ms = delay
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of milliseconds", RETRY_DELAY_ENV))?;
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// URL to connect to, with the token appended when set
    pub fn connect_url(&self) -> String {
        match &self.token {
            Some(token) => add_query_param(&self.url, "token", token),
            None => self.url.clone(),
        }
    }
}
