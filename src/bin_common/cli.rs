//! CLI utilities for binaries
//!
//! Handles configuration file lookup and command line arguments.

use std::path::PathBuf;

/// Config file used when `WS_CHAT_CONFIG_PATH` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/ws_chat.yaml";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "WS_CHAT_CONFIG_PATH";

/// Path of the chat config file
///
/// # Examples
/// ```
/// use ws_chat_client::bin_common::config_path;
///
/// let path = config_path();
/// ```
pub fn config_path() -> PathBuf {
    config_path_from(std::env::var(CONFIG_PATH_ENV).ok())
}

fn config_path_from(env_value: Option<String>) -> PathBuf {
    env_value
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_value_wins() {
        let path = config_path_from(Some("custom/chat.yaml".to_string()));
        assert_eq!(path, PathBuf::from("custom/chat.yaml"));
    }

    #[test]
    fn test_unset_or_blank_uses_default() {
        assert_eq!(config_path_from(None), PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(
            config_path_from(Some("  ".to_string())),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
    }
}
