//! Process configuration read from the environment

use crate::history::TrimPolicy;
use crate::llm::{ApiDialect, DEFAULT_BASE_URL};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Status shown for the whole session when no credential is configured
pub const MISSING_KEY_STATUS: &str = "OPENAI_API_KEY is missing. Export it before chatting.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("WAYCHAT_API must be `chat` or `responses`, got `{0}`")]
    UnknownDialect(String),
    #[error("WAYCHAT_TRIM must be `pinned` or `literal`, got `{0}`")]
    UnknownTrimPolicy(String),
}

/// Configuration for the chat client
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub dialect: ApiDialect,
    pub db_path: PathBuf,
    pub trim_policy: TrimPolicy,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let dialect = match var("WAYCHAT_API") {
            Some(value) => {
                ApiDialect::parse(&value).ok_or(ConfigError::UnknownDialect(value))?
            }
            None => ApiDialect::default(),
        };

        let trim_policy = match var("WAYCHAT_TRIM") {
            Some(value) => {
                TrimPolicy::parse(&value).ok_or(ConfigError::UnknownTrimPolicy(value))?
            }
            None => TrimPolicy::default(),
        };

        let db_path = var("WAYCHAT_DB_PATH").map_or_else(
            || {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".waychat").join("waychat.db")
            },
            PathBuf::from,
        );

        Ok(Self {
            api_key: var("OPENAI_API_KEY"),
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: var("WAYCHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            dialect,
            db_path,
            trim_policy,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ChatConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ChatConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("HOME", "/home/ada")]).unwrap();
        assert_eq!(config.api_key, None);
        assert!(!config.has_api_key());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.dialect, ApiDialect::ChatCompletions);
        assert_eq!(config.trim_policy, TrimPolicy::PinnedWindow);
        assert_eq!(config.db_path, PathBuf::from("/home/ada/.waychat/waychat.db"));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("WAYCHAT_MODEL", "gpt-4o"),
            ("WAYCHAT_API", "responses"),
            ("WAYCHAT_DB_PATH", "/tmp/chat.db"),
            ("WAYCHAT_TRIM", "literal"),
        ])
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.dialect, ApiDialect::Responses);
        assert_eq!(config.db_path, PathBuf::from("/tmp/chat.db"));
        assert_eq!(config.trim_policy, TrimPolicy::Literal);
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = config(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config(&[("WAYCHAT_API", "grpc")]),
            Err(ConfigError::UnknownDialect("grpc".to_string()))
        );
        assert_eq!(
            config(&[("WAYCHAT_TRIM", "fifo")]),
            Err(ConfigError::UnknownTrimPolicy("fifo".to_string()))
        );
    }
}
