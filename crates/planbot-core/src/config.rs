//! TOML-based application configuration.
//!
//! Stores:
//! - Completion-service settings (model, sampling, endpoint)
//! - Google and Todoist OAuth client credentials
//! - The OAuth redirect URI and the fixed UTC offset for calendar timestamps
//!
//! Configuration is stored at `~/.config/planbot/config.toml`. Base URLs are
//! part of the config so tests can point the clients at a mock server.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Completion-service (LLM) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Bearer token for the completion endpoint.
    #[serde(default)]
    pub iam_token: String,
    /// Cloud folder id embedded in the model URI.
    #[serde(default)]
    pub folder_id: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Kept low to reduce reply-format drift.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,
}

/// Google Calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_google_api_base")]
    pub api_base: String,
    #[serde(default = "default_google_token_url")]
    pub token_url: String,
}

/// Todoist configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoistConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_todoist_api_base")]
    pub api_base: String,
    #[serde(default = "default_todoist_token_url")]
    pub token_url: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/planbot/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub todoist: TodoistConfig,
    /// Base redirect URI; "/google" or "/todoist" is appended per service.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Fixed UTC offset appended to resolved timestamps sent to the calendar.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

// Default functions
fn default_model() -> String {
    "yandexgpt-lite/latest".into()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_completion_base_url() -> String {
    "https://llm.api.cloud.yandex.net".into()
}
fn default_google_api_base() -> String {
    "https://www.googleapis.com".into()
}
fn default_google_token_url() -> String {
    "https://oauth2.googleapis.com/token".into()
}
fn default_todoist_api_base() -> String {
    "https://api.todoist.com".into()
}
fn default_todoist_token_url() -> String {
    "https://todoist.com/oauth/access_token".into()
}
fn default_redirect_uri() -> String {
    "http://127.0.0.1:8000/callback".into()
}
fn default_utc_offset() -> String {
    "+03:00".into()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            iam_token: String::new(),
            folder_id: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: default_completion_base_url(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base: default_google_api_base(),
            token_url: default_google_token_url(),
        }
    }
}

impl Default for TodoistConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base: default_todoist_api_base(),
            token_url: default_todoist_token_url(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completion: CompletionConfig::default(),
            google: GoogleConfig::default(),
            todoist: TodoistConfig::default(),
            redirect_uri: default_redirect_uri(),
            utc_offset: default_utc_offset(),
        }
    }
}

impl Config {
    /// Returns the config file path, creating the directory if needed.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("planbot");
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing defaults on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save()?;
            Ok(cfg)
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_roundtrip_through_toml() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.completion.model, "yandexgpt-lite/latest");
        assert_eq!(back.completion.temperature, 0.2);
        assert_eq!(back.completion.max_tokens, 2000);
        assert_eq!(back.utc_offset, "+03:00");
    }

    #[test]
    fn empty_toml_fills_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.google.api_base, "https://www.googleapis.com");
        assert_eq!(cfg.todoist.api_base, "https://api.todoist.com");
        assert_eq!(cfg.redirect_uri, "http://127.0.0.1:8000/callback");
    }

    #[test]
    fn save_to_then_load_from_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.completion.folder_id = "b1gexample".into();
        cfg.google.client_id = "gid".into();
        cfg.save_to(&path).unwrap();

        let back = Config::load_from(&path).unwrap();
        assert_eq!(back.completion.folder_id, "b1gexample");
        assert_eq!(back.google.client_id, "gid");
        assert_eq!(back.utc_offset, "+03:00");
    }

    #[test]
    fn load_from_reports_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn partial_toml_keeps_explicit_values() {
        let cfg: Config = toml::from_str(
            r#"
[completion]
folder_id = "b1gexample"
temperature = 0.5
"#,
        )
        .unwrap();
        assert_eq!(cfg.completion.folder_id, "b1gexample");
        assert_eq!(cfg.completion.temperature, 0.5);
        assert_eq!(cfg.completion.max_tokens, 2000);
    }
}
