//! Configuration for the progress board.
//!
//! Settings live in `board.toml` inside the config directory
//! (`dirs::config_dir()/okr-board` unless `--config-dir` is given) and are
//! layered file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8080"
//! timeout_secs = 30
//! token = "..."
//!
//! [board]
//! language = "en"
//! user_id = 42
//! view_mode = "all"
//!
//! [storage]
//! data_dir = "/home/me/.local/share/okr-board"
//! ```

use anyhow::{Context, Result};
use okr_common::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::board::filters::ViewMode;

pub const CONFIG_FILE: &str = "board.toml";

/// Base path of the Goals-OKR REST surface.
pub const API_PREFIX: &str = "/api/v2/goals-okr";

pub const ENV_API_URL: &str = "OKR_BOARD_API_URL";
pub const ENV_TOKEN: &str = "OKR_BOARD_TOKEN";
pub const ENV_USER_ID: &str = "OKR_BOARD_USER_ID";
pub const ENV_LANGUAGE: &str = "OKR_BOARD_LANGUAGE";

/// Connection settings for the Goals-OKR service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Service origin, without the `/api/v2/goals-okr` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Bearer token attached to every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

/// Board presentation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardSection {
    /// Kept as text so an unknown value is a validation warning, not a
    /// load failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub view_mode: ViewMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    /// Where WIP limits and logs are kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// The complete board.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub board: BoardSection,
    #[serde(default)]
    pub storage: StorageSection,
}

impl BoardToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse board.toml")
    }

    /// Load `board.toml` from `config_dir`, or defaults if it does not exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize board.toml")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production; tests pass a closure over a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token);
        }
        if let Some(raw) = lookup(ENV_USER_ID) {
            match raw.trim().parse::<i64>() {
                Ok(id) => self.board.user_id = Some(id),
                Err(_) => tracing::warn!(value = %raw, "Ignoring non-numeric {}", ENV_USER_ID),
            }
        }
        if let Some(language) = lookup(ENV_LANGUAGE).filter(|v| !v.trim().is_empty()) {
            self.board.language = Some(language);
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref language) = self.board.language
            && language.parse::<Language>().is_err()
        {
            warnings.push(format!(
                "Unknown language '{}': expected 'en' or 'nl' (falling back to 'en')",
                language
            ));
        }

        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0: every request will time out".to_string());
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            warnings.push(format!(
                "api.base_url '{}' should start with http:// or https://",
                self.api.base_url
            ));
        }

        if self.board.user_id.is_none() {
            warnings.push(format!(
                "No board.user_id configured: set it in {} or {}",
                CONFIG_FILE, ENV_USER_ID
            ));
        }

        warnings
    }
}

/// Runtime configuration: board.toml merged with environment and CLI.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub config_dir: PathBuf,
    pub toml: BoardToml,
    /// CLI override for the display language
    pub cli_language: Option<Language>,
    /// CLI override for the user id
    pub cli_user_id: Option<i64>,
}

impl BoardConfig {
    /// Load from `config_dir` (or the platform default) and apply the
    /// process environment, including a `.env` file when present.
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => default_config_dir()?,
        };
        let mut toml = BoardToml::load_or_default(&config_dir)?;
        toml.apply_env(|key| std::env::var(key).ok());

        Ok(Self {
            config_dir,
            toml,
            cli_language: None,
            cli_user_id: None,
        })
    }

    pub fn from_toml(config_dir: PathBuf, toml: BoardToml) -> Self {
        Self {
            config_dir,
            toml,
            cli_language: None,
            cli_user_id: None,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Language (CLI → env/file → `en`). Unknown values fall back to `en`.
    pub fn language(&self) -> Language {
        self.cli_language.unwrap_or_else(|| {
            self.toml
                .board
                .language
                .as_deref()
                .and_then(|l| l.parse().ok())
                .unwrap_or_default()
        })
    }

    pub fn user_id(&self) -> Option<i64> {
        self.cli_user_id.or(self.toml.board.user_id)
    }

    /// Origin plus the Goals-OKR prefix, without a trailing slash.
    pub fn api_root(&self) -> String {
        format!("{}{}", self.toml.api.base_url.trim_end_matches('/'), API_PREFIX)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.toml.api.timeout_secs)
    }

    pub fn token(&self) -> Option<&str> {
        self.toml.api.token.as_deref()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.toml
            .storage
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("okr-board")))
            .unwrap_or_else(|| self.config_dir.join("data"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

fn default_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("okr-board"))
        .context("Could not determine the user config directory; pass --config-dir")
}
