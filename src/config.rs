//! Configuration for ticketdesk
//!
//! Values are layered: compiled defaults, then an optional config file, then
//! `TICKETDESK_*` environment variables (`__` separates nested keys, e.g.
//! `TICKETDESK_API__BASE_URL`).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "TICKETDESK";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub classification: ClassificationConfig,
    pub stats: StatsConfig,
    pub draft: DraftConfig,
}

/// Ticket service connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Debounced classification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub debounce_ms: u64,
    pub min_description_len: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            min_description_len: 10,
        }
    }
}

impl ClassificationConfig {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Stats polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub poll_interval_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}

impl StatsConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Draft form settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    pub title_max_len: usize,
    /// How long a success message stays visible after submit
    pub message_ttl_ms: u64,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            title_max_len: crate::core::DEFAULT_TITLE_MAX_LEN,
            message_ttl_ms: 4000,
        }
    }
}

impl DraftConfig {
    #[must_use]
    pub const fn message_ttl(&self) -> Duration {
        Duration::from_millis(self.message_ttl_ms)
    }
}

impl Config {
    /// Load configuration from an explicit file, or the platform config
    /// directory when none is given, with environment overrides on top
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment map instead of the
    /// process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            },
            None => {
                if let Some(default_path) = Self::default_path() {
                    tracing::debug!("Looking for config at {}", default_path.display());
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            },
        }

        let mut environment = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        if env.is_some() {
            environment = environment.source(env);
        }

        let config: Self = builder.add_source(environment).build()?.try_deserialize()?;
        Ok(config)
    }

    /// Default config file location, e.g. `~/.config/ticketdesk/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ticketdesk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
