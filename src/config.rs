//! Configuration with multi-source merging
//!
//! Priority (highest to lowest):
//! 1. `TRIVIA_*` environment variables (`TRIVIA_DATABASE_PATH`, ...)
//! 2. Explicit config path (must exist), or `./trivia.toml` when none is
//!    given (skipped if absent)
//! 3. Built-in defaults

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::quiz::SelectionStrategy;

pub const DEFAULT_CONFIG_FILE: &str = "trivia.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// How the quiz picks among unseen questions
    pub quiz_strategy: SelectionStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("trivia.db"),
            bind_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            quiz_strategy: SelectionStrategy::FirstUnseen,
        }
    }
}

impl Config {
    fn figment(config_path: Option<&Path>) -> Result<Figment, figment::Error> {
        // Toml::file silently skips a missing file, which is only wanted for the default
        let file = match config_path {
            Some(path) if !path.exists() => {
                return Err(figment::Error::from(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        Ok(Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(file)))
    }

    /// Defaults, then the config file, then the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(config_path)?
            .merge(Env::prefixed("TRIVIA_"))
            .extract()
    }

    /// Defaults and the config file only.
    pub fn load_file(config_path: &Path) -> Result<Self, figment::Error> {
        Self::figment(Some(config_path))?.extract()
    }

    /// `RUST_LOG` wins; otherwise `log_level`.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Install the global fmt subscriber. Call once per process.
pub fn init_logging(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_target(false)
        .init();
}
