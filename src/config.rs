//! lemmaforge configuration management.
//!
//! Handles the optional configuration file at:
//! - Linux: ~/.config/lemmaforge/config.toml
//! - macOS: ~/Library/Application Support/lemmaforge/config.toml
//! - Windows: %APPDATA%\lemmaforge\config.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LemmaError, Result};
use crate::normalize::Normalizer;

/// Database used when neither `--db`, `LEMMAFORGE_DB` nor the config names one
pub const DEFAULT_DB_PATH: &str = "data/hermes_text.db";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// lemmaforge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LemmaforgeConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub lemmatizer: LemmatizerConfig,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Default database path
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Lemmatization engine settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LemmatizerConfig {
    /// Lexicon file; the identity engine is used when absent
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
}

/// Normalization settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizeConfig {
    #[serde(default = "default_fold_diacritics")]
    pub fold_diacritics: bool,
}

fn default_fold_diacritics() -> bool {
    true
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            fold_diacritics: default_fold_diacritics(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LemmaforgeConfig {
    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lemmaforge").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => match Self::default_path() {
                Some(p) => Self::load_from(&p),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| LemmaError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }
        Ok(config)
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer {
            fold_diacritics: self.normalize.fold_diacritics,
        }
    }

    /// Database path: explicit argument, then config, then the built-in default
    pub fn database_path(&self, explicit: Option<&PathBuf>) -> PathBuf {
        explicit
            .or(self.database.path.as_ref())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }
}
