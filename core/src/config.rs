//! Layered configuration for the tracker.
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `KPSS_` prefix (`KPSS_DATA_DIR`, ...)
//! 2. `~/.config/kpss/config.toml` (or the platform config dir)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::range::TimeRange;

#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(#[from] Box<figment::Error>);

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError(Box::new(error))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KpssConfig {
    /// Where the JSON documents live. `None` means `~/.kpss`.
    pub data_dir: Option<PathBuf>,
    /// Range shown by `dashboard` and the terminal UI when none is given.
    pub default_range: TimeRange,
    /// Minutes recorded by `add` when no duration is given.
    pub default_duration: u32,
}

impl Default for KpssConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_range: TimeRange::Weekly,
            default_duration: 60,
        }
    }
}

impl KpssConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(user_config_path()).extract().map_err(ConfigError::from)
    }

    pub fn figment(config_file: Option<PathBuf>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(KpssConfig::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("KPSS_"))
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kpss").join("config.toml"))
}
