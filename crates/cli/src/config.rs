//! Configuration management for the CLI

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Log output style on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// CLI settings
///
/// Layered: built-in defaults, then the JSON config file, then `MSWYW_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Per-request timeout against the APM backend
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Observation window when `kibana.INTERVAL` is not given
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: i64,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Report format when `--format` is not given
    #[serde(default)]
    pub default_format: OutputFormat,
}

fn default_request_timeout() -> u64 {
    4
}

fn default_interval_minutes() -> i64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            interval_minutes: default_interval_minutes(),
            log_format: LogFormat::default(),
            default_format: OutputFormat::default(),
        }
    }
}

impl Settings {
    /// Load settings; an explicit path must exist, the default one may not
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path)
                        .format(FileFormat::Json)
                        .required(true),
                );
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder.add_source(
                        File::from(path)
                            .format(FileFormat::Json)
                            .required(false),
                    );
                }
            }
        }

        builder
            .add_source(Environment::with_prefix("MSWYW").try_parsing(true))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// `~/.config/mswyw/config.json`
    fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("mswyw").join("config.json"))
    }
}
