//! Runtime configuration: defaults, then an optional YAML file named by
//! `COVID_TRACKER_CONFIG`, then individual environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::data::aggregate::DEFAULT_WORLD_LOCATION;
use crate::data::loader::DataSource;

pub const CONFIG_PATH_ENV: &str = "COVID_TRACKER_CONFIG";
pub const BIND_ENV: &str = "COVID_TRACKER_BIND";
pub const DATA_ENV: &str = "COVID_TRACKER_DATA";
pub const WORLD_ENV: &str = "COVID_TRACKER_WORLD";
pub const TIMEOUT_ENV: &str = "COVID_TRACKER_TIMEOUT_SECS";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8050";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid {name} '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub data_source: DataSource,
    /// Aggregate region whose rows feed the totals and the weekly chart.
    pub world_location: String,
    pub fetch_timeout: Duration,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_source: DataSource::default(),
            world_location: DEFAULT_WORLD_LOCATION.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            debug: false,
        }
    }
}

/// Config file shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bind_addr: Option<String>,
    data_source: Option<String>,
    world_location: Option<String>,
    fetch_timeout_secs: Option<u64>,
    debug: Option<bool>,
}

impl Config {
    /// Defaults + optional file + environment.
    pub fn load() -> Result<Config, ConfigError> {
        let mut config = Config::default();
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            config.apply_file(Path::new(&path))?;
        }
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Config, ConfigError> {
        let mut config = Config::default();
        config.apply_file(path)?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(bind_addr) = file.bind_addr {
            self.bind_addr = bind_addr;
        }
        if let Some(source) = file.data_source {
            self.data_source = DataSource::parse(&source);
        }
        if let Some(world) = file.world_location {
            self.world_location = world;
        }
        if let Some(secs) = file.fetch_timeout_secs {
            self.fetch_timeout = timeout_from_secs(secs, &secs.to_string())?;
        }
        if let Some(debug) = file.debug {
            self.debug = debug;
        }
        self.validate()
    }

    /// Apply `COVID_TRACKER_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind_addr) = lookup(BIND_ENV) {
            self.bind_addr = bind_addr;
        }
        if let Some(source) = lookup(DATA_ENV) {
            self.data_source = DataSource::parse(&source);
        }
        if let Some(world) = lookup(WORLD_ENV) {
            self.world_location = world;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: TIMEOUT_ENV,
                value: raw.clone(),
                reason: "expected a whole number of seconds",
            })?;
            self.fetch_timeout = timeout_from_secs(secs, &raw)?;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "bind_addr",
                value: self.bind_addr.clone(),
                reason: "must not be empty",
            });
        }
        if self.world_location.trim().is_empty() {
            return Err(ConfigError::Invalid {
                name: "world_location",
                value: self.world_location.clone(),
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}

fn timeout_from_secs(secs: u64, raw: &str) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name: "fetch_timeout_secs",
            value: raw.to_string(),
            reason: "must be at least 1",
        });
    }
    Ok(Duration::from_secs(secs))
}
