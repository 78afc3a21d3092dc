use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

use crate::predict::{Observer, PredictError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("observer: {0}")]
    Observer(#[from] PredictError),
    #[error("invalid duration {value:?}: {message}")]
    Duration { value: String, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub observer: Option<ObserverConfig>,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObserverConfig {
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default)]
    pub min_elevation_deg: f64,
    /// Maximum distance of a sampled instant from the element epoch.
    #[serde(default)]
    pub validity_window: Option<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            min_elevation_deg: 0.0,
            validity_window: None,
        }
    }
}

fn default_interval() -> String {
    "1m".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn observer(&self) -> Result<Option<Observer>, ConfigError> {
        self.observer
            .as_ref()
            .map(|o| Observer::from_coordinates(&o.coordinates, Some(o.altitude_m)))
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn interval(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.sampling.interval)
    }

    pub fn validity_window(&self) -> Result<Option<Duration>, ConfigError> {
        self.sampling
            .validity_window
            .as_deref()
            .map(parse_duration)
            .transpose()
    }
}

/// Parse a human-readable duration such as `30s`, `1m` or `7days`.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let err = |message: String| ConfigError::Duration {
        value: s.to_string(),
        message,
    };
    humantime::parse_duration(s.trim())
        .map_err(|e| err(e.to_string()))
        .and_then(|d| Duration::from_std(d).map_err(|e| err(e.to_string())))
}
