//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Aggregation and batching thresholds
    #[serde(default)]
    pub network: NetworkConfig,

    /// Worker pool and sampling settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.network.min_mutual == 0 {
            return Err(AppError::validation("network.min_mutual must be > 0"));
        }
        if self.network.chunk_size == 0 {
            return Err(AppError::validation("network.chunk_size must be > 0"));
        }
        if self.pipeline.n_consumers == 0 {
            return Err(AppError::validation("pipeline.n_consumers must be > 0"));
        }
        if self.pipeline.sample_size == 0 {
            return Err(AppError::validation("pipeline.sample_size must be > 0"));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(AppError::validation(format!(
                "logging.level '{}' is not a log level",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// Thresholds shared by the aggregator and the candidate batcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Followers that must follow a channel before it counts as mutual
    #[serde(default = "defaults::min_mutual")]
    pub min_mutual: u32,

    /// Followers following more channels than this are skipped
    #[serde(default = "defaults::max_followings")]
    pub max_followings: u64,

    /// Candidates released per chunk
    #[serde(default = "defaults::chunk_size")]
    pub chunk_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            min_mutual: defaults::min_mutual(),
            max_followings: defaults::max_followings(),
            chunk_size: defaults::chunk_size(),
        }
    }
}

/// Crawl pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrent followings workers
    #[serde(default = "defaults::n_consumers")]
    pub n_consumers: usize,

    /// Maximum followers enumerated from the subject
    #[serde(default = "defaults::sample_size")]
    pub sample_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_consumers: defaults::n_consumers(),
            sample_size: defaults::sample_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub fn min_mutual() -> u32 {
        3
    }
    pub fn max_followings() -> u64 {
        150
    }
    pub fn chunk_size() -> usize {
        crate::network::DEFAULT_CHUNK_SIZE
    }
    pub fn n_consumers() -> usize {
        50
    }
    pub fn sample_size() -> usize {
        350
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
