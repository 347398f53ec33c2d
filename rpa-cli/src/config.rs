//! Optional TOML settings for the `rpa` binary.
//!
//! ```toml
//! log_level = "debug"
//!
//! [engine]
//! cache_capacity = 100
//!
//! [solver]
//! tolerance = "0.01"
//! max_iterations = 100
//! ```
//!
//! Every key may be omitted.

use std::fs;
use std::path::{Path, PathBuf};

use rpa_core::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("solver tolerance must be greater than zero, got {0}")]
    InvalidTolerance(Decimal),

    #[error("solver max_iterations must be at least 1")]
    InvalidMaxIterations,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// `EnvFilter` directive; `RUST_LOG` and `--log-level` take precedence.
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Summaries kept in memory; 0 disables caching.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_tolerance() -> Decimal {
    DEFAULT_TOLERANCE
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl Config {
    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Like [`Config::load`], falling back to defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.tolerance <= Decimal::ZERO {
            return Err(ConfigError::InvalidTolerance(self.solver.tolerance));
        }
        if self.solver.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations);
        }
        Ok(())
    }
}
