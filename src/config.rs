//! Configuration management for ledgerchain
//!
//! Read from a TOML file; every key is optional and a missing file yields the
//! defaults:
//!
//! ```toml
//! [chain]
//! difficulty = 4
//!
//! [miner]
//! threads = 1
//!
//! [logging]
//! filter = "info"
//! ```

use crate::error::{ChainError, Result};
use crate::miner::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub miner: MinerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainConfig {
    /// Leading zero hex characters a proof digest must start with
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MinerConfig {
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

fn default_threads() -> usize {
    1
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.chain.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::Config(format!(
                "chain.difficulty must be at most {}, got {}",
                MAX_DIFFICULTY, self.chain.difficulty
            )));
        }
        if self.miner.threads == 0 {
            return Err(ChainError::Config("miner.threads must be at least 1".to_string()));
        }
        Ok(())
    }
}

pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

/// Load `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}
