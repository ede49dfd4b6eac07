//! Configuration types and parsing for dt.yml

use crate::dialect::Dialect;
use crate::error::{CoreError, CoreResult};
use crate::model::{NameCase, DEFAULT_SCHEMA};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "dt.yml";

/// Main configuration from dt.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database name used when the DDL has no CREATE DATABASE
    #[serde(default = "default_database")]
    pub database: String,

    /// Schema for tables whose DDL names none
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Source dialect; `auto` detects from the DDL text
    #[serde(default)]
    pub dialect: Dialect,

    /// Whether table and column lookup is case sensitive
    #[serde(default)]
    pub case_sensitive: bool,

    /// TQL output settings
    #[serde(default)]
    pub emit: EmitConfig,

    /// Review engine settings
    #[serde(default)]
    pub review: ReviewConfig,
}

/// How identifiers are cased in emitted TQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCase {
    /// Keep names as declared
    #[default]
    Preserve,
    /// `ORDER_ITEMS`
    Upper,
    /// `order_items`
    Lower,
    /// `OrderItems`
    Camel,
}

impl IdentifierCase {
    /// Apply this casing to a name
    pub fn apply(&self, name: &str) -> String {
        match self {
            IdentifierCase::Preserve => name.to_string(),
            IdentifierCase::Upper => name.to_uppercase(),
            IdentifierCase::Lower => name.to_lowercase(),
            IdentifierCase::Camel => name
                .split(|c: char| c == '_' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(|part| {
                    let mut chars = part.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect(),
        }
    }
}

/// TQL output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmitConfig {
    #[serde(default)]
    pub name_case: IdentifierCase,

    /// Emit `CREATE DATABASE` before `USE`
    #[serde(default = "default_true")]
    pub create_database: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            name_case: IdentifierCase::default(),
            create_database: true,
        }
    }
}

/// Review engine thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewConfig {
    /// Checks to run; empty runs all of them
    #[serde(default)]
    pub checks: Vec<String>,

    /// Shortest distance above which an indirect join is a long chain
    #[serde(default = "default_long_chain_threshold")]
    pub long_chain_threshold: usize,

    /// BFS depth cap for the long-chain search
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// Fewer rows per shard than this is oversharded
    #[serde(default = "default_min_rows_per_shard")]
    pub min_rows_per_shard: u64,

    /// More rows per shard than this is undersharded
    #[serde(default = "default_max_rows_per_shard")]
    pub max_rows_per_shard: u64,

    /// Largest share of rows one shard bucket may hold
    #[serde(default = "default_skew_ratio")]
    pub skew_ratio: f64,

    /// rows / distinct keys above this means the key repeats
    #[serde(default = "default_duplication_ratio")]
    pub duplication_ratio: f64,

    /// Timeout for each sampler call
    #[serde(default = "default_sampler_timeout_ms")]
    pub sampler_timeout_ms: u64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            checks: Vec::new(),
            long_chain_threshold: default_long_chain_threshold(),
            max_chain_depth: default_max_chain_depth(),
            min_rows_per_shard: default_min_rows_per_shard(),
            max_rows_per_shard: default_max_rows_per_shard(),
            skew_ratio: default_skew_ratio(),
            duplication_ratio: default_duplication_ratio(),
            sampler_timeout_ms: default_sampler_timeout_ms(),
        }
    }
}

impl ReviewConfig {
    /// Sampler timeout as a `Duration`
    pub fn sampler_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sampler_timeout_ms)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.max_chain_depth == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "review.max_chain_depth must be at least 1".to_string(),
            });
        }
        if self.long_chain_threshold >= self.max_chain_depth {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "review.long_chain_threshold ({}) must be below review.max_chain_depth ({})",
                    self.long_chain_threshold, self.max_chain_depth
                ),
            });
        }
        if self.min_rows_per_shard == 0 || self.min_rows_per_shard > self.max_rows_per_shard {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "review.min_rows_per_shard ({}) must be positive and not above review.max_rows_per_shard ({})",
                    self.min_rows_per_shard, self.max_rows_per_shard
                ),
            });
        }
        if !(self.skew_ratio > 0.0 && self.skew_ratio <= 1.0) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "review.skew_ratio must be in (0, 1], got {}",
                    self.skew_ratio
                ),
            });
        }
        if self.duplication_ratio.is_nan() || self.duplication_ratio < 1.0 {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "review.duplication_ratio must be at least 1.0, got {}",
                    self.duplication_ratio
                ),
            });
        }
        if self.sampler_timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "review.sampler_timeout_ms must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn default_database() -> String {
    "main".to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_true() -> bool {
    true
}

fn default_long_chain_threshold() -> usize {
    2
}

fn default_max_chain_depth() -> usize {
    8
}

fn default_min_rows_per_shard() -> u64 {
    5_000_000
}

fn default_max_rows_per_shard() -> u64 {
    10_000_000
}

fn default_skew_ratio() -> f64 {
    0.5
}

fn default_duplication_ratio() -> f64 {
    1.0
}

fn default_sampler_timeout_ms() -> u64 {
    30_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            schema: default_schema(),
            dialect: Dialect::default(),
            case_sensitive: false,
            emit: EmitConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load an explicit config file, else `dt.yml` in the working
    /// directory if present, else defaults
    pub fn load_or_default(path: Option<&Path>) -> CoreResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse and validate configuration text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                message: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Case policy for model lookups
    pub fn name_case(&self) -> NameCase {
        NameCase::from_sensitive(self.case_sensitive)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.database.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database name cannot be empty".to_string(),
            });
        }
        if self.schema.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "schema name cannot be empty".to_string(),
            });
        }
        self.review.validate()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
