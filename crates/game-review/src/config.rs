//! Configuration file loading for game review.
//!
//! Settings come from a TOML file, `review.toml` in the current directory by
//! default. A missing default file means built-in defaults.

use std::path::{Path, PathBuf};

use chess_analysis::{AnalysisConfig, EngineOptions, SearchLimit};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Search budgets for the engine calls of one review.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BudgetConfig {
    /// Best-move search before each move. Defaults to 500 ms.
    #[serde(default = "default_best_move_ms")]
    pub best_move_ms: u64,
    /// Evaluation after each move. Defaults to 100 ms.
    #[serde(default = "default_evaluate_ms")]
    pub evaluate_ms: u64,
    /// Suggested alternative for a mistake. Defaults to 200 ms.
    #[serde(default = "default_alternative_ms")]
    pub alternative_ms: u64,
    /// Multi-line search. Defaults to 500 ms.
    #[serde(default = "default_lines_ms")]
    pub lines_ms: u64,
    /// Number of best lines shown. Defaults to 3.
    #[serde(default = "default_lines")]
    pub lines: usize,
    /// Fixed search depth. When set, every search uses it instead of the
    /// time budgets above.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

fn default_best_move_ms() -> u64 {
    500
}

fn default_evaluate_ms() -> u64 {
    100
}

fn default_alternative_ms() -> u64 {
    200
}

fn default_lines_ms() -> u64 {
    500
}

fn default_lines() -> usize {
    3
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            best_move_ms: default_best_move_ms(),
            evaluate_ms: default_evaluate_ms(),
            alternative_ms: default_alternative_ms(),
            lines_ms: default_lines_ms(),
            lines: default_lines(),
            depth: None,
        }
    }
}

/// Main review configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ReviewConfig {
    /// Path to the UCI engine. Defaults to "stockfish" (assumes it's in PATH).
    #[serde(default = "default_engine_path")]
    pub engine_path: String,
    #[serde(default = "default_threads")]
    pub threads: u32,
    #[serde(default = "default_hash_mb")]
    pub hash_mb: u32,
    #[serde(default)]
    pub budgets: BudgetConfig,
}

fn default_engine_path() -> String {
    "stockfish".to_string()
}

fn default_threads() -> u32 {
    1
}

fn default_hash_mb() -> u32 {
    64
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            engine_path: default_engine_path(),
            threads: default_threads(),
            hash_mb: default_hash_mb(),
            budgets: BudgetConfig::default(),
        }
    }
}

impl ReviewConfig {
    /// Loads `review.toml` from the current directory, or the defaults if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads an explicitly named file. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the path to the default configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("review.toml")
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            threads: self.threads,
            hash_mb: self.hash_mb,
        }
    }

    /// Search limits for the classifier and the display helpers.
    pub fn analysis_config(&self) -> AnalysisConfig {
        let budgets = &self.budgets;
        let config = match budgets.depth {
            Some(depth) => AnalysisConfig::fixed_depth(depth),
            None => AnalysisConfig {
                best_move: SearchLimit::millis(budgets.best_move_ms),
                evaluate: SearchLimit::millis(budgets.evaluate_ms),
                alternative: SearchLimit::millis(budgets.alternative_ms),
                lines: SearchLimit::millis(budgets.lines_ms),
                ..AnalysisConfig::default()
            },
        };
        AnalysisConfig {
            line_count: budgets.lines,
            ..config
        }
    }
}
