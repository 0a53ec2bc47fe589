//! Configuration file parsing
//!
//! Reads pg-query-reduce.toml configuration files. Every setting can also
//! be supplied (and overridden) on the command line.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Connection string for the target database, in key=value or URL form.
    /// Point this at a sacrificial server: candidate queries are executed
    /// as-is and may create or drop objects.
    pub database: String,

    /// Per-statement timeout applied to every probe (e.g. "500ms").
    pub timeout: String,

    /// Compare SQLSTATE codes instead of first error-message lines.
    pub use_sqlstate: bool,

    /// Print each candidate query with its verdict.
    pub verbose: bool,

    /// Additionally print paths, replacement values, and the parse tree.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "host=localhost".to_string(),
            timeout: "500ms".to_string(),
            use_sqlstate: false,
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout(&self.timeout)
    }
}

/// The timeout is spliced into `SET statement_timeout = '...'` verbatim, so
/// it must be a plain integer with an optional PostgreSQL duration unit and
/// nothing else.
fn validate_timeout(timeout: &str) -> Result<(), ConfigError> {
    const UNITS: &[&str] = &["", "us", "ms", "s", "min", "h", "d"];

    let timeout = timeout.trim();
    let digits_end = timeout
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(timeout.len());
    let (digits, unit) = timeout.split_at(digits_end);

    if digits.is_empty() || !UNITS.contains(&unit.trim()) {
        return Err(ConfigError::Validation(format!(
            "invalid timeout '{timeout}'. Expected an integer with an optional \
             unit (us, ms, s, min, h, d), e.g. \"500ms\""
        )));
    }
    Ok(())
}
