//! Configuration and option validation

use super::{AnalyzerOptions, Config};
use anyhow::{Result, anyhow};

/// Enumeration of possible configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `max_concurrency` was set to zero
    ZeroConcurrency,
    /// `max_entries` was set to zero while a TTL is configured
    ZeroCacheSize,
    /// A reader pattern is not a valid glob
    InvalidPattern(String, String),
    /// The working directory does not exist or is not a directory
    MissingWorkDir(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroConcurrency => {
                write!(f, "analysis.max_concurrency must be at least 1")
            }
            ConfigError::ZeroCacheSize => {
                write!(f, "cache.max_entries must be at least 1 when a TTL is set")
            }
            ConfigError::InvalidPattern(pattern, reason) => {
                write!(f, "Invalid reader pattern '{}': {}", pattern, reason)
            }
            ConfigError::MissingWorkDir(dir) => {
                write!(f, "Working directory does not exist: '{}'", dir)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Convert a list of configuration errors into one anyhow error
pub fn config_errors_to_anyhow(errors: Vec<ConfigError>) -> anyhow::Error {
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    anyhow!("Configuration validation failed:\n  {}", messages.join("\n  "))
}

fn check_patterns(patterns: &[String], errors: &mut Vec<ConfigError>) {
    for pattern in patterns {
        if let Err(e) = glob::Pattern::new(pattern) {
            errors.push(ConfigError::InvalidPattern(pattern.clone(), e.to_string()));
        }
    }
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate values read from a configuration file
    pub fn validate_config(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        if config.analysis.max_concurrency == Some(0) {
            errors.push(ConfigError::ZeroConcurrency);
        }
        if config.cache.max_entries == Some(0) && config.cache.ttl_secs.unwrap_or(1) > 0 {
            errors.push(ConfigError::ZeroCacheSize);
        }
        check_patterns(&config.reader.exclude_patterns, &mut errors);
        check_patterns(&config.reader.include_patterns, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(config_errors_to_anyhow(errors))
        }
    }

    /// Validate fully built options, including the working directory
    pub fn validate_options(options: &AnalyzerOptions) -> Result<()> {
        let mut errors = Vec::new();

        if options.enable_concurrent_analysis && options.max_concurrent_analysis == 0 {
            errors.push(ConfigError::ZeroConcurrency);
        }
        if !options.work_dir.is_dir() {
            errors.push(ConfigError::MissingWorkDir(
                options.work_dir.display().to_string(),
            ));
        }
        check_patterns(&options.exclude_patterns, &mut errors);
        check_patterns(&options.include_patterns, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(config_errors_to_anyhow(errors))
        }
    }
}
