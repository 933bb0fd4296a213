//! Command argument validation utilities
//!
//! Checks on command arguments that go beyond what clap enforces while
//! parsing: non-blank paths, Go identifiers and glob syntax.

use anyhow::{Result, anyhow};

/// Validation errors for command arguments
#[derive(Debug, PartialEq)]
pub enum CommandValidationError {
    /// Required argument was not provided
    MissingRequired {
        argument: String,
        alternatives: Vec<String>,
    },
    /// Invalid argument value
    InvalidValue {
        argument: String,
        value: String,
        reason: String,
    },
}

impl std::fmt::Display for CommandValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandValidationError::MissingRequired {
                argument,
                alternatives,
            } => {
                if alternatives.is_empty() {
                    write!(f, "{} is required", argument)
                } else {
                    write!(
                        f,
                        "Either {} or {} must be provided",
                        alternatives.join(", "),
                        argument
                    )
                }
            }
            CommandValidationError::InvalidValue {
                argument,
                value,
                reason,
            } => {
                write!(f, "Invalid value '{}' for {}: {}", value, argument, reason)
            }
        }
    }
}

impl std::error::Error for CommandValidationError {}

/// Convert validation error to anyhow::Error
pub fn validation_error_to_anyhow(error: CommandValidationError) -> anyhow::Error {
    anyhow!(error.to_string())
}

/// Ensures a file or package path argument is not blank
pub fn validate_path_argument(argument: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(validation_error_to_anyhow(
            CommandValidationError::MissingRequired {
                argument: argument.to_string(),
                alternatives: Vec::new(),
            },
        ));
    }
    Ok(())
}

/// Ensures a symbol name is a Go identifier
pub fn validate_identifier(argument: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid {
        return Err(validation_error_to_anyhow(
            CommandValidationError::InvalidValue {
                argument: argument.to_string(),
                value: name.to_string(),
                reason: "not a valid Go identifier".to_string(),
            },
        ));
    }
    Ok(())
}

/// Ensures every exclude/include pattern is a non-blank, well-formed glob
pub fn validate_patterns(argument: &str, patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        if pattern.trim().is_empty() {
            return Err(validation_error_to_anyhow(
                CommandValidationError::InvalidValue {
                    argument: argument.to_string(),
                    value: pattern.clone(),
                    reason: "pattern cannot be empty or whitespace only".to_string(),
                },
            ));
        }
        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(validation_error_to_anyhow(
                CommandValidationError::InvalidValue {
                    argument: argument.to_string(),
                    value: pattern.clone(),
                    reason: e.to_string(),
                },
            ));
        }
    }
    Ok(())
}

/// Ensures an explicit concurrency limit is positive
pub fn validate_concurrency(max: Option<usize>) -> Result<()> {
    if let Some(0) = max {
        return Err(validation_error_to_anyhow(
            CommandValidationError::InvalidValue {
                argument: "--max-concurrency".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            },
        ));
    }
    Ok(())
}
