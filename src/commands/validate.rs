//! Validate command implementation

use super::{Command, CommandContext};
use crate::interfaces::Validator;
use crate::validator::{DefaultValidator, ValidationOutcome};
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

/// What a validation run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateTarget {
    File(String),
    Package(String),
    /// Every package of the module under the work directory
    Project,
    /// Imports of one package
    Dependencies(String),
    /// Requirements of the whole module against vendor/ and the module cache
    External,
    /// Import cycles reachable from a package
    Cycles(String),
}

impl ValidateTarget {
    fn scope(&self) -> &str {
        match self {
            ValidateTarget::File(path)
            | ValidateTarget::Package(path)
            | ValidateTarget::Dependencies(path)
            | ValidateTarget::Cycles(path) => path,
            ValidateTarget::Project | ValidateTarget::External => "project",
        }
    }
}

/// Runs one validation and reports its findings
///
/// Fails (and so exits non-zero) when the outcome is invalid.
pub struct ValidateCommand {
    pub target: ValidateTarget,
}

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let validator = DefaultValidator::new(context.options.clone());
        let scope = self.target.scope();

        if !context.json {
            context.logger.info(
                scope,
                &format!("Validating at {} level", validator.level()),
            );
        }

        let outcome = match &self.target {
            ValidateTarget::File(path) => validator.validate_file(path).await?,
            ValidateTarget::Package(path) => validator.validate_package(path).await?,
            ValidateTarget::Project => validator.validate_project().await?,
            ValidateTarget::Dependencies(path) => validator.validate_dependencies(path).await?,
            ValidateTarget::External => validator.validate_external_dependencies().await?,
            ValidateTarget::Cycles(path) => validator.check_circular_dependencies(path).await?,
        };

        report(context, scope, &outcome)
    }
}

/// Print an outcome as JSON or as scoped log lines
pub(crate) fn report(
    context: &CommandContext,
    scope: &str,
    outcome: &ValidationOutcome,
) -> Result<()> {
    let result = outcome.result();

    if context.json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        let logger = &context.logger;
        for error in &result.errors {
            logger.error(scope, &error.to_string());
        }
        for warning in &result.warnings {
            logger.warn(scope, &warning.to_string());
        }

        if !result.external_deps.is_empty() {
            logger.info(scope, "External dependencies:");
            for dep in &result.external_deps {
                println!("  {} {}", "•".blue(), dep);
            }
        }
        if result.has_circular_deps {
            logger.warn(scope, "Import cycle edges:");
            for edge in &result.circular_deps {
                println!("  {} {}", "↻".red(), edge);
            }
        }

        let stats = &result.stats;
        logger.info(
            scope,
            &format!(
                "{} files and {} packages checked: {} errors, {} warnings",
                stats.files_checked, stats.packages_checked, stats.error_count, stats.warning_count
            ),
        );

        if outcome.is_valid() {
            if result.warnings.is_empty() {
                logger.success(scope, "No issues found");
            } else {
                logger.success(scope, "Valid, with warnings");
            }
        }
    }

    if !outcome.is_valid() {
        anyhow::bail!(
            "validation of {} failed with {} error(s)",
            scope,
            result.stats.error_count
        );
    }
    Ok(())
}
