//! Base types and traits for the command pattern

use crate::config::AnalyzerOptions;
use crate::logger::Logger;
use anyhow::Result;

/// Context passed to all commands containing shared options
#[derive(Clone)]
pub struct CommandContext {
    /// Options for the analyzer, validator and reader
    pub options: AnalyzerOptions,
    /// Print machine-readable JSON instead of colored text
    pub json: bool,
    pub logger: Logger,
}

impl CommandContext {
    pub fn new(options: AnalyzerOptions, json: bool) -> Self {
        Self {
            options,
            json,
            logger: Logger,
        }
    }
}

/// Trait that all commands must implement
#[async_trait::async_trait]
pub trait Command {
    /// Execute the command with the given context
    async fn execute(&self, context: &CommandContext) -> Result<()>;
}
