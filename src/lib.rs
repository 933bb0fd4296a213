//! Readgo - Go source analysis: type lookup, package analysis and validation

pub mod analyzer;
pub mod cache;
pub mod commands;
pub mod config;
pub mod constants;
pub mod deps;
pub mod errors;
pub mod interfaces;
pub mod logger;
pub mod module;
pub mod reader;
pub mod syntax;
pub mod types;
pub mod utils;
pub mod validator;

pub type Result<T> = anyhow::Result<T>;

// Re-export commonly used types
pub use analyzer::DefaultAnalyzer;
pub use cache::{Cache, CacheStats};
pub use commands::{Command, CommandContext};
pub use config::{AnalyzerOptions, Config, OptionsBuilder};
pub use errors::ReadgoError;
pub use interfaces::{CodeAnalyzer, SourceReader, Validator};
pub use reader::DefaultReader;
pub use types::{AnalysisResult, FileTreeNode, FunctionInfo, InterfaceInfo, TypeInfo};
pub use validator::{DefaultValidator, ValidationLevel, ValidationOutcome, ValidationResult};

/// Load `readgo.yaml` from the current directory, or defaults when it is absent
pub fn load_default_config() -> anyhow::Result<Config> {
    Config::load_or_default(None)
}
