//! Configuration management module

pub mod builder;
pub mod loader;
pub mod options;
pub mod validation;

pub use builder::OptionsBuilder;
pub use loader::Config;
pub use options::AnalyzerOptions;
pub use validation::ConfigValidator;
