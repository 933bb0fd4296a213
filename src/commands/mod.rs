//! Command implementations for the CLI

pub mod analyze;
pub mod base;
pub mod find;
pub mod read;
pub mod tree;
pub mod validate;
pub mod validators;

pub use analyze::{AnalyzeCommand, AnalyzeTarget};
pub use base::{Command, CommandContext};
pub use find::{FindCommand, FindKind};
pub use read::ReadCommand;
pub use tree::{SearchCommand, TreeCommand};
pub use validate::{ValidateCommand, ValidateTarget};
