//! Console logger used by the CLI commands

use colored::*;

/// Logger with consistent, scope-prefixed formatting
///
/// Each message is prefixed with its scope (a package path, file or the
/// project name) in cyan/bold, so output from packages validated in
/// parallel stays attributable.
///
/// ## Example
///
/// ```rust
/// use readgo::logger::Logger;
///
/// let logger = Logger::default();
/// logger.info("testmod/pkg1", "Validating package");
/// logger.success("testmod/pkg1", "No issues found");
/// ```
#[derive(Default, Clone, Copy)]
pub struct Logger;

impl Logger {
    pub fn info(&self, scope: &str, msg: &str) {
        println!("{} | {}", scope.cyan().bold(), msg);
    }

    pub fn success(&self, scope: &str, msg: &str) {
        println!("{} | {}", scope.cyan().bold(), msg.green());
    }

    pub fn warn(&self, scope: &str, msg: &str) {
        println!("{} | {}", scope.cyan().bold(), msg.yellow());
    }

    pub fn error(&self, scope: &str, msg: &str) {
        eprintln!("{} | {}", scope.cyan().bold(), msg.red());
    }
}
