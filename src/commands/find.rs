//! Find command implementation

use super::{Command, CommandContext};
use crate::analyzer::DefaultAnalyzer;
use crate::interfaces::CodeAnalyzer;
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindKind {
    Type,
    Interface,
    Function,
}

/// Looks up one named symbol in a package or its imports
pub struct FindCommand {
    pub kind: FindKind,
    pub package: String,
    pub name: String,
}

#[async_trait]
impl Command for FindCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let analyzer = DefaultAnalyzer::new(context.options.clone());

        let info = match self.kind {
            FindKind::Type => analyzer.find_type(&self.package, &self.name).await?,
            FindKind::Interface => analyzer.find_interface(&self.package, &self.name).await?,
            FindKind::Function => analyzer.find_function(&self.package, &self.name).await?,
        };

        if context.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
            return Ok(());
        }

        let visibility = if info.is_exported {
            "exported".green()
        } else {
            "unexported".yellow()
        };
        println!("{} {}", info.name.bold(), format!("[{}]", visibility).dimmed());
        println!("  Package: {}", info.package.cyan());
        println!("  Type: {}", info.type_string);

        Ok(())
    }
}
