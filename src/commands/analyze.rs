//! Analyze command implementation

use super::{Command, CommandContext};
use crate::analyzer::DefaultAnalyzer;
use crate::interfaces::CodeAnalyzer;
use crate::types::AnalysisResult;
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeTarget {
    File(String),
    Package(String),
    /// Directory holding `go.mod`, relative to the work directory
    Project(String),
}

/// Analyze command listing the types, interfaces, functions and imports found
pub struct AnalyzeCommand {
    pub target: AnalyzeTarget,
}

#[async_trait]
impl Command for AnalyzeCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let analyzer = DefaultAnalyzer::new(context.options.clone());

        let result = match &self.target {
            AnalyzeTarget::File(path) => analyzer.analyze_file(path).await?,
            AnalyzeTarget::Package(path) => analyzer.analyze_package(path).await?,
            AnalyzeTarget::Project(path) => analyzer.analyze_project(path).await?,
        };

        if context.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        print_result(&result);

        if !result.valid {
            anyhow::bail!("{} has {} error(s)", result.path, result.errors.len());
        }
        Ok(())
    }
}

fn print_result(result: &AnalysisResult) {
    println!(
        "{} {}",
        result.name.bold(),
        format!("({})", result.path).dimmed()
    );
    println!();

    if !result.types.is_empty() {
        println!("{}", "Types".green().bold());
        for info in &result.types {
            println!("  {} {} {}", "•".blue(), info.name.bold(), info.type_string);
        }
    }

    if !result.interfaces.is_empty() {
        println!("{}", "Interfaces".green().bold());
        for iface in &result.interfaces {
            println!("  {} {}", "•".blue(), iface.name.bold());
            for method in &iface.methods {
                println!("      {}{}", method.name, method.signature);
            }
            for embed in &iface.embeds {
                println!("      {}", embed.cyan());
            }
        }
    }

    if !result.functions.is_empty() {
        println!("{}", "Functions".green().bold());
        for func in &result.functions {
            let name = match &func.receiver {
                Some(receiver) => format!("({}) {}", receiver, func.name),
                None => func.name.clone(),
            };
            println!("  {} {}{}", "•".blue(), name.bold(), func.signature);
        }
    }

    if !result.imports.is_empty() {
        println!("{}", "Imports".green().bold());
        for import in &result.imports {
            println!("  {} {}", "•".blue(), import);
        }
    }

    for error in &result.errors {
        println!("{} {}", "error:".red().bold(), error);
    }

    let stats = &result.stats;
    println!();
    println!(
        "{}",
        format!(
            "Total: {} files, {} types, {} interfaces, {} functions, {} imports",
            stats.total_files,
            stats.total_types,
            stats.total_interfaces,
            stats.total_functions,
            stats.total_imports
        )
        .green()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerOptions;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, CommandContext) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), "module testmod\n\ngo 1.21\n").unwrap();
        fs::write(
            dir.path().join("main.go"),
            "package main\n\ntype Point struct {\n\tX int\n}\n\nfunc main() {\n\t_ = Point{}\n}\n",
        )
        .unwrap();

        let options = AnalyzerOptions::builder()
            .with_work_dir(dir.path())
            .build();
        (dir, CommandContext::new(options, false))
    }

    #[tokio::test]
    async fn test_analyze_file_and_project() {
        let (_dir, context) = setup();

        let file = AnalyzeCommand {
            target: AnalyzeTarget::File("main.go".to_string()),
        };
        assert!(file.execute(&context).await.is_ok());

        let project = AnalyzeCommand {
            target: AnalyzeTarget::Project(".".to_string()),
        };
        assert!(project.execute(&context).await.is_ok());
    }

    #[tokio::test]
    async fn test_analyze_missing_package() {
        let (_dir, context) = setup();
        let command = AnalyzeCommand {
            target: AnalyzeTarget::Package("./missing".to_string()),
        };
        assert!(command.execute(&context).await.is_err());
    }
}
