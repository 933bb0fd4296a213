//! Read command implementation

use super::{Command, CommandContext};
use crate::interfaces::SourceReader;
use crate::reader::DefaultReader;
use crate::types::ReadOptions;
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

/// Prints a source file, optionally stripped, or the spans of its functions
pub struct ReadCommand {
    pub path: String,
    pub strip_comments: bool,
    pub strip_spaces: bool,
    /// Print function positions instead of the source
    pub functions: bool,
}

#[async_trait]
impl Command for ReadCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let reader = DefaultReader::new(&context.options.work_dir);

        if self.functions {
            let content = reader.read_file_with_functions(&self.path).await?;
            if context.json {
                println!("{}", serde_json::to_string_pretty(&content.functions)?);
                return Ok(());
            }
            for func in &content.functions {
                println!(
                    "{} {} {}",
                    "•".blue(),
                    func.name.bold(),
                    format!("lines {}-{}", func.start_line, func.end_line).dimmed()
                );
            }
            println!();
            println!(
                "{}",
                format!("Total: {} functions", content.functions.len()).green()
            );
            return Ok(());
        }

        let opts = ReadOptions {
            include_comments: !self.strip_comments,
            strip_spaces: self.strip_spaces,
        };
        let source = reader.read_source_file(&self.path, &opts).await?;
        let text = String::from_utf8_lossy(&source);

        if context.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "path": self.path,
                    "content": text,
                }))?
            );
        } else {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
