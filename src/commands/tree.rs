//! Tree and search command implementations

use super::{Command, CommandContext};
use crate::interfaces::SourceReader;
use crate::reader::DefaultReader;
use crate::types::{FileTreeNode, FileType, TreeOptions};
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

/// Prints the filtered file tree below a directory
pub struct TreeCommand {
    pub root: String,
    pub file_type: FileType,
}

/// Lists files whose name contains a pattern
pub struct SearchCommand {
    pub pattern: String,
    pub file_type: FileType,
}

/// Reader tree options: the command's file type plus the configured patterns
fn tree_options(context: &CommandContext, file_type: FileType) -> TreeOptions {
    TreeOptions {
        file_types: file_type,
        ..TreeOptions::default()
    }
    .with_excludes(context.options.exclude_patterns.clone())
    .with_includes(context.options.include_patterns.clone())
}

#[async_trait]
impl Command for TreeCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let reader = DefaultReader::new(&context.options.work_dir);
        let opts = tree_options(context, self.file_type);
        let tree = reader.get_file_tree(&self.root, &opts).await?;

        if context.json {
            println!("{}", serde_json::to_string_pretty(&tree)?);
            return Ok(());
        }

        println!("{}", tree.path.blue().bold());
        print_children(&tree, "");

        let files = tree.files().len();
        println!();
        println!("{}", format!("Total: {} files", files).green());
        Ok(())
    }
}

fn print_children(node: &FileTreeNode, prefix: &str) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        let branch = if last { "└── " } else { "├── " };
        if child.is_dir() {
            println!("{}{}{}", prefix, branch, child.name.blue().bold());
            let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
            print_children(child, &nested);
        } else {
            println!("{}{}{}", prefix, branch, child.name);
        }
    }
}

#[async_trait]
impl Command for SearchCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let reader = DefaultReader::new(&context.options.work_dir);
        let opts = tree_options(context, self.file_type);
        let matches = reader.search_files(&self.pattern, &opts).await?;

        if context.json {
            println!("{}", serde_json::to_string_pretty(&matches)?);
            return Ok(());
        }

        if matches.is_empty() {
            println!(
                "{}",
                format!("No files found matching '{}'", self.pattern).yellow()
            );
            return Ok(());
        }

        for node in &matches {
            println!("{} {} {}", "•".blue(), node.path, format!("({} bytes)", node.size).dimmed());
        }
        println!();
        println!("{}", format!("Found {} files", matches.len()).green());
        Ok(())
    }
}
