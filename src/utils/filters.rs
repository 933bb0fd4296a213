//! File filtering utilities for tree walks

use crate::constants::files;
use crate::errors::ReadgoError;
use crate::types::FileType;
use anyhow::Result;
use glob::Pattern;
use std::path::Path;

/// Compiled include/exclude globs, matched against entry names
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    exclude: Vec<Pattern>,
    include: Vec<Pattern>,
}

impl NameFilter {
    pub fn new(exclude: &[String], include: &[String]) -> Result<Self> {
        Ok(Self {
            exclude: compile_patterns(exclude)?,
            include: compile_patterns(include)?,
        })
    }

    /// True when an exclude pattern matches the entry name
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(name))
    }

    /// True when there are no include patterns or one matches the file name
    pub fn is_included(&self, name: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|p| p.matches(name))
    }
}

/// Compile glob patterns, reporting the first invalid one as invalid input
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                anyhow::Error::new(ReadgoError::invalid_input(format!(
                    "invalid pattern '{}': {}",
                    p, e
                )))
            })
        })
        .collect()
}

pub fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == files::GO_EXTENSION)
}

pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(files::TEST_SUFFIX))
}

/// True when the content carries a generated-code marker
pub fn is_generated_source(content: &str) -> bool {
    files::GENERATED_MARKERS
        .iter()
        .any(|marker| content.contains(marker))
}

/// True when the file carries a generated-code marker; unreadable files are not generated
pub fn is_generated_file(path: &Path) -> bool {
    match std::fs::read(path) {
        Ok(bytes) => is_generated_source(&String::from_utf8_lossy(&bytes)),
        Err(_) => false,
    }
}

/// Whether a file passes the file-type filter
pub fn matches_file_type(path: &Path, file_type: FileType) -> bool {
    match file_type {
        FileType::All => true,
        FileType::Go => is_go_file(path),
        FileType::Test => is_test_file(path),
        FileType::Generated => is_generated_file(path),
    }
}
