//! Result and option types shared across the reader, analyzer and validator

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Which files a tree walk includes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Every file
    #[default]
    All,
    /// Go source files (`*.go`)
    Go,
    /// Go test files (`*_test.go`)
    Test,
    /// Files carrying a generated-code marker
    Generated,
}

/// Options for file tree operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeOptions {
    #[serde(default)]
    pub file_types: FileType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_patterns: Vec<String>,
}

impl TreeOptions {
    pub fn go_files() -> Self {
        Self {
            file_types: FileType::Go,
            ..Self::default()
        }
    }

    pub fn with_excludes(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_includes(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }
}

/// Options for reading source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    pub include_comments: bool,
    pub strip_spaces: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            include_comments: true,
            strip_spaces: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// A node in a file tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTreeNode {
    pub name: String,
    /// Path relative to the reader's working directory
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_time: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileTreeNode>,
}

fn is_zero(size: &u64) -> bool {
    *size == 0
}

impl FileTreeNode {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// All file nodes below (and including) this node, depth first
    pub fn files(&self) -> Vec<&FileTreeNode> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileTreeNode>) {
        if self.is_file() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_files(out);
        }
    }

    /// Find the directory node whose path equals `path`
    pub fn find_dir_mut(&mut self, path: &str) -> Option<&mut FileTreeNode> {
        if self.path == path {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter(|child| child.is_dir())
            .find_map(|child| child.find_dir_mut(path))
    }
}

/// Position of a function declaration in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPosition {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// File content along with its function positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub content: Vec<u8>,
    pub functions: Vec<FunctionPosition>,
}

/// Information about a Go type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    pub package: String,
    /// Rendering of the underlying type (or the signature for functions)
    #[serde(rename = "type")]
    pub type_string: String,
    pub is_exported: bool,
}

/// Information about a Go function or method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub results: Vec<String>,
    pub signature: String,
    pub is_exported: bool,
    #[serde(default)]
    pub line: usize,
}

/// A method declared by an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub results: Vec<String>,
    pub signature: String,
}

/// Information about a Go interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub package: String,
    pub methods: Vec<MethodInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<String>,
    pub is_exported: bool,
}

/// Counters attached to an analysis result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total_files: usize,
    pub total_types: usize,
    pub total_interfaces: usize,
    pub total_functions: usize,
    pub total_imports: usize,
}

/// Result of analyzing a file, package or project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub name: String,
    pub path: String,
    pub start_time: String,
    pub analyzed_at: DateTime<Local>,
    #[serde(default)]
    pub types: Vec<TypeInfo>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceInfo>,
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,
    #[serde(default)]
    pub imports: Vec<String>,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub stats: AnalysisStats,
}

impl AnalysisResult {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            name: name.into(),
            path: path.into(),
            start_time: now.to_rfc3339(),
            analyzed_at: now,
            types: Vec::new(),
            interfaces: Vec::new(),
            functions: Vec::new(),
            imports: Vec::new(),
            valid: true,
            errors: Vec::new(),
            stats: AnalysisStats::default(),
        }
    }

    /// Recompute the counters and validity from the collected data
    pub fn finalize(&mut self, total_files: usize) {
        self.valid = self.errors.is_empty();
        self.stats = AnalysisStats {
            total_files,
            total_types: self.types.len(),
            total_interfaces: self.interfaces.len(),
            total_functions: self.functions.len(),
            total_imports: self.imports.len(),
        };
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeInfo> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn find_interface(&self, name: &str) -> Option<&InterfaceInfo> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, path: &str) -> FileTreeNode {
        FileTreeNode {
            name: name.to_string(),
            path: path.to_string(),
            kind: NodeKind::File,
            size: 1,
            mod_time: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_file_tree_flatten_and_find() {
        let mut root = FileTreeNode {
            name: "root".to_string(),
            path: ".".to_string(),
            kind: NodeKind::Directory,
            size: 0,
            mod_time: None,
            children: vec![
                file("a.go", "a.go"),
                FileTreeNode {
                    name: "pkg".to_string(),
                    path: "pkg".to_string(),
                    kind: NodeKind::Directory,
                    size: 0,
                    mod_time: None,
                    children: vec![file("b.go", "pkg/b.go")],
                },
            ],
        };

        let names: Vec<_> = root.files().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["a.go", "b.go"]);

        assert!(root.find_dir_mut("pkg").is_some());
        assert!(root.find_dir_mut("a.go").is_none());
        assert!(root.find_dir_mut("missing").is_none());
    }

    #[test]
    fn test_file_type_serde_names() {
        let json = serde_json::to_string(&FileType::Generated).unwrap();
        assert_eq!(json, "\"generated\"");
        let parsed: FileType = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(parsed, FileType::Test);
    }

    #[test]
    fn test_analysis_result_finalize() {
        let mut result = AnalysisResult::new("basic", "basic");
        result.types.push(TypeInfo {
            name: "User".to_string(),
            package: "basic".to_string(),
            type_string: "struct{ID int}".to_string(),
            is_exported: true,
        });
        result.imports.push("context".to_string());
        result.finalize(2);

        assert!(result.valid);
        assert_eq!(result.stats.total_files, 2);
        assert_eq!(result.stats.total_types, 1);
        assert_eq!(result.stats.total_imports, 1);
        assert!(result.find_type("User").is_some());

        result.errors.push("syntax error".to_string());
        result.finalize(2);
        assert!(!result.valid);
    }
}
