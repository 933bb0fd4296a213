//! Traits implemented by the reader, analyzer and validator
//!
//! All three are `Send + Sync` so one instance can serve concurrent callers.

use crate::Result;
use crate::cache::CacheStats;
use crate::types::{AnalysisResult, FileContent, FileTreeNode, ReadOptions, TreeOptions, TypeInfo};
use crate::validator::ValidationOutcome;
use async_trait::async_trait;

/// Read access to Go sources under a work directory
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Tree of files under `root`, filtered by `opts`
    async fn get_file_tree(&self, root: &str, opts: &TreeOptions) -> Result<FileTreeNode>;

    /// Source of a file, optionally with whitespace or comments stripped
    async fn read_source_file(&self, path: &str, opts: &ReadOptions) -> Result<Vec<u8>>;

    /// Flat list of the files of a package directory
    async fn get_package_files(&self, pkg_path: &str, opts: &TreeOptions)
    -> Result<Vec<FileTreeNode>>;

    /// Files whose name contains `pattern`
    async fn search_files(&self, pattern: &str, opts: &TreeOptions) -> Result<Vec<FileTreeNode>>;

    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// File content plus the line span of each function and method
    async fn read_file_with_functions(&self, path: &str) -> Result<FileContent>;
}

/// Type, interface and function queries plus file/package/project analysis
#[async_trait]
pub trait CodeAnalyzer: Send + Sync {
    async fn find_type(&self, pkg_path: &str, type_name: &str) -> Result<TypeInfo>;

    async fn find_interface(&self, pkg_path: &str, interface_name: &str) -> Result<TypeInfo>;

    async fn find_function(&self, pkg_path: &str, func_name: &str) -> Result<TypeInfo>;

    async fn analyze_file(&self, path: &str) -> Result<AnalysisResult>;

    async fn analyze_package(&self, pkg_path: &str) -> Result<AnalysisResult>;

    async fn analyze_project(&self, path: &str) -> Result<AnalysisResult>;

    fn cache_stats(&self) -> CacheStats;

    fn clear_cache(&self);
}

/// Validation of files, packages, dependencies and the whole project
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate_file(&self, path: &str) -> Result<ValidationOutcome>;

    async fn validate_package(&self, path: &str) -> Result<ValidationOutcome>;

    async fn validate_project(&self) -> Result<ValidationOutcome>;

    /// Imports of one package: local ones resolve, external ones are required by `go.mod`
    async fn validate_dependencies(&self, pkg_path: &str) -> Result<ValidationOutcome>;

    async fn validate_external_dependencies(&self) -> Result<ValidationOutcome>;

    /// Import cycles reachable from a package
    async fn check_circular_dependencies(&self, pkg_path: &str) -> Result<ValidationOutcome>;
}
