//! Options shared by the analyzer, validator and reader

use crate::constants::defaults;
use crate::validator::ValidationLevel;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime options for [`crate::DefaultAnalyzer`] and [`crate::DefaultValidator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    pub work_dir: PathBuf,
    pub cache_ttl: Duration,
    pub max_cache_size: usize,
    /// `None` disables the per-operation timeout
    pub analysis_timeout: Option<Duration>,
    pub enable_concurrent_analysis: bool,
    pub max_concurrent_analysis: usize,
    pub validation_level: ValidationLevel,
    /// Whether `_test.go` files take part in package loading
    pub include_tests: bool,
    pub exclude_patterns: Vec<String>,
    pub include_patterns: Vec<String>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(defaults::WORK_DIR),
            cache_ttl: defaults::CACHE_TTL,
            max_cache_size: defaults::MAX_CACHE_SIZE,
            analysis_timeout: Some(defaults::ANALYSIS_TIMEOUT),
            enable_concurrent_analysis: true,
            max_concurrent_analysis: default_concurrency(),
            validation_level: ValidationLevel::default(),
            include_tests: true,
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

impl AnalyzerOptions {
    /// Effective fan-out for concurrent work; 1 when concurrency is disabled
    pub fn concurrency(&self) -> usize {
        if self.enable_concurrent_analysis {
            self.max_concurrent_analysis.max(1)
        } else {
            1
        }
    }
}

/// Number of CPUs available to the process
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
