//! Analyzer options builder

use super::AnalyzerOptions;
use crate::validator::ValidationLevel;
use std::path::PathBuf;
use std::time::Duration;

/// Builder for [`AnalyzerOptions`]
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    options: AnalyzerOptions,
}

impl OptionsBuilder {
    /// Start from the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory all paths are confined to
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.options.work_dir = work_dir.into();
        self
    }

    /// Set the cache time-to-live
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.options.cache_ttl = ttl;
        self
    }

    /// Set the maximum entries kept per cache kind
    pub fn with_max_cache_size(mut self, size: usize) -> Self {
        self.options.max_cache_size = size;
        self
    }

    /// Set the analysis timeout; `Duration::ZERO` disables it
    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.options.analysis_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Enable or disable concurrent analysis
    pub fn with_concurrent_analysis(mut self, enabled: bool) -> Self {
        self.options.enable_concurrent_analysis = enabled;
        self
    }

    /// Set the maximum number of packages analyzed at once
    pub fn with_max_concurrent_analysis(mut self, max: usize) -> Self {
        self.options.max_concurrent_analysis = max;
        self
    }

    pub fn with_validation_level(mut self, level: ValidationLevel) -> Self {
        self.options.validation_level = level;
        self
    }

    pub fn with_include_tests(mut self, include: bool) -> Self {
        self.options.include_tests = include;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.exclude_patterns = patterns;
        self
    }

    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.include_patterns = patterns;
        self
    }

    /// Build the options
    pub fn build(self) -> AnalyzerOptions {
        self.options
    }
}

impl AnalyzerOptions {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::defaults;

    #[test]
    fn test_builder_defaults() {
        let options = OptionsBuilder::new().build();
        assert_eq!(options.cache_ttl, defaults::CACHE_TTL);
        assert_eq!(options.max_cache_size, defaults::MAX_CACHE_SIZE);
        assert_eq!(options.analysis_timeout, Some(defaults::ANALYSIS_TIMEOUT));
        assert!(options.enable_concurrent_analysis);
        assert!(options.max_concurrent_analysis >= 1);
        assert_eq!(options.validation_level, ValidationLevel::Standard);
    }

    #[test]
    fn test_builder_with_all_options() {
        let options = AnalyzerOptions::builder()
            .with_work_dir("/tmp/project")
            .with_cache_ttl(Duration::from_secs(10))
            .with_max_cache_size(5)
            .with_analysis_timeout(Duration::from_secs(3))
            .with_concurrent_analysis(false)
            .with_max_concurrent_analysis(2)
            .with_validation_level(ValidationLevel::Strict)
            .with_include_tests(false)
            .with_exclude_patterns(vec!["vendor".to_string()])
            .build();

        assert_eq!(options.work_dir, PathBuf::from("/tmp/project"));
        assert_eq!(options.cache_ttl, Duration::from_secs(10));
        assert_eq!(options.max_cache_size, 5);
        assert_eq!(options.analysis_timeout, Some(Duration::from_secs(3)));
        assert!(!options.enable_concurrent_analysis);
        assert_eq!(options.concurrency(), 1);
        assert_eq!(options.validation_level, ValidationLevel::Strict);
        assert!(!options.include_tests);
        assert_eq!(options.exclude_patterns, vec!["vendor".to_string()]);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let options = OptionsBuilder::new()
            .with_analysis_timeout(Duration::ZERO)
            .build();
        assert_eq!(options.analysis_timeout, None);
    }

    #[test]
    fn test_builder_overwrite_values() {
        let options = OptionsBuilder::new()
            .with_max_concurrent_analysis(2)
            .with_max_concurrent_analysis(6)
            .build();
        assert_eq!(options.concurrency(), 6);
    }
}
