//! Configuration file loading and saving

use super::{AnalyzerOptions, ConfigValidator, OptionsBuilder};
use crate::constants;
use crate::validator::ValidationLevel;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// Zero disables the timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_tests: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<ValidationLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_patterns: Vec<String>,
}

/// Contents of a `readgo.yaml` file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub validation: ValidationSection,
    #[serde(default)]
    pub reader: ReaderSection,
    /// Directory of the file this configuration was loaded from
    #[serde(skip)]
    pub config_dir: Option<PathBuf>,
}

impl Config {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path))?;

        config.config_dir = Path::new(path).parent().map(|p| p.to_path_buf());

        ConfigValidator::validate_config(&config)?;

        Ok(config)
    }

    /// Load the named file, or the default file when it exists, or defaults
    ///
    /// A file named explicitly must exist; the default file is optional.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(constants::config::DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(constants::config::DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::new()),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, format!("---\n{}", yaml))?;
        Ok(())
    }

    /// The configured working directory, resolved against the config file's directory
    pub fn resolved_work_dir(&self) -> Option<PathBuf> {
        let work_dir = self.work_dir.as_ref()?;
        match &self.config_dir {
            Some(dir) if work_dir.is_relative() && !dir.as_os_str().is_empty() => {
                Some(dir.join(work_dir))
            }
            _ => Some(work_dir.clone()),
        }
    }

    /// Builder seeded with every value this configuration sets
    pub fn to_builder(&self) -> OptionsBuilder {
        let mut builder = OptionsBuilder::new();

        if let Some(work_dir) = self.resolved_work_dir() {
            builder = builder.with_work_dir(work_dir);
        }
        if let Some(ttl) = self.cache.ttl_secs {
            builder = builder.with_cache_ttl(Duration::from_secs(ttl));
        }
        if let Some(max) = self.cache.max_entries {
            builder = builder.with_max_cache_size(max);
        }
        if let Some(timeout) = self.analysis.timeout_secs {
            builder = builder.with_analysis_timeout(Duration::from_secs(timeout));
        }
        if let Some(concurrent) = self.analysis.concurrent {
            builder = builder.with_concurrent_analysis(concurrent);
        }
        if let Some(max) = self.analysis.max_concurrency {
            builder = builder.with_max_concurrent_analysis(max);
        }
        if let Some(include) = self.analysis.include_tests {
            builder = builder.with_include_tests(include);
        }
        if let Some(level) = self.validation.level {
            builder = builder.with_validation_level(level);
        }

        builder
            .with_exclude_patterns(self.reader.exclude_patterns.clone())
            .with_include_patterns(self.reader.include_patterns.clone())
    }

    pub fn to_options(&self) -> AnalyzerOptions {
        self.to_builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("readgo.yaml");
        fs::write(
            &path,
            r#"
work_dir: project
cache:
  ttl_secs: 60
  max_entries: 10
analysis:
  timeout_secs: 5
  concurrent: false
  max_concurrency: 3
  include_tests: false
validation:
  level: strict
reader:
  exclude_patterns: ["vendor", "*.pb.go"]
"#,
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        let options = config.to_options();

        assert_eq!(options.work_dir, temp.path().join("project"));
        assert_eq!(options.cache_ttl, Duration::from_secs(60));
        assert_eq!(options.max_cache_size, 10);
        assert_eq!(options.analysis_timeout, Some(Duration::from_secs(5)));
        assert!(!options.enable_concurrent_analysis);
        assert_eq!(options.max_concurrent_analysis, 3);
        assert!(!options.include_tests);
        assert_eq!(options.validation_level, ValidationLevel::Strict);
        assert_eq!(options.exclude_patterns.len(), 2);
    }

    #[test]
    fn test_empty_config_gives_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.to_options(), AnalyzerOptions::default());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = Config::load_or_default(Some("/definitely/not/here/readgo.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("saved.yaml");

        let mut config = Config::new();
        config.cache.ttl_secs = Some(120);
        config.validation.level = Some(ValidationLevel::Basic);
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.cache.ttl_secs, Some(120));
        assert_eq!(loaded.validation.level, Some(ValidationLevel::Basic));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let result: std::result::Result<Config, _> =
            serde_yaml::from_str("validation:\n  level: paranoid\n");
        assert!(result.is_err());
    }
}
