//! Configuration file loading into analyzer options

mod support;

use readgo::config::{Config, ConfigValidator};
use readgo::validator::ValidationLevel;
use std::time::Duration;
use support::Workspace;

#[test]
fn test_full_config_to_options() {
    let ws = Workspace::new("testmod");
    ws.write("src/main.go", "package main\n");
    ws.write(
        "readgo.yaml",
        r#"work_dir: src
cache:
  ttl_secs: 60
  max_entries: 10
analysis:
  timeout_secs: 0
  concurrent: false
  max_concurrency: 2
  include_tests: false
validation:
  level: strict
reader:
  exclude_patterns:
    - vendor
  include_patterns:
    - "*.go"
"#,
    );

    let path = ws.path().join("readgo.yaml");
    let config = Config::load(path.to_str().unwrap()).unwrap();
    let options = config.to_options();

    assert_eq!(options.work_dir, ws.path().join("src"));
    assert_eq!(options.cache_ttl, Duration::from_secs(60));
    assert_eq!(options.max_cache_size, 10);
    assert_eq!(options.analysis_timeout, None);
    assert!(!options.enable_concurrent_analysis);
    assert_eq!(options.concurrency(), 1);
    assert!(!options.include_tests);
    assert_eq!(options.validation_level, ValidationLevel::Strict);
    assert_eq!(options.exclude_patterns, vec!["vendor"]);
    assert_eq!(options.include_patterns, vec!["*.go"]);

    assert!(ConfigValidator::validate_options(&options).is_ok());
}

#[test]
fn test_empty_config_uses_defaults() {
    let ws = Workspace::empty();
    ws.write("readgo.yaml", "---\n{}\n");

    let path = ws.path().join("readgo.yaml");
    let config = Config::load(path.to_str().unwrap()).unwrap();
    let options = config.to_options();

    assert_eq!(options.validation_level, ValidationLevel::Standard);
    assert_eq!(options.analysis_timeout, Some(Duration::from_secs(30)));
    assert_eq!(options.cache_ttl, Duration::from_secs(300));
    assert!(options.include_tests);
}

#[test]
fn test_invalid_config_files() {
    let ws = Workspace::empty();

    ws.write("bad-level.yaml", "validation:\n  level: pedantic\n");
    let path = ws.path().join("bad-level.yaml");
    assert!(Config::load(path.to_str().unwrap()).is_err());

    ws.write("zero.yaml", "analysis:\n  max_concurrency: 0\n");
    let path = ws.path().join("zero.yaml");
    let err = Config::load(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("max_concurrency"));

    assert!(Config::load_or_default(Some("/definitely/not/here.yaml")).is_err());
}

#[test]
fn test_save_and_reload() {
    let ws = Workspace::empty();
    let mut config = Config::new();
    config.validation.level = Some(ValidationLevel::Basic);
    config.reader.exclude_patterns = vec!["testdata".to_string()];

    let path = ws.path().join("saved.yaml");
    config.save(path.to_str().unwrap()).unwrap();

    let reloaded = Config::load(path.to_str().unwrap()).unwrap();
    assert_eq!(reloaded.validation, config.validation);
    assert_eq!(reloaded.reader, config.reader);
}
