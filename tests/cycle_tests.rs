//! Import cycle detection through the validator

mod support;

use readgo::constants::codes;
use readgo::validator::{DefaultValidator, ValidationLevel};
use readgo::Validator;
use support::{chain_workspace, ring_workspace, Workspace};

fn sorted(mut edges: Vec<String>) -> Vec<String> {
    edges.sort();
    edges
}

#[tokio::test]
async fn test_ring_from_first_package() {
    let ws = ring_workspace();
    let validator = DefaultValidator::new(ws.options(ValidationLevel::Standard));

    let outcome = validator.check_circular_dependencies("./pkg1").await.unwrap();
    assert!(!outcome.is_valid());

    let result = outcome.result();
    assert!(result.has_circular_deps);
    assert_eq!(
        result.circular_deps,
        vec!["pkg1 -> pkg2", "pkg2 -> pkg3", "pkg3 -> pkg1"]
    );
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, codes::CIRCULAR_DEPENDENCY);
    assert_eq!(
        result.errors[0].message,
        "import cycle not allowed: pkg1 -> pkg2 -> pkg3 -> pkg1"
    );
}

#[tokio::test]
async fn test_ring_from_every_package_reports_same_edges() {
    let ws = ring_workspace();
    let validator = DefaultValidator::new(ws.options(ValidationLevel::Standard));
    let expected = vec!["pkg1 -> pkg2", "pkg2 -> pkg3", "pkg3 -> pkg1"];

    for start in ["testmod/pkg1", "testmod/pkg2", "testmod/pkg3"] {
        let outcome = validator.check_circular_dependencies(start).await.unwrap();
        assert!(outcome.result().has_circular_deps, "{}", start);
        assert_eq!(sorted(outcome.result().circular_deps.clone()), expected);
    }
}

#[tokio::test]
async fn test_chain_has_no_cycles() {
    let ws = chain_workspace();
    let validator = DefaultValidator::new(ws.options(ValidationLevel::Standard));

    let outcome = validator.check_circular_dependencies("./pkg1").await.unwrap();
    assert!(outcome.is_valid());
    assert!(!outcome.result().has_circular_deps);
    assert!(outcome.result().circular_deps.is_empty());
    assert!(outcome.result().errors.is_empty());
}

#[tokio::test]
async fn test_cycle_check_is_idempotent() {
    let ws = ring_workspace();
    let validator = DefaultValidator::new(ws.options(ValidationLevel::Standard));

    let first = validator.check_circular_dependencies("./pkg2").await.unwrap();
    let second = validator.check_circular_dependencies("./pkg2").await.unwrap();
    assert_eq!(first.result().circular_deps, second.result().circular_deps);
    assert_eq!(first.result().errors, second.result().errors);
}

#[tokio::test]
async fn test_strict_project_reports_cycles() {
    let ws = ring_workspace();
    let validator = DefaultValidator::new(ws.options(ValidationLevel::Strict));

    let outcome = validator.validate_project().await.unwrap();
    assert!(!outcome.is_valid());
    let result = outcome.result();
    assert!(result.has_circular_deps);
    assert_eq!(
        sorted(result.circular_deps.clone()),
        vec!["pkg1 -> pkg2", "pkg2 -> pkg3", "pkg3 -> pkg1"]
    );
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.code == codes::CIRCULAR_DEPENDENCY)
    );
}

#[tokio::test]
async fn test_standard_project_skips_cycle_search() {
    let ws = ring_workspace();
    let validator = DefaultValidator::new(ws.options(ValidationLevel::Standard));

    let outcome = validator.validate_project().await.unwrap();
    assert!(outcome.is_valid());
    assert!(!outcome.result().has_circular_deps);
}

#[tokio::test]
async fn test_missing_package_is_error() {
    let ws = Workspace::new("testmod");
    let validator = DefaultValidator::new(ws.options(ValidationLevel::Standard));
    assert!(validator.check_circular_dependencies("./nowhere").await.is_err());
}
