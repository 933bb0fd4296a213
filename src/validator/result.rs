//! Validation result types

use crate::constants::warnings;
use crate::syntax::inspect::Finding;
use chrono::{DateTime, Local};
use serde::Serialize;

/// A located validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.file.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else if self.line > 0 {
            write!(
                f,
                "[{}] {}:{}:{}: {}",
                self.code, self.file, self.line, self.column, self.message
            )
        } else {
            write!(f, "[{}] {}: {}", self.code, self.file, self.message)
        }
    }
}

/// A located, non-fatal finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.file.is_empty() {
            write!(f, "[{}] {}", self.kind, self.message)
        } else {
            write!(
                f,
                "[{}] {}:{}:{}: {}",
                self.kind, self.file, self.line, self.column, self.message
            )
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    pub files_checked: usize,
    pub packages_checked: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub unused_imports: usize,
    pub unused_variables: usize,
    pub empty_functions: usize,
    pub blank_imports: usize,
}

/// Outcome of a validation run over a file, package, dependency set or project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub name: String,
    pub path: String,
    pub start_time: String,
    pub analyzed_at: DateTime<Local>,
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub stats: ValidationStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external_deps: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub circular_deps: Vec<String>,
    pub has_circular_deps: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

impl ValidationResult {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            name: name.into(),
            path: path.into(),
            start_time: now.to_rfc3339(),
            analyzed_at: now,
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
            external_deps: Vec::new(),
            circular_deps: Vec::new(),
            has_circular_deps: false,
            imports: Vec::new(),
        }
    }

    pub fn add_error(
        &mut self,
        code: &str,
        message: impl Into<String>,
        file: &str,
        line: usize,
        column: usize,
    ) {
        self.errors.push(ValidationError {
            code: code.to_string(),
            message: message.into(),
            file: file.to_string(),
            line,
            column,
        });
    }

    pub fn add_warning(
        &mut self,
        kind: &str,
        message: impl Into<String>,
        file: &str,
        line: usize,
        column: usize,
    ) {
        self.warnings.push(ValidationWarning {
            kind: kind.to_string(),
            message: message.into(),
            file: file.to_string(),
            line,
            column,
        });
    }

    /// Record an inspection finding as a warning and count it by kind
    pub fn add_finding(&mut self, finding: Finding, file: &str) {
        match finding.kind {
            warnings::UNUSED_IMPORT => self.stats.unused_imports += 1,
            warnings::UNUSED_VARIABLE => self.stats.unused_variables += 1,
            warnings::EMPTY_FUNCTION => self.stats.empty_functions += 1,
            warnings::BLANK_IMPORT => self.stats.blank_imports += 1,
            _ => {}
        }
        self.add_warning(
            finding.kind,
            finding.message,
            file,
            finding.line,
            finding.column,
        );
    }

    /// Fold another result's findings and counters into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.stats.files_checked += other.stats.files_checked;
        self.stats.packages_checked += other.stats.packages_checked;
        self.stats.unused_imports += other.stats.unused_imports;
        self.stats.unused_variables += other.stats.unused_variables;
        self.stats.empty_functions += other.stats.empty_functions;
        self.stats.blank_imports += other.stats.blank_imports;
        for dep in other.external_deps {
            if !self.external_deps.contains(&dep) {
                self.external_deps.push(dep);
            }
        }
        for edge in other.circular_deps {
            if !self.circular_deps.contains(&edge) {
                self.circular_deps.push(edge);
            }
        }
        self.has_circular_deps |= other.has_circular_deps;
    }

    /// Compute final counts and validity
    pub fn finalize(&mut self) {
        self.stats.error_count = self.errors.len();
        self.stats.warning_count = self.warnings.len();
        self.valid = self.errors.is_empty();
        self.analyzed_at = Local::now();
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// A finished validation: the payload is only reachable through its verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidationOutcome {
    Valid(ValidationResult),
    Invalid(ValidationResult),
}

impl ValidationOutcome {
    /// Finalize `result` and classify it
    pub fn from_result(mut result: ValidationResult) -> Self {
        result.finalize();
        if result.valid {
            ValidationOutcome::Valid(result)
        } else {
            ValidationOutcome::Invalid(result)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    pub fn result(&self) -> &ValidationResult {
        match self {
            ValidationOutcome::Valid(result) | ValidationOutcome::Invalid(result) => result,
        }
    }

    pub fn into_result(self) -> ValidationResult {
        match self {
            ValidationOutcome::Valid(result) | ValidationOutcome::Invalid(result) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::codes;

    #[test]
    fn test_outcome_reflects_errors() {
        let mut result = ValidationResult::new("pkg", "./pkg");
        result.add_warning(warnings::BLANK_IMPORT, "blank import of \"embed\"", "a.go", 3, 2);
        let outcome = ValidationOutcome::from_result(result);
        assert!(outcome.is_valid());
        assert_eq!(outcome.result().stats.warning_count, 1);

        let mut result = ValidationResult::new("pkg", "./pkg");
        result.add_error(codes::SYNTAX_ERROR, "syntax error: unexpected }", "a.go", 4, 1);
        let outcome = ValidationOutcome::from_result(result);
        assert!(!outcome.is_valid());
        let result = outcome.into_result();
        assert!(!result.valid);
        assert_eq!(result.stats.error_count, 1);
        assert_eq!(
            result.errors[0].to_string(),
            "[SYNTAX_ERROR] a.go:4:1: syntax error: unexpected }"
        );
    }

    #[test]
    fn test_merge_accumulates() {
        let mut total = ValidationResult::new("project", ".");
        let mut part = ValidationResult::new("pkg", "pkg");
        part.stats.files_checked = 2;
        part.stats.packages_checked = 1;
        part.add_finding(
            Finding {
                kind: warnings::EMPTY_FUNCTION,
                message: "function f has an empty body".to_string(),
                line: 1,
                column: 1,
            },
            "f.go",
        );
        part.circular_deps.push("a -> b".to_string());
        part.has_circular_deps = true;

        total.merge(part.clone());
        total.merge(part);
        total.finalize();

        assert_eq!(total.stats.files_checked, 4);
        assert_eq!(total.stats.empty_functions, 2);
        assert_eq!(total.stats.warning_count, 2);
        assert_eq!(total.circular_deps, vec!["a -> b"]);
        assert!(total.has_circular_deps);
        assert!(total.valid);
    }
}
