//! Error taxonomy for analysis, lookup and validation failures
//!
//! Operations return `anyhow::Result`; the variants below travel inside the
//! `anyhow::Error` so callers can still classify a failure with
//! [`is_not_found`], [`is_invalid_input`] or a `downcast_ref::<ReadgoError>()`.

use std::time::Duration;

#[derive(Debug)]
pub enum ReadgoError {
    /// The requested file, package, type or function does not exist
    NotFound(String),
    /// A caller-supplied path or name is unusable
    InvalidInput(String),
    /// Access outside the permitted area
    Permission(String),
    /// An analysis step failed
    Analysis {
        op: String,
        path: String,
        source: anyhow::Error,
    },
    /// A type, interface or function lookup failed
    TypeLookup {
        type_name: String,
        package: String,
        kind: Option<String>,
        source: anyhow::Error,
    },
    /// The package loader reported errors for a package
    Package {
        package: String,
        op: String,
        errors: Vec<String>,
    },
    /// A single located validation failure
    Validation {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },
    /// An operation exceeded the configured analysis timeout
    Timeout { op: String, after: Duration },
}

impl ReadgoError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ReadgoError::NotFound(what.into())
    }

    pub fn invalid_input(what: impl Into<String>) -> Self {
        ReadgoError::InvalidInput(what.into())
    }

    pub fn analysis(op: &str, path: &str, source: impl Into<anyhow::Error>) -> Self {
        ReadgoError::Analysis {
            op: op.to_string(),
            path: path.to_string(),
            source: source.into(),
        }
    }

    pub fn type_lookup(
        type_name: &str,
        package: &str,
        kind: Option<&str>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        ReadgoError::TypeLookup {
            type_name: type_name.to_string(),
            package: package.to_string(),
            kind: kind.map(str::to_string),
            source: source.into(),
        }
    }

    pub fn package(package: &str, op: &str, errors: Vec<String>) -> Self {
        ReadgoError::Package {
            package: package.to_string(),
            op: op.to_string(),
            errors,
        }
    }
}

impl std::fmt::Display for ReadgoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadgoError::NotFound(what) => write!(f, "not found: {}", what),
            ReadgoError::InvalidInput(what) => write!(f, "invalid input: {}", what),
            ReadgoError::Permission(what) => write!(f, "permission denied: {}", what),
            ReadgoError::Analysis { op, path, source } => {
                if path.is_empty() {
                    write!(f, "analysis error: {}: {}", op, source)
                } else {
                    write!(f, "analysis error: {}: {}: {}", op, path, source)
                }
            }
            ReadgoError::TypeLookup {
                type_name,
                package,
                kind,
                source,
            } => match kind {
                Some(kind) => write!(
                    f,
                    "type lookup error: {} {} in package {}: {}",
                    kind, type_name, package, source
                ),
                None => write!(
                    f,
                    "type lookup error: {} in package {}: {}",
                    type_name, package, source
                ),
            },
            ReadgoError::Package {
                package,
                op,
                errors,
            } => match errors.split_first() {
                Some((first, [])) => write!(f, "package error: {}: {}: {}", package, op, first),
                Some((first, rest)) => write!(
                    f,
                    "package error: {}: {}: {} (and {} more errors)",
                    package,
                    op,
                    first,
                    rest.len()
                ),
                None => write!(f, "package error: {}: {}", package, op),
            },
            ReadgoError::Validation {
                file,
                line,
                column,
                message,
            } => {
                if *line > 0 && *column > 0 {
                    write!(
                        f,
                        "validation error: {}:{}:{}: {}",
                        file, line, column, message
                    )
                } else if !file.is_empty() {
                    write!(f, "validation error: {}: {}", file, message)
                } else {
                    write!(f, "validation error: {}", message)
                }
            }
            ReadgoError::Timeout { op, after } => {
                write!(f, "{} timed out after {:?}", op, after)
            }
        }
    }
}

impl std::error::Error for ReadgoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadgoError::Analysis { source, .. } | ReadgoError::TypeLookup { source, .. } => {
                Some(&**source)
            }
            _ => None,
        }
    }
}

fn any_in_chain(err: &anyhow::Error, pred: impl Fn(&ReadgoError) -> bool) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ReadgoError>())
        .any(pred)
}

/// True when any error in the chain is a [`ReadgoError::NotFound`]
pub fn is_not_found(err: &anyhow::Error) -> bool {
    any_in_chain(err, |e| matches!(e, ReadgoError::NotFound(_)))
}

/// True when any error in the chain is a [`ReadgoError::InvalidInput`]
pub fn is_invalid_input(err: &anyhow::Error) -> bool {
    any_in_chain(err, |e| matches!(e, ReadgoError::InvalidInput(_)))
}

/// True when any error in the chain is a [`ReadgoError::Permission`]
pub fn is_permission(err: &anyhow::Error) -> bool {
    any_in_chain(err, |e| matches!(e, ReadgoError::Permission(_)))
}

/// Loader errors carried by a [`ReadgoError::Package`] anywhere in the chain
pub fn package_errors(err: &anyhow::Error) -> Option<&[String]> {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<ReadgoError>())
        .find_map(|e| match e {
            ReadgoError::Package { errors, .. } => Some(errors.as_slice()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_error_display() {
        let single = ReadgoError::package("testmod/a", "load", vec!["bad".to_string()]);
        assert_eq!(single.to_string(), "package error: testmod/a: load: bad");

        let many = ReadgoError::package(
            "testmod/a",
            "load",
            vec!["first".to_string(), "second".to_string(), "third".to_string()],
        );
        assert_eq!(
            many.to_string(),
            "package error: testmod/a: load: first (and 2 more errors)"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let located = ReadgoError::Validation {
            file: "main.go".to_string(),
            line: 3,
            column: 7,
            message: "expected ')'".to_string(),
        };
        assert_eq!(
            located.to_string(),
            "validation error: main.go:3:7: expected ')'"
        );

        let bare = ReadgoError::Validation {
            file: String::new(),
            line: 0,
            column: 0,
            message: "boom".to_string(),
        };
        assert_eq!(bare.to_string(), "validation error: boom");
    }

    #[test]
    fn test_classification_through_chain() {
        let lookup = ReadgoError::type_lookup(
            "Missing",
            "testmod/basic",
            Some("interface"),
            ReadgoError::not_found("Missing"),
        );
        let err = anyhow::Error::new(lookup).context("find interface");
        assert!(is_not_found(&err));
        assert!(!is_invalid_input(&err));

        let err = anyhow::Error::new(ReadgoError::invalid_input("empty path"));
        assert!(is_invalid_input(&err));
        assert!(!is_permission(&err));
    }

    #[test]
    fn test_package_errors_helper() {
        let err = anyhow::Error::new(ReadgoError::package(
            "x",
            "load",
            vec!["e1".to_string()],
        ));
        assert_eq!(package_errors(&err), Some(&["e1".to_string()][..]));

        let other = anyhow::anyhow!("plain");
        assert!(package_errors(&other).is_none());
    }
}
