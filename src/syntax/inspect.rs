//! Per-file lint-style inspections over [`GoFile`] summaries

use super::GoFile;
use crate::constants::warnings;
use serde::Serialize;

/// One inspection result, located in the inspected file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: &'static str,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// `import _ "path"` specs
pub fn blank_imports(file: &GoFile) -> Vec<Finding> {
    file.imports
        .iter()
        .filter(|import| import.is_blank())
        .map(|import| Finding {
            kind: warnings::BLANK_IMPORT,
            message: format!("blank import of \"{}\"", import.path),
            line: import.line,
            column: import.column,
        })
        .collect()
}

/// Functions and methods whose body has no statements
pub fn empty_functions(file: &GoFile) -> Vec<Finding> {
    file.functions
        .iter()
        .filter(|func| func.has_body && func.body_empty)
        .map(|func| {
            let name = match &func.receiver_base {
                Some(receiver) => format!("{}.{}", receiver, func.name),
                None => func.name.clone(),
            };
            Finding {
                kind: warnings::EMPTY_FUNCTION,
                message: format!("function {} has an empty body", name),
                line: func.line,
                column: func.column,
            }
        })
        .collect()
}

/// Imports whose local name is never used as a qualifier
///
/// `local_name` maps an import to the name it binds; callers that resolved
/// the imported package pass its real package name. Blank and dot imports
/// are never reported.
pub fn unused_imports<F>(file: &GoFile, local_name: F) -> Vec<Finding>
where
    F: Fn(&super::ImportSpec) -> String,
{
    file.imports
        .iter()
        .filter(|import| !import.is_blank() && !import.is_dot())
        .filter(|import| !file.qualifiers.contains(&local_name(import)))
        .map(|import| {
            let message = match &import.alias {
                Some(alias) => format!("\"{}\" imported as {} and not used", import.path, alias),
                None => format!("\"{}\" imported and not used", import.path),
            };
            Finding {
                kind: warnings::UNUSED_IMPORT,
                message,
                line: import.line,
                column: import.column,
            }
        })
        .collect()
}

/// Locals declared and never read
pub fn unused_variables(file: &GoFile) -> Vec<Finding> {
    file.unused_locals
        .iter()
        .map(|local| Finding {
            kind: warnings::UNUSED_VARIABLE,
            message: format!("declared and not used: {} (in {})", local.name, local.function),
            line: local.line,
            column: local.column,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use std::path::Path;

    const SOURCE: &str = r#"package demo

import (
	"fmt"
	"os"
	_ "embed"
	yaml "gopkg.in/yaml.v3"
)

type T struct{}

func (t T) Empty() {}

func Print() {
	fmt.Println("x")
}

func stub() {
}
"#;

    fn file() -> GoFile {
        parse_source(Path::new("demo.go"), SOURCE).unwrap()
    }

    #[test]
    fn test_blank_imports() {
        let findings = blank_imports(&file());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, warnings::BLANK_IMPORT);
        assert!(findings[0].message.contains("embed"));
    }

    #[test]
    fn test_empty_functions() {
        let findings = empty_functions(&file());
        let messages: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "function T.Empty has an empty body",
                "function stub has an empty body"
            ]
        );
    }

    #[test]
    fn test_unused_imports() {
        let file = file();
        let findings = unused_imports(&file, |import| import.local_name());
        let messages: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "\"os\" imported and not used",
                "\"gopkg.in/yaml.v3\" imported as yaml and not used"
            ]
        );
    }

    #[test]
    fn test_unused_imports_respects_resolved_names() {
        let file = file();
        // A resolver that knows "os" is bound under a name the file does use
        let findings = unused_imports(&file, |import| {
            if import.path == "os" {
                "fmt".to_string()
            } else {
                import.local_name()
            }
        });
        assert_eq!(findings.len(), 1);
    }
}
