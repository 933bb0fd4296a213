//! Go syntax front end
//!
//! Source files are parsed with `tree-sitter-go` and summarized into owned
//! [`GoFile`] values: package clause, imports, top-level declarations,
//! qualified references, unused locals and syntax diagnostics. Nothing
//! downstream holds on to the syntax tree itself.

pub mod inspect;
pub mod parser;
pub mod render;

pub use parser::{parse_file, parse_source, strip_comments};

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A located message produced while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// One `import` spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSpec {
    pub path: String,
    /// Explicit local name: an identifier, `_` or `.`
    pub alias: Option<String>,
    pub line: usize,
    pub column: usize,
}

impl ImportSpec {
    pub fn is_blank(&self) -> bool {
        self.alias.as_deref() == Some("_")
    }

    pub fn is_dot(&self) -> bool {
        self.alias.as_deref() == Some(".")
    }

    /// Name the import binds in the file, guessing from the path when no alias is given
    pub fn local_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => guess_package_name(&self.path),
        }
    }
}

/// Conventional package name for an import path
///
/// Drops a trailing major-version element (`/v2`), a `.vN` suffix and a
/// `go-` prefix; dashes become underscores.
pub fn guess_package_name(path: &str) -> String {
    let mut elements = path.rsplit('/');
    let last = elements.next().unwrap_or(path);
    let base = if is_major_version(last) {
        elements.next().unwrap_or(last)
    } else {
        last
    };
    let base = base.split('.').next().unwrap_or(base);
    let base = base.strip_prefix("go-").unwrap_or(base);
    base.replace('-', "_")
}

fn is_major_version(element: &str) -> bool {
    element.len() > 1
        && element.starts_with('v')
        && element[1..].chars().all(|c| c.is_ascii_digit())
}

/// A parameter or result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: Option<String>,
    pub type_string: String,
}

/// Render a parameter and result list as `(a int, b string) (bool, error)`
pub fn render_signature(params: &[Field], results: &[Field]) -> String {
    let mut out = format!("({})", join_fields(params));
    match results {
        [] => {}
        [single] if single.name.is_none() => {
            out.push(' ');
            out.push_str(&single.type_string);
        }
        _ => {
            out.push_str(&format!(" ({})", join_fields(results)));
        }
    }
    out
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| match &f.name {
            Some(name) => format!("{} {}", name, f.type_string),
            None => f.type_string.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A method listed in an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

impl MethodSig {
    pub fn signature(&self) -> String {
        format!("func{}", render_signature(&self.params, &self.results))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Struct,
    Interface,
    Other,
}

/// A top-level `type` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub is_alias: bool,
    /// Rendering of the declared (underlying) type
    pub underlying: String,
    /// Interface methods in source order
    pub methods: Vec<MethodSig>,
    /// Embedded interfaces or type-set terms
    pub embeds: Vec<String>,
    pub line: usize,
    pub column: usize,
}

/// A top-level function or method declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver type as written, e.g. `*User`
    pub receiver: Option<String>,
    /// Receiver type name without pointer or type arguments
    pub receiver_base: Option<String>,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub has_body: bool,
    /// True when the body holds no statements
    pub body_empty: bool,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn signature(&self) -> String {
        format!("func{}", render_signature(&self.params, &self.results))
    }

    pub fn param_types(&self) -> Vec<String> {
        self.params.iter().map(|f| f.type_string.clone()).collect()
    }

    pub fn result_types(&self) -> Vec<String> {
        self.results.iter().map(|f| f.type_string.clone()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Var,
    Const,
}

/// A package-level `var` or `const` name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueDecl {
    pub name: String,
    pub kind: ValueKind,
    pub type_string: Option<String>,
    pub line: usize,
    pub column: usize,
}

/// A `pkg.Name` reference in an expression or type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedRef {
    pub qualifier: String,
    pub name: String,
    pub line: usize,
    pub column: usize,
    /// The qualifier is a parameter or local of the enclosing function
    pub shadowed: bool,
}

/// A local variable declared and never read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedLocal {
    pub name: String,
    pub function: String,
    pub line: usize,
    pub column: usize,
}

/// Owned summary of one parsed Go file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoFile {
    pub path: PathBuf,
    /// Package clause name; empty when the clause is missing
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub types: Vec<TypeDecl>,
    pub functions: Vec<FuncDecl>,
    pub values: Vec<ValueDecl>,
    pub refs: Vec<QualifiedRef>,
    /// Identifiers used as the operand of an unshadowed qualified reference
    pub qualifiers: BTreeSet<String>,
    pub unused_locals: Vec<UnusedLocal>,
    pub syntax_errors: Vec<Diagnostic>,
    pub is_test: bool,
    pub generated: bool,
    /// Carries a `//go:build ignore` constraint
    pub build_ignored: bool,
}

impl GoFile {
    pub fn has_syntax_errors(&self) -> bool {
        !self.syntax_errors.is_empty()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Package-level functions, methods excluded
    pub fn plain_functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.functions.iter().filter(|f| !f.is_method())
    }

    pub fn methods(&self) -> impl Iterator<Item = &FuncDecl> {
        self.functions.iter().filter(|f| f.is_method())
    }
}

/// Exported Go identifiers start with an upper-case letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}
