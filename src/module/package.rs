//! Loaded packages and package-scope lookup

use crate::syntax::{FuncDecl, GoFile, TypeDecl, TypeKind, ValueDecl, ValueKind, is_exported};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Where a package was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageOrigin {
    /// Inside the main module
    Local,
    Vendor,
    ModuleCache,
    /// A directory named by a local `replace` directive
    Replaced,
    /// `GOROOT/src`
    Stdlib,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageErrorKind {
    Syntax,
    Name,
    Import,
}

/// A loader-level error attached to a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageError {
    pub kind: PackageErrorKind,
    pub message: String,
    pub file: Option<PathBuf>,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for PackageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) if self.line > 0 => write!(
                f,
                "{}:{}:{}: {}",
                file.display(),
                self.line,
                self.column,
                self.message
            ),
            Some(file) => write!(f, "{}: {}", file.display(), self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A symbol found in package scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol<'a> {
    Type(&'a TypeDecl),
    Func(&'a FuncDecl),
    Var(&'a ValueDecl),
    Const(&'a ValueDecl),
}

impl Symbol<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Symbol::Type(_) => "type",
            Symbol::Func(_) => "func",
            Symbol::Var(_) => "var",
            Symbol::Const(_) => "const",
        }
    }
}

/// A package: the Go files of one directory sharing a package clause
#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub import_path: String,
    pub name: String,
    pub dir: PathBuf,
    pub origin: PackageOrigin,
    pub files: Vec<GoFile>,
    /// Imports of non-test files
    pub imports: BTreeSet<String>,
    /// Imports that only test files add
    pub test_imports: BTreeSet<String>,
    pub errors: Vec<PackageError>,
}

impl Package {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Every import of the package, test files included
    pub fn all_imports(&self) -> BTreeSet<String> {
        self.imports.union(&self.test_imports).cloned().collect()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.files.iter().flat_map(|f| f.types.iter())
    }

    /// Package-level functions, methods excluded
    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.files.iter().flat_map(|f| f.plain_functions())
    }

    pub fn methods(&self) -> impl Iterator<Item = &FuncDecl> {
        self.files.iter().flat_map(|f| f.methods())
    }

    pub fn values(&self) -> impl Iterator<Item = &ValueDecl> {
        self.files.iter().flat_map(|f| f.values.iter())
    }

    /// Look a name up in package scope; methods are not in scope
    pub fn lookup(&self, name: &str) -> Option<Symbol<'_>> {
        if let Some(ty) = self.types().find(|t| t.name == name) {
            return Some(Symbol::Type(ty));
        }
        if let Some(func) = self.functions().find(|f| f.name == name) {
            return Some(Symbol::Func(func));
        }
        self.values().find(|v| v.name == name).map(|v| match v.kind {
            ValueKind::Var => Symbol::Var(v),
            ValueKind::Const => Symbol::Const(v),
        })
    }

    /// Every name declared in package scope, sorted
    pub fn scope_names(&self) -> BTreeSet<&str> {
        self.types()
            .map(|t| t.name.as_str())
            .chain(self.functions().map(|f| f.name.as_str()))
            .chain(self.values().map(|v| v.name.as_str()))
            .collect()
    }

    /// Exported names of the package scope
    pub fn exported_names(&self) -> BTreeSet<&str> {
        self.scope_names()
            .into_iter()
            .filter(|name| is_exported(name))
            .collect()
    }

    /// Kind of a type after following same-package named types
    ///
    /// `type A B` where `B` is an interface makes `A` an interface too.
    pub fn underlying_kind(&self, ty: &TypeDecl) -> TypeKind {
        self.underlying_decl(ty).kind
    }

    /// The declaration whose underlying type is rendered for `ty`
    pub fn underlying_decl<'a>(&'a self, ty: &'a TypeDecl) -> &'a TypeDecl {
        let mut current = ty;
        let mut seen = BTreeSet::new();
        while current.kind == TypeKind::Other && seen.insert(current.name.as_str()) {
            match self.types().find(|t| t.name == current.underlying) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use std::path::Path;

    fn package(sources: &[(&str, &str)]) -> Package {
        let files: Vec<GoFile> = sources
            .iter()
            .map(|(name, src)| parse_source(Path::new(name), src).unwrap())
            .collect();
        Package {
            import_path: "testmod/multi".to_string(),
            name: files[0].package.clone(),
            dir: PathBuf::from("multi"),
            origin: PackageOrigin::Local,
            imports: BTreeSet::new(),
            test_imports: BTreeSet::new(),
            errors: Vec::new(),
            files,
        }
    }

    #[test]
    fn test_lookup_across_files() {
        let pkg = package(&[
            (
                "file1.go",
                "package multi\n\ntype Service interface{ Run() error }\n\nfunc NewService() Service { return nil }\n",
            ),
            (
                "file2.go",
                "package multi\n\ntype Manager struct{}\n\nfunc (m *Manager) Start() {}\n\nvar Default Manager\n\nconst limit = 3\n",
            ),
        ]);

        assert!(matches!(pkg.lookup("Service"), Some(Symbol::Type(_))));
        assert!(matches!(pkg.lookup("NewService"), Some(Symbol::Func(_))));
        assert!(matches!(pkg.lookup("Default"), Some(Symbol::Var(_))));
        assert!(matches!(pkg.lookup("limit"), Some(Symbol::Const(_))));
        assert!(pkg.lookup("Start").is_none());
        assert_eq!(pkg.lookup("Default").map(|s| s.kind_name()), Some("var"));

        let exported: Vec<_> = pkg.exported_names().into_iter().collect();
        assert_eq!(exported, vec!["Default", "Manager", "NewService", "Service"]);
    }

    #[test]
    fn test_underlying_kind_follows_named_types() {
        let pkg = package(&[(
            "types.go",
            "package multi\n\ntype Base interface{ Close() error }\n\ntype Closer Base\n\ntype Loop Loop2\n\ntype Loop2 Loop\n",
        )]);

        let closer = pkg.types().find(|t| t.name == "Closer").unwrap();
        assert_eq!(pkg.underlying_kind(closer), TypeKind::Interface);
        assert_eq!(pkg.underlying_decl(closer).name, "Base");

        let looping = pkg.types().find(|t| t.name == "Loop").unwrap();
        assert_eq!(pkg.underlying_kind(looping), TypeKind::Other);
    }

    #[test]
    fn test_package_error_display() {
        let err = PackageError {
            kind: PackageErrorKind::Syntax,
            message: "syntax error: unexpected }".to_string(),
            file: Some(PathBuf::from("a.go")),
            line: 3,
            column: 1,
        };
        assert_eq!(err.to_string(), "a.go:3:1: syntax error: unexpected }");
    }
}
