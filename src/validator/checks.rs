//! Per-file and per-package validation routines
//!
//! Everything here is synchronous; callers decide whether packages are
//! checked one after another or fanned out over tasks.

use super::{ValidationLevel, ValidationResult};
use crate::constants::codes;
use crate::module::{Package, PackageErrorKind, PackageLoader};
use crate::syntax::{GoFile, ImportSpec, inspect, is_exported};
use crate::utils::filesystem::relative_slash;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Validate one loaded package into a partial result
///
/// Loader errors end the check early; lint and type checks only run on
/// packages that loaded cleanly.
pub fn check_package(
    loader: &PackageLoader,
    pkg: &Package,
    level: ValidationLevel,
) -> ValidationResult {
    let mut result = ValidationResult::new(pkg.name.clone(), pkg.import_path.clone());
    result.stats.packages_checked = 1;
    result.stats.files_checked = pkg.files.len();
    result.imports = pkg.imports.iter().cloned().collect();

    if pkg.has_errors() {
        add_package_errors(loader, pkg, &mut result);
        return result;
    }

    for file in &pkg.files {
        let label = relative_slash(loader.work_dir(), &file.path);
        check_file_lints(Some(loader), file, &label, level, &mut result);
    }

    if level >= ValidationLevel::Strict {
        let files: Vec<&GoFile> = pkg.files.iter().collect();
        check_redeclarations(loader, &files, &mut result);
        for file in &pkg.files {
            check_qualified_refs(loader, file, &mut result);
        }
    }

    result
}

/// Record a package's loader errors with their validation codes
pub fn add_package_errors(loader: &PackageLoader, pkg: &Package, result: &mut ValidationResult) {
    for error in &pkg.errors {
        let code = match error.kind {
            PackageErrorKind::Syntax => codes::SYNTAX_ERROR,
            PackageErrorKind::Name => codes::PACKAGE_ERROR,
            PackageErrorKind::Import => codes::DEPENDENCY_ERROR,
        };
        let file = error
            .file
            .as_deref()
            .map(|path| relative_slash(loader.work_dir(), path))
            .unwrap_or_default();
        result.add_error(code, error.message.clone(), &file, error.line, error.column);
    }
}

/// Level-gated lint checks of one file
///
/// `standard` adds blank imports and empty bodies; `strict` adds unused
/// imports and unused locals. Without a loader, import names are guessed
/// from their paths.
pub fn check_file_lints(
    loader: Option<&PackageLoader>,
    file: &GoFile,
    label: &str,
    level: ValidationLevel,
    result: &mut ValidationResult,
) {
    if level < ValidationLevel::Standard {
        return;
    }

    for finding in inspect::blank_imports(file) {
        result.add_finding(finding, label);
    }
    for finding in inspect::empty_functions(file) {
        result.add_finding(finding, label);
    }

    if level < ValidationLevel::Strict {
        return;
    }

    let findings = inspect::unused_imports(file, |import| match loader {
        Some(loader) => resolved_local_name(loader, import),
        None => import.local_name(),
    });
    for finding in findings {
        result.add_finding(finding, label);
    }
    for finding in inspect::unused_variables(file) {
        result.add_finding(finding, label);
    }
}

/// Name an import binds: its alias, the resolved package clause, or a guess
fn resolved_local_name(loader: &PackageLoader, import: &ImportSpec) -> String {
    if let Some(alias) = &import.alias {
        return alias.clone();
    }
    match loader.load_import(&import.path) {
        Ok(Some(pkg)) if !pkg.name.is_empty() => pkg.name.clone(),
        _ => import.local_name(),
    }
}

/// Package-scope names declared more than once, and duplicate methods
pub fn check_redeclarations(
    loader: &PackageLoader,
    files: &[&GoFile],
    result: &mut ValidationResult,
) {
    let mut declared: HashSet<&str> = HashSet::new();
    let mut methods: HashSet<(String, &str)> = HashSet::new();

    for file in files {
        let label = relative_slash(loader.work_dir(), &file.path);

        let scope = file
            .types
            .iter()
            .map(|t| (t.name.as_str(), t.line, t.column))
            .chain(
                file.plain_functions()
                    .filter(|f| f.name != "init")
                    .map(|f| (f.name.as_str(), f.line, f.column)),
            )
            .chain(file.values.iter().map(|v| (v.name.as_str(), v.line, v.column)));

        // Positions keep each file's report in source order.
        let mut in_file: BTreeMap<(usize, usize), &str> = BTreeMap::new();
        for (name, line, column) in scope {
            if name != "_" {
                in_file.insert((line, column), name);
            }
        }
        for ((line, column), name) in in_file {
            if !declared.insert(name) {
                result.add_error(
                    codes::TYPE_ERROR,
                    format!("{} redeclared in this block", name),
                    &label,
                    line,
                    column,
                );
            }
        }

        for method in file.methods() {
            if method.name == "_" {
                continue;
            }
            let receiver = method.receiver_base.clone().unwrap_or_default();
            if !methods.insert((receiver.clone(), method.name.as_str())) {
                result.add_error(
                    codes::TYPE_ERROR,
                    format!("method {}.{} already declared", receiver, method.name),
                    &label,
                    method.line,
                    method.column,
                );
            }
        }
    }
}

/// `pkg.Name` references into module-local packages must name an exported symbol
pub fn check_qualified_refs(loader: &PackageLoader, file: &GoFile, result: &mut ValidationResult) {
    let label = relative_slash(loader.work_dir(), &file.path);

    let mut targets: HashMap<String, Arc<Package>> = HashMap::new();
    for import in &file.imports {
        if import.is_blank() || import.is_dot() || !loader.is_local(&import.path) {
            continue;
        }
        if let Ok(Some(pkg)) = loader.load_import(&import.path) {
            let name = import.alias.clone().unwrap_or_else(|| pkg.name.clone());
            targets.insert(name, pkg);
        }
    }

    for reference in file.refs.iter().filter(|r| !r.shadowed) {
        let Some(target) = targets.get(&reference.qualifier) else {
            continue;
        };
        match target.lookup(&reference.name) {
            Some(_) if is_exported(&reference.name) => {}
            Some(_) => result.add_error(
                codes::TYPE_ERROR,
                format!(
                    "name {} not exported by package {}",
                    reference.name, target.name
                ),
                &label,
                reference.line,
                reference.column,
            ),
            None => result.add_error(
                codes::TYPE_ERROR,
                format!("undefined: {}.{}", reference.qualifier, reference.name),
                &label,
                reference.line,
                reference.column,
            ),
        }
    }
}
