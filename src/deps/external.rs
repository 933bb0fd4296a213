//! Import resolution checks against the module and its `go.mod` requirements

use crate::constants::{codes, warnings};
use crate::module::{Package, PackageLoader, is_standard_library};
use crate::utils::filesystem::relative_slash;
use crate::validator::ValidationResult;
use anyhow::Result;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::Arc;

/// Checks each distinct import path once
///
/// Standard-library imports are accepted as they are. Module-local imports
/// must resolve to a package. Anything else must be provided by a `go.mod`
/// requirement; a requirement missing from vendor and the module cache is
/// only a warning, reported once per module.
pub struct DependencyChecker<'a> {
    loader: &'a PackageLoader,
    checked: HashSet<String>,
    missing_modules: HashSet<String>,
    external: BTreeSet<String>,
}

impl<'a> DependencyChecker<'a> {
    pub fn new(loader: &'a PackageLoader) -> Self {
        Self {
            loader,
            checked: HashSet::new(),
            missing_modules: HashSet::new(),
            external: BTreeSet::new(),
        }
    }

    /// Check the imports of every file of a package
    pub fn check_package(&mut self, pkg: &Package, result: &mut ValidationResult) {
        for file in &pkg.files {
            let file_name = relative_slash(self.loader.work_dir(), &file.path);
            for import in &file.imports {
                if self.checked.insert(import.path.clone()) {
                    self.check_import(&import.path, &file_name, import.line, import.column, result);
                }
            }
        }
    }

    fn check_import(
        &mut self,
        import_path: &str,
        file: &str,
        line: usize,
        column: usize,
        result: &mut ValidationResult,
    ) {
        if self.loader.is_local(import_path) {
            if self.loader.resolve(import_path).is_none() {
                result.add_error(
                    codes::DEPENDENCY_ERROR,
                    format!("cannot resolve module-local import {}", import_path),
                    file,
                    line,
                    column,
                );
            }
            return;
        }

        if is_standard_library(import_path) {
            return;
        }

        self.external.insert(import_path.to_string());

        let Some(gomod) = self.loader.module() else {
            result.add_error(
                codes::DEPENDENCY_ERROR,
                format!("import {} requires a go.mod file", import_path),
                file,
                line,
                column,
            );
            return;
        };

        let Some(requirement) = gomod.requirement_for(import_path) else {
            result.add_error(
                codes::DEPENDENCY_ERROR,
                format!("no required module provides package {}", import_path),
                file,
                line,
                column,
            );
            return;
        };

        if !self
            .loader
            .requirement_available(&requirement.path, &requirement.version)
            && self.missing_modules.insert(requirement.path.clone())
        {
            result.add_warning(
                warnings::MISSING_DEPENDENCY,
                format!(
                    "module {}@{} not found in vendor or module cache",
                    requirement.path, requirement.version
                ),
                file,
                line,
                column,
            );
        }
    }

    /// Walk the module from `roots`, following module-local imports with a worklist
    pub fn check_module(
        &mut self,
        roots: &[Arc<Package>],
        result: &mut ValidationResult,
    ) -> Result<()> {
        let mut seen: HashSet<String> = roots.iter().map(|p| p.import_path.clone()).collect();
        let mut queue: VecDeque<Arc<Package>> = roots.iter().cloned().collect();

        while let Some(pkg) = queue.pop_front() {
            self.check_package(&pkg, result);
            result.stats.packages_checked += 1;

            for import in pkg.all_imports() {
                if self.loader.is_local(&import) && seen.insert(import.clone()) {
                    if let Some(next) = self.loader.load_import(&import)? {
                        queue.push_back(next);
                    }
                }
            }
        }
        Ok(())
    }

    /// External import paths seen so far, sorted
    pub fn external_deps(&self) -> Vec<String> {
        self.external.iter().cloned().collect()
    }
}
