//! Code validation at basic, standard and strict levels
//!
//! Every operation returns a [`ValidationOutcome`]: findings travel in the
//! result, while failures to load or read anything are `Err`.

pub mod checks;
pub mod project;
pub mod result;

pub use result::{
    ValidationError, ValidationOutcome, ValidationResult, ValidationStats, ValidationWarning,
};

use crate::config::AnalyzerOptions;
use crate::constants::codes;
use crate::deps::{DependencyChecker, DependencyGraph, cycle_edges};
use crate::errors::ReadgoError;
use crate::interfaces::Validator;
use crate::module::{Package, PackageLoader};
use crate::syntax::parse_file;
use crate::utils::filesystem::{absolutize, clean_path, relative_slash, resolve_within};
use crate::utils::{blocking_with_timeout, with_timeout};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// How much checking a validation run does
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Syntax and package loading only
    Basic,
    /// Adds blank imports and empty function bodies
    #[default]
    Standard,
    /// Adds unused imports and locals, type errors, external dependencies and cycles
    Strict,
}

impl FromStr for ValidationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(ValidationLevel::Basic),
            "standard" => Ok(ValidationLevel::Standard),
            "strict" => Ok(ValidationLevel::Strict),
            other => Err(format!(
                "unknown validation level '{}' (expected basic, standard or strict)",
                other
            )),
        }
    }
}

impl std::fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValidationLevel::Basic => "basic",
            ValidationLevel::Standard => "standard",
            ValidationLevel::Strict => "strict",
        };
        f.write_str(name)
    }
}

/// Validator over a work directory
#[derive(Debug, Clone)]
pub struct DefaultValidator {
    options: AnalyzerOptions,
    work_dir: PathBuf,
}

impl DefaultValidator {
    pub fn new(options: AnalyzerOptions) -> Self {
        let work_dir =
            absolutize(&options.work_dir).unwrap_or_else(|_| clean_path(&options.work_dir));
        Self { options, work_dir }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn level(&self) -> ValidationLevel {
        self.options.validation_level
    }

    fn loader(&self) -> Result<PackageLoader> {
        PackageLoader::new(&self.work_dir, self.options.include_tests)
    }

    fn validate_file_sync(&self, path: &str) -> Result<ValidationOutcome> {
        if path.trim().is_empty() {
            return Err(ReadgoError::invalid_input("file path cannot be empty").into());
        }
        let abs = resolve_within(&self.work_dir, path)?;
        if !abs.is_file() {
            return Err(ReadgoError::not_found(format!("file {}", path)).into());
        }

        let file = parse_file(&abs)?;
        let label = relative_slash(&self.work_dir, &abs);
        let mut result = ValidationResult::new(file.file_name(), path);
        result.stats.files_checked = 1;
        result.imports = file.imports.iter().map(|i| i.path.clone()).collect();

        if file.has_syntax_errors() {
            for diag in &file.syntax_errors {
                result.add_error(
                    codes::SYNTAX_ERROR,
                    diag.message.clone(),
                    &label,
                    diag.line,
                    diag.column,
                );
            }
            return Ok(ValidationOutcome::from_result(result));
        }

        let level = self.level();
        let loader = if level >= ValidationLevel::Strict {
            Some(self.loader()?)
        } else {
            None
        };
        checks::check_file_lints(loader.as_ref(), &file, &label, level, &mut result);
        if let Some(loader) = &loader {
            checks::check_redeclarations(loader, &[&file], &mut result);
            checks::check_qualified_refs(loader, &file, &mut result);
        }

        Ok(ValidationOutcome::from_result(result))
    }

    fn validate_package_sync(&self, path: &str) -> Result<ValidationOutcome> {
        if path.trim().is_empty() {
            return Err(ReadgoError::invalid_input("package path cannot be empty").into());
        }
        let loader = self.loader()?;
        let pkg = loader.load_package(path)?;
        let mut result = checks::check_package(&loader, &pkg, self.level());
        result.path = path.to_string();
        Ok(ValidationOutcome::from_result(result))
    }

    /// Loader, every package under it, and an empty project result
    fn load_project(&self) -> Result<(PackageLoader, Vec<Arc<Package>>, ValidationResult)> {
        let loader = self.loader()?;
        let name = match loader.module() {
            Some(gomod) => gomod.module.clone(),
            None => self
                .work_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let result = ValidationResult::new(name, self.work_dir.display().to_string());
        let packages = loader.load_all()?;
        Ok((loader, packages, result))
    }

    async fn validate_project_inner(&self) -> Result<ValidationOutcome> {
        let this = self.clone();
        let (loader, packages, result) =
            tokio::task::spawn_blocking(move || this.load_project()).await??;
        let loader = Arc::new(loader);

        let level = self.level();
        let mut result = project::validate_packages(
            Arc::clone(&loader),
            packages.clone(),
            level,
            self.options.concurrency(),
            result,
        )
        .await?;

        if level >= ValidationLevel::Strict {
            let loader = Arc::clone(&loader);
            let packages = packages.clone();
            result = tokio::task::spawn_blocking(move || {
                check_module_graph(&loader, &packages, &mut result);
                result
            })
            .await?;
        }

        let mut imports: Vec<String> = packages
            .iter()
            .flat_map(|p| p.imports.iter().cloned())
            .collect();
        imports.sort();
        imports.dedup();
        result.imports = imports;

        Ok(ValidationOutcome::from_result(result))
    }

    fn validate_dependencies_sync(&self, pkg_path: &str) -> Result<ValidationOutcome> {
        let loader = self.loader()?;
        let pkg = loader.load_package(pkg_path)?;
        let mut result = ValidationResult::new(pkg.name.clone(), pkg_path);
        result.stats.packages_checked = 1;
        result.imports = pkg.imports.iter().cloned().collect();

        if pkg.has_errors() {
            checks::add_package_errors(&loader, &pkg, &mut result);
            return Ok(ValidationOutcome::from_result(result));
        }

        let mut checker = DependencyChecker::new(&loader);
        checker.check_package(&pkg, &mut result);
        result.external_deps = checker.external_deps();
        Ok(ValidationOutcome::from_result(result))
    }

    fn validate_external_sync(&self) -> Result<ValidationOutcome> {
        let loader = self.loader()?;
        let name = loader.module_path().to_string();
        let mut result = ValidationResult::new(name, self.work_dir.display().to_string());

        let packages = loader.load_all()?;
        let mut checker = DependencyChecker::new(&loader);
        checker.check_module(&packages, &mut result)?;
        result.external_deps = checker.external_deps();
        Ok(ValidationOutcome::from_result(result))
    }

    fn check_cycles_sync(&self, pkg_path: &str) -> Result<ValidationOutcome> {
        let loader = self.loader()?;
        let pkg = loader.load_package(pkg_path)?;
        let mut result = ValidationResult::new(pkg.name.clone(), pkg_path);
        result.stats.packages_checked = 1;
        result.imports = pkg.imports.iter().cloned().collect();

        if pkg.has_errors() {
            checks::add_package_errors(&loader, &pkg, &mut result);
            return Ok(ValidationOutcome::from_result(result));
        }

        let graph = DependencyGraph::build(&loader, &pkg)?;
        let cycles = graph.find_cycles(&pkg.import_path);
        record_cycles(&loader, &cycles, &mut result);
        Ok(ValidationOutcome::from_result(result))
    }
}

/// External dependencies and import cycles across the whole module
fn check_module_graph(
    loader: &PackageLoader,
    packages: &[Arc<Package>],
    result: &mut ValidationResult,
) {
    let mut checker = DependencyChecker::new(loader);
    let mut deps = ValidationResult::new(result.name.clone(), result.path.clone());
    for pkg in packages.iter().filter(|p| !p.has_errors()) {
        checker.check_package(pkg, &mut deps);
    }
    result.errors.extend(deps.errors);
    result.warnings.extend(deps.warnings);
    result.external_deps = checker.external_deps();

    let graph = DependencyGraph::from_packages(loader, packages);
    let cycles = graph.find_all_cycles();
    record_cycles(loader, &cycles, result);
}

/// Store cycle edges and one `CIRCULAR_DEPENDENCY` error per cycle
fn record_cycles(loader: &PackageLoader, cycles: &[Vec<String>], result: &mut ValidationResult) {
    let label = |path: &str| loader.relative_name(path);
    result.circular_deps = cycle_edges(cycles, label);
    result.has_circular_deps = !cycles.is_empty();

    for cycle in cycles {
        let rendered: Vec<String> = cycle.iter().map(|p| label(p)).collect();
        result.add_error(
            codes::CIRCULAR_DEPENDENCY,
            format!("import cycle not allowed: {}", rendered.join(" -> ")),
            "",
            0,
            0,
        );
    }
}

#[async_trait]
impl Validator for DefaultValidator {
    async fn validate_file(&self, path: &str) -> Result<ValidationOutcome> {
        let this = self.clone();
        let path = path.to_string();
        blocking_with_timeout("validate file", None, move || this.validate_file_sync(&path)).await
    }

    async fn validate_package(&self, path: &str) -> Result<ValidationOutcome> {
        let this = self.clone();
        let path = path.to_string();
        blocking_with_timeout("validate package", self.options.analysis_timeout, move || {
            this.validate_package_sync(&path)
        })
        .await
    }

    async fn validate_project(&self) -> Result<ValidationOutcome> {
        with_timeout(
            "validate project",
            self.options.analysis_timeout,
            self.validate_project_inner(),
        )
        .await
    }

    async fn validate_dependencies(&self, pkg_path: &str) -> Result<ValidationOutcome> {
        let this = self.clone();
        let pkg_path = pkg_path.to_string();
        blocking_with_timeout("validate dependencies", self.options.analysis_timeout, move || {
            this.validate_dependencies_sync(&pkg_path)
        })
        .await
    }

    async fn validate_external_dependencies(&self) -> Result<ValidationOutcome> {
        let this = self.clone();
        blocking_with_timeout(
            "validate external dependencies",
            self.options.analysis_timeout,
            move || this.validate_external_sync(),
        )
        .await
    }

    async fn check_circular_dependencies(&self, pkg_path: &str) -> Result<ValidationOutcome> {
        let this = self.clone();
        let pkg_path = pkg_path.to_string();
        blocking_with_timeout("check circular dependencies", self.options.analysis_timeout, move || {
            this.check_cycles_sync(&pkg_path)
        })
        .await
    }
}
