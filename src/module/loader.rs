//! Package discovery, import resolution and loading

use super::gomod::{GoMod, find_module_root, is_standard_library, is_within_module};
use super::package::{Package, PackageError, PackageErrorKind, PackageOrigin};
use super::target::BuildTarget;
use crate::constants::module::{
    EXTERNAL_TEST_SUFFIX, GO_MOD_FILE, GOMODCACHE_ENV, GOPATH_ENV, GOROOT_ENV, TESTDATA_DIR,
    VENDOR_DIR,
};
use crate::errors::ReadgoError;
use crate::syntax::{GoFile, parse_file};
use crate::utils::filesystem::{relative_slash, resolve_within};
use crate::utils::filters::is_go_file;
use anyhow::Result;
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

/// A directory an import path resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub dir: PathBuf,
    pub origin: PackageOrigin,
}

/// Loads packages of one module, memoizing by import path
///
/// Module-local packages are parsed with their imports checked; packages
/// from vendor, the module cache or `GOROOT` are parsed on demand without
/// checks. Import cycles are not loader errors. Files whose `_GOOS` or
/// `_GOARCH` name suffix excludes the target are skipped.
#[derive(Debug)]
pub struct PackageLoader {
    work_dir: PathBuf,
    module_root: Option<PathBuf>,
    gomod: Option<GoMod>,
    include_tests: bool,
    target: BuildTarget,
    loaded: DashMap<String, Arc<Package>>,
}

impl PackageLoader {
    /// Create a loader for `work_dir`, which must be absolute and clean
    pub fn new(work_dir: &Path, include_tests: bool) -> Result<Self> {
        let module_root = find_module_root(work_dir);
        let gomod = match &module_root {
            Some(root) => Some(GoMod::load(root)?),
            None => None,
        };

        Ok(Self {
            work_dir: work_dir.to_path_buf(),
            module_root,
            gomod,
            include_tests,
            target: BuildTarget::host(),
            loaded: DashMap::new(),
        })
    }

    /// Load files for `target` instead of the host platform
    pub fn with_target(mut self, target: BuildTarget) -> Self {
        self.target = target;
        self
    }

    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn module(&self) -> Option<&GoMod> {
        self.gomod.as_ref()
    }

    /// Module path, empty outside a module
    pub fn module_path(&self) -> &str {
        self.gomod.as_ref().map(|m| m.module.as_str()).unwrap_or("")
    }

    pub fn module_root(&self) -> Option<&Path> {
        self.module_root.as_deref()
    }

    /// Whether an import path names a package of the main module
    pub fn is_local(&self, import_path: &str) -> bool {
        is_within_module(self.module_path(), import_path)
    }

    /// Module-relative display name; the module root package keeps the module path
    pub fn relative_name(&self, import_path: &str) -> String {
        let module = self.module_path();
        match import_path
            .strip_prefix(module)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(rest) if !module.is_empty() => rest.to_string(),
            _ => import_path.to_string(),
        }
    }

    /// Import path of a directory inside the module
    pub fn import_path_for_dir(&self, dir: &Path) -> String {
        match (&self.module_root, &self.gomod) {
            (Some(root), Some(gomod)) if dir.starts_with(root) => {
                match relative_slash(root, dir).as_str() {
                    "." => gomod.module.clone(),
                    rel => format!("{}/{}", gomod.module, rel),
                }
            }
            _ => relative_slash(&self.work_dir, dir),
        }
    }

    fn local_dir(&self, import_path: &str) -> Option<PathBuf> {
        let root = self.module_root.as_ref()?;
        let module = self.module_path();
        if import_path == module {
            return Some(root.clone());
        }
        let rest = import_path.strip_prefix(module)?.strip_prefix('/')?;
        Some(root.join(rest))
    }

    /// Map an import path to a directory holding Go files
    pub fn resolve(&self, import_path: &str) -> Option<ResolvedImport> {
        if self.is_local(import_path) {
            return self
                .local_dir(import_path)
                .filter(|dir| has_go_files(dir, &self.target))
                .map(|dir| ResolvedImport {
                    dir,
                    origin: PackageOrigin::Local,
                });
        }

        if is_standard_library(import_path) {
            let goroot = std::env::var_os(GOROOT_ENV)?;
            let dir = PathBuf::from(goroot).join("src").join(import_path);
            return has_go_files(&dir, &self.target).then_some(ResolvedImport {
                dir,
                origin: PackageOrigin::Stdlib,
            });
        }

        if let Some(root) = &self.module_root {
            let vendored = root.join(VENDOR_DIR).join(import_path);
            if has_go_files(&vendored, &self.target) {
                return Some(ResolvedImport {
                    dir: vendored,
                    origin: PackageOrigin::Vendor,
                });
            }
        }

        let gomod = self.gomod.as_ref()?;
        let requirement = gomod.requirement_for(import_path)?;
        let subdir = import_path[requirement.path.len()..].trim_start_matches('/');

        let (module_path, version) =
            match gomod.replacement_for(&requirement.path, &requirement.version) {
                Some(replacement) if replacement.is_local() => {
                    let base = self.module_root.as_ref()?.join(&replacement.new_path);
                    let dir = base.join(subdir);
                    return has_go_files(&dir, &self.target).then_some(ResolvedImport {
                        dir,
                        origin: PackageOrigin::Replaced,
                    });
                }
                Some(replacement) => (
                    replacement.new_path.as_str(),
                    replacement
                        .new_version
                        .as_deref()
                        .unwrap_or(&requirement.version),
                ),
                None => (requirement.path.as_str(), requirement.version.as_str()),
            };

        let dir = module_cache_dir()?
            .join(format!("{}@{}", escape_module_path(module_path), version))
            .join(subdir);
        has_go_files(&dir, &self.target).then_some(ResolvedImport {
            dir,
            origin: PackageOrigin::ModuleCache,
        })
    }

    /// Whether a required module is present in vendor or the module cache
    pub fn requirement_available(&self, module_path: &str, version: &str) -> bool {
        if let Some(root) = &self.module_root {
            if root.join(VENDOR_DIR).join(module_path).is_dir() {
                return true;
            }
            if let Some(replacement) = self
                .gomod
                .as_ref()
                .and_then(|m| m.replacement_for(module_path, version))
            {
                if replacement.is_local() {
                    return root.join(&replacement.new_path).is_dir();
                }
            }
        }
        module_cache_dir().is_some_and(|cache| {
            cache
                .join(format!("{}@{}", escape_module_path(module_path), version))
                .is_dir()
        })
    }

    /// Load a package named by a directory or an import path
    ///
    /// `.`, `./x`, `../x` and absolute paths are directories under the work
    /// dir. A bare name without `/` is tried as `./name` first. Anything else
    /// is an import path.
    pub fn load_package(&self, pattern: &str) -> Result<Arc<Package>> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ReadgoError::invalid_input("package path cannot be empty").into());
        }

        let explicit_dir = pattern == "."
            || pattern.starts_with("./")
            || pattern.starts_with("../")
            || Path::new(pattern).is_absolute();

        if explicit_dir {
            let dir = resolve_within(&self.work_dir, pattern)?;
            return self.load_local_dir(&dir);
        }

        if !self.is_local(pattern) {
            let dir = resolve_within(&self.work_dir, pattern)?;
            if dir.is_dir() {
                return self.load_local_dir(&dir);
            }
        }

        self.load_import(pattern)?
            .ok_or_else(|| ReadgoError::not_found(format!("package {}", pattern)).into())
    }

    /// Load an import path; `None` when it cannot be resolved
    pub fn load_import(&self, import_path: &str) -> Result<Option<Arc<Package>>> {
        if let Some(pkg) = self.loaded.get(import_path) {
            return Ok(Some(Arc::clone(pkg.value())));
        }

        let Some(resolved) = self.resolve(import_path) else {
            return Ok(None);
        };

        let check_imports = resolved.origin == PackageOrigin::Local;
        let mut packages = self.load_dir(&resolved.dir, import_path, resolved.origin, check_imports)?;
        if packages.is_empty() {
            return Ok(None);
        }
        let pkg = Arc::new(packages.swap_remove(0));
        self.loaded
            .insert(import_path.to_string(), Arc::clone(&pkg));
        Ok(Some(pkg))
    }

    fn load_local_dir(&self, dir: &Path) -> Result<Arc<Package>> {
        if !dir.is_dir() {
            return Err(ReadgoError::not_found(format!("directory {}", dir.display())).into());
        }

        let import_path = self.import_path_for_dir(dir);
        if let Some(pkg) = self.loaded.get(&import_path) {
            return Ok(Arc::clone(pkg.value()));
        }

        let mut packages = self.load_dir(dir, &import_path, PackageOrigin::Local, true)?;
        if packages.is_empty() {
            return Err(ReadgoError::not_found(format!("no Go files in {}", dir.display())).into());
        }
        let pkg = Arc::new(packages.swap_remove(0));
        self.loaded.insert(import_path, Arc::clone(&pkg));
        Ok(pkg)
    }

    /// Every package under the work dir, external test packages included
    ///
    /// Skips hidden and `_`-prefixed directories, `testdata`, `vendor` and
    /// nested modules. Sorted by import path.
    pub fn load_all(&self) -> Result<Vec<Arc<Package>>> {
        let root = self.work_dir.clone();
        let mut packages = Vec::new();

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| keep_dir(entry, &root));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_dir() || !has_go_files(entry.path(), &self.target) {
                continue;
            }

            let import_path = self.import_path_for_dir(entry.path());
            let loaded = self.load_dir(entry.path(), &import_path, PackageOrigin::Local, true)?;
            for (index, pkg) in loaded.into_iter().enumerate() {
                let pkg = Arc::new(pkg);
                if index == 0 {
                    self.loaded
                        .insert(pkg.import_path.clone(), Arc::clone(&pkg));
                }
                packages.push(pkg);
            }
        }

        packages.sort_by(|a, b| a.import_path.cmp(&b.import_path));
        Ok(packages)
    }

    /// Parse one directory into its package and, when present, its external test package
    fn load_dir(
        &self,
        dir: &Path,
        import_path: &str,
        origin: PackageOrigin,
        check_imports: bool,
    ) -> Result<Vec<Package>> {
        let include_tests = self.include_tests && origin == PackageOrigin::Local;
        let mut main_files = Vec::new();
        // `x_test` files form their own package next to the one they test
        let mut external_files = Vec::new();

        for path in go_files_in(dir, &self.target)? {
            let file = parse_file(&path)?;
            if file.build_ignored || (file.is_test && !include_tests) {
                continue;
            }
            if file.is_test && file.package.ends_with(EXTERNAL_TEST_SUFFIX) {
                external_files.push(file);
            } else {
                main_files.push(file);
            }
        }

        let mut packages = Vec::new();
        if !main_files.is_empty() {
            packages.push(self.assemble(dir, import_path.to_string(), origin, main_files, check_imports));
        }
        if !external_files.is_empty() {
            packages.push(self.assemble(
                dir,
                format!("{}{}", import_path, EXTERNAL_TEST_SUFFIX),
                origin,
                external_files,
                check_imports,
            ));
        }
        Ok(packages)
    }

    fn assemble(
        &self,
        dir: &Path,
        import_path: String,
        origin: PackageOrigin,
        files: Vec<GoFile>,
        check_imports: bool,
    ) -> Package {
        let mut errors = Vec::new();

        for file in &files {
            for diag in &file.syntax_errors {
                errors.push(PackageError {
                    kind: PackageErrorKind::Syntax,
                    message: diag.message.clone(),
                    file: Some(file.path.clone()),
                    line: diag.line,
                    column: diag.column,
                });
            }
        }

        let name = package_name(&files, dir, &mut errors);

        let mut imports = BTreeSet::new();
        let mut test_imports = BTreeSet::new();
        for file in &files {
            for import in &file.imports {
                if file.is_test {
                    test_imports.insert(import.path.clone());
                } else {
                    imports.insert(import.path.clone());
                }
            }
        }
        let test_imports: BTreeSet<String> = test_imports.difference(&imports).cloned().collect();

        if check_imports {
            for file in &files {
                for import in &file.imports {
                    if self.is_local(&import.path) && self.resolve(&import.path).is_none() {
                        errors.push(PackageError {
                            kind: PackageErrorKind::Import,
                            message: format!(
                                "could not import {} (cannot find package in module {})",
                                import.path,
                                self.module_path()
                            ),
                            file: Some(file.path.clone()),
                            line: import.line,
                            column: import.column,
                        });
                    }
                }
            }
        }

        Package {
            import_path,
            name,
            dir: dir.to_path_buf(),
            origin,
            files,
            imports,
            test_imports,
            errors,
        }
    }
}

/// Package clause shared by the files; mixed clauses are a loader error
fn package_name(files: &[GoFile], dir: &Path, errors: &mut Vec<PackageError>) -> String {
    let mut by_name: BTreeMap<&str, &GoFile> = BTreeMap::new();
    let mut first: Option<&GoFile> = None;

    for file in files.iter().filter(|f| !f.package.is_empty()) {
        if first.is_none() {
            first = Some(file);
        }
        by_name.entry(file.package.as_str()).or_insert(file);
    }

    let Some(first) = first else {
        return String::new();
    };

    if let Some((other_name, other_file)) = by_name
        .iter()
        .find(|(name, _)| **name != first.package.as_str())
    {
        errors.push(PackageError {
            kind: PackageErrorKind::Name,
            message: format!(
                "found packages {} ({}) and {} ({}) in {}",
                first.package,
                first.file_name(),
                other_name,
                other_file.file_name(),
                dir.display()
            ),
            file: Some(other_file.path.clone()),
            line: 1,
            column: 1,
        });
    }

    first.package.clone()
}

fn keep_dir(entry: &DirEntry, root: &Path) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || name.starts_with('_') || name == TESTDATA_DIR || name == VENDOR_DIR
    {
        return false;
    }
    entry.path() == root || !entry.path().join(GO_MOD_FILE).is_file()
}

fn is_candidate_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    is_go_file(path) && !name.starts_with('_') && !name.starts_with('.') && path.is_file()
}

/// Go source files of a directory built for `target`, sorted by name
pub fn go_files_in(dir: &Path, target: &BuildTarget) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_candidate_source(path) && target.matches_file(path))
        .collect();
    files.sort();
    Ok(files)
}

fn has_go_files(dir: &Path, target: &BuildTarget) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .any(|path| is_candidate_source(&path) && target.matches_file(&path))
        })
        .unwrap_or(false)
}

/// Module cache root: `GOMODCACHE`, else `GOPATH/pkg/mod`, else `~/go/pkg/mod`
pub fn module_cache_dir() -> Option<PathBuf> {
    if let Some(cache) = std::env::var_os(GOMODCACHE_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(cache));
    }
    if let Some(gopath) = std::env::var_os(GOPATH_ENV).filter(|v| !v.is_empty()) {
        if let Some(first) = std::env::split_paths(&gopath).next() {
            return Some(first.join("pkg").join("mod"));
        }
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join("go").join("pkg").join("mod"))
}

/// Module cache escaping: each upper-case letter becomes `!` plus its lower-case form
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}
