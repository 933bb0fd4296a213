//! Type, interface and function queries plus file, package and project analysis

use crate::Result;
use crate::cache::{Cache, CacheStats, FileCacheKey, PackageCacheKey, TypeCacheKey};
use crate::config::AnalyzerOptions;
use crate::errors::ReadgoError;
use crate::interfaces::CodeAnalyzer;
use crate::module::{GoMod, Package, PackageLoader, Symbol, gomod::find_module_root};
use crate::reader::DefaultReader;
use crate::syntax::{FuncDecl, MethodSig, TypeDecl, TypeKind, is_exported, parse_source};
use crate::types::{
    AnalysisResult, FunctionInfo, InterfaceInfo, MethodInfo, TreeOptions, TypeInfo,
};
use crate::utils::filesystem::modified_time;
use crate::utils::{blocking_with_timeout, with_timeout};
use anyhow::anyhow;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// What a lookup is after; also the cache key kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupKind {
    Type,
    Interface,
    Function,
}

impl LookupKind {
    fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Type => "type",
            LookupKind::Interface => "interface",
            LookupKind::Function => "function",
        }
    }
}

/// Analyzer over a work directory with its own cache
///
/// Clones share the cache.
#[derive(Debug, Clone)]
pub struct DefaultAnalyzer {
    options: AnalyzerOptions,
    reader: DefaultReader,
    cache: Arc<Cache>,
}

impl DefaultAnalyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        let cache = Cache::new(options.cache_ttl, options.max_cache_size);
        Self::with_cache(options, cache)
    }

    /// Analyzer using a caller-supplied cache
    pub fn with_cache(options: AnalyzerOptions, cache: Cache) -> Self {
        let reader = DefaultReader::new(&options.work_dir);
        Self {
            options,
            reader,
            cache: Arc::new(cache),
        }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn reader(&self) -> &DefaultReader {
        &self.reader
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    fn work_dir(&self) -> &Path {
        self.reader.work_dir()
    }

    fn loader(&self) -> Result<PackageLoader> {
        PackageLoader::new(self.work_dir(), self.options.include_tests)
    }

    /// Load a package, turning loader errors into a package error
    fn load_clean(&self, loader: &PackageLoader, pkg_path: &str, op: &str) -> Result<Arc<Package>> {
        let pkg = loader.load_package(pkg_path)?;
        if pkg.has_errors() {
            return Err(ReadgoError::package(&pkg.import_path, op, pkg.error_messages()).into());
        }
        Ok(pkg)
    }

    fn lookup(&self, pkg_path: &str, name: &str, kind: LookupKind) -> Result<TypeInfo> {
        if name.trim().is_empty() {
            return Err(
                ReadgoError::invalid_input(format!("{} name cannot be empty", kind.as_str()))
                    .into(),
            );
        }

        let key = TypeCacheKey::new(pkg_path, name, kind.as_str());
        if let Some(cached) = self.cache.get_type(&key) {
            return Ok(cached);
        }

        let loader = self.loader()?;
        let pkg = self.load_clean(&loader, pkg_path, "load package")?;
        let lookup_error = |source: anyhow::Error| -> anyhow::Error {
            ReadgoError::type_lookup(name, pkg_path, Some(kind.as_str()), source).into()
        };

        let info = match pkg.lookup(name) {
            Some(symbol) => symbol_info(&pkg, symbol, kind).map_err(lookup_error)?,
            None => find_in_imports(&loader, &pkg, name, kind).ok_or_else(|| {
                lookup_error(ReadgoError::not_found(format!("{} {}", kind.as_str(), name)).into())
            })?,
        };

        self.cache.set_type(key, info.clone());
        Ok(info)
    }

    async fn timed_lookup(
        &self,
        op: &str,
        pkg_path: &str,
        name: &str,
        kind: LookupKind,
    ) -> Result<TypeInfo> {
        let this = self.clone();
        let (pkg_path, name) = (pkg_path.to_string(), name.to_string());
        blocking_with_timeout(op, self.options.analysis_timeout, move || {
            this.lookup(&pkg_path, &name, kind)
        })
        .await
    }

    fn analyze_file_sync(&self, path: &str) -> Result<AnalysisResult> {
        let abs = self.reader.resolve(path)?;
        let content = self.reader.safe_read(path)?;

        let key = modified_time(&abs)
            .map(|mtime| FileCacheKey::new(&abs.to_string_lossy(), mtime));
        if let Some(cached) = key.as_ref().and_then(|k| self.cache.get_file(k)) {
            return Ok(cached);
        }

        let file = parse_source(&abs, &String::from_utf8_lossy(&content))
            .map_err(|e| ReadgoError::analysis("parse file", path, e))?;

        let mut result = AnalysisResult::new(file.file_name(), path);
        let mut imports = BTreeSet::new();
        for import in &file.imports {
            if imports.insert(import.path.clone()) {
                result.imports.push(import.path.clone());
            }
        }

        for decl in &file.types {
            result.types.push(TypeInfo {
                name: decl.name.clone(),
                package: file.package.clone(),
                type_string: decl.underlying.clone(),
                is_exported: is_exported(&decl.name),
            });
            if decl.kind == TypeKind::Interface {
                result.interfaces.push(interface_info(&file.package, decl, decl));
            }
        }
        for func in &file.functions {
            result.functions.push(function_info(&file.package, func));
        }
        for diag in &file.syntax_errors {
            result
                .errors
                .push(format!("{}:{}:{}: {}", path, diag.line, diag.column, diag.message));
        }
        result.finalize(1);

        if let Some(key) = key {
            self.cache.set_file(key, result.clone());
        }
        Ok(result)
    }

    fn analyze_package_sync(&self, pkg_path: &str) -> Result<AnalysisResult> {
        if pkg_path.trim().is_empty() {
            return Err(ReadgoError::invalid_input("package path cannot be empty").into());
        }

        let key = PackageCacheKey::new(pkg_path, "full");
        if let Some(cached) = self.cache.get_package(&key) {
            return Ok(cached);
        }

        let loader = self.loader()?;
        let pkg = self.load_clean(&loader, pkg_path, "analyze package")?;

        let mut result = AnalysisResult::new(pkg.name.clone(), pkg_path);
        add_scope(&mut result, &pkg, false);

        for import in &pkg.imports {
            result.imports.push(import.clone());
            if let Ok(Some(dep)) = loader.load_import(import) {
                add_scope(&mut result, &dep, true);
            }
        }
        result.finalize(pkg.files.len());

        self.cache.set_package(key, result.clone());
        Ok(result)
    }

    /// Module descriptor and the filtered Go file paths under `path`
    fn project_files(&self, path: &str) -> Result<(GoMod, Vec<String>)> {
        let abs = self.reader.resolve(path)?;
        if !abs.is_dir() {
            return Err(ReadgoError::not_found(format!("directory {}", path)).into());
        }
        let root = find_module_root(&abs)
            .ok_or_else(|| ReadgoError::not_found(format!("go.mod for {}", path)))?;
        let gomod = GoMod::load(&root)?;

        let opts = TreeOptions::go_files()
            .with_excludes(self.options.exclude_patterns.clone())
            .with_includes(self.options.include_patterns.clone());
        let files = self
            .reader
            .file_nodes(path, &opts)?
            .into_iter()
            .map(|node| node.path)
            .collect();
        Ok((gomod, files))
    }

    async fn analyze_project_inner(&self, path: &str) -> Result<AnalysisResult> {
        let this = Arc::new(self.clone());
        let (gomod, files) = {
            let this = Arc::clone(&this);
            let path = path.to_string();
            tokio::task::spawn_blocking(move || this.project_files(&path)).await??
        };

        let semaphore = Arc::new(Semaphore::new(self.options.concurrency()));
        let tasks = files.iter().cloned().map(|file| {
            let this = Arc::clone(&this);
            let semaphore = Arc::clone(&semaphore);

            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                tokio::task::spawn_blocking(move || this.analyze_file_sync(&file)).await?
            })
        });
        let analyses = join_all(tasks).await;

        let mut result = AnalysisResult::new(gomod.module.clone(), path);
        let mut imports = BTreeSet::new();
        for analysis in analyses {
            let analysis = analysis.map_err(|e| anyhow!("file analysis task failed: {}", e))??;
            result.types.extend(analysis.types);
            result.interfaces.extend(analysis.interfaces);
            result.functions.extend(analysis.functions);
            result.errors.extend(analysis.errors);
            imports.extend(analysis.imports);
        }
        result.imports = imports.into_iter().collect();
        result.finalize(files.len());
        Ok(result)
    }
}

/// First resolvable direct import, in sorted order, exporting a matching symbol
fn find_in_imports(
    loader: &PackageLoader,
    pkg: &Package,
    name: &str,
    kind: LookupKind,
) -> Option<TypeInfo> {
    if !is_exported(name) {
        return None;
    }
    pkg.imports.iter().find_map(|import| {
        let dep = loader.load_import(import).ok().flatten()?;
        let symbol = dep.lookup(name)?;
        symbol_info(&dep, symbol, kind).ok()
    })
}

/// Turn a scope symbol into the info the lookup asked for
fn symbol_info(pkg: &Package, symbol: Symbol<'_>, kind: LookupKind) -> Result<TypeInfo> {
    match (kind, symbol) {
        (LookupKind::Type, Symbol::Type(decl)) => Ok(type_info(pkg, decl)),
        (LookupKind::Interface, Symbol::Type(decl)) => {
            if pkg.underlying_kind(decl) != TypeKind::Interface {
                return Err(anyhow!("type {} is not an interface", decl.name));
            }
            Ok(type_info(pkg, decl))
        }
        (LookupKind::Function, Symbol::Func(func)) => Ok(TypeInfo {
            name: func.name.clone(),
            package: pkg.import_path.clone(),
            type_string: func.signature(),
            is_exported: is_exported(&func.name),
        }),
        (LookupKind::Function, other) => Err(anyhow!(
            "symbol is not a function: {} is a {}",
            symbol_name(other),
            other.kind_name()
        )),
        (_, other) => Err(anyhow!(
            "symbol is not a type: {} is a {}",
            symbol_name(other),
            other.kind_name()
        )),
    }
}

fn symbol_name<'a>(symbol: Symbol<'a>) -> &'a str {
    match symbol {
        Symbol::Type(decl) => &decl.name,
        Symbol::Func(func) => &func.name,
        Symbol::Var(value) | Symbol::Const(value) => &value.name,
    }
}

fn type_info(pkg: &Package, decl: &TypeDecl) -> TypeInfo {
    TypeInfo {
        name: decl.name.clone(),
        package: pkg.import_path.clone(),
        type_string: pkg.underlying_decl(decl).underlying.clone(),
        is_exported: is_exported(&decl.name),
    }
}

fn method_info(method: &MethodSig) -> MethodInfo {
    MethodInfo {
        name: method.name.clone(),
        parameters: method.params.iter().map(|f| f.type_string.clone()).collect(),
        results: method.results.iter().map(|f| f.type_string.clone()).collect(),
        signature: method.signature(),
    }
}

/// `underlying` carries the method set; `decl` the name
fn interface_info(package: &str, decl: &TypeDecl, underlying: &TypeDecl) -> InterfaceInfo {
    InterfaceInfo {
        name: decl.name.clone(),
        package: package.to_string(),
        methods: underlying.methods.iter().map(method_info).collect(),
        embeds: underlying.embeds.clone(),
        is_exported: is_exported(&decl.name),
    }
}

fn function_info(package: &str, func: &FuncDecl) -> FunctionInfo {
    FunctionInfo {
        name: func.name.clone(),
        package: package.to_string(),
        receiver: func.receiver.clone(),
        parameters: func.param_types(),
        results: func.result_types(),
        signature: func.signature(),
        is_exported: is_exported(&func.name),
        line: func.line,
    }
}

/// Append a package's scope types, interfaces and functions, sorted by name
fn add_scope(result: &mut AnalysisResult, pkg: &Package, exported_only: bool) {
    let mut types: Vec<&TypeDecl> = pkg
        .types()
        .filter(|t| !exported_only || is_exported(&t.name))
        .collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));

    for decl in types {
        result.types.push(type_info(pkg, decl));
        let underlying = pkg.underlying_decl(decl);
        if underlying.kind == TypeKind::Interface {
            result
                .interfaces
                .push(interface_info(&pkg.import_path, decl, underlying));
        }
    }

    let mut functions: Vec<&FuncDecl> = pkg
        .functions()
        .filter(|f| !exported_only || is_exported(&f.name))
        .collect();
    functions.sort_by(|a, b| a.name.cmp(&b.name));
    result.functions.extend(
        functions
            .into_iter()
            .map(|func| function_info(&pkg.import_path, func)),
    );
}

#[async_trait]
impl CodeAnalyzer for DefaultAnalyzer {
    async fn find_type(&self, pkg_path: &str, type_name: &str) -> Result<TypeInfo> {
        self.timed_lookup("find type", pkg_path, type_name, LookupKind::Type)
            .await
    }

    async fn find_interface(&self, pkg_path: &str, interface_name: &str) -> Result<TypeInfo> {
        self.timed_lookup("find interface", pkg_path, interface_name, LookupKind::Interface)
            .await
    }

    async fn find_function(&self, pkg_path: &str, func_name: &str) -> Result<TypeInfo> {
        self.timed_lookup("find function", pkg_path, func_name, LookupKind::Function)
            .await
    }

    async fn analyze_file(&self, path: &str) -> Result<AnalysisResult> {
        let this = self.clone();
        let path = path.to_string();
        blocking_with_timeout("analyze file", None, move || this.analyze_file_sync(&path)).await
    }

    async fn analyze_package(&self, pkg_path: &str) -> Result<AnalysisResult> {
        let this = self.clone();
        let pkg_path = pkg_path.to_string();
        blocking_with_timeout("analyze package", self.options.analysis_timeout, move || {
            this.analyze_package_sync(&pkg_path)
        })
        .await
    }

    async fn analyze_project(&self, path: &str) -> Result<AnalysisResult> {
        with_timeout(
            "analyze project",
            self.options.analysis_timeout,
            self.analyze_project_inner(path),
        )
        .await
    }

    fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }
}
