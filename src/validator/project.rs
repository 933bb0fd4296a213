//! Whole-project validation with bounded per-package fan-out

use super::ValidationLevel;
use super::checks::check_package;
use super::result::ValidationResult;
use crate::module::{Package, PackageLoader};
use anyhow::{Result, anyhow};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

/// Validate every package, at most `concurrency` at a time
///
/// Each package is checked on the blocking pool while its task holds a
/// semaphore permit. Tasks store their partial result in the package's slot
/// under one mutex held only for the store; the slots are merged in package
/// order once every task is done, so output order matches a sequential run.
/// A failing package never cancels its siblings. With `concurrency` of 1 the
/// same routine runs in sequence.
pub async fn validate_packages(
    loader: Arc<PackageLoader>,
    packages: Vec<Arc<Package>>,
    level: ValidationLevel,
    concurrency: usize,
    result: ValidationResult,
) -> Result<ValidationResult> {
    if concurrency <= 1 {
        return tokio::task::spawn_blocking(move || {
            let mut result = result;
            for pkg in &packages {
                result.merge(check_package(&loader, pkg, level));
            }
            result
        })
        .await
        .map_err(|e| anyhow!("package validation task failed: {}", e));
    }

    let slots = Arc::new(Mutex::new(vec![None; packages.len()]));
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let tasks = packages.into_iter().enumerate().map(|(index, pkg)| {
        let loader = Arc::clone(&loader);
        let slots = Arc::clone(&slots);
        let semaphore = Arc::clone(&semaphore);

        tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let partial =
                tokio::task::spawn_blocking(move || check_package(&loader, &pkg, level)).await?;
            slots.lock().await[index] = Some(partial);
            Ok::<(), anyhow::Error>(())
        })
    });

    for joined in join_all(tasks).await {
        joined.map_err(|e| anyhow!("package validation task failed: {}", e))??;
    }

    let slots = Arc::try_unwrap(slots)
        .map_err(|_| anyhow!("package validation tasks still hold the result"))?;
    let mut result = result;
    for partial in slots.into_inner().into_iter().flatten() {
        result.merge(partial);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn module_with(count: usize) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module testmod\n").unwrap();
        for i in 0..count {
            let dir = temp.path().join(format!("pkg{}", i));
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("p.go"),
                format!(
                    "package pkg{}\n\nimport _ \"embed\"\n\nfunc Empty() {{}}\n",
                    i
                ),
            )
            .unwrap();
        }
        temp
    }

    async fn totals(temp: &TempDir, concurrency: usize) -> ValidationResult {
        let loader = Arc::new(PackageLoader::new(temp.path(), true).unwrap());
        let packages = loader.load_all().unwrap();
        let mut result = validate_packages(
            loader,
            packages,
            ValidationLevel::Standard,
            concurrency,
            ValidationResult::new("testmod", "."),
        )
        .await
        .unwrap();
        result.finalize();
        result
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_matches_sequential() {
        for count in [0, 1, 7, 40] {
            let temp = module_with(count);
            let sequential = totals(&temp, 1).await;
            let concurrent = totals(&temp, 4).await;
            assert_eq!(sequential.stats, concurrent.stats, "{} packages", count);
            assert_eq!(concurrent.stats.packages_checked, count);
            assert_eq!(concurrent.stats.blank_imports, count);
            assert_eq!(concurrent.stats.empty_functions, count);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_output_follows_package_order() {
        let temp = module_with(30);
        let sequential = totals(&temp, 1).await;
        assert_eq!(sequential.warnings.len(), 60);

        for _ in 0..5 {
            let concurrent = totals(&temp, 8).await;
            assert_eq!(concurrent.warnings, sequential.warnings);
            assert_eq!(concurrent.errors, sequential.errors);
        }
    }
}
