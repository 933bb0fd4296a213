//! Target platform and `_GOOS` / `_GOARCH` file name constraints

use crate::constants::module::{GOARCH_ENV, GOOS_ENV, KNOWN_ARCH, KNOWN_OS};
use std::path::Path;

/// Operating system and architecture packages are loaded for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub goos: String,
    pub goarch: String,
}

impl BuildTarget {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    /// `GOOS` / `GOARCH` from the environment, else the host platform
    pub fn host() -> Self {
        let goos = std::env::var(GOOS_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| host_os().to_string());
        let goarch = std::env::var(GOARCH_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| host_arch().to_string());
        Self::new(goos, goarch)
    }

    fn matches_os(&self, goos: &str) -> bool {
        self.goos == goos
            || (goos == "linux" && self.goos == "android")
            || (goos == "solaris" && self.goos == "illumos")
            || (goos == "darwin" && self.goos == "ios")
    }

    /// Whether a file's `_GOOS`, `_GOARCH` or `_GOOS_GOARCH` suffix admits this target
    ///
    /// The part before the first underscore never counts, so `linux.go`
    /// always matches. A `_test` suffix is ignored.
    pub fn matches_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return true;
        };
        let stem = name.split('.').next().unwrap_or(name);
        let Some(index) = stem.find('_') else {
            return true;
        };
        let stem = &stem[index..];
        let stem = stem.strip_suffix("_test").unwrap_or(stem);

        let parts: Vec<&str> = stem.split('_').collect();
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_os(parts[n - 2]) && self.goarch == parts[n - 1];
        }
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) {
            return self.matches_os(last);
        }
        if KNOWN_ARCH.contains(&last) {
            return self.goarch == last;
        }
        true
    }
}

impl Default for BuildTarget {
    fn default() -> Self {
        Self::host()
    }
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        "wasm32" => "wasm",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(target: &BuildTarget, name: &str) -> bool {
        target.matches_file(Path::new(name))
    }

    #[test]
    fn test_os_and_arch_suffixes() {
        let linux = BuildTarget::new("linux", "amd64");
        assert!(matches(&linux, "sys_linux.go"));
        assert!(!matches(&linux, "sys_windows.go"));
        assert!(matches(&linux, "sys_amd64.go"));
        assert!(!matches(&linux, "sys_arm64.go"));
        assert!(matches(&linux, "sys_linux_amd64.go"));
        assert!(!matches(&linux, "sys_linux_arm64.go"));
        assert!(!matches(&linux, "sys_darwin_amd64.go"));
        assert!(!matches(&linux, "sys_windows_test.go"));
        assert!(matches(&linux, "sys_linux_test.go"));
    }

    #[test]
    fn test_unconstrained_names() {
        let windows = BuildTarget::new("windows", "386");
        assert!(matches(&windows, "linux.go"));
        assert!(matches(&windows, "main.go"));
        assert!(matches(&windows, "user_service.go"));
        assert!(matches(&windows, "handler_test.go"));
    }

    #[test]
    fn test_os_aliases() {
        assert!(matches(&BuildTarget::new("android", "arm64"), "net_linux.go"));
        assert!(matches(&BuildTarget::new("ios", "arm64"), "net_darwin.go"));
        assert!(!matches(&BuildTarget::new("linux", "arm64"), "net_android.go"));
    }
}
