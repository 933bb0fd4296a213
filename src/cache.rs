//! In-memory TTL cache for analysis results
//!
//! Three kinds of entries are kept: type lookups, package analyses and file
//! analyses. Each kind lives in its own [`DashMap`], so concurrent readers and
//! writers need no external locking. Expired entries are removed lazily when
//! they are looked up. When a kind reaches `max_entries`, inserting first drops
//! expired entries and then the oldest one.

use crate::types::{AnalysisResult, TypeInfo};
use dashmap::DashMap;
use serde::Serialize;
use std::hash::Hash;
use std::time::{Duration, Instant, SystemTime};

/// Key for a cached type, interface or function lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeCacheKey {
    pub package: String,
    pub name: String,
    pub kind: String,
}

impl TypeCacheKey {
    pub fn new(package: &str, name: &str, kind: &str) -> Self {
        Self {
            package: package.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// Key for a cached package analysis
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageCacheKey {
    pub path: String,
    pub mode: String,
}

impl PackageCacheKey {
    pub fn new(path: &str, mode: &str) -> Self {
        Self {
            path: path.to_string(),
            mode: mode.to_string(),
        }
    }
}

/// Key for a cached file analysis; a changed mtime is a different key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileCacheKey {
    pub path: String,
    pub mod_time: SystemTime,
}

impl FileCacheKey {
    pub fn new(path: &str, mod_time: SystemTime) -> Self {
        Self {
            path: path.to_string(),
            mod_time,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    created_at: Instant,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// One bounded map of expiring entries
#[derive(Debug)]
struct TtlMap<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Entry<V>>,
}

impl<K, V> TtlMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }
        // The read guard is released above; removing while holding it would deadlock.
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    fn insert(&self, key: K, value: V, ttl: Duration, max_entries: usize) {
        if max_entries == 0 {
            return;
        }

        let now = Instant::now();
        if !self.entries.contains_key(&key) && self.entries.len() >= max_entries {
            self.entries.retain(|_, entry| !entry.is_expired(now));
            while self.entries.len() >= max_entries {
                let oldest = self
                    .entries
                    .iter()
                    .min_by_key(|entry| entry.value().created_at)
                    .map(|entry| entry.key().clone());
                match oldest {
                    Some(key) => {
                        self.entries.remove(&key);
                    }
                    None => break,
                }
            }
        }

        self.entries.insert(
            key,
            Entry {
                value,
                created_at: now,
                expires_at: now.checked_add(ttl),
            },
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

/// Entry counts and settings reported by [`Cache::stats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub type_entries: usize,
    pub package_entries: usize,
    pub file_entries: usize,
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

/// Cache owned by an analyzer
#[derive(Debug)]
pub struct Cache {
    types: TtlMap<TypeCacheKey, TypeInfo>,
    packages: TtlMap<PackageCacheKey, AnalysisResult>,
    files: TtlMap<FileCacheKey, AnalysisResult>,
    ttl: Duration,
    max_entries: usize,
}

impl Cache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            types: TtlMap::new(),
            packages: TtlMap::new(),
            files: TtlMap::new(),
            ttl,
            max_entries,
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.max_entries > 0 && !self.ttl.is_zero()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_type(&self, key: &TypeCacheKey) -> Option<TypeInfo> {
        self.types.get(key)
    }

    pub fn set_type(&self, key: TypeCacheKey, value: TypeInfo) {
        if self.is_enabled() {
            self.types.insert(key, value, self.ttl, self.max_entries);
        }
    }

    pub fn get_package(&self, key: &PackageCacheKey) -> Option<AnalysisResult> {
        self.packages.get(key)
    }

    pub fn set_package(&self, key: PackageCacheKey, value: AnalysisResult) {
        if self.is_enabled() {
            self.packages.insert(key, value, self.ttl, self.max_entries);
        }
    }

    pub fn get_file(&self, key: &FileCacheKey) -> Option<AnalysisResult> {
        self.files.get(key)
    }

    pub fn set_file(&self, key: FileCacheKey, value: AnalysisResult) {
        if self.is_enabled() {
            self.files.insert(key, value, self.ttl, self.max_entries);
        }
    }

    /// Drop every entry of every kind
    pub fn clear(&self) {
        self.types.clear();
        self.packages.clear();
        self.files.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            enabled: self.is_enabled(),
            type_entries: self.types.len(),
            package_entries: self.packages.len(),
            file_entries: self.files.len(),
            ttl_seconds: self.ttl.as_secs(),
            max_entries: self.max_entries,
        }
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(
            crate::constants::defaults::CACHE_TTL,
            crate::constants::defaults::MAX_CACHE_SIZE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn type_info(name: &str) -> TypeInfo {
        TypeInfo {
            name: name.to_string(),
            package: "testmod/basic".to_string(),
            type_string: "struct{ID int}".to_string(),
            is_exported: true,
        }
    }

    #[test]
    fn test_get_before_expiry_returns_value() {
        let cache = Cache::new(Duration::from_secs(60), 10);
        let key = TypeCacheKey::new("testmod/basic", "User", "type");
        cache.set_type(key.clone(), type_info("User"));

        assert_eq!(cache.get_type(&key), Some(type_info("User")));
        assert_eq!(cache.stats().type_entries, 1);
    }

    #[test]
    fn test_expired_entry_is_removed_on_access() {
        let cache = Cache::new(Duration::from_millis(20), 10);
        let key = TypeCacheKey::new("testmod/basic", "User", "type");
        cache.set_type(key.clone(), type_info("User"));

        sleep(Duration::from_millis(40));

        assert_eq!(cache.stats().type_entries, 1);
        assert!(cache.get_type(&key).is_none());
        assert_eq!(cache.stats().type_entries, 0);
    }

    #[test]
    fn test_unbounded_ttl_never_expires() {
        let cache = Cache::new(Duration::from_secs(u64::MAX), 10);
        let key = TypeCacheKey::new("testmod/basic", "User", "type");
        cache.set_type(key.clone(), type_info("User"));

        assert_eq!(cache.get_type(&key), Some(type_info("User")));
        assert_eq!(cache.stats().type_entries, 1);
    }

    #[test]
    fn test_kind_is_part_of_the_key() {
        let cache = Cache::new(Duration::from_secs(60), 10);
        cache.set_type(
            TypeCacheKey::new("testmod/basic", "Reader", "type"),
            type_info("Reader"),
        );

        assert!(
            cache
                .get_type(&TypeCacheKey::new("testmod/basic", "Reader", "interface"))
                .is_none()
        );
    }

    #[test]
    fn test_size_bound_evicts_oldest() {
        let cache = Cache::new(Duration::from_secs(60), 2);
        let first = TypeCacheKey::new("p", "A", "type");
        let second = TypeCacheKey::new("p", "B", "type");
        let third = TypeCacheKey::new("p", "C", "type");

        cache.set_type(first.clone(), type_info("A"));
        sleep(Duration::from_millis(2));
        cache.set_type(second.clone(), type_info("B"));
        sleep(Duration::from_millis(2));
        cache.set_type(third.clone(), type_info("C"));

        assert_eq!(cache.stats().type_entries, 2);
        assert!(cache.get_type(&first).is_none());
        assert!(cache.get_type(&second).is_some());
        assert!(cache.get_type(&third).is_some());
    }

    #[test]
    fn test_overwriting_existing_key_does_not_evict() {
        let cache = Cache::new(Duration::from_secs(60), 2);
        let a = TypeCacheKey::new("p", "A", "type");
        let b = TypeCacheKey::new("p", "B", "type");
        cache.set_type(a.clone(), type_info("A"));
        cache.set_type(b.clone(), type_info("B"));
        cache.set_type(a.clone(), type_info("A"));

        assert!(cache.get_type(&a).is_some());
        assert!(cache.get_type(&b).is_some());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = Cache::disabled();
        let key = PackageCacheKey::new("testmod/basic", "full");
        cache.set_package(key.clone(), AnalysisResult::new("basic", "basic"));

        assert!(!cache.is_enabled());
        assert!(cache.get_package(&key).is_none());
    }

    #[test]
    fn test_file_key_includes_mod_time_and_clear() {
        let cache = Cache::new(Duration::from_secs(60), 10);
        let now = SystemTime::now();
        let key = FileCacheKey::new("main.go", now);
        cache.set_file(key.clone(), AnalysisResult::new("main.go", "main.go"));

        let later = FileCacheKey::new("main.go", now + Duration::from_secs(1));
        assert!(cache.get_file(&key).is_some());
        assert!(cache.get_file(&later).is_none());

        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.file_entries, 0);
        assert_eq!(stats.ttl_seconds, 60);
        assert_eq!(stats.max_entries, 10);
    }
}
