use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::analysis::models::AnalysisResult;
use crate::cache::CacheKey;

type Entries = HashMap<CacheKey, AnalysisResult>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Cache writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// File-backed analysis cache shared by all request handlers.
///
/// Every mutation rewrites the whole file while the map lock is held, so the
/// file always reflects the latest in-memory state. Entries are never evicted.
pub struct AnalysisCache {
    path: PathBuf,
    entries: Mutex<Entries>,
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl AnalysisCache {
    /// Reads the cache file once at startup. A missing, unreadable or corrupt
    /// file yields an empty cache; this never fails.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path).await {
            Ok(Some(entries)) => {
                info!(
                    "Cache loaded from {}, {} entries",
                    path.display(),
                    entries.len()
                );
                entries
            }
            Ok(None) => {
                info!("No cache file at {}, starting empty", path.display());
                Entries::new()
            }
            Err(e) => {
                warn!("Could not load cache from {}: {e}", path.display());
                Entries::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn lookup(&self, key: &CacheKey) -> Option<AnalysisResult> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Inserts or overwrites `key`, then rewrites the cache file.
    /// A failed write is logged and the entry stays available in memory.
    pub async fn store(&self, key: CacheKey, result: AnalysisResult) {
        let mut entries = self.entries.lock().await;
        entries.insert(key, result);

        match persist(&self.path, &entries).await {
            Ok(()) => info!(
                "Cache updated: {} entries saved to {}",
                entries.len(),
                self.path.display()
            ),
            Err(e) => warn!("Could not save cache to {}: {e}", self.path.display()),
        }
    }

    /// Serializes work on a single key. Hold the guard across lookup, upstream
    /// call and store so concurrent misses for the same inputs call out once.
    pub async fn key_lock(&self, key: &CacheKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

async fn read_entries(path: &Path) -> Result<Option<Entries>, CacheError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CacheError::Io(e)),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

async fn persist(path: &Path, entries: &Entries) -> Result<(), CacheError> {
    let bytes = serde_json::to_vec(entries)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&path, &bytes)).await??;
    Ok(())
}

/// Writes to a temp file beside `path`, then renames it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CacheError::Io(e.error))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::AnalysisRequest;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample(fit_score: u32) -> AnalysisResult {
        AnalysisResult {
            hard_skills_resume: vec!["Rust".to_string()],
            hard_skills_job: vec!["Rust".to_string(), "Kafka".to_string()],
            soft_skills_resume: vec![],
            soft_skills_job: vec![],
            matched: vec!["Rust".to_string()],
            missing: vec!["Kafka".to_string()],
            fit_score,
        }
    }

    fn key(resume: &str) -> CacheKey {
        CacheKey::for_request(&AnalysisRequest::new(resume, "Rust role"))
    }

    fn read_file(path: &Path) -> HashMap<String, AnalysisResult> {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let cache = AnalysisCache::load(dir.path().join("cache.json")).await;
        assert_eq!(cache.len().await, 0);
        assert!(cache.lookup(&key("anything")).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"{ this is not json").unwrap();

        let cache = AnalysisCache::load(&path).await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let dir = TempDir::new().unwrap();
        let cache = AnalysisCache::load(dir.path().join("cache.json")).await;

        cache.store(key("a"), sample(50)).await;
        assert_eq!(cache.lookup(&key("a")).await, Some(sample(50)));
        assert!(cache.lookup(&key("b")).await.is_none());
    }

    #[tokio::test]
    async fn test_store_writes_flat_map_keyed_by_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let cache = AnalysisCache::load(&path).await;

        cache.store(key("a"), sample(50)).await;
        cache.store(key("b"), sample(0)).await;

        let on_disk = read_file(&path);
        assert_eq!(on_disk.len(), 2);
        assert_eq!(on_disk.get(key("a").as_str()), Some(&sample(50)));
    }

    #[tokio::test]
    async fn test_store_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let cache = AnalysisCache::load(&path).await;

        cache.store(key("a"), sample(50)).await;
        let first = read_file(&path);
        cache.store(key("a"), sample(50)).await;
        let second = read_file(&path);

        assert_eq!(first, second);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.lookup(&key("a")).await, Some(sample(50)));
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let dir = TempDir::new().unwrap();
        let cache = AnalysisCache::load(dir.path().join("cache.json")).await;

        cache.store(key("a"), sample(50)).await;
        cache.store(key("a"), sample(10)).await;
        assert_eq!(cache.lookup(&key("a")).await, Some(sample(10)));
    }

    #[tokio::test]
    async fn test_reload_restores_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        {
            let cache = AnalysisCache::load(&path).await;
            cache.store(key("a"), sample(50)).await;
        }

        let reloaded = AnalysisCache::load(&path).await;
        assert_eq!(reloaded.len().await, 1);
        assert_eq!(reloaded.lookup(&key("a")).await, Some(sample(50)));
    }

    #[tokio::test]
    async fn test_store_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        let cache = AnalysisCache::load(&path).await;

        cache.store(key("a"), sample(50)).await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unwritable_location_keeps_memory_entry() {
        let dir = TempDir::new().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let cache = AnalysisCache::load(blocker.join("cache.json")).await;

        cache.store(key("a"), sample(50)).await;
        assert_eq!(cache.lookup(&key("a")).await, Some(sample(50)));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let cache = AnalysisCache::load(dir.path().join("cache.json")).await;
        cache.store(key("a"), sample(50)).await;
        cache.store(key("b"), sample(50)).await;

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("cache.json")]);
    }

    #[tokio::test]
    async fn test_key_lock_serializes_same_key() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(AnalysisCache::load(dir.path().join("cache.json")).await);

        let guard = cache.key_lock(&key("a")).await;
        let contender = {
            let cache = cache.clone();
            tokio::spawn(async move {
                let _guard = cache.key_lock(&key("a")).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_key_lock_independent_keys() {
        let dir = TempDir::new().unwrap();
        let cache = AnalysisCache::load(dir.path().join("cache.json")).await;

        let _a = cache.key_lock(&key("a")).await;
        let b = tokio::time::timeout(Duration::from_millis(100), cache.key_lock(&key("b"))).await;
        assert!(b.is_ok());
    }
}
