//! File-per-key caching and run reporting shared by components.
//!
//! The filesystem backend has no eviction and no locking: concurrent writers
//! to the same key race and the last one wins.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::hash_id;

/// Common cache interface for components.
pub trait CacheBackend: Send + Sync {
    /// Return bytes for a cache key, or `None` when missing.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Persist bytes for a cache key.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Filesystem cache backend with an optional global disable flag.
#[derive(Debug, Clone)]
pub struct FilesystemCacheBackend {
    cache_dir: PathBuf,
    disable_cache: bool,
}

impl FilesystemCacheBackend {
    /// Create a backend rooted at `cache_dir`, creating the directory.
    pub fn new(cache_dir: impl Into<PathBuf>, disable_cache: bool) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            disable_cache,
        })
    }

    /// Cache root directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Whether reads and writes are turned off.
    pub fn is_disabled(&self) -> bool {
        self.disable_cache
    }

    /// Build a deterministic cache key for this component.
    pub fn make_cache_key(&self, component_name: &str, parts: &[&dyn fmt::Display]) -> String {
        build_cache_key(component_name, parts)
    }

    /// File backing `key`. Only alphanumerics, `-` and `_` survive.
    fn cache_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        self.cache_dir.join(format!("{}.bin", safe_key))
    }
}

impl CacheBackend for FilesystemCacheBackend {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        if self.disable_cache {
            return None;
        }

        let path = self.cache_path(key);
        if !path.is_file() {
            return None;
        }

        match fs::read(&path) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("Failed to read cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if self.disable_cache {
            return Ok(());
        }

        let path = self.cache_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, value)?;
        Ok(())
    }
}

/// Build a deterministic cache key for any backend.
pub fn build_cache_key(component_name: &str, parts: &[&dyn fmt::Display]) -> String {
    let mut all: Vec<&dyn fmt::Display> = Vec::with_capacity(parts.len() + 1);
    all.push(&component_name);
    all.extend_from_slice(parts);
    hash_id(&all)
}

/// Structured execution summary used across cache-enabled components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub duration_ms: u64,
    pub cache_hits: u32,
    pub cache_misses: u32,
    pub errors: u32,
    pub item_count: u32,
    /// OCR backend used, when any item went through OCR
    #[serde(default)]
    pub ocr_backend: Option<String>,
}

impl RunReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit.
    pub fn add_hit(&mut self) {
        self.cache_hits += 1;
    }

    /// Record a cache miss.
    pub fn add_miss(&mut self) {
        self.cache_misses += 1;
    }

    /// Record a failed item.
    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Merge another report into this one. Durations are not summed; the
    /// caller owns wall-clock timing.
    pub fn merge(&mut self, other: &RunReport) {
        self.cache_hits += other.cache_hits;
        self.cache_misses += other.cache_misses;
        self.errors += other.errors;
        self.item_count += other.item_count;
        if self.ocr_backend.is_none() {
            self.ocr_backend = other.ocr_backend.clone();
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duration_ms={} cache_hits={} cache_misses={} errors={} item_count={}",
            self.duration_ms, self.cache_hits, self.cache_misses, self.errors, self.item_count
        )
    }
}

/// Emit a run report in a consistent format.
pub fn log_run_report(component_name: &str, report: &RunReport) {
    log::info!("{}", format_run_report(component_name, report));
}

/// The line [`log_run_report`] emits.
pub fn format_run_report(component_name: &str, report: &RunReport) -> String {
    format!("{} run_report {}", component_name, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemCacheBackend::new(dir.path(), false).unwrap();
        let key = backend.make_cache_key("extract", &[&"doc-a", &1]);

        assert!(backend.get(&key).is_none());

        backend.set(&key, b"payload").unwrap();

        assert_eq!(backend.get(&key), Some(b"payload".to_vec()));
    }

    #[test]
    fn test_filesystem_cache_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemCacheBackend::new(dir.path(), true).unwrap();
        let key = backend.make_cache_key("extract", &[&"doc-b"]);

        backend.set(&key, b"payload").unwrap();

        assert!(backend.get(&key).is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_creates_nested_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let backend = FilesystemCacheBackend::new(&nested, false).unwrap();
        assert!(backend.cache_dir().is_dir());
    }

    #[test]
    fn test_cache_path_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemCacheBackend::new(dir.path(), false).unwrap();

        backend.set("../escape/key", b"x").unwrap();

        assert!(dir.path().join("escapekey.bin").is_file());
        assert_eq!(backend.get("../escape/key"), Some(b"x".to_vec()));
    }

    #[test]
    fn test_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemCacheBackend::new(dir.path(), false).unwrap();

        backend.set("k", b"first").unwrap();
        backend.set("k", b"second").unwrap();

        assert_eq!(backend.get("k"), Some(b"second".to_vec()));
    }

    #[test]
    fn test_build_cache_key_is_deterministic() {
        let first = build_cache_key("embed", &[&"chunk-1", &42]);
        let second = build_cache_key("embed", &[&"chunk-1", &42]);

        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert_ne!(first, build_cache_key("chunk", &[&"chunk-1", &42]));
    }

    #[test]
    fn test_format_run_report() {
        let report = RunReport {
            duration_ms: 12,
            cache_hits: 3,
            cache_misses: 1,
            errors: 0,
            item_count: 4,
            ocr_backend: None,
        };

        let line = format_run_report("BatchExtract", &report);
        assert!(line.starts_with("BatchExtract run_report duration_ms=12 cache_hits=3"));
        assert!(line.ends_with("errors=0 item_count=4"));
    }

    #[test]
    fn test_run_report_merge() {
        let mut total = RunReport::new();
        total.merge(&RunReport {
            cache_hits: 1,
            item_count: 1,
            ..Default::default()
        });
        total.merge(&RunReport {
            cache_misses: 1,
            errors: 1,
            item_count: 1,
            ocr_backend: Some("tesseract".into()),
            ..Default::default()
        });

        assert_eq!(total.cache_hits, 1);
        assert_eq!(total.cache_misses, 1);
        assert_eq!(total.errors, 1);
        assert_eq!(total.item_count, 2);
        assert_eq!(total.ocr_backend.as_deref(), Some("tesseract"));
    }

    struct CaptureLogger {
        lines: std::sync::Mutex<Vec<(log::Level, String)>>,
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            let line = record.args().to_string();
            self.lines.lock().unwrap().push((record.level(), line));
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger {
        lines: std::sync::Mutex::new(Vec::new()),
    };

    #[test]
    fn test_log_run_report_emits_info_line() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Info);

        let report = RunReport {
            duration_ms: 12,
            cache_hits: 1,
            cache_misses: 2,
            item_count: 3,
            ..Default::default()
        };
        log_run_report("ReportLogTest", &report);

        let expected =
            "ReportLogTest run_report duration_ms=12 cache_hits=1 cache_misses=2 errors=0 item_count=3";
        let lines = LOGGER.lines.lock().unwrap();
        assert!(lines
            .iter()
            .any(|(level, line)| *level == log::Level::Info && line == expected));
    }
}
