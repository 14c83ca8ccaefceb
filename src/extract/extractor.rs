//! Document assembly on top of the adapter, with optional caching.

use std::time::{Duration, Instant};

use serde_json::{json, Value};

use crate::cache::{build_cache_key, CacheBackend, FilesystemCacheBackend};
use crate::detect::MIME_PNG;
use crate::error::{Error, Result};
use crate::model::{DocumentSource, ExtractedDocument, Metadata};
use crate::utils::content_digest;

use super::adapter::ExtractionAdapter;
use super::options::ExtractOptions;

/// Cache namespace for extracted documents.
const CACHE_COMPONENT: &str = "KreuzbergExtract";

/// Result of extracting one document.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    /// The assembled document
    pub document: ExtractedDocument,

    /// Whether the document came from the cache
    pub cache_hit: bool,

    /// Wall-clock extraction time
    pub duration: Duration,

    /// OCR backend used, if the document went through OCR
    pub ocr_backend: Option<String>,
}

/// Extracts documents and assembles metadata, pages and placeholders.
///
/// An `Extractor` is `Sync` and can be shared across worker threads.
#[derive(Debug)]
pub struct Extractor {
    options: ExtractOptions,
    adapter: ExtractionAdapter,
    cache: Option<FilesystemCacheBackend>,
}

impl Extractor {
    /// Create an extractor, opening the cache directory when caching is on.
    pub fn new(options: ExtractOptions) -> Result<Self> {
        let cache = if options.enable_cache {
            Some(FilesystemCacheBackend::new(&options.cache_dir, false)?)
        } else {
            None
        };

        Ok(Self {
            adapter: ExtractionAdapter::new(&options),
            options,
            cache,
        })
    }

    /// Options this extractor was built with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract one document, consulting the cache first.
    pub fn extract(&self, source: &DocumentSource) -> Result<ExtractOutcome> {
        let start = Instant::now();
        let uses_ocr = source.mime == MIME_PNG;
        let ocr_backend = uses_ocr.then(|| self.options.ocr_backend.clone());

        let cache_key = self.cache.as_ref().map(|_| self.cache_key(source));
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(document) = self.read_cached(cache, key) {
                log::debug!("Cache hit for {} ({})", source.filename, key);
                return Ok(ExtractOutcome {
                    document,
                    cache_hit: true,
                    duration: start.elapsed(),
                    ocr_backend,
                });
            }
            log::debug!("Cache miss for {} ({})", source.filename, key);
        }

        let text = self.adapter.extract(source)?;

        if let Some(timeout) = self.options.timeout {
            if start.elapsed() > timeout {
                return Err(Error::extraction_timeout(
                    format!(
                        "Extraction of '{}' exceeded the {} ms timeout.",
                        source.filename,
                        timeout.as_millis()
                    ),
                    "Increase timeout_ms or split the document.",
                ));
            }
        }

        let document = self.assemble(source, text, ocr_backend.as_deref());

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            match serde_json::to_vec(&document) {
                Ok(bytes) => {
                    if let Err(e) = cache.set(key, &bytes) {
                        log::warn!("Failed to write cache entry {}: {}", key, e);
                    }
                }
                Err(e) => log::warn!("Failed to serialize document for cache: {}", e),
            }
        }

        Ok(ExtractOutcome {
            document,
            cache_hit: false,
            duration: start.elapsed(),
            ocr_backend,
        })
    }

    fn read_cached(&self, cache: &FilesystemCacheBackend, key: &str) -> Option<ExtractedDocument> {
        let bytes = cache.get(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(document) => Some(document),
            Err(e) => {
                log::warn!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Key over the content and every option that changes the output.
    fn cache_key(&self, source: &DocumentSource) -> String {
        let o = &self.options;
        build_cache_key(
            CACHE_COMPONENT,
            &[
                &content_digest(&source.bytes),
                &source.filename,
                &source.mime,
                &source.source_id,
                &o.output_format,
                &o.include_metadata,
                &o.ocr_mode,
                &o.ocr_backend,
                &o.ocr_languages.join(","),
                &o.quality_processing,
                &o.page_tracking,
                &o.pdf_hierarchy_detection,
                &o.extract_tables,
                &o.extract_images,
            ],
        )
    }

    fn assemble(
        &self,
        source: &DocumentSource,
        text: String,
        ocr_backend: Option<&str>,
    ) -> ExtractedDocument {
        let metadata = if self.options.include_metadata {
            document_metadata(source, ocr_backend, self.options.output_format.as_str())
        } else {
            Metadata::new()
        };

        let tables = self
            .options
            .extract_tables
            .then(|| vec![object(json!({"rows": 0, "columns": 0}))]);
        let images = self
            .options
            .extract_images
            .then(|| vec![object(json!({"index": 0}))]);
        let pages = self.options.page_tracking.then(|| {
            let mut page_metadata = metadata.clone();
            page_metadata.insert("page_number".into(), json!(1));
            vec![object(json!({
                "text": text,
                "metadata": page_metadata,
            }))]
        });

        ExtractedDocument {
            text,
            metadata,
            tables,
            images,
            pages,
        }
    }
}

fn document_metadata(source: &DocumentSource, ocr_backend: Option<&str>, format: &str) -> Metadata {
    let source_id = if source.source_id.is_empty() {
        Value::Null
    } else {
        json!(source.source_id)
    };

    object(json!({
        "source_id": source_id,
        "filename": source.filename,
        "mime": source.mime,
        "page_count": 1,
        "ocr_used": ocr_backend.is_some(),
        "ocr_backend": ocr_backend,
        "format": format,
    }))
}

fn object(value: Value) -> Metadata {
    match value {
        Value::Object(map) => map,
        _ => Metadata::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::MIME_PLAIN;

    fn plain(text: &str) -> DocumentSource {
        DocumentSource::new(text.as_bytes().to_vec(), "sample.txt", MIME_PLAIN)
    }

    #[test]
    fn test_metadata_is_populated() {
        let extractor = Extractor::new(ExtractOptions::new().without_cache()).unwrap();
        let source = plain("hello").with_source_id("src-1");

        let outcome = extractor.extract(&source).unwrap();
        let metadata = &outcome.document.metadata;

        assert_eq!(metadata["source_id"], "src-1");
        assert_eq!(metadata["filename"], "sample.txt");
        assert_eq!(metadata["page_count"], 1);
        assert_eq!(metadata["ocr_used"], false);
        assert_eq!(metadata["ocr_backend"], Value::Null);
        assert_eq!(metadata["format"], "text");
        assert!(!outcome.cache_hit);
    }

    #[test]
    fn test_metadata_can_be_omitted() {
        let options = ExtractOptions::new().without_cache().with_metadata(false);
        let extractor = Extractor::new(options).unwrap();
        let outcome = extractor.extract(&plain("hello")).unwrap();
        assert!(outcome.document.metadata.is_empty());
    }

    #[test]
    fn test_placeholders_and_pages() {
        let options = ExtractOptions::new()
            .without_cache()
            .with_tables(true)
            .with_images(true)
            .with_page_tracking(true);
        let extractor = Extractor::new(options).unwrap();
        let document = extractor.extract(&plain("hello")).unwrap().document;

        assert_eq!(document.tables.unwrap()[0]["rows"], 0);
        assert_eq!(document.images.unwrap()[0]["index"], 0);
        let pages = document.pages.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0]["text"], "hello");
        assert_eq!(pages[0]["metadata"]["page_number"], 1);
    }

    #[test]
    fn test_cache_hit_on_second_extract() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(ExtractOptions::new().with_cache_dir(dir.path())).unwrap();
        let source = plain("cached text");

        let first = extractor.extract(&source).unwrap();
        let second = extractor.extract(&source).unwrap();

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.document, second.document);
    }

    #[test]
    fn test_cache_key_tracks_options() {
        let dir = tempfile::tempdir().unwrap();
        let source = plain("cached text");

        let text = Extractor::new(ExtractOptions::new().with_cache_dir(dir.path())).unwrap();
        text.extract(&source).unwrap();

        let paged = Extractor::new(
            ExtractOptions::new()
                .with_cache_dir(dir.path())
                .with_page_tracking(true),
        )
        .unwrap();
        let outcome = paged.extract(&source).unwrap();

        assert!(!outcome.cache_hit);
        assert!(outcome.document.pages.is_some());
    }

    #[test]
    fn test_corrupt_cache_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(ExtractOptions::new().with_cache_dir(dir.path())).unwrap();
        let source = plain("text");
        let key = extractor.cache_key(&source);
        std::fs::write(dir.path().join(format!("{}.bin", key)), b"not json").unwrap();

        let outcome = extractor.extract(&source).unwrap();
        assert!(!outcome.cache_hit);
        assert_eq!(outcome.document.text, "text");
    }

    #[test]
    fn test_zero_timeout_fails() {
        let options = ExtractOptions::new()
            .without_cache()
            .with_timeout(Duration::ZERO);
        let extractor = Extractor::new(options).unwrap();

        let err = extractor.extract(&plain("slow")).unwrap_err();
        assert!(matches!(err, Error::ExtractionTimeout { .. }));
    }
}
