//! # kreuzberg-flow
//!
//! Document extraction components for visual workflow builders.
//!
//! The crate loads files into canonical [`DocumentSource`] payloads, extracts
//! text through a MIME-dispatching adapter, caches results on disk, and wraps
//! all of it in [`component`]s a workflow host can discover by name.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kreuzberg_flow::{extract_file, Kreuzberg};
//!
//! fn main() -> kreuzberg_flow::Result<()> {
//!     // Extract with defaults
//!     let doc = extract_file("notes.txt")?;
//!     println!("{}", doc.text);
//!
//!     // Or configure first
//!     let doc = Kreuzberg::new()
//!         .with_page_tracking()
//!         .without_cache()
//!         .extract_file("page.html")?;
//!     println!("{} pages", doc.page_count());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Loader**: uploads, readers and paths with MIME detection
//! - **Extraction**: HTML stripping, OCR routing for images, text cleanup
//! - **Caching**: file-per-key store keyed on content and settings
//! - **Parallel processing**: order-preserving map over a bounded pool
//! - **Host components**: `KreuzbergHello`, `KreuzbergFileLoader`,
//!   `KreuzbergExtract`, `KreuzbergBatchExtract`

pub mod cache;
pub mod component;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod parallel;
pub mod utils;

// Re-export commonly used types
pub use cache::{
    build_cache_key, log_run_report, CacheBackend, FilesystemCacheBackend, RunReport,
};
pub use component::{
    extract_batch, extract_batch_items, load_document, BatchOptions, BatchResult, Component,
    ComponentRegistry, Data, FileUpload, LoadRequest,
};
pub use error::{Error, Result};
pub use extract::{
    CleanupOptions, ExtractOptions, ExtractOutcome, Extractor, OcrBackend, OcrMode, OutputFormat,
};
pub use model::{Chunk, ComponentPayload, DocumentSource, ExtractedDocument, Metadata};
pub use parallel::{parallel_map, MapMode};
pub use utils::{ensure_metadata_dict, hash_id, merge_metadata, normalize_to_list, MergePolicy};

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Load a file from disk into a [`DocumentSource`].
///
/// # Example
///
/// ```no_run
/// use kreuzberg_flow::load_file;
///
/// let source = load_file("report.pdf").unwrap();
/// println!("{} ({})", source.filename, source.mime);
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<DocumentSource> {
    load_document(&LoadRequest::from_path(path.as_ref()))
}

/// Load any reader into a [`DocumentSource`] named `filename`.
pub fn load_reader<R: Read>(reader: R, filename: &str) -> Result<DocumentSource> {
    let upload = FileUpload::from_reader(reader, Some(filename))?;
    load_document(&LoadRequest::from_upload(upload))
}

/// Extract a file with default options.
///
/// # Example
///
/// ```no_run
/// use kreuzberg_flow::extract_file;
///
/// let doc = extract_file("index.html").unwrap();
/// println!("{}", doc.text);
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ExtractedDocument> {
    Kreuzberg::new().extract_file(path)
}

/// Extract in-memory bytes named `filename`, without touching the cache.
///
/// # Example
///
/// ```
/// use kreuzberg_flow::extract_bytes;
///
/// let doc = extract_bytes(b"<p>Hello <b>there</b></p>", "page.html").unwrap();
/// assert_eq!(doc.text, "Hello there");
/// ```
pub fn extract_bytes(data: &[u8], filename: &str) -> Result<ExtractedDocument> {
    let source = load_document(&LoadRequest::from_upload(data).with_filename(filename))?;
    Kreuzberg::new().without_cache().extract_source(&source)
}

/// Extract just the text of a file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(extract_file(path)?.text)
}

/// Builder for loading and extracting documents.
///
/// # Example
///
/// ```no_run
/// use kreuzberg_flow::{Kreuzberg, OcrMode};
///
/// let doc = Kreuzberg::new()
///     .with_ocr_mode(OcrMode::Force)
///     .with_ocr_backend("paddleocr")
///     .with_tables()
///     .with_cache_dir("/tmp/kreuzberg")
///     .extract_file("scan.png")?;
/// # Ok::<(), kreuzberg_flow::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Kreuzberg {
    options: ExtractOptions,
}

impl Kreuzberg {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.options = self.options.with_output_format(format);
        self
    }

    pub fn with_ocr_mode(mut self, mode: OcrMode) -> Self {
        self.options = self.options.with_ocr_mode(mode);
        self
    }

    pub fn with_ocr_backend(mut self, backend: impl Into<String>) -> Self {
        self.options = self.options.with_ocr_backend(backend);
        self
    }

    /// Omit document metadata.
    pub fn without_metadata(mut self) -> Self {
        self.options = self.options.with_metadata(false);
        self
    }

    /// Run the text cleanup pipeline.
    pub fn with_quality_processing(mut self) -> Self {
        self.options = self.options.with_quality_processing(true);
        self
    }

    pub fn with_page_tracking(mut self) -> Self {
        self.options = self.options.with_page_tracking(true);
        self
    }

    pub fn with_tables(mut self) -> Self {
        self.options = self.options.with_tables(true);
        self
    }

    pub fn with_images(mut self) -> Self {
        self.options = self.options.with_images(true);
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_cache_dir(dir);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.options = self.options.without_cache();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_timeout(timeout);
        self
    }

    /// Options accumulated so far.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract an already loaded source.
    pub fn extract_source(self, source: &DocumentSource) -> Result<ExtractedDocument> {
        Ok(Extractor::new(self.options)?.extract(source)?.document)
    }

    /// Load and extract a file.
    pub fn extract_file<P: AsRef<Path>>(self, path: P) -> Result<ExtractedDocument> {
        let source = load_file(path)?;
        self.extract_source(&source)
    }

    /// Load and extract many files in parallel, keeping input order.
    ///
    /// A file that cannot be read is reported in [`BatchResult::errors`]
    /// like any other failed item.
    pub fn extract_files<P: AsRef<Path>>(
        self,
        paths: &[P],
        max_workers: usize,
    ) -> Result<BatchResult> {
        let items = paths.iter().map(load_file).collect();
        let options = BatchOptions::new()
            .with_extract_options(self.options)
            .with_max_workers(max_workers);
        extract_batch_items(items, &options, |_| {})
    }
}
