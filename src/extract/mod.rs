//! Extraction: MIME dispatch, text normalization and cached document
//! assembly.
//!
//! # Example
//!
//! ```
//! use kreuzberg_flow::extract::{ExtractOptions, Extractor};
//! use kreuzberg_flow::DocumentSource;
//!
//! # fn main() -> kreuzberg_flow::Result<()> {
//! let source = DocumentSource::new(b"<p>Hello</p>".to_vec(), "page.html", "text/html");
//! let extractor = Extractor::new(ExtractOptions::new().without_cache())?;
//! let outcome = extractor.extract(&source)?;
//! assert_eq!(outcome.document.text, "Hello");
//! # Ok(())
//! # }
//! ```

mod adapter;
mod cleanup;
mod extractor;
mod html;
mod options;

pub use adapter::{ExtractionAdapter, OCR_PLACEHOLDER_TEXT};
pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupStep};
pub use extractor::{ExtractOutcome, Extractor};
pub use html::strip_html;
pub use options::{
    parse_languages, ExtractOptions, OcrBackend, OcrMode, OutputFormat, DEFAULT_CACHE_DIR,
};
