//! MIME-dispatching text extraction.

use std::str::FromStr;

use crate::detect::{is_supported_mime, MIME_HTML, MIME_PNG};
use crate::error::{Error, Result};
use crate::model::DocumentSource;

use super::cleanup::CleanupPipeline;
use super::html::strip_html;
use super::options::{ExtractOptions, OcrBackend, OcrMode};

/// Text returned for images until a real OCR engine is wired in.
pub const OCR_PLACEHOLDER_TEXT: &str = "[OCR extracted text from PNG image]";

/// Lightweight extraction adapter that normalizes text across document types.
#[derive(Debug)]
pub struct ExtractionAdapter {
    ocr_mode: OcrMode,
    ocr_backend: String,
    ocr_languages: Vec<String>,
    cleanup: Option<CleanupPipeline>,
}

impl ExtractionAdapter {
    /// Create an adapter from extract options.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            ocr_mode: options.ocr_mode,
            ocr_backend: options.ocr_backend.clone(),
            ocr_languages: options.ocr_languages.clone(),
            cleanup: options.quality_processing.then(CleanupPipeline::default),
        }
    }

    /// OCR languages this adapter was configured with.
    pub fn ocr_languages(&self) -> &[String] {
        &self.ocr_languages
    }

    /// Extract text from a loaded document.
    pub fn extract(&self, source: &DocumentSource) -> Result<String> {
        self.extract_bytes(&source.bytes, &source.mime)
    }

    /// Extract text from raw bytes of the given MIME type.
    pub fn extract_bytes(&self, bytes: &[u8], mime: &str) -> Result<String> {
        if !is_supported_mime(mime) {
            return Err(Error::unsupported_format(
                format!("Unsupported document format: {}", mime),
                "Use PDF, DOCX, HTML, PNG, or plain text inputs.",
            ));
        }

        if mime == MIME_PNG {
            return self.ocr_image();
        }

        let decoded = decode_utf8_ignoring_errors(bytes);
        let decoded = decoded.trim();
        if decoded.is_empty() {
            return Err(Error::corrupt_document(
                "Document content is empty after decoding.",
                "Verify the file is not empty or encrypted.",
            ));
        }

        let text = if mime == MIME_HTML {
            strip_html(decoded)
        } else {
            decoded.to_string()
        };

        Ok(match self.cleanup {
            Some(ref pipeline) => pipeline.process(&text),
            None => text,
        })
    }

    fn ocr_image(&self) -> Result<String> {
        if self.ocr_mode == OcrMode::Off {
            return Err(Error::corrupt_document(
                "PNG extraction requires OCR but OCR mode is off.",
                "Set ocr_mode to 'auto' or 'force'.",
            ));
        }

        let backend = OcrBackend::from_str(&self.ocr_backend)?;
        log::debug!(
            "OCR via {} (languages: {})",
            backend,
            self.ocr_languages.join(",")
        );
        Ok(OCR_PLACEHOLDER_TEXT.to_string())
    }
}

/// Decode UTF-8, dropping invalid sequences instead of substituting them.
fn decode_utf8_ignoring_errors(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
