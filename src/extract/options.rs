//! Extraction options and configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default on-disk cache location, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".kreuzberg_cache";

/// Requested output flavour, recorded in document metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Structured,
}

impl OutputFormat {
    pub const ALL: [&'static str; 3] = ["text", "markdown", "structured"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Structured => "structured",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "markdown" => Ok(OutputFormat::Markdown),
            "structured" => Ok(OutputFormat::Structured),
            _ => Err(Error::InvalidArgument(format!(
                "output_format must be one of: text, markdown, structured (got '{}')",
                s
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When OCR runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrMode {
    /// Never run OCR; image inputs fail
    Off,
    /// OCR image inputs only
    #[default]
    Auto,
    /// Always OCR when the input allows it
    Force,
}

impl OcrMode {
    pub const ALL: [&'static str; 3] = ["off", "auto", "force"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OcrMode::Off => "off",
            OcrMode::Auto => "auto",
            OcrMode::Force => "force",
        }
    }
}

impl FromStr for OcrMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "off" => Ok(OcrMode::Off),
            "auto" => Ok(OcrMode::Auto),
            "force" => Ok(OcrMode::Force),
            _ => Err(Error::InvalidArgument(format!(
                "ocr_mode must be one of: off, auto, force (got '{}')",
                s
            ))),
        }
    }
}

impl fmt::Display for OcrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known OCR backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OcrBackend {
    #[default]
    Tesseract,
    PaddleOcr,
    EasyOcr,
}

impl OcrBackend {
    pub const ALL: [&'static str; 3] = ["tesseract", "paddleocr", "easyocr"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackend::Tesseract => "tesseract",
            OcrBackend::PaddleOcr => "paddleocr",
            OcrBackend::EasyOcr => "easyocr",
        }
    }
}

impl FromStr for OcrBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tesseract" => Ok(OcrBackend::Tesseract),
            "paddleocr" => Ok(OcrBackend::PaddleOcr),
            "easyocr" => Ok(OcrBackend::EasyOcr),
            _ => Err(Error::ocr_backend_missing(
                format!("Unsupported OCR backend requested: {}", s),
                "Choose one of: tesseract, paddleocr, easyocr.",
            )),
        }
    }
}

impl fmt::Display for OcrBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a comma-separated language list, falling back to `["eng"]`.
pub fn parse_languages(value: &str) -> Vec<String> {
    let languages: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if languages.is_empty() {
        vec!["eng".to_string()]
    } else {
        languages
    }
}

/// Options for extracting documents.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Output flavour
    pub output_format: OutputFormat,

    /// Include document metadata in the output
    pub include_metadata: bool,

    /// OCR mode
    pub ocr_mode: OcrMode,

    /// OCR backend name; validated only when an image needs OCR
    pub ocr_backend: String,

    /// OCR languages
    pub ocr_languages: Vec<String>,

    /// Run the text cleanup pipeline on extracted text
    pub quality_processing: bool,

    /// Emit per-page output
    pub page_tracking: bool,

    /// Reserved; has no effect on plain-text extraction
    pub pdf_hierarchy_detection: bool,

    /// Emit table placeholders
    pub extract_tables: bool,

    /// Emit image placeholders
    pub extract_images: bool,

    /// Read and write the on-disk cache
    pub enable_cache: bool,

    /// Cache location
    pub cache_dir: PathBuf,

    /// Fail items whose extraction takes longer than this
    pub timeout: Option<Duration>,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    pub fn with_ocr_mode(mut self, mode: OcrMode) -> Self {
        self.ocr_mode = mode;
        self
    }

    pub fn with_ocr_backend(mut self, backend: impl Into<String>) -> Self {
        self.ocr_backend = backend.into();
        self
    }

    pub fn with_ocr_languages(mut self, languages: Vec<String>) -> Self {
        self.ocr_languages = if languages.is_empty() {
            vec!["eng".to_string()]
        } else {
            languages
        };
        self
    }

    pub fn with_quality_processing(mut self, enabled: bool) -> Self {
        self.quality_processing = enabled;
        self
    }

    pub fn with_page_tracking(mut self, enabled: bool) -> Self {
        self.page_tracking = enabled;
        self
    }

    pub fn with_pdf_hierarchy_detection(mut self, enabled: bool) -> Self {
        self.pdf_hierarchy_detection = enabled;
        self
    }

    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.extract_tables = enabled;
        self
    }

    pub fn with_images(mut self, enabled: bool) -> Self {
        self.extract_images = enabled;
        self
    }

    /// Enable the cache at `dir`.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.enable_cache = true;
        self.cache_dir = dir.into();
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.enable_cache = enabled;
        self
    }

    /// Disable caching.
    pub fn without_cache(self) -> Self {
        self.with_cache(false)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Text,
            include_metadata: true,
            ocr_mode: OcrMode::Auto,
            ocr_backend: OcrBackend::Tesseract.as_str().to_string(),
            ocr_languages: vec!["eng".to_string()],
            quality_processing: false,
            page_tracking: false,
            pdf_hierarchy_detection: false,
            extract_tables: false,
            extract_images: false,
            enable_cache: true,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            timeout: None,
        }
    }
}
