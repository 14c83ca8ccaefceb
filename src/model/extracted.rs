//! Extraction output types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form metadata attached to documents, pages and chunks.
pub type Metadata = Map<String, Value>;

/// Canonical extraction output payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Extracted text
    pub text: String,

    /// Document metadata (empty when not requested)
    #[serde(default)]
    pub metadata: Metadata,

    /// Table placeholders, when table extraction was requested
    #[serde(default)]
    pub tables: Option<Vec<Metadata>>,

    /// Image placeholders, when image extraction was requested
    #[serde(default)]
    pub images: Option<Vec<Metadata>>,

    /// Per-page output, when page tracking was requested
    #[serde(default)]
    pub pages: Option<Vec<Metadata>>,
}

impl ExtractedDocument {
    /// Create a document with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Number of tracked pages (0 when page tracking was off).
    pub fn page_count(&self) -> usize {
        self.pages.as_ref().map_or(0, Vec::len)
    }

    /// Word count of the extracted text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Canonical chunk payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub offset_start: Option<usize>,
    #[serde(default)]
    pub offset_end: Option<usize>,
}

/// Generic payload used by minimal components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPayload {
    pub message: String,
}
