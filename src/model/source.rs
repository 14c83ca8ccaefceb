//! Loader output: raw bytes plus naming information.

use serde::{Deserialize, Serialize};

use crate::detect::OCTET_STREAM;
use crate::utils::{content_digest, hash_id};

/// Canonical input shape produced by the file loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    /// Raw document content
    pub bytes: Vec<u8>,

    /// File name used for MIME detection and identification
    #[serde(default = "unknown_filename")]
    pub filename: String,

    /// MIME type of the content
    #[serde(default = "octet_stream")]
    pub mime: String,

    /// Deterministic identifier derived from filename and content
    #[serde(default)]
    pub source_id: String,

    /// Where the bytes came from, when loaded from the filesystem
    #[serde(default)]
    pub source_uri: Option<String>,

    /// Local path, when the host supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Remote URL, when the host supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn unknown_filename() -> String {
    "unknown".to_string()
}

fn octet_stream() -> String {
    OCTET_STREAM.to_string()
}

impl DocumentSource {
    /// Create a source and derive its identifier from filename and content.
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, mime: impl Into<String>) -> Self {
        let filename = filename.into();
        let source_id = Self::derive_id(&filename, &bytes);
        Self {
            bytes,
            filename,
            mime: mime.into(),
            source_id,
            source_uri: None,
            path: None,
            url: None,
        }
    }

    /// Set the source URI.
    pub fn with_source_uri(mut self, uri: impl Into<String>) -> Self {
        self.source_uri = Some(uri.into());
        self
    }

    /// Override the identifier.
    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = id.into();
        self
    }

    /// `hash_id(filename, sha256(bytes))`.
    pub fn derive_id(filename: &str, bytes: &[u8]) -> String {
        hash_id(&[&filename, &content_digest(bytes)])
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_is_deterministic() {
        let a = DocumentSource::new(b"same".to_vec(), "a.txt", "text/plain");
        let b = DocumentSource::new(b"same".to_vec(), "a.txt", "text/plain");
        assert_eq!(a.source_id, b.source_id);
        assert_eq!(a.source_id.len(), 32);
    }

    #[test]
    fn test_source_id_depends_on_filename_and_content() {
        let base = DocumentSource::new(b"same".to_vec(), "a.txt", "text/plain");
        let renamed = DocumentSource::new(b"same".to_vec(), "b.txt", "text/plain");
        let changed = DocumentSource::new(b"other".to_vec(), "a.txt", "text/plain");
        assert_ne!(base.source_id, renamed.source_id);
        assert_ne!(base.source_id, changed.source_id);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let source: DocumentSource = serde_json::from_value(serde_json::json!({
            "bytes": [104, 105]
        }))
        .unwrap();
        assert_eq!(source.bytes, b"hi");
        assert_eq!(source.filename, "unknown");
        assert_eq!(source.mime, "application/octet-stream");
        assert!(source.source_uri.is_none());
    }
}
