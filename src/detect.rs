//! MIME type detection for loaded documents.

use std::path::Path;

/// Generic binary MIME type used when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_HTML: &str = "text/html";
pub const MIME_PLAIN: &str = "text/plain";
pub const MIME_PNG: &str = "image/png";

/// MIME types the extraction adapter accepts.
pub const SUPPORTED_MIME_TYPES: &[&str] = &[MIME_PDF, MIME_DOCX, MIME_HTML, MIME_PLAIN, MIME_PNG];

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Guess a MIME type from the extension of a file name or path.
///
/// # Example
/// ```
/// use kreuzberg_flow::detect::guess_mime;
///
/// assert_eq!(guess_mime("notes.txt"), Some("text/plain"));
/// assert_eq!(guess_mime("unknown"), None);
/// ```
pub fn guess_mime<P: AsRef<Path>>(name: P) -> Option<&'static str> {
    mime_guess::from_path(name).first_raw()
}

/// Detect a MIME type from leading magic bytes.
///
/// Only formats with an unambiguous signature are recognized.
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(PNG_SIGNATURE) {
        return Some(MIME_PNG);
    }
    if is_pdf_bytes(data) {
        return Some(MIME_PDF);
    }
    None
}

/// Resolve the MIME type the way the file loader does: extension of the
/// source URI (or the file name), then magic bytes, then octet-stream.
pub fn resolve_mime(filename: &str, source_uri: Option<&str>, data: &[u8]) -> &'static str {
    guess_mime(source_uri.unwrap_or(filename))
        .or_else(|| sniff_mime(data))
        .unwrap_or(OCTET_STREAM)
}

/// Whether the extraction adapter accepts this MIME type.
pub fn is_supported_mime(mime: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(&mime)
}

/// Check if bytes start with a valid PDF header (`%PDF-d.d`).
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return false;
    }
    let version = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    version[0].is_ascii_digit() && version[1] == b'.' && version[2].is_ascii_digit()
}
