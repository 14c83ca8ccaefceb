//! Turn uploads and filesystem paths into [`DocumentSource`] payloads.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::detect::resolve_mime;
use crate::error::{Error, Result};
use crate::model::DocumentSource;

use super::{Component, ComponentSpec, Data, InputField, Inputs, OutputPort};

pub(crate) const NAME: &str = "KreuzbergFileLoader";

const MISSING_INPUT: &str = "Kreuzberg File Loader requires either 'file' or 'file_path'.";
const UNSUPPORTED_UPLOAD: &str =
    "Unsupported upload type for 'file'. Provide bytes or a readable file object.";

/// Content handed to the loader by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileUpload {
    /// Raw bytes without a name
    Bytes(Vec<u8>),
    /// An uploaded file with its client-side name
    Named { name: String, bytes: Vec<u8> },
}

impl FileUpload {
    /// Drain a reader into an upload.
    pub fn from_reader<R: Read>(mut reader: R, name: Option<&str>) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(match name {
            Some(name) => FileUpload::Named {
                name: name.to_string(),
                bytes,
            },
            None => FileUpload::Bytes(bytes),
        })
    }

    /// Parse the host's `file` input value.
    ///
    /// Accepts a byte array, a string (encoded as UTF-8) or an object with
    /// `bytes` and an optional `name`.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => {
                let bytes = map
                    .get("bytes")
                    .and_then(bytes_from_value)
                    .ok_or_else(|| Error::InvalidArgument(UNSUPPORTED_UPLOAD.to_string()))?;
                match map.get("name").and_then(Value::as_str) {
                    Some(name) => Ok(FileUpload::Named {
                        name: name.to_string(),
                        bytes,
                    }),
                    None => Ok(FileUpload::Bytes(bytes)),
                }
            }
            other => bytes_from_value(other)
                .map(FileUpload::Bytes)
                .ok_or_else(|| Error::InvalidArgument(UNSUPPORTED_UPLOAD.to_string())),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            FileUpload::Bytes(bytes) | FileUpload::Named { bytes, .. } => bytes,
        }
    }

    /// Final path component of the upload name, when it has a usable one.
    pub fn file_name(&self) -> Option<String> {
        match self {
            FileUpload::Named { name, .. } if !name.trim().is_empty() => file_name_of(name),
            _ => None,
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        match self {
            FileUpload::Bytes(bytes) | FileUpload::Named { bytes, .. } => bytes,
        }
    }
}

impl From<Vec<u8>> for FileUpload {
    fn from(bytes: Vec<u8>) -> Self {
        FileUpload::Bytes(bytes)
    }
}

impl From<&[u8]> for FileUpload {
    fn from(bytes: &[u8]) -> Self {
        FileUpload::Bytes(bytes.to_vec())
    }
}

/// What to load and how to name it.
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    pub file: Option<FileUpload>,
    pub file_path: Option<PathBuf>,
    pub filename_override: Option<String>,
    pub mime_override: Option<String>,
}

impl LoadRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from an in-memory upload.
    pub fn from_upload(file: impl Into<FileUpload>) -> Self {
        Self::new().with_file(file)
    }

    /// Load from the filesystem.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new().with_file_path(path)
    }

    pub fn with_file(mut self, file: impl Into<FileUpload>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename_override = Some(filename.into());
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime_override = Some(mime.into());
        self
    }
}

/// Build a [`DocumentSource`] from an upload or a path.
///
/// An upload wins over a path; the path is still recorded as `source_uri`.
pub fn load_document(request: &LoadRequest) -> Result<DocumentSource> {
    let file_path = request
        .file_path
        .as_deref()
        .filter(|path| !path.as_os_str().is_empty());

    let (bytes, detected_name) = match (&request.file, file_path) {
        (Some(upload), _) => (upload.clone().into_bytes(), upload.file_name()),
        (None, Some(path)) => {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            (std::fs::read(path)?, name)
        }
        (None, None) => return Err(Error::InvalidArgument(MISSING_INPUT.to_string())),
    };

    let filename = request
        .filename_override
        .clone()
        .filter(|name| !name.is_empty())
        .or(detected_name)
        .unwrap_or_else(|| "unknown".to_string());
    let source_uri = file_path.map(|path| path.to_string_lossy().into_owned());

    let mime = match request.mime_override.as_deref().filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_string(),
        None => resolve_mime(&filename, source_uri.as_deref(), &bytes).to_string(),
    };

    log::debug!("Loaded {} ({} bytes, {})", filename, bytes.len(), mime);

    let mut source = DocumentSource::new(bytes, filename, mime);
    source.source_uri = source_uri;
    Ok(source)
}

/// Host component wrapping [`load_document`].
#[derive(Debug, Clone)]
pub struct FileLoaderComponent {
    spec: ComponentSpec,
    last: Option<DocumentSource>,
}

impl FileLoaderComponent {
    pub fn new() -> Self {
        Self {
            spec: ComponentSpec {
                name: NAME,
                display_name: "Kreuzberg File Loader",
                description: "Converts files into canonical DocumentSource payloads for extraction nodes.",
                icon: "file",
                inputs: vec![
                    InputField::data("file", "File").with_info("Uploaded file or raw bytes."),
                    InputField::optional_text("file_path", "File Path"),
                    InputField::optional_text("filename_override", "Filename Override").advanced(),
                    InputField::optional_text("mime_override", "MIME Override").advanced(),
                ],
                outputs: vec![OutputPort::new("document_source", "Document Source")],
            },
            last: None,
        }
    }

    /// The source produced by the last build.
    pub fn document_source(&self) -> Option<&DocumentSource> {
        self.last.as_ref()
    }

    fn request_from(&self, data: &Data) -> Result<LoadRequest> {
        let inputs = Inputs::new(&self.spec, data);
        Ok(LoadRequest {
            file: inputs.supplied("file").map(FileUpload::from_value).transpose()?,
            file_path: inputs.optional_string("file_path")?.map(PathBuf::from),
            filename_override: inputs.optional_string("filename_override")?,
            mime_override: inputs.optional_string("mime_override")?,
        })
    }
}

impl Default for FileLoaderComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FileLoaderComponent {
    fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    fn build(&mut self, inputs: &Data) -> Result<Data> {
        let request = self.request_from(inputs)?;
        let source = load_document(&request)?;
        let data = Data::from_serialize(&source)?;
        self.last = Some(source);
        Ok(data)
    }

    fn output(&self, port: &str) -> Result<Data> {
        self.spec.require_output(port)?;
        let source = self.last.as_ref().ok_or_else(|| {
            Error::component(
                "No loaded document available yet.",
                "Run the component before requesting output ports.",
            )
        })?;
        Data::from_serialize(source)
    }
}

fn bytes_from_value(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::String(s) => Some(s.clone().into_bytes()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect(),
        _ => None,
    }
}

fn file_name_of(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        std::fs::write(&path, "hello from path").unwrap();

        let source = load_document(&LoadRequest::from_path(&path)).unwrap();

        assert_eq!(source.bytes, b"hello from path");
        assert_eq!(source.filename, "sample.txt");
        assert_eq!(source.mime, "text/plain");
        assert_eq!(source.source_uri.as_deref(), Some(path.to_str().unwrap()));
    }

    #[test]
    fn test_load_named_upload_from_reader() {
        let reader = Cursor::new(b"in memory content");
        let upload = FileUpload::from_reader(reader, Some("dir/memo.md")).unwrap();
        let source = load_document(&LoadRequest::from_upload(upload)).unwrap();

        assert_eq!(source.bytes, b"in memory content");
        assert_eq!(source.filename, "memo.md");
        assert_eq!(source.mime, "text/markdown");
        assert_eq!(source.source_uri, None);
    }

    #[test]
    fn test_unknown_filename_when_missing() {
        let source = load_document(&LoadRequest::from_upload(b"raw-bytes".to_vec())).unwrap();
        assert_eq!(source.filename, "unknown");
        assert_eq!(source.mime, "application/octet-stream");
    }

    #[test]
    fn test_magic_bytes_fill_in_for_missing_extension() {
        let source = load_document(&LoadRequest::from_upload(b"%PDF-1.7\n".to_vec())).unwrap();
        assert_eq!(source.mime, "application/pdf");
    }

    #[test]
    fn test_overrides() {
        let request = LoadRequest::from_upload(b"same".to_vec())
            .with_filename("a.txt")
            .with_mime("text/html");
        let first = load_document(&request).unwrap();
        let second = load_document(&request).unwrap();

        assert_eq!(first.filename, "a.txt");
        assert_eq!(first.mime, "text/html");
        assert_eq!(first.source_id, second.source_id);
    }

    #[test]
    fn test_requires_file_or_path() {
        let err = load_document(&LoadRequest::new()).unwrap_err();
        assert!(err.to_string().contains("requires either 'file' or 'file_path'"));

        let err = load_document(&LoadRequest::from_path("")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_upload_value_shapes() {
        assert_eq!(
            FileUpload::from_value(&json!([104, 105])).unwrap(),
            FileUpload::Bytes(b"hi".to_vec())
        );
        assert_eq!(
            FileUpload::from_value(&json!({"bytes": "hi", "name": "a.txt"})).unwrap(),
            FileUpload::Named {
                name: "a.txt".into(),
                bytes: b"hi".to_vec()
            }
        );

        let err = FileUpload::from_value(&json!(12)).unwrap_err();
        assert!(err.to_string().contains("Unsupported upload type"));
        assert!(FileUpload::from_value(&json!([300])).is_err());
    }

    #[test]
    fn test_component_build_and_output() {
        let mut loader = FileLoaderComponent::new();
        let data = loader
            .build(&Data::from_value(json!({"file": {"bytes": "hello", "name": "note.txt"}})).unwrap())
            .unwrap();

        assert_eq!(data.get_str("filename"), Some("note.txt"));
        assert_eq!(data.get_str("mime"), Some("text/plain"));
        assert_eq!(data.get("bytes"), Some(&json!([104, 101, 108, 108, 111])));

        let out = loader.output("document_source").unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_output_before_build() {
        let loader = FileLoaderComponent::new();
        let err = loader.output("document_source").unwrap_err();
        assert!(matches!(err, Error::Component { .. }));
        assert_eq!(err.hint(), Some("Run the component before requesting output ports."));
    }
}
