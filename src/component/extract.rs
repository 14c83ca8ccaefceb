//! Single-document extraction component.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::RunReport;
use crate::detect::OCTET_STREAM;
use crate::error::{Error, Result};
use crate::extract::{
    parse_languages, ExtractOptions, Extractor, OcrBackend, OcrMode, OutputFormat,
    DEFAULT_CACHE_DIR,
};
use crate::model::{DocumentSource, ExtractedDocument};

use super::data::json_type_name;
use super::{Component, ComponentSpec, Data, InputField, Inputs, OutputPort};

pub(crate) const NAME: &str = "KreuzbergExtract";

/// Outputs of one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResult {
    pub extracted_doc: ExtractedDocument,
    pub run_report: RunReport,
}

impl ExtractResult {
    /// All ports in one payload, as returned from `build`.
    pub fn to_data(&self) -> Result<Data> {
        Ok(Data::new()
            .with("extracted_doc", serde_json::to_value(&self.extracted_doc)?)
            .with("tables", serde_json::to_value(&self.extracted_doc.tables)?)
            .with("images", serde_json::to_value(&self.extracted_doc.images)?)
            .with("pages", serde_json::to_value(&self.extracted_doc.pages)?)
            .with("run_report", serde_json::to_value(&self.run_report)?))
    }
}

/// Extracts text plus optional page, table and image outputs.
#[derive(Debug, Clone)]
pub struct ExtractComponent {
    spec: ComponentSpec,
    last: Option<ExtractResult>,
}

impl ExtractComponent {
    pub fn new() -> Self {
        let mut inputs = vec![InputField::data("document_source", "Document Source")
            .with_info("Canonical DocumentSource payload produced by Kreuzberg File Loader.")];
        inputs.extend(extract_option_fields());

        Self {
            spec: ComponentSpec {
                name: NAME,
                display_name: "Kreuzberg Extract",
                description: "Extracts text and optional page/table/image outputs from DocumentSource inputs.",
                icon: "file-search",
                inputs,
                outputs: vec![
                    OutputPort::new("extracted_doc", "Extracted Document"),
                    OutputPort::new("tables", "Tables"),
                    OutputPort::new("images", "Images"),
                    OutputPort::new("pages", "Pages"),
                    OutputPort::new("run_report", "Run Report"),
                ],
            },
            last: None,
        }
    }

    /// Result of the last build.
    pub fn last_result(&self) -> Option<&ExtractResult> {
        self.last.as_ref()
    }

    /// Typed entry point used by `build`.
    pub fn run(&mut self, source: &DocumentSource, options: ExtractOptions) -> Result<&ExtractResult> {
        let result = extract_one(source, options)?;
        Ok(&*self.last.insert(result))
    }

    fn require_result(&self) -> Result<&ExtractResult> {
        self.last.as_ref().ok_or_else(|| {
            Error::component(
                "No extraction result available yet.",
                "Run the component before requesting output ports.",
            )
        })
    }
}

impl Default for ExtractComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ExtractComponent {
    fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    fn build(&mut self, data: &Data) -> Result<Data> {
        let inputs = Inputs::new(&self.spec, data);
        let source = source_from_value(inputs.value("document_source"))?;
        let options = extract_options_from(&inputs)?;
        self.run(&source, options)?.to_data()
    }

    fn output(&self, port: &str) -> Result<Data> {
        self.spec.require_output(port)?;
        let result = self.require_result()?;
        let doc = &result.extracted_doc;
        match port {
            "extracted_doc" => Data::from_serialize(doc),
            "tables" => Ok(Data::single("tables", serde_json::to_value(&doc.tables)?)),
            "images" => Ok(Data::single("images", serde_json::to_value(&doc.images)?)),
            "pages" => Ok(Data::single("pages", serde_json::to_value(&doc.pages)?)),
            _ => Data::from_serialize(&result.run_report),
        }
    }
}

/// Run one extraction and build its report.
fn extract_one(source: &DocumentSource, options: ExtractOptions) -> Result<ExtractResult> {
    let extractor = Extractor::new(options).map_err(into_component_error)?;
    let outcome = extractor.extract(source).map_err(into_component_error)?;

    let mut run_report = RunReport::new();
    run_report.item_count = 1;
    run_report.duration_ms = outcome.duration.as_millis() as u64;
    run_report.ocr_backend = outcome.ocr_backend;
    if outcome.cache_hit {
        run_report.add_hit();
    } else {
        run_report.add_miss();
    }

    Ok(ExtractResult {
        extracted_doc: outcome.document,
        run_report,
    })
}

/// Keep taxonomy errors, fold everything else into the base component error.
pub(crate) fn into_component_error(err: Error) -> Error {
    if err.is_component_error() {
        return err;
    }
    log::debug!("Extraction failed: {}", err);
    Error::component(
        "Kreuzberg Extract failed while processing the document.",
        "Check input bytes and extraction settings.",
    )
}

/// Input fields shared by the single and batch extract components.
pub(crate) fn extract_option_fields() -> Vec<InputField> {
    vec![
        InputField::dropdown("output_format", "Output Format", &OutputFormat::ALL, "text"),
        InputField::boolean("include_metadata", "Include Metadata", true),
        InputField::dropdown("ocr_mode", "OCR Mode", &OcrMode::ALL, "auto").advanced(),
        InputField::dropdown("ocr_backend", "OCR Backend", &OcrBackend::ALL, "tesseract").advanced(),
        InputField::text("ocr_languages", "OCR Languages", "eng")
            .with_info("Comma-separated language codes.")
            .advanced(),
        InputField::boolean("quality_processing", "Quality Processing", false).advanced(),
        InputField::boolean("page_tracking", "Page Tracking", false).advanced(),
        InputField::boolean("pdf_hierarchy_detection", "PDF Hierarchy Detection", false).advanced(),
        InputField::boolean("extract_tables", "Extract Tables", false).advanced(),
        InputField::boolean("extract_images", "Extract Images", false).advanced(),
        InputField::boolean("enable_cache", "Enable Cache", true).advanced(),
        InputField::text("cache_dir", "Cache Directory", DEFAULT_CACHE_DIR).advanced(),
    ]
}

/// Read the shared extract options from host inputs.
pub(crate) fn extract_options_from(inputs: &Inputs<'_>) -> Result<ExtractOptions> {
    let languages = match inputs.value("ocr_languages") {
        Value::String(s) => parse_languages(s),
        _ => inputs.string_list("ocr_languages")?,
    };

    let mut options = ExtractOptions::new()
        .with_output_format(inputs.string("output_format")?.parse()?)
        .with_metadata(inputs.boolean("include_metadata")?)
        .with_ocr_mode(inputs.string("ocr_mode")?.parse()?)
        .with_ocr_backend(inputs.string("ocr_backend")?)
        .with_ocr_languages(languages)
        .with_quality_processing(inputs.boolean("quality_processing")?)
        .with_page_tracking(inputs.boolean("page_tracking")?)
        .with_pdf_hierarchy_detection(inputs.boolean("pdf_hierarchy_detection")?)
        .with_tables(inputs.boolean("extract_tables")?)
        .with_images(inputs.boolean("extract_images")?);

    options.enable_cache = inputs.boolean("enable_cache")?;
    if let Some(dir) = inputs.optional_string("cache_dir")? {
        options.cache_dir = dir.into();
    }
    Ok(options)
}

/// Decode a host `document_source` payload.
pub(crate) fn source_from_value(value: &Value) -> Result<DocumentSource> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            log::debug!("document_source is {}", json_type_name(other));
            return Err(Error::corrupt_document(
                "Document source must be a mapping-like payload.",
                "Connect the output of Kreuzberg File Loader to document_source.",
            ));
        }
    };

    let bytes = map.get("bytes").and_then(byte_array).ok_or_else(|| {
        Error::corrupt_document(
            "Input document is missing raw bytes.",
            "Pass a DocumentSource produced by Kreuzberg File Loader.",
        )
    })?;

    Ok(DocumentSource {
        bytes,
        filename: string_field(map, "filename").unwrap_or_else(|| "unknown".to_string()),
        mime: string_field(map, "mime").unwrap_or_else(|| OCTET_STREAM.to_string()),
        source_id: string_field(map, "source_id").unwrap_or_default(),
        source_uri: string_field(map, "source_uri"),
        path: string_field(map, "path"),
        url: string_field(map, "url"),
    })
}

fn byte_array(value: &Value) -> Option<Vec<u8>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}
