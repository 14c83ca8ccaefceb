//! Extract many documents at once over the parallel map.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cache::{log_run_report, RunReport};
use crate::error::{Error, Result};
use crate::extract::{ExtractOptions, ExtractOutcome, Extractor};
use crate::model::{DocumentSource, ExtractedDocument};
use crate::parallel::{parallel_map, MapMode};
use crate::utils::normalize_to_list;

use super::extract::{
    extract_option_fields, extract_options_from, into_component_error, source_from_value,
};
use super::{Component, ComponentSpec, Data, InputField, Inputs, OutputPort};

pub(crate) const NAME: &str = "KreuzbergBatchExtract";

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Per-document extraction settings
    pub extract: ExtractOptions,

    /// Upper bound on concurrent extractions
    pub max_workers: usize,

    /// Scheduling strategy
    pub parallel_mode: MapMode,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_parallel_mode(mut self, mode: MapMode) -> Self {
        self.parallel_mode = mode;
        self
    }

    /// Fail items whose extraction takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.extract.timeout = Some(timeout);
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            extract: ExtractOptions::default(),
            max_workers: 4,
            parallel_mode: MapMode::Thread,
        }
    }
}

/// One failed item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemError {
    /// Position of the item in the input list
    pub index: usize,
    pub source_id: Option<String>,
    pub error: String,
    pub hint: Option<String>,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Successfully extracted documents, in input order
    pub extracted_docs: Vec<ExtractedDocument>,
    /// Failed items, in input order
    pub errors: Vec<BatchItemError>,
    pub run_report: RunReport,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_data(&self) -> Result<Data> {
        Data::from_serialize(self)
    }
}

struct ItemResult {
    index: usize,
    source_id: Option<String>,
    outcome: Result<ExtractOutcome>,
}

/// Extract every source, calling `on_item` with the item index as each one
/// finishes.
///
/// A failing item is recorded in [`BatchResult::errors`] and does not stop
/// the batch. Only invalid options fail the whole call.
pub fn extract_batch<F>(
    sources: Vec<DocumentSource>,
    options: &BatchOptions,
    on_item: F,
) -> Result<BatchResult>
where
    F: Fn(usize) + Send + Sync,
{
    extract_batch_items(sources.into_iter().map(Ok).collect(), options, on_item)
}

/// Like [`extract_batch`], for inputs that may have failed to load.
///
/// Each `Err` item is reported in [`BatchResult::errors`] under its index,
/// next to the extraction failures.
pub fn extract_batch_items<F>(
    items: Vec<Result<DocumentSource>>,
    options: &BatchOptions,
    on_item: F,
) -> Result<BatchResult>
where
    F: Fn(usize) + Send + Sync,
{
    let start = Instant::now();
    let extractor = Extractor::new(options.extract.clone()).map_err(into_component_error)?;

    let indexed: Vec<(usize, Result<DocumentSource>)> = items.into_iter().enumerate().collect();
    let results = parallel_map(
        |(index, item): (usize, Result<DocumentSource>)| {
            let (source_id, outcome) = match item {
                Ok(source) => {
                    let id = (!source.source_id.is_empty()).then(|| source.source_id.clone());
                    (id, extractor.extract(&source).map_err(into_component_error))
                }
                Err(e) => (None, Err(e)),
            };
            on_item(index);
            ItemResult {
                index,
                source_id,
                outcome,
            }
        },
        indexed,
        options.max_workers,
        options.parallel_mode,
    )?;

    let mut batch = BatchResult::default();
    batch.run_report.item_count = results.len() as u32;

    for item in results {
        match item.outcome {
            Ok(outcome) => {
                if outcome.cache_hit {
                    batch.run_report.add_hit();
                } else {
                    batch.run_report.add_miss();
                }
                if batch.run_report.ocr_backend.is_none() {
                    batch.run_report.ocr_backend = outcome.ocr_backend;
                }
                batch.extracted_docs.push(outcome.document);
            }
            Err(e) => {
                log::warn!("Batch item {} failed: {}", item.index, e);
                batch.run_report.add_error();
                batch.errors.push(BatchItemError {
                    index: item.index,
                    source_id: item.source_id,
                    error: e.to_string(),
                    hint: e.hint().map(String::from),
                });
            }
        }
    }

    batch.run_report.duration_ms = start.elapsed().as_millis() as u64;
    log_run_report(NAME, &batch.run_report);
    Ok(batch)
}

/// Host component running [`extract_batch`] over a list of sources.
#[derive(Debug, Clone)]
pub struct BatchExtractComponent {
    spec: ComponentSpec,
    last: Option<BatchResult>,
}

impl BatchExtractComponent {
    pub fn new() -> Self {
        let mut inputs = vec![InputField::data("document_sources", "Document Sources")
            .with_info("One or more DocumentSource payloads.")
            .list()];
        inputs.extend(extract_option_fields());
        inputs.push(InputField::integer("max_workers", "Max Workers", 4).advanced());
        inputs.push(
            InputField::dropdown("parallel_mode", "Parallel Mode", &["thread", "process"], "thread")
                .advanced(),
        );
        inputs.push(
            InputField::integer("timeout_ms", "Timeout (ms)", 0)
                .with_info("Per-document limit; 0 disables it.")
                .advanced(),
        );

        Self {
            spec: ComponentSpec {
                name: NAME,
                display_name: "Kreuzberg Batch Extract",
                description: "Extracts many DocumentSource payloads in parallel.",
                icon: "files",
                inputs,
                outputs: vec![
                    OutputPort::new("extracted_docs", "Extracted Documents"),
                    OutputPort::new("errors", "Errors"),
                    OutputPort::new("run_report", "Run Report"),
                ],
            },
            last: None,
        }
    }

    pub fn last_result(&self) -> Option<&BatchResult> {
        self.last.as_ref()
    }

    fn options_from(&self, inputs: &Inputs<'_>) -> Result<BatchOptions> {
        let mut options = BatchOptions::new()
            .with_extract_options(extract_options_from(inputs)?)
            .with_max_workers(inputs.integer("max_workers")? as usize)
            .with_parallel_mode(inputs.string("parallel_mode")?.parse()?);

        let timeout_ms = inputs.integer("timeout_ms")?;
        if timeout_ms > 0 {
            options = options.with_timeout(Duration::from_millis(timeout_ms));
        }
        Ok(options)
    }
}

impl Default for BatchExtractComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for BatchExtractComponent {
    fn spec(&self) -> &ComponentSpec {
        &self.spec
    }

    fn build(&mut self, data: &Data) -> Result<Data> {
        let inputs = Inputs::new(&self.spec, data);
        let options = self.options_from(&inputs)?;

        let items: Vec<Result<DocumentSource>> =
            normalize_to_list(inputs.value("document_sources").clone())
                .iter()
                .map(source_from_value)
                .collect();

        let result = extract_batch_items(items, &options, |_| {})?;
        let data = result.to_data()?;
        self.last = Some(result);
        Ok(data)
    }

    fn output(&self, port: &str) -> Result<Data> {
        self.spec.require_output(port)?;
        let result = self.last.as_ref().ok_or_else(|| {
            Error::component(
                "No extraction result available yet.",
                "Run the component before requesting output ports.",
            )
        })?;
        match port {
            "extracted_docs" => Ok(Data::single(
                "extracted_docs",
                serde_json::to_value(&result.extracted_docs)?,
            )),
            "errors" => Ok(Data::single("errors", serde_json::to_value(&result.errors)?)),
            _ => Data::from_serialize(&result.run_report),
        }
    }
}
