//! Integration tests wiring components together the way a workflow host does.

use kreuzberg_flow::component::{ComponentRegistry, Data};
use kreuzberg_flow::Error;
use serde_json::{json, Value};

fn registry() -> ComponentRegistry {
    ComponentRegistry::with_defaults()
}

#[test]
fn test_registry_exposes_bundle() {
    let registry = registry();
    assert_eq!(
        registry.names(),
        vec![
            "KreuzbergBatchExtract",
            "KreuzbergExtract",
            "KreuzbergFileLoader",
            "KreuzbergHello",
        ]
    );

    for spec in registry.specs() {
        assert!(!spec.display_name.is_empty());
        assert!(!spec.outputs.is_empty(), "{} has no outputs", spec.name);
    }
}

#[test]
fn test_loader_into_extract_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    std::fs::write(&path, "<html><body><h1>Report</h1><p>All   good</p></body></html>").unwrap();
    let cache_dir = dir.path().join("cache");

    let registry = registry();
    let mut loader = registry.create("KreuzbergFileLoader").unwrap();
    let source = loader
        .build(&Data::single("file_path", json!(path.to_string_lossy())))
        .unwrap();
    assert_eq!(source.get_str("mime"), Some("text/html"));
    assert_eq!(source.get_str("filename"), Some("page.html"));

    let mut extract = registry.create("KreuzbergExtract").unwrap();
    let inputs = Data::new()
        .with("document_source", source.into_value())
        .with("cache_dir", cache_dir.to_string_lossy().to_string());

    let first = extract.build(&inputs).unwrap();
    assert_eq!(first.get("extracted_doc").unwrap()["text"], "Report All good");
    assert_eq!(first.get("run_report").unwrap()["cache_misses"], 1);

    // a fresh instance shares the on-disk cache
    let mut again = registry.create("KreuzbergExtract").unwrap();
    let second = again.build(&inputs).unwrap();
    assert_eq!(second.get("run_report").unwrap()["cache_hits"], 1);
    assert_eq!(second.get("extracted_doc"), first.get("extracted_doc"));

    let report = again.output("run_report").unwrap();
    assert_eq!(report.get("item_count"), Some(&json!(1)));
}

#[test]
fn test_extract_rejects_missing_bytes() {
    let mut extract = registry().create("KreuzbergExtract").unwrap();
    let err = extract
        .build(&Data::single("document_source", json!({"filename": "x.txt"})))
        .unwrap_err();

    assert!(matches!(err, Error::CorruptDocument { .. }));
    assert!(err.hint().is_some());
}

#[test]
fn test_unknown_output_port() {
    let mut hello = registry().create("KreuzbergHello").unwrap();
    hello.build(&Data::new()).unwrap();

    assert_eq!(
        hello.output("message").unwrap().get_str("message"),
        Some("Hello, world!")
    );
    let err = hello.output("nope").unwrap_err();
    assert!(err.to_string().contains("no output port 'nope'"));
}

#[test]
fn test_batch_component_reports_each_item() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry();

    let mut sources = Vec::new();
    for (name, body) in [("a.txt", "alpha"), ("b.txt", "   "), ("c.txt", "gamma")] {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        let mut loader = registry.create("KreuzbergFileLoader").unwrap();
        sources.push(
            loader
                .build(&Data::single("file_path", json!(path.to_string_lossy())))
                .unwrap()
                .into_value(),
        );
    }

    let mut batch = registry.create("KreuzbergBatchExtract").unwrap();
    let result = batch
        .build(
            &Data::new()
                .with("document_sources", Value::Array(sources))
                .with("enable_cache", false)
                .with("max_workers", 2),
        )
        .unwrap();

    let docs = result.get("extracted_docs").unwrap().as_array().unwrap();
    let texts: Vec<&str> = docs
        .iter()
        .map(|d| d["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["alpha", "gamma"]);

    let errors = result.get("errors").unwrap().as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["index"], 1);

    let report = batch.output("run_report").unwrap();
    assert_eq!(report.get("item_count"), Some(&json!(3)));
    assert_eq!(report.get("errors"), Some(&json!(1)));
}
