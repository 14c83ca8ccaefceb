//! kreuzberg CLI - run extraction components from a terminal

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use kreuzberg_flow::component::HelloComponent;
use kreuzberg_flow::extract::parse_languages;
use kreuzberg_flow::{
    extract_batch_items, load_document, BatchOptions, ComponentRegistry, ExtractOptions,
    Extractor, LoadRequest, MapMode, OcrMode, OutputFormat,
};

#[derive(Parser)]
#[command(name = "kreuzberg")]
#[command(version)]
#[command(about = "Load and extract documents with the Kreuzberg components", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a greeting (checks the bundle is wired up)
    Hello {
        /// Who to greet
        #[arg(long, default_value = "world")]
        name: String,
    },

    /// Load a file and show its DocumentSource
    Load {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Override the detected file name
        #[arg(long)]
        filename: Option<String>,

        /// Override the detected MIME type
        #[arg(long)]
        mime: Option<String>,

        /// Print the full payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract text from one document
    Extract {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Override the detected MIME type
        #[arg(long)]
        mime: Option<String>,

        /// Write the whole extracted document as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: ExtractArgs,
    },

    /// Extract many documents in parallel
    Batch {
        /// Input files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for one JSON file per document
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Maximum concurrent extractions
        #[arg(short, long, env = "KREUZBERG_WORKERS", default_value = "4")]
        workers: usize,

        /// Scheduling strategy
        #[arg(long, value_enum, default_value = "thread")]
        mode: ParallelMode,

        #[command(flatten)]
        options: ExtractArgs,
    },

    /// List the registered components
    Components {
        /// Print full specs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Extraction settings shared by `extract` and `batch`.
#[derive(Args)]
struct ExtractArgs {
    /// Output format recorded in metadata
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// When to run OCR
    #[arg(long, value_enum, default_value = "auto")]
    ocr_mode: Ocr,

    /// OCR backend (tesseract, paddleocr, easyocr)
    #[arg(long, default_value = "tesseract")]
    ocr_backend: String,

    /// Comma-separated OCR languages
    #[arg(long, default_value = "eng")]
    ocr_languages: String,

    /// Run the text cleanup pipeline
    #[arg(long)]
    quality: bool,

    /// Emit per-page output
    #[arg(long)]
    pages: bool,

    /// Emit table placeholders
    #[arg(long)]
    tables: bool,

    /// Emit image placeholders
    #[arg(long)]
    images: bool,

    /// Leave metadata out of the document
    #[arg(long)]
    no_metadata: bool,

    /// Cache directory
    #[arg(long, env = "KREUZBERG_CACHE_DIR", default_value = ".kreuzberg_cache")]
    cache_dir: PathBuf,

    /// Disable the on-disk cache
    #[arg(
        long,
        env = "KREUZBERG_DISABLE_CACHE",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_cache: bool,

    /// Per-document timeout in milliseconds (0 disables it)
    #[arg(long, default_value = "0")]
    timeout_ms: u64,
}

impl ExtractArgs {
    fn to_options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new()
            .with_output_format(self.format.into())
            .with_ocr_mode(self.ocr_mode.into())
            .with_ocr_backend(self.ocr_backend.clone())
            .with_ocr_languages(parse_languages(&self.ocr_languages))
            .with_quality_processing(self.quality)
            .with_page_tracking(self.pages)
            .with_tables(self.tables)
            .with_images(self.images)
            .with_metadata(!self.no_metadata);

        options = if self.no_cache {
            options.without_cache()
        } else {
            options.with_cache_dir(&self.cache_dir)
        };
        if self.timeout_ms > 0 {
            options = options.with_timeout(Duration::from_millis(self.timeout_ms));
        }
        options
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Markdown,
    Structured,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Markdown => OutputFormat::Markdown,
            Format::Structured => OutputFormat::Structured,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Ocr {
    /// Never OCR; images fail
    Off,
    /// OCR images only (default)
    Auto,
    /// Always OCR
    Force,
}

impl From<Ocr> for OcrMode {
    fn from(mode: Ocr) -> Self {
        match mode {
            Ocr::Off => OcrMode::Off,
            Ocr::Auto => OcrMode::Auto,
            Ocr::Force => OcrMode::Force,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ParallelMode {
    /// Shared thread pool
    Thread,
    /// Dedicated worker threads
    Process,
}

impl From<ParallelMode> for MapMode {
    fn from(mode: ParallelMode) -> Self {
        match mode {
            ParallelMode::Thread => MapMode::Thread,
            ParallelMode::Process => MapMode::Process,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Hello { name }) => {
            println!("{}", HelloComponent::greet(&name).message);
            Ok(())
        }
        Some(Commands::Load {
            input,
            filename,
            mime,
            json,
        }) => cmd_load(&input, filename, mime, json),
        Some(Commands::Extract {
            input,
            output,
            mime,
            json,
            options,
        }) => cmd_extract(&input, output.as_deref(), mime, json, &options),
        Some(Commands::Batch {
            inputs,
            output,
            workers,
            mode,
            options,
        }) => cmd_batch(&inputs, output.as_deref(), workers, mode, &options),
        Some(Commands::Components { json }) => cmd_components(json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: kreuzberg <COMMAND>".yellow());
            println!("       kreuzberg --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        if let Some(hint) = e
            .downcast_ref::<kreuzberg_flow::Error>()
            .and_then(|e| e.hint())
        {
            eprintln!("  {}", hint.dimmed());
        }
        std::process::exit(1);
    }
}

fn cmd_load(
    input: &Path,
    filename: Option<String>,
    mime: Option<String>,
    json: bool,
) -> CliResult {
    let request = LoadRequest {
        filename_override: filename,
        mime_override: mime,
        ..LoadRequest::from_path(input)
    };
    let source = load_document(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&source)?);
        return Ok(());
    }

    println!("{}", "Document Source".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Filename".bold(), source.filename);
    println!("{}: {}", "MIME".bold(), source.mime);
    println!("{}: {}", "Source ID".bold(), source.source_id);
    println!("{}: {} bytes", "Size".bold(), source.len());
    if let Some(ref uri) = source.source_uri {
        println!("{}: {}", "Source URI".bold(), uri);
    }

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    mime: Option<String>,
    json: bool,
    args: &ExtractArgs,
) -> CliResult {
    let request = LoadRequest {
        mime_override: mime,
        ..LoadRequest::from_path(input)
    };
    let source = load_document(&request)?;
    let extractor = Extractor::new(args.to_options())?;
    let outcome = extractor.extract(&source)?;

    log::info!(
        "{} extracted in {} ms (cache {})",
        source.filename,
        outcome.duration.as_millis(),
        if outcome.cache_hit { "hit" } else { "miss" }
    );

    let rendered = if json {
        serde_json::to_string_pretty(&outcome.document)?
    } else {
        outcome.document.text
    };

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn cmd_batch(
    inputs: &[PathBuf],
    output: Option<&Path>,
    workers: usize,
    mode: ParallelMode,
    args: &ExtractArgs,
) -> CliResult {
    let items: Vec<_> = inputs
        .iter()
        .map(|path| load_document(&LoadRequest::from_path(path)))
        .collect();

    let options = BatchOptions::new()
        .with_extract_options(args.to_options())
        .with_max_workers(workers)
        .with_parallel_mode(mode.into());

    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Extracting...");

    let result = extract_batch_items(items, &options, |_| pb.inc(1))?;
    pb.finish_with_message("Done!");

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
        let failed: Vec<usize> = result.errors.iter().map(|e| e.index).collect();
        let succeeded = (0..inputs.len()).filter(|i| !failed.contains(i));
        for (index, doc) in succeeded.zip(&result.extracted_docs) {
            let path = dir.join(output_file_name(index, &inputs[index]));
            fs::write(&path, serde_json::to_string_pretty(doc)?)?;
        }
        println!("{} {}", "Saved to".green(), dir.display());
    } else {
        for doc in &result.extracted_docs {
            let name = doc.metadata.get("filename").and_then(|v| v.as_str()).unwrap_or("-");
            println!("{} {} words", name.bold(), doc.word_count());
        }
    }

    for error in &result.errors {
        eprintln!(
            "{} {}: {}",
            "Failed".red(),
            inputs[error.index].display(),
            error.error
        );
        if let Some(ref hint) = error.hint {
            eprintln!("  {}", hint.dimmed());
        }
    }

    let report = &result.run_report;
    println!();
    println!("{}", "Run Report".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Items".bold(), report.item_count);
    println!("{}: {}", "Errors".bold(), report.errors);
    println!("{}: {}", "Cache hits".bold(), report.cache_hits);
    println!("{}: {}", "Cache misses".bold(), report.cache_misses);
    println!("{}: {} ms", "Duration".bold(), report.duration_ms);

    if !result.is_success() {
        return Err(format!("{} of {} documents failed", report.errors, report.item_count).into());
    }
    Ok(())
}

/// `<index>-<stem>.json`, unique even when inputs share a file stem.
fn output_file_name(index: usize, input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    format!("{}-{}.json", index, stem)
}

fn cmd_components(json: bool) -> CliResult {
    let registry = ComponentRegistry::with_defaults();
    let specs = registry.specs();

    if json {
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    for spec in specs {
        println!("{} {}", spec.name.cyan().bold(), format!("({})", spec.display_name).dimmed());
        println!("  {}", spec.description);
        println!("  {}: {}", "inputs".bold(), spec.input_names().join(", "));
        println!("  {}: {}", "outputs".bold(), spec.output_names().join(", "));
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "kreuzberg".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document extraction components for workflow builders");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_args_build_options() {
        let cli = Cli::try_parse_from([
            "kreuzberg",
            "extract",
            "a.txt",
            "--format",
            "markdown",
            "--ocr-languages",
            "deu,fra",
            "--no-cache",
            "--timeout-ms",
            "250",
        ])
        .unwrap();

        let Some(Commands::Extract { options, .. }) = cli.command else {
            panic!("expected extract");
        };
        let options = options.to_options();
        assert_eq!(options.output_format, OutputFormat::Markdown);
        assert_eq!(options.ocr_languages, vec!["deu", "fra"]);
        assert!(!options.enable_cache);
        assert_eq!(options.timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_disable_cache_from_env() {
        std::env::set_var("KREUZBERG_DISABLE_CACHE", "1");
        let parsed = Cli::try_parse_from(["kreuzberg", "extract", "a.txt"]);
        std::env::remove_var("KREUZBERG_DISABLE_CACHE");

        let Some(Commands::Extract { options, .. }) = parsed.unwrap().command else {
            panic!("expected extract");
        };
        assert!(!options.to_options().enable_cache);
    }

    #[test]
    fn test_batch_requires_inputs() {
        assert!(Cli::try_parse_from(["kreuzberg", "batch"]).is_err());
    }

    #[test]
    fn test_output_file_names_stay_distinct() {
        let a = output_file_name(0, Path::new("a/report.pdf"));
        let b = output_file_name(1, Path::new("b/report.pdf"));
        assert_eq!(a, "0-report.json");
        assert_eq!(b, "1-report.json");
    }
}
