//! Create or update GitHub labels from labels.yaml.

use clap::Parser;

use kreuzberg_backlog::cli::{finish, init_logging, CommonArgs};
use kreuzberg_backlog::{import_labels, load_items, GhCli, LabelSpec, Result};

#[derive(Parser)]
#[command(name = "import-labels", version, about = "Import labels from YAML to GitHub")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn run(cli: Cli) -> Result<()> {
    let labels: Vec<LabelSpec> = load_items(cli.common.file_or("labels.yaml"))?;
    import_labels(
        &GhCli::new(),
        &labels,
        &cli.common.import_options(),
        &mut std::io::stdout().lock(),
    )?;
    Ok(())
}

fn main() {
    init_logging();
    finish(run(Cli::parse()));
}
