//! Create or update GitHub milestones from milestones.yaml.

use clap::Parser;

use kreuzberg_backlog::cli::{finish, init_logging, CommonArgs};
use kreuzberg_backlog::{import_milestones, load_items, GhCli, MilestoneSpec, Result};

#[derive(Parser)]
#[command(
    name = "import-milestones",
    version,
    about = "Import milestones from YAML to GitHub"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn run(cli: Cli) -> Result<()> {
    let milestones: Vec<MilestoneSpec> = load_items(cli.common.file_or("milestones.yaml"))?;
    import_milestones(
        &GhCli::new(),
        &milestones,
        &cli.common.import_options(),
        &mut std::io::stdout().lock(),
    )?;
    Ok(())
}

fn main() {
    init_logging();
    finish(run(Cli::parse()));
}
