//! Create GitHub issues from issues.yaml.
//!
//! Labels and milestones must already exist (run import-labels and
//! import-milestones first).

use clap::Parser;

use kreuzberg_backlog::cli::{finish, init_logging, CommonArgs};
use kreuzberg_backlog::{import_issues, load_items, GhCli, IssueSpec, Result};

#[derive(Parser)]
#[command(name = "import-issues", version, about = "Import issues from YAML to GitHub")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn run(cli: Cli) -> Result<()> {
    let issues: Vec<IssueSpec> = load_items(cli.common.file_or("issues.yaml"))?;
    import_issues(
        &GhCli::new(),
        &issues,
        &cli.common.import_options(),
        &mut std::io::stdout().lock(),
    )?;
    Ok(())
}

fn main() {
    init_logging();
    finish(run(Cli::parse()));
}
