//! Shared plumbing for the `import-*` binaries.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::error::Result;
use crate::repo::RepoSlug;
use crate::report::ImportOptions;

/// Flags every importer accepts.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Path to the backlog YAML file
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// GitHub repo in owner/name format (defaults to the current checkout)
    #[arg(long, env = "GH_REPO", value_name = "OWNER/NAME")]
    pub repo: Option<RepoSlug>,

    /// Preview without changing anything on GitHub
    #[arg(long)]
    pub dry_run: bool,
}

impl CommonArgs {
    /// `--file`, or the tool's default file name.
    pub fn file_or(&self, default: &str) -> PathBuf {
        self.file.clone().unwrap_or_else(|| PathBuf::from(default))
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            repo: self.repo.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Flush progress, then print a failure and exit 1.
pub fn finish(result: Result<()>) {
    let _ = std::io::stdout().flush();
    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
