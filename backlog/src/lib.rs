//! # kreuzberg-backlog
//!
//! Push a YAML backlog of labels, milestones and issues to GitHub using
//! the `gh` CLI.
//!
//! Each importer reads a list, compares it with what the repository
//! already has, and issues one `gh` command per entry. The runner is a
//! trait so the importers can be driven without a network:
//!
//! ```no_run
//! use kreuzberg_backlog::{import_labels, load_items, GhCli, ImportOptions, LabelSpec};
//!
//! let labels: Vec<LabelSpec> = load_items("labels.yaml")?;
//! let report = import_labels(&GhCli::new(), &labels, &ImportOptions::new(), &mut std::io::stdout())?;
//! println!("{}", report);
//! # Ok::<(), kreuzberg_backlog::BacklogError>(())
//! ```

pub mod cli;
pub mod error;
pub mod gh;
pub mod issues;
pub mod labels;
pub mod milestones;
pub mod models;
pub mod repo;
pub mod report;

pub use error::{BacklogError, Result};
pub use gh::{GhCli, GhOutput, GhRunner};
pub use issues::import_issues;
pub use labels::import_labels;
pub use milestones::import_milestones;
pub use models::{load_items, parse_items, IssueSpec, LabelSpec, MilestoneSpec};
pub use repo::RepoSlug;
pub use report::{ImportOptions, IssueReport, SyncReport};
