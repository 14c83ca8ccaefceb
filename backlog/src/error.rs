//! Error types for the backlog import tools.

use thiserror::Error;

/// Result type alias for backlog operations.
pub type Result<T> = std::result::Result<T, BacklogError>;

/// Errors that can occur while importing a backlog.
#[derive(Error, Debug)]
pub enum BacklogError {
    /// I/O error reading the backlog or writing progress
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed backlog file
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Unparseable `gh` output
    #[error("Invalid JSON from gh: {0}")]
    Json(#[from] serde_json::Error),

    /// Repository argument is not `owner/name`
    #[error("Invalid repository '{0}': expected owner/name")]
    InvalidRepo(String),

    /// The `gh` executable is not on PATH
    #[error("gh CLI not found. Install from https://cli.github.com/")]
    GhNotFound,

    /// `gh` ran but exited unsuccessfully
    #[error("gh command failed ({}): {stderr}", exit_label(.status))]
    CommandFailed { status: Option<i32>, stderr: String },
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit {}", code),
        None => "signal".to_string(),
    }
}

impl BacklogError {
    /// Errors that make every further `gh` call pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BacklogError::GhNotFound | BacklogError::Io(_))
    }
}
