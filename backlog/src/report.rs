//! Import options and per-run tallies.

use std::fmt;

use crate::repo::RepoSlug;

/// Settings shared by all three importers.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Target repository; the current checkout's when `None`
    pub repo: Option<RepoSlug>,
    /// Print mutating commands instead of running them
    pub dry_run: bool,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, repo: RepoSlug) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Outcome of a label or milestone import.
///
/// A failed item counts only toward `errors`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: u32,
    pub updated: u32,
    pub errors: u32,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={}  updated={}  errors={}",
            self.created, self.updated, self.errors
        )
    }
}

/// Outcome of an issue import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueReport {
    pub created: u32,
    /// Already present with the same title
    pub skipped: u32,
    pub errors: u32,
}

impl fmt::Display for IssueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={}  skipped={}  errors={}",
            self.created, self.skipped, self.errors
        )
    }
}
