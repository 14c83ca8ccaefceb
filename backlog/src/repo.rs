//! `owner/name` repository slugs and API endpoints.

use std::fmt;
use std::str::FromStr;

use crate::error::{BacklogError, Result};

/// A GitHub repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoSlug {
    type Err = BacklogError;

    fn from_str(s: &str) -> Result<Self> {
        let valid = |part: &str| !part.is_empty() && !part.contains('/');
        match s.trim().split_once('/') {
            Some((owner, name)) if valid(owner) && valid(name) => Ok(Self::new(owner, name)),
            _ => Err(BacklogError::InvalidRepo(s.to_string())),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// REST path under a repository.
///
/// Without a repository the literal `{owner}/{repo}` placeholders are kept;
/// `gh api` fills them in from the current checkout.
pub fn api_path(repo: Option<&RepoSlug>, suffix: &str) -> String {
    match repo {
        Some(repo) => format!("repos/{}/{}/{}", repo.owner, repo.name, suffix),
        None => format!("repos/{{owner}}/{{repo}}/{}", suffix),
    }
}

/// Append `--repo owner/name` when a repository was given.
pub fn push_repo_flag(args: &mut Vec<String>, repo: Option<&RepoSlug>) {
    if let Some(repo) = repo {
        args.push("--repo".to_string());
        args.push(repo.to_string());
    }
}
