//! Create issues from `issues.yaml`.
//!
//! Labels and milestones must already exist; run the other two importers
//! first. Issues whose title matches an open issue are skipped.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Deserialize;

use crate::error::Result;
use crate::gh::{args, format_command, query, run_echoed, GhRunner};
use crate::milestones::fetch_milestones;
use crate::models::IssueSpec;
use crate::repo::{push_repo_flag, RepoSlug};
use crate::report::{ImportOptions, IssueReport};

#[derive(Deserialize)]
struct RemoteIssue {
    title: String,
}

/// Whether an open issue already has exactly this title.
///
/// Search failures count as "not found"; only fatal errors propagate.
pub fn issue_exists<R: GhRunner + ?Sized>(
    runner: &R,
    title: &str,
    repo: Option<&RepoSlug>,
) -> Result<bool> {
    let mut cmd = args(["issue", "list", "--search"]);
    cmd.push(format!("\"{}\" in:title", title));
    cmd.extend(args(["--state", "open", "--json", "title", "--limit", "25"]));
    push_repo_flag(&mut cmd, repo);

    let stdout = match query(runner, &cmd) {
        Ok(stdout) => stdout,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            log::debug!("Issue search failed for '{}': {}", title, e);
            return Ok(false);
        }
    };

    // search is fuzzy, so compare titles exactly
    Ok(serde_json::from_str::<Vec<RemoteIssue>>(&stdout)
        .map(|issues| issues.iter().any(|i| i.title == title))
        .unwrap_or(false))
}

/// `gh issue create` arguments for one issue.
///
/// A milestone title missing from `milestones` is dropped with a warning.
pub fn issue_args(
    issue: &IssueSpec,
    milestones: &BTreeMap<String, u64>,
    repo: Option<&RepoSlug>,
) -> Vec<String> {
    let mut cmd = args(["issue", "create", "--title", issue.title.as_str()]);
    cmd.extend(args(["--body", issue.body.as_str()]));

    for label in &issue.labels {
        cmd.extend(args(["--label", label.as_str()]));
    }

    if let Some(title) = issue.milestone.as_deref().filter(|t| !t.is_empty()) {
        match milestones.get(title) {
            Some(number) => cmd.extend(args(["--milestone".to_string(), number.to_string()])),
            None => log::warn!(
                "Milestone not found: '{}', skipping milestone assignment",
                title
            ),
        }
    }

    push_repo_flag(&mut cmd, repo);
    cmd
}

/// Create every issue in order, skipping duplicates.
pub fn import_issues<R, W>(
    runner: &R,
    issues: &[IssueSpec],
    options: &ImportOptions,
    out: &mut W,
) -> Result<IssueReport>
where
    R: GhRunner + ?Sized,
    W: Write + ?Sized,
{
    let repo = options.repo.as_ref();

    writeln!(out, "Fetching milestone map from GitHub...")?;
    let milestones = fetch_milestones(runner, repo)?;
    let titles: Vec<&str> = milestones.keys().map(String::as_str).collect();
    writeln!(out, "  Found {} milestones: {:?}\n", milestones.len(), titles)?;

    let mut report = IssueReport::default();
    let total = issues.len();

    for (idx, issue) in issues.iter().enumerate() {
        writeln!(out, "[{}/{}] {}", idx + 1, total, issue.title)?;

        if issue_exists(runner, &issue.title, repo)? {
            writeln!(out, "  [skip] Issue already exists: {}", issue.title)?;
            report.skipped += 1;
        } else {
            let cmd = issue_args(issue, &milestones, repo);
            if options.dry_run {
                writeln!(out, "  [dry-run] Would create: {}", issue.title)?;
                log::debug!("$ {}", format_command(&cmd));
                report.created += 1;
            } else {
                match run_echoed(runner, &cmd, out) {
                    Ok(_) => report.created += 1,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        log::error!("Failed for issue '{}': {}", issue.title, e);
                        report.errors += 1;
                    }
                }
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "All issues processed. {}", report)?;
    Ok(report)
}
