//! Create or update milestones from `milestones.yaml`.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Deserialize;

use crate::error::Result;
use crate::gh::{args, format_command, or_degraded, parse_paginated, query, run_echoed, GhRunner};
use crate::models::MilestoneSpec;
use crate::repo::{api_path, RepoSlug};
use crate::report::{ImportOptions, SyncReport};

#[derive(Deserialize)]
struct RemoteMilestone {
    title: String,
    number: u64,
}

/// Milestone numbers keyed by title.
///
/// A failed query or unexpected payload yields an empty map.
pub fn fetch_milestones<R: GhRunner + ?Sized>(
    runner: &R,
    repo: Option<&RepoSlug>,
) -> Result<BTreeMap<String, u64>> {
    let cmd = args(["api".to_string(), api_path(repo, "milestones"), "--paginate".to_string()]);

    let fetched = query(runner, &cmd).and_then(|stdout| {
        let milestones: Vec<RemoteMilestone> = parse_paginated(&stdout)?;
        Ok(milestones.into_iter().map(|m| (m.title, m.number)).collect())
    });
    or_degraded(fetched, "milestones")
}

/// `gh api` call that writes one milestone.
///
/// PATCHes `number` when the milestone exists, otherwise POSTs a new one.
pub fn milestone_args(
    milestone: &MilestoneSpec,
    number: Option<u64>,
    repo: Option<&RepoSlug>,
) -> Vec<String> {
    let (method, endpoint) = match number {
        Some(n) => ("PATCH", api_path(repo, &format!("milestones/{}", n))),
        None => ("POST", api_path(repo, "milestones")),
    };

    let mut cmd = args(["api", "--method", method]);
    cmd.push(endpoint);
    cmd.extend(args(["--field".to_string(), format!("title={}", milestone.title)]));
    cmd.extend(args([
        "--field".to_string(),
        format!("description={}", milestone.description.trim()),
    ]));
    if let Some(due_on) = milestone.due_on() {
        cmd.extend(args(["--field".to_string(), format!("due_on={}", due_on)]));
    }
    cmd
}

/// Write every milestone, counting creates, updates and failures.
pub fn import_milestones<R, W>(
    runner: &R,
    milestones: &[MilestoneSpec],
    options: &ImportOptions,
    out: &mut W,
) -> Result<SyncReport>
where
    R: GhRunner + ?Sized,
    W: Write + ?Sized,
{
    let repo = options.repo.as_ref();
    let existing = fetch_milestones(runner, repo)?;
    let mut report = SyncReport::default();

    for milestone in milestones {
        let number = existing.get(&milestone.title).copied();
        let action = if number.is_some() { "update" } else { "create" };
        writeln!(out, "[{}] {}", action, milestone.title)?;

        let cmd = milestone_args(milestone, number, repo);
        if options.dry_run {
            writeln!(out, "  [dry-run] $ {}", format_command(&cmd))?;
        } else if let Err(e) = run_echoed(runner, &cmd, out) {
            if e.is_fatal() {
                return Err(e);
            }
            log::error!("Failed for milestone '{}': {}", milestone.title, e);
            report.errors += 1;
            continue;
        }

        if number.is_some() {
            report.updated += 1;
        } else {
            report.created += 1;
        }
    }

    writeln!(out, "\nDone. {}", report)?;
    Ok(report)
}
