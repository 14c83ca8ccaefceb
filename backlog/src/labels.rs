//! Create or update labels from `labels.yaml`.

use std::collections::BTreeSet;
use std::io::Write;

use serde::Deserialize;

use crate::error::Result;
use crate::gh::{args, format_command, or_degraded, query, run_echoed, GhRunner};
use crate::models::LabelSpec;
use crate::repo::{push_repo_flag, RepoSlug};
use crate::report::{ImportOptions, SyncReport};

#[derive(Deserialize)]
struct RemoteLabel {
    name: String,
}

/// Names of the labels already on the repository.
///
/// A failed query yields an empty set.
pub fn fetch_label_names<R: GhRunner + ?Sized>(
    runner: &R,
    repo: Option<&RepoSlug>,
) -> Result<BTreeSet<String>> {
    let mut cmd = args(["label", "list", "--json", "name", "--limit", "500"]);
    push_repo_flag(&mut cmd, repo);

    let fetched = query(runner, &cmd).and_then(|stdout| {
        let labels: Vec<RemoteLabel> = serde_json::from_str(&stdout)?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    });
    or_degraded(fetched, "existing labels")
}

/// `gh label create ... --force`, which also updates an existing label.
pub fn label_args(label: &LabelSpec, repo: Option<&RepoSlug>) -> Vec<String> {
    let mut cmd = args(["label", "create", label.name.as_str()]);
    cmd.extend(args(["--color", label.hex_color()]));
    cmd.extend(args(["--description", label.description.as_str()]));
    cmd.push("--force".to_string());
    push_repo_flag(&mut cmd, repo);
    cmd
}

/// Write every label, counting creates, updates and failures.
pub fn import_labels<R, W>(
    runner: &R,
    labels: &[LabelSpec],
    options: &ImportOptions,
    out: &mut W,
) -> Result<SyncReport>
where
    R: GhRunner + ?Sized,
    W: Write + ?Sized,
{
    let repo = options.repo.as_ref();
    let existing = fetch_label_names(runner, repo)?;
    let mut report = SyncReport::default();

    for label in labels {
        let exists = existing.contains(&label.name);
        writeln!(out, "[{}] {}", if exists { "update" } else { "create" }, label.name)?;

        let cmd = label_args(label, repo);
        if options.dry_run {
            writeln!(out, "  [dry-run] $ {}", format_command(&cmd))?;
        } else if let Err(e) = run_echoed(runner, &cmd, out) {
            if e.is_fatal() {
                return Err(e);
            }
            log::error!("Failed for label '{}': {}", label.name, e);
            report.errors += 1;
            continue;
        }

        if exists {
            report.updated += 1;
        } else {
            report.created += 1;
        }
    }

    writeln!(out, "\nDone. {}", report)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_args() {
        let label = LabelSpec {
            name: "bug".into(),
            color: "#d73a4a".into(),
            description: "Something is broken".into(),
        };
        let repo = RepoSlug::new("acme", "widgets");

        assert_eq!(
            label_args(&label, Some(&repo)),
            vec![
                "label",
                "create",
                "bug",
                "--color",
                "d73a4a",
                "--description",
                "Something is broken",
                "--force",
                "--repo",
                "acme/widgets",
            ]
        );
    }
}
