//! Drive the importers against a scripted `gh`.

use std::cell::RefCell;

use kreuzberg_backlog::{
    import_issues, import_labels, import_milestones, parse_items, BacklogError, GhOutput,
    GhRunner, ImportOptions, IssueSpec, LabelSpec, MilestoneSpec, RepoSlug, Result,
};

/// Records every call and answers with the first matching rule.
struct FakeGh {
    calls: RefCell<Vec<Vec<String>>>,
    rules: Vec<(String, GhOutput)>,
    missing: bool,
}

impl FakeGh {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            rules: Vec::new(),
            missing: false,
        }
    }

    /// Answer calls whose joined arguments contain `needle`.
    fn on(mut self, needle: &str, output: GhOutput) -> Self {
        self.rules.push((needle.to_string(), output));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.join(" ")).collect()
    }

    fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                c.starts_with("issue create")
                    || c.starts_with("label create")
                    || c.contains("--method")
            })
            .collect()
    }
}

impl GhRunner for FakeGh {
    fn run(&self, args: &[String]) -> Result<GhOutput> {
        if self.missing {
            return Err(BacklogError::GhNotFound);
        }
        self.calls.borrow_mut().push(args.to_vec());
        let joined = args.join(" ");
        Ok(self
            .rules
            .iter()
            .find(|(needle, _)| joined.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| GhOutput::success("[]")))
    }
}

fn output_text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[test]
fn test_labels_create_and_update() {
    let gh = FakeGh::new().on(
        "label list",
        GhOutput::success(r#"[{"name":"bug"},{"name":"docs"}]"#),
    );
    let labels: Vec<LabelSpec> = parse_items(
        "- name: bug\n  color: '#d73a4a'\n- name: ocr\n  description: OCR work\n",
    )
    .unwrap();
    let mut out = Vec::new();

    let report = import_labels(&gh, &labels, &ImportOptions::new(), &mut out).unwrap();

    assert_eq!((report.created, report.updated, report.errors), (1, 1, 0));
    assert_eq!(
        gh.mutating_calls(),
        vec![
            "label create bug --color d73a4a --description  --force",
            "label create ocr --color ededed --description OCR work --force",
        ]
    );

    let text = output_text(out);
    assert!(text.contains("[update] bug"));
    assert!(text.contains("[create] ocr"));
    assert!(text.contains("  $ gh label create ocr"));
    assert!(text.contains("Done. created=1  updated=1  errors=0"));
}

#[test]
fn test_label_failure_counts_only_as_error() {
    let gh = FakeGh::new().on("label create bad", GhOutput::failure(1, "HTTP 422"));
    let labels: Vec<LabelSpec> = parse_items("- name: bad\n- name: good\n").unwrap();
    let mut out = Vec::new();

    let report = import_labels(&gh, &labels, &ImportOptions::new(), &mut out).unwrap();

    assert_eq!((report.created, report.updated, report.errors), (1, 0, 1));
}

#[test]
fn test_label_list_failure_degrades_to_create() {
    let gh = FakeGh::new().on("label list", GhOutput::failure(1, "auth required"));
    let labels: Vec<LabelSpec> = parse_items("- name: bug\n").unwrap();
    let mut out = Vec::new();

    let report = import_labels(&gh, &labels, &ImportOptions::new(), &mut out).unwrap();

    assert_eq!(report.created, 1);
}

#[test]
fn test_labels_dry_run_changes_nothing() {
    let gh = FakeGh::new();
    let labels: Vec<LabelSpec> = parse_items("- name: bug\n").unwrap();
    let options = ImportOptions::new()
        .with_repo(RepoSlug::new("acme", "widgets"))
        .dry_run();
    let mut out = Vec::new();

    let report = import_labels(&gh, &labels, &options, &mut out).unwrap();

    assert_eq!(report.created, 1);
    assert!(gh.mutating_calls().is_empty());
    assert_eq!(
        gh.calls(),
        vec!["label list --json name --limit 500 --repo acme/widgets"]
    );
    assert!(output_text(out).contains("[dry-run] $ gh label create bug"));
}

#[test]
fn test_missing_gh_is_fatal() {
    let mut gh = FakeGh::new();
    gh.missing = true;
    let labels: Vec<LabelSpec> = parse_items("- name: bug\n").unwrap();

    let err = import_labels(&gh, &labels, &ImportOptions::new(), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, BacklogError::GhNotFound));
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[test]
fn test_milestones_patch_existing_post_new() {
    // two pages, as `gh api --paginate` prints them
    let gh = FakeGh::new().on(
        "api repos/acme/widgets/milestones --paginate",
        GhOutput::success("[{\"title\":\"v1.0\",\"number\":4}]\n[{\"title\":\"v0.9\",\"number\":2}]"),
    );
    let milestones: Vec<MilestoneSpec> = parse_items(
        "- title: v1.0\n  description: ' Stable '\n  due_date: 2025-09-30\n- title: v2.0\n",
    )
    .unwrap();
    let options = ImportOptions::new().with_repo(RepoSlug::new("acme", "widgets"));
    let mut out = Vec::new();

    let report = import_milestones(&gh, &milestones, &options, &mut out).unwrap();

    assert_eq!((report.created, report.updated, report.errors), (1, 1, 0));
    assert_eq!(
        gh.mutating_calls(),
        vec![
            "api --method PATCH repos/acme/widgets/milestones/4 --field title=v1.0 \
             --field description=Stable --field due_on=2025-09-30T23:59:59Z",
            "api --method POST repos/acme/widgets/milestones --field title=v2.0 \
             --field description=",
        ]
    );
    assert!(output_text(out).contains("Done. created=1  updated=1  errors=0"));
}

#[test]
fn test_milestones_without_repo_use_placeholder() {
    let gh = FakeGh::new();
    let milestones: Vec<MilestoneSpec> = parse_items("- title: v1.0\n").unwrap();

    import_milestones(&gh, &milestones, &ImportOptions::new(), &mut Vec::new()).unwrap();

    let calls = gh.calls();
    assert_eq!(calls[0], "api repos/{owner}/{repo}/milestones --paginate");
    assert!(calls[1].contains("POST repos/{owner}/{repo}/milestones"));
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

const ISSUES: &str = "\
- title: Existing issue
- title: Add OCR fallback
  body: Use tesseract when text is empty
  labels: [enhancement, ocr]
  milestone: v1.0
- title: Unknown milestone
  milestone: someday
";

fn issue_gh() -> FakeGh {
    FakeGh::new()
        .on(
            "/milestones --paginate",
            GhOutput::success(r#"[{"title":"v1.0","number":3}]"#),
        )
        .on(
            "\"Existing issue\" in:title",
            GhOutput::success(r#"[{"title":"Existing issue"}]"#),
        )
}

#[test]
fn test_issues_skip_existing_and_resolve_milestones() {
    let gh = issue_gh();
    let issues: Vec<IssueSpec> = parse_items(ISSUES).unwrap();
    let mut out = Vec::new();

    let report = import_issues(&gh, &issues, &ImportOptions::new(), &mut out).unwrap();

    assert_eq!((report.created, report.skipped, report.errors), (2, 1, 0));
    assert_eq!(
        gh.mutating_calls(),
        vec![
            "issue create --title Add OCR fallback --body Use tesseract when text is empty \
             --label enhancement --label ocr --milestone 3",
            "issue create --title Unknown milestone --body ",
        ]
    );

    let text = output_text(out);
    assert!(text.contains("Found 1 milestones: [\"v1.0\"]"));
    assert!(text.contains("[1/3] Existing issue"));
    assert!(text.contains("  [skip] Issue already exists: Existing issue"));
    assert!(text.contains("[3/3] Unknown milestone"));
    assert!(text.contains("All issues processed."));
}

#[test]
fn test_issue_search_matches_exact_title_only() {
    let gh = FakeGh::new().on(
        "in:title",
        GhOutput::success(r#"[{"title":"Add OCR fallback (part 2)"}]"#),
    );
    let issues: Vec<IssueSpec> = parse_items("- title: Add OCR fallback\n").unwrap();

    let report = import_issues(&gh, &issues, &ImportOptions::new(), &mut Vec::new()).unwrap();
    assert_eq!(report.created, 1);
}

#[test]
fn test_issues_dry_run() {
    let gh = issue_gh();
    let issues: Vec<IssueSpec> = parse_items(ISSUES).unwrap();
    let mut out = Vec::new();

    let report =
        import_issues(&gh, &issues, &ImportOptions::new().dry_run(), &mut out).unwrap();

    assert_eq!(report.created, 2);
    assert!(gh.mutating_calls().is_empty());
    assert!(output_text(out).contains("  [dry-run] Would create: Add OCR fallback"));
}

#[test]
fn test_issue_failure_continues() {
    let gh = issue_gh().on(
        "issue create --title Add OCR fallback",
        GhOutput::failure(1, "could not add label"),
    );
    let issues: Vec<IssueSpec> = parse_items(ISSUES).unwrap();

    let report = import_issues(&gh, &issues, &ImportOptions::new(), &mut Vec::new()).unwrap();

    assert_eq!((report.created, report.skipped, report.errors), (1, 1, 1));
}
