use pyedit_core::{
    Diagnostic, DiagnosticsClient, EditorSession, IndicatorStyle, LintRun, Linter, Position,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const QUIET: Duration = Duration::from_millis(5000);

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Linter answering every run with the same report
struct FixedLinter {
    report: String,
    runs: AtomicUsize,
}

impl FixedLinter {
    fn new(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            runs: AtomicUsize::new(0),
        }
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Linter for FixedLinter {
    fn run(&self, _path: &Path) -> anyhow::Result<LintRun> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(LintRun {
            exit_code: Some(6),
            stdout: self.report.clone(),
        })
    }
}

/// Copy the demo script into a fresh directory and open it
fn open_demo(start: Instant) -> (TempDir, EditorSession, pyedit_core::BufferId) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("demo.py");
    fs::copy(fixture("demo.py"), &path).expect("Failed to copy fixture");

    let mut session = EditorSession::new(QUIET);
    let id = session.open(&path, start).expect("Failed to open demo");
    (temp_dir, session, id)
}

fn report() -> String {
    fs::read_to_string(fixture("pylint_report.json")).expect("Failed to read report")
}

#[test]
fn test_identical_results_render_once() {
    let start = Instant::now();
    let (_dir, mut session, id) = open_demo(start);
    let client = DiagnosticsClient::new(FixedLinter::new(report()));

    assert_eq!(session.run_due_checks(start + QUIET, &client), 1);
    let revision = session.renderer(id).unwrap().revision();

    // The changed result re-armed the timer; the repeat check finds nothing new
    assert_eq!(session.run_due_checks(start + QUIET * 2, &client), 0);
    assert_eq!(client.linter().runs(), 2);
    assert_eq!(session.renderer(id).unwrap().revision(), revision);

    // And the timer is not re-armed after an unchanged result
    assert_eq!(session.run_due_checks(start + QUIET * 10, &client), 0);
    assert_eq!(client.linter().runs(), 2);
}

#[test]
fn test_error_is_hard_and_convention_is_hidden() {
    let start = Instant::now();
    let (_dir, mut session, id) = open_demo(start);
    let client = DiagnosticsClient::new(FixedLinter::new(report()));
    session.run_due_checks(start + QUIET, &client);

    let annotations = session.renderer(id).unwrap().annotations();
    assert_eq!(annotations.len(), 2);
    assert!(annotations.iter().all(|a| a.code != "C0114"));

    let error = annotations.iter().find(|a| a.code == "E0602").unwrap();
    assert_eq!(error.style, IndicatorStyle::Hard);
    let text = session.buffer(id).unwrap().text();
    assert_eq!(&text[error.range.clone()], "value");

    // The summary keeps the convention finding
    assert_eq!(session.diagnostics(id).unwrap().len(), 3);
    assert!(session.summary(id).unwrap().contains("C0114"));
}

#[test]
fn test_point_error_on_line_three_is_hard() {
    let start = Instant::now();
    let (_dir, mut session, id) = open_demo(start);
    let report = r#"[{"type": "error", "line": 3, "column": 0, "message-id": "E0001", "message": "invalid syntax"}]"#;
    let client = DiagnosticsClient::new(FixedLinter::new(report));
    session.run_due_checks(start + QUIET, &client);

    let annotations = session.renderer(id).unwrap().annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].style, IndicatorStyle::Hard);

    let text = session.buffer(id).unwrap().text();
    let line_three = pyedit_core::position_to_offset(text, Position::new(3, 0)).unwrap();
    assert_eq!(annotations[0].range.start, line_three);
}

#[test]
fn test_convention_only_renders_nothing() {
    let start = Instant::now();
    let (_dir, mut session, id) = open_demo(start);
    let report = r#"[{"type": "convention", "line": 1, "column": 0, "message-id": "C0301", "message": "Line too long"}]"#;
    let client = DiagnosticsClient::new(FixedLinter::new(report));
    session.run_due_checks(start + QUIET, &client);

    assert!(session.renderer(id).unwrap().annotations().is_empty());
    assert_eq!(
        session.diagnostics(id).unwrap(),
        &[Diagnostic::at(1, 0, "C0301", "Line too long")]
    );
}

#[test]
fn test_check_waits_for_quiet_after_last_edit() {
    let start = Instant::now();
    let (_dir, mut session, id) = open_demo(start);
    let client = DiagnosticsClient::new(FixedLinter::new("[]"));

    let first_edit = start + Duration::from_millis(100);
    session
        .edit(id, first_edit, |buffer| buffer.insert(0, "# one\n"))
        .unwrap();
    let second_edit = first_edit + Duration::from_millis(4000);
    session
        .edit(id, second_edit, |buffer| buffer.insert(0, "# two\n"))
        .unwrap();

    // Quiet interval after the first edit has passed, but not after the second
    assert_eq!(session.run_due_checks(first_edit + QUIET, &client), 0);
    assert_eq!(client.linter().runs(), 0);

    assert_eq!(session.run_due_checks(second_edit + QUIET, &client), 1);
    assert_eq!(client.linter().runs(), 1);

    // The file the linter read has both edits
    let saved = fs::read_to_string(session.buffer(id).unwrap().path()).unwrap();
    assert!(saved.starts_with("# two\n# one\n"));
}

#[test]
fn test_switching_tabs_stops_the_hidden_buffer() {
    let start = Instant::now();
    let (dir, mut session, first) = open_demo(start);
    let client = DiagnosticsClient::new(FixedLinter::new("[]"));

    let other = dir.path().join("other.py");
    fs::write(&other, "pass\n").unwrap();
    let second = session.open(&other, start).unwrap();
    assert_eq!(session.active(), Some(second));

    session.run_due_checks(start + QUIET, &client);
    assert_eq!(client.linter().runs(), 1);
    assert!(session.diagnostics(first).unwrap().is_empty());
    assert_eq!(session.find_by_path(&other), Some(second));
}

const UNUSED_IMPORT: &str = r#"[{"type": "warning", "line": 2, "column": 0, "endLine": 2, "endColumn": 9, "message-id": "W0611", "message": "Unused import os"}]"#;

fn open_text(text: &str, start: Instant) -> (TempDir, EditorSession, pyedit_core::BufferId) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("main.py");
    fs::write(&path, text).expect("Failed to write source");

    let mut session = EditorSession::new(QUIET);
    let id = session.open(&path, start).expect("Failed to open source");
    (temp_dir, session, id)
}

#[test]
fn test_edit_keeps_findings_on_their_lines() {
    let start = Instant::now();
    let (_dir, mut session, id) = open_text("x = 1\nimport os\n", start);
    let client = DiagnosticsClient::new(FixedLinter::new(UNUSED_IMPORT));
    assert_eq!(session.run_due_checks(start + QUIET, &client), 1);

    let edited = start + QUIET * 2;
    session.edit(id, edited, |buffer| buffer.insert(1, "yz")).unwrap();
    let text = session.buffer(id).unwrap().text();
    let annotation = &session.renderer(id).unwrap().annotations()[0];
    assert_eq!(&text[annotation.range.clone()], "import os");

    // Same report after the edit: nothing new to paint, and nothing misplaced
    assert_eq!(session.run_due_checks(edited + QUIET, &client), 0);
    assert_eq!(client.linter().runs(), 2);
    let text = session.buffer(id).unwrap().text();
    let annotation = &session.renderer(id).unwrap().annotations()[0];
    assert_eq!(&text[annotation.range.clone()], "import os");
}

#[test]
fn test_shrinking_edit_keeps_ranges_in_bounds() {
    let start = Instant::now();
    let (_dir, mut session, id) = open_text("x = 1\nimport os\n", start);
    let client = DiagnosticsClient::new(FixedLinter::new(UNUSED_IMPORT));
    session.run_due_checks(start + QUIET, &client);
    assert_eq!(session.renderer(id).unwrap().annotations().len(), 1);

    for text in ["x = 1\nim\n", "x\n", ""] {
        session
            .edit(id, start + QUIET * 2, |buffer| buffer.set_text(text))
            .unwrap();
        let len = session.buffer(id).unwrap().text().len();
        for annotation in session.renderer(id).unwrap().annotations() {
            assert!(annotation.range.end <= len, "{text:?}: {:?}", annotation.range);
        }
    }
}
