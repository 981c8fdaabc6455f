//! End-to-end accept-mode runs against a real file on disk: a shared helper
//! hit twice in one run, a second test in the same file, idempotent re-runs,
//! and the explicit reload reset.

use golden_patcher::{
    block_literals, backup_path, CallSite, GoldenCase, Mode, PatchOutcome, PatchRequest, Patcher,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FIXTURE: &str = r"def helper():
    check('''w''')


def test_b():
    check('''\
x
y
z''')
";

const ACCEPTED: &str = r"def helper():
    check('''\
a
b''')


def test_b():
    check('''\
c
d''')
";

// helper's expectation literal sits on line 2, test_b's on line 6
const HELPER_LINE: usize = 2;
const TEST_B_LINE: usize = 6;

fn setup() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("test.py");
    fs::write(&file, FIXTURE).unwrap();
    (dir, file)
}

fn run_accept(patcher: &mut Patcher, file: &Path) {
    // Expectations are captured once per run, the way loading the test file
    // bakes its literals in; they do not observe this run's own rewrites.
    let expect_helper = current(file, 0);
    let expect_b = current(file, 1);

    // test_a invokes the shared helper twice; both hits land on the same
    // call site, so only the first may rewrite
    let mut case_a = GoldenCase::with_mode(patcher, "suite.test_a", Mode::Accept);
    for _ in 0..2 {
        case_a
            .assert_expected_inline(CallSite::new(file, HELPER_LINE), "a\nb", &expect_helper)
            .unwrap();
    }

    let mut case_b = GoldenCase::with_mode(patcher, "suite.test_b", Mode::Accept);
    case_b
        .assert_expected_inline(CallSite::new(file, TEST_B_LINE), "c\nd", &expect_b)
        .unwrap();
}

// The literal value the file currently holds at the given index.
fn current(file: &Path, index: usize) -> String {
    let literals = block_literals(&fs::read_to_string(file).unwrap());
    literals[index].value.clone()
}

#[test]
fn accept_run_patches_once_per_call_site() {
    let (_dir, file) = setup();
    let mut patcher = Patcher::new().unwrap();

    run_accept(&mut patcher, &file);

    assert_eq!(fs::read_to_string(&file).unwrap(), ACCEPTED);
    assert_eq!(fs::read_to_string(backup_path(&file)).unwrap(), FIXTURE);
    assert!(patcher.history().seen_edit(&file, HELPER_LINE));
    assert!(patcher.history().seen_edit(&file, TEST_B_LINE));
}

#[test]
fn second_accept_run_is_a_no_op() {
    let (_dir, file) = setup();

    let mut first_run = Patcher::new().unwrap();
    run_accept(&mut first_run, &file);
    let after_first = fs::read_to_string(&file).unwrap();

    // A fresh process: new patcher, expectations re-read from the patched file
    let mut second_run = Patcher::new().unwrap();
    run_accept(&mut second_run, &file);

    assert_eq!(fs::read_to_string(&file).unwrap(), after_first);
    // Nothing mismatched, so nothing was patched or backed up
    assert!(!second_run.history().seen_file(&file));
}

#[test]
fn compare_mode_passes_after_acceptance() {
    let (_dir, file) = setup();

    let mut patcher = Patcher::new().unwrap();
    run_accept(&mut patcher, &file);

    let mut verifier = Patcher::new().unwrap();
    let mut case = GoldenCase::with_mode(&mut verifier, "suite.test_a", Mode::Compare);
    case.assert_expected_inline(CallSite::new(&file, HELPER_LINE), "a\nb", &current(&file, 0))
        .unwrap();
    case.assert_expected_inline(CallSite::new(&file, TEST_B_LINE), "c\nd", &current(&file, 1))
        .unwrap();
}

#[test]
fn repeat_request_reports_skipped_outcome() {
    let (_dir, file) = setup();
    let mut patcher = Patcher::new().unwrap();

    let request = PatchRequest::new("suite.test_a", CallSite::new(&file, HELPER_LINE), "a\nb");
    let first = patcher.patch(&request).unwrap();
    let second = patcher.patch(&request).unwrap();

    assert!(matches!(first, PatchOutcome::Applied { delta: 2, .. }));
    assert!(matches!(second, PatchOutcome::Skipped { .. }));
}

#[test]
fn reload_reset_allows_repatching_after_external_change() {
    let (_dir, file) = setup();
    let mut patcher = Patcher::new().unwrap();

    let request = PatchRequest::new("suite.test_a", CallSite::new(&file, HELPER_LINE), "a\nb");
    let _ = patcher.patch(&request).unwrap();

    // The file is externally reverted; stale ledger entries would both skip
    // the call site and mis-adjust its line
    fs::write(&file, FIXTURE).unwrap();
    patcher.reload_file(&file);

    let outcome = patcher.patch(&request).unwrap();
    assert!(matches!(outcome, PatchOutcome::Applied { .. }));
    let literals = block_literals(&fs::read_to_string(&file).unwrap());
    assert_eq!(literals[0].value, "a\nb");
}
