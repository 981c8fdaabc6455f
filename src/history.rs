//! Per-file ledger of literal edits applied during one accept-mode run.
//!
//! Call-site line numbers are captured against the file as it existed when
//! the process started, but each accepted edit can grow or shrink the file.
//! The ledger translates an original line number into the line it occupies
//! in the file as currently written, and guards against patching the same
//! call site twice in one run.
//!
//! One [`EditHistory`] exists per test run and is threaded explicitly through
//! every patch call; it grows monotonically and is never persisted.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// One applied edit: the original (unadjusted) line of the call site and the
/// net change in the file's line count caused by the rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRecord {
    /// Call-site line in the file as it existed at process start.
    pub line: usize,
    /// Lines added (positive) or removed (negative) by the rewrite.
    pub delta: i64,
}

/// Ordered, per-file edit ledger for a single test run.
#[derive(Debug, Default)]
pub struct EditHistory {
    state: HashMap<PathBuf, Vec<EditRecord>>,
    seen: HashSet<(PathBuf, usize)>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate an original line number into the corresponding line in the
    /// file after all edits recorded so far.
    ///
    /// Every recorded edit strictly above the queried line shifts it by that
    /// edit's delta; edits at or below the queried line do not affect it.
    /// A file with no recorded edits passes the line through unchanged.
    pub fn adjust_line(&self, file: &Path, line: usize) -> usize {
        let Some(records) = self.state.get(file) else {
            return line;
        };
        let mut adjusted = line as i64;
        for record in records {
            if record.line < line {
                adjusted += record.delta;
            }
        }
        adjusted.max(1) as usize
    }

    /// True once any edit has been recorded for `file`. Used to decide
    /// whether the one-time `.bak` backup still needs to be written.
    pub fn seen_file(&self, file: &Path) -> bool {
        self.state.contains_key(file)
    }

    /// True if an edit at exactly this (file, original line) pair was already
    /// recorded in this run. This is the idempotency guard: a shared call
    /// site hit twice must not be double-patched.
    pub fn seen_edit(&self, file: &Path, line: usize) -> bool {
        self.seen.contains(&(file.to_path_buf(), line))
    }

    /// Append a record for an applied edit. Records are never removed or
    /// merged; `adjust_line` replays them in insertion order.
    pub fn record_edit(&mut self, file: &Path, line: usize, delta: i64) {
        self.state
            .entry(file.to_path_buf())
            .or_default()
            .push(EditRecord { line, delta });
        self.seen.insert((file.to_path_buf(), line));
    }

    /// Forget everything recorded for `file`.
    ///
    /// Required after the file has been re-read from a source other than this
    /// run's own edits (an external modification or an in-process reload):
    /// stale records would adjust call-site lines against a file that no
    /// longer has that shape.
    pub fn reload_file(&mut self, file: &Path) {
        self.state.remove(file);
        self.seen.retain(|(f, _)| f != file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn unedited_file_passes_line_through() {
        let history = EditHistory::new();
        assert_eq!(history.adjust_line(&p("a.py"), 17), 17);
    }

    #[test]
    fn edit_above_shifts_later_lines() {
        let mut history = EditHistory::new();
        history.record_edit(&p("a.py"), 3, 2);
        assert_eq!(history.adjust_line(&p("a.py"), 2), 2);
        assert_eq!(history.adjust_line(&p("a.py"), 3), 3);
        assert_eq!(history.adjust_line(&p("a.py"), 4), 6);
    }

    #[test]
    fn deltas_accumulate_in_recorded_order() {
        let mut history = EditHistory::new();
        history.record_edit(&p("a.py"), 2, 2);
        history.record_edit(&p("a.py"), 5, -1);
        assert_eq!(history.adjust_line(&p("a.py"), 10), 11);
        assert_eq!(history.adjust_line(&p("a.py"), 5), 7);
        assert_eq!(history.adjust_line(&p("a.py"), 2), 2);
    }

    #[test]
    fn files_are_tracked_independently() {
        let mut history = EditHistory::new();
        history.record_edit(&p("a.py"), 1, 5);
        assert_eq!(history.adjust_line(&p("b.py"), 8), 8);
        assert!(history.seen_file(&p("a.py")));
        assert!(!history.seen_file(&p("b.py")));
    }

    #[test]
    fn seen_edit_matches_exact_pair() {
        let mut history = EditHistory::new();
        history.record_edit(&p("a.py"), 10, 0);
        assert!(history.seen_edit(&p("a.py"), 10));
        assert!(!history.seen_edit(&p("a.py"), 11));
        assert!(!history.seen_edit(&p("b.py"), 10));
    }

    #[test]
    fn reload_forgets_single_file() {
        let mut history = EditHistory::new();
        history.record_edit(&p("a.py"), 10, 3);
        history.record_edit(&p("b.py"), 4, 1);
        history.reload_file(&p("a.py"));

        assert!(!history.seen_file(&p("a.py")));
        assert!(!history.seen_edit(&p("a.py"), 10));
        assert_eq!(history.adjust_line(&p("a.py"), 20), 20);

        assert!(history.seen_file(&p("b.py")));
        assert_eq!(history.adjust_line(&p("b.py"), 5), 6);
    }

    #[test]
    fn adjustment_never_drops_below_line_one() {
        let mut history = EditHistory::new();
        history.record_edit(&p("a.py"), 1, -5);
        assert_eq!(history.adjust_line(&p("a.py"), 2), 1);
    }
}
