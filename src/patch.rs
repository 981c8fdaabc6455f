//! Patch application: the orchestration path for one accepted expectation.
//!
//! For each accepted mismatch: consult the edit ledger, re-read the file from
//! disk (the disk is the source of truth; a prior request in this run may
//! already have rewritten it), refine the call-site line against the fresh
//! parse, rewrite the literal, back the file up once per run, write
//! atomically, and record the edit.

use crate::history::EditHistory;
use crate::locate::{refine_span, LineSpan, LocateError, SourceParser};
use crate::rewrite::{rewrite_literal, RewriteError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The source location an assertion was invoked from, captured against the
/// file as it existed at process start.
///
/// Helper functions that wrap an assertion forward the call site they were
/// handed instead of constructing their own, so the recorded location always
/// names the line holding the literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: PathBuf,
    /// 1-indexed line number.
    pub line: usize,
}

impl CallSite {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// One acceptance request: rewrite the expectation literal at `site` to hold
/// `value`.
#[derive(Debug, Clone)]
pub struct PatchRequest {
    /// Identifier of the owning test, used only for console notices.
    pub test_id: String,
    pub site: CallSite,
    /// Desired literal value (the filtered actual output).
    pub value: String,
}

impl PatchRequest {
    pub fn new(test_id: impl Into<String>, site: CallSite, value: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            site,
            value: value.into(),
        }
    }
}

/// Result of applying a patch request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOutcome should be checked for applied/skipped"]
pub enum PatchOutcome {
    /// The literal was rewritten and the edit recorded.
    Applied { file: PathBuf, line: usize, delta: i64 },
    /// This call site was already accepted earlier in the run; nothing was
    /// touched.
    Skipped { file: PathBuf, line: usize },
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(
        "failed to substitute string at {file}:{line}; did you use a \
         triple-quoted block literal?"
    )]
    UnchangedBuffer { file: PathBuf, line: usize },
}

/// Applies accepted expectations to source files, one request at a time.
///
/// Owns the run's [`EditHistory`]: construct one `Patcher` per test run and
/// thread it through every acceptance. Single-threaded by design; patching
/// takes `&mut self`, which serializes history updates and file writes.
pub struct Patcher {
    history: EditHistory,
    parser: SourceParser,
}

impl Patcher {
    pub fn new() -> Result<Self, PatchError> {
        Ok(Self {
            history: EditHistory::new(),
            parser: SourceParser::new()?,
        })
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Forget recorded edits for a file that was reloaded or externally
    /// modified mid-run. See [`EditHistory::reload_file`].
    pub fn reload_file(&mut self, file: &Path) {
        self.history.reload_file(file);
    }

    /// Apply one acceptance request.
    ///
    /// A repeat request for a call site already accepted in this run is a
    /// no-op reported as [`PatchOutcome::Skipped`]. Both paths print their
    /// console notice; the exact wording is a contract consumed by
    /// downstream tooling.
    pub fn patch(&mut self, request: &PatchRequest) -> Result<PatchOutcome, PatchError> {
        let file = &request.site.file;
        let line = request.site.line;

        if self.history.seen_edit(file, line) {
            println!("{}", skip_notice(&request.test_id, file, line));
            return Ok(PatchOutcome::Skipped {
                file: file.clone(),
                line,
            });
        }
        println!("{}", accept_notice(&request.test_id, file, line));

        let old = fs::read_to_string(file).map_err(|source| PatchError::Io {
            path: file.clone(),
            source,
        })?;
        let parsed = self.parser.parse_with_source(&old)?;
        if let Some(error_line) = parsed.first_error_line() {
            return Err(LocateError::Syntax { line: error_line }.into());
        }

        // The call-site line belongs to the original, pre-edit file for this
        // process's lifetime; the just-re-read buffer may already carry edits.
        let adjusted = self.history.adjust_line(file, line);
        let hint = LineSpan::single(adjusted)?;
        let span = refine_span(&parsed, hint);

        let rewritten = rewrite_literal(&old, span, &request.value)?;
        if rewritten.source == old {
            return Err(PatchError::UnchangedBuffer {
                file: file.clone(),
                line: adjusted,
            });
        }

        // One backup per file per run, clobbering any stale copy from a
        // previous run.
        if !self.history.seen_file(file) {
            let bak = backup_path(file);
            fs::write(&bak, &old).map_err(|source| PatchError::Io { path: bak, source })?;
        }

        atomic_write(file, rewritten.source.as_bytes())?;
        self.history.record_edit(file, line, rewritten.delta);

        Ok(PatchOutcome::Applied {
            file: file.clone(),
            line,
            delta: rewritten.delta,
        })
    }
}

fn accept_notice(test_id: &str, file: &Path, line: usize) -> String {
    format!(
        "Accepting new output for {test_id} at {}:{line}",
        file.display()
    )
}

fn skip_notice(test_id: &str, file: &Path, line: usize) -> String {
    format!(
        "Skipping already accepted output for {test_id} at {}:{line}",
        file.display()
    )
}

/// Sibling `.bak` path, extension appended rather than replaced.
pub fn backup_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Atomic file write: tempfile in the same directory + fsync + rename, then
/// an mtime bump so file watchers and incremental tooling notice the change.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), PatchError> {
    let io_err = |source| PatchError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        // A bare file name has an empty parent; the tempfile goes in cwd then.
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(content).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    let now = filetime::FileTime::now();
    filetime::set_file_mtime(path, now).map_err(io_err)?;

    Ok(())
}
