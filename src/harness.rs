//! Test-facing assertion surface.
//!
//! A [`GoldenCase`] is the per-test-case handle: it carries the test id used
//! in console notices, the case's normalization filters, and a borrow of the
//! run-wide [`Patcher`]. In compare mode a mismatch is a failure with a
//! unified diff; in accept mode it rewrites the expectation literal in place.

use crate::filters::{FilterError, Filters};
use crate::patch::{CallSite, PatchError, PatchRequest, Patcher};
use similar::TextDiff;
use std::fmt::Display;
use thiserror::Error;

/// Environment flag that switches the whole run into accept mode.
/// Set and non-empty means accept; anything else means compare-only.
pub const ACCEPT_ENV: &str = "GOLDEN_ACCEPT";

const ACCEPT_GUIDANCE: &str = "To accept the new output, re-run the test with \
     GOLDEN_ACCEPT=1 (we recommend staging/committing your changes before \
     doing this)";

/// Run mode, selected once per process from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Fail on mismatch.
    #[default]
    Compare,
    /// Rewrite the expectation literal on mismatch.
    Accept,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var_os(ACCEPT_ENV) {
            Some(v) if !v.is_empty() => Mode::Accept,
            _ => Mode::Compare,
        }
    }
}

#[derive(Error, Debug)]
pub enum GoldenError {
    #[error(
        "actual output did not match the expected literal\n{diff}\n{}",
        ACCEPT_GUIDANCE
    )]
    Mismatch {
        expected: String,
        actual: String,
        diff: String,
    },

    #[error("did not raise when expected to")]
    DidNotRaise,

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Assertion handle for one test case.
pub struct GoldenCase<'run> {
    id: String,
    mode: Mode,
    filters: Filters,
    patcher: &'run mut Patcher,
}

impl<'run> GoldenCase<'run> {
    /// Create a case with the mode read from the environment.
    pub fn new(patcher: &'run mut Patcher, id: impl Into<String>) -> Self {
        Self::with_mode(patcher, id, Mode::from_env())
    }

    /// Create a case with an explicit mode. Used by drivers that resolve the
    /// mode themselves and by tests, which must not depend on process
    /// environment.
    pub fn with_mode(patcher: &'run mut Patcher, id: impl Into<String>, mode: Mode) -> Self {
        Self {
            id: id.into(),
            mode,
            filters: Filters::new(),
            patcher,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Register a substitution applied to actual values before they are
    /// compared or accepted. Registering the same pattern twice is a hard
    /// error. See [`Filters::insert`].
    pub fn substitute_expected(
        &mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Result<(), FilterError> {
        self.filters.insert(pattern, replacement)
    }

    /// Assert that `actual` equals the expectation literal at `site`.
    ///
    /// `expect` must be the current value of a triple-quoted block literal at
    /// the call site; in accept mode a mismatch rewrites that literal to hold
    /// `actual` instead of failing.
    pub fn assert_expected_inline(
        &mut self,
        site: CallSite,
        actual: &str,
        expect: &str,
    ) -> Result<(), GoldenError> {
        let actual = self.filters.apply(actual)?;

        match self.mode {
            Mode::Accept => {
                if actual != expect {
                    let request = PatchRequest::new(&self.id, site, actual);
                    let _ = self.patcher.patch(&request)?;
                }
                Ok(())
            }
            Mode::Compare => {
                if actual == expect {
                    Ok(())
                } else {
                    Err(mismatch(expect, &actual))
                }
            }
        }
    }

    /// Like [`assert_expected_inline`](Self::assert_expected_inline), but
    /// asserts against the `Display` form of the error returned by
    /// `operation`. An `Ok` return is the distinct "did not raise" failure.
    pub fn assert_expected_raises_inline<T, E: Display>(
        &mut self,
        site: CallSite,
        operation: impl FnOnce() -> Result<T, E>,
        expect: &str,
    ) -> Result<(), GoldenError> {
        match operation() {
            Err(e) => self.assert_expected_inline(site, &e.to_string(), expect),
            Ok(_) => Err(GoldenError::DidNotRaise),
        }
    }
}

fn mismatch(expected: &str, actual: &str) -> GoldenError {
    let diff = TextDiff::from_lines(expected, actual)
        .unified_diff()
        .header("expected", "actual")
        .to_string();
    GoldenError::Mismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
        diff,
    }
}
