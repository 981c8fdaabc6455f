//! Golden Patcher: golden-value test acceptance for block-literal expectations
//!
//! A test asserts that computed output equals an expected literal embedded in
//! the test's own source. In accept mode, a mismatch rewrites that literal in
//! place instead of failing, so expectations are updated by re-running the
//! suite rather than by hand.
//!
//! # Architecture
//!
//! The engine is a pipeline of small pieces in dependency order:
//!
//! - [`position`]: line-number to byte-offset arithmetic
//! - [`history`]: per-file ledger translating original call-site lines into
//!   current lines after earlier edits in the same run
//! - [`locate`]: tree-sitter span refinement from an approximate line hint to
//!   the full extent of the literal-bearing statement
//! - [`rewrite`]: the literal replacement itself, preserving quote and raw
//!   style and reporting the net line-count delta
//! - [`patch`]: orchestration of one acceptance (dedupe, re-read, locate,
//!   rewrite, backup, atomic write, record)
//! - [`filters`] and [`harness`]: the test-facing boundary
//!
//! # Safety
//!
//! - The file on disk is the source of truth: every request re-reads and
//!   re-parses, never reuses a parse tree across requests
//! - Atomic file writes (tempfile + fsync + rename)
//! - One `.bak` backup per file per run before the first rewrite
//! - Re-patching the same call site in one run is a reported no-op
//!
//! # Example
//!
//! ```no_run
//! use golden_patcher::{CallSite, GoldenCase, Mode, Patcher};
//!
//! let mut patcher = Patcher::new()?;
//! let mut case = GoldenCase::with_mode(&mut patcher, "suite.test_greeting", Mode::from_env());
//! case.assert_expected_inline(
//!     CallSite::new("tests/test_greeting.py", 12),
//!     &compute_greeting(),
//!     "hello",
//! )?;
//! # fn compute_greeting() -> String { String::new() }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod filters;
pub mod harness;
pub mod history;
pub mod locate;
pub mod patch;
pub mod position;
pub mod rewrite;

// Re-exports
pub use filters::{FilterError, Filters};
pub use harness::{GoldenCase, GoldenError, Mode, ACCEPT_ENV};
pub use history::{EditHistory, EditRecord};
pub use locate::{refine_span, LineSpan, LocateError, ParsedSource, SourceParser};
pub use patch::{backup_path, CallSite, PatchError, PatchOutcome, PatchRequest, Patcher};
pub use rewrite::{
    block_literals, ok_for_raw_block, rewrite_literal, BlockLiteral, LiteralStyle, RewriteError,
    Rewritten,
};
