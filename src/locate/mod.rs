//! Literal span location via tree-sitter.
//!
//! A call-site capture only knows the line an assertion started on; the parse
//! tree of the freshly re-read buffer is what knows where the enclosing
//! statement (and thus a multi-line literal) ends. This module wraps the
//! tree-sitter parse and the span refinement walk.

pub mod errors;
pub mod locator;
pub mod parser;

pub use errors::LocateError;
pub use locator::{refine_span, LineSpan};
pub use parser::{ParsedSource, SourceParser};
