use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source buffer")]
    ParseFailed,

    #[error("syntax error in source buffer at line {line}")]
    Syntax { line: usize },

    #[error("invalid line span: start {start} must be >= 1 and <= end {end}")]
    InvalidSpan { start: usize, end: usize },
}
