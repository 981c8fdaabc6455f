//! Block-literal rewriting: replace one triple-quoted string literal with new
//! contents while preserving the original quoting style.
//!
//! Only printable ASCII is representable. The rewrite preserves the quote
//! character unconditionally and the raw marker when the new value is still
//! expressible as a raw literal; otherwise the marker is dropped and full
//! escaping applies. Multi-line non-raw values get a `\`-newline continuation
//! immediately after the opening delimiter so accepted expectations render as
//! indented blocks instead of one escaped line.

use crate::locate::LineSpan;
use crate::position::{line_end, line_start, normalize_newlines};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("value contains non-printable character {ch:?}; only printable ASCII round-trips")]
    NotRepresentable { ch: char },

    #[error(
        "no triple-quoted block literal found on lines {start}-{end}; \
         was the expectation written as a block literal?"
    )]
    LiteralNotFound { start: usize, end: usize },
}

/// Quoting style of a matched block literal. Derived from the matched text,
/// never chosen arbitrarily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralStyle {
    /// Delimiter character, `'` or `"` (tripled in source).
    pub quote: char,
    /// Raw marker present (`r'''...'''`): backslashes are literal.
    pub raw: bool,
}

impl LiteralStyle {
    fn delimiter(&self) -> String {
        self.quote.to_string().repeat(3)
    }
}

/// Result of a literal rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// The full buffer with exactly one literal replaced.
    pub source: String,
    /// Net change in the buffer's total line count.
    pub delta: i64,
}

/// A block literal matched in a buffer, with its body decoded back to the
/// string value it denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLiteral {
    /// Byte range of the whole literal, raw marker included.
    pub range: Range<usize>,
    pub style: LiteralStyle,
    /// Decoded value (raw bodies verbatim, escapes processed otherwise).
    pub value: String,
}

// Non-greedy, dot-matches-newline. The two alternatives stand in for a
// backreference on the delimiter, which the regex crate does not support.
fn literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)(?P<raw>r?)(?:'''(?P<sq>.*?)'''|"""(?P<dq>.*?)""")"#)
            .expect("block literal pattern is valid")
    })
}

// The representable set: ASCII graphic characters plus the whitespace that
// survives a round trip through a block literal.
fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Is this value representable inside a raw triple-quoted literal with the
/// given quote character? Backslashes are always literal in a raw literal, so
/// a value containing the tripled quote, or ending in the quote character or
/// a backslash, cannot be expressed.
///
/// ```
/// use golden_patcher::rewrite::ok_for_raw_block;
/// assert!(ok_for_raw_block("blah", '\''));
/// assert!(!ok_for_raw_block("'", '\''));
/// assert!(!ok_for_raw_block("a ''' b", '\''));
/// assert!(!ok_for_raw_block("trailing\\", '\''));
/// ```
pub fn ok_for_raw_block(value: &str, quote: char) -> bool {
    let tripled = quote.to_string().repeat(3);
    if value.contains(&tripled) {
        return false;
    }
    match value.chars().last() {
        None => true,
        Some(last) => last != quote && last != '\\',
    }
}

fn escape_trailing_quote(mut s: String, quote: char) -> String {
    if s.ends_with(quote) {
        s.truncate(s.len() - quote.len_utf8());
        s.push('\\');
        s.push(quote);
    }
    s
}

/// Render `value` as a block literal in the given style, downgrading raw to
/// escaped when the value is not raw-representable.
fn render_literal(style: LiteralStyle, value: &str) -> String {
    let raw = style.raw && ok_for_raw_block(value, style.quote);

    let mut body = value.to_string();
    if !raw {
        body = body.replace('\\', "\\\\");
        body = escape_trailing_quote(body, style.quote);
        let tripled = style.delimiter();
        let escaped: String = tripled.chars().map(|q| format!("\\{q}")).collect();
        body = body.replace(&tripled, &escaped);
    }

    // Line continuation after the opening delimiter, so a multi-line value
    // starts flush on the next source line.
    if body.contains('\n') && !raw {
        body = format!("\\\n{body}");
    }

    let delim = style.delimiter();
    format!("{}{delim}{body}{delim}", if raw { "r" } else { "" })
}

/// Replace the single block literal within `span` with `value`.
///
/// Preserves quote style, makes a best effort to preserve raw-ness, and
/// reports the net change in line count. Exactly one literal (the first match
/// in the span's byte range) is replaced per call.
pub fn rewrite_literal(
    src: &str,
    span: LineSpan,
    value: &str,
) -> Result<Rewritten, RewriteError> {
    if let Some(ch) = value.chars().find(|&c| !is_printable(c)) {
        return Err(RewriteError::NotRepresentable { ch });
    }

    let value = normalize_newlines(value);

    // Delta starts from the new value's line count; the continuation marker
    // occupies a line of its own whenever the value is multi-line.
    let mut delta = value.matches('\n').count() as i64;
    if delta > 0 {
        delta += 1;
    }

    let start = line_start(src, span.start());
    let end = line_end(src, span.end());
    let window = &src[start..end];

    let caps = literal_regex()
        .captures(window)
        .ok_or(RewriteError::LiteralNotFound {
            start: span.start(),
            end: span.end(),
        })?;
    let (style, body, range) = captured_literal(&caps);
    delta -= body.matches('\n').count() as i64;

    let rendered = render_literal(style, &value);

    let mut source = String::with_capacity(src.len() + rendered.len());
    source.push_str(&src[..start]);
    source.push_str(&window[..range.start]);
    source.push_str(&rendered);
    source.push_str(&window[range.end..]);
    source.push_str(&src[end..]);

    Ok(Rewritten { source, delta })
}

/// All block literals in a buffer, in source order, with decoded values.
///
/// This is the dialect's own literal-parsing facility: it exists so tests can
/// verify that rewritten text evaluates back to the intended value without
/// executing anything. Unlike the rewrite matcher, the scan honors backslash
/// escapes, so a body ending in an escaped quote does not terminate early.
/// An unterminated literal ends the scan.
pub fn block_literals(src: &str) -> Vec<BlockLiteral> {
    let mut literals = Vec::new();
    let mut pos = 0;
    while let Some((open, quote)) = next_delimiter(src, pos) {
        let raw = open > 0 && src.as_bytes()[open - 1] == b'r';
        let body_start = open + 3;
        let Some(body_end) = scan_body(src, body_start, quote) else {
            break;
        };
        let start = if raw { open - 1 } else { open };
        let body = &src[body_start..body_end];
        literals.push(BlockLiteral {
            range: start..body_end + 3,
            style: LiteralStyle { quote, raw },
            value: decode_body(body, raw),
        });
        pos = body_end + 3;
    }
    literals
}

fn next_delimiter(src: &str, from: usize) -> Option<(usize, char)> {
    let rest = &src[from..];
    let single = rest.find("'''").map(|i| (from + i, '\''));
    let double = rest.find(r#"""""#).map(|i| (from + i, '"'));
    match (single, double) {
        (Some(s), Some(d)) => Some(if s.0 <= d.0 { s } else { d }),
        (found, None) | (None, found) => found,
    }
}

// Byte offset of the closing delimiter, or None if unterminated. A backslash
// consumes the following character even in raw literals; that matches how the
// dialect tokenizes (the backslash stays in a raw body but still cannot end
// the string).
fn scan_body(src: &str, mut i: usize, quote: char) -> Option<usize> {
    let bytes = src.as_bytes();
    let q = quote as u8;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == q && i + 2 < bytes.len() && bytes[i + 1] == q && bytes[i + 2] == q {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn captured_literal<'t>(caps: &regex::Captures<'t>) -> (LiteralStyle, &'t str, Range<usize>) {
    let raw = caps.name("raw").is_some_and(|m| m.as_str() == "r");
    let (quote, body) = match caps.name("sq") {
        Some(m) => ('\'', m),
        None => ('"', caps.name("dq").expect("one delimiter branch matched")),
    };
    let range = caps
        .get(0)
        .expect("capture group 0 always present")
        .range();
    (LiteralStyle { quote, raw }, body.as_str(), range)
}

fn decode_body(body: &str, raw: bool) -> String {
    if raw {
        return body.to_string();
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\n') => {}
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            // Unrecognized escapes stay verbatim, matching the dialect
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
