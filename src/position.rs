//! Line-number to byte-offset arithmetic over a source buffer.
//!
//! All functions here count logical lines separated by `\n`. Callers are
//! responsible for running buffers (and replacement values) through
//! [`normalize_newlines`] first; the offset math assumes single-character
//! line terminators.

/// Byte offset of the first character of line `lineno` (1-indexed).
///
/// Line 1 starts at offset 0. If `lineno` exceeds the buffer's line count,
/// the buffer length is returned.
///
/// ```
/// use golden_patcher::position::line_start;
/// assert_eq!(line_start("aaa\nbb\nc", 2), 4);
/// assert_eq!(line_start("aaa\nbb\nc", 1), 0);
/// ```
pub fn line_start(src: &str, lineno: usize) -> usize {
    debug_assert!(lineno >= 1, "line numbers are 1-indexed");
    let mut pos = 0;
    for _ in 1..lineno {
        match src[pos..].find('\n') {
            Some(i) => pos += i + 1,
            None => return src.len(),
        }
    }
    pos
}

/// Byte offset just before the terminating newline of line `lineno`
/// (1-indexed), or the buffer length if line `lineno` is the last line or
/// lies past the end of the buffer.
///
/// The clamping is deliberate: a literal on the final line of a file with no
/// trailing newline must still be addressable.
///
/// ```
/// use golden_patcher::position::line_end;
/// assert_eq!(line_end("aaa\nbb\nc", 2), 6);
/// assert_eq!(line_end("aaa\nbb\nc", 3), 8);
/// assert_eq!(line_end("aaa\nbb\nc", 99), 8);
/// ```
pub fn line_end(src: &str, lineno: usize) -> usize {
    debug_assert!(lineno >= 1, "line numbers are 1-indexed");
    let mut pos = 0;
    let mut end = 0;
    for _ in 0..lineno {
        match src[pos..].find('\n') {
            Some(i) => {
                end = pos + i;
                pos = end + 1;
            }
            None => return src.len(),
        }
    }
    end
}

/// Normalize `\r\n` and bare `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
