use crate::locate::errors::LocateError;
use crate::locate::parser::ParsedSource;

/// A 1-indexed, inclusive range of source lines bounding the statement that
/// contains the literal to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    start: usize,
    end: usize,
}

impl LineSpan {
    /// Construct a span, enforcing `1 <= start <= end` once here so the
    /// offset arithmetic downstream never has to re-check it.
    pub fn new(start: usize, end: usize) -> Result<Self, LocateError> {
        if start < 1 || start > end {
            return Err(LocateError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// A span covering a single line.
    pub fn single(line: usize) -> Result<Self, LocateError> {
        Self::new(line, line)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

/// Refine an approximate call-site span to the full extent of the enclosing
/// expression statement.
///
/// The hint comes from a call-site capture against the original file and is
/// conservative (start == end). The parse tree is authoritative: every
/// expression-statement node whose start line equals the hint's start line
/// donates its end line, so a literal spanning several lines widens the span
/// to its closing delimiter.
///
/// tree-sitter reports end positions for every node, so no fallback scan for
/// the closing-delimiter line is needed. The walk is pre-order and does not
/// depend on visiting the smallest enclosing node first; with one
/// literal-bearing statement per hinted line (the supported shape) at most
/// one node matches. Pathologically nested multi-line literals sharing a
/// start line are a documented limitation.
pub fn refine_span(parsed: &ParsedSource<'_>, hint: LineSpan) -> LineSpan {
    let mut refined = hint;
    visit(parsed.root_node(), &mut |node| {
        if node.kind() == "expression_statement" {
            let node_start = node.start_position().row + 1;
            if node_start == hint.start() {
                // end >= start for any node, so the span stays well-formed
                refined.end = node.end_position().row + 1;
            }
        }
    });
    refined
}

fn visit(node: tree_sitter::Node<'_>, f: &mut impl FnMut(tree_sitter::Node<'_>)) {
    f(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::parser::SourceParser;

    fn refine(source: &str, line: usize) -> LineSpan {
        let mut parser = SourceParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        assert!(!parsed.has_errors(), "fixture must parse cleanly");
        refine_span(&parsed, LineSpan::single(line).unwrap())
    }

    #[test]
    fn span_invariants_enforced() {
        assert!(LineSpan::new(0, 3).is_err());
        assert!(LineSpan::new(4, 3).is_err());
        assert!(LineSpan::new(2, 2).is_ok());
    }

    #[test]
    fn single_line_statement_stays_single() {
        let span = refine("foo('''abc''')\n", 1);
        assert_eq!((span.start(), span.end()), (1, 1));
    }

    #[test]
    fn multi_line_literal_widens_to_closing_delimiter() {
        let source = "first()\nfoo('''\\\na\nb\n''')\nlast()\n";
        let span = refine(source, 2);
        assert_eq!((span.start(), span.end()), (2, 5));
    }

    #[test]
    fn statements_nested_in_functions_are_found() {
        let source = "\
def test_foo():
    check(
        '''x
y''',
    )
";
        let span = refine(source, 2);
        assert_eq!((span.start(), span.end()), (2, 5));
    }

    #[test]
    fn unmatched_hint_is_returned_unchanged() {
        let source = "def f():\n    pass\n";
        // line 1 opens a function definition, not an expression statement
        let span = refine(source, 1);
        assert_eq!((span.start(), span.end()), (1, 1));
    }
}
