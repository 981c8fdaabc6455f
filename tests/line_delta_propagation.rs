//! Sequential edits to one buffer, with call-site lines adjusted through the
//! edit history. The final buffer is compared against hand-computed text, so
//! any drift in delta computation or line adjustment shows up as a concrete
//! textual mismatch.

use golden_patcher::{rewrite_literal, EditHistory, LineSpan};
use std::path::Path;

const PROGRAM: &str = r"
single_single('''0''')
single_multi('''1''')
multi_single('''\
2
''')
multi_multi_less('''\
3
4
''')
multi_multi_same('''\
5
''')
multi_multi_more('''\
6
''')
different_indent(
    RuntimeError,
    '''7'''
)
";

const EXPECTED: &str = r"
single_single('''a''')
single_multi('''\
b
''')
multi_single('''c''')
multi_multi_less('''\
d
''')
multi_multi_same('''\
e
''')
multi_multi_more('''\
f
g
''')
different_indent(
    RuntimeError,
    '''h'''
)
";

#[test]
fn sequential_edits_propagate_line_deltas() {
    // (original start line, original end line, new value)
    let edits: &[(usize, usize, &str)] = &[
        (2, 2, "a"),
        (3, 3, "b\n"),
        (4, 6, "c"),
        (7, 10, "d\n"),
        (11, 13, "e\n"),
        (14, 16, "f\ng\n"),
        (17, 20, "h"),
    ];

    let file = Path::new("not_a_real_file.py");
    let mut history = EditHistory::new();
    let mut program = PROGRAM.to_string();

    for &(start, end, value) in edits {
        let adjusted_start = history.adjust_line(file, start);
        let adjusted_end = history.adjust_line(file, end);
        let span = LineSpan::new(adjusted_start, adjusted_end).unwrap();
        let rewritten = rewrite_literal(&program, span, value).unwrap();
        program = rewritten.source;
        history.record_edit(file, start, rewritten.delta);
    }

    assert_eq!(program, EXPECTED);
}

#[test]
fn effective_target_line_is_original_plus_prior_deltas() {
    let file = Path::new("ledger.py");
    let mut history = EditHistory::new();
    let edits = [(3usize, 2i64), (8, -1), (12, 4)];
    for (line, delta) in edits {
        history.record_edit(file, line, delta);
    }

    for query in [1usize, 3, 5, 8, 10, 12, 20] {
        let expected: i64 = query as i64
            + edits
                .iter()
                .filter(|(line, _)| *line < query)
                .map(|(_, delta)| delta)
                .sum::<i64>();
        assert_eq!(history.adjust_line(file, query), expected as usize);
    }
}
