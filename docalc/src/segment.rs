use docalc_derive::EnumDisplay;

/// Keywords that open a multi-line statement. A line starting with one of
/// these begins buffering a block.
const BLOCK_KEYWORDS: [&str; 11] = [
    "def ", "class ", "if ", "for ", "while ", "try:", "except", "finally:", "with ", "elif ",
    "else:",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumDisplay)]
#[docalc(rename_all = "snake_case")]
pub enum UnitKind {
    SingleLine,
    Block,
}

/// An independently evaluated slice of the document.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    /// 0-based document line of the unit's first line
    pub start_line: usize,
    pub source: String,
    pub kind: UnitKind,
}

/// Splits a document into evaluation units.
///
/// Block extent is tracked by counting `:` headers: a trailing colon opens a
/// nesting level, an unindented line without one closes it. The dedented
/// closing line still belongs to the block, which is what lets a call after
/// a `def` become the block's trailing expression. Blank and comment lines
/// never touch the depth count.
pub fn segment(input: &str) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut block_start = 0;
    let mut depth = 0usize;

    for (i, line) in input.lines().enumerate() {
        let stripped = line.trim();

        // blank and comment lines stay in an open block, otherwise they are
        // trivial units of their own
        if stripped.is_empty() || stripped.starts_with('#') {
            if block.is_empty() {
                units.push(single_line(i, line));
            } else {
                block.push(line);
            }
            continue;
        }

        if block.is_empty() {
            if !opens_block(stripped) {
                units.push(single_line(i, line));
                continue;
            }
            block_start = i;
        }
        block.push(line);

        if stripped.ends_with(':') {
            depth += 1;
        } else if !line.starts_with([' ', '\t']) {
            depth = depth.saturating_sub(1);
        }
        // a header without a trailing colon closes right away
        if depth == 0 {
            units.push(block_unit(block_start, &block));
            block.clear();
        }
    }
    if !block.is_empty() {
        units.push(block_unit(block_start, &block));
    }
    units
}

fn opens_block(stripped: &str) -> bool {
    stripped.ends_with(':') || BLOCK_KEYWORDS.iter().any(|kw| stripped.starts_with(kw))
}

fn single_line(start_line: usize, line: &str) -> Unit {
    Unit {
        start_line,
        source: line.to_string(),
        kind: UnitKind::SingleLine,
    }
}

fn block_unit(start_line: usize, lines: &[&str]) -> Unit {
    Unit {
        start_line,
        source: lines.join("\n").trim().to_string(),
        kind: UnitKind::Block,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(input: &str) -> Vec<(usize, UnitKind)> {
        segment(input)
            .into_iter()
            .map(|u| (u.start_line, u.kind))
            .collect()
    }

    #[test]
    fn single_lines() {
        assert_eq!(
            kinds("x = 2\ny = x + 3\ny"),
            vec![
                (0, UnitKind::SingleLine),
                (1, UnitKind::SingleLine),
                (2, UnitKind::SingleLine),
            ],
        );
    }

    #[test]
    fn blank_lines_are_units() {
        assert_eq!(
            kinds("x = 1\n\n2 + 2"),
            vec![
                (0, UnitKind::SingleLine),
                (1, UnitKind::SingleLine),
                (2, UnitKind::SingleLine),
            ],
        );
    }

    #[test]
    fn def_block_swallows_trailing_call() {
        let units = segment("def double(x):\n    return x * 2\ndouble(3)\n1 + 1");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, UnitKind::Block);
        assert_eq!(units[0].start_line, 0);
        assert_eq!(units[0].source, "def double(x):\n    return x * 2\ndouble(3)");
        assert_eq!(units[1].kind, UnitKind::SingleLine);
        assert_eq!(units[1].start_line, 3);
    }

    #[test]
    fn if_else_is_one_block() {
        let units = segment("if x:\n    y = 1\nelse:\n    y = 2\nz = 3");
        // the else header opens another nesting level, so one dedented line
        // is not enough to close the block and it runs to the end
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Block);
        assert!(units[0].source.ends_with("z = 3"));
    }

    #[test]
    fn blank_lines_stay_in_block() {
        let units = segment("while x:\n    x = x - 1\n\n    y = 2\ndone = 1");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Block);
    }

    #[test]
    fn unterminated_block_is_flushed() {
        let units = segment("def f():\n    return 1");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Block);
    }

    #[test]
    fn block_source_is_trimmed() {
        let units = segment("if x:\n    y = 1\nz");
        assert_eq!(units[0].source, "if x:\n    y = 1\nz");
    }

    #[test]
    fn comment_ending_in_colon_does_not_nest() {
        let units = segment("def f(x):\n    # doubles:\n    return x * 2\nf(3)\n1 + 1");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, UnitKind::Block);
        assert!(units[0].source.ends_with("f(3)"));
        assert_eq!(units[1], Unit {
            start_line: 4,
            source: "1 + 1".to_string(),
            kind: UnitKind::SingleLine,
        });
    }

    #[test]
    fn unindented_comment_does_not_close_a_block() {
        let units = segment("def f(x):\n    return x\n# note\nf(3)");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Block);
        assert!(units[0].source.ends_with("f(3)"));
    }

    #[test]
    fn inline_suite_closes_on_its_own_line() {
        assert_eq!(
            kinds("if True: y = 1\nz = 2"),
            vec![(0, UnitKind::Block), (1, UnitKind::SingleLine)],
        );
    }

    #[test]
    fn trailing_colon_opens_a_block_without_a_keyword() {
        let units = segment("match x:\n    y\nz");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Block);
    }

    #[test]
    fn unit_kind_tags() {
        assert_eq!(UnitKind::SingleLine.to_string(), "single_line");
        assert_eq!(UnitKind::Block.to_string(), "block");
    }
}
