//! Line and cell model of the tracking document
//!
//! Every line keeps its exact text and terminator, so serializing an
//! unmodified document reproduces the input byte for byte. A line whose
//! first non-space character is `|` is a row; its cells are the byte ranges
//! between pipes.

use std::ops::Range;

/// One line with its terminator (`\n`, `\r\n` or none)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub content: String,
    pub ending: &'static str,
}

impl Line {
    /// Cell byte ranges, `None` when the line is not a row
    #[must_use]
    pub fn cells(&self) -> Option<Vec<Range<usize>>> {
        if !self.content.trim_start().starts_with('|') {
            return None;
        }
        let pipes: Vec<usize> = self.content.match_indices('|').map(|(i, _)| i).collect();
        let mut ranges: Vec<Range<usize>> = pipes.windows(2).map(|w| w[0] + 1..w[1]).collect();
        let last = *pipes.last()?;
        if !self.content[last + 1..].trim().is_empty() {
            ranges.push(last + 1..self.content.len());
        }
        Some(ranges)
    }

    /// Text of every cell
    #[must_use]
    pub fn cell_texts(&self) -> Option<Vec<&str>> {
        self.cells()
            .map(|ranges| ranges.into_iter().map(|r| &self.content[r]).collect())
    }

    /// Replace the text of cell `idx`
    ///
    /// Returns `false` when the line is not a row or has no such cell.
    pub fn set_cell(&mut self, idx: usize, text: &str) -> bool {
        let Some(range) = self.cells().and_then(|c| c.get(idx).cloned()) else {
            return false;
        };
        self.content.replace_range(range, text);
        true
    }
}

/// Parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub lines: Vec<Line>,
}

impl Document {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let lines = text
            .split_inclusive('\n')
            .map(|raw| {
                if let Some(content) = raw.strip_suffix("\r\n") {
                    Line { content: content.to_string(), ending: "\r\n" }
                } else if let Some(content) = raw.strip_suffix('\n') {
                    Line { content: content.to_string(), ending: "\n" }
                } else {
                    Line { content: raw.to_string(), ending: "" }
                }
            })
            .collect();
        Self { lines }
    }

    /// Serialize back to text
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.content);
            out.push_str(line.ending);
        }
        out
    }
}

/// Overwrite `original` with `value`, keeping its character width
///
/// Leading whitespace is kept when it still fits; the value is truncated if
/// it is wider than the cell; the rest is padded with spaces.
#[must_use]
pub fn rewrite_cell(original: &str, value: &str) -> String {
    let width = original.chars().count();
    let leading: String = original.chars().take_while(|c| c.is_whitespace()).collect();

    let body = if leading.chars().count() + value.chars().count() <= width {
        format!("{leading}{value}")
    } else {
        value.chars().take(width).collect()
    };
    let pad = width - body.chars().count();
    format!("{body}{}", " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trips_mixed_line_endings() {
        let text = "# Title\r\n\n| a | b |\nno newline at end";
        assert_eq!(Document::parse(text).render(), text);
    }

    #[test]
    fn splits_row_cells() {
        let line = Line { content: "| AW-01 | Workflow | |".into(), ending: "\n" };
        assert_eq!(line.cell_texts().unwrap(), vec![" AW-01 ", " Workflow ", " "]);
    }

    #[test]
    fn unclosed_row_keeps_trailing_cell() {
        let line = Line { content: "  | AW-01 | tail".into(), ending: "" };
        assert_eq!(line.cell_texts().unwrap(), vec![" AW-01 ", " tail"]);
    }

    #[test]
    fn prose_is_not_a_row() {
        let line = Line { content: "Posted | Live".into(), ending: "" };
        assert!(line.cells().is_none());
    }

    #[test]
    fn set_cell_replaces_only_that_cell() {
        let mut line = Line { content: "| A | 1 | x |".into(), ending: "\n" };
        assert!(line.set_cell(1, " 9 "));
        assert_eq!(line.content, "| A | 9 | x |");
        assert!(!line.set_cell(7, "nope"));
    }

    #[test]
    fn rewrite_keeps_leading_space() {
        assert_eq!(rewrite_cell(" 123 ", "200"), " 200 ");
        assert_eq!(rewrite_cell("   45   ", "50"), "   50   ");
    }

    #[test]
    fn rewrite_drops_leading_space_then_truncates() {
        assert_eq!(rewrite_cell(" 12 ", "1234"), "1234");
        assert_eq!(rewrite_cell(" 1 ", "12345"), "123");
    }

    proptest! {
        #[test]
        fn rewrite_preserves_width(original in "[ a-z0-9]{0,12}", value in "[A-Za-z0-9é]{0,16}") {
            let rewritten = rewrite_cell(&original, &value);
            prop_assert_eq!(rewritten.chars().count(), original.chars().count());
        }
    }
}
