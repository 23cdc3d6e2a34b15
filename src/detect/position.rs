//! Byte offset to line/column mapping.

use regex::Regex;
use std::cell::Cell;
use std::ops::Range;

/// Newline index over one file's text.
///
/// Remembers the last position it computed, so ascending lookups on one
/// long line count each character once.
pub struct LineIndex<'t> {
    text: &'t str,
    newlines: Vec<usize>,
    last: Cell<(usize, usize)>,
}

impl<'t> LineIndex<'t> {
    pub fn new(text: &'t str) -> Self {
        let newlines = text
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self {
            text,
            newlines,
            last: Cell::new((0, 0)),
        }
    }

    /// 1-based line and 0-based character column of a byte offset.
    ///
    /// The column is the number of characters between the last newline
    /// before `offset` and `offset` itself.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let idx = self.newlines.partition_point(|&nl| nl < offset);
        let line_start = if idx == 0 { 0 } else { self.newlines[idx - 1] + 1 };
        let (last_offset, last_column) = self.last.get();
        let (from, base) = if (line_start..=offset).contains(&last_offset) {
            (last_offset, last_column)
        } else {
            (line_start, 0)
        };
        let column = base
            + self
                .text
                .get(from..offset)
                .map(|s| s.chars().count())
                .unwrap_or(0);
        self.last.set((offset, column));
        (idx + 1, column)
    }
}

/// Sorted, non-overlapping byte ranges that scanners must ignore
/// (comments, embedded script bodies).
#[derive(Debug, Default)]
pub struct SkipSpans {
    spans: Vec<Range<usize>>,
}

impl SkipSpans {
    pub fn from_regex(re: &Regex, text: &str) -> Self {
        Self {
            spans: re.find_iter(text).map(|m| m.range()).collect(),
        }
    }

    /// Spans from a regex whose first capture group marks the ignored part.
    pub fn from_capture(re: &Regex, text: &str) -> Self {
        Self {
            spans: re
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| m.range())
                .collect(),
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        let idx = self.spans.partition_point(|r| r.end <= offset);
        self.spans
            .get(idx)
            .map(|r| r.start <= offset)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_first_line() {
        let idx = LineIndex::new("abc def");
        assert_eq!(idx.position(0), (1, 0));
        assert_eq!(idx.position(4), (1, 4));
    }

    #[test]
    fn test_position_after_newlines() {
        let text = "one\ntwo\n  three";
        let idx = LineIndex::new(text);
        assert_eq!(idx.position(text.find("two").unwrap()), (2, 0));
        assert_eq!(idx.position(text.find("three").unwrap()), (3, 2));
    }

    #[test]
    fn test_column_counts_characters() {
        let text = "é = fetch";
        let idx = LineIndex::new(text);
        // 'é' is two bytes but one character.
        assert_eq!(idx.position(text.find("fetch").unwrap()), (1, 4));
    }

    #[test]
    fn test_positions_in_any_order() {
        let text = "ab é cd\nef é gh";
        let idx = LineIndex::new(text);
        let cd = text.find("cd").unwrap();
        let gh = text.find("gh").unwrap();
        assert_eq!(idx.position(cd), (1, 5));
        assert_eq!(idx.position(2), (1, 2));
        assert_eq!(idx.position(gh), (2, 5));
        assert_eq!(idx.position(gh), (2, 5));
        assert_eq!(idx.position(cd), (1, 5));
    }

    #[test]
    fn test_skip_spans() {
        let re = Regex::new(r"(?s)/\*.*?\*/").unwrap();
        let text = "a /* b */ c /* d */";
        let spans = SkipSpans::from_regex(&re, text);
        assert!(!spans.contains(0));
        assert!(spans.contains(text.find('b').unwrap()));
        assert!(!spans.contains(text.find('c').unwrap()));
        assert!(spans.contains(text.find('d').unwrap()));
        assert!(!spans.contains(text.len()));
    }
}
