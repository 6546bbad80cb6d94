//! The text buffer a parse runs over.
//!
//! The characters themselves are never rewritten. Cells that have already
//! been turned into a vertical separator or absorbed into a nested region are
//! recorded as *blank spans* instead: a raw range plus the visual width it
//! stands for. Every pass over the buffer skips a blank span as a single
//! delimiter that advances the column by its width.

use std::collections::BTreeMap;

/// A consumed raw range `start..end` worth `width` visual columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Blank {
    pub end: usize,
    pub width: usize,
}

/// Characters of one parse invocation plus its blank spans.
///
/// End of input is one past the last character; no character value is
/// reserved.
#[derive(Debug, Clone, Default)]
pub(crate) struct Buffer {
    chars: Vec<char>,
    blanks: BTreeMap<usize, Blank>,
}

impl Buffer {
    pub(crate) fn new(text: &str) -> Self {
        Self::from_chars(text.chars().collect())
    }

    pub(crate) fn from_chars(chars: Vec<char>) -> Self {
        Self {
            chars,
            blanks: BTreeMap::new(),
        }
    }

    /// Raw character at `offset`, blank or not.
    pub(crate) fn get(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    pub(crate) fn slice(&self, from: usize, to: usize) -> &[char] {
        let to = to.min(self.chars.len());
        &self.chars[from.min(to)..to]
    }

    /// Character at `offset` unless it is end of input or inside a blank span.
    pub(crate) fn live(&self, offset: usize) -> Option<char> {
        if self.blank_covering(offset) {
            None
        } else {
            self.get(offset)
        }
    }

    /// True when `offset` begins a row.
    pub(crate) fn at_line_start(&self, offset: usize) -> bool {
        offset == 0 || self.get(offset - 1) == Some('\n')
    }

    /// Raw offset where 1-based `row` begins, or `None` past the last row.
    pub(crate) fn row_start(&self, row: usize) -> Option<usize> {
        if row == 0 {
            return None;
        }
        if row == 1 {
            return Some(0);
        }
        self.chars
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == '\n')
            .nth(row - 2)
            .map(|(i, _)| i + 1)
    }

    pub(crate) fn blank_at(&self, offset: usize) -> Option<Blank> {
        self.blanks.get(&offset).copied()
    }

    /// Mark `start..end` as consumed, standing for `width` columns.
    pub(crate) fn blank(&mut self, start: usize, end: usize, width: usize) {
        debug_assert!(start < end && end <= self.chars.len());
        self.blanks.insert(start, Blank { end, width });
    }

    fn blank_covering(&self, offset: usize) -> bool {
        self.blanks
            .range(..=offset)
            .next_back()
            .is_some_and(|(_, blank)| offset < blank.end)
    }
}
