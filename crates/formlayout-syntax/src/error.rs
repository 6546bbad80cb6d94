//! Syntax errors raised while parsing layout markup.
//!
//! There is a single error type, [`SyntaxError`], which carries the visual
//! position of the failure and a [`Reason`]. Any syntax error aborts the whole
//! parse; there is no recovery.

use thiserror::Error;

/// Why a parse failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("field descriptor is missing its name")]
    MissingFieldName,
    #[error("field descriptor is missing ':' after the name")]
    MissingColon,
    #[error("field descriptor is missing its length")]
    MissingFieldLength,
    #[error("field length is too large")]
    FieldLengthOverflow,
    #[error("field descriptor is missing its closing '}}'")]
    MissingClosingBrace,
    #[error("quoted default value is not terminated")]
    UnterminatedQuote,
    #[error("box is missing its right border")]
    MissingRightBorder,
    #[error("box is missing its bottom border")]
    MissingBottomBorder,
    #[error("cell is beyond the end of input")]
    Unreachable,
    #[error("rejected by placement sink: {0}")]
    Rejected(String),
}

/// A parse failure at a 1-based visual `row`/`col`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at {row}:{col}: {reason}")]
pub struct SyntaxError {
    pub row: usize,
    pub col: usize,
    pub reason: Reason,
}

impl SyntaxError {
    pub fn new(row: usize, col: usize, reason: Reason) -> Self {
        Self { row, col, reason }
    }

    /// Move an error raised inside a nested region into the parent's
    /// coordinate space. `row`/`col` are the position of the region's
    /// top-left corner.
    pub(crate) fn shifted(self, row: usize, col: usize) -> Self {
        Self {
            row: self.row + row,
            col: self.col + col,
            reason: self.reason,
        }
    }
}
