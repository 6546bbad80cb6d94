//! Coordinate resolver: visual `(x, y)` to raw offset.
//!
//! The resolver walks row `y` with the same [`lex_at`] accounting the scanner
//! uses, so a cell resolves to exactly the offset the scanner is at when it
//! reaches that cell.

use crate::buffer::Buffer;
use crate::error::{Reason, SyntaxError};
use crate::lexer::{Lexeme, lex_at};

/// Raw offset of the 1-based cell `(x, y)`.
///
/// - A header line resolves to its first character for every column.
/// - A lexeme whose raw length equals its width (plain text, rules, blank
///   spans of the same size) resolves to the exact cell.
/// - Any other lexeme covering `x` (escapes, fields) resolves to its start.
/// - A column past the end of the row resolves to the row's line feed, or to
///   the end of input on the last row.
///
/// Fails with [`Reason::Unreachable`] when the buffer has fewer than `y` rows.
pub(crate) fn resolve(buf: &Buffer, x: usize, y: usize) -> Result<usize, SyntaxError> {
    let Some(mut offset) = buf.row_start(y).filter(|_| x > 0) else {
        return Err(SyntaxError::new(y, x, Reason::Unreachable));
    };
    let mut col = 1;

    loop {
        let lexeme = lex_at(buf, offset)
            .map_err(|e| SyntaxError::new(y, col + (e.offset - offset), e.reason))?;
        if matches!(
            lexeme,
            Lexeme::End | Lexeme::LineFeed | Lexeme::Header { .. }
        ) {
            return Ok(offset);
        }

        let (raw, width) = (lexeme.raw_len(), lexeme.width());
        if x < col.saturating_add(width) {
            return Ok(if raw == width {
                offset + (x - col)
            } else {
                offset
            });
        }
        col = col.saturating_add(width);
        offset += raw;
    }
}

/// Offset and live character at `(x, y)`.
///
/// Returns `None` when the cell is blank, lies past the end of its row, or
/// the row does not exist.
pub(crate) fn probe(
    buf: &Buffer,
    x: usize,
    y: usize,
) -> Result<Option<(usize, char)>, SyntaxError> {
    match resolve(buf, x, y) {
        Ok(offset) => {
            let cell = buf
                .live(offset)
                .filter(|c| *c != '\n')
                .map(|c| (offset, c));
            log::trace!("probe {x},{y} -> {cell:?}");
            Ok(cell)
        }
        Err(SyntaxError {
            reason: Reason::Unreachable,
            ..
        }) => Ok(None),
        Err(e) => Err(e),
    }
}
