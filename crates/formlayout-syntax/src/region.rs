//! # Nested Regions
//!
//! A box drawn with `+`, `-` and `|` becomes an independently parsed
//! sub-panel:
//!
//! ```text
//! name +--------+ tail        EnterRegion 6,1 10x3
//!      | ${f:6} |      ───►     Field 2,1 6x1   (region-local)
//!      +--------+             ExitRegion
//! ```
//!
//! The interior rows are copied into a fresh buffer and scanned recursively.
//! In the outer buffer every row of the box, borders included, becomes one
//! blank span worth the box width, so the outer scan (and any later probe)
//! steps over the box as if it were exactly `width` plain cells, however
//! many raw characters its rows hold.

use crate::buffer::Buffer;
use crate::command::{Rect, Region};
use crate::error::{Reason, SyntaxError};
use crate::resolve::{probe, resolve};
use crate::scanner::Scanner;

/// Extract the box whose top-left corner is under the scanner's cursor,
/// emit it as a nested region and leave the cursor just after its top-right
/// corner.
pub(crate) fn extract(scanner: &mut Scanner<'_>) -> Result<(), SyntaxError> {
    let open = scanner.cursor.offset;
    let (row, col) = (scanner.cursor.row, scanner.cursor.col);

    let close = top_right(&scanner.buf, open).ok_or_else(|| {
        let mut end = open + 1;
        while scanner
            .buf
            .get(end)
            .is_some_and(|c| c != '\n' && c != '+')
        {
            end += 1;
        }
        SyntaxError::new(row, col + (end - open), Reason::MissingRightBorder)
    })?;
    let width = close - open + 1;
    let right = col + width - 1;

    let bottom = bottom_row(&scanner.buf, row, col, right)?;
    let height = bottom - row + 1;

    let mut spans = Vec::with_capacity(height);
    spans.push((open, close));
    for r in row + 1..=bottom {
        spans.push((resolve(&scanner.buf, col, r)?, resolve(&scanner.buf, right, r)?));
    }

    let interior = spans[1..spans.len() - 1]
        .iter()
        .map(|&(left, right)| scanner.buf.slice(left + 1, right).to_vec())
        .collect::<Vec<_>>()
        .join(&'\n');

    for &(left, right) in &spans {
        scanner.buf.blank(left, right + 1, width);
    }

    let rect = Rect::new(col, row, width, height);
    log::debug!("region {rect} with {} interior rows", height - 2);

    let pushed = scanner.sink.push_content(Region {
        rect,
        caption: String::new(),
    });
    pushed.map_err(|e| scanner.rejected(&e))?;

    Scanner::new(Buffer::from_chars(interior), &mut *scanner.sink)
        .run()
        .map_err(|e| e.shifted(row, col))?;

    let popped = scanner.sink.pop_content();
    popped.map_err(|e| scanner.rejected(&e))?;

    scanner.advance(width, width);
    Ok(())
}

/// Offset of the `+` closing the top border on the same line.
fn top_right(buf: &Buffer, open: usize) -> Option<usize> {
    let mut i = open + 1;
    loop {
        match buf.get(i)? {
            '+' => return Some(i),
            '\n' => return None,
            _ => i += 1,
        }
    }
}

/// Row of the bottom border: the first row below `row` whose left column
/// does not continue the `|` border. Both of its corners must be `+`.
fn bottom_row(buf: &Buffer, row: usize, left: usize, right: usize) -> Result<usize, SyntaxError> {
    let mut r = row + 1;
    loop {
        match probe(buf, left, r)?.map(|(_, c)| c) {
            Some('|') => {
                if !matches!(probe(buf, right, r)?, Some((_, '|'))) {
                    return Err(SyntaxError::new(r, right, Reason::MissingRightBorder));
                }
                r += 1;
            }
            Some('+') if matches!(probe(buf, right, r)?, Some((_, '+'))) => return Ok(r),
            _ => return Err(SyntaxError::new(r, left, Reason::MissingBottomBorder)),
        }
    }
}
