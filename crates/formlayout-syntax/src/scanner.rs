//! # Scanner - the Left-to-Right Pass
//!
//! The scanner walks one buffer lexeme by lexeme, keeping a [`Cursor`] with
//! the raw offset, the 1-based visual row/column and the current [`Style`].
//! Ordinary characters accumulate into a pending text run; every control
//! sequence, line break or the end of input flushes that run through the
//! label emitter before doing its own work:
//!
//! ```text
//! name: **bold** ${f:5} | ---
//! └run┘ └tog┘└run┘└tog┘ └field┘ │ └separator
//!                               └vertical separator
//! ```
//!
//! Column accounting for every lexeme comes from [`Lexeme::raw_len`] and
//! [`Lexeme::width`], the same table the resolver uses.

use crate::buffer::Buffer;
use crate::command::{Field, Rect, Style};
use crate::error::{Reason, SyntaxError};
use crate::label;
use crate::lexer::{FieldSpec, LexError, Lexeme, lex_at};
use crate::region;
use crate::resolve::probe;
use crate::sink::Placement;

/// Position and style of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub offset: usize,
    pub row: usize,
    pub col: usize,
    pub style: Style,
}

impl Cursor {
    fn start() -> Self {
        Self {
            offset: 0,
            row: 1,
            col: 1,
            style: Style::PLAIN,
        }
    }
}

/// Pending text run: where it began and whether it holds escapes.
#[derive(Debug, Clone, Copy)]
struct Run {
    start: usize,
    col: usize,
    escapes: bool,
}

pub(crate) struct Scanner<'s> {
    pub(crate) buf: Buffer,
    pub(crate) sink: &'s mut dyn Placement,
    pub(crate) cursor: Cursor,
    run: Option<Run>,
    /// `(row, col, offset)` of every column-advancing lexeme.
    #[cfg(test)]
    pub(crate) visited: Vec<(usize, usize, usize)>,
}

impl<'s> Scanner<'s> {
    pub(crate) fn new(buf: Buffer, sink: &'s mut dyn Placement) -> Self {
        Self {
            buf,
            sink,
            cursor: Cursor::start(),
            run: None,
            #[cfg(test)]
            visited: Vec::new(),
        }
    }

    /// Scan to the end of the buffer, returning the final offset.
    pub(crate) fn run(mut self) -> Result<usize, SyntaxError> {
        self.scan()
    }

    pub(crate) fn scan(&mut self) -> Result<usize, SyntaxError> {
        loop {
            let lexeme = lex_at(&self.buf, self.cursor.offset).map_err(|e| self.lex_error(e))?;
            let (raw, width) = (lexeme.raw_len(), lexeme.width());

            match lexeme {
                Lexeme::End => {
                    self.flush()?;
                    return Ok(self.cursor.offset);
                }
                Lexeme::LineFeed => {
                    self.flush()?;
                    self.cursor.offset += 1;
                    self.cursor.row += 1;
                    self.cursor.col = 1;
                    self.cursor.style = Style::PLAIN;
                    continue;
                }
                Lexeme::BoxCorner => {
                    self.flush()?;
                    region::extract(self)?;
                    continue;
                }
                Lexeme::CarriageReturn => {
                    self.flush()?;
                    self.cursor.style = Style::PLAIN;
                }
                Lexeme::Blank { .. } => self.flush()?,
                Lexeme::Header { len } => {
                    self.flush()?;
                    self.header(len)?;
                }
                Lexeme::Rule { len } => {
                    self.flush()?;
                    let rect = Rect::new(self.cursor.col, self.cursor.row, len, 1);
                    let placed = self.sink.place_separator(rect);
                    placed.map_err(|e| self.rejected(&e))?;
                }
                Lexeme::Bar => {
                    self.flush()?;
                    self.vertical_separator()?;
                }
                Lexeme::Escape(_) => self.extend_run(true),
                Lexeme::Char(_) => self.extend_run(false),
                Lexeme::Bold => {
                    self.flush()?;
                    self.cursor.style.toggle_bold();
                }
                Lexeme::Italic => {
                    self.flush()?;
                    self.cursor.style.toggle_italic();
                }
                Lexeme::Field(spec) => {
                    self.flush()?;
                    self.field(spec)?;
                }
            }
            self.advance(raw, width);
        }
    }

    /// Move past a lexeme of `raw` characters and `width` columns.
    pub(crate) fn advance(&mut self, raw: usize, width: usize) {
        if width > 0 {
            self.visit();
        }
        self.cursor.offset += raw;
        self.cursor.col = self.cursor.col.saturating_add(width);
    }

    #[cfg(test)]
    fn visit(&mut self) {
        self.visited
            .push((self.cursor.row, self.cursor.col, self.cursor.offset));
    }

    #[cfg(not(test))]
    fn visit(&mut self) {}

    fn extend_run(&mut self, escaped: bool) {
        match &mut self.run {
            Some(run) => run.escapes |= escaped,
            None => {
                self.run = Some(Run {
                    start: self.cursor.offset,
                    col: self.cursor.col,
                    escapes: escaped,
                })
            }
        }
    }

    /// Emit the pending run, if any, ending at the current offset.
    fn flush(&mut self) -> Result<(), SyntaxError> {
        let Some(run) = self.run.take() else {
            return Ok(());
        };
        let emitted = label::emit(
            &self.buf,
            run.start,
            self.cursor.offset,
            run.col,
            self.cursor.row,
            run.escapes,
            self.cursor.style,
            false,
            &mut *self.sink,
        );
        emitted.map_err(|e| self.rejected(&e))
    }

    /// `=` markers followed by caption text up to the end of the line.
    fn header(&mut self, len: usize) -> Result<(), SyntaxError> {
        let start = self.cursor.offset;
        let markers = self
            .buf
            .slice(start, start + len)
            .iter()
            .take_while(|c| **c == '=')
            .count();
        let text = self.buf.slice(start + markers, start + len);
        let escapes = text.contains(&'\\');

        let emitted = label::emit(
            &self.buf,
            start + markers,
            start + len,
            self.cursor.col,
            self.cursor.row,
            escapes,
            Style::BOLD,
            true,
            &mut *self.sink,
        );
        emitted.map_err(|e| self.rejected(&e))
    }

    /// A `|` and every live `|` directly below it become one separator.
    fn vertical_separator(&mut self) -> Result<(), SyntaxError> {
        let Cursor { row, col, .. } = self.cursor;
        let mut height = 1;
        while let Some((offset, '|')) = probe(&self.buf, col, row + height)? {
            self.buf.blank(offset, offset + 1, 1);
            height += 1;
        }

        let placed = self.sink.place_separator(Rect::new(col, row, 1, height));
        placed.map_err(|e| self.rejected(&e))
    }

    fn field(&mut self, spec: FieldSpec) -> Result<(), SyntaxError> {
        let placed = self.sink.place_field(Field {
            rect: Rect::new(self.cursor.col, self.cursor.row, spec.length, 1),
            name: spec.name,
            initial: spec.initial,
        });
        placed.map_err(|e| self.rejected(&e))
    }

    pub(crate) fn error(&self, reason: Reason) -> SyntaxError {
        SyntaxError::new(self.cursor.row, self.cursor.col, reason)
    }

    pub(crate) fn rejected(&self, err: &anyhow::Error) -> SyntaxError {
        self.error(Reason::Rejected(format!("{err:#}")))
    }

    fn lex_error(&self, err: LexError) -> SyntaxError {
        SyntaxError::new(
            self.cursor.row,
            self.cursor.col + (err.offset - self.cursor.offset),
            err.reason,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, PlainText};
    use crate::resolve::resolve;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn scan(text: &str) -> Vec<Command> {
        let mut out: Vec<Command> = Vec::new();
        Scanner::new(Buffer::new(text), &mut out).run().unwrap();
        out
    }

    fn text(x: usize, y: usize, width: usize, style: Style, s: &str) -> Command {
        Command::PlainText(PlainText {
            rect: Rect::new(x, y, width, 1),
            style,
            caption: false,
            text: s.into(),
        })
    }

    const ITALIC: Style = Style {
        bold: false,
        italic: true,
    };
    const BOLD_ITALIC: Style = Style {
        bold: true,
        italic: true,
    };

    #[test]
    fn final_offset_is_end_of_buffer() {
        let mut out: Vec<Command> = Vec::new();
        let end = Scanner::new(Buffer::new("ab\ncd"), &mut out).run().unwrap();
        assert_eq!(end, 5);
    }

    #[test]
    fn styles_toggle_without_advancing() {
        assert_eq!(
            scan("plain **bold** plain //italic// plain **//bold italic//** plain"),
            vec![
                text(1, 1, 5, Style::PLAIN, "plain"),
                text(7, 1, 4, Style::BOLD, "bold"),
                text(12, 1, 5, Style::PLAIN, "plain"),
                text(18, 1, 6, ITALIC, "italic"),
                text(25, 1, 5, Style::PLAIN, "plain"),
                text(31, 1, 11, BOLD_ITALIC, "bold italic"),
                text(43, 1, 5, Style::PLAIN, "plain"),
            ]
        );
    }

    #[rstest]
    #[case("plain **bold\nplain", Style::BOLD)]
    #[case("plain //bold\nplain", ITALIC)]
    fn style_resets_at_line_feed(#[case] input: &str, #[case] style: Style) {
        let out = scan(input);
        assert_eq!(out[1], text(7, 1, 4, style, "bold"));
        assert_eq!(out[2], text(1, 2, 5, Style::PLAIN, "plain"));
    }

    #[test]
    fn style_resets_at_carriage_return() {
        let out = scan("**a\r**b");
        assert_eq!(out[0], text(1, 1, 1, Style::BOLD, "a"));
        assert_eq!(out[1], text(2, 1, 1, Style::BOLD, "b"));
    }

    #[test]
    fn escapes_advance_one_column() {
        assert_eq!(
            scan("plai\\n **bol\\d** plai\\n"),
            vec![
                text(1, 1, 5, Style::PLAIN, "plain"),
                text(7, 1, 4, Style::BOLD, "bold"),
                text(12, 1, 5, Style::PLAIN, "plain"),
            ]
        );
    }

    #[test]
    fn vertical_separator_spans_rows_once() {
        let out = scan("plain | plain\nplain | plain\r\nplain | plain\n");
        assert_eq!(out[1], Command::Separator(Rect::new(7, 1, 1, 3)));
        let separators = out
            .iter()
            .filter(|c| matches!(c, Command::Separator(_)))
            .count();
        assert_eq!(separators, 1);
        assert_eq!(out[4], text(9, 2, 5, Style::PLAIN, "plain"));
        assert_eq!(out[6], text(9, 3, 5, Style::PLAIN, "plain"));
    }

    #[test]
    fn vertical_separator_stops_at_misaligned_bar() {
        let out = scan("a|b\nab|\n");
        assert_eq!(out[1], Command::Separator(Rect::new(2, 1, 1, 1)));
        assert_eq!(out[4], Command::Separator(Rect::new(3, 2, 1, 1)));
    }

    #[test]
    fn sink_rejection_carries_cursor_position() {
        struct Refuse;
        impl Placement for Refuse {
            fn place_plain_text(&mut self, _: crate::command::PlainText) -> anyhow::Result<()> {
                Ok(())
            }
            fn place_separator(&mut self, _: Rect) -> anyhow::Result<()> {
                Ok(())
            }
            fn place_field(&mut self, field: Field) -> anyhow::Result<()> {
                anyhow::bail!("unknown field {}", field.name)
            }
            fn push_content(&mut self, _: crate::command::Region) -> anyhow::Result<()> {
                Ok(())
            }
            fn pop_content(&mut self) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let mut sink = Refuse;
        let err = Scanner::new(Buffer::new("ab\nname ${who:4}"), &mut sink)
            .run()
            .unwrap_err();
        assert_eq!(
            err,
            SyntaxError::new(2, 6, Reason::Rejected("unknown field who".into()))
        );
    }

    #[rstest]
    #[case("a **b** c")]
    #[case("x //y// z\nsecond **row**")]
    #[case("esc\\aped \\*star\\* end")]
    #[case("before ${f:7='v'} after ${g:2} tail")]
    #[case("**${f:3}**\\|${g:1}//x//")]
    #[case("== Caption\nline ----- line\n| left\n| more")]
    fn scanner_and_resolver_agree(#[case] input: &str) {
        let mut out: Vec<Command> = Vec::new();
        let mut scanner = Scanner::new(Buffer::new(input), &mut out);
        scanner.scan().unwrap();

        for &(row, col, offset) in &scanner.visited {
            let resolved = resolve(&scanner.buf, col, row).unwrap();
            assert_eq!(resolved, offset, "cell {col},{row} of {input:?}");
        }
        assert!(!scanner.visited.is_empty());
    }
}
