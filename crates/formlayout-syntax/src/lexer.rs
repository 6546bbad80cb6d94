//! # Lexer - Column Accounting
//!
//! Layout markup decouples two kinds of position:
//!
//! - the **raw offset**, an index into the character buffer, and
//! - the **visual column**, the cell a form author sees in the ASCII art.
//!
//! Most characters advance both by one. The control sequences do not:
//!
//! ```text
//! lexeme          raw   visual
//! **  //            2        0
//! \x                2        1
//! ${name:8}         9        8   (the declared length)
//! \r                1        0
//! blank span        n    width
//! ```
//!
//! [`lex_at`] classifies the lexeme starting at an offset and reports both
//! amounts through [`Lexeme::raw_len`] and [`Lexeme::width`]. The scanner and
//! the coordinate resolver both walk the buffer with it, so the two can never
//! disagree about where a cell lives.

use crate::buffer::Buffer;
use crate::error::Reason;

/// Longest field a descriptor may declare. Anything wider could never sit on
/// a row and would overflow column arithmetic.
pub(crate) const MAX_FIELD_LENGTH: usize = u16::MAX as usize;

/// A parsed `${name:length=value}` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldSpec {
    pub name: String,
    pub length: usize,
    pub initial: Option<String>,
    /// Raw length of the whole descriptor, `${` through `}`.
    pub raw_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lexeme {
    End,
    LineFeed,
    CarriageReturn,
    /// A consumed span; see [`Buffer`].
    Blank { len: usize, width: usize },
    /// `=` at the start of a line, through the end of that line (terminator
    /// excluded).
    Header { len: usize },
    /// Three or more `-`.
    Rule { len: usize },
    /// `+--`, the top-left corner of a box.
    BoxCorner,
    Bar,
    Escape(char),
    Bold,
    Italic,
    Field(FieldSpec),
    Char(char),
}

impl Lexeme {
    pub fn raw_len(&self) -> usize {
        match self {
            Lexeme::End => 0,
            Lexeme::LineFeed
            | Lexeme::CarriageReturn
            | Lexeme::BoxCorner
            | Lexeme::Bar
            | Lexeme::Char(_) => 1,
            Lexeme::Escape(_) | Lexeme::Bold | Lexeme::Italic => 2,
            Lexeme::Blank { len, .. } | Lexeme::Header { len } | Lexeme::Rule { len } => *len,
            Lexeme::Field(spec) => spec.raw_len,
        }
    }

    /// Visual columns this lexeme advances within its row.
    pub fn width(&self) -> usize {
        match self {
            Lexeme::End
            | Lexeme::LineFeed
            | Lexeme::CarriageReturn
            | Lexeme::Header { .. }
            | Lexeme::Bold
            | Lexeme::Italic => 0,
            Lexeme::BoxCorner | Lexeme::Bar | Lexeme::Escape(_) | Lexeme::Char(_) => 1,
            Lexeme::Blank { width, .. } => *width,
            Lexeme::Rule { len } => *len,
            Lexeme::Field(spec) => spec.length,
        }
    }
}

/// A lexing failure at raw `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub offset: usize,
    pub reason: Reason,
}

impl LexError {
    fn new(offset: usize, reason: Reason) -> Self {
        Self { offset, reason }
    }
}

/// Classify the lexeme starting at `offset`.
pub(crate) fn lex_at(buf: &Buffer, offset: usize) -> Result<Lexeme, LexError> {
    if let Some(blank) = buf.blank_at(offset) {
        return Ok(Lexeme::Blank {
            len: blank.end - offset,
            width: blank.width,
        });
    }
    let Some(c) = buf.get(offset) else {
        return Ok(Lexeme::End);
    };
    let next = buf.get(offset + 1);
    let lexeme = match c {
        '\n' => Lexeme::LineFeed,
        '\r' => Lexeme::CarriageReturn,
        '=' if buf.at_line_start(offset) => Lexeme::Header {
            len: run_len(buf, offset, |c| c != '\n'),
        },
        '-' if next == Some('-') && buf.get(offset + 2) == Some('-') => Lexeme::Rule {
            len: run_len(buf, offset, |c| c == '-'),
        },
        '+' if next == Some('-') && buf.get(offset + 2) == Some('-') => Lexeme::BoxCorner,
        '|' => Lexeme::Bar,
        '\\' => match next {
            Some(escaped) if escaped != '\n' && escaped != '\r' => Lexeme::Escape(escaped),
            _ => Lexeme::Char('\\'),
        },
        '*' if next == Some('*') => Lexeme::Bold,
        '/' if next == Some('/') => Lexeme::Italic,
        '$' if next == Some('{') => Lexeme::Field(field(buf, offset)?),
        other => Lexeme::Char(other),
    };
    Ok(lexeme)
}

fn run_len(buf: &Buffer, offset: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = offset;
    while buf.get(end).is_some_and(&pred) {
        end += 1;
    }
    end - offset
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse `${name:length[=value]}` starting at the `$`.
fn field(buf: &Buffer, start: usize) -> Result<FieldSpec, LexError> {
    let mut i = start + 2;

    if !buf.get(i).is_some_and(is_name_start) {
        return Err(LexError::new(i, Reason::MissingFieldName));
    }
    let name_len = run_len(buf, i, is_name_part);
    let name: String = buf.slice(i, i + name_len).iter().collect();
    i += name_len;

    if buf.get(i) != Some(':') {
        return Err(LexError::new(i, Reason::MissingColon));
    }
    i += 1;

    let digits = run_len(buf, i, |c| c.is_ascii_digit());
    if digits == 0 {
        return Err(LexError::new(i, Reason::MissingFieldLength));
    }
    let length = buf
        .slice(i, i + digits)
        .iter()
        .collect::<String>()
        .parse::<usize>()
        .ok()
        .filter(|length| *length <= MAX_FIELD_LENGTH)
        .ok_or_else(|| LexError::new(i, Reason::FieldLengthOverflow))?;
    i += digits;

    let mut initial = None;
    if buf.get(i) == Some('=') {
        i += 1;
        let mut value = String::new();
        if buf.get(i) == Some('\'') {
            i += 1;
            loop {
                match buf.get(i) {
                    Some('\'') => {
                        i += 1;
                        break;
                    }
                    Some('\\') if buf.get(i + 1).is_some_and(|c| c != '\n') => {
                        value.extend(buf.get(i + 1));
                        i += 2;
                    }
                    Some('\n') | None => return Err(LexError::new(i, Reason::UnterminatedQuote)),
                    Some(c) => {
                        value.push(c);
                        i += 1;
                    }
                }
            }
        } else {
            let len = run_len(buf, i, |c| c != '}' && c != '\n');
            value.extend(buf.slice(i, i + len));
            i += len;
        }
        initial = Some(value);
    }

    if buf.get(i) != Some('}') {
        return Err(LexError::new(i, Reason::MissingClosingBrace));
    }
    i += 1;

    Ok(FieldSpec {
        name,
        length,
        initial,
        raw_len: i - start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn lex(text: &str) -> Result<Lexeme, LexError> {
        lex_at(&Buffer::new(text), 0)
    }

    #[rstest]
    #[case("", Lexeme::End, 0, 0)]
    #[case("\n", Lexeme::LineFeed, 1, 0)]
    #[case("\r\n", Lexeme::CarriageReturn, 1, 0)]
    #[case("== Title\nx", Lexeme::Header { len: 8 }, 8, 0)]
    #[case("-----x", Lexeme::Rule { len: 5 }, 5, 5)]
    #[case("--x", Lexeme::Char('-'), 1, 1)]
    #[case("+--+", Lexeme::BoxCorner, 1, 1)]
    #[case("+-", Lexeme::Char('+'), 1, 1)]
    #[case("|", Lexeme::Bar, 1, 1)]
    #[case("\\*", Lexeme::Escape('*'), 2, 1)]
    #[case("\\", Lexeme::Char('\\'), 1, 1)]
    #[case("\\\n", Lexeme::Char('\\'), 1, 1)]
    #[case("**", Lexeme::Bold, 2, 0)]
    #[case("*a", Lexeme::Char('*'), 1, 1)]
    #[case("//", Lexeme::Italic, 2, 0)]
    #[case("$x", Lexeme::Char('$'), 1, 1)]
    fn lexeme_accounting(
        #[case] text: &str,
        #[case] expected: Lexeme,
        #[case] raw: usize,
        #[case] width: usize,
    ) {
        let lexeme = lex(text).unwrap();
        assert_eq!(lexeme, expected);
        assert_eq!((lexeme.raw_len(), lexeme.width()), (raw, width));
    }

    #[test]
    fn equals_sign_mid_line_is_text() {
        let buf = Buffer::new("a=b");
        assert_eq!(lex_at(&buf, 1).unwrap(), Lexeme::Char('='));
    }

    #[test]
    fn blank_span_takes_priority() {
        let mut buf = Buffer::new("+--+ x");
        buf.blank(0, 4, 4);
        assert_eq!(lex_at(&buf, 0).unwrap(), Lexeme::Blank { len: 4, width: 4 });
    }

    #[rstest]
    #[case("${name:5}", "name", 5, None)]
    #[case("${name:5='hi'}", "name", 5, Some("hi"))]
    #[case("${var:10=100}", "var", 10, Some("100"))]
    #[case("${var:10=}", "var", 10, Some(""))]
    #[case("${_v2:0}", "_v2", 0, None)]
    #[case("${wide:65535}", "wide", MAX_FIELD_LENGTH, None)]
    #[case("${q:3='it\\'s'}", "q", 3, Some("it's"))]
    fn field_descriptors(
        #[case] text: &str,
        #[case] name: &str,
        #[case] length: usize,
        #[case] initial: Option<&str>,
    ) {
        let Lexeme::Field(spec) = lex(text).unwrap() else {
            panic!("expected a field in {text:?}");
        };
        assert_eq!(spec.name, name);
        assert_eq!(spec.length, length);
        assert_eq!(spec.initial.as_deref(), initial);
        assert_eq!(spec.raw_len, text.chars().count());
    }

    #[rstest]
    #[case("${:10=100}", 2, Reason::MissingFieldName)]
    #[case("${1a:10}", 2, Reason::MissingFieldName)]
    #[case("${var 10=100}", 5, Reason::MissingColon)]
    #[case("${var:=100}", 6, Reason::MissingFieldLength)]
    #[case("${var:10", 8, Reason::MissingClosingBrace)]
    #[case("${var:10=", 9, Reason::MissingClosingBrace)]
    #[case("${var:10='}", 11, Reason::UnterminatedQuote)]
    #[case("${var:10='ab\ncd'}", 12, Reason::UnterminatedQuote)]
    #[case("${var:99999999999999999999999}", 6, Reason::FieldLengthOverflow)]
    #[case("${f:18446744073709551615}", 4, Reason::FieldLengthOverflow)]
    #[case("${f:65536}", 4, Reason::FieldLengthOverflow)]
    fn malformed_field_descriptors(
        #[case] text: &str,
        #[case] offset: usize,
        #[case] reason: Reason,
    ) {
        assert_eq!(lex(text), Err(LexError { offset, reason }));
    }
}
