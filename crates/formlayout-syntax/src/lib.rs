//! # formlayout-syntax
//!
//! A parser for **layout markup**: form layouts drawn as ASCII art.
//!
//! ```text
//! === Customer
//! Name:  ${name:20}         | Active ${active:1='y'}
//! **Notes**                 |
//! +----------------------+
//! | ${notes:20}          |
//! +----------------------+
//! ```
//!
//! The parser does not build widgets. It drives a [`Placement`] sink with an
//! ordered stream of placement commands (text, separators, fields, nested
//! regions) that a consumer turns into whatever it renders.
//!
//! ## Grammar at a Glance
//!
//! | markup             | meaning                                         |
//! |--------------------|-------------------------------------------------|
//! | `=== Title`        | caption line (only at the start of a line)      |
//! | `---`              | horizontal separator, one cell per `-`          |
//! | `\|`               | vertical separator, extends over `\|` below it  |
//! | `**` / `//`        | toggle bold / italic, zero width                |
//! | `\x`               | literal `x`                                     |
//! | `${name:8='v'}`    | field 8 cells wide with default value `v`       |
//! | `+--…+` box        | nested region, parsed recursively               |
//!
//! ## Coordinates
//!
//! Every command carries a 1-based visual rectangle. Visual columns are what
//! an author sees in the ASCII art, so zero-width toggles and the text of a
//! field descriptor do not push later content to the right. Commands inside
//! a region use the region's own coordinates, with `(1, 1)` being the first
//! cell inside its border; the region itself is placed in its parent's
//! coordinates.
//!
//! ## Module Structure
//!
//! ```text
//! formlayout-syntax/
//! ├── lib.rs      # This file - public API
//! ├── buffer.rs   # Character buffer plus consumed (blank) spans
//! ├── lexer.rs    # Raw length / visual width of every lexeme
//! ├── resolve.rs  # (x, y) → raw offset
//! ├── scanner.rs  # Left-to-right pass, text runs, separators, fields
//! ├── label.rs    # Trimming and unescaping of text runs
//! ├── region.rs   # Boxes: extraction and recursive parsing
//! ├── command.rs  # Placement commands
//! ├── sink.rs     # The Placement callback trait
//! └── error.rs    # SyntaxError
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use formlayout_syntax::{parse, Command};
//!
//! let commands = parse("Name: ${name:10}").unwrap();
//! assert_eq!(commands.len(), 2);
//! let Command::Field(field) = &commands[1] else { unreachable!() };
//! assert_eq!((field.rect.x, field.rect.width), (7, 10));
//! ```

pub mod command;
pub mod error;
pub mod sink;

mod buffer;
mod label;
mod lexer;
mod region;
mod resolve;
mod scanner;

pub use command::{Command, Field, PlainText, Rect, Region, Style, outline};
pub use error::{Reason, SyntaxError};
pub use sink::Placement;

use buffer::Buffer;
use scanner::Scanner;

/// Parse `text`, driving `sink` with placement commands.
///
/// Returns the raw offset the scan finished at (the input length in
/// characters). On error nothing more is emitted and the error is returned
/// unchanged; commands already delivered to `sink` should be discarded.
pub fn parse_markup(text: &str, sink: &mut dyn Placement) -> Result<usize, SyntaxError> {
    Scanner::new(Buffer::new(text), sink).run()
}

/// Parse `text` into a recorded command stream.
pub fn parse(text: &str) -> Result<Vec<Command>, SyntaxError> {
    let mut commands = Vec::new();
    parse_markup(text, &mut commands)?;
    Ok(commands)
}

/// Raw character offset of the visual cell `(x, y)` in `text`.
///
/// Zero-width markup is skipped, a field resolves to the start of its
/// descriptor for every column it covers, and a column past the end of its
/// row resolves to the line terminator. Fails with [`Reason::Unreachable`]
/// when `text` has fewer than `y` rows.
pub fn offset_of(text: &str, x: usize, y: usize) -> Result<usize, SyntaxError> {
    resolve::resolve(&Buffer::new(text), x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn plain(x: usize, y: usize, s: &str) -> Command {
        Command::PlainText(PlainText {
            rect: Rect::new(x, y, s.chars().count(), 1),
            style: Style::PLAIN,
            caption: false,
            text: s.into(),
        })
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\n  \r\n")]
    fn blank_input_emits_nothing(#[case] input: &str) {
        assert!(parse(input).unwrap().is_empty());
    }

    #[test]
    fn single_label() {
        assert_eq!(parse(" A ").unwrap(), vec![plain(2, 1, "A")]);
    }

    #[test]
    fn one_label_per_plain_line() {
        let input = "  first line \nsecond\n\tthird one";
        assert_eq!(
            parse(input).unwrap(),
            vec![
                plain(3, 1, "first line"),
                plain(1, 2, "second"),
                plain(2, 3, "third one"),
            ]
        );
    }

    #[test]
    fn escape_suppresses_bold_toggle() {
        assert_eq!(parse("a\\*b").unwrap(), vec![plain(1, 1, "a*b")]);
        assert_eq!(parse("a\\**b").unwrap(), vec![plain(1, 1, "a**b")]);
    }

    #[test]
    fn unterminated_bold_stays_bold() {
        let out = parse("**unterminated").unwrap();
        assert_eq!(
            out,
            vec![Command::PlainText(PlainText {
                rect: Rect::new(1, 1, 12, 1),
                style: Style::BOLD,
                caption: false,
                text: "unterminated".into(),
            })]
        );
    }

    #[test]
    fn header_line() {
        assert_eq!(
            parse("== Caption \nPlain text").unwrap(),
            vec![
                Command::PlainText(PlainText {
                    rect: Rect::new(2, 1, 7, 1),
                    style: Style::BOLD,
                    caption: true,
                    text: "Caption".into(),
                }),
                plain(1, 2, "Plain text"),
            ]
        );
    }

    #[test]
    fn header_needs_line_start() {
        assert_eq!(parse("a === b").unwrap(), vec![plain(1, 1, "a === b")]);
    }

    #[test]
    fn horizontal_separator() {
        assert_eq!(
            parse("plain ----- plain").unwrap(),
            vec![
                plain(1, 1, "plain"),
                Command::Separator(Rect::new(7, 1, 5, 1)),
                plain(13, 1, "plain"),
            ]
        );
    }

    #[test]
    fn fields_advance_by_declared_length() {
        let out = parse("plain ${var:10=100} plain ${var:10} plain ${var:10='test'} plain").unwrap();
        let field = |x, initial: Option<&str>| {
            Command::Field(Field {
                rect: Rect::new(x, 1, 10, 1),
                name: "var".into(),
                initial: initial.map(str::to_string),
            })
        };
        assert_eq!(
            out,
            vec![
                plain(1, 1, "plain"),
                field(7, Some("100")),
                plain(18, 1, "plain"),
                field(24, None),
                plain(35, 1, "plain"),
                field(41, Some("test")),
                plain(52, 1, "plain"),
            ]
        );
    }

    #[rstest]
    #[case("${:10=100}", 3, Reason::MissingFieldName)]
    #[case("${var 10=100}", 6, Reason::MissingColon)]
    #[case("${var:=100}", 7, Reason::MissingFieldLength)]
    #[case("${var:10", 9, Reason::MissingClosingBrace)]
    #[case("${var:10=", 10, Reason::MissingClosingBrace)]
    #[case("${var:10='}", 12, Reason::UnterminatedQuote)]
    #[case("ab ${:5}", 6, Reason::MissingFieldName)]
    #[case("${f:18446744073709551615}", 5, Reason::FieldLengthOverflow)]
    #[case("ab ${f:18446744073709551615}x", 8, Reason::FieldLengthOverflow)]
    #[case("${f:65536}", 5, Reason::FieldLengthOverflow)]
    fn malformed_fields(#[case] input: &str, #[case] col: usize, #[case] reason: Reason) {
        assert_eq!(parse(input), Err(SyntaxError::new(1, col, reason)));
    }

    #[test]
    fn widest_field_keeps_columns_in_step() {
        let out = parse("${f:65535}x").unwrap();
        assert_eq!(
            out,
            vec![
                Command::Field(Field {
                    rect: Rect::new(1, 1, 65535, 1),
                    name: "f".into(),
                    initial: None,
                }),
                plain(65536, 1, "x"),
            ]
        );
        assert_eq!(offset_of("${f:65535}x", 65536, 1), Ok(10));
    }

    #[test]
    fn trailing_escaped_space_is_trimmed_as_raw_text() {
        assert_eq!(parse("a\\ ").unwrap(), vec![plain(1, 1, "a\\")]);
        assert_eq!(parse(" \\ b").unwrap(), vec![plain(2, 1, " b")]);
    }

    #[test]
    fn parse_markup_returns_final_offset() {
        let mut out: Vec<Command> = Vec::new();
        assert_eq!(parse_markup("ab\ncd**", &mut out), Ok(7));
    }

    #[test]
    fn offset_of_skips_zero_width_markup() {
        assert_eq!(offset_of("**ab** ${f:3}x", 4, 1), Ok(7));
        assert_eq!(offset_of("**ab** ${f:3}x", 7, 1), Ok(13));
    }

    #[test]
    fn non_ascii_text_counts_characters() {
        assert_eq!(
            parse("Größe: ${g:4}").unwrap()[1],
            Command::Field(Field {
                rect: Rect::new(8, 1, 4, 1),
                name: "g".into(),
                initial: None,
            })
        );
    }
}
