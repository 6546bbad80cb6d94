//! Label emitter: turns a raw run of text into a [`PlainText`] command.

use crate::buffer::Buffer;
use crate::command::{PlainText, Rect, Style};
use crate::sink::Placement;

fn is_padding(c: char) -> bool {
    c <= ' '
}

/// Emit the raw range `from..to` as a label at `(x, y)`.
///
/// Edge whitespace is trimmed from the raw characters first, shifting `x`
/// right by the leading amount. With `had_escapes` every `\` followed by
/// another character in what remains is then dropped and the following
/// character kept literally. Width is the number of characters left. Nothing
/// is emitted for an all-blank run.
#[allow(clippy::too_many_arguments)]
pub(crate) fn emit(
    buf: &Buffer,
    from: usize,
    to: usize,
    x: usize,
    y: usize,
    had_escapes: bool,
    style: Style,
    caption: bool,
    sink: &mut dyn Placement,
) -> anyhow::Result<()> {
    let raw = buf.slice(from, to);

    let lead = raw.iter().take_while(|&&c| is_padding(c)).count();
    if lead == raw.len() {
        return Ok(());
    }
    let trail = raw.iter().rev().take_while(|&&c| is_padding(c)).count();
    let kept = &raw[lead..raw.len() - trail];

    let text = if had_escapes {
        unescape(kept)
    } else {
        kept.iter().collect()
    };

    sink.place_plain_text(PlainText {
        rect: Rect::new(x + lead, y, text.chars().count(), 1),
        style,
        caption,
        text,
    })
}

fn unescape(raw: &[char]) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        match (raw[i], raw.get(i + 1)) {
            ('\\', Some(&next)) if next != '\n' && next != '\r' => {
                text.push(next);
                i += 2;
            }
            (c, _) => {
                text.push(c);
                i += 1;
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use pretty_assertions::assert_eq;

    fn label(raw: &str, escapes: bool) -> Vec<Command> {
        let buf = Buffer::new(raw);
        let mut out: Vec<Command> = Vec::new();
        emit(&buf, 0, raw.chars().count(), 4, 2, escapes, Style::PLAIN, false, &mut out).unwrap();
        out
    }

    #[test]
    fn trims_and_shifts_x() {
        assert_eq!(
            label("  ab c \t", false),
            vec![Command::PlainText(PlainText {
                rect: Rect::new(6, 2, 4, 1),
                style: Style::PLAIN,
                caption: false,
                text: "ab c".into(),
            })]
        );
    }

    #[test]
    fn all_whitespace_emits_nothing() {
        assert!(label(" \t ", false).is_empty());
        assert!(label("", false).is_empty());
    }

    #[test]
    fn escapes_are_removed_and_width_counts_cells() {
        let out = label("a\\*b", true);
        let Command::PlainText(text) = &out[0] else {
            panic!("expected text");
        };
        assert_eq!(text.text, "a*b");
        assert_eq!(text.rect.width, 3);
    }

    #[test]
    fn escaped_space_survives_trimming() {
        let out = label("\\ x", true);
        let Command::PlainText(text) = &out[0] else {
            panic!("expected text");
        };
        assert_eq!(text.text, " x");
        assert_eq!(text.rect.x, 4);
    }

    #[test]
    fn without_escape_flag_backslashes_are_verbatim() {
        let out = label("a\\b", false);
        let Command::PlainText(text) = &out[0] else {
            panic!("expected text");
        };
        assert_eq!(text.text, "a\\b");
    }

    #[test]
    fn trailing_escaped_space_is_trimmed_before_unescaping() {
        assert_eq!(
            label("a\\ ", true),
            vec![Command::PlainText(PlainText {
                rect: Rect::new(4, 2, 2, 1),
                style: Style::PLAIN,
                caption: false,
                text: "a\\".into(),
            })]
        );
    }
}
