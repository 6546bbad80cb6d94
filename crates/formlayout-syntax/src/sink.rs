//! The placement callback contract.
//!
//! The parser drives a [`Placement`] synchronously, in document order and
//! depth-first for nested regions. Any error a sink returns aborts the parse
//! and comes back to the caller as [`Reason::Rejected`](crate::Reason::Rejected)
//! at the position where the command was being emitted.

use crate::command::{Command, Field, PlainText, Rect, Region};

/// Receives placement commands as the parser produces them.
pub trait Placement {
    fn place_plain_text(&mut self, text: PlainText) -> anyhow::Result<()>;

    fn place_separator(&mut self, rect: Rect) -> anyhow::Result<()>;

    fn place_field(&mut self, field: Field) -> anyhow::Result<()>;

    /// Begin a nested region. Commands up to the matching
    /// [`pop_content`](Placement::pop_content) use the region's local
    /// coordinates.
    fn push_content(&mut self, region: Region) -> anyhow::Result<()>;

    fn pop_content(&mut self) -> anyhow::Result<()>;
}

/// Records the command stream as-is.
impl Placement for Vec<Command> {
    fn place_plain_text(&mut self, text: PlainText) -> anyhow::Result<()> {
        self.push(Command::PlainText(text));
        Ok(())
    }

    fn place_separator(&mut self, rect: Rect) -> anyhow::Result<()> {
        self.push(Command::Separator(rect));
        Ok(())
    }

    fn place_field(&mut self, field: Field) -> anyhow::Result<()> {
        self.push(Command::Field(field));
        Ok(())
    }

    fn push_content(&mut self, region: Region) -> anyhow::Result<()> {
        self.push(Command::EnterRegion(region));
        Ok(())
    }

    fn pop_content(&mut self) -> anyhow::Result<()> {
        self.push(Command::ExitRegion);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_records_in_order() {
        let mut sink: Vec<Command> = Vec::new();
        sink.push_content(Region {
            rect: Rect::new(1, 1, 4, 3),
            caption: String::new(),
        })
        .unwrap();
        sink.place_separator(Rect::new(1, 1, 2, 1)).unwrap();
        sink.pop_content().unwrap();

        assert_eq!(sink.len(), 3);
        assert!(matches!(sink[0], Command::EnterRegion(_)));
        assert_eq!(sink[1], Command::Separator(Rect::new(1, 1, 2, 1)));
        assert_eq!(sink[2], Command::ExitRegion);
    }
}
