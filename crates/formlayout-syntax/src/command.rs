//! # Placement Commands
//!
//! The parser's only output is a flat, ordered stream of placement commands.
//! Nested regions are bracketed by [`Command::EnterRegion`] and
//! [`Command::ExitRegion`]:
//!
//! ```text
//! PlainText "Name"          ← top-level content
//! EnterRegion (9,1 10x3)    ← a boxed sub-panel starts
//!   Field "name"            ← coordinates local to the region
//! ExitRegion
//! ```
//!
//! Commands are plain values. Once emitted they no longer depend on the
//! buffer they were parsed from.

use std::fmt;

/// A 1-based rectangle in visual cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle covers the 1-based cell `(x, y)`.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// Text style toggled by `**` and `//`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
}

impl Style {
    pub const PLAIN: Style = Style {
        bold: false,
        italic: false,
    };
    pub const BOLD: Style = Style {
        bold: true,
        italic: false,
    };

    pub fn toggle_bold(&mut self) {
        self.bold = !self.bold;
    }

    pub fn toggle_italic(&mut self) {
        self.italic = !self.italic;
    }
}

/// A run of label text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainText {
    pub rect: Rect,
    pub style: Style,
    /// Set for `=` header lines.
    pub caption: bool,
    pub text: String,
}

/// A `${name:len=value}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub rect: Rect,
    pub name: String,
    pub initial: Option<String>,
}

/// A boxed sub-panel, positioned in its parent's coordinate space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub rect: Rect,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PlainText(PlainText),
    Separator(Rect),
    Field(Field),
    EnterRegion(Region),
    ExitRegion,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PlainText(t) => {
                write!(f, "text {}", t.rect)?;
                if t.style.bold {
                    f.write_str(" bold")?;
                }
                if t.style.italic {
                    f.write_str(" italic")?;
                }
                if t.caption {
                    f.write_str(" caption")?;
                }
                write!(f, " {:?}", t.text)
            }
            Command::Separator(rect) => write!(f, "separator {rect}"),
            Command::Field(field) => {
                write!(f, "field {} {}", field.rect, field.name)?;
                match &field.initial {
                    Some(value) => write!(f, " = {value:?}"),
                    None => Ok(()),
                }
            }
            Command::EnterRegion(region) => write!(f, "enter {} {:?}", region.rect, region.caption),
            Command::ExitRegion => f.write_str("exit"),
        }
    }
}

/// Render a command stream one command per line, indenting region content.
pub fn outline(commands: &[Command]) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for command in commands {
        if matches!(command, Command::ExitRegion) {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&"  ".repeat(depth));
        out.push_str(&command.to_string());
        out.push('\n');
        if matches!(command, Command::EnterRegion(_)) {
            depth += 1;
        }
    }
    out
}
