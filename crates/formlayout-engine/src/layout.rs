//! Layout tree assembled from the parser's placement commands.
//!
//! [`LayoutBuilder`] is a [`Placement`] sink. It keeps a stack of open
//! panels: `push_content` opens a nested panel, `pop_content` closes it and
//! attaches it to its parent. Coordinates stay exactly as the parser reports
//! them, so the children of a nested panel are relative to its interior.

use std::collections::BTreeSet;

use formlayout_syntax::{Command, Field, PlainText, Placement, Rect, Region};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("field [{0}] referenced from the form not found")]
    UnknownField(String),
    #[error("region closed without being opened")]
    UnbalancedPop,
    #[error("{0} region(s) left open")]
    UnclosedRegions(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Label(PlainText),
    Separator(Rect),
    Field(Field),
    Panel(Panel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub rect: Rect,
    pub caption: String,
    pub children: Vec<Node>,
}

impl Panel {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            caption: String::new(),
            children: Vec::new(),
        }
    }

    /// All fields of this panel and its nested panels, in placement order.
    pub fn fields(&self) -> Vec<&Field> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a Field>) {
        for child in &self.children {
            match child {
                Node::Field(field) => out.push(field),
                Node::Panel(panel) => panel.collect_fields(out),
                Node::Label(_) | Node::Separator(_) => {}
            }
        }
    }

    /// The placement commands that rebuild this panel's children.
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        self.collect_commands(&mut commands);
        commands
    }

    fn collect_commands(&self, out: &mut Vec<Command>) {
        for child in &self.children {
            match child {
                Node::Label(text) => out.push(Command::PlainText(text.clone())),
                Node::Separator(rect) => out.push(Command::Separator(*rect)),
                Node::Field(field) => out.push(Command::Field(field.clone())),
                Node::Panel(panel) => {
                    out.push(Command::EnterRegion(Region {
                        rect: panel.rect,
                        caption: panel.caption.clone(),
                    }));
                    panel.collect_commands(out);
                    out.push(Command::ExitRegion);
                }
            }
        }
    }

    /// Draw the panel as a character grid of its own size.
    ///
    /// Labels are written verbatim, separators as `-` or `|`, fields as their
    /// initial value padded with `_`, and nested panels as `+-|` boxes.
    /// Anything falling outside the grid is clipped.
    pub fn sketch(&self) -> Vec<String> {
        let mut grid = Grid::new(self.rect.width, self.rect.height);
        grid.draw_children(self, 0, 0);
        grid.into_lines()
    }
}

struct Grid {
    width: usize,
    cells: Vec<Vec<char>>,
}

impl Grid {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            cells: vec![vec![' '; width]; height],
        }
    }

    /// Set the 1-based cell `(x, y)`.
    fn set(&mut self, x: usize, y: usize, c: char) {
        if x == 0 || y == 0 || x > self.width {
            return;
        }
        if let Some(row) = self.cells.get_mut(y - 1) {
            row[x - 1] = c;
        }
    }

    fn draw_children(&mut self, panel: &Panel, ox: usize, oy: usize) {
        for child in &panel.children {
            match child {
                Node::Label(text) => {
                    for (i, c) in text.text.chars().enumerate() {
                        self.set(ox + text.rect.x + i, oy + text.rect.y, c);
                    }
                }
                Node::Separator(rect) => {
                    let c = if rect.width > rect.height { '-' } else { '|' };
                    self.fill(ox + rect.x, oy + rect.y, rect.width, rect.height, c);
                }
                Node::Field(field) => {
                    let mut value = field.initial.as_deref().unwrap_or_default().chars();
                    for i in 0..field.rect.width.min(self.width) {
                        let c = value.next().unwrap_or('_');
                        self.set(ox + field.rect.x + i, oy + field.rect.y, c);
                    }
                }
                Node::Panel(nested) => {
                    let (x, y) = (ox + nested.rect.x, oy + nested.rect.y);
                    self.draw_border(x, y, nested.rect.width, nested.rect.height);
                    self.draw_children(nested, x, y);
                }
            }
        }
    }

    fn fill(&mut self, x: usize, y: usize, width: usize, height: usize, c: char) {
        let bottom = y.saturating_add(height).min(self.cells.len() + 1);
        let right = x.saturating_add(width).min(self.width + 1);
        for row in y..bottom {
            for col in x..right {
                self.set(col, row, c);
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, width: usize, height: usize) {
        if width < 2 || height < 2 {
            return;
        }
        let (right, bottom) = (x + width - 1, y + height - 1);
        self.fill(x + 1, y, width - 2, 1, '-');
        self.fill(x + 1, bottom, width - 2, 1, '-');
        self.fill(x, y + 1, 1, height - 2, '|');
        self.fill(right, y + 1, 1, height - 2, '|');
        for (cx, cy) in [(x, y), (right, y), (x, bottom), (right, bottom)] {
            self.set(cx, cy, '+');
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.cells
            .into_iter()
            .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
            .collect()
    }
}

/// Builds a [`Panel`] tree from placement commands.
#[derive(Debug)]
pub struct LayoutBuilder {
    root: Panel,
    open: Vec<Panel>,
    catalogue: Option<BTreeSet<String>>,
}

impl LayoutBuilder {
    /// A builder whose root panel covers `rect`.
    pub fn new(rect: Rect) -> Self {
        Self {
            root: Panel::new(rect),
            open: Vec::new(),
            catalogue: None,
        }
    }

    /// Only accept fields whose names are in `names`.
    pub fn with_catalogue<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalogue = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// The finished root panel. Fails when nested panels are still open.
    pub fn finish(self) -> Result<Panel, LayoutError> {
        match self.open.len() {
            0 => Ok(self.root),
            n => Err(LayoutError::UnclosedRegions(n)),
        }
    }

    fn current(&mut self) -> &mut Panel {
        self.open.last_mut().unwrap_or(&mut self.root)
    }
}

impl Placement for LayoutBuilder {
    fn place_plain_text(&mut self, text: PlainText) -> anyhow::Result<()> {
        self.current().children.push(Node::Label(text));
        Ok(())
    }

    fn place_separator(&mut self, rect: Rect) -> anyhow::Result<()> {
        self.current().children.push(Node::Separator(rect));
        Ok(())
    }

    fn place_field(&mut self, field: Field) -> anyhow::Result<()> {
        if let Some(catalogue) = &self.catalogue
            && !catalogue.contains(&field.name)
        {
            return Err(LayoutError::UnknownField(field.name).into());
        }
        self.current().children.push(Node::Field(field));
        Ok(())
    }

    fn push_content(&mut self, region: Region) -> anyhow::Result<()> {
        let mut panel = Panel::new(region.rect);
        panel.caption = region.caption;
        self.open.push(panel);
        Ok(())
    }

    fn pop_content(&mut self) -> anyhow::Result<()> {
        let Some(panel) = self.open.pop() else {
            return Err(LayoutError::UnbalancedPop.into());
        };
        self.current().children.push(Node::Panel(panel));
        Ok(())
    }
}
