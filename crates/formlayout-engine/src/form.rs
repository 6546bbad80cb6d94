//! Forms: a descriptor split into pages, each parsed into a layout tree.

use std::collections::BTreeSet;

use formlayout_syntax::{Rect, SyntaxError, parse_markup};
use thiserror::Error;

use crate::layout::{LayoutBuilder, LayoutError, Panel};
use crate::page::{DEFAULT_HEIGHT, DEFAULT_WIDTH, PageError, PageProperties, split_pages};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Page(#[from] PageError),
    /// `source` is positioned in descriptor rows, not page rows.
    #[error("page {page}: {source}")]
    Syntax {
        page: usize,
        #[source]
        source: SyntaxError,
    },
    #[error("page {page}: {source}")]
    Layout {
        page: usize,
        #[source]
        source: LayoutError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    pub width: usize,
    pub height: usize,
    /// When set, every field must be named in the catalogue.
    pub catalogue: Option<BTreeSet<String>>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            catalogue: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPage {
    pub properties: PageProperties,
    pub root: Panel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    width: usize,
    height: usize,
    pages: Vec<FormPage>,
}

impl Form {
    /// Split `descriptor` into pages and parse each into a root panel of
    /// `width` x `height` cells.
    pub fn build(descriptor: &str, options: &FormOptions) -> Result<Self, FormError> {
        let split = split_pages(descriptor, options.width, options.height)?;
        let rect = Rect::new(1, 1, split.width, split.height);

        let mut pages = Vec::with_capacity(split.pages.len());
        for (index, source) in split.pages.into_iter().enumerate() {
            let page = index + 1;
            let mut builder = LayoutBuilder::new(rect);
            if let Some(catalogue) = &options.catalogue {
                builder = builder.with_catalogue(catalogue.iter().cloned());
            }

            parse_markup(&source.markup, &mut builder).map_err(|e| FormError::Syntax {
                page,
                source: SyntaxError::new(e.row + source.first_line - 1, e.col, e.reason),
            })?;
            let root = builder
                .finish()
                .map_err(|source| FormError::Layout { page, source })?;

            log::debug!("page {page}: {} fields", root.fields().len());
            pages.push(FormPage {
                properties: source.properties,
                root,
            });
        }

        Ok(Self {
            width: split.width,
            height: split.height,
            pages,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by 0-based index.
    pub fn page(&self, index: usize) -> Option<&FormPage> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[FormPage] {
        &self.pages
    }

    /// A cursor over this form's pages, positioned on the first page.
    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.page_count())
    }
}

/// Current page of a paginated form.
///
/// Moves past either end are ignored and reported by returning `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    current: usize,
    count: usize,
}

impl Paginator {
    pub fn new(count: usize) -> Self {
        Self { current: 0, count }
    }

    /// 0-based index of the current page.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.count
    }

    pub fn first(&mut self) -> bool {
        self.move_to(0)
    }

    pub fn next(&mut self) -> bool {
        self.move_to(self.current + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.move_to(index),
            None => false,
        }
    }

    pub fn last(&mut self) -> bool {
        match self.count.checked_sub(1) {
            Some(index) => self.move_to(index),
            None => false,
        }
    }

    /// `"current/count"`, 1-based.
    pub fn label(&self) -> String {
        format!("{}/{}", self.current + 1, self.count)
    }

    fn move_to(&mut self, index: usize) -> bool {
        if index >= self.count || index == self.current {
            return false;
        }
        self.current = index;
        true
    }
}
