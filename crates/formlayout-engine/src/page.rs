//! Splitting a form descriptor into pages.
//!
//! A descriptor that starts with `>>` holds several pages. Every page opens
//! with a header line carrying a query string of page properties:
//!
//! ```text
//! >>width=40&height=10&caption=Customer%20details
//! Name: ${name:20}
//! >>caption=Notes
//! ${notes:30}
//! ```
//!
//! Only the first header decides the grid size shared by all pages. Any other
//! descriptor is a single page of the default size without properties.

use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_WIDTH: usize = 80;
pub const DEFAULT_HEIGHT: usize = 25;

const PAGE_MARK: &str = ">>";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("form descriptor is empty")]
    Empty,
    #[error("invalid page {key} '{value}' on line {line}")]
    InvalidSize {
        line: usize,
        key: String,
        value: String,
    },
    #[error("malformed percent-encoding on line {line}")]
    InvalidEncoding { line: usize },
}

/// Decoded `key=value` pairs of a page header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageProperties(BTreeMap<String, String>);

impl PageProperties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn caption(&self) -> Option<&str> {
        self.get("caption")
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.get("tooltip")
    }

    pub fn help(&self) -> Option<&str> {
        self.get("help")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse a query string such as `caption=Main%20page&help=x`.
    ///
    /// Keys and values are percent-decoded; a key without `=` maps to an
    /// empty value. When a key repeats, the first occurrence wins.
    fn parse(query: &str, line: usize) -> Result<Self, PageError> {
        let decode = |s: &str| {
            urlencoding::decode(s)
                .map(|decoded| decoded.into_owned())
                .map_err(|_| PageError::InvalidEncoding { line })
        };

        let mut props = BTreeMap::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            props.entry(decode(key)?).or_insert(decode(value)?);
        }
        Ok(Self(props))
    }
}

/// The markup of one page and where it sits in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub properties: PageProperties,
    pub markup: String,
    /// 1-based descriptor line of the first markup line.
    pub first_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pages {
    pub width: usize,
    pub height: usize,
    pub pages: Vec<PageSource>,
}

/// Split `descriptor` into pages.
///
/// `default_width` and `default_height` apply unless the first page header
/// sets `width` or `height`.
pub fn split_pages(
    descriptor: &str,
    default_width: usize,
    default_height: usize,
) -> Result<Pages, PageError> {
    if descriptor.is_empty() {
        return Err(PageError::Empty);
    }

    if !descriptor.starts_with(PAGE_MARK) {
        return Ok(Pages {
            width: default_width,
            height: default_height,
            pages: vec![PageSource {
                properties: PageProperties::default(),
                markup: descriptor.to_string(),
                first_line: 1,
            }],
        });
    }

    let mut pages = Vec::new();
    let mut header: Option<(usize, PageProperties)> = None;
    let mut body: Vec<&str> = Vec::new();

    for (index, line) in descriptor.split('\n').enumerate() {
        let number = index + 1;
        if let Some(query) = line.strip_prefix(PAGE_MARK) {
            if let Some((header_line, properties)) = header.take() {
                pages.push(page(header_line, properties, &body));
                body.clear();
            }
            let query = query.trim_end_matches('\r');
            header = Some((number, PageProperties::parse(query, number)?));
        } else {
            body.push(line);
        }
    }
    if let Some((header_line, properties)) = header {
        pages.push(page(header_line, properties, &body));
    }

    let first = &pages[0];
    let width = size(&first.properties, "width", default_width)?;
    let height = size(&first.properties, "height", default_height)?;
    log::debug!("split descriptor into {} pages of {width}x{height}", pages.len());

    Ok(Pages {
        width,
        height,
        pages,
    })
}

fn page(header_line: usize, properties: PageProperties, body: &[&str]) -> PageSource {
    PageSource {
        properties,
        markup: body.join("\n"),
        first_line: header_line + 1,
    }
}

fn size(properties: &PageProperties, key: &str, default: usize) -> Result<usize, PageError> {
    let Some(value) = properties.get(key) else {
        return Ok(default);
    };
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PageError::InvalidSize {
            line: 1,
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
