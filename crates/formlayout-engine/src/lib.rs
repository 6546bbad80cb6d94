//! # formlayout-engine
//!
//! Everything between a form file on disk and a tree of positioned widgets:
//!
//! - [`io`] finds and reads `.form` files,
//! - [`page`] splits a descriptor into `>>` pages,
//! - [`layout`] turns the parser's placement commands into a [`Panel`] tree,
//! - [`form`] ties them together into a paginated [`Form`].

pub mod form;
pub mod io;
pub mod layout;
pub mod page;

pub use form::{Form, FormError, FormOptions, FormPage, Paginator};
pub use io::*;
pub use layout::{LayoutBuilder, LayoutError, Node, Panel};
pub use page::{PageError, PageProperties, PageSource, Pages, split_pages};
