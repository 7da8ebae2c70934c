//! Document converters and syntax highlighting for docview.
//!
//! This crate decides *how* a file's text becomes HTML; it never touches the
//! filesystem. The server crate reads files and picks a strategy, then calls
//! into the pieces exported here:
//!
//! - [`RendererRegistry`]: ordered `(extensions, converter)` registrations,
//!   queried through [`RendererRegistry::classify`]
//! - [`Highlighter`]: syntect-backed lexer resolution, line-numbered source
//!   tables and the `.codehilite` stylesheet
//! - [`split_slides`]: turns rendered markdown into slide fragments
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use dv_renderer::{Highlighter, RenderCategory, RendererRegistry, DEFAULT_THEME};
//!
//! let highlighter = Arc::new(Highlighter::new(DEFAULT_THEME).unwrap());
//! let registry = RendererRegistry::with_defaults(Arc::clone(&highlighter));
//!
//! assert_eq!(
//!     registry.classify(Path::new("notes.md")).category(),
//!     Some(RenderCategory::Markdown)
//! );
//! ```

mod category;
mod error;
pub mod ext;
mod highlight;
mod markdown;
mod registry;
mod rst;
mod slides;
mod textile;
mod util;
mod wiki;

pub use category::{DocumentKind, RenderCategory};
pub use error::RenderError;
pub use highlight::{DEFAULT_THEME, HIGHLIGHT_CLASS, Highlighter, Lexer};
pub use markdown::MarkdownConverter;
pub use registry::{Classification, Converter, Registration, RendererRegistry};
pub use rst::RstConverter;
pub use slides::split_slides;
pub use textile::TextileConverter;
pub use util::{escape_html, slugify};
pub use wiki::WikiConverter;
