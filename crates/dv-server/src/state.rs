//! Application state.
//!
//! Built once at startup and shared read-only by every request.

use std::path::PathBuf;
use std::sync::Arc;

use dv_renderer::{Highlighter, MarkdownConverter, RendererRegistry};

use crate::ServerConfig;
use crate::error::StartupError;
use crate::root::ContentRoot;
use crate::templates::{PageOptions, Templates};

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Directory all content is served from.
    pub(crate) root: ContentRoot,
    /// Document converters by extension.
    pub(crate) registry: RendererRegistry,
    /// Syntax highlighter for source pages and the stylesheet.
    pub(crate) highlighter: Arc<Highlighter>,
    /// Markdown converter used for slide decks regardless of extension.
    pub(crate) slides: MarkdownConverter,
    pub(crate) templates: Templates,
    /// Lowercase extensions opened as zip archives.
    pub(crate) archive_extensions: Vec<String>,
    /// Highlight undetected text as plain text instead of sending it raw.
    pub(crate) plain_text_fallback: bool,
    /// Link target for the published documentation footer.
    pub(crate) public_base: Option<String>,
    /// Directory served under `/assets`.
    pub(crate) assets_dir: PathBuf,
}

impl AppState {
    pub(crate) fn new(config: &ServerConfig) -> Result<Self, StartupError> {
        let root = ContentRoot::new(&config.root).map_err(|source| StartupError::Root {
            path: config.root.clone(),
            source,
        })?;
        let highlighter = Arc::new(Highlighter::new(&config.theme)?);

        Ok(Self {
            root,
            registry: RendererRegistry::with_defaults(Arc::clone(&highlighter)),
            slides: MarkdownConverter::new(Arc::clone(&highlighter)),
            highlighter,
            templates: Templates::new()?,
            archive_extensions: config.archive_extensions.clone(),
            plain_text_fallback: config.plain_text_fallback,
            public_base: config.public_base.clone(),
            assets_dir: config.assets_dir.clone(),
        })
    }

    /// Template options for a request.
    pub(crate) fn page_options(&self, math: bool) -> PageOptions<'_> {
        PageOptions {
            math,
            public_base: self.public_base.as_deref(),
        }
    }
}
