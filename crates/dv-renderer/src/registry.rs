//! Renderer registry.
//!
//! An ordered list of `(extensions, converter)` registrations. Lookups walk
//! the list in declaration order and the first registration claiming the
//! file's extension wins.

use std::path::Path;
use std::sync::Arc;

use crate::ext;
use crate::{
    DocumentKind, Highlighter, MarkdownConverter, RenderCategory, RenderError, RstConverter,
    TextileConverter, WikiConverter,
};

/// Text-to-HTML transform for one document format.
///
/// Converters never touch the filesystem and always return an HTML fragment;
/// wrapping the fragment in a page is the caller's job.
pub trait Converter: Send + Sync {
    /// Convert document text into an HTML fragment.
    fn convert(&self, text: &str) -> Result<String, RenderError>;
}

/// One entry of the registry.
pub struct Registration {
    kind: DocumentKind,
    extensions: &'static [&'static str],
    converter: Box<dyn Converter>,
}

impl Registration {
    /// Document format handled by this registration.
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The registered converter.
    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }
}

/// Result of classifying a path by its extension.
#[derive(Clone, Copy)]
pub struct Classification<'a> {
    /// Extension is in the static passthrough set.
    pub is_static: bool,
    /// First registration claiming the extension.
    pub registration: Option<&'a Registration>,
}

impl Classification<'_> {
    /// Category implied by the extension alone. Static assets win over
    /// registrations; `None` when nothing claims the extension.
    pub fn category(&self) -> Option<RenderCategory> {
        if self.is_static {
            return Some(RenderCategory::StaticPassthrough);
        }
        self.registration.map(|r| r.kind().into())
    }
}

/// Ordered registry of document converters.
#[derive(Default)]
pub struct RendererRegistry {
    registrations: Vec<Registration>,
}

impl RendererRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in converters, in lookup order:
    /// markdown, reStructuredText, textile, wiki.
    pub fn with_defaults(highlighter: Arc<Highlighter>) -> Self {
        Self::new()
            .register(
                DocumentKind::Markdown,
                &["md", "mkd", "markdown"],
                MarkdownConverter::new(highlighter),
            )
            .register(DocumentKind::Rst, &["rst"], RstConverter)
            .register(DocumentKind::Textile, &["textile"], TextileConverter)
            .register(DocumentKind::Wiki, &["wiki", "mediawiki"], WikiConverter)
    }

    /// Append a registration. Earlier registrations take precedence.
    #[must_use]
    pub fn register(
        mut self,
        kind: DocumentKind,
        extensions: &'static [&'static str],
        converter: impl Converter + 'static,
    ) -> Self {
        self.registrations.push(Registration {
            kind,
            extensions,
            converter: Box::new(converter),
        });
        self
    }

    /// Classify a path purely by its extension.
    pub fn classify(&self, path: &Path) -> Classification<'_> {
        Classification {
            is_static: ext::is_static(path),
            registration: self.lookup(path),
        }
    }

    /// First registration claiming the extension of `path`.
    fn lookup(&self, path: &Path) -> Option<&Registration> {
        let ext = ext::extension(path)?;
        self.registrations
            .iter()
            .find(|r| r.extensions.contains(&ext.as_str()))
    }
}
