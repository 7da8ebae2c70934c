//! Rendering categories.

use std::fmt;

/// The terminal rendering strategy chosen for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderCategory {
    Markdown,
    Rst,
    Textile,
    Wiki,
    SourceHighlight,
    PlainText,
    StaticPassthrough,
    BinaryPassthrough,
    DirectoryListing,
    ArchiveListing,
    ArchiveEntry,
    Slide,
}

impl RenderCategory {
    /// Short lowercase name, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Rst => "rst",
            Self::Textile => "textile",
            Self::Wiki => "wiki",
            Self::SourceHighlight => "source-highlight",
            Self::PlainText => "plain-text",
            Self::StaticPassthrough => "static-passthrough",
            Self::BinaryPassthrough => "binary-passthrough",
            Self::DirectoryListing => "directory-listing",
            Self::ArchiveListing => "archive-listing",
            Self::ArchiveEntry => "archive-entry",
            Self::Slide => "slide",
        }
    }
}

impl fmt::Display for RenderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document formats that have a registered text-to-HTML converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Markdown,
    Rst,
    Textile,
    Wiki,
}

impl From<DocumentKind> for RenderCategory {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Markdown => Self::Markdown,
            DocumentKind::Rst => Self::Rst,
            DocumentKind::Textile => Self::Textile,
            DocumentKind::Wiki => Self::Wiki,
        }
    }
}
