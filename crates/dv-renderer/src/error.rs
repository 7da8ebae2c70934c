//! Error types for document conversion and highlighting.

/// Error raised by a converter or the highlighter.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// reStructuredText failed to parse or render.
    #[error("reStructuredText error: {0}")]
    Rst(String),

    /// Syntax highlighting failed.
    #[error("Highlighting error: {0}")]
    Highlight(#[from] syntect::Error),

    /// The configured highlighting theme does not exist.
    #[error("Unknown highlighting theme: {0}")]
    UnknownTheme(String),
}
