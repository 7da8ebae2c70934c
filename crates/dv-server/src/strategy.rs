//! Response strategy selection.
//!
//! Everything known about a file request is collected into [`Signals`] first;
//! [`select`] then walks a fixed priority list of guards and returns the
//! first matching [`Strategy`]. No I/O happens here.

use dv_renderer::{Classification, RenderCategory};

/// How a lexer was obtained for the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum LexerMatch {
    /// Resolved from the file name.
    Resolved,
    /// Plain-text lexer substituted for undetected text.
    Fallback,
    /// No lexer.
    #[default]
    Missing,
}

/// Inputs to strategy selection for a single file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Signals {
    /// `raw` or `r` query flag.
    pub(crate) raw_requested: bool,
    /// `source` query flag.
    pub(crate) source_requested: bool,
    /// `slide` query flag.
    pub(crate) slide_requested: bool,
    /// Request carried a `Referer` header.
    pub(crate) has_referer: bool,
    /// Extension is in the static passthrough set.
    pub(crate) is_static: bool,
    /// Content decoded as UTF-8.
    pub(crate) is_text: bool,
    pub(crate) lexer: LexerMatch,
    /// A document converter is registered for the extension.
    pub(crate) has_converter: bool,
}

/// Terminal response kind for a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Markdown rendered as a slide deck.
    Slides,
    /// Static web asset sent as-is.
    StaticFile,
    /// Standalone page with line-numbered highlighted source.
    Highlighted,
    /// Text sent as `text/plain`.
    PlainText,
    /// Bytes sent as-is with a guessed MIME type.
    Verbatim,
    /// Document converted to HTML and wrapped in the post template.
    Document,
}

impl Strategy {
    /// Rendering category reported for this strategy, given the file's
    /// extension classification.
    pub(crate) fn category(self, classification: &Classification<'_>) -> RenderCategory {
        match self {
            Self::Slides => RenderCategory::Slide,
            Self::StaticFile => RenderCategory::StaticPassthrough,
            Self::Highlighted => RenderCategory::SourceHighlight,
            Self::PlainText => RenderCategory::PlainText,
            Self::Verbatim => RenderCategory::BinaryPassthrough,
            Self::Document => classification
                .category()
                .unwrap_or(RenderCategory::BinaryPassthrough),
        }
    }
}

impl Signals {
    fn has_lexer(&self) -> bool {
        self.lexer != LexerMatch::Missing
    }

    /// Source view is preferred: explicitly requested, or direct navigation
    /// to a non-static file, and the file name resolved a real lexer.
    fn wants_source(&self) -> bool {
        let implied = !self.has_referer && !self.is_static;
        self.lexer == LexerMatch::Resolved && (self.source_requested || implied)
    }

    /// Raw transfer: requested, or binary and static content without a
    /// source preference.
    fn renders_raw(&self) -> bool {
        self.raw_requested || (!self.wants_source() && (!self.is_text || self.is_static))
    }

    /// An explicit `source` flag beats document rendering.
    fn forces_source(&self) -> bool {
        self.source_requested && self.has_lexer()
    }
}

/// Pick the response strategy. Guards are checked in priority order and the
/// first match wins.
pub(crate) fn select(signals: &Signals) -> Strategy {
    if signals.slide_requested {
        return Strategy::Slides;
    }
    if signals.renders_raw() {
        return select_raw(signals);
    }
    if signals.forces_source() {
        return Strategy::Highlighted;
    }
    if signals.has_converter {
        return Strategy::Document;
    }
    if signals.has_lexer() {
        return Strategy::Highlighted;
    }
    Strategy::Verbatim
}

fn select_raw(signals: &Signals) -> Strategy {
    if signals.is_static {
        Strategy::StaticFile
    } else if signals.has_lexer() {
        Strategy::Highlighted
    } else if signals.is_text {
        Strategy::PlainText
    } else {
        Strategy::Verbatim
    }
}
