//! Syntax highlighting backed by syntect.
//!
//! Highlighted output uses CSS classes rather than inline styles so the same
//! markup can be themed by [`Highlighter::stylesheet`], which scopes every
//! rule under [`HIGHLIGHT_CLASS`].

use std::fmt::Write;

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::RenderError;

/// CSS class wrapping every highlighted block.
pub const HIGHLIGHT_CLASS: &str = "codehilite";

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Layout rules for the line-number table, appended to the theme rules.
const TABLE_CSS: &str = "\
.highlighttable { border-collapse: collapse; }
.highlighttable td { padding: 0; vertical-align: top; }
.highlighttable td.linenos pre { color: #999; padding: 0 0.75em; text-align: right; user-select: none; }
.codehilite pre { margin: 0; }
";

/// A syntax definition selected for a file.
#[derive(Clone, Copy, Debug)]
pub struct Lexer<'a> {
    syntax: &'a SyntaxReference,
}

impl Lexer<'_> {
    /// Human-readable syntax name (e.g. "Rust", "Plain Text").
    pub fn name(&self) -> &str {
        &self.syntax.name
    }
}

/// Syntax set and theme shared by every request.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Load the bundled syntaxes and the named theme.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownTheme`] if the theme is not bundled.
    pub fn new(theme_name: &str) -> Result<Self, RenderError> {
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(theme_name)
            .ok_or_else(|| RenderError::UnknownTheme(theme_name.to_owned()))?;

        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Find a lexer for a file name, by extension first and then by the whole
    /// name (for files like `Makefile`).
    pub fn resolve_lexer(&self, filename: &str) -> Option<Lexer<'_>> {
        let by_extension = filename
            .rsplit_once('.')
            .filter(|(_, ext)| !ext.is_empty())
            .and_then(|(_, ext)| {
                self.syntaxes
                    .find_syntax_by_extension(ext)
                    .or_else(|| self.syntaxes.find_syntax_by_extension(&ext.to_ascii_lowercase()))
            });

        by_extension
            .or_else(|| self.syntaxes.find_syntax_by_extension(filename))
            .map(|syntax| Lexer { syntax })
    }

    /// Find a lexer for a fenced code block language token (e.g. `rust`, `py`).
    pub fn lexer_for_token(&self, token: &str) -> Option<Lexer<'_>> {
        self.syntaxes
            .find_syntax_by_token(token)
            .map(|syntax| Lexer { syntax })
    }

    /// The generic plain-text lexer.
    pub fn plain_text(&self) -> Lexer<'_> {
        Lexer {
            syntax: self.syntaxes.find_syntax_plain_text(),
        }
    }

    /// Highlight `text` into classed `<span>` markup without any wrapper.
    pub fn highlight_code(&self, text: &str, lexer: Lexer<'_>) -> Result<String, RenderError> {
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            lexer.syntax,
            &self.syntaxes,
            ClassStyle::Spaced,
        );
        for line in LinesWithEndings::from(text) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        if !text.is_empty() && !text.ends_with('\n') {
            generator.parse_html_for_line_which_includes_newline("\n")?;
        }
        Ok(generator.finalize())
    }

    /// Highlight a code block as `<div class="codehilite"><pre>…</pre></div>`.
    pub fn highlight_block(&self, text: &str, lexer: Lexer<'_>) -> Result<String, RenderError> {
        let code = self.highlight_code(text, lexer)?;
        Ok(format!(
            r#"<div class="{HIGHLIGHT_CLASS}"><pre class="code">{code}</pre></div>"#
        ))
    }

    /// Highlight a whole file as a two-column table of line numbers and code.
    pub fn highlight_table(&self, text: &str, lexer: Lexer<'_>) -> Result<String, RenderError> {
        let code = self.highlight_block(text, lexer)?;
        let line_count = text.lines().count().max(1);

        let mut numbers = String::with_capacity(line_count * 4);
        for n in 1..=line_count {
            if n > 1 {
                numbers.push('\n');
            }
            let _ = write!(numbers, "{n}");
        }

        Ok(format!(
            r#"<table class="highlighttable"><tr><td class="linenos"><pre>{numbers}</pre></td><td class="code">{code}</td></tr></table>"#
        ))
    }

    /// Theme stylesheet with every rule scoped under `.codehilite`.
    pub fn stylesheet(&self) -> Result<String, RenderError> {
        let css = css_for_theme_with_class_style(&self.theme, ClassStyle::Spaced)?;
        let mut scoped = scope_css(&css, &format!(".{HIGHLIGHT_CLASS}"));
        scoped.push_str(TABLE_CSS);
        Ok(scoped)
    }
}

/// Prefix every selector of every rule in `css` with `scope`.
fn scope_css(css: &str, scope: &str) -> String {
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    for line in css.lines() {
        let trimmed = line.trim_start();
        let is_comment = trimmed.starts_with("/*") || trimmed.starts_with('*');
        if !is_comment && let Some(selectors) = line.strip_suffix('{') {
            let scoped = selectors
                .split(',')
                .map(|selector| format!("{scope} {}", selector.trim()))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "{scoped} {{");
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
