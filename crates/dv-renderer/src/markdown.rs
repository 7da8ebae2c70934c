//! Markdown converter.
//!
//! Uses pulldown-cmark's HTML writer, swapping fenced and indented code blocks
//! for highlighted `.codehilite` blocks. Headings without an explicit `{#id}`
//! get a slug id, and a leading `Key: value` metadata block is stripped
//! before parsing.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;

use crate::util::slugify;
use crate::{Converter, Highlighter, RenderError};

static META_BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-{3}(\s.*)?$").unwrap());
static META_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-{3}|\.{3})(\s.*)?$").unwrap());
static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}([A-Za-z0-9_-]+):\s*(.*)$").unwrap());
static META_MORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {4,}(.*)$").unwrap());

/// Markdown to HTML converter.
pub struct MarkdownConverter {
    highlighter: Arc<Highlighter>,
}

/// Code block collected between its start and end events.
struct PendingBlock {
    language: Option<String>,
    source: String,
}

/// Heading waiting for its end event to receive a generated id.
struct OpenHeading {
    /// Position of the heading's start event in the output stream.
    index: usize,
    text: String,
}

/// Heading ids assigned so far in one document.
#[derive(Default)]
struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_owned());
    }

    /// Slug of `text`, suffixed `-1`, `-2`, ... until unused.
    fn unique(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("section");
        }
        let mut candidate = base.clone();
        let mut n = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

impl MarkdownConverter {
    /// Create a converter that highlights code blocks with `highlighter`.
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        Self { highlighter }
    }

    /// Parser options: tables, footnotes, strikethrough, task lists,
    /// smart punctuation and `{#id}` heading attributes.
    pub fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
    }

    fn render_block(&self, block: &PendingBlock) -> Result<String, RenderError> {
        let lexer = match block.language.as_deref() {
            Some(lang) => self.highlighter.lexer_for_token(lang).unwrap_or_else(|| {
                tracing::debug!(language = lang, "Unknown code block language, using plain text");
                self.highlighter.plain_text()
            }),
            None => self.highlighter.plain_text(),
        };
        self.highlighter.highlight_block(&block.source, lexer)
    }
}

impl Converter for MarkdownConverter {
    fn convert(&self, text: &str) -> Result<String, RenderError> {
        let (metadata, body) = split_metadata(text);
        if !metadata.is_empty() {
            tracing::debug!(keys = metadata.len(), "Stripped metadata block");
        }

        let mut events = Vec::new();
        let mut pending: Option<PendingBlock> = None;
        let mut heading: Option<OpenHeading> = None;
        let mut ids = HeadingIds::default();

        for event in Parser::new_ext(body, Self::parser_options()) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    pending = Some(PendingBlock {
                        language: fence_language(&kind),
                        source: String::new(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = pending.take() {
                        events.push(Event::Html(self.render_block(&block)?.into()));
                    }
                }
                Event::Text(code) if pending.is_some() => {
                    if let Some(block) = pending.as_mut() {
                        block.source.push_str(&code);
                    }
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    match &id {
                        Some(id) => ids.reserve(id),
                        None => {
                            heading = Some(OpenHeading {
                                index: events.len(),
                                text: String::new(),
                            });
                        }
                    }
                    events.push(Event::Start(Tag::Heading {
                        level,
                        id,
                        classes,
                        attrs,
                    }));
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(open) = heading.take() {
                        let slug = ids.unique(&open.text);
                        if let Some(Event::Start(Tag::Heading { id, .. })) =
                            events.get_mut(open.index)
                        {
                            *id = Some(slug.into());
                        }
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                Event::Text(text) if heading.is_some() => {
                    if let Some(open) = heading.as_mut() {
                        open.text.push_str(&text);
                    }
                    events.push(Event::Text(text));
                }
                Event::Code(code) if heading.is_some() => {
                    if let Some(open) = heading.as_mut() {
                        open.text.push_str(&code);
                    }
                    events.push(Event::Code(code));
                }
                other => events.push(other),
            }
        }

        let mut output = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        Ok(output)
    }
}

/// Split a leading metadata block off `text`.
///
/// The block is a run of `Key: value` lines at the very top, optionally
/// opened by `---`, with indented continuation lines. It ends at a blank
/// line or a `---` / `...` line. Keys are lowercased and multi-line values
/// are joined with newlines. Text without such a block is returned as-is.
fn split_metadata(text: &str) -> (Vec<(String, String)>, &str) {
    let mut metadata: Vec<(String, String)> = Vec::new();
    let mut rest = text;
    let mut first = true;

    while let Some((line, tail)) = next_line(rest) {
        if first && META_BEGIN_RE.is_match(line) {
            first = false;
            rest = tail;
            continue;
        }
        first = false;

        if line.trim().is_empty() || META_END_RE.is_match(line) {
            rest = tail;
            break;
        }
        if let Some(caps) = META_RE.captures(line) {
            metadata.push((caps[1].to_lowercase(), caps[2].trim().to_owned()));
        } else if let (Some(caps), Some((_, value))) =
            (META_MORE_RE.captures(line), metadata.last_mut())
        {
            value.push('\n');
            value.push_str(caps[1].trim());
        } else {
            break;
        }
        rest = tail;
    }

    if metadata.is_empty() {
        return (metadata, text);
    }
    (metadata, rest)
}

/// First line of `text` without its line ending, and the remainder.
fn next_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    let (line, tail) = text.split_once('\n').unwrap_or((text, ""));
    Some((line.strip_suffix('\r').unwrap_or(line), tail))
}

/// First word of a fenced block's info string.
fn fence_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_owned),
        CodeBlockKind::Indented => None,
    }
}
