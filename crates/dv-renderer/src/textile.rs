//! Textile converter.
//!
//! Covers the block and phrase modifiers that show up in plain notes:
//!
//! - blocks: `h1.`–`h6.`, `p.`, `bq.`, `bc.`, `*` and `#` lists
//! - phrases: `*strong*`, `_emphasis_`, `@code@`, `-deleted-`, `"text":url`
//!
//! Blocks are separated by blank lines. Lines inside a paragraph are joined
//! with `<br />`.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Converter, RenderError, escape_html};

static BLOCK_SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(h[1-6]|p|bq|bc)\.\s+").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&quot;(.+?)&quot;:([^\s<]+[^\s<.,;:!?)])").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([^@\n]+)@").unwrap());
static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").unwrap());
static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_([^_\s](?:[^_\n]*[^_\s])?)_\b").unwrap());
static DELETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)-([^-\s](?:[^-\n]*[^-\s])?)-(\s|$)").unwrap());

/// Textile to HTML converter.
pub struct TextileConverter;

impl Converter for TextileConverter {
    fn convert(&self, text: &str) -> Result<String, RenderError> {
        let mut output = String::with_capacity(text.len() * 3 / 2);
        for block in blocks(text) {
            render_block(&block, &mut output);
        }
        Ok(output)
    }
}

/// Split text into blank-line separated blocks.
fn blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

fn render_block(block: &str, out: &mut String) {
    if let Some(caps) = BLOCK_SIGNATURE_RE.captures(block) {
        let body = &block[caps[0].len()..];
        let _ = match &caps[1] {
            "p" => writeln!(out, "<p>{}</p>", inline(body)),
            "bq" => writeln!(out, "<blockquote><p>{}</p></blockquote>", inline(body)),
            "bc" => writeln!(out, "<pre><code>{}</code></pre>", escape_html(body)),
            heading => writeln!(out, "<{heading}>{}</{heading}>", inline(body)),
        };
        return;
    }

    if let Some(tag) = list_tag(block) {
        let _ = writeln!(out, "<{tag}>");
        for line in block.lines() {
            let _ = writeln!(out, "<li>{}</li>", inline(line[1..].trim()));
        }
        let _ = writeln!(out, "</{tag}>");
        return;
    }

    let _ = writeln!(out, "<p>{}</p>", inline(block).replace('\n', "<br />\n"));
}

/// `ul` or `ol` when every line of the block is a list item of one kind.
fn list_tag(block: &str) -> Option<&'static str> {
    let (marker, tag) = if block.starts_with("* ") {
        ("* ", "ul")
    } else if block.starts_with("# ") {
        ("# ", "ol")
    } else {
        return None;
    };
    block.lines().all(|line| line.starts_with(marker)).then_some(tag)
}

/// Apply phrase modifiers to escaped text.
fn inline(text: &str) -> String {
    let escaped = escape_html(text);
    let linked = LINK_RE.replace_all(&escaped, r#"<a href="$2">$1</a>"#);
    let coded = CODE_RE.replace_all(&linked, "<code>$1</code>");
    let strong = STRONG_RE.replace_all(&coded, "<strong>$1</strong>");
    let emphasized = EMPHASIS_RE.replace_all(&strong, "<em>$1</em>");
    DELETED_RE
        .replace_all(&emphasized, "$1<del>$2</del>$3")
        .into_owned()
}
