//! MediaWiki markup converter.
//!
//! Supports headings (`== Title ==`), horizontal rules (`----`), bulleted
//! and numbered lists (`*`, `#`), preformatted lines (leading space),
//! `'''bold'''`, `''italic''`, internal links (`[[Page]]`,
//! `[[Page|label]]`) and external links (`[https://… label]`).

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::{Converter, RenderError, escape_html};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={1,6})\s*(.+?)\s*(={1,6})\s*$").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'''(.+?)'''").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"''(.+?)''").unwrap());
static INTERNAL_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap());
static EXTERNAL_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[((?:https?|ftp)://[^\s\]]+)(?:\s+([^\]]+))?\]").unwrap());

/// MediaWiki markup to HTML converter.
pub struct WikiConverter;

/// Block currently being accumulated.
enum OpenBlock {
    None,
    Paragraph(Vec<String>),
    List(&'static str),
    Preformatted(Vec<String>),
}

struct WikiWriter {
    out: String,
    open: OpenBlock,
}

impl WikiWriter {
    fn new(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            open: OpenBlock::None,
        }
    }

    fn close(&mut self) {
        match std::mem::replace(&mut self.open, OpenBlock::None) {
            OpenBlock::None => {}
            OpenBlock::Paragraph(lines) => {
                let _ = writeln!(self.out, "<p>{}</p>", lines.join("\n"));
            }
            OpenBlock::List(tag) => {
                let _ = writeln!(self.out, "</{tag}>");
            }
            OpenBlock::Preformatted(lines) => {
                let _ = writeln!(self.out, "<pre>{}</pre>", lines.join("\n"));
            }
        }
    }

    fn line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.close();
            return;
        }

        if let Some(caps) = HEADING_RE.captures(line)
            && caps[1].len() == caps[3].len()
        {
            self.close();
            let level = caps[1].len();
            let _ = writeln!(self.out, "<h{level}>{}</h{level}>", inline(&caps[2]));
            return;
        }

        if line.starts_with("----") && line.trim_end().chars().all(|c| c == '-') {
            self.close();
            self.out.push_str("<hr />\n");
            return;
        }

        let list = match line.chars().next() {
            Some('*') => Some("ul"),
            Some('#') => Some("ol"),
            _ => None,
        };
        if let Some(tag) = list {
            if !matches!(self.open, OpenBlock::List(open) if open == tag) {
                self.close();
                let _ = writeln!(self.out, "<{tag}>");
                self.open = OpenBlock::List(tag);
            }
            let _ = writeln!(self.out, "<li>{}</li>", inline(line[1..].trim()));
            return;
        }

        if let Some(pre) = line.strip_prefix(' ') {
            if !matches!(self.open, OpenBlock::Preformatted(_)) {
                self.close();
                self.open = OpenBlock::Preformatted(Vec::new());
            }
            if let OpenBlock::Preformatted(lines) = &mut self.open {
                lines.push(escape_html(pre));
            }
            return;
        }

        if !matches!(self.open, OpenBlock::Paragraph(_)) {
            self.close();
            self.open = OpenBlock::Paragraph(Vec::new());
        }
        if let OpenBlock::Paragraph(lines) = &mut self.open {
            lines.push(inline(line));
        }
    }

    fn finish(mut self) -> String {
        self.close();
        self.out
    }
}

impl Converter for WikiConverter {
    fn convert(&self, text: &str) -> Result<String, RenderError> {
        let mut writer = WikiWriter::new(text.len() * 3 / 2);
        for line in text.lines() {
            writer.line(line);
        }
        Ok(writer.finish())
    }
}

/// Apply inline formatting to escaped text.
fn inline(text: &str) -> String {
    let escaped = escape_html(text);
    // Quotes are escaped to `&#x27;` by `escape_html`; undo that for the
    // apostrophe-based markup before matching.
    let quoted = escaped.replace("&#x27;", "'");
    let bold = BOLD_RE.replace_all(&quoted, "<strong>$1</strong>");
    let italic = ITALIC_RE.replace_all(&bold, "<em>$1</em>");
    let internal = INTERNAL_LINK_RE.replace_all(&italic, |caps: &regex::Captures<'_>| {
        let target = caps[1].trim();
        let label = caps.get(2).map_or(target, |m| m.as_str().trim());
        format!(r#"<a href="{}">{label}</a>"#, target.replace(' ', "_"))
    });
    EXTERNAL_LINK_RE
        .replace_all(&internal, |caps: &regex::Captures<'_>| {
            let url = &caps[1];
            let label = caps.get(2).map_or(url, |m| m.as_str());
            format!(r#"<a href="{url}">{label}</a>"#)
        })
        .into_owned()
}
