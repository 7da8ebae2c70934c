//! Content resolution.
//!
//! Maps a browse request onto the content root and produces the response:
//! a directory listing, an archive redirect, listing or member, or a file
//! rendered with the strategy picked by [`strategy::select`].

use std::collections::HashMap;
use std::path::Path;

use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::{TimeDelta, Utc};
use dv_renderer::{Converter, Lexer, RenderCategory, ext, split_slides};

use crate::archive;
use crate::content::FileContent;
use crate::entry::{self, ArchiveEntry, EntryView, encode_path};
use crate::error::ServerError;
use crate::root::{ARCHIVE_DELIMITER, RequestPath};
use crate::state::AppState;
use crate::strategy::{self, LexerMatch, Signals, Strategy};
use crate::templates::PageOptions;

/// Lifetime of archive member responses, in seconds.
const ARCHIVE_MAX_AGE: i64 = 100;

/// RFC 7231 IMF-fixdate.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Member requested when an archive is opened without one.
const ARCHIVE_INDEX: &str = "index.html";

/// Query flags recognized on browse requests. Only presence matters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct QueryFlags {
    /// `raw` or `r`.
    pub(crate) raw: bool,
    pub(crate) source: bool,
    pub(crate) slide: bool,
    /// Load math typesetting on rendered pages.
    pub(crate) math: bool,
}

impl QueryFlags {
    pub(crate) fn from_query(query: &HashMap<String, String>) -> Self {
        Self {
            raw: query.contains_key("raw") || query.contains_key("r"),
            source: query.contains_key("source"),
            slide: query.contains_key("slide"),
            math: query.contains_key("math"),
        }
    }
}

/// A browse request, stripped down to what resolution needs.
#[derive(Debug)]
pub(crate) struct BrowseRequest {
    /// Decoded request path without the leading slash.
    pub(crate) path: String,
    pub(crate) flags: QueryFlags,
    pub(crate) has_referer: bool,
}

/// Resolve a browse request into a response.
pub(crate) fn resolve(state: &AppState, request: &BrowseRequest) -> Result<Response, ServerError> {
    let parsed = RequestPath::parse(&request.path);
    let path = state
        .root
        .resolve(parsed.path)
        .ok_or_else(|| ServerError::NotFound(request.path.clone()))?;

    if path.is_dir() {
        return render_directory(state, &path, parsed.path, request.flags);
    }
    if ext::has_extension(&path, &state.archive_extensions) {
        return resolve_archive(state, &path, parsed, request.flags);
    }
    render_file(state, &path, request)
}

fn render_directory(
    state: &AppState,
    dir: &Path,
    relative: &str,
    flags: QueryFlags,
) -> Result<Response, ServerError> {
    let relative = relative.trim_matches('/');
    tracing::debug!(
        path = relative,
        category = %RenderCategory::DirectoryListing,
        "Rendering directory"
    );
    let entries: Vec<EntryView> = entry::list_directory(dir, relative)?
        .iter()
        .map(EntryView::from_entry)
        .collect();

    let html = state.templates.listing(
        &format!("/{relative}"),
        parent_uri(relative).as_deref(),
        &entries,
        state.page_options(flags.math),
    )?;
    Ok(Html(html).into_response())
}

fn resolve_archive(
    state: &AppState,
    path: &Path,
    request: RequestPath<'_>,
    flags: QueryFlags,
) -> Result<Response, ServerError> {
    let archive_path = request.path.trim_matches('/');
    match request.inner {
        None => {
            let target = format!(
                "/{}{ARCHIVE_DELIMITER}{ARCHIVE_INDEX}",
                encode_path(archive_path)
            );
            Ok(Redirect::to(&target).into_response())
        }
        Some("") => {
            tracing::debug!(
                path = archive_path,
                category = %RenderCategory::ArchiveListing,
                "Listing archive"
            );
            let entries: Vec<EntryView> = archive::list_members(path)?
                .iter()
                .map(|member| EntryView::from_entry(&ArchiveEntry::new(archive_path, member)))
                .collect();
            let html = state.templates.listing(
                &format!("/{archive_path}{ARCHIVE_DELIMITER}"),
                parent_uri(archive_path).as_deref(),
                &entries,
                state.page_options(flags.math),
            )?;
            Ok(Html(html).into_response())
        }
        Some(member) => {
            tracing::debug!(
                path = archive_path,
                member,
                category = %RenderCategory::ArchiveEntry,
                "Reading archive member"
            );
            archive_member(path, member)
        }
    }
}

fn archive_member(path: &Path, member: &str) -> Result<Response, ServerError> {
    let bytes = archive::read_member(path, member)?;
    let mime = mime_guess::from_path(member).first_or_octet_stream();
    let expires = Utc::now() + TimeDelta::seconds(ARCHIVE_MAX_AGE);

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, format!("max-age={ARCHIVE_MAX_AGE}")),
            (header::EXPIRES, expires.format(HTTP_DATE_FORMAT).to_string()),
        ],
        bytes,
    )
        .into_response())
}

fn render_file(
    state: &AppState,
    path: &Path,
    request: &BrowseRequest,
) -> Result<Response, ServerError> {
    let content = FileContent::read(path)?;
    let filename = ext::file_name(path);
    let classification = state.registry.classify(path);
    let registration = classification.registration;
    let resolved = state.highlighter.resolve_lexer(filename);

    let lexer = match resolved {
        Some(_) => LexerMatch::Resolved,
        None if content.is_text() && state.plain_text_fallback => LexerMatch::Fallback,
        None => LexerMatch::Missing,
    };
    let signals = Signals {
        raw_requested: request.flags.raw,
        source_requested: request.flags.source,
        slide_requested: request.flags.slide,
        has_referer: request.has_referer,
        is_static: classification.is_static,
        is_text: content.is_text(),
        lexer,
        has_converter: registration.is_some(),
    };
    let strategy = strategy::select(&signals);
    let category = strategy.category(&classification);
    tracing::debug!(path = %request.path, %category, "Rendering file");

    let options = state.page_options(request.flags.math);
    match strategy {
        Strategy::Slides => render_slides(state, filename, &content, options),
        Strategy::Highlighted => {
            let lexer = resolved.unwrap_or_else(|| state.highlighter.plain_text());
            render_source(state, filename, &content, lexer)
        }
        Strategy::PlainText => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            content.into_bytes(),
        )
            .into_response()),
        Strategy::Document => match registration {
            Some(registration) => {
                render_document(state, filename, registration.converter(), &content, options)
            }
            None => Ok(verbatim(path, content)),
        },
        Strategy::StaticFile | Strategy::Verbatim => Ok(verbatim(path, content)),
    }
}

fn render_slides(
    state: &AppState,
    title: &str,
    content: &FileContent,
    options: PageOptions<'_>,
) -> Result<Response, ServerError> {
    let html = state.slides.convert(&content.text_lossy())?;
    let slides = split_slides(&html);
    Ok(Html(state.templates.slides(title, &slides, options)?).into_response())
}

fn render_source(
    state: &AppState,
    title: &str,
    content: &FileContent,
    lexer: Lexer<'_>,
) -> Result<Response, ServerError> {
    let code = state.highlighter.highlight_table(&content.text_lossy(), lexer)?;
    let stylesheet = state.highlighter.stylesheet()?;
    let html = state
        .templates
        .source(title, lexer.name(), &code, &stylesheet)?;
    Ok(Html(html).into_response())
}

fn render_document(
    state: &AppState,
    title: &str,
    converter: &dyn Converter,
    content: &FileContent,
    options: PageOptions<'_>,
) -> Result<Response, ServerError> {
    let article = converter.convert(&content.text_lossy())?;
    Ok(Html(state.templates.post(title, &article, options)?).into_response())
}

/// File bytes with a MIME type guessed from the name.
fn verbatim(path: &Path, content: FileContent) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.to_string())], content.into_bytes()).into_response()
}

/// Link to the parent of a request path, or `None` at the root.
fn parent_uri(relative: &str) -> Option<String> {
    if relative.is_empty() {
        return None;
    }
    Some(match relative.rsplit_once('/') {
        Some((parent, _)) => format!("/{}", encode_path(parent)),
        None => "/".to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_query_flags_presence_only() {
        let flags = QueryFlags::from_query(&query(&[("r", ""), ("slide", "0"), ("math", "")]));
        assert_eq!(
            flags,
            QueryFlags {
                raw: true,
                source: false,
                slide: true,
                math: true
            }
        );
    }

    #[test]
    fn test_query_flags_empty() {
        assert_eq!(QueryFlags::from_query(&query(&[])), QueryFlags::default());
    }

    #[test]
    fn test_parent_uri() {
        assert_eq!(parent_uri(""), None);
        assert_eq!(parent_uri("docs"), Some("/".to_owned()));
        assert_eq!(parent_uri("docs/my notes"), Some("/docs".to_owned()));
        assert_eq!(parent_uri("a b/c"), Some("/a%20b".to_owned()));
    }
}
