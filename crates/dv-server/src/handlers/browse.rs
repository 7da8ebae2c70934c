//! Content browsing endpoint.
//!
//! Every path that is not claimed by another route is resolved against the
//! content root.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;

use crate::error::ServerError;
use crate::resolver::{self, BrowseRequest, QueryFlags};
use crate::state::AppState;

/// Handle GET / (content root listing).
pub(crate) async fn browse_root(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    browse_impl(String::new(), &state, &query, &headers)
}

/// Handle GET /{path}.
pub(crate) async fn browse(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    browse_impl(path, &state, &query, &headers)
}

fn browse_impl(
    path: String,
    state: &AppState,
    query: &HashMap<String, String>,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let request = BrowseRequest {
        path,
        flags: QueryFlags::from_query(query),
        has_referer: headers.contains_key(header::REFERER),
    };

    resolver::resolve(state, &request).inspect_err(|err| match err {
        ServerError::NotFound(path) => tracing::debug!(path, "Not found"),
        _ => tracing::error!(path = %request.path, error = %err.report(), "Request failed"),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path as FsPath;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use dv_renderer::{Converter, DocumentKind, RenderError, RendererRegistry};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::ServerConfig;
    use crate::app::create_router;
    use crate::archive::tests::write_archive;
    use crate::error::NOT_FOUND_BODY;
    use crate::state::AppState;

    use super::*;

    struct TestResponse {
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
    }

    impl TestResponse {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }

        fn content_type(&self) -> &str {
            self.headers[header::CONTENT_TYPE].to_str().unwrap()
        }
    }

    fn router_with(root: &FsPath, configure: impl FnOnce(&mut ServerConfig)) -> Router {
        let mut config = ServerConfig {
            root: root.to_path_buf(),
            assets_dir: root.join("no-such-assets"),
            ..ServerConfig::default()
        };
        configure(&mut config);
        create_router(Arc::new(AppState::new(&config).unwrap()))
    }

    fn router(root: &FsPath) -> Router {
        router_with(root, |_| {})
    }

    async fn send(router: Router, request: Request<Body>) -> TestResponse {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    async fn get(router: Router, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(router, request).await
    }

    async fn get_referred(router: Router, uri: &str) -> TestResponse {
        let request = Request::builder()
            .uri(uri)
            .header(header::REFERER, "http://localhost:8100/")
            .body(Body::empty())
            .unwrap();
        send(router, request).await
    }

    /// Rejects documents containing `FAIL`, panics on `PANIC`.
    struct Fragile;

    impl Converter for Fragile {
        fn convert(&self, text: &str) -> Result<String, RenderError> {
            assert!(!text.contains("PANIC"), "parser state corrupted");
            if text.contains("FAIL") {
                return Err(RenderError::Rst("unexpected section title".to_owned()));
            }
            Ok(format!("<p>{text}</p>"))
        }
    }

    fn fragile_router(root: &FsPath) -> Router {
        let config = ServerConfig {
            root: root.to_path_buf(),
            assets_dir: root.join("no-such-assets"),
            ..ServerConfig::default()
        };
        let mut state = AppState::new(&config).unwrap();
        state.registry = RendererRegistry::new().register(DocumentKind::Rst, &["rst"], Fragile);
        create_router(Arc::new(state))
    }

    fn notes_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.md"), "# Notes\n\nhello\n").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let dir = notes_dir();
        let response = get(router(dir.path()), "/missing.md").await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.text(), NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn test_path_outside_root_is_not_found() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("root");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();

        let response = get(router(&root), "/sub/..%2F..%2Fsecret.txt").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(!response.text().contains("secret"));

        let response = get(router(&root), "/..%2Fsecret.txt").await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_directory_listing_sorted_children() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("c/inner.txt"), "").unwrap();

        let response = get(router(dir.path()), "/").await;
        assert_eq!(response.status, StatusCode::OK);
        let html = response.text();

        let positions: Vec<usize> = [r#"href="/a.txt""#, r#"href="/b.md""#, r#"href="/c""#]
            .iter()
            .map(|link| {
                assert_eq!(html.matches(link).count(), 1, "{link}");
                html.find(link).unwrap()
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!html.contains("inner.txt"));
    }

    #[tokio::test]
    async fn test_nested_directory_listing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("my docs")).unwrap();
        fs::write(dir.path().join("my docs/inner.txt"), "").unwrap();

        let html = get(router(dir.path()), "/my%20docs").await.text();
        assert!(html.contains(r#"href="/my%20docs/inner.txt""#));
        assert!(html.contains(r#"<li class="parent"><a href="/">"#));
    }

    #[tokio::test]
    async fn test_static_file_served_raw() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), "body { color: red; }").unwrap();

        for response in [
            get(router(dir.path()), "/style.css").await,
            get_referred(router(dir.path()), "/style.css").await,
        ] {
            assert_eq!(response.status, StatusCode::OK);
            assert_eq!(response.content_type(), "text/css");
            assert_eq!(response.body, b"body { color: red; }");
        }
    }

    #[tokio::test]
    async fn test_static_file_source_flag_highlights() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>hi</p>\n").unwrap();

        let html = get(router(dir.path()), "/index.html?source").await.text();
        assert!(html.contains(r#"class="linenos""#));
        assert!(html.contains("&lt;"));
    }

    #[tokio::test]
    async fn test_markdown_slides() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("deck.md"), "first\n\n---\n\nsecond\n").unwrap();

        let html = get(router(dir.path()), "/deck.md?slide").await.text();
        assert_eq!(html.matches(r#"<section class="slide">"#).count(), 2);
        let first = html.find("<p>first</p>").unwrap();
        let second = html.find("<p>second</p>").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_markdown_rendered_on_direct_navigation() {
        let dir = notes_dir();
        let response = get(router(dir.path()), "/notes.md").await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), "text/html; charset=utf-8");
        let html = response.text();
        assert!(html.contains(r#"<h1 id="notes">Notes</h1>"#));
        assert!(!html.contains("linenos"));
    }

    #[tokio::test]
    async fn test_markdown_source_flag_highlights() {
        let dir = notes_dir();
        let html = get(router(dir.path()), "/notes.md?source=1").await.text();

        assert!(html.contains(r#"<td class="linenos">"#));
        assert!(!html.contains(r#"<h1 id="notes">"#));
    }

    #[tokio::test]
    async fn test_markdown_math_flag() {
        let dir = notes_dir();
        assert!(get(router(dir.path()), "/notes.md?math").await.text().contains("MathJax"));
        assert!(!get(router(dir.path()), "/notes.md").await.text().contains("MathJax"));
    }

    #[tokio::test]
    async fn test_rst_document() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("guide.rst"), "Hello *world*\n").unwrap();

        let html = get_referred(router(dir.path()), "/guide.rst").await.text();
        assert!(html.contains("<em>world</em>"));
        assert!(html.contains(r#"<article class="post">"#));
    }

    #[tokio::test]
    async fn test_converter_error_is_plain_text_failure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.rst"), "FAIL\n").unwrap();

        let response = get_referred(fragile_router(dir.path()), "/bad.rst").await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.content_type(), "text/plain; charset=utf-8");
        assert_eq!(
            response.text(),
            "Error: Render error\nCaused by: reStructuredText error: unexpected section title\n"
        );
    }

    #[tokio::test]
    async fn test_converter_panic_is_plain_text_failure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.rst"), "PANIC\n").unwrap();
        fs::write(dir.path().join("good.rst"), "fine\n").unwrap();
        let router = fragile_router(dir.path());

        let response = get_referred(router.clone(), "/bad.rst").await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.content_type(), "text/plain; charset=utf-8");
        assert_eq!(response.headers["x-content-type-options"], "nosniff");
        let text = response.text();
        assert!(text.starts_with("Error: Request handler panicked\n"));
        assert!(text.contains("parser state corrupted"));

        let response = get_referred(router, "/good.rst").await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.text().contains("<p>fine\n</p>"));
    }

    #[tokio::test]
    async fn test_markdown_metadata_and_heading_ids() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("m.md"),
            "Title: My doc\nAuthor: me\n\n# Intro Part\n",
        )
        .unwrap();

        let html = get_referred(router(dir.path()), "/m.md").await.text();
        assert!(html.contains(r#"<h1 id="intro-part">Intro Part</h1>"#));
        assert!(!html.contains("Author: me"));
    }

    #[tokio::test]
    async fn test_source_code_highlighted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();

        let response = get_referred(router(dir.path()), "/main.rs").await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.text().contains(r#"<td class="linenos"><pre>1</pre></td>"#));
    }

    #[tokio::test]
    async fn test_undetected_text_highlighted_as_plain_text() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.zzqx"), "a < b\n").unwrap();

        let html = get(router(dir.path()), "/notes.zzqx").await.text();
        assert!(html.contains("linenos"));
        assert!(html.contains("a &lt; b"));
    }

    #[tokio::test]
    async fn test_raw_text_without_fallback_is_plain_text() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.zzqx"), "a < b\n").unwrap();
        let router = router_with(dir.path(), |config| config.plain_text_fallback = false);

        let response = get(router, "/notes.zzqx?raw").await;
        assert_eq!(response.content_type(), "text/plain; charset=utf-8");
        assert_eq!(response.body, b"a < b\n");
    }

    #[tokio::test]
    async fn test_binary_file_verbatim() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();

        let response = get(router(dir.path()), "/blob.bin").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), "application/octet-stream");
        assert_eq!(response.body, vec![0u8, 159, 146, 150]);
    }

    fn jar_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_archive(
            &dir.path().join("app.jar"),
            &[
                ("index.html", b"<p>inside</p>"),
                ("META-INF/", b""),
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
                ("css/site.css", b"body {}"),
            ],
        );
        dir
    }

    #[tokio::test]
    async fn test_archive_member() {
        let dir = jar_dir();
        let response = get(router(dir.path()), "/app.jar:/index.html").await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), "text/html");
        assert_eq!(response.body, b"<p>inside</p>");
        assert_eq!(response.headers[header::CACHE_CONTROL], "max-age=100");
        assert!(
            response.headers[header::EXPIRES]
                .to_str()
                .unwrap()
                .ends_with(" GMT")
        );
    }

    #[tokio::test]
    async fn test_archive_without_member_redirects_to_index() {
        let dir = jar_dir();
        let response = get(router(dir.path()), "/app.jar").await;

        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.headers[header::LOCATION], "/app.jar:/index.html");
    }

    #[tokio::test]
    async fn test_archive_listing() {
        let dir = jar_dir();
        let html = get(router(dir.path()), "/app.jar:/").await.text();

        let manifest = html.find(r#"href="/app.jar:/META-INF/MANIFEST.MF""#).unwrap();
        let css = html.find(r#"href="/app.jar:/css/site.css""#).unwrap();
        let index = html.find(r#"href="/app.jar:/index.html""#).unwrap();
        assert!(manifest < css && css < index);
        assert!(!html.contains(r#"href="/app.jar:/META-INF/""#));
    }

    #[tokio::test]
    async fn test_archive_extensions_configurable() {
        let dir = TempDir::new().unwrap();
        write_archive(&dir.path().join("bundle.zip"), &[("index.html", b"zip")]);

        let default = get(router(dir.path()), "/bundle.zip").await;
        assert_eq!(default.status, StatusCode::OK);
        assert!(!default.headers.contains_key(header::LOCATION));

        let router = router_with(dir.path(), |config| {
            config.archive_extensions = vec!["zip".to_owned()];
        });
        assert_eq!(get(router, "/bundle.zip").await.status, StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_missing_archive_member_is_plain_text_failure() {
        let dir = jar_dir();
        let response = get(router(dir.path()), "/app.jar:/missing.txt").await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.content_type(), "text/plain; charset=utf-8");
        let text = response.text();
        assert!(text.starts_with("Error: Archive error\n"));
        assert!(text.contains("missing.txt"));
    }

    #[tokio::test]
    async fn test_repeated_requests_are_identical() {
        let dir = notes_dir();
        let first = get(router(dir.path()), "/notes.md").await;
        let second = get(router(dir.path()), "/notes.md").await;

        assert_eq!(first.status, second.status);
        assert_eq!(first.body, second.body);
    }

    #[tokio::test]
    async fn test_security_headers() {
        let dir = notes_dir();
        let response = get(router(dir.path()), "/").await;

        assert_eq!(response.headers["x-content-type-options"], "nosniff");
        assert_eq!(response.headers["x-frame-options"], "SAMEORIGIN");
    }
}
