//! HTTP server for the docview content browser.
//!
//! Serves a directory tree as a browsable site:
//! - directories as sorted listings
//! - markup documents (markdown, reStructuredText, textile, wiki) rendered
//!   into an article page, or as a slide deck with `?slide`
//! - source code as line-numbered, highlighted pages
//! - static web assets and binary files as-is
//! - members of `jar`/`war`/`ear` archives through `archive.jar:/member`
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use dv_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root: PathBuf::from("/home/me/docs"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (dv-server)
//!                        │
//!                        ├─► /{*path} ──► resolver ──► strategy::select
//!                        │                   │
//!                        │                   └─► dv-renderer (convert, highlight)
//!                        │
//!                        ├─► /static/pygments.css (highlighter stylesheet)
//!                        │
//!                        └─► /assets (tower-http ServeDir)
//! ```

mod app;
mod archive;
mod content;
mod entry;
mod error;
mod handlers;
mod middleware;
mod resolver;
mod root;
mod state;
mod static_files;
mod strategy;
mod templates;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use state::AppState;

pub use archive::ArchiveError;
pub use error::{ServerError, StartupError};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory served as the site root.
    pub root: PathBuf,
    /// Published documentation URL shown in page footers.
    pub public_base: Option<String>,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
    /// Highlighting theme name.
    pub theme: String,
    /// Highlight text without a known syntax as plain text.
    pub plain_text_fallback: bool,
    /// Extensions treated as zip archives (lowercase, no dot).
    pub archive_extensions: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8100,
            root: PathBuf::from("docs"),
            public_base: None,
            assets_dir: PathBuf::from("assets"),
            theme: dv_renderer::DEFAULT_THEME.to_owned(),
            plain_text_fallback: true,
            archive_extensions: vec!["jar".to_owned(), "war".to_owned(), "ear".to_owned()],
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the state cannot be built or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(&config)?);
    tracing::info!(
        root = %state.root.path().display(),
        archives = ?state.archive_extensions,
        "Serving content"
    );

    let app = app::create_router(state);

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from docview config.
///
/// # Arguments
///
/// * `config` - Loaded and validated docview configuration
#[must_use]
pub fn server_config_from_config(config: &dv_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.content_resolved.root.clone(),
        public_base: config.content_resolved.public_base.clone(),
        assets_dir: config.assets_dir.clone(),
        theme: config.render.theme.clone(),
        plain_text_fallback: config.render.plain_text_fallback,
        archive_extensions: config.render.archive_extensions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_config_from_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = dv_config::Config::default();
        config.server.port = 9000;
        config.content_resolved.root = dir.path().to_path_buf();
        config.content_resolved.public_base = Some("https://docs.example.com".to_owned());
        config.render.archive_extensions = vec!["zip".to_owned()];

        let server = server_config_from_config(&config);
        assert_eq!(server.port, 9000);
        assert_eq!(server.root, dir.path());
        assert_eq!(server.public_base.as_deref(), Some("https://docs.example.com"));
        assert_eq!(server.archive_extensions, vec!["zip"]);
        assert!(server.plain_text_fallback);
    }

    #[test]
    fn test_state_rejects_missing_root() {
        let config = ServerConfig {
            root: PathBuf::from("/definitely/not/here"),
            ..ServerConfig::default()
        };
        assert!(matches!(
            AppState::new(&config),
            Err(StartupError::Root { .. })
        ));
    }

    #[test]
    fn test_state_rejects_unknown_theme() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ServerConfig {
            root: dir.path().to_path_buf(),
            theme: "No Such Theme".to_owned(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            AppState::new(&config),
            Err(StartupError::Highlighter(_))
        ));
    }
}
