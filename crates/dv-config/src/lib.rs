//! Configuration management for docview.
//!
//! Parses an optional `docview.toml` file with serde, layers environment
//! variables underneath it and CLI settings on top of it.
//!
//! ## Content Root Resolution
//!
//! The directory being browsed is resolved in this order:
//!
//! 1. `--root` on the command line ([`CliSettings::root`])
//! 2. `content.root` in the config file
//! 3. the `DOCVIEW_ROOT` environment variable
//! 4. `~/docs`
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `content.root`
//! - `content.public_base`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the content root.
pub const ROOT_ENV_VAR: &str = "DOCVIEW_ROOT";

/// Environment variable naming the public documentation base URL.
pub const PUBLIC_BASE_ENV_VAR: &str = "DOCVIEW_PUBLIC_BASE";

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docview.toml";

/// Content root used when nothing else is configured.
const DEFAULT_ROOT: &str = "~/docs";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content root directory.
    pub root: Option<PathBuf>,
    /// Override static assets directory.
    pub assets_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content configuration (paths are raw strings from TOML).
    content: ContentConfigRaw,
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Assets configuration (paths are raw strings from TOML).
    assets: AssetsConfigRaw,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved static assets directory (set after loading).
    #[serde(skip)]
    pub assets_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            content: ContentConfigRaw::default(),
            render: RenderConfig::default(),
            assets: AssetsConfigRaw::default(),
            content_resolved: ContentConfig::default(),
            assets_dir: PathBuf::from("assets"),
            config_path: None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8100,
        }
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    root: Option<String>,
    public_base: Option<String>,
}

/// Resolved content configuration.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Directory whose files are served.
    pub root: PathBuf,
    /// Base URL of the published documentation, exposed to templates.
    pub public_base: Option<String>,
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Syntax highlighting theme name.
    pub theme: String,
    /// Highlight text files that have no dedicated lexer as plain text.
    pub plain_text_fallback: bool,
    /// Extensions of zip-based archives browsed with `archive:/member` paths.
    pub archive_extensions: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            theme: "InspiredGitHub".to_owned(),
            plain_text_fallback: true,
            archive_extensions: vec!["jar".to_owned(), "war".to_owned(), "ear".to_owned()],
        }
    }
}

/// Raw assets configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct AssetsConfigRaw {
    dir: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.root`").
        field: String,
        /// Error message (e.g., "${`DOCS_HOME`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docview.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resolved content root is not a directory.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        Self::load_with(config_path, cli_settings, |var| std::env::var(var).ok())
    }

    fn load_with(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path, &lookup)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered, &lookup)?
        } else {
            let cwd = std::env::current_dir()?;
            let mut config = Self::default();
            config.resolve_paths(&cwd, &lookup)?;
            config
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(root) = &settings.root {
            self.content_resolved.root.clone_from(root);
        }
        if let Some(assets_dir) = &settings.assets_dir {
            self.assets_dir.clone_from(assets_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(
        path: &Path,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.server.host = expand::expand_with(&config.server.host, "server.host", lookup)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir, lookup)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_render()?;
        self.validate_content()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate render configuration.
    fn validate_render(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.theme, "render.theme")?;

        if self.render.archive_extensions.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "render.archive_extensions cannot contain empty entries".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate that the content root is an existing directory.
    fn validate_content(&self) -> Result<(), ConfigError> {
        let root = &self.content_resolved.root;
        if root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!(
                "content root is not configured: set {ROOT_ENV_VAR} or content.root"
            )));
        }
        if !root.is_dir() {
            return Err(ConfigError::Validation(format!(
                "content root {} is not a directory",
                root.display()
            )));
        }
        Ok(())
    }

    /// Resolve raw paths and environment fallbacks relative to `config_dir`.
    fn resolve_paths(
        &mut self,
        config_dir: &Path,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let root = resolve_root(self.content.root.as_deref(), config_dir, lookup)?.unwrap_or_default();

        let public_base = match self.content.public_base.as_deref() {
            Some(raw) => Some(expand::expand_with(raw, "content.public_base", lookup)?),
            None => lookup(PUBLIC_BASE_ENV_VAR).filter(|v| !v.is_empty()),
        };

        self.content_resolved = ContentConfig { root, public_base };
        self.assets_dir = config_dir.join(self.assets.dir.as_deref().unwrap_or("assets"));

        for ext in &mut self.render.archive_extensions {
            *ext = ext.trim_start_matches('.').to_ascii_lowercase();
        }

        Ok(())
    }
}

/// Resolve the content root from the config value, the environment, or the
/// home directory default.
///
/// Returns `None` when nothing is configured and the home directory is unknown.
fn resolve_root(
    raw: Option<&str>,
    config_dir: &Path,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<PathBuf>, ConfigError> {
    let home = || lookup("HOME");

    if let Some(raw) = raw {
        let expanded = expand::expand_with(raw, "content.root", lookup)?;
        let expanded = shellexpand::tilde_with_context(&expanded, home);
        return Ok(Some(config_dir.join(expanded.into_owned())));
    }

    if let Some(value) = lookup(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
        let expanded = shellexpand::tilde_with_context(&value, home);
        return Ok(Some(PathBuf::from(expanded.into_owned())));
    }

    let default = shellexpand::tilde_with_context(DEFAULT_ROOT, home);
    if default.starts_with('~') {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(default.into_owned())))
}
