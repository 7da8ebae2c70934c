//! Server startup.

use std::path::PathBuf;

use clap::Args;
use dv_config::{CliSettings, Config};
use dv_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for starting the server.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Port to listen on (overrides config, default: 8100).
    port: Option<u16>,

    /// Path to configuration file (default: auto-discover docview.toml).
    #[arg(short, long, env = "DOCVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Directory to serve (overrides config and DOCVIEW_ROOT).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Directory served under /assets (overrides config).
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Enable verbose output (info-level logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            root: self.root.clone(),
            assets_dir: self.assets_dir.clone(),
        }
    }

    /// Load configuration and run the server until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        output.highlight(&format!(
            "Serving {} on http://{}:{}",
            config.content_resolved.root.display(),
            config.server.host,
            config.server.port
        ));
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }
        if let Some(base) = &config.content_resolved.public_base {
            output.info(&format!("Public docs: {base}"));
        }

        let server_config = server_config_from_config(&config);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
