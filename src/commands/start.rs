use anyhow::Result;
use colored::Colorize;
use shipquote::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration, initializes logging from it, and runs the server
/// until a shutdown signal arrives.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting shipquote in foreground mode...".green());

    let cfg = config::load_config(config_path)?;

    init_tracing(&cfg.server.log_level, &cfg.server.log_format);
    info!(config = %config_path.display(), "Starting shipquote");

    // Blocks until shutdown
    server::start_server(cfg, config_path.to_path_buf()).await?;

    Ok(())
}
