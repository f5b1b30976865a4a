use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::config::load_config;
use crate::handlers::{AppState, Settings};

/// Shutdown signal types
#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Graceful shutdown (drain connections, clean up)
    Graceful,
}

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the signal task
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
/// - SIGHUP: Configuration and rate table reload from `config_path`
#[cfg(unix)]
pub fn setup_signal_handlers(
    state: AppState,
    config_path: PathBuf,
) -> Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received, reloading configuration");
                    if let Err(e) = reload_config(&state, &config_path) {
                        error!("Failed to reload configuration, keeping current one: {:#}", e);
                    } else {
                        info!("Configuration reloaded successfully");
                    }
                }
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Only Ctrl+C is available off unix; there is no reload signal
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    _state: AppState,
    _config_path: PathBuf,
) -> Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, initiating shutdown");
                let _ = tx_clone.send(ShutdownSignal::Graceful);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Reload configuration and rate table atomically
///
/// Both are loaded and validated, then swapped in with a single store. If
/// any step fails, the old configuration and table remain in place.
pub fn reload_config(state: &AppState, config_path: &Path) -> Result<()> {
    info!("Loading new configuration from {}...", config_path.display());

    let new_config = load_config(config_path)?;
    let new_rates = new_config.load_rate_table()?;

    {
        let settings = state.settings.load();
        let current = &settings.config;
        if current.server.host != new_config.server.host || current.server.port != new_config.server.port {
            warn!("server.host/server.port changes take effect only after a restart");
        }
        if current.metrics.enabled != new_config.metrics.enabled
            || current.metrics.endpoint != new_config.metrics.endpoint
        {
            warn!("metrics settings take effect only after a restart");
        }
    }

    info!(
        priced_cells = new_rates.priced_cells(),
        currency = %new_config.pricing.currency,
        "New configuration loaded"
    );

    state.settings.store(Arc::new(Settings {
        config: new_config,
        rates: Arc::new(new_rates),
    }));

    info!("Configuration and rate table swapped atomically");
    Ok(())
}
