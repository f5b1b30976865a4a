use anyhow::Result;
use colored::Colorize;
use shipquote::{
    config::{self, Config},
    logging::mask_secret,
};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with secrets masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Currency: {}", cfg.pricing.currency);
    println!(
        "  Rate Table: {}",
        cfg.pricing
            .rate_table
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "standard".to_string())
    );

    info!("Configuration validation successful");
    Ok(())
}

/// Mask the admin password hash for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.admin.password_hash = mask_secret(&sanitized.admin.password_hash);
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipquote::config::{AdminConfig, MetricsConfig, PricingConfig, ServerConfig};

    #[test]
    fn test_sanitize_secrets_masks_password_hash() {
        let cfg = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                log_level: "info".to_string(),
                log_format: "json".to_string(),
            },
            pricing: PricingConfig::default(),
            admin: AdminConfig {
                password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
                session_ttl_seconds: 3600,
            },
            metrics: MetricsConfig::default(),
        };

        let sanitized = sanitize_secrets(&cfg);
        assert_eq!(sanitized.admin.password_hash, "$argon2id$***");
        assert_eq!(sanitized.server.port, 8080);
    }
}
