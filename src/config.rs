use argon2::password_hash::PasswordHash;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pricing::{resolve_rate_table, RateTable};

/// Prefix for environment overrides, e.g. `SHIPQUOTE__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "SHIPQUOTE";

/// Paths served by the API that the metrics endpoint may not take over
const RESERVED_PATHS: &[&str] = &["/", "/health", "/ready", "/api"];

/// Upper bound for `admin.session_ttl_seconds` (30 days)
pub const MAX_SESSION_TTL_SECONDS: u64 = 30 * 24 * 3600;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Optional rate table override (.toml or .json); the standard tariff otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_table: Option<PathBuf>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            rate_table: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Argon2 PHC string, see `shipquote hash-password`
    pub password_hash: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_currency() -> String {
    "CHF".to_string()
}

fn default_session_ttl() -> u64 {
    3600
}

impl Config {
    /// Rate table named by `pricing.rate_table`, or the standard tariff
    pub fn load_rate_table(&self) -> anyhow::Result<RateTable> {
        Ok(resolve_rate_table(self.pricing.rate_table.as_deref())?)
    }
}

/// Load configuration from `path` layered with `SHIPQUOTE__*` environment variables
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let mut cfg: Config = config.try_deserialize()?;
    resolve_relative_paths(&mut cfg, path);
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Relative file paths in the configuration are relative to the config file
fn resolve_relative_paths(cfg: &mut Config, config_path: &Path) {
    let Some(dir) = config_path.parent() else {
        return;
    };
    if let Some(rate_table) = cfg.pricing.rate_table.as_mut() {
        if rate_table.is_relative() {
            *rate_table = dir.join(&*rate_table);
        }
    }
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    match cfg.server.log_format.as_str() {
        "pretty" | "json" => {}
        other => anyhow::bail!("Invalid server.log_format '{}' (expected 'pretty' or 'json')", other),
    }

    if cfg.pricing.currency.trim().is_empty() {
        anyhow::bail!("pricing.currency cannot be empty");
    }

    if let Err(e) = PasswordHash::new(&cfg.admin.password_hash) {
        anyhow::bail!(
            "admin.password_hash is not a valid password hash ({}); generate one with `shipquote hash-password`",
            e
        );
    }

    if cfg.admin.session_ttl_seconds == 0 || cfg.admin.session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
        anyhow::bail!(
            "admin.session_ttl_seconds must be between 1 and {}",
            MAX_SESSION_TTL_SECONDS
        );
    }

    if cfg.metrics.enabled {
        let endpoint = cfg.metrics.endpoint.as_str();
        if !endpoint.starts_with('/') {
            anyhow::bail!("metrics.endpoint must start with '/'");
        }
        if RESERVED_PATHS.contains(&endpoint) || endpoint.starts_with("/api/") {
            anyhow::bail!("metrics.endpoint '{}' collides with an API route", endpoint);
        }
    }

    // Fail at startup rather than on the first estimate
    cfg.load_rate_table()?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) const TEST_PASSWORD: &str = "correct horse";

    /// Fresh argon2 hash of [`TEST_PASSWORD`]
    pub(crate) fn test_password_hash() -> String {
        use argon2::password_hash::{rand_core::OsRng, SaltString};
        use argon2::{Argon2, PasswordHasher};

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(TEST_PASSWORD.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    pub(crate) fn create_test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                log_level: "info".to_string(),
                log_format: "pretty".to_string(),
            },
            pricing: PricingConfig::default(),
            admin: AdminConfig {
                password_hash: test_password_hash(),
                session_ttl_seconds: 3600,
            },
            metrics: MetricsConfig::default(),
        }
    }

    #[test]
    fn test_validate_config_accepts_defaults() {
        assert!(validate_config(&create_test_config()).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_bad_log_format() {
        let mut cfg = create_test_config();
        cfg.server.log_format = "xml".to_string();

        let result = validate_config(&cfg);
        assert!(result.unwrap_err().to_string().contains("log_format"));
    }

    #[test]
    fn test_validate_config_rejects_plain_password() {
        let mut cfg = create_test_config();
        cfg.admin.password_hash = "admin123".to_string();

        let result = validate_config(&cfg);
        assert!(result.unwrap_err().to_string().contains("hash-password"));
    }

    #[test]
    fn test_validate_config_rejects_zero_ttl() {
        let mut cfg = create_test_config();
        cfg.admin.session_ttl_seconds = 0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_config_rejects_metrics_on_api_route() {
        let mut cfg = create_test_config();
        cfg.metrics.endpoint = "/health".to_string();
        assert!(validate_config(&cfg).is_err());

        cfg.metrics.endpoint = "/api/estimate".to_string();
        assert!(validate_config(&cfg).is_err());

        cfg.metrics.enabled = false;
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_validate_config_checks_rate_table() {
        let mut cfg = create_test_config();
        cfg.pricing.rate_table = Some(PathBuf::from("/nonexistent/rates.toml"));
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let hash = test_password_hash();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 9090

[admin]
password_hash = "{}"
"#,
            hash
        )
        .unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.log_format, "pretty");
        assert_eq!(cfg.pricing.currency, "CHF");
        assert_eq!(cfg.admin.session_ttl_seconds, 3600);
        assert!(cfg.metrics.enabled);
        assert_eq!(cfg.load_rate_table().unwrap(), RateTable::standard());
    }

    #[test]
    fn test_relative_rate_table_resolves_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rates.toml"),
            "insurance_rate = 0.0\n\n[shipping.fast.SWITZERLAND]\n\">5\" = 150\n",
        )
        .unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                "[server]\nhost = \"127.0.0.1\"\nport = 8080\n\n[pricing]\nrate_table = \"rates.toml\"\n\n[admin]\npassword_hash = \"{}\"\n",
                test_password_hash()
            ),
        )
        .unwrap();

        let cfg = load_config(&config_path).unwrap();
        assert_eq!(cfg.pricing.rate_table, Some(dir.path().join("rates.toml")));
        assert_eq!(cfg.load_rate_table().unwrap().priced_cells(), 1);
    }

    #[test]
    fn test_absolute_rate_table_is_kept() {
        let mut cfg = create_test_config();
        cfg.pricing.rate_table = Some(PathBuf::from("/srv/shipquote/rates.toml"));

        resolve_relative_paths(&mut cfg, Path::new("/etc/shipquote/config.toml"));
        assert_eq!(cfg.pricing.rate_table, Some(PathBuf::from("/srv/shipquote/rates.toml")));

        cfg.pricing.rate_table = Some(PathBuf::from("tariffs/rates.json"));
        resolve_relative_paths(&mut cfg, Path::new("/etc/shipquote/config.toml"));
        assert_eq!(
            cfg.pricing.rate_table,
            Some(PathBuf::from("/etc/shipquote/tariffs/rates.json"))
        );
    }
}
