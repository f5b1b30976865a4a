//! Logging setup and redaction helpers
//!
//! Customer emails and admin secrets never reach the logs in clear text.

use std::fmt;
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over `default_level`. `format` is `"json"` or anything
/// else for the human-readable layer. Can only be called once per process.
pub fn init_tracing(default_level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry
            .with(tracing_fmt::layer().json().with_target(true))
            .init();
    } else {
        registry.with(tracing_fmt::layer().with_target(true)).init();
    }
}

/// Email shown as first character, `***`, and the domain
///
/// `ada@example.ch` → `a***@example.ch`
#[derive(Clone, Debug)]
pub struct MaskedEmail<'a> {
    inner: &'a str,
}

impl<'a> MaskedEmail<'a> {
    pub fn new(email: &'a str) -> Self {
        Self { inner: email }
    }
}

impl<'a> fmt::Display for MaskedEmail<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.trim().split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                let first: String = local.chars().take(1).collect();
                write!(f, "{}***@{}", first, domain)
            }
            _ => write!(f, "***"),
        }
    }
}

/// Mask a secret for display, keeping only its scheme prefix if it has one
///
/// `$argon2id$v=19$m=19456,...` → `$argon2id$***`
pub fn mask_secret(secret: &str) -> String {
    match secret.strip_prefix('$').and_then(|rest| rest.split_once('$')) {
        Some((scheme, _)) if !scheme.is_empty() => format!("${}$***", scheme),
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_email() {
        assert_eq!(MaskedEmail::new("ada@example.ch").to_string(), "a***@example.ch");
        assert_eq!(MaskedEmail::new(" élise@mail.fr ").to_string(), "é***@mail.fr");
    }

    #[test]
    fn test_masked_email_malformed() {
        assert_eq!(MaskedEmail::new("not-an-email").to_string(), "***");
        assert_eq!(MaskedEmail::new("@example.ch").to_string(), "***");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(
            mask_secret("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"),
            "$argon2id$***"
        );
        assert_eq!(mask_secret("admin123"), "***");
    }
}
