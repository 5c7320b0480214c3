//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SERENYA_HOST` - Bind address (default: 127.0.0.1)
//! - `SERENYA_PORT` - Listen port (default: 3000)
//! - `SERENYA_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `SERENYA_CART_STORAGE_KEY` - Key of the durable cart slot (default: `serenya_cart`)
//! - `SERENYA_CHECKOUT_PATH` - Relative checkout destination (default: `/checkout`)
//! - `SERENYA_AUTO_OPEN_DELAY_MS` - Delay before the cart panel opens after an add (default: 500)
//! - `SERENYA_AUTO_OPEN_POLICY` - `fire-and-forget` or `cancel-on-close` (default: `fire-and-forget`)
//! - `SERENYA_CURRENCY_LABEL` - Prefix of rendered amounts (default: `Rs.`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

use crate::cart::CartSettings;
use crate::cart::store::{
    DEFAULT_AUTO_OPEN_DELAY, DEFAULT_CHECKOUT_PATH, DEFAULT_CURRENCY, DEFAULT_STORAGE_KEY,
};
use crate::widgets::AutoOpenPolicy;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Cart store settings
    pub cart: CartSettings,
    /// What a manual close does to a pending auto-open
    pub auto_open_policy: AutoOpenPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance trace sample rate
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            cart: CartSettings::default(),
            auto_open_policy: AutoOpenPolicy::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(lookup);

        let host = env.parsed("SERENYA_HOST", "127.0.0.1")?;
        let port = env.parsed("SERENYA_PORT", "3000")?;
        let base_url = env.or_default("SERENYA_BASE_URL", "http://localhost:3000");

        let checkout_path = env.or_default("SERENYA_CHECKOUT_PATH", DEFAULT_CHECKOUT_PATH);
        validate_relative_path("SERENYA_CHECKOUT_PATH", &checkout_path)?;

        let default_delay = DEFAULT_AUTO_OPEN_DELAY.as_millis().to_string();
        let auto_open_delay =
            Duration::from_millis(env.parsed("SERENYA_AUTO_OPEN_DELAY_MS", &default_delay)?);

        let cart = CartSettings {
            storage_key: env.or_default("SERENYA_CART_STORAGE_KEY", DEFAULT_STORAGE_KEY),
            checkout_path,
            auto_open_delay,
            currency: env.or_default("SERENYA_CURRENCY_LABEL", DEFAULT_CURRENCY),
        };

        Ok(Self {
            host,
            port,
            base_url,
            cart,
            auto_open_policy: env.parsed("SERENYA_AUTO_OPEN_POLICY", "fire-and-forget")?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.sample_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.sample_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    /// Get an optional variable, treating an empty value as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable (or its default) with `FromStr`.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a Sentry sample rate, which must lie in `0.0..=1.0`.
    fn sample_rate(&self, key: &str, default: &str) -> Result<f32, ConfigError> {
        let rate: f32 = self.parsed(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 0.0 and 1.0 (got {rate})"),
            ))
        }
    }
}

/// The checkout destination must stay on this site.
fn validate_relative_path(key: &str, path: &str) -> Result<(), ConfigError> {
    if path.contains("://") || path.starts_with("//") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be a relative path (got '{path}')"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.cart, CartSettings::default());
        assert_eq!(config.auto_open_policy, AutoOpenPolicy::FireAndForget);
        assert!(config.sentry_dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SERENYA_PORT", "8080"),
            ("SERENYA_BASE_URL", "https://serenya.pk"),
            ("SERENYA_CART_STORAGE_KEY", "cart_v2"),
            ("SERENYA_CHECKOUT_PATH", "checkout.html"),
            ("SERENYA_AUTO_OPEN_DELAY_MS", "250"),
            ("SERENYA_AUTO_OPEN_POLICY", "cancel-on-close"),
            ("SERENYA_CURRENCY_LABEL", "PKR"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.is_secure());
        assert_eq!(config.cart.storage_key, "cart_v2");
        assert_eq!(config.cart.checkout_path, "checkout.html");
        assert_eq!(config.cart.auto_open_delay, Duration::from_millis(250));
        assert_eq!(config.cart.currency, "PKR");
        assert_eq!(config.auto_open_policy, AutoOpenPolicy::CancelOnClose);
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_empty_value_uses_default() {
        let config = load(&[("SERENYA_PORT", ""), ("SENTRY_DSN", " ")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("SERENYA_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SERENYA_PORT"));
    }

    #[test]
    fn test_invalid_policy() {
        assert!(load(&[("SERENYA_AUTO_OPEN_POLICY", "maybe")]).is_err());
    }

    #[test]
    fn test_absolute_checkout_rejected() {
        assert!(load(&[("SERENYA_CHECKOUT_PATH", "https://evil.example/pay")]).is_err());
        assert!(load(&[("SERENYA_CHECKOUT_PATH", "//evil.example")]).is_err());
    }

    #[test]
    fn test_sample_rate_bounds() {
        assert!(load(&[("SENTRY_SAMPLE_RATE", "1.5")]).is_err());
        let config = load(&[("SENTRY_TRACES_SAMPLE_RATE", "0.25")]).unwrap();
        assert!((config.sentry_traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }
}
