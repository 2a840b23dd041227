//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `MENU_API_URL` - Catalog backend base URL (default: `http://localhost:3000`)
//! - `MENU_CART_DIR` - Directory holding the saved cart (default: `.menu-cart`)
//! - `MENU_FETCH_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `MENU_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `MENU_CURRENCY_SYMBOL` - Suffix printed after prices (default: `₽`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_CART_DIR: &str = ".menu-cart";
const DEFAULT_FETCH_TIMEOUT_SECS: &str = "10";
const DEFAULT_CACHE_TTL_SECS: &str = "300";
const DEFAULT_CURRENCY_SYMBOL: &str = "₽";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog backend configuration
    pub catalog: CatalogConfig,
    /// Directory holding the durable cart slot
    pub cart_dir: PathBuf,
    /// Suffix printed after prices
    pub currency_symbol: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
}

/// Catalog backend configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; categories are requested at `<base_url>/<category>`
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long a fetched category stays cached
    pub cache_ttl: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let catalog = CatalogConfig {
            base_url: parse_base_url("MENU_API_URL", &get("MENU_API_URL", DEFAULT_API_URL))?,
            timeout: parse_secs(
                "MENU_FETCH_TIMEOUT_SECS",
                &get("MENU_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS),
            )?,
            cache_ttl: parse_secs(
                "MENU_CATALOG_CACHE_TTL_SECS",
                &get("MENU_CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            )?,
        };

        let cart_dir = PathBuf::from(get("MENU_CART_DIR", DEFAULT_CART_DIR));
        if cart_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "MENU_CART_DIR".to_string(),
                "must not be empty".to_string(),
            ));
        }

        Ok(Self {
            catalog,
            cart_dir,
            currency_symbol: get("MENU_CURRENCY_SYMBOL", DEFAULT_CURRENCY_SYMBOL),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, making sure it ends with `/` so that joining a category
/// appends a path segment instead of replacing the last one.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected an http(s) URL, got {value}"),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a positive number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.catalog.base_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.catalog.timeout, Duration::from_secs(10));
        assert_eq!(config.catalog.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.cart_dir, PathBuf::from(".menu-cart"));
        assert_eq!(config.currency_symbol, "₽");
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = config_from(&[("MENU_API_URL", "https://menu.example.com/api")]).unwrap();
        assert_eq!(
            config.catalog.base_url.join("soups").unwrap().as_str(),
            "https://menu.example.com/api/soups"
        );
    }

    #[test]
    fn test_invalid_url() {
        let result = config_from(&[("MENU_API_URL", "not a url")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "MENU_API_URL"));

        let result = config_from(&[("MENU_API_URL", "ftp://menu.example.com")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(config_from(&[("MENU_FETCH_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("MENU_FETCH_TIMEOUT_SECS", "0")]).is_err());
        let config = config_from(&[("MENU_FETCH_TIMEOUT_SECS", "3")]).unwrap();
        assert_eq!(config.catalog.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_empty_sentry_dsn_is_disabled() {
        let config = config_from(&[("SENTRY_DSN", "")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
