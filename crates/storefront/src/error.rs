//! Unified error handling with Sentry integration.
//!
//! Cart operations themselves never fail; `AppError` covers the edges of the
//! application: configuration, building clients, unknown menu items and
//! terminal I/O. `main` reports whatever reaches it through [`AppError::report`].

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog client could not be set up.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested menu item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether this error indicates a fault rather than a user mistake.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }

    /// Log the error and send faults to Sentry.
    pub fn report(&self) {
        if self.is_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        } else {
            tracing::warn!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("soup9 in soups".to_string());
        assert_eq!(err.to_string(), "Not found: soup9 in soups");

        let err = AppError::Io(std::io::Error::other("stdin closed"));
        assert_eq!(err.to_string(), "I/O error: stdin closed");
    }

    #[test]
    fn test_not_found_is_not_a_fault() {
        assert!(!AppError::NotFound("x".to_string()).is_fault());
        assert!(AppError::Io(std::io::Error::other("closed")).is_fault());
    }

    #[test]
    fn test_report_without_sentry_client() {
        // No Sentry client is bound in tests; reporting must be a no-op.
        AppError::Io(std::io::Error::other("closed")).report();
        add_breadcrumb("cart", "Added item", Some(&[("id", "soup1")]));
    }
}
