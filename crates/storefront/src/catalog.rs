//! Catalog backend client.
//!
//! Fetches `GET <base_url>/<category>` and returns the menu entries of that
//! category. Fetching never fails from the caller's point of view: transport
//! errors, error statuses and unreadable bodies are logged and produce an empty
//! list. Successful non-empty results are cached with `moka`.

use std::sync::Arc;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};
use url::Url;

use menu_cart_core::{CatalogEntry, Category, ItemId};

use crate::config::CatalogConfig;

/// Errors that can occur when talking to the catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Unexpected status {0}")]
    Status(u16),

    /// Body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Body was JSON but not an array of entries.
    #[error("Expected a JSON array of menu items")]
    NotAnArray,

    /// Endpoint URL could not be built.
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the catalog backend.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<Category, Arc<Vec<CatalogEntry>>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(Category::ALL.len() as u64)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Fetch the entries of a category.
    ///
    /// Returns an empty list if the backend cannot be reached or answers with
    /// something unreadable.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn fetch(&self, category: Category) -> Arc<Vec<CatalogEntry>> {
        if let Some(cached) = self.inner.cache.get(&category).await {
            debug!("Catalog cache hit");
            return cached;
        }

        match self.fetch_uncached(category).await {
            Ok(entries) => {
                let entries = Arc::new(entries);
                if !entries.is_empty() {
                    self.inner.cache.insert(category, Arc::clone(&entries)).await;
                }
                entries
            }
            Err(e) => {
                error!(error = %e, "Failed to load catalog category");
                Arc::new(Vec::new())
            }
        }
    }

    /// Find an entry by id within a category.
    pub async fn find(&self, category: Category, id: &ItemId) -> Option<CatalogEntry> {
        self.fetch(category)
            .await
            .iter()
            .find(|entry| entry.id == *id)
            .cloned()
    }

    /// URL requested for a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Url` if the category path cannot be joined.
    pub fn endpoint(&self, category: Category) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(category.path())?)
    }

    async fn fetch_uncached(&self, category: Category) -> Result<Vec<CatalogEntry>, CatalogError> {
        let url = self.endpoint(category)?;
        debug!(%url, "Fetching catalog category");

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_entries(&body)
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Parse a catalog response body, skipping individual malformed entries.
///
/// # Errors
///
/// Returns `CatalogError` if the body is not a JSON array.
pub fn parse_entries(body: &[u8]) -> Result<Vec<CatalogEntry>, CatalogError> {
    let serde_json::Value::Array(values) = serde_json::from_slice(body)? else {
        return Err(CatalogError::NotAnArray);
    };

    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed catalog entry");
                None
            }
        })
        .collect())
}
