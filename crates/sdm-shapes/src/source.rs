//! Shape document loading
//!
//! [`ShapeSource`] composes a [`ShapeFetcher`] with a [`ShapeTextCache`].
//! A document that cannot be fetched or parsed is logged and skipped so the
//! remaining shapes still load.

use crate::cache::ShapeTextCache;
use crate::descriptor::DescriptorSet;
use crate::discovery::discover;
use crate::error::{FetchError, ShapeError};
use async_trait::async_trait;
use sdm_store::format::parse_turtle;
use sdm_store::oxrdf::Quad;
use std::fmt::Debug;
use std::sync::Arc;

/// Retrieves shape text by URL
#[async_trait]
pub trait ShapeFetcher: Send + Sync + Debug {
    /// Fetch the document at `url`
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Production fetcher over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create fetcher with a default client
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create fetcher over a preconfigured client (e.g. one that signs requests)
    #[inline]
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ShapeFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/turtle")
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Cached shape loading and descriptor discovery
#[derive(Debug, Clone)]
pub struct ShapeSource {
    fetcher: Arc<dyn ShapeFetcher>,
    cache: ShapeTextCache,
}

impl ShapeSource {
    /// Create source with a default-sized cache
    #[inline]
    #[must_use]
    pub fn new(fetcher: Arc<dyn ShapeFetcher>) -> Self {
        Self::with_cache(fetcher, ShapeTextCache::default())
    }

    /// Create source over an explicit cache
    #[inline]
    #[must_use]
    pub fn with_cache(fetcher: Arc<dyn ShapeFetcher>, cache: ShapeTextCache) -> Self {
        Self { fetcher, cache }
    }

    /// Shape text for a URL, from cache unless `force_reload`
    ///
    /// # Errors
    /// - `FetchError` if the fetcher fails (the cache is left untouched)
    pub async fn text(&self, url: &str, force_reload: bool) -> Result<Arc<str>, FetchError> {
        if !force_reload {
            if let Some(cached) = self.cache.get(url).await {
                tracing::trace!(url, "Shape text cache hit");
                return Ok(cached);
            }
        }

        let text: Arc<str> = Arc::from(self.fetcher.fetch(url).await?);
        self.cache.insert(url, Arc::clone(&text)).await;
        tracing::debug!(url, bytes = text.len(), "Fetched shape text");
        Ok(text)
    }

    /// Parsed statements of one shape document
    ///
    /// # Errors
    /// - `ShapeError::Fetch` if the document cannot be fetched
    /// - `ShapeError::Syntax` if it is not valid Turtle
    pub async fn statements(&self, url: &str, force_reload: bool) -> Result<Vec<Quad>, ShapeError> {
        let text = self.text(url, force_reload).await?;
        parse_turtle(&text, Some(url)).map_err(|source| ShapeError::Syntax {
            url: url.to_string(),
            source,
        })
    }

    /// Load every document and discover descriptors across all of them
    ///
    /// # Errors
    /// - `ShapeError::NoSources` if `urls` is empty
    pub async fn load(&self, urls: &[String], force_reload: bool) -> Result<DescriptorSet, ShapeError> {
        if urls.is_empty() {
            return Err(ShapeError::NoSources);
        }

        let mut quads = Vec::new();
        for url in urls {
            match self.statements(url, force_reload).await {
                Ok(mut statements) => quads.append(&mut statements),
                Err(e) => tracing::warn!(url = %url, error = %e, "Skipping shape document"),
            }
        }

        Ok(discover(&quads))
    }

    /// Drop every cached document
    pub fn reset(&self) {
        self.cache.invalidate_all();
        tracing::debug!("Shape text cache reset");
    }

    /// Underlying cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ShapeTextCache {
        &self.cache
    }
}
