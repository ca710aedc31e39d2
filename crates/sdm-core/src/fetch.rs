//! Shape fetcher for the CLI: HTTP(S) URLs go over the network, anything
//! else is read from disk

use async_trait::async_trait;
use sdm_shapes::{FetchError, HttpFetcher, ShapeFetcher};

/// Routes `http://` / `https://` sources to [`HttpFetcher`], the rest to the
/// filesystem (`file://` prefix optional)
#[derive(Debug, Clone, Default)]
pub struct LocalOrRemoteFetcher {
    http: HttpFetcher,
}

impl LocalOrRemoteFetcher {
    /// Create fetcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[async_trait]
impl ShapeFetcher for LocalOrRemoteFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if is_remote(url) {
            return self.http.fetch(url).await;
        }
        let path = url.strip_prefix("file://").unwrap_or(url);
        tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(url.to_string()),
            _ => FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            },
        })
    }
}
