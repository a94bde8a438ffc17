//! URL fetching for URL descriptors

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{MswywError, Result};

/// Default timeout for fetching descriptor URLs
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns a URL into the raw bytes it points at
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Fetches `http`, `https` and `file` URLs
pub struct UrlFetcher {
    client: Client,
}

impl UrlFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MswywError::unresolvable("http client", e))?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MswywError::unresolvable(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(MswywError::unresolvable(
                url.as_str(),
                format!("server answered {}", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MswywError::unresolvable(url.as_str(), e))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl Fetcher for UrlFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        debug!(url = %url, "Fetching descriptor URL");

        match url.scheme() {
            "http" | "https" => self.fetch_http(url).await,
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| MswywError::unresolvable(url.as_str(), "not a local file path"))?;
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| MswywError::unresolvable(url.as_str(), e))
            }
            scheme => Err(MswywError::unresolvable(
                url.as_str(),
                format!("no transport available for {scheme} URLs"),
            )),
        }
    }
}
