//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests against the catalog, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for catalog pages (returned as a [`Document`])
//! - GET requests for page images (returned as raw bytes)
//! - Error classification into [`FetchError`]
//!
//! No retries happen here; a failed item is retried by re-running the sync.

use crate::catalog::parser::{extract_entries, extract_page_images, ListingEntry, PageReferences};
use crate::config::FetchConfig;
use crate::{FetchCause, FetchError};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// A fetched catalog page
///
/// Holds the page source rather than a parsed tree so it can move freely
/// between tasks; parsing happens inside the extraction calls.
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    body: String,
}

impl Document {
    /// Wraps page source fetched from `url`
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// The final URL the page was served from
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Extracts the (title, link) entries of the listing container
    pub fn entries(&self, listing_selector: &str) -> Vec<ListingEntry> {
        extract_entries(self, listing_selector)
    }

    /// Extracts the content page images of an issue page
    pub fn page_images(&self) -> PageReferences {
        extract_page_images(self)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use comic_sync::config::FetchConfig;
/// use comic_sync::catalog::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs catalog and image GET requests
///
/// Cloning is cheap: clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Fetches a catalog page
    ///
    /// # Arguments
    ///
    /// * `url` - The page URL
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The page source and its final URL
    /// * `Err(FetchError)` - Invalid URL, transport failure, timeout or non-2xx status
    pub async fn fetch_document(&self, url: &str) -> Result<Document, FetchError> {
        let response = self.get(url).await?;
        let final_url = response.url().clone();

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e))?;

        tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());
        Ok(Document::new(final_url, body))
    }

    /// Fetches a binary resource such as a page image
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        tracing::trace!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }

    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|e| FetchError::new(url, FetchCause::InvalidUrl(e.to_string())))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchCause::Status(status.as_u16())));
        }

        Ok(response)
    }
}

/// Maps a reqwest error onto a [`FetchError`]
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::new(url, FetchCause::Timeout)
    } else if error.is_connect() {
        FetchError::new(url, FetchCause::Transport("Connection refused".to_string()))
    } else {
        FetchError::new(url, FetchCause::Transport(error.to_string()))
    }
}
