//! HTTP client wrapper for fetching playlists and segments.
//!
//! This module provides the `HttpClient` struct which handles streaming
//! segment reads with proper timeout configuration and error handling.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{debug, instrument, trace};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::fetcher::SegmentFetcher;
use crate::playlist::SegmentRef;
use crate::user_agent;

/// HTTP client for playlist and segment retrieval.
///
/// This client is designed to be created once and shared by every fetch lane,
/// taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use segstitch_core::download::HttpClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let document = client.fetch_text("https://cdn.example.com/live/index.m3u8").await?;
/// println!("{} bytes of playlist", document.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = build_client(connect_timeout_secs, read_timeout_secs)
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches a text document, typically the playlist itself.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if the URL is invalid, the request fails, the
    /// server answers with a non-success status, or the body cannot be read.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
        let response = self.send_get(url).await?;
        let text = response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        debug!(bytes = text.len(), "fetched text document");
        Ok(text)
    }

    /// Fetches one URL, accumulating the streamed body in memory.
    ///
    /// `chunk_size` is the growth step used when the body buffer runs out of
    /// room; it has no effect on the returned bytes.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` on invalid URLs, transport errors (including
    /// errors part-way through the body) and non-success statuses.
    pub async fn fetch_bytes(&self, url: &str, chunk_size: usize) -> Result<Bytes, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
        let response = self.send_get(url).await?;
        read_body(response, url, chunk_size.max(1)).await
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        trace!("requesting");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl SegmentFetcher for HttpClient {
    #[instrument(skip_all, fields(segment = %segment))]
    async fn fetch(
        &self,
        base_url: &str,
        segment: &SegmentRef,
        chunk_size: usize,
    ) -> Result<Bytes, DownloadError> {
        let url = segment.url_from(base_url);
        let body = self.fetch_bytes(&url, chunk_size).await?;
        debug!(bytes = body.len(), "segment fetched");
        Ok(body)
    }
}

/// Streams a response body into one contiguous buffer.
async fn read_body(
    response: reqwest::Response,
    url: &str,
    chunk_size: usize,
) -> Result<Bytes, DownloadError> {
    let initial = response
        .content_length()
        .and_then(|len| usize::try_from(len).ok())
        .map_or(chunk_size, |len| len.min(chunk_size));
    let mut body = BytesMut::with_capacity(initial);
    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;
        if body.capacity() - body.len() < chunk.len() {
            body.reserve(chunk.len().max(chunk_size));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}

fn build_client(connect_timeout_secs: u64, read_timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
}
