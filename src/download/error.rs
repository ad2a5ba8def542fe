//! Error types for the download module.
//!
//! A [`DownloadError`] is the underlying cause carried by a failed segment
//! fetch. The pipeline wraps it with the segment index and reference before
//! aborting.

use thiserror::Error;

/// Errors that can occur while fetching a playlist or a segment.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors,
    /// connection reset while streaming the body, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    ///
    /// Timeouts reported by reqwest are mapped to [`DownloadError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the URL the failed request was made against.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::HttpStatus { url, .. }
            | Self::InvalidUrl { url } => url,
        }
    }

    /// Returns the HTTP status code when the failure was a status response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// No `From<reqwest::Error>`: every variant needs the URL, which the source
// error does not reliably carry. Use the constructors above.
