//! HTTP fetching for playlists and stream segments.
//!
//! This module provides the [`SegmentFetcher`] seam that pipeline lanes call
//! and its reqwest-backed implementation, [`HttpClient`].
//!
//! # Features
//!
//! - Streaming body reads accumulated into one buffer per segment
//! - Configurable timeouts (30s connect, 5min read by default)
//! - Structured error types carrying the failing URL
//!
//! # Example
//!
//! ```no_run
//! use segstitch_core::download::{HttpClient, SegmentFetcher, DEFAULT_FETCH_CHUNK_SIZE};
//! use segstitch_core::playlist::SegmentRef;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let body = client
//!     .fetch("https://cdn.example.com/live/", &SegmentRef::new("seg0.ts"), DEFAULT_FETCH_CHUNK_SIZE)
//!     .await?;
//! println!("segment is {} bytes", body.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod fetcher;

pub use client::HttpClient;
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_FETCH_CHUNK_SIZE, DEFAULT_LANE_COUNT, READ_TIMEOUT_SECS,
};
pub use error::DownloadError;
pub use fetcher::SegmentFetcher;

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
