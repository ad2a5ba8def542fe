//! Segstitch Core Library
//!
//! This library downloads a media stream that is published as a playlist of
//! small HTTP-addressable segments and reassembles the segments, in playlist
//! order, into one contiguous output file.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`playlist`] - Playlist parsing into ordered segment references
//! - [`download`] - HTTP segment fetching with streaming reads
//! - [`pipeline`] - Fixed-lane concurrent fetcher with an in-order writer
//! - [`progress`] - Progress notification sinks

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod pipeline;
pub mod playlist;
pub mod progress;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use download::{
    DEFAULT_FETCH_CHUNK_SIZE, DEFAULT_LANE_COUNT, DownloadError, HttpClient, SegmentFetcher,
};
pub use pipeline::{
    PipelineAborted, PipelineConfig, PipelineError, PipelineStats, SegmentPipeline,
};
pub use playlist::{Playlist, SegmentRef, parse_playlist, stream_base_url};
pub use progress::{LogProgress, NoopProgress, ProgressReporter, human_bytes};
