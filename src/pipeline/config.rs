//! Pipeline configuration.

use crate::download::{DEFAULT_FETCH_CHUNK_SIZE, DEFAULT_LANE_COUNT};

use super::PipelineError;

/// Minimum allowed lane count.
pub const MIN_LANES: usize = 1;

/// Maximum allowed lane count.
pub const MAX_LANES: usize = 256;

/// Concurrency and streaming settings for a [`SegmentPipeline`](super::SegmentPipeline).
///
/// # Default Values
///
/// - `lane_count`: 32
/// - `fetch_chunk_size`: 1 MiB
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    lane_count: usize,
    fetch_chunk_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lane_count: DEFAULT_LANE_COUNT,
            fetch_chunk_size: DEFAULT_FETCH_CHUNK_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidLaneCount`] if `lane_count` is outside
    /// `1..=256`, and [`PipelineError::InvalidChunkSize`] if
    /// `fetch_chunk_size` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use segstitch_core::PipelineConfig;
    ///
    /// let config = PipelineConfig::new(8, 64 * 1024).unwrap();
    /// assert_eq!(config.lane_count(), 8);
    /// assert!(PipelineConfig::new(0, 1024).is_err());
    /// ```
    pub fn new(lane_count: usize, fetch_chunk_size: usize) -> Result<Self, PipelineError> {
        if !(MIN_LANES..=MAX_LANES).contains(&lane_count) {
            return Err(PipelineError::InvalidLaneCount { value: lane_count });
        }
        if fetch_chunk_size == 0 {
            return Err(PipelineError::InvalidChunkSize {
                value: fetch_chunk_size,
            });
        }
        Ok(Self {
            lane_count,
            fetch_chunk_size,
        })
    }

    /// Creates a configuration with the given lane count and the default chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidLaneCount`] if `lane_count` is outside `1..=256`.
    pub fn with_lanes(lane_count: usize) -> Result<Self, PipelineError> {
        Self::new(lane_count, DEFAULT_FETCH_CHUNK_SIZE)
    }

    /// Returns the number of concurrent fetch lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Returns the streaming granularity passed to the fetcher.
    #[must_use]
    pub fn fetch_chunk_size(&self) -> usize {
        self.fetch_chunk_size
    }
}
