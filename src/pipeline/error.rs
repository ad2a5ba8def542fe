//! Error types for the segment pipeline.

use std::path::PathBuf;

use thiserror::Error;

use super::config::{MAX_LANES, MIN_LANES};
use super::PipelineStats;
use crate::download::DownloadError;
use crate::playlist::SegmentRef;

/// Reasons a pipeline refuses to start or aborts part-way.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid lane count provided.
    #[error("invalid lane count {value}: must be between {MIN_LANES} and {MAX_LANES}")]
    InvalidLaneCount {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Invalid fetch chunk size provided.
    #[error("invalid fetch chunk size {value}: must be greater than zero")]
    InvalidChunkSize {
        /// The invalid value that was provided.
        value: usize,
    },

    /// A segment fetch reported failure.
    #[error("segment {index} ({segment}) failed: {source}")]
    Fetch {
        /// Playlist position of the failed segment.
        index: usize,
        /// The failed segment reference.
        segment: SegmentRef,
        /// Transport or status cause.
        #[source]
        source: DownloadError,
    },

    /// A fetch task ended without producing a result (panic or cancellation).
    #[error("segment {index} ({segment}) fetch task ended abnormally: {reason}")]
    LaneTask {
        /// Playlist position of the affected segment.
        index: usize,
        /// The affected segment reference.
        segment: SegmentRef,
        /// Why the task produced no result.
        reason: String,
    },

    /// The lane due for the next commit did not hold that segment.
    #[error("lane {lane} is out of step: expected segment {expected}, found {found:?}")]
    LaneOutOfStep {
        /// Lane index.
        lane: usize,
        /// Segment index the commit cursor expected.
        expected: usize,
        /// Segment index the lane actually held, if any.
        found: Option<usize>,
    },

    /// The output file could not be opened, written or flushed.
    #[error("IO error writing to {path}: {source}")]
    Sink {
        /// Output file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An interrupt was requested before the next commit.
    #[error("interrupted before segment {index} was committed")]
    Interrupted {
        /// Index of the first segment that was not committed.
        index: usize,
    },
}

impl PipelineError {
    /// Creates a sink error.
    pub fn sink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Sink {
            path: path.into(),
            source,
        }
    }

    /// Returns the index and reference of the segment that caused the abort,
    /// when the abort was caused by a specific segment.
    #[must_use]
    pub fn failed_segment(&self) -> Option<(usize, &SegmentRef)> {
        match self {
            Self::Fetch { index, segment, .. } | Self::LaneTask { index, segment, .. } => {
                Some((*index, segment))
            }
            _ => None,
        }
    }
}

/// Terminal `Aborted` state of a pipeline run.
///
/// `stats` describes exactly what was committed: segments `0..committed`
/// in order, and nothing else. The output file is partial.
#[derive(Debug, Error)]
#[error(
    "pipeline aborted after {} of {} segments: {error}",
    .stats.segments_committed(),
    .stats.total_segments()
)]
pub struct PipelineAborted {
    /// Progress committed before the abort.
    pub stats: PipelineStats,
    /// The triggering cause.
    #[source]
    pub error: PipelineError,
}
