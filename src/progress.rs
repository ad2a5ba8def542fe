//! Progress notification sinks for the segment pipeline.
//!
//! The pipeline calls [`ProgressReporter::on_segment_committed`] once per
//! segment, synchronously, right after the segment's bytes have been appended
//! to the output. Calls are therefore sequential and monotonic: `done` grows
//! by exactly one per call and `bytes_written` never decreases.
//!
//! Reporters run on the pipeline's coordinating task and must return quickly.

use tracing::info;

/// Receives per-segment commit notifications.
pub trait ProgressReporter: Send + Sync {
    /// Called after segment number `done` (1-based) of `total` was committed.
    fn on_segment_committed(&self, done: usize, total: usize, bytes_written: u64);
}

/// Reporter that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn on_segment_committed(&self, _done: usize, _total: usize, _bytes_written: u64) {}
}

/// Reporter that emits one `info` event per committed segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn on_segment_committed(&self, done: usize, total: usize, bytes_written: u64) {
        info!(
            done,
            total,
            bytes_written,
            "{done:>8}/{total:>8}\t{}",
            human_bytes(bytes_written)
        );
    }
}

const SIZE_SUFFIXES: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count with binary (1024) steps, e.g. `1.5 MB`.
///
/// At most two decimals are shown and trailing zeros are dropped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn human_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut index = 0;
    while value >= 1024.0 && index < SIZE_SUFFIXES.len() - 1 {
        value /= 1024.0;
        index += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_SUFFIXES[index])
}
