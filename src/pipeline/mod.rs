//! Segment pipeline: concurrent fetch lanes feeding one in-order writer.
//!
//! The pipeline owns `N` lanes. Segment `k` is always fetched on lane
//! `k mod N`, and a lane only receives new work right after its previous
//! result has been written. A single coordinator walks the commit cursor
//! through the playlist, waiting on exactly the lane that holds the next
//! segment, so the output is the playlist-order concatenation of segment
//! bodies no matter in which order the fetches finish.
//!
//! # Concurrency Model
//!
//! - Each fetch runs in its own Tokio task and hands its body back through
//!   the task's `JoinHandle` (one producer, one consumer)
//! - At most `N` fetches are in flight; memory held by fetched-but-unwritten
//!   bodies is bounded by `N × largest segment`
//! - Only the coordinator touches the output file and the cursors
//!
//! # Failure Behavior
//!
//! - A failed fetch aborts the whole run; no retry, no salvage of the failed
//!   segment, and nothing from it or later segments is written
//! - Output errors abort the run as well
//! - On abort, in-flight fetches are cancelled and the committed prefix is
//!   flushed; the caller receives [`PipelineAborted`]
//! - An interrupt stops the wait on the next-in-order lane immediately; the
//!   segment being awaited is discarded, never partially written
//! - Dropping the `run` future cancels every in-flight fetch
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use segstitch_core::{
//!     HttpClient, LogProgress, PipelineConfig, SegmentPipeline, parse_playlist,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let document = client.fetch_text("https://cdn.example.com/live/index.m3u8").await?;
//! let playlist = parse_playlist(&document);
//!
//! let pipeline = SegmentPipeline::new(Arc::new(client), PipelineConfig::with_lanes(8)?);
//! let stats = pipeline
//!     .run(
//!         "https://cdn.example.com/live/",
//!         playlist.segments(),
//!         Path::new("record.ts"),
//!         &LogProgress,
//!     )
//!     .await?;
//! println!("wrote {} bytes", stats.bytes_written());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod lane;
pub(crate) mod sink;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

pub use config::{MAX_LANES, MIN_LANES, PipelineConfig};
pub use error::{PipelineAborted, PipelineError};

use self::lane::{Lane, LaneState};
use self::sink::{OutputSink, SinkTarget};
use crate::download::SegmentFetcher;
use crate::playlist::SegmentRef;
use crate::progress::ProgressReporter;

/// Summary of a pipeline run, complete or aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    total_segments: usize,
    segments_committed: usize,
    bytes_written: u64,
    elapsed: Duration,
}

impl PipelineStats {
    /// Creates a stats snapshot.
    #[must_use]
    pub fn new(
        total_segments: usize,
        segments_committed: usize,
        bytes_written: u64,
        elapsed: Duration,
    ) -> Self {
        Self {
            total_segments,
            segments_committed,
            bytes_written,
            elapsed,
        }
    }

    /// Returns the number of segments in the playlist.
    #[must_use]
    pub fn total_segments(&self) -> usize {
        self.total_segments
    }

    /// Returns the number of segments written to the output, in order.
    #[must_use]
    pub fn segments_committed(&self) -> usize {
        self.segments_committed
    }

    /// Returns the number of bytes written to the output.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Returns the wall-clock duration of the run.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns `true` when every segment was committed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.segments_committed == self.total_segments
    }
}

/// Fixed-lane segment downloader with an in-order writer.
///
/// A pipeline can be reused for several runs; each run owns its lanes and
/// output file for its whole duration.
pub struct SegmentPipeline {
    fetcher: Arc<dyn SegmentFetcher>,
    config: PipelineConfig,
    interrupt: Option<CancellationToken>,
}

impl std::fmt::Debug for SegmentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentPipeline")
            .field("config", &self.config)
            .field("interruptible", &self.interrupt.is_some())
            .finish_non_exhaustive()
    }
}

impl SegmentPipeline {
    /// Creates a pipeline that fetches through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn SegmentFetcher>, config: PipelineConfig) -> Self {
        debug!(
            lanes = config.lane_count(),
            chunk_size = config.fetch_chunk_size(),
            "creating segment pipeline"
        );
        Self {
            fetcher,
            config,
            interrupt: None,
        }
    }

    /// Makes runs stop once `token` is cancelled.
    ///
    /// Cancellation is observed between commits and while waiting for the
    /// next-in-order segment, so a segment is never partially written. The
    /// run then ends with [`PipelineError::Interrupted`].
    #[must_use]
    pub fn with_interrupt(mut self, token: CancellationToken) -> Self {
        self.interrupt = Some(token);
        self
    }

    /// Returns the pipeline configuration.
    #[must_use]
    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Downloads `segments` relative to `base_url` and writes their bodies,
    /// in order, to `output`.
    ///
    /// `progress` is notified once per committed segment with
    /// `(committed, total, bytes_written)`. An empty segment list creates an
    /// empty output file and completes immediately. `output` must not exist
    /// yet; an existing file is left untouched and the run aborts with
    /// [`PipelineError::Sink`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineAborted`] when a fetch fails, the output cannot be
    /// written, or an interrupt was requested. Its stats describe the
    /// committed prefix left in `output`.
    #[instrument(
        skip(self, segments, output, progress),
        fields(output = %output.display(), segments = segments.len(), lanes = self.config.lane_count())
    )]
    pub async fn run(
        &self,
        base_url: &str,
        segments: &[SegmentRef],
        output: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineStats, PipelineAborted> {
        let started = Instant::now();
        let total = segments.len();

        info!(
            total,
            lanes = self.config.lane_count(),
            "starting segment download"
        );

        let sink = match OutputSink::open(output).await {
            Ok(sink) => sink,
            Err(error) => {
                return Err(PipelineAborted {
                    stats: PipelineStats::new(total, 0, 0, started.elapsed()),
                    error,
                });
            }
        };

        self.drive(sink, base_url, segments, progress, started).await
    }

    /// Runs the lanes against an already opened sink.
    async fn drive<W: SinkTarget>(
        &self,
        mut sink: OutputSink<W>,
        base_url: &str,
        segments: &[SegmentRef],
        progress: &dyn ProgressReporter,
        started: Instant,
    ) -> Result<PipelineStats, PipelineAborted> {
        let total = segments.len();
        let lane_count = self.config.lane_count();
        let chunk_size = self.config.fetch_chunk_size();

        let base_url: Arc<str> = Arc::from(base_url);
        let mut lanes: Vec<Lane> = (0..lane_count).map(Lane::new).collect();

        let mut next_assign = 0;
        for lane in lanes.iter_mut().take(total) {
            lane.assign(
                next_assign,
                segments[next_assign].clone(),
                &self.fetcher,
                &base_url,
                chunk_size,
            );
            next_assign += 1;
        }

        let mut next_commit = 0;
        let outcome = loop {
            if next_commit == total {
                break Ok(());
            }
            if self.interrupted() {
                break Err(PipelineError::Interrupted { index: next_commit });
            }

            let lane = &mut lanes[next_commit % lane_count];
            if let Some(token) = &self.interrupt {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        break Err(PipelineError::Interrupted { index: next_commit });
                    }
                    () = lane.settle() => {}
                }
            } else {
                lane.settle().await;
            }

            match lane.take() {
                LaneState::Ready {
                    index,
                    segment,
                    body,
                } if index == next_commit => {
                    if let Err(error) = sink.append(&body).await {
                        break Err(error);
                    }
                    next_commit += 1;
                    trace!(index, %segment, bytes = body.len(), "segment committed");
                    progress.on_segment_committed(next_commit, total, sink.bytes_written());
                }
                LaneState::Failed {
                    index,
                    segment,
                    failure,
                } if index == next_commit => {
                    break Err(failure.into_pipeline_error(index, segment));
                }
                other => {
                    break Err(PipelineError::LaneOutOfStep {
                        lane: lane.id(),
                        expected: next_commit,
                        found: other.index(),
                    });
                }
            }

            if next_assign < total {
                lane.assign(
                    next_assign,
                    segments[next_assign].clone(),
                    &self.fetcher,
                    &base_url,
                    chunk_size,
                );
                next_assign += 1;
            }
        };

        let snapshot = |sink: &OutputSink<W>| {
            PipelineStats::new(total, next_commit, sink.bytes_written(), started.elapsed())
        };

        match outcome {
            Ok(()) => {
                let stats = snapshot(&sink);
                if let Err(error) = sink.finish().await {
                    return Err(PipelineAborted { stats, error });
                }
                info!(
                    segments = stats.segments_committed(),
                    bytes = stats.bytes_written(),
                    elapsed_ms = stats.elapsed().as_millis(),
                    "segment download complete"
                );
                Ok(stats)
            }
            Err(error) => {
                warn!(
                    committed = next_commit,
                    total,
                    error = %error,
                    "aborting segment download"
                );
                for lane in &mut lanes {
                    if let Some(index) = lane.occupant() {
                        debug!(lane = lane.id(), index, "discarding lane");
                    }
                    lane.discard().await;
                }
                let stats = snapshot(&sink);
                if let Err(close_error) = sink.finish().await {
                    warn!(error = %close_error, "failed to flush partial output");
                }
                Err(PipelineAborted { stats, error })
            }
        }
    }
}
