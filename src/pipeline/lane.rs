//! A single fetch lane.
//!
//! A lane holds at most one in-flight fetch and at most one completed body.
//! Its [`LaneState`] is the only thing the coordinator consults to decide
//! whether the lane has something to commit; a lane that has been drained is
//! `Empty` and draining it again yields nothing.

use std::mem;
use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug_span, trace};

use super::PipelineError;
use crate::download::{DownloadError, SegmentFetcher};
use crate::playlist::SegmentRef;

type FetchHandle = JoinHandle<Result<Bytes, DownloadError>>;

/// Why a lane's fetch produced no body.
#[derive(Debug)]
pub(crate) enum LaneFailure {
    /// The fetcher returned an error.
    Fetch(DownloadError),
    /// The task panicked or was cancelled before returning.
    Task(String),
}

impl LaneFailure {
    pub(crate) fn into_pipeline_error(self, index: usize, segment: SegmentRef) -> PipelineError {
        match self {
            Self::Fetch(source) => PipelineError::Fetch {
                index,
                segment,
                source,
            },
            Self::Task(reason) => PipelineError::LaneTask {
                index,
                segment,
                reason,
            },
        }
    }
}

/// Lifecycle of a lane: `Empty -> Fetching -> Ready | Failed -> Empty`.
#[derive(Debug)]
pub(crate) enum LaneState {
    Empty,
    Fetching {
        index: usize,
        segment: SegmentRef,
        handle: FetchHandle,
    },
    Ready {
        index: usize,
        segment: SegmentRef,
        body: Bytes,
    },
    Failed {
        index: usize,
        segment: SegmentRef,
        failure: LaneFailure,
    },
}

impl LaneState {
    /// Playlist index of the segment held in this state, if any.
    pub(crate) fn index(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Fetching { index, .. } | Self::Ready { index, .. } | Self::Failed { index, .. } => {
                Some(*index)
            }
        }
    }
}

/// One concurrency slot of the pipeline.
#[derive(Debug)]
pub(crate) struct Lane {
    id: usize,
    state: LaneState,
}

impl Lane {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            state: LaneState::Empty,
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Playlist index of the segment this lane holds, if any.
    pub(crate) fn occupant(&self) -> Option<usize> {
        self.state.index()
    }

    /// Starts fetching `segment` on this lane.
    ///
    /// Only called on an `Empty` lane; the coordinator refills a lane strictly
    /// after draining it.
    pub(crate) fn assign(
        &mut self,
        index: usize,
        segment: SegmentRef,
        fetcher: &Arc<dyn SegmentFetcher>,
        base_url: &Arc<str>,
        chunk_size: usize,
    ) {
        debug_assert!(
            matches!(self.state, LaneState::Empty),
            "lane {} assigned while occupied",
            self.id
        );
        trace!(lane = self.id, index, %segment, "assigning segment");

        let fetcher = Arc::clone(fetcher);
        let base_url = Arc::clone(base_url);
        let task_segment = segment.clone();
        let span = debug_span!("fetch", lane = self.id, index, segment = %segment);
        let handle = tokio::spawn(
            async move { fetcher.fetch(&base_url, &task_segment, chunk_size).await }
                .instrument(span),
        );

        self.state = LaneState::Fetching {
            index,
            segment,
            handle,
        };
    }

    /// Waits until an in-flight fetch finishes, moving to `Ready` or `Failed`.
    ///
    /// Returns immediately for any other state.
    pub(crate) async fn settle(&mut self) {
        let LaneState::Fetching {
            index,
            segment,
            handle,
        } = &mut self.state
        else {
            return;
        };

        let joined = handle.await;
        let index = *index;
        let segment = segment.clone();

        self.state = match joined {
            Ok(Ok(body)) => LaneState::Ready {
                index,
                segment,
                body,
            },
            Ok(Err(error)) => LaneState::Failed {
                index,
                segment,
                failure: LaneFailure::Fetch(error),
            },
            Err(join_error) => {
                let reason = if join_error.is_panic() {
                    "fetch task panicked".to_string()
                } else {
                    "fetch task was cancelled".to_string()
                };
                LaneState::Failed {
                    index,
                    segment,
                    failure: LaneFailure::Task(reason),
                }
            }
        };
    }

    /// Moves the settled result out, leaving the lane `Empty`.
    ///
    /// A lane that is still `Fetching` is left untouched and `Empty` is
    /// returned; call [`settle`](Self::settle) first.
    pub(crate) fn take(&mut self) -> LaneState {
        if matches!(self.state, LaneState::Fetching { .. }) {
            return LaneState::Empty;
        }
        mem::replace(&mut self.state, LaneState::Empty)
    }

    /// Cancels any in-flight fetch and drops any held buffer.
    pub(crate) async fn discard(&mut self) {
        if let LaneState::Fetching { handle, .. } = &mut self.state {
            handle.abort();
            // Wait for the task to wind down so nothing outlives the run.
            let _ = handle.await;
        }
        self.state = LaneState::Empty;
    }
}

impl Drop for Lane {
    fn drop(&mut self) {
        // A dropped JoinHandle detaches its task; abort so no fetch outlives the lane.
        if let LaneState::Fetching { handle, .. } = &self.state {
            handle.abort();
        }
    }
}
