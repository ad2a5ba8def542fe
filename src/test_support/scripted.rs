//! In-memory [`SegmentFetcher`] with scripted bodies, delays and failures.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::download::{DownloadError, SegmentFetcher};
use crate::playlist::SegmentRef;

#[derive(Debug, Clone)]
struct Scripted {
    body: Option<Bytes>,
    delay: Duration,
}

/// Fetcher whose responses are declared up front.
///
/// Unknown segments fail with HTTP 404; segments declared via
/// [`failing`](Self::failing) fail with HTTP 500 after their delay.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    script: HashMap<String, Scripted>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(mut self, name: &str, body: &[u8], delay: Duration) -> Self {
        self.script.insert(
            name.to_string(),
            Scripted {
                body: Some(Bytes::copy_from_slice(body)),
                delay,
            },
        );
        self
    }

    pub fn failing(mut self, name: &str, delay: Duration) -> Self {
        self.script
            .insert(name.to_string(), Scripted { body: None, delay });
        self
    }

    /// Fetches currently between start and return (or cancellation).
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous fetches observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Segment names in the order their fetches started.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SegmentFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        base_url: &str,
        segment: &SegmentRef,
        _chunk_size: usize,
    ) -> Result<Bytes, DownloadError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlightGuard(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(segment.as_str().to_string());

        let url = segment.url_from(base_url);
        let Some(scripted) = self.script.get(segment.as_str()) else {
            return Err(DownloadError::http_status(url, 404));
        };

        tokio::time::sleep(scripted.delay).await;
        scripted
            .body
            .clone()
            .ok_or_else(|| DownloadError::http_status(url, 500))
    }
}
