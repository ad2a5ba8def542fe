//! The fetch seam used by pipeline lanes.

use async_trait::async_trait;
use bytes::Bytes;

use super::DownloadError;
use crate::playlist::SegmentRef;

/// Retrieves one segment body.
///
/// Implementations fetch `base_url + segment` and return the complete body.
/// Every failure must surface as an `Err`; a lane never writes a buffer whose
/// fetch did not report success.
///
/// The pipeline runs each call inside its own spawned task, so implementors
/// must be shareable across tasks.
#[async_trait]
pub trait SegmentFetcher: Send + Sync + 'static {
    /// Fetches the full body of `segment` relative to `base_url`.
    ///
    /// `chunk_size` is the streaming granularity hint; it must not change the
    /// returned bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] for transport failures and non-success
    /// statuses.
    async fn fetch(
        &self,
        base_url: &str,
        segment: &SegmentRef,
        chunk_size: usize,
    ) -> Result<Bytes, DownloadError>;
}
