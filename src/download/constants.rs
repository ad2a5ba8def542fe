//! Constants for the download module (timeouts, streaming and lane defaults).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes; a single segment should never take longer).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default granularity for accumulating a streamed segment body (1 MiB).
pub const DEFAULT_FETCH_CHUNK_SIZE: usize = 1 << 20;

/// Default number of concurrent fetch lanes.
pub const DEFAULT_LANE_COUNT: usize = 32;
