//! Playlist parsing for segmented HTTP streams.
//!
//! A playlist is a newline-delimited manifest. Every non-empty line that does
//! not start with `#` names one segment, relative to the stream's base URL.
//! The order of those lines is the order in which segment bodies must be
//! concatenated into the output file.
//!
//! # Example
//!
//! ```
//! use segstitch_core::playlist::parse_playlist;
//!
//! let playlist = parse_playlist("#EXTM3U\n#EXTINF:2.0,\nseg0.ts\n\nseg1.ts\n");
//! assert_eq!(playlist.len(), 2);
//! assert_eq!(playlist.segments()[1].as_str(), "seg1.ts");
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};
use url::Url;

/// A segment reference exactly as it appears in the playlist.
///
/// The reference is an opaque path or URL fragment; it is appended verbatim
/// to the base URL when the segment is fetched. Cloning is cheap, so lanes can
/// carry their own copy into spawned fetch tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentRef(Arc<str>);

impl SegmentRef {
    /// Creates a segment reference from a playlist line.
    #[must_use]
    pub fn new(reference: impl AsRef<str>) -> Self {
        Self(Arc::from(reference.as_ref()))
    }

    /// Returns the raw reference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the absolute segment URL by plain string concatenation.
    ///
    /// No normalization is applied: `..`, doubled slashes and query strings
    /// pass through untouched.
    #[must_use]
    pub fn url_from(&self, base_url: &str) -> String {
        let mut url = String::with_capacity(base_url.len() + self.0.len());
        url.push_str(base_url);
        url.push_str(&self.0);
        url
    }
}

impl fmt::Display for SegmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered segment references parsed from a playlist document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    segments: Vec<SegmentRef>,
}

impl Playlist {
    /// Returns the segments in playlist order.
    #[must_use]
    pub fn segments(&self) -> &[SegmentRef] {
        &self.segments
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` when the playlist names no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Consumes the playlist, returning the ordered segment list.
    #[must_use]
    pub fn into_segments(self) -> Vec<SegmentRef> {
        self.segments
    }
}

impl FromIterator<SegmentRef> for Playlist {
    fn from_iter<I: IntoIterator<Item = SegmentRef>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

/// Parses a playlist document into ordered segment references.
///
/// A line is a segment reference iff, after trimming surrounding whitespace,
/// it is non-empty and does not start with `#`. Nothing else is validated.
/// A document without usable lines yields an empty playlist rather than an
/// error.
#[instrument(skip(document), fields(document_len = document.len()))]
#[must_use]
pub fn parse_playlist(document: &str) -> Playlist {
    let playlist: Playlist = document
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(SegmentRef::new)
        .collect();

    debug!(segments = playlist.len(), "parsed playlist");
    playlist
}

/// Derives the base URL that segment references are relative to.
///
/// This is the playlist URL up to and including its last `/`, so
/// `https://cdn.example.com/live/123/index.m3u8` yields
/// `https://cdn.example.com/live/123/`. Returns `None` when the input is not
/// an absolute URL with a path.
#[must_use]
pub fn stream_base_url(playlist_url: &str) -> Option<String> {
    let parsed = Url::parse(playlist_url).ok()?;
    if parsed.cannot_be_a_base() {
        return None;
    }
    let cut = playlist_url.rfind('/')?;
    // Reject cuts that land inside the scheme separator ("https://host").
    if cut < parsed.scheme().len() + 3 {
        return None;
    }
    Some(playlist_url[..=cut].to_string())
}
