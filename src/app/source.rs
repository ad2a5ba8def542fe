//! Where the playlist comes from and which base URL segments resolve against.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use segstitch_core::{HttpClient, stream_base_url};
use tracing::debug;

/// Playlist location given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlaylistSource {
    Remote(String),
    Local(PathBuf),
}

impl PlaylistSource {
    /// `http://` and `https://` sources are fetched, anything else is a path.
    pub(crate) fn classify(raw: &str) -> Self {
        let lowered = raw.trim_start().to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            Self::Remote(raw.trim().to_string())
        } else {
            Self::Local(PathBuf::from(raw))
        }
    }

    /// Reads the playlist document.
    pub(crate) async fn load(&self, client: &HttpClient) -> Result<String> {
        match self {
            Self::Remote(url) => client
                .fetch_text(url)
                .await
                .with_context(|| format!("Failed to fetch playlist '{url}'")),
            Self::Local(path) => {
                debug!(path = %path.display(), "reading local playlist");
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read playlist file '{}'", path.display()))
            }
        }
    }

    /// Picks the base URL: an explicit override, else the playlist URL's directory.
    pub(crate) fn base_url(&self, override_url: Option<&str>) -> Result<String> {
        if let Some(base) = override_url {
            return Ok(base.to_string());
        }
        match self {
            Self::Remote(url) => stream_base_url(url)
                .with_context(|| format!("Cannot derive a base URL from '{url}'; pass --base-url")),
            Self::Local(path) => bail!(
                "--base-url is required when reading the playlist from a local file ('{}')",
                path.display()
            ),
        }
    }
}
