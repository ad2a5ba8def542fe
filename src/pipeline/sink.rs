//! The output file the coordinator appends committed segments to.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::PipelineError;

/// Byte destination behind an [`OutputSink`].
#[async_trait]
pub(crate) trait SinkTarget: AsyncWrite + Unpin + Send {
    /// Makes everything written so far durable.
    async fn sync(&mut self) -> io::Result<()>;
}

#[async_trait]
impl SinkTarget for File {
    async fn sync(&mut self) -> io::Result<()> {
        self.sync_all().await
    }
}

/// Exclusively owned, append-only output.
#[derive(Debug)]
pub(crate) struct OutputSink<W = File> {
    path: PathBuf,
    target: W,
    bytes_written: u64,
}

impl OutputSink<File> {
    /// Creates the output file. An existing file is never overwritten.
    pub(crate) async fn open(path: &Path) -> Result<Self, PipelineError> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| PipelineError::sink(path, e))?;
        debug!(path = %path.display(), "opened output file");
        Ok(Self::with_target(path, file))
    }
}

impl<W: SinkTarget> OutputSink<W> {
    pub(crate) fn with_target(path: &Path, target: W) -> Self {
        Self {
            path: path.to_path_buf(),
            target,
            bytes_written: 0,
        }
    }

    /// Appends one whole segment body.
    ///
    /// The write is flushed before returning so a failure is attributed to
    /// this segment and a returned `Ok` means the bytes reached the file.
    pub(crate) async fn append(&mut self, body: &[u8]) -> Result<(), PipelineError> {
        self.target
            .write_all(body)
            .await
            .map_err(|e| PipelineError::sink(&self.path, e))?;
        self.target
            .flush()
            .await
            .map_err(|e| PipelineError::sink(&self.path, e))?;
        self.bytes_written += body.len() as u64;
        Ok(())
    }

    pub(crate) fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes and closes the output.
    pub(crate) async fn finish(mut self) -> Result<(), PipelineError> {
        self.target
            .flush()
            .await
            .map_err(|e| PipelineError::sink(&self.path, e))?;
        self.target
            .sync()
            .await
            .map_err(|e| PipelineError::sink(&self.path, e))?;
        debug!(path = %self.path.display(), bytes = self.bytes_written, "closed output file");
        Ok(())
    }
}
