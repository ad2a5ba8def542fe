//! In-memory output that runs out of space.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::pipeline::sink::SinkTarget;

/// Accepts writes until `capacity` bytes are held, then fails every write
/// that does not fit, like a full disk.
#[derive(Debug, Default)]
pub struct FailingWriter {
    capacity: usize,
    held: Vec<u8>,
}

impl FailingWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            held: Vec::new(),
        }
    }

    /// Bytes accepted so far.
    pub fn held(&self) -> &[u8] {
        &self.held
    }
}

impl AsyncWrite for FailingWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.held.len() + buf.len() > this.capacity {
            return Poll::Ready(Err(io::Error::other("no space left on device")));
        }
        this.held.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[async_trait]
impl SinkTarget for FailingWriter {
    async fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}
