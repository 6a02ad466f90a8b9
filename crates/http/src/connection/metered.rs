//! IO wrappers feeding the byte counters of [`ServerMetrics`].
//!
//! Counting at the transport edge rather than in the codecs means every
//! byte on the wire is counted once, framing overhead included.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::metrics::ServerMetrics;

pin_project! {
    /// Counts every byte read off the transport into `bytes_received`.
    #[derive(Debug)]
    pub struct MeteredReader<R> {
        #[pin]
        inner: R,
        metrics: Arc<ServerMetrics>,
    }
}

impl<R> MeteredReader<R> {
    pub fn new(inner: R, metrics: Arc<ServerMetrics>) -> Self {
        Self { inner, metrics }
    }
}

impl<R: AsyncRead> AsyncRead for MeteredReader<R> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = self.project();
        let before = buf.filled().len();
        let poll = this.inner.poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            this.metrics.add_bytes_received((buf.filled().len() - before) as u64);
        }
        poll
    }
}

pin_project! {
    /// Counts every byte written to the transport into `bytes_send`.
    #[derive(Debug)]
    pub struct MeteredWriter<W> {
        #[pin]
        inner: W,
        metrics: Arc<ServerMetrics>,
    }
}

impl<W> MeteredWriter<W> {
    pub fn new(inner: W, metrics: Arc<ServerMetrics>) -> Self {
        Self { inner, metrics }
    }
}

impl<W: AsyncWrite> AsyncWrite for MeteredWriter<W> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.project();
        let poll = this.inner.poll_write(cx, buf);
        if let Poll::Ready(Ok(written)) = &poll {
            this.metrics.add_bytes_send(*written as u64);
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }
}
