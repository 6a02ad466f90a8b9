use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info, warn};

use super::metered::{MeteredReader, MeteredWriter};
use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::ensure;
use crate::handler::Handler;
use crate::limits::Limits;
use crate::metrics::ServerMetrics;
use crate::protocol::{
    BodySource, HttpError, Message, ParseError, PayloadItem, PayloadSize, Request, RequestHead, Response, SendError,
};

const INIT_READ_BUFFER_SIZE: usize = 8 * 1024;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Serves one transport connection through its whole lifecycle.
///
/// Requests are read, dispatched, and answered strictly one at a time;
/// pipelined requests queue in the read buffer and their responses go out
/// in request order. The connection closes after an exchange that settled
/// on close semantics, after `idle_timeout` without request activity, or
/// on the first parse failure.
///
/// On a parse failure the mapped status (400, 413 or 414) is written with
/// `Connection: close` before the connection is torn down; transport-level
/// failures get no response write at all.
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<MeteredReader<R>, RequestDecoder>,
    framed_write: FramedWrite<MeteredWriter<W>, ResponseEncoder>,
    limits: Arc<Limits>,
    metrics: Arc<ServerMetrics>,
    idle_timeout: Duration,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, limits: Arc<Limits>, metrics: Arc<ServerMetrics>) -> Self {
        let framed_read = FramedRead::with_capacity(
            MeteredReader::new(reader, Arc::clone(&metrics)),
            RequestDecoder::new(Arc::clone(&limits)),
            INIT_READ_BUFFER_SIZE,
        );
        let framed_write = FramedWrite::new(MeteredWriter::new(writer, Arc::clone(&metrics)), ResponseEncoder::new());
        Self { framed_read, framed_write, limits, metrics, idle_timeout: DEFAULT_IDLE_TIMEOUT }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Runs the request/response loop until the connection is done.
    ///
    /// Returns `Ok` on an orderly close (peer EOF, close semantics, idle
    /// timeout) and `Err` when the connection died on a protocol or
    /// transport failure.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            let message = match timeout(self.idle_timeout, self.framed_read.next()).await {
                Err(_) => {
                    info!(timeout = ?self.idle_timeout, "closing idle connection");
                    return Ok(());
                }
                Ok(None) => return Ok(()),
                Ok(Some(Err(e))) => {
                    if e.is_io() {
                        return Err(e.into());
                    }
                    warn!(error = %e, status = %e.status(), "rejecting request");
                    self.send_error_response(e.status()).await?;
                    return Err(e.into());
                }
                Ok(Some(Ok(message))) => message,
            };

            match message {
                Message::Header((head, payload_size)) => {
                    if !self.do_process(head, payload_size, &handler).await? {
                        return Ok(());
                    }
                }
                // the decoder only yields payload items between a header and
                // its Eof, and do_process consumes all of them
                Message::Payload(_) => {
                    self.send_error_response(StatusCode::BAD_REQUEST).await?;
                    return Err(ParseError::io(io::Error::other("payload item outside a request body")).into());
                }
            }
        }
    }

    /// Serves one exchange; returns whether the connection stays open.
    async fn do_process<H>(&mut self, head: RequestHead, payload_size: PayloadSize, handler: &Arc<H>) -> Result<bool, HttpError>
    where
        H: Handler,
    {
        let body = match self.aggregate_body(payload_size).await {
            Ok(body) => body,
            Err(e) => {
                if !e.is_io() {
                    warn!(error = %e, status = %e.status(), "rejecting request body");
                    self.send_error_response(e.status()).await?;
                }
                return Err(e.into());
            }
        };

        self.metrics.incr_requests();
        let mut keep_alive = head.keep_alive();

        let mut response = match handler.call(Request::new(head, body)).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "handler failed");
                Response::new(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        keep_alive = keep_alive && !response.connection_close();
        if !keep_alive {
            response.headers_mut().set("Connection", "close");
        }

        self.send_response(response).await?;
        self.metrics.incr_responses();
        Ok(keep_alive)
    }

    /// Reads payload items until `Eof` and reassembles them into one body.
    ///
    /// The running total is capped by `max_body_size`, which catches chunked
    /// bodies whose size no header announced.
    async fn aggregate_body(&mut self, payload_size: PayloadSize) -> Result<Bytes, ParseError> {
        let mut body = match payload_size {
            PayloadSize::Length(length) => BytesMut::with_capacity(length as usize),
            PayloadSize::Chunked | PayloadSize::Empty => BytesMut::new(),
        };

        loop {
            let message = match timeout(self.idle_timeout, self.framed_read.next()).await {
                Err(_) => return Err(ParseError::io(io::Error::from(io::ErrorKind::TimedOut))),
                Ok(None) => return Err(ParseError::io(io::Error::from(io::ErrorKind::UnexpectedEof))),
                Ok(Some(message)) => message?,
            };

            match message {
                Message::Payload(PayloadItem::Chunk(chunk)) => {
                    let total = (body.len() + chunk.len()) as u64;
                    ensure!(
                        total <= self.limits.max_body_size,
                        ParseError::PayloadTooLarge { size: total, max: self.limits.max_body_size }
                    );
                    body.extend_from_slice(&chunk);
                }
                Message::Payload(PayloadItem::Eof) => return Ok(body.freeze()),
                Message::Header(_) => {
                    return Err(ParseError::io(io::Error::other("header item inside a request body")));
                }
            }
        }
    }

    async fn send_response(&mut self, response: Response) -> Result<(), SendError> {
        let payload_size = response.payload_size();
        let (head, body) = response.into_parts();

        match body {
            BodySource::Empty => {
                self.framed_write.feed(Message::Header((head, payload_size))).await?;
                self.framed_write.send(Message::Payload(PayloadItem::Eof)).await?;
            }
            BodySource::Full(bytes) => {
                self.framed_write.feed(Message::Header((head, payload_size))).await?;
                self.framed_write.feed(Message::Payload(PayloadItem::Chunk(bytes))).await?;
                self.framed_write.send(Message::Payload(PayloadItem::Eof)).await?;
            }
            BodySource::Stream(mut stream) => {
                self.framed_write.feed(Message::Header((head, payload_size))).await?;
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(SendError::io)?;
                    self.framed_write.send(Message::Payload(PayloadItem::Chunk(chunk))).await?;
                }
                self.framed_write.send(Message::Payload(PayloadItem::Eof)).await?;
            }
        }

        Ok(())
    }

    async fn send_error_response(&mut self, status: StatusCode) -> Result<(), SendError> {
        let mut response = Response::new(status);
        response.headers_mut().set("Connection", "close");
        self.send_response(response).await
    }
}
