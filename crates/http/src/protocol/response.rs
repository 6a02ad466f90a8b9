//! Response descriptor produced by a dispatcher handler.

use std::fmt;
use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;
use http::StatusCode;

use crate::protocol::{HeaderFields, PayloadSize};

/// The head of a response: status code plus header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    status: StatusCode,
    fields: HeaderFields,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self { status, fields: HeaderFields::new() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.fields
    }

    pub fn headers_mut(&mut self) -> &mut HeaderFields {
        &mut self.fields
    }

    pub fn into_parts(self) -> (StatusCode, HeaderFields) {
        (self.status, self.fields)
    }
}

/// Where response body bytes come from.
///
/// The connection layer only writes the bytes; whether they were produced in
/// memory, read from a file, or piped out of a CGI process is the
/// dispatcher's business. `Full` bodies are written with `Content-Length`,
/// `Stream` bodies with chunked transfer encoding.
pub enum BodySource {
    /// No body
    Empty,
    /// A complete in-memory body
    Full(Bytes),
    /// A body produced incrementally, length unknown up front
    Stream(BoxStream<'static, io::Result<Bytes>>),
}

impl fmt::Debug for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodySource::Empty => f.write_str("BodySource::Empty"),
            BodySource::Full(bytes) => write!(f, "BodySource::Full({} bytes)", bytes.len()),
            BodySource::Stream(_) => f.write_str("BodySource::Stream"),
        }
    }
}

/// A response as handed back by a handler: status, headers, body source.
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    body: BodySource,
}

impl Response {
    /// An empty-bodied response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self { head: ResponseHead::new(status), body: BodySource::Empty }
    }

    /// A response with a complete in-memory body.
    pub fn full(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { head: ResponseHead::new(status), body: BodySource::Full(body.into()) }
    }

    /// A response streaming its body with chunked transfer encoding.
    pub fn stream(status: StatusCode, body: BoxStream<'static, io::Result<Bytes>>) -> Self {
        Self { head: ResponseHead::new(status), body: BodySource::Stream(body) }
    }

    /// Adds a header field, builder style.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.head.headers_mut().push(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    pub fn headers(&self) -> &HeaderFields {
        self.head.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderFields {
        self.head.headers_mut()
    }

    /// Whether the handler asked for the connection to be closed.
    pub fn connection_close(&self) -> bool {
        self.head.headers().get("connection").is_some_and(|value| value.eq_ignore_ascii_case("close"))
    }

    /// Wire framing implied by the body source.
    pub fn payload_size(&self) -> PayloadSize {
        match &self.body {
            BodySource::Empty => PayloadSize::Empty,
            BodySource::Full(bytes) => PayloadSize::Length(bytes.len() as u64),
            BodySource::Stream(_) => PayloadSize::Chunked,
        }
    }

    pub fn into_parts(self) -> (ResponseHead, BodySource) {
        (self.head, self.body)
    }
}
