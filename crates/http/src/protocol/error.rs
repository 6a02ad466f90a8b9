use std::io;

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// A request parsing or validation failure.
///
/// Every variant except `Io` maps deterministically to one HTTP status code
/// via [`ParseError::status`]; `Io` is a transport failure on which no
/// response is written at all.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("request line length {len} exceeds the limit {max}")]
    UriTooLong { len: usize, max: usize },

    #[error("header count exceeds the limit {max}")]
    TooManyHeaders { max: usize },

    #[error("header line length {len} exceeds the limit {max}")]
    HeaderTooLarge { len: usize, max: usize },

    #[error("http/1.1 request without a host header")]
    MissingHost,

    #[error("request carries more than one host header")]
    DuplicateHost,

    #[error("malformed request line: {reason}")]
    MalformedRequestLine { reason: String },

    #[error("malformed header line: {reason}")]
    MalformedHeaderLine { reason: String },

    #[error("malformed chunk: {reason}")]
    MalformedChunk { reason: String },

    #[error("declared body size {size} exceeds the limit {max}")]
    PayloadTooLarge { size: u64, max: u64 },

    #[error("unsupported http version: {version}")]
    UnsupportedVersion { version: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line<S: ToString>(reason: S) -> Self {
        Self::MalformedRequestLine { reason: reason.to_string() }
    }

    pub fn malformed_header_line<S: ToString>(reason: S) -> Self {
        Self::MalformedHeaderLine { reason: reason.to_string() }
    }

    pub fn malformed_chunk<S: ToString>(reason: S) -> Self {
        Self::MalformedChunk { reason: reason.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status code written back for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UriTooLong { .. } => StatusCode::URI_TOO_LONG,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Transport-level failures get no response write attempt.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(reason: S) -> Self {
        Self::InvalidBody { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
