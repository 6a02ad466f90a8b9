//! Incremental decoder for the head of an HTTP/1.x request.
//!
//! The decoder is a two-state machine (request line, then header section)
//! that consumes complete CRLF lines from the receive buffer and never
//! assumes a line is present before its terminator is. All configured
//! [`Limits`] are enforced while reading, each mapping to its own
//! [`ParseError`] kind:
//!
//! - request line over `max_request_line_len` → `UriTooLong` (414)
//! - header line over `max_header_line_len` → `HeaderTooLarge` (400)
//! - more than `max_header_count` fields → `TooManyHeaders` (400), raised as
//!   the excess field arrives rather than at section end
//!
//! When the empty line closes the section the decoder validates the Host
//! invariant, decides the body framing from `Content-Length` /
//! `Transfer-Encoding`, emits the head, and resets itself for the next
//! request on the same connection.

use std::mem;
use std::sync::Arc;

use bytes::BytesMut;
use http::{Method, Version};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::line::next_line;
use crate::ensure;
use crate::limits::Limits;
use crate::protocol::{HeaderFields, ParseError, PayloadSize, RequestHead};

/// Decoder for the request line and header section.
#[derive(Debug)]
pub struct HeaderDecoder {
    limits: Arc<Limits>,
    state: State,
}

#[derive(Debug)]
enum State {
    AwaitingRequestLine,
    AwaitingHeaders { method: Method, target: String, version: Version, fields: HeaderFields },
}

impl HeaderDecoder {
    pub fn new(limits: Arc<Limits>) -> Self {
        Self { limits, state: State::AwaitingRequestLine }
    }
}

impl Decoder for HeaderDecoder {
    type Item = (RequestHead, PayloadSize);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match mem::replace(&mut self.state, State::AwaitingRequestLine) {
                State::AwaitingRequestLine => {
                    let line = match next_line(src, self.limits.max_request_line_len) {
                        Ok(Some(line)) => line,
                        Ok(None) => return Ok(None),
                        Err(overflow) => {
                            return Err(ParseError::UriTooLong {
                                len: overflow.len,
                                max: self.limits.max_request_line_len,
                            });
                        }
                    };

                    let (method, target, version) = parse_request_line(&line)?;
                    trace!(%method, target, "parsed request line");
                    self.state = State::AwaitingHeaders { method, target, version, fields: HeaderFields::new() };
                }

                State::AwaitingHeaders { method, target, version, mut fields } => {
                    let line = match next_line(src, self.limits.max_header_line_len) {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            self.state = State::AwaitingHeaders { method, target, version, fields };
                            return Ok(None);
                        }
                        Err(overflow) => {
                            return Err(ParseError::HeaderTooLarge {
                                len: overflow.len,
                                max: self.limits.max_header_line_len,
                            });
                        }
                    };

                    if line.is_empty() {
                        // section complete; the state is already reset for the
                        // next request on a keep-alive connection
                        let head = RequestHead::new(method, target, version, fields);
                        validate_host(&head)?;
                        let payload_size = body_framing(&head, &self.limits)?;
                        trace!(?payload_size, header_count = head.headers().len(), "parsed header section");
                        return Ok(Some((head, payload_size)));
                    }

                    // checked as each field arrives, so withholding the section
                    // terminator cannot smuggle extra headers past the limit
                    ensure!(
                        fields.len() < self.limits.max_header_count,
                        ParseError::TooManyHeaders { max: self.limits.max_header_count }
                    );

                    let (name, value) = parse_field_line(&line)?;
                    fields.push(name, value);
                    self.state = State::AwaitingHeaders { method, target, version, fields };
                }
            }
        }
    }
}

fn parse_request_line(line: &[u8]) -> Result<(Method, String, Version), ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::malformed_request_line("not valid utf-8"))?;

    let mut parts = line.split_ascii_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::malformed_request_line("missing method, target or version"));
    };

    let version = match version {
        "HTTP/1.1" => Version::HTTP_11,
        "HTTP/1.0" => Version::HTTP_10,
        v if v.starts_with("HTTP/") => return Err(ParseError::UnsupportedVersion { version: v.to_string() }),
        _ => return Err(ParseError::malformed_request_line("version is not an HTTP version")),
    };

    let method = Method::from_bytes(method.as_bytes()).map_err(|_| ParseError::malformed_request_line("invalid method token"))?;

    Ok((method, target.to_string(), version))
}

fn parse_field_line(line: &[u8]) -> Result<(String, String), ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::malformed_header_line("not valid utf-8"))?;

    let colon = line.find(':').ok_or_else(|| ParseError::malformed_header_line("missing colon separator"))?;

    let name = line[..colon].trim();
    let value = line[colon + 1..].trim();

    // a name that is not a token means the colon we found belongs to the
    // value of something like `test localhost:8080`
    ensure!(!name.is_empty() && is_token(name), ParseError::malformed_header_line("field name is not a token"));

    Ok((name.to_string(), value.to_string()))
}

fn is_token(name: &str) -> bool {
    name.bytes().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
    })
}

/// Exactly one `Host` header for HTTP/1.1; duplicates are never allowed.
fn validate_host(head: &RequestHead) -> Result<(), ParseError> {
    match head.headers().count("host") {
        0 if head.version() == Version::HTTP_11 => Err(ParseError::MissingHost),
        0 | 1 => Ok(()),
        _ => Err(ParseError::DuplicateHost),
    }
}

/// Decides the body framing from the header section.
///
/// Follows RFC 9112 §6: `Transfer-Encoding` and `Content-Length` together
/// are rejected, and chunked only counts when it is the final encoding. A
/// `Content-Length` beyond `max_body_size` fails here, before any body byte
/// is read or buffered.
fn body_framing(head: &RequestHead, limits: &Limits) -> Result<PayloadSize, ParseError> {
    let te = head.headers().get("transfer-encoding");
    let cl = head.headers().get("content-length");

    match (te, cl) {
        (None, None) => Ok(PayloadSize::Empty),

        (Some(te), None) => {
            if is_chunked(te) {
                Ok(PayloadSize::Chunked)
            } else {
                Ok(PayloadSize::Empty)
            }
        }

        (None, Some(cl)) => {
            let length =
                cl.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {cl} is not u64")))?;

            ensure!(length <= limits.max_body_size, ParseError::PayloadTooLarge { size: length, max: limits.max_body_size });

            if length == 0 { Ok(PayloadSize::Empty) } else { Ok(PayloadSize::Length(length)) }
        }

        (Some(_), Some(_)) => {
            Err(ParseError::invalid_content_length("transfer-encoding and content-length both present in headers"))
        }
    }
}

fn is_chunked(te_value: &str) -> bool {
    te_value.rsplit(',').next().is_some_and(|encoding| encoding.trim().eq_ignore_ascii_case("chunked"))
}
