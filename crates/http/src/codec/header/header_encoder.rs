//! Encoder for the status line and header section of a response.

use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::StatusCode;
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadSize, ResponseHead, SendError};

const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for the response head.
///
/// The framing header is derived from the response's [`PayloadSize`], never
/// taken from what the handler set, so the head on the wire always agrees
/// with the body that follows it.
#[derive(Debug)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, payload_size) = item;
        let (status, mut fields) = head.into_parts();

        dst.reserve(INIT_HEADER_SIZE);

        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status.as_str(), reason_phrase(status)).map_err(SendError::io)?;

        match payload_size {
            PayloadSize::Length(length) => fields.set("Content-Length", length.to_string()),
            PayloadSize::Chunked => fields.set("Transfer-Encoding", "chunked"),
            PayloadSize::Empty => fields.set("Content-Length", "0"),
        }

        for (name, value) in fields.iter() {
            dst.extend_from_slice(name.as_bytes());
            dst.extend_from_slice(b": ");
            dst.extend_from_slice(value.as_bytes());
            dst.extend_from_slice(b"\r\n");
        }
        dst.extend_from_slice(b"\r\n");

        Ok(())
    }
}

/// Reason phrase sent on the status line.
///
/// Two phrases deliberately differ from the ones the `http` crate carries:
/// clients of this server match on "Request URI Too Long" and "Payload Too
/// Large" verbatim.
fn reason_phrase(status: StatusCode) -> &'static str {
    match status {
        StatusCode::URI_TOO_LONG => "Request URI Too Long",
        StatusCode::PAYLOAD_TOO_LARGE => "Payload Too Large",
        _ => status.canonical_reason().unwrap_or("Unknown"),
    }
}

struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Response;

    fn encode(response: Response, payload_size: PayloadSize) -> String {
        let (head, _) = response.into_parts();
        let mut buffer = BytesMut::new();
        HeaderEncoder.encode((head, payload_size), &mut buffer).unwrap();
        String::from_utf8(buffer.to_vec()).unwrap()
    }

    #[test]
    fn writes_status_line_and_framing_header() {
        let encoded = encode(Response::new(StatusCode::OK), PayloadSize::Length(13));
        assert!(encoded.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(encoded.contains("Content-Length: 13\r\n"));
        assert!(encoded.ends_with("\r\n\r\n"));
    }

    #[test]
    fn empty_payload_gets_explicit_zero_length() {
        let encoded = encode(Response::new(StatusCode::NO_CONTENT), PayloadSize::Empty);
        assert!(encoded.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn chunked_payload_gets_transfer_encoding() {
        let encoded = encode(Response::new(StatusCode::OK), PayloadSize::Chunked);
        assert!(encoded.contains("Transfer-Encoding: chunked\r\n"));
        assert!(!encoded.contains("Content-Length"));
    }

    #[test]
    fn bad_request_status_line_is_exact() {
        let encoded = encode(Response::new(StatusCode::BAD_REQUEST), PayloadSize::Empty);
        assert!(encoded.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn overridden_reason_phrases_are_exact() {
        let encoded = encode(Response::new(StatusCode::URI_TOO_LONG), PayloadSize::Empty);
        assert!(encoded.starts_with("HTTP/1.1 414 Request URI Too Long\r\n"));

        let encoded = encode(Response::new(StatusCode::PAYLOAD_TOO_LARGE), PayloadSize::Empty);
        assert!(encoded.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
    }

    #[test]
    fn handler_headers_are_written_in_insertion_order() {
        let response = Response::new(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .header("X-Request-Id", "7");
        let encoded = encode(response, PayloadSize::Empty);

        let content_type = encoded.find("Content-Type: text/plain\r\n").unwrap();
        let request_id = encoded.find("X-Request-Id: 7\r\n").unwrap();
        assert!(content_type < request_id);
    }
}
