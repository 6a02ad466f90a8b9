use bytes::BytesMut;
use tokio_util::codec::Encoder;

use super::body::PayloadEncoder;
use super::header::HeaderEncoder;
use crate::protocol::{Message, PayloadSize, ResponseHead, SendError};

/// Two-phase encoder for a full response: head first, then body items.
///
/// Mirrors the request decoder: encoding a head installs the matching body
/// encoder, and encoding `Eof` retires it so the next response can start.
#[derive(Debug)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Self { header_encoder: HeaderEncoder, payload_encoder: None }
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<Message<(ResponseHead, PayloadSize)>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(ResponseHead, PayloadSize)>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, payload_size)) => {
                if self.payload_encoder.is_some() {
                    return Err(SendError::invalid_body("header sent while a body is still open"));
                }
                self.header_encoder.encode((head, payload_size), dst)?;
                self.payload_encoder = Some(PayloadEncoder::from(payload_size));
                Ok(())
            }

            Message::Payload(item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    return Err(SendError::invalid_body("payload sent before a header"));
                };
                payload_encoder.encode(item, dst)?;
                if payload_encoder.is_finished() {
                    self.payload_encoder = None;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PayloadItem;
    use bytes::Bytes;
    use http::StatusCode;

    fn head(status: StatusCode) -> ResponseHead {
        ResponseHead::new(status)
    }

    #[test]
    fn encodes_a_complete_response() {
        let mut encoder = ResponseEncoder::new();
        let mut buffer = BytesMut::new();

        encoder.encode(Message::Header((head(StatusCode::OK), PayloadSize::Length(13))), &mut buffer).unwrap();
        encoder.encode(Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"Hello, World!"))), &mut buffer).unwrap();
        encoder.encode(Message::Payload(PayloadItem::Eof), &mut buffer).unwrap();

        let wire = String::from_utf8(buffer.to_vec()).unwrap();
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("Content-Length: 13\r\n"));
        assert!(wire.ends_with("\r\n\r\nHello, World!"));
    }

    #[test]
    fn back_to_back_responses_are_allowed_after_eof() {
        let mut encoder = ResponseEncoder::new();
        let mut buffer = BytesMut::new();

        encoder.encode(Message::Header((head(StatusCode::OK), PayloadSize::Empty)), &mut buffer).unwrap();
        encoder.encode(Message::Payload(PayloadItem::Eof), &mut buffer).unwrap();
        encoder.encode(Message::Header((head(StatusCode::NOT_FOUND), PayloadSize::Empty)), &mut buffer).unwrap();

        let wire = String::from_utf8(buffer.to_vec()).unwrap();
        assert!(wire.contains("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn interleaving_heads_is_rejected() {
        let mut encoder = ResponseEncoder::new();
        let mut buffer = BytesMut::new();

        encoder.encode(Message::Header((head(StatusCode::OK), PayloadSize::Length(2))), &mut buffer).unwrap();
        let err = encoder.encode(Message::Header((head(StatusCode::OK), PayloadSize::Empty)), &mut buffer).unwrap_err();
        assert!(matches!(err, SendError::InvalidBody { .. }));
    }
}
