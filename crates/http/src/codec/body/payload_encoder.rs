use bytes::BytesMut;
use tokio_util::codec::Encoder;

use super::chunked_encoder::ChunkedEncoder;
use super::length_encoder::LengthEncoder;
use crate::protocol::{PayloadItem, PayloadSize, SendError};

/// Body encoder selected by the framing written in the response head.
///
/// Tracks whether `Eof` has been encoded so the connection can tell when
/// the response is complete and the next one may start.
#[derive(Debug)]
pub struct PayloadEncoder {
    kind: Kind,
    finished: bool,
}

#[derive(Debug)]
enum Kind {
    Length(LengthEncoder),
    Chunked(ChunkedEncoder),
    NoBody,
}

impl PayloadEncoder {
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl From<PayloadSize> for PayloadEncoder {
    fn from(payload_size: PayloadSize) -> Self {
        let kind = match payload_size {
            PayloadSize::Length(_) => Kind::Length(LengthEncoder),
            PayloadSize::Chunked => Kind::Chunked(ChunkedEncoder),
            PayloadSize::Empty => Kind::NoBody,
        };
        Self { kind, finished: false }
    }
}

impl Encoder<PayloadItem> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.is_eof() {
            self.finished = true;
        }
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode(item, dst),
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::NoBody => {
                // only Eof is legal without body framing
                if item.is_chunk() {
                    return Err(SendError::invalid_body("chunk sent for a response declared empty"));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn eof_marks_the_encoder_finished() {
        let mut encoder = PayloadEncoder::from(PayloadSize::Length(2));
        let mut buffer = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"ok")), &mut buffer).unwrap();
        assert!(!encoder.is_finished());

        encoder.encode(PayloadItem::Eof, &mut buffer).unwrap();
        assert!(encoder.is_finished());
        assert_eq!(&buffer[..], b"ok");
    }

    #[test]
    fn chunk_after_empty_declaration_is_an_error() {
        let mut encoder = PayloadEncoder::from(PayloadSize::Empty);
        let mut buffer = BytesMut::new();
        let err = encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"x")), &mut buffer).unwrap_err();
        assert!(matches!(err, SendError::InvalidBody { .. }));
    }
}
