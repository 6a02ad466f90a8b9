use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::protocol::{ParseError, PayloadItem};

/// Decoder for a body framed by `Content-Length`.
///
/// Emits whatever prefix of the remaining length is buffered, so a large
/// body streams through without being held in one allocation here.
#[derive(Debug)]
pub struct LengthDecoder {
    remaining: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let take = u64::min(self.remaining, src.len() as u64) as usize;
        let chunk = src.split_to(take).freeze();
        self.remaining -= take as u64;

        Ok(Some(PayloadItem::Chunk(chunk)))
    }
}
