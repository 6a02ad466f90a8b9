use bytes::BytesMut;
use tokio_util::codec::Decoder;

use super::chunked_decoder::ChunkedDecoder;
use super::length_decoder::LengthDecoder;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};

/// Body decoder selected by the framing announced in the request head.
#[derive(Debug)]
pub struct PayloadDecoder {
    kind: Kind,
}

#[derive(Debug)]
enum Kind {
    Length(LengthDecoder),
    Chunked(ChunkedDecoder),
    NoBody,
}

impl PayloadDecoder {
    pub fn fixed_length(length: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(length)) }
    }

    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new()) }
    }

    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }
}

impl From<PayloadSize> for PayloadDecoder {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(length) => Self::fixed_length(length),
            PayloadSize::Chunked => Self::chunked(),
            PayloadSize::Empty => Self::empty(),
        }
    }
}

impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(decoder) => decoder.decode(src),
            Kind::Chunked(decoder) => decoder.decode(src),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_framing_yields_immediate_eof() {
        let mut decoder = PayloadDecoder::from(PayloadSize::Empty);
        let mut buffer = BytesMut::from(&b"leftover"[..]);
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
        assert_eq!(&buffer[..], b"leftover");
    }

    #[test]
    fn framing_selects_the_decoder() {
        let mut decoder = PayloadDecoder::from(PayloadSize::Length(2));
        let mut buffer = BytesMut::from(&b"ab"[..]);
        assert_eq!(decoder.decode(&mut buffer).unwrap().unwrap().as_bytes().unwrap(), &b"ab"[..]);

        let mut decoder = PayloadDecoder::from(PayloadSize::Chunked);
        let mut buffer = BytesMut::from(&b"2\r\nab\r\n0\r\n\r\n"[..]);
        assert_eq!(decoder.decode(&mut buffer).unwrap().unwrap().as_bytes().unwrap(), &b"ab"[..]);
    }
}
