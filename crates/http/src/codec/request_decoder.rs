use std::sync::Arc;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use super::body::PayloadDecoder;
use super::header::HeaderDecoder;
use crate::limits::Limits;
use crate::protocol::{Message, ParseError, PayloadSize, RequestHead};

/// Two-phase decoder for a full request: head first, then body items.
///
/// After the head is emitted the decoder installs the matching body decoder
/// and keeps emitting payload items until `Eof`, at which point it is ready
/// for the next request's head. Pipelined requests therefore come out one
/// after another from the same buffer.
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    pub fn new(limits: Arc<Limits>) -> Self {
        Self { header_decoder: HeaderDecoder::new(limits), payload_decoder: None }
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHead, PayloadSize)>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.payload_decoder {
            None => {
                let Some((head, payload_size)) = self.header_decoder.decode(src)? else {
                    return Ok(None);
                };
                self.payload_decoder = Some(PayloadDecoder::from(payload_size));
                Ok(Some(Message::Header((head, payload_size))))
            }

            Some(payload_decoder) => {
                let Some(item) = payload_decoder.decode(src)? else {
                    return Ok(None);
                };
                if item.is_eof() {
                    self.payload_decoder = None;
                }
                Ok(Some(Message::Payload(item)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PayloadItem;
    use http::Method;

    fn decoder() -> RequestDecoder {
        RequestDecoder::new(Arc::new(Limits::default()))
    }

    fn expect_header(message: Message<(RequestHead, PayloadSize)>) -> (RequestHead, PayloadSize) {
        match message {
            Message::Header(header) => header,
            Message::Payload(item) => panic!("expected header, got {item:?}"),
        }
    }

    fn expect_payload(message: Message<(RequestHead, PayloadSize)>) -> PayloadItem {
        match message {
            Message::Payload(item) => item,
            Message::Header(_) => panic!("expected payload item"),
        }
    }

    #[test]
    fn get_without_body_emits_header_then_eof() {
        let mut decoder = decoder();
        let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"[..]);

        let (head, payload_size) = expect_header(decoder.decode(&mut buffer).unwrap().unwrap());
        assert_eq!(head.method(), &Method::GET);
        assert!(payload_size.is_empty());

        assert!(expect_payload(decoder.decode(&mut buffer).unwrap().unwrap()).is_eof());
    }

    #[test]
    fn post_with_content_length_emits_body_chunks() {
        let mut decoder = decoder();
        let mut buffer = BytesMut::from(&b"POST /upload HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhello"[..]);

        let (_, payload_size) = expect_header(decoder.decode(&mut buffer).unwrap().unwrap());
        assert_eq!(payload_size, PayloadSize::Length(5));

        let item = expect_payload(decoder.decode(&mut buffer).unwrap().unwrap());
        assert_eq!(item.as_bytes().unwrap(), &b"hello"[..]);

        assert!(expect_payload(decoder.decode(&mut buffer).unwrap().unwrap()).is_eof());
    }

    #[test]
    fn decodes_pipelined_requests_in_order() {
        let mut decoder = decoder();
        let mut buffer = BytesMut::from(
            &b"POST /a HTTP/1.1\r\nHost: x\r\nContent-Length: 2\r\n\r\nabGET /b HTTP/1.1\r\nHost: x\r\n\r\n"[..],
        );

        let (head, _) = expect_header(decoder.decode(&mut buffer).unwrap().unwrap());
        assert_eq!(head.target(), "/a");
        assert_eq!(expect_payload(decoder.decode(&mut buffer).unwrap().unwrap()).as_bytes().unwrap(), &b"ab"[..]);
        assert!(expect_payload(decoder.decode(&mut buffer).unwrap().unwrap()).is_eof());

        let (head, _) = expect_header(decoder.decode(&mut buffer).unwrap().unwrap());
        assert_eq!(head.target(), "/b");
        assert!(expect_payload(decoder.decode(&mut buffer).unwrap().unwrap()).is_eof());
    }

    #[test]
    fn chunked_body_decodes_through_the_same_stream() {
        let mut decoder = decoder();
        let mut buffer =
            BytesMut::from(&b"POST / HTTP/1.1\r\nHost: x\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWist\r\n0\r\n\r\n"[..]);

        let (_, payload_size) = expect_header(decoder.decode(&mut buffer).unwrap().unwrap());
        assert!(payload_size.is_chunked());

        assert_eq!(expect_payload(decoder.decode(&mut buffer).unwrap().unwrap()).as_bytes().unwrap(), &b"Wist"[..]);
        assert!(expect_payload(decoder.decode(&mut buffer).unwrap().unwrap()).is_eof());
        assert!(buffer.is_empty());
    }
}
