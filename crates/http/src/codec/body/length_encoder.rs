use bytes::BytesMut;
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, SendError};

/// Encoder for a response body framed by `Content-Length`.
///
/// The bytes go out verbatim; the declared length was already written in
/// the header section.
#[derive(Debug)]
pub struct LengthEncoder;

impl Encoder<PayloadItem> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if let PayloadItem::Chunk(bytes) = item {
            dst.extend_from_slice(&bytes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn writes_bytes_verbatim() {
        let mut buffer = BytesMut::new();
        LengthEncoder.encode(PayloadItem::Chunk(Bytes::from_static(b"hello")), &mut buffer).unwrap();
        LengthEncoder.encode(PayloadItem::Eof, &mut buffer).unwrap();
        assert_eq!(&buffer[..], b"hello");
    }
}
