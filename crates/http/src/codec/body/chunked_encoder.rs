use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, SendError};

/// Encoder for a `Transfer-Encoding: chunked` response body.
#[derive(Debug)]
pub struct ChunkedEncoder;

impl Encoder<PayloadItem> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(bytes) => {
                // a zero-length chunk would read as the last-chunk marker
                if bytes.is_empty() {
                    return Ok(());
                }
                write!(dst.writer(), "{:X}\r\n", bytes.len()).map_err(SendError::io)?;
                dst.extend_from_slice(&bytes);
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
            PayloadItem::Eof => {
                dst.extend_from_slice(b"0\r\n\r\n");
                Ok(())
            }
        }
    }
}
