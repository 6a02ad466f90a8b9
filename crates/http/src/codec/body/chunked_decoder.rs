use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::ensure;
use crate::protocol::{ParseError, PayloadItem};

/// Decoder for a `Transfer-Encoding: chunked` body.
///
/// A byte-at-a-time state machine for the chunk framing, with the data
/// bytes themselves taken in bulk. Chunk extensions and trailer fields are
/// consumed and discarded. Because the machine keeps its position between
/// calls, a chunk arriving split across any number of reads decodes the
/// same as one arriving whole.
#[derive(Debug)]
pub struct ChunkedDecoder {
    state: ChunkState,
    /// Accumulates the hex size while in `Size`, then counts down the data
    remaining: u64,
    digits_seen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    Size,
    Extension,
    SizeLf,
    Data,
    DataCr,
    DataLf,
    Trailer,
    TrailerSkip,
    TrailerLf,
    EndLf,
    Done,
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: ChunkState::Size, remaining: 0, digits_seen: false }
    }

    fn step(&mut self, byte: u8) -> Result<(), ParseError> {
        self.state = match self.state {
            ChunkState::Size => match byte {
                b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F' => {
                    let digit = u64::from((byte as char).to_digit(16).unwrap_or(0));
                    self.remaining = self
                        .remaining
                        .checked_mul(16)
                        .and_then(|size| size.checked_add(digit))
                        .ok_or_else(|| ParseError::malformed_chunk("chunk size overflows u64"))?;
                    self.digits_seen = true;
                    ChunkState::Size
                }
                b';' => {
                    ensure!(self.digits_seen, ParseError::malformed_chunk("chunk size missing"));
                    ChunkState::Extension
                }
                b'\r' => {
                    ensure!(self.digits_seen, ParseError::malformed_chunk("chunk size missing"));
                    ChunkState::SizeLf
                }
                _ => return Err(ParseError::malformed_chunk("invalid character in chunk size")),
            },

            ChunkState::Extension => match byte {
                b'\r' => ChunkState::SizeLf,
                _ => ChunkState::Extension,
            },

            ChunkState::SizeLf => {
                ensure!(byte == b'\n', ParseError::malformed_chunk("expected LF after chunk size"));
                self.digits_seen = false;
                if self.remaining == 0 { ChunkState::Trailer } else { ChunkState::Data }
            }

            ChunkState::DataCr => match byte {
                b'\r' => ChunkState::DataLf,
                _ => return Err(ParseError::malformed_chunk("missing CRLF after chunk data")),
            },

            ChunkState::DataLf => {
                ensure!(byte == b'\n', ParseError::malformed_chunk("expected LF after chunk data"));
                ChunkState::Size
            }

            ChunkState::Trailer => match byte {
                b'\r' => ChunkState::EndLf,
                _ => ChunkState::TrailerSkip,
            },

            ChunkState::TrailerSkip => match byte {
                b'\r' => ChunkState::TrailerLf,
                _ => ChunkState::TrailerSkip,
            },

            ChunkState::TrailerLf => {
                ensure!(byte == b'\n', ParseError::malformed_chunk("expected LF after trailer field"));
                ChunkState::Trailer
            }

            ChunkState::EndLf => {
                ensure!(byte == b'\n', ParseError::malformed_chunk("expected LF closing the trailer section"));
                ChunkState::Done
            }

            // both are handled before `step` is reached
            ChunkState::Data | ChunkState::Done => self.state,
        };

        Ok(())
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == ChunkState::Done {
                return Ok(Some(PayloadItem::Eof));
            }

            if self.state == ChunkState::Data {
                if src.is_empty() {
                    return Ok(None);
                }
                let take = u64::min(self.remaining, src.len() as u64) as usize;
                let chunk = src.split_to(take).freeze();
                self.remaining -= take as u64;
                if self.remaining == 0 {
                    self.state = ChunkState::DataCr;
                }
                return Ok(Some(PayloadItem::Chunk(chunk)));
            }

            if src.is_empty() {
                return Ok(None);
            }

            let byte = src[0];
            src.advance(1);
            self.step(byte)?;
        }
    }
}
