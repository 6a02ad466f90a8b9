use bytes::Bytes;

/// A framing-level HTTP message part: either a head or a slice of payload.
///
/// The request decoder emits `Message<(RequestHead, PayloadSize)>`, the
/// response encoder consumes `Message<(ResponseHead, PayloadSize)>`; payload
/// items are shared by both directions.
#[derive(Debug)]
pub enum Message<T> {
    /// The head of a request or response
    Header(T),
    /// A chunk of payload data or the end-of-payload marker
    Payload(PayloadItem),
}

/// An item in a payload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A slice of body data
    Chunk(Bytes),
    /// Marks the end of the body
    Eof,
}

/// How a message body is framed on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Body with a known length from `Content-Length`
    Length(u64),
    /// Body using chunked transfer encoding
    Chunked,
    /// No body
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}

impl PayloadItem {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns the contained bytes if this is a chunk, `None` on `Eof`.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

}
