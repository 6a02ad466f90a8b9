//! Incremental codecs turning a byte stream into protocol messages and back.
//!
//! [`RequestDecoder`] and [`ResponseEncoder`] are the two entry points; each
//! composes a head codec with a body codec chosen from the framing headers.
//! Both plug into `tokio_util`'s `FramedRead` / `FramedWrite`, which own the
//! buffers and drive `decode` as bytes arrive.

pub mod body;
pub mod header;
mod line;

mod request_decoder;
pub use request_decoder::RequestDecoder;

mod response_encoder;
pub use response_encoder::ResponseEncoder;
