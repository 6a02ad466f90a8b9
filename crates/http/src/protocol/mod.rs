//! Core protocol types shared by the codec and connection layers.
//!
//! The module is split along the same lines as the wire format:
//!
//! - [`message`]: framing-level items produced and consumed by the codecs
//!   ([`Message`], [`PayloadItem`], [`PayloadSize`])
//! - [`headers`]: ordered header storage with case-insensitive lookup
//!   ([`HeaderFields`])
//! - [`request`]: the parsed request head and the fully-read request
//!   ([`RequestHead`], [`Request`])
//! - [`response`]: the response descriptor handed back by a handler
//!   ([`Response`], [`ResponseHead`], [`BodySource`])
//! - [`error`]: error types and their status-code mapping
//!   ([`HttpError`], [`ParseError`], [`SendError`])

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod headers;
pub use headers::HeaderFields;

mod request;
pub use request::Request;
pub use request::RequestHead;

mod response;
pub use response::BodySource;
pub use response::Response;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
