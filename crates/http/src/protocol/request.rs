//! Parsed request representation.

use bytes::Bytes;
use http::{Method, Version};

use crate::protocol::HeaderFields;

/// The head of a parsed request: request line plus header section.
///
/// The target is kept as the raw string from the request line; routing and
/// query handling belong to the dispatcher, not to this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    method: Method,
    target: String,
    version: Version,
    fields: HeaderFields,
}

impl RequestHead {
    pub fn new(method: Method, target: String, version: Version, fields: HeaderFields) -> Self {
        Self { method, target, version, fields }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The raw request target, exactly as it appeared on the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The path portion of the target, without any query string.
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.fields
    }

    /// Whether the connection should stay open after this exchange.
    ///
    /// HTTP/1.1 defaults to keep-alive unless the client sent
    /// `Connection: close`; HTTP/1.0 defaults to close unless the client
    /// asked for `keep-alive`.
    pub fn keep_alive(&self) -> bool {
        match self.fields.get("connection") {
            Some(value) if value.eq_ignore_ascii_case("close") => false,
            Some(value) if value.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version == Version::HTTP_11,
        }
    }
}

/// A complete request: head plus the fully-read body.
///
/// The connection layer reassembles fixed-length and chunked bodies before
/// dispatch, so handlers always see the decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    head: RequestHead,
    body: Bytes,
}

impl Request {
    pub fn new(head: RequestHead, body: Bytes) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (RequestHead, Bytes) {
        (self.head, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(version: Version, connection: Option<&str>) -> RequestHead {
        let mut fields = HeaderFields::new();
        fields.push("Host", "localhost");
        if let Some(value) = connection {
            fields.push("Connection", value);
        }
        RequestHead::new(Method::GET, "/".to_string(), version, fields)
    }

    #[test]
    fn keep_alive_defaults_per_version() {
        assert!(head(Version::HTTP_11, None).keep_alive());
        assert!(!head(Version::HTTP_10, None).keep_alive());
    }

    #[test]
    fn keep_alive_honors_connection_header() {
        assert!(!head(Version::HTTP_11, Some("close")).keep_alive());
        assert!(!head(Version::HTTP_11, Some("Close")).keep_alive());
        assert!(head(Version::HTTP_10, Some("keep-alive")).keep_alive());
    }

    #[test]
    fn path_strips_query() {
        let head = RequestHead::new(
            Method::GET,
            "/index/?a=1&b=2".to_string(),
            Version::HTTP_11,
            HeaderFields::new(),
        );
        assert_eq!(head.path(), "/index/");
        assert_eq!(head.target(), "/index/?a=1&b=2");
    }
}
