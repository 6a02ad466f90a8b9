//! Parse limits enforced on every incoming request.
//!
//! Loaded once per server instance and shared read-only across all
//! connections; nothing mutates a `Limits` after startup.

/// Maximum sizes a request may reach before it is rejected.
///
/// Exceeding `max_request_line_len` yields 414; exceeding any of the others
/// yields 400, except `max_body_size` which yields 413. The defaults come
/// from the deployed configuration this server is tested against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of header fields per request
    pub max_header_count: usize,
    /// Maximum length in bytes of a single header line
    pub max_header_line_len: usize,
    /// Maximum length in bytes of the request line
    pub max_request_line_len: usize,
    /// Maximum decoded body size in bytes
    pub max_body_size: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_header_count: 20,
            max_header_line_len: 1024,
            max_request_line_len: 108,
            max_body_size: 1024 * 1024,
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }
}
