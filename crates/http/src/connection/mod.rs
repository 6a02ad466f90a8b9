//! Per-connection request/response processing.

mod metered;

mod http_connection;
pub use http_connection::HttpConnection;
