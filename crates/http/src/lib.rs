//! An asynchronous HTTP/1.1 connection-handling core built on tokio.
//!
//! The crate covers the path from accepted socket to dispatched request:
//! incremental parsing of request heads and bodies, per-connection
//! keep-alive and pipelining semantics, limit enforcement with the proper
//! 400/413/414 rejections, and shared operational counters. What to do
//! with a request is left to a [`handler::Handler`] implementation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use http::StatusCode;
//! use nano_http::handler::make_handler;
//! use nano_http::protocol::{Request, Response};
//! use nano_http::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = make_handler(|request: Request| async move {
//!         Ok(Response::full(StatusCode::OK, format!("hello from {}", request.head().path())))
//!     });
//!
//!     let server = Server::builder().address("127.0.0.1:8080").build()?;
//!     server.run(Arc::new(handler)).await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod connection;
pub mod handler;
pub mod limits;
pub mod metrics;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
