//! A small server exercising the whole stack: routing off the request
//! path, a JSON metrics endpoint, and structured logs.
//!
//! Run with `cargo run --example server`, then:
//!
//! ```text
//! curl -v http://127.0.0.1:8080/
//! curl -s http://127.0.0.1:8080/metrics
//! ```

use std::error::Error;
use std::sync::Arc;

use http::StatusCode;
use tracing::Level;

use nano_http::handler::make_handler;
use nano_http::metrics::ServerMetrics;
use nano_http::protocol::{Request, Response};
use nano_http::server::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let server = Server::builder().address("127.0.0.1:8080").build()?;
    let metrics = server.metrics();

    let handler = make_handler(move |request: Request| {
        let metrics = Arc::clone(&metrics);
        async move { route(request, &metrics) }
    });

    server.run(Arc::new(handler)).await?;
    Ok(())
}

fn route(request: Request, metrics: &ServerMetrics) -> Result<Response, Box<dyn Error + Send + Sync>> {
    match request.head().path() {
        "/" => Ok(Response::full(StatusCode::OK, "Hello, World!").header("Content-Type", "text/plain")),
        "/metrics" => {
            let body = serde_json::to_string_pretty(&metrics.snapshot())?;
            Ok(Response::full(StatusCode::OK, body).header("Content-Type", "application/json"))
        }
        "/echo" => {
            let body = request.body().clone();
            Ok(Response::full(StatusCode::OK, body))
        }
        _ => Ok(Response::full(StatusCode::NOT_FOUND, "404 Not Found\n")),
    }
}
