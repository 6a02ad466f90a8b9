//! The dispatch seam between the connection layer and application code.
//!
//! A [`Handler`] receives a fully-read [`Request`] and produces a
//! [`Response`]. The connection layer guarantees at most one in-flight call
//! per connection and writes responses back in request order; handlers on
//! different connections run concurrently.

use std::error::Error;

use async_trait::async_trait;

use crate::protocol::{Request, Response};

/// Error type a handler may fail with; mapped to a 500 by the connection.
pub type HandlerError = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request) -> Result<Response, HandlerError>;
}

/// Adapter turning an async function or closure into a [`Handler`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wraps `f` so it can be passed where a [`Handler`] is expected.
pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, HandlerError>> + Send,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, HandlerError>> + Send,
{
    async fn call(&self, request: Request) -> Result<Response, HandlerError> {
        (self.f)(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Method, StatusCode, Version};

    use crate::protocol::{HeaderFields, RequestHead};

    #[tokio::test]
    async fn closures_work_as_handlers() {
        let handler = make_handler(|request: Request| async move {
            Ok(Response::full(StatusCode::OK, format!("you asked for {}", request.head().path())))
        });

        let head = RequestHead::new(Method::GET, "/hello".to_string(), Version::HTTP_11, HeaderFields::new());
        let response = handler.call(Request::new(head, Bytes::new())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
