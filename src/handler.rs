//! The handler capability and its type erasure.
//!
//! The route table stores handlers of *different* concrete types in one
//! `Vec`, so each one is erased behind the single-method [`Handler`] trait
//! and shared as an `Arc<dyn Handler>`. The blanket impl below means any
//! `async fn(Request) -> Result<impl IntoResponse, Error>` is a handler —
//! there is nothing to implement by hand.
//!
//! Per-request cost: one `Arc` clone plus one virtual call. Noise next to
//! the socket I/O around it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future resolving to the handler's outcome.
pub(crate) type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<Response, Error>> + Send + 'static>>;

/// A shared, type-erased handler, cloned once per dispatched request.
pub(crate) type BoxedHandler = Arc<dyn Handler>;

/// The capability a route invokes.
///
/// Satisfied automatically by any async function of the shape
///
/// ```text
/// async fn name(req: Request) -> Result<impl IntoResponse, Error>
/// ```
///
/// A returned `Err` does not touch the wire directly — dispatch hands it to
/// the error chain, which decides the response.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> HandlerFuture;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> HandlerFuture {
        let fut = self(req);
        Box::pin(async move { fut.await.map(IntoResponse::into_response) })
    }
}
