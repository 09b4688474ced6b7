//! HTTP server: the transport loop and the per-request dispatch state machine.
//!
//! `listen` owns the sockets; [`dispatch`] owns the request lifecycle. The
//! stages per request, in order:
//!
//! 1. static-file attempt across every registered directory,
//! 2. route resolution against the live table (404 on a miss),
//! 3. parameter extraction, body accumulation, handler invocation,
//! 4. on any stage-3 failure, the error chain writes the response instead.
//!
//! Whatever happens, exactly one response leaves per request — the dispatch
//! function returns one `Response` and its hyper-facing error type is
//! [`Infallible`](std::convert::Infallible).

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, Bytes};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::error_handler::ErrorHandler;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::Response;
use crate::router::{path_variables, query_params, Router};
use crate::static_files;

/// Port used when `listen` is given none.
const DEFAULT_PORT: u16 = 3000;

/// The HTTP server: a route registry plus an error dispatcher.
pub struct Server {
    router: Router,
    errors: Arc<ErrorHandler>,
}

impl Server {
    /// Wraps a fully-registered router. Registration is over once the server
    /// exists — build the [`Router`] first, then construct this.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            errors: Arc::new(ErrorHandler::new()),
        }
    }

    /// The error dispatcher, for installing a custom error handler:
    ///
    /// ```rust,no_run
    /// # use plinth::{Response, Router, Server, StatusCode};
    /// let server = Server::new(Router::new());
    /// server.error_handler().set_custom(|err| {
    ///     Response::builder()
    ///         .status(StatusCode::INTERNAL_SERVER_ERROR)
    ///         .text(format!("sorry: {err}"))
    /// });
    /// ```
    pub fn error_handler(&self) -> &ErrorHandler {
        &self.errors
    }

    /// Binds and serves until a shutdown signal (SIGTERM or Ctrl-C) arrives,
    /// then drains in-flight connections before returning.
    ///
    /// `port` defaults to 3000 when `None`. `listen` consumes the server, so
    /// a second listener cannot be created and the registry cannot be
    /// touched once traffic is flowing.
    pub async fn listen(self, port: impl Into<Option<u16>>) -> Result<(), Error> {
        let port = port.into().unwrap_or(DEFAULT_PORT);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;

        // Shared across connection tasks; written by nobody from here on.
        let router = Arc::new(self.router);
        let errors = self.errors;

        info!(%addr, "plinth listening on http://localhost:{port}");

        let mut tasks = tokio::task::JoinSet::new();
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Checked first: a shutdown signal stops accepting even if
                // more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining");
                    break;
                }

                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let errors = Arc::clone(&errors);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // One call per request on the connection, not one
                        // per connection.
                        let service = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            let errors = Arc::clone(&errors);
                            async move { dispatch(router, errors, req).await }
                        });

                        // Auto builder speaks HTTP/1.1 or HTTP/2, whichever
                        // the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, service)
                            .await
                        {
                            error!(%peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished tasks so the set stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("plinth stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Runs one request through the dispatch stages and produces its one
/// response. All failures become responses internally; hyper never sees an
/// error.
async fn dispatch<B>(
    router: Arc<Router>,
    errors: Arc<ErrorHandler>,
    req: http::Request<B>,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    B: Body + Unpin,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    // Path plus query string, the way parameter extraction wants it.
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| path.clone(), |pq| pq.as_str().to_owned());

    debug!(%method, %target, "incoming request");

    if let Some(response) = static_files::try_serve(&router, &path).await {
        return Ok(response.into_http());
    }

    let Some(route) = router.resolve(Some(&path), Some(method.as_str())) else {
        debug!(%path, "no route matched");
        let body = json!({"message": "Route Not Found"});
        return Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .json(body.to_string())
            .into_http());
    };

    let params = path_variables(Some(&target), route.pattern());
    let query = query_params(Some(&target));
    debug!(route = route.pattern(), ?params, ?query, "route matched");

    let handler = Arc::clone(&route.handler);
    let (parts, body) = req.into_parts();

    let outcome = run_handler(handler, parts, body, params, query).await;
    let response = outcome.unwrap_or_else(|err| errors.handle(&err));
    Ok(response.into_http())
}

/// Accumulates the body, then invokes the handler. Either failure surfaces
/// as one `Err` for the error chain.
async fn run_handler<B>(
    handler: BoxedHandler,
    parts: http::request::Parts,
    body: B,
    params: std::collections::HashMap<String, String>,
    query: std::collections::HashMap<String, String>,
) -> Result<Response, Error>
where
    B: Body + Unpin,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let text = collect_body(body).await?;
    debug!(bytes = text.len(), "request body complete");

    let request = Request::new(
        parts.method,
        parts.uri.path().to_owned(),
        parts.headers,
        text,
        params,
        query,
    );
    handler.call(request).await
}

/// Drains the body stream frame by frame, concatenating chunks in arrival
/// order. The handler only runs after this returns — that is, after the
/// transport's end-of-body signal. Chunks are treated as text; invalid
/// UTF-8 is lossily converted.
async fn collect_body<B>(mut body: B) -> Result<String, Error>
where
    B: Body + Unpin,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let mut text = String::new();
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| Error::Body(Box::new(e)))?;
        if let Ok(mut data) = frame.into_data() {
            let chunk = data.copy_to_bytes(data.remaining());
            text.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
    Ok(text)
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal: SIGTERM or Ctrl-C on Unix, Ctrl-C
/// alone elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use hyper::body::Frame;

    use crate::router::Router;

    fn request(method: &str, target: &str, body: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(target)
            .body(Full::new(Bytes::from(body.to_owned())))
            .unwrap()
    }

    async fn send(
        router: Router,
        errors: ErrorHandler,
        req: http::Request<Full<Bytes>>,
    ) -> http::Response<Full<Bytes>> {
        dispatch(Arc::new(router), Arc::new(errors), req)
            .await
            .unwrap()
    }

    async fn body_bytes(response: http::Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn unmatched_request_is_404_with_the_fixed_body() {
        let response = send(
            Router::new(),
            ErrorHandler::new(),
            request("GET", "/nothing/here", ""),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({"message": "Route Not Found"}));
    }

    #[tokio::test]
    async fn handler_sees_params_query_and_body() {
        async fn echo(req: Request) -> Result<Response, Error> {
            Ok(Response::json(
                json!({
                    "id": req.param("id"),
                    "mode": req.query("mode"),
                    "body": req.body(),
                })
                .to_string(),
            ))
        }

        let router = Router::new().post("/users/:id", echo);
        let response = send(
            router,
            ErrorHandler::new(),
            request("POST", "/users/42?mode=a%20b", "hello"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({"id": "42", "mode": "a b", "body": "hello"}));
    }

    #[tokio::test]
    async fn static_file_short_circuits_routing() {
        async fn from_route(_req: Request) -> Result<Response, Error> {
            Ok(Response::text("from the route"))
        }

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), "<p>static</p>").unwrap();

        let router = Router::new()
            .static_dir(dir.path().to_string_lossy().into_owned())
            .get("/page.html", from_route);

        let response = send(router, ErrorHandler::new(), request("GET", "/page.html", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/html");
        assert_eq!(body_bytes(response).await, "<p>static</p>");
    }

    #[tokio::test]
    async fn handler_failure_becomes_the_default_500() {
        async fn broken(_req: Request) -> Result<Response, Error> {
            Err(Error::handler("boom"))
        }

        let router = Router::new().get("/broken", broken);
        let response = send(router, ErrorHandler::new(), request("GET", "/broken", "")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["message"], "Internal Server Error");
        assert_eq!(body["error"], "boom");
    }

    #[tokio::test]
    async fn custom_error_handler_owns_the_failure_response() {
        async fn broken(_req: Request) -> Result<Response, Error> {
            Err(Error::handler("boom"))
        }

        let router = Router::new().get("/broken", broken);
        let errors = ErrorHandler::new();
        errors.set_custom(|_err| Response::status(StatusCode::SERVICE_UNAVAILABLE));

        let response = send(router, errors, request("GET", "/broken", "")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn unregistered_method_still_dispatches_to_the_pattern_match() {
        async fn orders(_req: Request) -> Result<Response, Error> {
            Ok(Response::text("orders"))
        }

        // Route declared GET-only; a PUT still lands on it.
        let router = Router::new().get("/orders", orders);
        let response = send(router, ErrorHandler::new(), request("PUT", "/orders", "")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, "orders");
    }

    // Body that yields its chunks one frame at a time.
    struct ChunkedBody(VecDeque<Bytes>);

    impl Body for ChunkedBody {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            Poll::Ready(self.0.pop_front().map(|chunk| Ok(Frame::data(chunk))))
        }
    }

    #[tokio::test]
    async fn body_chunks_concatenate_in_arrival_order() {
        let body = ChunkedBody(VecDeque::from([
            Bytes::from_static(b"hello "),
            Bytes::from_static(b"streamed "),
            Bytes::from_static(b"world"),
        ]));
        let text = collect_body(body).await.unwrap();
        assert_eq!(text, "hello streamed world");
    }
}
