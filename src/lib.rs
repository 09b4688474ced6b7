//! # plinth
//!
//! A minimal HTTP request-dispatch core. Routes in, handlers out.
//!
//! ## The contract
//!
//! plinth is the foundation layer an application registers its handlers on.
//! It does four things with non-trivial semantics and stops there:
//!
//! - **Route matching** — linear scan in registration order, `:name`
//!   variable segments, last ambiguous match wins
//! - **Parameter extraction** — raw path variables, percent-decoded query
//!   parameters
//! - **Static files** — a prioritized directory list searched in
//!   registration order, first readable file wins
//! - **Layered error handling** — one default 500 translator, one total
//!   override point
//!
//! No content negotiation, no middleware stack, no route compilation. Every
//! request is matched against the live registry.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use plinth::{Error, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/:id", get_user)
//!         .post("/users",    create_user)
//!         .static_dir("assets");
//!
//!     Server::new(app).listen(3000).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Result<Response, Error> {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Ok(Response::json(format!(r#"{{"id":"{id}"}}"#)))
//! }
//!
//! async fn create_user(req: Request) -> Result<Response, Error> {
//!     if req.body().is_empty() {
//!         return Err(Error::handler("empty body"));
//!     }
//!     Ok(Response::builder()
//!         .status(plinth::StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(r#"{"id":"99"}"#))
//! }
//! ```

mod error;
mod error_handler;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod static_files;

pub use error::Error;
pub use error_handler::ErrorHandler;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{path_variables, query_params, Route, Router};
pub use server::Server;
pub use static_files::send_file;

/// Re-exported so handlers can name statuses without importing `http`.
pub use http::StatusCode;
