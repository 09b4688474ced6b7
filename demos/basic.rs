//! Minimal plinth example — JSON endpoints, a static directory, and a
//! custom error handler.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl 'http://localhost:3000/search?q=rust%20http&limit=5'
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl http://localhost:3000/boom
//!   curl http://localhost:3000/            # public/index.html, if present

use plinth::{Error, Request, Response, Router, Server, StatusCode};
use serde_json::json;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/users/:id",    get_user)
        .post("/users",       create_user)
        .delete("/users/:id", delete_user)
        .get("/search",       search)
        .get("/boom",         boom)
        .static_dir("assets");

    let server = Server::new(app);

    // Replaces the default 500 translator entirely.
    server.error_handler().set_custom(|err| {
        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .json(json!({"message": "something broke", "detail": err.to_string()}).to_string())
    });

    server.listen(3000).await.expect("server error");
}

// GET /users/:id — path variables arrive raw, exactly as they appear in the
// path.
async fn get_user(req: Request) -> Result<Response, Error> {
    let id = req.param("id").unwrap_or("unknown");
    Ok(Response::json(json!({"id": id, "name": "alice"}).to_string()))
}

// POST /users — the body is accumulated before this runs.
async fn create_user(req: Request) -> Result<Response, Error> {
    let input: serde_json::Value = serde_json::from_str(req.body())?;
    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(json!({"id": "99", "name": input["name"]}).to_string()))
}

// DELETE /users/:id → 204 No Content
async fn delete_user(_req: Request) -> Result<Response, Error> {
    Ok(Response::status(StatusCode::NO_CONTENT))
}

// GET /search?q=…&limit=… — query parameters are percent-decoded; a
// repeated key keeps its last value.
async fn search(req: Request) -> Result<Response, Error> {
    let q = req.query("q").unwrap_or("");
    let limit = req.query("limit").unwrap_or("10");
    Ok(Response::json(json!({"q": q, "limit": limit, "results": []}).to_string()))
}

// GET /boom — whatever a handler raises lands in the error chain.
async fn boom(_req: Request) -> Result<Response, Error> {
    Err(Error::handler("the demo always fails here"))
}
