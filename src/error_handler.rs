//! Two-tier failure-to-response translation.
//!
//! Every body-accumulation or handler failure funnels through one
//! [`ErrorHandler`]. By default it logs the error and answers with a fixed
//! 500 JSON body. Installing a custom handler replaces that behavior
//! entirely — the default body is never written and nothing is logged for
//! that call. The override is total, not additive.

use std::sync::{Arc, PoisonError, RwLock};

use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::error::Error;
use crate::response::Response;

type CustomHandler = Arc<dyn Fn(&Error) -> Response + Send + Sync + 'static>;

enum Slot {
    Default,
    Custom(CustomHandler),
}

/// The error dispatcher. One per server, shared by every in-flight request.
pub struct ErrorHandler {
    slot: RwLock<Slot>,
}

impl ErrorHandler {
    pub(crate) fn new() -> Self {
        Self { slot: RwLock::new(Slot::Default) }
    }

    /// Replaces the active handler for all subsequent errors. The last call
    /// wins; there is no way to restore the default afterwards.
    ///
    /// The handler receives the failure and must produce the one response
    /// for that request. If it panics, that request's processing is over —
    /// nothing here catches it.
    pub fn set_custom<F>(&self, handler: F)
    where
        F: Fn(&Error) -> Response + Send + Sync + 'static,
    {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Slot::Custom(Arc::new(handler));
    }

    /// Translates one failure into one response.
    pub fn handle(&self, err: &Error) -> Response {
        // Clone the capability out so the lock is released before user code
        // runs.
        let custom = match &*self.slot.read().unwrap_or_else(PoisonError::into_inner) {
            Slot::Custom(handler) => Some(Arc::clone(handler)),
            Slot::Default => None,
        };

        match custom {
            Some(handler) => handler(err),
            None => {
                error!("request processing failed: {err}");
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .json(
                        json!({
                            "message": "Internal Server Error",
                            "error": err.to_string(),
                        })
                        .to_string(),
                    )
            }
        }
    }
}
