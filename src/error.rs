//! Unified error type.

use std::fmt;

/// The error type carried through plinth's failure paths.
///
/// Route misses are not errors — they become a 404 before the error chain is
/// ever consulted. `Error` covers what can actually fail: binding the
/// listener, reading the request body stream, and whatever a handler raises.
#[derive(Debug)]
pub enum Error {
    /// Listener setup or socket-level failure.
    Io(std::io::Error),
    /// The request body stream failed before the end-of-body signal.
    Body(Box<dyn std::error::Error + Send + Sync>),
    /// A handler returned a failure of its own.
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps any error value as a handler failure.
    ///
    /// `&str` and `String` work too, via the blanket `Box<dyn Error>`
    /// conversions in std:
    ///
    /// ```rust
    /// use plinth::Error;
    /// let err = Error::handler("user 42 not in database");
    /// ```
    pub fn handler(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler(source.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e)      => write!(f, "io: {e}"),
            Self::Body(e)    => write!(f, "body stream: {e}"),
            // The handler's own message, unadorned — it ends up verbatim in
            // the default 500 body.
            Self::Handler(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Body(e) | Self::Handler(e) => Some(e.as_ref()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Self {
        Self::Body(Box::new(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Handler(Box::new(e))
    }
}
