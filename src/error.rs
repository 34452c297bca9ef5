// Error taxonomy module
// Non-fatal pipeline conditions become HTTP responses; startup conditions are terminal.

use hyper::{Method, StatusCode};
use thiserror::Error;

use crate::http::ResponseBuilder;

/// Non-fatal request processing conditions.
///
/// Every variant is converted to an HTTP response by the handler entry and
/// never propagates past it. A request that hits one of these never reaches
/// a registered handler.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed request body (body decoder, status 400)
    #[error("malformed request body: {0}")]
    BadRequest(String),

    /// Request body over the decode limit (body decoder, status 413)
    #[error("request body of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// No registered route matches (router, status 404)
    #[error("no route matches {method} {path}")]
    NotFound { method: Method, path: String },
}

impl PipelineError {
    /// HTTP status code for this condition
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// Write this condition into an in-flight response.
    ///
    /// Mutates rather than replaces so headers attached by earlier pipeline
    /// stages (cross-origin permissions in particular) survive on the error
    /// response.
    pub fn write_to(&self, resp: &mut ResponseBuilder) {
        resp.status(self.status());
        resp.json(&serde_json::json!({ "error": self.to_string() }));
    }

}

/// Fatal startup conditions. Surfaced to the operator from `main`; the
/// process does not start and nothing is retried.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    Addr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to open log files: {0}")]
    Logger(#[source] std::io::Error),

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
}
