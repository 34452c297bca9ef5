//! Response building module
//!
//! Accumulates status, headers, and body across pipeline stages, decoupled
//! from any one stage's logic. Finalized into a hyper response exactly once
//! by the handler entry.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::StatusCode;
use serde::Serialize;

use crate::logger;

/// Mutable response under construction.
///
/// Stages and handlers add to it; headers are append-only so a later stage
/// never removes what an earlier stage attached.
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ResponseBuilder {
    /// Empty 200 response with no headers
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Append a header. Repeated names accumulate rather than overwrite.
    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.append(name, value);
        self
    }

    /// Set a plain-text body
    pub fn text(&mut self, body: impl Into<String>) -> &mut Self {
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.body = Bytes::from(body.into());
        self
    }

    /// Set a JSON body serialized from `value`.
    ///
    /// Serialization failure downgrades the response to a 500 with a generic
    /// error object rather than panicking mid-request.
    pub fn json<T: Serialize>(&mut self, value: &T) -> &mut Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.body = Bytes::from(bytes);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to serialize response body: {e}"));
                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.body = Bytes::from(r#"{"error":"internal server error"}"#);
            }
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body contents as currently set
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Response body size in bytes (access logging)
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Finalize into a hyper response. Consumes the builder; a response is
    /// flushed at most once per request.
    pub fn finish(self) -> hyper::Response<Full<Bytes>> {
        let mut response = hyper::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
