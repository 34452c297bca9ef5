// Request model module
// The owned request value fed through the pipeline stages.

use std::collections::HashMap;

use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName};
use hyper::Method;

/// An in-flight request, owned exclusively by one pipeline invocation.
///
/// The raw body is buffered before the pipeline runs; the body decoder may
/// attach a structured value, and the router attaches captured path
/// parameters on a parameterized match.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    json: Option<serde_json::Value>,
    params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            body,
            json: None,
            params: HashMap::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request headers. Key lookup is case-insensitive.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, or None if absent or not valid UTF-8
    pub fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Raw body bytes, untouched by the decoder
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Structured body attached by the body decoder, if any
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    pub(crate) fn set_json(&mut self, value: serde_json::Value) {
        self.json = Some(value);
    }

    /// Path parameter captured by the matched route pattern
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}
