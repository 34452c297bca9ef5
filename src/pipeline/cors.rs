//! Cross-origin policy filter module
//!
//! Attaches permission headers for cross-site requests and answers preflight
//! requests directly, short-circuiting the rest of the pipeline.

use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, ORIGIN,
    VARY,
};
use hyper::Method;

use super::Flow;
use crate::http::{Request, ResponseBuilder};

/// Cross-origin permission policy.
///
/// The default allows every origin and all standard methods, echoing the
/// requester's origin in the permission header.
pub struct CorsPolicy {
    /// Methods advertised on preflight responses
    pub allow_methods: HeaderValue,
    /// Request headers advertised when the preflight does not name any
    pub allow_headers: HeaderValue,
    /// Preflight cache lifetime in seconds
    pub max_age: HeaderValue,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allow_methods: HeaderValue::from_static("GET,HEAD,PUT,PATCH,POST,DELETE"),
            allow_headers: HeaderValue::from_static("Content-Type"),
            max_age: HeaderValue::from_static("86400"),
        }
    }
}

/// Apply the policy to a request.
///
/// A request without an `Origin` header is same-origin: no permission
/// headers are attached. Preflights (`OPTIONS`) are answered with 204 and
/// never reach the router.
pub fn apply(policy: &CorsPolicy, req: &Request, resp: &mut ResponseBuilder) -> Flow {
    let origin = req.headers().get(ORIGIN).cloned();

    if let Some(origin) = &origin {
        // Echo the requester's origin; the reflected value varies per request
        resp.header(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        resp.header(VARY, HeaderValue::from_static("Origin"));
    }

    if *req.method() != Method::OPTIONS {
        return Flow::Continue;
    }

    if origin.is_some() {
        resp.header(ACCESS_CONTROL_ALLOW_METHODS, policy.allow_methods.clone());
        // Echo the requested headers when the client names them
        let allow_headers = req
            .headers()
            .get(ACCESS_CONTROL_REQUEST_HEADERS)
            .cloned()
            .unwrap_or_else(|| policy.allow_headers.clone());
        resp.header(ACCESS_CONTROL_ALLOW_HEADERS, allow_headers);
        resp.header(ACCESS_CONTROL_MAX_AGE, policy.max_age.clone());
    }

    resp.status(hyper::StatusCode::NO_CONTENT);
    Flow::Halt
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Bytes;
    use hyper::header::HeaderMap;
    use hyper::StatusCode;

    fn request_with_origin(method: Method, origin: Option<&'static str>) -> Request {
        let mut headers = HeaderMap::new();
        if let Some(origin) = origin {
            headers.insert(ORIGIN, HeaderValue::from_static(origin));
        }
        Request::new(method, "/users", headers, Bytes::new())
    }

    #[test]
    fn test_origin_is_echoed() {
        let req = request_with_origin(Method::GET, Some("http://localhost:3000"));
        let mut resp = ResponseBuilder::new();

        let flow = apply(&CorsPolicy::default(), &req, &mut resp);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            resp.headers()
                .get(ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
        assert_eq!(
            resp.headers().get(VARY).and_then(|v| v.to_str().ok()),
            Some("Origin")
        );
    }

    #[test]
    fn test_same_origin_request_gets_no_headers() {
        let req = request_with_origin(Method::GET, None);
        let mut resp = ResponseBuilder::new();

        let flow = apply(&CorsPolicy::default(), &req, &mut resp);
        assert_eq!(flow, Flow::Continue);
        assert!(resp.headers().is_empty());
    }

    #[test]
    fn test_preflight_halts_with_204() {
        let req = request_with_origin(Method::OPTIONS, Some("http://example.com"));
        let mut resp = ResponseBuilder::new();

        let flow = apply(&CorsPolicy::default(), &req, &mut resp);
        assert_eq!(flow, Flow::Halt);
        assert_eq!(resp.status_code(), StatusCode::NO_CONTENT);
        assert!(resp.headers().contains_key(ACCESS_CONTROL_ALLOW_METHODS));
        assert_eq!(
            resp.headers()
                .get(ACCESS_CONTROL_ALLOW_HEADERS)
                .and_then(|v| v.to_str().ok()),
            Some("Content-Type")
        );
        assert!(resp.headers().contains_key(ACCESS_CONTROL_MAX_AGE));
    }

    #[test]
    fn test_preflight_echoes_requested_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static("http://example.com"));
        headers.insert(
            ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("X-Custom, Content-Type"),
        );
        let req = Request::new(Method::OPTIONS, "/users", headers, Bytes::new());
        let mut resp = ResponseBuilder::new();

        apply(&CorsPolicy::default(), &req, &mut resp);
        assert_eq!(
            resp.headers()
                .get(ACCESS_CONTROL_ALLOW_HEADERS)
                .and_then(|v| v.to_str().ok()),
            Some("X-Custom, Content-Type")
        );
    }

    #[test]
    fn test_preflight_without_origin_still_halts() {
        let req = request_with_origin(Method::OPTIONS, None);
        let mut resp = ResponseBuilder::new();

        let flow = apply(&CorsPolicy::default(), &req, &mut resp);
        assert_eq!(flow, Flow::Halt);
        assert_eq!(resp.status_code(), StatusCode::NO_CONTENT);
        assert!(!resp.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
