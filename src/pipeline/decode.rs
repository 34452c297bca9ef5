//! Body decoding module
//!
//! Parses JSON request payloads into a structured value for downstream
//! handlers. Anything without a JSON content type passes through untouched.

use hyper::header::CONTENT_TYPE;

use crate::error::PipelineError;
use crate::http::Request;

/// Decode the request body when the content type declares JSON.
///
/// A malformed payload fails with `BadRequest`; a payload over `limit`
/// bytes fails with `PayloadTooLarge`. Both abort the pipeline before the
/// router runs. An absent or unrecognized content type is a no-op, and so
/// is a zero-length JSON body (no payload to attach).
pub fn decode(req: &mut Request, limit: u64) -> Result<(), PipelineError> {
    if !has_json_content_type(req) {
        return Ok(());
    }

    let body = req.body();
    if body.len() as u64 > limit {
        return Err(PipelineError::PayloadTooLarge {
            size: body.len() as u64,
            limit,
        });
    }
    if body.is_empty() {
        return Ok(());
    }

    match serde_json::from_slice(body) {
        Ok(value) => {
            req.set_json(value);
            Ok(())
        }
        Err(e) => Err(PipelineError::BadRequest(e.to_string())),
    }
}

/// True when the Content-Type essence is `application/json`, ignoring
/// parameters such as `;charset=utf-8`
fn has_json_content_type(req: &Request) -> bool {
    req.header(CONTENT_TYPE)
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Bytes;
    use hyper::header::{HeaderMap, HeaderValue};
    use hyper::{Method, StatusCode};

    fn json_request(body: &'static [u8], content_type: &'static str) -> Request {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Request::new(Method::POST, "/users", headers, Bytes::from_static(body))
    }

    #[test]
    fn test_valid_json_is_attached() {
        let mut req = json_request(b"{\"name\":\"a\"}", "application/json");
        decode(&mut req, 102_400).unwrap();

        assert_eq!(req.json(), Some(&serde_json::json!({"name": "a"})));
    }

    #[test]
    fn test_charset_parameter_is_ignored() {
        let mut req = json_request(b"[1,2,3]", "application/json; charset=utf-8");
        decode(&mut req, 102_400).unwrap();

        assert_eq!(req.json(), Some(&serde_json::json!([1, 2, 3])));
    }

    #[test]
    fn test_truncated_json_is_bad_request() {
        let mut req = json_request(b"{\"name\":", "application/json");
        let err = decode(&mut req, 102_400).unwrap_err();

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(req.json().is_none());
    }

    #[test]
    fn test_other_content_types_pass_through() {
        let mut req = json_request(b"name=a", "application/x-www-form-urlencoded");
        decode(&mut req, 102_400).unwrap();

        assert!(req.json().is_none());
        assert_eq!(req.body().as_ref(), b"name=a");
    }

    #[test]
    fn test_missing_content_type_passes_through() {
        let mut req = Request::new(
            Method::POST,
            "/users",
            HeaderMap::new(),
            Bytes::from_static(b"{\"name\":\"a\"}"),
        );
        decode(&mut req, 102_400).unwrap();

        assert!(req.json().is_none());
    }

    #[test]
    fn test_empty_json_body_is_a_noop() {
        let mut req = json_request(b"", "application/json");
        decode(&mut req, 102_400).unwrap();

        assert!(req.json().is_none());
    }

    #[test]
    fn test_oversized_body_is_rejected() {
        let mut req = json_request(b"{\"name\":\"a\"}", "application/json");
        let err = decode(&mut req, 4).unwrap_err();

        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(req.json().is_none());
    }
}
