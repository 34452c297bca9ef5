//! Request handler module
//!
//! The per-request entry point: converts the wire request into the pipeline
//! request, runs the stages and the router in fixed order, converts error
//! conditions into responses, and writes the access log line.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderMap, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::Response;

use crate::config::AppState;
use crate::error::PipelineError;
use crate::http::{Request, ResponseBuilder};
use crate::logger::{self, AccessLogEntry};
use crate::pipeline::Flow;

/// Main entry point for HTTP request handling.
///
/// Generic over the body type: hyper's `Incoming` in production, a buffered
/// body in tests. Never fails; every condition becomes a response.
pub async fn handle_request<B>(
    req: hyper::Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_string(req.headers(), REFERER);
    entry.user_agent = header_string(req.headers(), USER_AGENT);

    let resp = process(req, &state).await;

    entry.status = resp.status_code().as_u16();
    entry.body_bytes = resp.body_len();
    if state.config.logging.access_log {
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(resp.finish())
}

/// Run one request through the full stage order exactly once:
/// pipeline stages first, then the router, errors converted in place.
async fn process<B>(req: hyper::Request<B>, state: &AppState) -> ResponseBuilder
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let (parts, body) = req.into_parts();

    let mut resp = ResponseBuilder::new();
    resp.header(SERVER, state.server_header.clone());

    // Reject an oversized declared length before buffering the body
    let limit = state.config.http.max_body_size;
    if let Some(declared) = declared_content_length(&parts.headers) {
        if declared > limit {
            let err = PipelineError::PayloadTooLarge {
                size: declared,
                limit,
            };
            logger::log_warning(&err.to_string());
            err.write_to(&mut resp);
            return resp;
        }
    }

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            PipelineError::BadRequest("failed to read request body".to_string())
                .write_to(&mut resp);
            return resp;
        }
    };

    let mut req = Request::new(parts.method, parts.uri.path(), parts.headers, bytes);

    match state.pipeline.run(&mut req, &mut resp) {
        Ok(Flow::Halt) => resp,
        Ok(Flow::Continue) => {
            if let Err(err) = state.router.dispatch(&mut req, &mut resp) {
                err.write_to(&mut resp);
            }
            resp
        }
        Err(err) => {
            logger::log_warning(&err.to_string());
            err.write_to(&mut resp);
            resp
        }
    }
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
}
