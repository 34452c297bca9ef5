//! Router module
//!
//! Maps (method, path) pairs to registered handlers. Registration happens
//! once at startup; the table is immutable afterward and dispatch is a
//! lookup plus a single handler invocation.

pub mod pattern;

pub use pattern::RoutePattern;

use std::sync::Arc;

use hyper::Method;

use crate::error::PipelineError;
use crate::http::{Request, ResponseBuilder};

/// Collaborator-supplied handler. Receives the request (decoded body and
/// captured parameters attached) and the mutable response builder, and is
/// solely responsible for status and body content of its route.
pub type Handler = Arc<dyn Fn(&Request, &mut ResponseBuilder) + Send + Sync>;

/// An immutable (method, pattern, handler) registration
struct Route {
    method: Method,
    pattern: RoutePattern,
    handler: Handler,
}

/// Route table plus dispatch discipline. Holds no business state.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a route. Routes are matched in registration order; the
    /// first match wins.
    pub fn register<H>(&mut self, method: Method, pattern: &str, handler: H)
    where
        H: Fn(&Request, &mut ResponseBuilder) + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: RoutePattern::parse(pattern),
            handler: Arc::new(handler),
        });
    }

    pub fn get<H>(&mut self, pattern: &str, handler: H)
    where
        H: Fn(&Request, &mut ResponseBuilder) + Send + Sync + 'static,
    {
        self.register(Method::GET, pattern, handler);
    }

    pub fn post<H>(&mut self, pattern: &str, handler: H)
    where
        H: Fn(&Request, &mut ResponseBuilder) + Send + Sync + 'static,
    {
        self.register(Method::POST, pattern, handler);
    }

    pub fn put<H>(&mut self, pattern: &str, handler: H)
    where
        H: Fn(&Request, &mut ResponseBuilder) + Send + Sync + 'static,
    {
        self.register(Method::PUT, pattern, handler);
    }

    pub fn delete<H>(&mut self, pattern: &str, handler: H)
    where
        H: Fn(&Request, &mut ResponseBuilder) + Send + Sync + 'static,
    {
        self.register(Method::DELETE, pattern, handler);
    }

    /// Dispatch a request to the first registration whose method and
    /// pattern match, attaching captured parameters first. No match fails
    /// with `NotFound`.
    pub fn dispatch(
        &self,
        req: &mut Request,
        resp: &mut ResponseBuilder,
    ) -> Result<(), PipelineError> {
        for route in &self.routes {
            if route.method != *req.method() {
                continue;
            }
            if let Some(params) = route.pattern.matches(req.path()) {
                req.set_params(params);
                (route.handler)(req, resp);
                return Ok(());
            }
        }

        Err(PipelineError::NotFound {
            method: req.method().clone(),
            path: req.path().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Bytes;
    use hyper::header::HeaderMap;
    use hyper::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_request(method: Method, path: &str) -> Request {
        Request::new(method, path, HeaderMap::new(), Bytes::new())
    }

    #[test]
    fn test_dispatch_invokes_matching_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut router = Router::new();
        router.get("/users", move |_req, resp| {
            counter.fetch_add(1, Ordering::SeqCst);
            resp.text("ok");
        });

        let mut req = make_request(Method::GET, "/users");
        let mut resp = ResponseBuilder::new();
        router.dispatch(&mut req, &mut resp).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resp.status_code(), StatusCode::OK);
    }

    #[test]
    fn test_unmatched_path_is_not_found() {
        let mut router = Router::new();
        router.get("/users", |_req, resp| {
            resp.text("ok");
        });

        let mut req = make_request(Method::GET, "/missing");
        let mut resp = ResponseBuilder::new();
        let err = router.dispatch(&mut req, &mut resp).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_method_must_match() {
        let mut router = Router::new();
        router.get("/users", |_req, resp| {
            resp.text("ok");
        });

        let mut req = make_request(Method::POST, "/users");
        let mut resp = ResponseBuilder::new();
        let err = router.dispatch(&mut req, &mut resp).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut router = Router::new();
        router.get("/users/:id", |_req, resp| {
            resp.text("param");
        });
        router.get("/users/me", |_req, resp| {
            resp.text("exact");
        });

        // "/users/me" matches the parameterized route registered first.
        let mut req = make_request(Method::GET, "/users/me");
        let mut resp = ResponseBuilder::new();
        router.dispatch(&mut req, &mut resp).unwrap();
        assert_eq!(resp.body_len(), "param".len());
    }

    #[test]
    fn test_captured_params_are_delivered() {
        let mut router = Router::new();
        router.get("/users/:id", |req, resp| {
            let id = req.param("id").unwrap_or("?").to_string();
            resp.text(id);
        });

        let mut req = make_request(Method::GET, "/users/17");
        let mut resp = ResponseBuilder::new();
        router.dispatch(&mut req, &mut resp).unwrap();
        assert_eq!(resp.body_len(), 2);
    }
}
