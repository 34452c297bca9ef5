// Application state module
// Everything a request needs, assembled once at startup and immutable after

use hyper::header::HeaderValue;

use super::types::Config;
use crate::pipeline::Pipeline;
use crate::router::Router;

/// Shared application state.
///
/// Built once at startup and shared read-only across connections; the
/// route table and stage list never change after construction, so no
/// locking is involved.
pub struct AppState {
    pub config: Config,
    pub pipeline: Pipeline,
    pub router: Router,
    /// Precomputed `Server` response header value
    pub server_header: HeaderValue,
}

impl AppState {
    /// Assemble the state: the pipeline composition comes from the HTTP
    /// configuration, the route table from the collaborator modules.
    pub fn new(config: Config, router: Router) -> Self {
        let pipeline = Pipeline::from_config(&config.http);
        let server_header = HeaderValue::from_str(&config.http.server_name)
            .unwrap_or_else(|_| HeaderValue::from_static("user-api"));

        Self {
            config,
            pipeline,
            router,
            server_header,
        }
    }
}
