use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod pipeline;
mod router;
mod server;
mod users;

use config::{AppState, Config};
use error::StartupError;
use router::Router;
use server::Server;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let cfg = Config::load()?;
    logger::init(&cfg).map_err(StartupError::Logger)?;

    // Single-threaded, event-driven: one reactor thread, connections
    // interleave only at await points
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), StartupError> {
    // Route registrations happen once here; the table is immutable afterward
    let mut router = Router::new();
    users::register(&mut router);

    let state = Arc::new(AppState::new(cfg, router));
    logger::log_pipeline_stages(&state.pipeline.stage_names());

    let srv = Server::bind(state)?;

    server::signal::install(srv.shutdown_handle());

    // Connections are served on local tasks
    let local = tokio::task::LocalSet::new();
    local.run_until(srv.run()).await;
    Ok(())
}
