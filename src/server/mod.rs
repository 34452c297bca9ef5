// Server module entry point
// The listener: bind, accept loop, and shutdown lifecycle

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::bind_listener;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Notify;

use crate::config::AppState;
use crate::error::StartupError;
use crate::logger;

/// The listening server, an explicit object with a bind/run/shutdown
/// lifecycle so isolated instances can run side by side in tests.
pub struct Server {
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
}

impl Server {
    /// Bind the configured address and log the readiness message.
    ///
    /// A port already in use is fatal: the error is surfaced to the caller
    /// and nothing is retried.
    pub fn bind(state: Arc<AppState>) -> Result<Self, StartupError> {
        let addr = state.config.socket_addr()?;
        let listener =
            bind_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;

        // Log the bound address; with port 0 this is the assigned one
        let bound = listener.local_addr().unwrap_or(addr);
        logger::log_server_start(&bound);

        Ok(Self {
            listener,
            state,
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// The bound address (the configured one unless port 0 was requested)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle that stops the accept loop when notified
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Accept connections until shutdown is requested.
    ///
    /// Each accepted connection is served on its own local task; a failed
    /// accept is logged and the loop continues. Must run inside a
    /// `LocalSet`.
    pub async fn run(self) {
        let access_log = self.state.config.logging.access_log;

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            if access_log {
                                logger::log_connection_accepted(&peer_addr);
                            }
                            connection::serve(stream, peer_addr, Arc::clone(&self.state));
                        }
                        Err(e) => {
                            logger::log_error(&format!("Failed to accept connection: {e}"));
                        }
                    }
                }

                () = self.shutdown.notified() => {
                    logger::log_server_stop();
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HttpConfig, LoggingConfig, ServerConfig};
    use crate::router::Router;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            http: HttpConfig {
                server_name: "user-api-test".to_string(),
                enable_cors: true,
                max_body_size: 102_400,
                keep_alive: false,
            },
        }
    }

    fn test_state(router: Router) -> Arc<AppState> {
        Arc::new(AppState::new(test_config(), router))
    }

    #[tokio::test]
    async fn test_isolated_instances_bind_distinct_ports() {
        let first = Server::bind(test_state(Router::new())).unwrap();
        let second = Server::bind(test_state(Router::new())).unwrap();

        let a = first.local_addr().unwrap();
        let b = second.local_addr().unwrap();
        assert_ne!(a.port(), b.port());
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_accept_loop() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let server = Server::bind(test_state(Router::new())).unwrap();
                let shutdown = server.shutdown_handle();

                let task = tokio::task::spawn_local(server.run());
                shutdown.notify_one();
                task.await.unwrap();
            })
            .await;
    }

    #[tokio::test]
    async fn test_serves_a_request_over_tcp() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let mut router = Router::new();
                router.get("/ping", |_req, resp| {
                    resp.text("pong");
                });

                let server = Server::bind(test_state(router)).unwrap();
                let addr = server.local_addr().unwrap();
                let shutdown = server.shutdown_handle();
                let task = tokio::task::spawn_local(server.run());

                let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
                stream
                    .write_all(
                        b"GET /ping HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
                    )
                    .await
                    .unwrap();

                let mut buf = Vec::new();
                stream.read_to_end(&mut buf).await.unwrap();
                let response = String::from_utf8_lossy(&buf);
                assert!(response.starts_with("HTTP/1.1 200"));
                assert!(response.ends_with("pong"));

                shutdown.notify_one();
                task.await.unwrap();
            })
            .await;
    }
}
