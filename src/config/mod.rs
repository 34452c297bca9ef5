// Configuration module entry point
// Loads the optional config file, environment overrides, and defaults

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, ServerConfig};

use crate::error::StartupError;

impl Config {
    /// Load configuration from the default "config.toml" location
    pub fn load() -> Result<Self, StartupError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension).
    ///
    /// Every key has a default, so a missing file runs the service on its
    /// stock settings: port 5000, cross-origin handling on, and the 100 KB
    /// decode limit.
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("http.server_name", "user-api/0.1")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 102_400)? // 100KB
            .set_default("http.keep_alive", true)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// The address the listener binds
    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|source| StartupError::Addr { addr, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert!(cfg.http.enable_cors);
        assert_eq!(cfg.http.max_body_size, 102_400);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.logging.access_log_file.is_none());
    }

    #[test]
    fn test_socket_addr_combines_host_and_port() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:5000");
    }
}
