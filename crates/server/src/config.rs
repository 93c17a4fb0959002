//! Listener configuration for the HTTP transport

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

/// Port used when nothing else is configured
pub const DEFAULT_HTTP_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    /// Attach a permissive CORS layer to every route
    pub cors_allow_any_origin: bool,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
            cors_allow_any_origin: true,
        }
    }

    pub fn with_cors(mut self, allow_any_origin: bool) -> Self {
        self.cors_allow_any_origin = allow_any_origin;
        self
    }

    pub fn http_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.http_port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.http_port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_HTTP_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_addr() {
        let config = ServerConfig::new("0.0.0.0", 8000);
        assert_eq!(config.http_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig::new("not a host", 8000);
        assert!(matches!(config.http_addr(), Err(ServerError::InvalidAddress(_))));
    }

    #[test]
    fn test_default_allows_any_origin() {
        let config = ServerConfig::default();
        assert!(config.cors_allow_any_origin);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
    }
}
