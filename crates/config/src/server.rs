//! HTTP listener configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use cslens_protocol::DEFAULT_MAX_PAYLOAD_SIZE;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Default collector path prefix
pub const DEFAULT_PATH_PREFIX: &str = "/OneCollector";

/// HTTP listener configuration
///
/// # Example
///
/// ```toml
/// [server]
/// address = "0.0.0.0"
/// port = 8080
/// path_prefix = "/OneCollector"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    /// Default: 127.0.0.1
    pub address: IpAddr,

    /// Listen port
    /// Default: 5000
    pub port: u16,

    /// Requests under this prefix are decoded
    /// Default: "/OneCollector"
    pub path_prefix: String,

    /// Largest accepted request body (bytes)
    /// Default: 16MB
    pub max_payload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            path_prefix: DEFAULT_PATH_PREFIX.into(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl ServerConfig {
    /// Socket address to bind
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.path_prefix.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "server",
                "path_prefix",
                format!("'{}' must start with '/'", self.path_prefix),
            ));
        }
        if self.max_payload_size == 0 {
            return Err(ConfigError::invalid_value(
                "server",
                "max_payload_size",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.path_prefix, "/OneCollector");
        assert_eq!(config.max_payload_size, DEFAULT_MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ServerConfig = toml::from_str("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_deserialize_ipv6() {
        let config: ServerConfig = toml::from_str(r#"address = "::""#).unwrap();
        assert_eq!(config.socket_addr().to_string(), "[::]:5000");
    }

    #[test]
    fn test_validate_path_prefix() {
        let config = ServerConfig {
            path_prefix: "OneCollector".into(),
            ..ServerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("path_prefix"));
    }
}
