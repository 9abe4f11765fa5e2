//! Server configuration.
//!
//! Plain data with serde support so a host can load it from TOML, YAML, env
//! or anything else it already uses. missive itself reads no files.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind. Defaults to every IPv4 interface.
    pub host: IpAddr,
    /// TCP port, `1..=65535`.
    pub port: u16,
    /// How long `stop` waits for in-flight exchanges before aborting them.
    pub shutdown_grace_ms: u64,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self { port, ..Self::default() }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            shutdown_grace_ms: 5_000,
        }
    }
}
