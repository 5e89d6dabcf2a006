use crate::types::{NodeId, UserId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Port layout constants for the simulated network
pub mod ports {
    /// Default port for the node registry
    pub const REGISTRY: u16 = 8080;

    /// Base port for relay nodes (relay n listens on BASE + n)
    pub const RELAY_BASE: u16 = 4000;

    /// Base port for user services (user u listens on BASE + u)
    pub const USER_BASE: u16 = 3000;
}

/// Circuit routing constants
pub mod routing {
    /// Number of hops in a circuit
    pub const DEFAULT_CIRCUIT_LENGTH: usize = 3;
}

/// Network configuration shared by every service in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Port the registry listens on
    pub registry_port: u16,

    /// Base port for relay nodes
    pub base_relay_port: u16,

    /// Base port for user services
    pub base_user_port: u16,

    /// Number of relays in each circuit
    pub circuit_length: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            registry_port: ports::REGISTRY,
            base_relay_port: ports::RELAY_BASE,
            base_user_port: ports::USER_BASE,
            circuit_length: routing::DEFAULT_CIRCUIT_LENGTH,
        }
    }
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry_port(mut self, port: u16) -> Self {
        self.registry_port = port;
        self
    }

    pub fn with_base_relay_port(mut self, port: u16) -> Self {
        self.base_relay_port = port;
        self
    }

    pub fn with_base_user_port(mut self, port: u16) -> Self {
        self.base_user_port = port;
        self
    }

    pub fn with_circuit_length(mut self, length: usize) -> Self {
        self.circuit_length = length;
        self
    }

    /// Listening port of a relay node
    pub fn relay_port(&self, node_id: NodeId) -> u16 {
        self.base_relay_port + node_id.value()
    }

    /// Listening port of a user service
    pub fn user_port(&self, user_id: UserId) -> u16 {
        self.base_user_port + user_id.value()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.registry_port, ports::REGISTRY);
        assert_eq!(config.circuit_length, routing::DEFAULT_CIRCUIT_LENGTH);
    }

    #[test]
    fn test_config_builder() {
        let config = NetworkConfig::new()
            .with_registry_port(9999)
            .with_base_relay_port(5000)
            .with_circuit_length(5);

        assert_eq!(config.registry_port, 9999);
        assert_eq!(config.base_relay_port, 5000);
        assert_eq!(config.circuit_length, 5);
    }

    #[test]
    fn test_port_derivation() {
        let config = NetworkConfig::default();
        assert_eq!(config.relay_port(NodeId(3)), ports::RELAY_BASE + 3);
        assert_eq!(config.user_port(UserId(1)), ports::USER_BASE + 1);
    }
}
