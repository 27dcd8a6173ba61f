//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Every field has a default, so an absent file yields a fully usable
//! configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Identity and negotiation settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// WebSocket binding settings.
    #[serde(default)]
    pub websocket: WebSocketConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.name.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "server.name must not be empty".to_string(),
            });
        }

        if let Some(ref version) = self.server.protocol_version {
            if version.is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "server.protocol_version must not be empty when set".to_string(),
                });
            }
        }

        if self.websocket.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "websocket.port must not be 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Server identity and negotiation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Server name advertised in the initialize response.
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Pinned protocol version. `None` keeps the binding's own default —
    /// the two reference deployments advertise different versions for the
    /// same wire contract, so neither value is treated as canonical.
    #[serde(default)]
    pub protocol_version: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            protocol_version: None,
        }
    }
}

fn default_server_name() -> String {
    "mcp-test-server".to_string()
}

/// WebSocket binding configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebSocketConfig {
    /// Host to bind the listener on.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the listener on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8765
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.name, "mcp-test-server");
        assert_eq!(config.websocket.host, "127.0.0.1");
        assert_eq!(config.websocket.port, 8765);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "server": {
                "name": "conformance-server",
                "protocol_version": "2024-11-05"
            },
            "websocket": {
                "host": "0.0.0.0",
                "port": 9000
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.name, "conformance-server");
        assert_eq!(
            config.server.protocol_version,
            Some("2024-11-05".to_string())
        );
        assert_eq!(config.websocket.host, "0.0.0.0");
        assert_eq!(config.websocket.port, 9000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.name, "mcp-test-server");
        assert!(config.protocol_version.is_none());
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_empty_server_name() {
        let json = r#"{
            "server": {
                "name": ""
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_zero_port() {
        let json = r#"{
            "websocket": {
                "port": 0
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
