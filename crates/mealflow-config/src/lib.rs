//! Configuration module for the mealflow order system.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set before the service starts taking traffic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the mealflow service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// HTTP server binding.
	#[serde(default)]
	pub server: ServerConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Bearer-token verification settings.
	pub auth: AuthConfig,
	/// Checkout pricing parameters.
	#[serde(default)]
	pub pricing: PricingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ServerConfig {
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

fn default_port() -> u16 {
	8080
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which backend implementation to use ("memory" or "file").
	pub backend: String,
	/// Backend-specific configuration, validated by the backend's schema.
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

fn empty_table() -> toml::Value {
	toml::Value::Table(toml::map::Map::new())
}

/// Bearer-token verification settings.
///
/// Tokens are issued by the external auth service; this service only
/// verifies their signature against the shared secret.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
	pub shared_secret: String,
}

/// Checkout pricing parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
	/// Sales tax rate applied to the order subtotal.
	#[serde(default = "default_tax_rate")]
	pub tax_rate: Decimal,
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			tax_rate: default_tax_rate(),
		}
	}
}

fn default_tax_rate() -> Decimal {
	// 8% sales tax
	Decimal::new(8, 2)
}

impl Config {
	/// Parses and validates configuration from a TOML string.
	pub fn from_str_validated(content: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads and validates configuration from a TOML file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await?;
		Self::from_str_validated(&content)
	}

	/// Validates configuration invariants not expressible in serde.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.storage.backend.is_empty() {
			return Err(ConfigError::Validation(
				"storage.backend must not be empty".to_string(),
			));
		}
		if self.auth.shared_secret.is_empty() {
			return Err(ConfigError::Validation(
				"auth.shared_secret must not be empty".to_string(),
			));
		}
		if self.pricing.tax_rate < Decimal::ZERO || self.pricing.tax_rate >= Decimal::ONE {
			return Err(ConfigError::Validation(format!(
				"pricing.tax_rate must be in [0, 1), got {}",
				self.pricing.tax_rate
			)));
		}
		if self.server.port == 0 {
			return Err(ConfigError::Validation(
				"server.port must not be 0".to_string(),
			));
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_str_validated(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	const MINIMAL: &str = r#"
[storage]
backend = "memory"

[auth]
shared_secret = "test-secret"
"#;

	#[test]
	fn parses_minimal_config_with_defaults() {
		let config = Config::from_str_validated(MINIMAL).unwrap();
		assert_eq!(config.server.host, "127.0.0.1");
		assert_eq!(config.server.port, 8080);
		assert_eq!(config.storage.backend, "memory");
		assert_eq!(config.pricing.tax_rate, dec!(0.08));
	}

	#[test]
	fn parses_full_config() {
		let content = r#"
[server]
host = "0.0.0.0"
port = 9090

[storage]
backend = "file"
[storage.config]
storage_path = "/var/lib/mealflow"

[auth]
shared_secret = "prod-secret"

[pricing]
tax_rate = 0.1
"#;
		let config = Config::from_str_validated(content).unwrap();
		assert_eq!(config.server.port, 9090);
		assert_eq!(config.storage.backend, "file");
		assert_eq!(
			config.storage.config.get("storage_path").and_then(|v| v.as_str()),
			Some("/var/lib/mealflow")
		);
		assert_eq!(config.pricing.tax_rate, dec!(0.1));
	}

	#[test]
	fn rejects_empty_secret() {
		let content = r#"
[storage]
backend = "memory"

[auth]
shared_secret = ""
"#;
		assert!(matches!(
			Config::from_str_validated(content),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn rejects_out_of_range_tax_rate() {
		let content = r#"
[storage]
backend = "memory"

[auth]
shared_secret = "s"

[pricing]
tax_rate = 1.5
"#;
		assert!(matches!(
			Config::from_str_validated(content),
			Err(ConfigError::Validation(_))
		));
	}

	#[tokio::test]
	async fn loads_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, MINIMAL).unwrap();

		let config = Config::from_file(path.to_str().unwrap()).await.unwrap();
		assert_eq!(config.storage.backend, "memory");
	}
}
