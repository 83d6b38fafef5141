//! Configuration management for the custom metric provider
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CM_ prefix
//! 4. `OPENSCALE_API_KEY` for the OpenScale API key

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Watson OpenScale configuration
    pub openscale: OpenScaleConfig,

    /// Metric evaluation configuration
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenScaleConfig {
    /// IBM Cloud API key used for both OpenScale and the evaluator
    #[serde(default)]
    pub api_key: String,

    /// OpenScale REST base URL
    pub base_url: String,

    /// IAM token endpoint
    pub iam_url: String,

    /// OpenScale service instance (data mart) ID
    pub service_instance_id: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationConfig {
    /// Remote evaluator for model-based metrics; skipped when unset
    pub governance_endpoint: Option<String>,

    /// Maximum payload records evaluated per run
    pub payload_limit: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("CM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("openscale.base_url", "https://api.aiopenscale.cloud.ibm.com")?
            .set_default("openscale.iam_url", "https://iam.cloud.ibm.com/identity/token")?
            .set_default(
                "openscale.service_instance_id",
                "00000000-0000-0000-0000-000000000000",
            )?
            .set_default("openscale.timeout_secs", 60)?
            .set_default("evaluation.payload_limit", i64::from(shared::PAYLOAD_RECORD_LIMIT))?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CM_ prefix)
            .add_source(
                Environment::with_prefix("CM")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("openscale.api_key", std::env::var("OPENSCALE_API_KEY").ok())?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.openscale.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "Environment variable OPENSCALE_API_KEY is not set".to_string(),
            ));
        }
        if self.evaluation.payload_limit == 0 {
            return Err(ConfigError::Message(
                "evaluation.payload_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        openscale: OpenScaleConfig {
            api_key: "secret".to_string(),
            base_url: "http://localhost:9".to_string(),
            iam_url: "http://localhost:9/token".to_string(),
            service_instance_id: "instance".to_string(),
            timeout_secs: 5,
        },
        evaluation: EvaluationConfig {
            governance_endpoint: None,
            payload_limit: 500,
        },
    }
}
