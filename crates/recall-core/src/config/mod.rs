pub mod defaults;
mod embedding_config;
mod observability_config;
mod optimization_budget;
mod retrieval_config;

use std::path::Path;

pub use embedding_config::EmbeddingConfig;
pub use observability_config::ObservabilityConfig;
pub use optimization_budget::OptimizationBudget;
pub use retrieval_config::RetrievalConfig;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    pub retrieval: RetrievalConfig,
    pub optimizer: OptimizationBudget,
    pub embedding: EmbeddingConfig,
    pub observability: ObservabilityConfig,
}

impl RecallConfig {
    /// Parse from a TOML string. Missing sections and fields take defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;
        config.optimizer.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }
}
