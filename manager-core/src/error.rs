//! Error types for manager operations

use rule_engine::RuleEngineError;
use thiserror::Error;

/// Main error type for manager operations
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Extension not found: {extension_id}")]
    NotFound { extension_id: String },

    #[error("History error: {0}")]
    History(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Rule engine error: {0}")]
    Engine(#[from] RuleEngineError),
}

impl ManagerError {
    pub fn not_found(extension_id: &str) -> Self {
        Self::NotFound {
            extension_id: extension_id.to_string(),
        }
    }
}
