//! Error types for the rule engine

use thiserror::Error;

/// Main error type for rule engine operations
#[derive(Debug, Error, Clone, serde::Serialize, serde::Deserialize)]
pub enum RuleEngineError {
    #[error("Invalid context: {reason}")]
    InvalidContext { reason: String },

    #[error("Unresolved target for rule {rule_id}: group {group_id} not found")]
    UnresolvedTarget { rule_id: String, group_id: String },

    #[error("Configuration error in rule {rule_id}: {reason}")]
    Configuration { rule_id: String, reason: String },

    #[error("Extension not found: {extension_id}")]
    ExtensionNotFound { extension_id: String },

    #[error("History write failed: {reason}")]
    HistoryWrite { reason: String },

    #[error("Extension host error: {reason}")]
    Host { reason: String },

    #[error("Rule store error: {reason}")]
    Store { reason: String },
}

impl RuleEngineError {
    /// Create a configuration error for a specific rule
    pub fn configuration(rule_id: &str, reason: &str) -> Self {
        Self::Configuration {
            rule_id: rule_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an extension host error
    pub fn host(reason: impl ToString) -> Self {
        Self::Host {
            reason: reason.to_string(),
        }
    }

    /// Create a rule store error
    pub fn store(reason: impl ToString) -> Self {
        Self::Store {
            reason: reason.to_string(),
        }
    }

    /// Whether the failed operation can be retried on a later cycle
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Recoverable - the next cycle or append may succeed
            RuleEngineError::ExtensionNotFound { .. } => true,
            RuleEngineError::HistoryWrite { .. } => true,
            RuleEngineError::Host { .. } => true,
            RuleEngineError::Store { .. } => true,
            RuleEngineError::UnresolvedTarget { .. } => true,
            RuleEngineError::InvalidContext { .. } => true,

            // Non-recoverable - the configuration itself must change
            RuleEngineError::Configuration { .. } => false,
        }
    }

    /// Whether this error aborts the whole evaluation cycle.
    ///
    /// Per-rule and per-extension failures are isolated; only
    /// configuration-shape errors take the cycle down.
    pub fn is_fatal_for_cycle(&self) -> bool {
        matches!(self, RuleEngineError::Configuration { .. })
    }
}

/// Result type for rule engine operations
pub type EngineResult<T> = Result<T, RuleEngineError>;
