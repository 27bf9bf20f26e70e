//! Collaborator interfaces consumed by the rule engine
//!
//! The browser's management API, the rule/group repository, and the history
//! repository are injected behind these traits so the engine can be driven
//! deterministically in tests without a live browser.

use crate::error::EngineResult;
use crate::types::{Group, Rule};
use async_trait::async_trait;
use extension_common::{ExtensionInfo, HistoryRecord};

/// Browser extension-management collaborator.
///
/// Enable/disable are atomic per extension and idempotent at the browser:
/// enabling an already-enabled extension is a no-op success.
#[async_trait]
pub trait ExtensionHost: Send + Sync {
    /// Look up one installed extension; `None` when it is not installed
    async fn get(&self, extension_id: &str) -> EngineResult<Option<ExtensionInfo>>;

    /// All installed extensions
    async fn list(&self) -> EngineResult<Vec<ExtensionInfo>>;

    async fn enable(&self, extension_id: &str) -> EngineResult<()>;

    async fn disable(&self, extension_id: &str) -> EngineResult<()>;

    /// Remove the extension from the browser
    async fn uninstall(&self, extension_id: &str) -> EngineResult<()>;

    async fn exists(&self, extension_id: &str) -> EngineResult<bool> {
        Ok(self.get(extension_id).await?.is_some())
    }
}

/// Read-only view over the externally persisted rule and group collections
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// All rules in declaration order. Order is significant: it is the
    /// tie-break when overlapping rules target the same extension.
    async fn list_rules(&self) -> EngineResult<Vec<Rule>>;

    async fn get_group(&self, group_id: &str) -> EngineResult<Option<Group>>;
}

/// Append-only history repository
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: HistoryRecord) -> EngineResult<()>;

    /// Most recent records, newest first
    async fn recent(&self, limit: usize) -> EngineResult<Vec<HistoryRecord>>;

    async fn clear(&self) -> EngineResult<()>;
}
