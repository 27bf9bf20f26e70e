//! Extension inventory service: list, search, annotate, toggle
//!
//! The presentation glue of the manager minus any rendering: everything a
//! front-end needs to show the inventory, search it, rename entries, flip
//! extensions manually, and browse the audit history. Manual changes are
//! recorded in history just like rule-driven ones, with a remark instead of
//! a rule attribution.

use crate::error::ManagerError;
use crate::search::is_match;
use crate::Result;
use dashmap::DashMap;
use extension_common::{ExtensionAttachment, ExtensionInfo, HistoryEvent, HistoryRecord};
use rule_engine::{ExtensionHost, HistoryStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Remark written on history records produced by a manual toggle
const MANUAL_REMARK: &str = "manual";

/// One inventory row: browser metadata plus the user's annotations
#[derive(Debug, Clone)]
pub struct ExtensionRow {
    pub info: ExtensionInfo,
    pub attachment: ExtensionAttachment,
}

impl ExtensionRow {
    /// Alias when set, the extension's own name otherwise
    pub fn display_name(&self) -> &str {
        self.attachment.display_name(&self.info.name)
    }
}

/// Inventory operations over the injected management and history
/// collaborators. Annotations live in an in-memory map; persisting them is
/// the embedding application's concern.
pub struct ExtensionService {
    host: Arc<dyn ExtensionHost>,
    history: Arc<dyn HistoryStore>,
    attachments: DashMap<String, ExtensionAttachment>,
}

impl ExtensionService {
    pub fn new(host: Arc<dyn ExtensionHost>, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            host,
            history,
            attachments: DashMap::new(),
        }
    }

    /// Seed annotations loaded by the embedding application
    pub fn with_attachments(
        self,
        attachments: impl IntoIterator<Item = (String, ExtensionAttachment)>,
    ) -> Self {
        for (id, attachment) in attachments {
            self.attachments.insert(id, attachment);
        }
        self
    }

    /// All installed extensions with their annotations
    pub async fn list(&self) -> Result<Vec<ExtensionRow>> {
        let infos = self.host.list().await?;
        Ok(infos
            .into_iter()
            .map(|info| {
                let attachment = self.attachment(&info.id);
                ExtensionRow { info, attachment }
            })
            .collect())
    }

    /// Inventory rows matching the search word across name, short name,
    /// description, alias, remark, and id
    pub async fn search(&self, word: &str) -> Result<Vec<ExtensionRow>> {
        let rows = self.list().await?;
        Ok(rows
            .into_iter()
            .filter(|row| {
                is_match(
                    &[
                        Some(row.info.name.as_str()),
                        Some(row.info.short_name.as_str()),
                        Some(row.info.description.as_str()),
                        row.attachment.alias.as_deref(),
                        row.attachment.remark.as_deref(),
                        Some(row.info.id.as_str()),
                    ],
                    word,
                )
            })
            .collect())
    }

    pub fn attachment(&self, extension_id: &str) -> ExtensionAttachment {
        self.attachments
            .get(extension_id)
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn set_alias(&self, extension_id: &str, alias: Option<String>) {
        let mut entry = self.attachments.entry(extension_id.to_string()).or_default();
        entry.alias = alias.filter(|a| !a.trim().is_empty());
        debug!(extension_id, "Alias updated");
    }

    pub fn set_remark(&self, extension_id: &str, remark: Option<String>) {
        let mut entry = self.attachments.entry(extension_id.to_string()).or_default();
        entry.remark = remark.filter(|r| !r.trim().is_empty());
        debug!(extension_id, "Remark updated");
    }

    /// Manually enable or disable one extension.
    ///
    /// Returns `true` when the state actually changed. A toggle to the
    /// current state is a no-op success and writes no history.
    pub async fn set_enabled(&self, extension_id: &str, enabled: bool) -> Result<bool> {
        let info = self
            .host
            .get(extension_id)
            .await?
            .ok_or_else(|| ManagerError::not_found(extension_id))?;

        if info.enabled == enabled {
            return Ok(false);
        }

        if enabled {
            self.host.enable(extension_id).await?;
        } else {
            self.host.disable(extension_id).await?;
        }
        info!(extension_id, enabled, "Extension toggled manually");

        let event = if enabled {
            HistoryEvent::Enabled
        } else {
            HistoryEvent::Disabled
        };
        let record = HistoryRecord::new(extension_id, event)
            .with_extension(&info)
            .with_remark(MANUAL_REMARK);
        self.append_history(record).await?;

        Ok(true)
    }

    /// Remove the extension from the browser and record the removal
    pub async fn uninstall(&self, extension_id: &str) -> Result<()> {
        let info = self
            .host
            .get(extension_id)
            .await?
            .ok_or_else(|| ManagerError::not_found(extension_id))?;

        self.host.uninstall(extension_id).await?;
        self.attachments.remove(extension_id);
        info!(extension_id, "Extension uninstalled");

        let record =
            HistoryRecord::new(extension_id, HistoryEvent::Uninstalled).with_extension(&info);
        self.append_history(record).await?;

        Ok(())
    }

    /// Most recent history records, newest first
    pub async fn history(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        Ok(self.history.recent(limit).await?)
    }

    /// History records matching the search word across name, remark, and
    /// extension id
    pub async fn search_history(&self, word: &str, limit: usize) -> Result<Vec<HistoryRecord>> {
        let records = self.history.recent(limit).await?;
        Ok(records
            .into_iter()
            .filter(|record| {
                let attachment = self.attachment(&record.extension_id);
                is_match(
                    &[
                        Some(record.name.as_str()),
                        record.remark.as_deref(),
                        attachment.alias.as_deref(),
                        attachment.remark.as_deref(),
                        Some(record.extension_id.as_str()),
                    ],
                    word,
                )
            })
            .collect())
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.history.clear().await?;
        info!("History cleared");
        Ok(())
    }

    async fn append_history(&self, record: HistoryRecord) -> Result<()> {
        self.history
            .append(record)
            .await
            .map_err(|e| ManagerError::History(e.to_string()))
    }
}
