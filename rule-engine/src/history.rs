//! History recorder: immutable audit records for applied actions

use crate::error::RuleEngineError;
use crate::traits::HistoryStore;
use crate::types::{DispatchOutcome, DispatchReport, ExtensionAction};
use extension_common::{HistoryEvent, HistoryRecord};
use std::sync::Arc;
use tracing::warn;

/// Appends one record per applied action to the history collaborator.
///
/// History is best-effort observability, not a transactional ledger: a
/// failed append is reported and swallowed, never rolling back the action
/// that was already applied. Retried only on the next independent append.
pub struct HistoryRecorder {
    store: Arc<dyn HistoryStore>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Write records for every `Applied` entry in the report, attributing
    /// each to its originating rule (and the group its target resolved
    /// through). No-ops and skips leave no trace. Returns the number of
    /// records actually persisted.
    pub async fn record_cycle(&self, report: &DispatchReport) -> usize {
        let mut written = 0;

        for dispatched in &report.actions {
            if dispatched.outcome != DispatchOutcome::Applied {
                continue;
            }

            let event = match dispatched.planned.action {
                ExtensionAction::Enable => HistoryEvent::RuleEnabled,
                ExtensionAction::Disable => HistoryEvent::RuleDisabled,
            };

            let mut record = HistoryRecord::new(&dispatched.planned.extension_id, event)
                .with_rule(
                    &dispatched.planned.rule_id,
                    dispatched.planned.group_id.as_deref(),
                );
            if let Some(info) = &dispatched.extension {
                record = record.with_extension(info);
            }

            match self.store.append(record).await {
                Ok(()) => written += 1,
                Err(e) => {
                    let err = RuleEngineError::HistoryWrite {
                        reason: e.to_string(),
                    };
                    warn!(extension_id = %dispatched.planned.extension_id, "{err}");
                }
            }
        }

        written
    }
}
