//! Action dispatcher: applies a plan through the extension host

use crate::cycle::CycleToken;
use crate::error::RuleEngineError;
use crate::traits::ExtensionHost;
use crate::types::{
    DispatchOutcome, DispatchReport, DispatchedAction, ExtensionAction, ExtensionActionPlan,
    PlannedAction,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies per-extension actions via the management collaborator.
///
/// Entries are independent and are issued concurrently; no ordering is
/// guaranteed between extensions within one plan. Failures are isolated per
/// entry: one uninstalled extension never blocks the rest of the plan.
pub struct ActionDispatcher {
    host: Arc<dyn ExtensionHost>,
}

impl ActionDispatcher {
    pub fn new(host: Arc<dyn ExtensionHost>) -> Self {
        Self { host }
    }

    /// Apply every plan entry and report one terminal outcome per entry,
    /// in plan order.
    ///
    /// Idempotent: an extension already in the desired state reports
    /// `SkippedNoOp` without touching the host. Entries whose call has not
    /// been issued when the cycle goes stale report `Cancelled`; calls
    /// already issued are never rolled back.
    pub async fn dispatch(&self, plan: &ExtensionActionPlan, token: &CycleToken) -> DispatchReport {
        let mut set = tokio::task::JoinSet::new();
        for (slot, entry) in plan.entries().iter().cloned().enumerate() {
            let host = Arc::clone(&self.host);
            let token = token.clone();
            set.spawn(async move { (slot, Self::dispatch_one(host, entry, token).await) });
        }

        let mut slots: Vec<Option<DispatchedAction>> = vec![None; plan.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((slot, action)) => slots[slot] = Some(action),
                Err(e) => warn!("Dispatch task failed to join: {e}"),
            }
        }

        DispatchReport {
            actions: slots.into_iter().flatten().collect(),
        }
    }

    async fn dispatch_one(
        host: Arc<dyn ExtensionHost>,
        planned: PlannedAction,
        token: CycleToken,
    ) -> DispatchedAction {
        if !token.is_live() {
            return DispatchedAction {
                planned,
                outcome: DispatchOutcome::Cancelled,
                extension: None,
            };
        }

        let current = match host.get(&planned.extension_id).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                let err = RuleEngineError::ExtensionNotFound {
                    extension_id: planned.extension_id.clone(),
                };
                warn!(rule_id = %planned.rule_id, "{err}, entry skipped");
                return DispatchedAction {
                    planned,
                    outcome: DispatchOutcome::SkippedNotFound,
                    extension: None,
                };
            }
            Err(e) => {
                warn!(extension_id = %planned.extension_id, "Extension lookup failed: {e}");
                return DispatchedAction {
                    planned,
                    outcome: DispatchOutcome::Failed {
                        reason: e.to_string(),
                    },
                    extension: None,
                };
            }
        };

        let want_enabled = planned.action == ExtensionAction::Enable;
        if current.enabled == want_enabled {
            debug!(
                extension_id = %planned.extension_id,
                "Extension already in desired state, nothing to apply"
            );
            return DispatchedAction {
                planned,
                outcome: DispatchOutcome::SkippedNoOp,
                extension: Some(current),
            };
        }

        // Last liveness check before the externally visible call
        if !token.is_live() {
            return DispatchedAction {
                planned,
                outcome: DispatchOutcome::Cancelled,
                extension: Some(current),
            };
        }

        let result = match planned.action {
            ExtensionAction::Enable => host.enable(&planned.extension_id).await,
            ExtensionAction::Disable => host.disable(&planned.extension_id).await,
        };

        match result {
            Ok(()) => {
                info!(
                    extension_id = %planned.extension_id,
                    action = ?planned.action,
                    rule_id = %planned.rule_id,
                    "Applied rule action"
                );
                DispatchedAction {
                    planned,
                    outcome: DispatchOutcome::Applied,
                    extension: Some(current),
                }
            }
            Err(e) => {
                warn!(extension_id = %planned.extension_id, "Host call failed: {e}");
                DispatchedAction {
                    planned,
                    outcome: DispatchOutcome::Failed {
                        reason: e.to_string(),
                    },
                    extension: Some(current),
                }
            }
        }
    }
}
