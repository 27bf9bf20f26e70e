//! Core data types for the rule engine

use chrono::{DateTime, Utc};
use extension_common::ExtensionInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Immutable snapshot of one browsing context at one instant.
///
/// Created on every tab-context-change event, consumed by exactly one
/// evaluation cycle, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Ambient scene-mode id selected by the user, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Host component of the active tab URL, lowercased.
    /// `None` for pages without a network origin (internal browser pages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    pub url: String,

    pub window_id: i64,

    pub tab_id: i64,

    pub timestamp: DateTime<Utc>,
}

/// Raw tab-context-change notification delivered by the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabContext {
    pub tab_id: i64,
    pub window_id: i64,
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// A persisted condition-action binding: when the context matches,
/// apply an action to a target.
///
/// The engine only reads rules; ownership stays with the rule repository.
/// Position in the rule collection is significant: it is the conflict
/// tie-break (see `planner`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,

    #[serde(rename = "match")]
    pub condition: MatchCondition,

    pub target: Target,

    pub action: ActionSpec,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// How a rule decides whether the current scene applies.
///
/// Tagged on the persisted `matchMode` field. Modes this build does not
/// know deserialize to `Unsupported` and never match, so a newer
/// configuration degrades instead of erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "matchMode", rename_all = "camelCase")]
pub enum MatchCondition {
    /// Satisfied when any pattern in `match_host` matches the scene host
    #[serde(rename_all = "camelCase")]
    Host {
        match_method: MatchMethod,
        #[serde(default)]
        match_host: Vec<String>,
    },

    /// Satisfied when the scene carries this scene-mode id
    #[serde(rename_all = "camelCase")]
    Scene { scene_id: String },

    #[serde(other)]
    Unsupported,
}

/// Pattern interpretation for host conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMethod {
    /// Anchored glob against the full host, `*` matching zero or more characters
    Wildcard,
    #[serde(other)]
    Unsupported,
}

/// What a matched rule applies its action to, tagged on `targetType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "targetType", rename_all = "camelCase")]
pub enum Target {
    /// A named group's members, plus optional explicit extras
    #[serde(rename_all = "camelCase")]
    Group {
        target_group: String,
        #[serde(default)]
        target_extensions: Vec<String>,
    },

    /// An explicit extension list
    #[serde(rename_all = "camelCase")]
    Extensions {
        #[serde(default)]
        target_extensions: Vec<String>,
    },
}

/// Named, persisted collection of extension identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Action a rule applies to its resolved extensions, tagged on `actionType`.
///
/// Unknown kinds deserialize to `Unsupported`; the planner rejects them as
/// configuration errors rather than ignoring authored intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "camelCase")]
pub enum ActionSpec {
    /// Enable the resolved extensions while the rule matches
    OpenWhenMatched,
    /// Disable the resolved extensions while the rule matches
    CloseWhenMatched,
    #[serde(other)]
    Unsupported,
}

impl ActionSpec {
    /// Concrete per-extension verb for this action, `None` for unknown kinds
    pub fn extension_action(&self) -> Option<ExtensionAction> {
        match self {
            ActionSpec::OpenWhenMatched => Some(ExtensionAction::Enable),
            ActionSpec::CloseWhenMatched => Some(ExtensionAction::Disable),
            ActionSpec::Unsupported => None,
        }
    }
}

/// Concrete verb applied to one extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtensionAction {
    Enable,
    Disable,
}

/// One resolved entry of the per-cycle plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAction {
    pub extension_id: String,

    pub action: ExtensionAction,

    /// The rule that won this extension (for history attribution)
    pub rule_id: String,

    /// Set when the extension was resolved through a group's member list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Ephemeral per-cycle mapping from extension id to the single action to
/// apply. Each extension id appears at most once; later writers replace
/// earlier ones. Built fresh every cycle, never persisted.
#[derive(Debug, Clone, Default)]
pub struct ExtensionActionPlan {
    entries: Vec<PlannedAction>,
    index: HashMap<String, usize>,
}

impl ExtensionActionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the entry, replacing any existing entry for the same
    /// extension id. The replacement keeps the original slot so entry
    /// order stays stable while later rules win.
    pub fn upsert(&mut self, entry: PlannedAction) {
        match self.index.get(&entry.extension_id) {
            Some(&slot) => self.entries[slot] = entry,
            None => {
                self.index.insert(entry.extension_id.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, extension_id: &str) -> Option<&PlannedAction> {
        self.index.get(extension_id).map(|&slot| &self.entries[slot])
    }

    pub fn entries(&self) -> &[PlannedAction] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Terminal state of one dispatched plan entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchOutcome {
    /// The host accepted the state change
    Applied,
    /// The extension was already in the desired state
    SkippedNoOp,
    /// The extension is no longer installed
    SkippedNotFound,
    /// A newer cycle preempted this entry before its call was issued
    Cancelled,
    /// The host collaborator failed for this entry only
    Failed { reason: String },
}

/// One plan entry together with its terminal dispatch state
#[derive(Debug, Clone)]
pub struct DispatchedAction {
    pub planned: PlannedAction,
    pub outcome: DispatchOutcome,
    /// Host metadata captured at dispatch time, used for history attribution
    pub extension: Option<ExtensionInfo>,
}

/// All per-entry outcomes of one dispatched plan
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub actions: Vec<DispatchedAction>,
}

impl DispatchReport {
    pub fn applied_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.outcome == DispatchOutcome::Applied)
            .count()
    }

    pub fn outcome_of(&self, extension_id: &str) -> Option<&DispatchOutcome> {
        self.actions
            .iter()
            .find(|a| a.planned.extension_id == extension_id)
            .map(|a| &a.outcome)
    }
}

/// Result of one full evaluation cycle
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub cycle_id: Uuid,
    pub scene: Scene,
    /// Ids of the rules whose condition was satisfied, in declaration order
    pub matched_rule_ids: Vec<String>,
    pub plan: ExtensionActionPlan,
    pub report: DispatchReport,
    /// History records actually persisted for this cycle
    pub history_written: usize,
}
