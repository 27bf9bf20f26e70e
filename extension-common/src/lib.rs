//! Common Model Types for the Extension Manager Workspace
//!
//! This crate defines the shared data structures used across the workspace:
//! - Extension metadata as reported by the browser's management API
//! - User annotations (alias / remark) attached to an extension
//! - History events and the immutable audit records built from them

use serde::{Deserialize, Serialize};

/// The slice of the browser's management metadata the manager consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionInfo {
    /// Browser-assigned extension identifier
    pub id: String,

    /// Full display name
    pub name: String,

    /// Short name, often identical to `name`
    #[serde(default)]
    pub short_name: String,

    #[serde(default)]
    pub description: String,

    pub version: String,

    /// Whether the extension is currently enabled
    pub enabled: bool,

    /// Whether the browser allows this extension to be disabled.
    /// Policy-installed extensions report `false`.
    #[serde(default = "default_true")]
    pub may_disable: bool,

    /// Settings page URL, when the extension ships one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_url: Option<String>,

    /// Homepage URL, when the extension declares one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,

    #[serde(default)]
    pub install_type: InstallType,
}

impl ExtensionInfo {
    /// Minimal metadata for an installed, enabled extension
    pub fn new(id: &str, name: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            short_name: name.to_string(),
            description: String::new(),
            version: version.to_string(),
            enabled: true,
            may_disable: true,
            options_url: None,
            homepage_url: None,
            install_type: InstallType::Normal,
        }
    }
}

fn default_true() -> bool {
    true
}

/// How the extension was installed, per the management API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstallType {
    #[default]
    Normal,
    Development,
    Sideload,
    Admin,
    #[serde(other)]
    Other,
}

/// User annotations attached to an extension.
/// The display name prefers `alias` over the extension's own name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl ExtensionAttachment {
    /// Name to show for an extension: the alias when one is set, the
    /// extension's own name otherwise.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.alias.as_deref() {
            Some(alias) if !alias.trim().is_empty() => alias,
            _ => fallback,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.alias.is_none() && self.remark.is_none()
    }
}

/// Audit event kinds recorded in history.
///
/// Unknown kinds read from persisted history deserialize to `Unknown`
/// rather than failing the whole read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryEvent {
    /// Manually enabled
    Enabled,
    /// Manually disabled
    Disabled,
    Installed,
    Uninstalled,
    Updated,
    /// Enabled by a matched rule
    RuleEnabled,
    /// Disabled by a matched rule
    RuleDisabled,
    /// Toggled by switching the active group
    GroupSwitched,
    #[serde(other)]
    Unknown,
}

/// Immutable audit entry for one change to an extension.
///
/// Written once, never mutated. `rule_id` / `group_id` attribute the change
/// to the rule (and the group its target resolved through) that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    pub extension_id: String,

    pub event: HistoryEvent,

    /// Extension name at the time of the event
    #[serde(default)]
    pub name: String,

    /// Extension version at the time of the event
    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl HistoryRecord {
    pub fn new(extension_id: &str, event: HistoryEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            extension_id: extension_id.to_string(),
            event,
            name: String::new(),
            version: String::new(),
            rule_id: None,
            group_id: None,
            remark: None,
        }
    }

    /// Attribute this record to the rule that produced it, and the group
    /// its target resolved through when there was one.
    pub fn with_rule(mut self, rule_id: &str, group_id: Option<&str>) -> Self {
        self.rule_id = Some(rule_id.to_string());
        self.group_id = group_id.map(str::to_string);
        self
    }

    pub fn with_remark(mut self, remark: &str) -> Self {
        self.remark = Some(remark.to_string());
        self
    }

    /// Capture the extension's name and version at event time
    pub fn with_extension(mut self, info: &ExtensionInfo) -> Self {
        self.name = info.name.clone();
        self.version = info.version.clone();
        self
    }
}
