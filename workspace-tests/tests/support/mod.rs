//! In-memory collaborators shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use dashmap::DashMap;
use extension_common::{ExtensionInfo, HistoryRecord};
use rule_engine::{
    ActionSpec, EngineResult, ExtensionHost, Group, HistoryStore, MatchCondition, MatchMethod,
    Rule, RuleEngineError, RuleStore, TabContext, Target,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Extension host backed by a concurrent map
#[derive(Default)]
pub struct InMemoryHost {
    pub extensions: DashMap<String, ExtensionInfo>,
}

impl InMemoryHost {
    pub fn with_extensions(ids: &[(&str, bool)]) -> Arc<Self> {
        let host = Self::default();
        for (id, enabled) in ids {
            let mut info = ExtensionInfo::new(id, id, "1.0.0");
            info.enabled = *enabled;
            host.extensions.insert(id.to_string(), info);
        }
        Arc::new(host)
    }

    pub fn enabled(&self, id: &str) -> Option<bool> {
        self.extensions.get(id).map(|e| e.enabled)
    }
}

#[async_trait]
impl ExtensionHost for InMemoryHost {
    async fn get(&self, extension_id: &str) -> EngineResult<Option<ExtensionInfo>> {
        Ok(self.extensions.get(extension_id).map(|e| e.clone()))
    }

    async fn list(&self) -> EngineResult<Vec<ExtensionInfo>> {
        let mut all: Vec<ExtensionInfo> = self.extensions.iter().map(|e| e.clone()).collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn enable(&self, extension_id: &str) -> EngineResult<()> {
        if let Some(mut e) = self.extensions.get_mut(extension_id) {
            e.enabled = true;
        }
        Ok(())
    }

    async fn disable(&self, extension_id: &str) -> EngineResult<()> {
        if let Some(mut e) = self.extensions.get_mut(extension_id) {
            e.enabled = false;
        }
        Ok(())
    }

    async fn uninstall(&self, extension_id: &str) -> EngineResult<()> {
        self.extensions.remove(extension_id);
        Ok(())
    }
}

/// Rule and group repository over fixed collections
pub struct InMemoryRules {
    pub rules: Vec<Rule>,
    pub groups: Vec<Group>,
}

impl InMemoryRules {
    pub fn new(rules: Vec<Rule>, groups: Vec<Group>) -> Arc<Self> {
        Arc::new(Self { rules, groups })
    }
}

#[async_trait]
impl RuleStore for InMemoryRules {
    async fn list_rules(&self) -> EngineResult<Vec<Rule>> {
        Ok(self.rules.clone())
    }

    async fn get_group(&self, group_id: &str) -> EngineResult<Option<Group>> {
        Ok(self.groups.iter().find(|g| g.id == group_id).cloned())
    }
}

/// Append-only history store; can be told to reject appends
#[derive(Default)]
pub struct InMemoryHistory {
    pub records: Mutex<Vec<HistoryRecord>>,
    pub fail_appends: AtomicBool,
}

impl InMemoryHistory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<HistoryRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn append(&self, record: HistoryRecord) -> EngineResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(RuleEngineError::HistoryWrite {
                reason: "collaborator unavailable".to_string(),
            });
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> EngineResult<Vec<HistoryRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    async fn clear(&self) -> EngineResult<()> {
        self.records.lock().unwrap().clear();
        Ok(())
    }
}

pub fn host_rule(id: &str, patterns: &[&str], target: Target, action: ActionSpec) -> Rule {
    Rule {
        id: id.to_string(),
        condition: MatchCondition::Host {
            match_method: MatchMethod::Wildcard,
            match_host: patterns.iter().map(|p| p.to_string()).collect(),
        },
        target,
        action,
        enabled: true,
    }
}

pub fn group_target(group_id: &str) -> Target {
    Target::Group {
        target_group: group_id.to_string(),
        target_extensions: vec![],
    }
}

pub fn extensions_target(ids: &[&str]) -> Target {
    Target::Extensions {
        target_extensions: ids.iter().map(|i| i.to_string()).collect(),
    }
}

pub fn group(id: &str, name: &str, extensions: &[&str]) -> Group {
    Group {
        id: id.to_string(),
        name: name.to_string(),
        desc: String::new(),
        extensions: extensions.iter().map(|e| e.to_string()).collect(),
    }
}

pub fn tab(url: &str) -> TabContext {
    TabContext {
        tab_id: 976470232,
        window_id: 976470013,
        url: url.to_string(),
        title: String::new(),
    }
}
