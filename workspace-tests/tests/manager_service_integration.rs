//! Manager service and rule engine sharing one host and one history store,
//! the way the background process wires them in the real application

mod support;

use extension_common::HistoryEvent;
use manager_core::ExtensionService;
use rule_engine::{ActionSpec, RuleEngine};
use support::*;

#[tokio::test]
async fn test_rule_driven_and_manual_changes_share_one_audit_trail() {
    let _ = tracing_subscriber::fmt::try_init();

    let host = InMemoryHost::with_extensions(&[("extA", false), ("extB", true)]);
    let rules = InMemoryRules::new(
        vec![host_rule(
            "R1",
            &["*.baidu.com"],
            group_target("G1"),
            ActionSpec::OpenWhenMatched,
        )],
        vec![group("G1", "dev tools", &["extA"])],
    );
    let history = InMemoryHistory::new();

    let engine = RuleEngine::new(host.clone(), rules, history.clone());
    let service = ExtensionService::new(host.clone(), history.clone());

    // A navigation enables extA through the rule
    engine.submit(tab("https://www.baidu.com/")).await.unwrap();
    // The user then flips extB off by hand
    service.set_enabled("extB", false).await.unwrap();

    let records = service.history(10).await.unwrap();
    assert_eq!(records.len(), 2);

    // Newest first: the manual change, then the rule-driven one
    assert_eq!(records[0].event, HistoryEvent::Disabled);
    assert_eq!(records[0].remark.as_deref(), Some("manual"));
    assert!(records[0].rule_id.is_none());

    assert_eq!(records[1].event, HistoryEvent::RuleEnabled);
    assert_eq!(records[1].rule_id.as_deref(), Some("R1"));
    assert_eq!(records[1].group_id.as_deref(), Some("G1"));
}

#[tokio::test]
async fn test_history_search_finds_rule_driven_records_by_extension() {
    let host = InMemoryHost::with_extensions(&[("extA", false), ("extB", false)]);
    let rules = InMemoryRules::new(
        vec![host_rule(
            "R1",
            &["*"],
            extensions_target(&["extA", "extB"]),
            ActionSpec::OpenWhenMatched,
        )],
        vec![],
    );
    let history = InMemoryHistory::new();
    let engine = RuleEngine::new(host.clone(), rules, history.clone());
    let service = ExtensionService::new(host, history);

    engine.submit(tab("https://example.org/")).await.unwrap();

    let hits = service.search_history("extA", 100).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].extension_id, "extA");

    let all = service.search_history("", 100).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_inventory_rows_prefer_alias_after_rule_activity() {
    let host = InMemoryHost::with_extensions(&[("extA", false)]);
    let history = InMemoryHistory::new();
    let service = ExtensionService::new(host, history);

    service.set_alias("extA", Some("我的调试器".to_string()));

    let rows = service.list().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].display_name(), "我的调试器");

    // Clearing the alias falls back to the extension's own name
    service.set_alias("extA", None);
    let rows = service.list().await.unwrap();
    assert_eq!(rows[0].display_name(), "extA");
}
