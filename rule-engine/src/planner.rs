//! Target resolution and conflict-resolved action planning

use crate::error::{EngineResult, RuleEngineError};
use crate::traits::RuleStore;
use crate::types::{ExtensionActionPlan, PlannedAction, Rule, Target};
use std::collections::HashSet;
use tracing::warn;

/// The plan for one cycle, plus the non-fatal resolution problems hit while
/// building it (missing groups). The diagnostics are reported to the caller;
/// they never abort the cycle.
#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    pub plan: ExtensionActionPlan,
    pub skipped: Vec<RuleEngineError>,
}

/// Resolve one rule's target into a concrete, deduplicated extension id
/// list. Ids resolved through the group's member list carry the group id
/// for history attribution; explicit extras do not.
async fn resolve_target(
    rule: &Rule,
    store: &dyn RuleStore,
) -> EngineResult<(Vec<(String, Option<String>)>, Option<RuleEngineError>)> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    let mut skipped = None;

    match &rule.target {
        Target::Group {
            target_group,
            target_extensions,
        } => {
            match store.get_group(target_group).await? {
                Some(group) => {
                    for id in &group.extensions {
                        if seen.insert(id.clone()) {
                            resolved.push((id.clone(), Some(group.id.clone())));
                        }
                    }
                }
                None => {
                    let err = RuleEngineError::UnresolvedTarget {
                        rule_id: rule.id.clone(),
                        group_id: target_group.clone(),
                    };
                    warn!("{err}, rule contributes no group members this cycle");
                    skipped = Some(err);
                }
            }
            for id in target_extensions {
                if seen.insert(id.clone()) {
                    resolved.push((id.clone(), None));
                }
            }
        }
        Target::Extensions { target_extensions } => {
            for id in target_extensions {
                if seen.insert(id.clone()) {
                    resolved.push((id.clone(), None));
                }
            }
        }
    }

    Ok((resolved, skipped))
}

/// Merge the matched rules into one deterministic plan.
///
/// Rules are processed in declaration order and each resolved extension is
/// written into the plan; when two or more rules target the same extension,
/// the rule declared later in the collection wins (last-write-wins). There
/// is no priority field: declaration order is the single source of truth.
///
/// A rule whose action kind is unknown aborts the whole cycle with a
/// configuration error before any state is touched; a rule whose group no
/// longer exists only skips that rule.
pub async fn build_plan(matched: &[&Rule], store: &dyn RuleStore) -> EngineResult<PlanOutcome> {
    let mut outcome = PlanOutcome::default();

    for rule in matched {
        let action = rule.action.extension_action().ok_or_else(|| {
            RuleEngineError::configuration(&rule.id, "unsupported action kind")
        })?;

        let (resolved, skipped) = resolve_target(rule, store).await?;
        if let Some(err) = skipped {
            outcome.skipped.push(err);
        }

        for (extension_id, group_id) in resolved {
            outcome.plan.upsert(PlannedAction {
                extension_id,
                action,
                rule_id: rule.id.clone(),
                group_id,
            });
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionSpec, ExtensionAction, Group, MatchCondition, MatchMethod};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedStore {
        groups: HashMap<String, Group>,
    }

    impl FixedStore {
        fn with_group(id: &str, extensions: &[&str]) -> Self {
            let group = Group {
                id: id.to_string(),
                name: id.to_string(),
                desc: String::new(),
                extensions: extensions.iter().map(|e| e.to_string()).collect(),
            };
            Self {
                groups: HashMap::from([(id.to_string(), group)]),
            }
        }

        fn empty() -> Self {
            Self {
                groups: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl RuleStore for FixedStore {
        async fn list_rules(&self) -> EngineResult<Vec<Rule>> {
            Ok(Vec::new())
        }

        async fn get_group(&self, group_id: &str) -> EngineResult<Option<Group>> {
            Ok(self.groups.get(group_id).cloned())
        }
    }

    fn rule(id: &str, target: Target, action: ActionSpec) -> Rule {
        Rule {
            id: id.to_string(),
            condition: MatchCondition::Host {
                match_method: MatchMethod::Wildcard,
                match_host: vec!["*".to_string()],
            },
            target,
            action,
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_group_members_union_explicit_extras() {
        let store = FixedStore::with_group("g1", &["ext-a", "ext-b"]);
        let r = rule(
            "r1",
            Target::Group {
                target_group: "g1".to_string(),
                target_extensions: vec!["ext-c".to_string(), "ext-a".to_string()],
            },
            ActionSpec::OpenWhenMatched,
        );

        let outcome = build_plan(&[&r], &store).await.unwrap();
        assert_eq!(outcome.plan.len(), 3);
        assert!(outcome.skipped.is_empty());
        // Group members carry the group id, extras do not
        assert_eq!(outcome.plan.get("ext-a").unwrap().group_id.as_deref(), Some("g1"));
        assert_eq!(outcome.plan.get("ext-c").unwrap().group_id, None);
    }

    #[tokio::test]
    async fn test_missing_group_skips_rule_without_aborting() {
        let store = FixedStore::empty();
        let broken = rule(
            "r1",
            Target::Group {
                target_group: "gone".to_string(),
                target_extensions: vec![],
            },
            ActionSpec::OpenWhenMatched,
        );
        let healthy = rule(
            "r2",
            Target::Extensions {
                target_extensions: vec!["ext-a".to_string()],
            },
            ActionSpec::OpenWhenMatched,
        );

        let outcome = build_plan(&[&broken, &healthy], &store).await.unwrap();
        assert_eq!(outcome.plan.len(), 1);
        assert!(outcome.plan.get("ext-a").is_some());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            outcome.skipped[0],
            RuleEngineError::UnresolvedTarget { .. }
        ));
    }

    #[tokio::test]
    async fn test_later_rule_wins_conflicts() {
        let store = FixedStore::empty();
        let earlier = rule(
            "r1",
            Target::Extensions {
                target_extensions: vec!["ext-a".to_string()],
            },
            ActionSpec::OpenWhenMatched,
        );
        let later = rule(
            "r2",
            Target::Extensions {
                target_extensions: vec!["ext-a".to_string()],
            },
            ActionSpec::CloseWhenMatched,
        );

        let outcome = build_plan(&[&earlier, &later], &store).await.unwrap();
        assert_eq!(outcome.plan.len(), 1);
        let winner = outcome.plan.get("ext-a").unwrap();
        assert_eq!(winner.action, ExtensionAction::Disable);
        assert_eq!(winner.rule_id, "r2");
    }

    #[tokio::test]
    async fn test_unknown_action_aborts_the_cycle() {
        let store = FixedStore::empty();
        let bad = rule(
            "r1",
            Target::Extensions {
                target_extensions: vec!["ext-a".to_string()],
            },
            ActionSpec::Unsupported,
        );

        let err = build_plan(&[&bad], &store).await.unwrap_err();
        assert!(err.is_fatal_for_cycle());
    }
}
