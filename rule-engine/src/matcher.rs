//! Rule matcher: evaluates the current scene against rule conditions

use crate::types::{MatchCondition, MatchMethod, Rule, Scene};
use tracing::warn;
use wildmatch::WildMatch;

/// Anchored wildcard match of `pattern` against `host`.
///
/// `*` matches zero or more characters; the pattern must reproduce the full
/// host, not a substring of it. Hosts are case-insensitive, so both sides
/// are compared lowercased.
pub fn host_matches(pattern: &str, host: &str) -> bool {
    WildMatch::new(&pattern.to_ascii_lowercase()).matches(&host.to_ascii_lowercase())
}

/// True when any pattern in the sequence matches the host (logical OR).
/// An empty pattern sequence matches nothing.
pub fn any_host_matches(patterns: &[String], host: &str) -> bool {
    patterns.iter().any(|p| host_matches(p, host))
}

/// Whether one rule condition is satisfied by the scene.
///
/// Matching is total: conditions this build does not understand never match,
/// they do not raise.
pub fn condition_matches(condition: &MatchCondition, scene: &Scene) -> bool {
    match condition {
        MatchCondition::Host {
            match_method,
            match_host,
        } => match match_method {
            MatchMethod::Wildcard => match scene.host.as_deref() {
                Some(host) => any_host_matches(match_host, host),
                None => false,
            },
            MatchMethod::Unsupported => {
                warn!("Unsupported host match method, condition treated as non-matching");
                false
            }
        },
        MatchCondition::Scene { scene_id } => scene.id.as_deref() == Some(scene_id.as_str()),
        MatchCondition::Unsupported => {
            warn!("Unsupported match mode, condition treated as non-matching");
            false
        }
    }
}

/// The ordered sub-sequence of rules whose condition is satisfied by the
/// scene, preserving declaration order. Disabled rules never match, and no
/// rule appears more than once even when several of its patterns match.
pub fn match_rules<'a>(scene: &Scene, rules: &'a [Rule]) -> Vec<&'a Rule> {
    rules
        .iter()
        .filter(|rule| rule.enabled && condition_matches(&rule.condition, scene))
        .collect()
}
