//! Context builder: normalizes raw tab notifications into scenes

use crate::error::RuleEngineError;
use crate::types::{Scene, TabContext};
use chrono::Utc;
use tracing::debug;
use url::Url;

/// Extract the host component of a tab URL, lowercased.
///
/// Only web origins count. Internal browser pages (`chrome://`, `about:`,
/// data URLs) have no network origin and yield `None`, even when their URL
/// technically parses with a host-shaped authority.
pub fn extract_host(raw_url: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https" | "ws" | "wss") {
        return None;
    }
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}

/// Build an immutable scene snapshot from a raw tab notification.
///
/// A context without a derivable host is not fatal: the scene is built with
/// `host: None` and simply matches no host-based rules.
pub fn build_scene(context: &TabContext, scene_id: Option<String>) -> Scene {
    let host = extract_host(&context.url);
    if host.is_none() {
        let err = RuleEngineError::InvalidContext {
            reason: format!("no network origin in '{}'", context.url),
        };
        debug!(tab_id = context.tab_id, "{err}");
    }

    Scene {
        id: scene_id,
        host,
        url: context.url.clone(),
        window_id: context.window_id,
        tab_id: context.tab_id,
        timestamp: Utc::now(),
    }
}
