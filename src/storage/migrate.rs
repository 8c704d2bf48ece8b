//! Upgrade stored run documents to the current shape.
//!
//! Migration works on the raw JSON value before typed deserialization, so
//! documents written by older builds still load. Applying it twice yields
//! the same document as applying it once.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use tracing::debug;

/// Migrate a raw run document in place and return it.
///
/// - `version` defaults to 1
/// - `workspaceAgentIds`, `links` and `assignments` are created when missing
/// - `settings` sliders stored as strings become numbers; values outside
///   1..=5 or unreadable fall back to risk 3 and tempo 4
/// - legacy `fromAgentId`/`toTaskId` and `fromAgentId`/`toAgentId` links are
///   rewritten to the current field names
/// - agent pairs are stored sorted and `assignOnConnect` defaults to true
pub fn migrate_run(mut value: Value, now: DateTime<Utc>) -> Value {
    let Some(run) = value.as_object_mut() else {
        return value;
    };

    if !run.get("version").is_some_and(|v| v.as_u64().is_some_and(|n| n > 0)) {
        run.insert("version".to_string(), json!(1));
    }
    if !run.get("workspaceAgentIds").is_some_and(Value::is_array) {
        run.insert("workspaceAgentIds".to_string(), json!([]));
    }
    if !run.get("assignments").is_some_and(Value::is_object) {
        run.insert("assignments".to_string(), json!({}));
    }
    if !run.get("links").is_some_and(Value::is_object) {
        run.insert(
            "links".to_string(),
            json!({ "agentToTask": [], "agentToAgent": [] }),
        );
    }

    let settings = migrate_settings(run.remove("settings"));
    run.insert("settings".to_string(), settings);

    let stamp = Value::String(now.to_rfc3339());
    if let Some(links) = run.get_mut("links").and_then(Value::as_object_mut) {
        let task_links = take_array(links, "agentToTask")
            .into_iter()
            .filter_map(|link| migrate_task_link(link, &stamp))
            .collect();
        links.insert("agentToTask".to_string(), Value::Array(task_links));

        let agent_links = take_array(links, "agentToAgent")
            .into_iter()
            .filter_map(|link| migrate_agent_link(link, &stamp))
            .collect();
        links.insert("agentToAgent".to_string(), Value::Array(agent_links));
    }

    debug!(
        run_id = run.get("runId").and_then(serde_json::Value::as_str).unwrap_or(""),
        "migrated run document"
    );
    value
}

fn migrate_settings(settings: Option<Value>) -> Value {
    let mut settings = match settings {
        Some(Value::Object(settings)) => settings,
        _ => Map::new(),
    };
    for (key, fallback) in [("risk", 3), ("tempo", 4)] {
        let level = slider_level(settings.get(key)).unwrap_or(fallback);
        settings.insert(key.to_string(), json!(level));
    }
    Value::Object(settings)
}

fn slider_level(value: Option<&Value>) -> Option<u8> {
    let level = match value? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u8::try_from(level).ok().filter(|l| (1..=5).contains(l))
}

fn take_array(object: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match object.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn migrate_task_link(link: Value, stamp: &Value) -> Option<Value> {
    let Value::Object(mut link) = link else {
        return None;
    };
    if let Some(agent) = link.remove("fromAgentId") {
        link.insert("agentId".to_string(), agent);
        if let Some(task) = link.remove("toTaskId") {
            link.insert("taskId".to_string(), task);
        }
    }
    link.entry("createdAt").or_insert_with(|| stamp.clone());
    link.entry("assignOnConnect").or_insert(Value::Bool(true));
    Some(Value::Object(link))
}

fn migrate_agent_link(link: Value, stamp: &Value) -> Option<Value> {
    let Value::Object(mut link) = link else {
        return None;
    };
    if let Some(from) = link.remove("fromAgentId") {
        link.insert("a".to_string(), from);
        if let Some(to) = link.remove("toAgentId") {
            link.insert("b".to_string(), to);
        }
    }
    link.entry("createdAt").or_insert_with(|| stamp.clone());

    let a = link.get("a").and_then(Value::as_str).map(str::to_string);
    let b = link.get("b").and_then(Value::as_str).map(str::to_string);
    if let (Some(a), Some(b)) = (a, b) {
        if b < a {
            link.insert("a".to_string(), Value::String(b));
            link.insert("b".to_string(), Value::String(a));
        }
    }
    Some(Value::Object(link))
}
