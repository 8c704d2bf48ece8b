//! Integration tests for deployed runs via CLI.
//!
//! - `rp deploy`
//! - `rp run show/link-task/link-agent/clear-links/workspace/arrange/layout/reset`
//! - `rp compat` and `rp team`
//! - loading and migrating stored run documents

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

// === Deploy ===

#[test]
fn test_deploy_creates_latest_run() {
    let env = TestEnv::new();
    env.json(&["board", "assign", "a2", "t1"]);
    let deployed = env.json(&[
        "deploy",
        "--brief",
        "Ship the dashboard",
        "--risk",
        "4",
        "--seed",
        "7",
    ]);
    let run_id = deployed["run_id"].as_str().unwrap().to_string();
    assert!(run_id.starts_with("run_"));
    assert_eq!(deployed["tasks"], 2);
    assert_eq!(deployed["agents"], 8);
    assert_eq!(deployed["assignments"], 1);
    assert_eq!(deployed["settings"]["risk"], 4);

    let run = env.json(&["run", "show"]);
    assert_eq!(run["runId"], run_id.as_str());
    assert_eq!(run["brief"]["text"], "Ship the dashboard");
    assert_eq!(run["assignments"]["a2"], "t1");
    assert_eq!(run["edges"][0]["from"], "t1");
    assert!(env.data_path().join(format!("replicator_run_{}.json", run_id)).exists());
}

#[test]
fn test_deploy_rejects_out_of_range_slider() {
    let env = TestEnv::new();
    env.rp()
        .args(["deploy", "--risk", "9"])
        .assert()
        .failure();
}

#[test]
fn test_deploy_remembers_sliders() {
    let env = TestEnv::new();
    env.json(&["deploy", "--tempo", "5", "--seed", "1"]);
    let second = env.json(&["deploy", "--seed", "2"]);
    assert_eq!(second["settings"]["tempo"], 5);
}

#[test]
fn test_run_show_human() {
    let env = TestEnv::deployed();
    env.rp()
        .args(["-H", "run", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Brief: Ship the dashboard"))
        .stdout(predicate::str::contains("Workspace: (empty)"));
}

#[test]
fn test_run_show_unknown_id() {
    let env = TestEnv::deployed();
    env.rp()
        .args(["run", "--run", "run_missing", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run run_missing"));
}

// === Links ===

#[test]
fn test_link_task_toggles_assignment() {
    let env = TestEnv::deployed();
    let linked = env.json(&["run", "link-task", "a1", "t1"]);
    assert_eq!(linked["linked"], true);

    let run = env.json(&["run", "show"]);
    assert_eq!(run["assignments"]["a1"], "t1");
    assert_eq!(run["links"]["agentToTask"][0]["agentId"], "a1");
    assert_eq!(run["tasks"][0]["agents"][0], "a1");

    let unlinked = env.json(&["run", "link-task", "a1", "t1"]);
    assert_eq!(unlinked["linked"], false);
    let run = env.json(&["run", "show"]);
    assert!(run["assignments"].get("a1").is_none());
}

#[test]
fn test_link_agent_normalizes_pair() {
    let env = TestEnv::deployed();
    let linked = env.json(&["run", "link-agent", "a5", "a1"]);
    assert_eq!(linked["linked"], true);
    assert_eq!(linked["status"], "bad");

    let run = env.json(&["run", "show"]);
    let link = &run["links"]["agentToAgent"][0];
    assert_eq!(link["a"], "a1");
    assert_eq!(link["b"], "a5");
}

#[test]
fn test_link_agent_to_itself_fails() {
    let env = TestEnv::deployed();
    env.rp()
        .args(["run", "link-agent", "a1", "a1"])
        .assert()
        .failure();
}

#[test]
fn test_clear_links() {
    let env = TestEnv::deployed();
    env.json(&["run", "link-task", "a3", "t2"]);
    env.json(&["run", "link-agent", "a3", "a4"]);
    let cleared = env.json(&["run", "clear-links", "a3"]);
    assert_eq!(cleared["cleared"], true);

    let run = env.json(&["run", "show"]);
    assert!(run["links"]["agentToTask"].as_array().unwrap().is_empty());
    assert!(run["links"]["agentToAgent"].as_array().unwrap().is_empty());
}

// === Workspace and team ===

#[test]
fn test_workspace_and_team() {
    let env = TestEnv::deployed();
    let added = env.json(&["run", "workspace", "a5"]);
    assert_eq!(added["in_workspace"], true);
    env.json(&["run", "workspace", "a1"]);

    let team = env.json(&["team"]);
    assert_eq!(team["workspace"].as_array().unwrap().len(), 2);
    assert_eq!(team["pair_status"]["a1"], "bad");
    assert_eq!(team["agent_status"].as_object().unwrap().len(), 8);

    let removed = env.json(&["run", "workspace", "a5"]);
    assert_eq!(removed["in_workspace"], false);
    assert_eq!(removed["workspace"].as_array().unwrap().len(), 1);
}

#[test]
fn test_team_human_empty_workspace() {
    let env = TestEnv::deployed();
    env.rp()
        .args(["-H", "team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is empty"));
}

#[test]
fn test_compat_without_run_uses_roster() {
    let env = TestEnv::new();
    let shown = env.json(&["compat", "a5"]);
    assert_eq!(shown["agent"]["name"], "Echo");
    let bad: Vec<&str> = shown["bad"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["id"].as_str())
        .collect();
    assert!(bad.contains(&"a1"));

    env.rp()
        .args(["compat", "a42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Agent a42"));
}

// === Layout ===

#[test]
fn test_layout_renders_graph() {
    let env = TestEnv::deployed();
    let graph = env.json(&["run", "layout"]);
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 10);
    let keys: Vec<&str> = graph["edges"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["key"].as_str())
        .collect();
    assert!(keys.contains(&"edge-t1-t2"));
}

#[test]
fn test_arrange_fit_stores_positions() {
    let env = TestEnv::deployed();
    let graph = env.json(&["run", "arrange", "--fit"]);
    assert!(graph["transform"].is_string());

    let placed = graph["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "t1")
        .unwrap()
        .clone();
    let run = env.json(&["run", "show"]);
    assert_eq!(run["tasks"][0]["pos"]["x"], placed["x"]);
    assert_eq!(run["tasks"][0]["pos"]["y"], placed["y"]);
}

#[test]
fn test_reset_clears_links_and_assignments() {
    let env = TestEnv::deployed();
    env.json(&["run", "link-task", "a1", "t1"]);
    env.json(&["run", "workspace", "a2"]);

    let reset = env.json(&["run", "reset", "--clear-assignments"]);
    assert_eq!(reset["cleared_assignments"], true);

    let run = env.json(&["run", "show"]);
    assert!(run["workspaceAgentIds"].as_array().unwrap().is_empty());
    assert!(run["links"]["agentToTask"].as_array().unwrap().is_empty());
    assert!(run["assignments"].as_object().unwrap().is_empty());
}

// === Stored documents ===

fn write_run(env: &TestEnv, run_id: &str, body: &str) {
    fs::write(
        env.data_path().join(format!("replicator_run_{}.json", run_id)),
        body,
    )
    .unwrap();
    fs::write(env.data_path().join("replicator_latest_run.json"), run_id).unwrap();
}

#[test]
fn test_legacy_run_is_migrated() {
    let env = TestEnv::new();
    write_run(
        &env,
        "run_1",
        r#"{
            "runId": "run_1",
            "createdAt": "2024-05-01T10:00:00Z",
            "tasks": [{ "id": "t1", "title": "API", "size": "M" }],
            "agents": [],
            "links": {
                "agentToTask": [{ "fromAgentId": "a2", "toTaskId": "t1" }],
                "agentToAgent": [{ "fromAgentId": "a5", "toAgentId": "a1" }]
            }
        }"#,
    );

    let run = env.json(&["run", "show"]);
    assert_eq!(run["version"], 1);
    assert_eq!(run["links"]["agentToTask"][0]["agentId"], "a2");
    assert_eq!(run["links"]["agentToTask"][0]["assignOnConnect"], true);
    assert_eq!(run["links"]["agentToAgent"][0]["a"], "a1");
    assert!(run["workspaceAgentIds"].as_array().unwrap().is_empty());
}

#[test]
fn test_browser_run_with_string_settings_is_loaded() {
    let env = TestEnv::new();
    write_run(
        &env,
        "run_1714557600000",
        r#"{
            "runId": "run_1714557600000",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "brief": { "text": "Ship it", "priority": "High", "mode": "Autonomous", "reviewRequired": true },
            "settings": { "risk": "3", "tempo": "4" },
            "version": 2,
            "ui": { "riskAppetite": "3", "executionTempo": "4" },
            "agents": [{ "id": "a1", "name": "Nova", "role": "Research", "skill": 0.87, "status": "ready" }],
            "tasks": [{ "id": "t1", "title": "Brief", "size": "M", "complexity": 2, "status": "queued", "agents": [] }],
            "edges": [],
            "assignments": {},
            "compatibility": {},
            "workspaceAgentIds": [],
            "links": { "agentToTask": [], "agentToAgent": [] },
            "metrics": { "efficiencyScore": 0, "activeAgents": 0, "idleAgents": 1, "bottleneckTaskId": null }
        }"#,
    );

    let run = env.json(&["run", "show"]);
    assert_eq!(run["settings"]["risk"], 3);
    assert_eq!(run["settings"]["tempo"], 4);
    assert_eq!(run["brief"]["text"], "Ship it");
}

#[test]
fn test_corrupt_run_is_treated_as_missing() {
    let env = TestEnv::new();
    write_run(&env, "run_2", "{ not json");
    env.rp()
        .args(["run", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("deploy a run first"));
}
