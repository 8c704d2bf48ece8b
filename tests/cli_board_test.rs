//! Integration tests for the planning board and receptionist plans via CLI.
//!
//! - `rp board show/add-task/assign/unassign/reset`
//! - `rp plan create/list/push`
//! - capacity rules and input validation

mod common;

use common::TestEnv;
use predicates::prelude::*;

// === Board ===

#[test]
fn test_add_task_and_show() {
    let env = TestEnv::new();
    let added = env.json(&["board", "add-task", "Payments API", "--size", "S"]);
    let id = added["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("t-"));
    assert_eq!(added["capacity"], 1);

    let board = env.json(&["board", "show"]);
    let tasks = board["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[2]["title"], "Payments API");
    assert_eq!(tasks[2]["size"], "S");
}

#[test]
fn test_add_task_rejects_unknown_size() {
    let env = TestEnv::new();
    env.rp()
        .args(["board", "add-task", "Infra", "--size", "XXL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown size class"));
}

#[test]
fn test_assign_records_compatibility() {
    let env = TestEnv::new();
    let assigned = env.json(&["board", "assign", "a1", "t1"]);
    assert_eq!(assigned["changed"], true);
    let bad: Vec<&str> = assigned["bad"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["id"].as_str())
        .collect();
    assert!(bad.contains(&"a5"));

    let board = env.json(&["board", "show"]);
    assert_eq!(board["assignments"]["a1"], "t1");
    assert_eq!(board["tasks"][0]["agents"][0], "a1");
}

#[test]
fn test_assign_moves_agent_between_tasks() {
    let env = TestEnv::new();
    env.json(&["board", "assign", "a1", "t1"]);
    env.json(&["board", "assign", "a1", "t2"]);

    let board = env.json(&["board", "show"]);
    assert_eq!(board["assignments"]["a1"], "t2");
    assert!(board["tasks"][0]["agents"].as_array().unwrap().is_empty());
}

#[test]
fn test_assign_rejected_at_capacity() {
    let env = TestEnv::new();
    let added = env.json(&["board", "add-task", "Solo review", "--size", "S"]);
    let id = added["id"].as_str().unwrap().to_string();
    env.json(&["board", "assign", "a3", &id]);

    env.rp()
        .args(["board", "assign", "a4", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at capacity"));

    let board = env.json(&["board", "show"]);
    assert!(board["assignments"].get("a4").is_none());
}

#[test]
fn test_unassign_and_reset() {
    let env = TestEnv::new();
    env.json(&["board", "assign", "a2", "t1"]);
    let released = env.json(&["board", "unassign", "a2"]);
    assert_eq!(released["task_id"], "t1");

    env.json(&["board", "add-task", "Extra"]);
    let reset = env.json(&["board", "reset"]);
    assert_eq!(reset["tasks"], 2);
    assert_eq!(env.json(&["board", "show"])["tasks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_board_human_output() {
    let env = TestEnv::new();
    env.json(&["board", "assign", "a5", "t2"]);
    env.rp()
        .args(["-H", "board", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("t2 [L] Prototype dashboard interface (1/5)"))
        .stdout(predicate::str::contains("agents: Echo"));
}

// === Receptionist plans ===

#[test]
fn test_plan_create_and_push() {
    let env = TestEnv::new();
    let created = env.json(&["plan", "create", "Sell my bakery", "--objective", "sell"]);
    assert_eq!(created["reception"]["plan"]["tasks"].as_array().unwrap().len(), 7);

    let pushed = env.json(&["plan", "push"]);
    assert_eq!(pushed["created"].as_array().unwrap().len(), 7);
    assert_eq!(pushed["board_tasks"], 9);

    let board = env.json(&["board", "show"]);
    let titles: Vec<&str> = board["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["title"].as_str())
        .collect();
    assert!(titles.contains(&"[Receptionist] Prepare asset listing pack"));
}

#[test]
fn test_plan_push_replace_drops_previous_push() {
    let env = TestEnv::new();
    env.json(&["plan", "create", "Find a flat", "--objective", "rent"]);
    env.json(&["plan", "push"]);
    let replaced = env.json(&["plan", "push", "--mode", "replace", "--prefix", "[Desk]"]);
    assert_eq!(replaced["board_tasks"], 8);

    let board = env.json(&["board", "show"]);
    let pushed: Vec<&str> = board["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["title"].as_str())
        .filter(|t| t.starts_with('['))
        .collect();
    assert!(pushed.iter().all(|t| t.starts_with("[Desk]")));
}

#[test]
fn test_plan_list_newest_first() {
    let env = TestEnv::new();
    env.json(&["plan", "create", "first", "--objective", "buy"]);
    std::thread::sleep(std::time::Duration::from_millis(5));
    env.json(&["plan", "create", "second", "--objective", "hire"]);

    let list = env.json(&["plan", "list"]);
    let runs = list["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["intent"], "second");
    assert_eq!(runs[1]["objective"], "buy");
}

#[test]
fn test_plan_push_without_plan_fails() {
    let env = TestEnv::new();
    env.rp()
        .args(["plan", "push"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("create a plan first"));
}
