//! Run efficiency metrics.
//!
//! Speed models how quickly a task progresses given the skill of the agents on
//! it, a coordination multiplier for team size, and the task's complexity.

use super::{AgentMetric, Metrics, Run};
use std::collections::BTreeMap;

/// Weight of average task speed in the efficiency score.
const SPEED_WEIGHT: f64 = 35.0;

/// Efficiency points lost per idle agent.
const IDLE_PENALTY: f64 = 3.0;

/// Headroom applied to the load gauge.
const LOAD_FACTOR: f64 = 1.1;

/// Coordination multiplier for a team of `count` agents on one task.
///
/// Small teams gain from coordination, larger ones lose to overhead.
pub fn coordination_multiplier(count: usize) -> f64 {
    match count {
        0 | 1 => 1.0,
        2 => 1.12,
        3 => 1.18,
        _ => 0.95,
    }
}

fn clamp_percent(value: f64) -> f64 {
    value.max(0.0).min(100.0)
}

/// Recompute metrics from the run's current assignments.
///
/// Only the first `capacity` known agents on a task contribute to its speed;
/// assignments naming agents missing from the run take no slot. The
/// bottleneck is the slowest task, the first one on ties.
pub fn calculate_metrics(run: &Run) -> Metrics {
    let mut agent_metrics = BTreeMap::new();
    let mut bottleneck: Option<(&str, f64)> = None;
    let mut total_speed = 0.0;

    for task in &run.tasks {
        let complexity = task.effective_complexity();
        let members: Vec<_> = task
            .agents
            .iter()
            .filter_map(|id| run.agent(id))
            .take(task.capacity())
            .collect();
        let multiplier = coordination_multiplier(members.len());

        let skill: f64 = members.iter().map(|a| a.skill).sum();
        let speed = skill * multiplier / complexity;
        total_speed += speed;

        for agent in &members {
            let base = agent.skill / complexity * 100.0;
            agent_metrics.insert(
                agent.id.clone(),
                AgentMetric {
                    load: clamp_percent(base * LOAD_FACTOR),
                    boost: clamp_percent(base * multiplier),
                },
            );
        }

        let slower = bottleneck.is_none_or(|(_, slowest)| speed < slowest);
        if slower {
            bottleneck = Some((task.id.as_str(), speed));
        }
    }

    for agent in &run.agents {
        agent_metrics.entry(agent.id.clone()).or_default();
    }

    let active = run.assignments.len();
    let idle = run.agents.len().saturating_sub(active);
    let average = if run.tasks.is_empty() {
        0.0
    } else {
        total_speed / run.tasks.len() as f64
    };
    let raw = clamp_percent(average * SPEED_WEIGHT - idle as f64 * IDLE_PENALTY);

    Metrics {
        efficiency_score: (raw * 10.0).round() / 10.0,
        active_agents: active,
        idle_agents: idle,
        bottleneck_task_id: bottleneck.map(|(id, _)| id.to_string()),
        agent_metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::agents::default_roster;
    use crate::models::{SizeClass, Task};
    use chrono::Utc;

    fn run_with(tasks: Vec<Task>, skills: &[(&str, f64)]) -> Run {
        let mut run = Run::empty("run_1", Utc::now());
        run.tasks = tasks;
        run.agents = default_roster()
            .into_iter()
            .filter_map(|mut a| {
                let skill = skills.iter().find(|(id, _)| *id == a.id)?.1;
                a.skill = skill;
                Some(a)
            })
            .collect();
        run
    }

    #[test]
    fn test_coordination_multiplier() {
        assert_eq!(coordination_multiplier(0), 1.0);
        assert_eq!(coordination_multiplier(1), 1.0);
        assert_eq!(coordination_multiplier(2), 1.12);
        assert_eq!(coordination_multiplier(3), 1.18);
        assert_eq!(coordination_multiplier(4), 0.95);
    }

    #[test]
    fn test_empty_run_metrics() {
        let run = Run::empty("run_1", Utc::now());
        let metrics = calculate_metrics(&run);
        assert_eq!(metrics.efficiency_score, 0.0);
        assert_eq!(metrics.bottleneck_task_id, None);
    }

    #[test]
    fn test_metrics_single_task() {
        let mut run = run_with(
            vec![Task::new("t1", "Solo", SizeClass::S)],
            &[("a1", 1.0), ("a2", 0.8)],
        );
        run.assignments.insert("a1".to_string(), "t1".to_string());
        run.rebuild_assignments();

        let metrics = calculate_metrics(&run);
        assert_eq!(metrics.active_agents, 1);
        assert_eq!(metrics.idle_agents, 1);
        // speed 1.0 * 35 - 1 idle * 3
        assert_eq!(metrics.efficiency_score, 32.0);
        let gauge = metrics.agent_metrics["a1"];
        assert_eq!(gauge.load, 100.0);
        assert_eq!(gauge.boost, 100.0);
        assert_eq!(metrics.bottleneck_task_id.as_deref(), Some("t1"));
        assert_eq!(metrics.agent_metrics["a2"], AgentMetric::default());
    }

    #[test]
    fn test_bottleneck_is_slowest_task() {
        let mut run = run_with(
            vec![
                Task::new("t1", "Fast", SizeClass::M),
                Task::new("t2", "Slow", SizeClass::XL),
            ],
            &[("a1", 0.9), ("a2", 0.9)],
        );
        run.assignments.insert("a1".to_string(), "t1".to_string());
        run.assignments.insert("a2".to_string(), "t2".to_string());
        run.rebuild_assignments();

        let metrics = calculate_metrics(&run);
        assert_eq!(metrics.bottleneck_task_id.as_deref(), Some("t2"));
        assert!(metrics.agent_metrics["a2"].load < metrics.agent_metrics["a1"].load);
    }

    #[test]
    fn test_ties_pick_first_task() {
        let run = run_with(
            vec![
                Task::new("t1", "Empty", SizeClass::M),
                Task::new("t2", "Also empty", SizeClass::M),
            ],
            &[],
        );
        let metrics = calculate_metrics(&run);
        assert_eq!(metrics.bottleneck_task_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_unknown_assignment_takes_no_capacity() {
        let mut run = run_with(
            vec![Task::new("t1", "Solo", SizeClass::S)],
            &[("a1", 1.0)],
        );
        // "a0ghost" sorts ahead of "a1" in the assignment map
        run.assignments.insert("a0ghost".to_string(), "t1".to_string());
        run.assignments.insert("a1".to_string(), "t1".to_string());
        run.rebuild_assignments();
        assert_eq!(run.tasks[0].agents, vec!["a0ghost", "a1"]);

        let metrics = calculate_metrics(&run);
        let gauge = metrics.agent_metrics["a1"];
        assert_eq!(gauge.load, 100.0);
        assert_eq!(gauge.boost, 100.0);
        assert!(!metrics.agent_metrics.contains_key("a0ghost"));
    }
}
