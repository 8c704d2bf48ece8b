//! Graph algorithms for the task dependency graph.
//!
//! Task edges form a directed graph that is usually a simple chain but may
//! branch, join, or (in hand-edited runs) contain cycles. Depth drives the
//! lane a task is placed in by the layout engine.

use super::{Task, TaskEdge};
use std::collections::{HashMap, VecDeque};

/// Compute each task's longest-path depth from a zero-indegree source.
///
/// Uses Kahn's algorithm: zero-indegree tasks start at depth 0 in task order,
/// each dequeued task relaxes its successors to `max(current, depth + 1)` and
/// successors whose indegree drops to zero are enqueued. Edges touching
/// unknown tasks are ignored.
///
/// Tasks on or behind a cycle are never dequeued. They keep the deepest value
/// relaxed onto them so far, or 0 if nothing reached them. Every task in
/// `tasks` has an entry in the result, and the traversal always terminates.
pub fn compute_task_depths(tasks: &[Task], edges: &[TaskEdge]) -> HashMap<String, usize> {
    let mut indegree: HashMap<&str, usize> = tasks.iter().map(|t| (t.id.as_str(), 0)).collect();
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();

    for edge in edges {
        if !indegree.contains_key(edge.from.as_str()) || !indegree.contains_key(edge.to.as_str())
        {
            continue;
        }
        successors
            .entry(edge.from.as_str())
            .or_default()
            .push(edge.to.as_str());
        if let Some(count) = indegree.get_mut(edge.to.as_str()) {
            *count += 1;
        }
    }

    let mut depth: HashMap<String, usize> = HashMap::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    for task in tasks {
        if indegree.get(task.id.as_str()) == Some(&0) {
            queue.push_back((task.id.as_str(), 0));
        }
    }

    while let Some((id, d)) = queue.pop_front() {
        depth.insert(id.to_string(), d);
        let Some(next) = successors.get(id) else {
            continue;
        };
        for &neighbor in next {
            let relaxed = depth.get(neighbor).copied().unwrap_or(0).max(d + 1);
            depth.insert(neighbor.to_string(), relaxed);
            if let Some(count) = indegree.get_mut(neighbor) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    queue.push_back((neighbor, relaxed));
                }
            }
        }
    }

    for task in tasks {
        depth.entry(task.id.clone()).or_insert(0);
    }
    depth
}

/// Tasks directly connected to `task_id` by a dependency edge, either direction.
pub fn neighbors<'a>(task_id: &str, edges: &'a [TaskEdge]) -> Vec<&'a str> {
    edges
        .iter()
        .filter_map(|e| {
            if e.from == task_id {
                Some(e.to.as_str())
            } else if e.to == task_id {
                Some(e.from.as_str())
            } else {
                None
            }
        })
        .collect()
}
