//! Data models for Replicator entities.
//!
//! This module defines the core data structures:
//! - `Task` - Work items with a size class that caps how many agents they take
//! - `Agent` - Mock AI agents with capability tags and conflict tags
//! - `Links` - Explicit agent-to-task and agent-to-agent connections
//! - `Board` - The planning board used before a run is deployed
//! - `Run` - The persisted aggregate root for one deployed session

pub mod agents;
pub mod compat;
pub mod graph;
pub mod metrics;
pub mod receptionist;

use crate::gui::shared::layout::Position;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Current shape version written by this crate.
pub const RUN_VERSION: u32 = 2;

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Task size class. Each class caps how many agents the task accepts and
/// sets the complexity divisor used for speed metrics.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SizeClass {
    S,
    #[default]
    M,
    L,
    XL,
}

impl SizeClass {
    /// All size classes, smallest first.
    pub const ALL: [SizeClass; 4] = [SizeClass::S, SizeClass::M, SizeClass::L, SizeClass::XL];

    /// Maximum number of agents a task of this size accepts.
    pub fn capacity(self) -> usize {
        match self {
            SizeClass::S => 1,
            SizeClass::M => 3,
            SizeClass::L => 5,
            SizeClass::XL => 8,
        }
    }

    /// Complexity divisor applied to agent skill.
    pub fn complexity(self) -> f64 {
        match self {
            SizeClass::S => 1.0,
            SizeClass::M => 2.0,
            SizeClass::L => 3.0,
            SizeClass::XL => 5.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeClass::S => "S",
            SizeClass::M => "M",
            SizeClass::L => "L",
            SizeClass::XL => "XL",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "S" => Ok(SizeClass::S),
            "M" => Ok(SizeClass::M),
            "L" => Ok(SizeClass::L),
            "XL" => Ok(SizeClass::XL),
            other => Err(Error::InvalidInput(format!(
                "Unknown size class '{}' (expected S, M, L or XL)",
                other
            ))),
        }
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Queued,
    Active,
    Done,
}

/// Agent availability status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Ready,
    Assigned,
}

/// A unit of work on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier (e.g., "t1", "t-a1b2")
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub size: SizeClass,

    #[serde(default)]
    pub desc: String,

    /// Explicit complexity divisor. Falls back to the size class when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<f64>,

    /// Assigned agent IDs, rebuilt from the assignment map.
    #[serde(default)]
    pub agents: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,

    #[serde(default)]
    pub status: TaskStatus,

    /// Created from a receptionist plan rather than by hand.
    #[serde(default, skip_serializing_if = "is_false")]
    pub from_receptionist: bool,
}

impl Task {
    /// Create a new queued task.
    pub fn new(id: impl Into<String>, title: impl Into<String>, size: SizeClass) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            size,
            desc: String::new(),
            complexity: None,
            agents: Vec::new(),
            pos: None,
            status: TaskStatus::Queued,
            from_receptionist: false,
        }
    }

    /// Set the description.
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Agent capacity for this task.
    pub fn capacity(&self) -> usize {
        self.size.capacity()
    }

    /// Complexity divisor, never below a small positive floor.
    pub fn effective_complexity(&self) -> f64 {
        let value = self.complexity.unwrap_or_else(|| self.size.complexity());
        if value.is_finite() && value > 0.0 {
            value
        } else {
            1.0
        }
    }

    pub fn is_full(&self) -> bool {
        self.agents.len() >= self.capacity()
    }
}

/// A mock AI agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub role: String,

    /// Short technology badge (e.g., "REACT", "RUST")
    #[serde(default)]
    pub code_badge: String,

    /// Capability tags (e.g., "frontend", "backend", "devops")
    #[serde(default)]
    pub tags: Vec<String>,

    /// Tags this agent does not work well alongside
    #[serde(default)]
    pub conflicts_with_tags: Vec<String>,

    #[serde(default)]
    pub strengths: Vec<String>,

    #[serde(default)]
    pub recommended_stacks: Vec<String>,

    /// Skill drawn from 0.6..=1.0 when the run is deployed
    #[serde(default)]
    pub skill: f64,

    #[serde(default)]
    pub status: AgentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<Position>,

    /// Docked agents snap to the agent strip at the bottom of the canvas
    #[serde(default = "default_true")]
    pub is_docked: bool,
}

impl Agent {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Up to two uppercase initials from the display name.
    pub fn initials(&self) -> String {
        self.name
            .split(' ')
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

/// Explicit dependency edge between two tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEdge {
    pub from: String,
    pub to: String,
}

impl TaskEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Directed link from an agent to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTaskLink {
    pub agent_id: String,
    pub task_id: String,
    pub created_at: DateTime<Utc>,
    /// Whether creating this link also assigns the agent to the task
    #[serde(default = "default_true")]
    pub assign_on_connect: bool,
}

/// Undirected link between two agents, stored with `a <= b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAgentLink {
    pub a: String,
    pub b: String,
    pub created_at: DateTime<Utc>,
}

impl AgentAgentLink {
    /// Create a link with the pair normalized.
    pub fn new(x: &str, y: &str, created_at: DateTime<Utc>) -> Self {
        let (a, b) = normalize_pair(x, y);
        Self { a, b, created_at }
    }

    pub fn involves(&self, agent_id: &str) -> bool {
        self.a == agent_id || self.b == agent_id
    }

    /// The other end of the link, if `agent_id` is one end.
    pub fn other(&self, agent_id: &str) -> Option<&str> {
        if self.a == agent_id {
            Some(&self.b)
        } else if self.b == agent_id {
            Some(&self.a)
        } else {
            None
        }
    }

    /// Canonical key for the pair ("a-b").
    pub fn key(&self) -> String {
        format!("{}-{}", self.a, self.b)
    }
}

/// Sort an agent pair so `(a, b)` and `(b, a)` collapse to one entry.
pub fn normalize_pair(x: &str, y: &str) -> (String, String) {
    if x <= y {
        (x.to_string(), y.to_string())
    } else {
        (y.to_string(), x.to_string())
    }
}

/// All explicit links in a run or board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Links {
    #[serde(default)]
    pub agent_to_task: Vec<AgentTaskLink>,
    #[serde(default)]
    pub agent_to_agent: Vec<AgentAgentLink>,
}

impl Links {
    pub fn task_link_for(&self, agent_id: &str) -> Option<&AgentTaskLink> {
        self.agent_to_task.iter().find(|l| l.agent_id == agent_id)
    }

    pub fn has_agent_link(&self, x: &str, y: &str) -> bool {
        let (a, b) = normalize_pair(x, y);
        self.agent_to_agent.iter().any(|l| l.a == a && l.b == b)
    }

    /// Agents linked to `agent_id`, in link order.
    pub fn linked_agents(&self, agent_id: &str) -> Vec<&str> {
        self.agent_to_agent
            .iter()
            .filter_map(|l| l.other(agent_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agent_to_task.len() + self.agent_to_agent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Good/bad agent IDs recorded for a task when an agent was assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatSnapshot {
    #[serde(default)]
    pub good: Vec<String>,
    #[serde(default)]
    pub bad: Vec<String>,
}

/// Compatibility snapshots keyed by task ID, then by assigned agent ID.
pub type CompatibilityMap = BTreeMap<String, BTreeMap<String, CompatSnapshot>>;

/// Per-agent gauge values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetric {
    pub load: f64,
    pub boost: f64,
}

/// Run-level efficiency metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(default)]
    pub efficiency_score: f64,
    #[serde(default)]
    pub active_agents: usize,
    #[serde(default)]
    pub idle_agents: usize,
    #[serde(default)]
    pub bottleneck_task_id: Option<String>,
    #[serde(default)]
    pub agent_metrics: BTreeMap<String, AgentMetric>,
}

/// The operator's brief transmitted before deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    #[serde(default)]
    pub text: String,
    pub priority: String,
    pub mode: String,
    pub review_required: bool,
}

impl Default for Brief {
    fn default() -> Self {
        Self {
            text: String::new(),
            priority: "High".to_string(),
            mode: "Autonomous".to_string(),
            review_required: true,
        }
    }
}

/// Risk appetite and execution tempo slider values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub risk: u8,
    pub tempo: u8,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self { risk: 3, tempo: 4 }
    }
}

/// Assign `agent_id` to `task_id` within a task list and assignment map.
///
/// Returns `Ok(false)` when the agent is already on that task. The agent is
/// moved off any previous task. Fails when the target task is full.
fn assign_agent(
    tasks: &mut [Task],
    assignments: &mut BTreeMap<String, String>,
    agent_id: &str,
    task_id: &str,
) -> Result<bool> {
    if assignments.get(agent_id).map(String::as_str) == Some(task_id) {
        return Ok(false);
    }

    let task = tasks
        .iter()
        .find(|t| t.id == task_id)
        .ok_or_else(|| Error::NotFound(format!("Task {}", task_id)))?;
    if task.is_full() {
        return Err(Error::CapacityExceeded {
            task_id: task_id.to_string(),
            capacity: task.capacity(),
        });
    }

    if let Some(previous) = assignments.get(agent_id) {
        if let Some(prev_task) = tasks.iter_mut().find(|t| &t.id == previous) {
            prev_task.agents.retain(|id| id != agent_id);
        }
    }

    if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
        task.agents.push(agent_id.to_string());
    }
    assignments.insert(agent_id.to_string(), task_id.to_string());
    Ok(true)
}

/// The planning board: tasks and tentative assignments before deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub assignments: BTreeMap<String, String>,
    #[serde(default)]
    pub compatibility: CompatibilityMap,
    #[serde(default)]
    pub suggested_links: Links,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            tasks: agents::default_board_tasks(),
            assignments: BTreeMap::new(),
            compatibility: CompatibilityMap::new(),
            suggested_links: Links::default(),
        }
    }
}

impl Board {
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Add a task to the board.
    pub fn add_task(&mut self, task: Task) -> Result<&Task> {
        if task.title.trim().is_empty() {
            return Err(Error::InvalidInput("Task title is required".to_string()));
        }
        if self.task(&task.id).is_some() {
            return Err(Error::InvalidInput(format!(
                "Task {} already exists",
                task.id
            )));
        }
        self.tasks.push(task);
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Assign an agent from `roster` to a task.
    ///
    /// Records a suggested agent-to-task link and a compatibility snapshot for
    /// the task. Rejected when the task is at capacity; the board is left
    /// unchanged in that case.
    pub fn assign(
        &mut self,
        agent_id: &str,
        task_id: &str,
        roster: &[Agent],
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if !roster.iter().any(|a| a.id == agent_id) {
            return Err(Error::NotFound(format!("Agent {}", agent_id)));
        }
        if !assign_agent(&mut self.tasks, &mut self.assignments, agent_id, task_id)? {
            return Ok(false);
        }

        let exists = self
            .suggested_links
            .agent_to_task
            .iter()
            .any(|l| l.agent_id == agent_id && l.task_id == task_id);
        if !exists {
            self.suggested_links.agent_to_task.push(AgentTaskLink {
                agent_id: agent_id.to_string(),
                task_id: task_id.to_string(),
                created_at: now,
                assign_on_connect: true,
            });
        }

        let compat = compat::compute_compatibility(agent_id, roster);
        self.compatibility
            .entry(task_id.to_string())
            .or_default()
            .insert(
                agent_id.to_string(),
                CompatSnapshot {
                    good: compat.good,
                    bad: compat.bad,
                },
            );
        Ok(true)
    }

    /// Release an agent back to the pool. Returns the task it was on.
    pub fn unassign(&mut self, agent_id: &str) -> Option<String> {
        let task_id = self.assignments.remove(agent_id)?;
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.agents.retain(|id| id != agent_id);
        }
        Some(task_id)
    }

    /// Agents from `roster` that are not assigned to any task.
    pub fn available_agents<'a>(&self, roster: &'a [Agent]) -> Vec<&'a Agent> {
        roster
            .iter()
            .filter(|a| !self.assignments.contains_key(&a.id))
            .collect()
    }
}

/// Outcome of toggling an agent-to-task link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    Linked,
    Unlinked,
}

/// One deployed session: the aggregate root persisted after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub brief: Brief,
    #[serde(default)]
    pub settings: RunSettings,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub edges: Vec<TaskEdge>,
    #[serde(default)]
    pub assignments: BTreeMap<String, String>,
    #[serde(default)]
    pub compatibility: CompatibilityMap,
    #[serde(default)]
    pub workspace_agent_ids: Vec<String>,
    #[serde(default)]
    pub links: Links,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub has_seeded_layout: bool,
}

fn legacy_version() -> u32 {
    1
}

impl Run {
    /// Create an empty run (no tasks, no agents).
    pub fn empty(run_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            created_at,
            version: RUN_VERSION,
            brief: Brief::default(),
            settings: RunSettings::default(),
            tasks: Vec::new(),
            agents: Vec::new(),
            edges: Vec::new(),
            assignments: BTreeMap::new(),
            compatibility: CompatibilityMap::new(),
            workspace_agent_ids: Vec::new(),
            links: Links::default(),
            metrics: Metrics::default(),
            has_seeded_layout: false,
        }
    }

    /// Deploy a new run from the planning board and an agent roster.
    ///
    /// Tasks are queued with staggered positions and chained by dependency
    /// edges in board order. Each agent gets a skill drawn from 0.6..1.0.
    pub fn deploy(
        board: &Board,
        roster: &[Agent],
        brief: Brief,
        settings: RunSettings,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Self {
        let mut run = Run::empty(format!("run_{}", now.timestamp_millis()), now);
        run.brief = brief;
        run.settings = settings;

        run.tasks = board
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| Task {
                complexity: Some(task.size.complexity()),
                status: TaskStatus::Queued,
                pos: Some(Position::new(
                    140.0 + index as f64 * 240.0,
                    160.0 + (index % 2) as f64 * 180.0,
                )),
                agents: Vec::new(),
                ..task.clone()
            })
            .collect();

        run.agents = roster
            .iter()
            .enumerate()
            .map(|(index, agent)| {
                let skill: f64 = rng.gen_range(0.6..1.0);
                Agent {
                    skill: (skill * 100.0).round() / 100.0,
                    status: AgentStatus::Ready,
                    pos: Some(Position::new(
                        80.0 + (index % 2) as f64 * 140.0,
                        120.0 + index as f64 * 70.0,
                    )),
                    is_docked: true,
                    ..agent.clone()
                }
            })
            .collect();

        run.edges = run
            .tasks
            .windows(2)
            .map(|pair| TaskEdge::new(pair[0].id.clone(), pair[1].id.clone()))
            .collect();

        run.assignments = board
            .assignments
            .iter()
            .filter(|(_, task_id)| run.tasks.iter().any(|t| &t.id == *task_id))
            .map(|(agent, task)| (agent.clone(), task.clone()))
            .collect();

        // One task link per agent; later suggestions win.
        let mut task_links: Vec<AgentTaskLink> = Vec::new();
        for link in &board.suggested_links.agent_to_task {
            task_links.retain(|l| l.agent_id != link.agent_id);
            task_links.push(link.clone());
        }
        run.links.agent_to_task = task_links;

        let mut agent_links: Vec<AgentAgentLink> = Vec::new();
        for link in &board.suggested_links.agent_to_agent {
            let normalized = AgentAgentLink::new(&link.a, &link.b, link.created_at);
            agent_links.retain(|l| l.key() != normalized.key());
            agent_links.push(normalized);
        }
        run.links.agent_to_agent = agent_links;

        run.compatibility = board.compatibility.clone();
        run.rebuild_assignments();
        run.metrics = Metrics {
            efficiency_score: 0.0,
            active_agents: run.assignments.len(),
            idle_agents: run.agents.len().saturating_sub(run.assignments.len()),
            bottleneck_task_id: None,
            agent_metrics: BTreeMap::new(),
        };
        run
    }

    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.agents.is_empty()
    }

    fn require_agent(&self, agent_id: &str) -> Result<()> {
        if self.agent(agent_id).is_none() {
            return Err(Error::NotFound(format!("Agent {}", agent_id)));
        }
        Ok(())
    }

    fn require_task(&self, task_id: &str) -> Result<&Task> {
        self.task(task_id)
            .ok_or_else(|| Error::NotFound(format!("Task {}", task_id)))
    }

    /// Rebuild each task's agent list from the assignment map.
    ///
    /// Assignments pointing at unknown tasks are left in the map but do not
    /// appear on any task.
    pub fn rebuild_assignments(&mut self) {
        for task in &mut self.tasks {
            task.agents.clear();
        }
        for (agent_id, task_id) in &self.assignments {
            if let Some(task) = self.tasks.iter_mut().find(|t| &t.id == task_id) {
                task.agents.push(agent_id.clone());
            }
        }
        for agent in &mut self.agents {
            agent.status = if self.assignments.contains_key(&agent.id) {
                AgentStatus::Assigned
            } else {
                AgentStatus::Ready
            };
        }
    }

    /// Rebuild assignments and recompute metrics.
    pub fn refresh(&mut self) {
        self.rebuild_assignments();
        self.metrics = metrics::calculate_metrics(self);
    }

    /// Connect an agent to a task, or disconnect it if that exact link exists.
    ///
    /// An agent holds at most one task link, so connecting replaces any
    /// previous link. When the link assigns on connect, the task's capacity
    /// is checked first and the run is left unchanged on rejection.
    pub fn toggle_agent_task_link(
        &mut self,
        agent_id: &str,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LinkChange> {
        self.require_agent(agent_id)?;
        let task = self.require_task(task_id)?;

        let existing = self
            .links
            .agent_to_task
            .iter()
            .find(|l| l.agent_id == agent_id && l.task_id == task_id)
            .cloned();

        if existing.is_none() {
            let occupied = task.agents.iter().filter(|id| *id != agent_id).count();
            if occupied >= task.capacity() {
                return Err(Error::CapacityExceeded {
                    task_id: task_id.to_string(),
                    capacity: task.capacity(),
                });
            }
        }

        self.links.agent_to_task.retain(|l| l.agent_id != agent_id);
        let change = match existing {
            None => {
                self.links.agent_to_task.push(AgentTaskLink {
                    agent_id: agent_id.to_string(),
                    task_id: task_id.to_string(),
                    created_at: now,
                    assign_on_connect: true,
                });
                self.assignments
                    .insert(agent_id.to_string(), task_id.to_string());
                LinkChange::Linked
            }
            Some(link) => {
                if link.assign_on_connect {
                    self.assignments.remove(agent_id);
                }
                LinkChange::Unlinked
            }
        };
        self.rebuild_assignments();
        Ok(change)
    }

    /// Link two agents, or unlink them if already linked.
    pub fn toggle_agent_agent_link(
        &mut self,
        x: &str,
        y: &str,
        now: DateTime<Utc>,
    ) -> Result<LinkChange> {
        if x == y {
            return Err(Error::InvalidInput(
                "An agent cannot be linked to itself".to_string(),
            ));
        }
        self.require_agent(x)?;
        self.require_agent(y)?;

        let (a, b) = normalize_pair(x, y);
        if self.links.has_agent_link(&a, &b) {
            self.links
                .agent_to_agent
                .retain(|l| !(l.a == a && l.b == b));
            Ok(LinkChange::Unlinked)
        } else {
            self.links.agent_to_agent.push(AgentAgentLink {
                a,
                b,
                created_at: now,
            });
            Ok(LinkChange::Linked)
        }
    }

    /// Remove every link touching an agent, and its assignment.
    pub fn clear_agent_links(&mut self, agent_id: &str) -> Result<()> {
        self.require_agent(agent_id)?;
        self.links.agent_to_task.retain(|l| l.agent_id != agent_id);
        self.links.agent_to_agent.retain(|l| !l.involves(agent_id));
        self.assignments.remove(agent_id);
        self.rebuild_assignments();
        Ok(())
    }

    /// Add or remove an agent from the workspace. Returns whether it is now in.
    pub fn toggle_workspace(&mut self, agent_id: &str) -> Result<bool> {
        self.require_agent(agent_id)?;
        if self.workspace_agent_ids.iter().any(|id| id == agent_id) {
            self.workspace_agent_ids.retain(|id| id != agent_id);
            Ok(false)
        } else {
            self.workspace_agent_ids.push(agent_id.to_string());
            Ok(true)
        }
    }

    /// Make sure every assignment is backed by an agent-to-task link.
    pub fn ensure_link_consistency(&mut self, now: DateTime<Utc>) {
        for (agent_id, task_id) in &self.assignments {
            let exists = self
                .links
                .agent_to_task
                .iter()
                .any(|l| &l.agent_id == agent_id && &l.task_id == task_id);
            if !exists {
                self.links.agent_to_task.retain(|l| &l.agent_id != agent_id);
                self.links.agent_to_task.push(AgentTaskLink {
                    agent_id: agent_id.clone(),
                    task_id: task_id.clone(),
                    created_at: now,
                    assign_on_connect: true,
                });
            }
        }
    }

    /// Clear workspace and links, optionally assignments, and allow reseeding.
    pub fn reset_workspace(&mut self, clear_assignments: bool) {
        self.workspace_agent_ids.clear();
        self.links.agent_to_task.clear();
        self.links.agent_to_agent.clear();
        if clear_assignments {
            self.assignments.clear();
        }
        self.has_seeded_layout = false;
        self.rebuild_assignments();
    }

    /// Whether any task or agent carries a stored, finite, nonzero position.
    pub fn has_stored_positions(&self) -> bool {
        self.tasks
            .iter()
            .map(|t| t.pos)
            .chain(self.agents.iter().map(|a| a.pos))
            .flatten()
            .any(|p| p.x.is_finite() && p.y.is_finite() && (p.x != 0.0 || p.y != 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn roster() -> Vec<Agent> {
        agents::default_roster()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn deployed() -> Run {
        let mut rng = StdRng::seed_from_u64(7);
        Run::deploy(
            &Board::default(),
            &roster(),
            Brief::default(),
            RunSettings::default(),
            &mut rng,
            now(),
        )
    }

    #[test]
    fn test_size_class_table() {
        assert_eq!(SizeClass::S.capacity(), 1);
        assert_eq!(SizeClass::M.capacity(), 3);
        assert_eq!(SizeClass::L.capacity(), 5);
        assert_eq!(SizeClass::XL.capacity(), 8);
        assert_eq!(SizeClass::XL.complexity(), 5.0);
        assert_eq!("xl".parse::<SizeClass>().unwrap(), SizeClass::XL);
        assert!("XXL".parse::<SizeClass>().is_err());
    }

    #[test]
    fn test_size_class_serde() {
        let json = serde_json::to_string(&SizeClass::XL).unwrap();
        assert_eq!(json, "\"XL\"");
    }

    #[test]
    fn test_board_assign_rejects_beyond_capacity() {
        let roster = roster();
        let mut board = Board::default();
        board.tasks = vec![Task::new("t1", "Medium task", SizeClass::M)];

        for agent in ["a1", "a2", "a3"] {
            assert!(board.assign(agent, "t1", &roster, now()).unwrap());
        }
        let err = board.assign("a4", "t1", &roster, now()).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { capacity: 3, .. }));
        assert_eq!(board.task("t1").unwrap().agents.len(), 3);
        assert!(!board.assignments.contains_key("a4"));
    }

    #[test]
    fn test_board_assign_moves_agent() {
        let roster = roster();
        let mut board = Board::default();
        board.assign("a1", "t1", &roster, now()).unwrap();
        board.assign("a1", "t2", &roster, now()).unwrap();

        assert!(board.task("t1").unwrap().agents.is_empty());
        assert_eq!(board.task("t2").unwrap().agents, vec!["a1".to_string()]);
        assert_eq!(board.assignments.get("a1").unwrap(), "t2");
    }

    #[test]
    fn test_board_assign_same_task_is_noop() {
        let roster = roster();
        let mut board = Board::default();
        assert!(board.assign("a1", "t1", &roster, now()).unwrap());
        assert!(!board.assign("a1", "t1", &roster, now()).unwrap());
        assert_eq!(board.task("t1").unwrap().agents.len(), 1);
    }

    #[test]
    fn test_board_assign_records_compatibility() {
        let roster = roster();
        let mut board = Board::default();
        board.assign("a5", "t2", &roster, now()).unwrap();
        let snapshot = &board.compatibility["t2"]["a5"];
        // Echo (frontend) conflicts with agents that refuse frontend work
        assert!(snapshot.bad.contains(&"a1".to_string()));
        assert!(snapshot.good.contains(&"a2".to_string()));
    }

    #[test]
    fn test_board_unassign() {
        let roster = roster();
        let mut board = Board::default();
        board.assign("a1", "t1", &roster, now()).unwrap();
        assert_eq!(board.unassign("a1").as_deref(), Some("t1"));
        assert!(board.task("t1").unwrap().agents.is_empty());
        assert_eq!(board.unassign("a1"), None);
    }

    #[test]
    fn test_board_assign_unknown_agent() {
        let mut board = Board::default();
        let err = board.assign("nobody", "t1", &roster(), now()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_deploy_shapes_run() {
        let run = deployed();
        assert!(run.run_id.starts_with("run_"));
        assert_eq!(run.version, RUN_VERSION);
        assert_eq!(run.tasks.len(), 2);
        assert_eq!(run.agents.len(), 8);
        assert_eq!(run.edges, vec![TaskEdge::new("t1", "t2")]);
        assert_eq!(run.tasks[0].complexity, Some(2.0));
        assert!(run.agents.iter().all(|a| (0.6..=1.0).contains(&a.skill)));
        assert!(run.agents.iter().all(|a| a.is_docked));
        assert!(run.has_stored_positions());
        assert!(!run.has_seeded_layout);
    }

    #[test]
    fn test_deploy_carries_board_assignments() {
        let roster = roster();
        let mut board = Board::default();
        board.assign("a1", "t1", &roster, now()).unwrap();
        board.assign("a1", "t2", &roster, now()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let run = Run::deploy(
            &board,
            &roster,
            Brief::default(),
            RunSettings::default(),
            &mut rng,
            now(),
        );

        assert_eq!(run.task("t2").unwrap().agents, vec!["a1".to_string()]);
        assert_eq!(run.links.agent_to_task.len(), 1);
        assert_eq!(run.links.agent_to_task[0].task_id, "t2");
        assert_eq!(run.metrics.active_agents, 1);
        assert_eq!(run.metrics.idle_agents, 7);
    }

    #[test]
    fn test_toggle_agent_task_link_replaces_previous() {
        let mut run = deployed();
        assert_eq!(
            run.toggle_agent_task_link("a1", "t1", now()).unwrap(),
            LinkChange::Linked
        );
        assert_eq!(
            run.toggle_agent_task_link("a1", "t2", now()).unwrap(),
            LinkChange::Linked
        );

        let links: Vec<_> = run
            .links
            .agent_to_task
            .iter()
            .filter(|l| l.agent_id == "a1")
            .collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].task_id, "t2");
        assert!(run.task("t1").unwrap().agents.is_empty());
        assert_eq!(run.task("t2").unwrap().agents, vec!["a1".to_string()]);
    }

    #[test]
    fn test_toggle_agent_task_link_off_removes_assignment() {
        let mut run = deployed();
        run.toggle_agent_task_link("a1", "t1", now()).unwrap();
        assert_eq!(
            run.toggle_agent_task_link("a1", "t1", now()).unwrap(),
            LinkChange::Unlinked
        );
        assert!(run.links.agent_to_task.is_empty());
        assert!(!run.assignments.contains_key("a1"));
        assert!(run.task("t1").unwrap().agents.is_empty());
    }

    #[test]
    fn test_toggle_agent_task_link_respects_capacity() {
        let mut run = deployed();
        run.tasks[0].size = SizeClass::S;
        run.toggle_agent_task_link("a1", "t1", now()).unwrap();
        let err = run.toggle_agent_task_link("a2", "t1", now()).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { capacity: 1, .. }));
        assert_eq!(run.task("t1").unwrap().agents, vec!["a1".to_string()]);
        assert!(run.links.task_link_for("a2").is_none());
    }

    #[test]
    fn test_toggle_agent_agent_link_normalizes_pair() {
        let mut run = deployed();
        run.toggle_agent_agent_link("a5", "a2", now()).unwrap();
        assert_eq!(run.links.agent_to_agent.len(), 1);
        assert_eq!(run.links.agent_to_agent[0].a, "a2");
        assert_eq!(run.links.agent_to_agent[0].b, "a5");

        // Reverse order toggles the same canonical entry off
        assert_eq!(
            run.toggle_agent_agent_link("a2", "a5", now()).unwrap(),
            LinkChange::Unlinked
        );
        assert!(run.links.agent_to_agent.is_empty());
    }

    #[test]
    fn test_toggle_agent_agent_link_self_rejected() {
        let mut run = deployed();
        assert!(run.toggle_agent_agent_link("a1", "a1", now()).is_err());
    }

    #[test]
    fn test_clear_agent_links() {
        let mut run = deployed();
        run.toggle_agent_task_link("a1", "t1", now()).unwrap();
        run.toggle_agent_agent_link("a1", "a3", now()).unwrap();
        run.toggle_agent_agent_link("a2", "a3", now()).unwrap();

        run.clear_agent_links("a1").unwrap();
        assert!(run.links.task_link_for("a1").is_none());
        assert_eq!(run.links.agent_to_agent.len(), 1);
        assert!(!run.assignments.contains_key("a1"));
    }

    #[test]
    fn test_toggle_workspace() {
        let mut run = deployed();
        assert!(run.toggle_workspace("a1").unwrap());
        assert!(!run.toggle_workspace("a1").unwrap());
        assert!(run.workspace_agent_ids.is_empty());
        assert!(run.toggle_workspace("ghost").is_err());
    }

    #[test]
    fn test_ensure_link_consistency() {
        let mut run = deployed();
        run.assignments.insert("a2".to_string(), "t1".to_string());
        run.ensure_link_consistency(now());
        let link = run.links.task_link_for("a2").unwrap();
        assert_eq!(link.task_id, "t1");
        assert!(link.assign_on_connect);

        run.ensure_link_consistency(now());
        assert_eq!(run.links.agent_to_task.len(), 1);
    }

    #[test]
    fn test_reset_workspace() {
        let mut run = deployed();
        run.toggle_agent_task_link("a1", "t1", now()).unwrap();
        run.toggle_workspace("a1").unwrap();
        run.has_seeded_layout = true;

        run.reset_workspace(false);
        assert!(run.links.is_empty());
        assert!(run.workspace_agent_ids.is_empty());
        assert!(run.assignments.contains_key("a1"));
        assert!(!run.has_seeded_layout);

        run.reset_workspace(true);
        assert!(run.assignments.is_empty());
    }

    #[test]
    fn test_has_stored_positions_ignores_origin() {
        let mut run = Run::empty("run_1", now());
        let mut task = Task::new("t1", "Task", SizeClass::S);
        task.pos = Some(Position::new(0.0, 0.0));
        run.tasks.push(task);
        assert!(!run.has_stored_positions());
        run.tasks[0].pos = Some(Position::new(f64::NAN, 3.0));
        assert!(!run.has_stored_positions());
        run.tasks[0].pos = Some(Position::new(0.0, 3.0));
        assert!(run.has_stored_positions());
    }

    #[test]
    fn test_agent_initials() {
        let agent = Agent {
            name: "nova prime star".to_string(),
            ..roster()[0].clone()
        };
        assert_eq!(agent.initials(), "NP");
    }

    #[test]
    fn test_run_roundtrip_camel_case() {
        let run = deployed();
        let json = serde_json::to_value(&run).unwrap();
        assert!(json.get("runId").is_some());
        assert!(json.get("workspaceAgentIds").is_some());
        assert!(json["links"].get("agentToTask").is_some());
        let back: Run = serde_json::from_value(json).unwrap();
        assert_eq!(back, run);
    }
}
