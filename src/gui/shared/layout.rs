//! Graph layout engine for the board view
//!
//! Positions task and agent nodes on a bounded canvas. There is no physics
//! simulation: the engine works with explicit `current` and `target`
//! positions per node and a handful of bounded, deterministic steps.
//!
//! - Seed: one-time placement of tasks in depth lanes and agents beneath them
//! - Targets: auto-arrange lanes for tasks and a docking strip for agents
//! - Settle: pairwise circle repulsion, a bounded number of iterations
//! - Glide: linear interpolation of every unpinned node toward its target

use crate::models::graph::compute_task_depths;
use crate::models::Run;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// 2D position/vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate the distance to another position
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.hypot(dy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Measured width and height of a node or surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A zero or non-finite dimension cannot host a layout.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Value or fallback when the value is unset (zero or NaN).
pub fn or_fallback(value: f64, fallback: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        fallback
    } else {
        value
    }
}

/// Clamp that tolerates `min > max` by favoring `max`.
///
/// A node larger than the canvas has an empty valid range; it is pinned to the
/// upper bound instead of panicking like `f64::clamp`.
pub fn clamp_value(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Move `current` a `factor` fraction of the way toward `target`.
pub fn advance(current: Position, target: Position, factor: f64) -> Position {
    Position {
        x: current.x + (target.x - current.x) * factor,
        y: current.y + (target.y - current.y) * factor,
    }
}

/// Node kind affects default sizes and docking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Task,
    Agent,
}

/// Configuration for the layout engine
///
/// Every distance is in canvas pixels. Loaded from the `[layout]` table of
/// `config.toml`; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Canvas used when the viewport reports no size
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Node size assumed before measurement
    pub node_width: f64,
    pub node_height: f64,
    /// Agent token size assumed before measurement
    pub agent_width: f64,
    pub agent_height: f64,
    /// Size used for collision circles and ports when unmeasured
    pub collision_width: f64,
    pub collision_height: f64,
    /// Position for nodes with no stored position
    pub default_position: f64,
    /// Distance kept between nodes and the canvas edge
    pub clamp_padding: f64,

    pub seed_origin_x: f64,
    pub seed_origin_y: f64,
    pub seed_lane_width: f64,
    pub seed_row_height: f64,
    /// Horizontal and vertical spacing of the unassigned agent grid
    pub seed_agent_spacing: f64,
    pub seed_agent_row_height: f64,
    /// Gap between the bottom of the task block and the agent grid
    pub seed_agent_gap: f64,
    /// Offsets of assigned agents under their task
    pub seed_slot_offset: f64,
    pub seed_slot_spacing: f64,
    pub seed_slot_gap: f64,

    pub lane_width: f64,
    pub row_height: f64,
    pub lane_padding: f64,
    pub row_gap: f64,

    /// Docking strip distance from the bottom of the canvas
    pub agent_strip_offset: f64,
    pub agent_spacing: f64,
    pub agent_row_height: f64,
    pub agents_per_row: usize,

    /// Extra clearance added to the sum of collision radii
    pub settle_margin: f64,
    pub settle_damping: f64,
    /// Fraction of the remaining distance covered per glide step
    pub glide_factor: f64,
    /// Distance under which a node counts as arrived
    pub glide_epsilon: f64,
    pub drag_settle_iterations: u32,
    pub relayout_settle_iterations: u32,
    /// Pointer travel under which a drag counts as a click
    pub click_threshold: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 700.0,
            node_width: 180.0,
            node_height: 120.0,
            agent_width: 64.0,
            agent_height: 64.0,
            collision_width: 160.0,
            collision_height: 100.0,
            default_position: 120.0,
            clamp_padding: 32.0,

            seed_origin_x: 200.0,
            seed_origin_y: 140.0,
            seed_lane_width: 320.0,
            seed_row_height: 160.0,
            seed_agent_spacing: 160.0,
            seed_agent_row_height: 120.0,
            seed_agent_gap: 160.0,
            seed_slot_offset: 40.0,
            seed_slot_spacing: 70.0,
            seed_slot_gap: 40.0,

            lane_width: 260.0,
            row_height: 140.0,
            lane_padding: 80.0,
            row_gap: 20.0,

            agent_strip_offset: 120.0,
            agent_spacing: 120.0,
            agent_row_height: 90.0,
            agents_per_row: 6,

            settle_margin: 16.0,
            settle_damping: 0.2,
            glide_factor: 0.12,
            glide_epsilon: 0.5,
            drag_settle_iterations: 16,
            relayout_settle_iterations: 12,
            click_threshold: 6.0,
        }
    }
}

impl LayoutConfig {
    /// Canvas size, falling back to the configured default per dimension.
    pub fn canvas_or_default(&self, canvas: Size) -> Size {
        Size::new(
            or_fallback(canvas.width, self.canvas_width),
            or_fallback(canvas.height, self.canvas_height),
        )
    }

    fn per_row(&self) -> usize {
        self.agents_per_row.max(1)
    }
}

/// Render-only visual state of one node
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub kind: NodeKind,
    /// Where the node is drawn this frame
    pub current: Position,
    /// Where the node is gliding to
    pub target: Position,
    /// Pinned nodes are driven by the pointer and skip glide and settle
    pub pinned: bool,
    /// Measured size; zero until measured
    pub width: f64,
    pub height: f64,
    /// Docked agents take a slot in the agent strip on auto-arrange
    pub docked: bool,
}

impl LayoutNode {
    /// Create a node at rest at `position`
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            current: position,
            target: position,
            pinned: false,
            width: 0.0,
            height: 0.0,
            docked: kind == NodeKind::Agent,
        }
    }

    /// Collision radius: half the larger dimension.
    pub fn radius(&self, config: &LayoutConfig) -> f64 {
        or_fallback(self.width, config.collision_width)
            .max(or_fallback(self.height, config.collision_height))
            / 2.0
    }

    fn place(&mut self, position: Position) {
        self.current = position;
        self.target = position;
    }
}

/// Axis-aligned bounds of a set of nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Layout engine over the nodes of one run
///
/// Nodes keep run order: tasks first, then agents.
#[derive(Debug)]
pub struct LayoutEngine {
    pub nodes: Vec<LayoutNode>,
    pub config: LayoutConfig,
    /// Settle iterations left before the engine goes idle
    pub settle_remaining: u32,
}

impl LayoutEngine {
    /// Create an empty engine
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
            settle_remaining: 0,
        }
    }

    /// Create nodes for every task and agent in the run.
    ///
    /// Stored positions become both current and target; items without one
    /// start at the default position.
    pub fn from_run(run: &Run, config: LayoutConfig) -> Self {
        let mut engine = Self::new(config);
        let fallback = Position::new(
            engine.config.default_position,
            engine.config.default_position,
        );
        for task in &run.tasks {
            let pos = task.pos.unwrap_or(fallback);
            engine
                .nodes
                .push(LayoutNode::new(task.id.clone(), NodeKind::Task, pos));
        }
        for agent in &run.agents {
            let pos = agent.pos.unwrap_or(fallback);
            let mut node = LayoutNode::new(agent.id.clone(), NodeKind::Agent, pos);
            node.docked = agent.is_docked;
            engine.nodes.push(node);
        }
        engine
    }

    /// Get a node by ID
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, id: &str) -> Option<&mut LayoutNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Record a measured node size. Zero dimensions fall back to the default
    /// node size.
    pub fn set_size(&mut self, id: &str, size: Size) {
        let (width, height) = (
            or_fallback(size.width, self.config.node_width),
            or_fallback(size.height, self.config.node_height),
        );
        if let Some(node) = self.node_mut(id) {
            node.width = width;
            node.height = height;
        }
    }

    /// Start (or restart) a bounded settle.
    pub fn request_settle(&mut self, iterations: u32) {
        self.settle_remaining = iterations;
    }

    /// Whether settle iterations remain.
    pub fn is_settling(&self) -> bool {
        self.settle_remaining > 0
    }

    fn clamp_node(node: &mut LayoutNode, canvas: Size, config: &LayoutConfig) {
        let padding = config.clamp_padding;
        let width = or_fallback(node.width, config.node_width);
        let height = or_fallback(node.height, config.node_height);
        let max_x = canvas.width - width - padding;
        let max_y = canvas.height - height - padding;
        node.current.x = clamp_value(node.current.x, padding, max_x);
        node.current.y = clamp_value(node.current.y, padding, max_y);
        node.target.x = clamp_value(node.target.x, padding, max_x);
        node.target.y = clamp_value(node.target.y, padding, max_y);
    }

    /// Keep one node inside the canvas.
    pub fn clamp(&mut self, id: &str, canvas: Size) {
        let canvas = self.config.canvas_or_default(canvas);
        let config = self.config.clone();
        if let Some(node) = self.node_mut(id) {
            Self::clamp_node(node, canvas, &config);
        }
    }

    /// Keep every node inside the canvas.
    pub fn clamp_all(&mut self, canvas: Size) {
        let canvas = self.config.canvas_or_default(canvas);
        for node in &mut self.nodes {
            Self::clamp_node(node, canvas, &self.config);
        }
    }

    /// Group task IDs by depth, preserving task order within each depth.
    fn tasks_by_depth(run: &Run) -> BTreeMap<usize, Vec<String>> {
        let depths = compute_task_depths(&run.tasks, &run.edges);
        let mut lanes: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for task in &run.tasks {
            let depth = depths.get(&task.id).copied().unwrap_or(0);
            lanes.entry(depth).or_default().push(task.id.clone());
        }
        lanes
    }

    /// One-time initial placement.
    ///
    /// Skipped when the run was already seeded or any item carries a stored
    /// nonzero position. Tasks go in depth lanes. Assigned agents go beneath
    /// their task, one slot each; the rest wrap in a grid below the task
    /// block. Marks the run seeded and writes positions back. Returns whether
    /// seeding ran.
    pub fn seed(&mut self, run: &mut Run, canvas: Size) -> bool {
        if run.has_seeded_layout || run.has_stored_positions() {
            debug!(
                has_seeded_layout = run.has_seeded_layout,
                "seed skipped: layout already established"
            );
            return false;
        }

        let canvas = self.config.canvas_or_default(canvas);
        let cfg = self.config.clone();
        let padding = cfg.clamp_padding;
        let bound = |value: f64, extent: f64, size: f64| {
            clamp_value(value, padding, extent - size - padding)
        };

        let mut tasks_bottom: f64 = 0.0;
        for (depth, ids) in Self::tasks_by_depth(run) {
            for (index, id) in ids.iter().enumerate() {
                let Some(node) = self.node_mut(id) else {
                    continue;
                };
                let width = or_fallback(node.width, cfg.node_width);
                let height = or_fallback(node.height, cfg.node_height);
                let x = bound(
                    cfg.seed_origin_x + depth as f64 * cfg.seed_lane_width,
                    canvas.width,
                    width,
                );
                let y = bound(
                    cfg.seed_origin_y + index as f64 * cfg.seed_row_height,
                    canvas.height,
                    height,
                );
                node.place(Position::new(x, y));
                tasks_bottom = tasks_bottom.max(y + height);
            }
        }

        let mut slots: HashMap<String, usize> = HashMap::new();
        for (agent_id, task_id) in &run.assignments {
            let Some(task) = self.node(task_id) else {
                continue;
            };
            let (task_pos, task_height) = (
                task.current,
                or_fallback(task.height, cfg.node_height),
            );
            let slot = slots.entry(task_id.clone()).or_insert(0);
            let index = *slot;
            *slot += 1;

            let Some(agent) = self.node_mut(agent_id) else {
                continue;
            };
            let width = or_fallback(agent.width, cfg.agent_width);
            let height = or_fallback(agent.height, cfg.agent_height);
            let x = bound(
                task_pos.x + cfg.seed_slot_offset + index as f64 * cfg.seed_slot_spacing,
                canvas.width,
                width,
            );
            let y = bound(
                task_pos.y + task_height + cfg.seed_slot_gap,
                canvas.height,
                height,
            );
            agent.place(Position::new(x, y));
        }

        let per_row = cfg.per_row();
        for (index, agent) in run.agents.iter().enumerate() {
            let placed = run
                .assignments
                .get(&agent.id)
                .is_some_and(|task_id| self.node(task_id).is_some());
            if placed {
                continue;
            }
            let Some(node) = self.node_mut(&agent.id) else {
                continue;
            };
            let width = or_fallback(node.width, cfg.agent_width);
            let height = or_fallback(node.height, cfg.agent_height);
            let x = bound(
                cfg.seed_origin_x + (index % per_row) as f64 * cfg.seed_agent_spacing,
                canvas.width,
                width,
            );
            let y = bound(
                tasks_bottom + cfg.seed_agent_gap + (index / per_row) as f64 * cfg.seed_agent_row_height,
                canvas.height,
                height,
            );
            node.place(Position::new(x, y));
        }

        run.has_seeded_layout = true;
        self.write_back(run);
        debug!(
            tasks = run.tasks.len(),
            agents = run.agents.len(),
            "seeded initial layout"
        );
        true
    }

    /// Compute auto-arrange targets.
    ///
    /// Tasks stack in lanes by depth; docked agents fill the strip at the
    /// bottom of the canvas. Floating agents keep their targets.
    pub fn compute_targets(&mut self, run: &Run, canvas: Size) {
        let canvas = self.config.canvas_or_default(canvas);
        let cfg = self.config.clone();

        for (depth, ids) in Self::tasks_by_depth(run) {
            let mut current_y = cfg.lane_padding;
            for id in &ids {
                let Some(node) = self.node_mut(id) else {
                    continue;
                };
                let width = or_fallback(node.width, cfg.node_width);
                let height = or_fallback(node.height, cfg.node_height);
                let x = cfg.lane_padding + depth as f64 * cfg.lane_width;
                node.target.x = clamp_value(x, 0.0, canvas.width - width);
                node.target.y = clamp_value(current_y, 0.0, canvas.height - height);
                current_y += cfg.row_height.max(height + cfg.row_gap);
            }
        }

        let strip_y = canvas.height - cfg.agent_strip_offset;
        let per_row = cfg.per_row();
        for (index, agent) in run.agents.iter().enumerate() {
            let Some(node) = self.node_mut(&agent.id) else {
                continue;
            };
            if !node.docked {
                continue;
            }
            let width = or_fallback(node.width, cfg.agent_width);
            let height = or_fallback(node.height, cfg.agent_height);
            let x = cfg.lane_padding + (index % per_row) as f64 * cfg.agent_spacing;
            let y = strip_y + (index / per_row) as f64 * cfg.agent_row_height;
            node.target.x = clamp_value(x, 0.0, canvas.width - width);
            node.target.y = clamp_value(y, 0.0, canvas.height - height);
        }
    }

    /// One settle iteration. Returns whether it ran.
    ///
    /// Every unordered pair of unpinned nodes closer than the sum of their
    /// collision radii plus the margin is pushed apart along the line between
    /// them, scaled by the damping factor. Coincident nodes separate along
    /// the x axis.
    pub fn settle_step(&mut self, canvas: Size) -> bool {
        if self.settle_remaining == 0 {
            return false;
        }

        let cfg = &self.config;
        let count = self.nodes.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (head, tail) = self.nodes.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if a.pinned || b.pinned {
                    continue;
                }

                let (mut dx, mut dy) = (a.current.x - b.current.x, a.current.y - b.current.y);
                if dx == 0.0 && dy == 0.0 {
                    dx = 1.0;
                    dy = 0.0;
                }
                let dist = or_fallback(dx.hypot(dy), 1.0);
                let min_dist = a.radius(cfg) + b.radius(cfg) + cfg.settle_margin;
                if dist < min_dist {
                    let push = (min_dist - dist) / dist * cfg.settle_damping;
                    a.current.x += dx * push;
                    a.current.y += dy * push;
                    b.current.x -= dx * push;
                    b.current.y -= dy * push;
                }
            }
        }

        self.clamp_all(canvas);
        self.settle_remaining -= 1;
        true
    }

    /// One glide step for every unpinned node, then clamp.
    ///
    /// Returns whether any node was still more than the epsilon away from
    /// its target before the step.
    pub fn glide(&mut self, canvas: Size) -> bool {
        let factor = self.config.glide_factor;
        let epsilon = self.config.glide_epsilon;
        let mut needs_more = false;
        for node in self.nodes.iter_mut().filter(|n| !n.pinned) {
            let dx = node.target.x - node.current.x;
            let dy = node.target.y - node.current.y;
            if dx.abs() > epsilon || dy.abs() > epsilon {
                needs_more = true;
            }
            node.current = advance(node.current, node.target, factor);
        }
        self.clamp_all(canvas);
        needs_more
    }

    /// Copy current positions and docking flags into the run.
    pub fn write_back(&self, run: &mut Run) {
        for node in &self.nodes {
            match node.kind {
                NodeKind::Task => {
                    if let Some(task) = run.tasks.iter_mut().find(|t| t.id == node.id) {
                        task.pos = Some(node.current);
                    }
                }
                NodeKind::Agent => {
                    if let Some(agent) = run.agents.iter_mut().find(|a| a.id == node.id) {
                        agent.pos = Some(node.current);
                        agent.is_docked = node.docked;
                    }
                }
            }
        }
    }

    /// Bounds of the nodes of one kind, or `None` when there are none.
    pub fn bounds(&self, kind: NodeKind) -> Option<Bounds> {
        let cfg = &self.config;
        self.nodes
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| Bounds {
                min_x: n.current.x,
                min_y: n.current.y,
                max_x: n.current.x + or_fallback(n.width, cfg.node_width),
                max_y: n.current.y + or_fallback(n.height, cfg.node_height),
            })
            .reduce(|acc, b| Bounds {
                min_x: acc.min_x.min(b.min_x),
                min_y: acc.min_y.min(b.min_y),
                max_x: acc.max_x.max(b.max_x),
                max_y: acc.max_y.max(b.max_y),
            })
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Agent, SizeClass, Task, TaskEdge};
    use chrono::Utc;

    fn canvas() -> Size {
        Size::new(1200.0, 700.0)
    }

    fn run_with(tasks: &[&str], agents: &[&str]) -> Run {
        let mut run = Run::empty("run_1", Utc::now());
        run.tasks = tasks
            .iter()
            .map(|id| Task::new(*id, format!("Task {}", id), SizeClass::M))
            .collect();
        let roster = crate::models::agents::default_roster();
        run.agents = agents
            .iter()
            .map(|id| Agent {
                id: id.to_string(),
                ..roster[0].clone()
            })
            .collect();
        run.edges = run
            .tasks
            .windows(2)
            .map(|w| TaskEdge::new(w[0].id.clone(), w[1].id.clone()))
            .collect();
        run
    }

    #[test]
    fn test_position_distance() {
        let p1 = Position::new(0.0, 0.0);
        let p2 = Position::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_clamp_value_inverted_range() {
        assert_eq!(clamp_value(50.0, 32.0, 100.0), 50.0);
        assert_eq!(clamp_value(0.0, 32.0, 100.0), 32.0);
        // Node wider than the canvas: no panic, pinned to the upper bound
        assert_eq!(clamp_value(50.0, 32.0, -10.0), -10.0);
    }

    #[test]
    fn test_advance_is_linear() {
        let next = advance(Position::new(0.0, 0.0), Position::new(100.0, -50.0), 0.12);
        assert!((next.x - 12.0).abs() < 1e-9);
        assert!((next.y + 6.0).abs() < 1e-9);
        let same = advance(Position::new(5.0, 5.0), Position::new(5.0, 5.0), 0.12);
        assert_eq!(same, Position::new(5.0, 5.0));
    }

    #[test]
    fn test_layout_config_default() {
        let config = LayoutConfig::default();
        assert_eq!(config.lane_width, 260.0);
        assert_eq!(config.settle_damping, 0.2);
        assert_eq!(config.drag_settle_iterations, 16);
        assert_eq!(config.relayout_settle_iterations, 12);
    }

    #[test]
    fn test_layout_config_partial_toml() {
        let config: LayoutConfig = toml::from_str("lane_width = 300.0\n").unwrap();
        assert_eq!(config.lane_width, 300.0);
        assert_eq!(config.row_height, 140.0);
    }

    #[test]
    fn test_from_run_uses_stored_positions() {
        let mut run = run_with(&["t1"], &["a1"]);
        run.tasks[0].pos = Some(Position::new(300.0, 200.0));
        run.agents[0].is_docked = false;
        let engine = LayoutEngine::from_run(&run, LayoutConfig::default());

        let task = engine.node("t1").unwrap();
        assert_eq!(task.current, Position::new(300.0, 200.0));
        assert_eq!(task.target, task.current);
        let agent = engine.node("a1").unwrap();
        assert_eq!(agent.current, Position::new(120.0, 120.0));
        assert!(!agent.docked);
    }

    #[test]
    fn test_seed_places_tasks_in_depth_lanes() {
        let mut run = run_with(&["t1", "t2", "t3"], &["a1", "a2"]);
        run.edges = vec![TaskEdge::new("t1", "t2"), TaskEdge::new("t1", "t3")];
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());

        assert!(engine.seed(&mut run, canvas()));
        assert!(run.has_seeded_layout);
        assert_eq!(engine.node("t1").unwrap().current, Position::new(200.0, 140.0));
        assert_eq!(engine.node("t2").unwrap().current, Position::new(520.0, 140.0));
        assert_eq!(engine.node("t3").unwrap().current, Position::new(520.0, 300.0));

        // Unassigned agents wrap in a grid below the task block (300 + 120)
        let a1 = engine.node("a1").unwrap().current;
        assert_eq!(a1, Position::new(200.0, 580.0));
        assert_eq!(engine.node("a2").unwrap().current.x, 360.0);
        assert_eq!(run.tasks[1].pos, Some(Position::new(520.0, 140.0)));
    }

    #[test]
    fn test_seed_places_assigned_agents_under_task() {
        let mut run = run_with(&["t1"], &["a1", "a2", "a3"]);
        run.assignments.insert("a1".to_string(), "t1".to_string());
        run.assignments.insert("a2".to_string(), "t1".to_string());
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        engine.seed(&mut run, canvas());

        let a1 = engine.node("a1").unwrap().current;
        let a2 = engine.node("a2").unwrap().current;
        assert_eq!(a1, Position::new(240.0, 300.0));
        assert_eq!(a2, Position::new(310.0, 300.0));
    }

    #[test]
    fn test_seed_runs_once() {
        let mut run = run_with(&["t1"], &[]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        assert!(engine.seed(&mut run, canvas()));

        // Positions cleared, but the run stays marked as seeded
        run.tasks[0].pos = None;
        assert!(!engine.seed(&mut run, canvas()));
    }

    #[test]
    fn test_seed_skipped_with_stored_positions() {
        let mut run = run_with(&["t1"], &["a1"]);
        run.agents[0].pos = Some(Position::new(10.0, 0.0));
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        assert!(!engine.seed(&mut run, canvas()));
        assert!(!run.has_seeded_layout);
    }

    #[test]
    fn test_seed_clamps_into_small_canvas() {
        let mut run = run_with(&["t1", "t2", "t3", "t4", "t5"], &[]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        engine.seed(&mut run, Size::new(800.0, 400.0));
        let t5 = engine.node("t5").unwrap().current;
        assert_eq!(t5.x, 800.0 - 180.0 - 32.0);
    }

    #[test]
    fn test_compute_targets_lanes_and_strip() {
        let run = run_with(&["t1", "t2"], &["a1", "a2"]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        engine.node_mut("a2").unwrap().docked = false;
        let before = engine.node("a2").unwrap().target;
        engine.compute_targets(&run, canvas());

        assert_eq!(engine.node("t1").unwrap().target, Position::new(80.0, 80.0));
        assert_eq!(engine.node("t2").unwrap().target, Position::new(340.0, 80.0));
        assert_eq!(engine.node("a1").unwrap().target, Position::new(80.0, 580.0));
        assert_eq!(engine.node("a2").unwrap().target, before);
    }

    #[test]
    fn test_compute_targets_stacks_tall_tasks() {
        let mut run = run_with(&["t1", "t2"], &[]);
        run.edges.clear();
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        engine.set_size("t1", Size::new(180.0, 200.0));
        engine.compute_targets(&run, canvas());
        assert_eq!(engine.node("t2").unwrap().target.y, 80.0 + 220.0);
    }

    #[test]
    fn test_glide_converges_and_reports() {
        let run = run_with(&["t1"], &[]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        engine.node_mut("t1").unwrap().target = Position::new(400.0, 300.0);

        let mut frames = 0;
        while engine.glide(canvas()) {
            frames += 1;
            assert!(frames < 200, "glide never finished");
        }
        let node = engine.node("t1").unwrap();
        assert!(node.current.distance(&node.target) < 1.0);
    }

    #[test]
    fn test_glide_skips_pinned() {
        let run = run_with(&["t1"], &[]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        let node = engine.node_mut("t1").unwrap();
        node.target = Position::new(400.0, 300.0);
        node.pinned = true;
        assert!(!engine.glide(canvas()));
        assert_eq!(
            engine.node("t1").unwrap().current,
            Position::new(120.0, 120.0)
        );
    }

    #[test]
    fn test_settle_needs_budget() {
        let run = run_with(&["t1", "t2"], &[]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        assert!(!engine.settle_step(canvas()));
        engine.request_settle(2);
        assert!(engine.settle_step(canvas()));
        assert!(engine.settle_step(canvas()));
        assert!(!engine.settle_step(canvas()));
    }

    #[test]
    fn test_settle_separates_coincident_nodes() {
        let run = run_with(&["t1", "t2"], &[]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        engine.nodes[0].current = Position::new(500.0, 300.0);
        engine.nodes[1].current = Position::new(500.0, 300.0);
        engine.request_settle(1);
        engine.settle_step(canvas());
        assert!(engine.nodes[0].current.x > engine.nodes[1].current.x);
    }

    #[test]
    fn test_settle_skips_pinned_pairs() {
        let run = run_with(&["t1", "t2"], &[]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        engine.nodes[0].current = Position::new(500.0, 300.0);
        engine.nodes[1].current = Position::new(510.0, 300.0);
        engine.nodes[0].pinned = true;
        engine.request_settle(4);
        while engine.settle_step(canvas()) {}
        assert_eq!(engine.nodes[0].current, Position::new(500.0, 300.0));
        assert_eq!(engine.nodes[1].current, Position::new(510.0, 300.0));
    }

    #[test]
    fn test_settle_converges_for_small_graphs() {
        let ids: Vec<String> = (0..20).map(|i| format!("t{}", i)).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let run = run_with(&id_refs, &[]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        let big = Size::new(20_000.0, 20_000.0);
        for (i, node) in engine.nodes.iter_mut().enumerate() {
            node.width = 160.0;
            node.height = 100.0;
            node.current = Position::new(
                10_000.0 + ((i * 37) % 150) as f64,
                10_000.0 + ((i * 53) % 120) as f64,
            );
        }

        engine.request_settle(5_000);
        while engine.settle_step(big) {}

        let min_dist = 80.0 + 80.0 + 16.0;
        for i in 0..engine.nodes.len() {
            for j in (i + 1)..engine.nodes.len() {
                let d = engine.nodes[i]
                    .current
                    .distance(&engine.nodes[j].current);
                assert!(
                    d >= min_dist - 0.5,
                    "nodes {} and {} still overlap: {}",
                    i,
                    j,
                    d
                );
            }
        }
    }

    #[test]
    fn test_write_back_and_bounds() {
        let mut run = run_with(&["t1", "t2"], &["a1"]);
        let mut engine = LayoutEngine::from_run(&run, LayoutConfig::default());
        engine.nodes[0].current = Position::new(100.0, 50.0);
        engine.nodes[1].current = Position::new(400.0, 250.0);
        engine.nodes[2].docked = false;
        engine.write_back(&mut run);

        assert_eq!(run.tasks[0].pos, Some(Position::new(100.0, 50.0)));
        assert!(!run.agents[0].is_docked);

        let bounds = engine.bounds(NodeKind::Task).unwrap();
        assert_eq!(bounds.min_x, 100.0);
        assert_eq!(bounds.max_x, 580.0);
        assert_eq!(bounds.height(), 320.0);
        assert!(LayoutEngine::default().bounds(NodeKind::Task).is_none());
    }

    #[test]
    fn test_size_degenerate() {
        assert!(Size::new(0.0, 700.0).is_degenerate());
        assert!(Size::new(f64::NAN, 700.0).is_degenerate());
        assert!(!Size::new(1.0, 1.0).is_degenerate());
    }
}
