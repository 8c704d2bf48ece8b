//! Edge routing and abstract render commands for the board view
//!
//! The view never touches a presentation surface directly. Each frame it
//! produces a list of [`RenderCommand`]s that a [`Scene`](super::scene::Scene)
//! applies to whatever backs it (DOM, canvas, or a recording for tests).
//!
//! # Edges
//!
//! Every logical connection is drawn as a cubic Bezier between two fixed
//! ports on its endpoint nodes:
//! - **Dependency** (task to task): right to left
//! - **Assignment** (agent to task): right-offset to left-bottom
//! - **Agent link** (agent to agent): right-offset to left, styled bad when
//!   the pair scores bad
//!
//! [`EdgeRouter`] keeps a key to curve cache so curves that survive a frame
//! are updated in place and curves whose connection disappeared are pruned.

use super::layout::{LayoutConfig, LayoutEngine, LayoutNode, Position, or_fallback};
use super::theme;
use crate::models::compat::{PairStatus, TeamReport, evaluate_agent_pair};
use crate::models::{Metrics, Run};
use std::collections::{BTreeMap, BTreeSet};

/// Minimum horizontal distance between a port and its control point
pub const MIN_CONTROL_OFFSET: f64 = 80.0;

/// A render command that any scene backend can apply
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Move a node to its current position
    PlaceNode { id: String, position: Position },
    /// Focus emphasis of a node
    NodeFocus { id: String, emphasis: Emphasis },
    /// Connect-mode marks: whether the node can be picked, and how it scores
    /// against the connect source
    NodeMarks {
        id: String,
        selectable: bool,
        compat: Option<PairStatus>,
    },
    /// Final synergy status of an agent token
    AgentStatus { id: String, status: PairStatus },
    /// Toggle the expanded detail card of an agent
    Expanded { id: String, expanded: bool },
    /// Create or update an edge curve
    DrawEdge {
        key: String,
        class: String,
        path: String,
    },
    /// Remove a curve whose connection no longer exists
    RemoveEdge { key: String },
    /// Focus emphasis of an edge
    EdgeFocus { key: String, emphasis: Emphasis },
    /// Camera transform of the world container
    SetTransform { transform: String },
    /// Error banner
    ShowBanner { message: String },
    /// Informational placeholder in place of the graph
    ShowPlaceholder { message: String },
    /// Link suggestions for the current selection
    CompatibilityPanel(PanelContent),
    /// Connect-mode hint; `None` hides it
    ConnectHint { text: Option<String> },
    /// Run metrics summary
    Metrics(Metrics),
    /// Workspace team report
    Workspace(TeamReport),
}

/// Content of the compatibility side panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// Nothing selected
    Idle(String),
    /// Agent names to recommend and to avoid linking
    Suggestions {
        recommended: Vec<String>,
        avoid: Vec<String>,
    },
}

/// Focus emphasis applied to nodes and edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    Highlighted,
    Dimmed,
}

impl Emphasis {
    pub fn node_class(self) -> Option<&'static str> {
        match self {
            Emphasis::Normal => None,
            Emphasis::Highlighted => Some(theme::node::HIGHLIGHTED),
            Emphasis::Dimmed => Some(theme::node::DIMMED),
        }
    }

    pub fn edge_class(self) -> Option<&'static str> {
        match self {
            Emphasis::Normal => None,
            Emphasis::Highlighted => Some(theme::edge::HIGHLIGHTED),
            Emphasis::Dimmed => Some(theme::edge::DIMMED),
        }
    }
}

/// Attachment point on a node's boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Left,
    Right,
    Top,
    Bottom,
    /// Left side, three quarters down
    LeftBottom,
    /// Right side, a third of the way down
    RightOffset,
}

impl Port {
    /// Port location on `node`. Unmeasured nodes use the collision size.
    pub fn point(self, node: &LayoutNode, config: &LayoutConfig) -> Position {
        let Position { x, y } = node.current;
        let w = or_fallback(node.width, config.collision_width);
        let h = or_fallback(node.height, config.collision_height);
        match self {
            Port::Left => Position::new(x, y + h / 2.0),
            Port::Right => Position::new(x + w, y + h / 2.0),
            Port::Top => Position::new(x + w / 2.0, y),
            Port::Bottom => Position::new(x + w / 2.0, y + h),
            Port::LeftBottom => Position::new(x, y + h * 0.75),
            Port::RightOffset => Position::new(x + w, y + h * 0.35),
        }
    }
}

/// Cubic Bezier between two ports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    pub from: Position,
    pub c1: Position,
    pub c2: Position,
    pub to: Position,
}

impl Curve {
    /// Horizontal S-curve: control points sit half the horizontal distance
    /// out from each port, never closer than [`MIN_CONTROL_OFFSET`].
    pub fn between(from: Position, to: Position) -> Self {
        let delta = ((to.x - from.x).abs() * 0.5).max(MIN_CONTROL_OFFSET);
        Self {
            from,
            c1: Position::new(from.x + delta, from.y),
            c2: Position::new(to.x - delta, to.y),
            to,
        }
    }

    /// SVG path data
    pub fn path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.from.x,
            self.from.y,
            self.c1.x,
            self.c1.y,
            self.c2.x,
            self.c2.y,
            self.to.x,
            self.to.y
        )
    }
}

/// Logical connection kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Dependency,
    Assignment,
    AgentLink { bad: bool },
}

impl EdgeKind {
    /// Source and destination ports
    pub fn ports(self) -> (Port, Port) {
        match self {
            EdgeKind::Dependency => (Port::Right, Port::Left),
            EdgeKind::Assignment => (Port::RightOffset, Port::LeftBottom),
            EdgeKind::AgentLink { .. } => (Port::RightOffset, Port::Left),
        }
    }

    pub fn class(self) -> String {
        match self {
            EdgeKind::Dependency => theme::edge::DEPENDENCY.to_string(),
            EdgeKind::Assignment => theme::edge::AGENT_TASK.to_string(),
            EdgeKind::AgentLink { bad: false } => theme::edge::AGENT_AGENT.to_string(),
            EdgeKind::AgentLink { bad: true } => {
                format!("{} {}", theme::edge::AGENT_AGENT, theme::edge::BAD)
            }
        }
    }

    /// Cache key for a connection of this kind
    pub fn key(self, from: &str, to: &str) -> String {
        let prefix = match self {
            EdgeKind::Dependency => "edge",
            EdgeKind::Assignment => "at",
            EdgeKind::AgentLink { .. } => "aa",
        };
        format!("{}-{}-{}", prefix, from, to)
    }
}

/// A routed curve as last drawn
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    pub key: String,
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub curve: Curve,
}

impl RoutedEdge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}

/// Keys that changed during one routing pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDiff {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl RouteDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Key to curve cache for every connection in a run
#[derive(Debug, Default)]
pub struct EdgeRouter {
    edges: BTreeMap<String, RoutedEdge>,
}

impl EdgeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&RoutedEdge> {
        self.edges.get(key)
    }

    pub fn edges(&self) -> impl Iterator<Item = &RoutedEdge> {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Route every connection of `run` from the current node positions.
    ///
    /// Connections with an endpoint missing from the layout are skipped and
    /// therefore pruned like removed ones. Unchanged curves are reported in
    /// neither `created` nor `updated`.
    pub fn route(&mut self, run: &Run, layout: &LayoutEngine) -> RouteDiff {
        let mut wanted: Vec<(EdgeKind, &str, &str)> = Vec::new();
        for edge in &run.edges {
            wanted.push((EdgeKind::Dependency, &edge.from, &edge.to));
        }
        for link in &run.links.agent_to_task {
            wanted.push((EdgeKind::Assignment, &link.agent_id, &link.task_id));
        }
        for link in &run.links.agent_to_agent {
            let bad = match (run.agent(&link.a), run.agent(&link.b)) {
                (Some(a), Some(b)) => evaluate_agent_pair(a, b).status() == PairStatus::Bad,
                _ => false,
            };
            wanted.push((EdgeKind::AgentLink { bad }, &link.a, &link.b));
        }

        let mut diff = RouteDiff::default();
        let mut used: BTreeSet<String> = BTreeSet::new();
        for (kind, from, to) in wanted {
            let (Some(from_node), Some(to_node)) = (layout.node(from), layout.node(to)) else {
                continue;
            };
            let (from_port, to_port) = kind.ports();
            let curve = Curve::between(
                from_port.point(from_node, &layout.config),
                to_port.point(to_node, &layout.config),
            );
            let key = kind.key(from, to);
            let routed = RoutedEdge {
                key: key.clone(),
                from: from.to_string(),
                to: to.to_string(),
                kind,
                curve,
            };
            match self.edges.get_mut(&key) {
                Some(existing) => {
                    if *existing != routed {
                        *existing = routed;
                        diff.updated.push(key.clone());
                    }
                }
                None => {
                    self.edges.insert(key.clone(), routed);
                    diff.created.push(key.clone());
                }
            }
            used.insert(key);
        }

        self.edges.retain(|key, _| {
            let keep = used.contains(key);
            if !keep {
                diff.removed.push(key.clone());
            }
            keep
        });
        diff
    }

    /// Draw and remove commands for a routing diff.
    pub fn commands(&self, diff: &RouteDiff) -> Vec<RenderCommand> {
        let mut commands: Vec<RenderCommand> = diff
            .created
            .iter()
            .chain(diff.updated.iter())
            .filter_map(|key| self.edges.get(key))
            .map(|edge| RenderCommand::DrawEdge {
                key: edge.key.clone(),
                class: edge.kind.class(),
                path: edge.curve.path(),
            })
            .collect();
        commands.extend(
            diff.removed
                .iter()
                .map(|key| RenderCommand::RemoveEdge { key: key.clone() }),
        );
        commands
    }

    /// Forget every cached curve, returning remove commands for them.
    pub fn clear(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.edges)
            .into_keys()
            .map(|key| RenderCommand::RemoveEdge { key })
            .collect()
    }
}

/// Focus emphasis for every node and edge, given the current selection.
///
/// With nothing selected everything is normal. Otherwise the selection and
/// every node sharing a routed edge with it are highlighted and the rest
/// dimmed; edges touching the selection are highlighted and the rest dimmed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FocusState {
    pub nodes: BTreeMap<String, Emphasis>,
    pub edges: BTreeMap<String, Emphasis>,
}

impl FocusState {
    pub fn compute<'a>(
        selection: Option<&str>,
        node_ids: impl IntoIterator<Item = &'a str>,
        router: &EdgeRouter,
    ) -> Self {
        let Some(selected) = selection else {
            return Self {
                nodes: node_ids
                    .into_iter()
                    .map(|id| (id.to_string(), Emphasis::Normal))
                    .collect(),
                edges: router
                    .edges()
                    .map(|e| (e.key.clone(), Emphasis::Normal))
                    .collect(),
            };
        };

        let mut connected: BTreeSet<&str> = BTreeSet::new();
        connected.insert(selected);
        for edge in router.edges().filter(|e| e.touches(selected)) {
            connected.insert(&edge.from);
            connected.insert(&edge.to);
        }

        let nodes = node_ids
            .into_iter()
            .map(|id| {
                let emphasis = if connected.contains(id) {
                    Emphasis::Highlighted
                } else {
                    Emphasis::Dimmed
                };
                (id.to_string(), emphasis)
            })
            .collect();
        let edges = router
            .edges()
            .map(|e| {
                let emphasis = if e.touches(selected) {
                    Emphasis::Highlighted
                } else {
                    Emphasis::Dimmed
                };
                (e.key.clone(), emphasis)
            })
            .collect();
        Self { nodes, edges }
    }

    pub fn commands(&self) -> Vec<RenderCommand> {
        self.nodes
            .iter()
            .map(|(id, emphasis)| RenderCommand::NodeFocus {
                id: id.clone(),
                emphasis: *emphasis,
            })
            .chain(self.edges.iter().map(|(key, emphasis)| RenderCommand::EdgeFocus {
                key: key.clone(),
                emphasis: *emphasis,
            }))
            .collect()
    }
}
