//! Theme constants for the board view
//!
//! Class names and user-facing strings shared by the render commands. These
//! values match the stylesheet and markup the presentation layer ships.

/// Edge classes
pub mod edge {
    /// Task dependency edge
    pub const DEPENDENCY: &str = "edge-path";
    /// Agent-to-task link
    pub const AGENT_TASK: &str = "edge-link-task";
    /// Agent-to-agent link
    pub const AGENT_AGENT: &str = "edge-link-agent";
    /// Modifier for agent links whose pair scores bad
    pub const BAD: &str = "edge-link-bad";
    pub const HIGHLIGHTED: &str = "edge-highlighted";
    pub const DIMMED: &str = "edge-dimmed";
}

/// Node classes
pub mod node {
    pub const HIGHLIGHTED: &str = "highlighted";
    pub const DIMMED: &str = "dimmed";
    pub const SELECTABLE: &str = "selectable";
    pub const EXPANDED: &str = "expanded";
    pub const GOOD: &str = "good";
    pub const BAD: &str = "bad";
}

/// Required mount points
pub mod mount {
    pub const CANVAS: &str = "graphCanvas";
    pub const VIEWPORT: &str = "graphViewport";
    pub const WORLD: &str = "graphWorld";
    pub const EDGES: &str = "graphEdges";
}

/// Connect-mode hints
pub mod hint {
    pub const CONNECT_TASK: &str = "Select a task to connect — ESC to cancel";
    pub const CONNECT_AGENT: &str = "Select an agent to connect — ESC to cancel";
}

/// Banners and placeholders
pub mod message {
    pub const MISSING_MOUNTS: &str = "Graph render failed: missing required DOM elements.";
    pub const EMPTY_GRAPH: &str =
        "No graph data loaded (tasks/agents empty). Check run creation & localStorage key.";
    pub const DEGENERATE_VIEWPORT: &str = "Graph viewport is 0x0 (CSS/layout issue).";
    pub const RENDER_FAILED_PREFIX: &str = "Graph render failed: ";
    pub const COMPAT_IDLE: &str = "Select an agent or task to see link suggestions.";
}

/// Banner text for an unexpected render failure.
pub fn render_failed(detail: &str) -> String {
    format!("{}{}", message::RENDER_FAILED_PREFIX, detail)
}
