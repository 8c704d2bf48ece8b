//! Presentation boundary of the board view
//!
//! A [`Scene`] is whatever hosts the graph: a DOM page, a canvas, or the
//! recording [`HeadlessScene`] used by the CLI and the tests. The view asks
//! the scene for mount points and sizes and hands it render commands; it
//! never reaches past this trait.

use super::layout::Size;
use super::render::{Emphasis, RenderCommand};
use super::theme;
use std::collections::{BTreeMap, BTreeSet};

/// Mount points the view requires before it renders anything
pub const REQUIRED_MOUNTS: &[&str] = &[
    theme::mount::CANVAS,
    theme::mount::VIEWPORT,
    theme::mount::WORLD,
    theme::mount::EDGES,
];

/// Surface the view renders into
pub trait Scene {
    /// Whether a named mount point exists
    fn has_mount(&self, name: &str) -> bool;

    /// Current size of the canvas
    fn canvas_size(&self) -> Size;

    /// Current size of the viewport
    fn viewport_size(&self) -> Size;

    /// Measured size of a node, if the scene has laid it out
    fn measure(&self, node_id: &str) -> Option<Size>;

    /// Ask for one frame callback on the next display refresh
    fn request_frame(&mut self);

    /// Apply a batch of render commands
    fn apply(&mut self, commands: Vec<RenderCommand>);
}

/// First required mount point the scene lacks.
pub fn missing_mount(scene: &impl Scene) -> Option<&'static str> {
    REQUIRED_MOUNTS
        .iter()
        .copied()
        .find(|name| !scene.has_mount(name))
}

/// In-memory scene that records what it was asked to draw
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    pub mounts: BTreeSet<String>,
    pub canvas: Size,
    pub viewport: Size,
    /// Sizes reported by `measure`; unlisted nodes are unmeasured
    pub sizes: BTreeMap<String, Size>,
    pub frame_requests: usize,
    /// Every command applied, in order
    pub log: Vec<RenderCommand>,
    /// Current path data per edge key
    pub edges: BTreeMap<String, (String, String)>,
    pub transform: Option<String>,
    pub banner: Option<String>,
    pub placeholder: Option<String>,
    pub hint: Option<String>,
    pub emphasis: BTreeMap<String, Emphasis>,
    pub expanded: BTreeSet<String>,
}

impl HeadlessScene {
    /// Scene with every required mount and the given canvas size.
    pub fn new(canvas: Size) -> Self {
        Self {
            mounts: REQUIRED_MOUNTS.iter().map(|m| m.to_string()).collect(),
            canvas,
            viewport: canvas,
            sizes: BTreeMap::new(),
            frame_requests: 0,
            log: Vec::new(),
            edges: BTreeMap::new(),
            transform: None,
            banner: None,
            placeholder: None,
            hint: None,
            emphasis: BTreeMap::new(),
            expanded: BTreeSet::new(),
        }
    }

    pub fn without_mount(mut self, name: &str) -> Self {
        self.mounts.remove(name);
        self
    }

    /// Record a measured node size.
    pub fn set_size(&mut self, node_id: impl Into<String>, size: Size) {
        self.sizes.insert(node_id.into(), size);
    }

    /// Commands matching a predicate, in application order
    pub fn commands_where(&self, pred: impl Fn(&RenderCommand) -> bool) -> Vec<&RenderCommand> {
        self.log.iter().filter(|c| pred(c)).collect()
    }
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new(Size::new(1200.0, 700.0))
    }
}

impl Scene for HeadlessScene {
    fn has_mount(&self, name: &str) -> bool {
        self.mounts.contains(name)
    }

    fn canvas_size(&self) -> Size {
        self.canvas
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn measure(&self, node_id: &str) -> Option<Size> {
        self.sizes.get(node_id).copied()
    }

    fn request_frame(&mut self) {
        self.frame_requests += 1;
    }

    fn apply(&mut self, commands: Vec<RenderCommand>) {
        for command in commands {
            match &command {
                RenderCommand::DrawEdge { key, class, path } => {
                    self.edges.insert(key.clone(), (class.clone(), path.clone()));
                }
                RenderCommand::RemoveEdge { key } => {
                    self.edges.remove(key);
                }
                RenderCommand::SetTransform { transform } => {
                    self.transform = Some(transform.clone());
                }
                RenderCommand::ShowBanner { message } => {
                    self.banner = Some(message.clone());
                }
                RenderCommand::ShowPlaceholder { message } => {
                    self.placeholder = Some(message.clone());
                }
                RenderCommand::ConnectHint { text } => {
                    self.hint = text.clone();
                }
                RenderCommand::NodeFocus { id, emphasis } => {
                    self.emphasis.insert(id.clone(), *emphasis);
                }
                RenderCommand::Expanded { id, expanded } => {
                    if *expanded {
                        self.expanded.insert(id.clone());
                    } else {
                        self.expanded.remove(id);
                    }
                }
                _ => {}
            }
            self.log.push(command);
        }
    }
}
