//! Board graph view: explicit application state plus the frame pipeline
//!
//! A [`GraphView`] owns everything the view needs between events: the run,
//! per-node layout state, camera, edge cache, connect-mode state, selection
//! and the active drag. Event handlers mutate the run, then call
//! [`GraphView::sync_all`], which persists and schedules a frame. Frames are
//! coalesced by a [`FrameScheduler`]: however many mutations happen between
//! two display refreshes, only one frame runs.

use super::shared::camera::Camera;
use super::shared::layout::{LayoutConfig, LayoutEngine, NodeKind, Position, Size};
use super::shared::render::{EdgeRouter, FocusState, PanelContent, RenderCommand};
use super::shared::scene::{Scene, missing_mount};
use super::shared::theme;
use crate::models::compat::{PairStatus, agent_statuses, compute_compatibility, evaluate_team};
use crate::models::{LinkChange, Run};
use crate::storage::Storage;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Failures of the graph view, each with a defined fallback
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    /// No run id resolved, or the stored document is unreadable; the host
    /// redirects to the index page
    #[error("No run data found")]
    MissingRun,

    /// A required mount point is absent; rendering aborts with a banner
    #[error("Missing required mount point: {0}")]
    MissingMount(String),

    /// The run has neither tasks nor agents; a placeholder replaces the graph
    #[error("Run has no tasks or agents")]
    EmptyGraph,

    /// The canvas or viewport has no size yet
    #[error("Graph viewport has zero size")]
    DegenerateViewport,

    /// Unexpected failure inside the frame pipeline
    #[error("{0}")]
    Render(String),

    /// A run mutation was rejected or could not be persisted
    #[error("{0}")]
    Model(String),
}

impl From<crate::Error> for ViewError {
    fn from(err: crate::Error) -> Self {
        ViewError::Model(err.to_string())
    }
}

/// Persistence hook called after every mutation
pub trait RunPersister {
    fn persist(&mut self, run: &Run) -> crate::Result<()>;
}

/// Persister that keeps nothing, for views over throwaway runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPersist;

impl RunPersister for NoPersist {
    fn persist(&mut self, _run: &Run) -> crate::Result<()> {
        Ok(())
    }
}

impl<P: RunPersister + ?Sized> RunPersister for &mut P {
    fn persist(&mut self, run: &Run) -> crate::Result<()> {
        (**self).persist(run)
    }
}

/// Coalesces render requests into at most one pending frame
#[derive(Debug, Default, Clone)]
pub struct FrameScheduler {
    pending: bool,
    frames: u64,
}

impl FrameScheduler {
    /// Request a frame. Returns true only when no frame was pending, i.e.
    /// when the caller must ask the host for a callback.
    pub fn schedule(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Mark the pending frame as started.
    pub fn begin_frame(&mut self) {
        self.pending = false;
        self.frames += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Frames started so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Connect interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectMode {
    #[default]
    Idle,
    /// Pick a task for the source agent
    ConnectTask,
    /// Pick another agent for the source agent
    ConnectAgent,
}

impl ConnectMode {
    pub fn hint(self) -> Option<&'static str> {
        match self {
            ConnectMode::Idle => None,
            ConnectMode::ConnectTask => Some(theme::hint::CONNECT_TASK),
            ConnectMode::ConnectAgent => Some(theme::hint::CONNECT_AGENT),
        }
    }
}

/// Selected node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    id: String,
    kind: NodeKind,
    start: Position,
    /// Pointer minus node position at pointer down
    offset: Position,
}

/// The board graph view over one run
pub struct GraphView<S: Scene, P: RunPersister> {
    run: Run,
    scene: S,
    persister: P,
    layout: LayoutEngine,
    camera: Camera,
    router: EdgeRouter,
    scheduler: FrameScheduler,
    mode: ConnectMode,
    source_agent: Option<String>,
    selection: Option<Selection>,
    expanded: Option<String>,
    drag: Option<ActiveDrag>,
    measure_needed: bool,
    needs_layout: bool,
    aborted: bool,
}

impl<S: Scene> GraphView<S, Storage> {
    /// Resolve a run from storage and build an unmounted view over it.
    ///
    /// `query_run_id` takes precedence over the latest run pointer. When
    /// nothing resolves the host is expected to redirect to the index page.
    pub fn open(
        storage: Storage,
        query_run_id: Option<&str>,
        scene: S,
        config: LayoutConfig,
    ) -> Result<Self, ViewError> {
        match storage.resolve_run(query_run_id)? {
            Some(run) => Ok(Self::new(run, scene, storage, config)),
            None => {
                info!(query = ?query_run_id, "no run data, redirecting to index");
                Err(ViewError::MissingRun)
            }
        }
    }
}

impl<S: Scene, P: RunPersister> GraphView<S, P> {
    /// Create an unmounted view.
    pub fn new(run: Run, scene: S, persister: P, config: LayoutConfig) -> Self {
        Self {
            run,
            scene,
            persister,
            layout: LayoutEngine::new(config),
            camera: Camera::new(),
            router: EdgeRouter::new(),
            scheduler: FrameScheduler::default(),
            mode: ConnectMode::Idle,
            source_agent: None,
            selection: None,
            expanded: None,
            drag: None,
            measure_needed: true,
            needs_layout: false,
            aborted: false,
        }
    }

    /// Mount the view: check the scene, build node state, seed the layout
    /// and run the first sync.
    ///
    /// Missing mounts show a banner. An empty run or a zero-size viewport
    /// shows a placeholder. In every failure case the pipeline stays
    /// aborted and no layout runs.
    pub fn mount(&mut self) -> Result<(), ViewError> {
        info!(
            run_id = %self.run.run_id,
            tasks = self.run.tasks.len(),
            agents = self.run.agents.len(),
            "mounting graph view"
        );

        if let Some(name) = missing_mount(&self.scene) {
            warn!(mount = name, "graph render aborted: missing mount point");
            self.aborted = true;
            self.scene.apply(vec![RenderCommand::ShowBanner {
                message: theme::message::MISSING_MOUNTS.to_string(),
            }]);
            return Err(ViewError::MissingMount(name.to_string()));
        }

        self.persister.persist(&self.run)?;

        if self.run.is_empty() {
            info!("graph render aborted: tasks/agents empty");
            self.aborted = true;
            self.scene.apply(vec![RenderCommand::ShowPlaceholder {
                message: theme::message::EMPTY_GRAPH.to_string(),
            }]);
            return Err(ViewError::EmptyGraph);
        }

        if self.scene.viewport_size().is_degenerate() || self.scene.canvas_size().is_degenerate() {
            warn!("graph render aborted: viewport has zero size");
            self.aborted = true;
            self.scene.apply(vec![RenderCommand::ShowPlaceholder {
                message: theme::message::DEGENERATE_VIEWPORT.to_string(),
            }]);
            return Err(ViewError::DegenerateViewport);
        }

        let config = self.layout.config.clone();
        self.layout = LayoutEngine::from_run(&self.run, config);
        self.measure();
        self.run.ensure_link_consistency(Utc::now());
        let canvas = self.scene.canvas_size();
        self.layout.seed(&mut self.run, canvas);
        self.schedule_render();
        self.sync_all()
    }

    pub fn persister(&self) -> &P {
        &self.persister
    }

    /// Tear the view down, handing back the run and the scene.
    ///
    /// Node positions are written back into the run unless the pipeline
    /// aborted.
    pub fn unmount(mut self) -> (Run, S) {
        if !self.aborted {
            self.layout.write_back(&mut self.run);
        }
        (self.run, self.scene)
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn router(&self) -> &EdgeRouter {
        &self.router
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn connect_mode(&self) -> ConnectMode {
        self.mode
    }

    pub fn source_agent(&self) -> Option<&str> {
        self.source_agent.as_deref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Request a frame unless one is already pending.
    pub fn schedule_render(&mut self) {
        if self.scheduler.schedule() {
            self.scene.request_frame();
        }
    }

    fn measure(&mut self) {
        let ids: Vec<String> = self.layout.nodes.iter().map(|n| n.id.clone()).collect();
        for id in ids {
            let size = self.scene.measure(&id).unwrap_or_default();
            self.layout.set_size(&id, size);
        }
    }

    /// Run one frame. Returns whether another frame was scheduled.
    ///
    /// Errors inside the pipeline are logged, shown as a banner, and abort
    /// the view.
    pub fn render_frame(&mut self) -> Result<bool, ViewError> {
        self.scheduler.begin_frame();
        if self.aborted {
            debug!("render frame skipped: pipeline aborted");
            return Ok(false);
        }
        match self.frame() {
            Ok(more) => Ok(more),
            Err(err) => {
                warn!(error = %err, "graph render failed");
                self.aborted = true;
                self.scene.apply(vec![RenderCommand::ShowBanner {
                    message: theme::render_failed(&err.to_string()),
                }]);
                Err(err)
            }
        }
    }

    fn frame(&mut self) -> Result<bool, ViewError> {
        let canvas = self.scene.canvas_size();
        if self.measure_needed {
            self.measure();
            self.measure_needed = false;
        }
        if let Some(node) = self.layout.nodes.iter().find(|n| !n.current.is_finite()) {
            return Err(ViewError::Render(format!(
                "node {} has a non-finite position",
                node.id
            )));
        }
        let dragging = self.drag.is_some();
        if self.needs_layout && !dragging {
            self.layout.compute_targets(&self.run, canvas);
            self.needs_layout = false;
        }
        let needs_more = if dragging {
            false
        } else {
            let more = self.layout.glide(canvas);
            self.layout.write_back(&mut self.run);
            more
        };
        if !dragging {
            self.layout.settle_step(canvas);
        }

        let mut commands: Vec<RenderCommand> = self
            .layout
            .nodes
            .iter()
            .map(|n| RenderCommand::PlaceNode {
                id: n.id.clone(),
                position: n.current,
            })
            .collect();

        let diff = self.router.route(&self.run, &self.layout);
        commands.extend(self.router.commands(&diff));
        commands.push(self.camera_command());
        commands.extend(self.focus().commands());
        commands.push(RenderCommand::CompatibilityPanel(self.compatibility_panel()));
        self.scene.apply(commands);

        let more = needs_more || self.layout.is_settling();
        if more {
            self.schedule_render();
        }
        Ok(more)
    }

    /// Drive frames until the view goes idle or `max_frames` ran. Returns the
    /// number of frames run.
    pub fn run_until_idle(&mut self, max_frames: usize) -> Result<usize, ViewError> {
        let mut frames = 0;
        while self.scheduler.is_pending() && frames < max_frames {
            self.render_frame()?;
            frames += 1;
        }
        debug!(frames, "render loop idle");
        Ok(frames)
    }

    fn camera_command(&mut self) -> RenderCommand {
        if self.camera.sanitize() {
            warn!("invalid camera transform reset to identity");
        }
        RenderCommand::SetTransform {
            transform: self.camera.transform(),
        }
    }

    fn focus(&self) -> FocusState {
        FocusState::compute(
            self.selection.as_ref().map(|s| s.id.as_str()),
            self.layout.nodes.iter().map(|n| n.id.as_str()),
            &self.router,
        )
    }

    /// Link suggestions for the current selection.
    ///
    /// Agents use the live scorer; tasks use the snapshot stored for the
    /// first agent recorded against them.
    pub fn compatibility_panel(&self) -> PanelContent {
        let Some(selection) = &self.selection else {
            return PanelContent::Idle(theme::message::COMPAT_IDLE.to_string());
        };
        let (good, bad) = match selection.kind {
            NodeKind::Agent => {
                let compat = compute_compatibility(&selection.id, &self.run.agents);
                (compat.good, compat.bad)
            }
            NodeKind::Task => self
                .run
                .compatibility
                .get(&selection.id)
                .and_then(|snapshots| snapshots.values().next())
                .map(|s| (s.good.clone(), s.bad.clone()))
                .unwrap_or_default(),
        };
        let names = |ids: &[String]| -> Vec<String> {
            ids.iter()
                .filter_map(|id| self.run.agent(id))
                .map(|a| a.name.clone())
                .collect()
        };
        PanelContent::Suggestions {
            recommended: names(&good),
            avoid: names(&bad),
        }
    }

    /// Recompute derived state, persist, and schedule a frame.
    pub fn sync_all(&mut self) -> Result<(), ViewError> {
        if self.aborted {
            debug!("sync skipped: pipeline aborted");
            return Ok(());
        }
        self.run.refresh();

        let team = evaluate_team(&self.run.workspace_agent_ids, &self.run.agents);
        let mut commands: Vec<RenderCommand> = agent_statuses(&self.run)
            .into_iter()
            .map(|(id, status)| RenderCommand::AgentStatus { id, status })
            .collect();
        commands.push(RenderCommand::Workspace(team.report));
        commands.push(RenderCommand::Metrics(self.run.metrics.clone()));
        self.scene.apply(commands);

        self.persister.persist(&self.run)?;
        self.schedule_render();
        Ok(())
    }

    fn node_kind(&self, id: &str) -> Option<NodeKind> {
        self.layout.node(id).map(|n| n.kind)
    }

    /// Start dragging a node. `pointer` is in canvas coordinates.
    pub fn pointer_down(&mut self, node_id: &str, pointer: Position) {
        let Some(node) = self.layout.node_mut(node_id) else {
            return;
        };
        node.pinned = true;
        if node.kind == NodeKind::Agent {
            node.docked = false;
        }
        self.drag = Some(ActiveDrag {
            id: node.id.clone(),
            kind: node.kind,
            start: pointer,
            offset: Position::new(pointer.x - node.current.x, pointer.y - node.current.y),
        });
    }

    /// Move the dragged node with the pointer.
    pub fn pointer_move(&mut self, pointer: Position) {
        let Some(drag) = &self.drag else {
            return;
        };
        let position = Position::new(pointer.x - drag.offset.x, pointer.y - drag.offset.y);
        let id = drag.id.clone();
        if let Some(node) = self.layout.node_mut(&id) {
            node.current = position;
            node.target = position;
        }
        self.scene.apply(vec![RenderCommand::PlaceNode { id, position }]);
        self.schedule_render();
    }

    /// Release the dragged node.
    ///
    /// A release within the click threshold of the press point on an agent
    /// toggles its expanded card. Every release starts a settle.
    pub fn pointer_up(&mut self, pointer: Position) -> Result<(), ViewError> {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };
        let moved = drag.start.distance(&pointer) > self.layout.config.click_threshold;
        let canvas = self.scene.canvas_size();
        if let Some(node) = self.layout.node_mut(&drag.id) {
            node.pinned = false;
        }
        self.layout.clamp(&drag.id, canvas);
        self.layout.write_back(&mut self.run);

        if drag.kind == NodeKind::Agent && !moved {
            self.toggle_expanded(&drag.id);
        }

        let iterations = self.layout.config.drag_settle_iterations;
        self.layout.request_settle(iterations);
        self.schedule_render();
        self.sync_all()
    }

    /// Expand an agent's card, or collapse it if it is the expanded one.
    pub fn toggle_expanded(&mut self, agent_id: &str) {
        self.expanded = if self.expanded.as_deref() == Some(agent_id) {
            None
        } else {
            Some(agent_id.to_string())
        };
        let commands = self
            .run
            .agents
            .iter()
            .map(|a| RenderCommand::Expanded {
                id: a.id.clone(),
                expanded: self.expanded.as_deref() == Some(a.id.as_str()),
            })
            .collect();
        self.scene.apply(commands);

        let size = self.scene.measure(agent_id).unwrap_or_default();
        self.layout.set_size(agent_id, size);
        self.measure_needed = true;
        self.schedule_render();
    }

    fn clear_expanded(&mut self) {
        if let Some(id) = self.expanded.take() {
            self.scene.apply(vec![RenderCommand::Expanded {
                id,
                expanded: false,
            }]);
        }
    }

    /// Enter a connect mode for `source_agent`, or leave it with `Idle`.
    pub fn set_connect_mode(
        &mut self,
        mode: ConnectMode,
        source_agent: Option<&str>,
    ) -> Result<(), ViewError> {
        if let Some(id) = source_agent {
            if self.run.agent(id).is_none() {
                return Err(crate::Error::NotFound(format!("Agent {}", id)).into());
            }
        }
        self.apply_connect_mode(mode, source_agent.map(str::to_string));
        Ok(())
    }

    /// Leave connect mode.
    pub fn cancel_connect(&mut self) {
        self.apply_connect_mode(ConnectMode::Idle, None);
    }

    fn apply_connect_mode(&mut self, mode: ConnectMode, source_agent: Option<String>) {
        self.mode = mode;
        self.source_agent = source_agent;

        let mut commands = vec![RenderCommand::ConnectHint {
            text: mode.hint().map(str::to_string),
        }];
        commands.extend(self.selectable_marks());
        self.scene.apply(commands);
        self.schedule_render();
    }

    fn selectable_marks(&self) -> Vec<RenderCommand> {
        let compat = match (&self.source_agent, self.mode) {
            (Some(source), mode) if mode != ConnectMode::Idle => {
                Some(compute_compatibility(source, &self.run.agents))
            }
            _ => None,
        };
        self.layout
            .nodes
            .iter()
            .map(|node| {
                let status = compat
                    .as_ref()
                    .filter(|_| node.kind == NodeKind::Agent)
                    .and_then(|c| {
                        if c.good.contains(&node.id) {
                            Some(PairStatus::Good)
                        } else if c.bad.contains(&node.id) {
                            Some(PairStatus::Bad)
                        } else {
                            None
                        }
                    });
                let selectable = match self.mode {
                    ConnectMode::Idle => false,
                    ConnectMode::ConnectTask => node.kind == NodeKind::Task,
                    ConnectMode::ConnectAgent => {
                        node.kind == NodeKind::Agent
                            && self.source_agent.as_deref() != Some(node.id.as_str())
                    }
                };
                RenderCommand::NodeMarks {
                    id: node.id.clone(),
                    selectable,
                    compat: status,
                }
            })
            .collect()
    }

    fn select(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// Resolve a click on the canvas. `target` is the node under the
    /// pointer, if any.
    ///
    /// In a connect mode, a matching target completes the link and leaves
    /// the mode; empty canvas cancels it. Outside connect mode a node click
    /// selects it. Anything else that is not an agent clears selection and
    /// the expanded card.
    pub fn click(&mut self, target: Option<&str>) -> Result<(), ViewError> {
        let target = target.and_then(|id| self.node_kind(id).map(|kind| (id.to_string(), kind)));

        if self.mode != ConnectMode::Idle {
            if let (Some((id, kind)), Some(source)) = (&target, self.source_agent.clone()) {
                match (self.mode, kind) {
                    (ConnectMode::ConnectTask, NodeKind::Task) => {
                        let result = self.run.toggle_agent_task_link(&source, id, Utc::now());
                        self.cancel_connect();
                        let change = result?;
                        debug!(agent = %source, task = %id, ?change, "agent-task link toggled");
                        return self.sync_all();
                    }
                    (ConnectMode::ConnectAgent, NodeKind::Agent) if *id != source => {
                        let result = self.run.toggle_agent_agent_link(&source, id, Utc::now());
                        self.cancel_connect();
                        let change = result?;
                        debug!(a = %source, b = %id, ?change, "agent-agent link toggled");
                        return self.sync_all();
                    }
                    _ => {}
                }
            }
        }

        if self.mode != ConnectMode::Idle && target.is_none() {
            self.cancel_connect();
        }

        if let Some((id, kind)) = &target {
            if self.mode == ConnectMode::Idle {
                self.select(Some(Selection {
                    id: id.clone(),
                    kind: *kind,
                }));
                self.schedule_render();
                return Ok(());
            }
        }

        let on_agent = matches!(target, Some((_, NodeKind::Agent)));
        if !on_agent {
            self.clear_expanded();
            self.select(None);
            self.schedule_render();
        }
        Ok(())
    }

    /// Escape: leave connect mode and clear the selection.
    pub fn escape(&mut self) {
        self.cancel_connect();
        self.select(None);
        self.schedule_render();
    }

    /// Recompute lane targets and settle.
    pub fn auto_arrange(&mut self) -> Result<(), ViewError> {
        self.relayout(self.layout.config.drag_settle_iterations)?;
        self.schedule_render();
        Ok(())
    }

    /// Recompute lane targets, fit the camera to the tasks and settle.
    pub fn fit_view(&mut self) -> Result<(), ViewError> {
        self.fit_to_view();
        self.relayout(self.layout.config.relayout_settle_iterations)?;
        self.schedule_render();
        Ok(())
    }

    fn relayout(&mut self, iterations: u32) -> Result<(), ViewError> {
        let canvas = self.scene.canvas_size();
        self.needs_layout = true;
        self.layout.compute_targets(&self.run, canvas);
        self.layout.request_settle(iterations);
        self.persister.persist(&self.run)?;
        Ok(())
    }

    fn fit_to_view(&mut self) {
        let Some(bounds) = self.layout.bounds(NodeKind::Task) else {
            return;
        };
        let canvas = self.layout.config.canvas_or_default(self.scene.canvas_size());
        self.camera.fit_to(bounds, canvas);
        let command = self.camera_command();
        self.scene.apply(vec![command]);
    }

    /// Clear workspace and links (and assignments when asked), then reseed.
    pub fn reset(&mut self, clear_assignments: bool) -> Result<(), ViewError> {
        self.run.reset_workspace(clear_assignments);
        let canvas = self.scene.canvas_size();
        self.layout.seed(&mut self.run, canvas);
        self.sync_all()
    }

    /// The canvas changed size.
    pub fn resize(&mut self) {
        self.measure_needed = true;
        self.fit_to_view();
        self.schedule_render();
    }

    /// Wheel zoom.
    pub fn wheel(&mut self, delta_y: f64) {
        self.camera.wheel(delta_y);
        let command = self.camera_command();
        self.scene.apply(vec![command]);
    }

    /// Start panning unless the press landed on a node.
    pub fn pan_start(&mut self, pointer: Position, on_node: bool) {
        if on_node {
            return;
        }
        self.camera.pan_start(pointer);
    }

    pub fn pan_move(&mut self, pointer: Position) {
        if self.camera.pan_move(pointer) {
            let command = self.camera_command();
            self.scene.apply(vec![command]);
        }
    }

    pub fn pan_end(&mut self) {
        self.camera.pan_end();
    }

    pub fn toggle_workspace(&mut self, agent_id: &str) -> Result<bool, ViewError> {
        let added = self.run.toggle_workspace(agent_id)?;
        self.sync_all()?;
        Ok(added)
    }

    pub fn clear_agent_links(&mut self, agent_id: &str) -> Result<(), ViewError> {
        self.run.clear_agent_links(agent_id)?;
        self.sync_all()
    }

    pub fn toggle_agent_task_link(
        &mut self,
        agent_id: &str,
        task_id: &str,
    ) -> Result<LinkChange, ViewError> {
        let change = self.run.toggle_agent_task_link(agent_id, task_id, Utc::now())?;
        self.sync_all()?;
        Ok(change)
    }

    pub fn toggle_agent_agent_link(&mut self, a: &str, b: &str) -> Result<LinkChange, ViewError> {
        let change = self.run.toggle_agent_agent_link(a, b, Utc::now())?;
        self.sync_all()?;
        Ok(change)
    }
}

/// Size of the headless canvas used outside a browser.
pub fn headless_canvas(config: &LayoutConfig) -> Size {
    Size::new(config.canvas_width, config.canvas_height)
}
