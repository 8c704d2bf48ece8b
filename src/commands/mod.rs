//! Command implementations for the `rp` CLI.
//!
//! Each command loads what it needs from [`Storage`], applies one operation
//! and returns a result that prints as JSON or as human-readable text.
//! Commands on a deployed run go through a headless [`GraphView`], so they
//! run the same sync, persist and render pipeline as the board view.

use crate::config::{ReplicatorConfig, config_path};
use crate::gui::shared::layout::NodeKind;
use crate::gui::shared::scene::HeadlessScene;
use crate::gui::view::{GraphView, ViewError, headless_canvas};
use crate::models::agents::default_roster;
use crate::models::compat::{
    PairStatus, TeamReport, agent_statuses, compute_compatibility, evaluate_agent_pair,
    evaluate_team,
};
use crate::models::receptionist::{Objective, PushMode, ReceptionRun, push_plan};
use crate::models::{
    Agent, Board, Brief, LinkChange, Metrics, Run, RunSettings, SizeClass, Task, TaskStatus,
    normalize_pair,
};
use crate::storage::{Storage, generate_unique_id};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn agent_name<'a>(agents: &'a [Agent], id: &'a str) -> &'a str {
    agents
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.name.as_str())
        .unwrap_or(id)
}

/// Agent ID with display name.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRef {
    pub id: String,
    pub name: String,
}

impl AgentRef {
    fn new(agents: &[Agent], id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: agent_name(agents, id).to_string(),
        }
    }
}

// === Board ===

#[derive(Debug, Serialize)]
pub struct BoardShow {
    pub tasks: Vec<Task>,
    pub assignments: BTreeMap<String, String>,
    pub available_agents: Vec<AgentRef>,
    #[serde(skip)]
    roster: Vec<Agent>,
}

impl CommandResult for BoardShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{} task(s) on the board:", self.tasks.len())];
        for task in &self.tasks {
            let agents: Vec<&str> = task
                .agents
                .iter()
                .map(|id| agent_name(&self.roster, id))
                .collect();
            lines.push(format!(
                "  {} [{}] {} ({}/{})",
                task.id,
                task.size,
                task.title,
                task.agents.len(),
                task.capacity()
            ));
            if !agents.is_empty() {
                lines.push(format!("      agents: {}", agents.join(", ")));
            }
        }
        let available: Vec<&str> = self
            .available_agents
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        lines.push(format!("Available agents: {}", available.join(", ")));
        lines.join("\n")
    }
}

/// Show the planning board.
pub fn board_show(storage: &Storage) -> Result<BoardShow> {
    let board = storage.load_board()?;
    let roster = default_roster();
    let available_agents = board
        .available_agents(&roster)
        .into_iter()
        .map(|a| AgentRef::new(&roster, &a.id))
        .collect();
    Ok(BoardShow {
        tasks: board.tasks,
        assignments: board.assignments,
        available_agents,
        roster,
    })
}

#[derive(Debug, Serialize)]
pub struct TaskAdded {
    pub id: String,
    pub title: String,
    pub size: SizeClass,
    pub capacity: usize,
}

impl CommandResult for TaskAdded {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Added task {} \"{}\" [{}], takes up to {} agent(s)",
            self.id, self.title, self.size, self.capacity
        )
    }
}

/// Add a task to the planning board.
pub fn board_add_task(storage: &mut Storage, title: &str, size: &str, desc: &str) -> Result<TaskAdded> {
    let size: SizeClass = size.parse()?;
    let mut board = storage.load_board()?;
    let taken: Vec<&str> = board.tasks.iter().map(|t| t.id.as_str()).collect();
    let id = generate_unique_id("t", title, &taken);

    let task = Task::new(id, title.trim(), size).with_desc(desc);
    let added = board.add_task(task)?;
    let result = TaskAdded {
        id: added.id.clone(),
        title: added.title.clone(),
        size: added.size,
        capacity: added.capacity(),
    };
    storage.save_board(&board)?;
    info!(task_id = %result.id, "added board task");
    Ok(result)
}

#[derive(Debug, Serialize)]
pub struct Assigned {
    pub agent_id: String,
    pub task_id: String,
    pub changed: bool,
    pub good: Vec<AgentRef>,
    pub bad: Vec<AgentRef>,
}

impl CommandResult for Assigned {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if !self.changed {
            return format!("{} is already on {}", self.agent_id, self.task_id);
        }
        let names = |list: &[AgentRef]| {
            list.iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut lines = vec![format!("Assigned {} to {}", self.agent_id, self.task_id)];
        if !self.good.is_empty() {
            lines.push(format!("  works well with: {}", names(&self.good)));
        }
        if !self.bad.is_empty() {
            lines.push(format!("  avoid pairing with: {}", names(&self.bad)));
        }
        lines.join("\n")
    }
}

/// Assign a roster agent to a board task.
pub fn board_assign(storage: &mut Storage, agent_id: &str, task_id: &str) -> Result<Assigned> {
    let mut board = storage.load_board()?;
    let roster = default_roster();
    let changed = board.assign(agent_id, task_id, &roster, Utc::now())?;
    storage.save_board(&board)?;

    let snapshot = board
        .compatibility
        .get(task_id)
        .and_then(|by_agent| by_agent.get(agent_id))
        .cloned()
        .unwrap_or_default();
    Ok(Assigned {
        agent_id: agent_id.to_string(),
        task_id: task_id.to_string(),
        changed,
        good: snapshot.good.iter().map(|id| AgentRef::new(&roster, id)).collect(),
        bad: snapshot.bad.iter().map(|id| AgentRef::new(&roster, id)).collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct Unassigned {
    pub agent_id: String,
    pub task_id: Option<String>,
}

impl CommandResult for Unassigned {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.task_id {
            Some(task_id) => format!("Released {} from {}", self.agent_id, task_id),
            None => format!("{} was not assigned", self.agent_id),
        }
    }
}

/// Release an agent from its board task.
pub fn board_unassign(storage: &mut Storage, agent_id: &str) -> Result<Unassigned> {
    let mut board = storage.load_board()?;
    let task_id = board.unassign(agent_id);
    if task_id.is_some() {
        storage.save_board(&board)?;
    }
    Ok(Unassigned {
        agent_id: agent_id.to_string(),
        task_id,
    })
}

#[derive(Debug, Serialize)]
pub struct BoardReset {
    pub reset: bool,
    pub tasks: usize,
}

impl CommandResult for BoardReset {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Board reset to {} default task(s)", self.tasks)
    }
}

/// Restore the default board.
pub fn board_reset(storage: &mut Storage) -> Result<BoardReset> {
    storage.clear_board()?;
    Ok(BoardReset {
        reset: true,
        tasks: Board::default().tasks.len(),
    })
}

// === Receptionist plans ===

#[derive(Debug, Serialize)]
pub struct PlanCreated {
    pub reception: ReceptionRun,
}

impl CommandResult for PlanCreated {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let run = &self.reception;
        let mut lines = vec![format!(
            "Plan {} for objective '{}' ({} step(s)):",
            run.run_id,
            run.objective,
            run.plan.tasks.len()
        )];
        for (index, task) in run.plan.tasks.iter().enumerate() {
            lines.push(format!("  {}. {} -> {}", index + 1, task.title, task.deliverable));
            let agents = task.suggested_agents();
            if !agents.is_empty() {
                lines.push(format!("     suggested: {}", agents.join(", ")));
            }
        }
        for note in &run.plan.risk_notes {
            lines.push(format!("  ! {}", note));
        }
        lines.join("\n")
    }
}

/// Generate a plan for an objective and record the receptionist run.
pub fn plan_create(storage: &mut Storage, intent: &str, objective: &str) -> Result<PlanCreated> {
    if intent.trim().is_empty() {
        return Err(Error::InvalidInput("Intent is required".to_string()));
    }
    let objective: Objective = objective.parse()?;
    let reception = ReceptionRun::new(intent.trim(), objective, Utc::now());
    storage.add_receptionist_run(&reception)?;
    info!(reception_id = %reception.run_id, "created receptionist plan");
    Ok(PlanCreated { reception })
}

#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub objective: Objective,
    pub intent: String,
    pub tasks: usize,
}

#[derive(Debug, Serialize)]
pub struct PlanList {
    pub runs: Vec<PlanSummary>,
}

impl CommandResult for PlanList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.runs.is_empty() {
            return "No receptionist runs".to_string();
        }
        self.runs
            .iter()
            .map(|r| {
                format!(
                    "{}  {}  {:<8} {} step(s)  \"{}\"",
                    r.run_id,
                    r.created_at.format("%Y-%m-%d %H:%M"),
                    r.objective.as_str(),
                    r.tasks,
                    r.intent
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// List receptionist runs, newest first.
pub fn plan_list(storage: &Storage) -> Result<PlanList> {
    let runs = storage
        .receptionist_runs()?
        .into_iter()
        .map(|r| PlanSummary {
            tasks: r.plan.tasks.len(),
            run_id: r.run_id,
            created_at: r.created_at,
            objective: r.objective,
            intent: r.intent_raw,
        })
        .collect();
    Ok(PlanList { runs })
}

#[derive(Debug, Serialize)]
pub struct PlanPushed {
    pub reception_id: String,
    pub mode: String,
    pub created: Vec<String>,
    pub board_tasks: usize,
}

impl CommandResult for PlanPushed {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Pushed {} task(s) from {} ({}); board now has {} task(s)",
            self.created.len(),
            self.reception_id,
            self.mode,
            self.board_tasks
        )
    }
}

/// Push a receptionist plan onto the planning board.
pub fn plan_push(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    reception_id: Option<&str>,
    mode: &str,
    prefix: Option<&str>,
) -> Result<PlanPushed> {
    let mode: PushMode = mode.parse()?;
    let mut reception = match reception_id {
        Some(id) => storage
            .receptionist_run(id)?
            .ok_or_else(|| Error::NotFound(format!("Receptionist run {}", id)))?,
        None => storage
            .receptionist_runs()?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::InvalidInput("No receptionist runs: create a plan first".to_string())
            })?,
    };
    let prefix = prefix.unwrap_or(&config.plan.tag_prefix);

    let mut board = storage.load_board()?;
    let created = push_plan(&mut board, &reception, mode, prefix);
    storage.save_board(&board)?;

    let mode_name = match mode {
        PushMode::Append => "append",
        PushMode::Replace => "replace",
    };
    reception.log_audit(
        "push",
        "Pushed plan to board",
        serde_json::json!({ "mode": mode_name, "tasks": created.len() }),
        Utc::now(),
    );
    storage.update_receptionist_run(&reception)?;

    Ok(PlanPushed {
        reception_id: reception.run_id,
        mode: mode_name.to_string(),
        created,
        board_tasks: board.tasks.len(),
    })
}

// === Deployment ===

/// Options for [`deploy`].
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub brief: String,
    pub priority: String,
    pub mode: String,
    pub review_required: bool,
    pub risk: Option<u8>,
    pub tempo: Option<u8>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct Deployed {
    pub run_id: String,
    pub tasks: usize,
    pub agents: usize,
    pub assignments: usize,
    pub edges: usize,
    pub settings: RunSettings,
}

impl CommandResult for Deployed {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Deployed {}: {} task(s), {} agent(s), {} assignment(s) (risk {}, tempo {})",
            self.run_id,
            self.tasks,
            self.agents,
            self.assignments,
            self.settings.risk,
            self.settings.tempo
        )
    }
}

/// Transmit the brief and deploy the planning board as a new run.
pub fn deploy(storage: &mut Storage, options: DeployOptions) -> Result<Deployed> {
    let now = Utc::now();
    let stored = storage.settings()?;
    let settings = RunSettings {
        risk: options.risk.unwrap_or(stored.risk),
        tempo: options.tempo.unwrap_or(stored.tempo),
    };
    storage.set_settings(&settings)?;

    let brief = Brief {
        text: options.brief,
        priority: options.priority,
        mode: options.mode,
        review_required: options.review_required,
    };
    storage.transmit_brief(&brief, now)?;

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let board = storage.load_board()?;
    let run = Run::deploy(&board, &default_roster(), brief, settings.clone(), &mut rng, now);
    storage.store_deployed_run(&run)?;

    Ok(Deployed {
        run_id: run.run_id.clone(),
        tasks: run.tasks.len(),
        agents: run.agents.len(),
        assignments: run.assignments.len(),
        edges: run.edges.len(),
        settings,
    })
}

// === Runs ===

#[derive(Debug, Serialize)]
pub struct RunShow {
    pub run: Run,
}

impl CommandResult for RunShow {
    fn to_json(&self) -> String {
        json(&self.run)
    }

    fn to_human(&self) -> String {
        let run = &self.run;
        let mut lines = vec![format!(
            "Run {} (created {})",
            run.run_id,
            run.created_at.format("%Y-%m-%d %H:%M")
        )];
        if !run.brief.text.is_empty() {
            lines.push(format!("Brief: {}", run.brief.text));
        }
        lines.push(format!(
            "Priority {} / {} / review {} / risk {} / tempo {}",
            run.brief.priority,
            run.brief.mode,
            if run.brief.review_required { "on" } else { "off" },
            run.settings.risk,
            run.settings.tempo
        ));
        lines.push(String::new());
        lines.push("Tasks:".to_string());
        for task in &run.tasks {
            let status = match task.status {
                TaskStatus::Queued => "queued",
                TaskStatus::Active => "active",
                TaskStatus::Done => "done",
            };
            let agents: Vec<&str> = task
                .agents
                .iter()
                .map(|id| agent_name(&run.agents, id))
                .collect();
            lines.push(format!(
                "  {} [{}] {} ({}, {}/{}) {}",
                task.id,
                task.size,
                task.title,
                status,
                task.agents.len(),
                task.capacity(),
                agents.join(", ")
            ));
        }
        lines.push(String::new());
        lines.push(metrics_line(&run.metrics));
        if let Some(task_id) = &run.metrics.bottleneck_task_id {
            lines.push(format!("Bottleneck: {}", task_id));
        }
        let workspace: Vec<&str> = run
            .workspace_agent_ids
            .iter()
            .map(|id| agent_name(&run.agents, id))
            .collect();
        lines.push(format!(
            "Workspace: {}",
            if workspace.is_empty() {
                "(empty)".to_string()
            } else {
                workspace.join(", ")
            }
        ));
        lines.push(format!(
            "Links: {} agent-task, {} agent-agent",
            run.links.agent_to_task.len(),
            run.links.agent_to_agent.len()
        ));
        lines.join("\n")
    }
}

fn metrics_line(metrics: &Metrics) -> String {
    format!(
        "Efficiency {:.1} / {} active / {} idle",
        metrics.efficiency_score, metrics.active_agents, metrics.idle_agents
    )
}

/// Show a run.
pub fn run_show(storage: &Storage, run_id: Option<&str>) -> Result<RunShow> {
    Ok(RunShow {
        run: storage.require_run(run_id)?,
    })
}

/// Node position after a headless render.
#[derive(Debug, Clone, Serialize)]
pub struct NodePlacement {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
}

/// Drawn edge after a headless render.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeLine {
    pub key: String,
    pub class: String,
    pub path: String,
}

/// What a headless render left behind.
#[derive(Debug, Serialize)]
pub struct RenderedGraph {
    pub run_id: String,
    pub frames: usize,
    pub nodes: Vec<NodePlacement>,
    pub edges: Vec<EdgeLine>,
    pub transform: Option<String>,
}

impl CommandResult for RenderedGraph {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Run {}: {} node(s), {} edge(s) after {} frame(s)",
            self.run_id,
            self.nodes.len(),
            self.edges.len(),
            self.frames
        )];
        for node in &self.nodes {
            let kind = match node.kind {
                NodeKind::Task => "task",
                NodeKind::Agent => "agent",
            };
            lines.push(format!("  {:<5} {:<12} ({:.0}, {:.0})", kind, node.id, node.x, node.y));
        }
        for edge in &self.edges {
            lines.push(format!("  {} [{}]", edge.key, edge.class));
        }
        if let Some(transform) = &self.transform {
            lines.push(format!("Camera: {}", transform));
        }
        lines.join("\n")
    }
}

type HeadlessView<'a> = GraphView<HeadlessScene, &'a mut Storage>;

/// Mount a headless view over a run, apply `action`, render until idle and
/// store the result.
fn with_view<T>(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    run_id: Option<&str>,
    action: impl FnOnce(&mut HeadlessView<'_>) -> std::result::Result<T, ViewError>,
) -> Result<(T, RenderedGraph)> {
    let run = storage.require_run(run_id)?;
    let scene = HeadlessScene::new(headless_canvas(&config.layout));
    let mut view = GraphView::new(run, scene, &mut *storage, config.layout.clone());
    view.mount()?;

    let value = action(&mut view)?;
    let frames = view.run_until_idle(config.view.max_frames)?;
    debug!(frames, "headless render finished");

    let nodes = view
        .layout()
        .nodes
        .iter()
        .map(|n| NodePlacement {
            id: n.id.clone(),
            kind: n.kind,
            x: n.current.x,
            y: n.current.y,
        })
        .collect();
    let edges = view
        .scene()
        .edges
        .iter()
        .map(|(key, (class, path))| EdgeLine {
            key: key.clone(),
            class: class.clone(),
            path: path.clone(),
        })
        .collect();
    let transform = view.scene().transform.clone();

    let (run, _scene) = view.unmount();
    storage.save_run(&run)?;
    Ok((
        value,
        RenderedGraph {
            run_id: run.run_id,
            frames,
            nodes,
            edges,
            transform,
        },
    ))
}

#[derive(Debug, Serialize)]
pub struct LinkToggled {
    pub kind: &'static str,
    pub from: String,
    pub to: String,
    pub linked: bool,
    /// Pair status for agent links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PairStatus>,
}

impl CommandResult for LinkToggled {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let verb = if self.linked { "Linked" } else { "Unlinked" };
        match self.status {
            Some(status) => format!("{} {} <-> {} ({})", verb, self.from, self.to, status.as_str()),
            None => format!("{} {} -> {}", verb, self.from, self.to),
        }
    }
}

/// Toggle the link between an agent and a task.
pub fn run_link_task(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    run_id: Option<&str>,
    agent_id: &str,
    task_id: &str,
) -> Result<LinkToggled> {
    let (change, _) = with_view(storage, config, run_id, |view| {
        view.toggle_agent_task_link(agent_id, task_id)
    })?;
    Ok(LinkToggled {
        kind: "task",
        from: agent_id.to_string(),
        to: task_id.to_string(),
        linked: change == LinkChange::Linked,
        status: None,
    })
}

/// Toggle the link between two agents.
pub fn run_link_agent(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    run_id: Option<&str>,
    a: &str,
    b: &str,
) -> Result<LinkToggled> {
    let ((change, status), _) = with_view(storage, config, run_id, |view| {
        let change = view.toggle_agent_agent_link(a, b)?;
        let run = view.run();
        let (first, second) = normalize_pair(a, b);
        let status = match (run.agent(&first), run.agent(&second)) {
            (Some(x), Some(y)) => evaluate_agent_pair(x, y).status(),
            _ => PairStatus::Neutral,
        };
        Ok((change, status))
    })?;
    Ok(LinkToggled {
        kind: "agent",
        from: a.to_string(),
        to: b.to_string(),
        linked: change == LinkChange::Linked,
        status: Some(status),
    })
}

#[derive(Debug, Serialize)]
pub struct LinksCleared {
    pub agent_id: String,
    pub cleared: bool,
}

impl CommandResult for LinksCleared {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Cleared links of {}", self.agent_id)
    }
}

/// Remove every link of an agent.
pub fn run_clear_links(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    run_id: Option<&str>,
    agent_id: &str,
) -> Result<LinksCleared> {
    with_view(storage, config, run_id, |view| view.clear_agent_links(agent_id))?;
    Ok(LinksCleared {
        agent_id: agent_id.to_string(),
        cleared: true,
    })
}

#[derive(Debug, Serialize)]
pub struct WorkspaceToggled {
    pub agent_id: String,
    pub in_workspace: bool,
    pub workspace: Vec<String>,
    pub report: TeamReport,
}

impl CommandResult for WorkspaceToggled {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let verb = if self.in_workspace { "Added" } else { "Removed" };
        let mut lines = vec![format!(
            "{} {} ({} agent(s) in workspace)",
            verb,
            self.agent_id,
            self.workspace.len()
        )];
        lines.extend(report_lines(&self.report));
        lines.join("\n")
    }
}

fn report_lines(report: &TeamReport) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.header.is_empty() {
        lines.push(report.header.clone());
    }
    if !report.can_build.is_empty() {
        lines.push(format!("Can build: {}", report.can_build.join(", ")));
    }
    if !report.recommended_stacks.is_empty() {
        lines.push(format!("Stacks: {}", report.recommended_stacks.join(", ")));
    }
    if let Some(best) = &report.best_overall_stack {
        lines.push(format!("Best overall stack: {}", best));
    }
    for warning in &report.warnings {
        lines.push(format!("! {}", warning));
    }
    lines
}

/// Add or remove an agent from the workspace.
pub fn run_workspace(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    run_id: Option<&str>,
    agent_id: &str,
) -> Result<WorkspaceToggled> {
    let ((in_workspace, workspace, report), _) = with_view(storage, config, run_id, |view| {
        let in_workspace = view.toggle_workspace(agent_id)?;
        let run = view.run();
        let report = evaluate_team(&run.workspace_agent_ids, &run.agents).report;
        Ok((in_workspace, run.workspace_agent_ids.clone(), report))
    })?;
    Ok(WorkspaceToggled {
        agent_id: agent_id.to_string(),
        in_workspace,
        workspace,
        report,
    })
}

/// Auto-arrange the graph, optionally fitting the camera, and store the
/// settled positions.
pub fn run_arrange(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    run_id: Option<&str>,
    fit: bool,
) -> Result<RenderedGraph> {
    let ((), graph) = with_view(storage, config, run_id, |view| {
        if fit {
            view.fit_view()
        } else {
            view.auto_arrange()
        }
    })?;
    Ok(graph)
}

/// Render the graph without changing the run.
pub fn run_layout(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    run_id: Option<&str>,
) -> Result<RenderedGraph> {
    let ((), graph) = with_view(storage, config, run_id, |_| Ok(()))?;
    Ok(graph)
}

#[derive(Debug, Serialize)]
pub struct RunReset {
    pub run_id: String,
    pub cleared_assignments: bool,
}

impl CommandResult for RunReset {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.cleared_assignments {
            format!("Reset {}: workspace, links and assignments cleared", self.run_id)
        } else {
            format!("Reset {}: workspace and links cleared", self.run_id)
        }
    }
}

/// Clear workspace and links of a run.
pub fn run_reset(
    storage: &mut Storage,
    config: &ReplicatorConfig,
    run_id: Option<&str>,
    clear_assignments: bool,
) -> Result<RunReset> {
    let ((), graph) = with_view(storage, config, run_id, |view| {
        view.reset(clear_assignments)
    })?;
    Ok(RunReset {
        run_id: graph.run_id,
        cleared_assignments: clear_assignments,
    })
}

// === Compatibility ===

#[derive(Debug, Serialize)]
pub struct CompatShow {
    pub agent: AgentRef,
    pub good: Vec<AgentRef>,
    pub bad: Vec<AgentRef>,
    pub neutral: Vec<AgentRef>,
    pub reasons: BTreeMap<String, Vec<String>>,
}

impl CommandResult for CompatShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let names = |list: &[AgentRef]| {
            if list.is_empty() {
                "-".to_string()
            } else {
                list.iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        format!(
            "Compatibility for {} ({}):\n  recommended: {}\n  avoid: {}\n  neutral: {}",
            self.agent.name,
            self.agent.id,
            names(&self.good),
            names(&self.bad),
            names(&self.neutral)
        )
    }
}

/// Partition the roster by compatibility with one agent.
///
/// Uses the agents of the resolved run, or the default roster when no run
/// has been deployed.
pub fn compat(storage: &Storage, agent_id: &str, run_id: Option<&str>) -> Result<CompatShow> {
    let agents = match (storage.resolve_run(run_id)?, run_id) {
        (Some(run), _) => run.agents,
        (None, Some(id)) => return Err(Error::NotFound(format!("Run {}", id))),
        (None, None) => default_roster(),
    };
    if !agents.iter().any(|a| a.id == agent_id) {
        return Err(Error::NotFound(format!("Agent {}", agent_id)));
    }

    let result = compute_compatibility(agent_id, &agents);
    let refs = |ids: &[String]| -> Vec<AgentRef> {
        ids.iter().map(|id| AgentRef::new(&agents, id)).collect()
    };
    Ok(CompatShow {
        agent: AgentRef::new(&agents, agent_id),
        good: refs(&result.good),
        bad: refs(&result.bad),
        neutral: refs(&result.neutral),
        reasons: result.reasons,
    })
}

#[derive(Debug, Serialize)]
pub struct TeamShow {
    pub run_id: String,
    pub workspace: Vec<AgentRef>,
    pub pair_status: BTreeMap<String, PairStatus>,
    pub agent_status: BTreeMap<String, PairStatus>,
    pub report: TeamReport,
}

impl CommandResult for TeamShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.workspace.is_empty() {
            return format!(
                "Workspace of {} is empty; add agents with `rp run workspace <agent>`",
                self.run_id
            );
        }
        let mut lines = vec![format!("Team of {}:", self.run_id)];
        for agent in &self.workspace {
            let status = self
                .pair_status
                .get(&agent.id)
                .copied()
                .unwrap_or_default();
            lines.push(format!("  {:<8} {}", agent.name, status.as_str()));
        }
        lines.extend(report_lines(&self.report));
        lines.join("\n")
    }
}

/// Evaluate a run's workspace team.
pub fn team(storage: &Storage, run_id: Option<&str>) -> Result<TeamShow> {
    let run = storage.require_run(run_id)?;
    let evaluation = evaluate_team(&run.workspace_agent_ids, &run.agents);
    Ok(TeamShow {
        workspace: run
            .workspace_agent_ids
            .iter()
            .map(|id| AgentRef::new(&run.agents, id))
            .collect(),
        pair_status: evaluation.pair_status,
        agent_status: agent_statuses(&run),
        report: evaluation.report,
        run_id: run.run_id,
    })
}

// === Config and version ===

#[derive(Debug, Serialize)]
pub struct ConfigShow {
    pub data_dir: String,
    pub config_file: String,
    pub config_file_exists: bool,
    pub backend: String,
    pub config: ReplicatorConfig,
}

impl CommandResult for ConfigShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let body = toml::to_string_pretty(&self.config).unwrap_or_default();
        format!(
            "Data dir: {} ({})\nConfig file: {}{}\n\n{}",
            self.data_dir,
            self.backend,
            self.config_file,
            if self.config_file_exists { "" } else { " (not present, defaults)" },
            body.trim_end()
        )
    }
}

/// Show the effective configuration.
pub fn config_show(data_dir: &Path, storage: &Storage, config: &ReplicatorConfig) -> ConfigShow {
    let path = config_path(data_dir);
    ConfigShow {
        data_dir: data_dir.display().to_string(),
        config_file_exists: path.exists(),
        config_file: path.display().to_string(),
        backend: storage.backend_type().to_string(),
        config: config.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub built: &'static str,
}

impl CommandResult for VersionInfo {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("rp {} ({}, built {})", self.version, self.commit, self.built)
    }
}

pub fn version() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("RP_GIT_COMMIT"),
        built: env!("RP_BUILD_TIMESTAMP"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Storage, ReplicatorConfig) {
        (Storage::in_memory(), ReplicatorConfig::default())
    }

    fn deploy_seeded(storage: &mut Storage) -> Deployed {
        deploy(
            storage,
            DeployOptions {
                brief: "Ship the dashboard".to_string(),
                priority: "High".to_string(),
                mode: "Autonomous".to_string(),
                review_required: true,
                seed: Some(7),
                ..DeployOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_board_add_and_assign() {
        let (mut storage, _) = setup();
        let added = board_add_task(&mut storage, "Payments API", "S", "Stripe hooks").unwrap();
        assert!(added.id.starts_with("t-"));
        assert_eq!(added.capacity, 1);

        let assigned = board_assign(&mut storage, "a1", &added.id).unwrap();
        assert!(assigned.changed);
        // Nova conflicts with frontend agents
        assert!(assigned.bad.iter().any(|a| a.name == "Echo"));

        let err = board_assign(&mut storage, "a2", &added.id).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { capacity: 1, .. }));

        let shown = board_show(&storage).unwrap();
        assert_eq!(shown.tasks.len(), 3);
        assert!(!shown.available_agents.iter().any(|a| a.id == "a1"));
    }

    #[test]
    fn test_board_rejects_bad_input() {
        let (mut storage, _) = setup();
        assert!(board_add_task(&mut storage, "  ", "M", "").is_err());
        assert!(board_add_task(&mut storage, "Infra", "XXL", "").is_err());
        assert!(board_assign(&mut storage, "a99", "t1").is_err());
        assert_eq!(board_unassign(&mut storage, "a1").unwrap().task_id, None);
    }

    #[test]
    fn test_board_reset() {
        let (mut storage, _) = setup();
        board_add_task(&mut storage, "Extra", "M", "").unwrap();
        assert_eq!(board_reset(&mut storage).unwrap().tasks, 2);
        assert_eq!(board_show(&storage).unwrap().tasks.len(), 2);
    }

    #[test]
    fn test_plan_create_and_push() {
        let (mut storage, config) = setup();
        let created = plan_create(&mut storage, "Hire a chef", "hire").unwrap();
        assert_eq!(created.reception.plan.tasks.len(), 7);

        let pushed = plan_push(&mut storage, &config, None, "append", None).unwrap();
        assert_eq!(pushed.created.len(), 7);
        assert_eq!(pushed.board_tasks, 9);

        let replaced = plan_push(&mut storage, &config, None, "replace", None).unwrap();
        assert_eq!(replaced.board_tasks, 9);

        let reception = storage
            .receptionist_run(&created.reception.run_id)
            .unwrap()
            .unwrap();
        assert_eq!(reception.audit_log[0].kind, "push");
        assert_eq!(plan_list(&storage).unwrap().runs.len(), 1);
    }

    #[test]
    fn test_plan_push_without_plan_fails() {
        let (mut storage, config) = setup();
        assert!(plan_push(&mut storage, &config, None, "append", None).is_err());
        assert!(plan_push(&mut storage, &config, Some("nope"), "append", None).is_err());
        assert!(plan_create(&mut storage, "x", "conquer").is_err());
    }

    #[test]
    fn test_deploy_stores_latest_run() {
        let (mut storage, _) = setup();
        let deployed = deploy_seeded(&mut storage);
        assert_eq!(deployed.tasks, 2);
        assert_eq!(deployed.agents, 8);
        assert_eq!(deployed.edges, 1);
        assert_eq!(
            storage.latest_run_id().unwrap().as_deref(),
            Some(deployed.run_id.as_str())
        );
        assert!(storage.latest_brief().unwrap().is_some());
        assert!(run_show(&storage, None).unwrap().to_human().contains("Ship the dashboard"));
    }

    #[test]
    fn test_run_commands_without_run() {
        let (mut storage, config) = setup();
        assert!(matches!(run_show(&storage, None), Err(Error::NoRun)));
        assert!(run_link_task(&mut storage, &config, None, "a1", "t1").is_err());
        assert!(team(&storage, None).is_err());
    }

    #[test]
    fn test_run_link_task_persists() {
        let (mut storage, config) = setup();
        deploy_seeded(&mut storage);

        let toggled = run_link_task(&mut storage, &config, None, "a1", "t1").unwrap();
        assert!(toggled.linked);
        let run = storage.require_run(None).unwrap();
        assert_eq!(run.assignments.get("a1").map(String::as_str), Some("t1"));

        let toggled = run_link_task(&mut storage, &config, None, "a1", "t1").unwrap();
        assert!(!toggled.linked);
        let run = storage.require_run(None).unwrap();
        assert!(!run.assignments.contains_key("a1"));
    }

    #[test]
    fn test_run_link_agent_reports_status() {
        let (mut storage, config) = setup();
        deploy_seeded(&mut storage);
        let toggled = run_link_agent(&mut storage, &config, None, "a5", "a1").unwrap();
        assert!(toggled.linked);
        assert_eq!(toggled.status, Some(PairStatus::Bad));
        let run = storage.require_run(None).unwrap();
        assert!(run.links.has_agent_link("a1", "a5"));
    }

    #[test]
    fn test_run_workspace_and_team() {
        let (mut storage, config) = setup();
        deploy_seeded(&mut storage);
        let toggled = run_workspace(&mut storage, &config, None, "a5").unwrap();
        assert!(toggled.in_workspace);
        run_workspace(&mut storage, &config, None, "a2").unwrap();

        let shown = team(&storage, None).unwrap();
        assert_eq!(shown.workspace.len(), 2);
        assert_eq!(shown.pair_status.len(), 2);
        assert_eq!(shown.agent_status.len(), 8);
    }

    #[test]
    fn test_run_arrange_stores_positions() {
        let (mut storage, config) = setup();
        deploy_seeded(&mut storage);
        let graph = run_arrange(&mut storage, &config, None, true).unwrap();
        assert_eq!(graph.nodes.len(), 10);
        assert!(graph.frames > 0);
        assert!(graph.edges.iter().any(|e| e.key == "edge-t1-t2"));
        assert!(graph.transform.is_some());

        let run = storage.require_run(None).unwrap();
        let stored = run.task("t1").and_then(|t| t.pos).unwrap();
        let placed = graph.nodes.iter().find(|n| n.id == "t1").unwrap();
        assert_eq!((stored.x, stored.y), (placed.x, placed.y));
    }

    #[test]
    fn test_run_reset_clears_links() {
        let (mut storage, config) = setup();
        deploy_seeded(&mut storage);
        run_link_task(&mut storage, &config, None, "a1", "t1").unwrap();
        run_reset(&mut storage, &config, None, true).unwrap();
        let run = storage.require_run(None).unwrap();
        assert!(run.links.is_empty());
        assert!(run.assignments.is_empty());
    }

    #[test]
    fn test_compat_uses_roster_without_run() {
        let (storage, _) = setup();
        let shown = compat(&storage, "a5", None).unwrap();
        assert_eq!(shown.agent.name, "Echo");
        assert!(shown.bad.iter().any(|a| a.id == "a1"));
        assert!(compat(&storage, "a42", None).is_err());
        assert!(compat(&storage, "a1", Some("run_missing")).is_err());
    }

    #[test]
    fn test_version_info() {
        let info = version();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.to_json().contains("\"version\""));
        assert!(!info.commit.is_empty());
        assert!(info.built.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(info.built).is_ok());
    }
}
