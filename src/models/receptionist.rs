//! Receptionist plans: turn a stated objective into board tasks.
//!
//! A reception run records the operator's raw intent, the objective it was
//! classified as, and a generated plan. Plans are pushed onto the planning
//! board either appended to the existing tasks or replacing tasks created by
//! earlier pushes.

use super::agents::agent_for_role;
use super::{Board, SizeClass, Task, TaskStatus};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of tasks in a generated plan.
pub const MAX_PLAN_TASKS: usize = 8;

/// Title prefix for pushed tasks when none is given.
pub const DEFAULT_TAG_PREFIX: &str = "[Receptionist]";

pub const RISK_NOTES: &[&str] = &[
    "No automated outreach. Drafts require approval.",
    "Contacts only from provided sources.",
];

/// What the operator is trying to achieve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    Buy,
    Sell,
    Rent,
    Hire,
    #[default]
    Research,
    Build,
}

impl Objective {
    pub fn as_str(self) -> &'static str {
        match self {
            Objective::Buy => "buy",
            Objective::Sell => "sell",
            Objective::Rent => "rent",
            Objective::Hire => "hire",
            Objective::Research => "research",
            Objective::Build => "build",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Objective::Buy),
            "sell" => Ok(Objective::Sell),
            "rent" => Ok(Objective::Rent),
            "hire" => Ok(Objective::Hire),
            "research" => Ok(Objective::Research),
            "build" => Ok(Objective::Build),
            other => Err(Error::InvalidInput(format!(
                "Unknown objective '{}' (expected buy, sell, rent, hire, research or build)",
                other
            ))),
        }
    }
}

/// One step of a generated plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanTask {
    pub id: String,
    pub title: String,
    pub rationale: String,
    pub deliverable: String,
    pub suggested_agent_roles: Vec<String>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl PlanTask {
    /// Names of roster agents matching the suggested roles.
    pub fn suggested_agents(&self) -> Vec<&'static str> {
        self.suggested_agent_roles
            .iter()
            .filter_map(|role| agent_for_role(role))
            .map(|meta| meta.name)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub tasks: Vec<PlanTask>,
    pub risk_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// A persisted receptionist session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionRun {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub intent_raw: String,
    pub objective: Objective,
    pub plan: Plan,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,
}

impl ReceptionRun {
    /// Create a reception run with a freshly generated plan.
    pub fn new(intent_raw: impl Into<String>, objective: Objective, now: DateTime<Utc>) -> Self {
        let mut run = Self {
            run_id: format!("reception_{}", now.timestamp_millis()),
            created_at: now,
            intent_raw: intent_raw.into(),
            objective,
            plan: generate_plan(objective, now),
            audit_log: Vec::new(),
        };
        run.log_audit(
            "plan",
            "Generated plan",
            serde_json::json!({ "objective": objective.as_str() }),
            now,
        );
        run
    }

    /// Record an audit entry, newest first.
    pub fn log_audit(
        &mut self,
        kind: &str,
        message: &str,
        meta: serde_json::Value,
        at: DateTime<Utc>,
    ) {
        self.audit_log.insert(
            0,
            AuditEntry {
                at,
                kind: kind.to_string(),
                message: message.to_string(),
                meta,
            },
        );
    }
}

struct PlanStep {
    title: &'static str,
    rationale: &'static str,
    deliverable: &'static str,
    roles: &'static [&'static str],
}

const BASE_STEPS: &[PlanStep] = &[
    PlanStep {
        title: "Define search criteria",
        rationale: "Confirm scope, requirements, and constraints.",
        deliverable: "Criteria checklist",
        roles: &["Planning", "Research"],
    },
    PlanStep {
        title: "Identify listing sources",
        rationale: "Map public listing sources and local channels.",
        deliverable: "Source list",
        roles: &["Research", "Data"],
    },
    PlanStep {
        title: "Shortlist viable options",
        rationale: "Evaluate options against criteria and budget.",
        deliverable: "Shortlist",
        roles: &["Data", "QA"],
    },
    PlanStep {
        title: "Request legal process + fees",
        rationale: "Understand acquisition process and required filings.",
        deliverable: "Legal checklist",
        roles: &["Security", "Planning"],
    },
    PlanStep {
        title: "Arrange viewings / calls",
        rationale: "Set up conversations with contacts and visits.",
        deliverable: "Call schedule",
        roles: &["Ops", "Planning"],
    },
    PlanStep {
        title: "Draft offer / LOI checklist",
        rationale: "Prepare negotiation-ready materials.",
        deliverable: "Offer checklist",
        roles: &["QA", "Planning"],
    },
];

const SELL_STEPS: &[PlanStep] = &[PlanStep {
    title: "Prepare asset listing pack",
    rationale: "Compile marketing materials for sellers.",
    deliverable: "Listing package",
    roles: &["UX", "Research"],
}];

const HIRE_STEPS: &[PlanStep] = &[PlanStep {
    title: "Define hiring scorecard",
    rationale: "Align stakeholders on hiring criteria.",
    deliverable: "Scorecard",
    roles: &["Planning", "QA"],
}];

/// Generate the plan for an objective.
pub fn generate_plan(objective: Objective, now: DateTime<Utc>) -> Plan {
    let extra: &[PlanStep] = match objective {
        Objective::Sell => SELL_STEPS,
        Objective::Hire => HIRE_STEPS,
        _ => &[],
    };
    let millis = now.timestamp_millis();

    let tasks = BASE_STEPS
        .iter()
        .chain(extra.iter())
        .take(MAX_PLAN_TASKS)
        .enumerate()
        .map(|(index, step)| PlanTask {
            id: format!("plan_{}_{}", millis, index),
            title: step.title.to_string(),
            rationale: step.rationale.to_string(),
            deliverable: step.deliverable.to_string(),
            suggested_agent_roles: step.roles.iter().map(|r| r.to_string()).collect(),
            status: TaskStatus::Queued,
        })
        .collect();

    Plan {
        tasks,
        risk_notes: RISK_NOTES.iter().map(|s| s.to_string()).collect(),
    }
}

fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Size a plan task from keywords in its rationale and deliverable.
pub fn plan_task_size(task: &PlanTask) -> SizeClass {
    let rationale = task.rationale.to_lowercase();
    let deliverable = task.deliverable.to_lowercase();
    let mut size = if task.status == TaskStatus::Queued {
        SizeClass::M
    } else {
        SizeClass::S
    };
    if mentions(&rationale, &["legal", "compliance", "security"]) {
        size = SizeClass::L;
    }
    if mentions(&deliverable, &["shortlist", "pipeline", "automation"]) {
        size = SizeClass::L;
    }
    if rationale.contains("automation") || deliverable.contains("automation") {
        size = SizeClass::XL;
    }
    size
}

/// Convert a plan task into a board task (ID and title prefix assigned later).
pub fn plan_task_to_task(task: &PlanTask) -> Task {
    let desc = if task.rationale.is_empty() {
        task.deliverable.clone()
    } else {
        format!("{} — {}", task.deliverable, task.rationale)
    };
    let mut converted = Task::new(String::new(), task.title.clone(), plan_task_size(task));
    converted.desc = desc;
    converted.from_receptionist = true;
    converted
}

/// How pushed tasks combine with the board's existing tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PushMode {
    #[default]
    Append,
    /// Drop tasks created by earlier pushes, with their assignments, first.
    Replace,
}

impl FromStr for PushMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(PushMode::Append),
            "replace" => Ok(PushMode::Replace),
            other => Err(Error::InvalidInput(format!(
                "Unknown push mode '{}' (expected append or replace)",
                other
            ))),
        }
    }
}

/// Push a reception run's plan onto the board. Returns the created task IDs.
///
/// Task IDs are `rt_<runId>_<index>`, suffixed with `_<n>` until unique on
/// the board. Titles are prefixed with `tag_prefix`.
pub fn push_plan(
    board: &mut Board,
    reception: &ReceptionRun,
    mode: PushMode,
    tag_prefix: &str,
) -> Vec<String> {
    if mode == PushMode::Replace {
        let is_pushed =
            |task: &Task| task.from_receptionist || task.title.starts_with(tag_prefix);
        let removed: Vec<String> = board
            .tasks
            .iter()
            .filter(|t| is_pushed(t))
            .map(|t| t.id.clone())
            .collect();

        board.assignments.retain(|_, task_id| !removed.contains(task_id));
        board
            .suggested_links
            .agent_to_task
            .retain(|l| !removed.contains(&l.task_id));
        board.compatibility.retain(|task_id, _| !removed.contains(task_id));
        board.tasks.retain(|t| !is_pushed(t));
    }

    let mut created = Vec::new();
    for (index, plan_task) in reception.plan.tasks.iter().enumerate() {
        let base = format!("rt_{}_{}", reception.run_id, index);
        let mut id = base.clone();
        let mut suffix = 0;
        while board.tasks.iter().any(|t| t.id == id) {
            suffix += 1;
            id = format!("{}_{}", base, suffix);
        }

        let mut task = plan_task_to_task(plan_task);
        task.title = format!("{} {}", tag_prefix, task.title);
        task.id = id.clone();
        board.tasks.push(task);
        created.push(id);
    }
    created
}
