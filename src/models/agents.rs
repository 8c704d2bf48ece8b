//! Built-in agent roster and default board tasks.
//!
//! The roster is the fixed set of mock agents a run is deployed with. Each
//! entry carries capability tags used by the synergy scorer, conflict tags,
//! and the stacks and strengths shown on the agent card.
//!
//! The 8 roster agents:
//! - `a1` Nova - Research
//! - `a2` Atlas - Planning
//! - `a3` Lumen - Data
//! - `a4` Kestrel - QA
//! - `a5` Echo - UX
//! - `a6` Sol - Deployment
//! - `a7` Cipher - Security
//! - `a8` Vera - Ops

use super::{Agent, AgentStatus, SizeClass, Task};

/// Static description of a roster agent.
pub struct AgentMeta {
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Role label, also used by the receptionist role map
    pub role: &'static str,
    pub code_badge: &'static str,
    pub tags: &'static [&'static str],
    pub conflicts_with_tags: &'static [&'static str],
    pub recommended_stacks: &'static [&'static str],
    pub strengths: &'static [&'static str],
}

pub const NOVA: AgentMeta = AgentMeta {
    id: "a1",
    name: "Nova",
    role: "Research",
    code_badge: "PY",
    tags: &["backend", "data", "research"],
    conflicts_with_tags: &["frontend"],
    recommended_stacks: &["Python + FastAPI", "Postgres + Redis"],
    strengths: &["Rapid prototyping", "Data synthesis", "Summarization"],
};

pub const ATLAS: AgentMeta = AgentMeta {
    id: "a2",
    name: "Atlas",
    role: "Planning",
    code_badge: "NODE",
    tags: &["backend", "orchestration", "api"],
    conflicts_with_tags: &["security"],
    recommended_stacks: &["Node + Express", "Postgres + Redis"],
    strengths: &["Workflow automation", "API design", "System planning"],
};

pub const LUMEN: AgentMeta = AgentMeta {
    id: "a3",
    name: "Lumen",
    role: "Data",
    code_badge: "PY",
    tags: &["data", "db", "backend"],
    conflicts_with_tags: &[],
    recommended_stacks: &["Python + Airflow", "BigQuery + dbt"],
    strengths: &["ETL pipelines", "Metrics instrumentation", "Data modeling"],
};

pub const KESTREL: AgentMeta = AgentMeta {
    id: "a4",
    name: "Kestrel",
    role: "QA",
    code_badge: "SEC",
    tags: &["security", "qa", "testing"],
    conflicts_with_tags: &["frontend"],
    recommended_stacks: &["OWASP tooling", "Snyk + CI"],
    strengths: &["Threat modeling", "Compliance checks", "Test automation"],
};

pub const ECHO: AgentMeta = AgentMeta {
    id: "a5",
    name: "Echo",
    role: "UX",
    code_badge: "REACT",
    tags: &["frontend", "ui", "ux"],
    conflicts_with_tags: &[],
    recommended_stacks: &["React + Vite", "Tailwind + Storybook"],
    strengths: &["Interface systems", "UX research", "Design systems"],
};

pub const SOL: AgentMeta = AgentMeta {
    id: "a6",
    name: "Sol",
    role: "Deployment",
    code_badge: "DEVOPS",
    tags: &["devops", "infra", "backend"],
    conflicts_with_tags: &[],
    recommended_stacks: &["Terraform + AWS", "Docker + Kubernetes"],
    strengths: &[
        "CI/CD pipelines",
        "Infrastructure automation",
        "Observability",
    ],
};

pub const CIPHER: AgentMeta = AgentMeta {
    id: "a7",
    name: "Cipher",
    role: "Security",
    code_badge: "RUST",
    tags: &["backend", "systems", "security"],
    conflicts_with_tags: &["frontend"],
    recommended_stacks: &["Rust + Axum", "Postgres + NATS"],
    strengths: &["Low-latency services", "Secure systems", "Performance tuning"],
};

pub const VERA: AgentMeta = AgentMeta {
    id: "a8",
    name: "Vera",
    role: "Ops",
    code_badge: "DEVOPS",
    tags: &["ops", "monitoring", "backend"],
    conflicts_with_tags: &[],
    recommended_stacks: &["Grafana + Prometheus", "Kubernetes + Helm"],
    strengths: &[
        "Incident response",
        "Monitoring",
        "Reliability engineering",
    ],
};

/// Roster in display order.
pub const ROSTER: &[AgentMeta] = &[NOVA, ATLAS, LUMEN, KESTREL, ECHO, SOL, CIPHER, VERA];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl AgentMeta {
    /// Materialize a roster entry as an undeployed agent (skill 0, no position).
    pub fn to_agent(&self) -> Agent {
        Agent {
            id: self.id.to_string(),
            name: self.name.to_string(),
            role: self.role.to_string(),
            code_badge: self.code_badge.to_string(),
            tags: strings(self.tags),
            conflicts_with_tags: strings(self.conflicts_with_tags),
            strengths: strings(self.strengths),
            recommended_stacks: strings(self.recommended_stacks),
            skill: 0.0,
            status: AgentStatus::Ready,
            pos: None,
            is_docked: true,
        }
    }
}

/// The full roster as agents.
pub fn default_roster() -> Vec<Agent> {
    ROSTER.iter().map(AgentMeta::to_agent).collect()
}

/// Roster agent whose role matches `role`.
pub fn agent_for_role(role: &str) -> Option<&'static AgentMeta> {
    ROSTER.iter().find(|meta| meta.role.eq_ignore_ascii_case(role))
}

/// Tasks a fresh board starts with.
pub fn default_board_tasks() -> Vec<Task> {
    vec![
        Task::new("t1", "Synthesize requirement brief", SizeClass::M),
        Task::new("t2", "Prototype dashboard interface", SizeClass::L),
    ]
}
