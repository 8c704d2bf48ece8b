//! Tag-based synergy scoring for agents.
//!
//! Three entry points share one set of fixed heuristics:
//! - [`compute_compatibility`] partitions the roster relative to one agent
//! - [`evaluate_team`] scores every agent of a workspace against the team
//! - [`evaluate_agent_pair`] scores one agent against a linked partner
//!
//! # Example
//!
//! ```
//! use replicator::models::agents::default_roster;
//! use replicator::models::compat::compute_compatibility;
//!
//! let roster = default_roster();
//! let compat = compute_compatibility("a5", &roster);
//! // Echo is frontend; Nova refuses frontend work
//! assert!(compat.bad.contains(&"a1".to_string()));
//! ```

use super::{Agent, Run};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Weights and thresholds for synergy scoring.
pub mod thresholds {
    /// Frontend agent on a team that covers backend.
    pub const FRONTEND_BACKEND_BONUS: i32 = 3;

    /// Backend agent on a team that covers devops.
    pub const BACKEND_DEVOPS_BONUS: i32 = 2;

    /// UI agent with a JS/TS badge.
    pub const UI_BADGE_BONUS: i32 = 2;

    /// Any of the agent's conflict tags is covered by the team.
    pub const CONFLICT_PENALTY: i32 = -4;

    /// Per own tag that more than [`REDUNDANT_TAG_LIMIT`] agents carry.
    pub const REDUNDANCY_PENALTY: i32 = -3;

    pub const REDUNDANT_TAG_LIMIT: usize = 2;

    /// Scores at or above this are good.
    pub const GOOD_SCORE: i32 = 3;

    /// Scores at or below this are bad.
    pub const BAD_SCORE: i32 = 0;

    /// Maximum recommended stacks in a team report.
    pub const MAX_STACKS: usize = 4;
}

/// Layers every team is expected to cover.
pub const REQUIRED_LAYERS: &[&str] = &["frontend", "backend", "db", "devops"];

/// (source tag, candidate tag) pairs that complement each other.
pub const COMPLEMENTARY_PAIRS: &[(&str, &str)] = &[
    ("frontend", "backend"),
    ("backend", "devops"),
    ("data", "backend"),
    ("security", "backend"),
];

/// Badges that pair well with UI work.
const UI_BADGES: &[&str] = &["REACT", "NODE"];

const CONFLICT_REASON: &str = "Conflict in role coverage";

/// Synergy bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairStatus {
    Good,
    Bad,
    #[default]
    Neutral,
}

impl PairStatus {
    /// Bucket a numeric score.
    pub fn from_score(score: i32) -> Self {
        if score >= thresholds::GOOD_SCORE {
            PairStatus::Good
        } else if score <= thresholds::BAD_SCORE {
            PairStatus::Bad
        } else {
            PairStatus::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PairStatus::Good => "good",
            PairStatus::Bad => "bad",
            PairStatus::Neutral => "neutral",
        }
    }
}

/// Partition of the roster relative to one source agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    pub good: Vec<String>,
    pub bad: Vec<String>,
    pub neutral: Vec<String>,
    /// Why an agent landed in its bucket, keyed by agent ID.
    pub reasons: BTreeMap<String, Vec<String>>,
}

fn has_any(tags: &[String], wanted: &[String]) -> bool {
    tags.iter().any(|t| wanted.contains(t))
}

fn conflicts(source: &Agent, target: &Agent) -> bool {
    has_any(&target.tags, &source.conflicts_with_tags)
        || has_any(&source.tags, &target.conflicts_with_tags)
}

fn complements(source: &Agent, target: &Agent) -> bool {
    COMPLEMENTARY_PAIRS
        .iter()
        .any(|(from, to)| source.has_tag(from) && target.has_tag(to))
}

/// Partition every agent other than `source_id` into good, bad and neutral.
///
/// The conflict check runs in both directions, so a pair is bad regardless of
/// which agent carries the conflict tag. Returns an empty partition when the
/// source agent is unknown.
pub fn compute_compatibility(source_id: &str, agents: &[Agent]) -> Compatibility {
    let mut result = Compatibility::default();
    let Some(source) = agents.iter().find(|a| a.id == source_id) else {
        return result;
    };

    for target in agents.iter().filter(|a| a.id != source_id) {
        if conflicts(source, target) {
            result.bad.push(target.id.clone());
            result
                .reasons
                .entry(target.id.clone())
                .or_default()
                .push(CONFLICT_REASON.to_string());
            continue;
        }

        let shared = source.tags.iter().any(|t| target.has_tag(t));
        if complements(source, target) || shared {
            result.good.push(target.id.clone());
        } else {
            result.neutral.push(target.id.clone());
        }
    }
    result
}

/// Score and reasons for one agent against a tag coverage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentScore {
    pub score: i32,
    pub reasons: Vec<String>,
}

impl AgentScore {
    fn add(&mut self, points: i32, reason: impl Into<String>) {
        self.score += points;
        self.reasons.push(reason.into());
    }

    pub fn status(&self) -> PairStatus {
        PairStatus::from_score(self.score)
    }
}

/// Score the bonuses shared by team and pair evaluation.
fn score_bonuses(agent: &Agent, coverage: &[String], score: &mut AgentScore) {
    let covers = |tag: &str| coverage.iter().any(|t| t == tag);

    if agent.has_tag("frontend") && covers("backend") {
        score.add(
            thresholds::FRONTEND_BACKEND_BONUS,
            "Frontend + backend pairing unlocked.",
        );
    }
    if agent.has_tag("backend") && covers("devops") {
        score.add(
            thresholds::BACKEND_DEVOPS_BONUS,
            "Backend + DevOps alignment.",
        );
    }
    if agent.has_tag("ui") && UI_BADGES.contains(&agent.code_badge.as_str()) {
        score.add(thresholds::UI_BADGE_BONUS, "UI + JS/TS synergy.");
    }
}

/// Report describing what a team can build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReport {
    pub header: String,
    pub can_build: Vec<String>,
    pub recommended_stacks: Vec<String>,
    pub warnings: Vec<String>,
    pub coverage: Vec<String>,
    /// Top stack, offered only when the whole roster is in the workspace
    pub best_overall_stack: Option<String>,
}

/// Per-agent status and score for a workspace, plus the team report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEvaluation {
    pub pair_status: BTreeMap<String, PairStatus>,
    pub scores: BTreeMap<String, AgentScore>,
    pub report: TeamReport,
}

const FALLBACK_IDEAS: &[&str] = &[
    "Targeted proofs of concept",
    "Focused MVPs",
    "Fast research sprints",
];

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Evaluate the agents in `workspace_ids` as one team.
///
/// Workspace IDs that do not resolve to an agent are ignored.
pub fn evaluate_team(workspace_ids: &[String], agents: &[Agent]) -> TeamEvaluation {
    let team: Vec<&Agent> = workspace_ids
        .iter()
        .filter_map(|id| agents.iter().find(|a| &a.id == id))
        .collect();

    let mut coverage: Vec<String> = Vec::new();
    let mut stacks: Vec<String> = Vec::new();
    let mut tag_counts: HashMap<&str, usize> = HashMap::new();
    for agent in &team {
        for tag in &agent.tags {
            push_unique(&mut coverage, tag);
            *tag_counts.entry(tag.as_str()).or_default() += 1;
        }
        for stack in &agent.recommended_stacks {
            push_unique(&mut stacks, stack);
        }
    }
    let covers = |tag: &str| coverage.iter().any(|t| t == tag);

    let warnings = REQUIRED_LAYERS
        .iter()
        .filter(|&&layer| !covers(layer))
        .map(|layer| format!("No {} layer agent present.", layer))
        .collect();

    let mut evaluation = TeamEvaluation::default();
    for agent in &team {
        let mut score = AgentScore::default();
        score_bonuses(agent, &coverage, &mut score);

        let hits: Vec<&str> = agent
            .conflicts_with_tags
            .iter()
            .filter(|t| covers(t.as_str()))
            .map(String::as_str)
            .collect();
        if !hits.is_empty() {
            score.add(
                thresholds::CONFLICT_PENALTY,
                format!("Conflict with {} coverage.", hits.join(", ")),
            );
        }

        for tag in &agent.tags {
            let count = tag_counts.get(tag.as_str()).copied().unwrap_or(0);
            if count > thresholds::REDUNDANT_TAG_LIMIT {
                score.add(
                    thresholds::REDUNDANCY_PENALTY,
                    format!("Redundant {} coverage.", tag),
                );
            }
        }

        evaluation
            .pair_status
            .insert(agent.id.clone(), score.status());
        evaluation.scores.insert(agent.id.clone(), score);
    }

    let mut can_build = Vec::new();
    if covers("frontend") && covers("backend") {
        can_build.push("Customer-facing dashboards and portals".to_string());
    }
    if covers("backend") && covers("data") {
        can_build.push("Data pipelines with analytics layers".to_string());
    }
    if covers("security") {
        can_build.push("Compliance-ready secure services".to_string());
    }
    if covers("devops") {
        can_build.push("Automated deployment and monitoring stacks".to_string());
    }
    if can_build.is_empty() {
        can_build = FALLBACK_IDEAS.iter().map(|s| s.to_string()).collect();
    }

    let header = match team.len() {
        0 => "Add agents to the workspace to see synergy insights.",
        1 => "This agent is best for:",
        _ => "With these agents you can build:",
    };

    let recommended_stacks: Vec<String> =
        stacks.into_iter().take(thresholds::MAX_STACKS).collect();
    let best_overall_stack = if workspace_ids.len() == agents.len() {
        recommended_stacks.first().cloned()
    } else {
        None
    };

    evaluation.report = TeamReport {
        header: header.to_string(),
        can_build,
        recommended_stacks,
        warnings,
        coverage,
        best_overall_stack,
    };
    evaluation
}

/// Score agent `a` against the union of its and `b`'s tags.
///
/// Conflicts from both agents against the union are deduplicated and cost a
/// single penalty.
pub fn evaluate_agent_pair(a: &Agent, b: &Agent) -> AgentScore {
    let mut union: Vec<String> = Vec::new();
    for tag in a.tags.iter().chain(b.tags.iter()) {
        push_unique(&mut union, tag);
    }

    let mut score = AgentScore::default();
    score_bonuses(a, &union, &mut score);

    let mut hits: Vec<String> = Vec::new();
    for tag in a.conflicts_with_tags.iter().chain(b.conflicts_with_tags.iter()) {
        if union.contains(tag) {
            push_unique(&mut hits, tag);
        }
    }
    if !hits.is_empty() {
        score.add(
            thresholds::CONFLICT_PENALTY,
            format!("Conflict with {} coverage.", hits.join(", ")),
        );
    }
    score
}

/// Final status for every agent in the run.
///
/// Agents start from their workspace evaluation (neutral outside it). Each
/// agent-to-agent link scores the pair from its `a` side and stamps that
/// status on both ends, later links overriding earlier ones. When every
/// agent is in the workspace, anything short of good is reported bad.
pub fn agent_statuses(run: &Run) -> BTreeMap<String, PairStatus> {
    let team = evaluate_team(&run.workspace_agent_ids, &run.agents);
    let all_in = run.workspace_agent_ids.len() == run.agents.len();

    let mut link_status: HashMap<&str, PairStatus> = HashMap::new();
    for link in &run.links.agent_to_agent {
        let status = match (run.agent(&link.a), run.agent(&link.b)) {
            (Some(a), Some(b)) => evaluate_agent_pair(a, b).status(),
            _ => PairStatus::Neutral,
        };
        link_status.insert(link.a.as_str(), status);
        link_status.insert(link.b.as_str(), status);
    }

    run.agents
        .iter()
        .map(|agent| {
            let base = team
                .pair_status
                .get(&agent.id)
                .copied()
                .unwrap_or_default();
            let mut status = link_status.get(agent.id.as_str()).copied().unwrap_or(base);
            if all_in && status != PairStatus::Good {
                status = PairStatus::Bad;
            }
            (agent.id.clone(), status)
        })
        .collect()
}
