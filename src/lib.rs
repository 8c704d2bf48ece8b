//! Replicator - an orchestration board engine for mock AI agent teams.
//!
//! This library provides the core functionality behind the `rp` CLI and the
//! graph view: the run state store, agent/task assignment with capacity
//! rules, tag-based synergy scoring, and the headless layout engine and
//! frame scheduler that drive the board's graph visualization.

pub mod cli;
pub mod commands;
pub mod config;
pub mod gui;
pub mod models;
pub mod storage;

/// Library-level error type for Replicator operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Task {task_id} is at capacity ({capacity} agents)")]
    CapacityExceeded { task_id: String, capacity: usize },

    #[error("No run found: deploy a run first")]
    NoRun,

    #[error("Graph view error: {0}")]
    View(#[from] gui::ViewError),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Replicator operations.
pub type Result<T> = std::result::Result<T, Error>;
