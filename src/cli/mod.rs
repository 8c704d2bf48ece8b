//! CLI argument definitions for Replicator.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Replicator - orchestration board for mock AI agent teams.
///
/// Plan tasks on the board, deploy a run, then link agents to tasks and to
/// each other while the board scores how well the team fits together.
#[derive(Parser, Debug)]
#[command(name = "rp")]
#[command(author, version, about = "Orchestration board for mock AI agent teams", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding runs, the board and config.toml.
    /// Can also be set via RP_DATA_DIR environment variable.
    #[arg(long = "data-dir", global = true, env = "RP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Planning board commands (before deployment)
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },

    /// Receptionist plan commands
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },

    /// Transmit a brief and deploy the board as a new run
    Deploy {
        /// Brief text for the run
        #[arg(short, long, default_value = "")]
        brief: String,

        /// Brief priority (e.g., High, Medium, Low)
        #[arg(long, default_value = "High")]
        priority: String,

        /// Execution mode (e.g., Autonomous, Supervised)
        #[arg(long, default_value = "Autonomous")]
        mode: String,

        /// Skip human review of agent output
        #[arg(long)]
        no_review: bool,

        /// Risk appetite (1-5); stored as the new default
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        risk: Option<u8>,

        /// Execution tempo (1-5); stored as the new default
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        tempo: Option<u8>,

        /// Seed for agent skill draws (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Deployed run commands
    Run {
        /// Run ID (defaults to the latest deployed run)
        #[arg(long = "run", global = true)]
        run_id: Option<String>,

        #[command(subcommand)]
        command: RunCommands,
    },

    /// Show which agents work well or badly with an agent
    Compat {
        /// Agent ID (e.g., a1)
        agent_id: String,

        /// Run ID (defaults to the latest run, then the default roster)
        #[arg(long = "run")]
        run_id: Option<String>,
    },

    /// Evaluate the workspace team of a run
    Team {
        /// Run ID (defaults to the latest deployed run)
        #[arg(long = "run")]
        run_id: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and build information
    Version,
}

/// Board subcommands
#[derive(Subcommand, Debug)]
pub enum BoardCommands {
    /// Show board tasks, assignments and available agents
    Show,

    /// Add a task to the board
    AddTask {
        /// Task title
        title: String,

        /// Size class (S, M, L, XL); caps how many agents the task takes
        #[arg(short, long, default_value = "M")]
        size: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        desc: String,
    },

    /// Assign an agent to a task
    Assign {
        /// Agent ID (e.g., a1)
        agent_id: String,

        /// Task ID (e.g., t1)
        task_id: String,
    },

    /// Release an agent back to the pool
    Unassign {
        /// Agent ID
        agent_id: String,
    },

    /// Restore the default board
    Reset,
}

/// Receptionist plan subcommands
#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// Generate a plan for an objective and record it
    Create {
        /// The operator's request, as typed
        intent: String,

        /// Objective (buy, sell, rent, hire, research, build)
        #[arg(short, long, default_value = "research")]
        objective: String,
    },

    /// List recorded receptionist runs, newest first
    List,

    /// Push a plan's tasks onto the board
    Push {
        /// Receptionist run ID (defaults to the newest)
        reception_id: Option<String>,

        /// append or replace previously pushed tasks
        #[arg(short, long, default_value = "append")]
        mode: String,

        /// Title prefix for pushed tasks (defaults to the configured prefix)
        #[arg(long)]
        prefix: Option<String>,
    },
}

/// Run subcommands
#[derive(Subcommand, Debug)]
pub enum RunCommands {
    /// Show run state and metrics
    Show,

    /// Toggle the link between an agent and a task
    LinkTask {
        /// Agent ID
        agent_id: String,

        /// Task ID
        task_id: String,
    },

    /// Toggle the link between two agents
    LinkAgent {
        /// First agent ID
        a: String,

        /// Second agent ID
        b: String,
    },

    /// Remove every link of an agent, and its assignment
    ClearLinks {
        /// Agent ID
        agent_id: String,
    },

    /// Add or remove an agent from the workspace
    Workspace {
        /// Agent ID
        agent_id: String,
    },

    /// Auto-arrange the graph and store the settled positions
    Arrange {
        /// Also fit the camera to the arranged graph
        #[arg(long)]
        fit: bool,
    },

    /// Render the graph headlessly and print node positions and edges
    Layout,

    /// Clear workspace and links, and allow the layout to be reseeded
    Reset {
        /// Also clear assignments
        #[arg(long)]
        clear_assignments: bool,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
}
