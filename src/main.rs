//! Replicator CLI - orchestration board for mock AI agent teams.

use clap::Parser;
use replicator::cli::{
    BoardCommands, Cli, Commands, ConfigCommands, PlanCommands, RunCommands,
};
use replicator::commands::{self, CommandResult, DeployOptions};
use replicator::config::{self, ReplicatorConfig};
use replicator::storage::{self, Storage};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`, `replicator=trace`).
const LOG_ENV: &str = "RP_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = run(cli.command, cli.data_dir.as_deref(), cli.human_readable);
    if let Err((e, human)) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve data dir and config, then dispatch. Errors carry the output mode
/// that was in effect so they print in the same format.
fn run(
    command: Option<Commands>,
    data_dir: Option<&Path>,
    human_flag: bool,
) -> Result<(), (replicator::Error, bool)> {
    let data_dir = storage::get_data_dir(data_dir).map_err(|e| (e, human_flag))?;
    let config = config::load_config(&data_dir).map_err(|e| (e, human_flag))?;
    let human = config::resolve_human(human_flag, &config);

    let mut storage = Storage::open(&data_dir).map_err(|e| (e, human))?;
    run_command(command, &data_dir, &mut storage, &config, human).map_err(|e| (e, human))
}

fn run_command(
    command: Option<Commands>,
    data_dir: &Path,
    storage: &mut Storage,
    config: &ReplicatorConfig,
    human: bool,
) -> Result<(), replicator::Error> {
    match command {
        Some(Commands::Board { command }) => match command {
            BoardCommands::Show => output(&commands::board_show(storage)?, human),
            BoardCommands::AddTask { title, size, desc } => {
                output(&commands::board_add_task(storage, &title, &size, &desc)?, human)
            }
            BoardCommands::Assign { agent_id, task_id } => {
                output(&commands::board_assign(storage, &agent_id, &task_id)?, human)
            }
            BoardCommands::Unassign { agent_id } => {
                output(&commands::board_unassign(storage, &agent_id)?, human)
            }
            BoardCommands::Reset => output(&commands::board_reset(storage)?, human),
        },

        Some(Commands::Plan { command }) => match command {
            PlanCommands::Create { intent, objective } => {
                output(&commands::plan_create(storage, &intent, &objective)?, human)
            }
            PlanCommands::List => output(&commands::plan_list(storage)?, human),
            PlanCommands::Push {
                reception_id,
                mode,
                prefix,
            } => output(
                &commands::plan_push(
                    storage,
                    config,
                    reception_id.as_deref(),
                    &mode,
                    prefix.as_deref(),
                )?,
                human,
            ),
        },

        Some(Commands::Deploy {
            brief,
            priority,
            mode,
            no_review,
            risk,
            tempo,
            seed,
        }) => {
            let options = DeployOptions {
                brief,
                priority,
                mode,
                review_required: !no_review,
                risk,
                tempo,
                seed,
            };
            output(&commands::deploy(storage, options)?, human)
        }

        Some(Commands::Run { run_id, command }) => {
            let run_id = run_id.as_deref();
            match command {
                RunCommands::Show => output(&commands::run_show(storage, run_id)?, human),
                RunCommands::LinkTask { agent_id, task_id } => output(
                    &commands::run_link_task(storage, config, run_id, &agent_id, &task_id)?,
                    human,
                ),
                RunCommands::LinkAgent { a, b } => output(
                    &commands::run_link_agent(storage, config, run_id, &a, &b)?,
                    human,
                ),
                RunCommands::ClearLinks { agent_id } => output(
                    &commands::run_clear_links(storage, config, run_id, &agent_id)?,
                    human,
                ),
                RunCommands::Workspace { agent_id } => output(
                    &commands::run_workspace(storage, config, run_id, &agent_id)?,
                    human,
                ),
                RunCommands::Arrange { fit } => output(
                    &commands::run_arrange(storage, config, run_id, fit)?,
                    human,
                ),
                RunCommands::Layout => {
                    output(&commands::run_layout(storage, config, run_id)?, human)
                }
                RunCommands::Reset { clear_assignments } => output(
                    &commands::run_reset(storage, config, run_id, clear_assignments)?,
                    human,
                ),
            }
        }

        Some(Commands::Compat { agent_id, run_id }) => output(
            &commands::compat(storage, &agent_id, run_id.as_deref())?,
            human,
        ),

        Some(Commands::Team { run_id }) => {
            output(&commands::team(storage, run_id.as_deref())?, human)
        }

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                output(&commands::config_show(data_dir, storage, config), human)
            }
        },

        Some(Commands::Version) => output(&commands::version(), human),

        None => {
            // No subcommand: show the board, the natural starting point
            output(&commands::board_show(storage)?, human);
        }
    }
    Ok(())
}

fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
