use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pc_cli::commands::{history, punch, status, util, watch};
use pc_cli::{BreakAction, Cli, Commands, Config};
use pc_core::{ClockAction, SystemClock};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(pc_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = pc_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

/// Runs a punch and turns a guard rejection into a non-zero exit.
fn run_punch(config_path: Option<&Path>, action: ClockAction) -> Result<()> {
    let (mut db, config) = open_database(config_path)?;
    let outcome = punch::run(
        &mut std::io::stdout().lock(),
        &mut db,
        SystemClock,
        config.tracker_settings(),
        action,
    )?;
    if let punch::Outcome::Rejected(err) = outcome {
        anyhow::bail!("{err}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config_path = cli.config.as_deref();

    match &cli.command {
        Some(Commands::In) => run_punch(config_path, ClockAction::ClockIn)?,
        Some(Commands::Out) => run_punch(config_path, ClockAction::ClockOut)?,
        Some(Commands::Break { action }) => {
            let action = match action {
                BreakAction::Start => ClockAction::BreakStart,
                BreakAction::End => ClockAction::BreakEnd,
            };
            run_punch(config_path, action)?;
        }
        Some(Commands::Status { json }) => {
            let (db, config) = open_database(config_path)?;
            status::run(
                &mut std::io::stdout().lock(),
                &db,
                SystemClock,
                config.tracker_settings(),
                *json,
            )?;
        }
        Some(Commands::History { json }) => {
            let (db, config) = open_database(config_path)?;
            history::run(
                &mut std::io::stdout().lock(),
                &db,
                SystemClock,
                config.tracker_settings(),
                *json,
            )?;
        }
        Some(Commands::Watch) => {
            let (db, config) = open_database(config_path)?;
            let tracker = util::load_today(&db, SystemClock, config.tracker_settings())?;
            watch::run(&mut std::io::stdout().lock(), tracker)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
