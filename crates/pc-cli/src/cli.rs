//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Attendance punch clock.
///
/// Tracks clock-in, clock-out and breaks for the current working day and
/// keeps a local journal of every accepted punch.
#[derive(Debug, Parser)]
#[command(name = "pc", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clock in for the day.
    In,

    /// Clock out for the day.
    Out,

    /// Start or end a break.
    Break {
        #[command(subcommand)]
        action: BreakAction,
    },

    /// Show today's status and totals.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the most recent punches of today.
    History {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show a live, once-per-second view until interrupted.
    Watch,
}

/// Break subcommands.
#[derive(Debug, Subcommand)]
pub enum BreakAction {
    /// Start a break.
    Start,
    /// End the current break.
    End,
}
