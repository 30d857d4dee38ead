//! Punch clock CLI library.
//!
//! This crate provides the CLI interface for the attendance tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{BreakAction, Cli, Commands};
pub use config::Config;
