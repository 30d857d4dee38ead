//! CLI subcommand implementations.

pub mod history;
pub mod punch;
pub mod status;
pub mod util;
pub mod watch;
