//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use pc_core::{MidnightPolicy, TrackerSettings};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the event journal.
    pub database_path: PathBuf,

    /// What happens to an open session at local midnight. Under `clear_flag`
    /// the punch and status commands also pick up a shift left open the day before.
    pub midnight_policy: MidnightPolicy,

    /// Seconds a rejection notice stays on screen in `watch`.
    pub notice_ttl_secs: u32,

    /// Refresh period of the live displays.
    pub tick_millis: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("midnight_policy", &self.midnight_policy)
            .field("notice_ttl_secs", &self.notice_ttl_secs)
            .field("tick_millis", &self.tick_millis)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("pc.db"),
            midnight_policy: MidnightPolicy::default(),
            notice_ttl_secs: 3,
            tick_millis: 1000,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PC_*)
        figment = figment.merge(Env::prefixed("PC_"));

        figment.extract()
    }

    /// Timer settings for the tracker.
    ///
    /// A zero tick would spin the scheduler, so it is raised to one millisecond.
    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            tick: Duration::milliseconds(i64::from(self.tick_millis.max(1))),
            notice_ttl: Duration::seconds(i64::from(self.notice_ttl_secs)),
            midnight_policy: self.midnight_policy,
        }
    }
}

/// Returns the platform-specific config directory for pc.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pc"))
}

/// Returns the platform-specific data directory for pc.
///
/// On Linux: `~/.local/share/pc`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("pc"))
}
