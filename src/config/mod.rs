//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::{
    DEFAULT_DEAD_ZONE, DEFAULT_GAMES_ROOT, DEFAULT_HOLD_RELEASE_MS, DEFAULT_KILL_HOLD_TICKS,
    DEFAULT_KILL_KEY_A, DEFAULT_KILL_KEY_B, DEFAULT_META_FILE, DEFAULT_NAVIGATION_TIMEOUT,
    DEFAULT_TICK_MS,
};

/// CLI options for the arcade launcher. Validated values keep the tick loop sane.
#[derive(Debug, Parser, Clone)]
#[command(about = "Arcade Launcher", author, version)]
pub struct LauncherConfig {
    /// Directory scanned recursively for game metadata files
    #[arg(long = "games-root", env = "ARCADE_GAMES_ROOT", default_value = DEFAULT_GAMES_ROOT)]
    pub games_root: PathBuf,

    /// File name of the per-game metadata file
    #[arg(long = "meta-file", default_value = DEFAULT_META_FILE)]
    pub meta_file: String,

    /// Length of one control tick (milliseconds)
    #[arg(long = "tick-ms", default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Axis magnitude treated as neutral (exclusive, 0 < d < 1)
    #[arg(long = "dead-zone", default_value_t = DEFAULT_DEAD_ZONE)]
    pub dead_zone: f32,

    /// Ticks between two navigation steps while the axis is held
    #[arg(long = "navigation-timeout", default_value_t = DEFAULT_NAVIGATION_TIMEOUT)]
    pub navigation_timeout: i32,

    /// Ticks both kill keys must be held before the running game is killed
    #[arg(long = "kill-hold-ticks", default_value_t = DEFAULT_KILL_HOLD_TICKS)]
    pub kill_hold_ticks: u32,

    /// First key of the force-quit combo
    #[arg(long = "kill-key-a", default_value_t = DEFAULT_KILL_KEY_A)]
    pub kill_key_a: char,

    /// Second key of the force-quit combo
    #[arg(long = "kill-key-b", default_value_t = DEFAULT_KILL_KEY_B)]
    pub kill_key_b: char,

    /// Time a key stays held after its last press/repeat when the terminal
    /// cannot report key releases (milliseconds)
    #[arg(long = "hold-release-ms", default_value_t = DEFAULT_HOLD_RELEASE_MS)]
    pub hold_release_ms: u64,

    /// Print the loaded game catalog and exit
    #[arg(long = "list-games", default_value_t = false)]
    pub list_games: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "ARCADE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "ARCADE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}

/// Tunables for the control core, split out so the controller never sees clap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSettings {
    pub dead_zone: f32,
    pub navigation_timeout: i32,
    pub kill_hold_ticks: u32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            dead_zone: DEFAULT_DEAD_ZONE,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            kill_hold_ticks: DEFAULT_KILL_HOLD_TICKS,
        }
    }
}

impl LauncherConfig {
    pub fn control_settings(&self) -> ControlSettings {
        ControlSettings {
            dead_zone: self.dead_zone,
            navigation_timeout: self.navigation_timeout,
            kill_hold_ticks: self.kill_hold_ticks,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn hold_release(&self) -> Duration {
        Duration::from_millis(self.hold_release_ms)
    }

    pub(crate) fn logging_enabled(&self) -> bool {
        (self.logs || self.log_timings) && !self.no_logs
    }
}
