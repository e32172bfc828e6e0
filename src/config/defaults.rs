pub const DEFAULT_GAMES_ROOT: &str = "./games";
pub const DEFAULT_META_FILE: &str = "meta.json";

/// ~60 ticks per second.
pub const DEFAULT_TICK_MS: u64 = 16;
pub const DEFAULT_DEAD_ZONE: f32 = 0.5;
pub const DEFAULT_NAVIGATION_TIMEOUT: i32 = 20;
pub const DEFAULT_KILL_HOLD_TICKS: u32 = 60;
pub const DEFAULT_KILL_KEY_A: char = 'q';
pub const DEFAULT_KILL_KEY_B: char = 'p';

/// Longer than the usual terminal autorepeat delay so a held key does not flicker.
pub const DEFAULT_HOLD_RELEASE_MS: u64 = 600;

pub(super) const MAX_TICK_MS: u64 = 1_000;
pub(super) const MAX_NAVIGATION_TIMEOUT: i32 = 600;
pub(super) const MAX_KILL_HOLD_TICKS: u32 = 6_000;
pub(super) const MIN_HOLD_RELEASE_MS: u64 = 50;
pub(super) const MAX_HOLD_RELEASE_MS: u64 = 5_000;

/// Keys already bound to navigation or confirm.
pub(super) const RESERVED_KEYS: &[char] = &['a', 'd', ' '];
