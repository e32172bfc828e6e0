use super::defaults::{
    MAX_HOLD_RELEASE_MS, MAX_KILL_HOLD_TICKS, MAX_NAVIGATION_TIMEOUT, MAX_TICK_MS,
    MIN_HOLD_RELEASE_MS, RESERVED_KEYS,
};
use super::LauncherConfig;
use anyhow::{bail, Result};
use clap::Parser;

impl LauncherConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize key bindings.
    pub fn validate(&mut self) -> Result<()> {
        if !(1..=MAX_TICK_MS).contains(&self.tick_ms) {
            bail!(
                "--tick-ms must be between 1 and {MAX_TICK_MS}, got {}",
                self.tick_ms
            );
        }
        // Written as a negated range so NaN is rejected too.
        if !(self.dead_zone > 0.0 && self.dead_zone < 1.0) {
            bail!(
                "--dead-zone must be strictly between 0.0 and 1.0, got {}",
                self.dead_zone
            );
        }
        if !(1..=MAX_NAVIGATION_TIMEOUT).contains(&self.navigation_timeout) {
            bail!(
                "--navigation-timeout must be between 1 and {MAX_NAVIGATION_TIMEOUT} ticks, got {}",
                self.navigation_timeout
            );
        }
        if !(1..=MAX_KILL_HOLD_TICKS).contains(&self.kill_hold_ticks) {
            bail!(
                "--kill-hold-ticks must be between 1 and {MAX_KILL_HOLD_TICKS} ticks, got {}",
                self.kill_hold_ticks
            );
        }
        if !(MIN_HOLD_RELEASE_MS..=MAX_HOLD_RELEASE_MS).contains(&self.hold_release_ms) {
            bail!(
                "--hold-release-ms must be between {MIN_HOLD_RELEASE_MS} and {MAX_HOLD_RELEASE_MS}, got {}",
                self.hold_release_ms
            );
        }

        self.kill_key_a = sanitize_kill_key(self.kill_key_a, "--kill-key-a")?;
        self.kill_key_b = sanitize_kill_key(self.kill_key_b, "--kill-key-b")?;
        if self.kill_key_a == self.kill_key_b {
            bail!(
                "--kill-key-a and --kill-key-b must differ, both are '{}'",
                self.kill_key_a
            );
        }

        if self.meta_file.is_empty() || self.meta_file.contains(['/', '\\']) {
            bail!(
                "--meta-file must be a bare file name, got '{}'",
                self.meta_file
            );
        }
        Ok(())
    }
}

/// Kill keys are matched case-insensitively, so store them lowercased.
pub(super) fn sanitize_kill_key(key: char, flag: &str) -> Result<char> {
    if key.is_control() || key.is_whitespace() {
        bail!("{flag} must be a printable key");
    }
    let lowered = key.to_ascii_lowercase();
    if RESERVED_KEYS.contains(&lowered) {
        bail!("{flag} '{key}' is already bound to navigation or confirm");
    }
    Ok(lowered)
}
