use std::time::{Duration, Instant};

/// Counts how many consecutive ticks a button has been held.
///
/// Terminals that report key releases end a hold exactly; everything else only
/// sends presses (plus autorepeat), so a hold lapses once no press arrived for
/// `release_after`.
#[derive(Debug, Clone)]
pub struct HoldTracker {
    pressed: bool,
    last_activity: Option<Instant>,
    ticks: u32,
    release_events: bool,
    release_after: Duration,
}

impl HoldTracker {
    pub fn new(release_events: bool, release_after: Duration) -> Self {
        Self {
            pressed: false,
            last_activity: None,
            ticks: 0,
            release_events,
            release_after,
        }
    }

    pub fn press(&mut self, now: Instant) {
        self.pressed = true;
        self.last_activity = Some(now);
    }

    /// Extend an ongoing hold as if a repeat had arrived; no effect when idle.
    pub fn refresh(&mut self, now: Instant) {
        if self.pressed {
            self.last_activity = Some(now);
        }
    }

    pub fn release(&mut self) {
        self.pressed = false;
        self.last_activity = None;
    }

    /// Advance one tick and return the current hold length in ticks.
    pub fn tick(&mut self, now: Instant) -> u32 {
        if self.pressed && !self.release_events {
            let lapsed = self
                .last_activity
                .is_none_or(|last| now.saturating_duration_since(last) > self.release_after);
            if lapsed {
                self.release();
            }
        }
        self.ticks = if self.pressed {
            self.ticks.saturating_add(1)
        } else {
            0
        };
        self.ticks
    }

    pub fn is_held(&self) -> bool {
        self.pressed
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}
