/// Discrete navigation step derived from the analog axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    None,
    Next,
    Previous,
}

/// One debounce step as a pure function of `(sample, timer)`.
///
/// The gate is open while `timer < 0`. Firing resets the timer to `threshold`;
/// every call then decrements it, saturating at -1. With a sustained sample the
/// steps are therefore `threshold + 1` ticks apart. Next is checked first.
pub fn debounce_step(sample: f32, timer: i32, dead_zone: f32, threshold: i32) -> (NavIntent, i32) {
    let intent = if timer < 0 {
        if sample > dead_zone {
            NavIntent::Next
        } else if sample < -dead_zone {
            NavIntent::Previous
        } else {
            NavIntent::None
        }
    } else {
        NavIntent::None
    };
    let timer = if intent == NavIntent::None {
        timer
    } else {
        threshold
    };
    (intent, timer.saturating_sub(1).max(-1))
}

/// Rate limiter that turns a noisy axis into at most one intent per window.
#[derive(Debug, Clone)]
pub struct InputDebouncer {
    dead_zone: f32,
    threshold: i32,
    timer: i32,
}

impl InputDebouncer {
    pub fn new(dead_zone: f32, threshold: i32) -> Self {
        Self {
            dead_zone,
            threshold,
            timer: 0,
        }
    }

    pub fn step(&mut self, sample: f32) -> NavIntent {
        let (intent, timer) = debounce_step(sample, self.timer, self.dead_zone, self.threshold);
        self.timer = timer;
        intent
    }

    pub fn timer(&self) -> i32 {
        self.timer
    }
}
