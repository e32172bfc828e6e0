//! Controller input: raw per-tick samples and the filters that turn them into intents.

mod debounce;
mod hold;
mod keyboard;

use anyhow::Result;

pub use debounce::{debounce_step, InputDebouncer, NavIntent};
pub use hold::HoldTracker;
pub use keyboard::KeyboardInput;

/// Everything the controller samples in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Horizontal axis in [-1, 1].
    pub axis: f32,
    /// Confirm button went down this tick (edge, not level).
    pub confirm: bool,
    /// Ticks the first kill button has been held.
    pub hold_a: u32,
    /// Ticks the second kill button has been held.
    pub hold_b: u32,
    /// Operator asked to close the launcher.
    pub quit: bool,
}

/// Per-tick input provider; implementations must never block.
pub trait InputSource {
    fn poll(&mut self) -> Result<InputFrame>;
}
