//! Keyboard stand-in for the arcade controller.

use super::{HoldTracker, InputFrame, InputSource};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

/// Maps crossterm key events onto the axis, confirm edge and the two kill buttons.
pub struct KeyboardInput {
    left: HoldTracker,
    right: HoldTracker,
    kill_a: HoldTracker,
    kill_b: HoldTracker,
    kill_keys: (char, char),
    release_events: bool,
    release_after: Duration,
    /// Last Enter/Space press or repeat, used to spot autorepeat without release events.
    last_confirm: Option<Instant>,
    confirm_pending: bool,
    quit_pending: bool,
}

enum KillButton {
    A,
    B,
}

impl KeyboardInput {
    pub fn new(kill_keys: (char, char), release_events: bool, release_after: Duration) -> Self {
        let tracker = HoldTracker::new(release_events, release_after);
        Self {
            left: tracker.clone(),
            right: tracker.clone(),
            kill_a: tracker.clone(),
            kill_b: tracker,
            kill_keys: (
                kill_keys.0.to_ascii_lowercase(),
                kill_keys.1.to_ascii_lowercase(),
            ),
            release_events,
            release_after,
            last_confirm: None,
            confirm_pending: false,
            quit_pending: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let pressed = matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat);
        let fresh_press = key.kind == KeyEventKind::Press;

        if fresh_press && key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') | KeyCode::Char('C') = key.code {
                self.quit_pending = true;
            }
            return;
        }

        let tracker = match key.code {
            KeyCode::Left => Some(&mut self.left),
            KeyCode::Right => Some(&mut self.right),
            KeyCode::Enter => {
                self.handle_confirm(key.kind, now);
                None
            }
            KeyCode::Esc => {
                self.quit_pending |= fresh_press;
                None
            }
            KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
                'a' => Some(&mut self.left),
                'd' => Some(&mut self.right),
                ' ' => {
                    self.handle_confirm(key.kind, now);
                    None
                }
                c if c == self.kill_keys.0 => {
                    self.handle_kill(KillButton::A, pressed, now);
                    None
                }
                c if c == self.kill_keys.1 => {
                    self.handle_kill(KillButton::B, pressed, now);
                    None
                }
                _ => None,
            },
            _ => None,
        };
        if let Some(tracker) = tracker {
            if pressed {
                tracker.press(now);
            } else {
                tracker.release();
            }
        }
    }

    /// Without release events, autorepeat arrives as plain presses; any
    /// confirm activity within `release_after` of the last one is the same hold.
    fn handle_confirm(&mut self, kind: KeyEventKind, now: Instant) {
        if self.release_events {
            self.confirm_pending |= kind == KeyEventKind::Press;
            return;
        }
        if kind == KeyEventKind::Release {
            return;
        }
        let fresh = self
            .last_confirm
            .map_or(true, |last| now.saturating_duration_since(last) > self.release_after);
        self.last_confirm = Some(now);
        self.confirm_pending |= fresh;
    }

    /// Terminals autorepeat only the most recently pressed key, so without
    /// release events activity on either kill key keeps both holds alive.
    fn handle_kill(&mut self, button: KillButton, pressed: bool, now: Instant) {
        let (tracker, other) = match button {
            KillButton::A => (&mut self.kill_a, &mut self.kill_b),
            KillButton::B => (&mut self.kill_b, &mut self.kill_a),
        };
        if !pressed {
            tracker.release();
            return;
        }
        tracker.press(now);
        if !self.release_events {
            other.refresh(now);
        }
    }

    /// Advance the hold trackers one tick and hand out the frame.
    pub fn frame(&mut self, now: Instant) -> InputFrame {
        self.left.tick(now);
        self.right.tick(now);
        let axis = match (self.left.is_held(), self.right.is_held()) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        InputFrame {
            axis,
            confirm: std::mem::take(&mut self.confirm_pending),
            hold_a: self.kill_a.tick(now),
            hold_b: self.kill_b.tick(now),
            quit: std::mem::take(&mut self.quit_pending),
        }
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> Result<InputFrame> {
        while event::poll(Duration::ZERO).context("failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("failed to read terminal event")? {
                self.handle_key(key, Instant::now());
            }
        }
        Ok(self.frame(Instant::now()))
    }
}
