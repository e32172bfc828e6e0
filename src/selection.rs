//! Wrapping cursor over the game catalog.

use crate::catalog::EmptyCatalogError;
use crate::input::NavIntent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    index: usize,
    len: usize,
}

impl SelectionState {
    pub fn new(len: usize) -> Result<Self, EmptyCatalogError> {
        if len == 0 {
            return Err(EmptyCatalogError);
        }
        Ok(Self { index: 0, len })
    }

    /// Apply one intent; `index` always stays in `[0, len)`.
    pub fn advance(&mut self, intent: NavIntent) {
        self.index = match intent {
            NavIntent::None => self.index,
            NavIntent::Next => (self.index + 1) % self.len,
            // Add len before subtracting so the operand never goes negative.
            NavIntent::Previous => (self.index + self.len - 1) % self.len,
        };
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_in_both_directions() {
        let mut selection = SelectionState::new(3).unwrap();
        selection.advance(NavIntent::Previous);
        assert_eq!(selection.index(), 2);
        selection.advance(NavIntent::Next);
        selection.advance(NavIntent::Next);
        assert_eq!(selection.index(), 1);
        selection.advance(NavIntent::None);
        assert_eq!(selection.index(), 1);
    }

    #[test]
    fn single_entry_never_moves() {
        let mut selection = SelectionState::new(1).unwrap();
        for intent in [NavIntent::Next, NavIntent::Previous, NavIntent::None] {
            selection.advance(intent);
            assert_eq!(selection.index(), 0);
        }
    }

    #[test]
    fn index_stays_in_range_for_mixed_sequences() {
        for len in 1..=7 {
            let mut selection = SelectionState::new(len).unwrap();
            // Deterministic pseudo-random walk.
            let mut seed: u32 = 0x9e37_79b9 ^ len as u32;
            for _ in 0..500 {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                let intent = match seed % 3 {
                    0 => NavIntent::Next,
                    1 => NavIntent::Previous,
                    _ => NavIntent::None,
                };
                selection.advance(intent);
                assert!(selection.index() < len);
            }
        }
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(SelectionState::new(0), Err(EmptyCatalogError));
    }
}
