//! Text selection handling.

use crate::Position;
use std::ops::RangeInclusive;

/// A normalized selection: `start <= end`, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    /// Creates a selection from two endpoints in any order.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A zero-width selection at `position`.
    pub fn cursor(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Rows touched by either endpoint, inclusive. A collapsed selection
    /// still spans its own row.
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.start.line..=self.end.line
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::cursor(Position::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_normalization() {
        let sel = Selection::new(Position::new(2, 5), Position::new(1, 3));
        assert_eq!(sel.start, Position::new(1, 3));
        assert_eq!(sel.end, Position::new(2, 5));
    }

    #[test]
    fn test_rows_of_collapsed_selection() {
        let sel = Selection::cursor(Position::new(4, 2));
        assert_eq!(sel.rows(), 4..=4);
    }

    #[test]
    fn test_rows_ignore_direction() {
        let sel = Selection::new(Position::new(6, 1), Position::new(3, 8));
        assert_eq!(sel.rows().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    }
}
