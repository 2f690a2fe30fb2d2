//! Cursor, position and motion types.


/// A position in the text buffer. Both fields are 0-indexed; `column`
/// counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position at the start of the document.
    pub const ZERO: Position = Position { line: 0, column: 0 };

    pub fn is_before(&self, other: &Position) -> bool {
        self < other
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, column): (usize, usize)) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 1-indexed for user-facing output
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Cursor motions understood by [`crate::TextView::move_cursor`].
///
/// A closed set: every variant has exactly one handler in the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Up,
    Down,
    Left,
    Right,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
}

impl Motion {
    /// Vertical motions keep the preferred column across short lines.
    pub fn is_vertical(self) -> bool {
        matches!(
            self,
            Motion::Up | Motion::Down | Motion::PageUp | Motion::PageDown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Motion::Up => "up",
            Motion::Down => "down",
            Motion::Left => "left",
            Motion::Right => "right",
            Motion::WordLeft => "word_left",
            Motion::WordRight => "word_right",
            Motion::LineStart => "line_start",
            Motion::LineEnd => "line_end",
            Motion::PageUp => "page_up",
            Motion::PageDown => "page_down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "up" => Motion::Up,
            "down" => Motion::Down,
            "left" => Motion::Left,
            "right" => Motion::Right,
            "word_left" => Motion::WordLeft,
            "word_right" => Motion::WordRight,
            "line_start" => Motion::LineStart,
            "line_end" => Motion::LineEnd,
            "page_up" => Motion::PageUp,
            "page_down" => Motion::PageDown,
            _ => return None,
        })
    }
}

/// A cursor with an optional selection anchor.
///
/// When `anchor` is set, the text between `anchor` and `position` is
/// selected, in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub position: Position,
    pub anchor: Option<Position>,
    /// Column vertical motion tries to return to.
    pub preferred_column: Option<usize>,
}

impl Cursor {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            anchor: None,
            preferred_column: None,
        }
    }

    /// Moves the cursor, clearing any selection.
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
        self.anchor = None;
        self.preferred_column = None;
    }

    /// Moves the cursor, extending the selection from where it was.
    pub fn select_to(&mut self, position: Position) {
        if self.anchor.is_none() {
            self.anchor = Some(self.position);
        }
        self.position = position;
        self.preferred_column = None;
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|anchor| anchor != self.position)
    }

    /// Ordered `(start, end)` of the selection, if any.
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        self.anchor
            .filter(|anchor| *anchor != self.position)
            .map(|anchor| (anchor.min(self.position), anchor.max(self.position)))
    }
}
