//! # Subspace Buffer
//!
//! Rope-backed text primitives consumed by the editing core.
//!
//! The core never touches the rope directly. It goes through [`TextView`],
//! which plays the part of a text widget: a document, one cursor with an
//! optional selection anchor, a viewport, and a change flag the core drains
//! after every keystroke.
//!
//! ## Ownership
//! - `TextView` owns its `TextBuffer`
//! - Reads borrow (`&self`), edits need `&mut self`
//! - Programmatic edits that must not count as user edits go through
//!   [`TextView::silenced`], a guard that restores notification on drop

mod buffer;
mod cursor;
mod history;
mod selection;
mod view;

pub use buffer::TextBuffer;
pub use cursor::{Cursor, Motion, Position};
pub use history::{Edit, EditGroup, EditKind, History};
pub use selection::Selection;
pub use view::{Silenced, TextView};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: Position, end: Position },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}
