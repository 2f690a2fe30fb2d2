//! Core text buffer backed by a rope.
//!
//! Only `\n` breaks lines. A `\r\n` pair leaves the `\r` at the end of its
//! line's content, and [`TextBuffer::line_len`] excludes both.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

use crate::history::{EditKind, History};
use crate::{BufferError, BufferResult, Edit, Position};

/// A text buffer with undo history.
///
/// `TextBuffer` is `Send` but not `Sync`; the editor keeps it on one thread.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    history: History,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use subspace_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_history_limit(1000)
    }

    pub fn with_history_limit(max_history: usize) -> Self {
        Self {
            rope: Rope::new(),
            history: History::new(max_history),
        }
    }

    // ==================== Text Access ====================

    /// Returns the entire text.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a line including its trailing newline.
    pub fn line(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: line_idx,
                column: 0,
            });
        }
        Ok(self.rope.line(line_idx).into())
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        Ok(self.rope.slice(range).into())
    }

    /// Returns the text between two positions, end exclusive.
    pub fn text_range(&self, start: Position, end: Position) -> BufferResult<String> {
        if end < start {
            return Err(BufferError::InvalidRange { start, end });
        }
        let start_idx = self.position_to_char_idx(start)?;
        let end_idx = self.position_to_char_idx(end)?;
        Ok(self.rope.slice(start_idx..end_idx).into())
    }

    // ==================== Measurements ====================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of lines. An empty buffer has 1 line, and a trailing `\n`
    /// counts the empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of a line in characters, without its line break.
    pub fn line_len(&self, line_idx: usize) -> BufferResult<usize> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: line_idx,
                column: 0,
            });
        }
        let line = self.rope.line(line_idx);
        let mut len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len -= 1;
            if len > 0 && line.char(len - 1) == '\r' {
                len -= 1;
            }
        }
        Ok(len)
    }

    /// The last valid position in the buffer.
    pub fn end_position(&self) -> Position {
        let line = self.len_lines().saturating_sub(1);
        Position::new(line, self.line_len(line).unwrap_or(0))
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<()> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        if text.is_empty() {
            return Ok(());
        }

        self.history.push(Edit::insert(char_idx, text));
        self.rope.insert(char_idx, text);
        Ok(())
    }

    /// Deletes text in a character range, returning what was removed.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<String> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        if range.is_empty() {
            return Ok(String::new());
        }

        let deleted: String = self.rope.slice(range.clone()).into();
        self.history.push(Edit::delete(range.start, deleted.clone()));
        self.rope.remove(range);
        Ok(deleted)
    }

    /// Replaces a range with new text as a single undo step.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<String> {
        self.history.begin_group();
        let result = self
            .delete(range.clone())
            .and_then(|deleted| self.insert(range.start, text).map(|()| deleted));
        self.history.end_group();
        result
    }

    /// Replaces the whole document.
    pub fn set_text(&mut self, text: &str) -> BufferResult<()> {
        if self.rope == text {
            return Ok(());
        }
        self.replace(0..self.len_chars(), text).map(|_| ())
    }

    /// Replaces a range without recording history.
    ///
    /// Only for rewrites that are reverted before the user can act on them,
    /// so recorded edit positions stay valid once the text is put back.
    pub fn replace_transient(&mut self, range: Range<usize>, text: &str) -> BufferResult<()> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        self.rope.remove(range.clone());
        self.rope.insert(range.start, text);
        Ok(())
    }

    /// Opens an undo group spanning several mutations.
    pub fn begin_group(&mut self) {
        self.history.begin_group();
    }

    pub fn end_group(&mut self) {
        self.history.end_group();
    }

    // ==================== Undo/Redo ====================

    /// Reverts the last edit group. Returns the character index where the
    /// cursor should land.
    pub fn undo(&mut self) -> BufferResult<usize> {
        let group = self.history.undo().ok_or(BufferError::NothingToUndo)?;
        let mut cursor = 0;

        for edit in group.edits.iter().rev() {
            match edit.kind {
                EditKind::Insert => {
                    self.rope.remove(edit.position..edit.position + edit.char_len());
                    cursor = edit.position;
                }
                EditKind::Delete => {
                    self.rope.insert(edit.position, &edit.content);
                    cursor = edit.position + edit.char_len();
                }
            }
        }
        Ok(cursor)
    }

    /// Re-applies the last undone group.
    pub fn redo(&mut self) -> BufferResult<usize> {
        let group = self.history.redo().ok_or(BufferError::NothingToRedo)?;
        let mut cursor = 0;

        for edit in &group.edits {
            match edit.kind {
                EditKind::Insert => {
                    self.rope.insert(edit.position, &edit.content);
                    cursor = edit.position + edit.char_len();
                }
                EditKind::Delete => {
                    self.rope.remove(edit.position..edit.position + edit.char_len());
                    cursor = edit.position;
                }
            }
        }
        Ok(cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drops all undo/redo state, e.g. after loading a different file.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Swaps in previously captured undo/redo state. The caller must make
    /// sure the text matches what that history was recorded against.
    pub fn set_history(&mut self, history: History) {
        self.history = history;
    }

    // ==================== Position Conversion ====================

    /// Converts a position to a character index. The column may sit at the
    /// end of the line's content but not inside its line break.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        let line_len = self
            .line_len(pos.line)
            .map_err(|_| BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            })?;
        if pos.column > line_len {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }
        Ok(self.rope.line_to_char(pos.line) + pos.column)
    }

    /// Converts a character index to a position.
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        let line = self.rope.char_to_line(char_idx);
        let column = char_idx - self.rope.line_to_char(line);
        let column = column.min(self.line_len(line)?);
        Ok(Position { line, column })
    }

    /// Clamps a position into the document.
    pub fn clamp(&self, pos: Position) -> Position {
        let last = self.len_lines().saturating_sub(1);
        let line = pos.line.min(last);
        let column = pos.column.min(self.line_len(line).unwrap_or(0));
        Position::new(line, column)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            history: History::new(1000),
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "Hello").unwrap();
        buffer.insert(5, ", World!").unwrap();
        assert_eq!(buffer.text(), "Hello, World!");

        let deleted = buffer.delete(5..7).unwrap();
        assert_eq!(deleted, ", ");
        assert_eq!(buffer.text(), "HelloWorld!");
    }

    #[test]
    fn test_undo_redo() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "Hello\n").unwrap();
        buffer.insert(6, "World").unwrap();

        assert_eq!(buffer.undo().unwrap(), 6);
        assert_eq!(buffer.text(), "Hello\n");

        buffer.redo().unwrap();
        assert_eq!(buffer.text(), "Hello\nWorld");
    }

    #[test]
    fn test_replace_undoes_in_one_step() {
        let mut buffer = TextBuffer::from("one two");
        buffer.replace(0..3, "three").unwrap();
        assert_eq!(buffer.text(), "three two");

        buffer.undo().unwrap();
        assert_eq!(buffer.text(), "one two");
    }

    #[test]
    fn test_line_len_excludes_breaks() {
        let buffer = TextBuffer::from("abc\r\nde\n");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line_len(0).unwrap(), 3);
        assert_eq!(buffer.line_len(1).unwrap(), 2);
        assert_eq!(buffer.line_len(2).unwrap(), 0);
    }

    #[test]
    fn test_position_conversion() {
        let buffer = TextBuffer::from("ab\ncd");
        assert_eq!(buffer.position_to_char_idx(Position::new(1, 1)).unwrap(), 4);
        assert_eq!(buffer.char_idx_to_position(3).unwrap(), Position::new(1, 0));
        assert!(buffer.position_to_char_idx(Position::new(0, 3)).is_err());
        assert!(buffer.position_to_char_idx(Position::new(2, 0)).is_err());
    }

    #[test]
    fn test_text_range_spans_lines() {
        let buffer = TextBuffer::from("one\ntwo\nthree");
        let text = buffer
            .text_range(Position::new(0, 1), Position::new(2, 2))
            .unwrap();
        assert_eq!(text, "ne\ntwo\nth");
    }

    #[test]
    fn test_replace_transient_skips_history() {
        let mut buffer = TextBuffer::from("hello world");
        buffer.replace_transient(0..5, "HEllo").unwrap();
        assert_eq!(buffer.text(), "HEllo world");
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_clamp() {
        let buffer = TextBuffer::from("ab\ncdef");
        assert_eq!(buffer.clamp(Position::new(9, 9)), Position::new(1, 4));
        assert_eq!(buffer.clamp(Position::new(0, 9)), Position::new(0, 2));
    }
}
