//! The text view: document, cursor, viewport and change notification.
//!
//! `TextView` is the set of primitives the editing core drives. Every
//! mutating primitive raises a change flag that the owner drains with
//! [`TextView::take_changed`]. Mutations made through a [`Silenced`] guard
//! leave the flag alone, so the owner can rewrite the visible text without
//! that counting as a user edit.

use std::ops::{Deref, DerefMut};

use unicode_segmentation::UnicodeSegmentation;

use crate::{BufferResult, Cursor, History, Motion, Position, Selection, TextBuffer};

#[derive(Debug, Clone)]
pub struct TextView {
    buffer: TextBuffer,
    cursor: Cursor,
    /// Sticky selection: motions extend instead of move.
    select: bool,
    scroll_top: usize,
    viewport_height: usize,
    clipboard: String,
    history_limit: usize,
    changed: bool,
    silence_depth: usize,
}

/// Scoped notification suppression.
///
/// Dereferences to the view. Edits made through it do not raise the change
/// flag; notification resumes when the guard drops, on every exit path.
pub struct Silenced<'a> {
    view: &'a mut TextView,
}

impl Deref for Silenced<'_> {
    type Target = TextView;

    fn deref(&self) -> &TextView {
        self.view
    }
}

impl DerefMut for Silenced<'_> {
    fn deref_mut(&mut self) -> &mut TextView {
        self.view
    }
}

impl Drop for Silenced<'_> {
    fn drop(&mut self) {
        self.view.silence_depth -= 1;
    }
}

impl TextView {
    /// Creates an empty view showing `viewport_height` rows.
    pub fn new(viewport_height: usize) -> Self {
        Self::with_buffer(TextBuffer::new(), viewport_height)
    }

    pub fn from_text(text: &str, viewport_height: usize) -> Self {
        Self::with_buffer(TextBuffer::from(text), viewport_height)
    }

    /// Creates an empty view whose documents keep `history_limit` undo steps.
    pub fn with_history_limit(viewport_height: usize, history_limit: usize) -> Self {
        let buffer = TextBuffer::with_history_limit(history_limit);
        let mut view = Self::with_buffer(buffer, viewport_height);
        view.history_limit = history_limit;
        view
    }

    pub fn with_buffer(buffer: TextBuffer, viewport_height: usize) -> Self {
        Self {
            buffer,
            cursor: Cursor::default(),
            select: false,
            scroll_top: 0,
            viewport_height: viewport_height.max(1),
            clipboard: String::new(),
            history_limit: 1000,
            changed: false,
            silence_depth: 0,
        }
    }

    // ==================== Notification ====================

    /// Suppresses change notification until the returned guard drops.
    pub fn silenced(&mut self) -> Silenced<'_> {
        self.silence_depth += 1;
        Silenced { view: self }
    }

    pub fn is_silenced(&self) -> bool {
        self.silence_depth > 0
    }

    /// Returns whether an unsilenced edit happened since the last call, and
    /// resets the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn mark_changed(&mut self) {
        if self.silence_depth == 0 {
            self.changed = true;
        }
    }

    // ==================== Queries ====================

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text().into_owned()
    }

    pub fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    pub fn line_len(&self, line: usize) -> usize {
        self.buffer.line_len(line).unwrap_or(0)
    }

    pub fn get_text_range(&self, start: Position, end: Position) -> BufferResult<String> {
        self.buffer.text_range(start, end)
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_position(&self) -> Position {
        self.cursor.position
    }

    /// The selection between anchor and cursor; collapsed when none.
    pub fn selection(&self) -> Selection {
        Selection::new(
            self.cursor.anchor.unwrap_or(self.cursor.position),
            self.cursor.position,
        )
    }

    pub fn is_selecting(&self) -> bool {
        self.select
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    // ==================== Whole-document ====================

    /// Replaces the whole document, keeping the cursor where it still fits.
    pub fn set_text(&mut self, text: &str) -> BufferResult<()> {
        if self.buffer.text() == text {
            return Ok(());
        }
        self.buffer.set_text(text)?;
        self.cursor.position = self.buffer.clamp(self.cursor.position);
        self.cursor.anchor = self.cursor.anchor.map(|a| self.buffer.clamp(a));
        self.mark_changed();
        Ok(())
    }

    /// Loads a different document: text, cursor and history all reset.
    pub fn load_text(&mut self, text: &str) {
        let mut buffer = TextBuffer::with_history_limit(self.history_limit);
        let _ = buffer.insert(0, text);
        buffer.clear_history();
        self.buffer = buffer;
        self.cursor = Cursor::default();
        self.scroll_top = 0;
        self.mark_changed();
    }

    /// A copy of the current undo/redo state.
    pub fn history_snapshot(&self) -> History {
        self.buffer.history().clone()
    }

    /// Puts back undo/redo state taken with
    /// [`history_snapshot`](Self::history_snapshot).
    pub fn restore_history(&mut self, history: History) {
        self.buffer.set_history(history);
    }

    // ==================== Editing ====================

    /// Inserts at the cursor; the cursor ends after the inserted text.
    pub fn insert(&mut self, text: &str) {
        let pos = self.cursor.position;
        if let Ok(end) = self.insert_raw(text, pos) {
            self.cursor.move_to(end);
            self.scroll_to_cursor();
        }
    }

    /// Inserts at `location`, shifting the cursor and anchor when they sit
    /// at or after it.
    pub fn insert_at(&mut self, text: &str, location: Position) -> BufferResult<()> {
        self.insert_raw(text, location).map(|_| ())
    }

    fn insert_raw(&mut self, text: &str, location: Position) -> BufferResult<Position> {
        let idx = self.buffer.position_to_char_idx(location)?;
        if text.is_empty() {
            return Ok(location);
        }
        let cursor_idx = self.char_idx(self.cursor.position);
        let anchor_idx = self.cursor.anchor.map(|a| self.char_idx(a));

        self.buffer.insert(idx, text)?;
        let len = text.chars().count();
        let shift = |i: usize| if i >= idx { i + len } else { i };

        self.cursor.position = self.position_at(shift(cursor_idx));
        self.cursor.anchor = anchor_idx.map(|a| self.position_at(shift(a)));
        self.mark_changed();
        Ok(self.position_at(idx + len))
    }

    /// Deletes `[start, end)` and returns the removed text.
    pub fn delete_range(&mut self, start: Position, end: Position) -> BufferResult<String> {
        let (start, end) = (start.min(end), start.max(end));
        let from = self.buffer.position_to_char_idx(start)?;
        let to = self.buffer.position_to_char_idx(end)?;
        let cursor_idx = self.char_idx(self.cursor.position);
        let anchor_idx = self.cursor.anchor.map(|a| self.char_idx(a));

        let deleted = self.buffer.delete(from..to)?;
        let shift = |i: usize| {
            if i >= to {
                i - (to - from)
            } else if i > from {
                from
            } else {
                i
            }
        };

        self.cursor.position = self.position_at(shift(cursor_idx));
        self.cursor.anchor = anchor_idx.map(|a| self.position_at(shift(a)));
        if !deleted.is_empty() {
            self.mark_changed();
        }
        Ok(deleted)
    }

    /// Replaces `[start, end)` with `text` as one undo step.
    pub fn replace_range(
        &mut self,
        text: &str,
        start: Position,
        end: Position,
    ) -> BufferResult<()> {
        self.grouped(|view| {
            view.delete_range(start, end)?;
            view.insert_at(text, start.min(end))
        })
    }

    /// Rewrites `[start, end)` outside the undo history, leaving the cursor
    /// and selection in place (clamped to the new text).
    pub fn replace_transient(
        &mut self,
        text: &str,
        start: Position,
        end: Position,
    ) -> BufferResult<()> {
        let (start, end) = (start.min(end), start.max(end));
        let from = self.buffer.position_to_char_idx(start)?;
        let to = self.buffer.position_to_char_idx(end)?;
        self.buffer.replace_transient(from..to, text)?;
        self.cursor.position = self.buffer.clamp(self.cursor.position);
        self.cursor.anchor = self.cursor.anchor.map(|a| self.buffer.clamp(a));
        self.mark_changed();
        Ok(())
    }

    /// Runs `f` with every recorded edit collapsed into one undo step.
    pub fn grouped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.buffer.begin_group();
        let result = f(self);
        self.buffer.end_group();
        result
    }

    /// Backspace: deletes the selection, or the character before the cursor.
    pub fn delete_left(&mut self) {
        if self.delete_selection() {
            return;
        }
        let pos = self.cursor.position;
        let target = self.motion_target(Motion::Left);
        if target != pos {
            let _ = self.delete_range(target, pos);
            self.cursor.move_to(target);
        }
    }

    pub fn delete_word_left(&mut self) {
        let pos = self.cursor.position;
        let target = self.motion_target(Motion::WordLeft);
        let _ = self.delete_range(target, pos);
        self.cursor.move_to(target.min(pos));
    }

    pub fn delete_word_right(&mut self) {
        let pos = self.cursor.position;
        let target = self.motion_target(Motion::WordRight);
        let _ = self.delete_range(pos, target);
        self.cursor.move_to(pos);
    }

    pub fn delete_to_start_of_line(&mut self) {
        let pos = self.cursor.position;
        let _ = self.delete_range(Position::new(pos.line, 0), pos);
        self.cursor.move_to(Position::new(pos.line, 0));
    }

    /// Deletes to the end of the line, or the whole line when the cursor is
    /// already at its end.
    pub fn delete_to_end_of_line_or_delete_line(&mut self) {
        let pos = self.cursor.position;
        let line_len = self.line_len(pos.line);

        if pos.column < line_len {
            let _ = self.delete_range(pos, Position::new(pos.line, line_len));
            return;
        }

        let last = self.line_count().saturating_sub(1);
        let (start, end) = if pos.line < last {
            (Position::new(pos.line, 0), Position::new(pos.line + 1, 0))
        } else if pos.line > 0 {
            let prev = pos.line - 1;
            (
                Position::new(prev, self.line_len(prev)),
                Position::new(pos.line, line_len),
            )
        } else {
            (Position::ZERO, Position::new(0, line_len))
        };
        let _ = self.delete_range(start, end);
        let landing = self.buffer.clamp(Position::new(start.line, 0));
        self.cursor.move_to(landing);
    }

    fn delete_selection(&mut self) -> bool {
        match self.cursor.selection_range() {
            Some((start, end)) => {
                let _ = self.delete_range(start, end);
                self.cursor.move_to(start);
                true
            }
            None => false,
        }
    }

    // ==================== Clipboard ====================

    pub fn copy(&mut self) {
        if let Some((start, end)) = self.cursor.selection_range() {
            if let Ok(text) = self.buffer.text_range(start, end) {
                self.clipboard = text;
            }
        }
    }

    pub fn cut(&mut self) {
        self.copy();
        self.delete_selection();
    }

    pub fn paste(&mut self) {
        let text = self.clipboard.clone();
        self.delete_selection();
        self.insert(&text);
    }

    // ==================== Undo/Redo ====================

    pub fn undo(&mut self) -> BufferResult<()> {
        let idx = self.buffer.undo()?;
        self.cursor.move_to(self.position_at(idx));
        self.mark_changed();
        Ok(())
    }

    pub fn redo(&mut self) -> BufferResult<()> {
        let idx = self.buffer.redo()?;
        self.cursor.move_to(self.position_at(idx));
        self.mark_changed();
        Ok(())
    }

    // ==================== Cursor ====================

    pub fn toggle_select(&mut self) {
        self.select = !self.select;
    }

    pub fn set_select(&mut self, select: bool) {
        self.select = select;
    }

    /// Applies a motion, extending the selection while select is on.
    pub fn move_cursor(&mut self, motion: Motion) {
        let preferred = self
            .cursor
            .preferred_column
            .unwrap_or(self.cursor.position.column);
        let target = self.motion_target(motion);

        if self.select {
            self.cursor.select_to(target);
        } else {
            self.cursor.move_to(target);
        }
        if motion.is_vertical() {
            self.cursor.preferred_column = Some(preferred);
        }

        match motion {
            Motion::PageUp => {
                self.scroll_top = self.scroll_top.saturating_sub(self.viewport_height)
            }
            Motion::PageDown => self.scroll_top += self.viewport_height,
            _ => {}
        }
        self.scroll_to_cursor();
    }

    /// Moves to `location` (clamped), collapsing the selection. With
    /// `center`, the viewport is scrolled so the row sits mid-screen.
    pub fn move_to(&mut self, location: Position, center: bool) {
        let location = self.buffer.clamp(location);
        self.cursor.move_to(location);
        if center {
            self.center_on(location.line);
        } else {
            self.scroll_to_cursor();
        }
    }

    /// Moves by a signed number of characters, crossing line breaks.
    pub fn move_relative(&mut self, columns: isize) {
        let idx = self.char_idx(self.cursor.position);
        let max = self.buffer.len_chars();
        let target = idx.saturating_add_signed(columns).min(max);
        let position = self.position_at(target);
        self.cursor.move_to(position);
        self.scroll_to_cursor();
    }

    pub fn center_on(&mut self, line: usize) {
        let last = self.line_count().saturating_sub(1);
        let half = self.viewport_height / 2;
        let max_top = last.saturating_sub(self.viewport_height.saturating_sub(1));
        self.scroll_top = line.saturating_sub(half).min(max_top);
    }

    fn scroll_to_cursor(&mut self) {
        let last = self.line_count().saturating_sub(1);
        let line = self.cursor.position.line;
        if line < self.scroll_top {
            self.scroll_top = line;
        } else if line >= self.scroll_top + self.viewport_height {
            self.scroll_top = line + 1 - self.viewport_height;
        }
        self.scroll_top = self.scroll_top.min(last);
    }

    /// Where `motion` would put the cursor from its current position.
    pub fn motion_target(&self, motion: Motion) -> Position {
        let pos = self.cursor.position;
        let last = self.line_count().saturating_sub(1);
        let preferred = self.cursor.preferred_column.unwrap_or(pos.column);

        match motion {
            Motion::Up => {
                if pos.line == 0 {
                    Position::ZERO
                } else {
                    self.vertical(pos.line - 1, preferred)
                }
            }
            Motion::Down => {
                if pos.line >= last {
                    Position::new(last, self.line_len(last))
                } else {
                    self.vertical(pos.line + 1, preferred)
                }
            }
            Motion::Left => {
                if pos.column > 0 {
                    Position::new(pos.line, pos.column - 1)
                } else if pos.line > 0 {
                    Position::new(pos.line - 1, self.line_len(pos.line - 1))
                } else {
                    pos
                }
            }
            Motion::Right => {
                if pos.column < self.line_len(pos.line) {
                    Position::new(pos.line, pos.column + 1)
                } else if pos.line < last {
                    Position::new(pos.line + 1, 0)
                } else {
                    pos
                }
            }
            Motion::WordLeft => self.word_left(pos),
            Motion::WordRight => self.word_right(pos, last),
            Motion::LineStart => Position::new(pos.line, 0),
            Motion::LineEnd => Position::new(pos.line, self.line_len(pos.line)),
            Motion::PageUp => {
                self.vertical(pos.line.saturating_sub(self.viewport_height), preferred)
            }
            Motion::PageDown => {
                self.vertical((pos.line + self.viewport_height).min(last), preferred)
            }
        }
    }

    fn vertical(&self, line: usize, preferred: usize) -> Position {
        Position::new(line, preferred.min(self.line_len(line)))
    }

    /// Start of the nearest word before the cursor, else end of the
    /// previous line.
    fn word_left(&self, pos: Position) -> Position {
        let line = self.line_content(pos.line);
        let start = word_spans(&line)
            .filter(|(start, _)| *start < pos.column)
            .map(|(start, _)| start)
            .last();

        match start {
            Some(column) => Position::new(pos.line, column),
            None if pos.column > 0 => Position::new(pos.line, 0),
            None if pos.line > 0 => Position::new(pos.line - 1, self.line_len(pos.line - 1)),
            None => pos,
        }
    }

    /// End of the nearest word after the cursor, else start of the next line.
    fn word_right(&self, pos: Position, last: usize) -> Position {
        let line = self.line_content(pos.line);
        let line_len = self.line_len(pos.line);
        let end = word_spans(&line)
            .find(|(_, end)| *end > pos.column)
            .map(|(_, end)| end);

        match end {
            Some(column) => Position::new(pos.line, column),
            None if pos.column < line_len => Position::new(pos.line, line_len),
            None if pos.line < last => Position::new(pos.line + 1, 0),
            None => pos,
        }
    }

    fn line_content(&self, line: usize) -> String {
        let len = self.line_len(line);
        self.buffer
            .text_range(Position::new(line, 0), Position::new(line, len))
            .unwrap_or_default()
    }

    fn char_idx(&self, pos: Position) -> usize {
        let pos = self.buffer.clamp(pos);
        self.buffer.position_to_char_idx(pos).unwrap_or(0)
    }

    fn position_at(&self, idx: usize) -> Position {
        self.buffer
            .char_idx_to_position(idx.min(self.buffer.len_chars()))
            .unwrap_or(Position::ZERO)
    }
}

impl Default for TextView {
    fn default() -> Self {
        Self::new(24)
    }
}

/// Character-column spans of the word-like segments of a line.
fn word_spans(line: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    line.split_word_bound_indices()
        .filter(|(_, word)| word.chars().any(|c| c.is_alphanumeric() || c == '_'))
        .map(move |(byte, word)| {
            let start = line[..byte].chars().count();
            (start, start + word.chars().count())
        })
}
