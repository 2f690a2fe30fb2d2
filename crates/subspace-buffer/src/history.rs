//! Undo/redo history.
//!
//! Edits are recorded as groups. A group is undone or redone as a whole, so a
//! compound operation (a replace, a line-prefix pass) is one undo step.
//! Rapid single-character inserts on one line coalesce into the previous edit.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// The type of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Text was inserted
    Insert,
    /// Text was deleted
    Delete,
}

/// A single edit operation, addressed by character index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub kind: EditKind,
    /// Character index where the edit occurred
    pub position: usize,
    /// The text that was inserted or deleted
    pub content: String,
}

impl Edit {
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            content: content.into(),
        }
    }

    pub fn delete(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            content: content.into(),
        }
    }

    /// Number of characters this edit covers.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if `other` can be folded into this edit.
    ///
    /// Inserts coalesce when `other` starts where this one ends; deletes
    /// coalesce for repeated backspace or repeated forward delete. Newlines
    /// always start a new edit.
    pub fn can_coalesce(&self, other: &Edit) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if self.content.contains('\n') || other.content.contains('\n') {
            return false;
        }

        match self.kind {
            EditKind::Insert => self.position + self.char_len() == other.position,
            EditKind::Delete => {
                other.position + other.char_len() == self.position
                    || self.position == other.position
            }
        }
    }

    /// Folds `other` into this edit. Caller checks [`Edit::can_coalesce`].
    pub fn coalesce(&mut self, other: Edit) {
        match self.kind {
            EditKind::Insert => self.content.push_str(&other.content),
            EditKind::Delete => {
                if other.position < self.position {
                    self.content = other.content + &self.content;
                    self.position = other.position;
                } else {
                    self.content.push_str(&other.content);
                }
            }
        }
    }
}

/// A group of edits undone/redone together, in application order.
#[derive(Debug, Clone)]
pub struct EditGroup {
    pub edits: Vec<Edit>,
    timestamp: Option<Instant>,
}

impl EditGroup {
    fn new(edit: Edit) -> Self {
        Self {
            edits: vec![edit],
            timestamp: Some(Instant::now()),
        }
    }
}

/// Bounded undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<EditGroup>,
    redo_stack: Vec<EditGroup>,
    max_size: usize,
    coalesce_threshold: Duration,
    group_depth: usize,
    group_open: bool,
}

impl History {
    /// Creates a new history keeping at most `max_size` groups.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_size.min(1024)),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            coalesce_threshold: Duration::from_millis(300),
            group_depth: 0,
            group_open: false,
        }
    }

    /// Records an edit. Clears the redo stack.
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();

        if let Some(last_group) = self.undo_stack.back_mut() {
            if self.group_depth > 0 && self.group_open {
                last_group.edits.push(edit);
                return;
            }

            if self.group_depth == 0 {
                let recent = last_group
                    .timestamp
                    .is_some_and(|t| t.elapsed() < self.coalesce_threshold);
                if recent && last_group.edits.len() == 1 {
                    if let Some(last_edit) = last_group.edits.last_mut() {
                        if last_edit.can_coalesce(&edit) {
                            last_edit.coalesce(edit);
                            last_group.timestamp = Some(Instant::now());
                            return;
                        }
                    }
                }
            }
        }

        let mut group = EditGroup::new(edit);
        if self.group_depth > 0 {
            // Grouped edits never coalesce with later keystrokes.
            group.timestamp = None;
            self.group_open = true;
        }
        self.undo_stack.push_back(group);

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Starts a group: every edit until the matching `end_group` is one step.
    pub fn begin_group(&mut self) {
        if self.group_depth == 0 {
            self.group_open = false;
        }
        self.group_depth += 1;
    }

    pub fn end_group(&mut self) {
        self.group_depth = self.group_depth.saturating_sub(1);
        if self.group_depth == 0 {
            self.group_open = false;
        }
    }

    /// Pops the last group for undoing. The caller reverts its edits in
    /// reverse order.
    pub fn undo(&mut self) -> Option<EditGroup> {
        let group = self.undo_stack.pop_back()?;
        self.redo_stack.push(group.clone());
        Some(group)
    }

    /// Pops the last undone group for re-applying in order.
    pub fn redo(&mut self) -> Option<EditGroup> {
        let mut group = self.redo_stack.pop()?;
        group.timestamp = None;
        self.undo_stack.push_back(group.clone());
        Some(group)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_undo_redo() {
        let mut history = History::new(100);

        history.push(Edit::insert(0, "a"));
        std::thread::sleep(Duration::from_millis(400)); // Prevent coalescing
        history.push(Edit::insert(1, "b"));

        assert_eq!(history.undo_count(), 2);
        let group = history.undo().unwrap();
        assert_eq!(group.edits[0].content, "b");

        assert!(history.can_redo());
        let group = history.redo().unwrap();
        assert_eq!(group.edits[0].content, "b");
    }

    #[test]
    fn test_edit_coalescing() {
        let mut e1 = Edit::insert(0, "a");
        let e2 = Edit::insert(1, "b");

        assert!(e1.can_coalesce(&e2));
        e1.coalesce(e2);
        assert_eq!(e1.content, "ab");
    }

    #[test]
    fn test_group_is_one_step() {
        let mut history = History::new(100);
        history.begin_group();
        history.push(Edit::insert(0, "#"));
        history.push(Edit::insert(5, "#"));
        history.end_group();

        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.undo().unwrap().edits.len(), 2);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(10);
        history.push(Edit::insert(0, "x"));
        history.undo();
        history.push(Edit::delete(0, "y"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut history = History::new(2);
        history.push(Edit::insert(0, "a\n"));
        history.push(Edit::insert(2, "b\n"));
        history.push(Edit::insert(4, "c\n"));
        assert_eq!(history.undo_count(), 2);
    }
}
