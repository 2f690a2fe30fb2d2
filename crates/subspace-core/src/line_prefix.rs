//! Prefix insertion at the start of selected rows.

use subspace_buffer::{BufferResult, Position, TextView};

/// Inserts `prefix` at column 0 of every row the selection touches, top
/// to bottom, as one undo step. Without a selection only the cursor row is
/// prefixed.
pub fn insert_line_prefix(view: &mut TextView, prefix: &str) -> BufferResult<()> {
    let rows = view.selection().rows();
    view.grouped(|view| {
        for row in rows {
            view.insert_at(prefix, Position::new(row, 0))?;
        }
        Ok(())
    })
}
