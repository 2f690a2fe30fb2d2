//! Numeric line goto.

use subspace_buffer::{Position, TextView};

/// Row for a typed 1-based line number, clamped to the document.
///
/// `None` unless `digits` is non-empty ASCII digits. Numbers too large to
/// parse clamp to the last row like any other overshoot.
pub fn target_line(digits: &str, line_count: usize) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let line: usize = digits.parse().unwrap_or(usize::MAX);
    Some(line.saturating_sub(1).min(line_count.saturating_sub(1)))
}

/// Moves the cursor to column 0 of the typed line and centres it. Returns
/// the row, or `None` when `digits` is not a line number.
pub fn goto_line(view: &mut TextView, digits: &str) -> Option<usize> {
    let row = target_line(digits, view.line_count())?;
    view.move_to(Position::new(row, 0), true);
    tracing::debug!("Goto line {} -> row {}", digits, row);
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_line_clamps() {
        assert_eq!(target_line("1", 10), Some(0));
        assert_eq!(target_line("0", 10), Some(0));
        assert_eq!(target_line("5", 10), Some(4));
        assert_eq!(target_line("60", 10), Some(9));
        assert_eq!(target_line("99999999999999999999999", 10), Some(9));
    }

    #[test]
    fn test_target_line_rejects_non_digits() {
        assert_eq!(target_line("", 10), None);
        assert_eq!(target_line("1a", 10), None);
        assert_eq!(target_line("-3", 10), None);
        assert_eq!(target_line("٣", 10), None);
    }

    #[test]
    fn test_goto_line_moves_and_centres() {
        let text = (1..=100).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let mut view = TextView::from_text(&text, 10);
        view.move_to(Position::new(3, 4), false);

        assert_eq!(goto_line(&mut view, "60"), Some(59));
        assert_eq!(view.cursor_position(), Position::new(59, 0));
        assert_eq!(view.scroll_top(), 54);

        assert_eq!(goto_line(&mut view, "150"), Some(99));
        assert_eq!(view.cursor_position(), Position::new(99, 0));
        assert_eq!(goto_line(&mut view, "x"), None);
        assert_eq!(view.cursor_position(), Position::new(99, 0));
    }
}
