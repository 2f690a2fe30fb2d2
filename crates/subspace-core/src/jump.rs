//! Two-letter jump labels over the words around the cursor.
//!
//! Opening the locate accumulator overwrites the first two characters of
//! every word in a window of rows with a label (`AA`, `AB`, ...). Typing a
//! label and closing the accumulator jumps to where that word started.
//!
//! ## Numbering
//!
//! Words are runs of non-whitespace, numbered in scan order. Word `n` gets
//! `LABEL_ALPHABET[n / 25]` followed by `LABEL_ALPHABET[n % 25]`. One-letter
//! words take a number but show nothing, so their label is never assigned.
//! The alphabet leaves out `G` because `G` closes the accumulator.
//!
//! The overlay is a same-length rewrite made outside the undo history and
//! without raising the view's change flag. [`JumpOverlay::restore`] puts
//! the snapshot back verbatim.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use subspace_buffer::{BufferResult, History, Position, TextView};

/// Label letters: A-Z without the locate key.
pub const LABEL_ALPHABET: [char; 25] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T',
    'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Opens and closes the locate accumulator.
pub const LOCATE_KEY: char = 'G';

/// Distinct two-letter labels.
pub const MAX_LABELS: usize = LABEL_ALPHABET.len() * LABEL_ALPHABET.len();

/// Default rows above and below the cursor.
pub const DEFAULT_RADIUS: usize = 10;

/// The label of the `index`-th word, or `None` once the two-letter space
/// is exhausted.
pub fn label_for(index: usize) -> Option<String> {
    let n = LABEL_ALPHABET.len();
    if index >= MAX_LABELS {
        return None;
    }
    Some([LABEL_ALPHABET[index / n], LABEL_ALPHABET[index % n]].iter().collect())
}

/// Label to the original first-character position of its word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpMap {
    labels: HashMap<String, Position>,
}

impl JumpMap {
    /// Looks up typed input. Labels are matched case-insensitively.
    pub fn get(&self, input: &str) -> Option<Position> {
        self.labels.get(&input.to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Position)> {
        self.labels.iter().map(|(label, pos)| (label.as_str(), *pos))
    }
}

/// A window's text with labels applied, and the labels' targets.
#[derive(Debug, Clone)]
pub struct LabelledWindow {
    pub text: String,
    pub map: JumpMap,
}

/// Labels the words of `window`, whose first line is document row
/// `first_row`. The result has exactly as many characters as the input.
pub fn label_words(window: &str, first_row: usize) -> LabelledWindow {
    // A trailing separator closes the last word.
    let mut chars: Vec<char> = window.chars().chain(std::iter::once(' ')).collect();
    let mut labels = HashMap::new();

    let (mut row, mut col) = (first_row, 0);
    let mut word: Option<(usize, Position)> = None;
    let mut word_len = 0;
    let mut word_num = 0;

    for i in 0..chars.len() {
        let c = chars[i];
        if !c.is_whitespace() {
            if word.is_none() {
                word = Some((i, Position::new(row, col)));
            }
            word_len += 1;
            col += 1;
            continue;
        }

        if let Some((start, pos)) = word.take() {
            if word_len > 1 {
                if let Some(label) = label_for(word_num) {
                    for (offset, l) in label.chars().enumerate() {
                        chars[start + offset] = l;
                    }
                    labels.insert(label, pos);
                }
            }
            word_num += 1;
            word_len = 0;
        }

        if c == '\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    chars.pop();
    LabelledWindow {
        text: chars.into_iter().collect(),
        map: JumpMap { labels },
    }
}

/// Rows covered by the overlay: `radius` rows either side of the cursor,
/// clamped to the document.
pub fn window_rows(cursor_row: usize, line_count: usize, radius: usize) -> RangeInclusive<usize> {
    let last = line_count.saturating_sub(1);
    let row = cursor_row.min(last);
    row.saturating_sub(radius)..=row.saturating_add(radius).min(last)
}

/// Installs the label overlay on a view.
#[derive(Debug, Clone, Copy)]
pub struct JumpLabeler {
    radius: usize,
}

impl JumpLabeler {
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Rewrites the window around the cursor with labels. The returned
    /// overlay must be restored before the view is edited again.
    pub fn install(&self, view: &mut TextView) -> BufferResult<JumpOverlay> {
        let rows = window_rows(view.cursor_position().line, view.line_count(), self.radius);
        let start = Position::new(*rows.start(), 0);
        let end = Position::new(*rows.end(), view.line_len(*rows.end()));

        let window = view.get_text_range(start, end)?;
        let labelled = label_words(&window, *rows.start());
        let original = view.text();
        let history = view.history_snapshot();

        view.silenced()
            .replace_transient(&labelled.text, start, end)?;
        tracing::debug!(
            "Jump overlay on rows {}..={} with {} labels",
            rows.start(),
            rows.end(),
            labelled.map.len()
        );

        Ok(JumpOverlay {
            map: labelled.map,
            rows,
            original,
            history,
        })
    }
}

impl Default for JumpLabeler {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}

/// An installed overlay: the labels and the text they cover.
#[derive(Debug, Clone)]
pub struct JumpOverlay {
    map: JumpMap,
    rows: RangeInclusive<usize>,
    original: String,
    history: History,
}

impl JumpOverlay {
    pub fn map(&self) -> &JumpMap {
        &self.map
    }

    pub fn rows(&self) -> &RangeInclusive<usize> {
        &self.rows
    }

    /// The document as it was before labelling.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Puts the unlabelled text back without raising the change flag and
    /// hands back the labels for matching.
    pub fn restore(self, view: &mut TextView) -> BufferResult<JumpMap> {
        let end = view.buffer().end_position();
        view.silenced()
            .replace_transient(&self.original, Position::ZERO, end)?;
        Ok(self.map)
    }

    /// Restores the text after something edited the labelled document,
    /// and rolls undo/redo back to the moment the labels went up. Edits
    /// made on top of the labels are lost.
    pub fn discard(self, view: &mut TextView) -> BufferResult<()> {
        let end = view.buffer().end_position();
        view.silenced()
            .replace_transient(&self.original, Position::ZERO, end)?;
        view.restore_history(self.history);
        Ok(())
    }
}
