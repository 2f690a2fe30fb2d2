//! Insert-mode bracket and quote pairing.

use subspace_buffer::TextView;

const DEFAULT_PAIRS: [(char, char); 5] = [('(', ')'), ('[', ']'), ('{', '}'), ('\'', '\''), ('"', '"')];

/// Types the closing character along with an opener.
#[derive(Debug, Clone)]
pub struct SelfClosingInserter {
    pairs: Vec<(char, char)>,
    enabled: bool,
}

impl SelfClosingInserter {
    pub fn new(enabled: bool) -> Self {
        Self {
            pairs: DEFAULT_PAIRS.to_vec(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn closing_for(&self, opener: char) -> Option<char> {
        self.pairs
            .iter()
            .find(|(open, _)| *open == opener)
            .map(|(_, close)| *close)
    }

    /// Inserts `opener` and its closer with the cursor between them.
    /// Returns false, touching nothing, for any other character.
    pub fn try_insert(&self, view: &mut TextView, opener: char) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(closer) = self.closing_for(opener) else {
            return false;
        };
        view.insert(&format!("{}{}", opener, closer));
        view.move_relative(-1);
        true
    }
}

impl Default for SelfClosingInserter {
    fn default() -> Self {
        Self::new(true)
    }
}
