//! Commands bound to keys.
//!
//! ## Learning: The Command Pattern
//!
//! Actions are plain enum values: the keymap stores them, the mode
//! controller inspects them (see [`Command::is_restricted`]) and the session
//! executes them. The set is closed, so every match over it is exhaustive.

use std::fmt;

use subspace_buffer::Motion;

/// Built-in editor commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // Cursor
    Move(Motion),
    ToggleSelect,

    // Deletion
    DeleteLeft,
    DeleteWordLeft,
    DeleteWordRight,
    DeleteToLineStart,
    DeleteToLineEndOrLine,

    /// Insert a literal at column 0 of every selected row.
    InsertLinePrefix(String),

    // Clipboard and history
    Cut,
    Copy,
    Paste,
    Undo,
    Redo,

    // File
    Save,
}

impl Command {
    /// Commands disabled while the locate accumulator is open.
    pub fn is_restricted(&self) -> bool {
        matches!(
            self,
            Command::Move(_)
                | Command::ToggleSelect
                | Command::DeleteWordLeft
                | Command::DeleteWordRight
                | Command::DeleteToLineStart
                | Command::DeleteToLineEndOrLine
                | Command::InsertLinePrefix(_)
        )
    }

    /// Returns the command's display name.
    pub fn display_name(&self) -> String {
        match self {
            Command::Move(motion) => format!("Move {}", motion.as_str().replace('_', " ")),
            Command::ToggleSelect => "Toggle Select".into(),
            Command::DeleteLeft => "Delete Left".into(),
            Command::DeleteWordLeft => "Delete Word Left".into(),
            Command::DeleteWordRight => "Delete Word Right".into(),
            Command::DeleteToLineStart => "Delete to Line Start".into(),
            Command::DeleteToLineEndOrLine => "Delete to Line End".into(),
            Command::InsertLinePrefix(prefix) => format!("Insert Line Prefix {:?}", prefix),
            Command::Cut => "Cut".into(),
            Command::Copy => "Copy".into(),
            Command::Paste => "Paste".into(),
            Command::Undo => "Undo".into(),
            Command::Redo => "Redo".into(),
            Command::Save => "Save".into(),
        }
    }

    /// Parses a command name as written in `keyboard.bindings`.
    ///
    /// Motions are `move_<motion>` (`move_up`, `move_word_left`, ...); the
    /// prefix command carries its literal after a colon,
    /// `insert_line_prefix:#`.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(prefix) = s.strip_prefix("insert_line_prefix:") {
            if prefix.is_empty() {
                return None;
            }
            return Some(Command::InsertLinePrefix(unescape(prefix)));
        }
        if let Some(motion) = s.strip_prefix("move_") {
            return Motion::parse(motion).map(Command::Move);
        }

        Some(match s {
            "toggle_select" => Command::ToggleSelect,
            "delete_left" => Command::DeleteLeft,
            "delete_word_left" => Command::DeleteWordLeft,
            "delete_word_right" => Command::DeleteWordRight,
            "delete_to_line_start" => Command::DeleteToLineStart,
            "delete_to_line_end" => Command::DeleteToLineEndOrLine,
            "cut" => Command::Cut,
            "copy" => Command::Copy,
            "paste" => Command::Paste,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "save" => Command::Save,
            _ => return None,
        })
    }
}

/// Formats as the name [`Command::parse`] accepts.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(motion) => write!(f, "move_{}", motion.as_str()),
            Command::InsertLinePrefix(prefix) => {
                write!(f, "insert_line_prefix:{}", prefix.replace('\t', "\\t"))
            }
            Command::ToggleSelect => f.write_str("toggle_select"),
            Command::DeleteLeft => f.write_str("delete_left"),
            Command::DeleteWordLeft => f.write_str("delete_word_left"),
            Command::DeleteWordRight => f.write_str("delete_word_right"),
            Command::DeleteToLineStart => f.write_str("delete_to_line_start"),
            Command::DeleteToLineEndOrLine => f.write_str("delete_to_line_end"),
            Command::Cut => f.write_str("cut"),
            Command::Copy => f.write_str("copy"),
            Command::Paste => f.write_str("paste"),
            Command::Undo => f.write_str("undo"),
            Command::Redo => f.write_str("redo"),
            Command::Save => f.write_str("save"),
        }
    }
}

// `\t` in a binding name stands for a tab.
fn unescape(s: &str) -> String {
    s.replace("\\t", "\t")
}
