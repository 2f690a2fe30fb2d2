//! Keyboard mapping and input handling.
//!
//! ## Learning: Lookup Tables over Match Arms
//!
//! Bindings are data: a default table plus whatever `keyboard.bindings`
//! adds. A `HashMap` index from key to binding makes lookup O(1), and user
//! bindings are appended after the defaults so a reverse scan lets them win.

use crate::command::Command;
use crate::config::Config;
use crate::mode::EditorMode;
use crate::{CoreError, CoreResult};
use std::collections::HashMap;
use subspace_buffer::Motion;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool, // Cmd on macOS, Win on Windows
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Ctrl modifier.
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Shift modifier.
    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    /// Returns true if no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.meta
    }

    /// True when a modifier that turns a character into a chord is held.
    pub fn is_chord(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }

    /// Parses modifier tokens like `["ctrl", "shift"]`. Unknown tokens
    /// yield `None`.
    pub fn parse<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut mods = Modifiers::NONE;
        for token in tokens {
            match token.to_lowercase().as_str() {
                "ctrl" | "control" => mods.ctrl = true,
                "alt" | "option" => mods.alt = true,
                "shift" => mods.shift = true,
                "meta" | "cmd" | "win" | "super" => mods.meta = true,
                _ => return None,
            }
        }
        Some(mods)
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.meta {
            #[cfg(target_os = "macos")]
            parts.push("Cmd");
            #[cfg(not(target_os = "macos"))]
            parts.push("Win");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8), // F1-F12
    Space,
}

impl Key {
    /// Parses a key name. Single characters keep their case.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Key::Char(c));
        }

        let lower = s.to_lowercase();
        match lower.as_str() {
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "backspace" | "bs" => Some(Key::Backspace),
            "delete" | "del" => Some(Key::Delete),
            "escape" | "esc" => Some(Key::Escape),
            "up" => Some(Key::Up),
            "down" => Some(Key::Down),
            "left" => Some(Key::Left),
            "right" => Some(Key::Right),
            "home" => Some(Key::Home),
            "end" => Some(Key::End),
            "pageup" | "pgup" => Some(Key::PageUp),
            "pagedown" | "pgdn" => Some(Key::PageDown),
            "space" => Some(Key::Space),
            "plus" => Some(Key::Char('+')),
            _ if lower.starts_with('f') && lower.len() <= 3 => lower[1..]
                .parse()
                .ok()
                .filter(|n| (1..=12).contains(n))
                .map(Key::F),
            _ => None,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Escape => write!(f, "Escape"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PageUp"),
            Key::PageDown => write!(f, "PageDown"),
            Key::F(n) => write!(f, "F{}", n),
            Key::Space => write!(f, "Space"),
        }
    }
}

/// A key press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Creates a new key press.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// An unmodified character.
    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::NONE)
    }

    /// Parses a key string like `"ctrl+s"`, `"G"` or `"f2"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').collect();
        let key = Key::parse(parts.pop()?)?;
        let modifiers = Modifiers::parse(parts)?;
        Some(Self { key, modifiers })
    }

    /// Parses a whitespace-separated key script.
    pub fn parse_sequence(script: &str) -> CoreResult<Vec<Self>> {
        script
            .split_whitespace()
            .map(|token| Self::parse(token).ok_or_else(|| CoreError::InvalidKey(token.to_string())))
            .collect()
    }

    /// Canonical form used for binding lookup. A character key already
    /// carries its case, so shift is dropped; chords match either case.
    pub fn normalized(&self) -> Self {
        match self.key {
            Key::Char(c) => {
                let mut modifiers = self.modifiers;
                modifiers.shift = false;
                let c = if modifiers.is_chord() {
                    c.to_ascii_lowercase()
                } else {
                    c
                };
                Self::new(Key::Char(c), modifiers)
            }
            _ => *self,
        }
    }

    /// The form Command mode matches on: [`normalized`](Self::normalized)
    /// with plain letters upper-cased.
    pub fn command_folded(&self) -> Self {
        let mut key = self.normalized();
        if let Key::Char(c) = key.key {
            if !key.modifiers.is_chord() {
                key.key = Key::Char(c.to_ascii_uppercase());
            }
        }
        key
    }

    /// The character of a plain (non-chord) character or space key.
    pub fn plain_char(&self) -> Option<char> {
        if self.modifiers.is_chord() {
            return None;
        }
        match self.key {
            Key::Char(c) => Some(c),
            Key::Space => Some(' '),
            _ => None,
        }
    }

    /// The text an Insert-mode keystroke types, if any.
    pub fn text_char(&self) -> Option<char> {
        if self.modifiers.is_chord() {
            return None;
        }
        match self.key {
            Key::Enter => Some('\n'),
            Key::Tab => Some('\t'),
            _ => self.plain_char(),
        }
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// A key binding maps a key to a command.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyPress,
    pub command: Command,
    /// Mode(s) in which this binding is active.
    pub modes: Vec<EditorMode>,
}

impl KeyBinding {
    /// A binding active in both modes.
    pub fn global(key: KeyPress, command: Command) -> Self {
        Self {
            key: key.normalized(),
            command,
            modes: vec![EditorMode::Insert, EditorMode::Command],
        }
    }

    /// Creates a mode-specific binding.
    pub fn for_mode(key: KeyPress, command: Command, mode: EditorMode) -> Self {
        let key = match mode {
            EditorMode::Command => key.command_folded(),
            EditorMode::Insert => key.normalized(),
        };
        Self {
            key,
            command,
            modes: vec![mode],
        }
    }

    /// Parses a `keyboard.bindings` entry. The key may carry a mode
    /// prefix, `"command:K"` or `"insert:ctrl+k"`; without one the binding
    /// is global.
    pub fn from_config_entry(key: &str, command: &str) -> CoreResult<Self> {
        let command =
            Command::parse(command).ok_or_else(|| CoreError::CommandNotFound(command.to_string()))?;

        let (mode, key_str) = match key.split_once(':') {
            Some(("command", rest)) => (Some(EditorMode::Command), rest),
            Some(("insert", rest)) => (Some(EditorMode::Insert), rest),
            _ => (None, key),
        };
        let press = KeyPress::parse(key_str).ok_or_else(|| CoreError::InvalidKey(key.to_string()))?;

        Ok(match mode {
            Some(mode) => Self::for_mode(press, command, mode),
            None => Self::global(press, command),
        })
    }
}

/// Keyboard mapping configuration.
#[derive(Debug, Clone)]
pub struct Keymap {
    /// All key bindings, defaults first.
    bindings: Vec<KeyBinding>,
    /// Index by key for fast lookup.
    by_key: HashMap<KeyPress, Vec<usize>>,
}

impl Keymap {
    /// Creates a new keymap with default bindings.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: Vec::new(),
            by_key: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap.rebuild_index();
        keymap
    }

    /// Creates a keymap from configuration. Entries that do not parse are
    /// logged and skipped.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        let mut entries: Vec<_> = config.keyboard.bindings.iter().collect();
        entries.sort();
        for (key_str, cmd_str) in entries {
            match KeyBinding::from_config_entry(key_str, cmd_str) {
                Ok(binding) => keymap.bindings.push(binding),
                Err(e) => tracing::warn!("Ignoring binding {} = {}: {}", key_str, cmd_str, e),
            }
        }

        keymap.rebuild_index();
        keymap
    }

    /// Adds default key bindings.
    fn add_default_bindings(&mut self) {
        use crate::command::Command::*;
        use EditorMode::Command as Cmd;

        let ctrl = |c| KeyPress::new(Key::Char(c), Modifiers::CTRL);
        let key = |k| KeyPress::new(k, Modifiers::NONE);

        let global = [
            (key(Key::Backspace), DeleteLeft),
            (ctrl('x'), Cut),
            (ctrl('c'), Copy),
            (ctrl('v'), Paste),
            (ctrl('z'), Undo),
            (ctrl('y'), Redo),
            (ctrl('s'), Save),
            (ctrl('j'), Move(Motion::WordLeft)),
            (ctrl('l'), Move(Motion::WordRight)),
            (ctrl('u'), DeleteToLineStart),
            (ctrl('o'), DeleteToLineEndOrLine),
            (key(Key::Up), Move(Motion::Up)),
            (key(Key::Down), Move(Motion::Down)),
            (key(Key::Left), Move(Motion::Left)),
            (key(Key::Right), Move(Motion::Right)),
            (key(Key::Home), Move(Motion::LineStart)),
            (key(Key::End), Move(Motion::LineEnd)),
            (key(Key::PageUp), Move(Motion::PageUp)),
            (key(Key::PageDown), Move(Motion::PageDown)),
        ];
        for (key, cmd) in global {
            self.bindings.push(KeyBinding::global(key, cmd));
        }

        let command_mode = [
            ('I', Move(Motion::Up)),
            ('J', Move(Motion::Left)),
            ('K', Move(Motion::Down)),
            ('L', Move(Motion::Right)),
            (';', Move(Motion::LineEnd)),
            ('H', Move(Motion::LineStart)),
            ('W', Move(Motion::PageUp)),
            ('S', Move(Motion::PageDown)),
            ('V', ToggleSelect),
            ('U', DeleteWordLeft),
            ('O', DeleteWordRight),
            ('C', InsertLinePrefix("#".into())),
            ('>', InsertLinePrefix("\t".into())),
        ];
        for (c, cmd) in command_mode {
            self.bindings.push(KeyBinding::for_mode(KeyPress::char(c), cmd, Cmd));
        }
    }

    /// Rebuilds the key index.
    fn rebuild_index(&mut self) {
        self.by_key.clear();
        for (i, binding) in self.bindings.iter().enumerate() {
            self.by_key.entry(binding.key).or_default().push(i);
        }
    }

    /// Finds the command bound to `key` in `mode`. The most recently added
    /// binding wins.
    ///
    /// Command-mode letters match case-insensitively, so `i` and `I` both
    /// move up whatever the latch does to letter case.
    pub fn lookup(&self, key: &KeyPress, mode: EditorMode) -> Option<&Command> {
        let keys = match mode {
            EditorMode::Insert => vec![key.normalized()],
            EditorMode::Command => {
                // Global bindings keep the case they were written in.
                let folded = key.command_folded();
                let mut keys = vec![folded];
                if let Key::Char(c) = folded.key {
                    keys.push(KeyPress::new(Key::Char(c.to_ascii_lowercase()), folded.modifiers));
                }
                keys
            }
        };

        keys.iter()
            .filter_map(|k| self.by_key.get(k))
            .flatten()
            .copied()
            .filter(|&i| self.bindings[i].modes.contains(&mode))
            .max()
            .map(|i| &self.bindings[i].command)
    }

    /// Returns all bindings.
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Adds a binding that takes precedence over existing ones.
    pub fn add_binding(&mut self, binding: KeyBinding) {
        self.bindings.push(binding);
        self.rebuild_index();
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypress_parse() {
        let kp = KeyPress::parse("ctrl+s").unwrap();
        assert_eq!(kp.key, Key::Char('s'));
        assert!(kp.modifiers.ctrl);

        assert_eq!(KeyPress::parse("F").unwrap().key, Key::Char('F'));
        assert_eq!(KeyPress::parse("f2").unwrap().key, Key::F(2));
        assert_eq!(KeyPress::parse("ctrl+plus").unwrap().key, Key::Char('+'));
        assert!(KeyPress::parse("hyper+x").is_none());
        assert!(KeyPress::parse("f42").is_none());
    }

    #[test]
    fn test_parse_sequence() {
        let keys = KeyPress::parse_sequence("G 5 G  space\nctrl+s").unwrap();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[3].key, Key::Space);

        assert!(matches!(
            KeyPress::parse_sequence("G bogus"),
            Err(CoreError::InvalidKey(token)) if token == "bogus"
        ));
    }

    #[test]
    fn test_text_char() {
        assert_eq!(KeyPress::char('a').text_char(), Some('a'));
        assert_eq!(KeyPress::parse("enter").unwrap().text_char(), Some('\n'));
        assert_eq!(KeyPress::parse("tab").unwrap().text_char(), Some('\t'));
        assert_eq!(KeyPress::parse("ctrl+a").unwrap().text_char(), None);
        assert_eq!(KeyPress::parse("f2").unwrap().text_char(), None);
    }

    #[test]
    fn test_default_lookup_by_mode() {
        let keymap = Keymap::new();
        let save = KeyPress::parse("ctrl+s").unwrap();
        assert_eq!(keymap.lookup(&save, EditorMode::Insert), Some(&Command::Save));
        assert_eq!(keymap.lookup(&save, EditorMode::Command), Some(&Command::Save));

        let i = KeyPress::char('I');
        assert_eq!(
            keymap.lookup(&i, EditorMode::Command),
            Some(&Command::Move(Motion::Up))
        );
        assert_eq!(keymap.lookup(&i, EditorMode::Insert), None);
    }

    #[test]
    fn test_command_letters_fold_case() {
        let keymap = Keymap::new();
        let lower = KeyPress::char('c');
        assert_eq!(
            keymap.lookup(&lower, EditorMode::Command),
            Some(&Command::InsertLinePrefix("#".into()))
        );
        let shifted = KeyPress::new(Key::Char('>'), Modifiers::SHIFT);
        assert_eq!(
            keymap.lookup(&shifted, EditorMode::Command),
            Some(&Command::InsertLinePrefix("\t".into()))
        );
        let chord = KeyPress::parse("ctrl+S").unwrap();
        assert_eq!(keymap.lookup(&chord, EditorMode::Insert), Some(&Command::Save));
    }

    #[test]
    fn test_lowercase_command_bindings_match() {
        let mut config = Config::default();
        config
            .keyboard
            .bindings
            .insert("command:k".into(), "move_up".into());
        config.keyboard.bindings.insert("q".into(), "undo".into());

        let keymap = Keymap::from_config(&config);
        for c in ['k', 'K'] {
            assert_eq!(
                keymap.lookup(&KeyPress::char(c), EditorMode::Command),
                Some(&Command::Move(Motion::Up))
            );
        }
        assert_eq!(keymap.lookup(&KeyPress::char('k'), EditorMode::Insert), None);
        assert_eq!(
            keymap.lookup(&KeyPress::char('Q'), EditorMode::Command),
            Some(&Command::Undo)
        );
        assert_eq!(
            keymap.lookup(&KeyPress::char('q'), EditorMode::Insert),
            Some(&Command::Undo)
        );
        // Untouched defaults still answer to either case.
        assert_eq!(
            keymap.lookup(&KeyPress::char('i'), EditorMode::Command),
            Some(&Command::Move(Motion::Up))
        );
    }

    #[test]
    fn test_user_bindings_override_defaults() {
        let mut config = Config::default();
        config
            .keyboard
            .bindings
            .insert("ctrl+s".into(), "undo".into());
        config
            .keyboard
            .bindings
            .insert("command:X".into(), "insert_line_prefix://".into());
        config
            .keyboard
            .bindings
            .insert("ctrl+q".into(), "launch_rockets".into());

        let keymap = Keymap::from_config(&config);
        let save = KeyPress::parse("ctrl+s").unwrap();
        assert_eq!(keymap.lookup(&save, EditorMode::Insert), Some(&Command::Undo));
        assert_eq!(
            keymap.lookup(&KeyPress::char('X'), EditorMode::Command),
            Some(&Command::InsertLinePrefix("//".into()))
        );
        assert_eq!(keymap.lookup(&KeyPress::char('X'), EditorMode::Insert), None);
        assert_eq!(
            keymap.lookup(&KeyPress::parse("ctrl+q").unwrap(), EditorMode::Insert),
            None
        );
    }
}
