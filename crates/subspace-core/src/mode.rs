//! Insert/Command mode and the locate accumulator.
//!
//! ## Learning: Traits at the Platform Seam
//!
//! Whether the secondary modifier is latched is a platform question (an
//! LED, a window-system flag, a toggle key). The controller only sees a
//! [`ModifierKeyReader`]; the binary picks one at startup and tests inject
//! a [`SharedLatch`].
//!
//! The mode is sampled on every keystroke, never cached between them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::command::Command;
use crate::config::{KeyboardConfig, ModifierSource};
use crate::jump::LOCATE_KEY;
use crate::keymap::KeyPress;
use crate::{CoreError, CoreResult};

/// Editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditorMode {
    /// Keys type text
    #[default]
    Insert,
    /// Keys run commands and feed the locate accumulator
    Command,
}

impl EditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorMode::Insert => "Insert",
            EditorMode::Command => "Command",
        }
    }
}

impl std::fmt::Display for EditorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Modifier Readers ====================

/// Source of the "secondary modifier latched" signal.
pub trait ModifierKeyReader: Send {
    /// True while Command mode is engaged.
    fn is_latched(&self) -> bool;

    /// Sees every key before dispatch. Returns true to consume it.
    fn observe(&mut self, _key: &KeyPress) -> bool {
        false
    }
}

/// Portable reader: a dedicated key flips the latch.
#[derive(Debug, Clone)]
pub struct ToggleKeyReader {
    toggle: KeyPress,
    latched: bool,
}

impl ToggleKeyReader {
    pub fn new(toggle: KeyPress) -> Self {
        Self {
            toggle: toggle.normalized(),
            latched: false,
        }
    }
}

impl ModifierKeyReader for ToggleKeyReader {
    fn is_latched(&self) -> bool {
        self.latched
    }

    fn observe(&mut self, key: &KeyPress) -> bool {
        if key.normalized() == self.toggle {
            self.latched = !self.latched;
            tracing::debug!("Modifier latch toggled: {}", self.latched);
            return true;
        }
        false
    }
}

/// A latch set from outside, e.g. by a host that tracks modifier state in
/// its own event loop.
#[derive(Debug, Clone, Default)]
pub struct SharedLatch(Arc<AtomicBool>);

impl SharedLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, latched: bool) {
        self.0.store(latched, Ordering::Relaxed);
    }
}

impl ModifierKeyReader for SharedLatch {
    fn is_latched(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Reads the Caps Lock LED from sysfs.
#[cfg(target_os = "linux")]
#[derive(Debug, Clone)]
pub struct CapsLockLedReader {
    brightness: std::path::PathBuf,
}

#[cfg(target_os = "linux")]
impl CapsLockLedReader {
    const LEDS_DIR: &'static str = "/sys/class/leds";

    /// Finds the first `*capslock` LED. `None` when the machine has none or
    /// sysfs is unreadable.
    pub fn detect() -> Option<Self> {
        let entries = std::fs::read_dir(Self::LEDS_DIR).ok()?;
        let mut names: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("capslock"))
            })
            .collect();
        names.sort();

        let brightness = names.into_iter().next()?.join("brightness");
        tracing::info!("Using Caps Lock LED at {}", brightness.display());
        Some(Self { brightness })
    }
}

#[cfg(target_os = "linux")]
impl ModifierKeyReader for CapsLockLedReader {
    fn is_latched(&self) -> bool {
        match std::fs::read_to_string(&self.brightness) {
            Ok(value) => value.trim().parse::<u32>().is_ok_and(|v| v > 0),
            Err(e) => {
                tracing::debug!("Caps Lock LED unreadable: {}", e);
                false
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn caps_lock_reader() -> Option<Box<dyn ModifierKeyReader>> {
    CapsLockLedReader::detect().map(|r| Box::new(r) as Box<dyn ModifierKeyReader>)
}

#[cfg(not(target_os = "linux"))]
fn caps_lock_reader() -> Option<Box<dyn ModifierKeyReader>> {
    None
}

/// Builds the reader named by `keyboard.modifier`.
pub fn reader_from_config(config: &KeyboardConfig) -> CoreResult<Box<dyn ModifierKeyReader>> {
    if config.modifier == ModifierSource::CapsLock {
        if let Some(reader) = caps_lock_reader() {
            return Ok(reader);
        }
        tracing::warn!("No Caps Lock LED found, using toggle key {}", config.mode_toggle);
    }

    let toggle = KeyPress::parse(&config.mode_toggle)
        .ok_or_else(|| CoreError::InvalidKey(config.mode_toggle.clone()))?;
    Ok(Box::new(ToggleKeyReader::new(toggle)))
}

// ==================== Controller ====================

/// What a Command-mode keystroke did to the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    /// The locate key opened the accumulator.
    Opened,
    /// The locate key closed it; carries what was typed in between.
    Closed(String),
    /// A character was added while open.
    Appended(char),
    /// Not an accumulator key; look it up in the keymap.
    Passthrough,
}

/// Tracks the mode source, `option_open` and the accumulated input.
pub struct ModeController {
    reader: Box<dyn ModifierKeyReader>,
    option_open: bool,
    accumulator: String,
}

impl ModeController {
    pub fn new(reader: Box<dyn ModifierKeyReader>) -> Self {
        Self {
            reader,
            option_open: false,
            accumulator: String::new(),
        }
    }

    /// Samples the modifier state.
    pub fn mode(&self) -> EditorMode {
        if self.reader.is_latched() {
            EditorMode::Command
        } else {
            EditorMode::Insert
        }
    }

    /// Lets the reader see the key first. True when it was consumed.
    pub fn observe(&mut self, key: &KeyPress) -> bool {
        self.reader.observe(key)
    }

    /// Feeds a Command-mode keystroke.
    ///
    /// The locate key matches in either case, with or without shift.
    pub fn feed(&mut self, key: &KeyPress) -> CommandInput {
        let Some(ch) = key.plain_char() else {
            return CommandInput::Passthrough;
        };

        if ch.eq_ignore_ascii_case(&LOCATE_KEY) {
            if self.option_open {
                self.option_open = false;
                return CommandInput::Closed(std::mem::take(&mut self.accumulator));
            }
            self.option_open = true;
            self.accumulator.clear();
            return CommandInput::Opened;
        }

        if self.option_open {
            self.accumulator.push(ch);
            CommandInput::Appended(ch)
        } else {
            CommandInput::Passthrough
        }
    }

    /// False for restricted commands while the accumulator is open.
    pub fn permits(&self, command: &Command) -> bool {
        !(self.option_open && command.is_restricted())
    }

    /// Closes the accumulator without dispatching it.
    pub fn reset(&mut self) {
        self.option_open = false;
        self.accumulator.clear();
    }

    pub fn is_option_open(&self) -> bool {
        self.option_open
    }

    pub fn accumulator(&self) -> &str {
        &self.accumulator
    }
}

impl std::fmt::Debug for ModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeController")
            .field("mode", &self.mode())
            .field("option_open", &self.option_open)
            .field("accumulator", &self.accumulator)
            .finish()
    }
}
