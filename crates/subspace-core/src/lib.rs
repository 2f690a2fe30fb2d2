//! # Subspace Core
//!
//! Modal editing logic on top of `subspace-buffer`.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     EditorSession                         │
//! │  ┌────────────────┐ ┌──────────┐ ┌─────────────────────┐  │
//! │  │ ModeController │ │  Keymap  │ │      EventBus       │  │
//! │  └───────┬────────┘ └────┬─────┘ └─────────────────────┘  │
//! │          │ locate        │ commands                       │
//! │  ┌───────┴──────┐ ┌──────┴───────┐ ┌────────────────────┐ │
//! │  │ JumpLabeler  │ │   TextView   │ │    BufferStore     │ │
//! │  │ / goto_line  │ │ (primitives) │ │  path → {text,     │ │
//! │  └──────────────┘ └──────────────┘ │        saved}      │ │
//! │                                    └────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every keystroke enters through [`EditorSession::handle_key`]. The mode is
//! sampled from a [`ModifierKeyReader`] per keystroke; Command mode feeds the
//! locate accumulator or runs a binding, Insert mode types text.

pub mod auto_pair;
pub mod buffer_store;
pub mod command;
pub mod config;
pub mod editor;
pub mod event;
pub mod goto;
pub mod jump;
pub mod keymap;
pub mod line_prefix;
pub mod mode;

use std::path::PathBuf;

pub use auto_pair::SelfClosingInserter;
pub use buffer_store::{Buffer, BufferStore, OpenOutcome};
pub use command::Command;
pub use config::{Config, ConfigError};
pub use editor::{BufferStatus, EditorSession, KeyOutcome};
pub use event::{EditorEvent, EventBus, EventHandler};
pub use goto::{goto_line, target_line};
pub use jump::{JumpLabeler, JumpMap, JumpOverlay, LABEL_ALPHABET, LOCATE_KEY};
pub use keymap::{Key, KeyBinding, KeyPress, Keymap, Modifiers};
pub use line_prefix::insert_line_prefix;
pub use mode::{CommandInput, EditorMode, ModeController, ModifierKeyReader, ToggleKeyReader};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No active buffer")]
    NoActiveBuffer,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Buffer error: {0}")]
    Buffer(#[from] subspace_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Unknown command: {0}")]
    CommandNotFound(String),
}

impl CoreError {
    /// True for failures of the file system rather than of editor state.
    pub fn is_io(&self) -> bool {
        matches!(self, CoreError::Read { .. } | CoreError::Write { .. })
    }
}
