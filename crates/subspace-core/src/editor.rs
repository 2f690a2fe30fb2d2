//! The editing session.
//!
//! ## Learning: The Facade Pattern
//!
//! `EditorSession` is the only type a host talks to. It owns the visible
//! [`TextView`], the [`BufferStore`], the mode controller and the jump
//! overlay, and routes every keystroke through them in a fixed order:
//!
//! 1. the modifier reader may consume the key (a toggle key);
//! 2. the mode is sampled;
//! 3. Command mode feeds the locate accumulator or runs a binding, Insert
//!    mode runs a binding or types;
//! 4. if the view changed, the current buffer records the new text.
//!
//! Whenever a key leaves the session with no overlay installed, the view
//! shows exactly the current buffer's text.

use std::path::{Path, PathBuf};

use subspace_buffer::TextView;

use crate::auto_pair::SelfClosingInserter;
use crate::buffer_store::{BufferStore, OpenOutcome};
use crate::command::Command;
use crate::config::Config;
use crate::event::{EditorEvent, EventBus};
use crate::goto::goto_line;
use crate::jump::{JumpLabeler, JumpMap, JumpOverlay};
use crate::keymap::{KeyPress, Keymap};
use crate::line_prefix::insert_line_prefix;
use crate::mode::{self, CommandInput, EditorMode, ModeController, ModifierKeyReader};
use crate::CoreResult;

/// The title indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferStatus {
    /// Nothing opened yet
    #[default]
    NoFile,
    Saved,
    Unsaved,
}

impl BufferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BufferStatus::NoFile => "No file selected...",
            BufferStatus::Saved => "Saved",
            BufferStatus::Unsaved => "Unsaved",
        }
    }
}

/// What [`EditorSession::handle_key`] did with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key had an effect.
    Handled,
    /// A restricted command was refused while the accumulator is open.
    Blocked,
    /// Nothing is bound to the key in the current mode.
    Ignored,
}

/// One editing session: every piece of editor state lives here.
pub struct EditorSession {
    view: TextView,
    store: BufferStore,
    modes: ModeController,
    keymap: Keymap,
    labeler: JumpLabeler,
    pairs: SelfClosingInserter,
    /// Present only while the label overlay is on screen.
    jump: Option<JumpOverlay>,
    config: Config,
    event_bus: EventBus,
    status: BufferStatus,
    last_mode: EditorMode,
}

impl EditorSession {
    /// Creates a session reading the mode from `reader`.
    pub fn new(config: Config, reader: Box<dyn ModifierKeyReader>) -> Self {
        let editor = &config.editor;
        Self {
            view: TextView::with_history_limit(editor.viewport_height, editor.undo_limit),
            store: BufferStore::with_atomic_save(config.files.atomic_save),
            modes: ModeController::new(reader),
            keymap: Keymap::from_config(&config),
            labeler: JumpLabeler::new(editor.jump_radius),
            pairs: SelfClosingInserter::new(editor.auto_close),
            jump: None,
            event_bus: EventBus::new(),
            status: BufferStatus::NoFile,
            last_mode: EditorMode::Insert,
            config,
        }
    }

    /// Creates a session with the modifier reader named in the config.
    pub fn from_config(config: Config) -> CoreResult<Self> {
        let reader = mode::reader_from_config(&config.keyboard)?;
        Ok(Self::new(config, reader))
    }

    // ==================== Input ====================

    /// Processes one keystroke to completion.
    pub fn handle_key(&mut self, key: &KeyPress) -> CoreResult<KeyOutcome> {
        if self.modes.observe(key) {
            self.sample_mode()?;
            return Ok(KeyOutcome::Handled);
        }

        let result = match self.sample_mode() {
            Ok(EditorMode::Command) => self.handle_command_key(key),
            Ok(EditorMode::Insert) => self.handle_insert_key(key),
            Err(e) => Err(e),
        };
        self.flush_changes();
        result
    }

    /// Reads the mode. Leaving Command mode closes the accumulator and
    /// removes the overlay.
    fn sample_mode(&mut self) -> CoreResult<EditorMode> {
        let mode = self.modes.mode();
        if mode != self.last_mode {
            tracing::debug!("Mode: {}", mode);
            self.last_mode = mode;
            if mode == EditorMode::Insert {
                self.cancel_locate()?;
            }
            self.emit(EditorEvent::ModeChanged(mode));
        }
        Ok(mode)
    }

    fn handle_command_key(&mut self, key: &KeyPress) -> CoreResult<KeyOutcome> {
        match self.modes.feed(key) {
            CommandInput::Opened => {
                self.open_locate()?;
                Ok(KeyOutcome::Handled)
            }
            CommandInput::Closed(input) => {
                self.close_locate(&input)?;
                Ok(KeyOutcome::Handled)
            }
            CommandInput::Appended(_) => Ok(KeyOutcome::Handled),
            CommandInput::Passthrough => {
                let Some(command) = self.keymap.lookup(key, EditorMode::Command).cloned() else {
                    return Ok(KeyOutcome::Ignored);
                };
                if !self.modes.permits(&command) {
                    tracing::debug!("{} blocked while locate is open", command.display_name());
                    return Ok(KeyOutcome::Blocked);
                }
                self.cancel_locate()?;
                self.run(&command)?;
                Ok(KeyOutcome::Handled)
            }
        }
    }

    fn handle_insert_key(&mut self, key: &KeyPress) -> CoreResult<KeyOutcome> {
        self.cancel_locate()?;

        if let Some(command) = self.keymap.lookup(key, EditorMode::Insert).cloned() {
            self.run(&command)?;
            return Ok(KeyOutcome::Handled);
        }

        let Some(ch) = key.text_char() else {
            return Ok(KeyOutcome::Ignored);
        };
        if !self.pairs.try_insert(&mut self.view, ch) {
            self.view.insert(ch.encode_utf8(&mut [0; 4]));
        }
        Ok(KeyOutcome::Handled)
    }

    // ==================== Locate ====================

    fn open_locate(&mut self) -> CoreResult<()> {
        match self.labeler.install(&mut self.view) {
            Ok(overlay) => {
                let labels = overlay.map().len();
                self.jump = Some(overlay);
                self.emit(EditorEvent::LocateOpened { labels });
                Ok(())
            }
            Err(e) => {
                self.modes.reset();
                Err(e.into())
            }
        }
    }

    /// Removes the overlay, then acts on what was typed: a line number
    /// jumps there, a known label jumps to its word, an unknown label
    /// nudges the cursor right and empty input nudges it left.
    fn close_locate(&mut self, input: &str) -> CoreResult<()> {
        let map = self.take_overlay()?;

        if input.is_empty() {
            tracing::debug!("Locate closed without input");
            self.view.move_relative(-1);
        } else if let Some(row) = goto_line(&mut self.view, input) {
            tracing::debug!("Jumped to row {}", row);
        } else if input.chars().all(char::is_alphabetic) {
            match map.as_ref().filter(|m| !m.is_empty()) {
                None => self.view.move_relative(-1),
                Some(map) => match map.get(input) {
                    Some(target) => self.view.move_to(target, true),
                    None => {
                        tracing::debug!("No word labelled {:?}", input);
                        self.view.move_relative(1);
                    }
                },
            }
        } else {
            tracing::debug!("Discarding locate input {:?}", input);
        }
        Ok(())
    }

    /// Closes the accumulator without dispatching and removes any overlay.
    fn cancel_locate(&mut self) -> CoreResult<()> {
        self.modes.reset();
        if self.take_overlay()?.is_some() {
            tracing::debug!("Locate cancelled");
        }
        Ok(())
    }

    fn take_overlay(&mut self) -> CoreResult<Option<JumpMap>> {
        let Some(overlay) = self.jump.take() else {
            return Ok(None);
        };
        let map = overlay.restore(&mut self.view)?;
        self.emit(EditorEvent::LocateClosed);
        Ok(Some(map))
    }

    // ==================== Commands ====================

    /// Runs a command as if its key had been pressed.
    pub fn execute(&mut self, command: &Command) -> CoreResult<()> {
        if !self.modes.permits(command) {
            tracing::debug!("{} blocked while locate is open", command.display_name());
            return Ok(());
        }
        self.cancel_locate()?;
        let result = self.run(command);
        self.flush_changes();
        result
    }

    fn run(&mut self, command: &Command) -> CoreResult<()> {
        tracing::trace!("Running {}", command);
        if *command == Command::Save {
            return self.save();
        }

        let view = &mut self.view;
        match command {
            Command::Move(motion) => view.move_cursor(*motion),
            Command::ToggleSelect => view.toggle_select(),
            Command::DeleteLeft => view.delete_left(),
            Command::DeleteWordLeft => view.delete_word_left(),
            Command::DeleteWordRight => view.delete_word_right(),
            Command::DeleteToLineStart => view.delete_to_start_of_line(),
            Command::DeleteToLineEndOrLine => view.delete_to_end_of_line_or_delete_line(),
            Command::InsertLinePrefix(prefix) => insert_line_prefix(view, prefix)?,
            Command::Cut => view.cut(),
            Command::Copy => view.copy(),
            Command::Paste => view.paste(),
            Command::Undo => {
                if let Err(e) = view.undo() {
                    tracing::debug!("{}", e);
                }
            }
            Command::Redo => {
                if let Err(e) = view.redo() {
                    tracing::debug!("{}", e);
                }
            }
            Command::Save => {}
        }
        Ok(())
    }

    // ==================== Buffers ====================

    /// Makes `path` the visible buffer, reading it on first open.
    ///
    /// The view is replaced without counting as an edit. On a read error
    /// the session is left as it was.
    pub fn swap_file(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        self.cancel_locate()?;

        let outcome = self.store.open(path.as_ref()).inspect_err(|e| {
            tracing::warn!("{}", e);
        })?;
        let (text, saved, path) = match (self.store.current(), self.store.current_path()) {
            (Some(buffer), Some(path)) => (
                buffer.text().to_string(),
                buffer.is_saved(),
                path.to_path_buf(),
            ),
            _ => return Err(crate::CoreError::NoActiveBuffer),
        };

        self.view.silenced().load_text(&text);
        self.set_status(if saved {
            BufferStatus::Saved
        } else {
            BufferStatus::Unsaved
        });
        self.emit(match outcome {
            OpenOutcome::Loaded => EditorEvent::BufferOpened(path),
            OpenOutcome::Switched => EditorEvent::BufferSwitched(path),
        });
        Ok(())
    }

    /// Writes the current buffer. A no-op when nothing is open.
    pub fn save(&mut self) -> CoreResult<()> {
        self.cancel_locate()?;

        match self.store.save() {
            Ok(Some(path)) => {
                self.set_status(BufferStatus::Saved);
                self.emit(EditorEvent::BufferSaved(path));
                self.emit(EditorEvent::Notification {
                    message: "File saved.".to_string(),
                    timeout: self.config.ui.notification_timeout(),
                });
                Ok(())
            }
            Ok(None) => {
                tracing::debug!("Save with no file open");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{}", e);
                Err(e)
            }
        }
    }

    /// Applies a change of the visible document.
    ///
    /// A change while the overlay is installed came from labelled text:
    /// the true text and its undo history are put back and the overlay is
    /// dropped, all without touching the buffer. Otherwise the current
    /// buffer takes the new text and becomes unsaved.
    pub fn on_document_changed(&mut self) {
        if let Some(overlay) = self.jump.take() {
            tracing::warn!("Edit while labels were shown, restoring text");
            if let Err(e) = overlay.discard(&mut self.view) {
                tracing::warn!("Failed to restore text: {}", e);
            }
            self.modes.reset();
            self.emit(EditorEvent::LocateClosed);
            return;
        }

        let Some(path) = self.store.current_path().map(Path::to_path_buf) else {
            return;
        };
        self.store.record_edit(self.view.text());
        self.set_status(BufferStatus::Unsaved);
        self.emit(EditorEvent::BufferChanged(path));
    }

    /// Runs `f` against the view as an external widget would, then
    /// processes any change it made.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut TextView) -> R) -> R {
        let result = f(&mut self.view);
        self.flush_changes();
        result
    }

    fn flush_changes(&mut self) {
        if self.view.take_changed() {
            self.on_document_changed();
        }
    }

    fn set_status(&mut self, status: BufferStatus) {
        if self.status != status {
            self.status = status;
            self.emit(EditorEvent::TitleChanged(status.as_str().to_string()));
        }
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }

    // ==================== Accessors ====================

    pub fn view(&self) -> &TextView {
        &self.view
    }

    pub fn buffers(&self) -> &BufferStore {
        &self.store
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.store.current_path().map(Path::to_path_buf)
    }

    /// Samples the mode without processing a key.
    pub fn mode(&self) -> EditorMode {
        self.modes.mode()
    }

    pub fn status(&self) -> BufferStatus {
        self.status
    }

    /// The title indicator text.
    pub fn title(&self) -> &'static str {
        self.status.as_str()
    }

    pub fn jump_map(&self) -> Option<&JumpMap> {
        self.jump.as_ref().map(JumpOverlay::map)
    }

    pub fn is_locate_open(&self) -> bool {
        self.modes.is_option_open()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventHandler;
    use crate::mode::{SharedLatch, ToggleKeyReader};
    use super::KeyOutcome::*;
    use std::fs;
    use subspace_buffer::Position;

    struct Fixture {
        _dir: tempfile::TempDir,
        path: PathBuf,
        latch: SharedLatch,
        session: EditorSession,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("doc.txt");
            fs::write(&path, text).unwrap();

            let latch = SharedLatch::new();
            let mut session = EditorSession::new(Config::default(), Box::new(latch.clone()));
            session.swap_file(&path).unwrap();
            Self {
                _dir: dir,
                path,
                latch,
                session,
            }
        }

        fn keys(&mut self, script: &str) -> Vec<KeyOutcome> {
            KeyPress::parse_sequence(script)
                .unwrap()
                .iter()
                .map(|key| self.session.handle_key(key).unwrap())
                .collect()
        }

        fn command(&mut self, script: &str) -> Vec<KeyOutcome> {
            self.latch.set(true);
            let outcomes = self.keys(script);
            self.latch.set(false);
            outcomes
        }

        fn cursor(&self) -> Position {
            self.session.view().cursor_position()
        }

        fn text(&self) -> String {
            self.session.view().text()
        }

        fn saved(&self) -> bool {
            self.session.buffers().current().unwrap().is_saved()
        }
    }

    fn lines(n: usize) -> String {
        (1..=n).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_title_before_open() {
        let session = EditorSession::new(Config::default(), Box::new(SharedLatch::new()));
        assert_eq!(session.title(), "No file selected...");
        assert_eq!(session.mode().as_str(), "Insert");
    }

    #[test]
    fn test_typing_without_file_tracks_nothing() {
        let mut session = EditorSession::new(Config::default(), Box::new(SharedLatch::new()));
        session.handle_key(&KeyPress::char('x')).unwrap();
        assert_eq!(session.view().text(), "x");
        assert_eq!(session.status(), BufferStatus::NoFile);
        assert_eq!(session.save().ok(), Some(()));
    }

    #[test]
    fn test_saved_iff_no_edit_since_load_or_save() {
        let mut fx = Fixture::new("hello");
        assert!(fx.saved());
        assert_eq!(fx.session.title(), "Saved");

        fx.keys("x");
        assert!(!fx.saved());
        assert_eq!(fx.session.title(), "Unsaved");
        assert_eq!(fx.session.buffers().current().unwrap().text(), "xhello");

        fx.keys("ctrl+s");
        assert!(fx.saved());
        assert_eq!(fx.session.title(), "Saved");
        assert_eq!(fs::read_to_string(&fx.path).unwrap(), "xhello");
    }

    #[test]
    fn test_save_then_reopen_in_fresh_session() {
        let mut fx = Fixture::new("one\ntwo");
        fx.keys("a b enter");
        fx.session.save().unwrap();

        let mut fresh = EditorSession::new(Config::default(), Box::new(SharedLatch::new()));
        fresh.swap_file(&fx.path).unwrap();
        assert_eq!(fresh.view().text(), fx.text());
        assert_eq!(fresh.view().text(), "ab\none\ntwo");
    }

    #[test]
    fn test_failed_save_keeps_unsaved() {
        let mut fx = Fixture::new("hello");
        fx.keys("x");
        fs::remove_file(&fx.path).unwrap();
        fs::create_dir(&fx.path).unwrap();

        assert!(fx.session.save().unwrap_err().is_io());
        assert!(!fx.saved());
        assert_eq!(fx.session.title(), "Unsaved");
    }

    #[test]
    fn test_swap_between_buffers() {
        let mut fx = Fixture::new("first");
        let other = fx.path.with_file_name("other.txt");
        fs::write(&other, "second").unwrap();

        fx.keys("!");
        fx.session.swap_file(&other).unwrap();
        assert_eq!(fx.text(), "second");
        assert_eq!(fx.session.title(), "Saved");

        fx.session.swap_file(&fx.path).unwrap();
        assert_eq!(fx.text(), "!first");
        assert_eq!(fx.session.title(), "Unsaved");
        assert_eq!(fx.session.buffers().len(), 2);
        // Swapping is not an edit.
        assert!(fx.session.buffers().get(&other).unwrap().is_saved());
    }

    #[test]
    fn test_swap_to_missing_file_changes_nothing() {
        let mut fx = Fixture::new("first");
        let missing = fx.path.with_file_name("missing.txt");
        assert!(fx.session.swap_file(&missing).is_err());
        assert_eq!(fx.text(), "first");
        assert_eq!(fx.session.buffers().len(), 1);
    }

    #[test]
    fn test_goto_line() {
        let mut fx = Fixture::new(&lines(30));
        fx.command("G 5 G");
        assert_eq!(fx.cursor(), Position::new(4, 0));

        fx.command("G 8 0 G");
        assert_eq!(fx.cursor(), Position::new(29, 0));

        fx.command("G 1 G");
        assert_eq!(fx.cursor(), Position::ZERO);
        assert!(fx.saved());
        assert_eq!(fx.text(), lines(30));
    }

    #[test]
    fn test_empty_locate_restores_and_nudges_left() {
        let mut fx = Fixture::new(&lines(30));
        fx.session.edit(|v| v.move_to(Position::new(15, 3), false));

        fx.command("G");
        assert!(fx.session.is_locate_open());
        assert_ne!(fx.text(), lines(30));
        assert!(fx.session.jump_map().is_some());

        fx.command("G");
        assert_eq!(fx.text(), lines(30));
        assert!(fx.session.jump_map().is_none());
        assert_eq!(fx.cursor(), Position::new(15, 2));
        assert!(fx.saved());
    }

    #[test]
    fn test_jump_to_label() {
        let mut fx = Fixture::new("alpha beta\ngamma delta");
        fx.command("G");
        let map = fx.session.jump_map().unwrap();
        assert_eq!(map.get("AB"), Some(Position::new(0, 6)));
        assert_eq!(map.get("AD"), Some(Position::new(1, 6)));

        fx.command("A D G");
        assert_eq!(fx.cursor(), Position::new(1, 6));
        assert_eq!(fx.text(), "alpha beta\ngamma delta");
        assert!(fx.saved());
    }

    #[test]
    fn test_unmapped_label_nudges_right() {
        let mut fx = Fixture::new("alpha beta");
        fx.command("G Z Z G");
        assert_eq!(fx.cursor(), Position::new(0, 1));

        // Mixed input is discarded.
        fx.command("G A 1 G");
        assert_eq!(fx.cursor(), Position::new(0, 1));
        assert_eq!(fx.text(), "alpha beta");
    }

    #[test]
    fn test_letters_without_labels_nudge_left() {
        let mut fx = Fixture::new("a b c\nd");
        fx.session.edit(|v| v.move_to(Position::new(1, 1), false));
        fx.command("G A A G");
        assert_eq!(fx.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_restricted_commands_blocked_while_open() {
        let mut fx = Fixture::new("alpha beta");
        fx.session.edit(|v| v.move_to(Position::new(0, 8), false));

        let outcomes = fx.command("G ctrl+j down ctrl+u");
        assert_eq!(outcomes, vec![Handled, Blocked, Blocked, Blocked]);
        assert!(fx.session.is_locate_open());
        assert_eq!(fx.cursor(), Position::new(0, 8));

        // Backspace is not restricted: the overlay goes, then it deletes.
        fx.command("backspace");
        assert!(!fx.session.is_locate_open());
        assert_eq!(fx.text(), "alpha bta");
        assert!(!fx.saved());
    }

    #[test]
    fn test_command_mode_bindings() {
        let mut fx = Fixture::new("hello world\nsecond");
        fx.command("; K H L L");
        assert_eq!(fx.cursor(), Position::new(1, 2));

        let outcomes = fx.command("( space");
        assert_eq!(outcomes, vec![Ignored, Ignored]);
        assert_eq!(fx.text(), "hello world\nsecond");
    }

    #[test]
    fn test_line_prefix_over_selected_rows() {
        let mut fx = Fixture::new(&lines(8));
        fx.command("G 4 G V K K K C");
        let text = fx.text();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[2], "line 3");
        for row in 3..=6 {
            assert_eq!(rows[row], format!("#line {}", row + 1));
        }
        assert_eq!(rows[7], "line 8");
        assert!(!fx.saved());
    }

    #[test]
    fn test_auto_pair_in_insert_mode_only() {
        let mut fx = Fixture::new("");
        fx.keys("(");
        assert_eq!(fx.text(), "()");
        assert_eq!(fx.cursor(), Position::new(0, 1));

        fx.keys("\" x");
        assert_eq!(fx.text(), "(\"x\")");
    }

    #[test]
    fn test_insert_key_cancels_overlay() {
        let mut fx = Fixture::new("alpha beta");
        fx.command("G");
        fx.keys("x");
        assert!(!fx.session.is_locate_open());
        assert_eq!(fx.text(), "xalpha beta");
        assert_eq!(fx.session.buffers().current().unwrap().text(), "xalpha beta");
    }

    #[test]
    fn test_external_edit_under_overlay_is_discarded() {
        let mut fx = Fixture::new("alpha beta");
        fx.command("G");
        fx.session.edit(|v| v.insert("zz"));

        assert_eq!(fx.text(), "alpha beta");
        assert!(fx.session.jump_map().is_none());
        assert!(!fx.session.is_locate_open());
        assert!(!fx.session.view().buffer().can_undo());
        assert!(fx.saved());
    }

    #[test]
    fn test_external_edit_under_overlay_keeps_prior_undo() {
        let mut fx = Fixture::new("alpha beta");
        fx.keys("x");
        fx.command("G");
        fx.session.edit(|v| v.insert("zz"));

        assert_eq!(fx.text(), "xalpha beta");
        fx.keys("ctrl+z");
        assert_eq!(fx.text(), "alpha beta");
    }

    #[test]
    fn test_leaving_command_mode_removes_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "alpha beta").unwrap();

        let reader = ToggleKeyReader::new(KeyPress::parse("f2").unwrap());
        let mut session = EditorSession::new(Config::default(), Box::new(reader));
        session.swap_file(&path).unwrap();

        for key in KeyPress::parse_sequence("f2 G").unwrap() {
            session.handle_key(&key).unwrap();
        }
        assert_eq!(session.view().text(), "AApha ABta");

        session.handle_key(&KeyPress::parse("f2").unwrap()).unwrap();
        assert_eq!(session.mode(), EditorMode::Insert);
        assert_eq!(session.view().text(), "alpha beta");
        assert!(session.jump_map().is_none());
        assert!(!session.is_locate_open());

        session.edit(|v| v.insert("zz"));
        assert_eq!(session.view().text(), "zzalpha beta");
        assert_eq!(session.buffers().current().unwrap().text(), "zzalpha beta");
        assert_eq!(session.status(), BufferStatus::Unsaved);
    }

    #[test]
    fn test_save_while_open_writes_true_text() {
        let mut fx = Fixture::new("alpha beta");
        fx.keys("x");
        fx.command("G ctrl+s");
        assert_eq!(fs::read_to_string(&fx.path).unwrap(), "xalpha beta");
        assert_eq!(fx.text(), "xalpha beta");
        assert!(fx.saved());
    }

    #[test]
    fn test_undo_returns_to_loaded_text() {
        let mut fx = Fixture::new("abc");
        fx.keys("x y");
        fx.keys("ctrl+z");
        assert_eq!(fx.text(), "abc");
        // Undo past the start is a no-op.
        assert_eq!(fx.keys("ctrl+z"), vec![Handled]);
    }

    #[test]
    fn test_events() {
        let mut fx = Fixture::new("abc");
        let mut events = EventHandler::new(fx.session.subscribe());

        fx.keys("x");
        fx.command("G G");
        fx.session.save().unwrap();

        let mut seen = Vec::new();
        while let Some(event) = events.try_next() {
            seen.push(event);
        }
        let path = fx.session.current_path().unwrap();
        assert_eq!(
            seen,
            vec![
                EditorEvent::TitleChanged("Unsaved".into()),
                EditorEvent::BufferChanged(path.clone()),
                EditorEvent::ModeChanged(EditorMode::Command),
                EditorEvent::LocateOpened { labels: 1 },
                EditorEvent::LocateClosed,
                EditorEvent::TitleChanged("Saved".into()),
                EditorEvent::BufferSaved(path),
                EditorEvent::Notification {
                    message: "File saved.".into(),
                    timeout: std::time::Duration::from_millis(3000),
                },
            ]
        );
    }

    #[test]
    fn test_toggle_key_switches_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, &lines(10)).unwrap();

        let reader = ToggleKeyReader::new(KeyPress::parse("f2").unwrap());
        let mut session = EditorSession::new(Config::default(), Box::new(reader));
        session.swap_file(&path).unwrap();

        for key in KeyPress::parse_sequence("f2 G 7 G f2 z").unwrap() {
            session.handle_key(&key).unwrap();
        }
        assert_eq!(session.mode(), EditorMode::Insert);
        assert_eq!(session.view().cursor_position(), Position::new(6, 1));
        assert!(session.view().text().contains("zline 7"));
    }
}
