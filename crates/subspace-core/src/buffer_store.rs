//! Open files and their dirty state.
//!
//! A [`Buffer`] is the authoritative text of one file for the session. The
//! visible document is a projection of the current buffer; the store never
//! looks at the view itself.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult};

/// One open file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    text: String,
    saved: bool,
}

impl Buffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True iff `text` matches the file as of the last load or save.
    pub fn is_saved(&self) -> bool {
        self.saved
    }
}

/// What [`BufferStore::open`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The file was read from disk.
    Loaded,
    /// The path was already open and is current again.
    Switched,
}

/// Path-keyed buffers plus the current one. Buffers live for the whole
/// session.
#[derive(Debug)]
pub struct BufferStore {
    buffers: HashMap<PathBuf, Buffer>,
    current: Option<PathBuf>,
    atomic_save: bool,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::with_atomic_save(true)
    }

    /// With `atomic_save`, saves go through a sibling temp file that is
    /// renamed over the target.
    pub fn with_atomic_save(atomic_save: bool) -> Self {
        Self {
            buffers: HashMap::new(),
            current: None,
            atomic_save,
        }
    }

    /// Makes `path` current, reading it on first open.
    ///
    /// On a read error nothing changes: no buffer is created and the
    /// previous buffer stays current.
    pub fn open(&mut self, path: impl AsRef<Path>) -> CoreResult<OpenOutcome> {
        let path = absolute(path.as_ref())?;

        if self.buffers.contains_key(&path) {
            tracing::debug!("Switching to {}", path.display());
            self.current = Some(path);
            return Ok(OpenOutcome::Switched);
        }

        let text = fs::read_to_string(&path).map_err(|source| CoreError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Opened {} ({} bytes)", path.display(), text.len());

        self.buffers.insert(path.clone(), Buffer { text, saved: true });
        self.current = Some(path);
        Ok(OpenOutcome::Loaded)
    }

    /// Records a user edit of the current buffer. Returns false when there
    /// is no current buffer.
    pub fn record_edit(&mut self, text: impl Into<String>) -> bool {
        let Some(buffer) = self.current_mut() else {
            return false;
        };
        buffer.text = text.into();
        buffer.saved = false;
        true
    }

    /// Writes the current buffer to its path.
    ///
    /// Returns the path written, or `None` without a current buffer. On
    /// failure the buffer stays unsaved.
    pub fn save(&mut self) -> CoreResult<Option<PathBuf>> {
        let Some(path) = self.current.clone() else {
            return Ok(None);
        };
        let Some(buffer) = self.buffers.get_mut(&path) else {
            return Ok(None);
        };

        let result = if self.atomic_save {
            write_atomic(&path, &buffer.text)
        } else {
            fs::write(&path, &buffer.text)
        };
        result.map_err(|source| CoreError::Write {
            path: path.clone(),
            source,
        })?;

        buffer.saved = true;
        tracing::info!("Saved {}", path.display());
        Ok(Some(path))
    }

    // ==================== Accessors ====================

    pub fn current(&self) -> Option<&Buffer> {
        self.current.as_ref().and_then(|p| self.buffers.get(p))
    }

    fn current_mut(&mut self) -> Option<&mut Buffer> {
        let path = self.current.as_ref()?;
        self.buffers.get_mut(path)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&Buffer> {
        let path = absolute(path.as_ref()).ok()?;
        self.buffers.get(&path)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// True if any buffer has edits not yet written.
    pub fn has_unsaved(&self) -> bool {
        self.buffers.values().any(|b| !b.saved)
    }
}

impl Default for BufferStore {
    fn default() -> Self {
        Self::new()
    }
}

fn absolute(path: &Path) -> CoreResult<PathBuf> {
    std::path::absolute(path).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `text` to a temp file next to `path`, then renames it into place.
fn write_atomic(path: &Path, text: &str) -> std::io::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.subspace-tmp", name));

    let result = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(text.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
