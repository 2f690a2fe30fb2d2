//! Event system for editor notifications.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! The session never holds references to whoever displays its state. It
//! publishes values on a `tokio::sync::broadcast` channel and any number of
//! hosts (a window frame, a status line, a test) subscribe to them.

use crate::mode::EditorMode;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast;

/// Events published by an [`crate::EditorSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    // Buffer events
    /// A file was read from disk for the first time
    BufferOpened(PathBuf),
    /// A known buffer became current again
    BufferSwitched(PathBuf),
    /// The current buffer received a user edit
    BufferChanged(PathBuf),
    /// The current buffer was written to disk
    BufferSaved(PathBuf),

    // Session events
    /// The "Saved"/"Unsaved" indicator changed
    TitleChanged(String),
    /// The sampled mode differs from the previous keystroke's
    ModeChanged(EditorMode),
    /// The jump overlay is on screen
    LocateOpened { labels: usize },
    /// The jump overlay was removed
    LocateClosed,

    /// A transient message for the user
    Notification { message: String, timeout: Duration },
}

/// Event bus for broadcasting editor events.
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Helper for processing events asynchronously.
///
/// ```ignore
/// let mut handler = EventHandler::new(session.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let EditorEvent::TitleChanged(title) = event {
///             frame.set_title(&title);
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event. Returns `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::LocateClosed);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, EditorEvent::LocateClosed);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(EditorEvent::ModeChanged(EditorMode::Command));

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_ends_when_bus_dropped() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());
        bus.emit(EditorEvent::TitleChanged("Saved".into()));
        drop(bus);

        assert_eq!(
            handler.next().await,
            Some(EditorEvent::TitleChanged("Saved".into()))
        );
        assert_eq!(handler.next().await, None);
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new();
        bus.emit(EditorEvent::LocateClosed);
        let mut handler = EventHandler::new(bus.subscribe());
        assert_eq!(handler.try_next(), None);
    }
}
