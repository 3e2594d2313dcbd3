// Single outbound channel shared by every bridge in a window.

use mdpreview_common::protocol::events::{EditorEventEnvelope, EDITOR_EVENT_CHANNEL};
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 256;

/// Fire-and-forget publisher for editor events.
///
/// Cloning shares the underlying channel. Sending with no preview listening is
/// not an error; the event is simply dropped.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<EditorEventEnvelope>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Name previews listen on for envelopes from this emitter.
    pub const fn channel(&self) -> &'static str {
        EDITOR_EVENT_CHANNEL
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEventEnvelope> {
        self.tx.subscribe()
    }

    pub fn emit(&self, envelope: EditorEventEnvelope) {
        let event = envelope.event.name();
        let document_id = envelope.editor_id;
        match self.tx.send(envelope) {
            Ok(receivers) => trace!(
                channel = EDITOR_EVENT_CHANNEL,
                %document_id,
                event,
                receivers,
                "editor event sent"
            ),
            Err(_) => trace!(
                channel = EDITOR_EVENT_CHANNEL,
                %document_id,
                event,
                "editor event dropped, no preview listening"
            ),
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
