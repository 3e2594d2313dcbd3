// Outbound editor events sent from the editor window to preview renderers.

use serde::{Deserialize, Serialize};

use crate::types::{DocumentId, WindowId};

/// Channel every editor bridge publishes on.
pub const EDITOR_EVENT_CHANNEL: &str = "mdpreview:editor-event";

/// A single outbound event, tagged with the editor it originates from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorEventEnvelope {
    pub editor_id: DocumentId,
    pub window_id: WindowId,
    #[serde(flatten)]
    pub event: EditorEvent,
}

/// All events in the editor → preview direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "arg", rename_all = "camelCase")]
pub enum EditorEvent {
    /// Full document text.
    ChangeText(String),
    /// Cursor row the preview should sync to.
    SyncPreview(SyncPreviewArg),
    ChangePath(PathInfo),
    /// New grammar scope name.
    ChangeGrammar(String),
    /// The editor went away and the preview should close with it.
    Destroy,
    /// First and last visible buffer rows.
    ScrollSync([u32; 2]),
}

impl EditorEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ChangeText(_) => "changeText",
            Self::SyncPreview(_) => "syncPreview",
            Self::ChangePath(_) => "changePath",
            Self::ChangeGrammar(_) => "changeGrammar",
            Self::Destroy => "destroy",
            Self::ScrollSync(_) => "scrollSync",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncPreviewArg {
    pub pos: u32,
    /// Whether the preview should flash the synced element.
    pub flash: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathInfo {
    pub path: Option<String>,
    pub title: String,
}
