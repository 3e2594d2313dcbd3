//! Capabilities the editor host provides to bridges.
//!
//! The host owns documents, windows and panes. Bridges only ever hold a
//! [`std::sync::Weak`] to a document, so closing it in the host is never
//! blocked by an attached preview.

use mdpreview_common::types::{BufferRange, DocumentId, Point, ScreenRange, WindowId};

/// An open text editor.
///
/// Methods take `&self`; implementations are expected to use interior
/// mutability for the two mutating calls (cursor and scroll).
pub trait Document: Send + Sync {
    fn id(&self) -> DocumentId;
    fn path(&self) -> Option<String>;
    fn title(&self) -> String;
    /// Scope name of the active grammar, e.g. `source.gfm`.
    fn grammar(&self) -> String;
    fn text(&self) -> String;

    fn cursor_buffer_position(&self) -> Point;
    fn set_cursor_buffer_position(&self, position: Point);

    fn last_buffer_row(&self) -> u32;
    fn scroll_to_buffer_position(&self, position: Point);
    fn screen_range_for_buffer_range(&self, range: BufferRange) -> ScreenRange;
    fn scroll_to_screen_range(&self, range: ScreenRange, options: ScrollOptions);

    /// First and last visible screen rows.
    fn visible_row_range(&self) -> (u32, u32);
    fn buffer_row_for_screen_row(&self, screen_row: u32) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOptions {
    pub center: bool,
}

/// Opaque pane handle handed out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneId(pub u64);

/// The editor window the bridge lives in.
pub trait WindowHost: Send + Sync {
    fn window_id(&self) -> WindowId;
    fn focus_window(&self);
    fn pane_for(&self, document: DocumentId) -> Option<PaneId>;
    fn activate_item(&self, pane: PaneId, document: DocumentId);
    fn activate_pane(&self, pane: PaneId);
}

/// Which side initiated a scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOrigin {
    Editor,
    Preview,
}

/// Decides whether a scroll on one side should be mirrored on the other.
pub trait ScrollSyncGate: Send + Sync {
    fn should_scroll_sync(&self, origin: ScrollOrigin) -> bool;
}

impl<F> ScrollSyncGate for F
where
    F: Fn(ScrollOrigin) -> bool + Send + Sync,
{
    fn should_scroll_sync(&self, origin: ScrollOrigin) -> bool {
        self(origin)
    }
}

/// Local notifications the host delivers for a document or its view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The buffer stopped changing (debounced by the host).
    StoppedChanging,
    PathChanged,
    /// Carries the new grammar scope name.
    GrammarChanged(String),
    Destroyed,
    Saved,
    /// The buffer was reloaded from disk.
    Reloaded,
    /// The editor view's scroll position moved.
    ScrollTopChanged,
    /// The user ran the "sync preview" command on this editor's view.
    SyncPreviewCommand,
}

impl DocumentEvent {
    pub const fn kind(&self) -> DocumentEventKind {
        match self {
            Self::StoppedChanging => DocumentEventKind::StoppedChanging,
            Self::PathChanged => DocumentEventKind::PathChanged,
            Self::GrammarChanged(_) => DocumentEventKind::GrammarChanged,
            Self::Destroyed => DocumentEventKind::Destroyed,
            Self::Saved => DocumentEventKind::Saved,
            Self::Reloaded => DocumentEventKind::Reloaded,
            Self::ScrollTopChanged => DocumentEventKind::ScrollTopChanged,
            Self::SyncPreviewCommand => DocumentEventKind::SyncPreviewCommand,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentEventKind {
    StoppedChanging,
    PathChanged,
    GrammarChanged,
    Destroyed,
    Saved,
    Reloaded,
    ScrollTopChanged,
    SyncPreviewCommand,
}

impl DocumentEventKind {
    pub const ALL: [Self; 8] = [
        Self::StoppedChanging,
        Self::PathChanged,
        Self::GrammarChanged,
        Self::Destroyed,
        Self::Saved,
        Self::Reloaded,
        Self::ScrollTopChanged,
        Self::SyncPreviewCommand,
    ];
}
