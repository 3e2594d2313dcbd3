#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mdpreview_bridge::config::{BridgeConfig, SharedConfig};
use mdpreview_bridge::emitter::EventEmitter;
use mdpreview_bridge::host::{
    Document, PaneId, ScrollOptions, ScrollOrigin, ScrollSyncGate, WindowHost,
};
use mdpreview_bridge::session::{BridgeContext, SessionRegistry};
use mdpreview_common::protocol::events::EditorEventEnvelope;
use mdpreview_common::types::{BufferRange, DocumentId, Point, ScreenRange, WindowId};
use tokio::sync::broadcast;

pub const WINDOW: WindowId = WindowId(7);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollCall {
    ToBufferPosition(Point),
    ToScreenRange(ScreenRange, ScrollOptions),
}

#[derive(Debug)]
pub struct DocumentState {
    pub path: Option<String>,
    pub title: String,
    pub grammar: String,
    pub text: String,
    pub cursor: Point,
    pub last_buffer_row: u32,
    pub visible_rows: (u32, u32),
    pub scrolls: Vec<ScrollCall>,
}

/// In-memory editor with one screen row per buffer row, offset by `fold_offset`.
#[derive(Debug)]
pub struct FakeDocument {
    id: DocumentId,
    fold_offset: u32,
    pub state: Mutex<DocumentState>,
}

impl FakeDocument {
    pub fn new(text: &str) -> Arc<Self> {
        Self::with_id(DocumentId::new_v4(), text)
    }

    pub fn with_id(id: DocumentId, text: &str) -> Arc<Self> {
        Self::build(id, text, 0)
    }

    /// Screen rows sit `fold_offset` rows below their buffer rows.
    pub fn with_fold_offset(text: &str, fold_offset: u32) -> Arc<Self> {
        Self::build(DocumentId::new_v4(), text, fold_offset)
    }

    fn build(id: DocumentId, text: &str, fold_offset: u32) -> Arc<Self> {
        let last_buffer_row = text.lines().count().saturating_sub(1) as u32;
        Arc::new(Self {
            id,
            fold_offset,
            state: Mutex::new(DocumentState {
                path: Some("/notes/readme.md".into()),
                title: "readme.md".into(),
                grammar: "source.gfm".into(),
                text: text.into(),
                cursor: Point::new(0, 0),
                last_buffer_row,
                visible_rows: (0, 0),
                scrolls: Vec::new(),
            }),
        })
    }

    pub fn set_text(&self, text: &str) {
        self.state.lock().unwrap().text = text.into();
    }

    pub fn cursor(&self) -> Point {
        self.state.lock().unwrap().cursor
    }

    pub fn scrolls(&self) -> Vec<ScrollCall> {
        self.state.lock().unwrap().scrolls.clone()
    }
}

impl Document for FakeDocument {
    fn id(&self) -> DocumentId {
        self.id
    }

    fn path(&self) -> Option<String> {
        self.state.lock().unwrap().path.clone()
    }

    fn title(&self) -> String {
        self.state.lock().unwrap().title.clone()
    }

    fn grammar(&self) -> String {
        self.state.lock().unwrap().grammar.clone()
    }

    fn text(&self) -> String {
        self.state.lock().unwrap().text.clone()
    }

    fn cursor_buffer_position(&self) -> Point {
        self.cursor()
    }

    fn set_cursor_buffer_position(&self, position: Point) {
        self.state.lock().unwrap().cursor = position;
    }

    fn last_buffer_row(&self) -> u32 {
        self.state.lock().unwrap().last_buffer_row
    }

    fn scroll_to_buffer_position(&self, position: Point) {
        self.state.lock().unwrap().scrolls.push(ScrollCall::ToBufferPosition(position));
    }

    fn screen_range_for_buffer_range(&self, range: BufferRange) -> ScreenRange {
        ScreenRange {
            start: Point::new(range.start.row + self.fold_offset, range.start.column),
            end: Point::new(range.end.row + self.fold_offset, range.end.column),
        }
    }

    fn scroll_to_screen_range(&self, range: ScreenRange, options: ScrollOptions) {
        self.state.lock().unwrap().scrolls.push(ScrollCall::ToScreenRange(range, options));
    }

    fn visible_row_range(&self) -> (u32, u32) {
        self.state.lock().unwrap().visible_rows
    }

    fn buffer_row_for_screen_row(&self, screen_row: u32) -> u32 {
        screen_row.saturating_sub(self.fold_offset)
    }
}

#[derive(Debug, Default)]
pub struct FakeWindow {
    pub focus_count: AtomicUsize,
    pub panes: Mutex<HashMap<DocumentId, PaneId>>,
    pub activated_items: Mutex<Vec<(PaneId, DocumentId)>>,
    pub activated_panes: Mutex<Vec<PaneId>>,
}

impl FakeWindow {
    pub fn place(&self, document: DocumentId, pane: PaneId) {
        self.panes.lock().unwrap().insert(document, pane);
    }
}

impl WindowHost for FakeWindow {
    fn window_id(&self) -> WindowId {
        WINDOW
    }

    fn focus_window(&self) {
        self.focus_count.fetch_add(1, Ordering::SeqCst);
    }

    fn pane_for(&self, document: DocumentId) -> Option<PaneId> {
        self.panes.lock().unwrap().get(&document).copied()
    }

    fn activate_item(&self, pane: PaneId, document: DocumentId) {
        self.activated_items.lock().unwrap().push((pane, document));
    }

    fn activate_pane(&self, pane: PaneId) {
        self.activated_panes.lock().unwrap().push(pane);
    }
}

#[derive(Debug)]
pub struct ToggleGate(pub AtomicBool);

impl ScrollSyncGate for ToggleGate {
    fn should_scroll_sync(&self, origin: ScrollOrigin) -> bool {
        origin == ScrollOrigin::Editor && self.0.load(Ordering::SeqCst)
    }
}

pub struct Harness {
    pub registry: SessionRegistry,
    pub config: SharedConfig,
    pub window: Arc<FakeWindow>,
    pub scroll_gate: Arc<ToggleGate>,
    pub events: broadcast::Receiver<EditorEventEnvelope>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        let config = SharedConfig::new(config);
        let window = Arc::new(FakeWindow::default());
        let scroll_gate = Arc::new(ToggleGate(AtomicBool::new(true)));
        let emitter = EventEmitter::default();
        let events = emitter.subscribe();

        let context = BridgeContext {
            window: window.clone(),
            config: Arc::new(config.clone()),
            scroll_sync: scroll_gate.clone(),
            emitter,
        };

        Self { registry: SessionRegistry::new(context), config, window, scroll_gate, events }
    }

    /// Every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EditorEventEnvelope> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn as_document(document: &Arc<FakeDocument>) -> Arc<dyn Document> {
    document.clone()
}
