// In-crate stubs for session unit tests.

use std::sync::{Arc, Mutex};

use mdpreview_common::types::{BufferRange, DocumentId, Point, ScreenRange, WindowId};

use crate::config::BridgeConfig;
use crate::emitter::EventEmitter;
use crate::host::{Document, PaneId, ScrollOptions, ScrollOrigin, WindowHost};
use crate::session::bridge::BridgeContext;

pub(crate) struct StubDocument {
    id: DocumentId,
    text: Mutex<String>,
    cursor: Mutex<Point>,
}

impl StubDocument {
    pub(crate) fn new(text: &str) -> Arc<dyn Document> {
        Arc::new(Self {
            id: DocumentId::new_v4(),
            text: Mutex::new(text.to_string()),
            cursor: Mutex::new(Point::new(0, 0)),
        })
    }
}

impl Document for StubDocument {
    fn id(&self) -> DocumentId {
        self.id
    }

    fn path(&self) -> Option<String> {
        None
    }

    fn title(&self) -> String {
        "untitled".to_string()
    }

    fn grammar(&self) -> String {
        "source.gfm".to_string()
    }

    fn text(&self) -> String {
        self.text.lock().unwrap().clone()
    }

    fn cursor_buffer_position(&self) -> Point {
        *self.cursor.lock().unwrap()
    }

    fn set_cursor_buffer_position(&self, position: Point) {
        *self.cursor.lock().unwrap() = position;
    }

    fn last_buffer_row(&self) -> u32 {
        0
    }

    fn scroll_to_buffer_position(&self, _position: Point) {}

    fn screen_range_for_buffer_range(&self, range: BufferRange) -> ScreenRange {
        ScreenRange { start: range.start, end: range.end }
    }

    fn scroll_to_screen_range(&self, _range: ScreenRange, _options: ScrollOptions) {}

    fn visible_row_range(&self) -> (u32, u32) {
        (0, 0)
    }

    fn buffer_row_for_screen_row(&self, screen_row: u32) -> u32 {
        screen_row
    }
}

pub(crate) struct StubWindow;

impl WindowHost for StubWindow {
    fn window_id(&self) -> WindowId {
        WindowId(1)
    }

    fn focus_window(&self) {}

    fn pane_for(&self, _document: DocumentId) -> Option<PaneId> {
        None
    }

    fn activate_item(&self, _pane: PaneId, _document: DocumentId) {}

    fn activate_pane(&self, _pane: PaneId) {}
}

pub(crate) fn context(config: BridgeConfig, emitter: EventEmitter) -> BridgeContext {
    BridgeContext {
        window: Arc::new(StubWindow),
        config: Arc::new(config),
        scroll_sync: Arc::new(|_origin: ScrollOrigin| true),
        emitter,
    }
}
