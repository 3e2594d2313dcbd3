use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use mdpreview_common::protocol::events::{
    EditorEvent, EditorEventEnvelope, PathInfo, SyncPreviewArg,
};
use mdpreview_common::types::{DocumentId, EditorSnapshot, Point, WindowId};
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::config::ConfigSource;
use crate::emitter::EventEmitter;
use crate::error::BridgeError;
use crate::host::{
    Document, DocumentEvent, DocumentEventKind, ScrollOrigin, ScrollSyncGate, WindowHost,
};
use crate::rpc::endpoint::{weak_handler, EndpointHandler, EndpointRouter};
use crate::rpc::request::{BridgeRequest, BridgeResponse, EndpointKey};
use crate::session::registry::RegistryShared;
use crate::session::scroll::{apply_scroll_plan, plan_scroll};
use crate::session::teardown::TeardownTimer;

/// Collaborators shared by every bridge in one editor window.
#[derive(Clone)]
pub struct BridgeContext {
    pub window: Arc<dyn WindowHost>,
    pub config: Arc<dyn ConfigSource>,
    pub scroll_sync: Arc<dyn ScrollSyncGate>,
    pub emitter: EventEmitter,
}

struct BridgeState {
    /// Signed on purpose: a preview may detach more often than it attached.
    reference_count: i64,
    teardown: TeardownTimer,
    subscriptions: HashSet<DocumentEventKind>,
    torn_down: bool,
}

/// One editor's remote-accessible session.
///
/// Created through [`crate::session::SessionRegistry::get_or_create`]. Remote
/// previews attach with `init` and detach with `destroy`; once the last one
/// has detached the session tears itself down after the teardown delay unless
/// another preview attaches first.
pub struct SessionBridge {
    document: Weak<dyn Document>,
    document_id: DocumentId,
    window_id: WindowId,
    context: BridgeContext,
    router: Arc<EndpointRouter>,
    registry: Weak<RegistryShared>,
    teardown_delay: Duration,
    state: Mutex<BridgeState>,
}

impl SessionBridge {
    pub(crate) fn new(
        document: &Arc<dyn Document>,
        context: BridgeContext,
        router: Arc<EndpointRouter>,
        registry: Weak<RegistryShared>,
        teardown_delay: Duration,
    ) -> Arc<Self> {
        let document_id = document.id();
        let window_id = context.window.window_id();
        let bridge = Arc::new(Self {
            document: Arc::downgrade(document),
            document_id,
            window_id,
            context,
            router,
            registry,
            teardown_delay,
            state: Mutex::new(BridgeState {
                reference_count: 0,
                teardown: TeardownTimer::new(),
                subscriptions: DocumentEventKind::ALL.into_iter().collect(),
                torn_down: false,
            }),
        });

        bridge.router.register(bridge.endpoint_key(), weak_handler(&bridge));
        debug!(%document_id, %window_id, "editor session created");
        bridge
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn endpoint_key(&self) -> EndpointKey {
        EndpointKey { window_id: self.window_id, document_id: self.document_id }
    }

    /// Attached previews, floored at zero.
    pub fn reference_count(&self) -> u64 {
        self.lock_state().reference_count.max(0) as u64
    }

    pub fn pending_teardown(&self) -> Option<Instant> {
        self.lock_state().teardown.deadline()
    }

    /// How many times teardown has been scheduled over this session's life.
    pub fn teardown_schedule_count(&self) -> u64 {
        self.lock_state().teardown.schedule_count()
    }

    pub fn is_torn_down(&self) -> bool {
        self.lock_state().torn_down
    }

    pub fn is_subscribed(&self, kind: DocumentEventKind) -> bool {
        self.lock_state().subscriptions.contains(&kind)
    }

    /// Whether the host still holds `document` and it is the one this session serves.
    pub(crate) fn is_attached_to(&self, document: &Arc<dyn Document>) -> bool {
        self.document.upgrade().is_some_and(|current| {
            std::ptr::addr_eq(Arc::as_ptr(&current), Arc::as_ptr(document))
        })
    }

    pub(crate) fn is_document_released(&self) -> bool {
        self.document.strong_count() == 0
    }

    // ── Remote operations ──────────────────────────────────────────

    pub fn handle_at(
        &self,
        request: BridgeRequest,
        now: Instant,
    ) -> Result<BridgeResponse, BridgeError> {
        if self.is_torn_down() {
            return Err(BridgeError::TornDown(self.document_id));
        }

        match request {
            BridgeRequest::Init => self.init().map(BridgeResponse::Snapshot),
            BridgeRequest::Destroy => {
                self.destroy_at(now);
                Ok(BridgeResponse::Done)
            }
            BridgeRequest::ScrollToBufferRange { min_row, max_row } => {
                self.scroll_to_buffer_range(min_row, max_row)?;
                Ok(BridgeResponse::Done)
            }
            BridgeRequest::OpenSource { row } => {
                self.open_source(row)?;
                Ok(BridgeResponse::Done)
            }
        }
    }

    /// Attach a preview and hand it the current document state.
    pub fn init(&self) -> Result<EditorSnapshot, BridgeError> {
        let document = self.document()?;
        let reference_count = {
            let mut state = self.lock_state();
            state.reference_count += 1;
            state.teardown.cancel();
            state.reference_count
        };
        debug!(document_id = %self.document_id, reference_count, "preview attached");

        Ok(EditorSnapshot {
            path: document.path(),
            title: document.title(),
            grammar: document.grammar(),
            text: document.text(),
        })
    }

    /// Detach a preview; the last one out arms the teardown timer.
    pub fn destroy(&self) {
        self.destroy_at(Instant::now());
    }

    pub fn destroy_at(&self, now: Instant) {
        let (reference_count, deadline) = {
            let mut state = self.lock_state();
            state.reference_count -= 1;
            let deadline = (state.reference_count <= 0)
                .then(|| state.teardown.schedule_at(now, self.teardown_delay));
            (state.reference_count, deadline)
        };
        debug!(document_id = %self.document_id, reference_count, "preview detached");

        if deadline.is_some() {
            debug!(
                document_id = %self.document_id,
                delay_ms = self.teardown_delay.as_millis() as u64,
                "editor session teardown scheduled"
            );
            if let Some(registry) = self.registry.upgrade() {
                registry.deadline_changed.notify_one();
            }
        }
    }

    pub fn scroll_to_buffer_range(&self, min_row: u32, max_row: u32) -> Result<(), BridgeError> {
        let document = self.document()?;
        let plan = plan_scroll(min_row, max_row, document.last_buffer_row());
        trace!(document_id = %self.document_id, ?plan, "scrolling editor to preview range");
        apply_scroll_plan(document.as_ref(), plan);
        Ok(())
    }

    /// Bring the editor to the front, optionally moving the cursor to `row`.
    pub fn open_source(&self, row: Option<u32>) -> Result<(), BridgeError> {
        let document = self.document()?;
        if let Some(row) = row {
            document.set_cursor_buffer_position(Point::line_start(row));
        }

        let window = &self.context.window;
        window.focus_window();
        let Some(pane) = window.pane_for(self.document_id) else {
            debug!(document_id = %self.document_id, "editor has no pane, skipping activation");
            return Ok(());
        };
        window.activate_item(pane, self.document_id);
        window.activate_pane(pane);
        Ok(())
    }

    // ── Local events ───────────────────────────────────────────────

    /// Forward a local document event to previews, gated by live config.
    pub fn handle_document_event(&self, event: DocumentEvent) {
        if !self.is_subscribed(event.kind()) {
            trace!(document_id = %self.document_id, ?event, "ignoring event without subscription");
            return;
        }

        if event == DocumentEvent::Destroyed {
            self.teardown();
            if self.context.config.current().preview.close_preview_with_editor {
                self.emit(EditorEvent::Destroy);
            }
            return;
        }

        let Some(document) = self.document.upgrade() else {
            return;
        };

        match event {
            DocumentEvent::StoppedChanging => {
                if self.context.config.current().preview.live_update {
                    self.emit(EditorEvent::ChangeText(document.text()));
                }
                if self.context.config.current().sync.sync_preview_on_change {
                    self.emit(EditorEvent::SyncPreview(SyncPreviewArg {
                        pos: document.cursor_buffer_position().row,
                        flash: false,
                    }));
                }
            }
            DocumentEvent::PathChanged => self.emit(EditorEvent::ChangePath(PathInfo {
                path: document.path(),
                title: document.title(),
            })),
            DocumentEvent::GrammarChanged(scope_name) => {
                self.emit(EditorEvent::ChangeGrammar(scope_name));
            }
            DocumentEvent::Saved | DocumentEvent::Reloaded => {
                if !self.context.config.current().preview.live_update {
                    self.emit(EditorEvent::ChangeText(document.text()));
                }
            }
            DocumentEvent::ScrollTopChanged => {
                if !self.context.scroll_sync.should_scroll_sync(ScrollOrigin::Editor) {
                    return;
                }
                let (first, last) = document.visible_row_range();
                self.emit(EditorEvent::ScrollSync([
                    document.buffer_row_for_screen_row(first),
                    document.buffer_row_for_screen_row(last),
                ]));
            }
            DocumentEvent::SyncPreviewCommand => {
                self.emit(EditorEvent::SyncPreview(SyncPreviewArg {
                    pos: document.cursor_buffer_position().row,
                    flash: true,
                }));
            }
            DocumentEvent::Destroyed => {}
        }
    }

    // ── Teardown ───────────────────────────────────────────────────

    pub(crate) fn teardown_due_at(&self, now: Instant) -> bool {
        self.lock_state().teardown.is_due_at(now)
    }

    /// Run teardown if the timer has elapsed. The reference count is not
    /// consulted: every detach reschedules, so an elapsed timer is final.
    pub(crate) fn fire_teardown_at(&self, now: Instant) -> bool {
        let fired = self.lock_state().teardown.fire_at(now);
        if fired {
            self.teardown();
        }
        fired
    }

    /// Unregister from the registry and router and drop all subscriptions.
    /// Safe to call repeatedly.
    pub fn teardown(&self) {
        let first = {
            let mut state = self.lock_state();
            let first = !state.torn_down;
            state.torn_down = true;
            state.subscriptions.clear();
            state.teardown.cancel();
            first
        };

        if let Some(registry) = self.registry.upgrade() {
            registry.remove_bridge(self);
        }

        if first {
            self.router.unregister_handler(self.endpoint_key(), self);
            info!(
                document_id = %self.document_id,
                window_id = %self.window_id,
                "editor session torn down"
            );
        }
    }

    fn emit(&self, event: EditorEvent) {
        self.context.emitter.emit(EditorEventEnvelope {
            editor_id: self.document_id,
            window_id: self.window_id,
            event,
        });
    }

    fn document(&self) -> Result<Arc<dyn Document>, BridgeError> {
        self.document.upgrade().ok_or(BridgeError::DocumentReleased(self.document_id))
    }

    fn lock_state(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EndpointHandler for SessionBridge {
    fn handle(&self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError> {
        self.handle_at(request, Instant::now())
    }
}
