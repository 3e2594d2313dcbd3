use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mdpreview_common::types::DocumentId;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;

use crate::host::{Document, DocumentEvent};
use crate::rpc::endpoint::EndpointRouter;
use crate::session::bridge::{BridgeContext, SessionBridge};

/// State shared between the registry handle and the bridges it created.
pub(crate) struct RegistryShared {
    bridges: Mutex<HashMap<DocumentId, Arc<SessionBridge>>>,
    /// Signalled whenever a bridge arms its teardown timer.
    pub(crate) deadline_changed: Notify,
}

impl RegistryShared {
    fn lock_bridges(&self) -> MutexGuard<'_, HashMap<DocumentId, Arc<SessionBridge>>> {
        self.bridges.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the entry for `bridge`, leaving a newer bridge for the same document alone.
    pub(crate) fn remove_bridge(&self, bridge: &SessionBridge) {
        let mut bridges = self.lock_bridges();
        let is_current = bridges
            .get(&bridge.document_id())
            .is_some_and(|current| std::ptr::eq(Arc::as_ptr(current), bridge));
        if is_current {
            bridges.remove(&bridge.document_id());
        }
    }
}

/// Maps each open document to at most one live [`SessionBridge`].
///
/// Bridges reference their document weakly, so a document the host has
/// dropped is never kept alive here; its entry is reclaimed on the next
/// lookup or by [`SessionRegistry::prune_released`].
#[derive(Clone)]
pub struct SessionRegistry {
    shared: Arc<RegistryShared>,
    context: BridgeContext,
    router: Arc<EndpointRouter>,
    teardown_delay: Duration,
}

impl SessionRegistry {
    /// The teardown delay is taken from the configuration at construction.
    pub fn new(context: BridgeContext) -> Self {
        let teardown_delay = context.config.current().session.teardown_delay();
        Self {
            shared: Arc::new(RegistryShared {
                bridges: Mutex::new(HashMap::new()),
                deadline_changed: Notify::new(),
            }),
            context,
            router: Arc::new(EndpointRouter::new()),
            teardown_delay,
        }
    }

    pub fn with_teardown_delay(mut self, teardown_delay: Duration) -> Self {
        self.teardown_delay = teardown_delay;
        self
    }

    /// Route remote calls through an existing router instead of a private one.
    pub fn with_router(mut self, router: Arc<EndpointRouter>) -> Self {
        self.router = router;
        self
    }

    pub fn router(&self) -> &Arc<EndpointRouter> {
        &self.router
    }

    pub fn teardown_delay(&self) -> Duration {
        self.teardown_delay
    }

    /// Return the live bridge for `document`, creating it on first use.
    ///
    /// Looking up an existing bridge has no effect on its reference count.
    pub fn get_or_create(&self, document: &Arc<dyn Document>) -> Arc<SessionBridge> {
        let document_id = document.id();

        let stale = {
            let mut bridges = self.shared.lock_bridges();
            if let Some(existing) = bridges.get(&document_id) {
                if existing.is_attached_to(document) {
                    return Arc::clone(existing);
                }
            }
            bridges.remove(&document_id)
        };
        if let Some(stale) = stale {
            debug!(%document_id, "replacing editor session for released document");
            stale.teardown();
        }

        let mut bridges = self.shared.lock_bridges();
        let bridge = bridges.entry(document_id).or_insert_with(|| {
            SessionBridge::new(
                document,
                self.context.clone(),
                Arc::clone(&self.router),
                Arc::downgrade(&self.shared),
                self.teardown_delay,
            )
        });
        Arc::clone(bridge)
    }

    pub fn get(&self, document_id: DocumentId) -> Option<Arc<SessionBridge>> {
        self.shared.lock_bridges().get(&document_id).cloned()
    }

    pub fn contains(&self, document_id: DocumentId) -> bool {
        self.shared.lock_bridges().contains_key(&document_id)
    }

    pub fn len(&self) -> usize {
        self.shared.lock_bridges().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a host event to the document's bridge. Returns false when the
    /// document has no bridge.
    pub fn dispatch_document_event(&self, document_id: DocumentId, event: DocumentEvent) -> bool {
        let Some(bridge) = self.get(document_id) else {
            return false;
        };
        bridge.handle_document_event(event);
        true
    }

    pub fn next_teardown_deadline(&self) -> Option<Instant> {
        self.shared.lock_bridges().values().filter_map(|bridge| bridge.pending_teardown()).min()
    }

    /// Tear down every bridge whose timer has elapsed by `now`.
    pub fn sweep_expired_at(&self, now: Instant) -> Vec<DocumentId> {
        let due: Vec<Arc<SessionBridge>> = self
            .shared
            .lock_bridges()
            .values()
            .filter(|bridge| bridge.teardown_due_at(now))
            .cloned()
            .collect();

        due.into_iter()
            .filter(|bridge| bridge.fire_teardown_at(now))
            .map(|bridge| bridge.document_id())
            .collect()
    }

    pub fn sweep_expired(&self) -> Vec<DocumentId> {
        self.sweep_expired_at(Instant::now())
    }

    /// Tear down bridges whose document the host has already dropped.
    pub fn prune_released(&self) -> Vec<DocumentId> {
        let released: Vec<Arc<SessionBridge>> = self
            .shared
            .lock_bridges()
            .values()
            .filter(|bridge| bridge.is_document_released())
            .cloned()
            .collect();

        released
            .into_iter()
            .map(|bridge| {
                bridge.teardown();
                bridge.document_id()
            })
            .collect()
    }

    /// Resolves the next time any bridge arms its teardown timer.
    pub async fn deadline_changed(&self) {
        self.shared.deadline_changed.notified().await;
    }
}
