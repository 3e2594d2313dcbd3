use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use mdpreview_common::protocol::jsonrpc::{
    is_supported_protocol_version, Request, RequestId, Response, RpcError, INVALID_REQUEST,
    PARSE_ERROR,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{internal_error, BridgeError};
use crate::rpc::request::{decode_request, BridgeRequest, BridgeResponse, EndpointKey};

/// A handler set reachable through the router.
pub trait EndpointHandler: Send + Sync {
    fn handle(&self, request: BridgeRequest) -> Result<BridgeResponse, BridgeError>;
}

/// Routes remote calls to editor endpoints by (window, editor).
///
/// The router only holds weak references; an endpoint whose owner is gone
/// behaves as if it had been unregistered.
#[derive(Default)]
pub struct EndpointRouter {
    endpoints: Mutex<HashMap<EndpointKey, Weak<dyn EndpointHandler>>>,
}

impl EndpointRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: EndpointKey, handler: Weak<dyn EndpointHandler>) {
        let window_id = key.window_id;
        let document_id = key.document_id;
        if self.lock_endpoints().insert(key, handler).is_some() {
            warn!(%window_id, %document_id, "replaced existing editor endpoint");
        }
        debug!(%window_id, %document_id, "editor endpoint registered");
    }

    /// Returns whether an endpoint was registered under `key`.
    pub fn unregister(&self, key: EndpointKey) -> bool {
        let removed = self.lock_endpoints().remove(&key).is_some();
        if removed {
            debug!(
                window_id = %key.window_id,
                document_id = %key.document_id,
                "editor endpoint unregistered"
            );
        }
        removed
    }

    /// Remove the endpoint under `key` only if it still points at `handler`.
    /// A handler that has been replaced under the same key leaves the newer
    /// registration in place.
    pub fn unregister_handler<H: ?Sized>(&self, key: EndpointKey, handler: &H) -> bool {
        let mut endpoints = self.lock_endpoints();
        let owned = endpoints
            .get(&key)
            .is_some_and(|current| std::ptr::addr_eq(current.as_ptr(), handler as *const H));
        if owned {
            endpoints.remove(&key);
            debug!(
                window_id = %key.window_id,
                document_id = %key.document_id,
                "editor endpoint unregistered"
            );
        }
        owned
    }

    pub fn is_registered(&self, key: EndpointKey) -> bool {
        self.lock_endpoints().get(&key).is_some_and(|handler| handler.strong_count() > 0)
    }

    pub fn len(&self) -> usize {
        self.lock_endpoints().len()
    }

    /// Invoke `request` on the endpoint registered under `key`.
    pub fn call(
        &self,
        key: EndpointKey,
        request: BridgeRequest,
    ) -> Result<BridgeResponse, BridgeError> {
        // Resolve first so the handler runs without the routing table locked.
        let handler = self.lock_endpoints().get(&key).and_then(Weak::upgrade);
        let Some(handler) = handler else {
            return Err(BridgeError::EndpointNotFound {
                window_id: key.window_id,
                document_id: key.document_id,
            });
        };
        debug!(
            window_id = %key.window_id,
            document_id = %key.document_id,
            method = request.method(),
            "dispatching editor request"
        );
        handler.handle(request)
    }

    pub fn handle_raw_request(&self, raw: &[u8]) -> Response {
        let request = match serde_json::from_slice::<Request>(raw) {
            Ok(request) => request,
            Err(error) => {
                return Response::error(
                    RequestId::Null,
                    RpcError {
                        code: PARSE_ERROR,
                        message: "Parse error".to_string(),
                        data: Some(json!({ "reason": error.to_string() })),
                    },
                );
            }
        };

        self.handle_request(request)
    }

    pub fn handle_request(&self, request: Request) -> Response {
        if request.jsonrpc != "2.0" {
            return Response::error(request.id, RpcError::new(INVALID_REQUEST, "Invalid Request"));
        }
        if let Some(version) =
            request.protocol_version.as_deref().filter(|v| !is_supported_protocol_version(v))
        {
            return Response::error(
                request.id,
                RpcError {
                    code: INVALID_REQUEST,
                    message: "Unsupported protocol version".to_string(),
                    data: Some(json!({ "protocol_version": version })),
                },
            );
        }

        let (key, bridge_request) = match decode_request(&request.method, request.params) {
            Ok(decoded) => decoded,
            Err(error) => return Response::error(request.id, error.into()),
        };

        match self.call(key, bridge_request).map(BridgeResponse::into_value) {
            Ok(Ok(result)) => Response::success(request.id, result),
            Ok(Err(error)) => Response::error(
                request.id,
                internal_error(format!("failed to encode result: {error}")),
            ),
            Err(error) => Response::error(request.id, error.into()),
        }
    }

    fn lock_endpoints(&self) -> MutexGuard<'_, HashMap<EndpointKey, Weak<dyn EndpointHandler>>> {
        self.endpoints.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Downgrade a concrete handler for registration.
pub fn weak_handler<H: EndpointHandler + 'static>(handler: &Arc<H>) -> Weak<dyn EndpointHandler> {
    let weak: Weak<H> = Arc::downgrade(handler);
    weak
}
