use mdpreview_common::protocol::jsonrpc::{
    RpcError, DOCUMENT_RELEASED, ENDPOINT_NOT_FOUND, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND,
};
use mdpreview_common::types::{DocumentId, WindowId};
use thiserror::Error;

/// Failures surfaced to remote callers of an editor endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("method `{0}` not found")]
    MethodNotFound(String),

    #[error("invalid params for `{method}`: {reason}")]
    InvalidParams { method: &'static str, reason: String },

    #[error("no editor endpoint registered for window {window_id}, editor {document_id}")]
    EndpointNotFound { window_id: WindowId, document_id: DocumentId },

    #[error("editor {0} was released by the host")]
    DocumentReleased(DocumentId),

    #[error("editor session {0} has already been torn down")]
    TornDown(DocumentId),
}

impl BridgeError {
    pub const fn rpc_code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::EndpointNotFound { .. } => ENDPOINT_NOT_FOUND,
            Self::DocumentReleased(_) => DOCUMENT_RELEASED,
            // A torn-down session is indistinguishable from a missing one for callers.
            Self::TornDown(_) => ENDPOINT_NOT_FOUND,
        }
    }

    pub fn to_rpc_error(&self) -> RpcError {
        RpcError::new(self.rpc_code(), self.to_string())
    }
}

impl From<BridgeError> for RpcError {
    fn from(error: BridgeError) -> Self {
        error.to_rpc_error()
    }
}

/// Fallback used when a handler result cannot be encoded.
pub(crate) fn internal_error(reason: impl Into<String>) -> RpcError {
    RpcError::new(INTERNAL_ERROR, reason)
}
