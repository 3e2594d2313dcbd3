use mdpreview_common::protocol::rpc_methods::{DESTROY, INIT, OPEN_SOURCE, SCROLL_TO_BUFFER_RANGE};
use mdpreview_common::types::{DocumentId, EditorSnapshot, WindowId};
use serde::Deserialize;
use serde_json::Value;

use crate::error::BridgeError;

/// Routing key for an editor endpoint: one per (window, editor) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub window_id: WindowId,
    pub document_id: DocumentId,
}

/// An operation a preview can invoke on an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeRequest {
    /// Attach a preview; answers with a snapshot.
    Init,
    /// Detach a preview.
    Destroy,
    ScrollToBufferRange { min_row: u32, max_row: u32 },
    /// Jump back to the editor, optionally moving the cursor to `row`.
    OpenSource { row: Option<u32> },
}

impl BridgeRequest {
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Init => INIT,
            Self::Destroy => DESTROY,
            Self::ScrollToBufferRange { .. } => SCROLL_TO_BUFFER_RANGE,
            Self::OpenSource { .. } => OPEN_SOURCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeResponse {
    Snapshot(EditorSnapshot),
    /// The operation has no result.
    Done,
}

impl BridgeResponse {
    pub fn into_value(self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Snapshot(snapshot) => serde_json::to_value(snapshot),
            Self::Done => Ok(Value::Null),
        }
    }
}

/// Wire params shared by every bridge method.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointParams {
    window_id: WindowId,
    editor_id: DocumentId,
    #[serde(default)]
    arg: Value,
}

/// Decode a JSON-RPC method + params pair into a routed, typed request.
pub fn decode_request(
    method: &str,
    params: Option<Value>,
) -> Result<(EndpointKey, BridgeRequest), BridgeError> {
    let method = match method {
        INIT => INIT,
        DESTROY => DESTROY,
        SCROLL_TO_BUFFER_RANGE => SCROLL_TO_BUFFER_RANGE,
        OPEN_SOURCE => OPEN_SOURCE,
        other => return Err(BridgeError::MethodNotFound(other.to_string())),
    };

    let Some(params) = params else {
        return Err(invalid_params(method, format!("{method} requires params")));
    };
    let params = serde_json::from_value::<EndpointParams>(params)
        .map_err(|error| invalid_params(method, format!("failed to decode params: {error}")))?;

    let key = EndpointKey { window_id: params.window_id, document_id: params.editor_id };
    let request = match method {
        INIT => BridgeRequest::Init,
        DESTROY => BridgeRequest::Destroy,
        SCROLL_TO_BUFFER_RANGE => {
            let [min_row, max_row] = decode_arg::<[u32; 2]>(method, params.arg)?;
            BridgeRequest::ScrollToBufferRange { min_row, max_row }
        }
        _ => BridgeRequest::OpenSource { row: decode_arg::<Option<u32>>(method, params.arg)? },
    };

    Ok((key, request))
}

fn decode_arg<T: serde::de::DeserializeOwned>(
    method: &'static str,
    arg: Value,
) -> Result<T, BridgeError> {
    serde_json::from_value(arg)
        .map_err(|error| invalid_params(method, format!("failed to decode arg: {error}")))
}

fn invalid_params(method: &'static str, reason: String) -> BridgeError {
    BridgeError::InvalidParams { method, reason }
}
