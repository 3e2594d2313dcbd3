// Remote-callable editor endpoints: typed requests + routing by (window, editor).

pub mod endpoint;
pub mod request;

pub use endpoint::{EndpointHandler, EndpointRouter};
pub use request::{BridgeRequest, BridgeResponse, EndpointKey};
