// Per-document editor sessions: registry, bridge, teardown timer, scroll policy.

pub mod bridge;
pub mod registry;
pub mod scroll;
pub mod teardown;
#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{BridgeContext, SessionBridge};
pub use registry::SessionRegistry;
