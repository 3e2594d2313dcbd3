// mdpreview-bridge library entry point (embedded in the editor host).

pub mod config;
pub mod emitter;
pub mod error;
pub mod host;
pub mod rpc;
pub mod runtime;
pub mod session;

pub use config::{BridgeConfig, ConfigSource};
pub use emitter::EventEmitter;
pub use error::BridgeError;
pub use runtime::{spawn_teardown_sweeper, TeardownSweeperHandle};
pub use session::{BridgeContext, SessionBridge, SessionRegistry};
