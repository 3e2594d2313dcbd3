pub mod events;
pub mod jsonrpc;
pub mod rpc_methods;
