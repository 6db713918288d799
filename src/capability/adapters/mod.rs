//! Adapter implementations for capability ports.

pub mod json_rpc;

pub use json_rpc::{JsonRpcDispatcher, PROTOCOL_VERSION, ServeError};
