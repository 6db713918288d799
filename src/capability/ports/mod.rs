//! Port contracts for capability dispatch.
//!
//! The registry only knows the dispatcher through [`Dispatcher`]; transport
//! framing lives in adapters.

pub mod dispatcher;

pub use dispatcher::{
    Dispatcher, DispatcherError, DispatcherResult, HandlerFuture, Operation, ProtocolFault,
    RequestHandler,
};
