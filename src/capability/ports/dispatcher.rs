//! Transport-agnostic request dispatcher port.

use crate::capability::domain::{CapabilityError, CapabilityErrorKind};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Result type for dispatcher wiring operations.
pub type DispatcherResult<T> = Result<T, DispatcherError>;

/// Future returned by a request handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, ProtocolFault>> + Send>>;

/// Handler invoked with the request parameters of one operation.
pub type RequestHandler = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// Protocol operations the registry binds handlers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Enumerate registered actions.
    ListActions,
    /// Invoke an action by name.
    InvokeAction,
    /// Enumerate registered templates.
    ListTemplates,
    /// Generate messages from a template by name.
    GenerateTemplate,
}

impl Operation {
    /// Every operation, in binding order.
    pub const ALL: [Self; 4] = [
        Self::ListActions,
        Self::InvokeAction,
        Self::ListTemplates,
        Self::GenerateTemplate,
    ];

    /// Returns the protocol method name.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::ListActions => "tools/list",
            Self::InvokeAction => "tools/call",
            Self::ListTemplates => "prompts/list",
            Self::GenerateTemplate => "prompts/get",
        }
    }

    /// Resolves a protocol method name.
    #[must_use]
    pub fn from_method(method: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.method() == method)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.method())
    }
}

/// Routing contract the registry binds its repositories to.
pub trait Dispatcher: Send + Sync {
    /// Installs `handler` for `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatcherError::HandlerAlreadyRegistered`] when the
    /// operation already has a handler, or [`DispatcherError::Unavailable`]
    /// when the dispatcher cannot accept handlers.
    fn register_handler(&self, operation: Operation, handler: RequestHandler)
    -> DispatcherResult<()>;
}

/// Errors returned while wiring handlers onto a dispatcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatcherError {
    /// The operation already has a handler.
    #[error("a handler for {0} is already registered")]
    HandlerAlreadyRegistered(Operation),

    /// The dispatcher cannot accept handlers.
    #[error("dispatcher unavailable: {0}")]
    Unavailable(String),
}

/// A hard protocol-level fault returned to the client instead of a result.
#[derive(Debug, Clone, Error)]
#[error("protocol fault {code}: {message}")]
pub struct ProtocolFault {
    code: i64,
    message: String,
    #[source]
    cause: Option<Box<CapabilityError>>,
}

impl ProtocolFault {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i64 = -32_700;
    /// The message is not a valid request object.
    pub const INVALID_REQUEST: i64 = -32_600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i64 = -32_601;
    /// The method parameters are invalid.
    pub const INVALID_PARAMS: i64 = -32_602;
    /// Internal server failure.
    pub const INTERNAL_ERROR: i64 = -32_603;

    /// Creates a fault with an explicit code.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an `INVALID_PARAMS` fault.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, message)
    }

    /// Creates an `INTERNAL_ERROR` fault.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL_ERROR, message)
    }

    /// Creates a `METHOD_NOT_FOUND` fault.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// Returns the numeric fault code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// Returns the fault message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the capability error behind this fault, if any.
    #[must_use]
    pub fn capability_error(&self) -> Option<&CapabilityError> {
        self.cause.as_deref()
    }
}

impl From<CapabilityError> for ProtocolFault {
    fn from(error: CapabilityError) -> Self {
        let code = match error.kind() {
            CapabilityErrorKind::NotFound | CapabilityErrorKind::InvalidArgs => {
                Self::INVALID_PARAMS
            }
            CapabilityErrorKind::ExecutionError | CapabilityErrorKind::AlreadyExists => {
                Self::INTERNAL_ERROR
            }
        };
        Self {
            code,
            message: error.to_string(),
            cause: Some(Box::new(error)),
        }
    }
}
