//! Newline-delimited JSON-RPC 2.0 dispatcher.

use crate::capability::ports::{
    Dispatcher, DispatcherError, DispatcherResult, Operation, ProtocolFault, RequestHandler,
};
use crate::config::ServerConfig;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::io;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const JSONRPC_VERSION: &str = "2.0";

/// Errors that end the serving loop.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Reading a request or writing a response failed.
    #[error("transport I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Serialize)]
struct ResponseFrame {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorObject>,
}

#[derive(Debug, Serialize)]
struct ErrorObject {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl ResponseFrame {
    const fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    fn fault(id: Value, fault: &ProtocolFault) -> Self {
        let data = fault.capability_error().map(|cause| {
            json!({
                "kind": cause.kind(),
                "component": cause.component(),
                "violations": cause.violations(),
            })
        });
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(ErrorObject {
                code: fault.code(),
                message: fault.message().to_owned(),
                data,
            }),
        }
    }

    fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|error| {
            format!(
                r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":{},"message":"response encoding failed: {}"}}}}"#,
                ProtocolFault::INTERNAL_ERROR,
                error.to_string().escape_default()
            )
        })
    }
}

/// Dispatcher routing JSON-RPC methods to registered handlers.
pub struct JsonRpcDispatcher {
    server_name: String,
    server_version: String,
    handlers: RwLock<HashMap<Operation, RequestHandler>>,
}

impl JsonRpcDispatcher {
    /// Creates a dispatcher advertising the configured server identity.
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            server_name: config.server_name.clone(),
            server_version: config.server_version.clone(),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Returns `true` when `operation` has a handler.
    #[must_use]
    pub fn has_handler(&self, operation: Operation) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&operation)
    }

    /// Routes `method` with `params` and returns the result value.
    ///
    /// # Errors
    ///
    /// Returns `METHOD_NOT_FOUND` for unknown or unbound methods, or the
    /// handler's fault.
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Value, ProtocolFault> {
        match method {
            "initialize" => return Ok(self.initialize_result()),
            "ping" => return Ok(Value::Object(Map::new())),
            _ => {}
        }
        let handler = Operation::from_method(method)
            .and_then(|operation| {
                self.handlers
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&operation)
                    .cloned()
            })
            .ok_or_else(|| ProtocolFault::method_not_found(method))?;
        handler(params).await
    }

    /// Handles one JSON-RPC message and returns the encoded response.
    ///
    /// Notifications produce no response.
    pub async fn handle_message(&self, line: &str) -> Option<String> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(error) => {
                warn!(error = %error, "rejecting unparseable message");
                return Some(parse_error(&error));
            }
        };

        let Value::Object(mut request) = message else {
            let fault = ProtocolFault::new(ProtocolFault::INVALID_REQUEST, "Invalid Request");
            return Some(ResponseFrame::fault(Value::Null, &fault).encode());
        };
        let id = request.remove("id");
        let Some(method) = request
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_owned)
        else {
            let fault = ProtocolFault::new(
                ProtocolFault::INVALID_REQUEST,
                "Invalid Request: missing method",
            );
            return Some(ResponseFrame::fault(id.unwrap_or(Value::Null), &fault).encode());
        };

        let Some(request_id) = id else {
            debug!(method = %method, "ignoring notification");
            return None;
        };

        let params = request
            .remove("params")
            .unwrap_or_else(|| Value::Object(Map::new()));
        debug!(method = %method, "dispatching request");
        let frame = match self.dispatch(&method, params).await {
            Ok(result) => ResponseFrame::result(request_id, result),
            Err(fault) => {
                debug!(method = %method, code = fault.code(), "request faulted");
                ResponseFrame::fault(request_id, &fault)
            }
        };
        Some(frame.encode())
    }

    /// Serves newline-delimited requests from `reader` until end of input.
    ///
    /// A line that is not valid UTF-8 is answered with a parse error and the
    /// session continues.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError::Io`] when reading or writing fails.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), ServeError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(server = %self.server_name, "serving requests");
        let mut buffer = Vec::new();
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer).await? == 0 {
                break;
            }
            let response = match std::str::from_utf8(&buffer) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_message(line).await,
                Err(error) => {
                    warn!(error = %error, "rejecting non-UTF-8 message");
                    Some(parse_error(&error))
                }
            };
            if let Some(frame) = response {
                writer.write_all(frame.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        info!("input closed");
        Ok(())
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "prompts": {},
            },
            "serverInfo": {
                "name": self.server_name,
                "version": self.server_version,
            },
        })
    }
}

fn parse_error(detail: &dyn std::fmt::Display) -> String {
    let fault = ProtocolFault::new(ProtocolFault::PARSE_ERROR, format!("Parse error: {detail}"));
    ResponseFrame::fault(Value::Null, &fault).encode()
}

impl Dispatcher for JsonRpcDispatcher {
    fn register_handler(
        &self,
        operation: Operation,
        handler: RequestHandler,
    ) -> DispatcherResult<()> {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if handlers.contains_key(&operation) {
            return Err(DispatcherError::HandlerAlreadyRegistered(operation));
        }
        handlers.insert(operation, handler);
        debug!(method = operation.method(), "handler registered");
        Ok(())
    }
}

impl std::fmt::Debug for JsonRpcDispatcher {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut operations: Vec<Operation> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        operations.sort();
        formatter
            .debug_struct("JsonRpcDispatcher")
            .field("server_name", &self.server_name)
            .field("operations", &operations)
            .finish()
    }
}
