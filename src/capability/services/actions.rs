//! Action catalog bound to the list and call operations.

use super::Repository;
use crate::capability::{
    domain::{ActionComponent, ActionList, ActionResponse, CapabilityError, CapabilityResult},
    ports::{Dispatcher, DispatcherResult, HandlerFuture, Operation, ProtocolFault},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// Parameters of an invoke request.
#[derive(Debug, Clone, Deserialize)]
pub struct CallParams {
    /// Prefixed action name.
    pub name: String,
    /// Raw arguments; absent means an empty object.
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl CallParams {
    /// Parses request parameters.
    ///
    /// # Errors
    ///
    /// Returns an `INVALID_PARAMS` fault when `name` is missing or not a string.
    pub fn from_value(params: Value) -> Result<Self, ProtocolFault> {
        serde_json::from_value(params)
            .map_err(|error| ProtocolFault::invalid_params(format!("invalid call params: {error}")))
    }

    fn into_parts(self) -> (String, Value) {
        let arguments = self
            .arguments
            .unwrap_or_else(|| Value::Object(Map::new()));
        (self.name, arguments)
    }
}

/// Repository of actions that answers `tools/list` and `tools/call`.
#[derive(Debug, Default)]
pub struct ActionRepository {
    catalog: Repository<dyn ActionComponent>,
}

impl ActionRepository {
    /// Creates an empty action repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Repository<dyn ActionComponent> {
        &self.catalog
    }

    /// Returns the descriptor list for `tools/list`.
    #[must_use]
    pub fn list(&self) -> ActionList {
        ActionList {
            tools: self.catalog.get_all_definitions(),
        }
    }

    /// Invokes `name` with raw arguments and renders the payload text.
    ///
    /// A string result is returned as-is; any other result is compact JSON.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` for unknown names, or the component's
    /// `INVALID_ARGS` and `EXECUTION_ERROR` failures.
    pub async fn call(&self, name: &str, arguments: Value) -> CapabilityResult<String> {
        let action = self
            .catalog
            .get(name)
            .ok_or_else(|| CapabilityError::not_found(name, format!("Unknown action: {name}")))?;
        let output = action.invoke(arguments).await?;
        Ok(render_payload(output))
    }

    /// Answers a `tools/call` request.
    ///
    /// Every failure after parameter parsing is reported inside the
    /// envelope with `isError` set.
    ///
    /// # Errors
    ///
    /// Returns an `INVALID_PARAMS` fault only when the parameters are malformed.
    pub async fn handle_call(&self, params: Value) -> Result<ActionResponse, ProtocolFault> {
        let (name, arguments) = CallParams::from_value(params)?.into_parts();
        debug!(action = %name, "handling action call");
        match self.call(&name, arguments).await {
            Ok(payload) => Ok(ActionResponse::success(payload)),
            Err(failure) => {
                error!(action = %name, kind = %failure.kind(), error = %failure, "action call failed");
                Ok(ActionResponse::failure(format!(
                    "Error executing action {name}: {failure}"
                )))
            }
        }
    }

    /// Installs the `tools/list` and `tools/call` handlers on `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's error when a handler cannot be installed.
    pub fn bind(self: &Arc<Self>, dispatcher: &dyn Dispatcher) -> DispatcherResult<()> {
        let lister = Arc::clone(self);
        dispatcher.register_handler(
            Operation::ListActions,
            Arc::new(move |_params: Value| -> HandlerFuture {
                let repository = Arc::clone(&lister);
                Box::pin(async move { to_wire(&repository.list()) })
            }),
        )?;

        let caller = Arc::clone(self);
        dispatcher.register_handler(
            Operation::InvokeAction,
            Arc::new(move |params: Value| -> HandlerFuture {
                let repository = Arc::clone(&caller);
                Box::pin(async move {
                    let response = repository.handle_call(params).await?;
                    to_wire(&response)
                })
            }),
        )
    }
}

fn render_payload(output: Value) -> String {
    match output {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

pub(super) fn to_wire<T: serde::Serialize>(response: &T) -> Result<Value, ProtocolFault> {
    serde_json::to_value(response)
        .map_err(|error| ProtocolFault::internal(format!("response serialisation failed: {error}")))
}
