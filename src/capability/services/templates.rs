//! Template catalog bound to the list and get operations.

use super::{Repository, actions::CallParams, actions::to_wire};
use crate::capability::{
    domain::{
        CapabilityError, CapabilityResult, TemplateComponent, TemplateList, TemplateMessage,
        TemplateResponse,
    },
    ports::{Dispatcher, DispatcherResult, HandlerFuture, Operation, ProtocolFault},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// Repository of templates that answers `prompts/list` and `prompts/get`.
#[derive(Debug, Default)]
pub struct TemplateRepository {
    catalog: Repository<dyn TemplateComponent>,
}

impl TemplateRepository {
    /// Creates an empty template repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Repository<dyn TemplateComponent> {
        &self.catalog
    }

    /// Returns the descriptor list for `prompts/list`.
    #[must_use]
    pub fn list(&self) -> TemplateList {
        TemplateList {
            prompts: self.catalog.get_all_definitions(),
        }
    }

    /// Generates the messages of template `name`.
    ///
    /// # Errors
    ///
    /// Returns `NOT_FOUND` for unknown names, or the component's
    /// `INVALID_ARGS` and `EXECUTION_ERROR` failures.
    pub async fn get_messages(
        &self,
        name: &str,
        arguments: Value,
    ) -> CapabilityResult<Vec<TemplateMessage>> {
        let template = self
            .catalog
            .get(name)
            .ok_or_else(|| CapabilityError::not_found(name, format!("Unknown template: {name}")))?;
        template.generate(arguments).await
    }

    /// Answers a `prompts/get` request.
    ///
    /// # Errors
    ///
    /// Every failure is raised as a [`ProtocolFault`]; a template that
    /// produced nothing has no partial response to return.
    pub async fn handle_get(&self, params: Value) -> Result<TemplateResponse, ProtocolFault> {
        let CallParams { name, arguments } = CallParams::from_value(params)?;
        let raw_arguments = arguments.unwrap_or_else(|| Value::Object(Map::new()));
        debug!(template = %name, "handling template request");
        match self.get_messages(&name, raw_arguments).await {
            Ok(messages) => Ok(TemplateResponse { messages }),
            Err(failure) => {
                error!(template = %name, kind = %failure.kind(), error = %failure, "template generation failed");
                Err(ProtocolFault::from(failure))
            }
        }
    }

    /// Installs the `prompts/list` and `prompts/get` handlers on `dispatcher`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's error when a handler cannot be installed.
    pub fn bind(self: &Arc<Self>, dispatcher: &dyn Dispatcher) -> DispatcherResult<()> {
        let lister = Arc::clone(self);
        dispatcher.register_handler(
            Operation::ListTemplates,
            Arc::new(move |_params: Value| -> HandlerFuture {
                let repository = Arc::clone(&lister);
                Box::pin(async move { to_wire(&repository.list()) })
            }),
        )?;

        let generator = Arc::clone(self);
        dispatcher.register_handler(
            Operation::GenerateTemplate,
            Arc::new(move |params: Value| -> HandlerFuture {
                let repository = Arc::clone(&generator);
                Box::pin(async move {
                    let response = repository.handle_get(params).await?;
                    to_wire(&response)
                })
            }),
        )
    }
}
