//! Runtime components wrapping a definition and its behaviour.

use super::{
    ActionBehaviour, ActionCapability, ActionDefinition, ActionDescriptor, CapabilityError,
    CapabilityName, CapabilityResult, DefinitionError, NamePrefix, SharedCause,
    TemplateBehaviour, TemplateCapability, TemplateDefinition, TemplateDescriptor,
    TemplateMessage,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Identity and descriptor shared by every component kind.
pub trait Component: Send + Sync {
    /// Client-facing descriptor produced for list operations.
    type Descriptor;

    /// Returns the prefixed wire identity.
    fn name(&self) -> &CapabilityName;

    /// Returns the human-readable summary.
    fn description(&self) -> &str;

    /// Returns the wire descriptor, named with the prefixed identity.
    fn descriptor(&self) -> Self::Descriptor;
}

/// Invocation contract for actions.
#[async_trait]
pub trait ActionComponent: Component<Descriptor = ActionDescriptor> {
    /// Validates `raw` and runs the behaviour, returning its serialised output.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGS` when validation fails (the behaviour is not
    /// called) and `EXECUTION_ERROR` when the behaviour fails.
    async fn invoke(&self, raw: Value) -> CapabilityResult<Value>;
}

/// Generation contract for templates.
#[async_trait]
pub trait TemplateComponent: Component<Descriptor = TemplateDescriptor> {
    /// Validates `raw` and runs the generator.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_ARGS` when validation fails (the generator is not
    /// called) and `EXECUTION_ERROR` when the generator fails.
    async fn generate(&self, raw: Value) -> CapabilityResult<Vec<TemplateMessage>>;
}

/// Registered action built from an [`ActionCapability`].
pub struct Action<I, O> {
    name: CapabilityName,
    definition: ActionDefinition<I, O>,
    behaviour: ActionBehaviour<I, O>,
}

impl<I, O> Action<I, O> {
    /// Builds the component, deriving its prefixed name once.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the declared name is invalid.
    pub fn new(
        capability: ActionCapability<I, O>,
        prefix: &NamePrefix,
    ) -> Result<Self, DefinitionError> {
        let ActionCapability {
            definition,
            behaviour,
        } = capability;
        let name = CapabilityName::prefixed(definition.name(), prefix)?;
        Ok(Self {
            name,
            definition,
            behaviour,
        })
    }

    /// Returns the wrapped definition.
    #[must_use]
    pub const fn definition(&self) -> &ActionDefinition<I, O> {
        &self.definition
    }
}

impl<I, O> Component for Action<I, O> {
    type Descriptor = ActionDescriptor;

    fn name(&self) -> &CapabilityName {
        &self.name
    }

    fn description(&self) -> &str {
        self.definition.description()
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: self.name.to_string(),
            description: self.definition.description().to_owned(),
            input_schema: self.definition.input_schema().describe(),
            output_schema: self.definition.output_schema().describe(),
        }
    }
}

#[async_trait]
impl<I, O> ActionComponent for Action<I, O>
where
    I: Send + 'static,
    O: Serialize + Send + 'static,
{
    async fn invoke(&self, raw: Value) -> CapabilityResult<Value> {
        let input = self
            .definition
            .input_schema()
            .validate(&raw)
            .map_err(|violations| CapabilityError::invalid_args(self.name.as_str(), violations))?;

        let output = (self.behaviour)(input)
            .await
            .map_err(|cause| CapabilityError::execution(self.name.as_str(), cause))?;

        serde_json::to_value(output).map_err(|error| {
            let cause: SharedCause = Arc::new(error);
            CapabilityError::execution(self.name.as_str(), cause)
        })
    }
}

impl<I, O> fmt::Debug for Action<I, O> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Action")
            .field("name", &self.name)
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Registered template built from a [`TemplateCapability`].
pub struct Template<A> {
    name: CapabilityName,
    definition: TemplateDefinition<A>,
    behaviour: TemplateBehaviour<A>,
}

impl<A> Template<A> {
    /// Builds the component, deriving its prefixed name once.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the declared name is invalid.
    pub fn new(
        capability: TemplateCapability<A>,
        prefix: &NamePrefix,
    ) -> Result<Self, DefinitionError> {
        let TemplateCapability {
            definition,
            behaviour,
        } = capability;
        let name = CapabilityName::prefixed(definition.name(), prefix)?;
        Ok(Self {
            name,
            definition,
            behaviour,
        })
    }

    /// Returns the wrapped definition.
    #[must_use]
    pub const fn definition(&self) -> &TemplateDefinition<A> {
        &self.definition
    }
}

impl<A> Component for Template<A> {
    type Descriptor = TemplateDescriptor;

    fn name(&self) -> &CapabilityName {
        &self.name
    }

    fn description(&self) -> &str {
        self.definition.description()
    }

    fn descriptor(&self) -> TemplateDescriptor {
        TemplateDescriptor::new(
            self.name.as_str(),
            self.definition.description(),
            self.definition.args_schema().describe(),
        )
    }
}

#[async_trait]
impl<A> TemplateComponent for Template<A>
where
    A: Send + 'static,
{
    async fn generate(&self, raw: Value) -> CapabilityResult<Vec<TemplateMessage>> {
        let args = self
            .definition
            .args_schema()
            .validate(&raw)
            .map_err(|violations| CapabilityError::invalid_args(self.name.as_str(), violations))?;

        (self.behaviour)(args)
            .await
            .map_err(|cause| CapabilityError::execution(self.name.as_str(), cause))
    }
}

impl<A> fmt::Debug for Template<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Template")
            .field("name", &self.name)
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::domain::{BehaviourError, CapabilityErrorKind};
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize, JsonSchema)]
    struct AddInput {
        a: f64,
        b: f64,
    }

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct AddOutput {
        result: f64,
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Topic {
        topic: String,
    }

    fn counting_add(calls: Arc<AtomicUsize>) -> ActionCapability<AddInput, AddOutput> {
        let definition = ActionDefinition::new("add", "Adds two numbers").expect("valid definition");
        ActionCapability::new(definition, move |input: AddInput| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok::<_, BehaviourError>(AddOutput {
                    result: input.a + input.b,
                })
            }
        })
    }

    #[test]
    fn descriptor_uses_prefixed_name() {
        let calls = Arc::new(AtomicUsize::new(0));
        let action = Action::new(counting_add(calls), &NamePrefix::from("mcp")).expect("valid action");

        let descriptor = action.descriptor();

        assert_eq!(action.name().as_str(), "mcp_add");
        assert_eq!(action.definition().name(), "add");
        assert_eq!(descriptor.name, "mcp_add");
        assert_eq!(descriptor.description, "Adds two numbers");
        assert_eq!(descriptor.input_schema["properties"]["a"]["type"], "number");
        assert_eq!(descriptor.output_schema["properties"]["result"]["type"], "number");
    }

    #[tokio::test]
    async fn valid_arguments_reach_the_behaviour() {
        let calls = Arc::new(AtomicUsize::new(0));
        let action = Action::new(counting_add(calls.clone()), &NamePrefix::none()).expect("valid action");

        let output = action
            .invoke(json!({"a": 2, "b": 3}))
            .await
            .expect("invocation should succeed");

        assert_eq!(output, json!({"result": 5.0}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_behaviour() {
        let calls = Arc::new(AtomicUsize::new(0));
        let action = Action::new(counting_add(calls.clone()), &NamePrefix::none()).expect("valid action");

        let error = action
            .invoke(json!({"a": "x", "b": 3}))
            .await
            .expect_err("invocation should be rejected");

        assert_eq!(error.kind(), CapabilityErrorKind::InvalidArgs);
        assert_eq!(error.component(), "add");
        assert!(error.violations().iter().any(|violation| violation.path == "/a"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn behaviour_failure_is_wrapped_with_cause() {
        let definition =
            ActionDefinition::<AddInput, AddOutput>::new("divide", "Divides").expect("valid definition");
        let capability = ActionCapability::new(definition, |_input: AddInput| async {
            Err::<AddOutput, BehaviourError>("division by zero".into())
        });
        let action = Action::new(capability, &NamePrefix::none()).expect("valid action");

        let error = action
            .invoke(json!({"a": 1, "b": 0}))
            .await
            .expect_err("behaviour should fail");

        assert_eq!(error.kind(), CapabilityErrorKind::ExecutionError);
        assert_eq!(
            error.source().map(ToString::to_string).as_deref(),
            Some("division by zero")
        );
    }

    #[tokio::test]
    async fn template_generates_messages_from_typed_arguments() {
        let definition =
            TemplateDefinition::<Topic>::new("brief", "Writes a brief").expect("valid definition");
        let capability = TemplateCapability::new(definition, |args: Topic| async move {
            Ok::<_, BehaviourError>(vec![TemplateMessage::user(format!(
                "Write about {}",
                args.topic
            ))])
        });
        let template = Template::new(capability, &NamePrefix::from("mcp")).expect("valid template");

        let messages = template
            .generate(json!({"topic": "rust"}))
            .await
            .expect("generation should succeed");

        assert_eq!(template.descriptor().name, "mcp_brief");
        assert_eq!(template.definition().name(), "brief");
        assert_eq!(messages, vec![TemplateMessage::user("Write about rust")]);
    }
}
