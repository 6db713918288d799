//! Capability definitions and their definition-plus-behaviour pairs.

use super::{
    ArgumentSchema, DefinitionError, SchemaCompileError, TemplateMessage, TypedSchema,
    name::validate_declared_name,
};
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Failure returned by a capability behaviour.
pub type BehaviourError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by capability behaviours.
pub type BehaviourFuture<T> = Pin<Box<dyn Future<Output = Result<T, BehaviourError>> + Send>>;

/// Type-erased async action behaviour.
pub type ActionBehaviour<I, O> = Box<dyn Fn(I) -> BehaviourFuture<O> + Send + Sync>;

/// Type-erased async template generator.
pub type TemplateBehaviour<A> = Box<dyn Fn(A) -> BehaviourFuture<Vec<TemplateMessage>> + Send + Sync>;

/// Declared identity and schemas of an action.
pub struct ActionDefinition<I, O> {
    name: String,
    description: String,
    input_schema: Box<dyn ArgumentSchema<I>>,
    output_schema: Box<dyn ArgumentSchema<O>>,
}

impl<I, O> ActionDefinition<I, O>
where
    I: DeserializeOwned + JsonSchema + 'static,
    O: Serialize + DeserializeOwned + JsonSchema + 'static,
{
    /// Creates a definition whose schemas are derived from `I` and `O`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name or description is invalid or
    /// a derived schema fails to compile.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        let (valid_name, valid_description) = normalize_identity(name, description)?;
        let input_schema =
            TypedSchema::<I>::derive().map_err(|error| schema_error(&valid_name, &error))?;
        let output_schema =
            TypedSchema::<O>::derive().map_err(|error| schema_error(&valid_name, &error))?;
        Ok(Self {
            name: valid_name,
            description: valid_description,
            input_schema: Box::new(input_schema),
            output_schema: Box::new(output_schema),
        })
    }
}

impl<I, O> ActionDefinition<I, O> {
    /// Creates a definition from explicit schemas.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name or description is invalid.
    pub fn with_schemas(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: impl ArgumentSchema<I> + 'static,
        output_schema: impl ArgumentSchema<O> + 'static,
    ) -> Result<Self, DefinitionError> {
        let (valid_name, valid_description) = normalize_identity(name, description)?;
        Ok(Self {
            name: valid_name,
            description: valid_description,
            input_schema: Box::new(input_schema),
            output_schema: Box::new(output_schema),
        })
    }

    /// Returns the declared, unprefixed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the input schema.
    #[must_use]
    pub fn input_schema(&self) -> &dyn ArgumentSchema<I> {
        self.input_schema.as_ref()
    }

    /// Returns the output schema.
    #[must_use]
    pub fn output_schema(&self) -> &dyn ArgumentSchema<O> {
        self.output_schema.as_ref()
    }
}

impl<I, O> fmt::Debug for ActionDefinition<I, O> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Declared identity and arguments schema of a template.
pub struct TemplateDefinition<A> {
    name: String,
    description: String,
    args_schema: Box<dyn ArgumentSchema<A>>,
}

impl<A> TemplateDefinition<A>
where
    A: DeserializeOwned + JsonSchema + 'static,
{
    /// Creates a definition whose schema is derived from `A`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name or description is invalid or
    /// the derived schema fails to compile.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        let (valid_name, valid_description) = normalize_identity(name, description)?;
        let args_schema =
            TypedSchema::<A>::derive().map_err(|error| schema_error(&valid_name, &error))?;
        Ok(Self {
            name: valid_name,
            description: valid_description,
            args_schema: Box::new(args_schema),
        })
    }
}

impl<A> TemplateDefinition<A> {
    /// Creates a definition from an explicit schema.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the name or description is invalid.
    pub fn with_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        args_schema: impl ArgumentSchema<A> + 'static,
    ) -> Result<Self, DefinitionError> {
        let (valid_name, valid_description) = normalize_identity(name, description)?;
        Ok(Self {
            name: valid_name,
            description: valid_description,
            args_schema: Box::new(args_schema),
        })
    }

    /// Returns the declared, unprefixed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the arguments schema.
    #[must_use]
    pub fn args_schema(&self) -> &dyn ArgumentSchema<A> {
        self.args_schema.as_ref()
    }
}

impl<A> fmt::Debug for TemplateDefinition<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TemplateDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// An action definition paired with its behaviour, not yet registered.
pub struct ActionCapability<I, O> {
    /// Declared identity and schemas.
    pub definition: ActionDefinition<I, O>,
    /// Behaviour invoked with validated input.
    pub behaviour: ActionBehaviour<I, O>,
}

impl<I, O> ActionCapability<I, O> {
    /// Pairs a definition with an async behaviour.
    #[must_use]
    pub fn new<F, Fut>(definition: ActionDefinition<I, O>, behaviour: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, BehaviourError>> + Send + 'static,
    {
        Self {
            definition,
            behaviour: Box::new(move |input| -> BehaviourFuture<O> { Box::pin(behaviour(input)) }),
        }
    }
}

impl<I, O> fmt::Debug for ActionCapability<I, O> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ActionCapability")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// A template definition paired with its generator, not yet registered.
pub struct TemplateCapability<A> {
    /// Declared identity and schema.
    pub definition: TemplateDefinition<A>,
    /// Generator invoked with validated arguments.
    pub behaviour: TemplateBehaviour<A>,
}

impl<A> TemplateCapability<A> {
    /// Pairs a definition with an async generator.
    #[must_use]
    pub fn new<F, Fut>(definition: TemplateDefinition<A>, behaviour: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<TemplateMessage>, BehaviourError>> + Send + 'static,
    {
        Self {
            definition,
            behaviour: Box::new(move |args| -> BehaviourFuture<Vec<TemplateMessage>> {
                Box::pin(behaviour(args))
            }),
        }
    }
}

impl<A> fmt::Debug for TemplateCapability<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TemplateCapability")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

fn normalize_identity(
    name: impl Into<String>,
    description: impl Into<String>,
) -> Result<(String, String), DefinitionError> {
    let normalized_name = validate_declared_name(&name.into())?;
    let normalized_description = description.into().trim().to_owned();
    if normalized_description.is_empty() {
        return Err(DefinitionError::EmptyDescription);
    }
    Ok((normalized_name, normalized_description))
}

fn schema_error(name: &str, error: &SchemaCompileError) -> DefinitionError {
    DefinitionError::Schema {
        name: name.to_owned(),
        reason: error.to_string(),
    }
}
