//! Domain model for capability definitions and components.
//!
//! A capability is declared as a pure definition plus behaviour pair. It
//! becomes a component once a namespace prefix is applied. Components
//! validate raw arguments against their schema before the behaviour runs,
//! and report failures with the shared [`CapabilityErrorKind`] taxonomy.
//! Infrastructure concerns remain outside this boundary.

mod component;
mod definition;
mod error;
mod name;
mod schema;
mod wire;

pub use component::{Action, ActionComponent, Component, Template, TemplateComponent};
pub use definition::{
    ActionBehaviour, ActionCapability, ActionDefinition, BehaviourError, BehaviourFuture,
    TemplateBehaviour, TemplateCapability, TemplateDefinition,
};
pub use error::{
    CapabilityError, CapabilityErrorKind, CapabilityResult, DefinitionError, FieldViolation,
    SharedCause,
};
pub use name::{CapabilityName, NamePrefix};
pub use schema::{ArgumentSchema, DocumentSchema, SchemaCompileError, TypedSchema};
pub use wire::{
    ActionDescriptor, ActionList, ActionResponse, ContentPart, MessageRole, TEMPLATE_ARGUMENT_NAME,
    TemplateArgument, TemplateDescriptor, TemplateList, TemplateMessage, TemplateResponse,
};
