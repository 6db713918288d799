//! Client-facing descriptors, messages, and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the single argument every template descriptor advertises.
pub const TEMPLATE_ARGUMENT_NAME: &str = "args";

/// A typed content fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// Text body.
        text: String,
    },
}

impl ContentPart {
    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Returns the text body.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// Speaker of a generated template message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message authored on behalf of the user.
    User,
    /// Message authored on behalf of the assistant.
    Assistant,
}

/// A message produced by a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMessage {
    /// Message speaker.
    pub role: MessageRole,
    /// Message content.
    pub content: ContentPart,
}

impl TemplateMessage {
    /// Creates a user text message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: ContentPart::text(text),
        }
    }

    /// Creates an assistant text message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: ContentPart::text(text),
        }
    }
}

/// Wire descriptor of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    /// Prefixed wire name.
    pub name: String,
    /// Human-readable summary.
    pub description: String,
    /// JSON Schema for accepted arguments.
    pub input_schema: Value,
    /// JSON Schema for produced results.
    pub output_schema: Value,
}

/// A named template parameter in the single-parameter convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateArgument {
    /// Parameter name; always [`TEMPLATE_ARGUMENT_NAME`].
    pub name: String,
    /// Parameter summary.
    pub description: String,
    /// JSON Schema of the parameter value.
    pub schema: Value,
    /// Whether the parameter must be supplied.
    pub required: bool,
}

/// Wire descriptor of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDescriptor {
    /// Prefixed wire name.
    pub name: String,
    /// Human-readable summary.
    pub description: String,
    /// JSON Schema for accepted arguments.
    pub args_schema: Value,
    /// The arguments schema wrapped as a single `args` parameter.
    pub arguments: Vec<TemplateArgument>,
}

impl TemplateDescriptor {
    /// Builds a descriptor, wrapping `args_schema` in the `args` parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, args_schema: Value) -> Self {
        let arguments = vec![TemplateArgument {
            name: TEMPLATE_ARGUMENT_NAME.to_owned(),
            description: "Template arguments".to_owned(),
            schema: args_schema.clone(),
            required: true,
        }];
        Self {
            name: name.into(),
            description: description.into(),
            args_schema,
            arguments,
        }
    }
}

/// Response to an action invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    /// Payload fragments.
    pub content: Vec<ContentPart>,
    /// Set when the payload describes a failure.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ActionResponse {
    /// Wraps a successful payload.
    #[must_use]
    pub fn success(payload: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::text(payload)],
            is_error: false,
        }
    }

    /// Wraps an error description.
    #[must_use]
    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::text(description)],
            is_error: true,
        }
    }

    /// Returns the payload text, joining fragments.
    #[must_use]
    pub fn payload(&self) -> String {
        self.content
            .iter()
            .map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Response to the list-actions operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionList {
    /// Registered action descriptors.
    pub tools: Vec<ActionDescriptor>,
}

/// Response to the list-templates operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateList {
    /// Registered template descriptors.
    pub prompts: Vec<TemplateDescriptor>,
}

/// Response to a template generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateResponse {
    /// Generated messages.
    pub messages: Vec<TemplateMessage>,
}
