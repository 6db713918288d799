//! Error taxonomy shared by every capability kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared, cloneable cause attached to capability errors.
pub type SharedCause = Arc<dyn std::error::Error + Send + Sync>;

/// Result type for capability lookup, registration, and invocation.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Tagged failure kinds reported for capability operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityErrorKind {
    /// Lookup by name found nothing.
    NotFound,
    /// A component with the same name is already registered.
    AlreadyExists,
    /// Raw arguments failed schema validation.
    InvalidArgs,
    /// The capability behaviour failed after validation passed.
    ExecutionError,
}

impl CapabilityErrorKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::InvalidArgs => "INVALID_ARGS",
            Self::ExecutionError => "EXECUTION_ERROR",
        }
    }
}

impl fmt::Display for CapabilityErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single schema violation located by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// JSON pointer into the raw arguments; empty for the document root.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation for the given pointer.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a violation located at the document root.
    #[must_use]
    pub fn root(message: impl Into<String>) -> Self {
        Self::new("", message)
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            formatter.write_str(&self.message)
        } else {
            write!(formatter, "{}: {}", self.path, self.message)
        }
    }
}

/// Error raised by a repository or component.
///
/// Every error names the component it concerns. Execution failures keep the
/// behaviour's original error as [`std::error::Error::source`].
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct CapabilityError {
    kind: CapabilityErrorKind,
    message: String,
    component: String,
    violations: Vec<FieldViolation>,
    #[source]
    cause: Option<SharedCause>,
}

impl CapabilityError {
    fn new(kind: CapabilityErrorKind, component: &str, message: String) -> Self {
        Self {
            kind,
            message,
            component: component.to_owned(),
            violations: Vec::new(),
            cause: None,
        }
    }

    /// Lookup for `component` failed.
    #[must_use]
    pub fn not_found(component: &str, message: impl Into<String>) -> Self {
        Self::new(CapabilityErrorKind::NotFound, component, message.into())
    }

    /// A component named `component` is already registered.
    #[must_use]
    pub fn already_exists(component: &str) -> Self {
        Self::new(
            CapabilityErrorKind::AlreadyExists,
            component,
            format!("component {component} already registered"),
        )
    }

    /// Arguments for `component` violated its schema.
    #[must_use]
    pub fn invalid_args(component: &str, violations: Vec<FieldViolation>) -> Self {
        let detail = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let mut error = Self::new(
            CapabilityErrorKind::InvalidArgs,
            component,
            format!("invalid arguments for {component}: {detail}"),
        );
        error.violations = violations;
        error
    }

    /// The behaviour of `component` failed with `cause`.
    #[must_use]
    pub fn execution(component: &str, cause: impl Into<SharedCause>) -> Self {
        let shared = cause.into();
        let mut error = Self::new(
            CapabilityErrorKind::ExecutionError,
            component,
            format!("{component} failed: {shared}"),
        );
        error.cause = Some(shared);
        error
    }

    /// Returns the failure kind.
    #[must_use]
    pub const fn kind(&self) -> CapabilityErrorKind {
        self.kind
    }

    /// Returns the message without the kind tag.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the name of the offending component.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Returns schema violations; empty unless the kind is `INVALID_ARGS`.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns the retained behaviour failure, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&SharedCause> {
        self.cause.as_ref()
    }
}

/// Errors returned while constructing capability definitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// The capability name is empty after trimming.
    #[error("capability name must not be empty")]
    EmptyName,

    /// The capability name contains whitespace or control characters.
    #[error("capability name '{0}' must not contain whitespace or control characters")]
    InvalidName(String),

    /// The capability description is empty after trimming.
    #[error("capability description must not be empty")]
    EmptyDescription,

    /// A derived schema could not be compiled into a validator.
    #[error("schema for '{name}' could not be compiled: {reason}")]
    Schema {
        /// Capability name.
        name: String,
        /// Compiler diagnostic.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_is_tagged_with_kind() {
        let error = CapabilityError::not_found("mcp_add", "Unknown action: mcp_add");

        assert_eq!(error.to_string(), "NOT_FOUND: Unknown action: mcp_add");
        assert_eq!(error.component(), "mcp_add");
    }

    #[test]
    fn execution_error_keeps_original_cause() {
        let cause: SharedCause = Arc::new(std::io::Error::other("socket closed"));
        let error = CapabilityError::execution("fetch", cause);

        assert_eq!(error.kind(), CapabilityErrorKind::ExecutionError);
        let source = error.source().expect("cause should be exposed as source");
        assert_eq!(source.to_string(), "socket closed");
    }

    #[test]
    fn invalid_args_lists_each_violation() {
        let error = CapabilityError::invalid_args(
            "add",
            vec![
                FieldViolation::new("/a", "\"x\" is not of type \"number\""),
                FieldViolation::root("\"b\" is a required property"),
            ],
        );

        assert_eq!(error.violations().len(), 2);
        assert!(error.message().contains("/a: \"x\" is not of type \"number\""));
        assert!(error.source().is_none());
    }
}
