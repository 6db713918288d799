//! Namespace prefixing and validated capability identities.

use super::DefinitionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional namespace token prepended to every declared capability name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NamePrefix(Option<String>);

impl NamePrefix {
    /// Creates a prefix from an optional token.
    ///
    /// Empty or whitespace-only tokens disable prefixing.
    #[must_use]
    pub fn new(token: Option<impl Into<String>>) -> Self {
        let normalized = token
            .map(|value| value.into().trim().to_owned())
            .filter(|value| !value.is_empty());
        Self(normalized)
    }

    /// Returns a prefix that leaves names unchanged.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Returns the prefix token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Applies the prefix to a declared name.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        self.0
            .as_ref()
            .map_or_else(|| name.to_owned(), |token| format!("{token}_{name}"))
    }
}

impl From<&str> for NamePrefix {
    fn from(value: &str) -> Self {
        Self::new(Some(value))
    }
}

/// Wire identity of a registered component, already prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(String);

impl CapabilityName {
    /// Derives the wire identity for a declared name.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the declared name is empty or contains
    /// whitespace or control characters.
    pub fn prefixed(declared: &str, prefix: &NamePrefix) -> Result<Self, DefinitionError> {
        let normalized = validate_declared_name(declared)?;
        Ok(Self(prefix.apply(&normalized)))
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CapabilityName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Trims a declared name and rejects empty or whitespace-bearing values.
pub(super) fn validate_declared_name(declared: &str) -> Result<String, DefinitionError> {
    let normalized = declared.trim();
    if normalized.is_empty() {
        return Err(DefinitionError::EmptyName);
    }

    let has_invalid = normalized
        .chars()
        .any(|character| character.is_whitespace() || character.is_control());
    if has_invalid {
        return Err(DefinitionError::InvalidName(normalized.to_owned()));
    }

    Ok(normalized.to_owned())
}
