//! Argument schemas: validation into typed values and wire description.
//!
//! Components only depend on [`ArgumentSchema`], so the validation library
//! behind a schema stays invisible to repositories and the dispatcher. The
//! wire descriptor is always a JSON Schema document.

use super::FieldViolation;
use jsonschema::JSONSchema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;

/// Validates raw arguments into `T` and describes itself as JSON Schema.
pub trait ArgumentSchema<T>: Send + Sync {
    /// Checks `raw` and converts it into the typed value.
    ///
    /// # Errors
    ///
    /// Returns every [`FieldViolation`] found when `raw` does not conform.
    fn validate(&self, raw: &Value) -> Result<T, Vec<FieldViolation>>;

    /// Returns the JSON Schema document advertised to clients.
    fn describe(&self) -> Value;
}

/// Error returned when a schema document cannot be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct SchemaCompileError(String);

/// Schema derived from a Rust type via `schemars`.
///
/// Raw input is first checked with `jsonschema` so violations carry their
/// JSON pointer, then deserialised with `serde`.
pub struct TypedSchema<T> {
    document: Value,
    validator: JSONSchema,
    marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T>
where
    T: DeserializeOwned + JsonSchema,
{
    /// Derives and compiles the schema for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaCompileError`] when the derived document is rejected
    /// by the validator.
    pub fn derive() -> Result<Self, SchemaCompileError> {
        let root = schemars::schema_for!(T);
        let document = serde_json::to_value(&root)
            .map_err(|error| SchemaCompileError(error.to_string()))?;
        let validator = compile(&document)?;
        Ok(Self {
            document,
            validator,
            marker: PhantomData,
        })
    }
}

impl<T> ArgumentSchema<T> for TypedSchema<T>
where
    T: DeserializeOwned + JsonSchema,
{
    fn validate(&self, raw: &Value) -> Result<T, Vec<FieldViolation>> {
        check(&self.validator, raw)?;
        serde_json::from_value(raw.clone())
            .map_err(|error| vec![FieldViolation::root(error.to_string())])
    }

    fn describe(&self) -> Value {
        self.document.clone()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TypedSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

/// Schema given as a literal JSON Schema document, yielding raw JSON.
///
/// Used for capabilities whose argument shape is only known at runtime.
pub struct DocumentSchema {
    document: Value,
    validator: JSONSchema,
}

impl DocumentSchema {
    /// Compiles a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaCompileError`] when the document is not a valid schema.
    pub fn new(document: Value) -> Result<Self, SchemaCompileError> {
        let validator = compile(&document)?;
        Ok(Self {
            document,
            validator,
        })
    }
}

impl ArgumentSchema<Value> for DocumentSchema {
    fn validate(&self, raw: &Value) -> Result<Value, Vec<FieldViolation>> {
        check(&self.validator, raw)?;
        Ok(raw.clone())
    }

    fn describe(&self) -> Value {
        self.document.clone()
    }
}

impl fmt::Debug for DocumentSchema {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DocumentSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

fn compile(document: &Value) -> Result<JSONSchema, SchemaCompileError> {
    JSONSchema::compile(document).map_err(|error| SchemaCompileError(error.to_string()))
}

fn check(validator: &JSONSchema, raw: &Value) -> Result<(), Vec<FieldViolation>> {
    validator.validate(raw).map_err(|errors| {
        errors
            .map(|error| FieldViolation::new(error.instance_path.to_string(), error.to_string()))
            .collect()
    })
}
