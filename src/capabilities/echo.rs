//! Action that returns its input message unchanged.

use crate::capability::domain::{
    ActionCapability, ActionDefinition, BehaviourError, DefinitionError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input of the `echo` action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct EchoInput {
    /// Message to echo.
    pub message: String,
}

/// Output of the `echo` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EchoOutput {
    /// The echoed message.
    pub message: String,
}

/// Builds the `echo` action.
///
/// # Errors
///
/// Returns [`DefinitionError`] when the derived schemas fail to compile.
pub fn capability() -> Result<ActionCapability<EchoInput, EchoOutput>, DefinitionError> {
    let definition = ActionDefinition::new("echo", "Echoes back the input")?;
    Ok(ActionCapability::new(definition, |input: EchoInput| async move {
        Ok::<_, BehaviourError>(EchoOutput {
            message: input.message,
        })
    }))
}
