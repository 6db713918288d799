//! Bundled actions and templates.
//!
//! Each module returns a pure capability pair; nothing is registered until
//! [`bootstrap`] hands them to a [`Registry`].

pub mod add;
pub mod degpt_content;
pub mod echo;
pub mod git_workflow;

use crate::capability::domain::{BehaviourError, TemplateMessage};
use crate::capability::services::{Registry, RegistryResult};
use minijinja::Environment;
use serde::Serialize;

/// Registers every bundled capability with `registry`.
///
/// # Errors
///
/// Returns the first registration failure, such as a name collision with a
/// capability registered earlier.
pub fn bootstrap(registry: &Registry) -> RegistryResult<()> {
    registry.register_action(echo::capability()?)?;
    registry.register_action(add::capability()?)?;
    registry.register_template(git_workflow::capability()?)?;
    registry.register_template(degpt_content::capability()?)?;
    Ok(())
}

fn render_user_message<C: Serialize>(
    source: &str,
    context: &C,
) -> Result<TemplateMessage, BehaviourError> {
    let text = Environment::new().render_str(source, context)?;
    Ok(TemplateMessage::user(text))
}
