//! Template asking for text to be rewritten without stock LLM phrasing.

use super::render_user_message;
use crate::capability::domain::{DefinitionError, TemplateCapability, TemplateDefinition};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments of the `degpt-content` template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DegptContentArgs {
    /// Text content to process.
    pub content: String,
}

const PROMPT: &str = r#"Review and revise this text to remove common AI language patterns like:
- Phrases that start with "This isn't X, it's Y"
- Marketing buzzwords like "game changer", "revolutionary", "groundbreaking"
- Overly enthusiastic or artificial-sounding language
- Repetitive acknowledgments and confirmations
- Unnecessarily formal or robotic transitions

Here is the text to process:

{{ content }}

Provide the revised text with natural, straightforward language."#;

/// Builds the `degpt-content` template.
///
/// # Errors
///
/// Returns [`DefinitionError`] when the derived schema fails to compile.
pub fn capability() -> Result<TemplateCapability<DegptContentArgs>, DefinitionError> {
    let definition = TemplateDefinition::new(
        "degpt-content",
        "Remove common LLM/GPT language patterns and mannerisms from text",
    )?;
    Ok(TemplateCapability::new(definition, |args: DegptContentArgs| async move {
        render_user_message(PROMPT, &args).map(|message| vec![message])
    }))
}
