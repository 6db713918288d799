//! Template asking for a commit message and the commands to publish it.

use super::render_user_message;
use crate::capability::domain::{DefinitionError, TemplateCapability, TemplateDefinition};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments of the `git-workflow` template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GitWorkflowArgs {
    /// Git diff or description of changes.
    pub changes: String,
}

const PROMPT: &str = r#"Generate a concise but descriptive commit message for these changes and return the full git workflow commands:

{{ changes }}

Respond with the exact commands to run in this format:

git add .
git commit -m "{generated commit message}"
git push"#;

/// Builds the `git-workflow` template.
///
/// # Errors
///
/// Returns [`DefinitionError`] when the derived schema fails to compile.
pub fn capability() -> Result<TemplateCapability<GitWorkflowArgs>, DefinitionError> {
    let definition = TemplateDefinition::new(
        "git-workflow",
        "Generate Git add, commit and push workflow commands",
    )?;
    Ok(TemplateCapability::new(definition, |args: GitWorkflowArgs| async move {
        render_user_message(PROMPT, &args).map(|message| vec![message])
    }))
}
