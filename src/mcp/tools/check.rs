//! Input schema for the check_latex_syntax tool.

use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CheckInput {
    /// LaTeX expression to validate (max 10,000 chars).
    pub latex: String,
}
