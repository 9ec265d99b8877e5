//! MCP link tool: hosted-renderer URL for an expression.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::color::Theme;
use crate::config::LatexConfig;
use crate::hosted::hosted_url;
use crate::renderer::{check_length, DPI_RANGE};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LatexUrlInput {
    /// LaTeX expression to link to.
    pub latex: String,

    /// Color theme: 'light' or 'dark'.
    pub theme: Option<Theme>,

    /// Image resolution (72-300 DPI).
    pub dpi: Option<u32>,
}

/// Build the link; errors are returned as display strings.
pub fn run_url(input: &LatexUrlInput, config: &LatexConfig) -> Result<String, String> {
    check_length(&input.latex, config.limits.max_latex_length).map_err(|e| e.to_string())?;
    let dpi = input.dpi.unwrap_or(config.defaults.dpi);
    if !DPI_RANGE.contains(&dpi) {
        return Err(format!(
            "dpi must be between {} and {}, got {}",
            DPI_RANGE.start(),
            DPI_RANGE.end(),
            dpi
        ));
    }
    let theme = input.theme.unwrap_or(config.defaults.theme);
    hosted_url(&config.hosted.base_url, &input.latex, dpi, theme).map_err(|e| e.to_string())
}

pub fn envelope(result: &Result<String, String>) -> Value {
    match result {
        Ok(url) => json!({
            "success": true,
            "url": url,
            "message": "Open or attach this URL to show the rendered PNG. The link is built locally; the image is rendered by the hosted service.",
        }),
        Err(e) => json!({
            "success": false,
            "url": null,
            "message": format!("Could not build URL: {}", e),
        }),
    }
}
