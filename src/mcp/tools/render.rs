//! MCP render tool: LaTeX expression or document to PNG.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::{ImageOutput, OutputMode};
use crate::color::Theme;
use crate::config::{resolve_render_options, DisplayOverrides, LatexConfig};
use crate::renderer::{check_length, render_latex, RenderError};

/// Input parameters for the render_latex tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RenderLatexInput {
    /// LaTeX to render.
    #[schemars(
        description = "LaTeX expression to render. Can include math delimiters ($, $$) or raw LaTeX. \
                       Multi-line solutions supported: separate steps with newlines. \
                       Example: '$$x = \\frac{-b \\pm \\sqrt{b^2-4ac}}{2a}$$'"
    )]
    pub latex: String,

    #[schemars(description = "Color theme: 'light' (white bg, black text) or 'dark' (dark bg, light text)")]
    pub theme: Option<Theme>,

    #[schemars(description = "Image resolution in DPI. Higher = sharper but larger file. Range: 72-300 (default 150)")]
    pub dpi: Option<u32>,

    #[schemars(description = "Font size in points. Range: 8-32 (default 14)")]
    pub font_size: Option<u32>,

    #[schemars(description = "Padding around the content in inches. Range: 0-2 (default 0.3)")]
    pub padding: Option<f32>,

    #[schemars(description = "Background color override (any CSS color, e.g. '#fdf6e3')")]
    pub bg_color: Option<String>,

    #[schemars(description = "Text color override (any CSS color)")]
    pub text_color: Option<String>,

    #[schemars(description = "Result format: 'json' (default), 'image' or 'both'")]
    #[serde(default)]
    pub output: OutputMode,
}

/// Execute the render tool logic.
pub fn run_render(input: &RenderLatexInput, config: &LatexConfig) -> Result<ImageOutput, RenderError> {
    check_length(&input.latex, config.limits.max_latex_length)?;
    let overrides = DisplayOverrides {
        theme: input.theme,
        dpi: input.dpi,
        font_size: input.font_size,
        padding: input.padding,
        bg_color: input.bg_color.clone(),
        text_color: input.text_color.clone(),
        highlight_color: None,
    };
    let options = resolve_render_options(&config.defaults, &overrides)?;
    info!(
        len = input.latex.len(),
        theme = %input.theme.unwrap_or(config.defaults.theme),
        dpi = options.dpi,
        "rendering LaTeX"
    );

    let output = ImageOutput::encode(render_latex(&input.latex, &options)?)?;
    info!(size_kb = output.size_kb(), "rendered successfully");
    Ok(output)
}

pub fn success_message(output: &ImageOutput) -> String {
    format!(
        "LaTeX rendered successfully ({:.1} KB PNG). Use 'data_uri' to embed in HTML or 'base64' to attach as image.",
        output.size_kb()
    )
}

pub fn failure_message(error: &RenderError) -> String {
    format!(
        "Rendering failed: {}. Check that your LaTeX syntax is valid. \
         Most standard math LaTeX is supported, but packages such as tikz and chemfig are not.",
        error
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn input(latex: &str) -> RenderLatexInput {
        serde_json::from_value(serde_json::json!({ "latex": latex })).unwrap()
    }

    #[test]
    fn test_render_inline_expression() {
        let output = run_render(&input("$E = mc^2$"), &LatexConfig::default()).unwrap();
        assert!(output.width > 0 && output.height > 0);
        let png = base64::engine::general_purpose::STANDARD.decode(output.base64()).unwrap();
        assert_eq!(&png[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_render_is_repeatable() {
        let config = LatexConfig::default();
        let a = run_render(&input(r"\sum_{n=1}^{\infty} \frac{1}{n^2}"), &config).unwrap();
        let b = run_render(&input(r"\sum_{n=1}^{\infty} \frac{1}{n^2}"), &config).unwrap();
        assert_eq!(a.png, b.png);
    }

    #[test]
    fn test_render_rejects_whitespace() {
        let err = run_render(&input("   "), &LatexConfig::default()).unwrap_err();
        assert!(matches!(err, RenderError::Empty));
    }

    #[test]
    fn test_render_length_limit() {
        let mut config = LatexConfig::default();
        config.limits.max_latex_length = 5;
        let err = run_render(&input("x+y+z+w"), &config).unwrap_err();
        assert_eq!(err.to_string(), "expression too long (7 chars, max 5)");
    }

    #[test]
    fn test_render_out_of_range_dpi() {
        let input: RenderLatexInput =
            serde_json::from_value(serde_json::json!({ "latex": "x", "dpi": 1000 })).unwrap();
        let err = run_render(&input, &LatexConfig::default()).unwrap_err();
        assert!(failure_message(&err).starts_with("Rendering failed: dpi must be between 72 and 300"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let parsed = serde_json::from_value::<RenderLatexInput>(serde_json::json!({ "latex": "x", "scale": 2 }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_success_message_mentions_size() {
        let output = run_render(&input("x"), &LatexConfig::default()).unwrap();
        assert!(success_message(&output).contains(&format!("{:.1} KB", output.size_kb())));
    }
}
