//! MCP solution tool: labeled steps stacked into one PNG.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{ImageOutput, OutputMode};
use crate::color::Theme;
use crate::config::{resolve_render_options, DisplayOverrides, LatexConfig};
use crate::renderer::RenderError;
use crate::solution::{check_steps, render_solution, SolutionOptions, Step};

/// Input parameters for the render_solution tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RenderSolutionInput {
    #[schemars(
        description = "List of solution steps, each with an optional 'label' and a required 'latex'. \
                       Example: [{\"label\": \"Given\", \"latex\": \"ax^2+bx+c=0\"}, \
                       {\"label\": \"Solve\", \"latex\": \"x=\\\\frac{-b\\\\pm\\\\sqrt{b^2-4ac}}{2a}\"}]"
    )]
    pub steps: Vec<Step>,

    #[schemars(description = "Color theme: 'light' or 'dark'")]
    pub theme: Option<Theme>,

    #[schemars(description = "Image resolution (72-300 DPI, default 150)")]
    pub dpi: Option<u32>,

    #[schemars(description = "Font size (8-32, default 14)")]
    pub font_size: Option<u32>,

    #[schemars(description = "Padding around the content in inches (0-2, default 0.3)")]
    pub padding: Option<f32>,

    #[schemars(description = "Draw the final step on a highlight band (default true)")]
    pub highlight_answer: Option<bool>,

    #[schemars(description = "Highlight color override for the final step (any CSS color)")]
    pub highlight_color: Option<String>,

    #[schemars(description = "Result format: 'json' (default), 'image' or 'both'")]
    #[serde(default)]
    pub output: OutputMode,
}

/// Execute the solution tool logic.
pub fn run_solution(input: &RenderSolutionInput, config: &LatexConfig) -> Result<ImageOutput, RenderError> {
    check_steps(&input.steps, config.limits.max_steps, config.limits.max_latex_length)?;

    let overrides = DisplayOverrides {
        theme: input.theme,
        dpi: input.dpi,
        font_size: input.font_size,
        padding: input.padding,
        highlight_color: input.highlight_color.clone(),
        ..DisplayOverrides::default()
    };
    let options = SolutionOptions {
        render: resolve_render_options(&config.defaults, &overrides)?,
        highlight_answer: input.highlight_answer.unwrap_or(config.defaults.highlight_answer),
    };
    info!(steps = input.steps.len(), dpi = options.render.dpi, "rendering solution");

    let output = ImageOutput::encode(render_solution(&input.steps, &options)?)?;
    info!(steps = input.steps.len(), size_kb = output.size_kb(), "solution rendered");
    Ok(output)
}

/// Success envelope with `step_count` added.
pub fn envelope(output: &ImageOutput, step_count: usize) -> Value {
    let message = format!(
        "Solution with {} steps rendered ({:.1} KB). Send the base64 PNG as an image attachment.",
        step_count,
        output.size_kb()
    );
    let mut envelope = output.envelope(&message);
    envelope["step_count"] = step_count.into();
    envelope
}

/// Failure envelope with `step_count: 0`.
pub fn failure_envelope(error: &RenderError) -> Value {
    let message = format!("Rendering failed: {}. Verify each step has a valid 'latex' field.", error);
    let mut envelope = super::failure_envelope(&message);
    envelope["step_count"] = 0.into();
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> RenderSolutionInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_solution_envelope() {
        let input = input(json!({
            "steps": [
                {"label": "Problem", "latex": "Solve: $x^2 - 5x + 6 = 0$"},
                {"label": "Factor", "latex": "(x-2)(x-3) = 0"},
                {"label": "Answer", "latex": "x = 2 \\text{ or } x = 3"}
            ]
        }));
        let output = run_solution(&input, &LatexConfig::default()).unwrap();
        let envelope = envelope(&output, input.steps.len());
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["step_count"], 3);
        assert!(envelope["message"].as_str().unwrap().starts_with("Solution with 3 steps rendered"));
    }

    #[test]
    fn test_step_limit_from_config() {
        let mut config = LatexConfig::default();
        config.limits.max_steps = 2;
        let input = input(json!({ "steps": [{"latex": "a"}, {"latex": "b"}, {"latex": "c"}] }));
        let err = run_solution(&input, &config).unwrap_err();
        assert_eq!(err.to_string(), "a solution needs 1 to 2 steps, got 3");
    }

    #[test]
    fn test_empty_steps() {
        let input = input(json!({ "steps": [] }));
        assert!(matches!(
            run_solution(&input, &LatexConfig::default()),
            Err(RenderError::StepCount { count: 0, .. })
        ));
    }

    #[test]
    fn test_missing_latex_key_is_rejected() {
        let parsed = serde_json::from_value::<RenderSolutionInput>(json!({ "steps": [{"label": "x"}] }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let input = input(json!({ "steps": [{"latex": "x"}, {"latex": "\\frac{1}"}] }));
        let err = run_solution(&input, &LatexConfig::default()).unwrap_err();
        let envelope = failure_envelope(&err);
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["step_count"], 0);
        assert!(envelope["base64"].is_null());
        assert!(envelope["message"].as_str().unwrap().starts_with("Rendering failed: step 2:"));
    }

    #[test]
    fn test_bad_highlight_color() {
        let input = input(json!({ "steps": [{"latex": "x"}], "highlight_color": "glowing" }));
        assert!(matches!(run_solution(&input, &LatexConfig::default()), Err(RenderError::Color(_))));
    }
}
