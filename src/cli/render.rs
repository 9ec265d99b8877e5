//! Render command implementations (render, solution)

use std::path::Path;
use std::process::ExitCode;

use serde::Deserialize;
use tracing::{error, info};

use crate::config::{resolve_render_options, DisplayOverrides, LatexConfig};
use crate::output::save_png;
use crate::renderer::{check_length, render_latex, RenderError, Rendered};
use crate::solution::{check_steps, render_solution, SolutionOptions, Step};

use super::{exit_code_for, read_source, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Steps file: a bare array or an object with a `steps` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StepsFile {
    List(Vec<Step>),
    Object { steps: Vec<Step> },
}

impl StepsFile {
    fn into_steps(self) -> Vec<Step> {
        match self {
            StepsFile::List(steps) | StepsFile::Object { steps } => steps,
        }
    }
}

/// Execute the render command
pub fn run_render(
    latex: &str,
    output: &Path,
    overrides: &DisplayOverrides,
    config: &LatexConfig,
) -> ExitCode {
    let source = match read_source(latex) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading stdin: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = check_length(&source, config.limits.max_latex_length)
        .and_then(|_| resolve_render_options(&config.defaults, overrides))
        .and_then(|options| render_latex(&source, &options));
    finish(result, output)
}

/// Execute the solution command
pub fn run_solution(
    steps_path: &Path,
    output: &Path,
    overrides: &DisplayOverrides,
    highlight_answer: bool,
    config: &LatexConfig,
) -> ExitCode {
    let steps = match load_steps(steps_path) {
        Ok(steps) => steps,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let limits = &config.limits;
    let result = check_steps(&steps, limits.max_steps, limits.max_latex_length).and_then(|_| {
        let options = SolutionOptions {
            render: resolve_render_options(&config.defaults, overrides)?,
            highlight_answer: highlight_answer && config.defaults.highlight_answer,
        };
        render_solution(&steps, &options)
    });
    finish(result, output)
}

fn load_steps(path: &Path) -> Result<Vec<Step>, String> {
    let contents = if path.as_os_str() == "-" {
        read_source("-").map_err(|e| format!("Failed to read stdin: {}", e))?
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?
    };
    let file: StepsFile = serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid steps JSON in '{}': {}", path.display(), e))?;
    Ok(file.into_steps())
}

fn finish(result: Result<Rendered, RenderError>, output: &Path) -> ExitCode {
    let rendered = match result {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "render failed");
            eprintln!("Error: {}", e);
            return ExitCode::from(exit_code_for(&e));
        }
    };

    for warning in &rendered.warnings {
        eprintln!("Warning: {}", warning);
    }
    if let Err(e) = save_png(&rendered.image, output) {
        eprintln!("Error: Failed to save '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }
    info!(path = %output.display(), width = rendered.image.width(), height = rendered.image.height(), "saved");
    println!("Saved: {}", output.display());
    ExitCode::from(EXIT_SUCCESS)
}
