//! Check and url command implementations

use std::process::ExitCode;

use crate::check::check_latex;
use crate::color::Theme;
use crate::config::LatexConfig;
use crate::hosted::hosted_url;
use crate::renderer::DPI_RANGE;

use super::{read_source, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the check command: print the JSON report, fail when invalid
pub fn run_check(latex: &str, config: &LatexConfig) -> ExitCode {
    let source = match read_source(latex) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading stdin: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let report = check_latex(&source, config.limits.max_latex_length);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if report.valid {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// Execute the url command
pub fn run_url(latex: &str, theme: Option<Theme>, dpi: Option<u32>, config: &LatexConfig) -> ExitCode {
    let source = match read_source(latex) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading stdin: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let dpi = dpi.unwrap_or(config.defaults.dpi);
    if !DPI_RANGE.contains(&dpi) {
        eprintln!("Error: --dpi must be between {} and {}", DPI_RANGE.start(), DPI_RANGE.end());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let theme = theme.unwrap_or(config.defaults.theme);
    match hosted_url(&config.hosted.base_url, &source, dpi, theme) {
        Ok(url) => {
            println!("{}", url);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
