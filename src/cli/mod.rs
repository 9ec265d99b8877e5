//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod check;
#[cfg(feature = "mcp")]
mod mcp;
mod render;

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::color::Theme;
use crate::config::{load_config, DisplayOverrides, LatexConfig};
use crate::renderer::RenderError;

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// latex-mcp - Render LaTeX math to PNG, standalone or as MCP tools
#[derive(Parser)]
#[command(name = "latex-mcp")]
#[command(about = "latex-mcp - Render LaTeX math to PNG images, standalone or as MCP tools")]
#[command(version)]
pub struct Cli {
    /// Path to latex-mcp.toml (defaults to LATEX_MCP_CONFIG or discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Display options shared by the rendering commands
#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Color theme: light or dark
    #[arg(long)]
    pub theme: Option<Theme>,

    /// Resolution in DPI (72-300)
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Font size in points (8-32)
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Padding around the content in inches (0-2)
    #[arg(long)]
    pub padding: Option<f32>,
}

impl DisplayArgs {
    pub(crate) fn overrides(&self) -> DisplayOverrides {
        DisplayOverrides {
            theme: self.theme,
            dpi: self.dpi,
            font_size: self.font_size,
            padding: self.padding,
            ..DisplayOverrides::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the MCP (Model Context Protocol) server on stdin/stdout
    #[cfg(feature = "mcp")]
    Mcp,

    /// Render a LaTeX expression or document to a PNG file
    Render {
        /// LaTeX source, or '-' to read stdin
        latex: String,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        display: DisplayArgs,

        /// Background color override (CSS color)
        #[arg(long)]
        bg_color: Option<String>,

        /// Text color override (CSS color)
        #[arg(long)]
        text_color: Option<String>,
    },

    /// Render a multi-step solution from a JSON file to a PNG file
    Solution {
        /// JSON file: an array of {"label", "latex"} steps or {"steps": [...]}; '-' reads stdin
        steps: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        display: DisplayArgs,

        /// Do not highlight the final step
        #[arg(long)]
        no_highlight: bool,

        /// Highlight color override (CSS color)
        #[arg(long)]
        highlight_color: Option<String>,
    },

    /// Check LaTeX syntax and print a JSON report
    Check {
        /// LaTeX source, or '-' to read stdin
        latex: String,
    },

    /// Print a hosted-renderer URL for a LaTeX expression
    Url {
        /// LaTeX source, or '-' to read stdin
        latex: String,

        /// Color theme: light or dark
        #[arg(long)]
        theme: Option<Theme>,

        /// Resolution in DPI (72-300)
        #[arg(long)]
        dpi: Option<u32>,
    },
}

/// Parse arguments, set up logging and run the selected command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    dispatch(cli.command, config)
}

fn dispatch(command: Commands, config: LatexConfig) -> ExitCode {
    match command {
        #[cfg(feature = "mcp")]
        Commands::Mcp => mcp::run_mcp(config),
        Commands::Render { latex, output, display, bg_color, text_color } => {
            let overrides =
                DisplayOverrides { bg_color, text_color, ..display.overrides() };
            render::run_render(&latex, &output, &overrides, &config)
        }
        Commands::Solution { steps, output, display, no_highlight, highlight_color } => {
            let overrides = DisplayOverrides { highlight_color, ..display.overrides() };
            render::run_solution(&steps, &output, &overrides, !no_highlight, &config)
        }
        Commands::Check { latex } => check::run_check(&latex, &config),
        Commands::Url { latex, theme, dpi } => check::run_url(&latex, theme, dpi, &config),
    }
}

/// Resolve a LATEX argument, reading stdin for `-`.
pub(crate) fn read_source(arg: &str) -> std::io::Result<String> {
    if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(arg.to_string())
    }
}

/// Exit code for a render failure: bad options are invalid arguments.
pub(crate) fn exit_code_for(error: &RenderError) -> u8 {
    match error {
        RenderError::OutOfRange { .. }
        | RenderError::Color(_)
        | RenderError::TooLong { .. }
        | RenderError::StepCount { .. } => EXIT_INVALID_ARGS,
        RenderError::Step { source, .. } => exit_code_for(source),
        _ => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorError;

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "latex-mcp", "render", "x^2", "-o", "out.png", "--theme", "dark", "--dpi", "200",
        ])
        .unwrap();
        match cli.command {
            Commands::Render { latex, display, .. } => {
                assert_eq!(latex, "x^2");
                assert_eq!(display.theme, Some(Theme::Dark));
                assert_eq!(display.dpi, Some(200));
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_theme() {
        assert!(Cli::try_parse_from(["latex-mcp", "url", "x", "--theme", "sepia"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["latex-mcp", "check", "x", "--verbose", "--config", "a.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&RenderError::Color(ColorError::Empty)), EXIT_INVALID_ARGS);
        assert_eq!(exit_code_for(&RenderError::Empty), EXIT_ERROR);
        let nested = RenderError::Step { index: 1, source: Box::new(RenderError::TooLong { len: 2, max: 1 }) };
        assert_eq!(exit_code_for(&nested), EXIT_INVALID_ARGS);
    }

    #[test]
    fn test_read_source_passthrough() {
        assert_eq!(read_source("a+b").unwrap(), "a+b");
    }
}
