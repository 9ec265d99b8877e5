//! Configuration schema types for `latex-mcp.toml`
//!
//! Defines the structure and validation rules for server configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::{parse_color, Theme};
use crate::hosted::DEFAULT_BASE_URL;
use crate::renderer::{
    DEFAULT_DPI, DEFAULT_FONT_SIZE, DEFAULT_PADDING, DPI_RANGE, FONT_SIZE_RANGE, PADDING_RANGE,
};
use crate::solution::MAX_STEPS;

/// MCP transport served by `latex-mcp mcp`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// JSON-RPC lines on stdin/stdout
    Stdio,
    /// MCP streamable HTTP on `host:port`
    StreamableHttp,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "streamable-http" | "http" => Ok(Transport::StreamableHttp),
            "sse" => Err("transport 'sse' is not served, use 'streamable-http'".to_string()),
            other => Err(format!("unknown transport '{}', expected 'stdio' or 'streamable-http'", other)),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::StreamableHttp => write!(f, "streamable-http"),
        }
    }
}

/// Server section
///
/// Only `latex-mcp mcp` reads it, so a bad transport never blocks the
/// rendering commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// MCP transport; overridden by `MCP_TRANSPORT`
    #[serde(default = "default_transport")]
    pub transport: String,
    /// Bind address for streamable HTTP; overridden by `HOST`
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port for streamable HTTP; overridden by `PORT`
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { transport: default_transport(), host: default_host(), port: default_port() }
    }
}

fn default_transport() -> String {
    Transport::Stdio.to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Display defaults used when a request leaves an option out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub theme: Theme,
    /// Padding in inches
    #[serde(default = "default_padding")]
    pub padding: f32,
    /// Highlight the final row of solutions
    #[serde(default = "default_true")]
    pub highlight_answer: bool,
    /// Highlight color override (CSS color)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            font_size: default_font_size(),
            theme: Theme::default(),
            padding: default_padding(),
            highlight_answer: default_true(),
            highlight_color: None,
        }
    }
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_padding() -> f32 {
    DEFAULT_PADDING
}

fn default_true() -> bool {
    true
}

/// Input size limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Longest accepted LaTeX input, in characters
    #[serde(default = "default_max_latex_length")]
    pub max_latex_length: usize,
    /// Most steps accepted by `render_solution`
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_latex_length: default_max_latex_length(), max_steps: default_max_steps() }
    }
}

fn default_max_latex_length() -> usize {
    10_000
}

fn default_max_steps() -> usize {
    MAX_STEPS
}

/// Hosted renderer used by the `latex_url` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Complete latex-mcp.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatexConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub hosted: HostedConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "defaults.dpi")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "latex-mcp.toml: '{}' {}", self.field, self.message)
    }
}

impl LatexConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigValidationError { field: field.to_string(), message });
        };

        let defaults = &self.defaults;
        if !DPI_RANGE.contains(&defaults.dpi) {
            push("defaults.dpi", format!("must be between {} and {}", DPI_RANGE.start(), DPI_RANGE.end()));
        }
        if !FONT_SIZE_RANGE.contains(&defaults.font_size) {
            push(
                "defaults.font_size",
                format!("must be between {} and {}", FONT_SIZE_RANGE.start(), FONT_SIZE_RANGE.end()),
            );
        }
        if !PADDING_RANGE.contains(&defaults.padding) {
            push(
                "defaults.padding",
                format!("must be between {} and {}", PADDING_RANGE.start(), PADDING_RANGE.end()),
            );
        }
        if let Some(color) = &defaults.highlight_color {
            if let Err(e) = parse_color(color) {
                push("defaults.highlight_color", e.to_string());
            }
        }

        if self.limits.max_latex_length == 0 {
            push("limits.max_latex_length", "must be a positive integer".to_string());
        }
        if !(1..=MAX_STEPS).contains(&self.limits.max_steps) {
            push("limits.max_steps", format!("must be between 1 and {}", MAX_STEPS));
        }

        if url::Url::parse(&self.hosted.base_url).is_err() {
            push("hosted.base_url", "must be an absolute URL".to_string());
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
