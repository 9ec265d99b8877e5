//! Configuration loading and discovery for `latex-mcp.toml`
//!
//! Provides functions to find and load configuration, to resolve per-request
//! display options against the configured defaults, and to resolve where the
//! MCP server listens.

use super::schema::{DefaultsConfig, LatexConfig, ServerConfig, Transport};
use crate::color::{Palette, Theme};
use crate::renderer::{RenderError, RenderOptions};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "latex-mcp.toml";
/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "LATEX_MCP_CONFIG";
/// Environment variable overriding `server.transport`
pub const TRANSPORT_ENV: &str = "MCP_TRANSPORT";
/// Environment variable overriding `server.host`
pub const HOST_ENV: &str = "HOST";
/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "PORT";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse latex-mcp.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    /// Server transport or address error
    #[error("Invalid server setting: {0}")]
    Server(String),
}

/// Where `latex-mcp mcp` serves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Stdio,
    StreamableHttp { host: String, port: u16 },
}

/// Per-request display options; `None` falls back to the configured default
#[derive(Debug, Default, Clone)]
pub struct DisplayOverrides {
    pub theme: Option<Theme>,
    pub dpi: Option<u32>,
    pub font_size: Option<u32>,
    pub padding: Option<f32>,
    pub bg_color: Option<String>,
    pub text_color: Option<String>,
    pub highlight_color: Option<String>,
}

/// Find the config file.
///
/// Search order:
/// 1. The file named by `LATEX_MCP_CONFIG`
/// 2. Walk up from the current directory looking for latex-mcp.toml
/// 3. XDG_CONFIG_HOME/latex-mcp/latex-mcp.toml (or ~/.config/latex-mcp/latex-mcp.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find latex-mcp.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("latex-mcp").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find latex-mcp.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file (a missing file is an error).
/// Otherwise uses [`find_config`], falling back to defaults when nothing is
/// found. Server settings are left to [`resolve_endpoint`].
pub fn load_config(path: Option<&Path>) -> Result<LatexConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    let config: LatexConfig = match config_path {
        Some(p) => {
            debug!(path = %p.display(), "loading config");
            let contents = fs::read_to_string(&p)?;
            toml::from_str(&contents)?
        }
        None => LatexConfig::default(),
    };

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Resolve the MCP endpoint from `[server]` and the `MCP_TRANSPORT`, `HOST`
/// and `PORT` environment variables.
pub fn resolve_endpoint(server: &ServerConfig) -> Result<Endpoint, ConfigError> {
    resolve_endpoint_with(server, |name| env::var(name).ok())
}

fn resolve_endpoint_with(
    server: &ServerConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<Endpoint, ConfigError> {
    let setting = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let transport = setting(TRANSPORT_ENV).unwrap_or_else(|| server.transport.clone());
    match transport.parse::<Transport>().map_err(ConfigError::Server)? {
        Transport::Stdio => Ok(Endpoint::Stdio),
        Transport::StreamableHttp => {
            let host = setting(HOST_ENV).unwrap_or_else(|| server.host.trim().to_string());
            if host.is_empty() {
                return Err(ConfigError::Server("host must not be empty".to_string()));
            }
            let port = match setting(PORT_ENV) {
                Some(port) => port.parse::<u16>().map_err(|_| {
                    ConfigError::Server(format!("{} must be a port number, got '{}'", PORT_ENV, port))
                })?,
                None => server.port,
            };
            Ok(Endpoint::StreamableHttp { host, port })
        }
    }
}

/// Resolve request overrides against the configured defaults.
///
/// Colors are parsed and ranges checked, so the result is ready to render.
pub fn resolve_render_options(
    defaults: &DefaultsConfig,
    overrides: &DisplayOverrides,
) -> Result<RenderOptions, RenderError> {
    let theme = overrides.theme.unwrap_or(defaults.theme);
    let highlight = overrides.highlight_color.as_deref().or(defaults.highlight_color.as_deref());
    let palette = Palette::resolve(
        theme,
        overrides.bg_color.as_deref(),
        overrides.text_color.as_deref(),
        highlight,
    )?;

    let options = RenderOptions {
        dpi: overrides.dpi.unwrap_or(defaults.dpi),
        font_size: overrides.font_size.unwrap_or(defaults.font_size),
        padding: overrides.padding.unwrap_or(defaults.padding),
        palette,
    };
    options.validate()?;
    Ok(options)
}
