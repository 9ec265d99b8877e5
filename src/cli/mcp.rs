//! MCP server command

use std::process::ExitCode;

use tokio::runtime::Runtime;
use tracing::error;

use crate::config::{resolve_endpoint, LatexConfig};

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the MCP server command
pub fn run_mcp(config: LatexConfig) -> ExitCode {
    let endpoint = match resolve_endpoint(&config.server) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            error!(error = %e, "cannot start MCP server");
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match rt.block_on(crate::mcp::run_server(config, endpoint)) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            error!(error = %e, "MCP server failed");
            eprintln!("Error: MCP server failed: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
