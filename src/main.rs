//! latex-mcp - Command-line tool and MCP server for rendering LaTeX to PNG

use std::process::ExitCode;

use latex_mcp::cli;

fn main() -> ExitCode {
    cli::run()
}
