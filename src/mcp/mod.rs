//! MCP (Model Context Protocol) server for latex-mcp
//!
//! Exposes LaTeX rendering as MCP tools so AI assistants can present math as
//! PNG images instead of raw markup.
//!
//! Start the server with `latex-mcp mcp` (feature-gated, on by default).

mod server;
pub mod tools;

pub use server::{run_server, LatexMcpServer};
