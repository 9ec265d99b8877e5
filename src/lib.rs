//! latex-mcp - Library for rendering LaTeX math to PNG images
//!
//! This library provides functionality to:
//! - Parse a practical subset of LaTeX math into a node tree
//! - Lay out and rasterize expressions and multi-step solutions to PNG
//! - Check LaTeX for common mistakes and build hosted-renderer URLs
//! - Expose all of the above as MCP tools over stdio or streamable HTTP

pub mod check;
pub mod cli;
pub mod color;
pub mod config;
pub mod glyphs;
pub mod hosted;
pub mod latex;
pub mod layout;
pub mod logging;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod output;
pub mod renderer;
pub mod solution;
