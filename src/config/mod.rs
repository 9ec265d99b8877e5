//! Configuration for the latex-mcp server
//!
//! Provides types, discovery and loading for `latex-mcp.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
