//! MCP tool definitions for latex-mcp
//!
//! Each tool wraps a library function and shapes its result into the JSON
//! envelope clients expect.

pub mod check;
pub mod hosted;
pub mod render;
pub mod solution;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::output::{encode_png, size_kb, to_base64, to_data_uri};
use crate::renderer::{RenderError, Rendered};

/// Display width suggested to clients for rendered images.
pub const WIDTH_HINT: &str = "600px";

/// How image results are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// JSON envelope with base64 and data URI
    #[default]
    Json,
    /// MCP image content plus a short text summary
    Image,
    /// Image content followed by the JSON envelope
    Both,
}

/// An encoded PNG ready to be returned.
#[derive(Debug, Clone)]
pub struct ImageOutput {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub warnings: Vec<String>,
}

impl ImageOutput {
    pub fn encode(rendered: Rendered) -> Result<Self, RenderError> {
        let png = encode_png(&rendered.image)?;
        Ok(Self {
            png,
            width: rendered.image.width(),
            height: rendered.image.height(),
            warnings: rendered.warnings,
        })
    }

    pub fn size_kb(&self) -> f64 {
        size_kb(&self.png)
    }

    pub fn base64(&self) -> String {
        to_base64(&self.png)
    }

    /// Success envelope: `success`, `data_uri`, `base64`, `width_hint`,
    /// `size_kb`, `width`, `height`, `warnings` and `message`.
    pub fn envelope(&self, message: &str) -> Value {
        json!({
            "success": true,
            "data_uri": to_data_uri(&self.png),
            "base64": self.base64(),
            "width_hint": WIDTH_HINT,
            "size_kb": self.size_kb(),
            "width": self.width,
            "height": self.height,
            "warnings": self.warnings,
            "message": message,
        })
    }
}

/// Failure envelope for image tools.
pub fn failure_envelope(message: &str) -> Value {
    json!({
        "success": false,
        "data_uri": null,
        "base64": null,
        "message": message,
    })
}
