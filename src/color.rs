//! Colors: CSS color strings, themes and the resolved drawing palette
//!
//! Color options accept anything CSS does:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Functional: `rgb()`, `hsl()`, `hwb()`, `oklch()`
//! - Named: `white`, `black`, `navy`, `transparent`, ...

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// CSS parsing error from lightningcss
    #[error("invalid color '{0}'")]
    Css(String),
}

/// Parse a CSS color string into an RGBA color.
///
/// # Examples
///
/// ```
/// use latex_mcp::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("white").unwrap(), image::Rgba([255, 255, 255, 255]));
/// assert_eq!(parse_color("rgb(0, 0, 255)").unwrap(), image::Rgba([0, 0, 255, 255]));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    match s.strip_prefix('#') {
        Some(hex) => parse_hex_color(hex),
        None => parse_css_color(s),
    }
}

fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, ColorError> {
    if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(bad));
    }
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).unwrap_or(0) as u8)
        .collect();

    let [r, g, b, a] = match digits.as_slice() {
        // short forms double each digit
        [r, g, b] => [r * 17, g * 17, b * 17, 255],
        [r, g, b, a] => [r * 17, g * 17, b * 17, a * 17],
        [r1, r2, g1, g2, b1, b2] => [r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, 255],
        [r1, r2, g1, g2, b1, b2, a1, a2] => {
            [r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2, a1 * 16 + a2]
        }
        other => return Err(ColorError::InvalidLength(other.len())),
    };
    Ok(Rgba([r, g, b, a]))
}

/// Parse rgb/hsl/hwb/oklch and named colors through lightningcss.
fn parse_css_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    use lightningcss::values::color::FloatColor;

    let invalid = || ColorError::Css(s.to_string());
    let color = CssColor::parse_string(s).map_err(|_| invalid())?;
    match color.to_rgb().map_err(|_| invalid())? {
        CssColor::RGBA(rgba) => Ok(Rgba([rgba.red, rgba.green, rgba.blue, rgba.alpha])),
        CssColor::Float(float_color) => match float_color.as_ref() {
            FloatColor::RGB(rgb) => Ok(Rgba([
                (rgb.r * 255.0).round() as u8,
                (rgb.g * 255.0).round() as u8,
                (rgb.b * 255.0).round() as u8,
                (rgb.alpha * 255.0).round() as u8,
            ])),
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

/// Built-in color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// White background, black text
    #[default]
    Light,
    /// Dark background, light text
    Dark,
}

impl Theme {
    /// Default colors for this theme.
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Rgba([255, 255, 255, 255]),
                text: Rgba([0, 0, 0, 255]),
                highlight: Rgba([0x40, 0xa0, 0x2b, 255]),
                highlight_band: Rgba([0xe6, 0xf4, 0xe1, 255]),
            },
            Theme::Dark => Palette {
                background: Rgba([0x1e, 0x1e, 0x2e, 255]),
                text: Rgba([0xcd, 0xd6, 0xf4, 255]),
                highlight: Rgba([0xa6, 0xe3, 0xa1, 255]),
                highlight_band: Rgba([0x31, 0x32, 0x44, 255]),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}', expected 'light' or 'dark'", other)),
        }
    }
}

/// Resolved colors used while drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba<u8>,
    pub text: Rgba<u8>,
    /// Glyph color of a highlighted answer row
    pub highlight: Rgba<u8>,
    /// Fill behind a highlighted answer row
    pub highlight_band: Rgba<u8>,
}

impl Palette {
    /// Apply optional CSS color overrides on top of a theme's palette.
    pub fn resolve(
        theme: Theme,
        background: Option<&str>,
        text: Option<&str>,
        highlight: Option<&str>,
    ) -> Result<Self, ColorError> {
        let mut palette = theme.palette();
        if let Some(bg) = background {
            palette.background = parse_color(bg)?;
        }
        if let Some(fg) = text {
            palette.text = parse_color(fg)?;
        }
        if let Some(hl) = highlight {
            palette.highlight = parse_color(hl)?;
            palette.highlight_band = mix(palette.background, palette.highlight, 0.15);
        }
        Ok(palette)
    }

    /// Divider color between solution rows.
    pub fn divider(&self) -> Rgba<u8> {
        mix(self.background, self.text, 0.25)
    }
}

/// Linear mix of two opaque colors; `t = 0` gives `a`, `t = 1` gives `b`.
pub fn mix(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let channel = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgba([
        channel(a[0], b[0]),
        channel(a[1], b[1]),
        channel(a[2], b[2]),
        channel(a[3], b[3]),
    ])
}
