//! Rendering LaTeX documents to image buffers
//!
//! A document is one or more source lines. Each line is laid out on its own
//! baseline and the lines are stacked top to bottom, centered horizontally,
//! on a padded canvas filled with the background color.

use std::ops::RangeInclusive;

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::color::{ColorError, Palette, Theme};
use crate::latex::{self, ParseError, Segment};
use crate::layout::{Item, Layout, LayoutBox};
use crate::output::OutputError;

pub const DEFAULT_DPI: u32 = 150;
pub const DEFAULT_FONT_SIZE: u32 = 14;
/// Padding around the content, in inches.
pub const DEFAULT_PADDING: f32 = 0.3;

pub const DPI_RANGE: RangeInclusive<u32> = 72..=300;
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 8..=32;
pub const PADDING_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Largest canvas side in pixels.
pub const MAX_SIDE: u64 = 16_000;
/// Largest canvas area in pixels.
pub const MAX_PIXELS: u64 = 64_000_000;

/// Gap between consecutive lines, in em.
const LINE_GAP: f32 = 0.25;
/// Every line is at least this tall above the baseline, in em.
const LINE_ASCENT: f32 = 0.875;
/// ... and this deep below it.
const LINE_DESCENT: f32 = 0.25;

/// Error type for rendering failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("LaTeX expression cannot be empty or whitespace only")]
    Empty,
    #[error("expression too long ({len} chars, max {max})")]
    TooLong { len: usize, max: usize },
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
    #[error("line {line}: {source}")]
    Parse { line: usize, source: ParseError },
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("rendered image would be {width}x{height} px, over the size limit")]
    Oversized { width: u64, height: u64 },
    #[error("a solution needs 1 to {max} steps, got {count}")]
    StepCount { count: usize, max: usize },
    #[error("step {index}: {source}")]
    Step {
        index: usize,
        source: Box<RenderError>,
    },
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Display options shared by every render entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub dpi: u32,
    /// Font size in points
    pub font_size: u32,
    /// Padding on every side, in inches
    pub padding: f32,
    pub palette: Palette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            font_size: DEFAULT_FONT_SIZE,
            padding: DEFAULT_PADDING,
            palette: Theme::Light.palette(),
        }
    }
}

impl RenderOptions {
    /// Check dpi, font size and padding against their allowed ranges.
    pub fn validate(&self) -> Result<(), RenderError> {
        check_range("dpi", self.dpi, &DPI_RANGE)?;
        check_range("font_size", self.font_size, &FONT_SIZE_RANGE)?;
        if !self.padding.is_finite() || !PADDING_RANGE.contains(&self.padding) {
            return Err(out_of_range("padding", self.padding, &PADDING_RANGE));
        }
        Ok(())
    }

    /// Em size in pixels.
    pub fn em(&self) -> f32 {
        self.font_size as f32 * self.dpi as f32 / 72.0
    }

    /// Padding in pixels.
    pub fn padding_px(&self) -> f32 {
        (self.padding * self.dpi as f32).round()
    }
}

fn check_range(name: &'static str, value: u32, range: &RangeInclusive<u32>) -> Result<(), RenderError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(name, value, range))
    }
}

fn out_of_range<T: ToString>(name: &'static str, value: T, range: &RangeInclusive<T>) -> RenderError {
    RenderError::OutOfRange {
        name,
        value: value.to_string(),
        min: range.start().to_string(),
        max: range.end().to_string(),
    }
}

/// Reject blank input and input longer than `max` characters.
pub fn check_length(latex: &str, max: usize) -> Result<(), RenderError> {
    if latex.trim().is_empty() {
        return Err(RenderError::Empty);
    }
    let len = latex.chars().count();
    if len > max {
        return Err(RenderError::TooLong { len, max });
    }
    Ok(())
}

/// A rendered image and the non-fatal issues found while rendering it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub image: RgbaImage,
    pub warnings: Vec<String>,
}

/// Render a LaTeX document to an RGBA image.
///
/// Lines are separated by `\n`. Blank lines become half-height spacers,
/// lines starting with `#` are bold headings, and every other line may mix
/// plain text with `$...$` math (a line without `$` is read as math).
///
/// # Examples
///
/// ```
/// use latex_mcp::renderer::{render_latex, RenderOptions};
///
/// let rendered = render_latex(r"$$\frac{a}{b}$$", &RenderOptions::default()).unwrap();
/// assert!(rendered.image.width() > 0);
/// assert!(rendered.warnings.is_empty());
///
/// assert!(render_latex(r"\frac{a}", &RenderOptions::default()).is_err());
/// ```
pub fn render_latex(source: &str, options: &RenderOptions) -> Result<Rendered, RenderError> {
    options.validate()?;
    if latex::strip_outer_delimiters(source).is_empty() {
        return Err(RenderError::Empty);
    }

    let em = options.em();
    let mut layout = Layout::new(em);
    let mut column = Column::new(em);
    layout_source(source, &mut layout, &mut column)?;

    let pad = options.padding_px();
    let mut canvas = new_canvas(column.width + 2.0 * pad, column.height + 2.0 * pad, options.palette.background)?;
    let inner_width = canvas.width() as f32 - 2.0 * pad;
    column.paint(&mut canvas, pad, pad, inner_width, options.palette.text);

    Ok(Rendered { image: canvas, warnings: layout.into_warnings() })
}

/// Lay out every line of `source` into `column`.
pub(crate) fn layout_source(source: &str, layout: &mut Layout, column: &mut Column) -> Result<(), RenderError> {
    let em = column.em;
    for (index, raw) in source.trim().lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            column.push_blank();
        } else if let Some(heading) = line.strip_prefix('#') {
            let title = heading.trim_start_matches('#').trim();
            column.push_line(layout.text(title, em, true));
        } else {
            let laid = layout_line(line, layout, em)
                .map_err(|source| RenderError::Parse { line: index + 1, source })?;
            column.push_line(laid);
        }
    }
    Ok(())
}

/// Lay out one line of mixed text and math.
fn layout_line(line: &str, layout: &mut Layout, em: f32) -> Result<LayoutBox, ParseError> {
    let mut out = LayoutBox::empty();
    for segment in latex::split_segments(line)? {
        match segment {
            Segment::Text(text) => out.append(layout.text(&text, em, false)),
            Segment::Math(math) => {
                let nodes = latex::parse(&math)?;
                out.append(layout.nodes(&nodes, em, false));
            }
        }
    }
    Ok(out)
}

/// Lines stacked top to bottom, each remembered with its baseline offset.
#[derive(Debug, Clone)]
pub(crate) struct Column {
    em: f32,
    lines: Vec<(f32, LayoutBox)>,
    pub width: f32,
    pub height: f32,
    /// Whether the last entry was a line, so the next one needs a gap
    open: bool,
}

impl Column {
    pub fn new(em: f32) -> Self {
        Self { em, lines: Vec::new(), width: 0.0, height: 0.0, open: false }
    }

    pub fn push_line(&mut self, line: LayoutBox) {
        let line = line.with_min_extent(LINE_ASCENT * self.em, LINE_DESCENT * self.em);
        if self.open {
            self.height += LINE_GAP * self.em;
        }
        let baseline = self.height + line.ascent;
        self.height = baseline + line.descent;
        self.width = self.width.max(line.width);
        self.lines.push((baseline, line));
        self.open = true;
    }

    pub fn push_blank(&mut self) {
        self.height += 0.5 * (LINE_ASCENT + LINE_DESCENT) * self.em;
        self.open = false;
    }

    /// Paint each line centered within `width`, starting at `(left, top)`.
    pub fn paint(&self, canvas: &mut RgbaImage, left: f32, top: f32, width: f32, color: Rgba<u8>) {
        for (baseline, line) in &self.lines {
            let x = left + (width - line.width) / 2.0;
            paint_box(canvas, line, x, top + baseline, color);
        }
    }
}

/// Allocate a canvas of the given size, refusing oversized images.
pub(crate) fn new_canvas(width: f32, height: f32, background: Rgba<u8>) -> Result<RgbaImage, RenderError> {
    let width = (width.ceil() as u64).max(1);
    let height = (height.ceil() as u64).max(1);
    if width > MAX_SIDE || height > MAX_SIDE || width * height > MAX_PIXELS {
        return Err(RenderError::Oversized { width, height });
    }
    Ok(RgbaImage::from_pixel(width as u32, height as u32, background))
}

/// Draw a laid-out box with its origin at `(x, baseline)`.
pub(crate) fn paint_box(canvas: &mut RgbaImage, content: &LayoutBox, x: f32, baseline: f32, color: Rgba<u8>) {
    for item in &content.items {
        match item {
            Item::Glyph { glyph, x: gx, y: gy, sx, sy } => {
                for row in 0..8 {
                    for col in 0..8 {
                        if glyph.is_set(col, row) {
                            let left = x + gx + col as f32 * sx;
                            let top = baseline + gy + row as f32 * sy;
                            fill_rect(canvas, left, top, left + sx, top + sy, color);
                        }
                    }
                }
            }
            Item::Rule { x: rx, y: ry, w, h } => {
                let left = x + rx;
                let top = baseline + ry;
                fill_rect(canvas, left, top, left + w, top + h, color);
            }
            Item::Line { x0, y0, x1, y1, thickness } => stroke(
                canvas,
                (x + x0, baseline + y0),
                (x + x1, baseline + y1),
                *thickness,
                color,
            ),
        }
    }
}

/// Fill a rectangle given by its edges, snapped to whole pixels.
///
/// A non-empty rectangle always covers at least one pixel in each direction.
pub(crate) fn fill_rect(canvas: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
    let (left, right) = snap(x0, x1);
    let (top, bottom) = snap(y0, y1);
    let left = left.max(0);
    let top = top.max(0);
    let right = right.min(canvas.width() as i64);
    let bottom = bottom.min(canvas.height() as i64);
    for py in top..bottom {
        for px in left..right {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

fn snap(a: f32, b: f32) -> (i64, i64) {
    let start = a.min(b).round() as i64;
    let end = a.max(b).round() as i64;
    (start, end.max(start + 1))
}

fn stroke(canvas: &mut RgbaImage, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgba<u8>) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = ((dx.abs().max(dy.abs()) * 2.0).ceil() as usize).max(1);
    let half = thickness.max(1.0) / 2.0;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let (px, py) = (from.0 + dx * t, from.1 + dy * t);
        fill_rect(canvas, px - half, py - half, px + half, py + half, color);
    }
}
