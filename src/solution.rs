//! Multi-step solutions composed into a single image
//!
//! Each step becomes a row: an optional bold label, then the step's LaTeX
//! lines. Rows are stacked with a divider rule between them, and the final
//! row can be drawn on a highlight band to mark the answer.

use image::Rgba;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::Layout;
use crate::renderer::{
    check_length, fill_rect, layout_source, new_canvas, Column, RenderError, RenderOptions,
    Rendered,
};

/// Most steps a single solution may have.
pub const MAX_STEPS: usize = 20;

/// Vertical gap between rows, in em.
const ROW_GAP: f32 = 0.6;
/// Divider thickness, in em.
const DIVIDER: f32 = 0.125;
/// Vertical gap between a label and the step body, in em.
const LABEL_GAP: f32 = 0.15;

/// One row of a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "mcp", derive(schemars::JsonSchema))]
pub struct Step {
    /// Short heading shown above the step, e.g. "Factor"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// LaTeX for the step; may span several lines
    pub latex: String,
}

impl Step {
    pub fn new(label: Option<&str>, latex: impl Into<String>) -> Self {
        Self { label: label.map(str::to_string), latex: latex.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionOptions {
    pub render: RenderOptions,
    /// Draw the final row on a highlight band in the highlight color
    pub highlight_answer: bool,
}

struct Row {
    label: Option<Column>,
    body: Column,
}

impl Row {
    fn width(&self) -> f32 {
        self.body.width.max(self.label.as_ref().map_or(0.0, |l| l.width))
    }

    fn label_height(&self, em: f32) -> f32 {
        self.label.as_ref().map_or(0.0, |l| l.height + LABEL_GAP * em)
    }

    fn height(&self, em: f32) -> f32 {
        self.label_height(em) + self.body.height
    }
}

/// Render a list of steps into one image.
///
/// # Examples
///
/// ```
/// use latex_mcp::solution::{render_solution, SolutionOptions, Step};
///
/// let steps = vec![
///     Step::new(Some("Problem"), r"x^2 - 5x + 6 = 0"),
///     Step::new(Some("Answer"), r"x = 2 \text{ or } x = 3"),
/// ];
/// let rendered = render_solution(&steps, &SolutionOptions::default()).unwrap();
/// assert!(rendered.image.height() > rendered.image.width() / 10);
/// ```
pub fn render_solution(steps: &[Step], options: &SolutionOptions) -> Result<Rendered, RenderError> {
    let render = &options.render;
    render.validate()?;
    if steps.is_empty() || steps.len() > MAX_STEPS {
        return Err(RenderError::StepCount { count: steps.len(), max: MAX_STEPS });
    }

    let em = render.em();
    let mut layout = Layout::new(em);
    let rows = steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            layout_step(step, &mut layout, em)
                .map_err(|e| RenderError::Step { index: i + 1, source: Box::new(e) })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let gap = ROW_GAP * em;
    let divider = (DIVIDER * em).max(1.0);
    let content_width = rows.iter().map(Row::width).fold(0.0, f32::max);
    let content_height = rows.iter().map(|r| r.height(em)).sum::<f32>()
        + (rows.len() - 1) as f32 * (2.0 * gap + divider);

    let pad = render.padding_px();
    let palette = &render.palette;
    let mut canvas = new_canvas(content_width + 2.0 * pad, content_height + 2.0 * pad, palette.background)?;
    let canvas_width = canvas.width() as f32;
    let inner_width = canvas_width - 2.0 * pad;
    let highlight = options.highlight_answer && rows.len() > 1;
    debug!(rows = rows.len(), width = canvas.width(), height = canvas.height(), highlight, "composing solution");

    let mut y = pad;
    for (i, row) in rows.iter().enumerate() {
        let last = i + 1 == rows.len();
        if i > 0 {
            let divider_top = y + gap;
            fill_rect(&mut canvas, pad, divider_top, pad + inner_width, divider_top + divider, palette.divider());
            if last && highlight {
                let band_bottom = (divider_top + divider + 2.0 * gap + row.height(em)).min(canvas.height() as f32);
                fill_rect(&mut canvas, 0.0, divider_top + divider, canvas_width, band_bottom, palette.highlight_band);
            }
            y = divider_top + divider + gap;
        }

        let ink: Rgba<u8> = if last && highlight { palette.highlight } else { palette.text };
        if let Some(label) = &row.label {
            label.paint(&mut canvas, pad, y, inner_width, ink);
        }
        row.body.paint(&mut canvas, pad, y + row.label_height(em), inner_width, ink);
        y += row.height(em);
    }

    Ok(Rendered { image: canvas, warnings: layout.into_warnings() })
}

/// Check step count and per-step input length against configured limits.
pub fn check_steps(steps: &[Step], max_steps: usize, max_len: usize) -> Result<(), RenderError> {
    if steps.is_empty() || steps.len() > max_steps {
        return Err(RenderError::StepCount { count: steps.len(), max: max_steps });
    }
    for (i, step) in steps.iter().enumerate() {
        check_length(&step.latex, max_len)
            .map_err(|e| RenderError::Step { index: i + 1, source: Box::new(e) })?;
    }
    Ok(())
}

fn layout_step(step: &Step, layout: &mut Layout, em: f32) -> Result<Row, RenderError> {
    if crate::latex::strip_outer_delimiters(&step.latex).is_empty() {
        return Err(RenderError::Empty);
    }
    let label = match step.label.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => {
            let mut column = Column::new(em);
            column.push_line(layout.text(text, em, true));
            Some(column)
        }
        _ => None,
    };
    let mut body = Column::new(em);
    layout_source(&step.latex, layout, &mut body)?;
    Ok(Row { label, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Theme;
    use image::RgbaImage;

    fn quadratic() -> Vec<Step> {
        vec![
            Step::new(Some("Problem"), "Solve: $x^2 - 5x + 6 = 0$"),
            Step::new(Some("Factor"), "(x-2)(x-3) = 0"),
            Step::new(Some("Answer"), r"x = 2 \text{ or } x = 3"),
        ]
    }

    fn rows_with(image: &RgbaImage, color: Rgba<u8>) -> Vec<u32> {
        image.enumerate_pixels().filter(|(_, _, p)| **p == color).map(|(_, y, _)| y).collect()
    }

    #[test]
    fn test_single_step() {
        let rendered = render_solution(&[Step::new(None, "a^2+b^2=c^2")], &SolutionOptions::default()).unwrap();
        assert!(rendered.image.width() > 0);
    }

    #[test]
    fn test_more_steps_are_taller() {
        let options = SolutionOptions::default();
        let two = render_solution(&quadratic()[..2], &options).unwrap();
        let three = render_solution(&quadratic(), &options).unwrap();
        assert!(three.image.height() > two.image.height());
    }

    #[test]
    fn test_dividers_between_rows() {
        let options = SolutionOptions::default();
        let rendered = render_solution(&quadratic(), &options).unwrap();
        let divider = options.render.palette.divider();
        let mut ys = rows_with(&rendered.image, divider);
        ys.dedup();
        assert!(!ys.is_empty());
        // two dividers, each at least one pixel tall
        let groups = ys.windows(2).filter(|w| w[1] != w[0] + 1).count() + 1;
        assert_eq!(groups, 2);
    }

    #[test]
    fn test_highlight_only_on_final_row() {
        let options = SolutionOptions { highlight_answer: true, ..SolutionOptions::default() };
        let rendered = render_solution(&quadratic(), &options).unwrap();
        let palette = options.render.palette;

        let highlighted = rows_with(&rendered.image, palette.highlight);
        let plain = rows_with(&rendered.image, palette.text);
        assert!(!highlighted.is_empty());
        assert!(!rows_with(&rendered.image, palette.highlight_band).is_empty());
        let first_highlight = highlighted.iter().min().unwrap();
        let last_plain = plain.iter().max().unwrap();
        assert!(last_plain < first_highlight);
    }

    #[test]
    fn test_no_highlight_for_single_step() {
        let options = SolutionOptions { highlight_answer: true, ..SolutionOptions::default() };
        let rendered = render_solution(&[Step::new(Some("Answer"), "x = 1")], &options).unwrap();
        assert!(rows_with(&rendered.image, options.render.palette.highlight).is_empty());
    }

    #[test]
    fn test_no_highlight_when_disabled() {
        let options = SolutionOptions::default();
        let rendered = render_solution(&quadratic(), &options).unwrap();
        assert!(rows_with(&rendered.image, options.render.palette.highlight).is_empty());
    }

    #[test]
    fn test_step_error_carries_index() {
        let steps = vec![Step::new(None, "x"), Step::new(None, r"\frac{1}")];
        let err = render_solution(&steps, &SolutionOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::Step { index: 2, .. }));
        assert!(err.to_string().starts_with("step 2: line 1:"));
    }

    #[test]
    fn test_blank_step_rejected() {
        let steps = vec![Step::new(Some("Given"), "  ")];
        let err = render_solution(&steps, &SolutionOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "step 1: LaTeX expression cannot be empty or whitespace only");
    }

    #[test]
    fn test_step_count_bounds() {
        let options = SolutionOptions::default();
        assert!(matches!(
            render_solution(&[], &options),
            Err(RenderError::StepCount { count: 0, .. })
        ));
        let many = vec![Step::new(None, "x"); MAX_STEPS + 1];
        assert!(matches!(
            render_solution(&many, &options),
            Err(RenderError::StepCount { count: 21, .. })
        ));
        let max = vec![Step::new(None, "x"); MAX_STEPS];
        assert!(render_solution(&max, &options).is_ok());
    }

    #[test]
    fn test_check_steps_limits() {
        assert!(check_steps(&[Step::new(None, "x")], 3, 10).is_ok());
        assert!(matches!(check_steps(&[], 3, 10), Err(RenderError::StepCount { count: 0, max: 3 })));
        assert!(matches!(
            check_steps(&[Step::new(None, "x"), Step::new(None, "abcdefghijk")], 3, 10),
            Err(RenderError::Step { index: 2, .. })
        ));
    }

    #[test]
    fn test_dark_theme_background() {
        let mut options = SolutionOptions::default();
        options.render.palette = Theme::Dark.palette();
        let rendered = render_solution(&quadratic(), &options).unwrap();
        assert_eq!(*rendered.image.get_pixel(0, 0), Theme::Dark.palette().background);
    }

    #[test]
    fn test_step_deserializes_without_label() {
        let step: Step = serde_json::from_str(r#"{"latex": "x+1"}"#).unwrap();
        assert_eq!(step, Step::new(None, "x+1"));
    }
}
