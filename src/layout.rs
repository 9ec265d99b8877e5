//! Box layout for parsed math
//!
//! Every node becomes a [`LayoutBox`]: a width, an ascent above the baseline,
//! a descent below it, and drawing items positioned relative to the box's
//! left edge and baseline (y grows downward). Sizes are in pixels; `size` is
//! the em of the current style, and a glyph cell is `size` pixels square.

use crate::glyphs::{self, Glyph};
use crate::latex::{AccentKind, AtomClass, Node};

/// Fraction of the em a script is set at.
const SCRIPT_SCALE: f32 = 0.7;
/// Scripts never shrink below this fraction of the base em.
const MIN_SCALE: f32 = 0.5;
/// Math axis (center of `-` and `+`) above the baseline, in glyph units.
const AXIS_UNITS: f32 = 3.5;
/// Big operators stand this many ems tall
const BIG_OPERATOR_SCALE: f32 = 1.5;

/// A drawing primitive inside a [`LayoutBox`].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Glyph cell with its top-left corner at `(x, y)`; each bitmap column is
    /// `sx` wide and each row `sy` tall.
    Glyph {
        glyph: Glyph,
        x: f32,
        y: f32,
        sx: f32,
        sy: f32,
    },
    /// Filled rectangle with its top-left corner at `(x, y)`.
    Rule { x: f32, y: f32, w: f32, h: f32 },
    /// Stroked segment.
    Line {
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        thickness: f32,
    },
}

impl Item {
    fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            Item::Glyph { x, y, .. } | Item::Rule { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            Item::Line { x0, y0, x1, y1, .. } => {
                *x0 += dx;
                *x1 += dx;
                *y0 += dy;
                *y1 += dy;
            }
        }
    }
}

/// Laid-out content with its metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutBox {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
    pub items: Vec<Item>,
}

impl LayoutBox {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn space(width: f32) -> Self {
        Self { width, ..Self::default() }
    }

    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }

    /// Append `other` to the right, sharing the baseline.
    pub fn append(&mut self, other: LayoutBox) {
        let dx = self.width;
        let advance = other.width;
        self.place(other, dx, 0.0);
        // negative spaces pull the pen back
        self.width = dx + advance;
    }

    /// Overlay `other` with its origin at `(dx, dy)` relative to this box.
    pub fn place(&mut self, other: LayoutBox, dx: f32, dy: f32) {
        self.width = self.width.max(dx + other.width);
        self.ascent = self.ascent.max(other.ascent - dy);
        self.descent = self.descent.max(other.descent + dy);
        self.items.extend(other.items.into_iter().map(|mut item| {
            item.translate(dx, dy);
            item
        }));
    }

    pub fn push_space(&mut self, width: f32) {
        self.width += width;
    }

    /// Grow ascent and descent to at least the given values.
    pub fn with_min_extent(mut self, ascent: f32, descent: f32) -> Self {
        self.ascent = self.ascent.max(ascent);
        self.descent = self.descent.max(descent);
        self
    }
}

/// Spacing class used between adjacent atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spacing {
    Ord,
    Op,
    Bin,
    Rel,
    Punct,
    Open,
    Close,
}

impl From<AtomClass> for Spacing {
    fn from(class: AtomClass) -> Self {
        match class {
            AtomClass::Ord => Spacing::Ord,
            AtomClass::Bin => Spacing::Bin,
            AtomClass::Rel => Spacing::Rel,
            AtomClass::Punct => Spacing::Punct,
            AtomClass::Open => Spacing::Open,
            AtomClass::Close => Spacing::Close,
        }
    }
}

/// Space in em between two adjacent atoms.
fn inter_atom_space(left: Spacing, right: Spacing) -> f32 {
    use Spacing::*;
    match (left, right) {
        (Rel, Rel) => 0.0,
        (Rel, Punct) | (Open, Rel) => 0.0,
        (Rel, _) | (_, Rel) => 0.28,
        (Bin, _) | (_, Bin) => 0.22,
        (Op, Ord) | (Op, Op) | (Close, Op) | (Ord, Op) => 1.0 / 6.0,
        (Punct, _) => 1.0 / 6.0,
        _ => 0.0,
    }
}

fn class_of(node: &Node) -> Option<Spacing> {
    match node {
        Node::Symbol { class, .. } => Some((*class).into()),
        Node::Scripts { base, .. } => class_of(base).or(Some(Spacing::Ord)),
        Node::Function { .. } | Node::BigOperator { .. } => Some(Spacing::Op),
        Node::Space(_) => None,
        Node::Group(nodes) | Node::Styled { body: nodes, .. } if nodes.is_empty() => None,
        _ => Some(Spacing::Ord),
    }
}

/// Layout engine; collects non-fatal warnings along the way.
#[derive(Debug)]
pub struct Layout {
    min_size: f32,
    warnings: Vec<String>,
}

impl Layout {
    /// Create a layout context for text set at `base_size` pixels per em.
    pub fn new(base_size: f32) -> Self {
        Self { min_size: base_size * MIN_SCALE, warnings: Vec::new() }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    fn warn(&mut self, message: String) {
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    fn script_size(&self, size: f32) -> f32 {
        (size * SCRIPT_SCALE).max(self.min_size)
    }

    /// Lay out a math node list.
    pub fn nodes(&mut self, nodes: &[Node], size: f32, bold: bool) -> LayoutBox {
        let mut out = LayoutBox::empty();
        let mut prev: Option<Spacing> = None;

        for (i, node) in nodes.iter().enumerate() {
            let mut class = class_of(node);
            // a binary operator with nothing to its left is unary
            if class == Some(Spacing::Bin)
                && matches!(prev, None | Some(Spacing::Bin | Spacing::Rel | Spacing::Open | Spacing::Punct | Spacing::Op))
            {
                class = Some(Spacing::Ord);
            }
            // ... and so is one with nothing to its right
            if class == Some(Spacing::Bin) && nodes[i + 1..].iter().all(|n| class_of(n).is_none()) {
                class = Some(Spacing::Ord);
            }
            if let (Some(left), Some(right)) = (prev, class) {
                out.push_space(inter_atom_space(left, right) * size);
            }
            out.append(self.node(node, size, bold));
            if class.is_some() {
                prev = class;
            }
        }
        out
    }

    fn node(&mut self, node: &Node, size: f32, bold: bool) -> LayoutBox {
        match node {
            Node::Symbol { ch, .. } => self.glyph(*ch, size, bold),
            Node::Text { text, bold: text_bold } => self.text(text, size, bold || *text_bold),
            Node::Function { name, .. } => self.text(name, size, bold),
            Node::Group(nodes) => self.nodes(nodes, size, bold),
            Node::Styled { bold: styled_bold, body } => self.nodes(body, size, bold || *styled_bold),
            Node::Scripts { base, sub, sup } => {
                self.scripts(base, sub.as_deref(), sup.as_deref(), size, bold)
            }
            Node::Fraction { num, den, bar, scale } => {
                self.fraction(num, den, *bar, *scale, size, bold)
            }
            Node::Radical { index, body } => self.radical(index.as_deref(), body, size, bold),
            Node::BigOperator { ch, .. } => self.big_operator(*ch, size, bold),
            Node::Delimited { left, right, body } => {
                self.delimited(*left, *right, body, size, bold)
            }
            Node::Accent { kind, body } => self.accent(*kind, body, size, bold),
            Node::Space(em) => LayoutBox::space(em * size),
        }
    }

    /// Lay out upright text; spaces are kept.
    pub fn text(&mut self, text: &str, size: f32, bold: bool) -> LayoutBox {
        let mut out = LayoutBox::empty();
        for ch in text.chars() {
            out.append(self.glyph(ch, size, bold));
        }
        out
    }

    /// A single glyph box with half a unit of side bearing on each side.
    fn glyph(&mut self, ch: char, size: f32, bold: bool) -> LayoutBox {
        let glyph = self.resolve(ch, bold);
        let unit = size / 8.0;
        let Some((c0, c1)) = glyph.ink_columns() else {
            return LayoutBox::space(size * 0.45);
        };
        let top = glyph.top_row().unwrap_or(0) as f32;
        let bottom = glyph.bottom_row().unwrap_or(7) as f32;
        let bearing = unit * 0.5;

        LayoutBox {
            width: (c1 - c0 + 1) as f32 * unit + 2.0 * bearing,
            ascent: (7.0 - top) * unit,
            descent: (bottom - 6.0).max(0.0) * unit,
            items: vec![Item::Glyph {
                glyph,
                x: bearing - c0 as f32 * unit,
                y: -7.0 * unit,
                sx: unit,
                sy: unit,
            }],
        }
    }

    /// A glyph scaled so its ink spans `top..bottom` (baseline-relative).
    fn stretched_glyph(&mut self, ch: char, width_unit: f32, top: f32, bottom: f32, bold: bool) -> LayoutBox {
        let glyph = self.resolve(ch, bold);
        let Some((c0, c1)) = glyph.ink_columns() else {
            return LayoutBox::empty();
        };
        let first = glyph.top_row().unwrap_or(0) as f32;
        let last = glyph.bottom_row().unwrap_or(7) as f32;
        let sy = (bottom - top) / (last - first + 1.0);
        let bearing = width_unit * 0.5;

        LayoutBox {
            width: (c1 - c0 + 1) as f32 * width_unit + 2.0 * bearing,
            ascent: -top,
            descent: bottom,
            items: vec![Item::Glyph {
                glyph,
                x: bearing - c0 as f32 * width_unit,
                y: top - first * sy,
                sx: width_unit,
                sy,
            }],
        }
    }

    fn resolve(&mut self, ch: char, bold: bool) -> Glyph {
        let glyph = match glyphs::lookup(ch) {
            Some(g) => g,
            None => {
                self.warn(format!("no glyph for '{}' (U+{:04X}), drawn as a box", ch, ch as u32));
                glyphs::fallback()
            }
        };
        if bold {
            glyph.emboldened()
        } else {
            glyph
        }
    }

    fn scripts(
        &mut self,
        base: &Node,
        sub: Option<&[Node]>,
        sup: Option<&[Node]>,
        size: f32,
        bold: bool,
    ) -> LayoutBox {
        let limits = matches!(
            base,
            Node::BigOperator { limits: true, .. } | Node::Function { limits: true, .. }
        );
        let base_box = self.node(base, size, bold);
        let script_size = self.script_size(size);
        let sub_box = sub.map(|nodes| self.nodes(nodes, script_size, bold));
        let sup_box = sup.map(|nodes| self.nodes(nodes, script_size, bold));

        if limits {
            return stack_limits(base_box, sub_box, sup_box, size);
        }

        let kern = size * 0.05;
        let x = base_box.width + kern;
        let mut sup_shift = (size * 0.42).max(base_box.ascent - script_size * 0.4);
        let mut sub_shift = (size * 0.2).max(base_box.descent + size * 0.05);

        if let (Some(sup_b), Some(sub_b)) = (&sup_box, &sub_box) {
            // keep a gap between the bottom of the superscript and the top of the subscript
            let gap = (sup_shift - sup_b.descent) - (sub_b.ascent - sub_shift);
            let min_gap = size * 0.12;
            if gap < min_gap {
                let fix = (min_gap - gap) / 2.0;
                sup_shift += fix;
                sub_shift += fix;
            }
        }

        let mut out = base_box;
        if let Some(sup_b) = sup_box {
            out.place(sup_b, x, -sup_shift);
        }
        if let Some(sub_b) = sub_box {
            out.place(sub_b, x, sub_shift);
        }
        out.push_space(kern);
        out
    }

    fn fraction(
        &mut self,
        num: &[Node],
        den: &[Node],
        bar: bool,
        scale: f32,
        size: f32,
        bold: bool,
    ) -> LayoutBox {
        let child = (size * scale).max(self.min_size);
        let num_box = self.nodes(num, child, bold);
        let den_box = self.nodes(den, child, bold);

        let unit = size / 8.0;
        let thickness = (unit * 0.6).max(1.0);
        let gap = unit.max(1.0);
        let pad = size * 0.12;
        let axis = -AXIS_UNITS * unit;
        let inner = num_box.width.max(den_box.width);

        let num_y = axis - thickness / 2.0 - gap - num_box.descent;
        let den_y = axis + thickness / 2.0 + gap + den_box.ascent;
        let num_x = pad + (inner - num_box.width) / 2.0;
        let den_x = pad + (inner - den_box.width) / 2.0;

        let mut out = LayoutBox::space(inner + 2.0 * pad);
        if bar {
            out.items.push(Item::Rule {
                x: pad * 0.5,
                y: axis - thickness / 2.0,
                w: inner + pad,
                h: thickness,
            });
        }
        out.place(num_box, num_x, num_y);
        out.place(den_box, den_x, den_y);
        out
    }

    fn radical(&mut self, index: Option<&[Node]>, body: &[Node], size: f32, bold: bool) -> LayoutBox {
        let body_box = self.nodes(body, size, bold).with_min_extent(size * 0.6, 0.0);
        let unit = size / 8.0;
        let thickness = (unit * 0.6).max(1.0);
        let top = -(body_box.ascent + unit * 1.5);
        let bottom = body_box.descent + unit * 0.5;
        let height = bottom - top;
        let sign_width = size * 0.6;

        let index_box = index.map(|nodes| {
            let index_size = (size * 0.5).max(self.min_size * 0.8);
            self.nodes(nodes, index_size, bold)
        });
        let offset = index_box
            .as_ref()
            .map(|b| (b.width - sign_width * 0.5).max(0.0))
            .unwrap_or(0.0);

        let mut out = LayoutBox::empty();
        let tick = (offset, top + height * 0.6);
        let valley = (offset + sign_width * 0.35, bottom);
        let peak = (offset + sign_width, top);
        out.items.push(Item::Line { x0: tick.0, y0: tick.1, x1: valley.0, y1: valley.1, thickness });
        out.items.push(Item::Line {
            x0: valley.0,
            y0: valley.1,
            x1: peak.0,
            y1: peak.1,
            thickness: (thickness * 0.8).max(1.0),
        });
        let body_x = offset + sign_width + size * 0.1;
        out.items.push(Item::Rule {
            x: peak.0,
            y: top,
            w: body_x - peak.0 + body_box.width + size * 0.05,
            h: thickness,
        });
        out.ascent = -top;
        out.descent = bottom;
        out.width = body_x;

        if let Some(index_box) = index_box {
            let baseline = top + height * 0.45;
            out.place(index_box, 0.0, baseline);
        }
        out.place(body_box, body_x, 0.0);
        out.push_space(size * 0.1);
        out
    }

    fn big_operator(&mut self, ch: char, size: f32, bold: bool) -> LayoutBox {
        let unit = size / 8.0;
        let axis = -AXIS_UNITS * unit;
        let half_height = size * BIG_OPERATOR_SCALE / 2.0;
        // integral signs stay slim
        let width_unit = match ch {
            '∫' | '∬' | '∮' => unit * 1.2,
            _ => unit * BIG_OPERATOR_SCALE,
        };
        let mut out =
            self.stretched_glyph(ch, width_unit, axis - half_height, axis + half_height, bold);
        out.descent = out.descent.max(0.0);
        out.push_space(size * 0.08);
        out
    }

    fn delimited(&mut self, left: char, right: char, body: &[Node], size: f32, bold: bool) -> LayoutBox {
        let body_box = self.nodes(body, size, bold);
        let unit = size / 8.0;
        let axis = -AXIS_UNITS * unit;
        // delimiters are symmetric about the axis and cover the body
        let above = body_box.ascent + axis;
        let below = body_box.descent - axis;
        let half = above.max(below).max(size * 0.5) + size * 0.1;

        let mut out = self.delimiter(left, unit, axis - half, axis + half, bold);
        out.append(body_box);
        out.append(self.delimiter(right, unit, axis - half, axis + half, bold));
        out
    }

    fn delimiter(&mut self, ch: char, unit: f32, top: f32, bottom: f32, bold: bool) -> LayoutBox {
        if ch == '.' {
            return LayoutBox::space(unit);
        }
        self.stretched_glyph(ch, unit, top, bottom, bold)
    }

    fn accent(&mut self, kind: AccentKind, body: &[Node], size: f32, bold: bool) -> LayoutBox {
        let body_box = self.nodes(body, size, bold).with_min_extent(size * 0.5, 0.0);
        let unit = size / 8.0;
        let thickness = (unit * 0.6).max(1.0);
        let width = body_box.width;
        let top = -body_box.ascent;

        let mut out = LayoutBox::empty();
        let mark = match kind {
            AccentKind::Bar => {
                let y = top - unit * 1.5 - thickness;
                out.items.push(Item::Rule { x: unit * 0.5, y, w: (width - unit).max(unit), h: thickness });
                out.ascent = -y;
                None
            }
            AccentKind::Underline => {
                let y = body_box.descent + unit;
                out.items.push(Item::Rule { x: 0.0, y, w: width, h: thickness });
                out.descent = y + thickness;
                None
            }
            AccentKind::Hat => Some(('^', size * 0.8)),
            AccentKind::Vec => Some(('→', size * 0.6)),
            AccentKind::Dot => Some(('.', size)),
            AccentKind::DoubleDot => Some(('¨', size)),
            AccentKind::Tilde => Some(('~', size * 0.8)),
        };

        if let Some((ch, mark_size)) = mark {
            let mark_box = self.glyph(ch, mark_size, bold);
            let x = (width - mark_box.width) / 2.0;
            // seat the mark's ink one unit above the body
            let dy = top - unit - ink_bottom(ch, mark_size);
            out.place(mark_box, x, dy);
        }
        out.place(body_box, 0.0, 0.0);
        out
    }
}

/// Baseline-relative y of the bottom edge of a glyph's ink.
fn ink_bottom(ch: char, size: f32) -> f32 {
    let row = glyphs::lookup(ch).and_then(|g| g.bottom_row()).unwrap_or(6);
    (row as f32 - 6.0) * size / 8.0
}

/// Center limits above and below an operator.
fn stack_limits(
    base: LayoutBox,
    sub: Option<LayoutBox>,
    sup: Option<LayoutBox>,
    size: f32,
) -> LayoutBox {
    let gap = size * 0.15;
    let width = [Some(&base), sub.as_ref(), sup.as_ref()]
        .into_iter()
        .flatten()
        .map(|b| b.width)
        .fold(0.0f32, f32::max);

    let base_ascent = base.ascent;
    let base_descent = base.descent;
    let mut out = LayoutBox::space(width);
    let base_x = (width - base.width) / 2.0;
    out.place(base, base_x, 0.0);
    if let Some(sup) = sup {
        let x = (width - sup.width) / 2.0;
        let y = -(base_ascent + gap + sup.descent);
        out.place(sup, x, y);
    }
    if let Some(sub) = sub {
        let x = (width - sub.width) / 2.0;
        let y = base_descent + gap + sub.ascent;
        out.place(sub, x, y);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::parse;

    const SIZE: f32 = 32.0;

    fn layout(src: &str) -> LayoutBox {
        let nodes = parse(src).unwrap();
        Layout::new(SIZE).nodes(&nodes, SIZE, false)
    }

    #[test]
    fn test_single_glyph_metrics() {
        let b = layout("A");
        // 'A' ink spans 6 columns and rows 0..=6
        assert!((b.width - 7.0 * 4.0).abs() < 0.01);
        assert!((b.ascent - 28.0).abs() < 0.01);
        assert_eq!(b.descent, 0.0);
        assert_eq!(b.items.len(), 1);
    }

    #[test]
    fn test_relation_gets_spacing() {
        let tight = layout("ab").width;
        let spaced = layout("a=b").width;
        let eq = layout("=").width;
        assert!(spaced > tight + eq + 0.5 * SIZE);
    }

    #[test]
    fn test_unary_minus_has_no_spacing() {
        let unary = layout("-x").width;
        let glyphs = layout("-").width + layout("x").width;
        assert!((unary - glyphs).abs() < 0.01);
    }

    #[test]
    fn test_superscript_raised_and_smaller() {
        let b = layout("x^2");
        let base = layout("x");
        assert!(b.ascent > base.ascent);
        assert!(b.width < base.width + layout("2").width);
    }

    #[test]
    fn test_fraction_stacks_vertically() {
        let b = layout(r"\frac{1}{2}");
        let one = layout("1");
        assert!(b.ascent > one.ascent);
        assert!(b.descent > SIZE * 0.3);
        assert!(b.items.iter().any(|i| matches!(i, Item::Rule { .. })));
    }

    #[test]
    fn test_binom_has_no_bar() {
        let b = layout(r"\binom{n}{k}");
        assert!(!b.items.iter().any(|i| matches!(i, Item::Rule { .. })));
    }

    #[test]
    fn test_radical_draws_sign_and_overline() {
        let b = layout(r"\sqrt{x}");
        let lines = b.items.iter().filter(|i| matches!(i, Item::Line { .. })).count();
        assert_eq!(lines, 2);
        assert!(b.items.iter().any(|i| matches!(i, Item::Rule { .. })));
        assert!(b.width > layout("x").width);
    }

    #[test]
    fn test_sum_limits_are_stacked() {
        let with_limits = layout(r"\sum_{i=1}^{n}");
        let bare = layout(r"\sum");
        assert!(with_limits.ascent > bare.ascent);
        assert!(with_limits.descent > bare.descent);
        // limits are centered, not placed to the right
        assert!(with_limits.width < bare.width + layout("i=1").width);
    }

    #[test]
    fn test_big_operators_are_one_and_a_half_em() {
        for op in [r"\sum", r"\prod", r"\int", r"\oint"] {
            let b = layout(op);
            assert!((b.height() - 1.5 * SIZE).abs() < 0.01, "{} is {} tall", op, b.height());
        }
        assert!(layout(r"\sum").width > layout("x").width);
    }

    #[test]
    fn test_delimiters_grow_with_content() {
        let small = layout(r"\left( x \right)");
        let tall = layout(r"\left( \frac{\frac{1}{2}}{3} \right)");
        assert!(tall.height() > small.height());
    }

    #[test]
    fn test_missing_glyph_warns_once() {
        let nodes = parse("😀😀").unwrap();
        let mut layout = Layout::new(SIZE);
        let b = layout.nodes(&nodes, SIZE, false);
        assert_eq!(layout.warnings().len(), 1);
        assert_eq!(b.items.len(), 2);
    }

    #[test]
    fn test_bold_is_wider() {
        let mut layout = Layout::new(SIZE);
        let regular = layout.text("x", SIZE, false);
        let bold = layout.text("x", SIZE, true);
        assert!(bold.width > regular.width);
    }

    #[test]
    fn test_text_keeps_spaces() {
        let mut layout = Layout::new(SIZE);
        let spaced = layout.text("a b", SIZE, false);
        let joined = layout.text("ab", SIZE, false);
        assert!(spaced.width > joined.width);
    }

    #[test]
    fn test_accent_raises_ascent() {
        assert!(layout(r"\bar{x}").ascent > layout("x").ascent);
        assert!(layout(r"\hat{x}").ascent > layout("x").ascent);
    }

    #[test]
    fn test_script_size_floor() {
        let layout = Layout::new(SIZE);
        assert_eq!(layout.script_size(SIZE), SIZE * 0.7);
        assert_eq!(layout.script_size(SIZE * 0.5), SIZE * 0.5);
    }
}
