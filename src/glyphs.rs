//! 8x8 bitmap glyphs
//!
//! Latin, Latin-1 and Greek come from `font8x8`. Math symbols outside those
//! blocks are drawn here. Rows 0..=6 sit above the baseline, row 7 is the
//! descender row; bit 0 of each row is the leftmost column.

use font8x8::{UnicodeFonts, BASIC_FONTS, GREEK_FONTS, LATIN_FONTS};

/// One 8x8 monochrome glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    rows: [u8; 8],
}

impl Glyph {
    pub const fn from_rows(rows: [u8; 8]) -> Self {
        Self { rows }
    }

    /// Build a glyph from ASCII art, `#` marking ink.
    const fn art(lines: [&str; 8]) -> Self {
        let mut rows = [0u8; 8];
        let mut r = 0;
        while r < 8 {
            let bytes = lines[r].as_bytes();
            let mut c = 0;
            while c < 8 && c < bytes.len() {
                if bytes[c] == b'#' {
                    rows[r] |= 1 << c;
                }
                c += 1;
            }
            r += 1;
        }
        Self { rows }
    }

    pub fn is_set(&self, col: u32, row: u32) -> bool {
        col < 8 && row < 8 && self.rows[row as usize] & (1 << col) != 0
    }

    /// Leftmost and rightmost inked columns, `None` for a blank glyph.
    pub fn ink_columns(&self) -> Option<(u32, u32)> {
        let mask = self.rows.iter().fold(0u8, |acc, r| acc | r);
        if mask == 0 {
            return None;
        }
        Some((mask.trailing_zeros(), 7 - mask.leading_zeros()))
    }

    /// Lowest inked row, counted from the top.
    pub fn bottom_row(&self) -> Option<u32> {
        self.rows.iter().rposition(|&r| r != 0).map(|r| r as u32)
    }

    /// Top inked row.
    pub fn top_row(&self) -> Option<u32> {
        self.rows.iter().position(|&r| r != 0).map(|r| r as u32)
    }

    /// Double every stroke one column to the right.
    pub fn emboldened(&self) -> Self {
        let mut rows = self.rows;
        for row in rows.iter_mut() {
            *row |= *row << 1;
        }
        Self { rows }
    }
}

/// Look up the glyph for a character.
pub fn lookup(c: char) -> Option<Glyph> {
    if let Some((_, glyph)) = MATH_GLYPHS.iter().find(|(ch, _)| *ch == c) {
        return Some(*glyph);
    }
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| GREEK_FONTS.get(c))
        .map(Glyph::from_rows)
}

/// Replacement drawn for characters without a bitmap.
pub fn fallback() -> Glyph {
    REPLACEMENT
}

const REPLACEMENT: Glyph = Glyph::art([
    "######..",
    "#....#..",
    "#....#..",
    "#....#..",
    "#....#..",
    "#....#..",
    "######..",
    "........",
]);

#[rustfmt::skip]
static MATH_GLYPHS: &[(char, Glyph)] = &[
    ('≤', Glyph::art(["....##..", "..##....", "##......", "..##....", "....##..", "........", "######..", "........"])),
    ('≥', Glyph::art(["##......", "..##....", "....##..", "..##....", "##......", "........", "######..", "........"])),
    ('≠', Glyph::art(["........", "....##..", "######..", "...##...", "..##....", "######..", ".##.....", "........"])),
    ('≈', Glyph::art(["........", ".##..#..", "#..##...", "........", ".##..#..", "#..##...", "........", "........"])),
    ('∼', Glyph::art(["........", "........", ".##..#..", "#..##...", "........", "........", "........", "........"])),
    ('≃', Glyph::art(["........", ".##..#..", "#..##...", "........", "######..", "........", "........", "........"])),
    ('≡', Glyph::art(["........", "######..", "........", "######..", "........", "######..", "........", "........"])),
    ('∝', Glyph::art(["........", "........", ".##..##.", "#..##...", "#..##...", ".##..##.", "........", "........"])),
    ('∈', Glyph::art(["........", "..####..", ".##.....", "#####...", ".##.....", "..####..", "........", "........"])),
    ('∉', Glyph::art([".....#..", "..####..", ".##.#...", "#####...", ".###....", "..####..", ".#......", "........"])),
    ('⊂', Glyph::art(["........", "..####..", ".##.....", "##......", ".##.....", "..####..", "........", "........"])),
    ('⊆', Glyph::art(["..####..", ".##.....", "##......", ".##.....", "..####..", "........", "######..", "........"])),
    ('⊃', Glyph::art(["........", "####....", "...##...", "....##..", "...##...", "####....", "........", "........"])),
    ('⊇', Glyph::art(["####....", "...##...", "....##..", "...##...", "####....", "........", "######..", "........"])),
    ('≪', Glyph::art(["...#..#.", "..#..#..", ".#..#...", "#..#....", ".#..#...", "..#..#..", "...#..#.", "........"])),
    ('≫', Glyph::art([".#..#...", "..#..#..", "...#..#.", "....#..#", "...#..#.", "..#..#..", ".#..#...", "........"])),
    ('⊥', Glyph::art(["........", "...##...", "...##...", "...##...", "...##...", "...##...", "########", "........"])),
    ('∥', Glyph::art(["..#..#..", "..#..#..", "..#..#..", "..#..#..", "..#..#..", "..#..#..", "..#..#..", "........"])),
    ('→', Glyph::art(["........", "....#...", ".....#..", "#######.", ".....#..", "....#...", "........", "........"])),
    ('←', Glyph::art(["........", "..#.....", ".#......", "#######.", ".#......", "..#.....", "........", "........"])),
    ('⇒', Glyph::art(["........", "....#...", "######..", "......#.", "######..", "....#...", "........", "........"])),
    ('⇐', Glyph::art(["........", "..#.....", ".######.", "#.......", ".######.", "..#.....", "........", "........"])),
    ('⇔', Glyph::art(["........", "..#..#..", ".######.", "#......#", ".######.", "..#..#..", "........", "........"])),
    ('↔', Glyph::art(["........", "..#..#..", ".#....#.", "########", ".#....#.", "..#..#..", "........", "........"])),
    ('↦', Glyph::art(["........", "#...#...", "#....#..", "#######.", "#....#..", "#...#...", "........", "........"])),
    ('↑', Glyph::art(["...#....", "..###...", ".#.#.#..", "...#....", "...#....", "...#....", "...#....", "........"])),
    ('↓', Glyph::art(["...#....", "...#....", "...#....", "...#....", ".#.#.#..", "..###...", "...#....", "........"])),
    ('∓', Glyph::art(["######..", "........", "..##....", "..##....", "######..", "..##....", "..##....", "........"])),
    ('∘', Glyph::art(["........", "........", "..###...", ".#...#..", ".#...#..", "..###...", "........", "........"])),
    ('•', Glyph::art(["........", "........", "..###...", ".#####..", ".#####..", "..###...", "........", "........"])),
    ('⊕', Glyph::art(["..###...", ".#.#.#..", "#..#..#.", "#######.", "#..#..#.", ".#.#.#..", "..###...", "........"])),
    ('⊗', Glyph::art(["..###...", ".##.##..", "#.#.#.#.", "#..#..#.", "#.#.#.#.", ".##.##..", "..###...", "........"])),
    ('∪', Glyph::art(["........", "##...##.", "##...##.", "##...##.", "##...##.", ".#####..", "........", "........"])),
    ('∩', Glyph::art(["........", ".#####..", "##...##.", "##...##.", "##...##.", "##...##.", "........", "........"])),
    ('∧', Glyph::art(["........", "...#....", "..###...", ".##.##..", "##...##.", "#.....#.", "........", "........"])),
    ('∨', Glyph::art(["........", "#.....#.", "##...##.", ".##.##..", "..###...", "...#....", "........", "........"])),
    ('∞', Glyph::art(["........", "........", ".##.##..", "#..#..#.", "#..#..#.", ".##.##..", "........", "........"])),
    ('∂', Glyph::art(["..###...", ".....#..", "..####..", ".#...#..", "#....#..", "#...#...", ".###....", "........"])),
    ('∇', Glyph::art(["........", "#######.", "#.....#.", ".#...#..", ".#...#..", "..#.#...", "...#....", "........"])),
    ('∀', Glyph::art(["#.....#.", "#.....#.", ".#...#..", ".#####..", "..#.#...", "..#.#...", "...#....", "........"])),
    ('∃', Glyph::art(["######..", ".....#..", ".....#..", "..####..", ".....#..", ".....#..", "######..", "........"])),
    ('∅', Glyph::art([".....#..", "..###...", ".#.#.#..", ".#.#.#..", ".##..#..", "..###...", ".#......", "........"])),
    ('∠', Glyph::art(["........", "......#.", ".....#..", "....#...", "...#....", "..#.....", ".######.", "........"])),
    ('△', Glyph::art(["........", "...#....", "..#.#...", "..#.#...", ".#...#..", ".#...#..", "#######.", "........"])),
    ('…', Glyph::art(["........", "........", "........", "........", "........", "........", "#..#..#.", "........"])),
    ('⋯', Glyph::art(["........", "........", "........", "#..#..#.", "........", "........", "........", "........"])),
    ('′', Glyph::art(["...##...", "...##...", "..##....", "........", "........", "........", "........", "........"])),
    ('ħ', Glyph::art([".##.....", "######..", ".##.....", ".##.##..", ".###.##.", ".##..##.", ".##..##.", "........"])),
    ('ℓ', Glyph::art(["...##...", "..#..#..", "..#.#...", "..##....", "..#.....", ".##.....", "#..###..", "........"])),
    ('⟨', Glyph::art(["...#....", "..#.....", "..#.....", ".#......", "..#.....", "..#.....", "...#....", "........"])),
    ('⟩', Glyph::art([".#......", "..#.....", "..#.....", "...#....", "..#.....", "..#.....", ".#......", "........"])),
    ('⌊', Glyph::art(["..#.....", "..#.....", "..#.....", "..#.....", "..#.....", "..#.....", "..####..", "........"])),
    ('⌋', Glyph::art([".....#..", ".....#..", ".....#..", ".....#..", ".....#..", ".....#..", "..####..", "........"])),
    ('⌈', Glyph::art(["..####..", "..#.....", "..#.....", "..#.....", "..#.....", "..#.....", "..#.....", "........"])),
    ('⌉', Glyph::art(["..####..", ".....#..", ".....#..", ".....#..", ".....#..", ".....#..", ".....#..", "........"])),
    ('∐', Glyph::art(["##...##.", ".#...#..", ".#...#..", ".#...#..", ".#...#..", ".#...#..", "#######.", "........"])),
    ('⋃', Glyph::art(["#.....#.", "#.....#.", "#.....#.", "#.....#.", "#.....#.", ".#...#..", "..###...", "........"])),
    ('⋂', Glyph::art(["..###...", ".#...#..", "#.....#.", "#.....#.", "#.....#.", "#.....#.", "#.....#.", "........"])),
    ('∫', Glyph::art(["....##..", "...#..#.", "...#....", "...#....", "...#....", "...#....", "#..#....", ".##....."])),
    ('∬', Glyph::art(["...#...#", "..#...#.", "..#...#.", "..#...#.", "..#...#.", "..#...#.", "..#...#.", "#...#..."])),
    ('∮', Glyph::art(["....##..", "...#..#.", "..###...", ".#.#.#..", ".#.#.#..", "..###...", "#..#....", ".##....."])),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::symbols::all_symbol_chars;

    #[test]
    fn test_ascii_from_font8x8() {
        let a = lookup('A').unwrap();
        assert!(a.ink_columns().is_some());
        assert_eq!(a.bottom_row(), Some(6));
    }

    #[test]
    fn test_space_is_blank() {
        assert_eq!(lookup(' ').unwrap().ink_columns(), None);
    }

    #[test]
    fn test_math_table_takes_priority() {
        let arrow = lookup('→').unwrap();
        assert!(arrow.is_set(0, 3));
        assert!(arrow.is_set(6, 3));
        assert!(!arrow.is_set(7, 3));
    }

    #[test]
    fn test_every_mapped_symbol_has_a_glyph() {
        let missing: Vec<char> =
            all_symbol_chars().into_iter().filter(|c| lookup(*c).is_none()).collect();
        assert!(missing.is_empty(), "no glyph for {:?}", missing);
    }

    #[test]
    fn test_every_math_glyph_has_ink() {
        for (ch, glyph) in MATH_GLYPHS {
            assert!(glyph.ink_columns().is_some(), "blank glyph for {}", ch);
        }
    }

    #[test]
    fn test_ink_columns() {
        let glyph = Glyph::from_rows([0, 0b0000_1100, 0, 0, 0, 0, 0, 0]);
        assert_eq!(glyph.ink_columns(), Some((2, 3)));
        assert_eq!(glyph.top_row(), Some(1));
    }

    #[test]
    fn test_emboldened_widens_strokes() {
        let glyph = Glyph::from_rows([0b0000_0001, 0, 0, 0, 0, 0, 0, 0]).emboldened();
        assert!(glyph.is_set(0, 0));
        assert!(glyph.is_set(1, 0));
    }

    #[test]
    fn test_unknown_char_has_no_glyph() {
        assert!(lookup('😀').is_none());
        assert!(fallback().ink_columns().is_some());
    }
}
