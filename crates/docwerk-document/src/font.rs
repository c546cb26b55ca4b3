// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Standard-14 font metrics used to measure text before drawing it.

/// Helvetica advance widths for codepoints 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_ASCENT: f32 = 718.0;
const HELVETICA_DESCENT: f32 = -207.0;

/// A non-embedded standard font with known metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
}

impl StandardFont {
    /// PostScript name written into the font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
        }
    }

    /// Whether the font can render `c` with the encoding we write.
    pub fn supports(&self, c: char) -> bool {
        (' '..='~').contains(&c)
    }

    /// Rendered width of `text` at `size` points. Unsupported characters
    /// are measured as `?`, which is what sanitising replaces them with.
    pub fn width_of_text_at_size(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| {
                let c = if self.supports(c) { c } else { '?' };
                HELVETICA_WIDTHS[(c as u32 - 32) as usize] as u32
            })
            .sum();
        units as f32 * size / 1000.0
    }

    /// Height from descender to ascender at `size` points.
    pub fn height_at_size(&self, size: f32) -> f32 {
        (HELVETICA_ASCENT - HELVETICA_DESCENT) * size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_follow_the_afm_table() {
        let font = StandardFont::Helvetica;
        // "A" is 667 units wide.
        assert!((font.width_of_text_at_size("A", 1000.0) - 667.0).abs() < f32::EPSILON);
        // Space is 278 units; at 10pt that is 2.78pt.
        assert!((font.width_of_text_at_size(" ", 10.0) - 2.78).abs() < 1e-4);
        assert_eq!(font.width_of_text_at_size("", 12.0), 0.0);
    }

    #[test]
    fn unsupported_characters_measure_as_question_mark() {
        let font = StandardFont::Helvetica;
        assert_eq!(
            font.width_of_text_at_size("Ж", 12.0),
            font.width_of_text_at_size("?", 12.0)
        );
        assert!(!font.supports('Ж'));
        assert!(!font.supports('\n'));
        assert!(font.supports('~'));
    }

    #[test]
    fn height_scales_with_size() {
        let font = StandardFont::Helvetica;
        assert!((font.height_at_size(10.0) - 9.25).abs() < 1e-4);
    }
}
