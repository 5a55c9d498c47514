//! Advance widths for the standard Helvetica, Times-Roman and Courier faces.
//!
//! Widths are in 1/1000 em over printable ASCII (U+0020..=U+007E), taken
//! from the Adobe Core 14 AFM files.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::units::PT_TO_MM;

const FIRST_CHAR: u32 = 0x20;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const COURIER_WIDTHS: [u16; 95] = [600; 95];

/// One of the built-in faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFace {
    Helvetica,
    TimesRoman,
    Courier,
}

impl StandardFace {
    pub fn name(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::TimesRoman => "Times-Roman",
            Self::Courier => "Courier",
        }
    }

    pub fn metrics(self) -> &'static FontMetrics {
        &FONT_METRICS[self as usize]
    }

    /// Maps a document font name onto the closest built-in face.
    ///
    /// Subset prefixes (`ABCDEF+Arial-Bold`) are ignored. Unknown families
    /// resolve to Helvetica.
    pub fn resolve(font_name: &str) -> Self {
        let name = strip_subset_prefix(font_name).to_ascii_lowercase();
        if name.contains("courier") || name.contains("mono") {
            Self::Courier
        } else if name.contains("sans") || name.contains("arial") || name.contains("helvetica") {
            Self::Helvetica
        } else if name.contains("times")
            || name.contains("serif")
            || name.contains("georgia")
            || name.contains("roman")
        {
            Self::TimesRoman
        } else {
            Self::Helvetica
        }
    }
}

/// Strips a six-letter subset tag such as `ABCDEF+`.
pub fn strip_subset_prefix(font_name: &str) -> &str {
    match font_name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => {
            rest
        }
        _ => font_name,
    }
}

/// Advance widths for one face.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub face: StandardFace,
    widths: HashMap<char, f64>,
}

impl FontMetrics {
    fn from_table(face: StandardFace, table: &[u16; 95]) -> Self {
        let widths = table
            .iter()
            .enumerate()
            .filter_map(|(i, w)| char::from_u32(FIRST_CHAR + i as u32).map(|c| (c, f64::from(*w))))
            .collect();
        Self { face, widths }
    }

    /// Advance of `ch` in 1/1000 em, if the face has a metric for it.
    pub fn char_width(&self, ch: char) -> Option<f64> {
        self.widths.get(&ch).copied()
    }

    /// Advance of `ch` in mm at `size_pt`.
    pub fn advance_mm(&self, ch: char, size_pt: f64) -> Option<f64> {
        self.char_width(ch)
            .map(|w| w / 1000.0 * size_pt * PT_TO_MM)
    }

    /// Glyph-only width of `text` in mm, substituting `fallback_mm` for
    /// characters without a metric.
    pub fn glyph_width_mm(&self, text: &str, size_pt: f64, fallback_mm: f64) -> f64 {
        text.chars()
            .map(|ch| self.advance_mm(ch, size_pt).unwrap_or(fallback_mm))
            .sum()
    }

    /// Rendered width of `text` in mm: glyph widths plus `tracking_mm`
    /// between each pair of adjacent characters.
    pub fn text_width_mm(&self, text: &str, size_pt: f64, fallback_mm: f64, tracking_mm: f64) -> f64 {
        let n = text.chars().count();
        if n == 0 {
            return 0.0;
        }
        self.glyph_width_mm(text, size_pt, fallback_mm) + (n - 1) as f64 * tracking_mm
    }
}

/// Metrics for every [`StandardFace`], indexed by discriminant.
pub static FONT_METRICS: LazyLock<[FontMetrics; 3]> = LazyLock::new(|| {
    [
        FontMetrics::from_table(StandardFace::Helvetica, &HELVETICA_WIDTHS),
        FontMetrics::from_table(StandardFace::TimesRoman, &TIMES_ROMAN_WIDTHS),
        FontMetrics::from_table(StandardFace::Courier, &COURIER_WIDTHS),
    ]
});
