use serde::{Deserialize, Serialize};

/// Document-wide typographic rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypographicProfile {
    /// Most frequent font name, `None` when the document has no usable spans.
    pub dominant_font: Option<String>,
    pub dominant_font_size_pt: Option<f64>,
    /// Mean observed character advance in mm.
    pub mean_char_width_mm: Option<f64>,
    /// Estimated inter-character tracking in mm; 0.0 when not estimable.
    pub tracking_mm: f64,
    /// Font sizes seen in the document with their character counts,
    /// ascending by size.
    #[serde(default)]
    pub size_histogram: Vec<(f64, usize)>,
}

/// Physical measurement of one redacted gap.
///
/// `estimated_char_count_min <= estimated_char_count_max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapProfile {
    pub gap_width_mm: f64,
    pub gap_width_norm: f64,
    pub estimated_char_count_min: u32,
    pub estimated_char_count_max: u32,
}
