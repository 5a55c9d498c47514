//! Pipeline parameters.
//!
//! One struct per stage, grouped under [`PipelineParams`]. Every struct
//! deserializes with defaults for missing fields, so a params file only
//! needs to name the values it changes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnredactError};
use crate::model::Category;

/// Parameters for span clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    /// If two spans overlap vertically by more than this, relative to the
    /// smaller of the two heights, they can share a block.
    pub line_overlap: f64,

    /// Physical floor for the vertical overlap, in mm.
    pub min_vertical_overlap_mm: f64,

    /// Spans further apart horizontally than this (mm) never merge.
    pub max_horizontal_gap_mm: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            line_overlap: 0.5,
            min_vertical_overlap_mm: 0.5,
            max_horizontal_gap_mm: 60.0,
        }
    }
}

/// Parameters for redaction detection and context extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocateParams {
    /// Minimum fraction of the rectangle's area that must fall inside a
    /// block for the rectangle to count as a redaction.
    pub min_overlap: f64,

    /// Upper bound on the length of each context string, in characters.
    pub max_context_chars: usize,

    /// Rectangles with a known fill brighter than this are not redactions.
    pub max_fill_luminance: f64,

    /// Rectangles overlapping an earlier one by at least this IoU are dropped.
    pub dedupe_iou: f64,
}

impl Default for LocateParams {
    fn default() -> Self {
        Self {
            min_overlap: 0.3,
            max_context_chars: 120,
            max_fill_luminance: 0.35,
            dedupe_iou: 0.9,
        }
    }
}

/// Parameters for the typographic profile and gap measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypographyParams {
    /// Advance of a narrow glyph, in em.
    pub narrow_glyph_em: f64,

    /// Advance of a wide glyph, in em.
    pub wide_glyph_em: f64,

    /// Spans with two or more characters needed before tracking is estimated.
    pub min_tracking_samples: usize,

    /// Font size assumed when the document has no usable spans.
    pub fallback_font_size_pt: f64,

    /// Floor for the narrowest plausible character, in mm.
    pub min_char_width_mm: f64,
}

impl Default for TypographyParams {
    fn default() -> Self {
        Self {
            narrow_glyph_em: 0.40,
            wide_glyph_em: 0.70,
            min_tracking_samples: 3,
            fallback_font_size_pt: 11.0,
            min_char_width_mm: 0.5,
        }
    }
}

/// Parameters for rule-based classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyParams {
    /// Weight of a context-pattern hit in the combined score.
    pub pattern_weight: f64,

    /// Weight of the character-count agreement in the combined score.
    pub range_weight: f64,

    /// Winning scores below this fall back to `unknown`.
    pub min_confidence: f64,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            pattern_weight: 0.7,
            range_weight: 0.3,
            min_confidence: 0.0,
        }
    }
}

/// Parameters for candidate generation and width scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Width of the Gaussian falloff, in mm.
    pub sigma_mm: f64,

    /// Per-category overrides of `sigma_mm`.
    pub category_sigma_mm: BTreeMap<Category, f64>,

    /// Number of candidates kept per redaction.
    pub top_n: usize,

    /// Candidate strings considered per category lookup.
    pub max_lookup: usize,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            sigma_mm: 1.5,
            category_sigma_mm: BTreeMap::new(),
            top_n: 5,
            max_lookup: 5000,
        }
    }
}

impl MatchParams {
    /// σ for `category`, falling back to the global value.
    pub fn sigma_for(&self, category: Category) -> f64 {
        self.category_sigma_mm
            .get(&category)
            .copied()
            .unwrap_or(self.sigma_mm)
    }
}

/// All pipeline parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub segment: SegmentParams,
    pub locate: LocateParams,
    pub typography: TypographyParams,
    pub classify: ClassifyParams,
    pub matching: MatchParams,

    /// Worker threads; `None` uses the available parallelism.
    pub threads: Option<usize>,
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(UnredactError::InvalidParams(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(UnredactError::InvalidParams(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(UnredactError::InvalidParams(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

impl PipelineParams {
    /// Loads parameters from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    /// Rejects tunables that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        let s = &self.segment;
        unit_interval("segment.line_overlap", s.line_overlap)?;
        non_negative("segment.min_vertical_overlap_mm", s.min_vertical_overlap_mm)?;
        positive("segment.max_horizontal_gap_mm", s.max_horizontal_gap_mm)?;

        let l = &self.locate;
        unit_interval("locate.min_overlap", l.min_overlap)?;
        unit_interval("locate.max_fill_luminance", l.max_fill_luminance)?;
        unit_interval("locate.dedupe_iou", l.dedupe_iou)?;

        let t = &self.typography;
        positive("typography.narrow_glyph_em", t.narrow_glyph_em)?;
        positive("typography.wide_glyph_em", t.wide_glyph_em)?;
        positive("typography.fallback_font_size_pt", t.fallback_font_size_pt)?;
        positive("typography.min_char_width_mm", t.min_char_width_mm)?;

        let c = &self.classify;
        non_negative("classify.pattern_weight", c.pattern_weight)?;
        non_negative("classify.range_weight", c.range_weight)?;
        if c.pattern_weight + c.range_weight <= 0.0 {
            return Err(UnredactError::InvalidParams(
                "classify weights must not both be zero".to_string(),
            ));
        }
        unit_interval("classify.min_confidence", c.min_confidence)?;

        let m = &self.matching;
        positive("matching.sigma_mm", m.sigma_mm)?;
        for (category, sigma) in &m.category_sigma_mm {
            positive(&format!("matching.category_sigma_mm.{category}"), *sigma)?;
        }
        if m.top_n == 0 {
            return Err(UnredactError::InvalidParams(
                "matching.top_n must be at least 1".to_string(),
            ));
        }

        if self.threads == Some(0) {
            return Err(UnredactError::InvalidParams(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
