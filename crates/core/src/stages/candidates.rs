//! Candidate generation and width scoring.
//!
//! Each candidate is rendered in the document's dominant face and size,
//! and scored by a Gaussian falloff on the difference between its width and
//! the measured gap.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use rayon::prelude::*;

use crate::error::{Result, UnredactError};
use crate::font::{FontMetrics, StandardFace};
use crate::model::{
    Candidate, Category, DocumentState, GapProfile, Prediction, RedactionId, TypographicProfile,
};
use crate::params::MatchParams;
use crate::sources::CandidateSource;
use crate::units::PT_TO_MM;
use crate::utils::cmp_f64;

/// Advance of an unknown glyph when the document gave no measurement, in em.
const DEFAULT_ADVANCE_EM: f64 = 0.5;

/// Renders strings to physical widths.
#[derive(Debug, Clone, Copy)]
pub struct WidthModel {
    metrics: &'static FontMetrics,
    size_pt: f64,
    fallback_mm: f64,
    tracking_mm: f64,
}

impl WidthModel {
    pub fn from_profile(profile: &TypographicProfile, fallback_size_pt: f64) -> Self {
        let face = profile
            .dominant_font
            .as_deref()
            .map(StandardFace::resolve)
            .unwrap_or(StandardFace::Helvetica);
        let size_pt = profile
            .dominant_font_size_pt
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(fallback_size_pt);
        let fallback_mm = profile
            .mean_char_width_mm
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(DEFAULT_ADVANCE_EM * size_pt * PT_TO_MM);
        Self {
            metrics: face.metrics(),
            size_pt,
            fallback_mm,
            tracking_mm: profile.tracking_mm,
        }
    }

    pub fn face(&self) -> StandardFace {
        self.metrics.face
    }

    /// `Σ char_width + (len - 1) × tracking`, in mm.
    pub fn width_mm(&self, text: &str) -> f64 {
        self.metrics
            .text_width_mm(text, self.size_pt, self.fallback_mm, self.tracking_mm)
    }
}

/// `exp(-(delta / sigma)²)`, clamped to `[0, 1]`.
pub fn width_score(delta_mm: f64, sigma_mm: f64) -> f64 {
    if sigma_mm.is_nan() || sigma_mm <= 0.0 {
        return if delta_mm == 0.0 { 1.0 } else { 0.0 };
    }
    let z = delta_mm / sigma_mm;
    let score = (-(z * z)).exp();
    if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 }
}

/// Fetches, deduplicates and bounds the candidate strings for a category.
fn lookup_bounded(source: &dyn CandidateSource, category: Category, max_lookup: usize) -> Vec<String> {
    let unique: IndexSet<String> = source
        .lookup(category)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if unique.len() > max_lookup {
        tracing::warn!(%category, available = unique.len(), kept = max_lookup, "candidate lookup truncated");
    }
    unique.into_iter().take(max_lookup).collect()
}

/// Scores pre-rendered candidates against one gap and keeps the best.
pub fn rank_candidates(
    rendered: &[(String, f64)],
    gap: &GapProfile,
    sigma_mm: f64,
    top_n: usize,
) -> Vec<Candidate> {
    let mut scored: Vec<Candidate> = rendered
        .iter()
        .map(|(text, width)| {
            let delta = width - gap.gap_width_mm;
            Candidate {
                text: text.clone(),
                calculated_width_mm: *width,
                width_delta_mm: delta,
                score: width_score(delta, sigma_mm),
            }
        })
        .collect();
    // Stable: equal scores keep corpus order.
    scored.sort_by(|a, b| cmp_f64(b.score, a.score));
    scored.truncate(top_n);
    scored
}

/// Generates and ranks candidates for every predicted redaction.
pub fn match_candidates(
    predictions: &BTreeMap<RedactionId, Prediction>,
    gaps: &BTreeMap<RedactionId, GapProfile>,
    profile: &TypographicProfile,
    source: &dyn CandidateSource,
    params: &MatchParams,
    fallback_size_pt: f64,
) -> BTreeMap<RedactionId, Vec<Candidate>> {
    let model = WidthModel::from_profile(profile, fallback_size_pt);

    // One lookup per distinct category.
    let categories: IndexSet<Category> = predictions.values().map(|p| p.category).collect();
    let rendered: BTreeMap<Category, Vec<(String, f64)>> = categories
        .into_iter()
        .map(|category| {
            let strings = lookup_bounded(source, category, params.max_lookup);
            tracing::debug!(%category, candidates = strings.len(), face = ?model.face(), "rendered candidates");
            let widths = strings
                .into_iter()
                .map(|s| {
                    let w = model.width_mm(&s);
                    (s, w)
                })
                .collect();
            (category, widths)
        })
        .collect();

    let entries: Vec<(&RedactionId, &Prediction)> = predictions.iter().collect();
    let ranked: Vec<(RedactionId, Vec<Candidate>)> = entries
        .par_iter()
        .map(|&(id, prediction)| {
            let candidates = match (gaps.get(id), rendered.get(&prediction.category)) {
                (Some(gap), Some(pool)) => {
                    rank_candidates(pool, gap, params.sigma_for(prediction.category), params.top_n)
                }
                (None, _) => {
                    tracing::warn!(%id, "no gap profile, no candidates");
                    Vec::new()
                }
                (Some(_), None) => Vec::new(),
            };
            (*id, candidates)
        })
        .collect();
    ranked.into_iter().collect()
}

/// Stage entry point: requires predictions, gaps and the typographic profile.
pub fn run(
    state: &DocumentState,
    source: &dyn CandidateSource,
    params: &MatchParams,
    fallback_size_pt: f64,
) -> Result<BTreeMap<RedactionId, Vec<Candidate>>> {
    let missing = |field| UnredactError::MissingUpstream {
        stage: "match-candidates",
        field,
    };
    let predictions = state.predictions.as_ref().ok_or_else(|| missing("predictions"))?;
    let gaps = state.gaps.as_ref().ok_or_else(|| missing("gaps"))?;
    let profile = state.typography.as_ref().ok_or_else(|| missing("typography"))?;
    Ok(match_candidates(predictions, gaps, profile, source, params, fallback_size_pt))
}
