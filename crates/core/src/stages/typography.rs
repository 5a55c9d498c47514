//! Document typography and physical gap measurement.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::error::{Result, UnredactError};
use crate::font::StandardFace;
use crate::model::{DocumentState, GapProfile, Page, Redaction, RedactionId, TextSpan, TypographicProfile};
use crate::params::TypographyParams;
use crate::units::{PT_TO_MM, denormalise_to_mm};
use crate::utils::HasBBox;

/// Occurrences of one (font, size) pair.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    spans: usize,
    chars: usize,
}

fn usable(span: &TextSpan) -> bool {
    span.bbox.is_well_formed() && !span.text.is_empty() && span.size_pt.is_finite() && span.size_pt > 0.0
}

/// Observed advance per character of a span, in mm.
fn observed_char_width(span: &TextSpan, page: &Page) -> f64 {
    span.bbox.width() * page.width_mm / span.char_count() as f64
}

/// Builds the document-wide profile from every usable span.
pub fn build_profile(pages: &[Page], params: &TypographyParams) -> TypographicProfile {
    let mut tallies: BTreeMap<(&str, OrderedFloat<f64>), Tally> = BTreeMap::new();
    let mut histogram: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
    let (mut width_sum, mut width_n) = (0.0_f64, 0_usize);

    for page in pages {
        for span in page.spans.iter().filter(|s| usable(s)) {
            let chars = span.char_count();
            let tally = tallies
                .entry((span.font.as_str(), OrderedFloat(span.size_pt)))
                .or_default();
            tally.spans += 1;
            tally.chars += chars;
            *histogram.entry(OrderedFloat(span.size_pt)).or_default() += chars;

            let w = observed_char_width(span, page);
            if w.is_finite() {
                width_sum += w;
                width_n += 1;
            }
        }
    }

    // Most spans, then most characters, then lowest font name, then smaller size.
    let dominant = tallies.iter().max_by(|a, b| {
        (a.1.spans, a.1.chars)
            .cmp(&(b.1.spans, b.1.chars))
            .then_with(|| b.0.cmp(a.0))
    });

    let mean_char_width_mm = (width_n > 0).then(|| width_sum / width_n as f64);
    let tracking_mm = estimate_tracking(pages, mean_char_width_mm.unwrap_or(0.0), params);

    TypographicProfile {
        dominant_font: dominant.map(|((font, _), _)| (*font).to_string()),
        dominant_font_size_pt: dominant.map(|((_, size), _)| size.into_inner()),
        mean_char_width_mm,
        tracking_mm,
        size_histogram: histogram
            .into_iter()
            .map(|(size, chars)| (size.into_inner(), chars))
            .collect(),
    }
}

/// Mean per-gap residual between observed span widths and the glyph-only
/// widths predicted by the span's font metrics.
fn estimate_tracking(pages: &[Page], fallback_mm: f64, params: &TypographyParams) -> f64 {
    let (mut sum, mut n) = (0.0_f64, 0_usize);
    for page in pages {
        for span in page.spans.iter().filter(|s| usable(s)) {
            let chars = span.char_count();
            if chars < 2 {
                continue;
            }
            let metrics = StandardFace::resolve(&span.font).metrics();
            let glyphs = metrics.glyph_width_mm(&span.text, span.size_pt, fallback_mm);
            let observed = span.bbox.width() * page.width_mm;
            let residual = (observed - glyphs) / (chars - 1) as f64;
            if residual.is_finite() {
                sum += residual;
                n += 1;
            }
        }
    }
    if n == 0 || n < params.min_tracking_samples {
        return 0.0;
    }
    let tracking = sum / n as f64;
    if tracking.is_finite() { tracking } else { 0.0 }
}

/// Narrowest and widest plausible character advance for the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharWidthBounds {
    pub min_mm: f64,
    pub max_mm: f64,
}

impl CharWidthBounds {
    /// Derives the bounds from the smallest and largest font sizes in use.
    pub fn from_profile(profile: &TypographicProfile, params: &TypographyParams) -> Self {
        let sizes = profile.size_histogram.iter().map(|(size, _)| *size);
        let low = sizes.clone().reduce(f64::min).unwrap_or(params.fallback_font_size_pt);
        let high = sizes.reduce(f64::max).unwrap_or(params.fallback_font_size_pt);

        let floor = params.min_char_width_mm;
        let narrow = params.narrow_glyph_em * low * PT_TO_MM + profile.tracking_mm;
        let wide = params.wide_glyph_em * high * PT_TO_MM + profile.tracking_mm;
        let min_mm = if narrow.is_finite() { narrow.max(floor) } else { floor };
        let max_mm = if wide.is_finite() { wide.max(floor) } else { floor };
        if min_mm <= max_mm {
            Self { min_mm, max_mm }
        } else {
            Self {
                min_mm: max_mm,
                max_mm: min_mm,
            }
        }
    }

    /// Inclusive character-count range for a gap of `gap_mm`.
    pub fn char_count_range(&self, gap_mm: f64) -> (u32, u32) {
        // `as` saturates and maps NaN to zero.
        let lo = (gap_mm / self.max_mm).floor() as u32;
        let hi = (gap_mm / self.min_mm).ceil() as u32;
        if lo <= hi { (lo, hi) } else { (hi, lo) }
    }
}

/// Measures one redaction's gap on its page.
pub fn measure_gap(redaction: &Redaction, page: Option<&Page>, bounds: &CharWidthBounds) -> GapProfile {
    let gap_width_norm = redaction.bbox.w;
    let gap_width_mm = match page {
        Some(page) => denormalise_to_mm(gap_width_norm, page.width_mm),
        None => {
            tracing::warn!(id = %redaction.id, "redaction refers to a missing page");
            0.0
        }
    };
    let (min, max) = bounds.char_count_range(gap_width_mm);
    GapProfile {
        gap_width_mm,
        gap_width_norm,
        estimated_char_count_min: min,
        estimated_char_count_max: max,
    }
}

/// Builds the profile and measures every redaction.
///
/// Fails when no redactions were located at all.
pub fn profile_document(
    pages: &[Page],
    redactions: &BTreeMap<u32, Vec<Redaction>>,
    params: &TypographyParams,
) -> Result<(TypographicProfile, BTreeMap<RedactionId, GapProfile>)> {
    let all: Vec<&Redaction> = redactions.values().flatten().collect();
    if all.is_empty() {
        return Err(UnredactError::NoRedactions);
    }

    let profile = build_profile(pages, params);
    let bounds = CharWidthBounds::from_profile(&profile, params);
    tracing::debug!(
        font = ?profile.dominant_font,
        size = ?profile.dominant_font_size_pt,
        tracking_mm = profile.tracking_mm,
        min_char_mm = bounds.min_mm,
        max_char_mm = bounds.max_mm,
        "typographic profile"
    );

    let gaps: Vec<(RedactionId, GapProfile)> = all
        .par_iter()
        .map(|r| {
            let page = pages.iter().find(|p| p.page_number == r.id.page);
            (r.id, measure_gap(r, page, &bounds))
        })
        .collect();
    Ok((profile, gaps.into_iter().collect()))
}

/// Stage entry point: requires the locator's redactions.
pub fn run(
    state: &DocumentState,
    params: &TypographyParams,
) -> Result<(TypographicProfile, BTreeMap<RedactionId, GapProfile>)> {
    let redactions = state.redactions.as_ref().ok_or(UnredactError::MissingUpstream {
        stage: "profile-typography",
        field: "redactions",
    })?;
    profile_document(&state.pages, redactions, params)
}
