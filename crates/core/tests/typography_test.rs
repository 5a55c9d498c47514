//! Tests for the typographic profile and gap measurement.

mod common;

use common::{XorShift64, memo, random_page, state_with};
use unredact_core::UnredactError;
use unredact_core::model::{DocumentState, TypographicProfile};
use unredact_core::params::{LocateParams, SegmentParams, TypographyParams};
use unredact_core::stages::redaction::locate_pages;
use unredact_core::stages::segment::segment_pages;
use unredact_core::stages::typography::{self, CharWidthBounds};

fn located(mut state: DocumentState) -> DocumentState {
    let blocks = segment_pages(&state.pages, &SegmentParams::default());
    state.redactions = Some(locate_pages(&state.pages, &blocks, &LocateParams::default()));
    state.blocks = Some(blocks);
    state
}

// ============================================================================
// Profile
// ============================================================================

#[test]
fn test_memo_profile() {
    let state = located(memo());
    let (profile, gaps) = typography::run(&state, &TypographyParams::default()).unwrap();
    assert_eq!(profile.dominant_font.as_deref(), Some("Helvetica"));
    assert_eq!(profile.dominant_font_size_pt, Some(11.0));
    assert!(profile.mean_char_width_mm.unwrap() > 0.0);
    assert_eq!(profile.size_histogram.len(), 1);
    assert_eq!(gaps.len(), 3);
}

#[test]
fn test_profiling_is_idempotent() {
    let state = located(memo());
    let params = TypographyParams::default();
    let (p1, g1) = typography::run(&state, &params).unwrap();
    let (p2, g2) = typography::run(&state, &params).unwrap();
    assert_eq!(p1.tracking_mm.to_bits(), p2.tracking_mm.to_bits());
    assert_eq!(
        p1.mean_char_width_mm.map(f64::to_bits),
        p2.mean_char_width_mm.map(f64::to_bits)
    );
    assert_eq!(p1, p2);
    for (id, gap) in &g1 {
        let other = &g2[id];
        assert_eq!(gap.gap_width_mm.to_bits(), other.gap_width_mm.to_bits());
        assert_eq!(gap.estimated_char_count_min, other.estimated_char_count_min);
        assert_eq!(gap.estimated_char_count_max, other.estimated_char_count_max);
    }
}

// ============================================================================
// Gap measurement
// ============================================================================

#[test]
fn test_gap_width_in_mm() {
    let state = located(memo());
    let (_, gaps) = typography::run(&state, &TypographyParams::default()).unwrap();
    let name_gap = gaps.values().next().unwrap();
    // 0.20 of a 210mm page.
    assert!((name_gap.gap_width_mm - 42.0).abs() < 1e-9);
    assert!((name_gap.gap_width_norm - 0.20).abs() < 1e-12);
}

#[test]
fn test_char_count_range_is_ordered_on_random_documents() {
    let mut rng = XorShift64::new(31337);
    for doc in 0..10 {
        let pages = (0..3).map(|n| random_page(&mut rng, n, 20)).collect();
        let state = located(state_with(pages));
        if state.redaction_count() == 0 {
            continue;
        }
        let (_, gaps) = typography::run(&state, &TypographyParams::default()).unwrap();
        assert_eq!(gaps.len(), state.redaction_count(), "document {doc}");
        for gap in gaps.values() {
            assert!(gap.gap_width_mm >= 0.0);
            assert!(
                gap.estimated_char_count_min <= gap.estimated_char_count_max,
                "document {doc}: {gap:?}"
            );
        }
    }
}

#[test]
fn test_bounds_follow_font_size() {
    let params = TypographyParams::default();
    let profile = |size: f64| TypographicProfile {
        dominant_font: Some("Helvetica".to_string()),
        dominant_font_size_pt: Some(size),
        mean_char_width_mm: None,
        tracking_mm: 0.0,
        size_histogram: vec![(size, 100)],
    };
    let base = CharWidthBounds::from_profile(&profile(11.0), &params);
    let big = CharWidthBounds::from_profile(&profile(22.0), &params);
    assert!(big.max_mm > base.max_mm);
    assert!(big.min_mm > base.min_mm);
    assert!(big.char_count_range(42.0).1 <= base.char_count_range(42.0).1);
}

// ============================================================================
// Preconditions
// ============================================================================

#[test]
fn test_no_redactions_is_fatal() {
    let state = located(state_with(vec![common::a4_page(
        0,
        vec![common::span("Nothing hidden here", 0.1, 0.5, 0.1)],
        vec![],
    )]));
    let err = typography::run(&state, &TypographyParams::default()).unwrap_err();
    assert!(matches!(err, UnredactError::NoRedactions));
    assert!(err.is_precondition());
}

#[test]
fn test_requires_redactions() {
    let err = typography::run(&memo(), &TypographyParams::default()).unwrap_err();
    assert!(matches!(
        err,
        UnredactError::MissingUpstream { field: "redactions", .. }
    ));
}
