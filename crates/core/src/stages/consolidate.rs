//! Consolidation of per-stage outputs into the final report.
//!
//! Works on any partially completed state: a missing prediction becomes
//! `unknown`, a missing gap a zero width, missing candidates an empty list.

use crate::model::{DocumentState, PipelineOutput, Prediction, RedactionResult};

pub fn consolidate(state: &DocumentState, pipeline_version: &str) -> PipelineOutput {
    let results = state
        .iter_redactions()
        .map(|r| {
            let prediction = state
                .predictions
                .as_ref()
                .and_then(|p| p.get(&r.id))
                .copied()
                .unwrap_or_else(Prediction::unknown);
            let gap = state.gaps.as_ref().and_then(|g| g.get(&r.id));
            let top_candidates = state
                .candidates
                .as_ref()
                .and_then(|c| c.get(&r.id))
                .cloned()
                .unwrap_or_default();
            RedactionResult {
                redaction_id: r.id,
                page_number: r.id.page,
                bbox: r.bbox,
                pre_context: r.pre_context.clone(),
                post_context: r.post_context.clone(),
                predicted_type: prediction.category,
                confidence: prediction.confidence,
                gap_width_mm: gap.map_or(0.0, |g| g.gap_width_mm),
                char_count_range: gap.map(|g| (g.estimated_char_count_min, g.estimated_char_count_max)),
                top_candidates,
            }
        })
        .collect();

    PipelineOutput {
        document: state.meta.clone(),
        results,
        pipeline_version: pipeline_version.to_string(),
    }
}
