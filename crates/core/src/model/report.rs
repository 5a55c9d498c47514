use serde::{Deserialize, Serialize};

use super::geometry::NormBox;
use super::ids::RedactionId;
use super::inference::{Candidate, Category};
use super::page::DocumentMeta;

/// Consolidated, human-reviewable result for one redaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionResult {
    pub redaction_id: RedactionId,
    pub page_number: u32,
    pub bbox: NormBox,
    pub pre_context: String,
    pub post_context: String,
    pub predicted_type: Category,
    pub confidence: f64,
    pub gap_width_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_count_range: Option<(u32, u32)>,
    #[serde(default)]
    pub top_candidates: Vec<Candidate>,
}

/// Final output of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub document: Option<DocumentMeta>,
    #[serde(default)]
    pub results: Vec<RedactionResult>,
    pub pipeline_version: String,
}
