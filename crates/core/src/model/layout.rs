use serde::{Deserialize, Serialize};

use super::geometry::NormBox;
use super::ids::{BlockId, RedactionId};

/// A logical cluster of spans on one page.
///
/// `span_indices` point into [`Page::spans`](super::Page::spans) and are
/// listed in reading order; `bbox` is the union of those spans' boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub bbox: NormBox,
    pub text: String,
    pub span_indices: Vec<usize>,
}

/// A detected black box together with the text around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redaction {
    pub id: RedactionId,
    pub bbox: NormBox,
    /// The block the box falls within; context never leaves this block.
    pub block_id: BlockId,
    #[serde(default)]
    pub pre_context: String,
    #[serde(default)]
    pub post_context: String,
}
