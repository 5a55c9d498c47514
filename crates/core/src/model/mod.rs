//! Data model shared by all pipeline stages.
//!
//! - `page` - ingested pages, spans and opaque rectangles
//! - `layout` - blocks and redactions
//! - `typography` - document profile and per-redaction gaps
//! - `inference` - categories, predictions and candidates
//! - `report` - consolidated output
//! - `state` - the document state threaded through the stages

pub mod geometry;
pub mod ids;
pub mod inference;
pub mod layout;
pub mod page;
pub mod report;
pub mod state;
pub mod typography;

pub use geometry::NormBox;
pub use ids::{BlockId, RedactionId};
pub use inference::{Candidate, Category, Prediction};
pub use layout::{Block, Redaction};
pub use page::{DocumentMeta, OpaqueRect, Page, TextLayerStatus, TextSpan};
pub use report::{PipelineOutput, RedactionResult};
pub use state::DocumentState;
pub use typography::{GapProfile, TypographicProfile};
