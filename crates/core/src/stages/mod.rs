//! The pipeline stages, in execution order.
//!
//! Every stage reads fields of [`DocumentState`](crate::model::DocumentState)
//! written by earlier stages and returns its own output; the orchestrator
//! stores it.

pub mod segment;
pub mod redaction;
pub mod typography;
pub mod classify;
pub mod candidates;
pub mod consolidate;

pub use classify::{Classifier, ClassifierInput, RuleClassifier};
pub use segment::{segment_page, segment_pages};
pub use redaction::{locate_page, locate_pages};
pub use typography::{CharWidthBounds, build_profile, profile_document};
pub use candidates::{WidthModel, match_candidates};
pub use consolidate::consolidate;
