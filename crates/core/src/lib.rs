//! unredact - geometric and typographic inference of redacted PDF content.
//!
//! Positioned text spans and filled rectangles go in; for every black box
//! the pipeline reports its surrounding context, physical width, likely
//! content type and width-matched candidate strings.

pub mod error;
pub mod font;
pub mod ingest;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod sources;
pub mod stages;
pub mod units;
pub mod utils;

pub use error::{Result, UnredactError};
pub use model::DocumentState;
pub use params::PipelineParams;
pub use pipeline::{Pipeline, RunOptions, RunReport, Stage, StageHalt};
