//! Font metrics used to turn strings into physical widths.

pub mod metrics;

pub use metrics::{FONT_METRICS, FontMetrics, StandardFace};
