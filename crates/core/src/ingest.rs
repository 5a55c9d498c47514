//! Loading of extracted page layouts.
//!
//! PDF parsing happens upstream; this module reads its JSON dump (pages
//! with spans and filled rectangles) and builds the initial
//! [`DocumentState`].
//!
//! ```json
//! {
//!   "producer": "scanner",
//!   "pages": [{
//!     "units": "points",
//!     "width": 595.0, "height": 842.0,
//!     "spans": [{"text": "Name:", "bbox": {"x": 72, "y": 100, "w": 40, "h": 11},
//!                "font": "Helvetica", "size_pt": 11}],
//!     "rects": [{"bbox": {"x": 115, "y": 100, "w": 120, "h": 11}, "fill": [0, 0, 0]}]
//!   }]
//! }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnredactError};
use crate::model::{
    DocumentMeta, DocumentState, NormBox, OpaqueRect, Page, TextLayerStatus, TextSpan,
};
use crate::units::{normalise, pts_to_mm};

/// Coordinate system of one input page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    /// `width`/`height` in mm, boxes already in `[0, 1]`.
    #[default]
    Normalized,
    /// `width`/`height` and boxes in PDF points, origin top-left.
    Points,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxInput {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanInput {
    pub text: String,
    pub bbox: BoxInput,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(alias = "size")]
    pub size_pt: f64,
}

fn default_font() -> String {
    "Helvetica".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectInput {
    pub bbox: BoxInput,
    #[serde(default)]
    pub fill: Option<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    /// Defaults to the page's position in the input.
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub units: Units,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub text_layer: Option<TextLayerStatus>,
    #[serde(default)]
    pub spans: Vec<SpanInput>,
    #[serde(default)]
    pub rects: Vec<RectInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    #[serde(default)]
    pub pdf_version: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub pages: Vec<PageInput>,
}

/// Page extents in the input's units, used to normalize boxes.
struct Frame {
    width: f64,
    height: f64,
    units: Units,
}

impl Frame {
    fn normalise(&self, b: &BoxInput) -> Result<NormBox> {
        match self.units {
            Units::Normalized => Ok(NormBox::new(b.x, b.y, b.w, b.h)),
            // Corners are clipped to the page, so a box running off an edge
            // keeps only its visible part.
            Units::Points => Ok(NormBox::from_rect((
                normalise(b.x, self.width)?,
                normalise(b.y, self.height)?,
                normalise(b.x + b.w, self.width)?,
                normalise(b.y + b.h, self.height)?,
            ))),
        }
    }
}

fn build_page(index: usize, input: PageInput) -> Result<Page> {
    let page_number = input.page_number.unwrap_or(index as u32);
    if !(input.width.is_finite() && input.width > 0.0 && input.height.is_finite() && input.height > 0.0) {
        return Err(UnredactError::InvalidInput(format!(
            "page {page_number}: size must be positive, got {} x {}",
            input.width, input.height
        )));
    }
    let (width_mm, height_mm) = match input.units {
        Units::Normalized => (input.width, input.height),
        Units::Points => (pts_to_mm(input.width), pts_to_mm(input.height)),
    };
    let frame = Frame {
        width: input.width,
        height: input.height,
        units: input.units,
    };

    let spans = input
        .spans
        .into_iter()
        .map(|s| Ok(TextSpan::new(s.text, frame.normalise(&s.bbox)?, s.font, s.size_pt)))
        .collect::<Result<Vec<_>>>()?;
    let rects = input
        .rects
        .into_iter()
        .map(|r| {
            Ok(OpaqueRect {
                bbox: frame.normalise(&r.bbox)?,
                fill: r.fill,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut page = Page::new(page_number, width_mm, height_mm)
        .with_spans(spans)
        .with_rects(rects);
    if let Some(status) = input.text_layer {
        page.text_layer = status;
    }
    Ok(page)
}

/// Builds the initial state from a parsed layout dump.
pub fn from_input(input: DocumentInput, filename: &str, file_size_bytes: u64) -> Result<DocumentState> {
    let mut seen = BTreeSet::new();
    let mut pages = Vec::with_capacity(input.pages.len());
    for (index, page_input) in input.pages.into_iter().enumerate() {
        let page = build_page(index, page_input)?;
        if !seen.insert(page.page_number) {
            return Err(UnredactError::InvalidInput(format!(
                "duplicate page number {}",
                page.page_number
            )));
        }
        pages.push(page);
    }
    pages.sort_by_key(|p| p.page_number);

    let meta = DocumentMeta {
        filename: filename.to_string(),
        page_count: pages.len(),
        file_size_bytes,
        pdf_version: input.pdf_version,
        producer: input.producer,
        creator: input.creator,
    };
    tracing::info!(file = filename, pages = meta.page_count, "ingested document");
    Ok(DocumentState::new(meta, pages))
}

/// Reads a layout dump from `path`.
pub fn load_document(path: impl AsRef<Path>) -> Result<DocumentState> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let input: DocumentInput = serde_json::from_slice(&bytes)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    from_input(input, &filename, bytes.len() as u64)
}
