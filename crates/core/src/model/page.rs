use serde::{Deserialize, Serialize};

use super::geometry::NormBox;

/// Quality of the embedded text layer of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLayerStatus {
    Present,
    Absent,
    Partial,
}

/// One positioned run of text as supplied by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub bbox: NormBox,
    /// Font name as found in the document (may carry a subset prefix).
    pub font: String,
    /// Font size in points.
    pub size_pt: f64,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, bbox: NormBox, font: impl Into<String>, size_pt: f64) -> Self {
        Self {
            text: text.into(),
            bbox,
            font: font.into(),
            size_pt,
        }
    }

    /// Number of characters (not bytes) in the span text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A filled rectangle drawn on the page, i.e. a redaction candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpaqueRect {
    pub bbox: NormBox,
    /// Fill colour as RGB in `[0, 1]`, when the producer reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<[f64; 3]>,
}

impl OpaqueRect {
    pub const fn new(bbox: NormBox) -> Self {
        Self { bbox, fill: None }
    }

    /// Relative luminance of the fill colour (Rec. 709 weights).
    pub fn luminance(&self) -> Option<f64> {
        self.fill
            .map(|[r, g, b]| 0.2126 * r + 0.7152 * g + 0.0722 * b)
    }
}

/// Per-page triage data. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-indexed page number.
    pub page_number: u32,
    pub width_mm: f64,
    pub height_mm: f64,
    /// `width_mm / height_mm`.
    pub aspect_ratio: f64,
    pub text_layer: TextLayerStatus,
    #[serde(default)]
    pub spans: Vec<TextSpan>,
    #[serde(default)]
    pub rects: Vec<OpaqueRect>,
}

impl Page {
    pub fn new(page_number: u32, width_mm: f64, height_mm: f64) -> Self {
        Self {
            page_number,
            width_mm,
            height_mm,
            aspect_ratio: width_mm / height_mm,
            text_layer: TextLayerStatus::Absent,
            spans: Vec::new(),
            rects: Vec::new(),
        }
    }

    pub fn with_spans(mut self, spans: Vec<TextSpan>) -> Self {
        self.text_layer = TextLayerStatus::classify(&spans);
        self.spans = spans;
        self
    }

    pub fn with_rects(mut self, rects: Vec<OpaqueRect>) -> Self {
        self.rects = rects;
        self
    }
}

impl TextLayerStatus {
    /// Derives the text-layer status from the spans found on a page.
    pub fn classify(spans: &[TextSpan]) -> Self {
        if spans.is_empty() {
            Self::Absent
        } else if spans.iter().any(|s| s.text.trim().is_empty()) {
            Self::Partial
        } else {
            Self::Present
        }
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub filename: String,
    pub page_count: usize,
    pub file_size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}
