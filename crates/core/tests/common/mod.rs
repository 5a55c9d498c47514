//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use unredact_core::model::{DocumentMeta, DocumentState, NormBox, OpaqueRect, Page, TextSpan};

/// A4 portrait, in mm.
pub const A4: (f64, f64) = (210.0, 297.0);

/// Normalized height of one line of 11pt text on A4.
pub const LINE_H: f64 = 0.013;

#[derive(Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    pub fn gen_f64(&mut self, min: f64, max: f64) -> f64 {
        let n = self.next_u64() as f64 / u64::MAX as f64;
        min + (max - min) * n
    }

    pub fn gen_range(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// A Helvetica 11pt span spanning `x0..x1` on the line starting at `y`.
pub fn span(text: &str, x0: f64, x1: f64, y: f64) -> TextSpan {
    TextSpan::new(text, NormBox::new(x0, y, x1 - x0, LINE_H), "Helvetica", 11.0)
}

/// A black box spanning `x0..x1` on the line starting at `y`.
pub fn black_box(x0: f64, x1: f64, y: f64) -> OpaqueRect {
    OpaqueRect {
        bbox: NormBox::new(x0, y, x1 - x0, LINE_H),
        fill: Some([0.0, 0.0, 0.0]),
    }
}

pub fn a4_page(page_number: u32, spans: Vec<TextSpan>, rects: Vec<OpaqueRect>) -> Page {
    Page::new(page_number, A4.0, A4.1)
        .with_spans(spans)
        .with_rects(rects)
}

pub fn state_with(pages: Vec<Page>) -> DocumentState {
    let meta = DocumentMeta {
        filename: "memo.pdf".to_string(),
        page_count: pages.len(),
        file_size_bytes: 4096,
        pdf_version: Some("1.4".to_string()),
        producer: None,
        creator: None,
    };
    DocumentState::new(meta, pages)
}

/// Two-page memo: a name and a phone number redacted on page 0, a date on
/// page 1, plus a footer block that must never leak into context.
pub fn memo() -> DocumentState {
    let page0 = a4_page(
        0,
        vec![
            span("Name:", 0.10, 0.18, 0.20),
            span("is a resident", 0.40, 0.55, 0.20),
            span("Phone:", 0.10, 0.19, 0.30),
            span("during office hours.", 0.42, 0.70, 0.30),
            span("Page footer CONFIDENTIAL", 0.10, 0.45, 0.90),
        ],
        vec![black_box(0.19, 0.39, 0.20), black_box(0.20, 0.41, 0.30)],
    );
    let page1 = a4_page(
        1,
        vec![
            span("DOB:", 0.10, 0.16, 0.15),
            span("as recorded in the file", 0.32, 0.62, 0.15),
            span("Signed and witnessed by the clerk", 0.10, 0.60, 0.25),
        ],
        vec![black_box(0.17, 0.31, 0.15)],
    );
    state_with(vec![page0, page1])
}

/// A page of randomly placed lines of text with random black boxes.
pub fn random_page(rng: &mut XorShift64, page_number: u32, lines: usize) -> Page {
    const WORDS: &[&str] = &["the", "witness", "Name:", "account", "Phone:", "on", "report", "and"];
    let mut spans = Vec::new();
    let mut rects = Vec::new();
    for line in 0..lines {
        let y = 0.05 + line as f64 * 0.02 + rng.gen_f64(0.0, 0.004);
        let mut x = 0.05 + rng.gen_f64(0.0, 0.05);
        while x < 0.85 {
            let w = rng.gen_f64(0.03, 0.12);
            if rng.gen_range(5) == 0 {
                rects.push(black_box(x, x + w, y));
            } else {
                let word = WORDS[rng.gen_range(WORDS.len())];
                spans.push(span(word, x, x + w, y));
            }
            x += w + rng.gen_f64(0.005, 0.08);
        }
    }
    a4_page(page_number, spans, rects)
}
