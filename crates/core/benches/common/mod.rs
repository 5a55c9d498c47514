#![allow(dead_code)]

use std::env;
use std::time::Duration;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, Criterion, Throughput};
use unredact_core::model::{DocumentMeta, DocumentState, NormBox, OpaqueRect, Page, TextSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTier {
    Quick,
    Full,
}

impl BenchTier {
    pub fn from_env() -> Self {
        match env::var("UNREDACT_BENCH_TIER").as_deref() {
            Ok("full") => Self::Full,
            _ => Self::Quick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupWeight {
    Light,
    Heavy,
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub tier: BenchTier,
    pub seed: u64,
    pub sample_size_light: usize,
    pub sample_size_heavy: usize,
    pub measurement_light: Duration,
    pub measurement_heavy: Duration,
}

pub fn bench_config() -> BenchConfig {
    let tier = BenchTier::from_env();
    let seed = env::var("UNREDACT_BENCH_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE);
    let (sample_size_light, sample_size_heavy, measurement_light, measurement_heavy) = match tier {
        BenchTier::Quick => (20, 10, Duration::from_secs(3), Duration::from_secs(5)),
        BenchTier::Full => (40, 20, Duration::from_secs(5), Duration::from_secs(10)),
    };
    BenchConfig {
        tier,
        seed,
        sample_size_light,
        sample_size_heavy,
        measurement_light,
        measurement_heavy,
    }
}

pub fn configure_group<M: Measurement>(
    group: &mut BenchmarkGroup<'_, M>,
    cfg: &BenchConfig,
    weight: GroupWeight,
) {
    match weight {
        GroupWeight::Light => {
            group.sample_size(cfg.sample_size_light);
            group.measurement_time(cfg.measurement_light);
        }
        GroupWeight::Heavy => {
            group.sample_size(cfg.sample_size_heavy);
            group.measurement_time(cfg.measurement_heavy);
        }
    }
}

pub fn bench_criterion() -> Criterion {
    Criterion::default().configure_from_args()
}

pub fn pages_throughput(pages: usize) -> Throughput {
    Throughput::Elements(pages as u64)
}

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
}

const LABELS: &[&str] = &["Name:", "Phone:", "DOB:", "Account no.", "Address:", "Paid $"];
const FILLER: &[&str] = &["the", "report", "was", "filed", "by", "agency", "on", "record"];

/// A synthetic A4 document: `lines` lines per page, every third line with a
/// labelled black box.
pub fn synthetic_document(seed: u64, pages: usize, lines: usize) -> DocumentState {
    let mut rng = XorShift64::new(seed);
    let line_h = 0.013;
    let pages: Vec<Page> = (0..pages as u32)
        .map(|page_number| {
            let mut spans = Vec::new();
            let mut rects = Vec::new();
            for line in 0..lines {
                let y = 0.05 + line as f64 * 0.9 / lines as f64;
                let mut x = 0.08 + rng.gen_f64(0.0, 0.02);
                let label_line = line % 3 == 0;
                let pick = (rng.next_u64() % LABELS.len() as u64) as usize;
                if label_line {
                    let w = 0.02 * LABELS[pick].len() as f64 * 0.6;
                    spans.push(TextSpan::new(LABELS[pick], NormBox::new(x, y, w, line_h), "Helvetica", 11.0));
                    x += w + 0.005;
                    let rw = rng.gen_f64(0.06, 0.25);
                    rects.push(OpaqueRect {
                        bbox: NormBox::new(x, y, rw, line_h),
                        fill: Some([0.0, 0.0, 0.0]),
                    });
                    x += rw + 0.005;
                }
                while x < 0.85 {
                    let word = FILLER[(rng.next_u64() % FILLER.len() as u64) as usize];
                    let w = 0.012 * word.len() as f64;
                    spans.push(TextSpan::new(word, NormBox::new(x, y, w, line_h), "Helvetica", 11.0));
                    x += w + 0.006;
                }
            }
            Page::new(page_number, 210.0, 297.0)
                .with_spans(spans)
                .with_rects(rects)
        })
        .collect();

    let meta = DocumentMeta {
        filename: "synthetic.pdf".to_string(),
        page_count: pages.len(),
        file_size_bytes: 0,
        pdf_version: None,
        producer: None,
        creator: None,
    };
    DocumentState::new(meta, pages)
}
