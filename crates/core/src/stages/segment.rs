//! Span-to-block clustering.
//!
//! Spans are sorted top-to-bottom then left-to-right and swept once. A span
//! joins every open cluster holding a member it is aligned with; clusters it
//! joins are merged, so the result is the single-linkage partition of the
//! page's well-formed spans. Within a block, spans read line by line.

use std::collections::BTreeMap;

use itertools::Itertools;
use rayon::prelude::*;

use crate::model::{Block, BlockId, DocumentState, NormBox, Page, TextSpan};
use crate::params::SegmentParams;
use crate::utils::{HasBBox, Rect, cmp_f64, get_bound};

/// Normalized thresholds for one page.
#[derive(Debug, Clone, Copy)]
struct Thresholds {
    line_overlap: f64,
    min_voverlap: f64,
    max_hgap: f64,
}

impl Thresholds {
    fn for_page(page: &Page, params: &SegmentParams) -> Self {
        let per_mm = |extent_mm: f64| if extent_mm > 0.0 { 1.0 / extent_mm } else { 0.0 };
        Self {
            line_overlap: params.line_overlap,
            min_voverlap: params.min_vertical_overlap_mm * per_mm(page.height_mm),
            max_hgap: params.max_horizontal_gap_mm * per_mm(page.width_mm),
        }
    }

    /// Checks whether two spans belong to the same block:
    ///
    ///   +------+ - - -
    ///   | obj0 | - - +------+   -
    ///   |      |     | obj1 |   | (line_overlap)
    ///   +------+ - - |      |   -
    ///          - - - +------+
    ///          |<--->|
    ///        (max_hgap)
    fn aligned(&self, a: &NormBox, b: &NormBox) -> bool {
        self.same_line(a, b) && a.hdistance(b) < self.max_hgap
    }

    /// Vertical half of [`Self::aligned`].
    fn same_line(&self, a: &NormBox, b: &NormBox) -> bool {
        let needed = self
            .min_voverlap
            .max(a.height().min(b.height()) * self.line_overlap);
        a.voverlap(b) > needed
    }
}

#[derive(Debug)]
struct Cluster {
    members: Vec<usize>,
    bound: Rect,
    open: bool,
}

/// Joins span texts the way block text and redaction context are built.
pub(crate) fn join_span_text<'a>(spans: impl IntoIterator<Item = &'a TextSpan>) -> String {
    spans
        .into_iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .join(" ")
}

/// Clusters one page's spans into blocks.
///
/// Spans with a malformed box are skipped with a warning; every other span
/// index appears in exactly one block.
pub fn segment_page(page: &Page, params: &SegmentParams) -> Vec<Block> {
    let thresholds = Thresholds::for_page(page, params);

    let mut order: Vec<usize> = Vec::with_capacity(page.spans.len());
    for (i, span) in page.spans.iter().enumerate() {
        if span.bbox.is_well_formed() {
            order.push(i);
        } else {
            tracing::warn!(
                page = page.page_number,
                span = i,
                bbox = ?span.bbox,
                "skipping span with malformed bounding box"
            );
        }
    }
    order.sort_by(|&a, &b| {
        let (a, b) = (&page.spans[a].bbox, &page.spans[b].bbox);
        cmp_f64(a.y0(), b.y0()).then_with(|| cmp_f64(a.x0(), b.x0()))
    });

    let mut clusters: Vec<Cluster> = Vec::new();
    for &idx in &order {
        let bbox = &page.spans[idx].bbox;

        // Sorted by top edge: a cluster ending above this span can never
        // overlap a later one.
        for cluster in clusters.iter_mut().filter(|c| c.open) {
            if cluster.bound.y1() < bbox.y0() {
                cluster.open = false;
            }
        }

        let hits: Vec<usize> = clusters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.open)
            .filter(|(_, c)| {
                c.members
                    .iter()
                    .any(|&m| thresholds.aligned(&page.spans[m].bbox, bbox))
            })
            .map(|(ci, _)| ci)
            .collect();

        match hits.split_first() {
            None => clusters.push(Cluster {
                members: vec![idx],
                bound: bbox.bbox(),
                open: true,
            }),
            Some((&target, rest)) => {
                for &ci in rest {
                    let absorbed = std::mem::take(&mut clusters[ci].members);
                    let bound = clusters[ci].bound;
                    clusters[ci].open = false;
                    let t = &mut clusters[target];
                    t.members.extend(absorbed);
                    t.bound = get_bound([&t.bound, &bound]).unwrap_or(t.bound);
                }
                let t = &mut clusters[target];
                t.members.push(idx);
                t.bound = get_bound([&t.bound, &bbox.bbox()]).unwrap_or(t.bound);
            }
        }
    }

    clusters
        .into_iter()
        .filter(|c| !c.members.is_empty())
        .enumerate()
        .map(|(n, cluster)| {
            let span_indices = reading_order(page, &thresholds, cluster.members);
            let bbox = NormBox::union_all(span_indices.iter().map(|&i| &page.spans[i].bbox))
                .unwrap_or_else(|| NormBox::from_rect(cluster.bound));
            let text = join_span_text(span_indices.iter().map(|&i| &page.spans[i]));
            Block {
                id: BlockId::new(page.page_number, n as u32),
                bbox,
                text,
                span_indices,
            }
        })
        .collect()
}

/// Orders a block's members line by line, top to bottom, and left to right
/// within a line.
///
/// Each line is matched against its shortest member so far, so a tall span
/// spanning two lines does not pull the second line into the first.
fn reading_order(page: &Page, thresholds: &Thresholds, mut members: Vec<usize>) -> Vec<usize> {
    let bbox = |i: usize| &page.spans[i].bbox;
    members.sort_by(|&a, &b| {
        let (a, b) = (bbox(a), bbox(b));
        cmp_f64(a.y0(), b.y0()).then_with(|| cmp_f64(a.x0(), b.x0()))
    });

    // (reference span, members)
    let mut lines: Vec<(usize, Vec<usize>)> = Vec::new();
    for idx in members {
        let line = lines
            .iter()
            .enumerate()
            .filter(|(_, (reference, _))| thresholds.same_line(bbox(*reference), bbox(idx)))
            .max_by(|(la, (a, _)), (lb, (b, _))| {
                cmp_f64(bbox(*a).voverlap(bbox(idx)), bbox(*b).voverlap(bbox(idx))).then(lb.cmp(la))
            })
            .map(|(li, _)| li);
        match line {
            Some(li) => {
                let (reference, spans) = &mut lines[li];
                if bbox(idx).height() < bbox(*reference).height() {
                    *reference = idx;
                }
                spans.push(idx);
            }
            None => lines.push((idx, vec![idx])),
        }
    }

    lines
        .into_iter()
        .flat_map(|(_, mut spans)| {
            spans.sort_by(|&a, &b| cmp_f64(bbox(a).x0(), bbox(b).x0()));
            spans
        })
        .collect()
}

/// Segments every page, keyed by page number.
pub fn segment_pages(pages: &[Page], params: &SegmentParams) -> BTreeMap<u32, Vec<Block>> {
    let per_page: Vec<(u32, Vec<Block>)> = pages
        .par_iter()
        .map(|page| {
            let blocks = segment_page(page, params);
            tracing::debug!(
                page = page.page_number,
                spans = page.spans.len(),
                blocks = blocks.len(),
                "segmented page"
            );
            (page.page_number, blocks)
        })
        .collect();
    per_page.into_iter().collect()
}

/// Stage entry point. A document without pages yields an empty map.
pub fn run(state: &DocumentState, params: &SegmentParams) -> BTreeMap<u32, Vec<Block>> {
    segment_pages(&state.pages, params)
}
