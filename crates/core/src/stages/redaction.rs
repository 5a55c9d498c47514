//! Redaction detection and context extraction.
//!
//! An opaque rectangle becomes a redaction when enough of its area falls
//! inside one block. Context comes only from that block's spans: those
//! entirely left of the rectangle form the pre-context, those entirely
//! right of it the post-context.

use std::collections::BTreeMap;

use rayon::prelude::*;

use super::segment::join_span_text;
use crate::error::{Result, UnredactError};
use crate::model::{Block, DocumentState, OpaqueRect, Page, Redaction, RedactionId};
use crate::params::LocateParams;
use crate::utils::{EPSILON, HasBBox, cmp_f64};

/// Drops malformed, light and duplicate rectangles, then sorts the rest
/// top-to-bottom, left-to-right.
fn filter_rects<'a>(page: &'a Page, params: &LocateParams) -> Vec<&'a OpaqueRect> {
    let mut kept: Vec<&OpaqueRect> = Vec::with_capacity(page.rects.len());
    for (i, rect) in page.rects.iter().enumerate() {
        if !rect.bbox.is_well_formed() {
            tracing::warn!(
                page = page.page_number,
                rect = i,
                bbox = ?rect.bbox,
                "skipping rectangle with malformed bounding box"
            );
            continue;
        }
        if let Some(luminance) = rect.luminance()
            && luminance > params.max_fill_luminance
        {
            tracing::debug!(page = page.page_number, rect = i, luminance, "rectangle fill too light");
            continue;
        }
        if kept
            .iter()
            .any(|k| k.bbox.iou(&rect.bbox) >= params.dedupe_iou)
        {
            tracing::debug!(page = page.page_number, rect = i, "duplicate rectangle");
            continue;
        }
        kept.push(rect);
    }
    kept.sort_by(|a, b| {
        cmp_f64(a.bbox.y0(), b.bbox.y0()).then_with(|| cmp_f64(a.bbox.x0(), b.bbox.x0()))
    });
    kept
}

/// Picks the block holding the largest share of `rect`.
///
/// Ties go to the smaller block, then to the lower block id.
fn containing_block<'b>(rect: &OpaqueRect, blocks: &'b [Block], min_overlap: f64) -> Option<&'b Block> {
    let mut best: Option<(&Block, f64)> = None;
    for block in blocks {
        let share = rect.bbox.intersection_over_self(&block.bbox);
        if share <= 0.0 || share < min_overlap {
            continue;
        }
        let better = match best {
            None => true,
            Some((current, current_share)) => {
                if share > current_share + EPSILON {
                    true
                } else if share < current_share - EPSILON {
                    false
                } else {
                    let (area, current_area) = (block.bbox.area(), current.bbox.area());
                    if area < current_area - EPSILON {
                        true
                    } else if area > current_area + EPSILON {
                        false
                    } else {
                        block.id < current.id
                    }
                }
            }
        };
        if better {
            best = Some((block, share));
        }
    }
    best.map(|(block, _)| block)
}

/// Keeps the last `max` characters of `s`.
fn tail_chars(s: String, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        s
    } else {
        s.chars().skip(n - max).collect::<String>().trim_start().to_string()
    }
}

/// Keeps the first `max` characters of `s`.
fn head_chars(s: String, max: usize) -> String {
    if s.chars().count() <= max {
        s
    } else {
        s.chars().take(max).collect::<String>().trim_end().to_string()
    }
}

/// Finds the redactions on one page.
pub fn locate_page(page: &Page, blocks: &[Block], params: &LocateParams) -> Vec<Redaction> {
    let mut redactions = Vec::new();
    for rect in filter_rects(page, params) {
        let Some(block) = containing_block(rect, blocks, params.min_overlap) else {
            tracing::debug!(
                page = page.page_number,
                bbox = ?rect.bbox,
                "rectangle outside every block, not a redaction"
            );
            continue;
        };

        let members = block
            .span_indices
            .iter()
            .filter_map(|&i| page.spans.get(i));
        let (mut pre, mut post) = (Vec::new(), Vec::new());
        for span in members {
            if span.bbox.x1() <= rect.bbox.x0() + EPSILON {
                pre.push(span);
            } else if span.bbox.x0() >= rect.bbox.x1() - EPSILON {
                post.push(span);
            }
        }

        let id = RedactionId::new(page.page_number, redactions.len() as u32);
        tracing::trace!(%id, block = %block.id, "located redaction");
        redactions.push(Redaction {
            id,
            bbox: rect.bbox,
            block_id: block.id,
            pre_context: tail_chars(join_span_text(pre), params.max_context_chars),
            post_context: head_chars(join_span_text(post), params.max_context_chars),
        });
    }
    redactions
}

/// Locates redactions on every page, keyed by page number.
pub fn locate_pages(
    pages: &[Page],
    blocks: &BTreeMap<u32, Vec<Block>>,
    params: &LocateParams,
) -> BTreeMap<u32, Vec<Redaction>> {
    let per_page: Vec<(u32, Vec<Redaction>)> = pages
        .par_iter()
        .map(|page| {
            let page_blocks = blocks
                .get(&page.page_number)
                .map(Vec::as_slice)
                .unwrap_or_default();
            (page.page_number, locate_page(page, page_blocks, params))
        })
        .collect();
    per_page.into_iter().collect()
}

/// Stage entry point: requires the segmenter's blocks.
pub fn run(state: &DocumentState, params: &LocateParams) -> Result<BTreeMap<u32, Vec<Redaction>>> {
    let blocks = state.blocks.as_ref().ok_or(UnredactError::MissingUpstream {
        stage: "locate-redactions",
        field: "blocks",
    })?;
    Ok(locate_pages(&state.pages, blocks, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NormBox, TextSpan};
    use crate::params::SegmentParams;
    use crate::stages::segment::segment_page;

    fn span(text: &str, x0: f64, x1: f64, y: f64) -> TextSpan {
        TextSpan::new(text, NormBox::new(x0, y, x1 - x0, 0.012), "Helvetica", 11.0)
    }

    fn rect(x0: f64, x1: f64, y: f64) -> OpaqueRect {
        OpaqueRect::new(NormBox::new(x0, y, x1 - x0, 0.012))
    }

    fn located(page: &Page) -> Vec<Redaction> {
        let blocks = segment_page(page, &SegmentParams::default());
        locate_page(page, &blocks, &LocateParams::default())
    }

    #[test]
    fn test_name_scenario() {
        let page = Page::new(0, 210.0, 297.0)
            .with_spans(vec![
                span("Name:", 0.10, 0.18, 0.2),
                span("is a resident", 0.40, 0.55, 0.2),
            ])
            .with_rects(vec![rect(0.19, 0.39, 0.2)]);
        let redactions = located(&page);
        assert_eq!(redactions.len(), 1);
        assert_eq!(redactions[0].pre_context, "Name:");
        assert_eq!(redactions[0].post_context, "is a resident");
        assert_eq!(redactions[0].id.to_string(), "p0_r0");
    }

    #[test]
    fn test_rect_outside_blocks_is_discarded() {
        let page = Page::new(0, 210.0, 297.0)
            .with_spans(vec![span("Hello", 0.10, 0.20, 0.2)])
            .with_rects(vec![rect(0.10, 0.90, 0.8)]);
        assert!(located(&page).is_empty());
    }

    #[test]
    fn test_light_fill_is_discarded() {
        let mut white = rect(0.19, 0.39, 0.2);
        white.fill = Some([1.0, 1.0, 1.0]);
        let mut black = rect(0.19, 0.39, 0.2);
        black.fill = Some([0.0, 0.0, 0.0]);
        let page = Page::new(0, 210.0, 297.0)
            .with_spans(vec![span("Name:", 0.10, 0.18, 0.2), span("x", 0.40, 0.45, 0.2)]);
        assert!(located(&page.clone().with_rects(vec![white])).is_empty());
        assert_eq!(located(&page.with_rects(vec![black])).len(), 1);
    }

    #[test]
    fn test_duplicate_rects_collapse() {
        let page = Page::new(0, 210.0, 297.0)
            .with_spans(vec![span("Name:", 0.10, 0.18, 0.2), span("x", 0.40, 0.45, 0.2)])
            .with_rects(vec![rect(0.19, 0.39, 0.2), rect(0.19, 0.3901, 0.2)]);
        assert_eq!(located(&page).len(), 1);
    }

    #[test]
    fn test_equal_overlap_prefers_smaller_block() {
        let blocks = vec![
            Block {
                id: crate::model::BlockId::new(0, 0),
                bbox: NormBox::new(0.0, 0.0, 1.0, 0.5),
                text: String::new(),
                span_indices: vec![],
            },
            Block {
                id: crate::model::BlockId::new(0, 1),
                bbox: NormBox::new(0.0, 0.5, 0.5, 0.5),
                text: String::new(),
                span_indices: vec![],
            },
        ];
        let straddling = OpaqueRect::new(NormBox::new(0.1, 0.4, 0.2, 0.2));
        let block = containing_block(&straddling, &blocks, 0.3).unwrap();
        assert_eq!(block.id.index, 1);
    }

    #[test]
    fn test_context_is_bounded() {
        assert_eq!(tail_chars("abcdef".to_string(), 3), "def");
        assert_eq!(head_chars("abcdef".to_string(), 3), "abc");
        assert_eq!(head_chars("ab".to_string(), 3), "ab");
    }

    #[test]
    fn test_run_requires_blocks() {
        let err = run(&DocumentState::default(), &LocateParams::default()).unwrap_err();
        assert!(err.is_precondition());
    }
}
