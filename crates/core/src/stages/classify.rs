//! Semantic type classification of redacted content.
//!
//! [`Classifier`] is the seam between the pipeline and the scoring model.
//! [`RuleClassifier`] scores each category by context-label hits and by how
//! well the gap's character-count estimate fits the category's usual length.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use crate::error::{Result, UnredactError};
use crate::model::{Category, DocumentState, GapProfile, Prediction, Redaction, RedactionId, TypographicProfile};
use crate::params::ClassifyParams;

/// Everything a classifier may look at for one redaction.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierInput<'a> {
    pub pre_context: &'a str,
    pub post_context: &'a str,
    pub gap: &'a GapProfile,
    pub profile: Option<&'a TypographicProfile>,
}

/// Maps context and gap statistics to a prediction. Must not fail.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &ClassifierInput<'_>) -> Prediction;
}

/// Context patterns and usual length for one category.
#[derive(Debug)]
struct CategoryRule {
    category: Category,
    /// Matched against the end of the pre-context.
    label: Regex,
    /// Matched against the start of the post-context.
    cue: Option<Regex>,
    /// Typical character count, inclusive.
    expected: (u32, u32),
}

fn rule(category: Category, label: &str, cue: Option<&str>, expected: (u32, u32)) -> CategoryRule {
    CategoryRule {
        category,
        label: Regex::new(label).expect("valid label regex"),
        cue: cue.map(|c| Regex::new(c).expect("valid cue regex")),
        expected,
    }
}

static RULES: LazyLock<Vec<CategoryRule>> = LazyLock::new(|| {
    vec![
        rule(
            Category::Name,
            r"(?i)\b(name|mr\.?|mrs\.?|ms\.?|dr\.?|miss|dear|signed|witness|defendant|plaintiff|attn|from|to|by)\s*:?\s*$",
            Some(r"(?i)^('s\b|,?\s*(jr|sr)\b\.?)"),
            (4, 30),
        ),
        rule(
            Category::Phone,
            r"(?i)\b(phone|tel|telephone|mobile|cell|fax|ph)\.?\s*(no\.?|number|#)?\s*:?\s*$",
            Some(r"^\s*(ext\.?|x)\s*\d"),
            (10, 16),
        ),
        rule(
            Category::Email,
            r"(?i)\b(e-?mail(\s+address)?)\s*:?\s*$",
            Some(r"^@[\w.-]+"),
            (10, 40),
        ),
        rule(
            Category::Address,
            r"(?i)\b(address|addr\.?|residing at|resides at|located at|lives at)\s*:?\s*$",
            Some(r"(?i)^(street|st\.?|avenue|ave\.?|road|rd\.?|drive|lane|ln\.?|boulevard|blvd\.?)(\W|$)"),
            (15, 60),
        ),
        rule(
            Category::Date,
            r"(?i)\b(date|dob|d\.o\.b\.?|born|dated|on|date of birth|birth\s?date)\s*:?\s*$",
            Some(r"^,?\s*(19|20)\d{2}\b"),
            (6, 18),
        ),
        rule(
            Category::IdNumber,
            r"(?i)(\b(ssn|social security|passport|account|case|license|licence|id)(\s+(no\.?|number|#))?|\bno\.|#)\s*:?\s*$",
            None,
            (6, 16),
        ),
        rule(
            Category::Monetary,
            r"(?i)(\$|€|£|\b(usd|amount|sum of|paid|total|salary|fee))\s*:?\s*$",
            Some(r"(?i)^(dollars|usd|million|thousand|billion)\b"),
            (3, 14),
        ),
        rule(
            Category::Organisation,
            r"(?i)\b(company|organi[sz]ation|employer|firm|agency|corporation|bank|employed by)\s*:?\s*$",
            Some(r"(?i)^(inc\.?|llc|ltd\.?|corp\.?|corporation|foundation|group|co\.)(\W|$)"),
            (5, 40),
        ),
    ]
});

/// Bell-shaped agreement between an estimated and an expected count range.
///
/// Zero when the ranges do not overlap, 1.0 when the estimate's centre sits
/// on the expected centre.
pub fn range_agreement(estimate: (u32, u32), expected: (u32, u32)) -> f64 {
    let (lo, hi) = estimate;
    let (a, b) = expected;
    if hi < a || lo > b {
        return 0.0;
    }
    let centre = (f64::from(lo) + f64::from(hi)) / 2.0;
    let mean = (f64::from(a) + f64::from(b)) / 2.0;
    let spread = ((f64::from(b) - f64::from(a)) / 2.0).max(1.0);
    let z = (centre - mean) / spread;
    (-0.5 * z * z).exp()
}

/// Rule-based classifier.
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier {
    params: ClassifyParams,
}

impl RuleClassifier {
    pub fn new(params: ClassifyParams) -> Self {
        Self { params }
    }

    /// Combined score of every rule category, in declaration order.
    pub fn scores(&self, input: &ClassifierInput<'_>) -> Vec<(Category, f64)> {
        let total = self.params.pattern_weight + self.params.range_weight;
        let estimate = (
            input.gap.estimated_char_count_min,
            input.gap.estimated_char_count_max,
        );
        RULES
            .iter()
            .map(|r| {
                let hit = r.label.is_match(input.pre_context)
                    || r.cue.as_ref().is_some_and(|c| c.is_match(input.post_context.trim_start()));
                let pattern = if hit { 1.0 } else { 0.0 };
                let raw = self.params.pattern_weight * pattern
                    + self.params.range_weight * range_agreement(estimate, r.expected);
                let score = if total > 0.0 { raw / total } else { 0.0 };
                (r.category, score)
            })
            .collect()
    }
}

impl Classifier for RuleClassifier {
    fn classify(&self, input: &ClassifierInput<'_>) -> Prediction {
        // Strictly greater keeps the earliest category on ties.
        let best = self
            .scores(input)
            .into_iter()
            .fold(None::<(Category, f64)>, |best, (category, score)| match best {
                Some((_, s)) if s >= score => best,
                _ => Some((category, score)),
            });
        match best {
            Some((category, score)) if score > 0.0 && score >= self.params.min_confidence => {
                Prediction::new(category, score)
            }
            Some((_, score)) if score > 0.0 => Prediction::new(Category::Unknown, score),
            _ => Prediction::unknown(),
        }
    }
}

/// Classifies every redaction, keyed by redaction id.
///
/// A redaction without a gap profile degrades to `unknown`.
pub fn classify_redactions<'a>(
    redactions: impl IntoIterator<Item = &'a Redaction>,
    gaps: &BTreeMap<RedactionId, GapProfile>,
    profile: Option<&TypographicProfile>,
    classifier: &dyn Classifier,
) -> BTreeMap<RedactionId, Prediction> {
    let redactions: Vec<&Redaction> = redactions.into_iter().collect();
    let predictions: Vec<(RedactionId, Prediction)> = redactions
        .par_iter()
        .map(|r| {
            let prediction = match gaps.get(&r.id) {
                Some(gap) => classifier.classify(&ClassifierInput {
                    pre_context: &r.pre_context,
                    post_context: &r.post_context,
                    gap,
                    profile,
                }),
                None => {
                    tracing::warn!(id = %r.id, "no gap profile, predicting unknown");
                    Prediction::unknown()
                }
            };
            tracing::trace!(id = %r.id, category = %prediction.category, confidence = prediction.confidence);
            (r.id, prediction)
        })
        .collect();
    predictions.into_iter().collect()
}

/// Stage entry point: requires located redactions and gap profiles.
pub fn run(state: &DocumentState, classifier: &dyn Classifier) -> Result<BTreeMap<RedactionId, Prediction>> {
    if state.redactions.is_none() {
        return Err(UnredactError::MissingUpstream {
            stage: "classify",
            field: "redactions",
        });
    }
    let gaps = state.gaps.as_ref().ok_or(UnredactError::MissingUpstream {
        stage: "classify",
        field: "gaps",
    })?;
    Ok(classify_redactions(
        state.iter_redactions(),
        gaps,
        state.typography.as_ref(),
        classifier,
    ))
}
