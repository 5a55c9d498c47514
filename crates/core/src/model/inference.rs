use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnredactError;

/// Semantic category of the content hidden by a redaction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Name,
    Phone,
    Email,
    Address,
    Date,
    IdNumber,
    Monetary,
    Organisation,
    #[default]
    Unknown,
}

impl Category {
    /// Every category, in declaration order. Classification tie-breaks
    /// follow this order.
    pub const ALL: [Category; 9] = [
        Category::Name,
        Category::Phone,
        Category::Email,
        Category::Address,
        Category::Date,
        Category::IdNumber,
        Category::Monetary,
        Category::Organisation,
        Category::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Address => "address",
            Self::Date => "date",
            Self::IdNumber => "id_number",
            Self::Monetary => "monetary",
            Self::Organisation => "organisation",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnredactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .or(match key.as_str() {
                "organization" => Some(Category::Organisation),
                "id" => Some(Category::IdNumber),
                _ => None,
            })
            .ok_or_else(|| UnredactError::InvalidInput(format!("unknown category: {s:?}")))
    }
}

/// Predicted category for one redaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: Category,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Prediction {
    pub fn new(category: Category, confidence: f64) -> Self {
        Self {
            category,
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

/// One scored replacement-string hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub calculated_width_mm: f64,
    /// `calculated_width_mm - gap_width_mm`.
    pub width_delta_mm: f64,
    /// Match score in `[0, 1]`, 1.0 being a perfect width match.
    pub score: f64,
}
