//! Candidate-string sources, one per category family.
//!
//! The matcher only depends on [`CandidateSource::lookup`]. Sources return
//! an empty list for categories they do not serve.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Category;

pub trait CandidateSource: Send + Sync {
    /// Candidate strings for `category`, most plausible first.
    fn lookup(&self, category: Category) -> Vec<String>;
}

const GIVEN_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty", "Mark",
    "Sandra", "Paul", "Ashley", "Steven", "Emily", "Andrew", "Donna", "Kenneth", "Michelle",
];

const SURNAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
];

const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const STREET_TYPES: &[&str] = &["Street", "Avenue", "Road", "Drive", "Lane", "Boulevard", "Place"];

const ORG_SUFFIXES: &[&str] = &["Inc.", "LLC", "LLP", "Holdings", "Foundation", "Group", "& Co."];

/// Personal names built from common given names and surnames.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSource;

impl CandidateSource for NameSource {
    fn lookup(&self, category: Category) -> Vec<String> {
        if category != Category::Name {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(GIVEN_NAMES.len() * (SURNAMES.len() + 2) + SURNAMES.len());
        for given in GIVEN_NAMES {
            for surname in SURNAMES {
                out.push(format!("{given} {surname}"));
            }
        }
        for given in GIVEN_NAMES {
            for surname in SURNAMES.iter().take(6) {
                out.push(format!("{} {surname}", &given[..1]));
            }
        }
        out.extend(GIVEN_NAMES.iter().map(|s| s.to_string()));
        out.extend(SURNAMES.iter().map(|s| format!("Mr. {s}")));
        out
    }
}

/// Format generators for structured categories.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternSource;

impl PatternSource {
    fn phones() -> Vec<String> {
        let (area, exchange, line) = ("212", "555", "0147");
        vec![
            format!("({area}) {exchange}-{line}"),
            format!("{area}-{exchange}-{line}"),
            format!("{area}.{exchange}.{line}"),
            format!("{area} {exchange} {line}"),
            format!("+1 {area} {exchange} {line}"),
            format!("+1 ({area}) {exchange}-{line}"),
            format!("1-{area}-{exchange}-{line}"),
            format!("{exchange}-{line}"),
            format!("{area}{exchange}{line}"),
            "+44 20 7946 0958".to_string(),
            "+33 1 42 68 53 00".to_string(),
        ]
    }

    fn dates() -> Vec<String> {
        let mut out = Vec::new();
        for (m, month) in MONTHS.iter().enumerate() {
            let m = m + 1;
            for day in [1, 15, 28] {
                out.push(format!("{month} {day}, 2004"));
                out.push(format!("{day} {month} 2004"));
                out.push(format!("{}. {day}, 2004", &month[..3]));
                out.push(format!("{m:02}/{day:02}/2004"));
                out.push(format!("{m}/{day}/04"));
                out.push(format!("2004-{m:02}-{day:02}"));
            }
        }
        out
    }

    fn id_numbers() -> Vec<String> {
        [
            "123-45-6789",
            "123456789",
            "A12345678",
            "X1234567",
            "1:15-cv-07433",
            "08-80736",
            "4000-1234-5678-9010",
            "GB29NWBK60161331926819",
            "DL-2045-7781",
            "00123456",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn amounts() -> Vec<String> {
        let mut out = Vec::new();
        for value in [50_u64, 500, 1_000, 7_500, 15_000, 25_000, 100_000, 250_000, 1_000_000] {
            let grouped = group_thousands(value);
            out.push(format!("${grouped}"));
            out.push(format!("${grouped}.00"));
            out.push(format!("USD {grouped}"));
        }
        out.extend(["$1.5 million", "$10 million", "$2.3 billion"].map(String::from));
        out
    }

    fn emails() -> Vec<String> {
        let mut out = Vec::new();
        for given in GIVEN_NAMES.iter().take(12) {
            for surname in SURNAMES.iter().take(12) {
                let (g, s) = (given.to_lowercase(), surname.to_lowercase());
                out.push(format!("{g}.{s}@gmail.com"));
                out.push(format!("{}{s}@example.com", &g[..1]));
            }
        }
        out
    }

    fn addresses() -> Vec<String> {
        let mut out = Vec::new();
        for number in [9, 71, 358, 1200] {
            for surname in SURNAMES.iter().take(10) {
                for street in STREET_TYPES {
                    out.push(format!("{number} {surname} {street}"));
                }
            }
        }
        out
    }

    fn organisations() -> Vec<String> {
        let mut out = Vec::new();
        for surname in SURNAMES.iter().take(20) {
            for suffix in ORG_SUFFIXES {
                out.push(format!("{surname} {suffix}"));
            }
        }
        out
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl CandidateSource for PatternSource {
    fn lookup(&self, category: Category) -> Vec<String> {
        match category {
            Category::Phone => Self::phones(),
            Category::Date => Self::dates(),
            Category::IdNumber => Self::id_numbers(),
            Category::Monetary => Self::amounts(),
            Category::Email => Self::emails(),
            Category::Address => Self::addresses(),
            Category::Organisation => Self::organisations(),
            Category::Name | Category::Unknown => Vec::new(),
        }
    }
}

/// Fixed word lists per category, typically loaded from a JSON dictionary
/// of the form `{"name": ["..."], "organisation": ["..."]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordListSource {
    lists: BTreeMap<Category, Vec<String>>,
}

impl WordListSource {
    pub fn new(lists: BTreeMap<Category, Vec<String>>) -> Self {
        Self { lists }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn insert(&mut self, category: Category, words: impl IntoIterator<Item = impl Into<String>>) {
        self.lists
            .entry(category)
            .or_default()
            .extend(words.into_iter().map(Into::into));
    }
}

impl CandidateSource for WordListSource {
    fn lookup(&self, category: Category) -> Vec<String> {
        self.lists.get(&category).cloned().unwrap_or_default()
    }
}

/// Concatenates the output of several sources, in registration order.
#[derive(Default)]
pub struct CompositeSource {
    sources: Vec<Box<dyn CandidateSource>>,
}

impl CompositeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name and pattern generators.
    pub fn with_builtin() -> Self {
        Self::new().with(NameSource).with(PatternSource)
    }

    /// `source` ahead of the built-in generators, so its strings survive
    /// the lookup bound and win ties.
    pub fn with_builtin_after(source: impl CandidateSource + 'static) -> Self {
        Self::new().with(source).with(NameSource).with(PatternSource)
    }

    pub fn with(mut self, source: impl CandidateSource + 'static) -> Self {
        self.push(source);
        self
    }

    pub fn push(&mut self, source: impl CandidateSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl CandidateSource for CompositeSource {
    fn lookup(&self, category: Category) -> Vec<String> {
        self.sources
            .iter()
            .flat_map(|s| s.lookup(category))
            .collect()
    }
}
