//! The document state threaded through every pipeline stage.
//!
//! Each `Option` field belongs to exactly one stage. `None` means the stage
//! has not run (or was skipped); `Some` with an empty collection means it
//! ran and found nothing. Stages never clear a field written by another.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ids::RedactionId;
use super::inference::{Candidate, Prediction};
use super::layout::{Block, Redaction};
use super::page::{DocumentMeta, Page};
use super::report::PipelineOutput;
use super::typography::{GapProfile, TypographicProfile};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    // ingest
    pub meta: Option<DocumentMeta>,
    #[serde(default)]
    pub pages: Vec<Page>,

    // segment
    #[serde(default)]
    pub blocks: Option<BTreeMap<u32, Vec<Block>>>,

    // locate-redactions
    #[serde(default)]
    pub redactions: Option<BTreeMap<u32, Vec<Redaction>>>,

    // profile-typography
    #[serde(default)]
    pub typography: Option<TypographicProfile>,
    #[serde(default)]
    pub gaps: Option<BTreeMap<RedactionId, GapProfile>>,

    // classify
    #[serde(default)]
    pub predictions: Option<BTreeMap<RedactionId, Prediction>>,

    // match-candidates
    #[serde(default)]
    pub candidates: Option<BTreeMap<RedactionId, Vec<Candidate>>>,

    // consolidate
    #[serde(default)]
    pub output: Option<PipelineOutput>,

    /// Wall-clock seconds per stage name, in execution order.
    #[serde(default)]
    pub stage_timings: IndexMap<String, f64>,
}

impl DocumentState {
    pub fn new(meta: DocumentMeta, pages: Vec<Page>) -> Self {
        Self {
            meta: Some(meta),
            pages,
            ..Self::default()
        }
    }

    /// All located redactions in id order, or an empty iterator when the
    /// locator has not run.
    pub fn iter_redactions(&self) -> impl Iterator<Item = &Redaction> {
        self.redactions
            .iter()
            .flat_map(|by_page| by_page.values())
            .flatten()
    }

    pub fn redaction_count(&self) -> usize {
        self.iter_redactions().count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes a snapshot of the state to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
