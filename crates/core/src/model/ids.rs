//! Page-scoped identifiers for blocks and redactions.
//!
//! Both serialize as compact strings (`p3_b7`, `p3_r0`) so they can key JSON
//! maps, and order by `(page, index)`, which is the merge order used by every
//! stage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnredactError;

fn parse_scoped(s: &str, tag: char) -> Result<(u32, u32), UnredactError> {
    let bad = || UnredactError::InvalidInput(format!("malformed identifier: {s:?}"));
    let rest = s.strip_prefix('p').ok_or_else(bad)?;
    let (page, index) = rest.split_once('_').ok_or_else(bad)?;
    let index = index.strip_prefix(tag).ok_or_else(bad)?;
    Ok((
        page.parse().map_err(|_| bad())?,
        index.parse().map_err(|_| bad())?,
    ))
}

/// Identifier of a [`Block`](super::Block), unique within its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BlockId {
    pub page: u32,
    pub index: u32,
}

impl BlockId {
    pub const fn new(page: u32, index: u32) -> Self {
        Self { page, index }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}_b{}", self.page, self.index)
    }
}

impl FromStr for BlockId {
    type Err = UnredactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scoped(s, 'b').map(|(page, index)| Self { page, index })
    }
}

impl From<BlockId> for String {
    fn from(id: BlockId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for BlockId {
    type Error = UnredactError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Identifier of a [`Redaction`](super::Redaction), unique within its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RedactionId {
    pub page: u32,
    pub index: u32,
}

impl RedactionId {
    pub const fn new(page: u32, index: u32) -> Self {
        Self { page, index }
    }
}

impl fmt::Display for RedactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}_r{}", self.page, self.index)
    }
}

impl FromStr for RedactionId {
    type Err = UnredactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scoped(s, 'r').map(|(page, index)| Self { page, index })
    }
}

impl From<RedactionId> for String {
    fn from(id: RedactionId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RedactionId {
    type Error = UnredactError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
