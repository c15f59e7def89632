//! Retrieval pipeline stages and their fixed dependency order.
//!
//! The pipeline runs `prepare → recall → expand → rerank`. Every clue is
//! tagged with the stage that produced it, and the display layer reasons
//! about "the highest selected stage" and "the stage just before it".

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CluePathError;

/// One phase of the retrieval pipeline.
///
/// Variants are declared in pipeline order, so the derived `Ord` agrees with
/// [`Stage::priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Query analysis and rewriting.
    Prepare,
    /// Initial candidate retrieval.
    Recall,
    /// Multi-hop expansion over entities and events.
    Expand,
    /// Final scoring of candidates.
    Rerank,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 4] = [Stage::Prepare, Stage::Recall, Stage::Expand, Stage::Rerank];

    /// Fixed priority: `prepare=0, recall=1, expand=2, rerank=3`.
    pub fn priority(self) -> u8 {
        match self {
            Self::Prepare => 0,
            Self::Recall => 1,
            Self::Expand => 2,
            Self::Rerank => 3,
        }
    }

    /// The stage with the given priority, if any.
    pub fn from_priority(priority: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.priority() == priority)
    }

    /// The stage immediately preceding this one, or `None` for `prepare`.
    pub fn previous(self) -> Option<Self> {
        self.priority()
            .checked_sub(1)
            .and_then(Self::from_priority)
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Recall => "recall",
            Self::Expand => "expand",
            Self::Rerank => "rerank",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = CluePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prepare" => Ok(Self::Prepare),
            "recall" => Ok(Self::Recall),
            "expand" => Ok(Self::Expand),
            "rerank" => Ok(Self::Rerank),
            _ => Err(CluePathError::UnknownStage(s.to_string())),
        }
    }
}

/// The stage with the highest priority in `stages`, or `None` when empty.
pub fn highest_selected<'a, I>(stages: I) -> Option<Stage>
where
    I: IntoIterator<Item = &'a Stage>,
{
    stages.into_iter().copied().max_by_key(|s| s.priority())
}

/// The stage preceding `stage`, or `None` for `prepare`.
pub fn previous_stage(stage: Stage) -> Option<Stage> {
    stage.previous()
}

/// Parse UI stage names into a stage set.
///
/// Duplicates collapse; an unknown name is an error.
pub fn parse_stages<S: AsRef<str>>(names: &[S]) -> Result<BTreeSet<Stage>, CluePathError> {
    names.iter().map(|n| n.as_ref().parse::<Stage>()).collect()
}
