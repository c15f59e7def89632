//! Per-stage clue counts.
//!
//! Shows at a glance which stages carry `final` markers, which is what
//! decides whether a simplified view can show anything for that stage.

use serde::Serialize;

use crate::stage::Stage;
use crate::types::{Clue, DisplayLevel};

/// Clue counts for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub stage: Stage,
    pub total: usize,
    pub final_clues: usize,
    pub intermediate_clues: usize,
    pub debug_clues: usize,
}

impl StageSummary {
    fn empty(stage: Stage) -> Self {
        Self {
            stage,
            total: 0,
            final_clues: 0,
            intermediate_clues: 0,
            debug_clues: 0,
        }
    }

    /// Whether a simplified view of this stage has anything to trace.
    pub fn has_finals(&self) -> bool {
        self.final_clues > 0
    }
}

/// One summary per stage, in pipeline order, including empty stages.
pub fn summarize_stages(clues: &[Clue]) -> Vec<StageSummary> {
    let mut summaries: Vec<StageSummary> = Stage::ALL.into_iter().map(StageSummary::empty).collect();

    for clue in clues {
        let entry = &mut summaries[clue.stage.priority() as usize];
        entry.total += 1;
        match clue.effective_display_level() {
            DisplayLevel::Final => entry.final_clues += 1,
            DisplayLevel::Intermediate => entry.intermediate_clues += 1,
            DisplayLevel::Debug => entry.debug_clues += 1,
        }
    }

    summaries
}
