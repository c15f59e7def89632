//! Display mode selection.
//!
//! Decides which clues the graph view receives:
//!
//! - **Full**: every clue except the `final` markers.
//! - **Simplified**: the backward paths of the highest selected stage's final
//!   clues, stopping at the previous stage's boundary when that stage is not
//!   selected.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::{AggregatedPaths, PathAggregator};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::errors::CluePathError;
use crate::graph::ClueGraph;
use crate::stage::{highest_selected, previous_stage, Stage};
use crate::types::Clue;

/// How much of the clue graph to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// All non-final clues.
    Full,
    /// Reconstructed paths only.
    #[default]
    Simplified,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Simplified => write!(f, "simplified"),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = CluePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "simplified" => Ok(Self::Simplified),
            _ => Err(CluePathError::UnknownDisplayMode(s.to_string())),
        }
    }
}

/// What to reconstruct for a simplified view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplifiedPlan {
    /// Highest selected stage.
    pub highest: Stage,
    /// Stages whose final clues are traced.
    pub candidate_stages: Vec<Stage>,
    /// Boundary at which tracing stops, if any.
    pub stop_stage: Option<Stage>,
}

impl SimplifiedPlan {
    /// Build the plan for a stage selection. `None` when nothing is selected.
    pub fn for_selection(selected: &BTreeSet<Stage>) -> Option<Self> {
        let highest = highest_selected(selected)?;
        let stop_stage = previous_stage(highest).filter(|p| !selected.contains(p));
        Some(Self {
            highest,
            candidate_stages: candidate_stages(highest),
            stop_stage,
        })
    }

    pub fn is_candidate(&self, stage: Stage) -> bool {
        self.candidate_stages.contains(&stage)
    }
}

/// Stages whose final clues are traced when `highest` is the top selection.
///
/// Expand is shown alongside the Recall boundary it was built from; Rerank
/// carries its own final markers and stands alone.
pub fn candidate_stages(highest: Stage) -> Vec<Stage> {
    match highest {
        Stage::Expand => vec![Stage::Expand, Stage::Recall],
        other => vec![other],
    }
}

/// Full mode: every clue that is not a `final` marker, in input order.
pub fn full_view(clues: &[Clue]) -> Vec<&Clue> {
    clues.iter().filter(|c| !c.is_final()).collect()
}

/// Simplified mode: aggregated backward paths for the highest selected stage.
pub fn simplified_view<'a>(
    graph: &ClueGraph<'a>,
    selected: &BTreeSet<Stage>,
    max_paths: usize,
    sink: &mut impl DiagnosticSink,
) -> AggregatedPaths<'a> {
    let Some(plan) = SimplifiedPlan::for_selection(selected) else {
        debug!("No stages selected; simplified view is empty");
        return AggregatedPaths::default();
    };

    let candidates = graph.finals_where(|s| plan.is_candidate(s));
    debug!(
        "Simplified view for {}: {} candidate final clue(s), stop stage {:?}",
        plan.highest,
        candidates.len(),
        plan.stop_stage
    );

    if candidates.is_empty() {
        sink.emit(Diagnostic::EmptyStage {
            stage: plan.highest,
        });
        return AggregatedPaths::default();
    }

    PathAggregator::new(max_paths).aggregate(&candidates, graph, plan.stop_stage, sink)
}

/// Select the clues to render for a mode and stage selection.
///
/// Returned references point into `clues`; metadata is untouched.
pub fn select_clues<'a>(
    clues: &'a [Clue],
    selected: &BTreeSet<Stage>,
    mode: DisplayMode,
    max_paths: usize,
    sink: &mut impl DiagnosticSink,
) -> Vec<&'a Clue> {
    match mode {
        DisplayMode::Full => full_view(clues),
        DisplayMode::Simplified => {
            let graph = ClueGraph::new(clues);
            simplified_view(&graph, selected, max_paths, sink).clues
        }
    }
}
