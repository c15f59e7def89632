//! The main entry point for clue filtering.
//!
//! [`ClueEngine`] holds a [`CluePathConfig`] and exposes the operations an
//! embedding application calls whenever the stage selection or display mode
//! changes. Each call is a pure function of its inputs; nothing is cached
//! between calls.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::aggregator::{AggregatedPaths, PathStats};
use crate::config::CluePathConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::display::{self, DisplayMode, SimplifiedPlan};
use crate::errors::CluePathError;
use crate::graph::ClueGraph;
use crate::stage::Stage;
use crate::summary::{summarize_stages, StageSummary};
use crate::types::Clue;

/// Result of [`ClueEngine::filter`].
#[derive(Debug, Clone)]
pub struct FilterOutcome<'a> {
    /// Clues to render, borrowed from the input.
    pub clues: Vec<&'a Clue>,
    pub diagnostics: Vec<Diagnostic>,
    /// Path statistics; `None` in full mode.
    pub stats: Option<PathStats>,
}

impl FilterOutcome<'_> {
    pub fn to_owned_clues(&self) -> Vec<Clue> {
        self.clues.iter().map(|c| (*c).clone()).collect()
    }
}

/// Result of [`ClueEngine::reconstruct`].
#[derive(Debug, Clone)]
pub struct Reconstruction<'a> {
    /// `None` when no stage was selected.
    pub plan: Option<SimplifiedPlan>,
    pub paths: AggregatedPaths<'a>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Clue-path reconstruction engine.
#[derive(Debug, Clone, Default)]
pub struct ClueEngine {
    config: CluePathConfig,
}

impl ClueEngine {
    pub fn new(config: CluePathConfig) -> Self {
        Self { config }
    }

    /// Engine configured from `~/.cluepath/config.yaml` (or defaults).
    pub fn with_defaults() -> Result<Self, CluePathError> {
        Ok(Self::new(CluePathConfig::load_default()?))
    }

    /// Engine configured from a specific file.
    pub fn with_config(path: &Path) -> Result<Self, CluePathError> {
        Ok(Self::new(CluePathConfig::from_path(path)?))
    }

    pub fn config(&self) -> &CluePathConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CluePathConfig {
        &mut self.config
    }

    pub fn max_paths(&self) -> usize {
        self.config.reconstruction.max_paths
    }

    /// Stages to use when the caller passes none.
    pub fn default_stages(&self) -> BTreeSet<Stage> {
        self.config.display.default_stages.iter().copied().collect()
    }

    pub fn default_mode(&self) -> DisplayMode {
        self.config.display.default_mode
    }

    /// Select clues for display, collecting diagnostics.
    pub fn filter<'a>(
        &self,
        clues: &'a [Clue],
        selected: &BTreeSet<Stage>,
        mode: DisplayMode,
    ) -> FilterOutcome<'a> {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let (selected_clues, stats) = self.filter_with(clues, selected, mode, &mut diagnostics);
        FilterOutcome {
            clues: selected_clues,
            diagnostics,
            stats,
        }
    }

    /// Select clues for display, sending diagnostics to `sink`.
    pub fn filter_with<'a>(
        &self,
        clues: &'a [Clue],
        selected: &BTreeSet<Stage>,
        mode: DisplayMode,
        sink: &mut impl DiagnosticSink,
    ) -> (Vec<&'a Clue>, Option<PathStats>) {
        debug!(
            "Filtering {} clue(s): mode={}, stages={:?}",
            clues.len(),
            mode,
            selected
        );

        match mode {
            DisplayMode::Full => (display::full_view(clues), None),
            DisplayMode::Simplified => {
                let graph = ClueGraph::new(clues);
                let aggregated =
                    display::simplified_view(&graph, selected, self.max_paths(), sink);
                (aggregated.clues, Some(aggregated.stats))
            }
        }
    }

    /// Reconstruct paths for a stage selection, keeping per-path detail.
    pub fn reconstruct<'a>(
        &self,
        clues: &'a [Clue],
        selected: &BTreeSet<Stage>,
    ) -> Reconstruction<'a> {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let graph = ClueGraph::new(clues);
        let paths = display::simplified_view(&graph, selected, self.max_paths(), &mut diagnostics);
        Reconstruction {
            plan: SimplifiedPlan::for_selection(selected),
            paths,
            diagnostics,
        }
    }

    /// Per-stage clue counts.
    pub fn summarize(&self, clues: &[Clue]) -> Vec<StageSummary> {
        summarize_stages(clues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconstructionConfig;
    use crate::path_finder::PathTermination;
    use crate::stage::parse_stages;
    use crate::types::{DisplayLevel, Node, NodeType};

    fn entity(id: &str) -> Node {
        Node::new(id, NodeType::Entity)
    }

    fn ids(clues: &[&Clue]) -> Vec<String> {
        clues.iter().map(|c| c.id.clone()).collect()
    }

    /// query -> A (recall), A -> B (expand), B -> C (expand, final)
    fn three_hop_chain() -> Vec<Clue> {
        vec![
            Clue::new("qa", Stage::Recall, Node::query("Q"), entity("A")),
            Clue::new("ab", Stage::Expand, entity("A"), entity("B")),
            Clue::new("bc", Stage::Expand, entity("B"), entity("C"))
                .with_display_level(DisplayLevel::Final),
        ]
    }

    #[test]
    fn test_scenario_single_rooted_final() {
        let clues = vec![Clue::new("e1", Stage::Recall, Node::query("Q"), entity("N1"))
            .with_display_level(DisplayLevel::Final)];
        let engine = ClueEngine::default();
        let selected = parse_stages(&["recall"]).unwrap();
        let outcome = engine.filter(&clues, &selected, DisplayMode::Simplified);
        assert_eq!(ids(&outcome.clues), vec!["e1"]);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_scenario_full_reconstruction_when_recall_selected() {
        let clues = three_hop_chain();
        let engine = ClueEngine::default();
        let selected = parse_stages(&["recall", "expand"]).unwrap();
        let outcome = engine.filter(&clues, &selected, DisplayMode::Simplified);
        assert_eq!(ids(&outcome.clues), vec!["qa", "ab", "bc"]);
        assert_eq!(outcome.stats.unwrap().path_count, 1);
    }

    #[test]
    fn test_scenario_stop_stage_truncates() {
        let clues = three_hop_chain();
        let engine = ClueEngine::default();
        let selected = parse_stages(&["expand"]).unwrap();
        let outcome = engine.filter(&clues, &selected, DisplayMode::Simplified);
        assert_eq!(ids(&outcome.clues), vec!["ab", "bc"]);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind(), "dangling-branch");
    }

    #[test]
    fn test_scenario_shared_ancestor() {
        let clues = vec![
            Clue::new("qx", Stage::Recall, Node::query("Q"), entity("X")),
            Clue::new("xy", Stage::Expand, entity("X"), entity("Y")),
            Clue::new("y1", Stage::Expand, entity("Y"), entity("R1"))
                .with_display_level(DisplayLevel::Final),
            Clue::new("y2", Stage::Expand, entity("Y"), entity("R2"))
                .with_display_level(DisplayLevel::Final),
        ];
        let engine = ClueEngine::default();
        let selected = parse_stages(&["recall", "expand"]).unwrap();
        let reconstruction = engine.reconstruct(&clues, &selected);

        let out = &reconstruction.paths.clues;
        assert_eq!(out.iter().filter(|c| c.id == "xy").count(), 1);
        assert!(reconstruction.paths.paths_using("xy").unwrap().len() >= 2);
        assert!(reconstruction.paths.shared_clues().contains(&"xy"));
        assert!(reconstruction
            .paths
            .paths
            .iter()
            .all(|p| p.termination == PathTermination::Query));
    }

    #[test]
    fn test_full_mode_ignores_selection() {
        let clues = three_hop_chain();
        let engine = ClueEngine::default();
        let outcome = engine.filter(&clues, &BTreeSet::new(), DisplayMode::Full);
        assert_eq!(ids(&outcome.clues), vec!["qa", "ab"]);
        assert!(outcome.stats.is_none());
    }

    #[test]
    fn test_configured_cap_applies() {
        let mut clues: Vec<Clue> = (0..5)
            .map(|i| Clue::new(format!("q{}", i), Stage::Recall, Node::query(format!("Q{}", i)), entity("A")))
            .collect();
        clues.push(
            Clue::new("f", Stage::Recall, entity("A"), entity("B"))
                .with_display_level(DisplayLevel::Final),
        );
        let mut config = CluePathConfig::default();
        config.reconstruction = ReconstructionConfig::new().with_max_paths(2);
        let engine = ClueEngine::new(config);

        let selected = parse_stages(&["recall"]).unwrap();
        let reconstruction = engine.reconstruct(&clues, &selected);
        assert_eq!(reconstruction.paths.paths.len(), 2);
        assert!(reconstruction
            .diagnostics
            .contains(&Diagnostic::CapReached { max_paths: 2 }));
    }

    #[test]
    fn test_metadata_passes_through_unchanged() {
        let clues = vec![Clue::new("e1", Stage::Rerank, Node::query("Q"), entity("S"))
            .with_display_level(DisplayLevel::Final)
            .with_metadata("rank", 1.0)
            .with_metadata("model", "bge-reranker")];
        let engine = ClueEngine::default();
        let outcome = engine.filter(&clues, &parse_stages(&["rerank"]).unwrap(), DisplayMode::Simplified);
        assert_eq!(outcome.to_owned_clues(), clues);
    }

    #[test]
    fn test_summarize_reports_all_stages() {
        let engine = ClueEngine::default();
        let summaries = engine.summarize(&three_hop_chain());
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[2].final_clues, 1);
    }
}
