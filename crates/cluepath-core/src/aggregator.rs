//! Multi-path aggregation across final clues.
//!
//! Runs [`PathFinder`] over each candidate final clue, numbering every path
//! with a global index, and folds the results into a deduplicated clue set.
//! Membership (`clue id → path indices`) records which paths share a clue.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::diagnostics::DiagnosticSink;
use crate::graph::ClueGraph;
use crate::path_finder::{CluePath, PathAccumulator, PathFinder, PathTermination};
use crate::stage::Stage;
use crate::types::Clue;

/// Summary numbers for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStats {
    /// Final clues traced.
    pub final_clues: usize,
    pub path_count: usize,
    /// Distinct clues across all paths.
    pub clue_count: usize,
    /// Clues used by two or more paths.
    pub shared_clue_count: usize,
    /// Clue count of the longest path.
    pub longest_path: usize,
    pub dangling_paths: usize,
    pub cap_reached: bool,
}

/// Result of aggregating paths for a set of final clues.
#[derive(Debug, Clone, Default)]
pub struct AggregatedPaths<'a> {
    /// Every path, indexed by its global path index.
    pub paths: Vec<CluePath<'a>>,
    /// Each clue on any path exactly once, in first-discovery order.
    pub clues: Vec<&'a Clue>,
    /// Clue id → indices of the paths that contain it.
    pub membership: HashMap<&'a str, BTreeSet<usize>>,
    pub stats: PathStats,
}

impl<'a> AggregatedPaths<'a> {
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }

    /// Path indices that use `clue_id`.
    pub fn paths_using(&self, clue_id: &str) -> Option<&BTreeSet<usize>> {
        self.membership.get(clue_id)
    }

    /// Ids of clues shared by at least two paths, in first-discovery order.
    pub fn shared_clues(&self) -> Vec<&'a str> {
        self.clues
            .iter()
            .map(|c| c.id.as_str())
            .filter(|id| self.membership.get(id).is_some_and(|s| s.len() >= 2))
            .collect()
    }

    /// Owned copies of the deduplicated clues for handing to a renderer.
    pub fn to_owned_clues(&self) -> Vec<Clue> {
        self.clues.iter().map(|c| (*c).clone()).collect()
    }
}

/// Folds path search results across many final clues.
#[derive(Debug, Clone, Copy)]
pub struct PathAggregator {
    max_paths: usize,
}

impl PathAggregator {
    pub fn new(max_paths: usize) -> Self {
        Self { max_paths }
    }

    pub fn max_paths(&self) -> usize {
        self.max_paths
    }

    /// Trace every candidate and merge the resulting paths.
    ///
    /// An empty candidate list yields an empty result, never a fallback.
    pub fn aggregate<'a>(
        &self,
        candidates: &[&'a Clue],
        graph: &ClueGraph<'a>,
        stop_stage: Option<Stage>,
        sink: &mut impl DiagnosticSink,
    ) -> AggregatedPaths<'a> {
        if candidates.is_empty() {
            debug!("No candidate final clues; nothing to aggregate");
            return AggregatedPaths::default();
        }

        let finder = PathFinder::new(graph, stop_stage);
        let mut acc = PathAccumulator::new(self.max_paths);

        for &candidate in candidates {
            finder.find_into(candidate, &mut acc, sink);
        }

        let cap_reached = acc.cap_reached();
        let paths = acc.into_paths();
        let mut result = Self::merge(paths);
        result.stats.final_clues = candidates.len();
        result.stats.cap_reached = cap_reached;

        debug!(
            "Aggregated {} final clue(s): {} path(s), {} distinct clue(s), {} shared",
            result.stats.final_clues,
            result.stats.path_count,
            result.stats.clue_count,
            result.stats.shared_clue_count
        );

        result
    }

    /// Deduplicate clues by id and build membership in path-index order.
    fn merge<'a>(paths: Vec<CluePath<'a>>) -> AggregatedPaths<'a> {
        let mut clues: Vec<&'a Clue> = Vec::new();
        let mut membership: HashMap<&'a str, BTreeSet<usize>> = HashMap::new();

        for (index, path) in paths.iter().enumerate() {
            for &clue in &path.clues {
                let owners = membership.entry(clue.id.as_str()).or_insert_with(|| {
                    clues.push(clue);
                    BTreeSet::new()
                });
                owners.insert(index);
            }
        }

        let stats = PathStats {
            final_clues: 0,
            path_count: paths.len(),
            clue_count: clues.len(),
            shared_clue_count: membership.values().filter(|s| s.len() >= 2).count(),
            longest_path: paths.iter().map(CluePath::len).max().unwrap_or(0),
            dangling_paths: paths
                .iter()
                .filter(|p| p.termination == PathTermination::Dangling)
                .count(),
            cap_reached: false,
        };

        AggregatedPaths {
            paths,
            clues,
            membership,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Diagnostic, NullSink};
    use crate::types::{DisplayLevel, Node, NodeType};

    fn entity(id: &str) -> Node {
        Node::new(id, NodeType::Entity)
    }

    fn make_final(id: &str, stage: Stage, from: Node, to: Node) -> Clue {
        Clue::new(id, stage, from, to).with_display_level(DisplayLevel::Final)
    }

    fn aggregate_all<'a>(
        clues: &'a [Clue],
        max_paths: usize,
        sink: &mut impl DiagnosticSink,
    ) -> AggregatedPaths<'a> {
        let graph = ClueGraph::new(clues);
        let candidates = graph.finals_where(|_| true);
        PathAggregator::new(max_paths).aggregate(&candidates, &graph, None, sink)
    }

    /// q -> x, x -> y shared; y -> a and y -> b are two final clues.
    fn shared_ancestor() -> Vec<Clue> {
        vec![
            Clue::new("qx", Stage::Recall, Node::query("q"), entity("x")),
            Clue::new("xy", Stage::Expand, entity("x"), entity("y")),
            make_final("ya", Stage::Expand, entity("y"), entity("a")),
            make_final("yb", Stage::Expand, entity("y"), entity("b")),
        ]
    }

    #[test]
    fn test_shared_edge_appears_once() {
        let clues = shared_ancestor();
        let result = aggregate_all(&clues, 500, &mut NullSink);

        assert_eq!(result.paths.len(), 2);
        let ids: Vec<&str> = result.clues.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["qx", "xy", "ya", "yb"]);

        let owners = result.paths_using("xy").unwrap();
        assert_eq!(owners.iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(result.shared_clues(), vec!["qx", "xy"]);
        assert_eq!(result.stats.shared_clue_count, 2);
        assert_eq!(result.stats.clue_count, 4);
        assert_eq!(result.stats.final_clues, 2);
    }

    #[test]
    fn test_global_index_not_reset_per_final() {
        let clues = shared_ancestor();
        let result = aggregate_all(&clues, 500, &mut NullSink);
        assert_eq!(result.paths_using("ya").unwrap().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(result.paths_using("yb").unwrap().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_every_clue_exactly_once() {
        // Diamond: two routes from q to y, then two finals.
        let clues = vec![
            Clue::new("q1", Stage::Recall, Node::query("q"), entity("m")),
            Clue::new("q2", Stage::Recall, Node::query("q"), entity("n")),
            Clue::new("my", Stage::Expand, entity("m"), entity("y")),
            Clue::new("ny", Stage::Expand, entity("n"), entity("y")),
            make_final("ya", Stage::Expand, entity("y"), entity("a")),
            make_final("yb", Stage::Expand, entity("y"), entity("b")),
        ];
        let result = aggregate_all(&clues, 500, &mut NullSink);
        assert_eq!(result.paths.len(), 4);

        let mut seen = std::collections::HashSet::new();
        for clue in &result.clues {
            assert!(seen.insert(clue.id.as_str()), "duplicate clue {}", clue.id);
        }
        let union: BTreeSet<&str> = result
            .paths
            .iter()
            .flat_map(|p| p.clue_ids())
            .collect();
        assert_eq!(union.len(), result.clues.len());
        assert_eq!(result.stats.longest_path, 3);
    }

    #[test]
    fn test_cap_bounds_whole_run() {
        let clues = shared_ancestor();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let result = aggregate_all(&clues, 1, &mut diagnostics);
        assert_eq!(result.paths.len(), 1);
        assert!(result.stats.cap_reached);
        assert_eq!(diagnostics, vec![Diagnostic::CapReached { max_paths: 1 }]);
        assert!(result.paths_using("yb").is_none());
    }

    #[test]
    fn test_empty_candidates_yield_empty() {
        let clues = shared_ancestor();
        let graph = ClueGraph::new(&clues);
        let result = PathAggregator::new(500).aggregate(&[], &graph, None, &mut NullSink);
        assert!(result.is_empty());
        assert_eq!(result.stats, PathStats::default());
    }

    #[test]
    fn test_dangling_paths_counted() {
        let clues = vec![
            make_final("f1", Stage::Expand, entity("orphan"), entity("a")),
            make_final("f2", Stage::Expand, Node::query("q"), entity("b")),
        ];
        let result = aggregate_all(&clues, 500, &mut NullSink);
        assert_eq!(result.stats.dangling_paths, 1);
        assert_eq!(result.to_owned_clues().len(), 2);
    }
}
