//! Backward path search from a single `final` clue.
//!
//! Starting at a final clue, the search walks parent clues (clues whose `to`
//! is the current node) until it reaches a query node or the boundary of the
//! stop stage. Every simple path found is recorded root-first.
//!
//! ## Algorithm
//!
//! Iterative depth-first search with an explicit stack. Each frame holds the
//! path so far, the frontier node and the set of nodes already expanded on
//! that branch. At each popped frame, in order:
//!
//! 1. Stop if the path cap is reached.
//! 2. A query node completes the path.
//! 3. At the stop-stage boundary, prepend that stage's final clue ending here
//!    (or keep the path as-is when none exists) and complete it.
//! 4. A node already expanded on this branch is a cycle; drop the branch.
//! 5. With no parent clues, keep the partial path.
//! 6. Otherwise push one frame per parent, highest confidence on top.
//!
//! The cap is shared through a [`PathAccumulator`] so that one aggregation
//! run over many final clues stays within a single budget.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::graph::ClueGraph;
use crate::stage::Stage;
use crate::types::{Clue, Node};

// ============================================================================
// CluePath
// ============================================================================

/// How a recorded path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathTermination {
    /// The first clue starts at a query node.
    Query,
    /// The first clue is the stop stage's final clue.
    StopBoundary,
    /// No further parent existed; the path is not rooted.
    Dangling,
}

/// One reconstructed path, root-first.
#[derive(Debug, Clone)]
pub struct CluePath<'a> {
    pub clues: Vec<&'a Clue>,
    pub termination: PathTermination,
}

impl<'a> CluePath<'a> {
    /// Node the path starts from.
    pub fn root(&self) -> Option<&'a Node> {
        self.clues.first().map(|c| &c.from)
    }

    /// The final clue the path was traced from.
    pub fn terminal(&self) -> Option<&'a Clue> {
        self.clues.last().copied()
    }

    pub fn len(&self) -> usize {
        self.clues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }

    pub fn clue_ids(&self) -> Vec<&'a str> {
        self.clues.iter().map(|c| c.id.as_str()).collect()
    }
}

// ============================================================================
// PathAccumulator
// ============================================================================

/// Recorded paths plus the cap they share.
#[derive(Debug)]
pub struct PathAccumulator<'a> {
    paths: Vec<CluePath<'a>>,
    max_paths: usize,
    cap_reported: bool,
}

impl<'a> PathAccumulator<'a> {
    pub fn new(max_paths: usize) -> Self {
        Self {
            paths: Vec::new(),
            max_paths,
            cap_reported: false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.paths.len() >= self.max_paths
    }

    /// Whether exploration was cut short by the cap.
    pub fn cap_reached(&self) -> bool {
        self.cap_reported
    }

    pub fn max_paths(&self) -> usize {
        self.max_paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[CluePath<'a>] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<CluePath<'a>> {
        self.paths
    }

    /// Record a path given leaf-first.
    fn record(&mut self, mut leaf_first: Vec<&'a Clue>, termination: PathTermination) {
        leaf_first.reverse();
        trace!(
            "Recorded path #{} ({:?}, {} clues)",
            self.paths.len(),
            termination,
            leaf_first.len()
        );
        self.paths.push(CluePath {
            clues: leaf_first,
            termination,
        });
    }

    fn report_cap(&mut self, sink: &mut impl DiagnosticSink) {
        if !self.cap_reported {
            self.cap_reported = true;
            debug!("Path cap of {} reached", self.max_paths);
            sink.emit(Diagnostic::CapReached {
                max_paths: self.max_paths,
            });
        }
    }
}

// ============================================================================
// PathFinder
// ============================================================================

/// A pending branch of the search.
struct Frame<'a> {
    /// Leaf-first: the traced final clue is at index 0.
    path: Vec<&'a Clue>,
    node: &'a Node,
    visited: HashSet<&'a str>,
}

/// Enumerates backward paths over a [`ClueGraph`].
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g, 'a> {
    graph: &'g ClueGraph<'a>,
    stop_stage: Option<Stage>,
}

impl<'g, 'a> PathFinder<'g, 'a> {
    /// Create a finder. With `stop_stage = None` every path walks to a query node.
    pub fn new(graph: &'g ClueGraph<'a>, stop_stage: Option<Stage>) -> Self {
        Self { graph, stop_stage }
    }

    pub fn stop_stage(&self) -> Option<Stage> {
        self.stop_stage
    }

    /// All paths ending in `final_clue`, bounded by `max_paths`.
    pub fn find_paths(
        &self,
        final_clue: &'a Clue,
        max_paths: usize,
        sink: &mut impl DiagnosticSink,
    ) -> Vec<CluePath<'a>> {
        let mut acc = PathAccumulator::new(max_paths);
        self.find_into(final_clue, &mut acc, sink);
        acc.into_paths()
    }

    /// Trace `final_clue` and append its paths to `acc`.
    ///
    /// Returns the number of paths added.
    pub fn find_into(
        &self,
        final_clue: &'a Clue,
        acc: &mut PathAccumulator<'a>,
        sink: &mut impl DiagnosticSink,
    ) -> usize {
        let before = acc.len();
        let mut stack = vec![Frame {
            path: vec![final_clue],
            node: &final_clue.from,
            visited: HashSet::new(),
        }];

        while let Some(frame) = stack.pop() {
            if acc.is_full() {
                acc.report_cap(sink);
                break;
            }

            let node = frame.node;

            if node.is_query() {
                acc.record(frame.path, PathTermination::Query);
                continue;
            }

            if let Some(stop) = self.stop_stage {
                if self.at_stop_boundary(node, stop) {
                    let mut path = frame.path;
                    match self.graph.stage_final_into(stop, &node.id) {
                        Some(boundary) => {
                            path.push(boundary);
                            acc.record(path, PathTermination::StopBoundary);
                        }
                        None => {
                            sink.emit(Diagnostic::MissingStopBoundary {
                                final_clue_id: final_clue.id.clone(),
                                node_id: node.id.clone(),
                                stop_stage: stop,
                            });
                            acc.record(path, PathTermination::Dangling);
                        }
                    }
                    continue;
                }
            }

            if frame.visited.contains(node.id.as_str()) {
                sink.emit(Diagnostic::CycleDetected {
                    final_clue_id: final_clue.id.clone(),
                    node_id: node.id.clone(),
                });
                continue;
            }

            let mut parents = self.graph.parents_of(&node.id).to_vec();
            if parents.is_empty() {
                sink.emit(Diagnostic::DanglingBranch {
                    final_clue_id: final_clue.id.clone(),
                    node_id: node.id.clone(),
                });
                acc.record(frame.path, PathTermination::Dangling);
                continue;
            }

            // Stable: equal confidence keeps input order. NaN ranks last.
            parents.sort_by(|a, b| sort_key(b).total_cmp(&sort_key(a)));

            let mut visited = frame.visited;
            visited.insert(node.id.as_str());

            // Reverse push so the most confident parent is popped first.
            for parent in parents.into_iter().rev() {
                let mut path = Vec::with_capacity(frame.path.len() + 1);
                path.extend_from_slice(&frame.path);
                path.push(parent);
                stack.push(Frame {
                    path,
                    node: &parent.from,
                    visited: visited.clone(),
                });
            }
        }

        let added = acc.len() - before;
        debug!("Traced final clue `{}`: {} path(s)", final_clue.id, added);
        added
    }

    /// Whether `node` sits where the stop stage handed over to later stages.
    ///
    /// A node tagged with a stage is at the boundary when its stage is the
    /// stop stage. Untagged nodes are at the boundary when any clue ending at
    /// them was produced by the stop stage.
    fn at_stop_boundary(&self, node: &Node, stop: Stage) -> bool {
        match node.stage {
            Some(stage) => stage == stop,
            None => self
                .graph
                .parents_of(&node.id)
                .iter()
                .any(|c| c.stage == stop),
        }
    }
}

/// Confidence used for parent ordering; NaN sorts below every real value.
fn sort_key(clue: &Clue) -> f64 {
    if clue.confidence.is_nan() {
        f64::NEG_INFINITY
    } else {
        clue.confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DisplayLevel, NodeType};

    fn entity(id: &str) -> Node {
        Node::new(id, NodeType::Entity)
    }

    fn make_clue(id: &str, stage: Stage, from: Node, to: Node) -> Clue {
        Clue::new(id, stage, from, to)
    }

    fn make_final(id: &str, stage: Stage, from: Node, to: Node) -> Clue {
        Clue::new(id, stage, from, to).with_display_level(DisplayLevel::Final)
    }

    fn trace(
        clues: &[Clue],
        final_id: &str,
        stop: Option<Stage>,
        max_paths: usize,
    ) -> (Vec<(Vec<String>, PathTermination)>, Vec<Diagnostic>) {
        let graph = ClueGraph::new(clues);
        let finder = PathFinder::new(&graph, stop);
        let final_clue = clues.iter().find(|c| c.id == final_id).unwrap();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let paths = finder
            .find_paths(final_clue, max_paths, &mut diagnostics)
            .into_iter()
            .map(|p| {
                let ids = p.clue_ids().into_iter().map(String::from).collect();
                (ids, p.termination)
            })
            .collect();
        (paths, diagnostics)
    }

    fn chain() -> Vec<Clue> {
        vec![
            make_clue("qa", Stage::Recall, Node::query("q"), entity("a")),
            make_clue("ab", Stage::Expand, entity("a"), entity("b")),
            make_final("bc", Stage::Expand, entity("b"), entity("c")),
        ]
    }

    #[test]
    fn test_final_from_query_is_complete() {
        let clues = vec![make_final("e1", Stage::Recall, Node::query("q"), entity("n1"))];
        let (paths, diagnostics) = trace(&clues, "e1", None, 500);
        assert_eq!(paths, vec![(vec!["e1".to_string()], PathTermination::Query)]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_chain_walks_to_query_root_first() {
        let (paths, _) = trace(&chain(), "bc", None, 500);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].0, vec!["qa", "ab", "bc"]);
        assert_eq!(paths[0].1, PathTermination::Query);
    }

    #[test]
    fn test_branches_ordered_by_confidence() {
        let clues = vec![
            make_clue("low", Stage::Recall, Node::query("q1"), entity("a")).with_confidence(0.2),
            make_clue("high", Stage::Recall, Node::query("q2"), entity("a")).with_confidence(0.9),
            make_clue("mid", Stage::Recall, Node::query("q3"), entity("a")).with_confidence(0.5),
            make_final("f", Stage::Expand, entity("a"), entity("b")),
        ];
        let (paths, _) = trace(&clues, "f", None, 500);
        let roots: Vec<&str> = paths.iter().map(|(ids, _)| ids[0].as_str()).collect();
        assert_eq!(roots, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_nan_confidence_does_not_panic() {
        let mut clues: Vec<Clue> = (0..40)
            .map(|i| {
                let confidence = if i % 3 == 0 { f64::NAN } else { 0.5 };
                make_clue(
                    &format!("p{}", i),
                    Stage::Recall,
                    Node::query(format!("q{}", i)),
                    entity("a"),
                )
                .with_confidence(confidence)
            })
            .collect();
        clues.push(make_final("f", Stage::Expand, entity("a"), entity("b")));

        let (paths, diagnostics) = trace(&clues, "f", None, 500);
        assert_eq!(paths.len(), 40);
        assert!(diagnostics.is_empty());

        // Finite confidences first, in input order; NaN parents after them.
        let firsts: Vec<usize> = paths
            .iter()
            .map(|(ids, _)| ids[0][1..].parse::<usize>().unwrap())
            .collect();
        let finite: Vec<usize> = (0..40).filter(|i| i % 3 != 0).collect();
        let nan: Vec<usize> = (0..40).filter(|i| i % 3 == 0).collect();
        assert_eq!(&firsts[..finite.len()], finite.as_slice());
        assert_eq!(&firsts[finite.len()..], nan.as_slice());
    }

    #[test]
    fn test_equal_confidence_keeps_input_order() {
        let clues = vec![
            make_clue("first", Stage::Recall, Node::query("q1"), entity("a")),
            make_clue("second", Stage::Recall, Node::query("q2"), entity("a")),
            make_final("f", Stage::Expand, entity("a"), entity("b")),
        ];
        let (paths, _) = trace(&clues, "f", None, 500);
        assert_eq!(paths[0].0[0], "first");
        assert_eq!(paths[1].0[0], "second");
    }

    #[test]
    fn test_cycle_abandons_branch_only() {
        // a <- b <- a forms a loop; a <- q is a clean exit.
        let clues = vec![
            make_clue("ba", Stage::Expand, entity("b"), entity("a")).with_confidence(0.9),
            make_clue("ab", Stage::Expand, entity("a"), entity("b")),
            make_clue("qa", Stage::Recall, Node::query("q"), entity("a")).with_confidence(0.1),
            make_final("f", Stage::Expand, entity("a"), entity("z")),
        ];
        let (paths, diagnostics) = trace(&clues, "f", None, 500);
        assert!(diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::CycleDetected { node_id, .. } if node_id == "a")));
        assert!(paths.iter().all(|(_, t)| *t == PathTermination::Query));
        assert!(paths.iter().any(|(ids, _)| ids == &vec!["qa", "f"]));
        // No recorded path revisits a node.
        for (ids, _) in &paths {
            let mut seen = HashSet::new();
            for id in ids {
                let clue = clues.iter().find(|c| &c.id == id).unwrap();
                assert!(seen.insert(clue.to.id.clone()), "path {:?} repeats a node", ids);
            }
        }
    }

    #[test]
    fn test_dangling_branch_keeps_partial_path() {
        let clues = vec![
            make_clue("xa", Stage::Expand, entity("x"), entity("a")),
            make_final("f", Stage::Expand, entity("a"), entity("b")),
        ];
        let (paths, diagnostics) = trace(&clues, "f", None, 500);
        assert_eq!(paths, vec![(vec!["xa".to_string(), "f".to_string()], PathTermination::Dangling)]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::DanglingBranch {
                final_clue_id: "f".to_string(),
                node_id: "x".to_string(),
            }]
        );
    }

    #[test]
    fn test_debug_clues_are_not_parents() {
        let clues = vec![
            make_clue("qa", Stage::Recall, Node::query("q"), entity("a"))
                .with_display_level(DisplayLevel::Debug),
            make_final("f", Stage::Expand, entity("a"), entity("b")),
        ];
        let (paths, _) = trace(&clues, "f", None, 500);
        assert_eq!(paths[0].0, vec!["f"]);
        assert_eq!(paths[0].1, PathTermination::Dangling);
    }

    #[test]
    fn test_stop_boundary_prepends_stage_final() {
        let clues = vec![
            make_final("qa", Stage::Recall, Node::query("q"), entity("a")),
            make_clue("ab", Stage::Expand, entity("a"), entity("b")),
            make_final("bc", Stage::Expand, entity("b"), entity("c")),
        ];
        let (paths, diagnostics) = trace(&clues, "bc", Some(Stage::Recall), 500);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].0, vec!["qa", "ab", "bc"]);
        assert_eq!(paths[0].1, PathTermination::StopBoundary);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_stop_boundary_without_final_is_dangling() {
        let (paths, diagnostics) = trace(&chain(), "bc", Some(Stage::Recall), 500);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].0, vec!["ab", "bc"]);
        assert_eq!(paths[0].1, PathTermination::Dangling);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MissingStopBoundary {
                final_clue_id: "bc".to_string(),
                node_id: "a".to_string(),
                stop_stage: Stage::Recall,
            }]
        );
    }

    #[test]
    fn test_stop_boundary_uses_node_stage_tag() {
        let clues = vec![
            make_clue("qa", Stage::Expand, Node::query("q"), entity("a").with_stage(Stage::Recall)),
            make_final("ab", Stage::Expand, entity("a").with_stage(Stage::Recall), entity("b")),
        ];
        let (paths, _) = trace(&clues, "ab", Some(Stage::Recall), 500);
        assert_eq!(paths[0].0, vec!["ab"]);
        assert_eq!(paths[0].1, PathTermination::Dangling);
    }

    #[test]
    fn test_cap_limits_paths_and_reports_once() {
        let mut clues: Vec<Clue> = (0..10)
            .map(|i| {
                let id = format!("q{}", i);
                make_clue(&id, Stage::Recall, Node::query(id.clone()), entity("a"))
            })
            .collect();
        clues.push(make_final("f", Stage::Expand, entity("a"), entity("b")));

        let (paths, diagnostics) = trace(&clues, "f", None, 3);
        assert_eq!(paths.len(), 3);
        assert_eq!(diagnostics, vec![Diagnostic::CapReached { max_paths: 3 }]);
    }

    #[test]
    fn test_cap_exactly_met_is_silent() {
        let clues = vec![make_final("e1", Stage::Recall, Node::query("q"), entity("n1"))];
        let (paths, diagnostics) = trace(&clues, "e1", None, 1);
        assert_eq!(paths.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_accumulator_shared_across_finals() {
        let clues = vec![
            make_final("f1", Stage::Recall, Node::query("q"), entity("a")),
            make_final("f2", Stage::Recall, Node::query("q"), entity("b")),
        ];
        let graph = ClueGraph::new(&clues);
        let finder = PathFinder::new(&graph, None);
        let mut acc = PathAccumulator::new(1);
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        assert_eq!(finder.find_into(&clues[0], &mut acc, &mut diagnostics), 1);
        assert_eq!(finder.find_into(&clues[1], &mut acc, &mut diagnostics), 0);
        assert!(acc.cap_reached());
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let depth = 3_000;
        let mut clues = vec![make_clue("e0", Stage::Recall, Node::query("q"), entity("n0"))];
        for i in 1..depth {
            clues.push(make_clue(
                &format!("e{}", i),
                Stage::Expand,
                entity(&format!("n{}", i - 1)),
                entity(&format!("n{}", i)),
            ));
        }
        clues.push(make_final("f", Stage::Expand, entity(&format!("n{}", depth - 1)), entity("end")));

        let graph = ClueGraph::new(&clues);
        let finder = PathFinder::new(&graph, None);
        let final_clue = clues.last().unwrap();
        let paths = finder.find_paths(final_clue, 10, &mut crate::diagnostics::NullSink);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), depth + 1);
        assert_eq!(paths[0].root().map(|n| n.id.as_str()), Some("q"));
        assert_eq!(paths[0].terminal().map(|c| c.id.as_str()), Some("f"));
    }
}
