//! Lookup index over a clue list.
//!
//! Path search repeatedly asks two questions about a node: which clues end
//! here, and which `final` clue of a given stage ends here. [`ClueGraph`]
//! answers both from maps built once per run, borrowing the clues.

use std::collections::HashMap;

use crate::stage::Stage;
use crate::types::Clue;

/// Borrowed index over a clue list.
#[derive(Debug)]
pub struct ClueGraph<'a> {
    clues: &'a [Clue],
    /// `to.id` → traversable clues ending there, in input order.
    parents: HashMap<&'a str, Vec<&'a Clue>>,
    /// `(stage, to.id)` → first `final` clue of that stage ending there.
    stage_finals: HashMap<(Stage, &'a str), &'a Clue>,
}

impl<'a> ClueGraph<'a> {
    pub fn new(clues: &'a [Clue]) -> Self {
        let mut parents: HashMap<&'a str, Vec<&'a Clue>> = HashMap::new();
        let mut stage_finals: HashMap<(Stage, &'a str), &'a Clue> = HashMap::new();

        for clue in clues {
            if clue.is_traversable() {
                parents.entry(clue.to.id.as_str()).or_default().push(clue);
            }
            if clue.is_final() {
                stage_finals
                    .entry((clue.stage, clue.to.id.as_str()))
                    .or_insert(clue);
            }
        }

        tracing::trace!(
            "Indexed {} clues: {} target nodes, {} final boundaries",
            clues.len(),
            parents.len(),
            stage_finals.len()
        );

        Self {
            clues,
            parents,
            stage_finals,
        }
    }

    /// The clue list this index was built from.
    pub fn clues(&self) -> &'a [Clue] {
        self.clues
    }

    /// Intermediate or final clues whose `to.id` is `node_id`.
    pub fn parents_of(&self, node_id: &str) -> &[&'a Clue] {
        self.parents.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The `final` clue of `stage` ending at `node_id`, if any.
    pub fn stage_final_into(&self, stage: Stage, node_id: &str) -> Option<&'a Clue> {
        self.stage_finals.get(&(stage, node_id)).copied()
    }

    /// All `final` clues whose stage satisfies `keep`, in input order.
    pub fn finals_where<F>(&self, keep: F) -> Vec<&'a Clue>
    where
        F: Fn(Stage) -> bool,
    {
        self.clues
            .iter()
            .filter(|c| c.is_final() && keep(c.stage))
            .collect()
    }
}
