//! Structured diagnostics emitted during reconstruction.
//!
//! None of these are errors. Each one explains why the reconstructed view
//! shows fewer edges than the raw clue list. Embedding applications choose
//! whether to collect, log or drop them by passing a [`DiagnosticSink`].

use std::fmt;

use serde::Serialize;

use crate::stage::Stage;

/// A non-fatal event observed while reconstructing paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// A branch revisited a node already on the same branch and was abandoned.
    #[serde(rename = "cycle-detected", rename_all = "camelCase")]
    CycleDetected {
        final_clue_id: String,
        node_id: String,
    },

    /// No parent edge led further back; the partial path was kept.
    #[serde(rename = "dangling-branch", rename_all = "camelCase")]
    DanglingBranch {
        final_clue_id: String,
        node_id: String,
    },

    /// The stop-stage boundary was reached but no `final` edge of that stage
    /// ends at the node; the partial path was kept. Reported under the
    /// `dangling-branch` kind.
    #[serde(rename = "missing-stop-boundary", rename_all = "camelCase")]
    MissingStopBoundary {
        final_clue_id: String,
        node_id: String,
        stop_stage: Stage,
    },

    /// The path cap was hit; remaining branches were not explored.
    #[serde(rename = "cap-reached", rename_all = "camelCase")]
    CapReached { max_paths: usize },

    /// The stage to reconstruct carries no `final` edges.
    #[serde(rename = "empty-stage", rename_all = "camelCase")]
    EmptyStage { stage: Stage },
}

impl Diagnostic {
    /// Stable kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CycleDetected { .. } => "cycle-detected",
            Self::DanglingBranch { .. } | Self::MissingStopBoundary { .. } => "dangling-branch",
            Self::CapReached { .. } => "cap-reached",
            Self::EmptyStage { .. } => "empty-stage",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleDetected {
                final_clue_id,
                node_id,
            } => write!(
                f,
                "cycle at node `{}` while tracing `{}`; branch abandoned",
                node_id, final_clue_id
            ),
            Self::DanglingBranch {
                final_clue_id,
                node_id,
            } => write!(
                f,
                "no parent clue for node `{}` while tracing `{}`; keeping partial path",
                node_id, final_clue_id
            ),
            Self::MissingStopBoundary {
                final_clue_id,
                node_id,
                stop_stage,
            } => write!(
                f,
                "no {} final clue ends at node `{}` while tracing `{}`; keeping partial path",
                stop_stage, node_id, final_clue_id
            ),
            Self::CapReached { max_paths } => {
                write!(f, "path limit of {} reached; remaining branches skipped", max_paths)
            }
            Self::EmptyStage { stage } => {
                write!(f, "stage {} has no final clues; nothing to show", stage)
            }
        }
    }
}

/// Observer for reconstruction diagnostics.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Collects every diagnostic in emission order.
impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Drops all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _diagnostic: Diagnostic) {}
}

/// Forwards diagnostics to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(kind = diagnostic.kind(), "{}", diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}
