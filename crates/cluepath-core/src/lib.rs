//! # cluepath-core
//!
//! **Clue-path reconstruction** for staged retrieval graphs.
//!
//! A retrieval pipeline (prepare → recall → expand → rerank) explains its
//! results as a flat list of stage-tagged edges called clues. This crate
//! rebuilds the backward reasoning paths from each `final` clue to the query
//! that started it, deduplicates clues shared between paths, and decides
//! which clues a graph view shows in full or simplified mode.
//!
//! ## Main Types
//!
//! - [`ClueEngine`] – the main entry point; a pure function of
//!   (clues, selected stages, display mode)
//! - [`Clue`] / [`Node`] – the edge and node data model
//! - [`PathFinder`] – backward search from one final clue
//! - [`PathAggregator`] – merges paths from many final clues
//! - [`Diagnostic`] / [`DiagnosticSink`] – non-fatal events (cycles,
//!   dangling branches, path cap, empty stages)
//!
//! ## Modules
//!
//! - [`stage`] – stage order and selection helpers
//! - [`types`] – clue and node types
//! - [`graph`] – lookup index over a clue list
//! - [`path_finder`] – backward depth-first path search
//! - [`aggregator`] – multi-path aggregation and sharing statistics
//! - [`display`] – full/simplified view selection
//! - [`summary`] – per-stage clue counts
//! - [`diagnostics`] – diagnostic events and sinks
//! - [`config`] – configuration types
//! - [`engine`] – the ClueEngine façade
//! - [`errors`] – error types
//!
//! ## Example
//!
//! ```
//! use cluepath_core::{parse_stages, ClueDocument, ClueEngine, DisplayMode};
//!
//! let json = r#"[{
//!     "id": "e1", "stage": "recall", "display_level": "final",
//!     "from": {"id": "q", "type": "query"},
//!     "to": {"id": "n1", "type": "entity"}
//! }]"#;
//! let clues = ClueDocument::from_json(json).unwrap();
//!
//! let engine = ClueEngine::default();
//! let selected = parse_stages(&["recall"]).unwrap();
//! let outcome = engine.filter(&clues, &selected, DisplayMode::Simplified);
//! assert_eq!(outcome.clues.len(), 1);
//! ```

pub mod aggregator;
pub mod config;
pub mod diagnostics;
pub mod display;
pub mod engine;
pub mod errors;
pub mod graph;
pub mod path_finder;
pub mod stage;
pub mod summary;
pub mod types;

pub use aggregator::{AggregatedPaths, PathAggregator, PathStats};
pub use config::{
    CluePathConfig, DisplayConfig, ReconstructionConfig, CLUEPATH_HOME_DIR, CONFIG_FILENAME,
    DEFAULT_MAX_PATHS,
};
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, TracingSink};
pub use display::{
    candidate_stages, full_view, select_clues, simplified_view, DisplayMode, SimplifiedPlan,
};
pub use engine::{ClueEngine, FilterOutcome, Reconstruction};
pub use errors::CluePathError;
pub use graph::ClueGraph;
pub use path_finder::{CluePath, PathAccumulator, PathFinder, PathTermination};
pub use stage::{highest_selected, parse_stages, previous_stage, Stage};
pub use summary::{summarize_stages, StageSummary};
pub use types::{Clue, ClueDocument, DisplayLevel, Metadata, MetadataValue, Node, NodeType};
