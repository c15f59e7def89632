//! Clue graph data model.
//!
//! A search response carries a flat list of [`Clue`]s. Each clue is a directed
//! edge between two [`Node`] values, tagged with the pipeline [`Stage`] that
//! produced it. Nodes are plain values duplicated into every clue that
//! references them; identity is the node `id`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::CluePathError;
use crate::stage::Stage;

// ============================================================================
// Node
// ============================================================================

/// Kind of a node in the reasoning graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// The user query. Always a path root.
    Query,
    /// A named entity.
    Entity,
    /// An event extracted from a document.
    Event,
    /// A document section.
    Section,
}

/// A node referenced by one or more clues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique within a response; the producer namespaces ids by stage.
    pub id: String,

    /// Node kind.
    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Free-form classification. Meaning depends on `node_type`.
    #[serde(default)]
    pub category: String,

    /// Display text.
    #[serde(default)]
    pub content: String,

    /// Multi-hop distance for entity/event nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop: Option<u32>,

    /// Stage that produced this node instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl Node {
    /// Create a node with empty category and content.
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            category: String::new(),
            content: String::new(),
            hop: None,
            stage: None,
        }
    }

    /// Shorthand for a query node.
    pub fn query(id: impl Into<String>) -> Self {
        Self::new(id, NodeType::Query)
    }

    /// Set the display text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the producing stage.
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Set the hop distance.
    pub fn with_hop(mut self, hop: u32) -> Self {
        self.hop = Some(hop);
        self
    }

    pub fn is_query(&self) -> bool {
        self.node_type == NodeType::Query
    }
}

// ============================================================================
// Clue
// ============================================================================

/// Per-edge marker separating path terminals from supporting edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayLevel {
    /// Terminal hop of one complete path for its stage.
    Final,
    /// Regular graph edge.
    Intermediate,
    /// Diagnostic edge, shown only in full mode.
    Debug,
}

/// Scalar value in a clue's metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Stage-specific diagnostic fields. Passed through untouched.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A directed edge in the reasoning graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clue {
    /// Unique edge id.
    pub id: String,

    /// Stage that produced this edge.
    pub stage: Stage,

    pub from: Node,

    pub to: Node,

    /// Confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,

    /// Relation label.
    #[serde(default)]
    pub relation: String,

    #[serde(default)]
    pub metadata: Metadata,

    /// Absent is treated as [`DisplayLevel::Intermediate`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_level: Option<DisplayLevel>,
}

impl Clue {
    /// Create an intermediate clue with confidence 1.0.
    pub fn new(id: impl Into<String>, stage: Stage, from: Node, to: Node) -> Self {
        Self {
            id: id.into(),
            stage,
            from,
            to,
            confidence: 1.0,
            relation: String::new(),
            metadata: Metadata::new(),
            display_level: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = relation.into();
        self
    }

    pub fn with_display_level(mut self, level: DisplayLevel) -> Self {
        self.display_level = Some(level);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Display level with the `None ⇒ Intermediate` default applied.
    pub fn effective_display_level(&self) -> DisplayLevel {
        self.display_level.unwrap_or(DisplayLevel::Intermediate)
    }

    pub fn is_final(&self) -> bool {
        self.effective_display_level() == DisplayLevel::Final
    }

    /// Whether this clue may serve as a parent edge during path search.
    ///
    /// Debug edges never take part in reconstruction.
    pub fn is_traversable(&self) -> bool {
        matches!(
            self.effective_display_level(),
            DisplayLevel::Intermediate | DisplayLevel::Final
        )
    }
}

// ============================================================================
// ClueDocument
// ============================================================================

/// A clue list as delivered by the search backend.
///
/// Accepts either a bare array or a response envelope with a `clues` field.
/// Other envelope fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClueDocument {
    List(Vec<Clue>),
    Envelope { clues: Vec<Clue> },
}

impl ClueDocument {
    /// Parse a clue document from JSON text.
    pub fn from_json(text: &str) -> Result<Vec<Clue>, CluePathError> {
        let doc: Self = serde_json::from_str(text)
            .map_err(|e| CluePathError::InvalidInput(format!("Failed to parse clues: {}", e)))?;
        Ok(doc.into_clues())
    }

    pub fn into_clues(self) -> Vec<Clue> {
        match self {
            Self::List(clues) | Self::Envelope { clues } => clues,
        }
    }
}
