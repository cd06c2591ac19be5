//! Graph input types.
//!
//! These types describe a layered DAG dataset as it arrives at the
//! `load(graph)` boundary: an already-parsed object with `layers`,
//! `nodes`, and `edges`. Field names are camelCase on the wire to match
//! the JSON datasets produced by the JS side.
//!
//! Nothing here is validated; validation happens when a
//! [`GraphSnapshot`](super::store::GraphSnapshot) is built from this data.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// A complete layered DAG dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    /// Optional dataset-level metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GraphMetadata>,

    /// Layers, one per plane in the layout. Order on the wire is
    /// irrelevant; layers are keyed by `index`.
    #[serde(default)]
    pub layers: Vec<LayerData>,

    /// Nodes, each assigned to a layer by `layer_index`.
    #[serde(default)]
    pub nodes: Vec<NodeData>,

    /// Directed edges between nodes.
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

/// Dataset-level metadata. Informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The unit a layer index represents (e.g. "month").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

/// One layer of the DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerData {
    /// Unique layer identifier.
    pub id: String,

    /// Ordering key. Layers are positioned and listed by this index,
    /// not by insertion order. Must be unique across the dataset.
    pub index: i32,

    /// Display label (e.g. "Jan 2025").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Timestamp the layer represents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One node of the DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Unique node identifier.
    pub id: String,

    /// Display label.
    pub label: String,

    /// Index of the layer this node belongs to. Must reference an
    /// existing layer.
    pub layer_index: i32,

    /// Weight driving the particle's mass. Must be positive and finite
    /// when present; defaults to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,

    /// Initial position. When absent the particle is seeded
    /// deterministically on its layer plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,

    /// Initial velocity. Defaults to zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Vec3>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

/// Per-node metadata carried through for the rendering layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One directed edge of the DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    /// Unique edge identifier.
    pub id: String,

    /// Source node id. Must reference an existing node.
    pub source_id: String,

    /// Target node id. Must reference an existing node.
    pub target_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EdgeMetadata>,
}

/// Per-edge metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMetadata {
    /// Relationship kind (e.g. "same-word").
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<String>,

    /// Spring strength multiplier for this edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,

    /// Visual weight for the rendering layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

impl EdgeData {
    /// Spring strength multiplier, defaulting to 1.0 when the edge
    /// carries no metadata.
    pub fn strength(&self) -> f32 {
        self.metadata
            .as_ref()
            .and_then(|m| m.strength)
            .unwrap_or(1.0)
    }
}
