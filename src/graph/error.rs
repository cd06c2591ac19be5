//! Load-time validation errors.
//!
//! A dataset is either accepted in full or rejected with the offending
//! entity named (strict mode). There is no lenient drop-and-continue
//! path: a malformed dataset never becomes a partially loaded graph.

use thiserror::Error;

/// Reasons a dataset is rejected at `load` time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Two layers share the same ordering index.
    #[error("duplicate layer index {index} (layer '{id}')")]
    DuplicateLayerIndex { id: String, index: i32 },

    /// Two nodes share the same identifier.
    #[error("duplicate node id '{id}'")]
    DuplicateNodeId { id: String },

    /// Two edges share the same identifier.
    #[error("duplicate edge id '{id}'")]
    DuplicateEdgeId { id: String },

    /// A node references a layer index that does not exist.
    #[error("node '{node_id}' references unknown layer index {layer_index}")]
    UnknownLayer { node_id: String, layer_index: i32 },

    /// An edge references a node id that does not exist.
    #[error("edge '{edge_id}' references unknown node '{node_id}'")]
    UnknownNode { edge_id: String, node_id: String },

    /// A node weight would produce a non-positive or non-finite mass.
    #[error("node '{node_id}' has invalid weight {weight} (mass must be finite and > 0)")]
    InvalidWeight { node_id: String, weight: f32 },

    /// A node declares a non-finite initial position.
    #[error("node '{node_id}' has a non-finite initial position")]
    NonFinitePosition { node_id: String },

    /// A node declares a non-finite initial velocity.
    #[error("node '{node_id}' has a non-finite initial velocity")]
    NonFiniteVelocity { node_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_offending_entity() {
        let err = GraphError::UnknownNode {
            edge_id: "e7".into(),
            node_id: "ghost".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("e7"));
        assert!(msg.contains("ghost"));

        let err = GraphError::UnknownLayer {
            node_id: "n3".into(),
            layer_index: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("n3"));
        assert!(msg.contains('9'));
    }
}
