//! Layered DAG graph model.
//!
//! This module provides the dataset input types and the graph store.
//! Topology lives in petgraph's `StableGraph` with id→index maps for
//! stable string identifiers; a dataset is validated and assembled into
//! an immutable snapshot before it replaces the previous one.

mod data;
mod error;
mod store;

pub use data::{
    EdgeData, EdgeMetadata, GraphData, GraphMetadata, LayerData, NodeData, NodeMetadata,
};
pub use error::GraphError;
pub use store::{GraphSnapshot, GraphStore};
