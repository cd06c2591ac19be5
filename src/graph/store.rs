//! Graph store: validated, immutable snapshots of a layered DAG.
//!
//! The store keeps topology in petgraph's `StableGraph` (node weight = the
//! stable string id, edge weight = spring strength) alongside `HashMap`
//! id→index maps and the original records for lookups. A dataset is
//! validated and assembled into a complete [`GraphSnapshot`] before it
//! replaces the previous one, so a reader can never observe a half-loaded
//! graph and a failed load leaves the old graph untouched.
//!
//! Snapshots are never mutated after construction, which keeps petgraph's
//! `NodeIndex` dense: `NodeIndex::index()` doubles as the particle slot
//! for the node loaded at that position.

use std::collections::{BTreeMap, HashMap};

use petgraph::Directed;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};

use super::data::{EdgeData, GraphData, GraphMetadata, LayerData, NodeData};
use super::error::GraphError;

/// An immutable, fully validated layered DAG.
#[derive(Debug)]
pub struct GraphSnapshot {
    /// Topology. Node weights are stable string ids, edge weights are
    /// spring strength multipliers.
    topology: StableGraph<String, f32, Directed>,

    /// Map from node id to petgraph index (== dense particle slot).
    node_id_to_index: HashMap<String, NodeIndex>,

    /// Map from edge id to petgraph index.
    edge_id_to_index: HashMap<String, EdgeIndex>,

    /// Layers keyed (and therefore ordered) by index.
    layers: BTreeMap<i32, LayerData>,

    /// Node records in load order. Slot `i` corresponds to `NodeIndex(i)`.
    nodes: Vec<NodeData>,

    /// Edge records in load order.
    edges: Vec<EdgeData>,

    /// Dataset-level metadata.
    metadata: Option<GraphMetadata>,
}

impl GraphSnapshot {
    /// An empty snapshot.
    pub fn empty() -> Self {
        Self {
            topology: StableGraph::new(),
            node_id_to_index: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            layers: BTreeMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: None,
        }
    }

    /// Build a snapshot from raw dataset records, validating every
    /// cross-reference. Strict mode: the first violation rejects the
    /// whole dataset, naming the offending entity.
    pub fn build(data: GraphData) -> Result<Self, GraphError> {
        let mut layers: BTreeMap<i32, LayerData> = BTreeMap::new();
        for layer in &data.layers {
            if layers.contains_key(&layer.index) {
                return Err(GraphError::DuplicateLayerIndex {
                    id: layer.id.clone(),
                    index: layer.index,
                });
            }
            layers.insert(layer.index, layer.clone());
        }

        let mut topology = StableGraph::with_capacity(data.nodes.len(), data.edges.len());
        let mut node_id_to_index = HashMap::with_capacity(data.nodes.len());
        let mut edge_id_to_index = HashMap::with_capacity(data.edges.len());

        for node in &data.nodes {
            if node_id_to_index.contains_key(&node.id) {
                return Err(GraphError::DuplicateNodeId {
                    id: node.id.clone(),
                });
            }
            if !layers.contains_key(&node.layer_index) {
                return Err(GraphError::UnknownLayer {
                    node_id: node.id.clone(),
                    layer_index: node.layer_index,
                });
            }
            if let Some(weight) = node.weight {
                if !weight.is_finite() || weight <= 0.0 {
                    return Err(GraphError::InvalidWeight {
                        node_id: node.id.clone(),
                        weight,
                    });
                }
            }
            if let Some(position) = node.position {
                if !position.is_finite() {
                    return Err(GraphError::NonFinitePosition {
                        node_id: node.id.clone(),
                    });
                }
            }
            if let Some(velocity) = node.velocity {
                if !velocity.is_finite() {
                    return Err(GraphError::NonFiniteVelocity {
                        node_id: node.id.clone(),
                    });
                }
            }

            let index = topology.add_node(node.id.clone());
            node_id_to_index.insert(node.id.clone(), index);
        }

        for edge in &data.edges {
            if edge_id_to_index.contains_key(&edge.id) {
                return Err(GraphError::DuplicateEdgeId {
                    id: edge.id.clone(),
                });
            }
            let source = node_id_to_index.get(&edge.source_id).copied().ok_or_else(|| {
                GraphError::UnknownNode {
                    edge_id: edge.id.clone(),
                    node_id: edge.source_id.clone(),
                }
            })?;
            let target = node_id_to_index.get(&edge.target_id).copied().ok_or_else(|| {
                GraphError::UnknownNode {
                    edge_id: edge.id.clone(),
                    node_id: edge.target_id.clone(),
                }
            })?;

            let index = topology.add_edge(source, target, edge.strength());
            edge_id_to_index.insert(edge.id.clone(), index);
        }

        Ok(Self {
            topology,
            node_id_to_index,
            edge_id_to_index,
            layers,
            nodes: data.nodes,
            edges: data.edges,
            metadata: data.metadata,
        })
    }

    /// Look up a node by id.
    pub fn get_node(&self, id: &str) -> Option<&NodeData> {
        self.node_id_to_index
            .get(id)
            .map(|index| &self.nodes[index.index()])
    }

    /// Look up an edge by id.
    pub fn get_edge(&self, id: &str) -> Option<&EdgeData> {
        self.edge_id_to_index
            .get(id)
            .map(|index| &self.edges[index.index()])
    }

    /// Look up a layer by its ordering index.
    pub fn get_layer(&self, index: i32) -> Option<&LayerData> {
        self.layers.get(&index)
    }

    /// All nodes in load order. Slot `i` here is particle slot `i`.
    pub fn nodes(&self) -> &[NodeData] {
        &self.nodes
    }

    /// All edges in load order.
    pub fn edges(&self) -> &[EdgeData] {
        &self.edges
    }

    /// All layers, sorted by index ascending.
    pub fn layers(&self) -> impl Iterator<Item = &LayerData> {
        self.layers.values()
    }

    /// Nodes belonging to the given layer, in load order.
    pub fn nodes_in_layer(&self, layer_index: i32) -> impl Iterator<Item = &NodeData> {
        self.nodes
            .iter()
            .filter(move |node| node.layer_index == layer_index)
    }

    /// The dense particle slot for a node id.
    pub fn node_slot(&self, id: &str) -> Option<usize> {
        self.node_id_to_index.get(id).map(|index| index.index())
    }

    /// Edge endpoints as dense slot pairs with the spring strength
    /// multiplier, in load order. This is what the spring force consumes.
    pub fn edge_endpoints(&self) -> Vec<(usize, usize, f32)> {
        self.topology
            .edge_references()
            .map(|edge| {
                (
                    edge.source().index(),
                    edge.target().index(),
                    *edge.weight(),
                )
            })
            .collect()
    }

    /// Ids of nodes adjacent to the given node (either direction).
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.node_id_to_index
            .get(id)
            .map(|&index| {
                self.topology
                    .neighbors_undirected(index)
                    .filter_map(|n| self.topology.node_weight(n))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Dataset-level metadata, if any.
    pub fn metadata(&self) -> Option<&GraphMetadata> {
        self.metadata.as_ref()
    }
}

/// Owner of the current graph snapshot.
///
/// `load` replaces the snapshot wholesale; there is no incremental
/// mutation path.
pub struct GraphStore {
    snapshot: GraphSnapshot,
}

impl GraphStore {
    /// Create a store holding an empty graph.
    pub fn new() -> Self {
        Self {
            snapshot: GraphSnapshot::empty(),
        }
    }

    /// Replace the current graph with a validated snapshot of `data`.
    ///
    /// The new snapshot is fully built before the swap; on error the
    /// previous graph remains loaded.
    pub fn load(&mut self, data: GraphData) -> Result<(), GraphError> {
        let snapshot = GraphSnapshot::build(data)?;
        self.snapshot = snapshot;
        Ok(())
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
