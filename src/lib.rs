//! DAG Viz - WASM Module
//!
//! This module provides the graph model and force-directed 3D layout
//! engine for the DAG Viz visualization library. It is compiled to
//! WebAssembly and exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `math`: 3-component vector arithmetic
//! - `graph`: layered DAG model (validated snapshots over petgraph)
//! - `physics`: particles, composable forces, and the simulation engine
//! - `spatial`: R-tree index for nearest-node picking
//!
//! Rendering, camera control, pointer handling, and dataset acquisition
//! live on the JS side; they consume this module through the API below
//! and hand it only already-parsed graph objects.

use wasm_bindgen::prelude::*;

pub mod graph;
pub mod math;
pub mod physics;
pub mod spatial;

use graph::{GraphData, GraphStore};
use physics::{Force, PhysicsConfig, Simulation, derive_particles};
use spatial::SpatialIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
fn console_log(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
fn console_log(_message: &str) {}

fn js_err(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// Main entry point for the layout engine.
///
/// Wraps the graph store, the simulation, and the spatial index behind
/// the public API exposed to JavaScript. All access is serialized by the
/// single-threaded JS host: `step()` never overlaps position reads or
/// drag writes.
#[wasm_bindgen]
pub struct DagVizWasm {
    store: GraphStore,
    simulation: Simulation,
    spatial: SpatialIndex,
}

#[wasm_bindgen]
impl DagVizWasm {
    /// Create an engine with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            store: GraphStore::new(),
            simulation: Simulation::default(),
            spatial: SpatialIndex::new(),
        }
    }

    /// Create an engine with an explicit configuration object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<DagVizWasm, JsError> {
        let config: PhysicsConfig = serde_wasm_bindgen::from_value(config).map_err(js_err)?;
        Ok(Self {
            store: GraphStore::new(),
            simulation: Simulation::new(config).map_err(js_err)?,
            spatial: SpatialIndex::new(),
        })
    }

    // =========================================================================
    // Dataset
    // =========================================================================

    /// Load a dataset, replacing the current graph wholesale.
    ///
    /// The dataset is validated in full before it takes effect; on error
    /// the previous graph and particle set remain untouched. On success
    /// the particle set is re-derived (resetting the iteration counter
    /// and convergence state) and the default force stack is registered:
    /// repulsion, edge springs, then layer anchoring.
    pub fn load(&mut self, graph: JsValue) -> Result<(), JsError> {
        let data: GraphData = serde_wasm_bindgen::from_value(graph).map_err(js_err)?;
        self.store.load(data).map_err(js_err)?;

        let snapshot = self.store.snapshot();
        let particles = derive_particles(snapshot, self.simulation.config());
        let spring = Force::spring_from_snapshot(snapshot);

        self.simulation.set_particles(particles).map_err(js_err)?;
        self.simulation.clear_forces();
        self.simulation.add_force(Force::Repulsion);
        self.simulation.add_force(spring);
        self.simulation.add_force(Force::LayerAnchor);

        self.spatial.clear();

        console_log(&format!(
            "dag-viz: loaded {} layers, {} nodes, {} edges",
            self.store.snapshot().layer_count(),
            self.store.snapshot().node_count(),
            self.store.snapshot().edge_count(),
        ));
        Ok(())
    }

    /// Number of nodes in the loaded graph.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.store.snapshot().node_count() as u32
    }

    /// Number of edges in the loaded graph.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.store.snapshot().edge_count() as u32
    }

    /// Number of layers in the loaded graph.
    #[wasm_bindgen(js_name = layerCount)]
    pub fn layer_count(&self) -> u32 {
        self.store.snapshot().layer_count() as u32
    }

    /// Layer indices, sorted ascending.
    #[wasm_bindgen(js_name = layerIndices)]
    pub fn layer_indices(&self) -> Vec<i32> {
        self.store.snapshot().layers().map(|l| l.index).collect()
    }

    /// Ids of the nodes in a layer.
    #[wasm_bindgen(js_name = nodesInLayer)]
    pub fn nodes_in_layer(&self, layer_index: i32) -> Vec<String> {
        self.store
            .snapshot()
            .nodes_in_layer(layer_index)
            .map(|n| n.id.clone())
            .collect()
    }

    /// Display label for a node.
    #[wasm_bindgen(js_name = getNodeLabel)]
    pub fn get_node_label(&self, node_id: &str) -> Option<String> {
        self.store.snapshot().get_node(node_id).map(|n| n.label.clone())
    }

    /// World-space z coordinate of a layer's plane.
    #[wasm_bindgen(js_name = getLayerZ)]
    pub fn get_layer_z(&self, layer_index: i32) -> f32 {
        layer_index as f32 * self.simulation.config().layer_spacing
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the simulation configuration.
    ///
    /// Validated here; an invalid object is rejected without touching the
    /// active configuration. Changes take effect on the next `step()`.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: PhysicsConfig = serde_wasm_bindgen::from_value(config).map_err(js_err)?;
        self.simulation.set_config(config).map_err(js_err)
    }

    /// The active configuration as a plain object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.simulation.config()).map_err(js_err)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation by one step.
    pub fn step(&mut self) {
        self.simulation.step();
    }

    /// Step until convergence. Returns the number of steps run.
    #[wasm_bindgen(js_name = runToConvergence)]
    pub fn run_to_convergence(&mut self) -> u32 {
        let steps = self.simulation.run_to_convergence();
        console_log(&format!(
            "dag-viz: converged after {} iterations",
            self.simulation.iteration()
        ));
        steps
    }

    /// True once the simulation has converged.
    #[wasm_bindgen(js_name = isConverged)]
    pub fn is_converged(&self) -> bool {
        self.simulation.is_converged()
    }

    /// Steps taken since the current particle set was loaded.
    #[wasm_bindgen(js_name = getIteration)]
    pub fn get_iteration(&self) -> u32 {
        self.simulation.iteration()
    }

    /// Total kinetic energy of the particle set.
    #[wasm_bindgen(js_name = kineticEnergy)]
    pub fn kinetic_energy(&self) -> f32 {
        self.simulation.kinetic_energy()
    }

    // =========================================================================
    // Particle Reads
    // =========================================================================

    /// Interleaved particle positions `[x0, y0, z0, x1, ...]` in dense
    /// slot order (the order of `nodeIds`).
    pub fn positions(&self) -> Vec<f32> {
        let particles = self.simulation.particles();
        let mut out = Vec::with_capacity(particles.len() * 3);
        for particle in particles {
            out.push(particle.position.x);
            out.push(particle.position.y);
            out.push(particle.position.z);
        }
        out
    }

    /// Node ids in dense slot order, parallel to `positions`.
    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<String> {
        self.simulation
            .particles()
            .iter()
            .map(|p| p.id.clone())
            .collect()
    }

    /// A node's current x position.
    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: &str) -> Option<f32> {
        self.particle_slot(node_id)
            .map(|slot| self.simulation.particles()[slot].position.x)
    }

    /// A node's current y position.
    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: &str) -> Option<f32> {
        self.particle_slot(node_id)
            .map(|slot| self.simulation.particles()[slot].position.y)
    }

    /// A node's current z position.
    #[wasm_bindgen(js_name = getNodeZ)]
    pub fn get_node_z(&self, node_id: &str) -> Option<f32> {
        self.particle_slot(node_id)
            .map(|slot| self.simulation.particles()[slot].position.z)
    }

    // =========================================================================
    // External Writes (between steps)
    // =========================================================================

    /// Pin a node: the engine stops moving it until it is unpinned.
    ///
    /// Returns true if the node exists.
    #[wasm_bindgen(js_name = pinNode)]
    pub fn pin_node(&mut self, node_id: &str) -> bool {
        match self.particle_slot(node_id) {
            Some(slot) => {
                self.simulation.particles_mut()[slot].fixed = true;
                true
            }
            None => false,
        }
    }

    /// Unpin a node.
    #[wasm_bindgen(js_name = unpinNode)]
    pub fn unpin_node(&mut self, node_id: &str) -> bool {
        match self.particle_slot(node_id) {
            Some(slot) => {
                self.simulation.particles_mut()[slot].fixed = false;
                true
            }
            None => false,
        }
    }

    /// Check if a node is pinned.
    #[wasm_bindgen(js_name = isNodePinned)]
    pub fn is_node_pinned(&self, node_id: &str) -> bool {
        self.particle_slot(node_id)
            .map(|slot| self.simulation.particles()[slot].fixed)
            .unwrap_or(false)
    }

    /// Write a node's position directly (drag interaction).
    ///
    /// Non-finite coordinates are refused. Returns true if the write
    /// happened.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: &str, x: f32, y: f32, z: f32) -> bool {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return false;
        }
        match self.particle_slot(node_id) {
            Some(slot) => {
                let particle = &mut self.simulation.particles_mut()[slot];
                particle.position = math::Vec3::new(x, y, z);
                particle.velocity = math::Vec3::ZERO;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Rebuild the spatial index from current particle positions.
    ///
    /// Call after stepping (or bulk position updates) and before a batch
    /// of nearest-node queries.
    #[wasm_bindgen(js_name = rebuildSpatialIndex)]
    pub fn rebuild_spatial_index(&mut self) {
        let points: Vec<(usize, [f32; 3])> = self
            .simulation
            .particles()
            .iter()
            .enumerate()
            .map(|(slot, p)| (slot, [p.position.x, p.position.y, p.position.z]))
            .collect();
        self.spatial.rebuild(&points);
    }

    /// Find the node nearest to a world-space point.
    #[wasm_bindgen(js_name = findNearestNode)]
    pub fn find_nearest_node(&self, x: f32, y: f32, z: f32) -> Option<String> {
        self.spatial
            .nearest([x, y, z])
            .map(|slot| self.simulation.particles()[slot].id.clone())
    }

    /// Find the nearest node within a maximum distance.
    #[wasm_bindgen(js_name = findNearestNodeWithin)]
    pub fn find_nearest_node_within(
        &self,
        x: f32,
        y: f32,
        z: f32,
        max_distance: f32,
    ) -> Option<String> {
        self.spatial
            .nearest_within([x, y, z], max_distance)
            .map(|slot| self.simulation.particles()[slot].id.clone())
    }

    // =========================================================================
    // Force Registration
    // =========================================================================

    /// Drop all registered forces.
    #[wasm_bindgen(js_name = clearForces)]
    pub fn clear_forces(&mut self) {
        self.simulation.clear_forces();
    }

    /// Register the within-layer repulsion force.
    #[wasm_bindgen(js_name = addRepulsionForce)]
    pub fn add_repulsion_force(&mut self) {
        self.simulation.add_force(Force::Repulsion);
    }

    /// Register the edge spring force built from the loaded graph.
    #[wasm_bindgen(js_name = addSpringForce)]
    pub fn add_spring_force(&mut self) {
        let spring = Force::spring_from_snapshot(self.store.snapshot());
        self.simulation.add_force(spring);
    }

    /// Register the layer anchoring force.
    #[wasm_bindgen(js_name = addLayerAnchorForce)]
    pub fn add_layer_anchor_force(&mut self) {
        self.simulation.add_force(Force::LayerAnchor);
    }
}

impl DagVizWasm {
    fn particle_slot(&self, node_id: &str) -> Option<usize> {
        self.store.snapshot().node_slot(node_id)
    }
}

impl Default for DagVizWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::graph::{LayerData, NodeData};
    use wasm_bindgen_test::wasm_bindgen_test;

    /// Round-trip a dataset through the JsValue boundary.
    #[wasm_bindgen_test]
    fn load_from_js_value_and_step() {
        let data = GraphData {
            metadata: None,
            layers: vec![LayerData {
                id: "l0".into(),
                index: 0,
                label: None,
                timestamp: None,
            }],
            nodes: vec![
                NodeData {
                    id: "a".into(),
                    label: "A".into(),
                    layer_index: 0,
                    weight: None,
                    position: None,
                    velocity: None,
                    metadata: None,
                },
                NodeData {
                    id: "b".into(),
                    label: "B".into(),
                    layer_index: 0,
                    weight: None,
                    position: None,
                    velocity: None,
                    metadata: None,
                },
            ],
            edges: vec![],
        };
        let js = serde_wasm_bindgen::to_value(&data).unwrap();

        let mut facade = DagVizWasm::new();
        assert!(facade.load(js).is_ok());
        assert_eq!(facade.node_count(), 2);

        facade.step();
        assert_eq!(facade.get_iteration(), 1);
        assert_eq!(facade.positions().len(), 6);
    }

    /// Invalid payloads surface as errors, not panics.
    #[wasm_bindgen_test]
    fn load_rejects_malformed_dataset() {
        let js = serde_wasm_bindgen::to_value(&GraphData {
            metadata: None,
            layers: vec![],
            nodes: vec![NodeData {
                id: "orphan".into(),
                label: "Orphan".into(),
                layer_index: 3,
                weight: None,
                position: None,
                velocity: None,
                metadata: None,
            }],
            edges: vec![],
        })
        .unwrap();

        let mut facade = DagVizWasm::new();
        assert!(facade.load(js).is_err());
        assert_eq!(facade.node_count(), 0);
    }
}
