//! Particles: the physics-facing projection of graph nodes.
//!
//! Exactly one particle exists per node. Particles are mutated only by
//! the engine's integration step, or by the embedding layer between
//! steps (pinning, drag repositioning).

use std::collections::HashMap;

use crate::graph::GraphSnapshot;
use crate::math::Vec3;

use super::config::PhysicsConfig;

/// Golden angle in radians, used to seed unpositioned nodes on a spiral
/// so identical datasets always produce identical layouts.
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Radial spacing between consecutive seeds on the spiral.
const SEED_SPACING: f32 = 30.0;

/// Physics state for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// The node this particle mirrors.
    pub id: String,

    /// Position in graph space.
    pub position: Vec3,

    /// Velocity.
    pub velocity: Vec3,

    /// Force accumulated during the current step. Cleared at the end of
    /// every step.
    pub force: Vec3,

    /// Mass, always > 0.
    pub mass: f32,

    /// When true the engine never updates position or velocity; only the
    /// embedding layer writes them (pinned or dragged nodes).
    pub fixed: bool,

    /// Layer assignment, immutable for the particle's lifetime.
    pub layer_index: i32,
}

impl Particle {
    /// Create an unpinned particle at rest.
    pub fn new(id: impl Into<String>, position: Vec3, mass: f32, layer_index: i32) -> Self {
        Self {
            id: id.into(),
            position,
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            mass,
            fixed: false,
            layer_index,
        }
    }

    /// Kinetic energy `½·m·|v|²`.
    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }
}

/// Derive one particle per node from a graph snapshot.
///
/// Declared initial positions and velocities are honored as-is. Nodes
/// without a position are seeded on a golden-angle spiral within their
/// layer's plane, with the z coordinate on the plane itself
/// (`layer_index × layer_spacing`). No randomness: the same dataset
/// always yields the same seeds.
pub fn derive_particles(snapshot: &GraphSnapshot, config: &PhysicsConfig) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(snapshot.node_count());
    let mut seeded_in_layer: HashMap<i32, u32> = HashMap::new();

    for node in snapshot.nodes() {
        let position = match node.position {
            Some(position) => position,
            None => {
                let k = seeded_in_layer.entry(node.layer_index).or_insert(0);
                let seed = spiral_seed(*k, node.layer_index, config.layer_spacing);
                *k += 1;
                seed
            }
        };

        let mut particle = Particle::new(
            node.id.clone(),
            position,
            node.weight.unwrap_or(1.0),
            node.layer_index,
        );
        particle.velocity = node.velocity.unwrap_or(Vec3::ZERO);
        particles.push(particle);
    }

    particles
}

/// The `k`-th seed position within a layer: a golden-angle spiral in the
/// x/y plane at the layer's z coordinate.
fn spiral_seed(k: u32, layer_index: i32, layer_spacing: f32) -> Vec3 {
    let k = k as f32;
    let radius = SEED_SPACING * k.sqrt();
    let angle = k * GOLDEN_ANGLE;
    Vec3::new(
        radius * angle.cos(),
        radius * angle.sin(),
        layer_index as f32 * layer_spacing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphData, GraphSnapshot, LayerData, NodeData};

    fn dataset() -> GraphData {
        let layer = |id: &str, index: i32| LayerData {
            id: id.into(),
            index,
            label: None,
            timestamp: None,
        };
        let node = |id: &str, layer_index: i32| NodeData {
            id: id.into(),
            label: id.into(),
            layer_index,
            weight: None,
            position: None,
            velocity: None,
            metadata: None,
        };

        let mut data = GraphData {
            metadata: None,
            layers: vec![layer("l0", 0), layer("l2", 2)],
            nodes: vec![node("a", 0), node("b", 0), node("c", 2)],
            edges: vec![],
        };
        data.nodes[1].weight = Some(4.0);
        data.nodes[2].position = Some(Vec3::new(7.0, 8.0, 9.0));
        data.nodes[2].velocity = Some(Vec3::new(0.1, 0.0, 0.0));
        data
    }

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot::build(dataset()).unwrap()
    }

    #[test]
    fn test_one_particle_per_node() {
        let snap = snapshot();
        let particles = derive_particles(&snap, &PhysicsConfig::default());

        assert_eq!(particles.len(), snap.node_count());
        for (slot, particle) in particles.iter().enumerate() {
            assert_eq!(snap.node_slot(&particle.id), Some(slot));
        }
    }

    #[test]
    fn test_seeded_particles_start_on_their_layer_plane() {
        let config = PhysicsConfig {
            layer_spacing: 100.0,
            ..Default::default()
        };
        let particles = derive_particles(&snapshot(), &config);

        // Nodes without a declared position sit exactly on their plane
        assert_eq!(particles[0].position.z, 0.0);
        assert_eq!(particles[1].position.z, 0.0);
        // First seed of a layer is the plane origin
        assert_eq!(particles[0].position, Vec3::new(0.0, 0.0, 0.0));
        // Second seed is offset within the plane
        assert_ne!(particles[1].position, particles[0].position);
    }

    #[test]
    fn test_declared_position_and_velocity_honored() {
        let particles = derive_particles(&snapshot(), &PhysicsConfig::default());

        assert_eq!(particles[2].position, Vec3::new(7.0, 8.0, 9.0));
        assert_eq!(particles[2].velocity, Vec3::new(0.1, 0.0, 0.0));
    }

    #[test]
    fn test_mass_from_weight() {
        let particles = derive_particles(&snapshot(), &PhysicsConfig::default());

        assert_eq!(particles[0].mass, 1.0);
        assert_eq!(particles[1].mass, 4.0);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let snap = snapshot();
        let config = PhysicsConfig::default();
        assert_eq!(
            derive_particles(&snap, &config),
            derive_particles(&snap, &config)
        );
    }

    #[test]
    fn test_new_particle_defaults() {
        let particle = Particle::new("n", Vec3::ZERO, 2.0, 3);
        assert!(!particle.fixed);
        assert_eq!(particle.velocity, Vec3::ZERO);
        assert_eq!(particle.force, Vec3::ZERO);
        assert_eq!(particle.layer_index, 3);
    }

    #[test]
    fn test_kinetic_energy() {
        let mut particle = Particle::new("n", Vec3::ZERO, 2.0, 0);
        particle.velocity = Vec3::new(3.0, 0.0, 4.0);
        assert_eq!(particle.kinetic_energy(), 25.0);
    }
}
