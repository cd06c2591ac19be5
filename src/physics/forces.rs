//! Force variants for the layout simulation.
//!
//! A force is one unit of per-step physics: `apply` accumulates into
//! particle force accumulators (or applies a positional constraint) and
//! `reset` clears per-step internal state. The variant set is closed and
//! small, so dispatch is a plain `match` rather than a trait object.
//!
//! Tunables are read from the shared [`PhysicsConfig`] at apply time;
//! changing a value between steps needs no force re-registration.
//!
//! Ordering contract: additive forces (repulsion, springs, soft anchor)
//! accumulate first, hard positional constraints run last in a step.
//! The engine enforces this via [`Force::is_constraint`].

use crate::graph::GraphSnapshot;
use crate::math::Vec3;

use super::config::{AnchorMode, PhysicsConfig};
use super::particle::Particle;

/// Distance floor below which pairwise interactions are skipped,
/// guarding the inverse-square and normalize paths against
/// near-coincident positions.
pub const MIN_DISTANCE: f32 = 0.01;

/// One spring between two particle slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringLink {
    /// Dense slot of the source particle.
    pub source: usize,
    /// Dense slot of the target particle.
    pub target: usize,
    /// Per-edge strength multiplier on top of the configured stiffness.
    pub strength: f32,
}

/// A registered force.
#[derive(Debug, Clone, PartialEq)]
pub enum Force {
    /// Inverse-square repulsion between particles sharing a layer.
    Repulsion,

    /// Attraction of each particle to its layer plane. Behaves as a hard
    /// positional constraint or a soft spring depending on
    /// `config.anchor_mode`.
    LayerAnchor,

    /// Hooke's-law springs along graph edges.
    Spring { links: Vec<SpringLink> },
}

impl Force {
    /// Build the spring force from a graph snapshot's edges.
    pub fn spring_from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let links = snapshot
            .edge_endpoints()
            .into_iter()
            .map(|(source, target, strength)| SpringLink {
                source,
                target,
                strength,
            })
            .collect();
        Force::Spring { links }
    }

    /// Accumulate this force into the particles.
    pub fn apply(&self, particles: &mut [Particle], config: &PhysicsConfig) {
        match self {
            Force::Repulsion => apply_repulsion(particles, config),
            Force::LayerAnchor => apply_layer_anchor(particles, config),
            Force::Spring { links } => apply_springs(links, particles, config),
        }
    }

    /// Clear per-step internal state. None of the current variants carry
    /// any, but the engine calls this every step as part of the force
    /// contract.
    pub fn reset(&mut self) {}

    /// True when this force is a hard positional constraint under the
    /// given config, and must therefore run after all additive forces.
    pub fn is_constraint(&self, config: &PhysicsConfig) -> bool {
        matches!(self, Force::LayerAnchor) && config.anchor_mode == AnchorMode::HardLock
    }
}

/// Inverse-square repulsion between every unordered pair of particles in
/// the same layer. Cross-layer pairs never interact. Pairs beyond
/// `repulsion_range` or below [`MIN_DISTANCE`] are skipped; the applied
/// forces are equal and opposite.
fn apply_repulsion(particles: &mut [Particle], config: &PhysicsConfig) {
    let range_sq = config.repulsion_range * config.repulsion_range;
    let floor_sq = MIN_DISTANCE * MIN_DISTANCE;

    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            if particles[i].layer_index != particles[j].layer_index {
                continue;
            }

            let p1 = particles[i].position;
            let p2 = particles[j].position;
            let dist_sq = Vec3::distance_squared(p1, p2);
            if dist_sq > range_sq || dist_sq < floor_sq {
                continue;
            }

            let distance = dist_sq.sqrt();
            let direction = (p1 - p2).scale(1.0 / distance);
            let force = direction.scale(config.repulsion_strength / dist_sq);

            particles[i].force += force;
            particles[j].force -= force;
        }
    }
}

/// Pull each particle toward `z = layer_index × layer_spacing`.
///
/// `HardLock` overwrites the z position and zeroes the z velocity and
/// accumulated z force; since the engine runs constraints after all
/// additive forces, integration cannot move the particle off its plane
/// within the step. Fixed particles are left alone. `Spring` simply
/// accumulates a proportional restoring force.
fn apply_layer_anchor(particles: &mut [Particle], config: &PhysicsConfig) {
    match config.anchor_mode {
        AnchorMode::HardLock => {
            for particle in particles.iter_mut() {
                if particle.fixed {
                    continue;
                }
                particle.position.z = particle.layer_index as f32 * config.layer_spacing;
                particle.velocity.z = 0.0;
                particle.force.z = 0.0;
            }
        }
        AnchorMode::Spring => {
            for particle in particles.iter_mut() {
                let target = particle.layer_index as f32 * config.layer_spacing;
                particle.force.z += config.anchor_strength * (target - particle.position.z);
            }
        }
    }
}

/// Hooke's law along every link: stretched springs pull the endpoints
/// together, compressed springs push them apart, equal and opposite.
fn apply_springs(links: &[SpringLink], particles: &mut [Particle], config: &PhysicsConfig) {
    for link in links {
        let delta = particles[link.target].position - particles[link.source].position;
        let distance = delta.magnitude();
        if distance < MIN_DISTANCE {
            continue;
        }

        let direction = delta.scale(1.0 / distance);
        let magnitude =
            config.spring_stiffness * link.strength * (distance - config.spring_rest_length);
        let force = direction.scale(magnitude);

        particles[link.source].force += force;
        particles[link.target].force -= force;
    }
}
