//! Simulation tunables and their validation.
//!
//! Every configuration value is validated at the boundary where it is
//! set (`Simulation::new`, `set_config`, `set_particles`). The per-step
//! loop assumes a valid config and performs no checks of its own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How particles are attracted to their layer plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorMode {
    /// Positional constraint: the anchored axis is overwritten with the
    /// layer plane coordinate every step. Runs after all additive forces.
    HardLock,
    /// Soft spring toward the layer plane, settled by damping and
    /// integration over many steps.
    Spring,
}

/// Named tunables for the force simulation.
///
/// Plain numeric values only; behavior lives in the forces and the
/// engine. A changed value takes effect on the next `step()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicsConfig {
    /// Inverse-square repulsion strength between same-layer particles.
    pub repulsion_strength: f32,

    /// Maximum distance at which repulsion applies.
    pub repulsion_range: f32,

    /// Hooke's-law stiffness for edge springs.
    pub spring_stiffness: f32,

    /// Rest length for edge springs.
    pub spring_rest_length: f32,

    /// Pull strength toward the layer plane in `Spring` anchor mode.
    pub anchor_strength: f32,

    /// Anchoring strategy. One mode per simulation instance.
    pub anchor_mode: AnchorMode,

    /// Distance between adjacent layer planes along the z axis.
    pub layer_spacing: f32,

    /// Per-step velocity multiplier in (0, 1]. 1.0 disables damping.
    pub damping_factor: f32,

    /// Integration time step.
    pub time_step: f32,

    /// Iteration count at which the simulation converges.
    pub max_iterations: u32,

    /// Kinetic-energy floor for early convergence. 0.0 disables the
    /// energy check and leaves only the iteration cap.
    pub convergence_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            repulsion_strength: 60.0,
            repulsion_range: 150.0,
            spring_stiffness: 0.3,
            spring_rest_length: 60.0,
            anchor_strength: 0.5,
            anchor_mode: AnchorMode::HardLock,
            layer_spacing: 120.0,
            damping_factor: 0.6,
            time_step: 1.0,
            max_iterations: 300,
            convergence_threshold: 0.0,
        }
    }
}

impl PhysicsConfig {
    /// Check every tunable for finiteness and domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("repulsionStrength", self.repulsion_strength),
            ("repulsionRange", self.repulsion_range),
            ("springStiffness", self.spring_stiffness),
            ("springRestLength", self.spring_rest_length),
            ("anchorStrength", self.anchor_strength),
            ("layerSpacing", self.layer_spacing),
            ("dampingFactor", self.damping_factor),
            ("timeStep", self.time_step),
            ("convergenceThreshold", self.convergence_threshold),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        if self.repulsion_range < 0.0 {
            return Err(ConfigError::OutOfDomain {
                field: "repulsionRange",
                requirement: ">= 0",
                value: self.repulsion_range,
            });
        }
        if self.spring_rest_length < 0.0 {
            return Err(ConfigError::OutOfDomain {
                field: "springRestLength",
                requirement: ">= 0",
                value: self.spring_rest_length,
            });
        }
        if self.time_step <= 0.0 {
            return Err(ConfigError::OutOfDomain {
                field: "timeStep",
                requirement: "> 0",
                value: self.time_step,
            });
        }
        if self.damping_factor <= 0.0 || self.damping_factor > 1.0 {
            return Err(ConfigError::OutOfDomain {
                field: "dampingFactor",
                requirement: "in (0, 1]",
                value: self.damping_factor,
            });
        }
        if self.convergence_threshold < 0.0 {
            return Err(ConfigError::OutOfDomain {
                field: "convergenceThreshold",
                requirement: ">= 0",
                value: self.convergence_threshold,
            });
        }

        Ok(())
    }
}

/// Reasons a configuration or particle set is rejected at set time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A tunable is NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    /// A tunable is outside its valid domain.
    #[error("{field} must be {requirement}, got {value}")]
    OutOfDomain {
        field: &'static str,
        requirement: &'static str,
        value: f32,
    },

    /// A particle's mass would divide by zero (or flip sign) in
    /// integration.
    #[error("particle '{id}' has invalid mass {mass} (must be finite and > 0)")]
    InvalidMass { id: String, mass: f32 },

    /// A particle carries non-finite position or velocity.
    #[error("particle '{id}' has non-finite position or velocity")]
    NonFiniteParticle { id: String },
}
