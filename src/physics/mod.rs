//! Force-directed physics for layered DAG layout.
//!
//! A particle set (one particle per graph node) is driven by an ordered
//! list of composable forces: within-layer repulsion, layer-plane
//! anchoring, and edge springs, with damping applied by the integrator.
//! The engine steps synchronously until the iteration cap or an optional
//! kinetic-energy threshold declares convergence.

mod config;
mod forces;
mod particle;
mod simulation;

pub use config::{AnchorMode, ConfigError, PhysicsConfig};
pub use forces::{Force, MIN_DISTANCE, SpringLink};
pub use particle::{Particle, derive_particles};
pub use simulation::{Simulation, SimulationPhase};
