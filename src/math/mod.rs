//! Vector math for the 3D layout simulation.
//!
//! This module provides the `Vec3` type used for particle positions,
//! velocities, and force accumulators. All operations are pure and
//! allocation-free.

mod vec3;

pub use vec3::Vec3;
