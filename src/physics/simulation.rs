//! The simulation engine: particle set, ordered force list, and the
//! step/integrate/converge cycle.
//!
//! The engine is single-threaded and synchronous. One `step()` performs a
//! full force-application-and-integration pass and returns; the caller
//! drives the cadence (per animation frame, or in a tight loop via
//! `run_to_convergence`). Between steps the embedding layer may read
//! positions freely and write position/`fixed` on specific particles;
//! such access must never overlap a `step()` call.
//!
//! Integration is semi-implicit (symplectic) Euler: velocity is updated
//! from the current force before position is updated from the new
//! velocity, which is markedly more stable for spring systems than
//! explicit Euler.

use crate::math::Vec3;

use super::config::{ConfigError, PhysicsConfig};
use super::forces::Force;
use super::particle::Particle;

/// Lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    /// No particles loaded.
    Idle,
    /// Stepping moves particles.
    Running,
    /// Motion has stopped; `step()` is a no-op until the particle set is
    /// replaced.
    Converged,
}

/// Force-directed layout engine.
pub struct Simulation {
    config: PhysicsConfig,
    particles: Vec<Particle>,
    forces: Vec<Force>,
    iteration: u32,
    phase: SimulationPhase,
}

impl Default for Simulation {
    /// An idle engine with the default configuration.
    fn default() -> Self {
        Self {
            config: PhysicsConfig::default(),
            particles: Vec::new(),
            forces: Vec::new(),
            iteration: 0,
            phase: SimulationPhase::Idle,
        }
    }
}

impl Simulation {
    /// Create an idle engine with a validated configuration.
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Replace the configuration. Validated here, applied from the next
    /// `step()`.
    pub fn set_config(&mut self, config: PhysicsConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// The active configuration.
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replace the particle set.
    ///
    /// Resets the iteration counter and re-arms a converged engine.
    /// Particles with non-positive mass or non-finite state are rejected
    /// here so the integration loop never has to check.
    pub fn set_particles(&mut self, particles: Vec<Particle>) -> Result<(), ConfigError> {
        for particle in &particles {
            if !particle.mass.is_finite() || particle.mass <= 0.0 {
                return Err(ConfigError::InvalidMass {
                    id: particle.id.clone(),
                    mass: particle.mass,
                });
            }
            if !particle.position.is_finite() || !particle.velocity.is_finite() {
                return Err(ConfigError::NonFiniteParticle {
                    id: particle.id.clone(),
                });
            }
        }

        self.particles = particles;
        self.iteration = 0;
        self.phase = if self.particles.is_empty() {
            SimulationPhase::Idle
        } else if self.config.max_iterations == 0 {
            SimulationPhase::Converged
        } else {
            SimulationPhase::Running
        };
        Ok(())
    }

    /// Append a force to the ordered list. Does not affect the current
    /// phase.
    pub fn add_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    /// Drop all registered forces.
    pub fn clear_forces(&mut self) {
        self.forces.clear();
    }

    /// Advance the simulation by one step. No-op unless `Running`.
    ///
    /// Order within a step: every force is `reset()` in registration
    /// order, additive forces `apply()` in registration order, hard
    /// positional constraints `apply()` last, then integration.
    pub fn step(&mut self) {
        if self.phase != SimulationPhase::Running {
            return;
        }

        for force in &mut self.forces {
            force.reset();
        }

        let config = self.config;
        for force in &self.forces {
            if !force.is_constraint(&config) {
                force.apply(&mut self.particles, &config);
            }
        }
        for force in &self.forces {
            if force.is_constraint(&config) {
                force.apply(&mut self.particles, &config);
            }
        }

        self.integrate();
        self.iteration += 1;

        if self.iteration >= self.config.max_iterations {
            self.phase = SimulationPhase::Converged;
        } else if self.config.convergence_threshold > 0.0
            && self.kinetic_energy() < self.config.convergence_threshold
        {
            self.phase = SimulationPhase::Converged;
        }
    }

    /// Step until the engine converges. Returns the number of steps run.
    /// Bounded by `max_iterations`, so this always terminates.
    pub fn run_to_convergence(&mut self) -> u32 {
        let start = self.iteration;
        while self.phase == SimulationPhase::Running {
            self.step();
        }
        self.iteration - start
    }

    /// Semi-implicit Euler update. Fixed particles skip velocity and
    /// position updates entirely; every particle's force accumulator is
    /// cleared for the next step.
    fn integrate(&mut self) {
        let dt = self.config.time_step;
        let damping = self.config.damping_factor;

        for particle in &mut self.particles {
            if !particle.fixed {
                let acceleration = particle.force.scale(1.0 / particle.mass);
                particle.velocity += acceleration.scale(dt);
                particle.velocity = particle.velocity.scale(damping);
                particle.position += particle.velocity.scale(dt);
            }
            particle.force = Vec3::ZERO;
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// True once the engine has converged.
    pub fn is_converged(&self) -> bool {
        self.phase == SimulationPhase::Converged
    }

    /// Steps taken since the particle set was loaded.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Total kinetic energy `Σ ½·m·|v|²` over all particles.
    pub fn kinetic_energy(&self) -> f32 {
        self.particles
            .iter()
            .map(Particle::kinetic_energy)
            .sum()
    }

    /// Read access to the particle set.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Write access for between-step external writes (pinning, drag
    /// repositioning). Must not be used concurrently with `step()`.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::config::AnchorMode;
    use crate::physics::forces::SpringLink;
    use approx::assert_relative_eq;

    fn undamped_config() -> PhysicsConfig {
        PhysicsConfig {
            repulsion_strength: 10.0,
            repulsion_range: 5.0,
            spring_stiffness: 1.0,
            spring_rest_length: 1.0,
            anchor_strength: 0.5,
            anchor_mode: AnchorMode::Spring,
            layer_spacing: 100.0,
            damping_factor: 1.0,
            time_step: 1.0,
            max_iterations: 100,
            convergence_threshold: 0.0,
        }
    }

    fn particle_at(id: &str, position: Vec3, layer_index: i32) -> Particle {
        Particle::new(id, position, 1.0, layer_index)
    }

    #[test]
    fn test_new_engine_is_idle() {
        let sim = Simulation::new(undamped_config()).unwrap();
        assert_eq!(sim.phase(), SimulationPhase::Idle);
        assert_eq!(sim.iteration(), 0);
        assert!(!sim.is_converged());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = undamped_config();
        config.time_step = -1.0;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_step_is_noop_when_idle() {
        let mut sim = Simulation::new(undamped_config()).unwrap();
        sim.add_force(Force::Repulsion);
        sim.step();
        assert_eq!(sim.iteration(), 0);
        assert_eq!(sim.phase(), SimulationPhase::Idle);
    }

    #[test]
    fn test_set_particles_transitions_to_running() {
        let mut sim = Simulation::new(undamped_config()).unwrap();
        sim.set_particles(vec![particle_at("a", Vec3::ZERO, 0)])
            .unwrap();
        assert_eq!(sim.phase(), SimulationPhase::Running);
        assert_eq!(sim.iteration(), 0);
    }

    #[test]
    fn test_set_particles_rejects_bad_mass() {
        let mut sim = Simulation::new(undamped_config()).unwrap();
        let mut bad = particle_at("a", Vec3::ZERO, 0);
        bad.mass = 0.0;
        assert!(matches!(
            sim.set_particles(vec![bad]).unwrap_err(),
            ConfigError::InvalidMass { .. }
        ));
        // The engine stays idle after a rejected set
        assert_eq!(sim.phase(), SimulationPhase::Idle);
    }

    #[test]
    fn test_set_particles_rejects_non_finite_state() {
        let mut sim = Simulation::new(undamped_config()).unwrap();
        let mut bad = particle_at("a", Vec3::ZERO, 0);
        bad.velocity = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(matches!(
            sim.set_particles(vec![bad]).unwrap_err(),
            ConfigError::NonFiniteParticle { .. }
        ));
    }

    #[test]
    fn test_two_particles_separate_symmetrically() {
        // Scenario: same layer, 1 apart on x, repulsion 10 within range 5,
        // mass 1, dt 1, damping disabled
        let mut sim = Simulation::new(undamped_config()).unwrap();
        sim.add_force(Force::Repulsion);
        sim.set_particles(vec![
            particle_at("a", Vec3::new(0.0, 0.0, 0.0), 0),
            particle_at("b", Vec3::new(1.0, 0.0, 0.0), 0),
        ])
        .unwrap();

        sim.step();

        let particles = sim.particles();
        // Each receives |F| = 10/1² = 10, so displacement ±10 along x
        assert_relative_eq!(particles[0].position.x, -10.0);
        assert_relative_eq!(particles[1].position.x, 11.0);
        // Equal and opposite displacement, y and z untouched
        assert_relative_eq!(particles[0].position.x - 0.0, -(particles[1].position.x - 1.0));
        assert_eq!(particles[0].position.y, 0.0);
        assert_eq!(particles[1].position.z, 0.0);
        // Accumulators are cleared after the step
        assert_eq!(particles[0].force, Vec3::ZERO);
        assert_eq!(particles[1].force, Vec3::ZERO);
    }

    #[test]
    fn test_zero_max_iterations_converges_immediately() {
        let mut config = undamped_config();
        config.max_iterations = 0;

        let mut sim = Simulation::new(config).unwrap();
        sim.add_force(Force::Repulsion);
        sim.set_particles(vec![
            particle_at("a", Vec3::new(0.0, 0.0, 0.0), 0),
            particle_at("b", Vec3::new(1.0, 0.0, 0.0), 0),
        ])
        .unwrap();

        // Converged before the first step; stepping is a no-op
        assert!(sim.is_converged());
        sim.step();
        assert_eq!(sim.iteration(), 0);
        assert_eq!(sim.particles()[0].position, Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_converged_engine_is_a_fixed_point() {
        let mut config = undamped_config();
        config.max_iterations = 5;
        config.damping_factor = 0.5;

        let mut sim = Simulation::new(config).unwrap();
        sim.add_force(Force::Repulsion);
        sim.set_particles(vec![
            particle_at("a", Vec3::new(0.0, 0.0, 0.0), 0),
            particle_at("b", Vec3::new(1.0, 0.0, 0.0), 0),
        ])
        .unwrap();

        sim.run_to_convergence();
        assert!(sim.is_converged());
        assert_eq!(sim.iteration(), 5);

        let frozen: Vec<(Vec3, Vec3)> = sim
            .particles()
            .iter()
            .map(|p| (p.position, p.velocity))
            .collect();

        for _ in 0..10 {
            sim.step();
        }
        let after: Vec<(Vec3, Vec3)> = sim
            .particles()
            .iter()
            .map(|p| (p.position, p.velocity))
            .collect();
        assert_eq!(frozen, after);
        assert_eq!(sim.iteration(), 5);
    }

    #[test]
    fn test_set_particles_rearms_converged_engine() {
        let mut config = undamped_config();
        config.max_iterations = 1;

        let mut sim = Simulation::new(config).unwrap();
        sim.set_particles(vec![particle_at("a", Vec3::ZERO, 0)])
            .unwrap();
        sim.step();
        assert!(sim.is_converged());
        assert_eq!(sim.iteration(), 1);

        sim.set_particles(vec![particle_at("b", Vec3::ZERO, 0)])
            .unwrap();
        assert_eq!(sim.phase(), SimulationPhase::Running);
        assert_eq!(sim.iteration(), 0);
    }

    #[test]
    fn test_fixed_particle_never_moves() {
        let mut sim = Simulation::new(undamped_config()).unwrap();
        sim.add_force(Force::Repulsion);
        sim.add_force(Force::LayerAnchor);

        let mut pinned = particle_at("a", Vec3::new(0.5, 0.5, 33.0), 0);
        pinned.fixed = true;
        sim.set_particles(vec![
            pinned,
            particle_at("b", Vec3::new(1.0, 0.5, 33.0), 0),
        ])
        .unwrap();

        for _ in 0..20 {
            sim.step();
        }

        let particles = sim.particles();
        assert_eq!(particles[0].position, Vec3::new(0.5, 0.5, 33.0));
        // Its accumulator is still cleared every step
        assert_eq!(particles[0].force, Vec3::ZERO);
        // The free particle did move
        assert_ne!(particles[1].position, Vec3::new(1.0, 0.5, 33.0));
    }

    #[test]
    fn test_hard_lock_holds_plane_exactly_under_cross_layer_springs() {
        // Scenario: HARD_LOCK, spacing 100, layer 2 → z stays exactly 200
        // even though a spring to another layer pulls on z every step.
        let mut config = undamped_config();
        config.anchor_mode = AnchorMode::HardLock;
        config.max_iterations = 50;

        let mut sim = Simulation::new(config).unwrap();
        sim.add_force(Force::Spring {
            links: vec![SpringLink {
                source: 0,
                target: 1,
                strength: 1.0,
            }],
        });
        // Constraint registered after the additive forces
        sim.add_force(Force::LayerAnchor);

        sim.set_particles(vec![
            particle_at("anchored", Vec3::new(10.0, -3.0, 150.0), 2),
            particle_at("other", Vec3::new(0.0, 0.0, 0.0), 0),
        ])
        .unwrap();

        for _ in 0..10 {
            sim.step();
            assert_eq!(sim.particles()[0].position.z, 200.0);
        }
    }

    #[test]
    fn test_hard_lock_holds_even_when_registered_first() {
        // Registration order must not defeat the constraint-last contract
        let mut config = undamped_config();
        config.anchor_mode = AnchorMode::HardLock;

        let mut sim = Simulation::new(config).unwrap();
        sim.add_force(Force::LayerAnchor);
        sim.add_force(Force::Spring {
            links: vec![SpringLink {
                source: 0,
                target: 1,
                strength: 1.0,
            }],
        });

        sim.set_particles(vec![
            particle_at("anchored", Vec3::new(0.0, 0.0, 0.0), 2),
            particle_at("other", Vec3::new(0.0, 0.0, 500.0), 0),
        ])
        .unwrap();

        sim.step();
        assert_eq!(sim.particles()[0].position.z, 200.0);
    }

    #[test]
    fn test_spring_anchor_settles_toward_plane() {
        let mut config = undamped_config();
        config.anchor_mode = AnchorMode::Spring;
        config.damping_factor = 0.5;
        config.max_iterations = 200;

        let mut sim = Simulation::new(config).unwrap();
        sim.add_force(Force::LayerAnchor);
        sim.set_particles(vec![particle_at("a", Vec3::new(0.0, 0.0, 40.0), 1)])
            .unwrap();

        sim.run_to_convergence();

        // Settled near z = 100, far closer than it started
        let z = sim.particles()[0].position.z;
        assert!((z - 100.0).abs() < 1.0, "z = {z} should settle near 100");
    }

    #[test]
    fn test_energy_threshold_converges_early() {
        let mut config = undamped_config();
        config.damping_factor = 0.1;
        config.max_iterations = 10_000;
        config.convergence_threshold = 1e-6;

        let mut sim = Simulation::new(config).unwrap();
        sim.add_force(Force::Repulsion);
        sim.set_particles(vec![
            particle_at("a", Vec3::new(0.0, 0.0, 0.0), 0),
            particle_at("b", Vec3::new(1.0, 0.0, 0.0), 0),
        ])
        .unwrap();

        let steps = sim.run_to_convergence();
        assert!(sim.is_converged());
        assert!(
            steps < 10_000,
            "heavy damping should converge well before the cap, took {steps}"
        );
        assert!(sim.kinetic_energy() < 1e-6);
    }

    #[test]
    fn test_config_change_applies_next_step() {
        let mut sim = Simulation::new(undamped_config()).unwrap();
        sim.add_force(Force::Repulsion);
        sim.set_particles(vec![
            particle_at("a", Vec3::new(0.0, 0.0, 0.0), 0),
            particle_at("b", Vec3::new(1.0, 0.0, 0.0), 0),
        ])
        .unwrap();

        let mut stronger = undamped_config();
        stronger.repulsion_strength = 20.0;
        sim.set_config(stronger).unwrap();

        sim.step();
        // The doubled strength acted on this step: |displacement| = 20
        assert_relative_eq!(sim.particles()[0].position.x, -20.0);
    }

    #[test]
    fn test_external_write_between_steps() {
        let mut sim = Simulation::new(undamped_config()).unwrap();
        sim.add_force(Force::Repulsion);
        sim.set_particles(vec![
            particle_at("a", Vec3::new(0.0, 0.0, 0.0), 0),
            particle_at("b", Vec3::new(200.0, 0.0, 0.0), 0),
        ])
        .unwrap();
        sim.step();

        // Drag: pin and reposition between steps
        {
            let particles = sim.particles_mut();
            particles[0].fixed = true;
            particles[0].position = Vec3::new(-5.0, 0.0, 0.0);
        }
        sim.step();

        assert_eq!(sim.particles()[0].position, Vec3::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn test_kinetic_energy_sums_particles() {
        let mut sim = Simulation::new(undamped_config()).unwrap();
        let mut a = particle_at("a", Vec3::ZERO, 0);
        a.velocity = Vec3::new(2.0, 0.0, 0.0);
        let mut b = particle_at("b", Vec3::ZERO, 0);
        b.mass = 3.0;
        b.velocity = Vec3::new(0.0, 2.0, 0.0);
        sim.set_particles(vec![a, b]).unwrap();

        // ½·1·4 + ½·3·4 = 8
        assert_relative_eq!(sim.kinetic_energy(), 8.0);
    }
}
