//! Per-slot particle kinematics
//!
//! Position and color live in the emitter's render buffers so the renderer
//! can upload them directly; everything else about a particle lives here.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Kinematic state of one pool slot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Particle {
    /// Ticks since spawn (0 on the spawn tick)
    pub age: u32,
    /// The particle is removed on the tick `age` first exceeds this
    pub life_expectancy: u32,
    /// Current velocity (units per tick)
    pub velocity: Vec3,
    /// Velocity at spawn; reference axis for waviness, never mutated while active
    pub starting_velocity: Vec3,
}

impl Particle {
    /// A freshly spawned particle
    pub fn spawned(velocity: Vec3, life_expectancy: u32) -> Self {
        Self {
            age: 0,
            life_expectancy,
            velocity,
            starting_velocity: velocity,
        }
    }

    /// Advance age by one tick; returns true if the particle has now expired
    #[inline]
    pub fn grow_older(&mut self) -> bool {
        self.age = self.age.saturating_add(1);
        self.age > self.life_expectancy
    }
}
