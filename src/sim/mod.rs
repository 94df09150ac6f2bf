//! Deterministic emitter simulation
//!
//! Everything that advances particle state lives here:
//! - Seeded RNG only (one stream per emitter)
//! - Stable iteration order (by emitter handle, then activation order)
//! - No allocation during a tick
//! - No rendering or platform dependencies

pub mod buffers;
pub mod emitter;
pub mod force;
pub mod host;
pub mod particle;
pub mod registry;
pub mod state;
pub mod tick;
pub mod vector;
pub mod velocity;

pub use buffers::ParticleBuffers;
pub use emitter::{Emitter, EmitterOp, TickStats};
pub use force::{ForceOp, GlobalForce};
pub use host::{Anchor, BoxRegion, PointRegion, SpawnRegion, SphereRegion, TriangleMeshRegion};
pub use particle::Particle;
pub use registry::{EmitterHandle, EmitterRegistry};
pub use state::{Command, Simulation};
pub use tick::{FrameClock, tick};
pub use vector::perpendicular_direction;
pub use velocity::Cone;
