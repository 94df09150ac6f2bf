//! Simulation bundle and control commands
//!
//! The registry and global force are plain values owned by whoever drives the
//! simulation; nothing here is global, so independent simulations can coexist.

use serde::{Deserialize, Serialize};

use super::emitter::{EmitterOp, TickStats};
use super::force::{ForceOp, GlobalForce};
use super::registry::{EmitterHandle, EmitterRegistry};
use super::tick::tick;
use crate::config::EmitterOverrides;

/// A control message, applied between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Command {
    /// Broadcast to every emitter
    All { op: EmitterOp },
    /// A single emitter
    One { handle: EmitterHandle, op: EmitterOp },
    Force { op: ForceOp },
    /// Defaults for emitters added afterwards
    Defaults { overrides: EmitterOverrides },
}

/// Registry + global force + tick counter
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Seed for reproducibility
    pub seed: u64,
    /// Simulated (unpaused-driver) tick counter
    pub time_ticks: u64,
    pub registry: EmitterRegistry,
    pub force: GlobalForce,
}

impl Simulation {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            time_ticks: 0,
            registry: EmitterRegistry::new(seed),
            force: GlobalForce::default(),
        }
    }

    /// Apply a control command; returns false if it named an unknown emitter
    pub fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::All { op } => self.registry.broadcast(*op),
            Command::One { handle, op } => match self.registry.get_mut(*handle) {
                Some(emitter) => emitter.apply(*op),
                None => {
                    log::warn!("Command for unknown emitter {:?}", handle);
                    return false;
                }
            },
            Command::Force { op } => self.force.apply(*op),
            Command::Defaults { overrides } => self.registry.set_default_parameters(overrides),
        }
        true
    }

    /// Advance every emitter by one tick
    pub fn step(&mut self, dt: f32) -> TickStats {
        self.time_ticks += 1;
        tick(&mut self.registry, &self.force, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::host::PointRegion;
    use glam::Vec3;

    #[test]
    fn test_commands_route() {
        let mut sim = Simulation::new(5);
        let overrides = EmitterOverrides {
            particle_count: Some(4),
            ..Default::default()
        };
        let a = sim.registry.add(&Vec3::ZERO, &PointRegion(Vec3::ZERO), &overrides);
        let b = sim.registry.add(&Vec3::ZERO, &PointRegion(Vec3::ZERO), &overrides);

        assert!(sim.apply(&Command::All { op: EmitterOp::Play }));
        assert!(sim.apply(&Command::One {
            handle: b,
            op: EmitterOp::Pause
        }));
        assert!(!sim.registry.get(a).unwrap().is_paused());
        assert!(sim.registry.get(b).unwrap().is_paused());

        assert!(sim.apply(&Command::Force { op: ForceOp::Activate }));
        assert!(sim.force.is_active());

        assert!(!sim.apply(&Command::One {
            handle: EmitterHandle(99),
            op: EmitterOp::Clear
        }));
    }

    #[test]
    fn test_step_counts_ticks() {
        let mut sim = Simulation::new(1);
        sim.step(0.1);
        sim.step(0.1);
        assert_eq!(sim.time_ticks, 2);
    }

    #[test]
    fn test_command_from_json() {
        let command: Command = serde_json::from_str(
            r#"{ "target": "all", "op": { "op": "set_jitter", "value": 0.25 } }"#,
        )
        .unwrap();
        assert_eq!(command, Command::All { op: EmitterOp::SetJitter(0.25) });

        let command: Command = serde_json::from_str(
            r#"{ "target": "defaults", "overrides": { "rate": 5.0 } }"#,
        )
        .unwrap();
        assert!(matches!(command, Command::Defaults { overrides } if overrides.rate == Some(5.0)));
    }
}
