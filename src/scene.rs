//! Scene descriptions for the headless driver
//!
//! A scene lists emitters (anchor + spawn region + config overrides), the
//! initial global force, and control commands scheduled on specific frames.

use std::path::Path;

use glam::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::{EmitterOverrides, Rgb};
use crate::consts::{MAX_SCENE_DT, SIM_DT};
use crate::error::SceneError;
use crate::sim::{
    BoxRegion, Command, EmitterOp, ForceOp, GlobalForce, PointRegion, Simulation, SpawnRegion,
    SphereRegion, TriangleMeshRegion,
};

/// Serializable choice of spawn region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionSpec {
    Point { at: Vec3 },
    Box { min: Vec3, max: Vec3 },
    Sphere { center: Vec3, radius: f32 },
    Mesh { vertices: Vec<Vec3>, indices: Vec<u32> },
}

impl SpawnRegion for RegionSpec {
    fn sample_points(&self, count: usize, rng: &mut dyn RngCore) -> Vec<Vec3> {
        match self {
            RegionSpec::Point { at } => PointRegion(*at).sample_points(count, rng),
            RegionSpec::Box { min, max } => BoxRegion {
                min: *min,
                max: *max,
            }
            .sample_points(count, rng),
            RegionSpec::Sphere { center, radius } => SphereRegion {
                center: *center,
                radius: *radius,
            }
            .sample_points(count, rng),
            RegionSpec::Mesh { vertices, indices } => {
                TriangleMeshRegion::new(vertices.clone(), indices.clone())
                    .sample_points(count, rng)
            }
        }
    }
}

/// One emitter to attach at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterSpec {
    /// Host world position
    pub anchor: Vec3,
    pub region: RegionSpec,
    #[serde(default)]
    pub config: EmitterOverrides,
}

/// A command applied just before the given frame is simulated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    pub frame: u32,
    pub command: Command,
}

/// Complete driver input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub seed: u64,
    /// Number of frames to simulate
    pub frames: u32,
    /// Seconds per frame
    pub dt: f32,
    /// Registry defaults, applied before any emitter is added
    pub defaults: EmitterOverrides,
    pub force: GlobalForce,
    pub emitters: Vec<EmitterSpec>,
    pub commands: Vec<ScheduledCommand>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            seed: 0,
            frames: 600,
            dt: SIM_DT,
            defaults: EmitterOverrides::default(),
            force: GlobalForce::default(),
            emitters: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let scene: Scene = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let scene = Self::from_json(&json)?;
        log::info!(
            "Loaded scene {}: {} emitters, {} frames",
            path.as_ref().display(),
            scene.emitters.len(),
            scene.frames
        );
        Ok(scene)
    }

    fn validate(&self) -> Result<(), SceneError> {
        if !(self.dt > 0.0 && self.dt <= MAX_SCENE_DT) {
            return Err(SceneError::Invalid(format!(
                "dt must be in (0, {}] seconds, got {}",
                MAX_SCENE_DT, self.dt
            )));
        }
        for (i, spec) in self.emitters.iter().enumerate() {
            if let RegionSpec::Mesh { vertices, indices } = &spec.region {
                if indices.len() % 3 != 0 {
                    return Err(SceneError::Invalid(format!(
                        "emitter {}: mesh index count {} is not a multiple of 3",
                        i,
                        indices.len()
                    )));
                }
                if let Some(bad) = indices.iter().find(|&&idx| idx as usize >= vertices.len()) {
                    return Err(SceneError::Invalid(format!(
                        "emitter {}: mesh index {} out of range ({} vertices)",
                        i,
                        bad,
                        vertices.len()
                    )));
                }
            }
            if let RegionSpec::Sphere { radius, .. } = spec.region {
                if radius < 0.0 {
                    return Err(SceneError::Invalid(format!(
                        "emitter {}: sphere radius {} is negative",
                        i, radius
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build the simulation: defaults, force, then emitters in listed order
    pub fn build(&self) -> Simulation {
        let mut sim = Simulation::new(self.seed);
        sim.force = self.force;
        sim.registry.set_default_parameters(&self.defaults);
        for spec in &self.emitters {
            sim.registry.add(&spec.anchor, &spec.region, &spec.config);
        }
        sim
    }

    /// Commands scheduled for `frame`, in listed order
    pub fn commands_at(&self, frame: u32) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(move |c| c.frame == frame)
            .map(|c| &c.command)
    }

    /// Built-in scene: a fountain, a smoke column and a sparkler, with gravity
    /// switched on part-way through
    pub fn demo() -> Self {
        let running = EmitterOverrides {
            paused: Some(false),
            particle_count: Some(1500),
            ..Default::default()
        };
        Self {
            seed: 2012,
            frames: 600,
            force: GlobalForce::new(Vec3::new(0.0, -0.002, 0.0), false),
            defaults: running,
            emitters: vec![
                EmitterSpec {
                    anchor: Vec3::new(-3.0, 0.0, 0.0),
                    region: RegionSpec::Point { at: Vec3::ZERO },
                    config: EmitterOverrides {
                        rate: Some(200.0),
                        angle: Some(0.25),
                        force_min: Some(0.08),
                        force_range: Some(0.02),
                        lifetime_min: Some(60),
                        color: Some(Rgb::from_hex(0x66CCFF)),
                        ..Default::default()
                    },
                },
                EmitterSpec {
                    anchor: Vec3::ZERO,
                    region: RegionSpec::Sphere {
                        center: Vec3::ZERO,
                        radius: 0.5,
                    },
                    config: EmitterOverrides {
                        rate: Some(60.0),
                        force_min: Some(0.01),
                        waviness: Some(0.004),
                        lifetime_min: Some(90),
                        lifetime_range: Some(40),
                        color: Some(Rgb::from_hex(0x888888)),
                        ..Default::default()
                    },
                },
                EmitterSpec {
                    anchor: Vec3::new(3.0, 0.0, 0.0),
                    region: RegionSpec::Box {
                        min: Vec3::splat(-0.1),
                        max: Vec3::splat(0.1),
                    },
                    config: EmitterOverrides {
                        rate: Some(400.0),
                        angle: Some(std::f32::consts::PI),
                        force_min: Some(0.03),
                        jitter: Some(0.02),
                        random: Some(0.01),
                        lifetime_min: Some(8),
                        lifetime_range: Some(12),
                        color: Some(Rgb::from_hex(0xFFAA33)),
                        ..Default::default()
                    },
                },
            ],
            commands: vec![
                ScheduledCommand {
                    frame: 200,
                    command: Command::Force {
                        op: ForceOp::Activate,
                    },
                },
                ScheduledCommand {
                    frame: 400,
                    command: Command::All {
                        op: EmitterOp::SetRate(30.0),
                    },
                },
                ScheduledCommand {
                    frame: 500,
                    command: Command::All {
                        op: EmitterOp::Clear,
                    },
                },
            ],
            ..Default::default()
        }
    }
}
