//! Global force field shared by every emitter
//!
//! Read by each emitter's aging step; only mutated between ticks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_GLOBAL_FORCE;

/// Control operations on the global force
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum ForceOp {
    Set(Vec3),
    Add(Vec3),
    Remove(Vec3),
    Activate,
    Deactivate,
    Toggle,
}

/// A single acceleration vector (units per tick²) with an enable flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalForce {
    vector: Vec3,
    active: bool,
}

impl Default for GlobalForce {
    fn default() -> Self {
        Self {
            vector: DEFAULT_GLOBAL_FORCE,
            active: false,
        }
    }
}

impl GlobalForce {
    pub fn new(vector: Vec3, active: bool) -> Self {
        Self { vector, active }
    }

    pub fn vector(&self) -> Vec3 {
        self.vector
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Contribution to a particle's velocity this tick
    #[inline]
    pub fn acceleration(&self) -> Option<Vec3> {
        self.active.then_some(self.vector)
    }

    pub fn set(&mut self, vector: Vec3) {
        self.vector = vector;
    }

    pub fn add(&mut self, vector: Vec3) {
        self.vector += vector;
    }

    pub fn remove(&mut self, vector: Vec3) {
        self.vector -= vector;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    pub fn apply(&mut self, op: ForceOp) {
        match op {
            ForceOp::Set(v) => self.set(v),
            ForceOp::Add(v) => self.add(v),
            ForceOp::Remove(v) => self.remove(v),
            ForceOp::Activate => self.activate(),
            ForceOp::Deactivate => self.deactivate(),
            ForceOp::Toggle => self.toggle(),
        }
        log::debug!(
            "Global force {:?}: vector {:?}, active {}",
            op,
            self.vector,
            self.active
        );
    }
}
