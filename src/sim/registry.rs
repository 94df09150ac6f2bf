//! Ordered collection of emitters with registry-wide controls
//!
//! Emitters are kept sorted by handle, which is also registration order, so
//! broadcasts and ticks always visit them in the same sequence.

use serde::{Deserialize, Serialize};

use super::emitter::{Emitter, EmitterOp, TickStats};
use super::force::GlobalForce;
use super::host::{Anchor, SpawnRegion};
use crate::config::{EmitterConfig, EmitterOverrides};

/// Stable identifier of a registered emitter; never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmitterHandle(pub u32);

/// All emitters of one simulation
#[derive(Debug, Clone)]
pub struct EmitterRegistry {
    /// Sorted by handle
    emitters: Vec<(EmitterHandle, Emitter)>,
    /// Base configuration for emitters created from now on
    defaults: EmitterConfig,
    seed: u64,
    next_id: u32,
}

impl Default for EmitterRegistry {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EmitterRegistry {
    /// Empty registry; per-emitter RNG seeds derive from `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            emitters: Vec::new(),
            defaults: EmitterConfig::default(),
            seed,
            next_id: 1,
        }
    }

    /// Allocate a new handle
    fn next_handle(&mut self) -> EmitterHandle {
        let id = self.next_id;
        self.next_id += 1;
        EmitterHandle(id)
    }

    fn emitter_seed(&self, handle: EmitterHandle) -> u64 {
        // Spread ids so neighbouring emitters get unrelated streams
        self.seed ^ (handle.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    /// Attach a new emitter; `overrides` are merged over the current defaults
    pub fn add(
        &mut self,
        anchor: &dyn Anchor,
        region: &dyn SpawnRegion,
        overrides: &EmitterOverrides,
    ) -> EmitterHandle {
        let handle = self.next_handle();
        let config = overrides.merged_over(&self.defaults);
        let emitter = Emitter::new(anchor, region, config, self.emitter_seed(handle));
        self.emitters.push((handle, emitter));
        log::info!(
            "Added emitter {:?} ({} registered)",
            handle,
            self.emitters.len()
        );
        handle
    }

    /// Detach an emitter, handing it back to the caller
    pub fn remove(&mut self, handle: EmitterHandle) -> Option<Emitter> {
        let index = self.index_of(handle)?;
        let (_, emitter) = self.emitters.remove(index);
        log::info!(
            "Removed emitter {:?} ({} registered)",
            handle,
            self.emitters.len()
        );
        Some(emitter)
    }

    /// Change the defaults for emitters added later; existing emitters keep their config
    pub fn set_default_parameters(&mut self, overrides: &EmitterOverrides) {
        self.defaults = overrides.merged_over(&self.defaults);
        log::info!("Emitter defaults updated: {:?}", overrides);
    }

    pub fn defaults(&self) -> &EmitterConfig {
        &self.defaults
    }

    fn index_of(&self, handle: EmitterHandle) -> Option<usize> {
        self.emitters.binary_search_by_key(&handle, |(h, _)| *h).ok()
    }

    pub fn get(&self, handle: EmitterHandle) -> Option<&Emitter> {
        let index = self.index_of(handle)?;
        Some(&self.emitters[index].1)
    }

    pub fn get_mut(&mut self, handle: EmitterHandle) -> Option<&mut Emitter> {
        let index = self.index_of(handle)?;
        Some(&mut self.emitters[index].1)
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = EmitterHandle> + '_ {
        self.emitters.iter().map(|(h, _)| *h)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmitterHandle, &Emitter)> {
        self.emitters.iter().map(|(h, e)| (*h, e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EmitterHandle, &mut Emitter)> {
        self.emitters.iter_mut().map(|(h, e)| (*h, e))
    }

    /// Apply `op` to every emitter in registration order
    pub fn broadcast(&mut self, op: EmitterOp) {
        log::debug!("Broadcast {:?} to {} emitters", op, self.emitters.len());
        for (_, emitter) in &mut self.emitters {
            emitter.apply(op);
        }
    }

    /// Collect a value from every emitter in registration order
    pub fn map<R>(&self, f: impl FnMut(&Emitter) -> R) -> Vec<R> {
        self.emitters.iter().map(|(_, e)| e).map(f).collect()
    }

    /// Age every emitter once; returns the combined stats
    pub fn age_all(&mut self, force: &GlobalForce, dt: f32) -> TickStats {
        let mut total = TickStats::default();
        for (_, emitter) in &mut self.emitters {
            total += emitter.age(force, dt);
        }
        total
    }

    /// Particles alive across all emitters
    pub fn active_count(&self) -> usize {
        self.emitters.iter().map(|(_, e)| e.active_count()).sum()
    }
}
