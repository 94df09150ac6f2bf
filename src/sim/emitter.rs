//! Particle pool attached to a host anchor
//!
//! Each emitter owns a fixed-capacity pool of slots. Per tick it:
//! 1. Ages every particle active at the start of the tick, removing expired
//!    ones and perturbing/integrating the rest (perturb → global force → position)
//! 2. Advances the spawn accumulator and admits new particles from the pool
//!
//! Nothing is allocated or resized during a tick.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::buffers::ParticleBuffers;
use super::force::GlobalForce;
use super::host::{Anchor, SpawnRegion, sample_exact};
use super::particle::Particle;
use super::vector::{displace_perpendicular, perpendicular_direction};
use super::velocity::Cone;
use crate::config::{EmitterConfig, Rgb, TextureId};
use crate::{centered_offset, non_negative};

/// What happened during one `age` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    pub spawned: usize,
    pub expired: usize,
    /// Spawns lost to a saturated pool
    pub dropped: usize,
}

impl std::ops::AddAssign for TickStats {
    fn add_assign(&mut self, other: Self) {
        self.spawned += other.spawned;
        self.expired += other.expired;
        self.dropped += other.dropped;
    }
}

/// Per-emitter control operations that can be broadcast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum EmitterOp {
    Clear,
    Pause,
    Play,
    TogglePause,
    SetRate(f32),
    SetJitter(f32),
    SetRandom(f32),
    SetWaviness(f32),
    SetAngle(f32),
    SetForceMin(f32),
    SetForceRange(f32),
    SetLifetimeMin(u32),
    SetLifetimeRange(u32),
    SetColor(Rgb),
    SetSize(f32),
    SetTexture(Option<TextureId>),
}

/// A fixed-capacity particle emitter
#[derive(Debug, Clone)]
pub struct Emitter {
    config: EmitterConfig,
    /// Anchor position read at attach time
    origin: Vec3,
    starting_positions: Vec<Vec3>,
    starting_velocities: Vec<Vec3>,
    particles: Vec<Particle>,
    buffers: ParticleBuffers,
    /// Slots currently alive, in activation order
    active: Vec<usize>,
    /// Per-slot membership in `active`
    occupied: Vec<bool>,
    cursor: usize,
    spawn_accumulator: f32,
    rng: Pcg32,
}

impl Emitter {
    /// Attach a new emitter to `anchor`, sampling starting positions from `region`
    pub fn new(
        anchor: &dyn Anchor,
        region: &dyn SpawnRegion,
        config: EmitterConfig,
        seed: u64,
    ) -> Self {
        let config = config.sanitized();
        let capacity = config.particle_count;
        let mut rng = Pcg32::seed_from_u64(seed);

        let starting_positions = sample_exact(region, capacity, &mut rng);
        let mut starting_velocities = vec![Vec3::ZERO; capacity];
        Self::cone_of(&config).fill(&mut rng, &mut starting_velocities);

        log::debug!(
            "Emitter attached at {:?}: {} slots, rate {}/s",
            anchor.world_position(),
            capacity,
            config.rate
        );

        Self {
            origin: anchor.world_position(),
            starting_positions,
            starting_velocities,
            particles: vec![Particle::default(); capacity],
            buffers: ParticleBuffers::new(capacity, config.hidden_point, config.color),
            active: Vec::with_capacity(capacity),
            occupied: vec![false; capacity],
            cursor: 0,
            spawn_accumulator: 0.0,
            rng,
            config,
        }
    }

    fn cone_of(config: &EmitterConfig) -> Cone {
        Cone::new(config.angle, config.force_min, config.force_range)
    }

    /// Move to a new anchor/region: resamples starting positions and clears the pool
    pub fn reattach(&mut self, anchor: &dyn Anchor, region: &dyn SpawnRegion) {
        self.clear();
        self.origin = anchor.world_position();
        self.starting_positions = sample_exact(region, self.capacity(), &mut self.rng);
        log::debug!("Emitter reattached at {:?}", self.origin);
    }

    // === Simulation ===

    /// Advance one tick. `dt` is elapsed time in seconds and only drives spawning;
    /// aging and integration are per tick.
    pub fn age(&mut self, force: &GlobalForce, dt: f32) -> TickStats {
        if self.config.paused {
            return TickStats::default();
        }

        let expired = self.age_active(force.acceleration());
        let (spawned, dropped) = self.spawn(dt);
        self.buffers.mark_positions_dirty();

        if spawned > 0 || expired > 0 || dropped > 0 {
            log::trace!(
                "Emitter tick: +{} -{} ({} dropped), {} active",
                spawned,
                expired,
                dropped,
                self.active.len()
            );
        }

        TickStats {
            spawned,
            expired,
            dropped,
        }
    }

    /// Age, perturb and integrate every active slot; compacts `active` in place
    fn age_active(&mut self, acceleration: Option<Vec3>) -> usize {
        let Self {
            config,
            particles,
            buffers,
            active,
            occupied,
            rng,
            ..
        } = self;

        let before = active.len();
        let mut write = 0;
        for read in 0..before {
            let slot = active[read];
            let particle = &mut particles[slot];

            if particle.grow_older() {
                buffers.assign(slot, config.hidden_point, config.color);
                occupied[slot] = false;
                continue;
            }

            let position = buffers.position_mut(slot);
            perturb(config, rng, particle, position);
            if let Some(acceleration) = acceleration {
                particle.velocity += acceleration;
            }
            *position += particle.velocity;

            active[write] = slot;
            write += 1;
        }
        active.truncate(write);
        before - write
    }

    /// Run the spawn accumulator; returns (spawned, dropped)
    fn spawn(&mut self, dt: f32) -> (usize, usize) {
        self.spawn_accumulator += self.config.rate * non_negative(dt);
        if !self.spawn_accumulator.is_finite() {
            // rate * dt overflowed; saturate so the carry stays usable
            self.spawn_accumulator = f32::MAX;
        }
        let due = self.spawn_accumulator.floor();
        self.spawn_accumulator -= due;

        let due = due as usize;
        let free = self.capacity() - self.active.len();
        let spawned = due.min(free);
        for _ in 0..spawned {
            let slot = self.next_free_slot();
            self.activate(slot);
        }
        (spawned, due - spawned)
    }

    /// First unoccupied slot at or after the cursor; the caller guarantees one exists
    fn next_free_slot(&mut self) -> usize {
        let capacity = self.capacity();
        let mut slot = self.cursor;
        while self.occupied[slot] {
            slot = (slot + 1) % capacity;
        }
        self.cursor = (slot + 1) % capacity;
        slot
    }

    fn activate(&mut self, slot: usize) {
        let extra = self.draw_lifetime_extra();
        let life_expectancy = self.config.lifetime_min.saturating_add(extra);
        self.particles[slot] = Particle::spawned(self.starting_velocities[slot], life_expectancy);
        self.buffers
            .assign(slot, self.starting_positions[slot], self.config.color);
        self.occupied[slot] = true;
        self.active.push(slot);
    }

    fn draw_lifetime_extra(&mut self) -> u32 {
        match self.config.lifetime_range {
            0 => 0,
            range => self.rng.random_range(0..range),
        }
    }

    fn regenerate_velocities(&mut self) {
        Self::cone_of(&self.config).fill(&mut self.rng, &mut self.starting_velocities);
        log::debug!(
            "Regenerated {} starting velocities (angle {}, force {}+{})",
            self.starting_velocities.len(),
            self.config.angle,
            self.config.force_min,
            self.config.force_range
        );
    }

    // === Controls ===

    /// Dispatch a control operation
    pub fn apply(&mut self, op: EmitterOp) {
        match op {
            EmitterOp::Clear => self.clear(),
            EmitterOp::Pause => self.pause(),
            EmitterOp::Play => self.play(),
            EmitterOp::TogglePause => self.toggle_pause(),
            EmitterOp::SetRate(v) => self.set_rate(v),
            EmitterOp::SetJitter(v) => self.set_jitter(v),
            EmitterOp::SetRandom(v) => self.set_random(v),
            EmitterOp::SetWaviness(v) => self.set_waviness(v),
            EmitterOp::SetAngle(v) => self.set_angle(v),
            EmitterOp::SetForceMin(v) => self.set_force_min(v),
            EmitterOp::SetForceRange(v) => self.set_force_range(v),
            EmitterOp::SetLifetimeMin(v) => self.set_lifetime_min(v),
            EmitterOp::SetLifetimeRange(v) => self.set_lifetime_range(v),
            EmitterOp::SetColor(c) => self.set_color(c),
            EmitterOp::SetSize(v) => self.set_size(v),
            EmitterOp::SetTexture(t) => self.set_texture(t),
        }
    }

    /// Hide every active slot immediately; cursor and configuration are untouched
    pub fn clear(&mut self) {
        for &slot in &self.active {
            self.buffers
                .assign(slot, self.config.hidden_point, self.config.color);
            self.occupied[slot] = false;
        }
        self.active.clear();
        self.buffers.mark_positions_dirty();
    }

    pub fn pause(&mut self) {
        self.config.paused = true;
    }

    /// Resume; ticks missed while paused are not replayed
    pub fn play(&mut self) {
        self.config.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.config.paused = !self.config.paused;
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.config.rate = non_negative(rate);
    }

    pub fn set_jitter(&mut self, jitter: f32) {
        self.config.jitter = non_negative(jitter);
    }

    pub fn set_random(&mut self, random: f32) {
        self.config.random = non_negative(random);
    }

    pub fn set_waviness(&mut self, waviness: f32) {
        self.config.waviness = non_negative(waviness);
    }

    pub fn set_lifetime_min(&mut self, ticks: u32) {
        self.config.lifetime_min = ticks;
    }

    pub fn set_lifetime_range(&mut self, ticks: u32) {
        self.config.lifetime_range = ticks;
    }

    /// Affects future spawns only
    pub fn set_angle(&mut self, angle: f32) {
        self.config.angle = non_negative(angle);
        self.regenerate_velocities();
    }

    pub fn set_force_min(&mut self, force_min: f32) {
        self.config.force_min = non_negative(force_min);
        self.regenerate_velocities();
    }

    pub fn set_force_range(&mut self, force_range: f32) {
        self.config.force_range = non_negative(force_range);
        self.regenerate_velocities();
    }

    /// Color assigned to slots as they are spawned or hidden from now on
    pub fn set_color(&mut self, color: Rgb) {
        self.config.color = color;
        self.buffers.mark_material_dirty();
    }

    pub fn set_size(&mut self, size: f32) {
        self.config.size = non_negative(size);
        self.buffers.mark_material_dirty();
    }

    pub fn set_texture(&mut self, texture: Option<TextureId>) {
        self.config.texture = texture;
        self.buffers.mark_material_dirty();
    }

    // === Accessors ===

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn is_paused(&self) -> bool {
        self.config.paused
    }

    pub fn capacity(&self) -> usize {
        self.config.particle_count
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    /// Renderer-side access, for acknowledging uploads
    pub fn buffers_mut(&mut self) -> &mut ParticleBuffers {
        &mut self.buffers
    }

    /// Active slot indices in activation order
    pub fn active_slots(&self) -> &[usize] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.occupied.get(slot).copied().unwrap_or(false)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn particle(&self, slot: usize) -> Option<&Particle> {
        self.particles.get(slot)
    }

    pub fn position(&self, slot: usize) -> Option<Vec3> {
        self.buffers.positions().get(slot).copied()
    }

    pub fn starting_positions(&self) -> &[Vec3] {
        &self.starting_positions
    }

    pub fn starting_velocities(&self) -> &[Vec3] {
        &self.starting_velocities
    }
}

/// Jitter moves the position, random and waviness nudge the velocity.
/// Each is skipped for this tick if its basis is degenerate.
fn perturb(config: &EmitterConfig, rng: &mut Pcg32, particle: &mut Particle, position: &mut Vec3) {
    if config.jitter > 0.0 || config.random > 0.0 {
        // Both use the basis of the velocity as it was at the start of the tick
        if let Some(dir) = perpendicular_direction(particle.velocity) {
            if config.jitter > 0.0 {
                *position += dir * centered_offset(rng.random(), config.jitter);
            }
            if config.random > 0.0 {
                particle.velocity += dir * centered_offset(rng.random(), config.random);
            }
        }
    }
    if config.waviness > 0.0 {
        let offset = centered_offset(rng.random(), config.waviness);
        particle.velocity =
            displace_perpendicular(particle.velocity, particle.starting_velocity, offset);
    }
}
