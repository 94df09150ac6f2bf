//! Emitter configuration
//!
//! Configuration is merged exactly once, when an emitter is constructed:
//! registry defaults first, then the per-emitter overrides.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::consts::*;
use crate::non_negative;

/// Linear RGB color, one float per channel
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.r, self.g, self.b].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept either [r, g, b] or a packed 0xRRGGBB integer
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Channels([f32; 3]),
            Hex(u32),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Channels([r, g, b]) => Rgb::new(r, g, b),
            Repr::Hex(hex) => Rgb::from_hex(hex),
        })
    }
}

/// Opaque render-layer texture reference, passed through to the renderer untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Full configuration of one emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Pool capacity (at least 1)
    pub particle_count: usize,
    /// Spawn rate in particles per second
    pub rate: f32,
    /// Minimum life expectancy in ticks
    pub lifetime_min: u32,
    /// Life expectancy is drawn from `[lifetime_min, lifetime_min + lifetime_range)`
    pub lifetime_range: u32,
    /// Emission cone half-angle (radians)
    pub angle: f32,
    /// Minimum initial speed (units per tick)
    pub force_min: f32,
    pub force_range: f32,
    /// Positional turbulence per tick
    pub jitter: f32,
    /// Velocity turbulence per tick
    pub random: f32,
    /// Velocity drift around the emission direction
    pub waviness: f32,
    /// Sentinel position for inactive slots
    pub hidden_point: Vec3,
    pub color: Rgb,
    pub size: f32,
    pub texture: Option<TextureId>,
    /// New emitters start paused unless told otherwise
    pub paused: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            rate: DEFAULT_RATE,
            lifetime_min: DEFAULT_LIFETIME_MIN,
            lifetime_range: DEFAULT_LIFETIME_RANGE,
            angle: 0.0,
            force_min: DEFAULT_FORCE_MIN,
            force_range: DEFAULT_FORCE_RANGE,
            jitter: 0.0,
            random: 0.0,
            waviness: 0.0,
            hidden_point: DEFAULT_HIDDEN_POINT,
            color: Rgb::WHITE,
            size: DEFAULT_SIZE,
            texture: None,
            paused: true,
        }
    }
}

impl EmitterConfig {
    /// Clamp every field into its valid domain
    pub fn sanitized(mut self) -> Self {
        if self.particle_count < 1 {
            log::warn!("particle_count must be at least 1, clamping");
            self.particle_count = 1;
        }
        self.rate = clamp_field("rate", self.rate);
        self.angle = clamp_field("angle", self.angle);
        self.force_min = clamp_field("force_min", self.force_min);
        self.force_range = clamp_field("force_range", self.force_range);
        self.jitter = clamp_field("jitter", self.jitter);
        self.random = clamp_field("random", self.random);
        self.waviness = clamp_field("waviness", self.waviness);
        self.size = clamp_field("size", self.size);
        self
    }
}

fn clamp_field(name: &str, value: f32) -> f32 {
    let clamped = non_negative(value);
    if clamped != value {
        log::warn!("{} = {} is invalid, clamping to {}", name, value, clamped);
    }
    clamped
}

/// Partial configuration: every `Some` field replaces the base value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterOverrides {
    pub particle_count: Option<usize>,
    pub rate: Option<f32>,
    pub lifetime_min: Option<u32>,
    pub lifetime_range: Option<u32>,
    pub angle: Option<f32>,
    pub force_min: Option<f32>,
    pub force_range: Option<f32>,
    pub jitter: Option<f32>,
    pub random: Option<f32>,
    pub waviness: Option<f32>,
    pub hidden_point: Option<Vec3>,
    pub color: Option<Rgb>,
    pub size: Option<f32>,
    pub texture: Option<TextureId>,
    pub paused: Option<bool>,
}

impl EmitterOverrides {
    /// Write every set field into `config`
    pub fn apply_to(&self, config: &mut EmitterConfig) {
        macro_rules! apply {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field { config.$field = value; })*
            };
        }
        apply!(
            particle_count,
            rate,
            lifetime_min,
            lifetime_range,
            angle,
            force_min,
            force_range,
            jitter,
            random,
            waviness,
            hidden_point,
            color,
            size,
            paused
        );
        if self.texture.is_some() {
            config.texture = self.texture;
        }
    }

    /// A fresh config: `base` with these overrides on top, sanitized
    pub fn merged_over(&self, base: &EmitterConfig) -> EmitterConfig {
        let mut config = base.clone();
        self.apply_to(&mut config);
        config.sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_values() {
        let config = EmitterConfig::default();
        assert_eq!(config.particle_count, 2000);
        assert_eq!(config.rate, 75.0);
        assert_eq!(config.lifetime_min, 10);
        assert_eq!(config.lifetime_range, 25);
        assert_eq!(config.hidden_point, Vec3::splat(-1000.0));
        assert!(config.paused);
    }

    #[test]
    fn test_sanitized_clamps_negatives() {
        let config = EmitterConfig {
            particle_count: 0,
            rate: -5.0,
            jitter: -1.0,
            random: -0.5,
            waviness: f32::NAN,
            force_range: -0.1,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.particle_count, 1);
        assert_eq!(config.rate, 0.0);
        assert_eq!(config.jitter, 0.0);
        assert_eq!(config.random, 0.0);
        assert_eq!(config.waviness, 0.0);
        assert_eq!(config.force_range, 0.0);
    }

    #[test]
    fn test_sanitized_rejects_infinities() {
        let overrides: EmitterOverrides =
            serde_json::from_str(r#"{ "rate": 1e39, "jitter": -1e39 }"#).unwrap();
        assert_eq!(overrides.rate, Some(f32::INFINITY));

        let config = overrides.merged_over(&EmitterConfig::default());
        assert_eq!(config.rate, 0.0);
        assert_eq!(config.jitter, 0.0);
    }

    #[test]
    fn test_overrides_merge_over_base() {
        let base = EmitterConfig::default();
        let overrides = EmitterOverrides {
            rate: Some(10.0),
            color: Some(Rgb::from_hex(0xFF0000)),
            ..Default::default()
        };
        let config = overrides.merged_over(&base);
        assert_eq!(config.rate, 10.0);
        assert_eq!(config.color, Rgb::new(1.0, 0.0, 0.0));
        assert_eq!(config.lifetime_min, base.lifetime_min);
    }

    #[test]
    fn test_rgb_deserializes_both_forms() {
        let hex: Rgb = serde_json::from_str("16711680").unwrap();
        assert_eq!(hex, Rgb::new(1.0, 0.0, 0.0));

        let channels: Rgb = serde_json::from_str("[0.5, 0.25, 1.0]").unwrap();
        assert_eq!(channels, Rgb::new(0.5, 0.25, 1.0));
    }

    #[test]
    fn test_overrides_from_json() {
        let overrides: EmitterOverrides =
            serde_json::from_str(r#"{ "rate": 30.0, "hidden_point": [0.0, -50.0, 0.0] }"#)
                .unwrap();
        assert_eq!(overrides.rate, Some(30.0));
        assert_eq!(overrides.hidden_point, Some(Vec3::new(0.0, -50.0, 0.0)));
        assert_eq!(overrides.jitter, None);
    }
}
