//! Sparkfield - fixed-capacity particle emitters for 3D scenes
//!
//! Core modules:
//! - `sim`: Deterministic emitter simulation (pools, spawning, perturbation, global force)
//! - `config`: Emitter configuration and default merging
//! - `scene`: JSON scene descriptions for the headless driver
//! - `error`: Errors for the fallible (loading) surfaces

pub mod config;
pub mod error;
pub mod scene;
pub mod sim;

pub use config::{EmitterConfig, EmitterOverrides, Rgb, TextureId};
pub use error::SceneError;
pub use scene::Scene;

use glam::Vec3;

/// Simulation configuration constants
pub mod consts {
    use glam::Vec3;

    /// Default driver timestep (60 frames per second)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum fixed ticks per rendered frame
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame a scene may ask for, in seconds
    pub const MAX_SCENE_DT: f32 = 1.0;

    /// Emitter defaults
    pub const DEFAULT_PARTICLE_COUNT: usize = 2000;
    /// Particles per second
    pub const DEFAULT_RATE: f32 = 75.0;
    /// Lifetimes are measured in ticks
    pub const DEFAULT_LIFETIME_MIN: u32 = 10;
    pub const DEFAULT_LIFETIME_RANGE: u32 = 25;
    pub const DEFAULT_FORCE_MIN: f32 = 0.03;
    pub const DEFAULT_FORCE_RANGE: f32 = 0.03;
    pub const DEFAULT_SIZE: f32 = 2.0;
    /// Parking spot for inactive slots, well outside any scene
    pub const DEFAULT_HIDDEN_POINT: Vec3 = Vec3::new(-1000.0, -1000.0, -1000.0);

    /// Default global force (gentle gravity, per tick)
    pub const DEFAULT_GLOBAL_FORCE: Vec3 = Vec3::new(0.0, -0.05, 0.0);

    /// Emission axis for a zero-angle cone
    pub const UP: Vec3 = Vec3::Y;

    /// Reference direction for perpendicular-basis construction: (1,1,1) normalized
    pub const REFERENCE_AXIS: Vec3 = Vec3::splat(0.577_350_26);
    /// Second reference used when the first is parallel to the axis being perturbed
    pub const FALLBACK_AXIS: Vec3 = Vec3::X;

    /// Squared-magnitude threshold below which a vector is treated as degenerate
    pub const DEGENERATE_EPSILON: f32 = 1e-12;
}

/// Uniform offset in `[-span/2, span/2)` from a unit sample
#[inline]
pub fn centered_offset(unit: f32, span: f32) -> f32 {
    unit * span - span / 2.0
}

/// Spherical (zenith from +Y, azimuth around Y) to cartesian
#[inline]
pub fn spherical_to_cartesian(magnitude: f32, zenith: f32, azimuth: f32) -> Vec3 {
    let (sin_z, cos_z) = zenith.sin_cos();
    let (sin_a, cos_a) = azimuth.sin_cos();
    Vec3::new(
        magnitude * sin_z * sin_a,
        magnitude * cos_z,
        magnitude * sin_z * cos_a,
    )
}

/// Clamp a magnitude-like parameter to a finite, non-negative value.
/// NaN and infinities become 0.
#[inline]
pub fn non_negative(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_reference_axis_is_unit() {
        assert!((consts::REFERENCE_AXIS.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_centered_offset_range() {
        assert_eq!(centered_offset(0.0, 2.0), -1.0);
        assert_eq!(centered_offset(0.5, 2.0), 0.0);
        assert!(centered_offset(0.999, 2.0) < 1.0);
    }

    #[test]
    fn test_spherical_zero_zenith_is_axial() {
        let v = spherical_to_cartesian(3.0, 0.0, 1.234);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 3.0).abs() < 1e-6);
        assert!(v.z.abs() < 1e-6);

        let side = spherical_to_cartesian(1.0, PI / 2.0, 0.0);
        assert!((side.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(-3.0), 0.0);
        assert_eq!(non_negative(f32::NAN), 0.0);
        assert_eq!(non_negative(f32::INFINITY), 0.0);
        assert_eq!(non_negative(f32::NEG_INFINITY), 0.0);
        assert_eq!(non_negative(f32::MAX), f32::MAX);
        assert_eq!(non_negative(1.5), 1.5);
    }
}
