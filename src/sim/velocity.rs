//! Initial velocity generation over a directional cone
//!
//! Magnitudes are uniform in `[force_min, force_min + force_range)`. With a
//! zero cone angle every sample is purely axial along +Y; otherwise zenith is
//! uniform in `[-angle, angle]` and azimuth uniform in `[0, 2π)`.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::UP;
use crate::spherical_to_cartesian;

/// Parameters of the emission cone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    /// Half-angle in radians
    pub angle: f32,
    pub force_min: f32,
    pub force_range: f32,
}

impl Cone {
    pub fn new(angle: f32, force_min: f32, force_range: f32) -> Self {
        Self {
            angle,
            force_min,
            force_range,
        }
    }

    /// Draw one initial velocity
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let magnitude = self.force_min + rng.random::<f32>() * self.force_range;
        if self.angle == 0.0 {
            return UP * magnitude;
        }
        let zenith = rng.random::<f32>() * self.angle * 2.0 - self.angle;
        let azimuth = rng.random::<f32>() * TAU;
        spherical_to_cartesian(magnitude, zenith, azimuth)
    }

    /// Regenerate one velocity per slot, reusing the existing allocation
    pub fn fill<R: Rng + ?Sized>(&self, rng: &mut R, velocities: &mut [Vec3]) {
        for velocity in velocities.iter_mut() {
            *velocity = self.sample(rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_zero_angle_exact_axial() {
        let mut rng = Pcg32::seed_from_u64(7);
        let cone = Cone::new(0.0, 2.0, 0.0);
        let mut velocities = vec![Vec3::ZERO; 32];
        cone.fill(&mut rng, &mut velocities);
        assert!(velocities.iter().all(|v| *v == Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn test_zero_angle_magnitude_range() {
        let mut rng = Pcg32::seed_from_u64(11);
        let cone = Cone::new(0.0, 1.0, 0.5);
        for _ in 0..500 {
            let v = cone.sample(&mut rng);
            assert_eq!(v.x, 0.0);
            assert_eq!(v.z, 0.0);
            assert!(v.y >= 1.0 && v.y <= 1.5, "magnitude out of range: {}", v.y);
        }
    }

    #[test]
    fn test_cone_stays_within_half_angle() {
        let mut rng = Pcg32::seed_from_u64(3);
        let angle = 0.4;
        let cone = Cone::new(angle, 1.0, 1.0);
        for _ in 0..500 {
            let v = cone.sample(&mut rng);
            let zenith = v.normalize().dot(Vec3::Y).clamp(-1.0, 1.0).acos();
            assert!(zenith <= angle + 1e-4, "zenith {zenith} exceeds {angle}");
            assert!(v.length() >= 1.0 - 1e-5 && v.length() < 2.0 + 1e-5);
        }
    }

    #[test]
    fn test_wide_cone_reaches_every_side() {
        let mut rng = Pcg32::seed_from_u64(5);
        let cone = Cone::new(1.0, 1.0, 0.0);
        let samples: Vec<Vec3> = (0..1000).map(|_| cone.sample(&mut rng)).collect();
        assert!(samples.iter().any(|v| v.x > 0.3));
        assert!(samples.iter().any(|v| v.x < -0.3));
        assert!(samples.iter().any(|v| v.z > 0.3));
        assert!(samples.iter().any(|v| v.z < -0.3));
    }

    #[test]
    fn test_same_seed_same_velocities() {
        let cone = Cone::new(0.6, 0.5, 0.25);
        let a: Vec<Vec3> = {
            let mut rng = Pcg32::seed_from_u64(99);
            (0..16).map(|_| cone.sample(&mut rng)).collect()
        };
        let b: Vec<Vec3> = {
            let mut rng = Pcg32::seed_from_u64(99);
            (0..16).map(|_| cone.sample(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }
}
