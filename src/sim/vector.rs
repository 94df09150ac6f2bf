//! Perpendicular-basis construction for particle perturbation
//!
//! Given an axis `A` and a reference `R`:
//! - `U = A × (A + R)` (perpendicular to `A`, equal to `A × R`)
//! - `V = U × A` (perpendicular to both)
//! - direction = normalize(U + V)
//!
//! The result is a unit vector perpendicular to `A`. When `A` is parallel to
//! `R` the cross product collapses, so a second reference is tried before
//! giving up.

use glam::Vec3;

use crate::consts::{DEGENERATE_EPSILON, FALLBACK_AXIS, REFERENCE_AXIS};

/// Unit vector perpendicular to `axis`, or `None` when no stable one exists
pub fn perpendicular_direction(axis: Vec3) -> Option<Vec3> {
    if !axis.is_finite() || axis.length_squared() < DEGENERATE_EPSILON {
        return None;
    }
    perpendicular_against(axis, REFERENCE_AXIS)
        .or_else(|| perpendicular_against(axis, FALLBACK_AXIS))
}

fn perpendicular_against(axis: Vec3, reference: Vec3) -> Option<Vec3> {
    let u = axis.cross(axis + reference);
    // |A × R|² = |A|² sin²θ for unit R, so scale the threshold with |A|²
    if u.length_squared() <= DEGENERATE_EPSILON.max(1e-10 * axis.length_squared()) {
        return None;
    }
    let v = u.cross(axis);
    (u + v).try_normalize()
}

/// Offset `point` perpendicular to `axis` by `offset`; unchanged if degenerate
#[inline]
pub fn displace_perpendicular(point: Vec3, axis: Vec3, offset: f32) -> Vec3 {
    match perpendicular_direction(axis) {
        Some(dir) => point + dir * offset,
        None => point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_perpendicular(axis: Vec3) {
        let dir = perpendicular_direction(axis).expect("basis should exist");
        assert!((dir.length() - 1.0).abs() < 1e-5, "not unit: {dir:?}");
        assert!(
            dir.dot(axis.normalize()).abs() < 1e-4,
            "not perpendicular: {dir:?} vs {axis:?}"
        );
    }

    #[test]
    fn test_common_axes() {
        assert_perpendicular(Vec3::Y);
        assert_perpendicular(Vec3::new(0.0, 2.0, 0.0));
        assert_perpendicular(Vec3::new(0.3, -0.7, 0.1));
        assert_perpendicular(Vec3::new(-5.0, 0.0, 12.0));
    }

    #[test]
    fn test_parallel_to_reference_uses_fallback() {
        assert_perpendicular(REFERENCE_AXIS);
        assert_perpendicular(REFERENCE_AXIS * 3.0);
        assert_perpendicular(-REFERENCE_AXIS);
    }

    #[test]
    fn test_zero_axis_is_degenerate() {
        assert!(perpendicular_direction(Vec3::ZERO).is_none());
        assert!(perpendicular_direction(Vec3::splat(1e-8)).is_none());
    }

    #[test]
    fn test_non_finite_axis_is_degenerate() {
        assert!(perpendicular_direction(Vec3::new(f32::NAN, 1.0, 0.0)).is_none());
        assert!(perpendicular_direction(Vec3::new(f32::INFINITY, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_displace_skips_degenerate() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(displace_perpendicular(p, Vec3::ZERO, 0.5), p);

        let moved = displace_perpendicular(p, Vec3::Y, 0.5);
        assert!(((moved - p).length() - 0.5).abs() < 1e-5);
        assert!((moved.y - p.y).abs() < 1e-5);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn basis_is_never_nan(x in -100.0f32..100.0, y in -100.0f32..100.0, z in -100.0f32..100.0) {
                if let Some(dir) = perpendicular_direction(Vec3::new(x, y, z)) {
                    prop_assert!(dir.is_finite());
                    prop_assert!((dir.length() - 1.0).abs() < 1e-3);
                }
            }
        }
    }
}
