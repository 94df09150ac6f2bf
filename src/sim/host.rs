//! Host collaborators: anchors and spawn regions
//!
//! An emitter reads its anchor once at attach time and asks its spawn region
//! for exactly one starting position per pool slot. Positions are local to
//! the anchor; the renderer places the particle system at `Emitter::origin`.

use glam::Vec3;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Something an emitter can be attached to
pub trait Anchor {
    /// World position of the host object
    fn world_position(&self) -> Vec3;
}

impl Anchor for Vec3 {
    fn world_position(&self) -> Vec3 {
        *self
    }
}

/// Host geometry/volume that starting positions are sampled from
pub trait SpawnRegion {
    /// Return `count` sample points in anchor-local space
    fn sample_points(&self, count: usize, rng: &mut dyn RngCore) -> Vec<Vec3>;
}

/// Sample `count` points, padding short or empty results so every slot has one
pub(crate) fn sample_exact(
    region: &dyn SpawnRegion,
    count: usize,
    rng: &mut dyn RngCore,
) -> Vec<Vec3> {
    let mut points = region.sample_points(count, rng);
    if points.len() == count {
        return points;
    }
    if points.len() > count {
        points.truncate(count);
        return points;
    }
    log::warn!(
        "Spawn region returned {} of {} points, padding",
        points.len(),
        count
    );
    if points.is_empty() {
        return vec![Vec3::ZERO; count];
    }
    let sampled = points.len();
    for i in sampled..count {
        points.push(points[i % sampled]);
    }
    points
}

/// Every particle starts from the same point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointRegion(pub Vec3);

impl SpawnRegion for PointRegion {
    fn sample_points(&self, count: usize, _rng: &mut dyn RngCore) -> Vec<Vec3> {
        vec![self.0; count]
    }
}

/// Uniform samples inside an axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRegion {
    pub min: Vec3,
    pub max: Vec3,
}

impl SpawnRegion for BoxRegion {
    fn sample_points(&self, count: usize, rng: &mut dyn RngCore) -> Vec<Vec3> {
        let extent = self.max - self.min;
        (0..count)
            .map(|_| {
                let t = Vec3::new(rng.random(), rng.random(), rng.random());
                self.min + extent * t
            })
            .collect()
    }
}

/// Uniform samples inside a ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereRegion {
    pub center: Vec3,
    pub radius: f32,
}

impl SpawnRegion for SphereRegion {
    fn sample_points(&self, count: usize, rng: &mut dyn RngCore) -> Vec<Vec3> {
        (0..count)
            .map(|_| {
                // Uniform direction from a uniform z and azimuth; cube root keeps density uniform
                let z: f32 = rng.random::<f32>() * 2.0 - 1.0;
                let azimuth = rng.random::<f32>() * std::f32::consts::TAU;
                let ring = (1.0 - z * z).max(0.0).sqrt();
                let dir = Vec3::new(ring * azimuth.cos(), ring * azimuth.sin(), z);
                let r = self.radius * rng.random::<f32>().cbrt();
                self.center + dir * r
            })
            .collect()
    }
}

/// Random points on the surface of a triangle mesh, weighted by face area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMeshRegion {
    pub vertices: Vec<Vec3>,
    /// Three indices per face
    pub indices: Vec<u32>,
}

impl TriangleMeshRegion {
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Faces with in-range indices
    fn faces(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|face| {
            let a = *self.vertices.get(face[0] as usize)?;
            let b = *self.vertices.get(face[1] as usize)?;
            let c = *self.vertices.get(face[2] as usize)?;
            Some([a, b, c])
        })
    }
}

impl SpawnRegion for TriangleMeshRegion {
    fn sample_points(&self, count: usize, rng: &mut dyn RngCore) -> Vec<Vec3> {
        let faces: Vec<[Vec3; 3]> = self.faces().collect();

        // Cumulative area table for area-weighted face selection
        let mut cumulative = Vec::with_capacity(faces.len());
        let mut total = 0.0;
        for [a, b, c] in &faces {
            total += (*b - *a).cross(*c - *a).length() * 0.5;
            cumulative.push(total);
        }
        if faces.is_empty() || total <= 0.0 {
            return Vec::new();
        }

        (0..count)
            .map(|_| {
                let pick = rng.random::<f32>() * total;
                let index = cumulative
                    .partition_point(|&area| area <= pick)
                    .min(faces.len() - 1);
                let [a, b, c] = faces[index];

                // Fold the unit square onto the triangle
                let mut u: f32 = rng.random();
                let mut v: f32 = rng.random();
                if u + v > 1.0 {
                    u = 1.0 - u;
                    v = 1.0 - v;
                }
                a + (b - a) * u + (c - a) * v
            })
            .collect()
    }
}
