//! Render-facing particle buffers
//!
//! Fixed length for the lifetime of the emitter. Inactive slots sit at the
//! hidden point. Positions are flagged dirty every simulated tick, colors only
//! when a slot is activated or deactivated.

use bytemuck::cast_slice;
use glam::Vec3;

use crate::config::Rgb;

/// Position/color arrays exposed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBuffers {
    positions: Vec<Vec3>,
    colors: Vec<Rgb>,
    positions_dirty: bool,
    colors_dirty: bool,
    material_dirty: bool,
}

impl ParticleBuffers {
    /// All slots hidden, all flags raised for the first upload
    pub fn new(capacity: usize, hidden_point: Vec3, color: Rgb) -> Self {
        Self {
            positions: vec![hidden_point; capacity],
            colors: vec![color; capacity],
            positions_dirty: true,
            colors_dirty: true,
            material_dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Tightly packed `[x, y, z]` floats, ready for a vertex buffer
    pub fn position_bytes(&self) -> &[u8] {
        cast_slice(&self.positions)
    }

    /// Tightly packed `[r, g, b]` floats
    pub fn color_bytes(&self) -> &[u8] {
        cast_slice(&self.colors)
    }

    pub fn positions_dirty(&self) -> bool {
        self.positions_dirty
    }

    pub fn colors_dirty(&self) -> bool {
        self.colors_dirty
    }

    /// Size, texture or base color changed since the last upload
    pub fn material_dirty(&self) -> bool {
        self.material_dirty
    }

    /// Renderer has consumed the current contents
    pub fn acknowledge_upload(&mut self) {
        self.positions_dirty = false;
        self.colors_dirty = false;
        self.material_dirty = false;
    }

    #[inline]
    pub(crate) fn position_mut(&mut self, slot: usize) -> &mut Vec3 {
        &mut self.positions[slot]
    }

    /// Write a slot's position and color (activation or deactivation)
    pub(crate) fn assign(&mut self, slot: usize, position: Vec3, color: Rgb) {
        self.positions[slot] = position;
        self.colors[slot] = color;
        self.colors_dirty = true;
    }

    pub(crate) fn mark_positions_dirty(&mut self) {
        self.positions_dirty = true;
    }

    pub(crate) fn mark_material_dirty(&mut self) {
        self.material_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffers_hidden_and_dirty() {
        let hidden = Vec3::splat(-1000.0);
        let buffers = ParticleBuffers::new(4, hidden, Rgb::WHITE);
        assert_eq!(buffers.len(), 4);
        assert!(buffers.positions().iter().all(|p| *p == hidden));
        assert!(buffers.positions_dirty() && buffers.colors_dirty() && buffers.material_dirty());
    }

    #[test]
    fn test_byte_views() {
        let buffers = ParticleBuffers::new(3, Vec3::ONE, Rgb::BLACK);
        assert_eq!(buffers.position_bytes().len(), 3 * 12);
        assert_eq!(buffers.color_bytes().len(), 3 * 12);
    }

    #[test]
    fn test_assign_flags_colors_only() {
        let mut buffers = ParticleBuffers::new(2, Vec3::ZERO, Rgb::WHITE);
        buffers.acknowledge_upload();

        *buffers.position_mut(0) = Vec3::X;
        buffers.mark_positions_dirty();
        assert!(buffers.positions_dirty());
        assert!(!buffers.colors_dirty());

        buffers.assign(1, Vec3::Y, Rgb::BLACK);
        assert!(buffers.colors_dirty());
        assert_eq!(buffers.colors()[1], Rgb::BLACK);
    }
}
