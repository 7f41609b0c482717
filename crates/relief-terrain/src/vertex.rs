//! Interleaved terrain vertex, laid out for direct GPU upload.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Position, packed color and normal in one 28-byte record.
///
/// Layout:
///   - `[0..12]`  position `[f32; 3]`, world space `(x, elevation, -y)`
///   - `[12..16]` color `[u8; 4]`, RGBA8
///   - `[16..28]` normal `[f32; 3]`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub color: [u8; 4],
    pub normal: [f32; 3],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 28]);

impl TerrainVertex {
    /// Byte offset of `color`.
    pub const COLOR_OFFSET: u64 = 12;
    /// Byte offset of `normal`.
    pub const NORMAL_OFFSET: u64 = 16;

    /// A vertex with a zero normal, ready for accumulation.
    pub fn new(position: Vec3, color: [u8; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
            normal: [0.0; 3],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_offsets() {
        assert_eq!(std::mem::offset_of!(TerrainVertex, position), 0);
        assert_eq!(
            std::mem::offset_of!(TerrainVertex, color) as u64,
            TerrainVertex::COLOR_OFFSET
        );
        assert_eq!(
            std::mem::offset_of!(TerrainVertex, normal) as u64,
            TerrainVertex::NORMAL_OFFSET
        );
    }

    #[test]
    fn test_cast_to_bytes() {
        let v = TerrainVertex::new(Vec3::new(1.0, 2.0, -3.0), [1, 2, 3, 4]);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 28);
        assert_eq!(&bytes[12..16], &[1, 2, 3, 4]);
        assert_eq!(v.normal(), Vec3::ZERO);
    }
}
