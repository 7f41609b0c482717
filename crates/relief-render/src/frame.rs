//! Per-frame mutable state and the terrain's world transform.

use glam::{Mat4, Vec3};

/// Rotation of the terrain about the world Y axis. The only state that
/// changes between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameState {
    angle: f32,
}

impl FrameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rotation in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Add `delta` radians to the rotation.
    pub fn rotate(&mut self, delta: f32) {
        self.angle += delta;
    }
}

/// World matrix for a `width × height` grid rotated by `angle`.
///
/// The grid is first translated by `(-width/2, 0, height/2)` so its center
/// sits near the origin (vertices span `x ∈ [0, width)` and `z ∈ (-height, 0]`),
/// then rotated about +Y.
pub fn world_matrix(width: u32, height: u32, angle: f32) -> Mat4 {
    let center = Vec3::new(-(width as f32) / 2.0, 0.0, height as f32 / 2.0);
    Mat4::from_rotation_y(angle) * Mat4::from_translation(center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_rotate_accumulates() {
        let mut frame = FrameState::new();
        frame.rotate(0.05);
        frame.rotate(0.05);
        frame.rotate(-0.05);
        assert!((frame.angle() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_unrotated_world_centers_grid() {
        let world = world_matrix(100, 60, 0.0);
        assert!(approx_eq(
            world.transform_point3(Vec3::ZERO),
            Vec3::new(-50.0, 0.0, 30.0)
        ));
        assert!(approx_eq(
            world.transform_point3(Vec3::new(100.0, 7.0, -60.0)),
            Vec3::new(50.0, 7.0, -30.0)
        ));
    }

    #[test]
    fn test_translation_applies_before_rotation() {
        let world = world_matrix(4, 4, FRAC_PI_2);
        // (0,0,0) -> (-2,0,2) -> rotY(90°) -> (2,0,2)
        assert!(approx_eq(
            world.transform_point3(Vec3::ZERO),
            Vec3::new(2.0, 0.0, 2.0)
        ));
    }

    #[test]
    fn test_rotation_preserves_height() {
        let world = world_matrix(10, 10, 1.234);
        let p = world.transform_point3(Vec3::new(3.0, 42.0, -8.0));
        assert!((p.y - 42.0).abs() < 1e-4);
    }
}
