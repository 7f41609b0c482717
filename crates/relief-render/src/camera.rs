//! Fixed look-at camera with a perspective projection.
//!
//! The view never changes after construction. The projection depends on the
//! viewport aspect ratio and is recomputed whenever the surface is resized.

use glam::{Mat4, Vec3};

/// Placement and lens of the camera, independent of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSetup {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSetup {
    /// Looks at the origin from `(60, 80, -80)` with a 45° lens and a
    /// `1..300` clip range.
    fn default() -> Self {
        Self {
            eye: Vec3::new(60.0, 80.0, -80.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 1.0,
            far: 300.0,
        }
    }
}

/// Right-handed view and projection matrices, depth mapped to `0..1`.
#[derive(Debug, Clone)]
pub struct Camera {
    setup: CameraSetup,
    aspect_ratio: f32,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(setup: CameraSetup, aspect_ratio: f32) -> Self {
        let view = Mat4::look_at_rh(setup.eye, setup.target, setup.up);
        let projection = Mat4::perspective_rh(setup.fov_y, aspect_ratio, setup.near, setup.far);
        Self {
            setup,
            aspect_ratio,
            view,
            projection,
        }
    }

    /// Build for a viewport of `width × height` pixels.
    pub fn for_viewport(setup: CameraSetup, width: u32, height: u32) -> Self {
        Self::new(setup, aspect(width, height))
    }

    /// Recompute the projection for a resized viewport.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let aspect_ratio = aspect(width, height);
        if aspect_ratio == self.aspect_ratio {
            return;
        }
        self.aspect_ratio = aspect_ratio;
        self.projection = Mat4::perspective_rh(
            self.setup.fov_y,
            aspect_ratio,
            self.setup.near,
            self.setup.far,
        );
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn setup(&self) -> &CameraSetup {
        &self.setup
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
