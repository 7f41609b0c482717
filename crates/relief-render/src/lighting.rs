//! Single directional light plus a constant ambient term.

use glam::Vec3;

/// Default light direction before normalization.
const DEFAULT_DIRECTION: Vec3 = Vec3::new(1.0, -1.0, -1.0);

/// CPU-side lighting state bound to the effect each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    /// Unit vector pointing from the light toward the surface.
    direction: Vec3,
    pub ambient: f32,
    pub enabled: bool,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            direction: DEFAULT_DIRECTION.normalize(),
            ambient: 0.1,
            enabled: true,
        }
    }
}

impl Lighting {
    /// Normalizes `direction`. A zero vector keeps the default direction.
    pub fn new(direction: Vec3, ambient: f32, enabled: bool) -> Self {
        let mut lighting = Self {
            ambient,
            enabled,
            ..Self::default()
        };
        lighting.set_direction(direction);
        lighting
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        match direction.try_normalize() {
            Some(unit) => self.direction = unit,
            None => log::warn!(
                "Ignoring degenerate light direction {direction}; keeping {}",
                self.direction
            ),
        }
    }
}
