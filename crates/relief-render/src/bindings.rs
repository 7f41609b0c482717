//! Terrain parameter names resolved against an effect.

use glam::Mat4;

use crate::effect::{
    Effect, EffectError, EffectParameters, ParameterHandle, ParameterKind, TechniqueHandle,
};
use crate::lighting::Lighting;

/// Technique used to draw terrain.
pub const TECHNIQUE_NAME: &str = "Colored";

pub const VIEW: &str = "xView";
pub const PROJECTION: &str = "xProjection";
pub const WORLD: &str = "xWorld";
pub const LIGHT_DIRECTION: &str = "xLightDirection";
pub const AMBIENT: &str = "xAmbient";
pub const ENABLE_LIGHTING: &str = "xEnableLighting";

/// Handles for every parameter and the technique the terrain draw needs.
///
/// Resolution happens once at load; an effect lacking any name, or declaring
/// it with the wrong kind, is rejected there instead of on the first frame.
#[derive(Clone, Copy, Debug)]
pub struct TerrainBindings {
    pub technique: TechniqueHandle,
    view: ParameterHandle,
    projection: ParameterHandle,
    world: ParameterHandle,
    light_direction: ParameterHandle,
    ambient: ParameterHandle,
    enable_lighting: ParameterHandle,
}

/// Values bound for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub world: Mat4,
    pub lighting: Lighting,
}

impl TerrainBindings {
    pub fn resolve(effect: &Effect) -> Result<Self, EffectError> {
        use ParameterKind::*;

        let bindings = Self {
            technique: effect.technique(TECHNIQUE_NAME)?,
            view: effect.typed_parameter(VIEW, Matrix)?,
            projection: effect.typed_parameter(PROJECTION, Matrix)?,
            world: effect.typed_parameter(WORLD, Matrix)?,
            light_direction: effect.typed_parameter(LIGHT_DIRECTION, Vector3)?,
            ambient: effect.typed_parameter(AMBIENT, Float)?,
            enable_lighting: effect.typed_parameter(ENABLE_LIGHTING, Bool)?,
        };
        log::debug!("Resolved terrain bindings against effect '{}'", effect.name());
        Ok(bindings)
    }

    /// Stage every terrain parameter for this frame.
    pub fn apply(
        &self,
        params: &mut EffectParameters,
        frame: &FrameUniforms,
    ) -> Result<(), EffectError> {
        params.set_matrix(self.view, frame.view)?;
        params.set_matrix(self.projection, frame.projection)?;
        params.set_matrix(self.world, frame.world)?;
        params.set_vector3(self.light_direction, frame.lighting.direction())?;
        params.set_float(self.ambient, frame.lighting.ambient)?;
        params.set_bool(self.enable_lighting, frame.lighting.enabled)
    }
}
