//! Everything built once at startup from the config, before any window or
//! GPU work: terrain mesh, effect, camera placement, lighting.

use glam::Vec3;
use relief_config::{CameraConfig, Config, EffectConfig, LightingConfig, TerrainConfig};
use relief_render::{CameraSetup, Effect, EffectError, Lighting, colored_effect};
use relief_terrain::{HeightGrid, TerrainError, TerrainMesh};
use tracing::{info, warn};

/// CPU-side scene ready for upload.
pub struct Scene {
    pub mesh: TerrainMesh,
    pub effect: Effect,
    pub camera: CameraSetup,
    pub lighting: Lighting,
}

impl Scene {
    pub fn load(config: &Config) -> Result<Self, crate::AppError> {
        Ok(Self {
            mesh: load_terrain(&config.terrain)?,
            effect: load_effect(&config.effect)?,
            camera: camera_setup(&config.camera),
            lighting: lighting(&config.lighting),
        })
    }
}

pub fn load_terrain(config: &TerrainConfig) -> Result<TerrainMesh, TerrainError> {
    let grid = HeightGrid::open_with_divisor(&config.heightmap, config.height_divisor)?;
    let mesh = TerrainMesh::build(&grid)?;

    let report = mesh.normal_report();
    if report.degenerate > 0 {
        warn!(
            "{} vertices have no usable normal and will receive ambient light only",
            report.degenerate
        );
    }
    info!(
        "Built terrain from {}: {}x{}, {} triangles",
        config.heightmap.display(),
        mesh.width(),
        mesh.height(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// The configured manifest/shader pair, or the built-in `Colored` effect.
pub fn load_effect(config: &EffectConfig) -> Result<Effect, EffectError> {
    match (&config.manifest, &config.shader) {
        (Some(manifest), Some(shader)) => {
            info!(
                "Loading effect from {} and {}",
                manifest.display(),
                shader.display()
            );
            Effect::load(manifest, shader)
        }
        _ => colored_effect(),
    }
}

pub fn camera_setup(config: &CameraConfig) -> CameraSetup {
    CameraSetup {
        eye: Vec3::from_array(config.eye),
        target: Vec3::from_array(config.target),
        fov_y: config.fov_y_degrees.to_radians(),
        near: config.near,
        far: config.far,
        ..CameraSetup::default()
    }
}

pub fn lighting(config: &LightingConfig) -> Lighting {
    Lighting::new(
        Vec3::from_array(config.direction),
        config.ambient,
        config.enabled,
    )
}
