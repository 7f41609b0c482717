//! Configuration structs with defaults matching the reference scene, plus RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Heightmap source and elevation scaling.
    pub terrain: TerrainConfig,
    /// Fixed camera placement and projection.
    pub camera: CameraConfig,
    /// Directional light and ambient term.
    pub lighting: LightingConfig,
    /// Rotation controls.
    pub input: InputConfig,
    /// Optional on-disk replacement for the built-in shading effect.
    pub effect: EffectConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Terrain source configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Path of the grayscale heightmap image. Relative paths resolve against
    /// the working directory.
    pub heightmap: PathBuf,
    /// Red-channel intensity is divided by this to get elevation units.
    pub height_divisor: f32,
}

/// Camera configuration. The camera never moves; only the terrain rotates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position in world space.
    pub eye: [f32; 3],
    /// Look-at target in world space.
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

/// Lighting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Direction the light travels (normalized at load).
    pub direction: [f32; 3],
    /// Constant ambient term added to the diffuse factor.
    pub ambient: f32,
    /// When false the shader skips N·L and uses full vertex color.
    pub enabled: bool,
}

/// Input configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Radians added to or removed from the terrain angle per update tick.
    pub rotation_step: f32,
    /// Key name (winit `KeyCode` without the `Key` prefix) that increases the angle.
    pub rotate_left_key: String,
    /// Key name that decreases the angle.
    pub rotate_right_key: String,
}

/// Custom effect files. Both paths must be given together; when neither is
/// set the built-in `Colored` effect is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectConfig {
    /// RON effect manifest (parameters, techniques, passes).
    pub manifest: Option<PathBuf>,
    /// WGSL module the manifest's entry points refer to.
    pub shader: Option<PathBuf>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Enable wireframe rendering when the adapter supports it.
    pub wireframe_mode: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            fullscreen: false,
            vsync: true,
            title: "Relief".to_string(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::from("assets").join("heightmap.png"),
            height_divisor: 5.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [60.0, 80.0, -80.0],
            target: [0.0, 0.0, 0.0],
            fov_y_degrees: 45.0,
            near: 1.0,
            far: 300.0,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: [1.0, -1.0, -1.0],
            ambient: 0.1,
            enabled: true,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            rotation_step: 0.05,
            rotate_left_key: "E".to_string(),
            rotate_right_key: "D".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            wireframe_mode: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::Write)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::Write)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values that would make terrain or camera setup meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let divisor = self.terrain.height_divisor;
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "terrain.height_divisor",
                reason: format!("must be a positive number, got {divisor}"),
            });
        }
        if !(self.camera.fov_y_degrees > 0.0 && self.camera.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_y_degrees",
                reason: format!("must lie in (0, 180), got {}", self.camera.fov_y_degrees),
            });
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(ConfigError::Invalid {
                field: "camera.far",
                reason: format!(
                    "clip range must satisfy 0 < near < far, got near={} far={}",
                    self.camera.near, self.camera.far
                ),
            });
        }
        if self.lighting.direction.iter().all(|c| *c == 0.0) {
            return Err(ConfigError::Invalid {
                field: "lighting.direction",
                reason: "must not be the zero vector".to_string(),
            });
        }
        if self.effect.manifest.is_some() != self.effect.shader.is_some() {
            return Err(ConfigError::Invalid {
                field: "effect",
                reason: "manifest and shader must be set together".to_string(),
            });
        }
        Ok(())
    }

    fn read(config_path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(config_path).map_err(ConfigError::Read)?;
        ron::from_str(&contents).map_err(ConfigError::Parse)
    }
}
