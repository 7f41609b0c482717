//! Per-user directories for config and logs.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

const APP_NAME: &str = "relief";

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where Relief keeps its files: `config.ron` in `config_dir`, the debug-build
/// JSON log in `log_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve the OS locations (XDG on Linux, Known Folders on Windows,
    /// `Library` on macOS) without touching the disk. Logs go under the data
    /// directory, falling back to the config directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_dir = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);
        let log_dir = dirs::data_local_dir()
            .map(|base| base.join(APP_NAME))
            .unwrap_or_else(|| config_dir.clone())
            .join("logs");
        Ok(Self {
            config_dir,
            log_dir,
        })
    }

    /// Lay the directories out under `root` instead of the OS locations. Used
    /// for `--config` and in tests.
    pub fn with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            log_dir: root.join("logs"),
        }
    }

    /// `--config` wins over the OS locations.
    pub fn from_override(config_override: Option<&Path>) -> Result<Self, PlatformError> {
        match config_override {
            Some(root) => Ok(Self::with_root(root)),
            None => Self::resolve(),
        }
    }

    pub fn create_all(&self) -> Result<(), PlatformError> {
        for dir in [&self.config_dir, &self.log_dir] {
            std::fs::create_dir_all(dir).map_err(|source| PlatformError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Backends worth trying on this OS, most preferred first.
pub fn preferred_backends() -> wgpu::Backends {
    if cfg!(target_os = "macos") {
        wgpu::Backends::METAL
    } else if cfg!(target_os = "windows") {
        wgpu::Backends::DX12 | wgpu::Backends::VULKAN
    } else {
        wgpu::Backends::VULKAN | wgpu::Backends::GL
    }
}
