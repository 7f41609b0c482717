//! Relief: renders a lit, rotatable terrain built from a heightmap image.

use std::process::ExitCode;

use clap::Parser;
use relief_app::platform::PlatformDirs;
use relief_config::{CliArgs, Config};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::from_override(args.config.as_deref()) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to resolve platform directories: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = dirs.create_all() {
        eprintln!("{e}");
    }

    // A broken config file should not keep the terrain from showing.
    let (mut config, load_error) = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    relief_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {e}");
    }
    info!(
        "Relief starting: heightmap {}, config in {}",
        config.terrain.heightmap.display(),
        dirs.config_dir.display()
    );

    match relief_app::window::run(config, dirs.config_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Relief exited with an error: {e}");
            ExitCode::FAILURE
        }
    }
}
