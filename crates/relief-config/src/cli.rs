//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Relief command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "relief", about = "Renders a lit terrain mesh built from a heightmap image")]
pub struct CliArgs {
    /// Heightmap image to build the terrain from.
    #[arg(long, value_name = "PATH")]
    pub heightmap: Option<PathBuf>,

    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Draw triangle edges only, if the GPU supports it.
    #[arg(long)]
    pub wireframe: bool,

    /// Log level or full filter directives, e.g. `debug` or `warn,relief_terrain=trace`.
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Directory holding `config.ron` and the log directory. Defaults to the
    /// per-user config directory.
    #[arg(long, value_name = "DIR")]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Overwrite every setting the command line names. `--config` is not a
    /// setting and is left to the caller.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let window = &mut self.window;
        window.width = args.width.unwrap_or(window.width);
        window.height = args.height.unwrap_or(window.height);
        window.fullscreen = args.fullscreen.unwrap_or(window.fullscreen);

        if let Some(path) = &args.heightmap {
            self.terrain.heightmap.clone_from(path);
        }
        if let Some(filter) = &args.log_level {
            self.debug.log_level.clone_from(filter);
        }
        // The flag can only switch wireframe on; config decides otherwise.
        self.debug.wireframe_mode |= args.wireframe;
    }
}
