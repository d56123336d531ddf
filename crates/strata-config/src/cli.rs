//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line arguments for the strata tools.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Chunked voxel world engine")]
pub struct CliArgs {
    /// Render distance in chunks.
    #[arg(long)]
    pub render_distance: Option<u32>,

    /// World seed passed to the terrain generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of meshing worker threads (0 = auto).
    #[arg(long)]
    pub mesh_workers: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of scripted walk ticks the demo runs.
    #[arg(long)]
    pub ticks: Option<u32>,

    /// Write the generated texture atlas to this PNG file.
    #[arg(long)]
    pub atlas_out: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(rd) = args.render_distance {
            self.streaming.render_distance = rd;
        }
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(workers) = args.mesh_workers {
            self.streaming.mesh_workers = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
