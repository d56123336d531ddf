//! Headless demo session for the strata voxel engine.
//!
//! Builds the standard palette and its texture atlas, streams a noise world
//! around a walking viewpoint, and breaks and places a few blocks, logging
//! what each component does.
//!
//! Run with `cargo run -p strata-demo -- --render-distance 6 --atlas-out atlas.png`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use glam::{IVec3, Vec3};
use strata_atlas::{AtlasConfig, RecipeBook, TextureAtlas};
use strata_config::{CliArgs, Config, default_config_dir};
use strata_mesh::default_worker_count;
use strata_stream::{ChunkStreamer, HeightmapGenerator, HeightmapParams};
use strata_voxel::{
    ActorBox, BlockRegistry, BreakOutcome, ChunkDims, ChunkStore, InteractionResolver, blocks,
};
use tracing::{info, warn};

/// Walk speed of the scripted viewpoint, in blocks per tick.
const WALK_STEP: f32 = 1.5;
const DEFAULT_TICKS: u32 = 64;
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(|| default_config_dir().ok())
        .unwrap_or_else(|| PathBuf::from(".strata"));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("demo failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, args: &CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    // --- Registry and atlas ---
    let registry = Arc::new(BlockRegistry::standard());
    info!("Registered {} block types", registry.len());

    let atlas_config = AtlasConfig {
        tile_size: config.atlas.tile_size,
        seed: config.atlas.seed,
        ..AtlasConfig::default()
    };
    let atlas = Arc::new(TextureAtlas::build(
        &registry,
        &RecipeBook::standard(),
        &atlas_config,
    )?);
    if let Some(path) = &args.atlas_out {
        atlas.save_png(path)?;
        info!("Wrote atlas to {}", path.display());
    }

    // --- World ---
    let dims = ChunkDims::new(
        config.world.chunk_size as usize,
        config.world.chunk_height as usize,
    );
    let mut store = ChunkStore::new(dims);
    let generator = HeightmapGenerator::new(HeightmapParams {
        seed: config.world.seed,
        ..HeightmapParams::default()
    });
    let mut streamer = ChunkStreamer::from_config(
        &config.streaming,
        generator,
        Arc::clone(&registry),
        Arc::clone(&atlas),
    );
    info!(
        "Streaming radius {} (+{} margin), {} mesh workers",
        config.streaming.render_distance,
        config.streaming.eviction_margin,
        match config.streaming.mesh_workers {
            0 => default_worker_count(),
            n => n as usize,
        }
    );

    // --- Spawn ---
    let spawn_column = (dims.size as i32 / 2, dims.size as i32 / 2);
    let probe = Vec3::new(spawn_column.0 as f32 + 0.5, 0.0, spawn_column.1 as f32 + 0.5);
    if !streamer.settle(&mut store, probe, SETTLE_TIMEOUT) {
        warn!("initial area did not finish meshing");
    }
    let ground = store
        .surface_height(spawn_column.0, spawn_column.1)
        .unwrap_or(dims.height as i32 / 2);
    let feet = Vec3::new(probe.x, (ground + 2) as f32, probe.z);
    info!(
        "Spawned at ({:.1}, {:.1}, {:.1}); {} chunks, {} triangles",
        feet.x,
        feet.y,
        feet.z,
        store.len(),
        streamer.total_triangles()
    );

    // --- Interaction ---
    let interaction = &config.interaction;
    let actor = ActorBox::new(feet, interaction.actor_width, interaction.actor_height);
    let resolver = InteractionResolver::new(&registry).with_step(interaction.ray_step);
    let eye = feet + Vec3::Y * interaction.eye_height;
    let look = Vec3::new(1.0, -1.0, 0.3).normalize();

    match resolver.raycast(&store, eye, look, interaction.reach) {
        Some(hit) => {
            let name = &registry.lookup(hit.block_type).name;
            info!("Looking at {name} at {:?}", hit.block.to_array());
            match resolver.break_block(&mut store, hit.block) {
                BreakOutcome::Broken { drop } => {
                    let drop = drop.map_or("nothing", |id| registry.lookup(id).name.as_str());
                    info!("Broke {name}, dropped {drop}");
                }
                other => info!("Break refused: {other:?}"),
            }
            let outcome = resolver.place_block(&mut store, hit.placement, blocks::GLASS, &actor);
            info!("Placed glass at {:?}: {outcome:?}", hit.placement.to_array());
        }
        None => info!("Nothing within reach"),
    }

    // Placing into the actor's own body is refused.
    let inside = feet.floor().as_ivec3() + IVec3::Y;
    let outcome = resolver.place_block(&mut store, inside, blocks::STONE, &actor);
    info!("Placing stone inside the actor: {outcome:?}");

    // --- Walk ---
    let ticks = args.ticks.unwrap_or(DEFAULT_TICKS);
    let mut viewpoint = feet;
    for tick in 0..ticks {
        viewpoint.x += WALK_STEP;
        let result = streamer.tick(&mut store, viewpoint);
        if config.debug.show_triangle_count && (result.loaded > 0 || result.evicted > 0) {
            info!(
                "tick {tick}: +{} -{} chunks, {} resident, {} triangles",
                result.loaded,
                result.evicted,
                store.len(),
                streamer.total_triangles()
            );
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    if !streamer.settle(&mut store, viewpoint, SETTLE_TIMEOUT) {
        warn!("streamer did not settle after the walk");
    }

    info!(
        "Session done: {} resident chunks, {} meshes, {} triangles, {} edited blocks",
        store.len(),
        streamer.meshes().len(),
        streamer.total_triangles(),
        store.overlay_len()
    );
    streamer.shutdown();
    Ok(())
}
