#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A chunked voxel world engine: procedural terrain, a sparse world block
//! map, budgeted background generation and meshing around a moving observer,
//! and player edits persisted across sessions.
//!
//! ## Key Modules
//!
//! * `application_state` - The headless session driving the engine
//! * `core` - Core utilities and data structures used throughout the engine
//! * `engine_state` - Terrain, chunks, scheduling, physics queries and edits
//!
//! ## Architecture
//!
//! The engine follows a modular architecture with clear separation between:
//! * Pure terrain generation, shared with worker threads
//! * Owning-thread state (world map, chunks, edit store)
//! * Task scheduling and execution
//! * Mesh data exposed for an external renderer
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     if let Err(error) = voxel_world::run() {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

use std::{path::PathBuf, time::Duration};

use log::info;

use application_state::ApplicationState;
use engine_state::{
    config::{EngineConfig, DEFAULT_CONFIG_FILE},
    EngineError, EngineState,
};

pub mod application_state;
pub mod core;
pub mod engine_state;

/// Runs a headless session: load, wander for the configured ticks, save.
///
/// The configuration path is the first command line argument, falling back
/// to `voxel.json` in the working directory.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG");
    // A logger installed by an embedding program wins.
    let _ = log_builder.try_init();
    info!("Logger initialized");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = EngineConfig::load_or_default(&config_path);
    let session_ticks = config.session_ticks;
    let tick_duration = Duration::from_millis(config.tick_millis);

    let engine_state = EngineState::load(config)?;
    let mut state = ApplicationState::new(engine_state, fastrand::u64(..));
    state.run(session_ticks, tick_duration);
    state.finish()?;
    Ok(())
}
