//! # Voxel World Entry Point
//!
//! This is the main entry point for the headless session binary.
//! It simply calls into the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- voxel.json
//! ```

fn main() {
    if let Err(error) = voxel_world::run() {
        log::error!("Session failed: {error}");
        std::process::exit(1);
    }
}
