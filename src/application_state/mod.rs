//! # Application State Management
//!
//! This module drives a headless session of the engine:
//! - Initial load around the origin, then a spawn
//! - A wandering observer moved through collision resolution
//! - Occasional mining and placing along the observer's gaze
//! - Shutdown and save when the session ends

use std::{thread, time::Duration};

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, info};
use web_time::Instant;

use crate::engine_state::{
    voxels::chunk_manager::TickReport, EngineError, EngineState, MineOutcome, PlaceOutcome,
};

/// Horizontal distance the observer covers per tick.
pub const WALK_SPEED: f32 = 0.15;

/// Downward displacement applied per tick while walking.
pub const GRAVITY_STEP: f32 = 0.2;

/// Ticks between two changes of walking direction.
pub const TURN_INTERVAL: u32 = 40;

/// The observer driven through the world by the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Eye position in world space
    pub position: Point3<f32>,
    /// Unit walking direction in the horizontal plane
    pub heading: Vector3<f32>,
    /// Unit gaze direction used for targeting
    pub gaze: Vector3<f32>,
}

impl Observer {
    fn new(position: Point3<f32>) -> Self {
        Observer {
            position,
            heading: Vector3::new(1.0, 0.0, 0.0),
            gaze: Vector3::new(1.0, 0.0, -1.0).normalize(),
        }
    }
}

/// What happened over a whole session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Ticks run
    pub ticks: u32,
    /// Whether the initial load completed during the session
    pub spawned: bool,
    /// Blocks mined
    pub mined: u32,
    /// Blocks placed
    pub placed: u32,
}

/// The running session: engine, observer and the randomness steering it.
pub struct ApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// The wandering observer
    pub observer: Observer,

    /// Timestamp of the last tick for timing logs
    pub last_wait_time: Instant,

    rng: fastrand::Rng,
    summary: SessionSummary,
}

impl ApplicationState {
    /// Starts a session with the observer at the engine's spawn position.
    ///
    /// # Arguments
    /// * `engine_state` - The engine to drive
    /// * `seed` - Seed of the observer's random walk
    pub fn new(engine_state: EngineState, seed: u64) -> Self {
        let observer = Observer::new(engine_state.spawn_position());
        ApplicationState {
            engine_state,
            observer,
            last_wait_time: Instant::now(),
            rng: fastrand::Rng::with_seed(seed),
            summary: SessionSummary::default(),
        }
    }

    /// Runs one tick: scheduling first, then the observer's move and action.
    pub fn step(&mut self) -> TickReport {
        let now = Instant::now();
        let wait_dt = now - self.last_wait_time;
        self.last_wait_time = now;

        let report = self.engine_state.tick(self.observer.position);
        if let Some(spawn) = report.spawn {
            info!("Initial load complete, spawning at {:?}", spawn);
            self.observer.position = spawn;
            self.summary.spawned = true;
        } else if self.summary.spawned {
            self.wander();
        }

        self.summary.ticks += 1;
        debug!(
            "Tick {} after {:?}: {}% loaded, {} resident",
            self.summary.ticks,
            wait_dt,
            report.progress.percent(),
            self.engine_state.chunk_manager().resident_count()
        );
        report
    }

    /// Runs `ticks` ticks, sleeping `tick_duration` between them.
    pub fn run(&mut self, ticks: u32, tick_duration: Duration) -> SessionSummary {
        for _ in 0..ticks {
            self.step();
            if !tick_duration.is_zero() {
                thread::sleep(tick_duration);
            }
        }
        self.summary
    }

    /// Stops the engine and saves the edits made during the session.
    pub fn finish(mut self) -> Result<SessionSummary, EngineError> {
        self.engine_state.shutdown()?;
        info!(
            "Session finished after {} ticks: {} mined, {} placed",
            self.summary.ticks, self.summary.mined, self.summary.placed
        );
        Ok(self.summary)
    }

    /// Totals so far.
    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    fn wander(&mut self) {
        if self.summary.ticks % TURN_INTERVAL == 0 {
            let angle = self.rng.f32() * std::f32::consts::TAU;
            self.observer.heading = Vector3::new(angle.cos(), angle.sin(), 0.0);
            self.observer.gaze = Vector3::new(angle.cos(), angle.sin(), -1.0).normalize();
        }

        let displacement = self.observer.heading * WALK_SPEED - Vector3::unit_z() * GRAVITY_STEP;
        let movement = self.engine_state.resolve_movement(self.observer.position, displacement);
        self.observer.position = movement.position;

        if movement.blocked_horizontal {
            self.act();
        }
    }

    // Tunnels through whatever blocks the walk, and sometimes builds instead.
    fn act(&mut self) {
        let eye = self.observer.position;
        let gaze = self.observer.gaze;
        if self.rng.u8(..4) == 0 {
            if let PlaceOutcome::Placed(_) = self.engine_state.place_targeted(eye, gaze) {
                self.summary.placed += 1;
            }
        } else if let MineOutcome::Mined(_) = self.engine_state.mine_targeted(eye, gaze) {
            self.summary.mined += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{config::EngineConfig, voxels::edits::EditStore};

    fn session(worker_count: usize) -> ApplicationState {
        let config = EngineConfig {
            worker_count,
            render_distance: 1,
            ..EngineConfig::default()
        };
        let mut app = ApplicationState::new(EngineState::new(config, EditStore::new()), 7);
        app.observer.position = Point3::new(0.5, 0.5, 4.0);
        app
    }

    #[test]
    fn observer_starts_at_spawn() {
        let config = EngineConfig {
            worker_count: 0,
            ..EngineConfig::default()
        };
        let app = ApplicationState::new(EngineState::new(config, EditStore::new()), 7);
        assert_eq!(app.observer.position, app.engine_state.spawn_position());
    }

    #[test]
    fn observer_waits_for_the_initial_load() {
        let mut app = session(0);
        let start = app.observer.position;
        app.run(5, Duration::ZERO);

        assert_eq!(app.observer.position, start);
        assert_eq!(app.summary().ticks, 5);
        assert!(!app.summary().spawned);
    }

    #[test]
    fn session_spawns_once_loaded() {
        let mut app = session(2);
        for _ in 0..2000 {
            if app.step().spawn.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        assert!(app.summary().spawned);

        app.run(50, Duration::ZERO);
        assert!(app.summary().ticks > 50);
    }
}
