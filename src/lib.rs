//! Arcade Duo - shared core of a vertical shooter and a three-lane runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, progression)
//! - `driver`: Frame driver sessions and the game-over handler
//! - `persistence`: Key/value storage for progress and high scores
//! - `leaderboard`: Remote ranking service behind a fire-and-poll request
//! - `settings`: Data-driven game balance

pub mod driver;
pub mod highscores;
pub mod leaderboard;
pub mod persistence;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use driver::{RunnerSession, ShooterSession};
pub use highscores::{LeaderboardEntry, Ranking};
pub use settings::{RunnerTuning, Settings, ShooterTuning};

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const START_LIVES: u8 = 3;
    pub const PLAYER_Y: f32 = 520.0;
    /// Horizontal margin the shooter player cannot cross
    pub const PLAYER_MARGIN: f32 = 20.0;

    /// Enemies appear just above the visible field
    pub const ENEMY_SPAWN_Y: f32 = -20.0;
    /// Horizontal band enemies spawn in: [MARGIN, MARGIN + SPAN)
    pub const ENEMY_SPAWN_MARGIN: f32 = 20.0;
    pub const ENEMY_SPAWN_SPAN: f32 = 360.0;

    /// Boss spawn point and bounce limits
    pub const BOSS_START_X: f32 = 200.0;
    pub const BOSS_Y: f32 = 80.0;
    pub const BOSS_MIN_X: f32 = 40.0;
    pub const BOSS_MAX_X: f32 = 360.0;

    /// Points per kill
    pub const ENEMY_KILL_SCORE: u64 = 10;
    pub const BOSS_HIT_SCORE: u64 = 5;

    /// Runner lanes
    pub const LANE_COUNT: u8 = 3;
    pub const RUNNER_START_LANE: u8 = 1;
    pub const RUNNER_SPAWN_Y: f32 = -30.0;
}

/// Center x coordinate of a runner lane
#[inline]
pub fn lane_center_x(lane: u8) -> f32 {
    use consts::{FIELD_WIDTH, LANE_COUNT};
    let width = FIELD_WIDTH / LANE_COUNT as f32;
    width * lane as f32 + width / 2.0
}
