//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per tick
//! - Seeded RNG only
//! - Stable iteration order (collection order)
//! - No rendering, storage or network dependencies

pub mod collision;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod view;

pub use collision::{compact, hit, lane_hit};
pub use state::{
    Boss, Enemy, GameEvent, GameOverReason, GamePhase, Obstacle, PowerUp, PowerUpKind,
    Projectile, Runner, RunnerState, Ship, ShooterState,
};
pub use tick::{TickInput, tick_runner, tick_shooter};
pub use view::{RunnerView, ShooterView};
