//! Read-only snapshots for renderers
//!
//! Views borrow the state, so a renderer can never mutate the simulation.

use glam::Vec2;
use serde::Serialize;

use crate::lane_center_x;

use super::state::{
    Boss, Enemy, GamePhase, Obstacle, PowerUp, Projectile, RunnerState, ShooterState,
};

#[derive(Debug, Clone, Serialize)]
pub struct ShooterView<'a> {
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    pub lives: u8,
    pub player: Vec2,
    pub bullets: &'a [Projectile],
    pub enemies: &'a [Enemy],
    pub boss: Option<&'a Boss>,
    pub boss_bullets: &'a [Projectile],
}

#[derive(Debug, Clone, Serialize)]
pub struct RunnerView<'a> {
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    pub speed: f32,
    pub lives: u8,
    pub lane: u8,
    /// Center of the player's lane
    pub player_x: f32,
    pub shield: bool,
    pub obstacles: &'a [Obstacle],
    pub power_ups: &'a [PowerUp],
}

impl ShooterState {
    pub fn view(&self) -> ShooterView<'_> {
        ShooterView {
            phase: self.phase,
            score: self.score,
            level: self.level,
            lives: self.player.lives,
            player: self.player.pos,
            bullets: &self.bullets,
            enemies: &self.enemies,
            boss: self.boss.as_ref(),
            boss_bullets: &self.boss_bullets,
        }
    }
}

impl RunnerState {
    pub fn view(&self) -> RunnerView<'_> {
        RunnerView {
            phase: self.phase,
            score: self.score,
            level: self.level,
            speed: self.speed,
            lives: self.player.lives,
            lane: self.player.lane,
            player_x: lane_center_x(self.player.lane),
            shield: self.player.shield,
            obstacles: &self.obstacles,
            power_ups: &self.power_ups,
        }
    }
}
