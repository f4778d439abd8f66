//! Entity spawning
//!
//! Random spawns are independent Bernoulli trials per tick, drawn from the
//! state's seeded RNG. The boss rule is deterministic.

use glam::Vec2;
use rand::Rng;

use super::state::{Boss, Enemy, GameEvent, Obstacle, PowerUp, PowerUpKind, RunnerState, ShooterState};
use crate::consts::*;

/// Run every shooter spawn rule once
pub fn spawn_shooter(state: &mut ShooterState) {
    let chance = state.tuning.enemy_spawn_chance.clamp(0.0, 1.0);
    if !state.boss_active() && state.rng.random_bool(chance) {
        let x = state.rng.random::<f32>() * ENEMY_SPAWN_SPAN + ENEMY_SPAWN_MARGIN;
        spawn_enemy(state, x);
    }

    if boss_due(state) {
        spawn_boss(state);
    }
}

/// Add an enemy just above the field at `x`
pub fn spawn_enemy(state: &mut ShooterState, x: f32) {
    let speed = state.tuning.enemy_speed(state.level);
    state.enemies.push(Enemy {
        pos: Vec2::new(x, ENEMY_SPAWN_Y),
        speed,
    });
}

/// True when the level calls for a boss and none is alive
pub fn boss_due(state: &ShooterState) -> bool {
    let interval = state.tuning.boss_level_interval.max(1);
    state.level % interval == 0 && !state.boss_active()
}

/// Spawn the level's boss. No-op if one is already alive.
pub fn spawn_boss(state: &mut ShooterState) {
    if state.boss_active() {
        return;
    }
    let life = state.tuning.boss_life(state.level);
    state.boss = Some(Boss::new(life));
    log::info!("Boss spawned at level {} with {} life", state.level, life);
    state.emit(GameEvent::BossSpawned { life });
}

/// Run every runner spawn rule once
pub fn spawn_runner(state: &mut RunnerState) {
    let obstacle_chance = state.tuning.obstacle_spawn_chance.clamp(0.0, 1.0);
    if state.rng.random_bool(obstacle_chance) {
        let lane = state.rng.random_range(0..LANE_COUNT);
        state.obstacles.push(Obstacle {
            lane,
            y: RUNNER_SPAWN_Y,
        });
    }

    let power_up_chance = state.tuning.power_up_spawn_chance.clamp(0.0, 1.0);
    if state.rng.random_bool(power_up_chance) {
        let lane = state.rng.random_range(0..LANE_COUNT);
        state.power_ups.push(PowerUp {
            lane,
            y: RUNNER_SPAWN_Y,
            kind: PowerUpKind::Shield,
        });
    }
}
