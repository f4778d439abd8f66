//! Fixed per-frame simulation tick
//!
//! Tick order: input → spawn → movement → collisions → progression.

use serde::{Deserialize, Serialize};

use super::collision::{resolve_runner, resolve_shooter};
use super::progression::{apply_runner_progression, apply_shooter_progression};
use super::spawn::{spawn_runner, spawn_shooter};
use super::state::{GameEvent, GamePhase, Projectile, RunnerState, ShooterState};
use crate::consts::*;

/// Input commands for a single tick
///
/// Each flag is a discrete event for this tick; holding a key produces one
/// step per tick, not a velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Shoot (shooter only)
    pub fire: bool,
    /// Start from the menu, or restart after game over
    pub start: bool,
}

/// Advance the shooter by one tick
pub fn tick_shooter(state: &mut ShooterState, input: &TickInput) {
    match state.phase {
        GamePhase::GameOver | GamePhase::Menu => {
            if input.start {
                state.reset();
                log::info!("Shooter run started");
                state.emit(GameEvent::RunStarted);
            }
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;

    state.apply_movement(input);
    if input.fire {
        state.shoot();
    }

    spawn_shooter(state);
    integrate_shooter(state);
    resolve_shooter(state);
    apply_shooter_progression(state);
}

/// Movement and per-entity timers
fn integrate_shooter(state: &mut ShooterState) {
    for bullet in &mut state.bullets {
        bullet.pos.y += bullet.vy;
    }
    state.bullets.retain(|b| b.pos.y > 0.0);

    for enemy in &mut state.enemies {
        enemy.pos.y += enemy.speed;
    }

    if let Some(boss) = state.boss.as_mut() {
        let tuning = &state.tuning;
        boss.pos.x += boss.dir * tuning.boss_speed;
        if boss.pos.x < BOSS_MIN_X || boss.pos.x > BOSS_MAX_X {
            boss.dir = -boss.dir;
        }

        boss.shoot_timer += 1;
        boss.time += 1;

        if boss.shoot_timer > tuning.boss_fire_interval {
            state.boss_bullets.push(Projectile {
                pos: boss.pos,
                vy: tuning.boss_bullet_speed,
            });
            boss.shoot_timer = 0;
        }

        if boss.time > tuning.boss_enrage_ticks && boss.life > 0 {
            log::debug!("Boss enraged after {} ticks", boss.time);
            boss.life = 0;
        }
    }

    for bullet in &mut state.boss_bullets {
        bullet.pos.y += bullet.vy;
    }
    state.boss_bullets.retain(|b| b.pos.y < FIELD_HEIGHT);
}

/// Advance the runner by one tick
pub fn tick_runner(state: &mut RunnerState, input: &TickInput) {
    match state.phase {
        GamePhase::Menu => {
            // any action leaves the menu; the move itself is not applied
            if input.start || input.left || input.right {
                state.phase = GamePhase::Playing;
                log::info!("Runner run started");
                state.emit(GameEvent::RunStarted);
            }
            return;
        }
        GamePhase::GameOver => {
            if input.start {
                state.reset();
                state.phase = GamePhase::Playing;
                log::info!("Runner restarted");
                state.emit(GameEvent::RunStarted);
            }
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;

    state.apply_movement(input);
    spawn_runner(state);
    integrate_runner(state);
    resolve_runner(state);
    apply_runner_progression(state);
}

fn integrate_runner(state: &mut RunnerState) {
    let speed = state.speed;
    for obstacle in &mut state.obstacles {
        obstacle.y += speed;
    }
    for power_up in &mut state.power_ups {
        power_up.y += speed;
    }
    state.obstacles.retain(|o| o.y < FIELD_HEIGHT);
    state.power_ups.retain(|p| p.y < FIELD_HEIGHT);
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;
    use crate::settings::{RunnerTuning, ShooterTuning};

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(left, right, fire)| TickInput {
            left,
            right,
            fire,
            start: false,
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn shooter_invariants_hold(
            seed in any::<u64>(),
            start_level in 1u32..10,
            inputs in prop::collection::vec(input_strategy(), 1..600),
        ) {
            let tuning = ShooterTuning {
                enemy_spawn_chance: 0.2,
                ..Default::default()
            };
            let mut state = ShooterState::new(tuning, seed);
            state.level = start_level;
            let mut game_overs = 0;

            for input in &inputs {
                tick_shooter(&mut state, input);

                prop_assert!(state.player.lives <= START_LIVES);
                prop_assert!(state.bullets.iter().all(|b| b.pos.y > 0.0));
                prop_assert!(state.boss_bullets.iter().all(|b| b.pos.y < FIELD_HEIGHT));
                prop_assert!(state.enemies.iter().all(|e| e.pos.y < FIELD_HEIGHT));
                if state.phase == GamePhase::Playing {
                    prop_assert!(state.boss.as_ref().is_none_or(|b| b.life > 0));
                }
                game_overs += state
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                    .count();
            }

            prop_assert!(game_overs <= 1);
            prop_assert_eq!(game_overs == 1, state.phase == GamePhase::GameOver);
            if state.player.lives == 0 {
                prop_assert_eq!(state.phase, GamePhase::GameOver);
            }
        }

        #[test]
        fn runner_invariants_hold(
            seed in any::<u64>(),
            inputs in prop::collection::vec(input_strategy(), 1..800),
        ) {
            let tuning = RunnerTuning {
                obstacle_spawn_chance: 0.1,
                power_up_spawn_chance: 0.02,
                ..Default::default()
            };
            let mut state = RunnerState::new(tuning, seed);
            state.phase = GamePhase::Playing;
            let mut game_overs = 0;

            for input in &inputs {
                tick_runner(&mut state, input);

                prop_assert!(state.player.lane < LANE_COUNT);
                prop_assert!(state.speed <= state.tuning.max_speed);
                let lane = state.player.lane;
                let y = state.player.y();
                prop_assert!(!state.obstacles.iter().any(|o| o.lane == lane
                    && (o.y - y).abs() < state.tuning.hit_distance));
                game_overs += state
                    .drain_events()
                    .iter()
                    .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                    .count();
            }

            prop_assert!(game_overs <= 1);
            prop_assert_eq!(state.player.lives == 0, state.phase == GamePhase::GameOver);
        }
    }
}
