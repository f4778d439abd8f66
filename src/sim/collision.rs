//! Collision detection and response
//!
//! Proximity is an axis-aligned "near enough" test. Resolution is two-phase:
//! a scan marks matched entities, then each collection is compacted once.
//! A marked entity is skipped by every later pair check in the same tick.

use glam::Vec2;

use super::progression::{runner_player_hit, shooter_player_hit};
use super::state::{GameEvent, GamePhase, RunnerState, ShooterState};
use crate::consts::*;

/// True if `a` and `b` are closer than `distance` on both axes
#[inline]
pub fn hit(a: Vec2, b: Vec2, distance: f32) -> bool {
    (a - b).abs().cmplt(Vec2::splat(distance)).all()
}

/// Same lane and vertically closer than `distance`
#[inline]
pub fn lane_hit(lane_a: u8, y_a: f32, lane_b: u8, y_b: f32, distance: f32) -> bool {
    lane_a == lane_b && (y_a - y_b).abs() < distance
}

/// Drop every item whose mark is set. `dead` must match `items` in length.
pub fn compact<T>(items: &mut Vec<T>, dead: &[bool]) {
    debug_assert_eq!(items.len(), dead.len());
    let mut marks = dead.iter();
    items.retain(|_| !marks.next().copied().unwrap_or(false));
}

/// Resolve every shooter collision pair for this tick
///
/// Order: bullet↔enemy, enemy↔player (and enemies past the bottom),
/// boss bullet↔player, bullet↔boss.
pub fn resolve_shooter(state: &mut ShooterState) {
    let hit_distance = state.tuning.hit_distance;
    let boss_distance = state.tuning.boss_hit_distance;

    let mut dead_bullets = vec![false; state.bullets.len()];
    let mut dead_enemies = vec![false; state.enemies.len()];
    let mut dead_boss_bullets = vec![false; state.boss_bullets.len()];

    // Bullets vs enemies
    for (ei, enemy) in state.enemies.iter().enumerate() {
        let matched = state
            .bullets
            .iter()
            .enumerate()
            .find(|(bi, bullet)| !dead_bullets[*bi] && hit(enemy.pos, bullet.pos, hit_distance))
            .map(|(bi, _)| bi);
        if let Some(bi) = matched {
            dead_bullets[bi] = true;
            dead_enemies[ei] = true;
            state.score += ENEMY_KILL_SCORE;
            state.events.push(GameEvent::EnemyDestroyed { pos: enemy.pos });
        }
    }

    // Enemies vs player, or escaping past the bottom
    let mut player_hits = 0u32;
    for (ei, enemy) in state.enemies.iter().enumerate() {
        if dead_enemies[ei] {
            continue;
        }
        if enemy.pos.y >= FIELD_HEIGHT || hit(enemy.pos, state.player.pos, hit_distance) {
            dead_enemies[ei] = true;
            player_hits += 1;
        }
    }

    // Boss bullets vs player
    for (bi, bullet) in state.boss_bullets.iter().enumerate() {
        if hit(bullet.pos, state.player.pos, hit_distance) {
            dead_boss_bullets[bi] = true;
            player_hits += 1;
        }
    }

    // Bullets vs boss
    if let Some(boss) = state.boss.as_mut() {
        for (bi, bullet) in state.bullets.iter().enumerate() {
            if boss.life == 0 {
                break;
            }
            if dead_bullets[bi] || !hit(boss.pos, bullet.pos, boss_distance) {
                continue;
            }
            dead_bullets[bi] = true;
            boss.life -= 1;
            state.score += BOSS_HIT_SCORE;
        }
    }

    compact(&mut state.bullets, &dead_bullets);
    compact(&mut state.enemies, &dead_enemies);
    compact(&mut state.boss_bullets, &dead_boss_bullets);

    for _ in 0..player_hits {
        shooter_player_hit(state);
    }
}

/// Resolve runner pairs: player↔obstacle, player↔power-up
pub fn resolve_runner(state: &mut RunnerState) {
    let distance = state.tuning.hit_distance;
    let lane = state.player.lane;
    let y = state.player.y();

    let dead_power_ups: Vec<bool> = state
        .power_ups
        .iter()
        .map(|p| lane_hit(lane, y, p.lane, p.y, distance))
        .collect();
    let dead_obstacles: Vec<bool> = state
        .obstacles
        .iter()
        .map(|o| lane_hit(lane, y, o.lane, o.y, distance))
        .collect();

    let gained = dead_power_ups.iter().filter(|&&d| d).count();
    let struck = dead_obstacles.iter().filter(|&&d| d).count();

    compact(&mut state.power_ups, &dead_power_ups);
    compact(&mut state.obstacles, &dead_obstacles);

    if gained > 0 && !state.player.shield {
        state.player.shield = true;
        state.emit(GameEvent::ShieldGained);
    }

    for _ in 0..struck {
        if state.phase != GamePhase::Playing {
            break;
        }
        if state.player.shield {
            state.player.shield = false;
            state.emit(GameEvent::ShieldConsumed);
        } else {
            runner_player_hit(state);
        }
    }
}
