//! Progression rules and terminal transitions
//!
//! Shooter precedence per tick: boss defeat first (level up, or end of run at
//! the final level), then the score threshold.

use super::state::{GameEvent, GameOverReason, GamePhase, RunnerState, ShooterState};

/// Remove one life from the ship; the last one ends the run
pub fn shooter_player_hit(state: &mut ShooterState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.player.lives = state.player.lives.saturating_sub(1);
    let lives = state.player.lives;
    state.emit(GameEvent::PlayerHit { lives });
    if lives == 0 {
        end_shooter_run(state, GameOverReason::OutOfLives);
    }
}

/// Enter GameOver. Fires at most once per run.
pub fn end_shooter_run(state: &mut ShooterState, reason: GameOverReason) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    log::info!(
        "Shooter run over ({:?}) at level {} with {} points",
        reason,
        state.level,
        state.score
    );
    let (score, level) = (state.score, state.level);
    state.emit(GameEvent::GameOver {
        score,
        level,
        reason,
    });
}

/// Boss defeat and score-threshold level-ups
pub fn apply_shooter_progression(state: &mut ShooterState) {
    if state.phase != GamePhase::Playing {
        return;
    }

    let enrage_ticks = state.tuning.boss_enrage_ticks;
    let defeated = state
        .boss
        .as_ref()
        .filter(|b| b.life == 0)
        .map(|b| b.time > enrage_ticks);
    if let Some(enraged) = defeated {
        let level = state.level;
        state.boss = None;
        log::info!("Boss defeated at level {} (enraged: {})", level, enraged);
        state.emit(GameEvent::BossDefeated { level, enraged });

        if level >= state.tuning.max_level {
            end_shooter_run(state, GameOverReason::FinalBossDefeated);
            return;
        }
        level_up(state);
    }

    let threshold = state.level as u64 * state.tuning.level_score_step;
    if !state.boss_active() && state.score > threshold {
        level_up(state);
    }
}

fn level_up(state: &mut ShooterState) {
    state.level += 1;
    log::info!("Level up: {} ({} points)", state.level, state.score);
    let (level, score) = (state.level, state.score);
    state.emit(GameEvent::LevelUp { level, score });
}

/// Remove one runner life; the last one ends the run
pub fn runner_player_hit(state: &mut RunnerState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.player.lives = state.player.lives.saturating_sub(1);
    let lives = state.player.lives;
    state.emit(GameEvent::PlayerHit { lives });
    if lives == 0 {
        end_runner_run(state);
    }
}

pub fn end_runner_run(state: &mut RunnerState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    log::info!("Runner run over with {} points", state.score);
    let (score, level) = (state.score, state.level);
    state.emit(GameEvent::GameOver {
        score,
        level,
        reason: GameOverReason::OutOfLives,
    });
}

/// Survival scoring and the speed ramp
pub fn apply_runner_progression(state: &mut RunnerState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.score += 1;

    let step = state.tuning.level_score_step.max(1);
    let level = 1 + (state.score / step) as u32;
    if level > state.level {
        state.level = level;
        state.speed = state.tuning.speed_for_level(level);
        log::debug!("Runner level {} (speed {})", level, state.speed);
        let score = state.score;
        state.emit(GameEvent::LevelUp { level, score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{RunnerTuning, ShooterTuning};
    use crate::sim::state::Boss;

    fn shooter() -> ShooterState {
        ShooterState::new(ShooterTuning::without_random_spawns(), 11)
    }

    #[test]
    fn test_boss_defeat_levels_up() {
        let mut state = shooter();
        state.level = 5;
        state.score = 400;
        let mut boss = Boss::new(0);
        boss.time = 100;
        state.boss = Some(boss);

        apply_shooter_progression(&mut state);

        assert!(state.boss.is_none());
        assert_eq!(state.level, 6);
        assert_eq!(state.phase, GamePhase::Playing);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::BossDefeated {
            level: 5,
            enraged: false
        }));
        assert!(events.contains(&GameEvent::LevelUp {
            level: 6,
            score: 400
        }));
    }

    #[test]
    fn test_final_boss_ends_run() {
        let mut state = shooter();
        state.level = 9;
        state.score = 5000;
        state.boss = Some(Boss::new(0));

        apply_shooter_progression(&mut state);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.level, 9);
        assert!(state.drain_events().contains(&GameEvent::GameOver {
            score: 5000,
            level: 9,
            reason: GameOverReason::FinalBossDefeated,
        }));
    }

    #[test]
    fn test_live_boss_blocks_score_threshold() {
        let mut state = shooter();
        state.level = 3;
        state.score = 10_000;
        state.boss = Some(Boss::new(5));
        apply_shooter_progression(&mut state);
        assert_eq!(state.level, 3);

        state.boss = None;
        apply_shooter_progression(&mut state);
        assert_eq!(state.level, 4);
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let mut state = shooter();
        state.score = 200;
        apply_shooter_progression(&mut state);
        assert_eq!(state.level, 1);

        state.score = 210;
        apply_shooter_progression(&mut state);
        assert_eq!(state.level, 2);
        // one level per tick
        state.score = 10_000;
        apply_shooter_progression(&mut state);
        assert_eq!(state.level, 3);
    }

    #[test]
    fn test_boss_defeat_then_threshold_same_tick() {
        let mut state = shooter();
        state.level = 3;
        state.score = 900;
        state.boss = Some(Boss::new(0));
        apply_shooter_progression(&mut state);
        assert_eq!(state.level, 5);
    }

    #[test]
    fn test_hits_after_game_over_are_ignored() {
        let mut state = shooter();
        state.player.lives = 1;
        shooter_player_hit(&mut state);
        shooter_player_hit(&mut state);
        assert_eq!(state.player.lives, 0);
        let events = state.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], GameEvent::GameOver { .. }));
    }

    #[test]
    fn test_runner_speed_ramps_with_score() {
        let mut state = RunnerState::new(RunnerTuning::default(), 1);
        state.phase = GamePhase::Playing;
        for _ in 0..499 {
            apply_runner_progression(&mut state);
        }
        assert_eq!(state.level, 1);
        apply_runner_progression(&mut state);
        assert_eq!(state.score, 500);
        assert_eq!(state.level, 2);
        assert_eq!(state.speed, 4.5);
    }

    #[test]
    fn test_runner_last_life() {
        let mut state = RunnerState::new(RunnerTuning::default(), 1);
        state.phase = GamePhase::Playing;
        for _ in 0..5 {
            runner_player_hit(&mut state);
        }
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }
}
