//! Game state and core simulation types
//!
//! Each entity kind lives in its own typed collection, so collision pairs are
//! spelled out per kind instead of inspecting record shapes.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::tick::TickInput;
use crate::consts::*;
use crate::persistence::SavedProgress;
use crate::settings::{RunnerTuning, ShooterTuning};

/// Coarse game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start action (runner only)
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended; only a restart leaves this state
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    OutOfLives,
    /// Boss defeated at the final level
    FinalBossDefeated,
}

/// Things that happened during a tick, drained by the frame driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A fresh run began (start or restart action)
    RunStarted,
    EnemyDestroyed { pos: Vec2 },
    PlayerHit { lives: u8 },
    BossSpawned { life: u32 },
    BossDefeated { level: u32, enraged: bool },
    LevelUp { level: u32, score: u64 },
    ShieldGained,
    ShieldConsumed,
    GameOver {
        score: u64,
        level: u32,
        reason: GameOverReason,
    },
}

// ---------------------------------------------------------------------------
// Shooter
// ---------------------------------------------------------------------------

/// The shooter's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub lives: u8,
    /// Horizontal step per tick while a direction is held
    pub speed: f32,
}

impl Ship {
    fn new(speed: f32) -> Self {
        Self {
            pos: Vec2::new(FIELD_WIDTH / 2.0, PLAYER_Y),
            lives: START_LIVES,
            speed,
        }
    }
}

/// Player bullet or boss bullet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    /// Vertical velocity (negative = upward)
    pub vy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    /// Descent per tick
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub life: u32,
    /// +1 moving right, -1 moving left
    pub dir: f32,
    pub shoot_timer: u32,
    /// Ticks since the boss appeared
    pub time: u32,
}

impl Boss {
    pub fn new(life: u32) -> Self {
        Self {
            pos: Vec2::new(BOSS_START_X, BOSS_Y),
            life,
            dir: 1.0,
            shoot_timer: 0,
            time: 0,
        }
    }
}

/// Complete shooter run state
#[derive(Debug, Clone)]
pub struct ShooterState {
    pub tuning: ShooterTuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    pub player: Ship,
    pub bullets: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    /// At most one boss at a time
    pub boss: Option<Boss>,
    pub boss_bullets: Vec<Projectile>,
    pub score: u64,
    pub level: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
}

impl ShooterState {
    /// Fresh run at level 1
    pub fn new(tuning: ShooterTuning, seed: u64) -> Self {
        let player = Ship::new(tuning.player_speed);
        Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            player,
            bullets: Vec::new(),
            enemies: Vec::new(),
            boss: None,
            boss_bullets: Vec::new(),
            score: 0,
            level: 1,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Continue from persisted progress
    pub fn resume(tuning: ShooterTuning, seed: u64, progress: SavedProgress) -> Self {
        let mut state = Self::new(tuning, seed);
        state.level = progress.level.max(1);
        state.score = progress.score;
        state
    }

    /// Back to starting values. The RNG stream keeps going.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Playing;
        self.player = Ship::new(self.tuning.player_speed);
        self.bullets.clear();
        self.enemies.clear();
        self.boss = None;
        self.boss_bullets.clear();
        self.score = 0;
        self.level = 1;
        self.time_ticks = 0;
        self.events.clear();
    }

    /// Step the ship left/right, clamped to the playfield margins
    pub fn apply_movement(&mut self, input: &TickInput) {
        let min_x = PLAYER_MARGIN;
        let max_x = FIELD_WIDTH - PLAYER_MARGIN;
        let ship = &mut self.player;
        if input.left {
            ship.pos.x = (ship.pos.x - ship.speed).max(min_x);
        }
        if input.right {
            ship.pos.x = (ship.pos.x + ship.speed).min(max_x);
        }
    }

    /// Fire a bullet from the ship (ignored outside of play)
    pub fn shoot(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.bullets.push(Projectile {
            pos: self.player.pos,
            vy: -self.tuning.bullet_speed,
        });
    }

    pub fn boss_active(&self) -> bool {
        self.boss.is_some()
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current progress record
    pub fn progress(&self) -> SavedProgress {
        SavedProgress {
            level: self.level,
            score: self.score,
        }
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Power-up effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
}

/// The runner's avatar, always at `PLAYER_Y`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runner {
    pub lane: u8,
    pub lives: u8,
    /// Absorbs the next obstacle hit
    pub shield: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            lane: RUNNER_START_LANE,
            lives: START_LIVES,
            shield: false,
        }
    }
}

impl Runner {
    pub fn y(&self) -> f32 {
        PLAYER_Y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub lane: u8,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub lane: u8,
    pub y: f32,
    pub kind: PowerUpKind,
}

/// Complete runner run state
#[derive(Debug, Clone)]
pub struct RunnerState {
    pub tuning: RunnerTuning,
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    pub player: Runner,
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    pub score: u64,
    pub level: u32,
    /// Current scroll speed (pixels per tick)
    pub speed: f32,
    pub time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
}

impl RunnerState {
    /// New runner sitting in the menu
    pub fn new(tuning: RunnerTuning, seed: u64) -> Self {
        let speed = tuning.speed_for_level(1);
        Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            player: Runner::default(),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            score: 0,
            level: 1,
            speed,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Back to starting values, waiting in the menu
    pub fn reset(&mut self) {
        self.phase = GamePhase::Menu;
        self.player = Runner::default();
        self.obstacles.clear();
        self.power_ups.clear();
        self.score = 0;
        self.level = 1;
        self.speed = self.tuning.speed_for_level(1);
        self.time_ticks = 0;
        self.events.clear();
    }

    /// Step one lane per held direction, clamped to the outer lanes
    pub fn apply_movement(&mut self, input: &TickInput) {
        let runner = &mut self.player;
        if input.left {
            runner.lane = runner.lane.saturating_sub(1);
        }
        if input.right {
            runner.lane = (runner.lane + 1).min(LANE_COUNT - 1);
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(left: bool, right: bool) -> TickInput {
        TickInput {
            left,
            right,
            ..Default::default()
        }
    }

    #[test]
    fn test_ship_movement_is_clamped() {
        let mut state = ShooterState::new(ShooterTuning::default(), 1);
        for _ in 0..100 {
            state.apply_movement(&held(true, false));
        }
        assert_eq!(state.player.pos.x, PLAYER_MARGIN);

        for _ in 0..100 {
            state.apply_movement(&held(false, true));
        }
        assert_eq!(state.player.pos.x, FIELD_WIDTH - PLAYER_MARGIN);
    }

    #[test]
    fn test_lane_movement_is_clamped() {
        let mut state = RunnerState::new(RunnerTuning::default(), 1);
        assert_eq!(state.player.lane, 1);
        state.apply_movement(&held(true, false));
        state.apply_movement(&held(true, false));
        assert_eq!(state.player.lane, 0);
        for _ in 0..5 {
            state.apply_movement(&held(false, true));
        }
        assert_eq!(state.player.lane, LANE_COUNT - 1);
    }

    #[test]
    fn test_shooter_reset_is_idempotent() {
        let mut state = ShooterState::resume(
            ShooterTuning::default(),
            7,
            SavedProgress { level: 5, score: 999 },
        );
        state.player.lives = 0;
        state.phase = GamePhase::GameOver;
        state.enemies.push(Enemy {
            pos: Vec2::new(10.0, 10.0),
            speed: 2.0,
        });
        state.boss = Some(Boss::new(10));
        state.shoot();

        for _ in 0..3 {
            state.reset();
            assert_eq!(state.player.lives, START_LIVES);
            assert_eq!(state.score, 0);
            assert_eq!(state.level, 1);
            assert_eq!(state.phase, GamePhase::Playing);
            assert!(state.enemies.is_empty());
            assert!(state.bullets.is_empty());
            assert!(state.boss_bullets.is_empty());
            assert!(state.boss.is_none());
        }
    }

    #[test]
    fn test_no_shooting_after_game_over() {
        let mut state = ShooterState::new(ShooterTuning::default(), 1);
        state.shoot();
        assert_eq!(state.bullets.len(), 1);
        state.phase = GamePhase::GameOver;
        state.shoot();
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_runner_reset_returns_to_menu() {
        let mut state = RunnerState::new(RunnerTuning::default(), 3);
        state.phase = GamePhase::GameOver;
        state.score = 1234;
        state.speed = 9.0;
        state.player.shield = true;
        state.obstacles.push(Obstacle { lane: 0, y: 100.0 });

        state.reset();
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.score, 0);
        assert_eq!(state.speed, state.tuning.base_speed);
        assert!(!state.player.shield);
        assert!(state.obstacles.is_empty());
    }
}
