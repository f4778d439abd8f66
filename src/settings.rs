//! Game settings and balance tuning
//!
//! Persisted as JSON through the key/value store, separately from run progress.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Shooter balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    /// Per-tick chance of a new enemy while no boss is alive
    pub enemy_spawn_chance: f64,
    /// Enemy descent speed is `base + level * per_level`
    pub enemy_base_speed: f32,
    pub enemy_speed_per_level: f32,
    /// Player horizontal step per tick
    pub player_speed: f32,
    /// Upward speed of player bullets
    pub bullet_speed: f32,
    /// Downward speed of boss bullets
    pub boss_bullet_speed: f32,
    /// Boss life is `base + level * per_level`
    pub boss_base_life: u32,
    pub boss_life_per_level: u32,
    pub boss_speed: f32,
    /// Boss fires once its shoot timer exceeds this
    pub boss_fire_interval: u32,
    /// Boss is forced down once its elapsed time exceeds this
    pub boss_enrage_ticks: u32,
    /// A boss appears on every level that is a multiple of this
    pub boss_level_interval: u32,
    /// Defeating a boss at or beyond this level ends the run
    pub max_level: u32,
    /// Level up once `score > level * level_score_step`
    pub level_score_step: u64,
    pub hit_distance: f32,
    pub boss_hit_distance: f32,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            enemy_spawn_chance: 0.02,
            enemy_base_speed: 2.0,
            enemy_speed_per_level: 0.3,
            player_speed: 5.0,
            bullet_speed: 7.0,
            boss_bullet_speed: 4.0,
            boss_base_life: 40,
            boss_life_per_level: 10,
            boss_speed: 2.0,
            boss_fire_interval: 40,
            boss_enrage_ticks: 1800,
            boss_level_interval: 3,
            max_level: 9,
            level_score_step: 200,
            hit_distance: 20.0,
            boss_hit_distance: 30.0,
        }
    }
}

impl ShooterTuning {
    pub fn enemy_speed(&self, level: u32) -> f32 {
        self.enemy_base_speed + level as f32 * self.enemy_speed_per_level
    }

    pub fn boss_life(&self, level: u32) -> u32 {
        self.boss_base_life + level * self.boss_life_per_level
    }

    /// Tuning with every random spawn disabled (scripted scenarios, demos)
    pub fn without_random_spawns() -> Self {
        Self {
            enemy_spawn_chance: 0.0,
            ..Self::default()
        }
    }
}

/// Runner balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    pub obstacle_spawn_chance: f64,
    pub power_up_spawn_chance: f64,
    /// Scroll speed at level 1
    pub base_speed: f32,
    /// Speed added per level
    pub speed_step: f32,
    pub max_speed: f32,
    /// Score needed per level
    pub level_score_step: u64,
    /// Vertical distance under which a same-lane entity touches the player
    pub hit_distance: f32,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            obstacle_spawn_chance: 0.03,
            power_up_spawn_chance: 0.005,
            base_speed: 4.0,
            speed_step: 0.5,
            max_speed: 12.0,
            level_score_step: 500,
            hit_distance: 30.0,
        }
    }
}

impl RunnerTuning {
    /// Scroll speed for a level, capped at `max_speed`
    pub fn speed_for_level(&self, level: u32) -> f32 {
        let ramp = level.saturating_sub(1) as f32 * self.speed_step;
        (self.base_speed + ramp).min(self.max_speed)
    }

    pub fn without_random_spawns() -> Self {
        Self {
            obstacle_spawn_chance: 0.0,
            power_up_spawn_chance: 0.0,
            ..Self::default()
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub shooter: ShooterTuning,
    pub runner: RunnerTuning,
    /// Leaderboard endpoint (Firebase-style REST). `None` keeps the ranking offline.
    pub leaderboard_url: Option<String>,
    /// Answer for the name prompt in headless runs
    pub player_name: Option<String>,
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "arcade_duo_settings";

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unavailable ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings, writing the defaults out on first run so they can be
    /// edited by hand
    pub fn load_or_init(store: &mut dyn KeyValueStore) -> Self {
        let first_run = matches!(store.get(Self::STORAGE_KEY), Ok(None));
        let settings = Self::load(store);
        if first_run {
            settings.save(store);
        }
        settings
    }

    /// Save settings; failures are logged, never fatal
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
