//! Browser bindings
//!
//! Exposes each game as a handle the page drives from `requestAnimationFrame`:
//! `frame(left, right, fire, start)` then `snapshot()` for the renderer.

use std::sync::Arc;

use wasm_bindgen::prelude::*;

use crate::driver::{NamePrompt, RunnerSession, ShooterSession};
use crate::leaderboard::{FetchLeaderboard, LeaderboardService, OfflineLeaderboard, RankingStatus};
use crate::persistence::LocalStore;
use crate::settings::Settings;
use crate::sim::TickInput;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

/// `window.prompt` for the leaderboard name
struct BrowserPrompt;

impl NamePrompt for BrowserPrompt {
    fn ask_name(&mut self, _score: u64) -> Option<String> {
        web_sys::window()?
            .prompt_with_message("Your name for the ranking:")
            .ok()
            .flatten()
    }
}

fn seed() -> u64 {
    js_sys::Date::now() as u64
}

fn input(left: bool, right: bool, fire: bool, start: bool) -> TickInput {
    TickInput {
        left,
        right,
        fire,
        start,
    }
}

#[wasm_bindgen]
pub struct ShooterHandle {
    session: ShooterSession,
}

#[wasm_bindgen]
impl ShooterHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ShooterHandle {
        let store = LocalStore;
        let settings = Settings::load(&store);
        let leaderboard: Arc<dyn LeaderboardService> = match &settings.leaderboard_url {
            Some(url) => Arc::new(FetchLeaderboard::new(url.as_str())),
            None => Arc::new(OfflineLeaderboard),
        };
        let session = ShooterSession::new(
            &settings,
            Box::new(store),
            leaderboard,
            Box::new(BrowserPrompt),
            seed(),
        );
        ShooterHandle { session }
    }

    pub fn frame(&mut self, left: bool, right: bool, fire: bool, start: bool) {
        self.session.frame(&input(left, right, fire, start));
    }

    /// Current state as JSON
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.session.view()).unwrap_or_default()
    }

    /// Ranking lines, empty while pending or unavailable
    pub fn ranking(&self) -> Vec<String> {
        match self.session.ranking() {
            RankingStatus::Ready(ranking) => ranking.lines(),
            _ => Vec::new(),
        }
    }
}

#[wasm_bindgen]
pub struct RunnerHandle {
    session: RunnerSession,
}

#[wasm_bindgen]
impl RunnerHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> RunnerHandle {
        let store = LocalStore;
        let settings = Settings::load(&store);
        RunnerHandle {
            session: RunnerSession::new(&settings, Box::new(store), seed()),
        }
    }

    pub fn frame(&mut self, left: bool, right: bool, start: bool) {
        self.session.frame(&input(left, right, false, start));
    }

    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.session.view()).unwrap_or_default()
    }

    #[wasm_bindgen(getter)]
    pub fn high_score(&self) -> f64 {
        self.session.high_score() as f64
    }
}
