//! Frame driver
//!
//! A session owns one simulation plus its outside collaborators. Each
//! `frame()` runs exactly one tick, then reacts to the tick's events:
//! progress saves, and the game-over handler (storage + leaderboard).
//! Collaborator failures are logged and never reach the simulation.

use std::sync::Arc;

use crate::highscores::LeaderboardEntry;
use crate::leaderboard::{LeaderboardService, RankingRequest, RankingStatus};
use crate::persistence::{KeyValueStore, RunnerRecord, SavedProgress};
use crate::settings::Settings;
use crate::sim::{
    GameEvent, RunnerState, RunnerView, ShooterState, ShooterView, TickInput, tick_runner,
    tick_shooter,
};

/// Asks the player for a leaderboard name
pub trait NamePrompt {
    /// `None` (or a blank answer) skips submission
    fn ask_name(&mut self, score: u64) -> Option<String>;
}

/// Prompt that always gives the same answer
#[derive(Debug, Clone, Default)]
pub struct FixedName(pub Option<String>);

impl NamePrompt for FixedName {
    fn ask_name(&mut self, _score: u64) -> Option<String> {
        self.0.clone()
    }
}

/// Shooter frame driver
pub struct ShooterSession {
    state: ShooterState,
    store: Box<dyn KeyValueStore>,
    leaderboard: Arc<dyn LeaderboardService>,
    prompt: Box<dyn NamePrompt>,
    request: Option<RankingRequest>,
    ranking: RankingStatus,
}

impl ShooterSession {
    /// Resume from stored progress (level 1 on a first run)
    pub fn new(
        settings: &Settings,
        store: Box<dyn KeyValueStore>,
        leaderboard: Arc<dyn LeaderboardService>,
        prompt: Box<dyn NamePrompt>,
        seed: u64,
    ) -> Self {
        let progress = SavedProgress::load(store.as_ref());
        let state = ShooterState::resume(settings.shooter.clone(), seed, progress);
        log::info!(
            "Shooter session at level {} (seed {})",
            state.level,
            seed
        );
        Self {
            state,
            store,
            leaderboard,
            prompt,
            request: None,
            ranking: RankingStatus::Idle,
        }
    }

    /// One display refresh: tick, then handle side effects
    pub fn frame(&mut self, input: &TickInput) {
        tick_shooter(&mut self.state, input);
        for event in self.state.drain_events() {
            self.handle(event);
        }
        self.poll_ranking();
    }

    fn handle(&mut self, event: GameEvent) {
        match event {
            GameEvent::LevelUp { .. } => self.save_progress(),
            GameEvent::RunStarted => {
                self.request = None;
                self.ranking = RankingStatus::Idle;
                self.save_progress();
            }
            GameEvent::GameOver { score, .. } => self.on_game_over(score),
            _ => {}
        }
    }

    fn save_progress(&mut self) {
        let progress = self.state.progress();
        match progress.save(self.store.as_mut()) {
            Ok(()) => log::debug!("Progress saved (level {})", progress.level),
            Err(e) => log::warn!("Failed to save progress: {}", e),
        }
    }

    fn on_game_over(&mut self, score: u64) {
        if let Err(e) = SavedProgress::clear(self.store.as_mut()) {
            log::warn!("Failed to clear progress: {}", e);
        }

        let submission = self
            .prompt
            .ask_name(score)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .map(|name| LeaderboardEntry::new(name, score));

        self.request = Some(RankingRequest::spawn(self.leaderboard.clone(), submission));
        self.ranking = RankingStatus::Pending;
    }

    fn poll_ranking(&mut self) {
        if let Some(request) = self.request.as_mut() {
            let status = request.poll();
            if !status.is_pending() {
                self.ranking = status.clone();
                self.request = None;
            }
        }
    }

    /// Block on an in-flight ranking request (headless tools)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn wait_for_ranking(&mut self, timeout: std::time::Duration) -> &RankingStatus {
        if let Some(mut request) = self.request.take() {
            self.ranking = request.wait(timeout).clone();
            if self.ranking.is_pending() {
                self.request = Some(request);
            }
        }
        &self.ranking
    }

    pub fn state(&self) -> &ShooterState {
        &self.state
    }

    pub fn view(&self) -> ShooterView<'_> {
        self.state.view()
    }

    pub fn ranking(&self) -> &RankingStatus {
        &self.ranking
    }
}

/// Runner frame driver
pub struct RunnerSession {
    state: RunnerState,
    store: Box<dyn KeyValueStore>,
    record: RunnerRecord,
}

impl RunnerSession {
    pub fn new(settings: &Settings, store: Box<dyn KeyValueStore>, seed: u64) -> Self {
        let record = RunnerRecord::load(store.as_ref());
        log::info!("Runner session (best {})", record.high_score);
        Self {
            state: RunnerState::new(settings.runner.clone(), seed),
            store,
            record,
        }
    }

    pub fn frame(&mut self, input: &TickInput) {
        tick_runner(&mut self.state, input);
        for event in self.state.drain_events() {
            if let GameEvent::GameOver { score, .. } = event {
                self.on_game_over(score);
            }
        }
    }

    fn on_game_over(&mut self, score: u64) {
        if !self.record.submit(score) {
            return;
        }
        log::info!("New runner high score: {}", score);
        if let Err(e) = self.record.save(self.store.as_mut()) {
            log::warn!("Failed to save high score: {}", e);
        }
    }

    pub fn high_score(&self) -> u64 {
        self.record.high_score
    }

    pub fn state(&self) -> &RunnerState {
        &self.state
    }

    pub fn view(&self) -> RunnerView<'_> {
        self.state.view()
    }
}
