//! Arcade Duo entry point
//!
//! Native builds run a headless autoplay session of either game and print a
//! summary. The browser build is driven through the `web` bindings instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::sync::Arc;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use arcade_duo::consts::*;
    use arcade_duo::driver::FixedName;
    use arcade_duo::leaderboard::{HttpLeaderboard, LeaderboardService, OfflineLeaderboard};
    use arcade_duo::persistence::{FileStore, KeyValueStore, MemoryStore};
    use arcade_duo::sim::{GamePhase, RunnerState, ShooterState, TickInput};
    use arcade_duo::{RunnerSession, Settings, ShooterSession};

    const DEFAULT_TICKS: u64 = 60 * 60;

    pub fn run() {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let game = args.first().map(String::as_str).unwrap_or("shooter");
        let ticks = args
            .get(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TICKS);

        let mut store: Box<dyn KeyValueStore> = match FileStore::open_default() {
            Ok(store) => {
                log::info!("Using save file {}", store.path().display());
                Box::new(store)
            }
            Err(e) => {
                log::warn!("Save file unavailable ({}), progress will not persist", e);
                Box::new(MemoryStore::default())
            }
        };
        let settings = Settings::load_or_init(store.as_mut());
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        match game {
            "runner" => run_runner(&settings, store, seed, ticks),
            "shooter" => run_shooter(&settings, store, seed, ticks),
            other => eprintln!("Unknown game '{}'. Usage: arcade-duo [shooter|runner] [ticks]", other),
        }
    }

    fn run_shooter(settings: &Settings, store: Box<dyn KeyValueStore>, seed: u64, ticks: u64) {
        let leaderboard: Arc<dyn LeaderboardService> = match &settings.leaderboard_url {
            Some(url) => Arc::new(HttpLeaderboard::new(url.as_str())),
            None => Arc::new(OfflineLeaderboard),
        };
        let prompt = FixedName(settings.player_name.clone().or_else(|| Some("autopilot".into())));
        let mut session = ShooterSession::new(settings, store, leaderboard, Box::new(prompt), seed);

        for _ in 0..ticks {
            let input = shooter_autopilot(session.state());
            session.frame(&input);
            if session.state().phase == GamePhase::GameOver {
                break;
            }
        }

        let state = session.state();
        println!(
            "Shooter: {:?} after {} ticks - level {}, score {}, lives {}",
            state.phase, state.time_ticks, state.level, state.score, state.player.lives
        );
        if state.phase == GamePhase::GameOver {
            match session.wait_for_ranking(Duration::from_secs(10)).ranking() {
                Some(ranking) => {
                    println!("Ranking:");
                    for line in ranking.lines() {
                        println!("  {}", line);
                    }
                }
                None => println!("Ranking unavailable"),
            }
        }
    }

    /// Chase the lowest enemy (or the boss) and keep firing
    fn shooter_autopilot(state: &ShooterState) -> TickInput {
        let target = state
            .enemies
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|e| e.pos.x)
            .or_else(|| state.boss.as_ref().map(|b| b.pos.x));
        let x = state.player.pos.x;
        let (left, right) = match target {
            Some(tx) if tx < x - 3.0 => (true, false),
            Some(tx) if tx > x + 3.0 => (false, true),
            _ => (false, false),
        };
        TickInput {
            left,
            right,
            fire: state.time_ticks % 8 == 0,
            start: false,
        }
    }

    fn run_runner(settings: &Settings, store: Box<dyn KeyValueStore>, seed: u64, ticks: u64) {
        let mut session = RunnerSession::new(settings, store, seed);
        session.frame(&TickInput {
            start: true,
            ..Default::default()
        });

        for _ in 0..ticks {
            let input = runner_autopilot(session.state());
            session.frame(&input);
            if session.state().phase == GamePhase::GameOver {
                break;
            }
        }

        let state = session.state();
        println!(
            "Runner: {:?} after {} ticks - level {}, score {}, lives {}, best {}",
            state.phase,
            state.time_ticks,
            state.level,
            state.score,
            state.player.lives,
            session.high_score()
        );
    }

    /// Step toward the lane with the farthest upcoming obstacle
    fn runner_autopilot(state: &RunnerState) -> TickInput {
        let danger = |lane: u8| {
            state
                .obstacles
                .iter()
                .filter(|o| o.lane == lane && o.y < PLAYER_Y + 30.0)
                .map(|o| o.y)
                .fold(f32::MIN, f32::max)
        };
        let current = state.player.lane;
        // current lane first so ties mean staying put
        let best = std::iter::once(current)
            .chain((0..LANE_COUNT).filter(|&lane| lane.abs_diff(current) == 1))
            .min_by(|&a, &b| danger(a).total_cmp(&danger(b)))
            .unwrap_or(current);
        TickInput {
            left: best < current,
            right: best > current,
            ..Default::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arcade Duo (native) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `web::start`, this is just to satisfy the compiler
}
