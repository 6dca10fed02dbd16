//! Headless autoplay: plays hint moves until the run ends and reports a
//! summary.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, LevelFilter};
use serde::Serialize;

use crate::core::{ArtifactKind, GameState, Inventory, MatchResolved, ShuffleReport};
use crate::engine::{EngineConfig, GameEngine, GameObserver};
use crate::types::Difficulty;

/// Env var holding the log level for the binary
pub const ENV_LOG: &str = "TILE_CASCADE_LOG";

/// Simulated pause before each move, inside the streak window
pub const DEFAULT_THINK_MS: u32 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoplayConfig {
    pub engine: EngineConfig,
    /// Stop after this many turns even if moves remain
    pub max_turns: u32,
    /// Clock time ticked between moves
    pub think_ms: u32,
    pub pretty: bool,
}

impl AutoplayConfig {
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            max_turns: 500,
            think_ms: DEFAULT_THINK_MS,
            pretty: false,
        }
    }
}

/// Parse `--seed`, `--difficulty`, `--max-turns`, `--think-ms`,
/// `--config <json file>` and `--pretty` on top of `base`.
pub fn parse_autoplay_args(args: &[String], base: EngineConfig) -> Result<AutoplayConfig> {
    let mut config = AutoplayConfig::new(base);
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("autoplay: missing value for --seed"))?;
                config.engine.game.seed = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("autoplay: invalid --seed value: {}", v))?;
            }
            "--difficulty" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("autoplay: missing value for --difficulty"))?;
                config.engine.game.difficulty = Difficulty::from_str(v)
                    .ok_or_else(|| anyhow!("autoplay: unknown difficulty: {}", v))?;
            }
            "--max-turns" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("autoplay: missing value for --max-turns"))?;
                config.max_turns = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("autoplay: invalid --max-turns value: {}", v))?;
            }
            "--think-ms" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("autoplay: missing value for --think-ms"))?;
                config.think_ms = v
                    .parse::<u32>()
                    .map_err(|_| anyhow!("autoplay: invalid --think-ms value: {}", v))?;
            }
            "--config" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| anyhow!("autoplay: missing value for --config"))?;
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("autoplay: reading {}", path))?;
                config.engine = EngineConfig::from_json(&text)
                    .with_context(|| format!("autoplay: parsing {}", path))?;
            }
            "--pretty" => config.pretty = true,
            other => {
                return Err(anyhow!("autoplay: unknown argument: {}", other));
            }
        }
        i += 1;
    }
    config.engine.animate = false;
    Ok(config)
}

/// Log level from `TILE_CASCADE_LOG`, `info` when unset or unreadable
pub fn log_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoplaySummary {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub score: u64,
    pub moves_left: i32,
    pub turns: u32,
    pub coins: u32,
    pub game_over: bool,
    /// Game clock at the end of the run
    pub elapsed_ms: u64,
    pub steps_resolved: u32,
    pub best_combo: u32,
    pub max_streak: u32,
    pub shuffles: u32,
    pub rewards_taken: u32,
    pub artifacts: Vec<ArtifactKind>,
    pub items: Inventory,
}

#[derive(Debug, Default)]
struct Stats {
    steps: u32,
    best_combo: u32,
    max_streak: u32,
    shuffles: u32,
}

struct StatsObserver(Arc<Mutex<Stats>>);

impl GameObserver for StatsObserver {
    fn on_state_change(&mut self, state: &GameState) {
        if let Ok(mut stats) = self.0.lock() {
            stats.max_streak = stats.max_streak.max(state.streak);
        }
    }

    fn on_match_resolved(&mut self, resolved: &MatchResolved) {
        if let Ok(mut stats) = self.0.lock() {
            stats.steps += 1;
            stats.best_combo = stats.best_combo.max(resolved.combo_after);
        }
    }

    fn on_shuffled(&mut self, _report: &ShuffleReport) {
        if let Ok(mut stats) = self.0.lock() {
            stats.shuffles += 1;
        }
    }

    fn on_game_over(&mut self, final_score: u64) {
        info!("autoplay finished with {} points", final_score);
    }
}

/// Play a full run: take the first acceptable reward, wait `think_ms`, then
/// play the hint move, until the game ends or `max_turns` is reached.
pub fn run_autoplay(config: &AutoplayConfig) -> AutoplaySummary {
    let mut engine = GameEngine::new(config.engine);
    let stats = Arc::new(Mutex::new(Stats::default()));
    engine.subscribe(Box::new(StatsObserver(stats.clone())));

    let mut rewards_taken = 0;
    while !engine.game().is_over() && engine.game().state().turn < config.max_turns {
        while engine.game().pending_offers().next().is_some() {
            let choices = engine
                .game()
                .pending_offers()
                .next()
                .map_or(0, |offer| offer.choices.len());
            let taken = (0..choices).find_map(|index| engine.select_reward(index).ok());
            match taken {
                Some(reward) => {
                    debug!("took {:?}", reward);
                    rewards_taken += 1;
                }
                None => break,
            }
        }

        engine.tick(config.think_ms);

        let accepted = match engine.request_hint() {
            Some(hint) => engine.swap(hint.a, hint.b).is_ok(),
            None => engine.shuffle().is_ok(),
        };
        if !accepted {
            break;
        }
        engine.run_until_idle();
    }

    let snapshot = engine.snapshot();
    let state = snapshot.state;
    let (steps_resolved, best_combo, max_streak, shuffles) = stats
        .lock()
        .map(|s| (s.steps, s.best_combo, s.max_streak, s.shuffles))
        .unwrap_or_default();
    AutoplaySummary {
        seed: snapshot.seed,
        difficulty: snapshot.difficulty,
        score: state.score,
        moves_left: state.moves,
        turns: state.turn,
        coins: state.coins,
        game_over: state.game_over,
        elapsed_ms: snapshot.clock_ms,
        steps_resolved,
        best_combo,
        max_streak,
        shuffles,
        rewards_taken,
        artifacts: snapshot.artifacts,
        items: snapshot.inventory,
    }
}
