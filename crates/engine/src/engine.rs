//! Game engine - one owned game plus its observers
//!
//! [`GameEngine`] is the surface presentation code talks to. It forwards
//! player actions to the [`Game`], drives the resolution phases (at once, or
//! paced by elapsed time when animating), fans queued events out to every
//! subscribed [`GameObserver`], and runs the idle-hint timer.

use log::{debug, warn};

use crate::config::EngineConfig;
use crate::core::{
    Game, GameConfig, GameEvent, GameSnapshot, GameState, Grid, MatchResolved, PhaseStep,
    Reward, RewardOffer, ShuffleReport,
};
use crate::hint::HintWorker;
use crate::types::{ActionError, Coord, ItemKind, LineDirection, SwapMove};

/// Callbacks for presentation collaborators. Every method defaults to a
/// no-op, so implementors pick what they need.
pub trait GameObserver {
    /// After every phase transition and accepted action
    fn on_state_change(&mut self, _state: &GameState) {}
    /// After every grid mutation (swap, mark, compaction, shuffle)
    fn on_grid_change(&mut self, _grid: &Grid) {}
    fn on_match_resolved(&mut self, _resolved: &MatchResolved) {}
    fn on_swap_reverted(&mut self, _swap: SwapMove) {}
    fn on_reward_offered(&mut self, _offer: &RewardOffer) {}
    fn on_shuffled(&mut self, _report: &ShuffleReport) {}
    fn on_game_over(&mut self, _final_score: u64) {}
    /// Idle-timer hint; fires at most once per idle stretch
    fn on_hint(&mut self, _hint: SwapMove) {}
}

/// Handle returned by [`GameEngine::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observers = Vec<(ObserverId, Box<dyn GameObserver + Send>)>;

pub struct GameEngine {
    game: Game,
    config: EngineConfig,
    observers: Observers,
    next_observer: u64,
    /// Time left before the next phase may run
    phase_wait_ms: u32,
    /// Idle time since the last action
    idle_ms: u32,
    hint_shown: bool,
    hint_worker: Option<HintWorker>,
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        let hint_worker = if config.background_hints {
            match HintWorker::start() {
                Ok(worker) => Some(worker),
                Err(err) => {
                    warn!("hint worker unavailable, scanning inline: {}", err);
                    None
                }
            }
        } else {
            None
        };

        Self {
            game: Game::new(config.game),
            config,
            observers: Vec::new(),
            next_observer: 0,
            phase_wait_ms: 0,
            idle_ms: 0,
            hint_shown: false,
            hint_worker,
        }
    }

    /// Wrap an existing game (fixed boards, replays)
    pub fn with_game(config: EngineConfig, game: Game) -> Self {
        let mut engine = Self::new(config);
        engine.game = game;
        engine
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }

    pub fn subscribe(&mut self, observer: Box<dyn GameObserver + Send>) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    pub fn swap(&mut self, a: Coord, b: Coord) -> Result<(), ActionError> {
        self.game.swap(a, b)?;
        self.on_action();
        Ok(())
    }

    /// Swap from unchecked input coordinates
    pub fn swap_cells(&mut self, row1: i32, col1: i32, row2: i32, col2: i32) -> Result<(), ActionError> {
        let a = Coord::checked(row1, col1).ok_or(ActionError::OutOfBounds)?;
        let b = Coord::checked(row2, col2).ok_or(ActionError::OutOfBounds)?;
        self.swap(a, b)
    }

    pub fn use_item(
        &mut self,
        kind: ItemKind,
        at: Coord,
        direction: Option<LineDirection>,
    ) -> Result<(), ActionError> {
        self.game.use_item(kind, at, direction)?;
        self.on_action();
        Ok(())
    }

    pub fn shuffle(&mut self) -> Result<ShuffleReport, ActionError> {
        let report = self.game.shuffle()?;
        self.on_action();
        Ok(report)
    }

    pub fn select_reward(&mut self, index: usize) -> Result<Reward, ActionError> {
        let reward = self.game.select_reward(index)?;
        self.flush();
        Ok(reward)
    }

    /// Start over; `None` reuses the configured game settings
    pub fn restart(&mut self, config: Option<GameConfig>) {
        self.game.restart(config.unwrap_or(self.config.game));
        self.on_action();
    }

    /// Synchronous hint scan of the current board
    pub fn request_hint(&self) -> Option<SwapMove> {
        self.game.request_hint()
    }

    /// Run one phase and notify observers
    pub fn step(&mut self) -> Option<PhaseStep> {
        let step = self.game.advance();
        self.flush();
        step
    }

    /// Run phases until idle or over, ignoring delays
    pub fn run_until_idle(&mut self) -> usize {
        let mut phases = 0;
        while self.step().is_some() {
            phases += 1;
        }
        self.phase_wait_ms = 0;
        phases
    }

    /// Advance engine time.
    ///
    /// While a chain is in flight, phases run as their delays elapse (or all
    /// at once when not animating). While idle, the hint timer counts up.
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.game.tick(elapsed_ms);

        if self.game.is_busy() {
            if self.config.animate {
                self.run_paced(elapsed_ms);
            } else {
                self.run_until_idle();
            }
            return;
        }

        if self.game.is_over() {
            return;
        }
        self.idle_ms = self.idle_ms.saturating_add(elapsed_ms);
        self.poll_hint();
    }

    fn run_paced(&mut self, elapsed_ms: u32) {
        let mut budget = elapsed_ms;
        loop {
            if self.phase_wait_ms > budget {
                self.phase_wait_ms -= budget;
                break;
            }
            budget -= self.phase_wait_ms;
            self.phase_wait_ms = 0;
            match self.step() {
                Some(step) => self.phase_wait_ms = step.delay_ms,
                None => break,
            }
        }
    }

    fn poll_hint(&mut self) {
        if self.hint_shown || self.idle_ms < self.config.hint_delay_ms {
            return;
        }

        let hint = match self.hint_worker.as_mut() {
            Some(worker) => {
                if !worker.in_flight() {
                    worker.request(self.game.grid());
                }
                match worker.try_recv() {
                    Some(result) => result.hint,
                    None => return,
                }
            }
            None => self.game.request_hint(),
        };

        self.hint_shown = true;
        if let Some(hint) = hint {
            debug!("hint after {}ms idle: {:?}", self.idle_ms, hint);
            for (_, observer) in self.observers.iter_mut() {
                observer.on_hint(hint);
            }
        }
    }

    /// An action was accepted: reset idle tracking and publish its events
    fn on_action(&mut self) {
        self.idle_ms = 0;
        self.hint_shown = false;
        self.phase_wait_ms = 0;
        if let Some(worker) = self.hint_worker.as_mut() {
            worker.cancel();
        }
        self.flush();
    }

    fn flush(&mut self) {
        for event in self.game.take_events() {
            dispatch(&mut self.observers, &self.game, &event);
        }
    }
}

fn dispatch(observers: &mut Observers, game: &Game, event: &GameEvent) {
    for (_, observer) in observers.iter_mut() {
        match event {
            GameEvent::StateChanged(state) => observer.on_state_change(state),
            GameEvent::GridChanged => observer.on_grid_change(game.grid()),
            GameEvent::MatchResolved(resolved) => observer.on_match_resolved(resolved),
            GameEvent::SwapReverted(swap) => observer.on_swap_reverted(*swap),
            GameEvent::RewardOffered(offer) => observer.on_reward_offered(offer),
            GameEvent::Shuffled(report) => observer.on_shuffled(report),
            GameEvent::GameOver { final_score } => observer.on_game_over(*final_score),
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
