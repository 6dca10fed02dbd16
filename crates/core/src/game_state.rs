//! Game state module - counters, flags and the resolution phase
//!
//! [`GameState`] is the plain record published to observers after every
//! phase transition. It is owned and mutated by [`Game`](crate::game::Game)
//! only.

use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, CHECK_DELAY_MS, REFILL_DELAY_MS, RESOLVE_DELAY_MS, SWAP_DELAY_MS};

/// Inputs to a fresh run, consumed by `Game::new` and `Game::restart`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub seed: u32,
}

impl GameConfig {
    pub fn new(difficulty: Difficulty, seed: u32) -> Self {
        Self { difficulty, seed }
    }
}

/// Where the resolution state machine currently stands
///
/// `Refilling` and `Settling` split the tail of a resolution step into its
/// own suspension points so that each `advance` performs one grid mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Swapping,
    Checking,
    Resolving { combo: u32 },
    Refilling { combo: u32 },
    Settling,
    GameOver,
}

impl Phase {
    /// Pause a presentation layer should leave after this phase has run
    pub fn delay_ms(&self) -> u32 {
        match self {
            Phase::Swapping => SWAP_DELAY_MS,
            Phase::Checking => CHECK_DELAY_MS,
            Phase::Resolving { .. } => RESOLVE_DELAY_MS,
            Phase::Refilling { .. } => REFILL_DELAY_MS,
            Phase::Idle | Phase::Settling | Phase::GameOver => 0,
        }
    }

    /// True while a chain is in flight and player input must be rejected
    pub fn is_busy(&self) -> bool {
        !matches!(self, Phase::Idle | Phase::GameOver)
    }
}

/// Outcome of one `advance` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStep {
    /// Phase whose work was just performed
    pub phase: Phase,
    /// Suggested pause before the next `advance`
    pub delay_ms: u32,
}

/// Counters and flags of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    /// Remaining move budget; the run ends when this reaches 0 or below
    pub moves: i32,
    /// 1 at rest; the multiplier of the step currently resolving otherwise
    pub combo: u32,
    /// Accepted player actions so far
    pub turn: u32,
    pub coins: u32,
    /// Current streak length (see [`Streak`](crate::scoring::Streak))
    pub streak: u32,
    pub swapping: bool,
    pub resolving: bool,
    pub game_over: bool,
}

impl GameState {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            score: 0,
            moves: difficulty.starting_moves(),
            combo: 1,
            turn: 0,
            coins: 0,
            streak: 0,
            swapping: false,
            resolving: false,
            game_over: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.swapping || self.resolving
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}
