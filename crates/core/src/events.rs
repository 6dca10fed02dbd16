//! Events queued by the resolution loop for presentation collaborators
//!
//! `Game` appends to an internal queue; callers drain it with
//! `Game::take_events` after each `advance` or action.

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::game_state::GameState;
use crate::matcher::{CellSet, MatchList};
use crate::rewards::RewardOffer;
use crate::types::{Coord, ItemKind, SwapMove};

/// What started a resolution chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    Swap(SwapMove),
    Item { kind: ItemKind },
    /// Turn-periodic removal of the highest-tier tile
    PeriodicClear,
}

/// One resolved step of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResolved {
    pub trigger: Trigger,
    /// Detector output (or effect area) for this step, duplicates included
    pub matches: MatchList,
    /// Trigger cells upgraded in place
    pub upgraded: ArrayVec<Coord, 2>,
    /// Cells turned to max tier by a mutation roll
    pub mutated: CellSet,
    pub score_delta: i64,
    pub combo_after: u32,
    pub bonus_moves: u32,
}

/// A stalemate or paid shuffle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShuffleReport {
    /// Moves charged
    pub cost: u32,
    /// Permutations tried
    pub attempts: u32,
    /// Whether the attempt budget ran out and a fresh board was generated
    pub regenerated: bool,
    /// False for the automatic stalemate shuffle
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum GameEvent {
    StateChanged(GameState),
    /// The grid was mutated; read it back from the game
    GridChanged,
    MatchResolved(MatchResolved),
    /// A swap produced no match and was undone
    SwapReverted(SwapMove),
    RewardOffered(RewardOffer),
    Shuffled(ShuffleReport),
    GameOver { final_score: u64 },
}
