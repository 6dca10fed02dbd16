//! Snapshot module - an owned, serializable copy of a running game
//!
//! Collaborators that render or persist a run read it through this instead
//! of borrowing `Game`; the autoplay summary is built from one.

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactKind;
use crate::game_state::{GameState, Phase};
use crate::grid::Tile;
use crate::items::Inventory;
use crate::rewards::RewardOffer;
use crate::types::{Coord, Difficulty, GRID_SIZE};

/// Owned copy of everything a collaborator may want to render or persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub episode_id: u32,
    pub seed: u32,
    pub difficulty: Difficulty,
    pub phase: Phase,
    pub state: GameState,
    /// Row-major tiles
    pub tiles: Vec<Tile>,
    pub inventory: Inventory,
    pub artifacts: Vec<ArtifactKind>,
    pub pending_offers: Vec<RewardOffer>,
    /// Score that unlocks the next offer; `None` once every threshold is behind
    pub next_reward_at: Option<u64>,
    pub clock_ms: u64,
}

impl GameSnapshot {
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        if !coord.in_bounds() {
            return None;
        }
        self.tiles.get(coord.index())
    }

    /// One glyph string per row
    pub fn rows(&self) -> Vec<String> {
        self.tiles
            .chunks(GRID_SIZE)
            .map(|row| row.iter().map(|t| t.kind.glyph()).collect())
            .collect()
    }

    pub fn playable(&self) -> bool {
        !self.state.game_over && self.phase == Phase::Idle
    }
}
