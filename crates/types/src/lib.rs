//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! Everything here is plain data with no game logic, usable from the core
//! resolution loop, the engine facade, and any presentation collaborator.
//!
//! # Board Dimensions
//!
//! - **Size**: 8x8 square grid (`GRID_SIZE`)
//! - **Coordinates**: `(row, col)`, row 0 at the top, col 0 at the left
//! - **Storage**: row-major, flat index `row * GRID_SIZE + col`
//!
//! # Gameplay Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_RUN` | 3 | Shortest run the match detector reports |
//! | `MAX_TIER` | 3 | Highest tier a tile can be upgraded to |
//! | `BASE_SCORE` | 10 | Points per matched cell before multipliers |
//! | `SHUFFLE_COST_MOVES` | 2 | Moves charged for a shuffle |
//! | `STREAK_WINDOW_MS` | 3000 | Max gap between matches that keeps a streak |
//!
//! # Phase Delays
//!
//! The resolution loop pauses between phases so collaborators can animate.
//! Delays are advisory: a headless driver may ignore them entirely.
//!
//! | Constant | Value |
//! |----------|-------|
//! | `SWAP_DELAY_MS` | 180 |
//! | `CHECK_DELAY_MS` | 80 |
//! | `RESOLVE_DELAY_MS` | 260 |
//! | `REFILL_DELAY_MS` | 220 |
//!
//! # Examples
//!
//! ```
//! use tile_cascade_types::{Coord, Difficulty, TileKind, GRID_SIZE};
//!
//! let kind = TileKind::from_str("jade").unwrap();
//! assert_eq!(kind, TileKind::Jade);
//!
//! let a = Coord::new(3, 2);
//! assert!(a.is_adjacent(Coord::new(3, 3)));
//! assert!(!a.is_adjacent(Coord::new(4, 3)));
//!
//! assert_eq!(Difficulty::Casual.starting_moves(), 30);
//! assert_eq!(GRID_SIZE, 8);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid side length (8x8 board)
pub const GRID_SIZE: usize = 8;

/// Total number of cells on the grid
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// Minimum run length reported by the match detector
pub const MIN_RUN: usize = 3;

/// Highest tier a tile can reach
pub const MAX_TIER: u8 = 3;

/// Points awarded per matched cell before multipliers
pub const BASE_SCORE: u64 = 10;

/// Moves charged for a shuffle (before any discount)
pub const SHUFFLE_COST_MOVES: u32 = 2;

/// Attempts at a valid shuffle before the board is regenerated
pub const SHUFFLE_ATTEMPT_BUDGET: u32 = 256;

/// Max gap between two matching actions that keeps a streak alive
pub const STREAK_WINDOW_MS: u64 = 3000;

/// Cap on the streak multiplier
pub const STREAK_MAX_MULTIPLIER: u32 = 3;

/// Delay after the swap phase
pub const SWAP_DELAY_MS: u32 = 180;

/// Delay after the match-check phase
pub const CHECK_DELAY_MS: u32 = 80;

/// Delay after tiles are upgraded/marked
pub const RESOLVE_DELAY_MS: u32 = 260;

/// Delay after compaction and refill
pub const REFILL_DELAY_MS: u32 = 220;

/// Default idle time before a hint is surfaced
pub const DEFAULT_HINT_DELAY_MS: u32 = 5000;

/// Ascending score thresholds that each trigger one reward offer
pub const REWARD_THRESHOLDS: [u64; 10] = [
    500, 1500, 3000, 5000, 8000, 12000, 17000, 23000, 30000, 40000,
];

/// Moves granted by the bonus-moves reward
pub const REWARD_BONUS_MOVES: u32 = 5;

/// Coins granted by the currency reward
pub const REWARD_COINS: u32 = 100;

/// Maximum number of cells any item effect can cover (5x5 widened bomb)
pub const MAX_EFFECT_CELLS: usize = 25;

/// Upper bound on coordinates the match detector can report.
///
/// Every cell can appear at most twice (once per direction).
pub const MAX_MATCH_COORDS: usize = GRID_CELLS * 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gameplay_constant_defaults() {
        assert_eq!(GRID_SIZE, 8);
        assert_eq!(GRID_CELLS, 64);
        assert_eq!(MIN_RUN, 3);
        assert_eq!(MAX_TIER, 3);
        assert_eq!(BASE_SCORE, 10);
        assert_eq!(SHUFFLE_COST_MOVES, 2);
    }

    #[test]
    fn reward_thresholds_are_strictly_ascending() {
        assert!(REWARD_THRESHOLDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn coord_adjacency() {
        let c = Coord::new(3, 3);
        assert!(c.is_adjacent(Coord::new(2, 3)));
        assert!(c.is_adjacent(Coord::new(4, 3)));
        assert!(c.is_adjacent(Coord::new(3, 2)));
        assert!(c.is_adjacent(Coord::new(3, 4)));
        assert!(!c.is_adjacent(c));
        assert!(!c.is_adjacent(Coord::new(4, 4)));
        assert!(!c.is_adjacent(Coord::new(3, 5)));
    }

    #[test]
    fn coord_index_roundtrip() {
        for index in 0..GRID_CELLS {
            assert_eq!(Coord::from_index(index).index(), index);
        }
        assert_eq!(Coord::new(1, 0).index(), GRID_SIZE);
    }

    #[test]
    fn coord_checked_rejects_out_of_bounds() {
        assert_eq!(Coord::checked(-1, 0), None);
        assert_eq!(Coord::checked(0, GRID_SIZE as i32), None);
        assert_eq!(Coord::checked(7, 7), Some(Coord::new(7, 7)));
    }

    #[test]
    fn difficulty_presets_differ_only_in_counts() {
        assert_eq!(Difficulty::Casual.starting_moves(), 30);
        assert_eq!(Difficulty::Challenge.starting_moves(), 20);
        assert!(Difficulty::Casual.starting_items() > Difficulty::Challenge.starting_items());
    }

    #[test]
    fn action_error_codes() {
        assert_eq!(ActionError::Busy.code(), "busy");
        assert_eq!(ActionError::NoInventory(ItemKind::Bomb).code(), "no_inventory");
        assert_eq!(
            ActionError::NotAdjacent.to_string(),
            "swap targets are not adjacent"
        );
    }
}

/// The six tile kinds ("colors") a cell can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Ruby,
    Amber,
    Citrine,
    Jade,
    Sapphire,
    Amethyst,
}

impl TileKind {
    /// All kinds, in sampling order
    pub const ALL: [TileKind; 6] = [
        TileKind::Ruby,
        TileKind::Amber,
        TileKind::Citrine,
        TileKind::Jade,
        TileKind::Sapphire,
        TileKind::Amethyst,
    ];

    /// Number of distinct kinds
    pub const COUNT: usize = Self::ALL.len();

    /// Kind at a sampling index (wraps)
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    /// Parse kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_cascade_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_str("Ruby"), Some(TileKind::Ruby));
    /// assert_eq!(TileKind::from_str("r"), Some(TileKind::Ruby));
    /// assert_eq!(TileKind::from_str("opal"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ruby" | "r" => Some(TileKind::Ruby),
            "amber" | "a" => Some(TileKind::Amber),
            "citrine" | "c" => Some(TileKind::Citrine),
            "jade" | "j" => Some(TileKind::Jade),
            "sapphire" | "s" => Some(TileKind::Sapphire),
            "amethyst" | "m" => Some(TileKind::Amethyst),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Ruby => "ruby",
            TileKind::Amber => "amber",
            TileKind::Citrine => "citrine",
            TileKind::Jade => "jade",
            TileKind::Sapphire => "sapphire",
            TileKind::Amethyst => "amethyst",
        }
    }

    /// Single-character glyph used by text dumps and test fixtures
    pub fn glyph(&self) -> char {
        match self {
            TileKind::Ruby => 'R',
            TileKind::Amber => 'A',
            TileKind::Citrine => 'C',
            TileKind::Jade => 'J',
            TileKind::Sapphire => 'S',
            TileKind::Amethyst => 'M',
        }
    }
}

/// Grid position. Row 0 is the top row, col 0 the leftmost column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Build a coordinate from unchecked input, `None` if off the board
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        let size = GRID_SIZE as i32;
        if row < 0 || row >= size || col < 0 || col >= size {
            return None;
        }
        Some(Self::new(row as u8, col as u8))
    }

    #[inline(always)]
    pub fn in_bounds(&self) -> bool {
        (self.row as usize) < GRID_SIZE && (self.col as usize) < GRID_SIZE
    }

    /// Flat row-major index
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.row as usize * GRID_SIZE + self.col as usize
    }

    #[inline(always)]
    pub fn from_index(index: usize) -> Self {
        Self::new((index / GRID_SIZE) as u8, (index % GRID_SIZE) as u8)
    }

    /// True when the two cells share an edge
    pub fn is_adjacent(&self, other: Coord) -> bool {
        let dr = (self.row as i16 - other.row as i16).abs();
        let dc = (self.col as i16 - other.col as i16).abs();
        dr + dc == 1
    }

    /// Neighbor at a signed offset, `None` if it falls off the board
    pub fn offset(&self, dr: i32, dc: i32) -> Option<Coord> {
        Self::checked(self.row as i32 + dr, self.col as i32 + dc)
    }
}

/// A pair of adjacent cells to exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapMove {
    pub a: Coord,
    pub b: Coord,
}

impl SwapMove {
    pub const fn new(a: Coord, b: Coord) -> Self {
        Self { a, b }
    }
}

/// One-shot tools that remove tiles without a swap
///
/// - **Hammer**: the targeted cell only
/// - **Rocket**: the full row or column through the target
/// - **Bomb**: the 3x3 block centered on the target, clipped at edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Hammer,
    Rocket,
    Bomb,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Hammer, ItemKind::Rocket, ItemKind::Bomb];

    /// Slot in inventory arrays
    pub fn index(&self) -> usize {
        match self {
            ItemKind::Hammer => 0,
            ItemKind::Rocket => 1,
            ItemKind::Bomb => 2,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hammer" => Some(ItemKind::Hammer),
            "rocket" => Some(ItemKind::Rocket),
            "bomb" => Some(ItemKind::Bomb),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Hammer => "hammer",
            ItemKind::Rocket => "rocket",
            ItemKind::Bomb => "bomb",
        }
    }
}

/// Orientation of a line-removal effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDirection {
    Row,
    Column,
}

/// Difficulty preset. Presets differ only in starting move and item counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Casual,
    Challenge,
}

impl Difficulty {
    pub fn starting_moves(&self) -> i32 {
        match self {
            Difficulty::Casual => 30,
            Difficulty::Challenge => 20,
        }
    }

    /// Starting count of every item kind
    pub fn starting_items(&self) -> u32 {
        match self {
            Difficulty::Casual => 2,
            Difficulty::Challenge => 1,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Some(Difficulty::Casual),
            "challenge" => Some(Difficulty::Challenge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Casual => "casual",
            Difficulty::Challenge => "challenge",
        }
    }
}

/// Rejected player input. The game state is untouched whenever one of these
/// is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("a resolution chain is still in progress")]
    Busy,
    #[error("the game is over")]
    GameOver,
    #[error("coordinate is outside the grid")]
    OutOfBounds,
    #[error("swap targets are not adjacent")]
    NotAdjacent,
    #[error("no {} left in inventory", .0.as_str())]
    NoInventory(ItemKind),
    #[error("no reward offer is pending")]
    NoRewardPending,
    #[error("reward choice {0} does not exist")]
    InvalidRewardChoice(usize),
    #[error("artifact is already owned")]
    ArtifactOwned,
}

impl ActionError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::Busy => "busy",
            ActionError::GameOver => "game_over",
            ActionError::OutOfBounds | ActionError::NotAdjacent => "invalid_target",
            ActionError::NoInventory(_) => "no_inventory",
            ActionError::NoRewardPending => "no_reward_pending",
            ActionError::InvalidRewardChoice(_) => "invalid_reward_choice",
            ActionError::ArtifactOwned => "artifact_owned",
        }
    }
}
