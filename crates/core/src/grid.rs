//! Grid module - the 8x8 board of tiles
//!
//! The grid is a flat, row-major array of [`Tile`]s with no gaps: every cell
//! always holds a tile. Removal is a two-step affair, tiles are first flagged
//! `matched` and later dropped by [`Grid::compact_and_refill`], which lets the
//! survivors fall and tops each column up with fresh tier-1 tiles.
//!
//! Coordinates are `(row, col)` with row 0 at the top. Passing an
//! out-of-bounds [`Coord`] to any accessor is a programming error and panics.

use std::fmt;
use std::ops::{Index, IndexMut};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::rng::SimpleRng;
use crate::types::{Coord, TileKind, GRID_CELLS, GRID_SIZE, MAX_TIER};

/// Opaque tile identity, stable for the tile's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

/// A single cell's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    /// Upgrade level in `1..=MAX_TIER`
    pub tier: u8,
    /// Pending removal within the current resolution pass
    pub matched: bool,
    /// Resolution step counter when the tile was created (bookkeeping only)
    pub created_at_step: u32,
    /// Turn counter when the tile was created (bookkeeping only)
    pub created_at_turn: u32,
}

impl Tile {
    /// Two tiles match only if both kind and tier are equal
    #[inline(always)]
    pub fn matches(&self, other: &Tile) -> bool {
        self.kind == other.kind && self.tier == other.tier
    }

    pub fn is_max_tier(&self) -> bool {
        self.tier >= MAX_TIER
    }
}

/// Creation counters stamped onto freshly spawned tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stamp {
    pub step: u32,
    pub turn: u32,
}

/// Hands out unique tile ids
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileFactory {
    next_id: u32,
}

impl TileFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a tier-1 tile of the given kind with a fresh id
    pub fn spawn(&mut self, kind: TileKind, stamp: Stamp) -> Tile {
        let id = TileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Tile {
            id,
            kind,
            tier: 1,
            matched: false,
            created_at_step: stamp.step,
            created_at_turn: stamp.turn,
        }
    }

    /// Number of tiles spawned so far
    pub fn issued(&self) -> u32 {
        self.next_id
    }
}

/// The game grid - 8 columns x 8 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Row-major cells (row * GRID_SIZE + col)
    cells: [Tile; GRID_CELLS],
}

impl Grid {
    /// Build an initial board with no pre-existing run of three.
    ///
    /// Each cell is rejection-sampled: a kind that would complete a run with
    /// the two cells to its left, or the two cells above it, is redrawn.
    /// All tiles start at tier 1, so comparing kinds is enough.
    pub fn generate(rng: &mut SimpleRng, factory: &mut TileFactory, stamp: Stamp) -> Self {
        let mut kinds = [[TileKind::Ruby; GRID_SIZE]; GRID_SIZE];
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                kinds[row][col] = loop {
                    let kind = rng.next_kind();
                    let horizontal =
                        col >= 2 && kinds[row][col - 1] == kind && kinds[row][col - 2] == kind;
                    let vertical =
                        row >= 2 && kinds[row - 1][col] == kind && kinds[row - 2][col] == kind;
                    if !horizontal && !vertical {
                        break kind;
                    }
                };
            }
        }
        Self::from_kinds(&kinds, factory, stamp)
    }

    /// Build a board of tier-1 tiles from explicit kinds
    pub fn from_kinds(
        kinds: &[[TileKind; GRID_SIZE]; GRID_SIZE],
        factory: &mut TileFactory,
        stamp: Stamp,
    ) -> Self {
        let mut flat = [kinds[0][0]; GRID_CELLS];
        for (row, line) in kinds.iter().enumerate() {
            for (col, kind) in line.iter().enumerate() {
                flat[row * GRID_SIZE + col] = *kind;
            }
        }
        let cells = flat.map(|kind| factory.spawn(kind, stamp));
        Self { cells }
    }

    /// Build a board from one glyph string per row (see [`TileKind::glyph`]).
    ///
    /// Returns `None` if a row has the wrong length or an unknown glyph.
    ///
    /// ```
    /// use tile_cascade_core::grid::{Grid, Stamp, TileFactory};
    ///
    /// let mut factory = TileFactory::new();
    /// let grid = Grid::from_rows(
    ///     [
    ///         "RACJSMRA", "ACJSMRAC", "CJSMRACJ", "JSMRACJS",
    ///         "SMRACJSM", "MRACJSMR", "RACJSMRA", "ACJSMRAC",
    ///     ],
    ///     &mut factory,
    ///     Stamp::default(),
    /// )
    /// .unwrap();
    /// assert_eq!(grid.row_glyphs(0), "RACJSMRA");
    /// ```
    pub fn from_rows(
        rows: [&str; GRID_SIZE],
        factory: &mut TileFactory,
        stamp: Stamp,
    ) -> Option<Self> {
        let mut kinds = [[TileKind::Ruby; GRID_SIZE]; GRID_SIZE];
        for (row, text) in rows.iter().enumerate() {
            let glyphs: Vec<char> = text.chars().collect();
            if glyphs.len() != GRID_SIZE {
                return None;
            }
            for (col, glyph) in glyphs.iter().enumerate() {
                let glyph = glyph.to_ascii_uppercase();
                kinds[row][col] = TileKind::ALL.iter().copied().find(|k| k.glyph() == glyph)?;
            }
        }
        Some(Self::from_kinds(&kinds, factory, stamp))
    }

    #[inline(always)]
    fn slot(coord: Coord) -> usize {
        assert!(coord.in_bounds(), "coordinate {:?} is off the grid", coord);
        coord.index()
    }

    pub fn get(&self, coord: Coord) -> &Tile {
        &self.cells[Self::slot(coord)]
    }

    pub fn get_mut(&mut self, coord: Coord) -> &mut Tile {
        &mut self.cells[Self::slot(coord)]
    }

    /// Exchange the contents of two cells. Ids travel with the content.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let (ia, ib) = (Self::slot(a), Self::slot(b));
        self.cells.swap(ia, ib);
    }

    /// Flag a cell for removal on the next compaction
    pub fn mark(&mut self, coord: Coord) {
        self.get_mut(coord).matched = true;
    }

    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|t| t.matched).count()
    }

    /// Raise a tile's tier by one, capped at `MAX_TIER`. Returns the new tier.
    pub fn upgrade(&mut self, coord: Coord) -> u8 {
        let tile = self.get_mut(coord);
        tile.tier = (tile.tier + 1).min(MAX_TIER);
        tile.tier
    }

    /// Drop every `matched` tile and let survivors fall.
    ///
    /// Per column, unmatched tiles keep their relative order and settle at
    /// the bottom; the shortfall at the top is filled with fresh tier-1
    /// tiles. Returns the number of tiles spawned.
    pub fn compact_and_refill(
        &mut self,
        rng: &mut SimpleRng,
        factory: &mut TileFactory,
        stamp: Stamp,
    ) -> usize {
        let mut spawned = 0;
        for col in 0..GRID_SIZE {
            // Survivors, bottom to top
            let mut survivors: ArrayVec<Tile, GRID_SIZE> = ArrayVec::new();
            for row in (0..GRID_SIZE).rev() {
                let tile = self.cells[row * GRID_SIZE + col];
                if !tile.matched {
                    survivors.push(tile);
                }
            }

            let shortfall = GRID_SIZE - survivors.len();
            for (offset, tile) in survivors.into_iter().enumerate() {
                self.cells[(GRID_SIZE - 1 - offset) * GRID_SIZE + col] = tile;
            }
            for row in 0..shortfall {
                self.cells[row * GRID_SIZE + col] = factory.spawn(rng.next_kind(), stamp);
            }
            spawned += shortfall;

            assert!(
                (0..GRID_SIZE).all(|row| !self.cells[row * GRID_SIZE + col].matched),
                "column {} failed to refill",
                col
            );
        }
        spawned
    }

    /// Randomly permute every tile on the board. Ids and tiers are kept.
    pub fn shuffle(&mut self, rng: &mut SimpleRng) {
        rng.shuffle(&mut self.cells);
    }

    /// First cell (row-major) holding the highest tier on the board
    pub fn highest_tier_cell(&self) -> Coord {
        let mut best = 0;
        for (index, tile) in self.cells.iter().enumerate() {
            if tile.tier > self.cells[best].tier {
                best = index;
            }
        }
        Coord::from_index(best)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.cells
    }

    /// Tiles of one row, left to right
    pub fn row(&self, row: usize) -> &[Tile] {
        assert!(row < GRID_SIZE, "row {} is off the grid", row);
        &self.cells[row * GRID_SIZE..(row + 1) * GRID_SIZE]
    }

    /// Glyphs of one row, left to right
    pub fn row_glyphs(&self, row: usize) -> String {
        self.row(row).iter().map(|t| t.kind.glyph()).collect()
    }

    /// Tiles of one column, top to bottom
    pub fn column(&self, col: usize) -> [Tile; GRID_SIZE] {
        assert!(col < GRID_SIZE, "column {} is off the grid", col);
        std::array::from_fn(|row| self.cells[row * GRID_SIZE + col])
    }
}

impl Index<Coord> for Grid {
    type Output = Tile;

    fn index(&self, coord: Coord) -> &Tile {
        self.get(coord)
    }
}

impl IndexMut<Coord> for Grid {
    fn index_mut(&mut self, coord: Coord) -> &mut Tile {
        self.get_mut(coord)
    }
}

impl fmt::Display for Grid {
    /// One line per row; each cell is its glyph followed by its tier
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..GRID_SIZE {
            for (col, tile) in self.row(row).iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}{}", tile.kind.glyph(), tile.tier)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
