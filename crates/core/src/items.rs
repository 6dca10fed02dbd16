//! Items module - one-shot tools that mark cells without a swap
//!
//! Each [`ItemKind`] computes its own effect area through [`ItemEffect`].
//! The area is clipped at the grid edges and every cell in it is marked for
//! removal; items never upgrade tiles.
//!
//! | Item | Normal | Widened |
//! |------|--------|---------|
//! | Hammer | target | target + orthogonal neighbours |
//! | Rocket | row or column | row and column |
//! | Bomb | 3x3 block | 5x5 block |

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::{ActionError, Coord, ItemKind, LineDirection, GRID_SIZE, MAX_EFFECT_CELLS};

/// Cells covered by one item activation, without duplicates
pub type EffectArea = ArrayVec<Coord, MAX_EFFECT_CELLS>;

/// Effect-area computation for an item
pub trait ItemEffect {
    /// Cells covered when the item is used on `at`.
    ///
    /// `direction` only matters for line items. `widened` is set when an
    /// item-enhancement artifact is owned.
    fn effect_area(&self, at: Coord, direction: LineDirection, widened: bool) -> EffectArea;
}

impl ItemEffect for ItemKind {
    fn effect_area(&self, at: Coord, direction: LineDirection, widened: bool) -> EffectArea {
        let mut area = EffectArea::new();
        match (self, widened) {
            (ItemKind::Hammer, false) => area.push(at),
            (ItemKind::Hammer, true) => {
                area.push(at);
                for (dr, dc) in [(-1, 0), (0, -1), (0, 1), (1, 0)] {
                    if let Some(c) = at.offset(dr, dc) {
                        area.push(c);
                    }
                }
            }
            (ItemKind::Rocket, false) => push_line(&mut area, at, direction),
            (ItemKind::Rocket, true) => {
                push_line(&mut area, at, LineDirection::Row);
                push_line(&mut area, at, LineDirection::Column);
            }
            (ItemKind::Bomb, false) => push_block(&mut area, at, 1),
            (ItemKind::Bomb, true) => push_block(&mut area, at, 2),
        }
        area
    }
}

fn push_unique(area: &mut EffectArea, coord: Coord) {
    if !area.contains(&coord) {
        area.push(coord);
    }
}

fn push_line(area: &mut EffectArea, at: Coord, direction: LineDirection) {
    for i in 0..GRID_SIZE as u8 {
        let coord = match direction {
            LineDirection::Row => Coord::new(at.row, i),
            LineDirection::Column => Coord::new(i, at.col),
        };
        push_unique(area, coord);
    }
}

/// Square block of the given radius around `at`, clipped at the edges
fn push_block(area: &mut EffectArea, at: Coord, radius: i32) {
    for dr in -radius..=radius {
        for dc in -radius..=radius {
            if let Some(c) = at.offset(dr, dc) {
                push_unique(area, c);
            }
        }
    }
}

/// Choose a line for the rocket when the caller gave no direction.
///
/// The line holding more tiles of the target's kind wins; ties go to the row.
pub fn pick_line_direction(grid: &Grid, at: Coord) -> LineDirection {
    let kind = grid[at].kind;
    let in_row = grid.row(at.row as usize).iter().filter(|t| t.kind == kind).count();
    let in_col = grid
        .column(at.col as usize)
        .iter()
        .filter(|t| t.kind == kind)
        .count();
    if in_col > in_row {
        LineDirection::Column
    } else {
        LineDirection::Row
    }
}

/// Item counts, indexed by [`ItemKind::index`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    counts: [u32; 3],
}

impl Inventory {
    /// Inventory holding `per_kind` of every item
    pub fn new(per_kind: u32) -> Self {
        Self {
            counts: [per_kind; 3],
        }
    }

    pub fn count(&self, kind: ItemKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn add(&mut self, kind: ItemKind, amount: u32) {
        let slot = &mut self.counts[kind.index()];
        *slot = slot.saturating_add(amount);
    }

    /// Check that at least one `kind` is available
    pub fn ensure(&self, kind: ItemKind) -> Result<(), ActionError> {
        if self.count(kind) == 0 {
            return Err(ActionError::NoInventory(kind));
        }
        Ok(())
    }

    /// Take one `kind` out of the inventory
    pub fn consume(&mut self, kind: ItemKind) -> Result<(), ActionError> {
        self.ensure(kind)?;
        self.counts[kind.index()] -= 1;
        Ok(())
    }
}
