//! Feasibility module - is any single swap productive?
//!
//! Used for hints and for stalemate detection. The scanner never touches the
//! caller's grid: it works on one private scratch copy, and every tentative
//! swap is reverted before the next one is tried.

use crate::grid::Grid;
use crate::matcher::has_run_through;
use crate::types::{Coord, SwapMove, GRID_SIZE};

/// First swap (row-major, right neighbor before bottom neighbor) that would
/// produce a match, or `None` if the board is in stalemate.
pub fn find_possible_move(grid: &Grid) -> Option<SwapMove> {
    let mut scratch = grid.clone();
    for row in 0..GRID_SIZE as u8 {
        for col in 0..GRID_SIZE as u8 {
            let here = Coord::new(row, col);
            let right = (col as usize + 1 < GRID_SIZE).then(|| Coord::new(row, col + 1));
            let below = (row as usize + 1 < GRID_SIZE).then(|| Coord::new(row + 1, col));
            for other in [right, below].into_iter().flatten() {
                if swap_creates_match(&mut scratch, here, other) {
                    return Some(SwapMove::new(here, other));
                }
            }
        }
    }
    None
}

/// Swap, check the two lines through each swapped cell, swap back.
fn swap_creates_match(scratch: &mut Grid, a: Coord, b: Coord) -> bool {
    if scratch[a].matches(&scratch[b]) {
        return false;
    }
    scratch.swap(a, b);
    let found = has_run_through(scratch, a) || has_run_through(scratch, b);
    scratch.swap(a, b);
    found
}

/// Whether the board has at least one productive swap
pub fn has_possible_move(grid: &Grid) -> bool {
    find_possible_move(grid).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Stamp, TileFactory};
    use crate::matcher::find_matches;
    use crate::rng::SimpleRng;

    fn grid_with(rows: [&str; GRID_SIZE]) -> Grid {
        Grid::from_rows(rows, &mut TileFactory::new(), Stamp::default()).unwrap()
    }

    /// Period-6 diagonal stripes: no run, and no swap can make one
    const STALEMATE: [&str; GRID_SIZE] = [
        "RACJSMRA", "ACJSMRAC", "CJSMRACJ", "JSMRACJS", "SMRACJSM", "MRACJSMR", "RACJSMRA",
        "ACJSMRAC",
    ];

    #[test]
    fn test_stalemate_has_no_move() {
        let grid = grid_with(STALEMATE);
        assert!(find_matches(&grid).is_empty());
        assert_eq!(find_possible_move(&grid), None);
        assert!(!has_possible_move(&grid));
    }

    #[test]
    fn test_finds_horizontal_completion() {
        let mut rows = STALEMATE;
        rows[3] = "JJMJACJS";
        let grid = grid_with(rows);
        assert!(find_matches(&grid).is_empty());

        let mv = find_possible_move(&grid).expect("a move exists");
        let mut after = grid.clone();
        after.swap(mv.a, mv.b);
        assert!(!find_matches(&after).is_empty());
    }

    #[test]
    fn test_scan_does_not_mutate_input() {
        let mut rows = STALEMATE;
        rows[3] = "JJMJACJS";
        let grid = grid_with(rows);
        let before = grid.clone();
        let _ = find_possible_move(&grid);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_every_found_move_is_productive() {
        for seed in 0..100 {
            let grid = Grid::generate(
                &mut SimpleRng::new(seed),
                &mut TileFactory::new(),
                Stamp::default(),
            );
            if let Some(mv) = find_possible_move(&grid) {
                assert!(mv.a.is_adjacent(mv.b));
                let mut after = grid.clone();
                after.swap(mv.a, mv.b);
                assert!(!find_matches(&after).is_empty(), "seed {}", seed);
            }
        }
    }
}
