//! Matcher module - run detection over a grid snapshot
//!
//! [`find_matches`] scans every row left-to-right and every column
//! top-to-bottom for runs of at least [`MIN_RUN`] tiles sharing both kind and
//! tier. Runs are captured whole (a run of 5 is one run, not a 3 and a 2),
//! and the scan cursor jumps past each run so runs never overlap within a
//! line.
//!
//! The result is a flat coordinate list: a cell sitting in both a horizontal
//! and a vertical run shows up twice. Callers that mutate the grid must go
//! through [`unique_cells`] first.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{Coord, GRID_CELLS, GRID_SIZE, MAX_MATCH_COORDS, MIN_RUN};

/// Coordinates reported by the match detector (may contain duplicates)
pub type MatchList = ArrayVec<Coord, MAX_MATCH_COORDS>;

/// De-duplicated cells, in first-seen order
pub type CellSet = ArrayVec<Coord, GRID_CELLS>;

/// Find every run of `MIN_RUN` or more matching tiles.
pub fn find_matches(grid: &Grid) -> MatchList {
    let mut out = MatchList::new();

    for row in 0..GRID_SIZE {
        scan_line(grid, &mut out, |i| Coord::new(row as u8, i as u8));
    }
    for col in 0..GRID_SIZE {
        scan_line(grid, &mut out, |i| Coord::new(i as u8, col as u8));
    }

    out
}

/// Scan one line whose i-th cell is `at(i)`, appending every run found
#[inline(always)]
fn scan_line(grid: &Grid, out: &mut MatchList, at: impl Fn(usize) -> Coord) {
    let mut start = 0;
    while start + MIN_RUN <= GRID_SIZE {
        let head = grid[at(start)];
        let opens_run = (1..MIN_RUN).all(|k| grid[at(start + k)].matches(&head));
        if !opens_run {
            start += 1;
            continue;
        }

        let mut end = start + MIN_RUN;
        while end < GRID_SIZE && grid[at(end)].matches(&head) {
            end += 1;
        }
        for i in start..end {
            out.push(at(i));
        }
        start = end;
    }
}

/// Collapse a match list to distinct cells, keeping first-seen order
pub fn unique_cells(matches: &[Coord]) -> CellSet {
    let mut seen = [false; GRID_CELLS];
    let mut cells = CellSet::new();
    for coord in matches {
        let slot = coord.index();
        if !seen[slot] {
            seen[slot] = true;
            cells.push(*coord);
        }
    }
    cells
}

/// Length of the matching run through `coord` along one axis
#[inline(always)]
fn run_length(grid: &Grid, coord: Coord, dr: i32, dc: i32) -> usize {
    let tile = grid[coord];
    let mut len = 1;
    for sign in [-1, 1] {
        let mut cursor = coord;
        while let Some(next) = cursor.offset(dr * sign, dc * sign) {
            if !grid[next].matches(&tile) {
                break;
            }
            len += 1;
            cursor = next;
        }
    }
    len
}

/// Local check: does a run of `MIN_RUN` pass through `coord`?
///
/// Only the row and column through the cell are inspected, which is all a
/// single swap can change.
pub fn has_run_through(grid: &Grid, coord: Coord) -> bool {
    run_length(grid, coord, 0, 1) >= MIN_RUN || run_length(grid, coord, 1, 0) >= MIN_RUN
}
