//! Maze topology generation.
//!
//! Algorithm: depth-first backtracking with wall-density control.
//! 1. Seal the outward side of every perimeter cell.
//! 2. On the first evaluation of a cell, every side that cannot be traversed
//!    (no neighbor, or neighbor already visited) and is not the side we came
//!    from may be sealed with `wall_probability`% chance.
//! 3. Pick one unvisited neighbor uniformly at random and descend into it.
//!    When the child branch is exhausted, re-evaluate the parent; it may
//!    still have unvisited neighbors.
//!
//! Walls are only added on sides that are blocked at the moment the cell is
//! first evaluated, so the spanning tree built by the traversal is never cut
//! and every cell stays reachable.
//!
//! The traversal uses an explicit stack; each call owns its scratch state.

use rand::Rng;

use crate::grid::{CellGrid, Direction};

/// Wall probability is a percentage in `0..=100`.
pub const MAX_WALL_PROBABILITY: u8 = 100;

#[derive(Debug, Clone, Copy)]
struct Frame {
    row: usize,
    col: usize,
    came_from: Option<Direction>,
}

/// Generate a fully connected maze of `rows × cols` cells.
///
/// `wall_probability` is clamped to `0..=100`. A value of 100 yields a
/// perfect maze (a single path between any two cells); 0 leaves only the
/// border walls.
pub fn generate_topology(
    rows: usize,
    cols: usize,
    wall_probability: u8,
    rng: &mut impl Rng,
) -> CellGrid {
    let mut grid = CellGrid::new(rows, cols);
    seed_border_walls(&mut grid);
    carve(&mut grid, wall_probability.min(MAX_WALL_PROBABILITY), rng);
    grid.clear_visited();
    grid
}

/// Set the outward-facing wall flag on every perimeter cell.
pub fn seed_border_walls(grid: &mut CellGrid) {
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            for dir in grid.outward_sides(row, col) {
                grid.set_wall(row, col, dir, true);
            }
        }
    }
}

fn carve(grid: &mut CellGrid, wall_probability: u8, rng: &mut impl Rng) {
    if grid.is_empty() {
        return;
    }

    let mut stack = vec![Frame {
        row: 0,
        col: 0,
        came_from: None,
    }];
    let mut moves: Vec<Direction> = Vec::with_capacity(4);

    while let Some(&frame) = stack.last() {
        let Frame { row, col, came_from } = frame;
        let first_visit = grid.get(row, col).map_or(false, |c| !c.visited);

        moves.clear();
        for dir in Direction::ALL {
            let neighbor = grid.neighbor_coord(row, col, dir);
            let open = neighbor
                .and_then(|n| grid.get(n.row, n.col))
                .map_or(false, |n| !n.visited);
            if open {
                moves.push(dir);
                continue;
            }

            let already_walled = grid.get(row, col).map_or(true, |c| c.has_wall(dir));
            if !first_visit || came_from == Some(dir) || already_walled {
                continue;
            }
            if rng.gen_range(0..MAX_WALL_PROBABILITY) < wall_probability {
                grid.set_wall(row, col, dir, true);
                if let Some(n) = neighbor.and_then(|n| grid.get_mut(n.row, n.col)) {
                    n.visited = true;
                }
            }
        }

        if let Some(cell) = grid.get_mut(row, col) {
            cell.visited = true;
        }

        if moves.is_empty() {
            stack.pop();
            continue;
        }

        let dir = moves[rng.gen_range(0..moves.len())];
        match grid.neighbor_coord(row, col, dir) {
            Some(next) => stack.push(Frame {
                row: next.row,
                col: next.col,
                came_from: Some(dir.opposite()),
            }),
            None => {
                stack.pop();
            }
        }
    }
}
