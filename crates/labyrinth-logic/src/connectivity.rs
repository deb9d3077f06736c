//! Reachability over the maze graph.
//!
//! Two adjacent cells are connected when neither of them carries a wall flag
//! on the shared side. Wall flags are per-cell, so both sides are checked.

use std::collections::VecDeque;

use crate::grid::{CellCoord, CellGrid, Direction};

/// Can an agent step from `(row, col)` towards `dir`?
pub fn can_move(grid: &CellGrid, row: usize, col: usize, dir: Direction) -> bool {
    let Some(cell) = grid.get(row, col) else {
        return false;
    };
    let Some(neighbor) = grid.neighbor(row, col, dir) else {
        return false;
    };
    !cell.has_wall(dir) && !neighbor.has_wall(dir.opposite())
}

/// Open neighbors of a cell, in generator direction order.
pub fn open_neighbors(grid: &CellGrid, row: usize, col: usize) -> Vec<CellCoord> {
    Direction::ALL
        .into_iter()
        .filter(|d| can_move(grid, row, col, *d))
        .filter_map(|d| grid.neighbor_coord(row, col, d))
        .collect()
}

/// BFS from `(row, col)`; returns a row-major visited mask.
pub fn flood_fill(grid: &CellGrid, row: usize, col: usize) -> Vec<bool> {
    let mut visited = vec![false; grid.len()];
    if grid.get(row, col).is_none() {
        return visited;
    }

    let index = |c: CellCoord| c.row * grid.cols() + c.col;
    let mut queue = VecDeque::new();
    let start = CellCoord::new(row, col);
    if let Some(slot) = visited.get_mut(index(start)) {
        *slot = true;
    }
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in open_neighbors(grid, current.row, current.col) {
            let Some(slot) = visited.get_mut(index(next)) else {
                continue;
            };
            if !*slot {
                *slot = true;
                queue.push_back(next);
            }
        }
    }

    visited
}

/// Number of cells reachable from `(row, col)`, including itself.
pub fn reachable_count(grid: &CellGrid, row: usize, col: usize) -> usize {
    flood_fill(grid, row, col).iter().filter(|v| **v).count()
}

/// True when every cell can reach every other cell.
pub fn is_fully_connected(grid: &CellGrid) -> bool {
    grid.is_empty() || reachable_count(grid, 0, 0) == grid.len()
}

/// Shortest cell path from `from` to `to`, both ends included.
///
/// Returns `None` if either end is off the grid or unreachable.
pub fn shortest_path(grid: &CellGrid, from: CellCoord, to: CellCoord) -> Option<Vec<CellCoord>> {
    grid.get(from.row, from.col)?;
    grid.get(to.row, to.col)?;
    if from == to {
        return Some(vec![from]);
    }

    let index = |c: CellCoord| c.row * grid.cols() + c.col;
    let mut parent: Vec<Option<CellCoord>> = vec![None; grid.len()];
    let mut queue = VecDeque::new();
    *parent.get_mut(index(from))? = Some(from);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for next in open_neighbors(grid, current.row, current.col) {
            let Some(slot) = parent.get_mut(index(next)) else {
                continue;
            };
            if slot.is_some() {
                continue;
            }
            *slot = Some(current);
            if next == to {
                let mut path = vec![to];
                let mut cursor = current;
                while cursor != from {
                    path.push(cursor);
                    cursor = (*parent.get(index(cursor))?)?;
                }
                path.push(from);
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }

    None
}
