//! Pillar placement rule.
//!
//! Grid-line intersections are indexed `(r, c)` with `r in 0..=rows` and
//! `c in 0..=cols`; intersection `(r, c)` is the top-left corner of cell
//! `(r, c)`. A pillar stands at an intersection when it lies on the outer
//! border, or when any of the up-to-four cells touching it has a wall on a
//! side incident to that corner.

use crate::grid::{CellGrid, Direction};

/// For each touching cell (row offset, col offset), the two sides that meet
/// at the shared corner.
const CORNER_CELLS: [((isize, isize), [Direction; 2]); 4] = [
    ((-1, -1), [Direction::Right, Direction::Down]),
    ((-1, 0), [Direction::Left, Direction::Down]),
    ((0, -1), [Direction::Right, Direction::Up]),
    ((0, 0), [Direction::Left, Direction::Up]),
];

pub fn is_border_intersection(grid: &CellGrid, r: usize, c: usize) -> bool {
    r == 0 || c == 0 || r == grid.rows() || c == grid.cols()
}

/// Does intersection `(r, c)` need a pillar?
pub fn needs_pillar(grid: &CellGrid, r: usize, c: usize) -> bool {
    if r > grid.rows() || c > grid.cols() {
        return false;
    }
    if is_border_intersection(grid, r, c) {
        return true;
    }
    CORNER_CELLS.iter().any(|((dr, dc), sides)| {
        grid.get_signed(r as isize + dr, c as isize + dc)
            .map_or(false, |cell| sides.iter().any(|s| cell.has_wall(*s)))
    })
}

/// Every intersection that needs a pillar, row-major.
pub fn pillar_intersections(grid: &CellGrid) -> Vec<(usize, usize)> {
    if grid.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for r in 0..=grid.rows() {
        for c in 0..=grid.cols() {
            if needs_pillar(grid, r, c) {
                out.push((r, c));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_grid_only_border_pillars() {
        let grid = CellGrid::new(3, 3);
        let pillars = pillar_intersections(&grid);
        // 4×4 intersections minus the 2×2 interior ones
        assert_eq!(pillars.len(), 12);
        assert!(!pillars.contains(&(1, 1)));
        assert!(!pillars.contains(&(2, 2)));
    }

    #[test]
    fn test_interior_wall_adds_both_end_pillars() {
        let mut grid = CellGrid::new(3, 3);
        // Right side of cell (1,1) runs from intersection (1,2) to (2,2)
        grid.set_wall(1, 1, Direction::Right, true);
        assert!(needs_pillar(&grid, 1, 2));
        assert!(needs_pillar(&grid, 2, 2));
        assert!(!needs_pillar(&grid, 1, 1));
        assert!(!needs_pillar(&grid, 2, 1));
    }

    #[test]
    fn test_wall_flag_on_neighbor_cell_counts() {
        let mut grid = CellGrid::new(3, 3);
        // Up side of (2,1) runs between intersections (2,1) and (2,2)
        grid.set_wall(2, 1, Direction::Up, true);
        assert!(needs_pillar(&grid, 2, 1));
        assert!(needs_pillar(&grid, 2, 2));
        assert!(!needs_pillar(&grid, 1, 1));
    }

    #[test]
    fn test_out_of_range_intersection() {
        let grid = CellGrid::new(2, 2);
        assert!(!needs_pillar(&grid, 3, 0));
        assert!(needs_pillar(&grid, 2, 2));
    }
}
