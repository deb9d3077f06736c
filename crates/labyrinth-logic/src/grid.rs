//! Maze cells and the fixed-size grid that holds them.
//!
//! Rows grow "down" (towards +z in world space), columns grow "right"
//! (towards +x). A lookup outside the grid yields `None`; callers treat a
//! missing cell as "no constraint".

use serde::{Deserialize, Serialize};

/// One of the four sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    /// Fixed evaluation order used by the generator.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
        }
    }

    /// (row delta, col delta)
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Left => (0, -1),
            Direction::Down => (1, 0),
        }
    }
}

/// Grid coordinate of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Euclidean distance in grid units.
    pub fn distance(&self, other: &Self) -> f32 {
        let dr = self.row as f32 - other.row as f32;
        let dc = self.col as f32 - other.col as f32;
        (dr * dr + dc * dc).sqrt()
    }
}

/// Per-side wall flags. Each side is independent of the neighbor's flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walls {
    pub right: bool,
    pub up: bool,
    pub left: bool,
    pub down: bool,
}

impl Walls {
    pub fn get(&self, dir: Direction) -> bool {
        match dir {
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Left => self.left,
            Direction::Down => self.down,
        }
    }

    pub fn set(&mut self, dir: Direction, value: bool) {
        match dir {
            Direction::Right => self.right = value,
            Direction::Up => self.up = value,
            Direction::Left => self.left = value,
            Direction::Down => self.down = value,
        }
    }

    pub fn count(&self) -> usize {
        Direction::ALL.iter().filter(|d| self.get(**d)).count()
    }

    pub fn any(&self) -> bool {
        self.right || self.up || self.left || self.down
    }
}

/// A single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub walls: Walls,
    /// Scratch flag, only meaningful while the generator runs.
    #[serde(skip)]
    pub visited: bool,
}

impl Cell {
    fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            walls: Walls::default(),
            visited: false,
        }
    }

    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }

    pub fn has_wall(&self, dir: Direction) -> bool {
        self.walls.get(dir)
    }

    pub fn has_any_wall(&self) -> bool {
        self.walls.any()
    }
}

/// Fixed `rows × cols` array of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Allocate a grid with every flag cleared.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(Cell::new(row, col));
            }
        }
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Holds exactly `rows × cols` cells and each cell sits in its own
    /// row-major slot. Grids built with `new` always are; deserialized
    /// ones need checking.
    pub fn is_consistent(&self) -> bool {
        self.rows.checked_mul(self.cols) == Some(self.cells.len())
            && self
                .cells
                .iter()
                .enumerate()
                .all(|(i, c)| c.col < self.cols && c.row * self.cols + c.col == i)
    }

    /// Bounds-checked lookup.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if self.contains(row, col) {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        if self.contains(row, col) {
            self.cells.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    /// Signed lookup for callers that step off the grid edge (e.g. `row - 1`).
    pub fn get_signed(&self, row: isize, col: isize) -> Option<&Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(row as usize, col as usize)
    }

    /// Coordinate of the neighbor in `dir`, if it lies inside the grid.
    pub fn neighbor_coord(&self, row: usize, col: usize, dir: Direction) -> Option<CellCoord> {
        let (dr, dc) = dir.offset();
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        self.contains(r, c).then_some(CellCoord::new(r, c))
    }

    pub fn neighbor(&self, row: usize, col: usize, dir: Direction) -> Option<&Cell> {
        self.neighbor_coord(row, col, dir)
            .and_then(|n| self.get(n.row, n.col))
    }

    /// Set or clear a single wall flag. Out-of-range coordinates are ignored.
    pub fn set_wall(&mut self, row: usize, col: usize, dir: Direction, value: bool) {
        if let Some(cell) = self.get_mut(row, col) {
            cell.walls.set(dir, value);
        }
    }

    pub fn is_perimeter(&self, row: usize, col: usize) -> bool {
        self.contains(row, col)
            && (row == 0 || col == 0 || row + 1 == self.rows || col + 1 == self.cols)
    }

    /// Directions in which `(row, col)` faces outside the grid.
    pub fn outward_sides(&self, row: usize, col: usize) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.contains(row, col) && self.neighbor_coord(row, col, *d).is_none())
            .collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Total number of set wall flags.
    pub fn wall_count(&self) -> usize {
        self.cells.iter().map(|c| c.walls.count()).sum()
    }

    pub fn clear_visited(&mut self) {
        for cell in &mut self.cells {
            cell.visited = false;
        }
    }

    /// Wall flags only, row-major. Used to compare layouts.
    pub fn wall_layout(&self) -> Vec<Walls> {
        self.cells.iter().map(|c| c.walls).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_clear() {
        let grid = CellGrid::new(3, 4);
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.wall_count(), 0);
        assert!(grid.cells().all(|c| !c.visited));
    }

    #[test]
    fn test_out_of_range_is_none() {
        let grid = CellGrid::new(2, 2);
        assert!(grid.get(2, 0).is_none());
        assert!(grid.get(0, 2).is_none());
        assert!(grid.get_signed(-1, 0).is_none());
        assert!(grid.get_signed(1, 1).is_some());
    }

    #[test]
    fn test_neighbors() {
        let grid = CellGrid::new(3, 3);
        assert_eq!(grid.neighbor_coord(0, 0, Direction::Up), None);
        assert_eq!(grid.neighbor_coord(0, 0, Direction::Left), None);
        assert_eq!(
            grid.neighbor_coord(0, 0, Direction::Right),
            Some(CellCoord::new(0, 1))
        );
        assert_eq!(
            grid.neighbor_coord(1, 1, Direction::Down),
            Some(CellCoord::new(2, 1))
        );
        assert_eq!(grid.neighbor_coord(2, 2, Direction::Down), None);
    }

    #[test]
    fn test_outward_sides_of_corner() {
        let grid = CellGrid::new(3, 3);
        let sides = grid.outward_sides(0, 2);
        assert_eq!(sides, vec![Direction::Right, Direction::Up]);
        assert!(grid.outward_sides(1, 1).is_empty());
        assert_eq!(grid.outward_sides(0, 0).len(), 2);
    }

    #[test]
    fn test_single_cell_faces_out_everywhere() {
        let grid = CellGrid::new(1, 1);
        assert_eq!(grid.outward_sides(0, 0).len(), 4);
        assert!(grid.is_perimeter(0, 0));
    }

    #[test]
    fn test_set_wall_ignores_out_of_range() {
        let mut grid = CellGrid::new(2, 2);
        grid.set_wall(5, 5, Direction::Up, true);
        assert_eq!(grid.wall_count(), 0);
        grid.set_wall(1, 0, Direction::Up, true);
        assert!(grid.get(1, 0).unwrap().has_wall(Direction::Up));
        assert!(!grid.get(0, 0).unwrap().has_wall(Direction::Down));
    }

    #[test]
    fn test_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dr, dc) = dir.offset();
            let (or, oc) = dir.opposite().offset();
            assert_eq!((dr + or, dc + oc), (0, 0));
        }
    }

    #[test]
    fn test_coord_distance() {
        let a = CellCoord::new(0, 0);
        let b = CellCoord::new(3, 4);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_consistency_check() {
        assert!(CellGrid::new(3, 4).is_consistent());
        assert!(CellGrid::new(0, 0).is_consistent());

        let mut short = CellGrid::new(3, 3);
        short.cells.truncate(1);
        assert!(!short.is_consistent());

        let mut swapped = CellGrid::new(2, 2);
        swapped.cells.swap(0, 3);
        assert!(!swapped.is_consistent());

        let mut misplaced = CellGrid::new(2, 2);
        misplaced.cells[1].col = 5;
        assert!(!misplaced.is_consistent());
    }
}
