//! Layout validation for generated mazes.
//!
//! Pure functions that take a grid (and optionally placement records) and
//! return validation errors. An empty result means the layout is sound.

use std::collections::HashMap;

use crate::connectivity::flood_fill;
use crate::grid::{CellCoord, CellGrid};

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

/// A decoration placement as seen by the spacing check.
#[derive(Debug, Clone, Copy)]
pub struct PlacementRecord {
    pub entry: usize,
    pub cell: CellCoord,
}

// ── A. Grid structure ──────────────────────────────────────────────────

/// Every perimeter cell must carry its outward wall flag.
pub fn check_border_walls(grid: &CellGrid) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for cell in grid.cells() {
        for dir in grid.outward_sides(cell.row, cell.col) {
            if !cell.has_wall(dir) {
                errors.push(ValidationError {
                    category: "border",
                    severity: Severity::Error,
                    message: format!(
                        "Cell ({},{}) is missing its outward {:?} wall",
                        cell.row, cell.col, dir
                    ),
                });
            }
        }
    }
    errors
}

/// Every cell must be reachable from (0,0).
pub fn check_connectivity(grid: &CellGrid) -> Vec<ValidationError> {
    if grid.is_empty() {
        return Vec::new();
    }
    let visited = flood_fill(grid, 0, 0);
    let unreachable: Vec<CellCoord> = grid
        .cells()
        .zip(visited.iter())
        .filter(|(_, v)| !**v)
        .map(|(c, _)| c.coord())
        .collect();

    if unreachable.is_empty() {
        return Vec::new();
    }
    let sample: Vec<String> = unreachable
        .iter()
        .take(5)
        .map(|c| format!("({},{})", c.row, c.col))
        .collect();
    vec![ValidationError {
        category: "connectivity",
        severity: Severity::Error,
        message: format!(
            "{} of {} cells unreachable from (0,0), e.g. {}",
            unreachable.len(),
            grid.len(),
            sample.join(", ")
        ),
    }]
}

// ── B. Decorations ─────────────────────────────────────────────────────

/// Same-type placements must keep `min_spacing[entry]` apart. Entries in
/// `exempt` are skipped.
pub fn check_decoration_spacing(
    placements: &[PlacementRecord],
    min_spacing: &[f32],
    exempt: &[usize],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut by_entry: HashMap<usize, Vec<CellCoord>> = HashMap::new();
    for p in placements {
        by_entry.entry(p.entry).or_default().push(p.cell);
    }

    for (entry, cells) in &by_entry {
        if exempt.contains(entry) {
            continue;
        }
        let spacing = min_spacing.get(*entry).copied().unwrap_or(0.0);
        for i in 0..cells.len() {
            for j in (i + 1)..cells.len() {
                let d = cells[i].distance(&cells[j]);
                if d < spacing {
                    errors.push(ValidationError {
                        category: "decoration_spacing",
                        severity: Severity::Error,
                        message: format!(
                            "Decoration #{} at ({},{}) and ({},{}) are {:.2} apart (min {:.2})",
                            entry, cells[i].row, cells[i].col, cells[j].row, cells[j].col, d,
                            spacing
                        ),
                    });
                }
            }
        }
    }
    errors
}

/// Cells with four walls are legal but usually a sign of a bad input.
pub fn check_sealed_cells(grid: &CellGrid) -> Vec<ValidationError> {
    grid.cells()
        .filter(|c| c.walls.count() == 4 && grid.len() > 1)
        .map(|c| ValidationError {
            category: "sealed_cell",
            severity: Severity::Warning,
            message: format!("Cell ({},{}) has walls on every side", c.row, c.col),
        })
        .collect()
}

// ── Aggregate ──────────────────────────────────────────────────────────

/// Run all grid checks.
pub fn validate_layout(grid: &CellGrid) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(check_border_walls(grid));
    errors.extend(check_connectivity(grid));
    errors.extend(check_sealed_cells(grid));
    errors
}

/// True if any error (not warning) is present.
pub fn has_errors(errors: &[ValidationError]) -> bool {
    errors.iter().any(|e| e.severity == Severity::Error)
}
