//! Decoration placer - scatters catalog objects over the maze cells.
//!
//! Per cell:
//! 1. Cells with walls that cannot keep the wall clearance are skipped.
//! 2. Catalog entries are evaluated filler first, the rest shuffled, until
//!    the per-cell cap is reached.
//! 3. Each entry must pass a probability roll and, unless it is the
//!    filler, the same-type spacing rule.
//! 4. Open cells always accept a random offset and odd-degree yaw. Cells
//!    with walls search offsets × rotations for a pose clear of wall and
//!    pillar geometry; exhausting the search just omits the item.

use std::collections::HashMap;

use labyrinth_logic::grid::{CellCoord, CellGrid};
use labyrinth_logic::placement::{
    candidate_rotations, cell_too_small, evaluation_order, fallback_offsets, random_odd_angle,
    random_offset, violates_spacing,
};
use labyrinth_logic::spatial::{OrientedBox, Vec3};
use labyrinth_logic::validation::PlacementRecord;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Footprint, PieceKind, Transform};
use crate::config::{DecorationSettings, ResolvedDecoration};
use crate::pool::{CollisionSet, GeometryPool, GroupHandle};

/// Pool kind for catalog entry `index`, if the index fits the kind's tag.
fn decoration_kind(index: usize) -> Option<PieceKind> {
    u16::try_from(index).ok().map(PieceKind::Decoration)
}

/// One placed decoration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorationRecord {
    /// Index of the entry in the configured catalog.
    pub entry: usize,
    pub cell: CellCoord,
    pub position: Vec3,
    pub yaw_degrees: f32,
}

/// Outcome counters for one placement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSummary {
    pub placed: usize,
    /// Cells skipped for being too small to keep the wall clearance.
    pub skipped_cells: usize,
    pub rejected_roll: usize,
    pub rejected_spacing: usize,
    /// Attempts where no candidate pose cleared the walls.
    pub failed_fit: usize,
}

pub struct DecorationPlacer {
    settings: DecorationSettings,
    history: HashMap<usize, Vec<CellCoord>>,
    placements: Vec<DecorationRecord>,
}

impl DecorationPlacer {
    pub fn new(settings: DecorationSettings) -> Self {
        Self {
            settings,
            history: HashMap::new(),
            placements: Vec::new(),
        }
    }

    pub fn settings(&self) -> &DecorationSettings {
        &self.settings
    }

    /// Forget every placement of the previous pass.
    pub fn clear(&mut self) {
        self.history.clear();
        self.placements.clear();
    }

    pub fn placements(&self) -> &[DecorationRecord] {
        &self.placements
    }

    /// Placements as (entry, cell) pairs for layout validation.
    pub fn placement_records(&self) -> Vec<PlacementRecord> {
        self.placements
            .iter()
            .map(|p| PlacementRecord {
                entry: p.entry,
                cell: p.cell,
            })
            .collect()
    }

    /// Decorate every cell of `grid`. Wall geometry must already be in the
    /// pool.
    pub fn place_all(
        &mut self,
        grid: &CellGrid,
        catalog: &[ResolvedDecoration],
        cell_width: f32,
        pool: &mut GeometryPool,
        group: GroupHandle,
        rng: &mut impl Rng,
    ) -> PlacementSummary {
        let mut summary = PlacementSummary::default();
        if catalog.is_empty() || self.settings.per_cell_cap == 0 {
            return summary;
        }

        // Walls and pillars are all in place and stay put for the pass
        let obstacles = pool.collision_set(|kind| kind.is_wall_geometry());

        for cell in grid.cells() {
            let coord = cell.coord();
            let has_walls = cell.has_any_wall();
            if has_walls && cell_too_small(cell_width, self.settings.wall_clearance) {
                summary.skipped_cells += 1;
                continue;
            }
            self.decorate_cell(
                coord,
                has_walls,
                catalog,
                cell_width,
                &obstacles,
                pool,
                group,
                rng,
                &mut summary,
            );
        }

        log::debug!(
            "Placed {} decorations ({} roll, {} spacing, {} fit rejections)",
            summary.placed,
            summary.rejected_roll,
            summary.rejected_spacing,
            summary.failed_fit
        );
        summary
    }

    #[allow(clippy::too_many_arguments)]
    fn decorate_cell(
        &mut self,
        coord: CellCoord,
        has_walls: bool,
        catalog: &[ResolvedDecoration],
        cell_width: f32,
        obstacles: &CollisionSet,
        pool: &mut GeometryPool,
        group: GroupHandle,
        rng: &mut impl Rng,
        summary: &mut PlacementSummary,
    ) {
        let shared_roll: f32 = rng.gen();
        let mut placed_here = 0;

        for slot in evaluation_order(catalog.len(), rng) {
            if placed_here >= self.settings.per_cell_cap {
                break;
            }
            let entry = &catalog[slot];
            let filler = slot == 0;
            let Some(kind) = decoration_kind(entry.index) else {
                log::debug!(
                    "Decoration '{}' at catalog index {} has no pool kind, skipping",
                    entry.template.name,
                    entry.index
                );
                continue;
            };

            let roll = if filler || !self.settings.shared_roll {
                rng.gen()
            } else {
                shared_roll
            };
            if roll >= entry.probability {
                summary.rejected_roll += 1;
                continue;
            }

            if !filler {
                let history = self.history.get(&entry.index).map(Vec::as_slice).unwrap_or(&[]);
                if violates_spacing(history, coord, entry.min_spacing) {
                    summary.rejected_spacing += 1;
                    continue;
                }
            }

            let center = Vec3::new(
                (coord.col as f32 + 0.5) * cell_width,
                0.0,
                (coord.row as f32 + 0.5) * cell_width,
            );
            let pose = if has_walls {
                self.fit_against_walls(center, entry, cell_width, obstacles, rng)
            } else {
                Some(self.open_pose(center, cell_width, rng))
            };

            match pose {
                Some((position, yaw_degrees)) => {
                    pool.acquire(
                        kind,
                        &entry.template.name,
                        Transform::new(position, yaw_degrees),
                        Footprint::from_size(entry.template.size),
                        Some(group),
                    );
                    self.history.entry(entry.index).or_default().push(coord);
                    self.placements.push(DecorationRecord {
                        entry: entry.index,
                        cell: coord,
                        position,
                        yaw_degrees,
                    });
                    placed_here += 1;
                    summary.placed += 1;
                }
                None => {
                    log::debug!(
                        "No clear pose for '{}' in cell ({}, {})",
                        entry.template.name,
                        coord.row,
                        coord.col
                    );
                    summary.failed_fit += 1;
                }
            }
        }
    }

    fn safe_half_range(&self, cell_width: f32) -> f32 {
        cell_width * 0.5 - self.settings.wall_clearance
    }

    fn open_pose(&self, center: Vec3, cell_width: f32, rng: &mut impl Rng) -> (Vec3, f32) {
        let (dx, dz) = random_offset(self.safe_half_range(cell_width), rng);
        (Vec3::new(center.x + dx, center.y, center.z + dz), random_odd_angle(rng))
    }

    /// One random offset, then the fixed nudges; each tries every
    /// candidate rotation against wall and pillar boxes.
    fn fit_against_walls(
        &self,
        center: Vec3,
        entry: &ResolvedDecoration,
        cell_width: f32,
        obstacles: &CollisionSet,
        rng: &mut impl Rng,
    ) -> Option<(Vec3, f32)> {
        let size = entry.template.size;
        let half = size * 0.5 + Vec3::splat(self.settings.safety_margin);

        let first = random_offset(self.safe_half_range(cell_width), rng);
        let offsets = std::iter::once(first).chain(fallback_offsets(self.settings.nudge));

        for (dx, dz) in offsets {
            let position = Vec3::new(center.x + dx, center.y, center.z + dz);
            let query_center = Vec3::new(position.x, size.y * 0.5, position.z);
            for yaw in candidate_rotations(rng) {
                let query_box = OrientedBox::new(query_center, half, yaw);
                if !obstacles.overlaps(&query_box) {
                    return Some((position, yaw));
                }
            }
        }
        None
    }

    /// Re-acquire geometry for previously recorded placements, replacing
    /// the current history.
    pub fn restore(
        &mut self,
        records: &[DecorationRecord],
        catalog: &[ResolvedDecoration],
        pool: &mut GeometryPool,
        group: GroupHandle,
    ) -> usize {
        self.clear();
        for record in records {
            let Some(entry) = catalog.iter().find(|e| e.index == record.entry) else {
                log::debug!("Snapshot decoration #{} has no template, skipping", record.entry);
                continue;
            };
            let Some(kind) = decoration_kind(entry.index) else {
                log::debug!("Snapshot decoration #{} has no pool kind, skipping", record.entry);
                continue;
            };
            pool.acquire(
                kind,
                &entry.template.name,
                Transform::new(record.position, record.yaw_degrees),
                Footprint::from_size(entry.template.size),
                Some(group),
            );
            self.history.entry(entry.index).or_default().push(record.cell);
            self.placements.push(*record);
        }
        self.placements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Template;
    use labyrinth_logic::topology::seed_border_walls;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(index: usize, name: &str, probability: f32, min_spacing: f32) -> ResolvedDecoration {
        ResolvedDecoration {
            index,
            template: Template::new(name).with_size(0.6, 0.6, 0.6),
            probability,
            min_spacing,
        }
    }

    fn settings(cap: usize) -> DecorationSettings {
        DecorationSettings {
            per_cell_cap: cap,
            catalog: Vec::new(),
            ..DecorationSettings::default()
        }
    }

    #[test]
    fn test_open_grid_one_per_cell() {
        let grid = CellGrid::new(4, 4);
        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(1));
        let mut rng = StdRng::seed_from_u64(2);
        let summary = placer.place_all(&grid, &[entry(0, "rubble", 1.0, 0.0)], 4.0, &mut pool, group, &mut rng);
        assert_eq!(summary.placed, 16);
        assert_eq!(pool.count_active(PieceKind::Decoration(0)), 16);

        for record in placer.placements() {
            // Inside the safe inset and at an odd whole-degree yaw
            let cx = (record.cell.col as f32 + 0.5) * 4.0;
            let cz = (record.cell.row as f32 + 0.5) * 4.0;
            assert!((record.position.x - cx).abs() <= 1.5 + 1e-5);
            assert!((record.position.z - cz).abs() <= 1.5 + 1e-5);
            assert_eq!(record.yaw_degrees as u32 % 2, 1);
        }
    }

    #[test]
    fn test_zero_probability_never_places() {
        let grid = CellGrid::new(3, 3);
        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(2));
        let mut rng = StdRng::seed_from_u64(4);
        let summary = placer.place_all(&grid, &[entry(0, "rubble", 0.0, 0.0)], 4.0, &mut pool, group, &mut rng);
        assert_eq!(summary.placed, 0);
        assert_eq!(summary.rejected_roll, 9);
    }

    #[test]
    fn test_spacing_respected_for_non_filler() {
        let grid = CellGrid::new(8, 8);
        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(2));
        let catalog = [entry(0, "rubble", 0.0, 0.0), entry(1, "crate", 1.0, 3.0)];
        let mut rng = StdRng::seed_from_u64(8);
        let summary = placer.place_all(&grid, &catalog, 4.0, &mut pool, group, &mut rng);
        assert!(summary.placed > 0);
        assert!(summary.rejected_spacing > 0);

        let cells: Vec<CellCoord> = placer.placements().iter().map(|p| p.cell).collect();
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                assert!(a.distance(b) >= 3.0, "{:?} and {:?} too close", a, b);
            }
        }
    }

    #[test]
    fn test_filler_ignores_spacing() {
        let grid = CellGrid::new(3, 3);
        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(1));
        let mut rng = StdRng::seed_from_u64(9);
        let summary = placer.place_all(&grid, &[entry(0, "rubble", 1.0, 10.0)], 4.0, &mut pool, group, &mut rng);
        assert_eq!(summary.placed, 9);
    }

    #[test]
    fn test_walled_cells_avoid_wall_boxes() {
        let mut grid = CellGrid::new(2, 2);
        seed_border_walls(&mut grid);
        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        // Walls on the border of a 2×2 grid of 4-wide cells
        for (x, z, yaw) in [(4.0, 0.0, 0.0), (4.0, 8.0, 0.0), (0.0, 4.0, 90.0), (8.0, 4.0, 90.0)] {
            pool.acquire(
                PieceKind::Wall,
                "wall",
                Transform::new(Vec3::new(x, 1.5, z), yaw),
                Footprint::new(Vec3::new(4.0, 1.5, 0.1)),
                None,
            );
        }
        let mut placer = DecorationPlacer::new(settings(1));
        let mut rng = StdRng::seed_from_u64(12);
        let summary = placer.place_all(&grid, &[entry(0, "crate", 1.0, 0.0)], 4.0, &mut pool, group, &mut rng);
        assert_eq!(summary.placed, 4);

        let walls = pool.collision_set(|k| k.is_wall_geometry());
        let views = pool.pieces();
        for deco in views.iter().filter(|v| matches!(v.kind, PieceKind::Decoration(_))) {
            let query_box = deco.footprint.to_box(&Transform::new(
                Vec3::new(deco.transform.position.x, 0.3, deco.transform.position.z),
                deco.transform.yaw_degrees,
            ));
            assert!(!walls.overlaps(&query_box));
        }
    }

    #[test]
    fn test_tiny_walled_cells_are_skipped() {
        let mut grid = CellGrid::new(2, 2);
        seed_border_walls(&mut grid);
        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(1));
        let mut rng = StdRng::seed_from_u64(1);
        let summary = placer.place_all(&grid, &[entry(0, "rubble", 1.0, 0.0)], 1.0, &mut pool, group, &mut rng);
        assert_eq!(summary.skipped_cells, 4);
        assert_eq!(summary.placed, 0);
    }

    #[test]
    fn test_clear_and_restore() {
        let grid = CellGrid::new(2, 2);
        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(1));
        let catalog = [entry(0, "rubble", 1.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(6);
        placer.place_all(&grid, &catalog, 4.0, &mut pool, group, &mut rng);
        let saved = placer.placements().to_vec();

        pool.release_all();
        placer.clear();
        assert!(placer.placements().is_empty());

        assert_eq!(placer.restore(&saved, &catalog, &mut pool, group), 4);
        assert_eq!(placer.placements(), saved.as_slice());
        assert_eq!(pool.count_active(PieceKind::Decoration(0)), 4);
        // Same pieces reused
        assert_eq!(pool.stats(PieceKind::Decoration(0)).created, 4);
    }

    /// A walled grid with one yaw-0 pillar block per cell, centered on the
    /// cell and `half_x` × `half_z` wide on the ground.
    fn blocked_cells(
        rows: usize,
        cols: usize,
        width: f32,
        half_x: f32,
        half_z: f32,
    ) -> (CellGrid, GeometryPool) {
        let mut grid = CellGrid::new(rows, cols);
        seed_border_walls(&mut grid);
        let mut pool = GeometryPool::new();
        for row in 0..rows {
            for col in 0..cols {
                let cx = (col as f32 + 0.5) * width;
                let cz = (row as f32 + 0.5) * width;
                pool.acquire(
                    PieceKind::Pillar,
                    "block",
                    Transform::new(Vec3::new(cx, 1.5, cz), 0.0),
                    Footprint::new(Vec3::new(half_x, 1.5, half_z)),
                    None,
                );
            }
        }
        (grid, pool)
    }

    #[test]
    fn test_nudge_used_when_random_offset_blocked() {
        // An 8-wide cell keeps random offsets within ±3.5; the block covers
        // every one of them but leaves the +x nudge at 3.8 clear.
        for seed in 0..10 {
            let (grid, mut pool) = blocked_cells(1, 1, 8.0, 3.2, 10.0);
            let group = pool.create_group("Decorations");
            let mut placer = DecorationPlacer::new(DecorationSettings {
                nudge: 3.8,
                ..settings(1)
            });
            let mut rng = StdRng::seed_from_u64(seed);
            let summary = placer.place_all(&grid, &[entry(0, "crate", 1.0, 0.0)], 8.0, &mut pool, group, &mut rng);
            assert_eq!(summary.placed, 1, "seed {}", seed);
            assert_eq!(summary.failed_fit, 0);

            let record = placer.placements()[0];
            assert!((record.position.x - 7.8).abs() < 1e-5);
            assert!((record.position.z - 4.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_exhausted_search_places_nothing() {
        let (grid, mut pool) = blocked_cells(2, 2, 4.0, 3.0, 3.0);
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(1));
        let mut rng = StdRng::seed_from_u64(3);
        let summary = placer.place_all(&grid, &[entry(0, "crate", 1.0, 0.0)], 4.0, &mut pool, group, &mut rng);

        assert_eq!(summary.placed, 0);
        assert_eq!(summary.failed_fit, 4);
        assert!(placer.placements().is_empty());
        assert_eq!(pool.count_active(PieceKind::Decoration(0)), 0);
        assert_eq!(pool.stats(PieceKind::Decoration(0)).created, 0);
        assert_eq!(pool.count_active(PieceKind::Pillar), 4);
    }

    fn per_cell_counts(placer: &DecorationPlacer) -> HashMap<CellCoord, usize> {
        let mut counts = HashMap::new();
        for record in placer.placements() {
            *counts.entry(record.cell).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_shared_roll_decides_non_filler_together() {
        let grid = CellGrid::new(10, 10);
        let catalog = [
            entry(0, "rubble", 0.0, 0.0),
            entry(1, "crate", 0.5, 0.0),
            entry(2, "barrel", 0.5, 0.0),
        ];

        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(2));
        let mut rng = StdRng::seed_from_u64(21);
        let summary = placer.place_all(&grid, &catalog, 4.0, &mut pool, group, &mut rng);
        assert!(summary.placed > 0);
        assert!(per_cell_counts(&placer).values().all(|n| *n == 2));
    }

    #[test]
    fn test_independent_rolls_split_non_filler() {
        let grid = CellGrid::new(10, 10);
        let catalog = [
            entry(0, "rubble", 0.0, 0.0),
            entry(1, "crate", 0.5, 0.0),
            entry(2, "barrel", 0.5, 0.0),
        ];

        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(DecorationSettings {
            shared_roll: false,
            ..settings(2)
        });
        let mut rng = StdRng::seed_from_u64(21);
        let summary = placer.place_all(&grid, &catalog, 4.0, &mut pool, group, &mut rng);
        assert_eq!(summary.placed + summary.rejected_roll, 300);
        assert!(per_cell_counts(&placer).values().any(|n| *n == 1));
        assert_eq!(
            pool.count_active(PieceKind::Decoration(1)) + pool.count_active(PieceKind::Decoration(2)),
            summary.placed
        );
    }

    #[test]
    fn test_entry_without_pool_kind_is_skipped() {
        let grid = CellGrid::new(2, 2);
        let mut pool = GeometryPool::new();
        let group = pool.create_group("Decorations");
        let mut placer = DecorationPlacer::new(settings(2));
        let catalog = [entry(0, "rubble", 0.0, 0.0), entry(70_000, "statue", 1.0, 0.0)];
        let mut rng = StdRng::seed_from_u64(5);
        let summary = placer.place_all(&grid, &catalog, 4.0, &mut pool, group, &mut rng);
        assert_eq!(summary.placed, 0);
        assert_eq!(summary.rejected_roll, 4);
        assert!(pool.pieces().is_empty());

        let record = DecorationRecord {
            entry: 70_000,
            cell: CellCoord::new(0, 0),
            position: Vec3::new(2.0, 0.0, 2.0),
            yaw_degrees: 1.0,
        };
        assert_eq!(placer.restore(&[record], &catalog, &mut pool, group), 0);
        assert!(pool.pieces().is_empty());
    }
}
