//! Maze builder - places floors, walls, pillars and ceilings for a grid.
//!
//! World layout: x runs along columns, z along rows, y is up. Cell `(r, c)`
//! spans `[c·w, (c+1)·w] × [r·w, (r+1)·w]` on the ground plane, so the maze
//! occupies `[0, cols·w] × [0, rows·w]` with the grid origin at world zero.

use labyrinth_logic::grid::{CellCoord, CellGrid, Direction};
use labyrinth_logic::pillars::pillar_intersections;
use labyrinth_logic::spatial::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Footprint, PieceKind, Transform};
use crate::config::{MazeDimensions, StructuralSet, Template};
use crate::navigation::{NavSurfaceSampler, NavigationBackend};
use crate::pool::{GeometryPool, GroupHandle};

/// Parent groups for each class of piece.
#[derive(Debug, Clone, Copy)]
pub struct MazeGroups {
    pub floors: GroupHandle,
    pub walls: GroupHandle,
    pub pillars: GroupHandle,
    pub ceilings: GroupHandle,
    pub decorations: GroupHandle,
}

impl MazeGroups {
    pub fn create(pool: &mut GeometryPool) -> Self {
        Self {
            floors: pool.create_group("Floors"),
            walls: pool.create_group("Walls"),
            pillars: pool.create_group("Pillars"),
            ceilings: pool.create_group("Ceilings"),
            decorations: pool.create_group("Decorations"),
        }
    }
}

/// Piece counts from one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub floors: usize,
    pub walls: usize,
    pub pillars: usize,
    pub ceilings: usize,
    /// Subset of `ceilings` that used a lit variant.
    pub lit_ceilings: usize,
    pub walkable_triangles: usize,
}

pub struct MazeBuilder {
    dimensions: MazeDimensions,
    ceiling_cadence: u32,
    groups: MazeGroups,
    rows: usize,
    cols: usize,
    pillars: Vec<Vec3>,
}

impl MazeBuilder {
    pub fn new(dimensions: MazeDimensions, ceiling_cadence: u32, pool: &mut GeometryPool) -> Self {
        Self {
            dimensions,
            ceiling_cadence,
            groups: MazeGroups::create(pool),
            rows: 0,
            cols: 0,
            pillars: Vec::new(),
        }
    }

    pub fn groups(&self) -> &MazeGroups {
        &self.groups
    }

    pub fn dimensions(&self) -> &MazeDimensions {
        &self.dimensions
    }

    /// Place every structural piece for `grid`, then bake the navigation
    /// surface with the ceilings detached.
    ///
    /// The pool is expected to hold no active structural pieces; call
    /// `GeometryPool::release_all` (or the engine's clear) first.
    pub fn build<B: NavigationBackend>(
        &mut self,
        grid: &CellGrid,
        templates: &StructuralSet<'_>,
        pool: &mut GeometryPool,
        sampler: &mut NavSurfaceSampler<B>,
        rng: &mut impl Rng,
    ) -> BuildSummary {
        self.rows = grid.rows();
        self.cols = grid.cols();
        self.pillars.clear();

        let mut summary = BuildSummary::default();
        let d = self.dimensions.clone();
        let w = d.cell_width;
        let mut ceiling_index: u32 = 0;

        for cell in grid.cells() {
            let center = self.cell_world_position(cell.row, cell.col);

            pool.acquire(
                PieceKind::Floor,
                &templates.floor.name,
                Transform::new(Vec3::new(center.x, -d.floor_thickness * 0.5, center.z), 0.0),
                Footprint::new(Vec3::new(w * 0.5, d.floor_thickness * 0.5, w * 0.5)),
                Some(self.groups.floors),
            );
            summary.floors += 1;

            let (kind, prefab) = self.pick_ceiling(ceiling_index, templates, rng);
            ceiling_index += 1;
            if kind != PieceKind::Ceiling {
                summary.lit_ceilings += 1;
            }
            pool.acquire(
                kind,
                prefab,
                Transform::new(
                    Vec3::new(center.x, d.wall_height + d.ceiling_thickness * 0.5, center.z),
                    0.0,
                ),
                Footprint::new(Vec3::new(w * 0.5, d.ceiling_thickness * 0.5, w * 0.5)),
                Some(self.groups.ceilings),
            );
            summary.ceilings += 1;

            for dir in Direction::ALL {
                if !cell.has_wall(dir) {
                    continue;
                }
                pool.acquire(
                    PieceKind::Wall,
                    &templates.wall.name,
                    self.wall_transform(center, dir),
                    Footprint::new(Vec3::new(
                        w * 0.5,
                        d.wall_height * 0.5,
                        d.wall_thickness * 0.5,
                    )),
                    Some(self.groups.walls),
                );
                summary.walls += 1;
            }
        }

        match templates.pillar {
            Some(pillar) => {
                for (r, c) in pillar_intersections(grid) {
                    let position = Vec3::new(c as f32 * w, d.wall_height * 0.5, r as f32 * w);
                    pool.acquire(
                        PieceKind::Pillar,
                        &pillar.name,
                        Transform::new(position, 0.0),
                        Footprint::new(Vec3::new(
                            d.pillar_size * 0.5,
                            d.wall_height * 0.5,
                            d.pillar_size * 0.5,
                        )),
                        Some(self.groups.pillars),
                    );
                    self.pillars.push(position);
                }
                summary.pillars = self.pillars.len();
            }
            None => log::warn!("No pillar template configured, skipping pillars"),
        }

        summary.walkable_triangles = sampler.bake(pool, self.groups.ceilings);
        summary
    }

    /// Every `ceiling_cadence`-th ceiling is a randomly chosen lit variant.
    fn pick_ceiling<'t>(
        &self,
        index: u32,
        templates: &StructuralSet<'t>,
        rng: &mut impl Rng,
    ) -> (PieceKind, &'t str) {
        let lit: &'t [Template] = templates.lit_ceilings;
        let plain: &'t Template = templates.ceiling;
        let cadence = self.ceiling_cadence;
        if cadence > 0 && !lit.is_empty() && index % cadence == cadence - 1 {
            let variant = rng.gen_range(0..lit.len());
            if let Ok(tag) = u16::try_from(variant) {
                return (PieceKind::LitCeiling(tag), lit[variant].name.as_str());
            }
        }
        (PieceKind::Ceiling, plain.name.as_str())
    }

    /// Wall on side `dir` of the cell centered at `center`. Up/Down walls
    /// run along x (yaw 0); Left/Right walls run along z (yaw 90).
    fn wall_transform(&self, center: Vec3, dir: Direction) -> Transform {
        let half = self.dimensions.cell_width * 0.5;
        let y = self.dimensions.wall_height * 0.5;
        match dir {
            Direction::Right => Transform::new(Vec3::new(center.x + half, y, center.z), 90.0),
            Direction::Left => Transform::new(Vec3::new(center.x - half, y, center.z), 90.0),
            Direction::Up => Transform::new(Vec3::new(center.x, y, center.z - half), 0.0),
            Direction::Down => Transform::new(Vec3::new(center.x, y, center.z + half), 0.0),
        }
    }

    /// Forget the last build's pillar positions and size.
    pub fn clear(&mut self) {
        self.rows = 0;
        self.cols = 0;
        self.pillars.clear();
    }

    /// Ground-level center of cell `(row, col)`.
    pub fn cell_world_position(&self, row: usize, col: usize) -> Vec3 {
        let w = self.dimensions.cell_width;
        Vec3::new((col as f32 + 0.5) * w, 0.0, (row as f32 + 0.5) * w)
    }

    /// World extent of the current maze as (width along x, height along z).
    pub fn maze_size(&self) -> (f32, f32) {
        let w = self.dimensions.cell_width;
        (self.cols as f32 * w, self.rows as f32 * w)
    }

    /// Cell containing a world position, if it lies inside the maze.
    pub fn cell_at_world(&self, position: Vec3) -> Option<CellCoord> {
        let w = self.dimensions.cell_width;
        if w <= 0.0 || position.x < 0.0 || position.z < 0.0 {
            return None;
        }
        let col = (position.x / w) as usize;
        let row = (position.z / w) as usize;
        if row < self.rows && col < self.cols {
            Some(CellCoord::new(row, col))
        } else {
            None
        }
    }

    pub fn pillar_positions(&self) -> &[Vec3] {
        &self.pillars
    }

    /// Closest pillar to `point` on the ground plane.
    pub fn nearest_pillar(&self, point: Vec3) -> Option<Vec3> {
        let ground = |p: &Vec3| {
            let dx = p.x - point.x;
            let dz = p.z - point.z;
            dx * dx + dz * dz
        };
        self.pillars
            .iter()
            .min_by(|a, b| {
                ground(a)
                    .partial_cmp(&ground(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied()
    }
}
