//! Maze engine - main entry point for generating rounds

use labyrinth_logic::grid::{CellCoord, CellGrid};
use labyrinth_logic::spatial::Vec3;
use labyrinth_logic::topology::generate_topology;
use labyrinth_logic::validation::{check_decoration_spacing, validate_layout, ValidationError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::{MazeConfig, ResolvedDecoration, RoundConfig};
use crate::error::MazeError;
use crate::generation::{BuildSummary, DecorationPlacer, DecorationRecord, MazeBuilder, PlacementSummary};
use crate::navigation::{FootprintNavMesh, NavSurfaceSampler, NavigationBackend, NavigationQuery};
use crate::pool::GeometryPool;

/// Mixed into the round seed for the geometry and decoration RNG.
const GEOMETRY_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// What one generation produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub round: RoundConfig,
    /// Seed the round's RNG was built from; replaying it reproduces the round.
    pub seed: u64,
    pub cells: usize,
    pub build: BuildSummary,
    pub decorations: PlacementSummary,
    /// Pieces spawned by this generation rather than recycled.
    pub new_pieces: usize,
    pub total_pieces: usize,
}

/// Outputs consumed by camera, spawn and AI collaborators.
pub trait MazeQueries {
    /// World extent as (width along x, height along z).
    fn maze_size(&self) -> (f32, f32);
    fn cell_world_position(&self, row: usize, col: usize) -> Vec3;
    fn nearest_pillar_position(&self, point: Vec3) -> Option<Vec3>;
}

/// Owns the pool, builder, placer and navigation surface across rounds.
pub struct MazeEngine<B: NavigationBackend = FootprintNavMesh> {
    config: MazeConfig,
    pool: GeometryPool,
    builder: MazeBuilder,
    placer: DecorationPlacer,
    sampler: NavSurfaceSampler<B>,
    grid: Option<CellGrid>,
    round: Option<RoundConfig>,
    round_seed: Option<u64>,
    rng: StdRng,
}

impl MazeEngine<FootprintNavMesh> {
    /// Engine with the built-in footprint navmesh.
    pub fn new(config: MazeConfig) -> Self {
        let backend = FootprintNavMesh::new(&config.navigation);
        Self::with_backend(config, backend)
    }
}

impl<B: NavigationBackend> MazeEngine<B> {
    pub fn with_backend(config: MazeConfig, backend: B) -> Self {
        let mut pool = GeometryPool::new();
        let builder = MazeBuilder::new(
            config.dimensions.clone(),
            config.templates.ceiling_cadence,
            &mut pool,
        );
        let placer = DecorationPlacer::new(config.decorations.clone());
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            pool,
            builder,
            placer,
            sampler: NavSurfaceSampler::new(backend),
            grid: None,
            round: None,
            round_seed: None,
            rng,
        }
    }

    /// Generate a round with a seed drawn from the engine RNG.
    pub fn generate(&mut self, round: RoundConfig) -> Result<GenerationReport, MazeError> {
        let seed = self.rng.gen();
        self.generate_with_seed(round, seed)
    }

    /// Clear the previous maze and build a new one: topology, structural
    /// geometry, navigation bake, then decorations.
    ///
    /// Preconditions are checked before anything is released, so a failed
    /// call leaves the previous maze intact.
    pub fn generate_with_seed(
        &mut self,
        round: RoundConfig,
        seed: u64,
    ) -> Result<GenerationReport, MazeError> {
        round.validate()?;
        self.config.structural()?;
        let catalog = self.config.resolve_catalog();

        self.clear_maze();
        let created_before = self.pool.total_created();

        let mut topology_rng = StdRng::seed_from_u64(seed);
        let grid = generate_topology(
            round.rows,
            round.cols,
            round.wall_probability,
            &mut topology_rng,
        );
        let mut rng = StdRng::seed_from_u64(seed ^ GEOMETRY_STREAM);
        let (build, decorations) = self.populate(&grid, &catalog, &mut rng)?;

        let report = GenerationReport {
            round,
            seed,
            cells: grid.len(),
            build,
            decorations,
            new_pieces: self.pool.total_created() - created_before,
            total_pieces: self.pool.total_created(),
        };
        log::info!(
            "Generated {}x{} maze (seed {}): {} walls, {} pillars, {} decorations, {} new pieces",
            round.rows,
            round.cols,
            seed,
            build.walls,
            build.pillars,
            decorations.placed,
            report.new_pieces
        );

        self.grid = Some(grid);
        self.round = Some(round);
        self.round_seed = Some(seed);
        Ok(report)
    }

    fn populate(
        &mut self,
        grid: &CellGrid,
        catalog: &[ResolvedDecoration],
        rng: &mut StdRng,
    ) -> Result<(BuildSummary, PlacementSummary), MazeError> {
        let templates = self.config.structural()?;
        let build = self
            .builder
            .build(grid, &templates, &mut self.pool, &mut self.sampler, rng);
        let decorations = self.placer.place_all(
            grid,
            catalog,
            self.config.dimensions.cell_width,
            &mut self.pool,
            self.builder.groups().decorations,
            rng,
        );
        Ok((build, decorations))
    }

    /// Rebuild a stored layout: structural geometry and bake from `grid`,
    /// decorations from `records`. Lit ceiling variants are redrawn from
    /// `seed` and match the original round.
    pub fn rebuild(
        &mut self,
        round: RoundConfig,
        seed: u64,
        grid: CellGrid,
        records: &[DecorationRecord],
    ) -> Result<GenerationReport, MazeError> {
        round.validate()?;
        if !grid.is_consistent() || grid.rows() != round.rows || grid.cols() != round.cols {
            return Err(MazeError::InvalidDimensions {
                rows: grid.rows(),
                cols: grid.cols(),
            });
        }
        self.config.structural()?;
        let catalog = self.config.resolve_catalog();

        self.clear_maze();
        let created_before = self.pool.total_created();
        let mut rng = StdRng::seed_from_u64(seed ^ GEOMETRY_STREAM);

        let templates = self.config.structural()?;
        let build = self
            .builder
            .build(&grid, &templates, &mut self.pool, &mut self.sampler, &mut rng);
        let placed = self.placer.restore(
            records,
            &catalog,
            &mut self.pool,
            self.builder.groups().decorations,
        );

        let report = GenerationReport {
            round,
            seed,
            cells: grid.len(),
            build,
            decorations: PlacementSummary {
                placed,
                ..PlacementSummary::default()
            },
            new_pieces: self.pool.total_created() - created_before,
            total_pieces: self.pool.total_created(),
        };
        log::info!(
            "Rebuilt {}x{} maze (seed {}) with {} decorations",
            round.rows,
            round.cols,
            seed,
            placed
        );

        self.grid = Some(grid);
        self.round = Some(round);
        self.round_seed = Some(seed);
        Ok(report)
    }

    /// Release every active piece, forget decoration history and drop the
    /// navigation surface. Pieces stay pooled for the next build.
    pub fn clear_maze(&mut self) {
        let released = self.pool.release_all();
        self.placer.clear();
        self.sampler.invalidate();
        self.builder.clear();
        self.grid = None;
        self.round = None;
        self.round_seed = None;
        if released > 0 {
            log::debug!("Cleared maze, released {} pieces", released);
        }
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    pub fn grid(&self) -> Option<&CellGrid> {
        self.grid.as_ref()
    }

    pub fn round(&self) -> Option<RoundConfig> {
        self.round
    }

    pub fn round_seed(&self) -> Option<u64> {
        self.round_seed
    }

    pub fn pool(&self) -> &GeometryPool {
        &self.pool
    }

    pub fn builder(&self) -> &MazeBuilder {
        &self.builder
    }

    pub fn navigation(&self) -> &NavSurfaceSampler<B> {
        &self.sampler
    }

    pub fn decoration_placements(&self) -> &[DecorationRecord] {
        self.placer.placements()
    }

    pub fn placer(&self) -> &DecorationPlacer {
        &self.placer
    }

    /// Grid checks plus decoration spacing for the current maze. Empty when
    /// nothing is built.
    pub fn validate(&self) -> Vec<ValidationError> {
        let Some(grid) = &self.grid else {
            return Vec::new();
        };
        let spacing: Vec<f32> = self
            .config
            .decorations
            .catalog
            .iter()
            .map(|e| e.min_spacing)
            .collect();
        let filler: Vec<usize> = self
            .config
            .resolve_catalog()
            .first()
            .map(|e| e.index)
            .into_iter()
            .collect();

        let mut errors = validate_layout(grid);
        errors.extend(check_decoration_spacing(
            &self.placer.placement_records(),
            &spacing,
            &filler,
        ));
        errors
    }

    pub fn cell_at_world(&self, position: Vec3) -> Option<CellCoord> {
        self.builder.cell_at_world(position)
    }

    /// Random walkable point, drawn from the engine RNG.
    pub fn random_point(&mut self) -> Vec3 {
        self.sampler.random_point(&mut self.rng)
    }

    /// Nearest walkable position using the configured search radii.
    pub fn nearest_valid_position(&self, point: Vec3) -> Vec3 {
        NavigationQuery::nearest_valid_position(
            &self.sampler,
            point,
            &self.config.navigation.search_radii,
        )
    }
}

impl<B: NavigationBackend> MazeQueries for MazeEngine<B> {
    fn maze_size(&self) -> (f32, f32) {
        self.builder.maze_size()
    }

    fn cell_world_position(&self, row: usize, col: usize) -> Vec3 {
        self.builder.cell_world_position(row, col)
    }

    fn nearest_pillar_position(&self, point: Vec3) -> Option<Vec3> {
        self.builder.nearest_pillar(point)
    }
}
