//! Labyrinth Core - Procedural maze generation engine
//!
//! Builds a fully connected maze every round, materializes it as pooled
//! geometry, bakes a navigable surface over it and scatters decorations,
//! all without unbounded allocation across rounds.
//!
//! # Architecture
//!
//! Geometry lives in an ECS world (`hecs`) owned by the [`pool::GeometryPool`]:
//! - **Entities**: floor, wall, pillar, ceiling and decoration pieces, plus
//!   the groups that parent them
//! - **Components**: pure data (`Transform`, `Footprint`, `Pooled`, ...)
//! - **Generation**: builder and decoration placer acquire and release pieces
//!
//! Pure grid logic (topology, connectivity, pillar rule, placement policy)
//! lives in `labyrinth-logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use labyrinth_core::prelude::*;
//!
//! let config = MazeConfig::load("data/maze_config.json").unwrap();
//! let mut engine = MazeEngine::new(config);
//!
//! // Round 1, then round 2 reusing the pooled geometry
//! engine.generate(RoundConfig::new(10, 10, 50)).unwrap();
//! let report = engine.generate(RoundConfig::new(12, 12, 40)).unwrap();
//! println!("{} new pieces", report.new_pieces);
//!
//! let spawn = engine.random_point();
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod navigation;
pub mod persistence;
pub mod pool;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{MazeConfig, RoundConfig};
    pub use crate::engine::{GenerationReport, MazeEngine, MazeQueries};
    pub use crate::error::MazeError;
    pub use crate::navigation::NavigationQuery;
    pub use crate::pool::{GeometryPool, PieceHandle};
    pub use labyrinth_logic::spatial::Vec3;
}
