//! Navigable surface - baking and sampling.
//!
//! The engine talks to navigation through [`NavigationBackend`]; a renderer
//! or physics adapter can supply its own navmesh implementation. The crate
//! ships [`FootprintNavMesh`], which bakes walkable top faces straight from
//! piece footprints.

mod footprint;
mod sampler;

pub use footprint::*;
pub use sampler::*;

use labyrinth_logic::sampling::Triangle;
use labyrinth_logic::spatial::{OrientedBox, Vec3};

use crate::components::PieceKind;

/// Static geometry fed into a bake.
#[derive(Debug, Clone, Copy)]
pub struct BakeSource {
    pub kind: PieceKind,
    pub bounds: OrientedBox,
}

/// Area classification of a baked triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    Walkable,
    NotWalkable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavTriangle {
    pub triangle: Triangle,
    pub area: AreaKind,
}

impl NavTriangle {
    pub fn is_walkable(&self) -> bool {
        self.area == AreaKind::Walkable
    }
}

/// Navigation capability: bake from static geometry, triangulate, project.
pub trait NavigationBackend {
    /// Replace the surface with one built from `sources`.
    fn bake(&mut self, sources: &[BakeSource]);

    /// Drop the current surface.
    fn clear(&mut self);

    /// Triangulation of the current surface, walkable or not.
    fn triangulate(&self) -> &[NavTriangle];

    /// Closest walkable point within `max_distance` of `point`.
    fn project(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;
}
