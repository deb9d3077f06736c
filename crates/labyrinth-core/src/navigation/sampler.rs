//! Sampling over a baked navigable surface.

use labyrinth_logic::sampling::Triangle;
use labyrinth_logic::spatial::Vec3;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use super::{BakeSource, FootprintNavMesh, NavigationBackend};
use crate::pool::{GeometryPool, GroupHandle};

/// Navigation queries consumed by spawn placement and AI target selection.
pub trait NavigationQuery {
    /// A random walkable point. Falls back to the grid origin when the
    /// surface has no walkable triangles.
    fn random_point(&self, rng: &mut dyn RngCore) -> Vec3;

    /// Projection of `point` onto the surface, trying `radii` in order.
    /// Returns `point` unchanged when every radius fails.
    fn nearest_valid_position(&self, point: Vec3, radii: &[f32]) -> Vec3;
}

/// Bakes a backend from pool geometry and samples the result.
pub struct NavSurfaceSampler<B: NavigationBackend = FootprintNavMesh> {
    backend: B,
    walkable: Vec<Triangle>,
    baked: bool,
}

impl<B: NavigationBackend> NavSurfaceSampler<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            walkable: Vec::new(),
            baked: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Rebuild the surface from the pool's static geometry. The ceiling
    /// group is detached for the bake and reattached afterwards. Returns
    /// the number of walkable triangles.
    pub fn bake(&mut self, pool: &mut GeometryPool, ceilings: GroupHandle) -> usize {
        pool.set_group_attached(ceilings, false);
        let sources: Vec<BakeSource> = pool
            .active_boxes(|kind| kind.is_structural())
            .into_iter()
            .map(|(kind, bounds)| BakeSource { kind, bounds })
            .collect();
        self.backend.bake(&sources);
        pool.set_group_attached(ceilings, true);

        self.walkable = self
            .backend
            .triangulate()
            .iter()
            .filter(|t| t.is_walkable())
            .map(|t| t.triangle)
            .collect();
        self.baked = true;

        if self.walkable.is_empty() {
            log::warn!(
                "Navigation bake over {} sources produced no walkable triangles",
                sources.len()
            );
        } else {
            log::debug!(
                "Baked navigation surface: {} walkable of {} triangles",
                self.walkable.len(),
                self.backend.triangulate().len()
            );
        }
        self.walkable.len()
    }

    /// Drop the current surface.
    pub fn invalidate(&mut self) {
        self.backend.clear();
        self.walkable.clear();
        self.baked = false;
    }

    pub fn is_baked(&self) -> bool {
        self.baked
    }

    pub fn walkable_triangle_count(&self) -> usize {
        self.walkable.len()
    }

    pub fn walkable_triangles(&self) -> &[Triangle] {
        &self.walkable
    }

    /// Uniform triangle choice (not area weighted), then a uniform point
    /// inside it.
    pub fn try_random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec3> {
        let triangle = self.walkable.choose(rng)?;
        let u: f32 = rng.gen();
        let v: f32 = rng.gen();
        Some(triangle.sample(u, v))
    }

    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.try_random_point(rng).unwrap_or(Vec3::ZERO)
    }

    pub fn try_nearest_valid_position(&self, point: Vec3, radii: &[f32]) -> Option<Vec3> {
        radii
            .iter()
            .find_map(|&radius| self.backend.project(point, radius))
    }

    pub fn nearest_valid_position(&self, point: Vec3, radii: &[f32]) -> Vec3 {
        self.try_nearest_valid_position(point, radii)
            .unwrap_or(point)
    }
}

impl Default for NavSurfaceSampler<FootprintNavMesh> {
    fn default() -> Self {
        Self::new(FootprintNavMesh::default())
    }
}

impl<B: NavigationBackend> NavigationQuery for NavSurfaceSampler<B> {
    fn random_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        NavSurfaceSampler::random_point(self, rng)
    }

    fn nearest_valid_position(&self, point: Vec3, radii: &[f32]) -> Vec3 {
        NavSurfaceSampler::nearest_valid_position(self, point, radii)
    }
}
