//! Footprint navmesh - bakes walkable top faces from piece boxes.
//!
//! Algorithm:
//! 1. Every source contributes its top face as a rectangle.
//! 2. A face the agent cannot fit on (narrower than its diameter) is kept
//!    but classified not walkable.
//! 3. Any other source rising between `step_height` and `agent_height`
//!    above the face is an obstacle; its footprint grown by the agent radius
//!    is cut out of the face, keeping the largest remaining side.
//! 4. Each face becomes two triangles.

use labyrinth_logic::sampling::{nearest_on_triangles, Triangle};
use labyrinth_logic::spatial::{BoundingBox, Vec3};

use super::{AreaKind, BakeSource, NavTriangle, NavigationBackend};
use crate::config::NavigationSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    min_x: f32,
    max_x: f32,
    min_z: f32,
    max_z: f32,
}

impl Rect {
    fn of(b: &BoundingBox) -> Self {
        Self {
            min_x: b.min.x,
            max_x: b.max.x,
            min_z: b.min.z,
            max_z: b.max.z,
        }
    }

    fn area(&self) -> f32 {
        (self.max_x - self.min_x).max(0.0) * (self.max_z - self.min_z).max(0.0)
    }

    fn is_empty(&self) -> bool {
        self.max_x - self.min_x <= f32::EPSILON || self.max_z - self.min_z <= f32::EPSILON
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_z < other.max_z
            && other.min_z < self.max_z
    }

    /// Remove `hole` by keeping the largest side of `self` that avoids it.
    fn cut(&self, hole: &Rect) -> Rect {
        if !self.overlaps(hole) {
            return *self;
        }
        let candidates = [
            Rect { max_x: hole.min_x, ..*self },
            Rect { min_x: hole.max_x, ..*self },
            Rect { max_z: hole.min_z, ..*self },
            Rect { min_z: hole.max_z, ..*self },
        ];
        candidates
            .into_iter()
            .filter(|r| !r.is_empty())
            .max_by(|a, b| a.area().partial_cmp(&b.area()).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(Rect { max_x: self.min_x, ..*self })
    }

    fn triangles(&self, y: f32) -> [Triangle; 2] {
        let a = Vec3::new(self.min_x, y, self.min_z);
        let b = Vec3::new(self.max_x, y, self.min_z);
        let c = Vec3::new(self.max_x, y, self.max_z);
        let d = Vec3::new(self.min_x, y, self.max_z);
        [Triangle::new(a, b, c), Triangle::new(a, c, d)]
    }
}

/// Built-in navigation backend.
#[derive(Debug, Clone)]
pub struct FootprintNavMesh {
    agent_radius: f32,
    agent_height: f32,
    step_height: f32,
    triangles: Vec<NavTriangle>,
}

impl FootprintNavMesh {
    pub fn new(settings: &NavigationSettings) -> Self {
        Self {
            agent_radius: settings.agent_radius.max(0.0),
            agent_height: settings.agent_height.max(0.0),
            step_height: settings.step_height.max(0.0),
            triangles: Vec::new(),
        }
    }

    fn blocks(&self, surface_top: f32, obstacle: &BoundingBox) -> bool {
        obstacle.max.y > surface_top + self.step_height
            && obstacle.min.y < surface_top + self.agent_height
    }
}

impl Default for FootprintNavMesh {
    fn default() -> Self {
        Self::new(&NavigationSettings::default())
    }
}

impl NavigationBackend for FootprintNavMesh {
    fn bake(&mut self, sources: &[BakeSource]) {
        self.triangles.clear();
        let boxes: Vec<BoundingBox> = sources.iter().map(|s| s.bounds.aabb()).collect();
        let diameter = self.agent_radius * 2.0;

        for (i, surface) in boxes.iter().enumerate() {
            let top = surface.max.y;
            let face = Rect::of(surface);
            let fits = surface.width().min(surface.depth()) >= diameter;

            let mut walkable = face;
            if fits {
                for (j, obstacle) in boxes.iter().enumerate() {
                    if i == j || !self.blocks(top, obstacle) {
                        continue;
                    }
                    let hole = Rect::of(&obstacle.expanded(self.agent_radius));
                    walkable = walkable.cut(&hole);
                    if walkable.is_empty() {
                        break;
                    }
                }
            }

            let (rect, area) = if fits && !walkable.is_empty() {
                (walkable, AreaKind::Walkable)
            } else {
                (face, AreaKind::NotWalkable)
            };
            for triangle in rect.triangles(top) {
                self.triangles.push(NavTriangle { triangle, area });
            }
        }
    }

    fn clear(&mut self) {
        self.triangles.clear();
    }

    fn triangulate(&self) -> &[NavTriangle] {
        &self.triangles
    }

    fn project(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        let walkable = self
            .triangles
            .iter()
            .filter(|t| t.is_walkable())
            .map(|t| &t.triangle);
        nearest_on_triangles(walkable, point, max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::PieceKind;
    use labyrinth_logic::spatial::OrientedBox;

    fn floor(cx: f32, cz: f32) -> BakeSource {
        BakeSource {
            kind: PieceKind::Floor,
            bounds: OrientedBox::new(Vec3::new(cx, -0.05, cz), Vec3::new(2.0, 0.05, 2.0), 0.0),
        }
    }

    fn wall_x(x: f32, cz: f32) -> BakeSource {
        BakeSource {
            kind: PieceKind::Wall,
            bounds: OrientedBox::new(Vec3::new(x, 1.5, cz), Vec3::new(2.0, 1.5, 0.1), 90.0),
        }
    }

    #[test]
    fn test_single_floor_is_walkable() {
        let mut mesh = FootprintNavMesh::default();
        mesh.bake(&[floor(2.0, 2.0)]);
        let tris = mesh.triangulate();
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().all(|t| t.is_walkable()));
        let total: f32 = tris.iter().map(|t| t.triangle.area()).sum();
        assert!((total - 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_cuts_floor_and_is_not_walkable() {
        let mut mesh = FootprintNavMesh::default();
        mesh.bake(&[floor(2.0, 2.0), wall_x(4.0, 2.0)]);
        let tris = mesh.triangulate();
        assert_eq!(tris.len(), 4);

        let floor_max_x = tris
            .iter()
            .filter(|t| t.is_walkable())
            .flat_map(|t| [t.triangle.a.x, t.triangle.b.x, t.triangle.c.x])
            .fold(f32::MIN, f32::max);
        // 4.0 − half wall thickness − agent radius
        assert!((floor_max_x - 3.5).abs() < 1e-4);
        assert_eq!(tris.iter().filter(|t| !t.is_walkable()).count(), 2);
    }

    #[test]
    fn test_high_geometry_does_not_block() {
        let mut mesh = FootprintNavMesh::default();
        let ceiling = BakeSource {
            kind: PieceKind::Ceiling,
            bounds: OrientedBox::new(Vec3::new(2.0, 3.05, 2.0), Vec3::new(2.0, 0.05, 2.0), 0.0),
        };
        mesh.bake(&[floor(2.0, 2.0), ceiling]);
        // Both the floor and the ceiling top are walkable faces
        assert_eq!(mesh.triangulate().iter().filter(|t| t.is_walkable()).count(), 4);
    }

    #[test]
    fn test_project() {
        let mut mesh = FootprintNavMesh::default();
        mesh.bake(&[floor(2.0, 2.0)]);
        let inside = mesh.project(Vec3::new(1.0, 1.0, 1.0), 2.0).unwrap();
        assert!((inside.y - 0.0).abs() < 1e-5);
        assert!(mesh.project(Vec3::new(10.0, 0.0, 10.0), 1.0).is_none());
        mesh.clear();
        assert!(mesh.project(Vec3::new(1.0, 0.0, 1.0), 5.0).is_none());
    }

    #[test]
    fn test_rect_cut_keeps_largest_side() {
        let r = Rect { min_x: 0.0, max_x: 4.0, min_z: 0.0, max_z: 4.0 };
        let hole = Rect { min_x: 3.0, max_x: 5.0, min_z: -1.0, max_z: 5.0 };
        let cut = r.cut(&hole);
        assert_eq!(cut, Rect { min_x: 0.0, max_x: 3.0, min_z: 0.0, max_z: 4.0 });
        let covering = Rect { min_x: -1.0, max_x: 5.0, min_z: -1.0, max_z: 5.0 };
        assert!(r.cut(&covering).is_empty());
    }
}
