//! Geometry pool - active/inactive piece recycling over an ECS world.
//!
//! Every piece ever created stays in the world for the life of the pool.
//! Releasing a piece only flips it inactive and pushes it onto the free
//! list for its kind; the next `acquire` of that kind reuses it. The world
//! therefore only grows, and only up to the peak number of pieces of each
//! kind that were active at the same time.

use std::collections::HashMap;

use hecs::{Entity, World};
use labyrinth_logic::spatial::{BoundingBox, OrientedBox};
use serde::Serialize;

use crate::components::*;

/// Opaque handle to a pooled piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceHandle(Entity);

/// Opaque handle to a piece group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupHandle(Entity);

/// Collision boxes captured from the pool, each with its ground-plane
/// bounds for a cheap rejection pass.
#[derive(Debug, Clone, Default)]
pub struct CollisionSet {
    boxes: Vec<(BoundingBox, OrientedBox)>,
}

impl CollisionSet {
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Does `query` intersect any captured box?
    pub fn overlaps(&self, query: &OrientedBox) -> bool {
        let bounds = query.aabb();
        self.boxes
            .iter()
            .filter(|(aabb, _)| aabb.overlaps_xz(&bounds))
            .any(|(_, b)| b.overlaps(query))
    }
}

/// Per-kind counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Pieces ever spawned.
    pub created: usize,
    /// Pieces currently active.
    pub active: usize,
    /// Highest `active` seen.
    pub peak_active: usize,
}

/// Read-only snapshot of an active piece, for renderer adapters.
#[derive(Debug, Clone)]
pub struct PieceView {
    pub handle: PieceHandle,
    pub kind: PieceKind,
    pub prefab: String,
    pub transform: Transform,
    pub footprint: Footprint,
    pub group: Option<GroupHandle>,
}

/// Pool of geometry pieces keyed by `PieceKind`.
pub struct GeometryPool {
    world: World,
    inactive: HashMap<PieceKind, Vec<Entity>>,
    stats: HashMap<PieceKind, PoolStats>,
}

impl GeometryPool {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            inactive: HashMap::new(),
            stats: HashMap::new(),
        }
    }

    /// Create a piece group. Groups start attached.
    pub fn create_group(&mut self, name: &str) -> GroupHandle {
        GroupHandle(self.world.spawn((Group::new(name),)))
    }

    pub fn set_group_attached(&mut self, group: GroupHandle, attached: bool) {
        if let Ok(mut g) = self.world.get::<&mut Group>(group.0) {
            g.attached = attached;
        }
    }

    pub fn is_group_attached(&self, group: GroupHandle) -> bool {
        self.world
            .get::<&Group>(group.0)
            .map(|g| g.attached)
            .unwrap_or(false)
    }

    /// Reactivate an inactive piece of `kind` at the new pose, or spawn one.
    pub fn acquire(
        &mut self,
        kind: PieceKind,
        prefab: &str,
        transform: Transform,
        footprint: Footprint,
        parent: Option<GroupHandle>,
    ) -> PieceHandle {
        let recycled = self.inactive.get_mut(&kind).and_then(|free| free.pop());

        let entity = match recycled {
            Some(entity) => {
                if let Ok(mut pooled) = self.world.get::<&mut Pooled>(entity) {
                    pooled.active = true;
                }
                if let Ok(mut t) = self.world.get::<&mut Transform>(entity) {
                    *t = transform;
                }
                if let Ok(mut f) = self.world.get::<&mut Footprint>(entity) {
                    *f = footprint;
                }
                if let Ok(mut p) = self.world.get::<&mut Prefab>(entity) {
                    if p.0 != prefab {
                        p.0 = prefab.to_string();
                    }
                }
                self.set_parent(entity, parent);
                entity
            }
            None => {
                let entity = self.world.spawn((
                    Pooled { kind, active: true },
                    transform,
                    footprint,
                    Prefab(prefab.to_string()),
                ));
                self.set_parent(entity, parent);
                self.stats.entry(kind).or_default().created += 1;
                entity
            }
        };

        let stats = self.stats.entry(kind).or_default();
        stats.active += 1;
        stats.peak_active = stats.peak_active.max(stats.active);
        PieceHandle(entity)
    }

    fn set_parent(&mut self, entity: Entity, parent: Option<GroupHandle>) {
        match parent {
            Some(group) => {
                let _ = self.world.insert_one(entity, Parent(group.0));
            }
            None => {
                let _ = self.world.remove_one::<Parent>(entity);
            }
        }
    }

    /// Deactivate a piece. Returns false if it was already inactive or
    /// unknown.
    pub fn release(&mut self, handle: PieceHandle) -> bool {
        let kind = match self.world.get::<&mut Pooled>(handle.0) {
            Ok(mut pooled) if pooled.active => {
                pooled.active = false;
                pooled.kind
            }
            _ => return false,
        };
        self.inactive.entry(kind).or_default().push(handle.0);
        if let Some(stats) = self.stats.get_mut(&kind) {
            stats.active = stats.active.saturating_sub(1);
        }
        true
    }

    /// Release every active piece whose kind matches `filter`.
    pub fn release_where(&mut self, filter: impl Fn(PieceKind) -> bool) -> usize {
        let handles: Vec<PieceHandle> = self
            .world
            .query::<&Pooled>()
            .iter()
            .filter(|(_, p)| p.active && filter(p.kind))
            .map(|(e, _)| PieceHandle(e))
            .collect();
        handles.into_iter().filter(|h| self.release(*h)).count()
    }

    pub fn release_all(&mut self) -> usize {
        self.release_where(|_| true)
    }

    pub fn is_active(&self, handle: PieceHandle) -> bool {
        self.world
            .get::<&Pooled>(handle.0)
            .map(|p| p.active)
            .unwrap_or(false)
    }

    pub fn kind(&self, handle: PieceHandle) -> Option<PieceKind> {
        self.world.get::<&Pooled>(handle.0).ok().map(|p| p.kind)
    }

    pub fn transform(&self, handle: PieceHandle) -> Option<Transform> {
        self.world.get::<&Transform>(handle.0).ok().map(|t| *t)
    }

    fn is_entity_attached(&self, parent: Option<&Parent>) -> bool {
        match parent {
            Some(Parent(group)) => self.is_group_attached(GroupHandle(*group)),
            None => true,
        }
    }

    /// Collision boxes of active, attached pieces matching `filter`.
    pub fn active_boxes(&self, filter: impl Fn(PieceKind) -> bool) -> Vec<(PieceKind, OrientedBox)> {
        let mut query = self
            .world
            .query::<(&Pooled, &Transform, &Footprint, Option<&Parent>)>();
        let boxes = query
            .iter()
            .filter(|(_, (p, _, _, parent))| {
                p.active && filter(p.kind) && self.is_entity_attached(*parent)
            })
            .map(|(_, (p, t, f, _))| (p.kind, f.to_box(t)))
            .collect();
        boxes
    }

    /// Snapshot of the active, attached pieces matching `filter`, for
    /// repeated overlap queries against geometry that does not move.
    pub fn collision_set(&self, filter: impl Fn(PieceKind) -> bool) -> CollisionSet {
        CollisionSet {
            boxes: self
                .active_boxes(filter)
                .into_iter()
                .map(|(_, b)| (b.aabb(), b))
                .collect(),
        }
    }

    /// Views of all active pieces, sorted by kind.
    pub fn pieces(&self) -> Vec<PieceView> {
        let mut query = self
            .world
            .query::<(&Pooled, &Transform, &Footprint, &Prefab, Option<&Parent>)>();
        let mut out: Vec<PieceView> = query
            .iter()
            .filter(|(_, (p, ..))| p.active)
            .map(|(e, (p, t, f, prefab, parent))| PieceView {
                handle: PieceHandle(e),
                kind: p.kind,
                prefab: prefab.0.clone(),
                transform: *t,
                footprint: *f,
                group: parent.map(|Parent(g)| GroupHandle(*g)),
            })
            .collect();
        out.sort_by_key(|v| v.kind);
        out
    }

    pub fn stats(&self, kind: PieceKind) -> PoolStats {
        self.stats.get(&kind).copied().unwrap_or_default()
    }

    pub fn all_stats(&self) -> Vec<(PieceKind, PoolStats)> {
        let mut out: Vec<_> = self.stats.iter().map(|(k, s)| (*k, *s)).collect();
        out.sort_by_key(|(k, _)| *k);
        out
    }

    /// Pieces ever spawned, all kinds.
    pub fn total_created(&self) -> usize {
        self.stats.values().map(|s| s.created).sum()
    }

    pub fn active_count(&self) -> usize {
        self.stats.values().map(|s| s.active).sum()
    }

    pub fn count_active(&self, kind: PieceKind) -> usize {
        self.stats(kind).active
    }
}

impl Default for GeometryPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_logic::spatial::Vec3;

    fn wall_at(x: f32) -> (Transform, Footprint) {
        (
            Transform::new(Vec3::new(x, 1.5, 0.0), 0.0),
            Footprint::new(Vec3::new(2.0, 1.5, 0.1)),
        )
    }

    #[test]
    fn test_acquire_creates_then_recycles() {
        let mut pool = GeometryPool::new();
        let (t, f) = wall_at(0.0);
        let a = pool.acquire(PieceKind::Wall, "wall", t, f, None);
        assert_eq!(pool.stats(PieceKind::Wall).created, 1);
        assert!(pool.release(a));
        assert!(!pool.is_active(a));

        let (t2, f2) = wall_at(5.0);
        let b = pool.acquire(PieceKind::Wall, "wall", t2, f2, None);
        assert_eq!(a, b);
        assert_eq!(pool.stats(PieceKind::Wall).created, 1);
        assert_eq!(pool.transform(b).unwrap().position.x, 5.0);
    }

    #[test]
    fn test_kinds_do_not_share_free_lists() {
        let mut pool = GeometryPool::new();
        let (t, f) = wall_at(0.0);
        let w = pool.acquire(PieceKind::Wall, "wall", t, f, None);
        pool.release(w);
        let p = pool.acquire(PieceKind::Pillar, "pillar", t, f, None);
        assert_ne!(w, p);
        assert_eq!(pool.total_created(), 2);
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut pool = GeometryPool::new();
        let (t, f) = wall_at(0.0);
        let h = pool.acquire(PieceKind::Floor, "floor", t, f, None);
        assert!(pool.release(h));
        assert!(!pool.release(h));
        assert_eq!(pool.stats(PieceKind::Floor).active, 0);
        // A second release must not put the piece on the free list twice
        let a = pool.acquire(PieceKind::Floor, "floor", t, f, None);
        let b = pool.acquire(PieceKind::Floor, "floor", t, f, None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_peak_bounds_created() {
        let mut pool = GeometryPool::new();
        let (t, f) = wall_at(0.0);
        for round in 0..5 {
            let n = if round % 2 == 0 { 10 } else { 4 };
            for _ in 0..n {
                pool.acquire(PieceKind::Wall, "wall", t, f, None);
            }
            pool.release_all();
        }
        let stats = pool.stats(PieceKind::Wall);
        assert_eq!(stats.peak_active, 10);
        assert_eq!(stats.created, 10);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn test_overlap_query() {
        let mut pool = GeometryPool::new();
        let (t, f) = wall_at(0.0);
        let h = pool.acquire(PieceKind::Wall, "wall", t, f, None);
        let query_box = OrientedBox::new(Vec3::new(0.0, 0.5, 0.3), Vec3::splat(0.25), 0.0);
        let walls = pool.collision_set(|k| k.is_wall_geometry());
        assert_eq!(walls.len(), 1);
        assert!(walls.overlaps(&query_box));
        assert!(!pool.collision_set(|k| k == PieceKind::Floor).overlaps(&query_box));

        // Captured boxes outlive the pieces they came from
        pool.release(h);
        assert!(walls.overlaps(&query_box));
        assert!(pool.collision_set(|k| k.is_wall_geometry()).is_empty());
    }

    #[test]
    fn test_detached_group_hidden_from_boxes() {
        let mut pool = GeometryPool::new();
        let ceilings = pool.create_group("ceilings");
        let (t, f) = wall_at(0.0);
        pool.acquire(PieceKind::Ceiling, "ceiling", t, f, Some(ceilings));
        pool.acquire(PieceKind::Floor, "floor", t, f, None);
        assert_eq!(pool.active_boxes(|_| true).len(), 2);

        pool.set_group_attached(ceilings, false);
        let boxes = pool.active_boxes(|_| true);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].0, PieceKind::Floor);

        pool.set_group_attached(ceilings, true);
        assert!(pool.is_group_attached(ceilings));
        assert_eq!(pool.active_boxes(|_| true).len(), 2);
    }

    #[test]
    fn test_piece_views() {
        let mut pool = GeometryPool::new();
        let group = pool.create_group("walls");
        let (t, f) = wall_at(1.0);
        let h = pool.acquire(PieceKind::Wall, "wall_brick", t, f, Some(group));
        pool.acquire(PieceKind::Floor, "floor", t, f, None);
        let views = pool.pieces();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].kind, PieceKind::Floor);
        let wall = views.iter().find(|v| v.handle == h).unwrap();
        assert_eq!(wall.prefab, "wall_brick");
        assert_eq!(wall.group, Some(group));
    }
}
