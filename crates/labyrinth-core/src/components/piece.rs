//! Geometry piece components: kind, pose, footprint, pool state, grouping.

use hecs::Entity;
use labyrinth_logic::spatial::{OrientedBox, Vec3};
use serde::{Deserialize, Serialize};

/// Pool key. Variant ids index `lit_ceilings` / the decoration catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Floor,
    Wall,
    Pillar,
    Ceiling,
    LitCeiling(u16),
    Decoration(u16),
}

impl PieceKind {
    pub fn is_ceiling(&self) -> bool {
        matches!(self, PieceKind::Ceiling | PieceKind::LitCeiling(_))
    }

    pub fn is_structural(&self) -> bool {
        !matches!(self, PieceKind::Decoration(_))
    }

    /// Geometry that decorations must not intersect.
    pub fn is_wall_geometry(&self) -> bool {
        matches!(self, PieceKind::Wall | PieceKind::Pillar)
    }
}

/// World pose of a piece: box center and yaw around +y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub yaw_degrees: f32,
}

impl Transform {
    pub fn new(position: Vec3, yaw_degrees: f32) -> Self {
        Self {
            position,
            yaw_degrees,
        }
    }
}

/// Half-extents of the piece's collision box in its local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub half_extents: Vec3,
}

impl Footprint {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// From a full size.
    pub fn from_size(size: Vec3) -> Self {
        Self {
            half_extents: size * 0.5,
        }
    }

    pub fn to_box(&self, transform: &Transform) -> OrientedBox {
        OrientedBox::new(transform.position, self.half_extents, transform.yaw_degrees)
    }
}

/// Pool bookkeeping for a piece. A piece is active XOR inactive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pooled {
    pub kind: PieceKind,
    pub active: bool,
}

/// Prefab name the piece was instantiated from.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefab(pub String);

/// Parent group of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// A named set of pieces that can be detached from static geometry as a
/// whole (e.g. ceilings during a navigation bake).
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub attached: bool,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attached: true,
        }
    }
}
