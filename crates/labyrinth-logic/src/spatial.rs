//! Spatial primitives: vectors, boxes and overlap tests.
//!
//! World axes: x runs along columns, z along rows, y is up. Orientation is a
//! yaw in degrees around +y.

use serde::{Deserialize, Serialize};

/// 3D position vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn depth(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Grow every side by `amount`.
    pub fn expanded(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// Overlap of the x/z footprints only.
    pub fn overlaps_xz(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.z < other.max.z
            && other.min.z < self.max.z
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }
}

/// Box with a yaw rotation, described by center and half-extents in its
/// local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub yaw_degrees: f32,
}

impl OrientedBox {
    pub fn new(center: Vec3, half_extents: Vec3, yaw_degrees: f32) -> Self {
        Self {
            center,
            half_extents,
            yaw_degrees,
        }
    }

    /// Local x and z axes projected to the ground plane, as (x, z) pairs.
    fn axes(&self) -> [(f32, f32); 2] {
        let (sin, cos) = self.yaw_degrees.to_radians().sin_cos();
        [(cos, sin), (-sin, cos)]
    }

    /// Half-length of this box projected onto a ground-plane axis.
    fn projected_radius(&self, axis: (f32, f32)) -> f32 {
        let [ux, uz] = self.axes();
        self.half_extents.x * (ux.0 * axis.0 + ux.1 * axis.1).abs()
            + self.half_extents.z * (uz.0 * axis.0 + uz.1 * axis.1).abs()
    }

    /// World-space bounds enclosing the rotated box.
    pub fn aabb(&self) -> BoundingBox {
        let rx = self.projected_radius((1.0, 0.0));
        let rz = self.projected_radius((0.0, 1.0));
        BoundingBox::from_center(self.center, Vec3::new(rx, self.half_extents.y, rz))
    }

    /// Separating-axis overlap test: vertical interval plus the four ground
    /// axes of both boxes. Touching boxes do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        let dy = (self.center.y - other.center.y).abs();
        if dy >= self.half_extents.y + other.half_extents.y {
            return false;
        }
        let d = (other.center.x - self.center.x, other.center.z - self.center.z);
        for axis in self.axes().into_iter().chain(other.axes()) {
            let dist = (d.0 * axis.0 + d.1 * axis.1).abs();
            if dist >= self.projected_radius(axis) + other.projected_radius(axis) {
                return false;
            }
        }
        true
    }
}
