//! Triangle sampling and projection helpers for navigable surfaces.

use serde::{Deserialize, Serialize};

use crate::spatial::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    pub fn area(&self) -> f32 {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let cross = Vec3::new(
            ab.y * ac.z - ab.z * ac.y,
            ab.z * ac.x - ab.x * ac.z,
            ab.x * ac.y - ab.y * ac.x,
        );
        cross.length() * 0.5
    }

    /// Point inside the triangle from two uniform samples `u, v ∈ [0, 1)`.
    ///
    /// `r1 = √u` spreads samples evenly instead of clustering them at `a`:
    /// `P = (1 − r1)·A + r1·(1 − r2)·B + r1·r2·C`.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let r1 = u.clamp(0.0, 1.0).sqrt();
        let r2 = v.clamp(0.0, 1.0);
        self.a * (1.0 - r1) + self.b * (r1 * (1.0 - r2)) + self.c * (r1 * r2)
    }

    /// Closest point on the triangle (surface or edge) to `p`.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let t = d1 / (d1 - d3);
            return a + ab * t;
        }

        let cp = p - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let t = d2 / (d2 - d6);
            return a + ac * t;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * t;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }
}

/// Closest point over a set of triangles, within `max_distance` of `p`.
pub fn nearest_on_triangles<'a>(
    triangles: impl IntoIterator<Item = &'a Triangle>,
    p: Vec3,
    max_distance: f32,
) -> Option<Vec3> {
    let limit = max_distance * max_distance;
    triangles
        .into_iter()
        .map(|t| {
            let q = t.closest_point(p);
            (q.distance_squared(&p), q)
        })
        .filter(|(d, _)| *d <= limit)
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, q)| q)
}
