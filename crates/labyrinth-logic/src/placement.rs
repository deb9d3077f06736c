//! Decoration placement policy: evaluation order, spacing, rotations and
//! fallback offsets. Pure helpers; the engine owns the geometry.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::CellCoord;

/// Rotation candidates tried per offset when a cell has walls.
pub const ROTATION_CANDIDATES: usize = 8;
/// Spacing between rotation candidates, in degrees.
pub const ROTATION_STEP_DEGREES: u32 = 45;
/// Fixed fallback offsets tried after the random one fails.
pub const FALLBACK_OFFSETS: usize = 4;

/// Catalog evaluation order for one cell: index 0 first, the rest shuffled.
pub fn evaluation_order(len: usize, rng: &mut impl Rng) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..len).collect();
    order[1..].shuffle(rng);
    order
}

/// Round an angle (degrees) to the next odd whole degree in `0..360`.
pub fn snap_to_odd(angle: u32) -> u32 {
    let a = angle % 360;
    if a % 2 == 0 {
        (a + 1) % 360
    } else {
        a
    }
}

/// Uniformly random odd angle in `1..=359`.
pub fn random_odd_angle(rng: &mut impl Rng) -> f32 {
    (rng.gen_range(0..180u32) * 2 + 1) as f32
}

/// Eight odd angles spaced ~45° apart, starting from a random odd angle.
pub fn candidate_rotations(rng: &mut impl Rng) -> [f32; ROTATION_CANDIDATES] {
    let base = rng.gen_range(0..360u32);
    let mut out = [0.0; ROTATION_CANDIDATES];
    for (k, slot) in out.iter_mut().enumerate() {
        *slot = snap_to_odd(base + k as u32 * ROTATION_STEP_DEGREES) as f32;
    }
    out
}

/// Center of the cell nudged along each cardinal axis, as (dx, dz).
pub fn fallback_offsets(nudge: f32) -> [(f32, f32); FALLBACK_OFFSETS] {
    [(nudge, 0.0), (-nudge, 0.0), (0.0, nudge), (0.0, -nudge)]
}

/// Uniform offset in `[-half_range, half_range]²`. A non-positive range
/// collapses to the cell center.
pub fn random_offset(half_range: f32, rng: &mut impl Rng) -> (f32, f32) {
    if half_range <= 0.0 {
        return (0.0, 0.0);
    }
    (
        rng.gen_range(-half_range..=half_range),
        rng.gen_range(-half_range..=half_range),
    )
}

/// Would a new placement at `cell` sit closer than `min_spacing` to any
/// earlier placement of the same type?
pub fn violates_spacing(history: &[CellCoord], cell: CellCoord, min_spacing: f32) -> bool {
    if min_spacing <= 0.0 {
        return false;
    }
    history.iter().any(|prev| prev.distance(&cell) < min_spacing)
}

/// A cell with walls is skipped when it cannot keep `clearance` from
/// opposite walls.
pub fn cell_too_small(cell_width: f32, clearance: f32) -> bool {
    cell_width <= clearance * 2.0
}
