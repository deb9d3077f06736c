//! Pure maze logic for Labyrinth.
//!
//! This crate contains everything about a maze that does not need pooled
//! geometry or a navigation backend. Functions take plain data (a grid, a
//! seeded RNG, a list of triangles) and return results, so they are
//! unit-testable and can be reused by the engine, the headless harness and
//! any renderer adapter.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`grid`] | Cells, per-side wall flags, bounds-checked grid lookups |
//! | [`topology`] | Backtracking maze generator with wall-density control |
//! | [`connectivity`] | Flood fill, reachability and shortest paths over open sides |
//! | [`pillars`] | Grid-line intersections that need a pillar |
//! | [`placement`] | Decoration ordering, spacing, rotation and offset candidates |
//! | [`sampling`] | Triangle sampling and closest-point projection |
//! | [`spatial`] | `Vec3`, bounding boxes and oriented-box overlap tests |
//! | [`validation`] | Layout checks (border walls, connectivity, spacing) |

pub mod connectivity;
pub mod grid;
pub mod pillars;
pub mod placement;
pub mod sampling;
pub mod spatial;
pub mod topology;
pub mod validation;
