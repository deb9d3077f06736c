//! Component definitions for pooled maze geometry.
//!
//! Components are pure data attached to pool entities.
//! Behavior lives in the pool, builder and placer.

mod piece;

pub use piece::*;
