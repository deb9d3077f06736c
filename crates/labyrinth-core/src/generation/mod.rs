//! Generation - turning a cell grid into pooled geometry and decorations.

mod builder;
mod decoration;

pub use builder::*;
pub use decoration::*;
