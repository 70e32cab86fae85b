mod adjacency;
mod coloring;

pub use adjacency::UnitAdjacency;
pub use coloring::{Coloring, color_units};
