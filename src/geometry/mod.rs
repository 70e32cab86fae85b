mod adjacency;
mod dissolve;
mod proj;
mod store;

pub use adjacency::{ADJACENCY_TOLERANCE_M, adjacent_pairs};
pub use dissolve::{DissolvedUnits, FragmentationWarning, UnitGeometry, dissolve_units};
pub use store::{GeometryStore, MetricStore};
