mod analyzer;
mod border;
mod consolidator;
mod log;
mod regic;
mod score;

use anyhow::Result;

use crate::geometry::{FragmentationWarning, MetricStore, dissolve_units};
use crate::graph::{Coloring, UnitAdjacency, color_units};
use crate::territory::Territory;

pub use analyzer::{DependencyAlert, SeatMetrics, analyze_seats, dependency_alerts};
pub use border::validate_borders;
pub use consolidator::consolidate_seats;
pub use log::{ConsolidationLog, Decision, DecisionDetail, LogEntry, PassKind, ReasonCode};
pub use regic::{WORST_REGIC_RANK, regic_rank};
pub use score::{SEAT_SCORE_MAX, seat_score};

/// Minimum share of an origin's reachable trips that the principal
/// destination must capture before a dependency is acted on (inclusive).
pub const MIN_FLOW_SHARE: f64 = 0.05;

/// Outcome of one consolidation or border-validation pass, carrying the
/// final geometry-derived state so callers never see a stale coloring.
#[derive(Clone, Debug)]
pub struct PassReport {
    pub pass: PassKind,
    /// Applied merges (sede pass) or relocations (border pass).
    pub changes: usize,
    pub rejections: usize,
    /// The alert set the pass decided on; empty for border passes.
    pub alerts: Vec<DependencyAlert>,
    pub adjacency: UnitAdjacency,
    pub coloring: Coloring,
    /// Fragmentation warnings for the final hierarchy state.
    pub warnings: Vec<FragmentationWarning>,
}

/// Geometry-derived state, rebuilt after every applied mutation so each
/// subsequent decision in a pass sees the current adjacency and coloring.
pub(crate) struct GeoState {
    pub adjacency: UnitAdjacency,
    pub coloring: Coloring,
    pub warnings: Vec<FragmentationWarning>,
}

pub(crate) fn rebuild_geometry(territory: &Territory, metric: &MetricStore) -> Result<GeoState> {
    let (dissolved, warnings) = dissolve_units(territory, metric)?;
    let adjacency = UnitAdjacency::build(&dissolved);
    let coloring = color_units(&adjacency);
    Ok(GeoState { adjacency, coloring, warnings })
}
