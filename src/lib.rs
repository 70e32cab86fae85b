#![doc = "Consolida public API: territorial planning unit consolidation"]
mod consolidate;
mod flow;
mod geometry;
mod graph;
mod pipeline;
mod territory;
mod types;

#[doc(inline)]
pub use types::{MunCode, UnitId};

#[doc(inline)]
pub use territory::{
    IntegrityError, MunAttributes, Municipality, SNAPSHOT_VERSION, Snapshot, SnapshotNode,
    Territory, Unit,
};

#[doc(inline)]
pub use geometry::{
    ADJACENCY_TOLERANCE_M, DissolvedUnits, FragmentationWarning, GeometryStore, MetricStore,
    UnitGeometry, adjacent_pairs, dissolve_units,
};

#[doc(inline)]
pub use graph::{Coloring, UnitAdjacency, color_units};

#[doc(inline)]
pub use flow::{
    FlowProfile, FlowRecord, FlowTable, RankedFlow, TRAVEL_TIME_CEILING_H, TravelTimes,
};

#[doc(inline)]
pub use consolidate::{
    ConsolidationLog, Decision, DecisionDetail, DependencyAlert, LogEntry, MIN_FLOW_SHARE,
    PassKind, PassReport, ReasonCode, SEAT_SCORE_MAX, SeatMetrics, WORST_REGIC_RANK,
    analyze_seats, consolidate_seats, dependency_alerts, regic_rank, seat_score,
    validate_borders,
};

#[doc(inline)]
pub use pipeline::{FixedPointOutcome, PassOutcome, Pipeline};
