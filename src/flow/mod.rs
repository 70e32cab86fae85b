use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::types::MunCode;

/// Travel-time ceiling (hours) for a flow to count as a functional link.
pub const TRAVEL_TIME_CEILING_H: f64 = 2.0;

/// One origin-destination trip count for a single transport mode.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowRecord {
    pub origin: MunCode,
    pub destination: MunCode,
    pub mode: String,
    pub trips: f64,
}

/// Travel times (hours) between municipality pairs. A missing pair means the
/// connection is unknown and is treated as beyond the ceiling.
#[derive(Clone, Debug, Default)]
pub struct TravelTimes {
    times: AHashMap<(MunCode, MunCode), f64>,
}

impl TravelTimes {
    pub fn from_rows(rows: impl IntoIterator<Item = (MunCode, MunCode, f64)>) -> Self {
        Self {
            times: rows.into_iter().map(|(o, d, h)| ((o, d), h)).collect(),
        }
    }

    pub fn get(&self, origin: MunCode, destination: MunCode) -> Option<f64> {
        self.times.get(&(origin, destination)).copied()
    }

    /// Travel time iff known and within the ceiling.
    pub fn within_ceiling(&self, origin: MunCode, destination: MunCode) -> Option<f64> {
        self.get(origin, destination).filter(|&h| h <= TRAVEL_TIME_CEILING_H)
    }
}

/// Trip counts aggregated across modes, per origin.
///
/// Destination maps are ordered by code so ranking ties resolve the same way
/// on every run.
#[derive(Clone, Debug, Default)]
pub struct FlowTable {
    by_origin: AHashMap<MunCode, BTreeMap<MunCode, f64>>,
}

impl FlowTable {
    pub fn from_records(records: &[FlowRecord]) -> Self {
        let mut by_origin: AHashMap<MunCode, BTreeMap<MunCode, f64>> = AHashMap::new();
        for record in records {
            *by_origin
                .entry(record.origin)
                .or_default()
                .entry(record.destination)
                .or_default() += record.trips;
        }
        Self { by_origin }
    }

    /// Ranked destination flows for one origin, travel-time filtered.
    ///
    /// Destinations with unknown or over-ceiling travel time are excluded
    /// before ranking, so both the ranking and the flow share are computed
    /// over reachable destinations only. Ranking is by trips descending,
    /// ties by destination code ascending.
    pub fn profile(&self, origin: MunCode, times: &TravelTimes) -> FlowProfile {
        let mut ranked: Vec<RankedFlow> = self
            .by_origin
            .get(&origin)
            .into_iter()
            .flatten()
            .filter_map(|(&destination, &trips)| {
                times.within_ceiling(origin, destination).map(|travel_time_h| RankedFlow {
                    destination,
                    trips,
                    travel_time_h,
                })
            })
            .collect();

        // BTreeMap iteration is code-ascending, so a stable sort on trips
        // keeps the tie order deterministic.
        ranked.sort_by(|a, b| b.trips.total_cmp(&a.trips));
        let total_trips = ranked.iter().map(|f| f.trips).sum();

        FlowProfile { origin, total_trips, ranked }
    }
}

/// One destination in a ranked flow profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankedFlow {
    pub destination: MunCode,
    pub trips: f64,
    pub travel_time_h: f64,
}

/// Aggregated, filtered, ranked flows out of one origin municipality.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowProfile {
    pub origin: MunCode,
    /// Total trips to reachable destinations (post travel-time filter).
    pub total_trips: f64,
    /// Destinations by trips descending, ties by code ascending.
    pub ranked: Vec<RankedFlow>,
}

impl FlowProfile {
    /// The dominant destination, if any flow survived the filter.
    pub fn principal(&self) -> Option<&RankedFlow> {
        self.ranked.first()
    }

    /// Share of trips going to the principal destination; 0 when no flows
    /// remain.
    pub fn share(&self) -> f64 {
        match self.principal() {
            Some(principal) if self.total_trips > 0.0 => principal.trips / self.total_trips,
            _ => 0.0,
        }
    }
}
