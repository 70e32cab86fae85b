//! Shared fixtures: a strip of unit squares along a parallel, with
//! per-municipality attributes and origin-destination flows.
#![allow(dead_code)] // not every test binary uses every helper

use consolida::{
    FlowRecord, FlowTable, GeometryStore, MunAttributes, MunCode, Municipality, TravelTimes,
    Territory, UnitId,
};
use geo::{MultiPolygon, polygon};

pub const SIDE_DEG: f64 = 0.01; // ~1.1 km at the test latitude
pub const BASE_LON: f64 = -47.0;
pub const BASE_LAT: f64 = -15.0;

pub fn square(col: f64) -> MultiPolygon<f64> {
    let x0 = BASE_LON + col * SIDE_DEG;
    MultiPolygon::new(vec![polygon![
        (x: x0, y: BASE_LAT),
        (x: x0 + SIDE_DEG, y: BASE_LAT),
        (x: x0 + SIDE_DEG, y: BASE_LAT + SIDE_DEG),
        (x: x0, y: BASE_LAT + SIDE_DEG),
        (x: x0, y: BASE_LAT),
    ]])
}

/// One municipality of the fixture: its square sits at `col` columns east of
/// the base longitude (fractional columns leave gaps between units).
pub struct Spot {
    pub code: u32,
    pub unit: u32,
    pub is_seat: bool,
    pub col: f64,
    pub attrs: MunAttributes,
}

impl Spot {
    pub fn new(code: u32, unit: u32, is_seat: bool, col: f64) -> Self {
        Self { code, unit, is_seat, col, attrs: MunAttributes::default() }
    }

    pub fn regic(mut self, label: &str) -> Self {
        self.attrs.regic = Some(label.to_owned());
        self
    }

    pub fn airport(mut self, icao: &str) -> Self {
        self.attrs.airport_icao = Some(icao.to_owned());
        self
    }

    pub fn tourism(mut self, label: &str) -> Self {
        self.attrs.tourism = Some(label.to_owned());
        self
    }

    pub fn metro(mut self, label: &str) -> Self {
        self.attrs.metro_region = Some(label.to_owned());
        self
    }
}

pub struct Fixture {
    pub territory: Territory,
    pub store: GeometryStore,
    flows: Vec<FlowRecord>,
    times: Vec<(MunCode, MunCode, f64)>,
}

impl Fixture {
    pub fn new(spots: Vec<Spot>) -> Self {
        let mut territory = Territory::new();
        let mut shapes = Vec::new();
        for spot in &spots {
            territory
                .insert(Municipality::new(
                    MunCode(spot.code),
                    format!("M{}", spot.code),
                    "XX",
                    UnitId(spot.unit),
                    spot.is_seat,
                    spot.attrs.clone(),
                ))
                .expect("fixture municipality");
            shapes.push((MunCode(spot.code), square(spot.col)));
        }

        Self {
            territory,
            store: GeometryStore::from_shapes(shapes).expect("fixture geometry"),
            flows: Vec::new(),
            times: Vec::new(),
        }
    }

    /// Record a flow and its travel time in one go.
    pub fn flow(mut self, origin: u32, destination: u32, trips: f64, hours: f64) -> Self {
        self.flows.push(FlowRecord {
            origin: MunCode(origin),
            destination: MunCode(destination),
            mode: "road".into(),
            trips,
        });
        self.times.push((MunCode(origin), MunCode(destination), hours));
        self
    }

    /// Record a flow with no travel-time entry (an unknown connection).
    pub fn flow_without_time(mut self, origin: u32, destination: u32, trips: f64) -> Self {
        self.flows.push(FlowRecord {
            origin: MunCode(origin),
            destination: MunCode(destination),
            mode: "road".into(),
            trips,
        });
        self
    }

    pub fn flow_table(&self) -> FlowTable {
        FlowTable::from_records(&self.flows)
    }

    pub fn travel_times(&self) -> TravelTimes {
        TravelTimes::from_rows(self.times.iter().copied())
    }
}
