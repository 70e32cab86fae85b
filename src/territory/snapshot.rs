use std::collections::BTreeMap;

use anyhow::{Context, Result, ensure};
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::types::{MunCode, UnitId};

use super::{MunAttributes, Municipality, Territory};

/// Bumped whenever the snapshot schema changes shape.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One node of the hierarchy as captured in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotNode {
    /// Metropolitan-region grouping and the units currently inside it.
    Region { label: String, units: Vec<UnitId> },
    /// A unit with its seat and ordered membership.
    Unit { id: UnitId, seat: MunCode, members: Vec<MunCode> },
    /// A municipality with everything needed to rebuild it.
    Municipality {
        code: MunCode,
        name: String,
        uf: String,
        centroid: Option<(f64, f64)>,
        attrs: MunAttributes,
        unit: UnitId,
        is_seat: bool,
    },
}

/// A versioned, self-contained capture of the hierarchy between passes.
///
/// Snapshots exist so any pipeline step can be resumed or independently
/// audited: they carry the full node set (typed region/unit/municipality
/// records), the unit→seat mapping, and the current coloring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// Label of the pipeline step that produced this snapshot.
    pub step: String,
    pub nodes: Vec<SnapshotNode>,
    pub seats: BTreeMap<UnitId, MunCode>,
    pub coloring: BTreeMap<MunCode, u16>,
}

impl Snapshot {
    /// Capture the current hierarchy. Node order is deterministic: regions by
    /// label, then units by id, then municipalities by code.
    pub fn capture(
        territory: &Territory,
        step: impl Into<String>,
        coloring: &BTreeMap<MunCode, u16>,
    ) -> Self {
        let mut regions: BTreeMap<String, Vec<UnitId>> = BTreeMap::new();
        for unit in territory.units() {
            if let Some(label) = territory.metro_region_of_unit(unit.id) {
                regions.entry(label.to_owned()).or_default().push(unit.id);
            }
        }

        let mut nodes = Vec::new();
        nodes.extend(
            regions
                .into_iter()
                .map(|(label, units)| SnapshotNode::Region { label, units }),
        );
        nodes.extend(territory.units().filter_map(|unit| {
            let seat = unit.seat()?;
            Some(SnapshotNode::Unit { id: unit.id, seat, members: unit.members().to_vec() })
        }));
        nodes.extend(territory.municipalities().map(|mun| SnapshotNode::Municipality {
            code: mun.code,
            name: mun.name.clone(),
            uf: mun.uf.clone(),
            centroid: mun.centroid.map(|p| (p.x(), p.y())),
            attrs: mun.attrs.clone(),
            unit: mun.unit(),
            is_seat: mun.is_seat(),
        }));

        let seats = territory
            .units()
            .filter_map(|unit| unit.seat().map(|seat| (unit.id, seat)))
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            step: step.into(),
            nodes,
            seats,
            coloring: coloring.clone(),
        }
    }

    /// Rebuild a territory from the captured municipality nodes.
    pub fn restore(&self) -> Result<Territory> {
        ensure!(
            self.version == SNAPSHOT_VERSION,
            "unsupported snapshot version {} (expected {})",
            self.version,
            SNAPSHOT_VERSION,
        );

        let mut territory = Territory::new();
        for node in &self.nodes {
            let SnapshotNode::Municipality { code, name, uf, centroid, attrs, unit, is_seat } = node
            else {
                continue;
            };
            let mut mun =
                Municipality::new(*code, name.clone(), uf.clone(), *unit, *is_seat, attrs.clone());
            if let Some((x, y)) = centroid {
                mun = mun.with_centroid(Point::new(*x, *y));
            }
            territory.insert(mun).with_context(|| format!("restoring snapshot '{}'", self.step))?;
        }
        territory.validate()?;

        Ok(territory)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing snapshot")
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("deserializing snapshot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn territory() -> Territory {
        let mut t = Territory::new();
        let attrs = |metro: Option<&str>| MunAttributes {
            population: 1000,
            metro_region: metro.map(str::to_owned),
            ..Default::default()
        };
        t.insert(
            Municipality::new(MunCode(10), "Alfa", "SP", UnitId(1), true, attrs(Some("RM Alfa")))
                .with_centroid(Point::new(-46.6, -23.5)),
        )
        .unwrap();
        t.insert(Municipality::new(MunCode(11), "Beta", "SP", UnitId(1), false, attrs(None)))
            .unwrap();
        t.insert(Municipality::new(MunCode(20), "Gama", "SP", UnitId(2), true, attrs(None)))
            .unwrap();
        t
    }

    #[test]
    fn json_round_trip_restores_the_hierarchy() {
        let t = territory();
        let coloring = BTreeMap::from([(MunCode(10), 0), (MunCode(11), 0), (MunCode(20), 1)]);
        let snapshot = Snapshot::capture(&t, "after-sede", &coloring);

        let restored = Snapshot::from_json(&snapshot.to_json().unwrap())
            .unwrap()
            .restore()
            .unwrap();

        assert_eq!(restored.num_municipalities(), 3);
        assert_eq!(restored.seat_of(UnitId(1)), Some(MunCode(10)));
        assert_eq!(restored.unit_of(MunCode(11)), Some(UnitId(1)));
        assert_eq!(
            restored.municipality(MunCode(10)).unwrap().attrs.metro_region.as_deref(),
            Some("RM Alfa")
        );
    }

    #[test]
    fn capture_records_regions_and_seats() {
        let t = territory();
        let snapshot = Snapshot::capture(&t, "initial", &BTreeMap::new());

        assert_eq!(snapshot.seats[&UnitId(1)], MunCode(10));
        assert!(snapshot.nodes.iter().any(|n| matches!(
            n,
            SnapshotNode::Region { label, units } if label == "RM Alfa" && units == &[UnitId(1)]
        )));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let t = territory();
        let mut snapshot = Snapshot::capture(&t, "initial", &BTreeMap::new());
        snapshot.version = 99;
        assert!(snapshot.restore().is_err());
    }
}
