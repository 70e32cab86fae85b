use ahash::AHashMap;
use geo::{BooleanOps, MultiPolygon};

use crate::territory::{IntegrityError, Territory};
use crate::types::UnitId;

use super::MetricStore;

/// Dissolved (unioned) metric geometry of one unit.
#[derive(Clone, Debug)]
pub struct UnitGeometry {
    pub unit: UnitId,
    pub shape: MultiPolygon<f64>,
}

/// A unit whose dissolved geometry fell apart into multiple disjoint parts.
///
/// Fragmentation is not fatal: the unit stays a single graph node for
/// coloring and consolidation. Callers may use the warning to drive a later
/// split decision; this engine never auto-splits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentationWarning {
    pub unit: UnitId,
    pub parts: usize,
}

/// Per-unit dissolved geometries, sorted by unit id.
#[derive(Clone, Debug, Default)]
pub struct DissolvedUnits {
    geoms: Vec<UnitGeometry>,
    index: AHashMap<UnitId, usize>,
}

impl DissolvedUnits {
    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// Unit ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.geoms.iter().map(|g| g.unit)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitGeometry> {
        self.geoms.iter()
    }

    pub fn get(&self, unit: UnitId) -> Option<&MultiPolygon<f64>> {
        self.index.get(&unit).map(|&i| &self.geoms[i].shape)
    }

    pub(crate) fn at(&self, i: usize) -> &UnitGeometry {
        &self.geoms[i]
    }
}

/// Union every unit's member shapes into one dissolved geometry.
///
/// A member with no shape in the store is a fatal join error. Multi-part
/// results are collected as [`FragmentationWarning`]s.
pub fn dissolve_units(
    territory: &Territory,
    metric: &MetricStore,
) -> Result<(DissolvedUnits, Vec<FragmentationWarning>), IntegrityError> {
    let mut geoms = Vec::with_capacity(territory.num_units());
    let mut index = AHashMap::with_capacity(territory.num_units());
    let mut warnings = Vec::new();

    for unit in territory.units() {
        let mut members = unit.members().iter();
        let first = members.next().ok_or(IntegrityError::EmptyUnit { unit: unit.id })?;
        let mut shape = metric
            .get(*first)
            .ok_or(IntegrityError::MissingGeometry { mun: *first })?
            .clone();

        // Pairwise fold; member counts are small enough that a cascaded
        // union is not worth the bookkeeping.
        for code in members {
            let next = metric
                .get(*code)
                .ok_or(IntegrityError::MissingGeometry { mun: *code })?;
            shape = shape.union(next);
        }

        if shape.0.len() > 1 {
            warnings.push(FragmentationWarning { unit: unit.id, parts: shape.0.len() });
        }

        index.insert(unit.id, geoms.len());
        geoms.push(UnitGeometry { unit: unit.id, shape });
    }

    Ok((DissolvedUnits { geoms, index }, warnings))
}
