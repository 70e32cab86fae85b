use std::collections::BTreeMap;

use anyhow::{Result, bail, ensure};

use crate::types::{MunCode, UnitId};

use super::{IntegrityError, Municipality, Unit};

/// The territorial hierarchy: municipalities grouped into units, units
/// grouped by metropolitan-region label.
///
/// This is the single mutable source of truth for a consolidation run. All
/// cross-references are by id (`MunCode`, `UnitId`); geometry and flow tables
/// are read-only collaborators that never live inside the hierarchy.
///
/// Both maps are ordered so that every pass over the hierarchy visits nodes
/// in ascending code order, which is what makes decision logs reproducible.
#[derive(Clone, Debug, Default)]
pub struct Territory {
    municipalities: BTreeMap<MunCode, Municipality>,
    units: BTreeMap<UnitId, Unit>,
}

impl Territory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a municipality, creating its unit on first reference.
    ///
    /// Rejects duplicate codes and a second seat for the same unit up front;
    /// the remaining invariants are checked by [`Territory::validate`] once
    /// loading is complete.
    pub fn insert(&mut self, mun: Municipality) -> Result<(), IntegrityError> {
        if self.municipalities.contains_key(&mun.code) {
            return Err(IntegrityError::DuplicateMunicipality { mun: mun.code });
        }

        let unit = self.units.entry(mun.unit).or_insert_with(|| Unit::new(mun.unit));
        if mun.is_seat {
            if let Some(first) = unit.seat() {
                return Err(IntegrityError::DuplicateSeat { unit: unit.id, first, second: mun.code });
            }
            unit.set_seat(mun.code);
        }
        unit.add_member(mun.code);
        self.municipalities.insert(mun.code, mun);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    #[inline]
    pub fn municipality(&self, code: MunCode) -> Option<&Municipality> {
        self.municipalities.get(&code)
    }

    #[inline]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// All municipalities in ascending code order.
    pub fn municipalities(&self) -> impl Iterator<Item = &Municipality> {
        self.municipalities.values()
    }

    /// All units in ascending id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Sorted ids of all current units.
    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    #[inline] pub fn num_municipalities(&self) -> usize { self.municipalities.len() }

    #[inline] pub fn num_units(&self) -> usize { self.units.len() }

    /// Current unit of a municipality.
    pub fn unit_of(&self, code: MunCode) -> Option<UnitId> {
        self.municipalities.get(&code).map(|m| m.unit)
    }

    /// Seat municipality of a unit.
    pub fn seat_of(&self, unit: UnitId) -> Option<MunCode> {
        self.units.get(&unit).and_then(|u| u.seat())
    }

    /// Whether a municipality is currently the seat of its unit.
    pub fn is_seat(&self, code: MunCode) -> bool {
        self.municipalities.get(&code).is_some_and(|m| m.is_seat)
    }

    /// All seat municipalities in ascending code order.
    pub fn seats(&self) -> impl Iterator<Item = &Municipality> {
        self.municipalities.values().filter(|m| m.is_seat)
    }

    /// Metropolitan-region grouping of a unit: its seat's label.
    pub fn metro_region_of_unit(&self, unit: UnitId) -> Option<&str> {
        let seat = self.seat_of(unit)?;
        self.municipalities.get(&seat)?.attrs.metro_region.as_deref()
    }

    /// Total population over all members of a unit.
    pub fn unit_population(&self, unit: UnitId) -> u64 {
        self.units.get(&unit).map_or(0, |u| {
            u.members()
                .iter()
                .filter_map(|code| self.municipalities.get(code))
                .map(|m| m.attrs.population)
                .sum()
        })
    }

    /// Units with exactly one member.
    pub fn singleton_units(&self) -> Vec<UnitId> {
        self.units.values().filter(|u| u.len() == 1).map(|u| u.id).collect()
    }

    /// Unit membership map exposed to downstream collaborators: unit id →
    /// ordered member codes, each flagged when it is the seat.
    pub fn membership(&self) -> BTreeMap<UnitId, Vec<(MunCode, bool)>> {
        self.units
            .iter()
            .map(|(&id, unit)| {
                let members = unit
                    .members()
                    .iter()
                    .map(|&code| (code, unit.seat() == Some(code)))
                    .collect();
                (id, members)
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Relocate a non-seat municipality to another unit.
    ///
    /// Seats are never relocated; merging is the only operation that moves a
    /// seat, and it demotes the seat in the process.
    pub fn move_municipality(&mut self, code: MunCode, target: UnitId) -> Result<()> {
        let Some(mun) = self.municipalities.get(&code) else {
            bail!("cannot move unknown municipality {code}");
        };
        ensure!(!mun.is_seat, "municipality {code} is a seat and cannot be relocated");
        let source = mun.unit;
        ensure!(source != target, "municipality {code} is already in {target}");
        ensure!(self.units.contains_key(&target), "cannot move {code} into nonexistent {target}");

        if let Some(unit) = self.units.get_mut(&source) {
            unit.remove_member(code);
        }
        if let Some(unit) = self.units.get_mut(&target) {
            unit.add_member(code);
        }
        if let Some(mun) = self.municipalities.get_mut(&code) {
            mun.unit = target;
        }

        Ok(())
    }

    /// Merge `source` into `target`: every member of `source` (its seat
    /// included) becomes an ordinary member of `target`, and `source` is
    /// deleted. The former seat keeps no special status.
    ///
    /// Returns the moved member codes in ascending order.
    pub fn merge_units(&mut self, source: UnitId, target: UnitId) -> Result<Vec<MunCode>> {
        ensure!(source != target, "cannot merge {source} into itself");
        ensure!(self.units.contains_key(&target), "merge target {target} does not exist");
        let Some(unit) = self.units.remove(&source) else {
            bail!("merge source {source} does not exist");
        };

        let moved: Vec<MunCode> = unit.members().to_vec();
        for &code in &moved {
            if let Some(mun) = self.municipalities.get_mut(&code) {
                mun.unit = target;
                mun.is_seat = false;
            }
            if let Some(target_unit) = self.units.get_mut(&target) {
                target_unit.add_member(code);
            }
        }

        Ok(moved)
    }
}
