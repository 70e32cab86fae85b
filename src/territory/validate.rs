use std::fmt;

use ahash::AHashSet;

use crate::types::{MunCode, UnitId};

use super::Territory;

/// Fatal data-integrity defects. Any of these aborts a consolidation run
/// with a diagnostic naming the offending municipality/unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityError {
    /// A municipality references a unit that does not exist.
    UnassignedMunicipality { mun: MunCode, unit: UnitId },
    /// A unit has no member flagged as its seat.
    MissingSeat { unit: UnitId },
    /// A unit has more than one member flagged as a seat.
    DuplicateSeat { unit: UnitId, first: MunCode, second: MunCode },
    /// A unit has no members left.
    EmptyUnit { unit: UnitId },
    /// The same municipality code appears twice in a geometry join.
    DuplicateMunicipality { mun: MunCode },
    /// A member municipality has no geometry in the store.
    MissingGeometry { mun: MunCode },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnassignedMunicipality { mun, unit } => {
                write!(f, "municipality {mun} is assigned to nonexistent {unit}")
            }
            Self::MissingSeat { unit } => write!(f, "{unit} has no seat"),
            Self::DuplicateSeat { unit, first, second } => {
                write!(f, "{unit} has duplicate seats: {first} and {second}")
            }
            Self::EmptyUnit { unit } => write!(f, "{unit} has no members"),
            Self::DuplicateMunicipality { mun } => {
                write!(f, "municipality {mun} appears more than once")
            }
            Self::MissingGeometry { mun } => {
                write!(f, "municipality {mun} has no geometry")
            }
        }
    }
}

impl std::error::Error for IntegrityError {}

impl Territory {
    /// Check the structural invariants of the hierarchy: every municipality
    /// resolves to an existing unit, every unit is non-empty, and every unit
    /// has exactly one seat. Returns the first defect found, in deterministic
    /// order (municipalities by code, then units by id).
    pub fn validate(&self) -> Result<(), IntegrityError> {
        for mun in self.municipalities() {
            if self.unit(mun.unit).is_none() {
                return Err(IntegrityError::UnassignedMunicipality { mun: mun.code, unit: mun.unit });
            }
        }

        for unit in self.units() {
            if unit.is_empty() {
                return Err(IntegrityError::EmptyUnit { unit: unit.id });
            }

            let mut seat: Option<MunCode> = None;
            for &code in unit.members() {
                let is_seat = self
                    .municipality(code)
                    .is_some_and(|m| m.is_seat() && m.unit() == unit.id);
                if !is_seat {
                    continue;
                }
                match seat {
                    None => seat = Some(code),
                    Some(first) => {
                        return Err(IntegrityError::DuplicateSeat { unit: unit.id, first, second: code });
                    }
                }
            }

            if seat.is_none() {
                return Err(IntegrityError::MissingSeat { unit: unit.id });
            }
        }

        // Membership lists and per-municipality assignments must agree.
        let mut seen = AHashSet::new();
        for unit in self.units() {
            for &code in unit.members() {
                if !seen.insert(code) {
                    return Err(IntegrityError::DuplicateMunicipality { mun: code });
                }
            }
        }

        Ok(())
    }
}
