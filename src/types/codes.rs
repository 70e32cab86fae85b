use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable numeric code of a municipality (IBGE-style, e.g. 3550308).
///
/// Codes are immutable for the lifetime of a run; municipalities are never
/// deleted, only reassigned between units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MunCode(pub u32);

impl fmt::Display for MunCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a territorial planning unit (UTP).
///
/// Units are created at load time and deleted when merged away; ids are never
/// reused within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UTP {}", self.0)
    }
}
