use geo::Point;
use serde::{Deserialize, Serialize};

use crate::types::{MunCode, UnitId};

/// Attribute bag resolved by the ingestion collaborator.
///
/// Optional string fields keep the raw classification labels; empty or
/// whitespace-only values are normalized to `None` at construction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MunAttributes {
    pub population: u64,
    /// ICAO code of the commercial airport, if the municipality has one.
    pub airport_icao: Option<String>,
    /// Tourism classification label (e.g. "1 - Município Turístico").
    pub tourism: Option<String>,
    /// REGIC hierarchy label (e.g. "Capital Regional A").
    pub regic: Option<String>,
    /// Metropolitan-region grouping label; `None` when outside any grouping.
    pub metro_region: Option<String>,
}

impl MunAttributes {
    pub fn has_airport(&self) -> bool {
        self.airport_icao.as_deref().is_some_and(|icao| !icao.trim().is_empty())
    }

    /// Drop empty/whitespace-only labels so downstream rules only see real values.
    pub(crate) fn normalize(mut self) -> Self {
        let clean = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        self.airport_icao = clean(self.airport_icao);
        self.tourism = clean(self.tourism);
        self.regic = clean(self.regic);
        self.metro_region = clean(self.metro_region);
        self
    }
}

/// A municipality: the leaf node of the territorial hierarchy.
///
/// `code`, `name`, `uf` and `centroid` are immutable; only the unit
/// assignment and the seat flag change during consolidation.
#[derive(Clone, Debug)]
pub struct Municipality {
    pub code: MunCode,
    pub name: String,
    pub uf: String,
    pub centroid: Option<Point<f64>>, // lon/lat
    pub attrs: MunAttributes,
    pub(crate) unit: UnitId,
    pub(crate) is_seat: bool,
}

impl Municipality {
    pub fn new(
        code: MunCode,
        name: impl Into<String>,
        uf: impl Into<String>,
        unit: UnitId,
        is_seat: bool,
        attrs: MunAttributes,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            uf: uf.into(),
            centroid: None,
            attrs: attrs.normalize(),
            unit,
            is_seat,
        }
    }

    pub fn with_centroid(mut self, centroid: Point<f64>) -> Self {
        self.centroid = Some(centroid);
        self
    }

    /// The unit this municipality currently belongs to.
    #[inline] pub fn unit(&self) -> UnitId { self.unit }

    /// Whether this municipality is the seat of its unit.
    #[inline] pub fn is_seat(&self) -> bool { self.is_seat }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_blank_labels() {
        let attrs = MunAttributes {
            population: 1000,
            airport_icao: Some("  ".into()),
            tourism: Some(String::new()),
            regic: Some("Centro Local".into()),
            metro_region: None,
        }
        .normalize();

        assert_eq!(attrs.airport_icao, None);
        assert_eq!(attrs.tourism, None);
        assert_eq!(attrs.regic.as_deref(), Some("Centro Local"));
        assert!(!attrs.has_airport());
    }

    #[test]
    fn airport_presence_requires_nonempty_icao() {
        let mut attrs = MunAttributes::default();
        assert!(!attrs.has_airport());

        attrs.airport_icao = Some("SBSP".into());
        assert!(attrs.has_airport());
    }
}
