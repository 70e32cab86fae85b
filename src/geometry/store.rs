use ahash::AHashMap;
use anyhow::Result;
use geo::{BoundingRect, MultiPolygon, Rect};

use crate::territory::IntegrityError;
use crate::types::MunCode;

use super::proj::reproject_to_metric;

/// Read-only store of per-municipality geometries in a geographic (lon/lat)
/// coordinate reference, as delivered by the ingestion collaborator.
///
/// Codes are kept sorted so iteration order is reproducible.
#[derive(Clone, Debug)]
pub struct GeometryStore {
    codes: Vec<MunCode>,
    shapes: Vec<MultiPolygon<f64>>,
    index: AHashMap<MunCode, usize>,
}

impl GeometryStore {
    /// Build a store from (code, shape) pairs. A repeated code is a fatal
    /// data-integrity error (a broken geometry join upstream).
    pub fn from_shapes(
        shapes: impl IntoIterator<Item = (MunCode, MultiPolygon<f64>)>,
    ) -> Result<Self, IntegrityError> {
        let mut pairs: Vec<(MunCode, MultiPolygon<f64>)> = shapes.into_iter().collect();
        pairs.sort_by_key(|(code, _)| *code);

        let mut store = Self {
            codes: Vec::with_capacity(pairs.len()),
            shapes: Vec::with_capacity(pairs.len()),
            index: AHashMap::with_capacity(pairs.len()),
        };
        for (code, shape) in pairs {
            if store.index.insert(code, store.codes.len()).is_some() {
                return Err(IntegrityError::DuplicateMunicipality { mun: code });
            }
            store.codes.push(code);
            store.shapes.push(shape);
        }

        Ok(store)
    }

    #[inline] pub fn len(&self) -> usize { self.codes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.codes.is_empty() }

    pub fn get(&self, code: MunCode) -> Option<&MultiPolygon<f64>> {
        self.index.get(&code).map(|&i| &self.shapes[i])
    }

    /// Bounding box over all shapes (lon/lat), used to pick the metric CRS.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes
            .iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    geo::Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    geo::Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }

    /// Reproject every shape to a planar metric CRS (UTM zone chosen from the
    /// dataset's bounding-box center). Done once per run; all adjacency
    /// buffering and distance tests operate on the result.
    pub fn to_metric(&self) -> Result<MetricStore> {
        let shapes = reproject_to_metric(&self.shapes, self.bounds())?;
        Ok(MetricStore { codes: self.codes.clone(), shapes, index: self.index.clone() })
    }
}

/// The same store after reprojection to a planar metric CRS (meters).
#[derive(Clone, Debug)]
pub struct MetricStore {
    codes: Vec<MunCode>,
    shapes: Vec<MultiPolygon<f64>>,
    index: AHashMap<MunCode, usize>,
}

impl MetricStore {
    #[inline] pub fn len(&self) -> usize { self.codes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.codes.is_empty() }

    pub fn get(&self, code: MunCode) -> Option<&MultiPolygon<f64>> {
        self.index.get(&code).map(|&i| &self.shapes[i])
    }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
            (x: x0, y: y0),
        ]])
    }

    #[test]
    fn duplicate_code_is_a_fatal_join_error() {
        let result = GeometryStore::from_shapes(vec![
            (MunCode(1), square(0.0, 0.0, 1.0)),
            (MunCode(1), square(1.0, 0.0, 1.0)),
        ]);
        assert_eq!(result.err(), Some(IntegrityError::DuplicateMunicipality { mun: MunCode(1) }));
    }

    #[test]
    fn bounds_cover_all_shapes() {
        let store = GeometryStore::from_shapes(vec![
            (MunCode(1), square(-47.0, -16.0, 0.5)),
            (MunCode(2), square(-45.0, -14.0, 0.5)),
        ])
        .unwrap();

        let bounds = store.bounds().unwrap();
        assert_eq!(bounds.min().x, -47.0);
        assert_eq!(bounds.max().y, -13.5);
    }

    #[test]
    fn metric_reprojection_preserves_relative_layout() {
        // Two squares sharing an edge stay far closer to each other than to a
        // distant third square after reprojection.
        let store = GeometryStore::from_shapes(vec![
            (MunCode(1), square(-47.00, -15.00, 0.01)),
            (MunCode(2), square(-46.99, -15.00, 0.01)),
            (MunCode(3), square(-46.50, -15.00, 0.01)),
        ])
        .unwrap();

        let metric = store.to_metric().unwrap();
        use geo::{Distance, Euclidean};
        let near = Euclidean.distance(metric.get(MunCode(1)).unwrap(), metric.get(MunCode(2)).unwrap());
        let far = Euclidean.distance(metric.get(MunCode(1)).unwrap(), metric.get(MunCode(3)).unwrap());

        assert!(near < 1.0, "shared edge should survive reprojection, got {near}");
        assert!(far > 10_000.0, "half a degree should be tens of km, got {far}");
    }
}
