use geo::{BoundingRect, Distance, Euclidean, Rect};
use rstar::{AABB, RTree, RTreeObject};

use crate::types::UnitId;

use super::DissolvedUnits;

/// Buffer tolerance (meters) absorbing topological slivers between units
/// that share a border in reality but not exactly in the data.
pub const ADJACENCY_TOLERANCE_M: f64 = 100.0;

#[derive(Clone, Debug)]
struct BoundingBox {
    idx: usize, // index of the corresponding UnitGeometry in DissolvedUnits
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Compute the undirected adjacency edges between dissolved unit geometries.
///
/// Two units are adjacent iff their shapes come within `tol` meters of one
/// another, which is the buffered-intersection test expressed as a distance
/// test. Candidate pairs are prefiltered with an R-tree over bounding boxes
/// expanded by `tol`; self-pairs are excluded and each pair appears once.
///
/// The result is sorted `(a, b)` with `a < b`, so identical input always
/// yields an identical edge set.
pub fn adjacent_pairs(dissolved: &DissolvedUnits, tol: f64) -> Vec<(UnitId, UnitId)> {
    let boxes: Vec<BoundingBox> = dissolved
        .iter()
        .enumerate()
        .filter_map(|(idx, g)| g.shape.bounding_rect().map(|bbox| BoundingBox { idx, bbox }))
        .collect();
    let rtree = RTree::bulk_load(boxes);

    let mut pairs = Vec::new();
    for (i, a) in dissolved.iter().enumerate() {
        let Some(rect) = a.shape.bounding_rect() else { continue };
        let search = AABB::from_corners(
            [rect.min().x - tol, rect.min().y - tol],
            [rect.max().x + tol, rect.max().y + tol],
        );

        for cand in rtree.locate_in_envelope_intersecting(&search) {
            let j = cand.idx;
            if j <= i {
                continue;
            }

            let b = dissolved.at(j);
            if Euclidean.distance(&a.shape, &b.shape) <= tol {
                pairs.push((a.unit, b.unit));
            }
        }
    }

    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};

    use crate::geometry::{GeometryStore, dissolve_units};
    use crate::territory::{MunAttributes, Municipality, Territory};
    use crate::types::MunCode;

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

    /// One single-member unit per square: units 1 and 2 share an edge,
    /// unit 3 sits ~20 km east of unit 2.
    fn three_unit_strip() -> (Territory, GeometryStore) {
        let mut territory = Territory::new();
        let mut shapes = Vec::new();
        for (code, unit, x) in [(1u32, 1u32, -47.00), (2, 2, -46.99), (3, 3, -46.80)] {
            territory
                .insert(Municipality::new(
                    MunCode(code),
                    format!("M{code}"),
                    "XX",
                    UnitId(unit),
                    true,
                    MunAttributes::default(),
                ))
                .unwrap();
            shapes.push((MunCode(code), square(x, -15.00, 0.01)));
        }
        (territory, GeometryStore::from_shapes(shapes).unwrap())
    }

    #[test]
    fn touching_units_are_adjacent_and_distant_ones_are_not() {
        let (territory, store) = three_unit_strip();
        let metric = store.to_metric().unwrap();
        let (dissolved, _) = dissolve_units(&territory, &metric).unwrap();

        let pairs = adjacent_pairs(&dissolved, ADJACENCY_TOLERANCE_M);
        assert_eq!(pairs, vec![(UnitId(1), UnitId(2))]);
    }

    #[test]
    fn edge_set_is_reproducible() {
        let (territory, store) = three_unit_strip();
        let metric = store.to_metric().unwrap();
        let (dissolved, _) = dissolve_units(&territory, &metric).unwrap();

        let a = adjacent_pairs(&dissolved, ADJACENCY_TOLERANCE_M);
        let b = adjacent_pairs(&dissolved, ADJACENCY_TOLERANCE_M);
        assert_eq!(a, b);
    }
}
