use ahash::AHashMap;
use smallvec::SmallVec;

use crate::geometry::{ADJACENCY_TOLERANCE_M, DissolvedUnits, adjacent_pairs};
use crate::types::UnitId;

/// An undirected simple graph over units in compressed sparse row format.
///
/// `offsets[i]..offsets[i+1]` indexes into `neighbors` to give the sorted
/// neighbor list of the unit at row `i`; rows follow ascending unit id.
/// Supports O(log deg) membership tests via binary search.
#[derive(Clone, Debug, Default)]
pub struct UnitAdjacency {
    ids: Vec<UnitId>,
    index: AHashMap<UnitId, usize>,
    offsets: Vec<u32>,
    neighbors: Vec<u32>,
}

impl UnitAdjacency {
    /// Build the adjacency graph over dissolved unit geometries with the
    /// standard buffer tolerance.
    pub fn build(dissolved: &DissolvedUnits) -> Self {
        let ids: Vec<UnitId> = dissolved.ids().collect();
        let pairs = adjacent_pairs(dissolved, ADJACENCY_TOLERANCE_M);
        Self::from_edges(ids, &pairs)
    }

    /// Construct from a sorted id list and undirected edge pairs. Self-loops
    /// and duplicate pairs are ignored; unknown ids are skipped.
    pub fn from_edges(ids: Vec<UnitId>, pairs: &[(UnitId, UnitId)]) -> Self {
        debug_assert!(ids.is_sorted(), "unit ids must be sorted");

        let index: AHashMap<UnitId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut rows: Vec<SmallVec<[u32; 8]>> = vec![SmallVec::new(); ids.len()];
        for &(a, b) in pairs {
            if a == b {
                continue;
            }
            let (Some(&i), Some(&j)) = (index.get(&a), index.get(&b)) else { continue };
            if !rows[i].contains(&(j as u32)) {
                rows[i].push(j as u32);
                rows[j].push(i as u32);
            }
        }
        for row in &mut rows {
            row.sort_unstable();
        }

        Self {
            offsets: std::iter::once(0u32)
                .chain(rows.iter().map(|v| v.len() as u32).scan(0u32, |acc, len| {
                    *acc += len;
                    Some(*acc)
                }))
                .collect(),
            neighbors: rows.iter().flatten().copied().collect(),
            ids,
            index,
        }
    }

    /// Number of units (nodes) in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.ids.len() }

    /// Number of undirected edges in the graph.
    #[inline] pub fn edge_count(&self) -> usize { self.neighbors.len() / 2 }

    /// Unit ids in row order (ascending).
    #[inline] pub fn ids(&self) -> &[UnitId] { &self.ids }

    #[inline]
    fn range(&self, row: usize) -> std::ops::Range<usize> {
        self.offsets[row] as usize..self.offsets[row + 1] as usize
    }

    /// Degree of a unit; 0 for units not in the graph.
    pub fn degree(&self, unit: UnitId) -> usize {
        self.index.get(&unit).map_or(0, |&row| self.range(row).len())
    }

    /// Sorted neighbors of a unit.
    pub fn neighbors(&self, unit: UnitId) -> impl Iterator<Item = UnitId> + '_ {
        self.index
            .get(&unit)
            .map(|&row| self.range(row))
            .unwrap_or(0..0)
            .map(|v| self.ids[self.neighbors[v] as usize])
    }

    /// Returns `true` iff `a` and `b` are adjacent (binary search).
    pub fn contains(&self, a: UnitId, b: UnitId) -> bool {
        let (Some(&i), Some(&j)) = (self.index.get(&a), self.index.get(&b)) else {
            return false;
        };
        self.neighbors[self.range(i)].binary_search(&(j as u32)).is_ok()
    }

    /// All undirected edges as `(a, b)` with `a < b`, in row order.
    pub fn edges(&self) -> impl Iterator<Item = (UnitId, UnitId)> + '_ {
        (0..self.node_count()).flat_map(move |i| {
            self.range(i)
                .map(move |v| self.neighbors[v] as usize)
                .filter(move |&j| i < j)
                .map(move |j| (self.ids[i], self.ids[j]))
        })
    }

    /// Per-row degrees, used by the colorer's tie-breaking.
    pub(crate) fn degree_of_row(&self, row: usize) -> usize {
        self.range(row).len()
    }

    pub(crate) fn row_neighbors(&self, row: usize) -> &[u32] {
        &self.neighbors[self.range(row)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> UnitAdjacency {
        // 1 - 2 - 3, plus isolated 9
        UnitAdjacency::from_edges(
            vec![UnitId(1), UnitId(2), UnitId(3), UnitId(9)],
            &[(UnitId(1), UnitId(2)), (UnitId(2), UnitId(3))],
        )
    }

    #[test]
    fn csr_counts_and_degrees() {
        let adj = path_graph();
        assert_eq!(adj.node_count(), 4);
        assert_eq!(adj.edge_count(), 2);
        assert_eq!(adj.degree(UnitId(2)), 2);
        assert_eq!(adj.degree(UnitId(9)), 0);
        assert_eq!(adj.degree(UnitId(77)), 0);
    }

    #[test]
    fn contains_is_symmetric() {
        let adj = path_graph();
        assert!(adj.contains(UnitId(1), UnitId(2)));
        assert!(adj.contains(UnitId(2), UnitId(1)));
        assert!(!adj.contains(UnitId(1), UnitId(3)));
        assert!(!adj.contains(UnitId(1), UnitId(77)));
    }

    #[test]
    fn duplicate_and_self_pairs_are_ignored() {
        let adj = UnitAdjacency::from_edges(
            vec![UnitId(1), UnitId(2)],
            &[
                (UnitId(1), UnitId(2)),
                (UnitId(2), UnitId(1)),
                (UnitId(1), UnitId(1)),
            ],
        );
        assert_eq!(adj.edge_count(), 1);
        assert_eq!(adj.neighbors(UnitId(1)).collect::<Vec<_>>(), vec![UnitId(2)]);
    }

    #[test]
    fn edges_iterate_in_row_order() {
        let adj = path_graph();
        assert_eq!(
            adj.edges().collect::<Vec<_>>(),
            vec![(UnitId(1), UnitId(2)), (UnitId(2), UnitId(3))]
        );
    }
}
