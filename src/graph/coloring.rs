use std::collections::BTreeMap;

use ahash::AHashSet;

use crate::territory::Territory;
use crate::types::{MunCode, UnitId};

use super::UnitAdjacency;

/// A proper coloring of the unit adjacency graph.
///
/// Produced by the saturation-greedy heuristic in [`color_units`]; colors are
/// small non-negative integers, adjacent units never share one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Coloring {
    by_unit: BTreeMap<UnitId, u16>,
    num_colors: u16,
}

impl Coloring {
    /// Color of a unit, if it was part of the colored graph.
    pub fn color(&self, unit: UnitId) -> Option<u16> {
        self.by_unit.get(&unit).copied()
    }

    /// Number of distinct colors used.
    #[inline] pub fn num_colors(&self) -> u16 { self.num_colors }

    /// Unit → color map in ascending unit order.
    #[inline] pub fn by_unit(&self) -> &BTreeMap<UnitId, u16> { &self.by_unit }

    /// Check the coloring post-condition: no edge joins two equal colors.
    pub fn is_proper(&self, adj: &UnitAdjacency) -> bool {
        adj.edges().all(|(a, b)| self.color(a) != self.color(b))
    }

    /// Per-municipality color: every municipality inherits its unit's color.
    /// This is the map handed to the visualization collaborator.
    pub fn municipality_colors(&self, territory: &Territory) -> BTreeMap<MunCode, u16> {
        territory
            .municipalities()
            .filter_map(|mun| self.color(mun.unit()).map(|c| (mun.code, c)))
            .collect()
    }
}

/// Saturation-greedy (DSATUR) coloring.
///
/// Repeatedly picks the uncolored unit with the most distinct colors among
/// its already-colored neighbors, breaking ties by descending degree and then
/// ascending unit id, and gives it the smallest color unused by its
/// neighbors. This is a heuristic: it guarantees a proper coloring, not a
/// minimum one (exact chromatic number is NP-hard).
pub fn color_units(adj: &UnitAdjacency) -> Coloring {
    let n = adj.node_count();
    let mut colors: Vec<Option<u16>> = vec![None; n];
    let mut saturation: Vec<AHashSet<u16>> = vec![AHashSet::new(); n];

    for _ in 0..n {
        // Row order is ascending unit id, so the first strict maximum wins
        // ties in favor of the smallest id.
        let mut pick = None;
        for row in 0..n {
            if colors[row].is_some() {
                continue;
            }
            let key = (saturation[row].len(), adj.degree_of_row(row));
            match pick {
                Some((_, best)) if key <= best => {}
                _ => pick = Some((row, key)),
            }
        }
        let Some((row, _)) = pick else { break };

        let mut color = 0u16;
        while saturation[row].contains(&color) {
            color += 1;
        }

        colors[row] = Some(color);
        for &neighbor in adj.row_neighbors(row) {
            saturation[neighbor as usize].insert(color);
        }
    }

    let by_unit: BTreeMap<UnitId, u16> = adj
        .ids()
        .iter()
        .zip(&colors)
        .filter_map(|(&id, &color)| color.map(|c| (id, c)))
        .collect();
    let num_colors = by_unit.values().copied().max().map_or(0, |max| max + 1);

    Coloring { by_unit, num_colors }
}
