use anyhow::Result;

use crate::flow::{FlowTable, TravelTimes};
use crate::geometry::MetricStore;
use crate::territory::Territory;
use crate::types::MunCode;

use super::{
    MIN_FLOW_SHARE, PassReport, rebuild_geometry,
    log::{ConsolidationLog, Decision, DecisionDetail, PassKind, ReasonCode},
};

/// Run one border-validation pass.
///
/// Visits every ordinary (non-seat) municipality in ascending code order and
/// relocates it to its principal destination's unit when the flow evidence
/// and adjacency constraints justify it:
///
/// - the destination's unit differs from the municipality's current unit,
/// - flow share meets [`MIN_FLOW_SHARE`] (inclusive),
/// - travel time is known and within the ceiling (guaranteed by the flow
///   profile filter),
/// - the current unit is geometrically adjacent to the destination unit,
/// - both sides share a metropolitan-region grouping, or neither has one.
///
/// Seats are never relocated. Only applied relocations are logged; a
/// municipality that stays put is the normal case, not a decision. Geometry
/// and coloring are rebuilt after every move so later candidates see the
/// updated borders.
pub fn validate_borders(
    territory: &mut Territory,
    metric: &MetricStore,
    flows: &FlowTable,
    times: &TravelTimes,
    log: &mut ConsolidationLog,
) -> Result<PassReport> {
    let mut geo = rebuild_geometry(territory, metric)?;

    let candidates: Vec<MunCode> = territory
        .municipalities()
        .filter(|m| !m.is_seat())
        .map(|m| m.code)
        .collect();

    let mut changes = 0;
    for code in candidates {
        let Some(mun) = territory.municipality(code) else { continue };
        if mun.is_seat() {
            continue;
        }
        let current_unit = mun.unit();
        let metro = mun.attrs.metro_region.clone();

        let profile = flows.profile(code, times);
        let Some(principal) = profile.principal().copied() else { continue };
        if principal.destination == code || profile.share() < MIN_FLOW_SHARE {
            continue;
        }

        let Some(target) = territory.unit_of(principal.destination) else { continue };
        if target == current_unit {
            continue;
        }
        if !geo.adjacency.contains(current_unit, target) {
            continue;
        }
        if metro.as_deref() != territory.metro_region_of_unit(target) {
            continue;
        }

        territory.move_municipality(code, target)?;
        log.append(
            PassKind::Border,
            Decision::Approved,
            ReasonCode::BorderAdjacency,
            current_unit,
            Some(target),
            code,
            DecisionDetail {
                flow_share: profile.share(),
                travel_time_h: Some(principal.travel_time_h),
                ..Default::default()
            },
        );
        geo = rebuild_geometry(territory, metric)?;
        changes += 1;
    }

    Ok(PassReport {
        pass: PassKind::Border,
        changes,
        rejections: 0,
        alerts: Vec::new(),
        adjacency: geo.adjacency,
        coloring: geo.coloring,
        warnings: geo.warnings,
    })
}
