use anyhow::Result;

use crate::flow::{FlowTable, TravelTimes};
use crate::geometry::MetricStore;
use crate::graph::UnitAdjacency;
use crate::territory::Territory;
use crate::types::UnitId;

use super::{
    DependencyAlert, PassReport, dependency_alerts, rebuild_geometry, regic_rank, seat_score,
    log::{ConsolidationLog, Decision, DecisionDetail, PassKind, ReasonCode},
};

/// Run one sede-consolidation pass.
///
/// The alert set is computed once, up front, and decided in ascending origin
/// code order. Every decision re-resolves both seats against the *current*
/// hierarchy — an alert whose origin or destination was swallowed by an
/// earlier merge in the same pass is rejected, not skipped silently, so the
/// log accounts for every alert.
///
/// After each approved merge the dissolved geometry, adjacency graph and
/// coloring are rebuilt before the next decision.
pub fn consolidate_seats(
    territory: &mut Territory,
    metric: &MetricStore,
    flows: &FlowTable,
    times: &TravelTimes,
    log: &mut ConsolidationLog,
) -> Result<PassReport> {
    let mut geo = rebuild_geometry(territory, metric)?;
    let alerts = dependency_alerts(territory, flows, times);

    let mut changes = 0;
    let mut rejections = 0;

    for alert in &alerts {
        match decide(territory, &geo.adjacency, alert) {
            Verdict::Approve { target, reason, detail } => {
                territory.merge_units(alert.origin_unit, target)?;
                log.append(
                    PassKind::Sede,
                    Decision::Approved,
                    reason,
                    alert.origin_unit,
                    Some(target),
                    alert.origin,
                    detail,
                );
                geo = rebuild_geometry(territory, metric)?;
                changes += 1;
            }
            Verdict::Reject { target, reason, detail } => {
                log.append(
                    PassKind::Sede,
                    Decision::Rejected,
                    reason,
                    alert.origin_unit,
                    target,
                    alert.origin,
                    detail,
                );
                rejections += 1;
            }
        }
    }

    Ok(PassReport {
        pass: PassKind::Sede,
        changes,
        rejections,
        alerts,
        adjacency: geo.adjacency,
        coloring: geo.coloring,
        warnings: geo.warnings,
    })
}

enum Verdict {
    Approve { target: UnitId, reason: ReasonCode, detail: DecisionDetail },
    Reject { target: Option<UnitId>, reason: ReasonCode, detail: DecisionDetail },
}

/// Evaluate one alert against the current hierarchy. Pure with respect to
/// the territory: mutation happens in the caller.
fn decide(
    territory: &Territory,
    adjacency: &UnitAdjacency,
    alert: &DependencyAlert,
) -> Verdict {
    let base_detail = DecisionDetail {
        flow_share: alert.flow_share,
        travel_time_h: Some(alert.travel_time_h),
        ..Default::default()
    };
    let reject = |target, reason, detail| Verdict::Reject { target, reason, detail };

    // The origin must still be the seat of the unit the alert was raised for.
    let Some(origin) = territory.municipality(alert.origin) else {
        return reject(Some(alert.destination_unit), ReasonCode::UnitVanished, base_detail);
    };
    if !origin.is_seat()
        || origin.unit() != alert.origin_unit
        || territory.unit(alert.origin_unit).is_none()
    {
        return reject(Some(alert.destination_unit), ReasonCode::UnitVanished, base_detail);
    }

    // The destination must still resolve to a seat of a different unit.
    let Some(destination) = territory.municipality(alert.destination) else {
        return reject(None, ReasonCode::DestinationUnresolved, base_detail);
    };
    let target = destination.unit();
    if !destination.is_seat() {
        return reject(Some(target), ReasonCode::UnitVanished, base_detail);
    }
    if target == alert.origin_unit {
        return reject(Some(target), ReasonCode::SameUnit, base_detail);
    }

    // Structural gates: shared border, compatible metropolitan grouping.
    if !adjacency.contains(alert.origin_unit, target) {
        return reject(Some(target), ReasonCode::NotAdjacent, base_detail);
    }
    if territory.metro_region_of_unit(alert.origin_unit) != territory.metro_region_of_unit(target) {
        return reject(Some(target), ReasonCode::RegionMismatch, base_detail);
    }

    let origin_score = seat_score(&origin.attrs);
    let destination_score = seat_score(&destination.attrs);
    let origin_rank = regic_rank(origin.attrs.regic.as_deref());
    let destination_rank = regic_rank(destination.attrs.regic.as_deref());
    let detail = DecisionDetail {
        origin_score: Some(origin_score),
        destination_score: Some(destination_score),
        origin_rank: Some(origin_rank),
        destination_rank: Some(destination_rank),
        ..base_detail
    };

    // A seat that already scores is never merged away.
    if origin_score != 0 {
        return reject(Some(target), ReasonCode::OriginScoreNonzero, detail);
    }

    match destination_score {
        0 => {
            if destination_rank < origin_rank {
                Verdict::Approve { target, reason: ReasonCode::RankPriority, detail }
            } else {
                reject(Some(target), ReasonCode::RankPriority, detail)
            }
        }
        1 | 2 => {
            if destination.attrs.has_airport() {
                Verdict::Approve { target, reason: ReasonCode::InfrastructurePriority, detail }
            } else {
                reject(Some(target), ReasonCode::InfrastructurePriority, detail)
            }
        }
        _ => reject(Some(target), ReasonCode::DestinationUnresolved, detail),
    }
}
