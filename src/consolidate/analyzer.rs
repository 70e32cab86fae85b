use crate::flow::{FlowTable, TravelTimes};
use crate::territory::Territory;
use crate::types::{MunCode, UnitId};

use super::{MIN_FLOW_SHARE, regic::regic_rank, score::seat_score};

/// A seat whose dominant outbound flow points at another unit's seat within
/// the travel-time ceiling: the precondition for a consolidation decision.
#[derive(Clone, Debug, PartialEq)]
pub struct DependencyAlert {
    pub origin: MunCode,
    pub origin_unit: UnitId,
    pub destination: MunCode,
    pub destination_unit: UnitId,
    pub trips_to_destination: f64,
    pub total_trips: f64,
    pub flow_share: f64,
    pub travel_time_h: f64,
}

/// Per-seat summary backing the dependency-alert list exposed to the
/// dashboard collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct SeatMetrics {
    pub unit: UnitId,
    pub seat: MunCode,
    pub name: String,
    pub uf: String,
    pub unit_population: u64,
    pub member_count: usize,
    pub has_airport: bool,
    pub tourism: Option<String>,
    pub regic: Option<String>,
    pub regic_rank: u8,
    pub score: u8,
    pub total_trips: f64,
    pub principal_destination: Option<MunCode>,
    pub flow_share: f64,
    pub travel_time_h: Option<f64>,
    pub alert: Option<DependencyAlert>,
}

/// Analyze every seat in ascending code order.
///
/// A seat raises an alert iff its principal flow targets a different
/// municipality that is currently the seat of a different unit, and the flow
/// share meets [`MIN_FLOW_SHARE`] (inclusive). Travel time is already bounded
/// by the flow profile's ceiling filter.
pub fn analyze_seats(
    territory: &Territory,
    flows: &FlowTable,
    times: &TravelTimes,
) -> Vec<SeatMetrics> {
    territory
        .seats()
        .map(|seat| {
            let profile = flows.profile(seat.code, times);
            let principal = profile.principal().copied();
            let flow_share = profile.share();

            let alert = principal.and_then(|p| {
                if p.destination == seat.code {
                    return None;
                }
                let destination = territory.municipality(p.destination)?;
                if !destination.is_seat() || destination.unit() == seat.unit() {
                    return None;
                }
                if flow_share < MIN_FLOW_SHARE {
                    return None;
                }
                Some(DependencyAlert {
                    origin: seat.code,
                    origin_unit: seat.unit(),
                    destination: p.destination,
                    destination_unit: destination.unit(),
                    trips_to_destination: p.trips,
                    total_trips: profile.total_trips,
                    flow_share,
                    travel_time_h: p.travel_time_h,
                })
            });

            let members = territory.unit(seat.unit()).map_or(0, |u| u.len());
            SeatMetrics {
                unit: seat.unit(),
                seat: seat.code,
                name: seat.name.clone(),
                uf: seat.uf.clone(),
                unit_population: territory.unit_population(seat.unit()),
                member_count: members,
                has_airport: seat.attrs.has_airport(),
                tourism: seat.attrs.tourism.clone(),
                regic: seat.attrs.regic.clone(),
                regic_rank: regic_rank(seat.attrs.regic.as_deref()),
                score: seat_score(&seat.attrs),
                total_trips: profile.total_trips,
                principal_destination: principal.map(|p| p.destination),
                flow_share,
                travel_time_h: principal.map(|p| p.travel_time_h),
                alert,
            }
        })
        .collect()
}

/// The complete alert set for one consolidator pass, in ascending origin
/// code order.
pub fn dependency_alerts(
    territory: &Territory,
    flows: &FlowTable,
    times: &TravelTimes,
) -> Vec<DependencyAlert> {
    analyze_seats(territory, flows, times)
        .into_iter()
        .filter_map(|m| m.alert)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::flow::FlowRecord;
    use crate::territory::{MunAttributes, Municipality};

    use super::*;

    fn mun(code: u32, unit: u32, is_seat: bool) -> Municipality {
        Municipality::new(
            MunCode(code),
            format!("M{code}"),
            "XX",
            UnitId(unit),
            is_seat,
            MunAttributes::default(),
        )
    }

    fn record(origin: u32, destination: u32, trips: f64) -> FlowRecord {
        FlowRecord {
            origin: MunCode(origin),
            destination: MunCode(destination),
            mode: "road".into(),
            trips,
        }
    }

    /// Seats 10 (unit 1) and 20 (unit 2); 11 is an ordinary member of unit 1.
    fn two_unit_territory() -> Territory {
        let mut t = Territory::new();
        t.insert(mun(10, 1, true)).unwrap();
        t.insert(mun(11, 1, false)).unwrap();
        t.insert(mun(20, 2, true)).unwrap();
        t
    }

    fn times_all(pairs: &[(u32, u32)]) -> TravelTimes {
        TravelTimes::from_rows(pairs.iter().map(|&(o, d)| (MunCode(o), MunCode(d), 1.0)))
    }

    #[test]
    fn dominant_flow_to_foreign_seat_raises_an_alert() {
        let territory = two_unit_territory();
        let flows = FlowTable::from_records(&[record(10, 20, 80.0), record(10, 11, 20.0)]);
        let times = times_all(&[(10, 20), (10, 11)]);

        let alerts = dependency_alerts(&territory, &flows, &times);
        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.origin, MunCode(10));
        assert_eq!(alert.destination, MunCode(20));
        assert_eq!(alert.destination_unit, UnitId(2));
        assert_eq!(alert.flow_share, 0.8);
        assert_eq!(alert.travel_time_h, 1.0);
    }

    #[test]
    fn flow_to_a_non_seat_is_not_an_alert() {
        let territory = two_unit_territory();
        // Principal flow of seat 20 goes to 11, an ordinary member.
        let flows = FlowTable::from_records(&[record(20, 11, 90.0)]);
        let times = times_all(&[(20, 11)]);

        let metrics = analyze_seats(&territory, &flows, &times);
        let seat20 = metrics.iter().find(|m| m.seat == MunCode(20)).unwrap();
        assert_eq!(seat20.principal_destination, Some(MunCode(11)));
        assert!(seat20.alert.is_none());
    }

    #[test]
    fn flow_within_the_own_unit_is_not_an_alert() {
        let mut territory = two_unit_territory();
        territory.insert(mun(21, 2, false)).unwrap();
        // Seat 20's principal flow stays inside unit 2.
        let flows = FlowTable::from_records(&[record(20, 21, 100.0)]);
        let times = times_all(&[(20, 21)]);

        assert!(dependency_alerts(&territory, &flows, &times).is_empty());
    }

    /// Territory where seat 10's flows fan out over 25 ordinary members of
    /// unit 1 plus the foreign seat 20, so the principal can hold a small
    /// share. Seat 20 gets `seat_trips`, every member gets `member_trips`.
    fn fan_out(seat_trips: f64, member_trips: f64) -> (Territory, FlowTable, TravelTimes) {
        let mut territory = two_unit_territory();
        let mut records = vec![record(10, 20, seat_trips)];
        let mut rows = vec![(MunCode(10), MunCode(20), 1.0)];
        for code in 101..126 {
            territory.insert(mun(code, 1, false)).unwrap();
            records.push(record(10, code, member_trips));
            rows.push((MunCode(10), MunCode(code), 1.0));
        }
        (territory, FlowTable::from_records(&records), TravelTimes::from_rows(rows))
    }

    #[test]
    fn share_threshold_is_inclusive_at_five_percent() {
        // Principal: seat 20 with 50 of 1000 trips — exactly 5%.
        let (territory, flows, times) = fan_out(50.0, 38.0);

        let alerts = dependency_alerts(&territory, &flows, &times);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].flow_share, 0.05);
    }

    #[test]
    fn share_just_below_threshold_never_alerts() {
        // Principal: seat 20 with 499 of 10000 trips — 4.99%.
        let (territory, flows, times) = fan_out(499.0, 380.04);

        assert!(dependency_alerts(&territory, &flows, &times).is_empty());
    }
}
