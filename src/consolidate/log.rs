use ahash::AHashSet;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::{MunCode, UnitId};

/// Which pipeline pass produced a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassKind {
    Sede,
    Border,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    Approved,
    Rejected,
}

/// The rule that decided a candidate, recorded with the decision so the two
/// together read as "approved/rejected under this rule".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonCode {
    /// Destination strictly more central in the REGIC hierarchy.
    RankPriority,
    /// Destination carries airport infrastructure the origin lacks.
    InfrastructurePriority,
    /// Origin seat already scores above zero and is never merged away.
    OriginScoreNonzero,
    /// Destination could not be resolved to a scored seat.
    DestinationUnresolved,
    /// Origin and destination units do not share a border.
    NotAdjacent,
    /// Metropolitan-region groupings differ.
    RegionMismatch,
    /// An earlier decision in the pass removed the origin or destination unit.
    UnitVanished,
    /// Principal flow stays within the origin's own unit.
    SameUnit,
    /// Border relocation backed by flow share and unit adjacency.
    BorderAdjacency,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RankPriority => "rank-priority",
            Self::InfrastructurePriority => "infrastructure-priority",
            Self::OriginScoreNonzero => "origin-score-nonzero",
            Self::DestinationUnresolved => "destination-unresolved",
            Self::NotAdjacent => "not-adjacent",
            Self::RegionMismatch => "region-mismatch",
            Self::UnitVanished => "unit-vanished",
            Self::SameUnit => "same-unit",
            Self::BorderAdjacency => "border-adjacency",
        }
    }
}

/// Numeric evidence behind one decision. Scores and ranks are only present
/// for seat-consolidation decisions; border relocations carry flow evidence
/// alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionDetail {
    pub origin_score: Option<u8>,
    pub destination_score: Option<u8>,
    pub origin_rank: Option<u8>,
    pub destination_rank: Option<u8>,
    pub flow_share: f64,
    pub travel_time_h: Option<f64>,
}

/// One immutable decision record.
///
/// `seq` is a logical timestamp: a monotonic per-run counter rather than a
/// wall clock, so two runs over the same input produce byte-identical logs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub pass: PassKind,
    pub decision: Decision,
    pub reason: ReasonCode,
    pub source_unit: UnitId,
    pub target_unit: Option<UnitId>,
    /// The municipality the decision acted on: the origin seat for
    /// consolidations, the relocated municipality for border moves.
    pub municipality: MunCode,
    pub detail: DecisionDetail,
}

/// Append-only decision ledger: the sole audit trail of a run, and the
/// mechanism for detecting already-applied decisions on re-run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationLog {
    entries: Vec<LogEntry>,
}

impl ConsolidationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, in decision order.
    #[inline] pub fn entries(&self) -> &[LogEntry] { &self.entries }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Approved entries only (applied merges and relocations).
    pub fn approved(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.decision == Decision::Approved)
    }

    /// Units already merged away by an approved consolidation, for
    /// re-entrancy checks on re-run.
    pub fn merged_units(&self) -> AHashSet<UnitId> {
        self.approved()
            .filter(|e| e.pass == PassKind::Sede)
            .map(|e| e.source_unit)
            .collect()
    }

    pub fn was_merged(&self, unit: UnitId) -> bool {
        self.approved()
            .any(|e| e.pass == PassKind::Sede && e.source_unit == unit)
    }

    pub(crate) fn append(
        &mut self,
        pass: PassKind,
        decision: Decision,
        reason: ReasonCode,
        source_unit: UnitId,
        target_unit: Option<UnitId>,
        municipality: MunCode,
        detail: DecisionDetail,
    ) -> &LogEntry {
        let seq = self.entries.len() as u64;
        self.entries.push(LogEntry {
            seq,
            pass,
            decision,
            reason,
            source_unit,
            target_unit,
            municipality,
            detail,
        });
        self.entries.last().expect("entry just pushed")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing consolidation log")
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("deserializing consolidation log")
    }
}
