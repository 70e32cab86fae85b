use anyhow::{Context, Result, ensure};

use crate::consolidate::{ConsolidationLog, PassReport, consolidate_seats, validate_borders};
use crate::flow::{FlowTable, TravelTimes};
use crate::geometry::{GeometryStore, MetricStore};
use crate::territory::{Snapshot, Territory};

/// The sequential consolidation pipeline.
///
/// Owns the read-only inputs for the lifetime of a run: the metric-projected
/// geometry store, the aggregated flow table and the travel-time table. The
/// hierarchy itself is passed in mutably per pass — it is the only shared
/// mutable state, and exactly one pass touches it at a time.
pub struct Pipeline {
    metric: MetricStore,
    flows: FlowTable,
    times: TravelTimes,
}

/// Result of one full pass (sede consolidation + border validation).
#[derive(Clone, Debug)]
pub struct PassOutcome {
    pub sede: PassReport,
    pub border: PassReport,
    /// State captured after the pass, for resumability and auditing.
    pub snapshot: Snapshot,
}

impl PassOutcome {
    /// Applied mutations in this pass (merges + relocations).
    pub fn changes(&self) -> usize {
        self.sede.changes + self.border.changes
    }
}

/// Result of driving the pipeline to a fixed point.
#[derive(Clone, Debug)]
pub struct FixedPointOutcome {
    pub passes: Vec<PassOutcome>,
    pub total_merges: usize,
    pub total_relocations: usize,
}

impl FixedPointOutcome {
    /// The final pass, which by construction applied zero changes.
    pub fn last(&self) -> &PassOutcome {
        self.passes.last().expect("fixed point requires at least one pass")
    }
}

impl Pipeline {
    /// Reprojects the geometry store once; everything downstream works in
    /// metric space.
    pub fn new(store: &GeometryStore, flows: FlowTable, times: TravelTimes) -> Result<Self> {
        let metric = store.to_metric().context("reprojecting geometry store")?;
        Ok(Self { metric, flows, times })
    }

    #[inline] pub fn metric(&self) -> &MetricStore { &self.metric }

    #[inline] pub fn flows(&self) -> &FlowTable { &self.flows }

    #[inline] pub fn times(&self) -> &TravelTimes { &self.times }

    /// Run one full pass: integrity check, sede consolidation, border
    /// validation, final integrity check, snapshot.
    ///
    /// Data-integrity defects abort the run before any mutation; everything
    /// recoverable inside the passes degrades to a logged rejection or a
    /// skipped candidate.
    pub fn run_pass(
        &self,
        territory: &mut Territory,
        log: &mut ConsolidationLog,
    ) -> Result<PassOutcome> {
        territory.validate().context("pre-pass integrity check")?;

        let sede = consolidate_seats(territory, &self.metric, &self.flows, &self.times, log)?;
        let border = validate_borders(territory, &self.metric, &self.flows, &self.times, log)?;

        territory.validate().context("post-pass integrity check")?;

        let colors = border.coloring.municipality_colors(territory);
        let snapshot = Snapshot::capture(territory, "post-border-validation", &colors);

        Ok(PassOutcome { sede, border, snapshot })
    }

    /// Repeat passes until one applies zero changes.
    ///
    /// Merges strictly reduce the unit count and relocations re-settle
    /// municipalities onto their principal destinations, so the fixed point
    /// is reached quickly in practice; the pass bound turns a cycling
    /// hierarchy into an error instead of a hang.
    pub fn run_to_fixed_point(
        &self,
        territory: &mut Territory,
        log: &mut ConsolidationLog,
    ) -> Result<FixedPointOutcome> {
        let max_passes = territory.num_units() + territory.num_municipalities() + 1;

        let mut passes = Vec::new();
        loop {
            ensure!(
                passes.len() <= max_passes,
                "no fixed point after {} passes",
                passes.len(),
            );

            let outcome = self.run_pass(territory, log)?;
            let done = outcome.changes() == 0;
            passes.push(outcome);
            if done {
                break;
            }
        }

        Ok(FixedPointOutcome {
            total_merges: passes.iter().map(|p| p.sede.changes).sum(),
            total_relocations: passes.iter().map(|p| p.border.changes).sum(),
            passes,
        })
    }
}
