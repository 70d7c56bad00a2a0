//! Foliation validation and repair.
//!
//! A cell respects the foliation when its vertices span exactly two adjacent
//! time slices, i.e. `max(label) - min(label) == 1`. The repairer deletes the
//! highest-labelled vertex of each offending cell and lets the engine
//! re-triangulate; [`repair_foliation`] alternates checks and repair passes
//! under a [`RetryPolicy`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cdt::traits::{EngineError, TimeLabel, TriangulationEngine};
use crate::geometry::util::RandomPointGenerationError;

/// Errors raised while building or repairing a foliation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FoliationError {
    /// Fewer simplices than time slices were requested.
    #[error(
        "Cannot build a foliation of {timeslices} timeslices from {simplices} simplices: \
         at least one simplex per timeslice is required"
    )]
    InsufficientSimplices {
        /// Requested number of simplices.
        simplices: usize,
        /// Requested number of time slices.
        timeslices: usize,
    },
    /// A time slice could not be sampled.
    #[error("Failed to sample a timeslice: {0}")]
    Sampling(#[from] RandomPointGenerationError),
    /// The triangulation engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result of one validation sweep over the finite cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoliationCheck {
    /// Cells whose labels span exactly one slice step.
    pub valid: usize,
    /// Cells that violate the foliation or are structurally invalid.
    pub invalid: usize,
}

impl FoliationCheck {
    /// `true` when no cell is invalid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.invalid == 0
    }

    /// Number of cells inspected.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.valid + self.invalid
    }
}

/// Counters for one repair pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPass {
    /// Vertices removed.
    pub removed: usize,
    /// Structurally invalid cells left untouched.
    pub skipped_invalid: usize,
    /// Snapshot cells destroyed by earlier removals in the same pass.
    pub stale: usize,
}

/// Bound on the number of repair passes.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::cdt::foliation::RetryPolicy;
///
/// assert_eq!(RetryPolicy::default().max_passes, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of repair passes before giving up.
    pub max_passes: usize,
}

impl RetryPolicy {
    /// Default number of passes.
    pub const DEFAULT_MAX_PASSES: usize = 20;

    /// A policy allowing `max_passes` repair passes.
    #[must_use]
    pub const fn new(max_passes: usize) -> Self {
        Self { max_passes }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_PASSES)
    }
}

/// How the repair loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepairOutcome {
    /// The foliation is valid after `passes` repair passes.
    Converged {
        /// Repair passes run.
        passes: usize,
    },
    /// The pass budget ran out with `invalid_cells` still invalid.
    Exhausted {
        /// Repair passes run.
        passes: usize,
        /// Cells still invalid after the last pass.
        invalid_cells: usize,
    },
}

impl RepairOutcome {
    /// `true` if the loop ended with a valid foliation.
    #[must_use]
    pub const fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Repair passes run.
    #[must_use]
    pub const fn passes(&self) -> usize {
        match *self {
            Self::Converged { passes } | Self::Exhausted { passes, .. } => passes,
        }
    }
}

/// Aggregate result of [`repair_foliation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSummary {
    /// How the loop ended.
    pub outcome: RepairOutcome,
    /// The last validation sweep.
    pub check: FoliationCheck,
    /// Vertices removed over all passes.
    pub removed: usize,
    /// Structurally invalid cells skipped over all passes.
    pub skipped_invalid: usize,
    /// Other vertices the engine discarded while removals were repaired.
    pub dropped: usize,
}

/// Lowest label, highest label, and the position of the first vertex
/// attaining the highest label.
fn label_span(labels: [TimeLabel; 4]) -> (TimeLabel, TimeLabel, usize) {
    let mut min = labels[0];
    let mut max = labels[0];
    let mut max_index = 0;
    for (i, &label) in labels.iter().enumerate().skip(1) {
        min = min.min(label);
        if label > max {
            max = label;
            max_index = i;
        }
    }
    (min, max, max_index)
}

/// Whether a cell with these labels spans exactly one slice step.
#[must_use]
pub fn spans_adjacent_slices(labels: [TimeLabel; 4]) -> bool {
    let (min, max, _) = label_span(labels);
    max.checked_sub(min) == Some(1)
}

/// Counts finite cells that do and do not respect the foliation.
///
/// Structurally invalid cells count as invalid without a label check. With
/// `verbose`, every cell and its vertices are logged at `debug` level.
pub fn check_timeslices<E: TriangulationEngine>(engine: &E, verbose: bool) -> FoliationCheck {
    let mut check = FoliationCheck::default();
    for (cell, vertices) in engine.cells() {
        let labels = if engine.is_cell_valid(cell) {
            engine.cell_labels(cell)
        } else {
            None
        };
        let valid = labels.is_some_and(spans_adjacent_slices);
        if valid {
            check.valid += 1;
        } else {
            check.invalid += 1;
        }
        if verbose {
            debug!(?cell, valid, "Foliation check");
            for vertex in vertices {
                debug!(
                    ?vertex,
                    point = ?engine.point(vertex),
                    timeslice = ?engine.label(vertex),
                    "  vertex"
                );
            }
        }
    }
    info!(
        invalid = check.invalid,
        valid = check.valid,
        "There are {} invalid cells and {} valid cells in this triangulation.",
        check.invalid,
        check.valid
    );
    check
}

/// Runs one repair pass.
///
/// The finite cells are snapshotted first. For each snapshot cell still alive
/// and structurally valid whose labels do not span exactly one step, the first
/// vertex carrying the highest label is removed. Cells destroyed by an earlier
/// removal in the same pass are skipped as stale.
///
/// # Errors
///
/// Returns [`FoliationError::Engine`] if the engine fails to remove a vertex;
/// vertices removed before the failure stay removed.
pub fn fix_timeslices<E: TriangulationEngine>(
    engine: &mut E,
    verbose: bool,
) -> Result<RepairPass, FoliationError> {
    let snapshot: Vec<(E::CellHandle, [E::VertexHandle; 4])> = engine.cells().collect();
    let mut pass = RepairPass::default();

    for (cell, vertices) in snapshot {
        if !engine.contains_cell(cell) {
            pass.stale += 1;
            continue;
        }
        if !engine.is_cell_valid(cell) {
            pass.skipped_invalid += 1;
            continue;
        }
        let Some(labels) = engine.cell_labels(cell) else {
            pass.skipped_invalid += 1;
            continue;
        };
        let (min, max, max_index) = label_span(labels);
        if max.checked_sub(min) == Some(1) {
            continue;
        }
        let doomed = vertices[max_index];
        engine.remove_vertex(doomed)?;
        pass.removed += 1;
        if verbose {
            debug!(?cell, vertex = ?doomed, timeslice = max, "Vertex of cell removed");
        }
    }

    if pass.skipped_invalid > 0 {
        warn!(
            skipped = pass.skipped_invalid,
            "Structurally invalid cells were left unrepaired"
        );
    }
    Ok(pass)
}

/// Alternates validation and repair until the foliation is valid or
/// `policy.max_passes` repair passes have run.
///
/// At most `max_passes` repair passes and `max_passes + 1` checks run.
/// Running out of passes is reported as [`RepairOutcome::Exhausted`], not as
/// an error.
///
/// # Errors
///
/// Propagates [`FoliationError::Engine`] from [`fix_timeslices`].
pub fn repair_foliation<E: TriangulationEngine>(
    engine: &mut E,
    policy: &RetryPolicy,
    verbose: bool,
) -> Result<RepairSummary, FoliationError> {
    let mut passes = 0;
    let mut removed = 0;
    let mut skipped_invalid = 0;
    let dropped_before = engine.dropped_vertices();
    let mut check = check_timeslices(engine, verbose);

    while !check.is_valid() && passes < policy.max_passes {
        passes += 1;
        info!(pass = passes, "Fixing foliation");
        let pass = fix_timeslices(engine, verbose)?;
        removed += pass.removed;
        skipped_invalid += pass.skipped_invalid;
        check = check_timeslices(engine, verbose);
    }

    let outcome = if check.is_valid() {
        RepairOutcome::Converged { passes }
    } else {
        warn!(
            passes,
            invalid_cells = check.invalid,
            "Foliation repair gave up with invalid cells remaining"
        );
        RepairOutcome::Exhausted {
            passes,
            invalid_cells: check.invalid,
        }
    };

    let dropped = engine.dropped_vertices().saturating_sub(dropped_before);
    if dropped > 0 {
        warn!(dropped, "Engine discarded vertices while repairing the foliation");
    }

    Ok(RepairSummary {
        outcome,
        check,
        removed,
        skipped_invalid,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdt::fake::FakeTriangulation;

    #[test]
    fn label_span_reports_first_maximum() {
        assert_eq!(label_span([1, 2, 2, 1]), (1, 2, 1));
        assert_eq!(label_span([3, 3, 3, 3]), (3, 3, 0));
        assert_eq!(label_span([0, 5, 2, 5]), (0, 5, 1));
    }

    #[test]
    fn adjacency_rule() {
        assert!(spans_adjacent_slices([1, 1, 2, 2]));
        assert!(spans_adjacent_slices([4, 5, 5, 5]));
        assert!(!spans_adjacent_slices([1, 1, 1, 1]));
        assert!(!spans_adjacent_slices([1, 2, 3, 3]));
    }

    #[test]
    fn check_counts_valid_and_invalid_cells() {
        let labels = [1, 1, 2, 2, 3, 3];
        let fake = FakeTriangulation::from_cells(
            &labels,
            &[[0, 1, 2, 3], [2, 3, 4, 5], [0, 1, 4, 5], [0, 2, 3, 4]],
        );
        let check = check_timeslices(&fake, true);
        assert_eq!(check, FoliationCheck { valid: 2, invalid: 2 });
        assert!(!check.is_valid());
        assert_eq!(check.total(), 4);
    }

    #[test]
    fn structurally_invalid_cells_are_invalid() {
        let mut fake = FakeTriangulation::from_cells(&[1, 1, 2, 2], &[[0, 1, 2, 3]]);
        assert!(check_timeslices(&fake, false).is_valid());
        fake.break_cell(0);
        assert_eq!(
            check_timeslices(&fake, false),
            FoliationCheck { valid: 0, invalid: 1 }
        );
    }

    #[test]
    fn empty_engine_is_trivially_valid() {
        let fake = FakeTriangulation::default();
        let check = check_timeslices(&fake, false);
        assert!(check.is_valid());
        assert_eq!(check.total(), 0);
    }

    #[test]
    fn fix_removes_first_vertex_with_maximum_label() {
        let labels = [1, 3, 2, 3];
        let mut fake = FakeTriangulation::from_cells(&labels, &[[0, 1, 2, 3]]);
        let pass = fix_timeslices(&mut fake, true).unwrap();
        assert_eq!(pass.removed, 1);
        assert_eq!(fake.label(1), None);
        assert_eq!(fake.label(3), Some(3));
    }

    #[test]
    fn fix_uses_each_cells_own_maximum() {
        // The second cell's maximum lies before the first cell's maximum index
        let labels = [1, 1, 1, 5, 7, 7, 7, 7];
        let mut fake =
            FakeTriangulation::from_cells(&labels, &[[0, 1, 2, 3], [4, 5, 6, 7]]);
        let pass = fix_timeslices(&mut fake, false).unwrap();
        assert_eq!(pass.removed, 2);
        assert_eq!(fake.label(3), None);
        assert_eq!(fake.label(4), None);
        assert_eq!(fake.label(7), Some(7));
    }

    #[test]
    fn fix_skips_stale_and_invalid_cells() {
        let labels = [1, 1, 1, 1, 4, 4, 4, 4];
        let mut fake = FakeTriangulation::from_cells(
            &labels,
            // Removing vertex 0 destroys both of the first two cells
            &[[0, 1, 2, 3], [0, 1, 2, 4], [4, 5, 6, 7]],
        );
        fake.break_cell(2);
        let pass = fix_timeslices(&mut fake, false).unwrap();
        assert_eq!(
            pass,
            RepairPass {
                removed: 1,
                skipped_invalid: 1,
                stale: 1,
            }
        );
    }

    #[test]
    fn fix_propagates_engine_errors() {
        let mut fake = FakeTriangulation::from_cells(&[1, 1, 1, 1], &[[0, 1, 2, 3]]);
        fake.fail_removals = true;
        assert!(matches!(
            fix_timeslices(&mut fake, false),
            Err(FoliationError::Engine(EngineError::UnknownVertex { .. }))
        ));
    }

    #[test]
    fn repair_converges_without_passes_on_valid_input() {
        let mut fake = FakeTriangulation::from_cells(&[1, 2, 2, 2], &[[0, 1, 2, 3]]);
        let summary = repair_foliation(&mut fake, &RetryPolicy::default(), false).unwrap();
        assert_eq!(summary.outcome, RepairOutcome::Converged { passes: 0 });
        assert_eq!(summary.removed, 0);
    }

    #[test]
    fn repair_converges_after_removing_offenders() {
        let labels = [1, 1, 2, 2, 5];
        let mut fake =
            FakeTriangulation::from_cells(&labels, &[[0, 1, 2, 3], [0, 1, 2, 4]]);
        let summary = repair_foliation(&mut fake, &RetryPolicy::default(), false).unwrap();
        assert_eq!(summary.outcome, RepairOutcome::Converged { passes: 1 });
        assert!(summary.outcome.is_converged());
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.dropped, 0);
        assert_eq!(summary.check, FoliationCheck { valid: 1, invalid: 0 });
    }

    #[test]
    fn repair_reports_vertices_lost_by_the_engine() {
        let labels = [1, 1, 2, 2, 5, 6];
        let mut fake =
            FakeTriangulation::from_cells(&labels, &[[0, 1, 2, 3], [0, 1, 2, 4]]);
        fake.lossy_removals = true;
        let summary = repair_foliation(&mut fake, &RetryPolicy::default(), false).unwrap();
        assert_eq!(summary.outcome, RepairOutcome::Converged { passes: 1 });
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.dropped, 1);
        assert_eq!(fake.number_of_vertices(), 4);
        assert_eq!(fake.label(5), None);
    }

    #[test]
    fn repair_exhausts_on_unfixable_cells() {
        let mut fake = FakeTriangulation::from_cells(&[1, 1, 1, 1], &[[0, 1, 2, 3]]);
        fake.break_cell(0);
        let summary = repair_foliation(&mut fake, &RetryPolicy::new(3), false).unwrap();
        assert_eq!(
            summary.outcome,
            RepairOutcome::Exhausted {
                passes: 3,
                invalid_cells: 1,
            }
        );
        assert_eq!(summary.outcome.passes(), 3);
        assert_eq!(summary.skipped_invalid, 3);
    }

    #[test]
    fn zero_pass_policy_only_checks() {
        let mut fake = FakeTriangulation::from_cells(&[1, 1, 1, 1], &[[0, 1, 2, 3]]);
        let summary = repair_foliation(&mut fake, &RetryPolicy::new(0), false).unwrap();
        assert_eq!(
            summary.outcome,
            RepairOutcome::Exhausted {
                passes: 0,
                invalid_cells: 1,
            }
        );
        assert_eq!(fake.number_of_vertices(), 4);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&RepairOutcome::Converged { passes: 2 }).unwrap();
        assert_eq!(json, r#"{"status":"converged","passes":2}"#);
    }
}
