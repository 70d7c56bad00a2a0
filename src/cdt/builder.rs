//! Construction of foliated triangulations.
//!
//! [`FoliationBuilder`] samples one 2-sphere per time slice, inserts every
//! point into a 3D triangulation in a single batch, repairs the foliation,
//! and classifies the resulting simplices and edges.
//!
//! # Examples
//!
//! ```rust
//! use causal_dynamical_triangulations::cdt::builder::{FoliationBuilder, FoliationConfigBuilder};
//!
//! let config = FoliationConfigBuilder::default()
//!     .simplices(2)
//!     .timeslices(2)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let foliation = FoliationBuilder::new(config).build().unwrap();
//!
//! let report = foliation.report();
//! assert!(report.valid_foliation);
//! assert_eq!(report.simplex_counts.total(), report.cells);
//! ```

use std::fmt;

use derive_builder::Builder;
use num_traits::cast::ToPrimitive;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cdt::classification::{EdgeClassification, SimplexClassification, SimplexCounts};
use crate::cdt::foliation::{
    FoliationCheck, FoliationError, RepairOutcome, RepairSummary, RetryPolicy, check_timeslices,
    repair_foliation,
};
use crate::cdt::sphere::make_2_sphere;
use crate::cdt::traits::{EngineError, TimeLabel, TriangulationEngine};
use crate::core::delaunay_triangulation::{BatchInsertion, DelaunayTriangulation};
use crate::geometry::point::Point;

/// Parameters of a foliated triangulation.
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct FoliationConfig {
    /// Requested number of simplices. The number of points per slice is
    /// derived from `simplices / timeslices`.
    pub simplices: usize,
    /// Number of time slices; must be positive.
    pub timeslices: usize,
    /// Emit per-cell and per-vertex diagnostics at `debug` level.
    #[builder(default)]
    pub verbose: bool,
    /// Seed for the point sampler; OS entropy when `None`.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
    /// Bound on foliation repair passes.
    #[builder(default)]
    pub retry: RetryPolicy,
    /// Tally timelike and spacelike edges.
    #[builder(default = "true")]
    pub classify_edges: bool,
}

impl FoliationConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.timeslices {
            Some(0) => Err("timeslices must be positive".to_string()),
            _ => Ok(()),
        }
    }
}

impl FoliationConfig {
    /// A configuration with default options.
    #[must_use]
    pub fn new(simplices: usize, timeslices: usize) -> Self {
        Self {
            simplices,
            timeslices,
            verbose: false,
            seed: None,
            retry: RetryPolicy::default(),
            classify_edges: true,
        }
    }
}

/// Summary of a built foliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FoliationReport {
    /// Requested number of simplices.
    pub simplices: usize,
    /// Number of time slices.
    pub timeslices: usize,
    /// Whether every finite cell respects the foliation.
    pub valid_foliation: bool,
    /// Last validation sweep.
    pub check: FoliationCheck,
    /// How the repair loop ended.
    pub repair: RepairOutcome,
    /// Vertices removed during repair.
    pub vertices_removed: usize,
    /// Vertices the engine lost as a side effect of repair.
    pub vertices_dropped: usize,
    /// Dimension of the triangulation.
    pub dimension: i32,
    /// Finite vertices.
    pub vertices: usize,
    /// Finite cells.
    pub cells: usize,
    /// Cells per simplex type.
    pub simplex_counts: SimplexCounts,
    /// Edge tallies, when edges were classified.
    pub edges: Option<EdgeClassification>,
    /// Structural validity of the triangulation.
    pub engine_valid: bool,
    /// Outcome of the bulk insertion.
    pub insertion: BatchInsertion,
}

impl FoliationReport {
    fn refresh<E: TriangulationEngine>(
        &mut self,
        engine: &E,
        check: FoliationCheck,
        simplex_counts: SimplexCounts,
        edges: Option<EdgeClassification>,
    ) {
        self.valid_foliation = check.is_valid();
        self.check = check;
        self.dimension = engine.dim();
        self.vertices = engine.number_of_vertices();
        self.cells = engine.number_of_cells();
        self.simplex_counts = simplex_counts;
        self.edges = edges;
        self.engine_valid = engine.is_valid();
    }
}

impl fmt::Display for FoliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Valid foliation: {}", self.valid_foliation)?;
        writeln!(
            f,
            "There are {} invalid cells and {} valid cells in this triangulation.",
            self.check.invalid, self.check.valid
        )?;
        match self.repair {
            RepairOutcome::Converged { passes } => {
                writeln!(f, "Foliation repair converged after {passes} passes.")?;
            }
            RepairOutcome::Exhausted {
                passes,
                invalid_cells,
            } => writeln!(
                f,
                "Foliation repair gave up after {passes} passes with {invalid_cells} invalid cells."
            )?,
        }
        writeln!(
            f,
            "Delaunay triangulation has {} vertices and {} cells in dimension {}.",
            self.vertices, self.cells, self.dimension
        )?;
        write!(
            f,
            "There are {} (3,1) simplices and {} (2,2) simplices and {} (1,3) simplices.",
            self.simplex_counts.three_one, self.simplex_counts.two_two, self.simplex_counts.one_three
        )?;
        if let Some(edges) = self.edges {
            write!(f, "\nN1_SL = {}\nN1_TL = {}", edges.spacelike, edges.timelike)?;
        }
        if !self.engine_valid {
            write!(f, "\nTriangulation is structurally invalid.")?;
        }
        Ok(())
    }
}

/// A foliated triangulation with its simplex classification.
#[derive(Debug)]
pub struct Foliation<E: TriangulationEngine> {
    triangulation: E,
    classification: SimplexClassification<E::CellHandle>,
    edges: Option<EdgeClassification>,
    report: FoliationReport,
}

impl<E: TriangulationEngine> Foliation<E> {
    /// The underlying triangulation.
    #[must_use]
    pub const fn triangulation(&self) -> &E {
        &self.triangulation
    }

    /// Mutable access to the triangulation.
    ///
    /// Any mutation makes the classification stale until
    /// [`reclassify`](Self::reclassify) is called.
    pub const fn triangulation_mut(&mut self) -> &mut E {
        &mut self.triangulation
    }

    /// Consumes the foliation, returning the triangulation.
    pub fn into_triangulation(self) -> E {
        self.triangulation
    }

    /// Cells partitioned by simplex type.
    #[must_use]
    pub const fn classification(&self) -> &SimplexClassification<E::CellHandle> {
        &self.classification
    }

    /// Edge tallies, if edges are classified.
    #[must_use]
    pub const fn edge_classification(&self) -> Option<EdgeClassification> {
        self.edges
    }

    /// Build summary, refreshed by [`reclassify`](Self::reclassify).
    #[must_use]
    pub const fn report(&self) -> &FoliationReport {
        &self.report
    }

    /// Whether the classification reflects the current triangulation.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.classification.is_current(&self.triangulation)
    }

    /// Validates the foliation of the current triangulation.
    #[must_use]
    pub fn check(&self) -> FoliationCheck {
        check_timeslices(&self.triangulation, false)
    }

    /// Recomputes the classification, edge tallies, and report after the
    /// triangulation was mutated.
    pub fn reclassify(&mut self) {
        self.classification.reclassify(&self.triangulation);
        if self.edges.is_some() {
            self.edges = Some(EdgeClassification::classify(&self.triangulation));
        }
        let check = self.check();
        self.report.refresh(
            &self.triangulation,
            check,
            self.classification.counts(),
            self.edges,
        );
    }
}

/// Builds foliated triangulations from a [`FoliationConfig`].
#[derive(Clone, Debug)]
pub struct FoliationBuilder {
    config: FoliationConfig,
}

impl FoliationBuilder {
    /// A builder for `config`.
    #[must_use]
    pub const fn new(config: FoliationConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &FoliationConfig {
        &self.config
    }

    /// Builds a foliated Delaunay triangulation, seeding the sampler from
    /// [`FoliationConfig::seed`] or from OS entropy.
    ///
    /// # Errors
    ///
    /// See [`build_with_rng`](Self::build_with_rng).
    pub fn build(&self) -> Result<Foliation<DelaunayTriangulation<TimeLabel>>, FoliationError> {
        let mut rng = self
            .config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        self.build_with_rng(&mut rng)
    }

    /// Builds a foliated Delaunay triangulation sampling from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`FoliationError::InsufficientSimplices`] when fewer simplices
    /// than time slices are requested, and [`FoliationError::Engine`] if the
    /// triangulation fails.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Foliation<DelaunayTriangulation<TimeLabel>>, FoliationError> {
        let points = self.generate_points(rng)?;
        let radius = self.config.timeslices.to_f64().unwrap_or(f64::MAX);
        let engine =
            DelaunayTriangulation::with_bounds(Point::default(), radius).map_err(EngineError::from)?;
        self.assemble(engine, &points)
    }

    /// Builds a foliation inside an arbitrary `engine`.
    ///
    /// # Errors
    ///
    /// As [`build_with_rng`](Self::build_with_rng).
    pub fn build_into<E, R>(&self, engine: E, rng: &mut R) -> Result<Foliation<E>, FoliationError>
    where
        E: TriangulationEngine,
        R: Rng + ?Sized,
    {
        let points = self.generate_points(rng)?;
        self.assemble(engine, &points)
    }

    /// Samples the labelled points of every time slice.
    ///
    /// Slice `i` holds `4 * (simplices / timeslices)` points on the sphere of
    /// radius `1 + i`, labelled `1 + i`.
    ///
    /// # Errors
    ///
    /// Returns [`FoliationError::InsufficientSimplices`] when
    /// `simplices / timeslices` is zero.
    pub fn generate_points<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<(Point, TimeLabel)>, FoliationError> {
        let FoliationConfig {
            simplices,
            timeslices,
            ..
        } = self.config;
        let per_timeslice = simplices.checked_div(timeslices).unwrap_or(0);
        if per_timeslice == 0 {
            return Err(FoliationError::InsufficientSimplices {
                simplices,
                timeslices,
            });
        }
        let points_per_timeslice = per_timeslice.saturating_mul(4);

        info!(simplices, timeslices, "Generating universe ...");
        let mut points = Vec::with_capacity(points_per_timeslice.saturating_mul(timeslices));
        for slice in 1..=timeslices {
            let radius = slice.to_f64().unwrap_or(f64::INFINITY);
            debug!(
                "Generating {points_per_timeslice} random points on a 2-sphere of radius {radius}"
            );
            points.extend(make_2_sphere(points_per_timeslice, radius, rng)?);
        }
        Ok(points)
    }

    fn assemble<E: TriangulationEngine>(
        &self,
        mut engine: E,
        points: &[(Point, TimeLabel)],
    ) -> Result<Foliation<E>, FoliationError> {
        let verbose = self.config.verbose;
        let insertion = engine.insert_batch(points)?;
        if insertion.skipped > 0 {
            warn!(
                skipped = insertion.skipped,
                inserted = insertion.inserted,
                "Some points could not be inserted"
            );
        }

        let RepairSummary {
            outcome,
            removed,
            dropped,
            ..
        } = repair_foliation(&mut engine, &self.config.retry, verbose)?;

        let classification = SimplexClassification::classify(&engine);
        let edges = self
            .config
            .classify_edges
            .then(|| EdgeClassification::classify(&engine));

        if verbose {
            for (_, point, label) in engine.vertices() {
                debug!("Point {point} has timeslice {label}");
            }
        }

        let mut report = FoliationReport {
            simplices: self.config.simplices,
            timeslices: self.config.timeslices,
            valid_foliation: false,
            check: FoliationCheck::default(),
            repair: outcome,
            vertices_removed: removed,
            vertices_dropped: dropped,
            dimension: -1,
            vertices: 0,
            cells: 0,
            simplex_counts: SimplexCounts::default(),
            edges: None,
            engine_valid: false,
            insertion,
        };
        let check = check_timeslices(&engine, false);
        report.refresh(&engine, check, classification.counts(), edges);
        info!("{report}");

        Ok(Foliation {
            triangulation: engine,
            classification,
            edges,
            report,
        })
    }
}
