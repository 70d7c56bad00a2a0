//! Delaunay triangulation of a point set in ℝ³ with incremental insertion and
//! vertex removal.
//!
//! The triangulation is embedded in a large bounding tetrahedron whose four
//! corners are ordinary vertices of the underlying [`Tds`] but are hidden from
//! every public view: "finite" vertices, cells, and edges are those that do not
//! touch a bounding corner. Because every inserted point lies strictly inside
//! the bounding cell, insertion never has to extend a convex hull.
//!
//! # Implementation
//!
//! - Point location (visibility walk) - [`locate`]
//! - Conflict region computation (local BFS) - [`find_conflict_region`]
//! - Cavity planning and filling - [`prepare_insertion`], [`apply_insertion`]
//! - Vertex removal by link re-triangulation - [`removal::remove_vertex`]
//!
//! If the bounding cell is too small for a new batch, or a removal hits a
//! degenerate link, the triangulation is rebuilt from its remaining vertices.
//! Vertex keys survive rebuilds; cell keys do not.
//!
//! [`locate`]: crate::core::algorithms::locate::locate
//! [`find_conflict_region`]: crate::core::algorithms::locate::find_conflict_region
//! [`prepare_insertion`]: crate::core::algorithms::incremental_insertion::prepare_insertion
//! [`apply_insertion`]: crate::core::algorithms::incremental_insertion::apply_insertion
//! [`removal::remove_vertex`]: crate::core::algorithms::removal::remove_vertex

use serde::Serialize;
use thiserror::Error;

use crate::core::algorithms::incremental_insertion::{
    InsertionError, apply_insertion, insert_bounding_cell, prepare_insertion,
};
use crate::core::algorithms::removal::{self, RemovalError};
use crate::core::cell::{Cell, CellValidationError};
use crate::core::collections::FastHashSet;
use crate::core::edge::EdgeKey;
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{
    CellKey, Tds, TriangulationValidationError, VertexKey,
};
use crate::core::util::hilbert::{hilbert_bounds, hilbert_sort_by_stable};
use crate::core::vertex::Vertex;
use crate::geometry::point::Point;
use crate::geometry::predicates::{InSphere, insphere};
use crate::geometry::util::{BoundingBall, affine_dimension, bounding_tetrahedron};

/// Ratio between the inradius of the bounding tetrahedron and the radius of
/// the region points may occupy.
pub const BOUNDING_MARGIN: f64 = 1e5;

/// Bits per axis used for Hilbert ordering of insertion batches.
const HILBERT_BITS: u32 = 16;

/// Errors that can occur while constructing a triangulation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TriangulationConstructionError {
    /// The bounds are not a positive finite radius around a finite center.
    #[error("Invalid bounds: center {center}, radius {radius}")]
    InvalidBounds {
        /// Requested center.
        center: Point,
        /// Requested radius.
        radius: f64,
    },
    /// A vertex could not be inserted.
    #[error("Failed to insert vertex {index}: {source}")]
    FailedToInsert {
        /// Position of the vertex in the input.
        index: usize,
        /// The underlying insertion error.
        source: InsertionError,
    },
    /// The bounding cell could not be created.
    #[error("Failed to create bounding cell: {0}")]
    BoundingCell(#[from] InsertionError),
}

/// Outcome of a batch insertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchInsertion {
    /// Number of vertices inserted.
    pub inserted: usize,
    /// Number of vertices rejected (duplicates or degenerate cavities).
    pub skipped: usize,
}

/// Delaunay triangulation in ℝ³ with vertex payload `U`.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::core::delaunay_triangulation::DelaunayTriangulation;
/// use causal_dynamical_triangulations::vertex;
///
/// let vertices = vec![
///     vertex!([0.0, 0.0, 0.0]),
///     vertex!([1.0, 0.0, 0.0]),
///     vertex!([0.0, 1.0, 0.0]),
///     vertex!([0.0, 0.0, 1.0]),
///     vertex!([0.2, 0.2, 0.2]),
/// ];
/// let dt = DelaunayTriangulation::new(&vertices).unwrap();
///
/// assert_eq!(dt.number_of_vertices(), 5);
/// assert_eq!(dt.dim(), 3);
/// assert_eq!(dt.number_of_cells(), 4);
/// assert!(dt.is_valid().is_ok());
/// assert!(dt.validate_delaunay().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct DelaunayTriangulation<U>
where
    U: DataType,
{
    tds: Tds<U>,
    bounding: [VertexKey; 4],
    bounds: BoundingBall,
    /// Hint for next `locate()` call (last inserted cell)
    last_inserted_cell: Option<CellKey>,
    /// Vertices lost by rebuilds since construction
    dropped_vertices: usize,
}

impl<U> DelaunayTriangulation<U>
where
    U: DataType,
{
    /// Creates an empty triangulation accepting points within `radius` of `center`.
    ///
    /// Points outside this region are still accepted later, at the cost of a
    /// rebuild.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationConstructionError::InvalidBounds`] for a
    /// non-finite center or a non-positive radius.
    pub fn with_bounds(center: Point, radius: f64) -> Result<Self, TriangulationConstructionError> {
        if center.validate().is_err() || !(radius.is_finite() && radius > 0.0) {
            return Err(TriangulationConstructionError::InvalidBounds { center, radius });
        }
        let bounds = BoundingBall { center, radius };
        let mut tds = Tds::empty();
        let bounding = insert_bounding_cell(&mut tds, &bounding_corners(&bounds))?;
        Ok(Self {
            tds,
            bounding,
            bounds,
            last_inserted_cell: None,
            dropped_vertices: 0,
        })
    }

    /// Builds the triangulation of `vertices`.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationConstructionError::FailedToInsert`] for the first
    /// vertex that cannot be inserted (for example a duplicate).
    pub fn new(vertices: &[Vertex<U>]) -> Result<Self, TriangulationConstructionError> {
        let ball = BoundingBall::from_points(vertices.iter().map(Vertex::point))
            .unwrap_or(BoundingBall {
                center: Point::default(),
                radius: 1.0,
            });
        let mut dt = Self::with_bounds(ball.center, ball.radius.max(1.0))?;
        for (index, vertex) in vertices.iter().enumerate() {
            dt.insert(*vertex)
                .map_err(|source| TriangulationConstructionError::FailedToInsert { index, source })?;
        }
        Ok(dt)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Inserts a single vertex.
    ///
    /// # Errors
    ///
    /// Returns [`InsertionError`] if the vertex is invalid, duplicates an
    /// existing vertex, or no valid cavity exists. The triangulation is
    /// unchanged in that case.
    pub fn insert(&mut self, vertex: Vertex<U>) -> Result<VertexKey, InsertionError> {
        let point = *vertex.point();
        point.validate()?;
        if !self.bounds.contains(&point) {
            self.grow_bounds(&BoundingBall {
                center: point,
                radius: 0.0,
            })?;
        }
        self.insert_within_bounds(vertex)
    }

    fn insert_within_bounds(&mut self, mut vertex: Vertex<U>) -> Result<VertexKey, InsertionError> {
        let plan = prepare_insertion(&self.tds, vertex.point(), self.last_inserted_cell)?;
        vertex.incident_cell = None;
        let key = self.tds.insert_vertex(vertex);
        match apply_insertion(&mut self.tds, key, &plan) {
            Ok(cells) => {
                self.last_inserted_cell = cells.first().copied();
                Ok(key)
            }
            Err(err) => {
                tracing::warn!(error = %err, "cavity filling failed; rebuilding triangulation");
                self.tds.remove_vertex_entry(key);
                self.rebuild()?;
                Err(err)
            }
        }
    }

    /// Inserts a batch of vertices in Hilbert order.
    ///
    /// Vertices that cannot be inserted are skipped and counted. The bounding
    /// cell is enlarged once up front if the batch reaches beyond it.
    ///
    /// # Errors
    ///
    /// Returns [`InsertionError`] only if the triangulation could not be
    /// rebuilt around the enlarged bounds.
    pub fn insert_batch<I>(&mut self, vertices: I) -> Result<BatchInsertion, InsertionError>
    where
        I: IntoIterator<Item = Vertex<U>>,
    {
        let mut batch: Vec<Vertex<U>> = vertices.into_iter().collect();
        let mut outcome = BatchInsertion::default();

        batch.retain(|v| {
            let valid = v.is_valid().is_ok();
            if !valid {
                tracing::warn!(point = %v.point(), "skipping vertex with non-finite coordinates");
                outcome.skipped += 1;
            }
            valid
        });

        if let Some(ball) = BoundingBall::from_points(batch.iter().map(Vertex::point))
            && !self.bounds.encloses(&ball)
        {
            self.grow_bounds(&ball)?;
        }

        let bounds = hilbert_bounds(batch.iter().map(|v| v.point().coords()));
        hilbert_sort_by_stable(&mut batch, bounds, HILBERT_BITS, |v| *v.point().coords());

        for vertex in batch {
            match self.insert_within_bounds(vertex) {
                Ok(_) => outcome.inserted += 1,
                Err(err @ InsertionError::DuplicateVertex { .. }) => {
                    tracing::debug!(error = %err, "skipping duplicate vertex");
                    outcome.skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping vertex");
                    outcome.skipped += 1;
                }
            }
        }

        if outcome.skipped > 0 {
            tracing::warn!(
                inserted = outcome.inserted,
                skipped = outcome.skipped,
                "batch insertion skipped vertices"
            );
        }
        Ok(outcome)
    }

    /// Removes a vertex and restores the Delaunay property around it.
    ///
    /// Vertex keys of all other vertices stay valid. Cell keys may not.
    ///
    /// # Errors
    ///
    /// Returns [`RemovalError::VertexNotFound`] if `vertex` is not a live
    /// finite vertex.
    pub fn remove_vertex(&mut self, vertex: VertexKey) -> Result<Vertex<U>, RemovalError> {
        if self.bounding.contains(&vertex) || !self.tds.contains_vertex(vertex) {
            return Err(RemovalError::VertexNotFound { vertex_key: vertex });
        }
        self.last_inserted_cell = None;

        match removal::remove_vertex(&mut self.tds, vertex) {
            Ok(removed) => Ok(removed),
            Err(err @ RemovalError::VertexNotFound { .. }) => Err(err),
            Err(err) => {
                tracing::warn!(error = %err, ?vertex, "local removal failed; rebuilding");
                let removed = self
                    .tds
                    .remove_vertex_entry(vertex)
                    .ok_or(RemovalError::VertexNotFound { vertex_key: vertex })?;
                let dropped = self.rebuild()?;
                if dropped > 0 {
                    tracing::warn!(dropped, ?vertex, "rebuild after removal lost vertices");
                }
                Ok(removed)
            }
        }
    }

    fn grow_bounds(&mut self, ball: &BoundingBall) -> Result<(), InsertionError> {
        let grown = self.bounds.union(ball);
        self.bounds = BoundingBall {
            center: grown.center,
            radius: grown.radius * 2.0,
        };
        tracing::debug!(radius = self.bounds.radius, "enlarging bounding cell");
        self.rebuild().map(|_| ())
    }

    /// Re-triangulates every finite vertex inside a fresh bounding cell.
    ///
    /// Returns the number of vertices that could not be re-inserted; they are
    /// removed.
    fn rebuild(&mut self) -> Result<usize, InsertionError> {
        let mut keep: Vec<(VertexKey, Point)> = self
            .tds
            .vertices()
            .filter(|(k, _)| !self.bounding.contains(k))
            .map(|(k, v)| (k, *v.point()))
            .collect();
        for corner in self.bounding {
            self.tds.remove_vertex_entry(corner);
        }
        self.tds.clear_cells();
        self.last_inserted_cell = None;
        self.bounding = insert_bounding_cell(&mut self.tds, &bounding_corners(&self.bounds))?;

        keep.sort_unstable_by_key(|(k, _)| *k);
        let bounds = hilbert_bounds(keep.iter().map(|(_, p)| p.coords()));
        hilbert_sort_by_stable(&mut keep, bounds, HILBERT_BITS, |(_, p)| *p.coords());

        let mut dropped = 0;
        for (key, point) in keep {
            let result = prepare_insertion(&self.tds, &point, self.last_inserted_cell)
                .and_then(|plan| apply_insertion(&mut self.tds, key, &plan));
            match result {
                Ok(cells) => self.last_inserted_cell = cells.first().copied(),
                Err(err) => {
                    tracing::warn!(error = %err, ?key, "dropping vertex during rebuild");
                    self.tds.remove_vertex_entry(key);
                    dropped += 1;
                }
            }
        }
        self.dropped_vertices += dropped;
        tracing::debug!(
            vertices = self.number_of_vertices(),
            cells = self.tds.number_of_cells(),
            dropped,
            "rebuilt triangulation"
        );
        Ok(dropped)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The underlying data structure, including the bounding corners.
    #[must_use]
    pub const fn tds(&self) -> &Tds<U> {
        &self.tds
    }

    /// Region in which points can be inserted without a rebuild.
    #[must_use]
    pub const fn bounds(&self) -> &BoundingBall {
        &self.bounds
    }

    /// Vertices that rebuilds failed to re-insert, over the lifetime of the
    /// triangulation.
    ///
    /// Removal and out-of-bounds insertion may fall back to a full rebuild;
    /// a vertex the rebuild cannot place is discarded and counted here.
    #[must_use]
    pub const fn dropped_vertices(&self) -> usize {
        self.dropped_vertices
    }

    /// Structural generation counter; changes on every mutation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.tds.generation()
    }

    /// Whether `vertex` is one of the hidden bounding corners.
    #[must_use]
    pub fn is_bounding_vertex(&self, vertex: VertexKey) -> bool {
        self.bounding.contains(&vertex)
    }

    /// Whether `cell` is live and touches no bounding corner.
    #[must_use]
    pub fn is_finite_cell(&self, cell: CellKey) -> bool {
        self.tds
            .get_cell(cell)
            .is_some_and(|c| c.vertices().iter().all(|v| !self.bounding.contains(v)))
    }

    /// Whether `vertex` is a live finite vertex.
    #[must_use]
    pub fn contains_vertex(&self, vertex: VertexKey) -> bool {
        !self.bounding.contains(&vertex) && self.tds.contains_vertex(vertex)
    }

    /// Finite vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex<U>)> {
        self.tds
            .vertices()
            .filter(|(k, _)| !self.bounding.contains(k))
    }

    /// Finite cells.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> {
        self.tds
            .cells()
            .filter(|(_, c)| c.vertices().iter().all(|v| !self.bounding.contains(v)))
    }

    /// Distinct edges of finite cells, in key order.
    #[must_use]
    pub fn edges(&self) -> Vec<EdgeKey> {
        let mut edges: FastHashSet<EdgeKey> = FastHashSet::default();
        for (_, cell) in self.cells() {
            let v = cell.vertices();
            for i in 0..4 {
                for j in (i + 1)..4 {
                    edges.insert(EdgeKey::new(v[i], v[j]));
                }
            }
        }
        let mut edges: Vec<EdgeKey> = edges.into_iter().collect();
        edges.sort_unstable();
        edges
    }

    /// Number of finite vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        let corners = self
            .bounding
            .iter()
            .filter(|&&k| self.tds.contains_vertex(k))
            .count();
        self.tds.number_of_vertices() - corners
    }

    /// Number of finite cells.
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells().count()
    }

    /// Number of finite edges.
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.edges().len()
    }

    /// Dimension of the triangulation: `3` once a finite cell exists,
    /// otherwise the affine dimension of the vertices (`-1` when empty).
    #[must_use]
    pub fn dim(&self) -> i32 {
        if self.cells().next().is_some() {
            return 3;
        }
        let points: Vec<Point> = self.vertices().map(|(_, v)| *v.point()).collect();
        affine_dimension(&points)
    }

    /// Structural validity of one cell.
    ///
    /// # Errors
    ///
    /// Returns the [`CellValidationError`] describing the defect.
    pub fn validate_cell(&self, cell: CellKey) -> Result<(), CellValidationError> {
        self.tds.validate_cell(cell)
    }

    /// Whether `cell` is live and structurally valid.
    #[must_use]
    pub fn is_cell_valid(&self, cell: CellKey) -> bool {
        self.validate_cell(cell).is_ok()
    }

    /// Validates every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns the first [`TriangulationValidationError`] found.
    pub fn is_valid(&self) -> Result<(), TriangulationValidationError> {
        self.tds.is_valid()
    }

    /// Checks the empty-circumsphere property across every interior facet.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationValidationError::DelaunayViolation`] listing the
    /// number of violating facets.
    pub fn validate_delaunay(&self) -> Result<(), TriangulationValidationError> {
        let mut violations = 0_usize;
        let mut first = None;
        for (key, cell) in self.tds.cells() {
            let Some(points) = self.tds.cell_points(key) else {
                continue;
            };
            for neighbor in cell.neighbors().iter().flatten() {
                let Some(other) = self.tds.get_cell(*neighbor) else {
                    continue;
                };
                let Some(apex) = other
                    .vertices()
                    .iter()
                    .find(|v| !cell.contains_vertex(**v))
                    .and_then(|&v| self.tds.vertex_point(v))
                else {
                    continue;
                };
                if insphere(&points, &apex) == InSphere::INSIDE {
                    violations += 1;
                    first.get_or_insert(key);
                }
            }
        }
        match first {
            None => Ok(()),
            Some(cell) => Err(TriangulationValidationError::DelaunayViolation {
                message: format!(
                    "{violations} facet(s) violate the empty circumsphere property, first at cell {cell:?}"
                ),
            }),
        }
    }
}

fn bounding_corners(bounds: &BoundingBall) -> [Point; 4] {
    bounding_tetrahedron(&bounds.center, bounds.radius.max(1.0) * BOUNDING_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vertices(n: usize, seed: u64) -> Vec<Vertex<u32>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let label = u32::try_from(i).unwrap();
                vertex!(
                    [
                        rng.random_range(-1.0..1.0),
                        rng.random_range(-1.0..1.0),
                        rng.random_range(-1.0..1.0)
                    ],
                    label
                )
            })
            .collect()
    }

    #[test]
    fn empty_triangulation_has_dimension_minus_one() {
        let dt: DelaunayTriangulation<u32> =
            DelaunayTriangulation::with_bounds(Point::default(), 1.0).unwrap();
        assert_eq!(dt.dim(), -1);
        assert_eq!(dt.number_of_vertices(), 0);
        assert_eq!(dt.number_of_cells(), 0);
        assert_eq!(dt.number_of_edges(), 0);
        assert!(dt.is_valid().is_ok());
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        assert!(matches!(
            DelaunayTriangulation::<u32>::with_bounds(Point::default(), 0.0),
            Err(TriangulationConstructionError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn single_tetrahedron_is_finite() {
        let dt = DelaunayTriangulation::new(&[
            vertex!([0.0, 0.0, 0.0]),
            vertex!([1.0, 0.0, 0.0]),
            vertex!([0.0, 1.0, 0.0]),
            vertex!([0.0, 0.0, 1.0]),
        ])
        .unwrap();
        assert_eq!(dt.number_of_cells(), 1);
        assert_eq!(dt.number_of_edges(), 6);
        assert_eq!(dt.dim(), 3);
    }

    #[test]
    fn coplanar_points_have_no_finite_cells() {
        let dt = DelaunayTriangulation::new(&[
            vertex!([0.0, 0.0, 0.0]),
            vertex!([1.0, 0.0, 0.0]),
            vertex!([0.0, 1.0, 0.0]),
            vertex!([1.0, 1.0, 0.0]),
        ])
        .unwrap();
        assert_eq!(dt.number_of_cells(), 0);
        assert_eq!(dt.dim(), 2);
        assert!(dt.is_valid().is_ok());
    }

    #[test]
    fn batch_insertion_is_delaunay() {
        let mut dt = DelaunayTriangulation::with_bounds(Point::default(), 2.0).unwrap();
        let outcome = dt.insert_batch(random_vertices(200, 5)).unwrap();
        assert_eq!(outcome, BatchInsertion { inserted: 200, skipped: 0 });
        assert_eq!(dt.number_of_vertices(), 200);
        assert!(dt.is_valid().is_ok());
        assert!(dt.validate_delaunay().is_ok());
        assert_eq!(dt.dim(), 3);
    }

    #[test]
    fn duplicates_are_skipped_in_batches() {
        let mut dt = DelaunayTriangulation::with_bounds(Point::default(), 1.0).unwrap();
        let mut batch = random_vertices(20, 9);
        batch.push(batch[3]);
        let outcome = dt.insert_batch(batch).unwrap();
        assert_eq!(outcome.inserted, 20);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn points_outside_bounds_trigger_growth() {
        let mut dt = DelaunayTriangulation::with_bounds(Point::default(), 1.0).unwrap();
        dt.insert_batch(random_vertices(30, 2)).unwrap();
        let before: Vec<VertexKey> = dt.vertices().map(|(k, _)| k).collect();

        let far = dt.insert(vertex!([1.0e6, 0.0, 0.0], 99_u32)).unwrap();
        assert!(dt.bounds().contains(&Point::new([1.0e6, 0.0, 0.0])));
        assert!(dt.contains_vertex(far));
        // Vertex keys survive the rebuild
        assert!(before.iter().all(|&k| dt.contains_vertex(k)));
        assert!(dt.is_valid().is_ok());
        assert!(dt.validate_delaunay().is_ok());
    }

    #[test]
    fn removal_preserves_delaunay_property() {
        let mut dt = DelaunayTriangulation::with_bounds(Point::default(), 2.0).unwrap();
        dt.insert_batch(random_vertices(120, 17)).unwrap();
        let victims: Vec<VertexKey> = dt.vertices().map(|(k, _)| k).step_by(3).collect();
        for &v in &victims {
            let removed = dt.remove_vertex(v).unwrap();
            assert!(removed.data.is_some());
            assert!(!dt.contains_vertex(v));
        }
        assert_eq!(dt.number_of_vertices(), 120 - victims.len());
        assert_eq!(dt.dropped_vertices(), 0);
        assert!(dt.is_valid().is_ok());
        assert!(dt.validate_delaunay().is_ok());
    }

    #[test]
    fn removing_missing_or_bounding_vertex_fails() {
        let mut dt: DelaunayTriangulation<u32> =
            DelaunayTriangulation::new(&[vertex!([0.0, 0.0, 0.0], 1_u32)]).unwrap();
        let corner = dt
            .tds()
            .vertex_keys()
            .find(|&k| dt.is_bounding_vertex(k))
            .unwrap();
        assert!(matches!(
            dt.remove_vertex(corner),
            Err(RemovalError::VertexNotFound { .. })
        ));
        let (key, _) = dt.vertices().next().unwrap();
        dt.remove_vertex(key).unwrap();
        assert!(matches!(
            dt.remove_vertex(key),
            Err(RemovalError::VertexNotFound { .. })
        ));
        assert_eq!(dt.dim(), -1);
    }

    #[test]
    fn generation_changes_on_mutation_only() {
        let mut dt = DelaunayTriangulation::with_bounds(Point::default(), 1.0).unwrap();
        dt.insert_batch(random_vertices(10, 4)).unwrap();
        let g = dt.generation();
        let _ = dt.number_of_cells();
        let _ = dt.edges();
        assert_eq!(dt.generation(), g);
        let (key, _) = dt.vertices().next().unwrap();
        dt.remove_vertex(key).unwrap();
        assert_ne!(dt.generation(), g);
    }
}
