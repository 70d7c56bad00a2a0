//! Combinatorial triangulation data structure for 3D simplicial complexes.
//!
//! [`Tds`] owns the vertices and tetrahedral cells of a triangulation and the
//! adjacency between them. It knows nothing about the Delaunay property; the
//! geometric algorithms in [`crate::core::algorithms`] mutate it through the
//! crate-private primitives below and keep the following invariants:
//!
//! - **Cell validity** – every cell has four distinct, live vertices and is
//!   stored with positive orientation.
//! - **Neighbor consistency** – `neighbors[i]` of a cell shares the facet
//!   opposite `vertices[i]` and points back.
//! - **Facet sharing** – every triangular facet belongs to at most two cells.
//! - **Incidence** – every vertex's `incident_cell` contains that vertex.
//!
//! # Keys and generations
//!
//! Vertices and cells are addressed by slotmap keys. A key of a removed entity
//! never resolves again, even after its slot is reused, so handles held across
//! a mutation fail closed instead of aliasing new entities. In addition, every
//! structural mutation bumps [`Tds::generation`], which lets derived data
//! (such as simplex classifications) detect that it has gone stale.

#![forbid(unsafe_code)]

use slotmap::new_key_type;
use thiserror::Error;

use crate::core::cell::{Cell, CellValidationError};
use crate::core::collections::{
    CellKeySet, FastHashMap, FastHashSet, StorageMap, canonical_facet,
};
use crate::core::traits::data_type::DataType;
use crate::core::vertex::Vertex;
use crate::geometry::point::Point;
use crate::geometry::predicates::{Orientation, simplex_orientation};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during triangulation validation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TriangulationValidationError {
    /// The triangulation contains an invalid cell.
    #[error("Invalid cell {cell_key:?}: {source}")]
    InvalidCell {
        /// The key of the invalid cell.
        cell_key: CellKey,
        /// The underlying cell validation error.
        source: CellValidationError,
    },
    /// A facet is shared by more than two cells.
    #[error("Facet sharing violated: {message}")]
    FacetSharing {
        /// Description of the offending facet.
        message: String,
    },
    /// The triangulation contains duplicate cells.
    #[error("Duplicate cells detected: {message}")]
    DuplicateCells {
        /// Description of the duplicate cell validation failure.
        message: String,
    },
    /// A vertex's incident cell is missing or does not contain the vertex.
    #[error("Vertex {vertex_key:?} has an invalid incident cell: {message}")]
    InvalidIncidentCell {
        /// The vertex with broken incidence.
        vertex_key: VertexKey,
        /// Description of the failure.
        message: String,
    },
    /// The triangulation violates the Delaunay empty circumsphere property.
    #[error("Delaunay invariant violated: {message}")]
    DelaunayViolation {
        /// Human-readable description of the Delaunay violation(s).
        message: String,
    },
}

// =============================================================================
// KEYS
// =============================================================================

new_key_type! {
    /// Key type for accessing vertices in the storage map.
    ///
    /// Each `VertexKey` corresponds to exactly one vertex and stays valid until
    /// that vertex is removed; it never resolves to a different vertex later.
    pub struct VertexKey;
}

new_key_type! {
    /// Key type for accessing cells in the storage map.
    ///
    /// Cells are created and destroyed by every insertion and removal, so a
    /// `CellKey` should be treated as valid only until the next mutation.
    pub struct CellKey;
}

// =============================================================================
// TDS
// =============================================================================

/// Vertices, cells, and their adjacency.
#[derive(Clone, Debug)]
pub struct Tds<U>
where
    U: DataType,
{
    vertices: StorageMap<VertexKey, Vertex<U>>,
    cells: StorageMap<CellKey, Cell>,
    /// Incremented on every structural modification. Runtime-only.
    generation: u64,
}

impl<U> Default for Tds<U>
where
    U: DataType,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<U> Tds<U>
where
    U: DataType,
{
    /// Creates an empty data structure.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            vertices: StorageMap::with_key(),
            cells: StorageMap::with_key(),
            generation: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Iterates over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex<U>)> {
        self.vertices.iter()
    }

    /// Iterates over all cells.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> {
        self.cells.iter()
    }

    /// Iterates over all vertex keys.
    pub fn vertex_keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.keys()
    }

    /// Iterates over all cell keys.
    pub fn cell_keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.cells.keys()
    }

    /// Number of vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of cells.
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Looks up a vertex.
    #[must_use]
    pub fn get_vertex(&self, key: VertexKey) -> Option<&Vertex<U>> {
        self.vertices.get(key)
    }

    /// Looks up a cell.
    #[must_use]
    pub fn get_cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    /// Whether `key` refers to a live vertex.
    #[must_use]
    pub fn contains_vertex(&self, key: VertexKey) -> bool {
        self.vertices.contains_key(key)
    }

    /// Whether `key` refers to a live cell.
    #[must_use]
    pub fn contains_cell(&self, key: CellKey) -> bool {
        self.cells.contains_key(key)
    }

    /// Embedding point of a vertex.
    #[must_use]
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point> {
        self.vertices.get(key).map(|v| *v.point())
    }

    /// The four corner points of a cell, in cell order.
    #[must_use]
    pub fn cell_points(&self, key: CellKey) -> Option<[Point; 4]> {
        let cell = self.cells.get(key)?;
        let v = cell.vertices();
        Some([
            self.vertex_point(v[0])?,
            self.vertex_point(v[1])?,
            self.vertex_point(v[2])?,
            self.vertex_point(v[3])?,
        ])
    }

    /// The current generation counter.
    ///
    /// Any two calls that return the same value bracket a window in which the
    /// structure was not modified.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// All cells incident to `vertex`.
    ///
    /// Walks the star from the vertex's incident cell across facets that
    /// contain the vertex; falls back to a full scan if the incident cell is
    /// missing.
    #[must_use]
    pub fn find_cells_containing_vertex(&self, vertex: VertexKey) -> Vec<CellKey> {
        let start = self
            .vertices
            .get(vertex)
            .and_then(|v| v.incident_cell)
            .filter(|&c| {
                self.cells
                    .get(c)
                    .is_some_and(|cell| cell.contains_vertex(vertex))
            });

        let Some(start) = start else {
            return self
                .cells
                .iter()
                .filter(|(_, cell)| cell.contains_vertex(vertex))
                .map(|(key, _)| key)
                .collect();
        };

        let mut star = vec![start];
        let mut seen: CellKeySet = CellKeySet::default();
        seen.insert(start);
        let mut cursor = 0;
        while cursor < star.len() {
            let current = star[cursor];
            cursor += 1;
            let Some(cell) = self.cells.get(current) else {
                continue;
            };
            for (i, neighbor) in cell.neighbors().iter().enumerate() {
                // Only facets that contain `vertex` lead to other cells of the star
                if cell.vertices()[i] == vertex {
                    continue;
                }
                if let Some(n) = *neighbor
                    && seen.insert(n)
                {
                    star.push(n);
                }
            }
        }
        star
    }

    // -------------------------------------------------------------------------
    // Mutation primitives
    // -------------------------------------------------------------------------

    #[inline]
    const fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn insert_vertex(&mut self, vertex: Vertex<U>) -> VertexKey {
        self.bump_generation();
        self.vertices.insert(vertex)
    }

    pub(crate) fn remove_vertex_entry(&mut self, key: VertexKey) -> Option<Vertex<U>> {
        self.bump_generation();
        self.vertices.remove(key)
    }

    pub(crate) fn insert_cell(&mut self, cell: Cell) -> CellKey {
        self.bump_generation();
        self.cells.insert(cell)
    }

    /// Removes a cell without touching its neighbors' back-pointers.
    pub(crate) fn remove_cell(&mut self, key: CellKey) -> Option<Cell> {
        self.bump_generation();
        self.cells.remove(key)
    }

    pub(crate) fn clear_cells(&mut self) {
        self.bump_generation();
        self.cells.clear();
        for (_, vertex) in &mut self.vertices {
            vertex.incident_cell = None;
        }
    }

    pub(crate) fn get_cell_mut(&mut self, key: CellKey) -> Option<&mut Cell> {
        self.cells.get_mut(key)
    }

    pub(crate) fn get_vertex_mut(&mut self, key: VertexKey) -> Option<&mut Vertex<U>> {
        self.vertices.get_mut(key)
    }

    /// Points every corner of `cell` at it.
    pub(crate) fn claim_incidence(&mut self, cell: CellKey) {
        let Some(vertices) = self.cells.get(cell).map(|c| *c.vertices()) else {
            return;
        };
        for v in vertices {
            if let Some(vertex) = self.vertices.get_mut(v) {
                vertex.incident_cell = Some(cell);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Structural validity of a single cell.
    ///
    /// Checks that the cell exists, has four distinct live vertices with
    /// finite coordinates, is positively oriented, and that each neighbor is
    /// live, shares the opposite facet, and points back.
    ///
    /// # Errors
    ///
    /// Returns the first [`CellValidationError`] found.
    pub fn validate_cell(&self, key: CellKey) -> Result<(), CellValidationError> {
        let cell = self
            .cells
            .get(key)
            .ok_or(CellValidationError::MissingCell { cell_key: key })?;
        cell.is_valid()?;

        for &v in cell.vertices() {
            let vertex = self
                .vertices
                .get(v)
                .ok_or(CellValidationError::MissingVertex { vertex_key: v })?;
            vertex.is_valid()?;
        }

        let points = self
            .cell_points(key)
            .ok_or(CellValidationError::MissingCell { cell_key: key })?;
        let orientation = simplex_orientation(&points);
        if orientation != Orientation::POSITIVE {
            return Err(CellValidationError::BadOrientation {
                orientation: orientation.to_string(),
            });
        }

        for (index, neighbor) in cell.neighbors().iter().enumerate() {
            let Some(neighbor) = *neighbor else {
                continue;
            };
            let other = self
                .cells
                .get(neighbor)
                .ok_or(CellValidationError::MissingNeighbor { index, neighbor })?;
            let shares_facet = cell
                .facet_vertices(index)
                .iter()
                .all(|&v| other.contains_vertex(v));
            let points_back = other
                .neighbor_index(key)
                .is_some_and(|j| !cell.contains_vertex(other.vertices()[j]));
            if !shares_facet || !points_back {
                return Err(CellValidationError::InconsistentNeighbor { index, neighbor });
            }
        }

        Ok(())
    }

    /// Validates every structural invariant of the data structure.
    ///
    /// # Errors
    ///
    /// Returns the first [`TriangulationValidationError`] found.
    pub fn is_valid(&self) -> Result<(), TriangulationValidationError> {
        for key in self.cells.keys() {
            self.validate_cell(key)
                .map_err(|source| TriangulationValidationError::InvalidCell {
                    cell_key: key,
                    source,
                })?;
        }

        let mut facet_counts: FastHashMap<[VertexKey; 3], usize> = FastHashMap::default();
        let mut seen_cells: FastHashSet<[VertexKey; 4]> = FastHashSet::default();
        for (key, cell) in &self.cells {
            let mut sorted = *cell.vertices();
            sorted.sort_unstable();
            if !seen_cells.insert(sorted) {
                return Err(TriangulationValidationError::DuplicateCells {
                    message: format!("cell {key:?} repeats vertex set {sorted:?}"),
                });
            }
            for i in 0..4 {
                let count = facet_counts
                    .entry(canonical_facet(cell.facet_vertices(i)))
                    .or_insert(0);
                *count += 1;
                if *count > 2 {
                    return Err(TriangulationValidationError::FacetSharing {
                        message: format!(
                            "facet {:?} of cell {key:?} is shared by more than two cells",
                            cell.facet_vertices(i)
                        ),
                    });
                }
            }
        }

        if !self.cells.is_empty() {
            for (vertex_key, vertex) in &self.vertices {
                let Some(incident) = vertex.incident_cell else {
                    return Err(TriangulationValidationError::InvalidIncidentCell {
                        vertex_key,
                        message: "no incident cell assigned".to_string(),
                    });
                };
                if !self
                    .cells
                    .get(incident)
                    .is_some_and(|c| c.contains_vertex(vertex_key))
                {
                    return Err(TriangulationValidationError::InvalidIncidentCell {
                        vertex_key,
                        message: format!("incident cell {incident:?} does not contain the vertex"),
                    });
                }
            }
        }

        Ok(())
    }
}
