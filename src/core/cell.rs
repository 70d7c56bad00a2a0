//! Tetrahedral cells of a 3D triangulation.
//!
//! A [`Cell`] stores four vertex keys and, for each vertex, the key of the
//! neighbouring cell across the opposite facet: `neighbors[i]` shares every
//! vertex of this cell except `vertices[i]`. Cells live in the triangulation
//! data structure and are addressed by [`CellKey`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::collections::FacetVertices;
use crate::core::triangulation_data_structure::{CellKey, VertexKey};
use crate::core::vertex::VertexValidationError;

/// Errors that can occur during cell validation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CellValidationError {
    /// The cell key does not refer to a live cell.
    #[error("Cell {cell_key:?} is not present in the triangulation")]
    MissingCell {
        /// The key that failed to resolve.
        cell_key: CellKey,
    },
    /// A vertex key of the cell does not refer to a live vertex.
    #[error("Cell references missing vertex {vertex_key:?}")]
    MissingVertex {
        /// The dangling vertex key.
        vertex_key: VertexKey,
    },
    /// The cell has an invalid vertex.
    #[error("Invalid vertex: {source}")]
    InvalidVertex {
        /// The underlying vertex validation error.
        #[from]
        source: VertexValidationError,
    },
    /// The cell contains duplicate vertices.
    #[error("Duplicate vertices: cell contains non-unique vertices which is not allowed")]
    DuplicateVertices,
    /// The four vertices are coplanar or the cell is stored with negative orientation.
    #[error("Degenerate or inverted simplex: orientation is {orientation}")]
    BadOrientation {
        /// The orientation that was found.
        orientation: String,
    },
    /// A neighbor key does not refer to a live cell.
    #[error("Neighbor {neighbor:?} at index {index} is not present in the triangulation")]
    MissingNeighbor {
        /// Facet index of the dangling neighbor.
        index: usize,
        /// The dangling key.
        neighbor: CellKey,
    },
    /// A neighbor does not point back, or does not share the facet it should.
    #[error("Neighbor {neighbor:?} at index {index} is not mutually adjacent across the shared facet")]
    InconsistentNeighbor {
        /// Facet index of the inconsistent neighbor.
        index: usize,
        /// The inconsistent neighbor.
        neighbor: CellKey,
    },
}

/// A tetrahedron: four vertex keys plus the four adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    vertices: [VertexKey; 4],
    /// Adjacent cells; `None` on the outer boundary.
    #[serde(skip)]
    pub(crate) neighbors: [Option<CellKey>; 4],
}

impl Cell {
    /// Creates a detached cell over the given vertices.
    #[must_use]
    pub const fn new(vertices: [VertexKey; 4]) -> Self {
        Self {
            vertices,
            neighbors: [None; 4],
        }
    }

    /// The four vertex keys of this cell.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &[VertexKey; 4] {
        &self.vertices
    }

    /// The four neighbor slots of this cell.
    #[inline]
    #[must_use]
    pub const fn neighbors(&self) -> &[Option<CellKey>; 4] {
        &self.neighbors
    }

    /// Whether `vertex` is one of this cell's corners.
    #[inline]
    #[must_use]
    pub fn contains_vertex(&self, vertex: VertexKey) -> bool {
        self.vertices.contains(&vertex)
    }

    /// Index of `vertex` within this cell.
    #[inline]
    #[must_use]
    pub fn vertex_index(&self, vertex: VertexKey) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }

    /// Index of the facet shared with `neighbor`.
    #[inline]
    #[must_use]
    pub fn neighbor_index(&self, neighbor: CellKey) -> Option<usize> {
        self.neighbors.iter().position(|&n| n == Some(neighbor))
    }

    /// The three vertices of the facet opposite `vertices[index]`, in cell order.
    ///
    /// # Panics
    ///
    /// Panics if `index > 3`.
    #[must_use]
    pub fn facet_vertices(&self, index: usize) -> FacetVertices {
        let mut facet = [VertexKey::default(); 3];
        let mut slot = 0;
        for (i, &v) in self.vertices.iter().enumerate() {
            if i != index {
                facet[slot] = v;
                slot += 1;
            }
        }
        facet
    }

    /// Checks the purely combinatorial invariants of the cell: four distinct vertices.
    ///
    /// # Errors
    ///
    /// Returns [`CellValidationError::DuplicateVertices`] if two corners coincide.
    pub fn is_valid(&self) -> Result<(), CellValidationError> {
        for i in 0..4 {
            for j in (i + 1)..4 {
                if self.vertices[i] == self.vertices[j] {
                    return Err(CellValidationError::DuplicateVertices);
                }
            }
        }
        Ok(())
    }

    /// Swaps two corners, inverting the orientation of the cell.
    pub(crate) fn swap_vertices(&mut self, a: usize, b: usize) {
        self.vertices.swap(a, b);
        self.neighbors.swap(a, b);
    }

    pub(crate) const fn set_vertex(&mut self, index: usize, vertex: VertexKey) {
        self.vertices[index] = vertex;
    }
}
