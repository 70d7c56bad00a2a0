//! Triangular facets of tetrahedral cells.
//!
//! Facets are not stored; a facet is described by a cell and the index of the
//! vertex opposite to it, similar to
//! [CGAL](https://doc.cgal.org/latest/TDS_3/index.html#title3). Every facet is
//! shared by at most two cells.

use crate::core::collections::{FacetIndex, FacetVertices};
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{CellKey, Tds, VertexKey};

/// Lightweight handle to the facet of `cell_key` opposite `vertices[facet_index]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacetHandle {
    cell_key: CellKey,
    facet_index: FacetIndex,
}

impl FacetHandle {
    /// Creates a handle; `facet_index` must be in `0..=3`.
    #[inline]
    #[must_use]
    pub const fn new(cell_key: CellKey, facet_index: FacetIndex) -> Self {
        debug_assert!(facet_index < 4);
        Self {
            cell_key,
            facet_index,
        }
    }

    /// The cell this facet belongs to.
    #[inline]
    #[must_use]
    pub const fn cell_key(self) -> CellKey {
        self.cell_key
    }

    /// Index of the vertex opposite the facet.
    #[inline]
    #[must_use]
    pub const fn facet_index(self) -> FacetIndex {
        self.facet_index
    }

    /// The three vertices of the facet, in cell order.
    #[must_use]
    pub fn vertices<U>(self, tds: &Tds<U>) -> Option<FacetVertices>
    where
        U: DataType,
    {
        tds.get_cell(self.cell_key)
            .map(|cell| cell.facet_vertices(usize::from(self.facet_index)))
    }

    /// The vertex opposite the facet.
    #[must_use]
    pub fn opposite_vertex<U>(self, tds: &Tds<U>) -> Option<VertexKey>
    where
        U: DataType,
    {
        tds.get_cell(self.cell_key)
            .map(|cell| cell.vertices()[usize::from(self.facet_index)])
    }

    /// The cell across the facet, if any.
    #[must_use]
    pub fn neighbor<U>(self, tds: &Tds<U>) -> Option<CellKey>
    where
        U: DataType,
    {
        tds.get_cell(self.cell_key)
            .and_then(|cell| cell.neighbors()[usize::from(self.facet_index)])
    }
}
