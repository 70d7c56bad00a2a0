//! The capability interface the foliation layer needs from a 3D triangulation.
//!
//! The foliation pipeline never touches [`Tds`](crate::core::triangulation_data_structure::Tds)
//! directly. It inserts labelled points, removes vertices, and inspects
//! finite vertices, cells, and edges through [`TriangulationEngine`], which
//! keeps the validator, repairer, and classifiers testable against a small
//! in-memory engine.

use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

use crate::core::algorithms::incremental_insertion::InsertionError;
use crate::core::algorithms::removal::RemovalError;
use crate::core::delaunay_triangulation::{
    BatchInsertion, DelaunayTriangulation, TriangulationConstructionError,
};
use crate::core::triangulation_data_structure::{CellKey, VertexKey};
use crate::core::vertex::Vertex;
use crate::geometry::point::Point;

/// Integer time coordinate of a vertex: the index of the spatial slice it
/// belongs to.
pub type TimeLabel = u32;

/// Errors surfaced by a [`TriangulationEngine`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    /// The engine could not be created.
    #[error("Engine construction failed: {0}")]
    Construction(#[from] TriangulationConstructionError),
    /// A batch insertion failed as a whole.
    #[error("Batch insertion failed: {0}")]
    Insertion(#[from] InsertionError),
    /// A vertex could not be removed.
    #[error("Vertex removal failed: {0}")]
    Removal(#[from] RemovalError),
    /// A handle did not name a live vertex.
    #[error("Unknown vertex {vertex}")]
    UnknownVertex {
        /// The handle, rendered for the error message.
        vertex: String,
    },
}

/// Operations a 3D triangulation must offer to host a foliation.
///
/// Every iterator reports *finite* elements only: auxiliary vertices an
/// engine uses internally, and the cells and edges touching them, are never
/// visible. Any structural mutation must change [`generation`](Self::generation).
pub trait TriangulationEngine {
    /// Vertex handle. Must stay stable while the vertex is live.
    type VertexHandle: Copy + Eq + Hash + Ord + Debug;
    /// Cell handle. May be invalidated by any mutation.
    type CellHandle: Copy + Eq + Hash + Ord + Debug;

    /// Inserts a batch of labelled points.
    ///
    /// Points the engine cannot place (duplicates, degeneracies) are skipped
    /// and counted rather than failing the batch.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the batch as a whole could not be
    /// processed.
    fn insert_batch(&mut self, points: &[(Point, TimeLabel)])
    -> Result<BatchInsertion, EngineError>;

    /// Removes a vertex and re-triangulates the hole it leaves.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the vertex is unknown or cannot be
    /// removed.
    fn remove_vertex(&mut self, vertex: Self::VertexHandle) -> Result<(), EngineError>;

    /// Finite vertices with their point and label.
    fn vertices(&self) -> impl Iterator<Item = (Self::VertexHandle, Point, TimeLabel)> + '_;

    /// Finite cells with their four vertices.
    fn cells(&self) -> impl Iterator<Item = (Self::CellHandle, [Self::VertexHandle; 4])> + '_;

    /// Finite edges, each reported once.
    fn edges(&self) -> impl Iterator<Item = (Self::VertexHandle, Self::VertexHandle)> + '_;

    /// Whether `cell` is still a live finite cell.
    fn contains_cell(&self, cell: Self::CellHandle) -> bool;

    /// The vertices of a live finite cell.
    fn cell_vertices(&self, cell: Self::CellHandle) -> Option<[Self::VertexHandle; 4]>;

    /// Time label of a live vertex.
    fn label(&self, vertex: Self::VertexHandle) -> Option<TimeLabel>;

    /// Embedding of a live vertex.
    fn point(&self, vertex: Self::VertexHandle) -> Option<Point>;

    /// Whether `cell` is live and structurally sound.
    fn is_cell_valid(&self, cell: Self::CellHandle) -> bool;

    /// Whether the whole triangulation is structurally sound.
    fn is_valid(&self) -> bool;

    /// `3` once a finite cell exists, otherwise the affine dimension of the
    /// vertices (`-1` when empty).
    fn dim(&self) -> i32;

    /// Number of finite vertices.
    fn number_of_vertices(&self) -> usize;

    /// Number of finite cells.
    fn number_of_cells(&self) -> usize;

    /// Number of finite edges.
    fn number_of_edges(&self) -> usize;

    /// Mutation counter.
    fn generation(&self) -> u64;

    /// Vertices the engine discarded on its own, besides those passed to
    /// [`remove_vertex`](Self::remove_vertex).
    fn dropped_vertices(&self) -> usize;

    /// Labels of the four vertices of `cell`, in cell order.
    fn cell_labels(&self, cell: Self::CellHandle) -> Option<[TimeLabel; 4]> {
        let [a, b, c, d] = self.cell_vertices(cell)?;
        Some([
            self.label(a)?,
            self.label(b)?,
            self.label(c)?,
            self.label(d)?,
        ])
    }
}

impl TriangulationEngine for DelaunayTriangulation<TimeLabel> {
    type VertexHandle = VertexKey;
    type CellHandle = CellKey;

    fn insert_batch(
        &mut self,
        points: &[(Point, TimeLabel)],
    ) -> Result<BatchInsertion, EngineError> {
        let vertices = points
            .iter()
            .map(|&(point, label)| Vertex::new(point, Some(label)));
        Ok(Self::insert_batch(self, vertices)?)
    }

    fn remove_vertex(&mut self, vertex: VertexKey) -> Result<(), EngineError> {
        Self::remove_vertex(self, vertex)?;
        Ok(())
    }

    fn vertices(&self) -> impl Iterator<Item = (VertexKey, Point, TimeLabel)> + '_ {
        Self::vertices(self).filter_map(|(key, vertex)| {
            vertex.data.map(|label| (key, *vertex.point(), label))
        })
    }

    fn cells(&self) -> impl Iterator<Item = (CellKey, [VertexKey; 4])> + '_ {
        Self::cells(self).map(|(key, cell)| (key, *cell.vertices()))
    }

    fn edges(&self) -> impl Iterator<Item = (VertexKey, VertexKey)> + '_ {
        Self::edges(self).into_iter().map(|edge| edge.endpoints())
    }

    fn contains_cell(&self, cell: CellKey) -> bool {
        self.is_finite_cell(cell)
    }

    fn cell_vertices(&self, cell: CellKey) -> Option<[VertexKey; 4]> {
        if !self.is_finite_cell(cell) {
            return None;
        }
        self.tds().get_cell(cell).map(|c| *c.vertices())
    }

    fn label(&self, vertex: VertexKey) -> Option<TimeLabel> {
        if !self.contains_vertex(vertex) {
            return None;
        }
        self.tds().get_vertex(vertex).and_then(|v| v.data)
    }

    fn point(&self, vertex: VertexKey) -> Option<Point> {
        if !self.contains_vertex(vertex) {
            return None;
        }
        self.tds().vertex_point(vertex)
    }

    fn is_cell_valid(&self, cell: CellKey) -> bool {
        self.is_finite_cell(cell) && Self::is_cell_valid(self, cell)
    }

    fn is_valid(&self) -> bool {
        Self::is_valid(self).is_ok()
    }

    fn dim(&self) -> i32 {
        Self::dim(self)
    }

    fn number_of_vertices(&self) -> usize {
        Self::number_of_vertices(self)
    }

    fn number_of_cells(&self) -> usize {
        Self::number_of_cells(self)
    }

    fn number_of_edges(&self) -> usize {
        Self::number_of_edges(self)
    }

    fn generation(&self) -> u64 {
        Self::generation(self)
    }

    fn dropped_vertices(&self) -> usize {
        Self::dropped_vertices(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled_tetrahedron() -> DelaunayTriangulation<TimeLabel> {
        let mut dt = DelaunayTriangulation::with_bounds(Point::default(), 2.0).unwrap();
        let points = [
            (Point::new([0.0, 0.0, 0.0]), 1),
            (Point::new([1.0, 0.0, 0.0]), 1),
            (Point::new([0.0, 1.0, 0.0]), 2),
            (Point::new([0.0, 0.0, 1.0]), 2),
        ];
        let outcome = TriangulationEngine::insert_batch(&mut dt, &points).unwrap();
        assert_eq!(outcome.inserted, 4);
        dt
    }

    #[test]
    fn engine_view_matches_the_triangulation() {
        let dt = labelled_tetrahedron();
        assert_eq!(TriangulationEngine::number_of_cells(&dt), 1);
        assert_eq!(TriangulationEngine::dim(&dt), 3);
        assert_eq!(TriangulationEngine::number_of_vertices(&dt), 4);
        assert_eq!(TriangulationEngine::edges(&dt).count(), 6);
        assert!(TriangulationEngine::is_valid(&dt));

        let (cell, vertices) = TriangulationEngine::cells(&dt).next().unwrap();
        assert!(TriangulationEngine::contains_cell(&dt, cell));
        assert!(TriangulationEngine::is_cell_valid(&dt, cell));
        assert_eq!(dt.cell_vertices(cell), Some(vertices));
        let mut labels = dt.cell_labels(cell).unwrap();
        labels.sort_unstable();
        assert_eq!(labels, [1, 1, 2, 2]);
    }

    #[test]
    fn removal_invalidates_cells_and_bumps_generation() {
        let mut dt = labelled_tetrahedron();
        let (cell, vertices) = TriangulationEngine::cells(&dt).next().unwrap();
        let before = TriangulationEngine::generation(&dt);

        TriangulationEngine::remove_vertex(&mut dt, vertices[0]).unwrap();

        assert_ne!(TriangulationEngine::generation(&dt), before);
        assert!(!TriangulationEngine::contains_cell(&dt, cell));
        assert_eq!(TriangulationEngine::label(&dt, vertices[0]), None);
        assert_eq!(TriangulationEngine::point(&dt, vertices[0]), None);
        assert_eq!(TriangulationEngine::number_of_cells(&dt), 0);
        assert_eq!(TriangulationEngine::dim(&dt), 2);
        assert!(TriangulationEngine::remove_vertex(&mut dt, vertices[0]).is_err());
    }
}
