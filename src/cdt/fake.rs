//! In-memory [`TriangulationEngine`] for unit tests.
//!
//! Cells are declared explicitly and removing a vertex simply drops every
//! cell containing it, so tests control exactly which cells exist.

use std::collections::{BTreeMap, BTreeSet};

use crate::cdt::traits::{EngineError, TimeLabel, TriangulationEngine};
use crate::core::delaunay_triangulation::BatchInsertion;
use crate::geometry::point::Point;

#[derive(Clone, Debug, Default)]
pub struct FakeTriangulation {
    vertices: BTreeMap<usize, (Point, TimeLabel)>,
    cells: BTreeMap<usize, [usize; 4]>,
    broken: BTreeSet<usize>,
    next_vertex: usize,
    next_cell: usize,
    generation: u64,
    dropped: usize,
    pub fail_removals: bool,
    /// Each removal also discards the next live vertex, as a rebuild that
    /// cannot re-insert it would.
    pub lossy_removals: bool,
}

impl FakeTriangulation {
    /// Vertices `0..labels.len()` placed on a line, plus the given cells.
    pub fn from_cells(labels: &[TimeLabel], cells: &[[usize; 4]]) -> Self {
        let mut fake = Self::default();
        for (i, &label) in labels.iter().enumerate() {
            fake.vertices
                .insert(i, (Point::new([f64::from(label), 0.0, 0.0]), label));
        }
        fake.next_vertex = labels.len();
        for &cell in cells {
            fake.add_cell(cell);
        }
        fake
    }

    pub fn add_cell(&mut self, vertices: [usize; 4]) -> usize {
        let key = self.next_cell;
        self.next_cell += 1;
        self.cells.insert(key, vertices);
        self.generation += 1;
        key
    }

    /// Marks a cell as structurally invalid.
    pub fn break_cell(&mut self, cell: usize) {
        self.broken.insert(cell);
    }
}

impl TriangulationEngine for FakeTriangulation {
    type VertexHandle = usize;
    type CellHandle = usize;

    fn insert_batch(
        &mut self,
        points: &[(Point, TimeLabel)],
    ) -> Result<BatchInsertion, EngineError> {
        for &entry in points {
            self.vertices.insert(self.next_vertex, entry);
            self.next_vertex += 1;
        }
        self.generation += 1;
        Ok(BatchInsertion {
            inserted: points.len(),
            skipped: 0,
        })
    }

    fn remove_vertex(&mut self, vertex: usize) -> Result<(), EngineError> {
        if self.fail_removals || self.vertices.remove(&vertex).is_none() {
            return Err(EngineError::UnknownVertex {
                vertex: format!("{vertex}"),
            });
        }
        self.cells.retain(|_, cell| !cell.contains(&vertex));
        let lost = if self.lossy_removals {
            self.vertices.keys().copied().find(|&k| k > vertex)
        } else {
            None
        };
        if let Some(lost) = lost {
            self.vertices.remove(&lost);
            self.cells.retain(|_, cell| !cell.contains(&lost));
            self.dropped += 1;
        }
        self.generation += 1;
        Ok(())
    }

    fn vertices(&self) -> impl Iterator<Item = (usize, Point, TimeLabel)> + '_ {
        self.vertices.iter().map(|(&k, &(p, l))| (k, p, l))
    }

    fn cells(&self) -> impl Iterator<Item = (usize, [usize; 4])> + '_ {
        self.cells.iter().map(|(&k, &c)| (k, c))
    }

    fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut edges = BTreeSet::new();
        for cell in self.cells.values() {
            for i in 0..4 {
                for j in (i + 1)..4 {
                    edges.insert((cell[i].min(cell[j]), cell[i].max(cell[j])));
                }
            }
        }
        edges.into_iter()
    }

    fn contains_cell(&self, cell: usize) -> bool {
        self.cells.contains_key(&cell)
    }

    fn cell_vertices(&self, cell: usize) -> Option<[usize; 4]> {
        self.cells.get(&cell).copied()
    }

    fn label(&self, vertex: usize) -> Option<TimeLabel> {
        self.vertices.get(&vertex).map(|&(_, l)| l)
    }

    fn point(&self, vertex: usize) -> Option<Point> {
        self.vertices.get(&vertex).map(|&(p, _)| p)
    }

    fn is_cell_valid(&self, cell: usize) -> bool {
        self.cells.contains_key(&cell) && !self.broken.contains(&cell)
    }

    fn is_valid(&self) -> bool {
        self.broken.is_empty()
    }

    fn dim(&self) -> i32 {
        if self.cells.is_empty() {
            i32::try_from(self.vertices.len().min(3)).unwrap_or(3) - 1
        } else {
            3
        }
    }

    fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    fn number_of_edges(&self) -> usize {
        self.edges().count()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn dropped_vertices(&self) -> usize {
        self.dropped
    }
}
