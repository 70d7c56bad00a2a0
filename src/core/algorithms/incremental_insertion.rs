//! Incremental Delaunay insertion using the cavity-based (Bowyer–Watson) algorithm.
//!
//! Insertion runs in two phases so that a rejected point leaves the
//! triangulation untouched:
//!
//! 1. [`prepare_insertion`] (read-only): locate the containing cell, reject
//!    duplicates, collect the conflict region, and grow it until every
//!    boundary facet sees the new point from its positive side.
//! 2. [`apply_insertion`]: replace the cavity with a fan of new cells around
//!    the new vertex and wire neighbors locally.

use crate::core::algorithms::locate::{
    ConflictError, LocateError, LocateResult, find_conflict_region, locate,
};
use crate::core::cell::Cell;
use crate::core::collections::{
    CellKeyBuffer, CellKeySet, FacetIndex, FacetVertices, FastHashMap, VertexKeySet,
    canonical_facet,
};
use crate::core::facet::FacetHandle;
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{CellKey, Tds, VertexKey};
use crate::core::vertex::Vertex;
use crate::geometry::point::{Point, PointValidationError};
use crate::geometry::predicates::{Orientation, simplex_orientation};

/// Squared distance under which a point duplicates an existing vertex.
pub const DUPLICATE_TOLERANCE_SQUARED: f64 = 1e-20;

/// Error during incremental insertion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InsertionError {
    /// The point has non-finite coordinates.
    #[error("Invalid point: {source}")]
    InvalidPoint {
        /// The underlying validation error
        #[from]
        source: PointValidationError,
    },

    /// Point location failed
    #[error("Location error: {0}")]
    Location(#[from] LocateError),

    /// Conflict region finding failed
    #[error("Conflict region error: {0}")]
    ConflictRegion(#[from] ConflictError),

    /// The point lies outside the bounding simplex.
    #[error("Point {point} lies outside the triangulation bounds")]
    OutsideBounds {
        /// The rejected point
        point: Point,
    },

    /// The point coincides with an existing vertex.
    #[error("Point {point} duplicates existing vertex {existing:?}")]
    DuplicateVertex {
        /// The rejected point
        point: Point,
        /// The vertex it coincides with
        existing: VertexKey,
    },

    /// Cavity construction failed
    #[error("Cavity filling failed: {message}")]
    CavityFilling {
        /// Error message
        message: String,
    },

    /// Neighbor wiring failed
    #[error("Neighbor wiring failed: {message}")]
    NeighborWiring {
        /// Error message
        message: String,
    },
}

/// A cavity ready to be re-triangulated around a new point.
#[derive(Clone, Debug)]
pub struct CavityPlan {
    point: Point,
    cells: CellKeyBuffer,
    boundary: Vec<FacetHandle>,
}

impl CavityPlan {
    /// The point the cavity was planned for.
    #[must_use]
    pub const fn point(&self) -> &Point {
        &self.point
    }

    /// Cells that will be removed.
    #[must_use]
    pub fn cells(&self) -> &[CellKey] {
        &self.cells
    }

    /// Boundary facets; each one becomes a new cell.
    #[must_use]
    pub fn boundary(&self) -> &[FacetHandle] {
        &self.boundary
    }
}

/// Seeds an empty cell complex with a single bounding cell over `corners`.
///
/// The corners are stored as payload-free vertices and the cell is oriented
/// positively. Returns the corner keys in the order given.
///
/// # Errors
///
/// Returns [`InsertionError::CavityFilling`] if the corners are coplanar.
pub fn insert_bounding_cell<U>(
    tds: &mut Tds<U>,
    corners: &[Point; 4],
) -> Result<[VertexKey; 4], InsertionError>
where
    U: DataType,
{
    let orientation = simplex_orientation(corners);
    if orientation == Orientation::DEGENERATE {
        return Err(InsertionError::CavityFilling {
            message: "bounding cell is degenerate".to_string(),
        });
    }

    let keys = corners.map(|p| tds.insert_vertex(Vertex::new(p, None)));
    let mut cell = Cell::new(keys);
    if orientation == Orientation::NEGATIVE {
        cell.swap_vertices(0, 1);
    }
    let cell = tds.insert_cell(cell);
    tds.claim_incidence(cell);
    Ok(keys)
}

/// Read-only phase of insertion.
///
/// # Errors
///
/// Returns [`InsertionError::OutsideBounds`] if no cell contains the point,
/// [`InsertionError::DuplicateVertex`] if it coincides with a vertex of the
/// containing cell, and [`InsertionError::CavityFilling`] if no valid cavity
/// exists.
pub fn prepare_insertion<U>(
    tds: &Tds<U>,
    point: &Point,
    hint: Option<CellKey>,
) -> Result<CavityPlan, InsertionError>
where
    U: DataType,
{
    point.validate()?;

    let located = match locate(tds, point, hint)? {
        LocateResult::InsideCell(cell) => cell,
        LocateResult::Outside => return Err(InsertionError::OutsideBounds { point: *point }),
    };

    if let Some(cell) = tds.get_cell(located) {
        for &v in cell.vertices() {
            if let Some(existing) = tds.vertex_point(v)
                && existing.distance_squared(point) < DUPLICATE_TOLERANCE_SQUARED
            {
                return Err(InsertionError::DuplicateVertex {
                    point: *point,
                    existing: v,
                });
            }
        }
    }

    let conflict = find_conflict_region(tds, point, located)?;
    plan_cavity(tds, point, conflict)
}

/// Grows `conflict` until it is star-shaped from `point`, then extracts its boundary.
///
/// # Errors
///
/// Returns [`InsertionError::CavityFilling`] if the cavity reaches the outer
/// boundary or would enclose an existing vertex.
pub fn plan_cavity<U>(
    tds: &Tds<U>,
    point: &Point,
    conflict: CellKeyBuffer,
) -> Result<CavityPlan, InsertionError>
where
    U: DataType,
{
    let mut cells = conflict;
    let mut members: CellKeySet = cells.iter().copied().collect();
    let max_cells = tds.number_of_cells();

    let boundary = loop {
        let boundary = cavity_boundary(tds, &cells, &members)?;

        let mut grown = false;
        for facet in &boundary {
            let mut points = tds.cell_points(facet.cell_key()).ok_or_else(|| {
                InsertionError::CavityFilling {
                    message: format!("boundary cell {:?} not found", facet.cell_key()),
                }
            })?;
            points[usize::from(facet.facet_index())] = *point;
            if simplex_orientation(&points) == Orientation::POSITIVE {
                continue;
            }
            // The new cell would be flat or inverted: absorb the cell behind the facet
            let Some(behind) = facet.neighbor(tds) else {
                return Err(InsertionError::CavityFilling {
                    message: "cavity reached the outer boundary".to_string(),
                });
            };
            if members.insert(behind) {
                cells.push(behind);
                grown = true;
            }
        }

        if !grown {
            break boundary;
        }
        if cells.len() > max_cells {
            return Err(InsertionError::CavityFilling {
                message: "cavity growth did not converge".to_string(),
            });
        }
    };

    // Every vertex of the cavity must stay on its boundary
    let mut on_boundary = VertexKeySet::default();
    for facet in &boundary {
        if let Some(vertices) = facet.vertices(tds) {
            on_boundary.extend(vertices);
        }
    }
    for &key in &cells {
        if let Some(cell) = tds.get_cell(key)
            && let Some(&enclosed) = cell.vertices().iter().find(|v| !on_boundary.contains(v))
        {
            return Err(InsertionError::CavityFilling {
                message: format!("cavity would enclose vertex {enclosed:?}"),
            });
        }
    }

    Ok(CavityPlan {
        point: *point,
        cells,
        boundary,
    })
}

fn cavity_boundary<U>(
    tds: &Tds<U>,
    cells: &[CellKey],
    members: &CellKeySet,
) -> Result<Vec<FacetHandle>, InsertionError>
where
    U: DataType,
{
    let mut boundary = Vec::with_capacity(cells.len() * 2);
    for &key in cells {
        let cell = tds
            .get_cell(key)
            .ok_or_else(|| InsertionError::CavityFilling {
                message: format!("cavity cell {key:?} not found"),
            })?;
        for (i, neighbor) in cell.neighbors().iter().enumerate() {
            if neighbor.is_none_or(|n| !members.contains(&n)) {
                boundary.push(FacetHandle::new(key, facet_index(i)));
            }
        }
    }
    Ok(boundary)
}

#[inline]
fn facet_index(i: usize) -> FacetIndex {
    // Cells have four facets
    FacetIndex::try_from(i).unwrap_or(FacetIndex::MAX)
}

/// Mutating phase of insertion: re-triangulates `plan` around `new_vertex`.
///
/// `new_vertex` must already be stored in `tds` at `plan.point()`.
///
/// # Errors
///
/// Returns [`InsertionError::CavityFilling`] or [`InsertionError::NeighborWiring`]
/// if the plan no longer matches the triangulation. The structure may be left
/// inconsistent in that case and must be rebuilt by the caller.
pub fn apply_insertion<U>(
    tds: &mut Tds<U>,
    new_vertex: VertexKey,
    plan: &CavityPlan,
) -> Result<CellKeyBuffer, InsertionError>
where
    U: DataType,
{
    let new_cells = fill_cavity(tds, new_vertex, &plan.boundary)?;
    wire_cavity_neighbors(tds, new_vertex, &new_cells)?;

    for &key in &plan.cells {
        tds.remove_cell(key);
    }
    for &key in &new_cells {
        tds.claim_incidence(key);
    }
    Ok(new_cells)
}

/// Creates one cell per boundary facet, replacing the opposite vertex with
/// `new_vertex`, and links each to the cell outside the cavity.
fn fill_cavity<U>(
    tds: &mut Tds<U>,
    new_vertex: VertexKey,
    boundary: &[FacetHandle],
) -> Result<CellKeyBuffer, InsertionError>
where
    U: DataType,
{
    let mut new_cells = CellKeyBuffer::new();

    for facet in boundary {
        let old = *tds
            .get_cell(facet.cell_key())
            .ok_or_else(|| InsertionError::CavityFilling {
                message: format!("boundary cell {:?} not found", facet.cell_key()),
            })?;
        let index = usize::from(facet.facet_index());

        let mut cell = Cell::new(*old.vertices());
        cell.set_vertex(index, new_vertex);
        let outside = old.neighbors()[index];
        cell.neighbors[index] = outside;
        let key = tds.insert_cell(cell);

        if let Some(outside) = outside {
            let outer = tds
                .get_cell_mut(outside)
                .ok_or_else(|| InsertionError::NeighborWiring {
                    message: format!("outside neighbor {outside:?} not found"),
                })?;
            let back = outer.neighbor_index(facet.cell_key()).ok_or_else(|| {
                InsertionError::NeighborWiring {
                    message: format!(
                        "cell {outside:?} does not point back to {:?}",
                        facet.cell_key()
                    ),
                }
            })?;
            outer.neighbors[back] = Some(key);
        }
        new_cells.push(key);
    }

    Ok(new_cells)
}

/// Pairs up the new cells across the facets they share with each other.
fn wire_cavity_neighbors<U>(
    tds: &mut Tds<U>,
    new_vertex: VertexKey,
    new_cells: &[CellKey],
) -> Result<(), InsertionError>
where
    U: DataType,
{
    let mut open: FastHashMap<FacetVertices, (CellKey, usize)> = FastHashMap::default();

    for &key in new_cells {
        let cell = *tds
            .get_cell(key)
            .ok_or_else(|| InsertionError::NeighborWiring {
                message: format!("new cell {key:?} not found"),
            })?;
        for (i, &v) in cell.vertices().iter().enumerate() {
            // The facet opposite the new vertex is the cavity boundary, already wired
            if v == new_vertex {
                continue;
            }
            let facet = canonical_facet(cell.facet_vertices(i));
            if let Some((other, j)) = open.remove(&facet) {
                link(tds, key, i, other, j)?;
            } else {
                open.insert(facet, (key, i));
            }
        }
    }

    if open.is_empty() {
        Ok(())
    } else {
        Err(InsertionError::NeighborWiring {
            message: format!("{} cavity facets left unpaired", open.len()),
        })
    }
}

pub(crate) fn link<U>(
    tds: &mut Tds<U>,
    a: CellKey,
    a_index: usize,
    b: CellKey,
    b_index: usize,
) -> Result<(), InsertionError>
where
    U: DataType,
{
    for (key, index, other) in [(a, a_index, b), (b, b_index, a)] {
        let cell = tds
            .get_cell_mut(key)
            .ok_or_else(|| InsertionError::NeighborWiring {
                message: format!("cell {key:?} not found"),
            })?;
        cell.neighbors[index] = Some(other);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex;

    fn single_tet() -> Tds<()> {
        let mut tds: Tds<()> = Tds::empty();
        let a = tds.insert_vertex(vertex!([-10.0, -10.0, 10.0]));
        let b = tds.insert_vertex(vertex!([10.0, -10.0, 10.0]));
        let c = tds.insert_vertex(vertex!([0.0, 10.0, 10.0]));
        let d = tds.insert_vertex(vertex!([0.0, 0.0, -10.0]));
        let cell = tds.insert_cell(Cell::new([a, b, c, d]));
        if tds.validate_cell(cell).is_err() {
            tds.get_cell_mut(cell).unwrap().swap_vertices(0, 1);
        }
        tds.claim_incidence(cell);
        tds
    }

    #[test]
    fn inserting_interior_point_splits_cell_into_four() {
        let mut tds = single_tet();
        let p = Point::new([0.0, 0.0, 0.0]);
        let plan = prepare_insertion(&tds, &p, None).unwrap();
        assert_eq!(plan.cells().len(), 1);
        assert_eq!(plan.boundary().len(), 4);

        let v = tds.insert_vertex(vertex!([0.0, 0.0, 0.0]));
        let cells = apply_insertion(&mut tds, v, &plan).unwrap();
        assert_eq!(cells.len(), 4);
        assert_eq!(tds.number_of_cells(), 4);
        assert!(tds.is_valid().is_ok());
        assert_eq!(tds.find_cells_containing_vertex(v).len(), 4);
    }

    #[test]
    fn duplicate_point_is_rejected_without_mutation() {
        let tds = single_tet();
        let generation = tds.generation();
        let err = prepare_insertion(&tds, &Point::new([10.0, -10.0, 10.0]), None).unwrap_err();
        assert!(matches!(err, InsertionError::DuplicateVertex { .. }));
        assert_eq!(tds.generation(), generation);
    }

    #[test]
    fn point_outside_hull_is_out_of_bounds() {
        let tds = single_tet();
        let err = prepare_insertion(&tds, &Point::new([100.0, 0.0, 0.0]), None).unwrap_err();
        assert!(matches!(err, InsertionError::OutsideBounds { .. }));
    }

    #[test]
    fn non_finite_point_is_rejected() {
        let tds = single_tet();
        let err = prepare_insertion(&tds, &Point::new([f64::NAN, 0.0, 0.0]), None).unwrap_err();
        assert!(matches!(err, InsertionError::InvalidPoint { .. }));
    }

    #[test]
    fn bounding_cell_is_positive_for_either_corner_order() {
        let corners = [
            Point::new([-10.0, -10.0, 10.0]),
            Point::new([10.0, -10.0, 10.0]),
            Point::new([0.0, 10.0, 10.0]),
            Point::new([0.0, 0.0, -10.0]),
        ];
        let mut swapped = corners;
        swapped.swap(0, 1);

        for order in [corners, swapped] {
            let mut tds: Tds<()> = Tds::empty();
            let keys = insert_bounding_cell(&mut tds, &order).unwrap();
            assert_eq!(tds.number_of_cells(), 1);
            assert!(tds.is_valid().is_ok());
            let (_, cell) = tds.cells().next().unwrap();
            assert!(keys.iter().all(|&k| cell.contains_vertex(k)));
        }
    }

    #[test]
    fn coplanar_bounding_cell_is_rejected() {
        let mut tds: Tds<()> = Tds::empty();
        let flat = [
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
            Point::new([1.0, 1.0, 0.0]),
        ];
        assert!(matches!(
            insert_bounding_cell(&mut tds, &flat),
            Err(InsertionError::CavityFilling { .. })
        ));
        assert_eq!(tds.number_of_vertices(), 0);
    }
}
