//! Vertex removal by local re-triangulation of the vertex's star.
//!
//! Removing `v` leaves a star-shaped hole bounded by the facets opposite `v`
//! in its incident cells. For points in general position the Delaunay
//! triangulation of the remaining set restricted to that hole is exactly the
//! part of the Delaunay triangulation of the link vertices that lies inside
//! the hole, so removal:
//!
//! 1. triangulates the link vertices in a scratch [`Tds`],
//! 2. seeds a flood fill from the scratch cell on `v`'s side of every hole facet,
//! 3. floods without crossing hole facets,
//! 4. checks that the fill is bounded by exactly the hole facets, and
//! 5. stitches the fill in place of the star.
//!
//! Steps 1–4 are read-only on the main structure, so a failed removal (which
//! happens on degenerate link configurations) leaves it untouched and the
//! caller can fall back to rebuilding.

use crate::core::algorithms::incremental_insertion::{
    InsertionError, apply_insertion, insert_bounding_cell, prepare_insertion,
};
use crate::core::cell::Cell;
use crate::core::collections::{
    CellKeySet, FacetVertices, FastHashMap, FastHashSet, VertexKeySet, canonical_facet,
};
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{CellKey, Tds, VertexKey};
use crate::core::util::hilbert::{hilbert_bounds, hilbert_sort_by_stable};
use crate::core::vertex::Vertex;
use crate::geometry::point::Point;
use crate::geometry::predicates::{Orientation, simplex_orientation};
use crate::geometry::util::{BoundingBall, bounding_tetrahedron};

/// Margin between the link's bounding ball and the scratch bounding cell.
const SCRATCH_MARGIN: f64 = 1e6;

/// Error during vertex removal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemovalError {
    /// The vertex key does not refer to a live vertex.
    #[error("Vertex {vertex_key:?} not found")]
    VertexNotFound {
        /// The key that failed to resolve
        vertex_key: VertexKey,
    },

    /// The vertex is not incident to any cell.
    #[error("Vertex {vertex_key:?} has no incident cells")]
    EmptyStar {
        /// The detached vertex
        vertex_key: VertexKey,
    },

    /// Building the scratch triangulation of the link failed.
    #[error("Link triangulation failed: {0}")]
    LinkTriangulation(#[from] InsertionError),

    /// The link triangulation does not fit the hole.
    #[error("Hole re-triangulation failed: {message}")]
    Retriangulation {
        /// Error message
        message: String,
    },
}

/// A facet on the boundary of the hole left by the removed vertex.
#[derive(Clone, Copy, Debug)]
struct HoleFacet {
    /// The star cell the facet belongs to.
    star_cell: CellKey,
    /// Index of the removed vertex in `star_cell`.
    index: usize,
    /// The cell across the facet and the index under which it sees `star_cell`.
    outside: Option<(CellKey, usize)>,
}

/// Removes `vertex` and re-triangulates its star.
///
/// Returns the removed vertex.
///
/// # Errors
///
/// Returns [`RemovalError`] if the vertex is missing or the hole cannot be
/// re-triangulated; the structure is unchanged in that case.
pub fn remove_vertex<U>(tds: &mut Tds<U>, vertex: VertexKey) -> Result<Vertex<U>, RemovalError>
where
    U: DataType,
{
    let removed_point = tds
        .vertex_point(vertex)
        .ok_or(RemovalError::VertexNotFound { vertex_key: vertex })?;

    let star = tds.find_cells_containing_vertex(vertex);
    if star.is_empty() {
        return Err(RemovalError::EmptyStar { vertex_key: vertex });
    }

    let mut hole: FastHashMap<FacetVertices, HoleFacet> = FastHashMap::default();
    let mut link = VertexKeySet::default();
    for &key in &star {
        let cell = tds.get_cell(key).ok_or_else(|| retriangulation("star cell vanished"))?;
        let index = cell
            .vertex_index(vertex)
            .ok_or_else(|| retriangulation("star cell does not contain the vertex"))?;
        link.extend(cell.vertices().iter().copied().filter(|&v| v != vertex));
        let outside = match cell.neighbors()[index] {
            Some(n) => {
                let back = tds
                    .get_cell(n)
                    .and_then(|other| other.neighbor_index(key))
                    .ok_or_else(|| retriangulation("outside neighbor does not point back"))?;
                Some((n, back))
            }
            None => None,
        };
        hole.insert(
            canonical_facet(cell.facet_vertices(index)),
            HoleFacet {
                star_cell: key,
                index,
                outside,
            },
        );
    }

    let scratch = triangulate_link(tds, &link, &removed_point)?;
    let fill = flood_hole(tds, &scratch, &hole)?;
    stitch(tds, vertex, &star, &scratch, &fill, &hole)?;

    tds.remove_vertex_entry(vertex)
        .ok_or(RemovalError::VertexNotFound { vertex_key: vertex })
}

fn retriangulation(message: &str) -> RemovalError {
    RemovalError::Retriangulation {
        message: message.to_string(),
    }
}

/// Delaunay triangulation of the link points; each scratch vertex carries the
/// key of the vertex it mirrors, bounding corners carry nothing.
fn triangulate_link<U>(
    tds: &Tds<U>,
    link: &VertexKeySet,
    removed_point: &Point,
) -> Result<Tds<VertexKey>, RemovalError>
where
    U: DataType,
{
    let mut points: Vec<(VertexKey, Point)> = link
        .iter()
        .filter_map(|&v| tds.vertex_point(v).map(|p| (v, p)))
        .collect();
    if points.len() != link.len() {
        return Err(retriangulation("link references a missing vertex"));
    }

    let ball = BoundingBall::from_points(
        points
            .iter()
            .map(|(_, p)| p)
            .chain(std::iter::once(removed_point)),
    )
    .ok_or_else(|| retriangulation("link has no finite points"))?;

    let mut scratch: Tds<VertexKey> = Tds::empty();
    let corners = bounding_tetrahedron(&ball.center, ball.radius.max(1.0) * SCRATCH_MARGIN);
    insert_bounding_cell(&mut scratch, &corners)?;

    // Deterministic order regardless of hash iteration
    points.sort_unstable_by_key(|(v, _)| *v);
    let bounds = hilbert_bounds(points.iter().map(|(_, p)| p.coords()));
    hilbert_sort_by_stable(&mut points, bounds, 16, |(_, p)| *p.coords());

    let mut hint = None;
    for (key, point) in points {
        let plan = prepare_insertion(&scratch, &point, hint)?;
        let mirror = scratch.insert_vertex(Vertex::new(point, Some(key)));
        let created = apply_insertion(&mut scratch, mirror, &plan)?;
        hint = created.first().copied();
    }
    Ok(scratch)
}

/// Mirrored facet vertices of a scratch cell, or `None` if it touches a bounding corner.
fn mirrored_vertices(scratch: &Tds<VertexKey>, cell: &Cell) -> Option<[VertexKey; 4]> {
    let v = cell.vertices();
    let mirror = |k: VertexKey| scratch.get_vertex(k).and_then(|vertex| vertex.data);
    Some([mirror(v[0])?, mirror(v[1])?, mirror(v[2])?, mirror(v[3])?])
}

fn mirrored_facet(vertices: &[VertexKey; 4], index: usize) -> FacetVertices {
    let mut facet = [VertexKey::default(); 3];
    let mut slot = 0;
    for (i, &v) in vertices.iter().enumerate() {
        if i != index {
            facet[slot] = v;
            slot += 1;
        }
    }
    canonical_facet(facet)
}

/// Scratch cells filling the hole.
fn flood_hole<U>(
    tds: &Tds<U>,
    scratch: &Tds<VertexKey>,
    hole: &FastHashMap<FacetVertices, HoleFacet>,
) -> Result<Vec<CellKey>, RemovalError>
where
    U: DataType,
{
    let mirror_of: FastHashMap<VertexKey, VertexKey> = scratch
        .vertices()
        .filter_map(|(k, v)| v.data.map(|orig| (orig, k)))
        .collect();

    // Seed from the scratch cell on the removed vertex's side of each hole facet
    let mut fill: Vec<CellKey> = Vec::new();
    let mut in_fill = CellKeySet::default();
    for facet in hole.values() {
        let star_cell = tds
            .get_cell(facet.star_cell)
            .ok_or_else(|| retriangulation("star cell vanished"))?;
        let star_points = tds
            .cell_points(facet.star_cell)
            .ok_or_else(|| retriangulation("star cell vanished"))?;
        let corners = star_cell.facet_vertices(facet.index);
        let scratch_corners = corners.map(|v| mirror_of.get(&v).copied());
        let [Some(a), Some(b), Some(c)] = scratch_corners else {
            return Err(retriangulation("hole facet vertex missing from link"));
        };

        let seed = scratch
            .find_cells_containing_vertex(a)
            .into_iter()
            .filter(|&k| {
                scratch
                    .get_cell(k)
                    .is_some_and(|cell| cell.contains_vertex(b) && cell.contains_vertex(c))
            })
            .find(|&k| {
                let Some(cell) = scratch.get_cell(k) else {
                    return false;
                };
                let Some(apex) = cell
                    .vertices()
                    .iter()
                    .find(|&&v| v != a && v != b && v != c)
                    .and_then(|&v| scratch.vertex_point(v))
                else {
                    return false;
                };
                let mut probe = star_points;
                probe[facet.index] = apex;
                simplex_orientation(&probe) == Orientation::POSITIVE
            })
            .ok_or_else(|| retriangulation("hole facet is not a facet of the link triangulation"))?;

        if in_fill.insert(seed) {
            fill.push(seed);
        }
    }

    let mut cursor = 0;
    while cursor < fill.len() {
        let key = fill[cursor];
        cursor += 1;

        let cell = scratch
            .get_cell(key)
            .ok_or_else(|| retriangulation("scratch cell vanished"))?;
        let mirrored = mirrored_vertices(scratch, cell)
            .ok_or_else(|| retriangulation("flood fill reached the scratch bounding cell"))?;

        for (i, neighbor) in cell.neighbors().iter().enumerate() {
            if hole.contains_key(&mirrored_facet(&mirrored, i)) {
                continue;
            }
            let neighbor =
                neighbor.ok_or_else(|| retriangulation("flood fill reached the scratch hull"))?;
            if in_fill.insert(neighbor) {
                fill.push(neighbor);
            }
        }
    }

    // The fill must be bounded by exactly the hole facets
    let mut open: FastHashSet<FacetVertices> = FastHashSet::default();
    for &key in &fill {
        let cell = scratch
            .get_cell(key)
            .ok_or_else(|| retriangulation("scratch cell vanished"))?;
        let mirrored = mirrored_vertices(scratch, cell)
            .ok_or_else(|| retriangulation("fill touches the scratch bounding cell"))?;
        for i in 0..4 {
            let facet = mirrored_facet(&mirrored, i);
            if !open.remove(&facet) {
                open.insert(facet);
            }
        }
    }
    if open.len() != hole.len() || !open.iter().all(|f| hole.contains_key(f)) {
        return Err(retriangulation("fill boundary does not match the hole"));
    }

    Ok(fill)
}

/// Replaces the star of `vertex` with the mirrored fill cells.
fn stitch<U>(
    tds: &mut Tds<U>,
    vertex: VertexKey,
    star: &[CellKey],
    scratch: &Tds<VertexKey>,
    fill: &[CellKey],
    hole: &FastHashMap<FacetVertices, HoleFacet>,
) -> Result<(), RemovalError>
where
    U: DataType,
{
    let mut created: FastHashMap<CellKey, (CellKey, [VertexKey; 4])> = FastHashMap::default();
    for &scratch_key in fill {
        let cell = scratch
            .get_cell(scratch_key)
            .ok_or_else(|| retriangulation("scratch cell vanished"))?;
        let mirrored = mirrored_vertices(scratch, cell)
            .ok_or_else(|| retriangulation("fill touches the scratch bounding cell"))?;
        let key = tds.insert_cell(Cell::new(mirrored));
        created.insert(scratch_key, (key, mirrored));
    }

    for &scratch_key in fill {
        let cell = *scratch
            .get_cell(scratch_key)
            .ok_or_else(|| retriangulation("scratch cell vanished"))?;
        let Some(&(key, mirrored)) = created.get(&scratch_key) else {
            continue;
        };
        for (i, neighbor) in cell.neighbors().iter().enumerate() {
            let across = if let Some(facet) = hole.get(&mirrored_facet(&mirrored, i)) {
                if let Some((outside, back)) = facet.outside
                    && let Some(outer) = tds.get_cell_mut(outside)
                {
                    outer.neighbors[back] = Some(key);
                }
                facet.outside.map(|(outside, _)| outside)
            } else {
                neighbor.and_then(|n| created.get(&n)).map(|&(k, _)| k)
            };
            if let Some(new_cell) = tds.get_cell_mut(key) {
                new_cell.neighbors[i] = across;
            }
        }
    }

    for &key in star {
        tds.remove_cell(key);
    }
    for &(key, _) in created.values() {
        tds.claim_incidence(key);
    }
    if let Some(v) = tds.get_vertex_mut(vertex) {
        v.incident_cell = None;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(points: &[[f64; 3]]) -> (Tds<u32>, Vec<VertexKey>) {
        let mut tds: Tds<u32> = Tds::empty();
        let corners = bounding_tetrahedron(&Point::default(), 1000.0);
        insert_bounding_cell(&mut tds, &corners).unwrap();
        let mut keys = Vec::new();
        let mut hint = None;
        for (i, coords) in points.iter().enumerate() {
            let p = Point::new(*coords);
            let plan = prepare_insertion(&tds, &p, hint).unwrap();
            let label = u32::try_from(i).unwrap();
            let v = tds.insert_vertex(Vertex::new(p, Some(label)));
            hint = apply_insertion(&mut tds, v, &plan).unwrap().first().copied();
            keys.push(v);
        }
        (tds, keys)
    }

    #[test]
    fn removing_the_only_interior_vertex_restores_the_bounding_cell() {
        let (mut tds, keys) = build(&[[0.1, 0.2, 0.3]]);
        assert_eq!(tds.number_of_cells(), 4);
        let removed = remove_vertex(&mut tds, keys[0]).unwrap();
        assert_eq!(removed.data, Some(0));
        assert_eq!(tds.number_of_cells(), 1);
        assert_eq!(tds.number_of_vertices(), 4);
        assert!(tds.is_valid().is_ok());
    }

    #[test]
    fn removal_keeps_structure_valid() {
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.1, 0.05],
            [0.1, 1.1, -0.2],
            [-0.3, 0.2, 1.0],
            [0.7, 0.8, 0.9],
            [-1.0, -0.4, 0.3],
            [0.4, -0.9, -0.6],
        ];
        let (mut tds, keys) = build(&points);
        assert!(tds.is_valid().is_ok());
        for &key in &keys[..4] {
            remove_vertex(&mut tds, key).unwrap();
            assert!(tds.is_valid().is_ok());
            assert!(!tds.contains_vertex(key));
        }
        assert_eq!(tds.number_of_vertices(), 4 + 3);
    }

    #[test]
    fn missing_vertex_is_reported() {
        let (mut tds, keys) = build(&[[0.0, 0.0, 0.0]]);
        remove_vertex(&mut tds, keys[0]).unwrap();
        assert_eq!(
            remove_vertex(&mut tds, keys[0]).unwrap_err(),
            RemovalError::VertexNotFound {
                vertex_key: keys[0]
            }
        );
    }
}
