//! Point location and conflict-region search.
//!
//! Point location uses a visibility walk: starting from a hint cell it
//! repeatedly crosses a facet that separates the current cell from the query
//! point until no such facet exists. The facet tested first rotates with every
//! step, which breaks the cycles a fixed test order can fall into on degenerate
//! input. If the walk still exceeds its step budget, location falls back to a
//! linear scan.
//!
//! # References
//!
//! - O. Devillers, S. Pion, and M. Teillaud, "Walking in a Triangulation",
//!   International Journal of Foundations of Computer Science, 2001.

use crate::core::collections::{CellKeyBuffer, CellSecondaryMap};
use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::{CellKey, Tds};
use crate::geometry::point::Point;
use crate::geometry::predicates::{InSphere, Orientation, insphere_positive, simplex_orientation};

/// Result of a point location query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateResult {
    /// The point lies in the closed cell.
    InsideCell(CellKey),
    /// The point lies outside every cell.
    Outside,
}

/// Error during point location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// Triangulation has no cells
    #[error("Cannot locate in empty triangulation")]
    EmptyTriangulation,

    /// Cell reference is invalid
    #[error("Invalid cell reference: {cell_key:?}")]
    InvalidCell {
        /// The invalid cell key
        cell_key: CellKey,
    },

    /// The walk did not terminate within its step budget.
    #[error("Walk did not terminate after {steps} steps - possible numerical degeneracy")]
    CycleDetected {
        /// Number of steps taken
        steps: usize,
    },
}

/// Error during conflict region finding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// Starting cell is invalid
    #[error("Invalid starting cell: {cell_key:?}")]
    InvalidStartCell {
        /// The invalid cell key
        cell_key: CellKey,
    },

    /// Failed to retrieve cell vertices
    #[error("Failed to get vertices for cell {cell_key:?}")]
    VertexRetrievalFailed {
        /// The cell key that failed
        cell_key: CellKey,
    },
}

const MAX_WALK_STEPS: usize = 10_000;

/// Locate `point`, walking from `hint` and falling back to a linear scan.
///
/// # Errors
///
/// Returns [`LocateError::EmptyTriangulation`] if there are no cells, or
/// [`LocateError::InvalidCell`] if the structure references a missing cell.
pub fn locate<U>(
    tds: &Tds<U>,
    point: &Point,
    hint: Option<CellKey>,
) -> Result<LocateResult, LocateError>
where
    U: DataType,
{
    match locate_by_walk(tds, point, hint) {
        Err(LocateError::CycleDetected { steps }) => {
            tracing::debug!(steps, "visibility walk exhausted; scanning all cells");
            locate_by_scan(tds, point)
        }
        other => other,
    }
}

/// Visibility walk from `hint` (or an arbitrary cell).
///
/// # Errors
///
/// Returns [`LocateError::CycleDetected`] once the step budget is spent.
pub fn locate_by_walk<U>(
    tds: &Tds<U>,
    point: &Point,
    hint: Option<CellKey>,
) -> Result<LocateResult, LocateError>
where
    U: DataType,
{
    if tds.number_of_cells() == 0 {
        return Err(LocateError::EmptyTriangulation);
    }

    let mut current = match hint {
        Some(key) if tds.contains_cell(key) => key,
        _ => tds
            .cell_keys()
            .next()
            .ok_or(LocateError::EmptyTriangulation)?,
    };

    for step in 0..MAX_WALK_STEPS {
        let cell = tds
            .get_cell(current)
            .ok_or(LocateError::InvalidCell { cell_key: current })?;
        let points = tds
            .cell_points(current)
            .ok_or(LocateError::InvalidCell { cell_key: current })?;

        let mut crossed = false;
        for offset in 0..4 {
            let facet = (step + offset) % 4;
            if facet_separates(&points, facet, point) {
                match cell.neighbors()[facet] {
                    Some(next) => {
                        current = next;
                        crossed = true;
                        break;
                    }
                    None => return Ok(LocateResult::Outside),
                }
            }
        }

        if !crossed {
            return Ok(LocateResult::InsideCell(current));
        }
    }

    Err(LocateError::CycleDetected {
        steps: MAX_WALK_STEPS,
    })
}

/// Tests every cell until one contains `point`.
///
/// # Errors
///
/// Returns [`LocateError::EmptyTriangulation`] if there are no cells.
pub fn locate_by_scan<U>(tds: &Tds<U>, point: &Point) -> Result<LocateResult, LocateError>
where
    U: DataType,
{
    if tds.number_of_cells() == 0 {
        return Err(LocateError::EmptyTriangulation);
    }
    for key in tds.cell_keys() {
        let Some(points) = tds.cell_points(key) else {
            continue;
        };
        if (0..4).all(|facet| !facet_separates(&points, facet, point)) {
            return Ok(LocateResult::InsideCell(key));
        }
    }
    Ok(LocateResult::Outside)
}

/// Whether the facet opposite `points[facet]` strictly separates `query` from
/// the rest of a positively oriented cell.
fn facet_separates(points: &[Point; 4], facet: usize, query: &Point) -> bool {
    let mut replaced = *points;
    replaced[facet] = *query;
    simplex_orientation(&replaced) == Orientation::NEGATIVE
}

/// All cells whose circumspheres strictly contain `point`, found by BFS from
/// `start_cell`.
///
/// `start_cell` is always part of the result: it is the cell that contains the
/// point, so it has to be replaced even when the point sits on its circumsphere.
///
/// # Errors
///
/// Returns [`ConflictError`] if the start cell or a visited cell cannot be
/// resolved.
pub fn find_conflict_region<U>(
    tds: &Tds<U>,
    point: &Point,
    start_cell: CellKey,
) -> Result<CellKeyBuffer, ConflictError>
where
    U: DataType,
{
    if !tds.contains_cell(start_cell) {
        return Err(ConflictError::InvalidStartCell {
            cell_key: start_cell,
        });
    }

    let mut conflict = CellKeyBuffer::new();
    let mut visited: CellSecondaryMap<()> = CellSecondaryMap::new();
    let mut queue = CellKeyBuffer::new();
    queue.push(start_cell);
    visited.insert(start_cell, ());

    let mut cursor = 0;
    while cursor < queue.len() {
        let key = queue[cursor];
        cursor += 1;

        let points = tds
            .cell_points(key)
            .ok_or(ConflictError::VertexRetrievalFailed { cell_key: key })?;
        if key != start_cell && insphere_positive(&points, point) != InSphere::INSIDE {
            continue;
        }
        conflict.push(key);

        let cell = tds
            .get_cell(key)
            .ok_or(ConflictError::VertexRetrievalFailed { cell_key: key })?;
        for neighbor in cell.neighbors().iter().flatten() {
            if visited.insert(*neighbor, ()).is_none() {
                queue.push(*neighbor);
            }
        }
    }

    Ok(conflict)
}
