//! Classification of simplices and edges by their time labels.
//!
//! A tetrahedron between slices `t` and `t + 1` is a (3,1), (2,2) or (1,3)
//! simplex according to how many of its vertices carry the higher label. An
//! edge is spacelike when both endpoints lie on the same slice and timelike
//! otherwise.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cdt::traits::{TimeLabel, TriangulationEngine};
use crate::core::collections::FastHashMap;

/// Type of a foliated tetrahedron.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SimplexType {
    /// Three vertices on the lower slice, one on the upper.
    ThreeOne,
    /// Two vertices on each slice.
    TwoTwo,
    /// One vertex on the lower slice, three on the upper.
    OneThree,
}

impl fmt::Display for SimplexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreeOne => write!(f, "(3,1)"),
            Self::TwoTwo => write!(f, "(2,2)"),
            Self::OneThree => write!(f, "(1,3)"),
        }
    }
}

/// Classifies a cell by how many of its labels equal the maximum.
///
/// Three → (1,3), two → (2,2), anything else → (3,1). A cell whose four
/// labels are equal has four maxima and therefore falls into (3,1); such a
/// cell never survives foliation repair.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::cdt::classification::{SimplexType, classify_simplex};
///
/// assert_eq!(classify_simplex([1, 2, 2, 2]), SimplexType::OneThree);
/// assert_eq!(classify_simplex([2, 1, 2, 1]), SimplexType::TwoTwo);
/// assert_eq!(classify_simplex([1, 1, 2, 1]), SimplexType::ThreeOne);
/// ```
#[must_use]
pub fn classify_simplex(labels: [TimeLabel; 4]) -> SimplexType {
    let max = labels.iter().copied().max().unwrap_or_default();
    match labels.iter().filter(|&&l| l == max).count() {
        3 => SimplexType::OneThree,
        2 => SimplexType::TwoTwo,
        _ => SimplexType::ThreeOne,
    }
}

/// Number of cells of each type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplexCounts {
    /// (3,1) simplices.
    pub three_one: usize,
    /// (2,2) simplices.
    pub two_two: usize,
    /// (1,3) simplices.
    pub one_three: usize,
}

impl SimplexCounts {
    /// Sum over all types.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.three_one + self.two_two + self.one_three
    }
}

/// The finite cells of a triangulation partitioned by [`SimplexType`].
///
/// Tags live in an external map keyed by cell handle. The classification
/// remembers the engine generation it was computed at; any later mutation of
/// the engine makes it stale (see [`is_current`](Self::is_current)).
#[derive(Clone, Debug)]
pub struct SimplexClassification<H> {
    three_one: Vec<H>,
    two_two: Vec<H>,
    one_three: Vec<H>,
    tags: FastHashMap<H, SimplexType>,
    generation: u64,
}

impl<H> SimplexClassification<H>
where
    H: Copy + Eq + Hash,
{
    /// Classifies every finite cell of `engine`.
    ///
    /// Cells whose labels cannot be read are classified as (3,1).
    pub fn classify<E>(engine: &E) -> Self
    where
        E: TriangulationEngine<CellHandle = H>,
    {
        let mut classification = Self {
            three_one: Vec::new(),
            two_two: Vec::new(),
            one_three: Vec::new(),
            tags: FastHashMap::default(),
            generation: engine.generation(),
        };
        classification.fill(engine);
        classification
    }

    /// Discards the current collections and classifies `engine` afresh.
    pub fn reclassify<E>(&mut self, engine: &E)
    where
        E: TriangulationEngine<CellHandle = H>,
    {
        self.three_one.clear();
        self.two_two.clear();
        self.one_three.clear();
        self.tags.clear();
        self.generation = engine.generation();
        self.fill(engine);
    }

    fn fill<E>(&mut self, engine: &E)
    where
        E: TriangulationEngine<CellHandle = H>,
    {
        info!("Classifying simplices....");
        for (cell, _) in engine.cells() {
            let kind = engine
                .cell_labels(cell)
                .map_or(SimplexType::ThreeOne, classify_simplex);
            match kind {
                SimplexType::ThreeOne => self.three_one.push(cell),
                SimplexType::TwoTwo => self.two_two.push(cell),
                SimplexType::OneThree => self.one_three.push(cell),
            }
            self.tags.insert(cell, kind);
        }
        let counts = self.counts();
        info!(
            three_one = counts.three_one,
            two_two = counts.two_two,
            one_three = counts.one_three,
            "There are {} (3,1) simplices and {} (2,2) simplices and {} (1,3) simplices.",
            counts.three_one,
            counts.two_two,
            counts.one_three
        );
    }

    /// Whether the engine has not changed since classification.
    pub fn is_current<E>(&self, engine: &E) -> bool
    where
        E: TriangulationEngine<CellHandle = H>,
    {
        self.generation == engine.generation()
    }

    /// (3,1) cells.
    #[must_use]
    pub fn three_one(&self) -> &[H] {
        &self.three_one
    }

    /// (2,2) cells.
    #[must_use]
    pub fn two_two(&self) -> &[H] {
        &self.two_two
    }

    /// (1,3) cells.
    #[must_use]
    pub fn one_three(&self) -> &[H] {
        &self.one_three
    }

    /// Cells of one type.
    #[must_use]
    pub fn of_type(&self, kind: SimplexType) -> &[H] {
        match kind {
            SimplexType::ThreeOne => &self.three_one,
            SimplexType::TwoTwo => &self.two_two,
            SimplexType::OneThree => &self.one_three,
        }
    }

    /// Type recorded for `cell`, if it was classified.
    #[must_use]
    pub fn tag(&self, cell: H) -> Option<SimplexType> {
        self.tags.get(&cell).copied()
    }

    /// Collection sizes.
    #[must_use]
    pub fn counts(&self) -> SimplexCounts {
        SimplexCounts {
            three_one: self.three_one.len(),
            two_two: self.two_two.len(),
            one_three: self.one_three.len(),
        }
    }

    /// Total number of classified cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// `true` if no cell was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Engine generation the collections were computed at.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Causal character of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Endpoints on different slices.
    Timelike,
    /// Endpoints on the same slice.
    Spacelike,
}

/// Classifies an edge from its endpoint labels.
#[must_use]
pub fn classify_edge(a: TimeLabel, b: TimeLabel) -> EdgeType {
    if a == b {
        EdgeType::Spacelike
    } else {
        EdgeType::Timelike
    }
}

/// Tallies of timelike and spacelike finite edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeClassification {
    /// Edges joining different slices.
    pub timelike: usize,
    /// Edges within one slice.
    pub spacelike: usize,
}

impl EdgeClassification {
    /// Counts the finite edges of `engine` by type.
    ///
    /// An edge with an unreadable endpoint label counts as timelike.
    pub fn classify<E: TriangulationEngine>(engine: &E) -> Self {
        let mut tally = Self::default();
        for (a, b) in engine.edges() {
            match (engine.label(a), engine.label(b)) {
                (Some(la), Some(lb)) if classify_edge(la, lb) == EdgeType::Spacelike => {
                    tally.spacelike += 1;
                }
                _ => tally.timelike += 1,
            }
        }
        info!("N1_SL = {}, N1_TL = {}", tally.spacelike, tally.timelike);
        tally
    }

    /// Total number of edges counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.timelike + self.spacelike
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdt::fake::FakeTriangulation;

    #[test]
    fn simplex_rule_covers_all_max_counts() {
        assert_eq!(classify_simplex([1, 1, 1, 2]), SimplexType::ThreeOne);
        assert_eq!(classify_simplex([1, 1, 2, 2]), SimplexType::TwoTwo);
        assert_eq!(classify_simplex([1, 2, 2, 2]), SimplexType::OneThree);
        assert_eq!(classify_simplex([3, 3, 3, 3]), SimplexType::ThreeOne);
        assert_eq!(SimplexType::TwoTwo.to_string(), "(2,2)");
    }

    #[test]
    fn classification_partitions_the_cells() {
        let labels = [1, 1, 1, 2, 2, 2];
        let fake = FakeTriangulation::from_cells(
            &labels,
            &[[0, 1, 2, 3], [0, 1, 3, 4], [0, 3, 4, 5], [1, 2, 3, 4]],
        );
        let classification = SimplexClassification::classify(&fake);
        assert_eq!(classification.three_one(), &[0]);
        assert_eq!(classification.two_two(), &[1, 3]);
        assert_eq!(classification.one_three(), &[2]);
        assert_eq!(classification.counts().total(), fake.number_of_cells());
        assert_eq!(classification.len(), 4);
        assert_eq!(classification.tag(2), Some(SimplexType::OneThree));
        assert_eq!(classification.tag(99), None);
        assert_eq!(classification.of_type(SimplexType::TwoTwo).len(), 2);
    }

    #[test]
    fn classification_goes_stale_and_refreshes() {
        let labels = [1, 1, 1, 2, 2];
        let mut fake =
            FakeTriangulation::from_cells(&labels, &[[0, 1, 2, 3], [0, 1, 3, 4]]);
        let mut classification = SimplexClassification::classify(&fake);
        assert!(classification.is_current(&fake));

        fake.remove_vertex(4).unwrap();
        assert!(!classification.is_current(&fake));

        classification.reclassify(&fake);
        assert!(classification.is_current(&fake));
        assert_eq!(classification.counts().total(), 1);
        assert_eq!(classification.tag(1), None);
    }

    #[test]
    fn reclassify_without_change_is_idempotent() {
        let labels = [1, 1, 2, 2, 2];
        let fake = FakeTriangulation::from_cells(&labels, &[[0, 1, 2, 3], [0, 2, 3, 4]]);
        let first = SimplexClassification::classify(&fake);
        let mut second = first.clone();
        second.reclassify(&fake);
        assert_eq!(first.three_one(), second.three_one());
        assert_eq!(first.two_two(), second.two_two());
        assert_eq!(first.one_three(), second.one_three());
    }

    #[test]
    fn empty_engine_classifies_to_nothing() {
        let fake = FakeTriangulation::default();
        let classification = SimplexClassification::classify(&fake);
        assert!(classification.is_empty());
        assert_eq!(EdgeClassification::classify(&fake).total(), 0);
    }

    #[test]
    fn edges_are_split_by_slice() {
        let fake = FakeTriangulation::from_cells(&[1, 1, 2, 2], &[[0, 1, 2, 3]]);
        let edges = EdgeClassification::classify(&fake);
        assert_eq!(
            edges,
            EdgeClassification {
                timelike: 4,
                spacelike: 2,
            }
        );
        assert_eq!(edges.total(), fake.number_of_edges());
        assert_eq!(classify_edge(3, 3), EdgeType::Spacelike);
        assert_eq!(classify_edge(3, 4), EdgeType::Timelike);
    }
}
