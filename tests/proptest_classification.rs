//! Property-based tests for foliation validation and classification.
//!
//! ## Invariants Tested
//!
//! - **Simplex rule** - the simplex type follows from how many labels equal the maximum
//! - **Partition** - every finite cell lands in exactly one simplex collection
//! - **Edge tallies** - timelike plus spacelike equals the finite edge count
//! - **Validator totals** - valid plus invalid equals the finite cell count
//! - **Bounded repair** - repair never exceeds its pass budget and reports the final check
//! - **Engine validity** - labelled random point sets triangulate validly and locally Delaunay

use causal_dynamical_triangulations::prelude::*;
use proptest::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

/// Finite coordinate in `[-10, 10]`, kept away from zero so shrinking does not
/// collapse inputs onto coordinate planes.
fn coordinate() -> impl Strategy<Value = f64> {
    (-10.0_f64..10.0).prop_filter("must stay away from zero", |x| x.abs() > 1e-6)
}

/// Strategy for a labelled point in the cube `[-10, 10]^3` on one of three slices.
fn labelled_point() -> impl Strategy<Value = (Point, TimeLabel)> {
    (prop::array::uniform3(coordinate()), 1_u32..=3)
        .prop_map(|(coords, label)| (Point::new(coords), label))
}

fn labelled_points(max: usize) -> impl Strategy<Value = Vec<(Point, TimeLabel)>> {
    prop::collection::vec(labelled_point(), 4..max)
}

fn engine_with(points: &[(Point, TimeLabel)]) -> DelaunayTriangulation<TimeLabel> {
    let mut dt = DelaunayTriangulation::with_bounds(Point::default(), 20.0).unwrap();
    TriangulationEngine::insert_batch(&mut dt, points).unwrap();
    dt
}

// =============================================================================
// SIMPLEX RULE
// =============================================================================

proptest! {
    /// A cell between slices `t` and `t + 1` is (3,1), (2,2) or (1,3) by the
    /// number of vertices on `t + 1`.
    #[test]
    fn prop_simplex_type_counts_upper_vertices(
        t in 0_u32..1000,
        upper in prop::array::uniform4(any::<bool>()),
    ) {
        let labels = upper.map(|u| if u { t + 1 } else { t });
        let uppers = upper.iter().filter(|&&u| u).count();
        let expected = match uppers {
            3 => SimplexType::OneThree,
            2 => SimplexType::TwoTwo,
            _ => SimplexType::ThreeOne,
        };
        prop_assert_eq!(classify_simplex(labels), expected);
        prop_assert_eq!(spans_adjacent_slices(labels), (1..4).contains(&uppers));
    }

    /// Permuting a cell's labels never changes its type.
    #[test]
    fn prop_simplex_type_is_order_independent(
        labels in prop::array::uniform4(0_u32..5),
    ) {
        let mut reversed = labels;
        reversed.reverse();
        let mut sorted = labels;
        sorted.sort_unstable();
        prop_assert_eq!(classify_simplex(labels), classify_simplex(reversed));
        prop_assert_eq!(classify_simplex(labels), classify_simplex(sorted));
    }

    /// Edge type depends only on label equality.
    #[test]
    fn prop_edge_type_is_label_equality(a in 0_u32..10, b in 0_u32..10) {
        let expected = if a == b { EdgeType::Spacelike } else { EdgeType::Timelike };
        prop_assert_eq!(classify_edge(a, b), expected);
        prop_assert_eq!(classify_edge(b, a), expected);
    }
}

// =============================================================================
// ENGINE-BACKED PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Random labelled batches triangulate validly.
    #[test]
    fn prop_labelled_batches_are_valid(points in labelled_points(40)) {
        let dt = engine_with(&points);
        prop_assert!(dt.is_valid().is_ok());
        prop_assert!(dt.validate_delaunay().is_ok());
        prop_assert!(dt.number_of_vertices() <= points.len());
    }

    /// Classification partitions the finite cells and edges.
    #[test]
    fn prop_classification_partitions(points in labelled_points(40)) {
        let dt = engine_with(&points);
        let classification = SimplexClassification::classify(&dt);
        prop_assert_eq!(classification.counts().total(), dt.number_of_cells());
        prop_assert_eq!(classification.len(), dt.number_of_cells());
        for (cell, _) in dt.cells() {
            let tag = classification.tag(cell);
            prop_assert!(tag.is_some());
            let labels = dt.cell_labels(cell).unwrap();
            prop_assert_eq!(tag, Some(classify_simplex(labels)));
        }

        let edges = EdgeClassification::classify(&dt);
        prop_assert_eq!(edges.total(), dt.number_of_edges());
    }

    /// The validator inspects every finite cell exactly once.
    #[test]
    fn prop_check_covers_every_cell(points in labelled_points(40)) {
        let dt = engine_with(&points);
        let check = check_timeslices(&dt, false);
        prop_assert_eq!(check.total(), dt.number_of_cells());
        let valid = TriangulationEngine::cells(&dt)
            .filter(|&(cell, _)| dt.cell_labels(cell).is_some_and(spans_adjacent_slices))
            .count();
        prop_assert_eq!(check.valid, valid);
    }

    /// Repair respects its budget and its outcome agrees with a fresh check.
    #[test]
    fn prop_repair_is_bounded(points in labelled_points(30), max_passes in 0_usize..6) {
        let mut dt = engine_with(&points);
        let policy = RetryPolicy::new(max_passes);
        let summary = repair_foliation(&mut dt, &policy, false).unwrap();

        prop_assert!(summary.outcome.passes() <= max_passes);
        let check = check_timeslices(&dt, false);
        prop_assert_eq!(check, summary.check);
        prop_assert_eq!(summary.outcome.is_converged(), check.is_valid());
        prop_assert!(dt.is_valid().is_ok());
    }
}
