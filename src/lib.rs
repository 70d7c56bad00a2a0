//! # causal-dynamical-triangulations
//!
//! Construction of foliated (2+1)-dimensional
//! [causal dynamical triangulations](https://en.wikipedia.org/wiki/Causal_dynamical_triangulation)
//! on top of an incremental 3D Delaunay triangulation.
//!
//! A foliated triangulation is built from concentric 2-spheres, one per time
//! slice. Every vertex carries the integer time label of its slice, and a
//! tetrahedron is admissible only if its vertices span exactly two adjacent
//! slices. Admissible tetrahedra come in three kinds, (3,1), (2,2) and (1,3),
//! and edges are either spacelike (within a slice) or timelike (between
//! slices).
//!
//! # Features
//!
//! - 3D Delaunay triangulation with incremental insertion, Hilbert-ordered
//!   batch insertion, and vertex removal
//! - Exact orientation and in-sphere predicates
//! - Foliation validation, bounded repair, and simplex / edge classification
//! - Serialization of reports and configuration with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use causal_dynamical_triangulations::prelude::*;
//!
//! let config = FoliationConfigBuilder::default()
//!     .simplices(64)
//!     .timeslices(4)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! let foliation = FoliationBuilder::new(config).build().unwrap();
//!
//! let report = foliation.report();
//! assert_eq!(report.dimension, 3);
//! assert_eq!(
//!     foliation.classification().counts().total(),
//!     foliation.triangulation().number_of_cells()
//! );
//! println!("{report}");
//! ```
//!
//! The triangulation layer is usable on its own:
//!
//! ```rust
//! use causal_dynamical_triangulations::prelude::*;
//!
//! let vertices = vec![
//!     vertex!([0.0, 0.0, 0.0]),
//!     vertex!([1.0, 0.0, 0.0]),
//!     vertex!([0.0, 1.0, 0.0]),
//!     vertex!([0.0, 0.0, 1.0]),
//! ];
//! let dt = DelaunayTriangulation::new(&vertices).unwrap();
//!
//! assert_eq!(dt.number_of_cells(), 1);
//! assert_eq!(dt.number_of_edges(), 6);
//! assert!(dt.is_valid().is_ok());
//! ```
//!
//! # Logging
//!
//! The crate logs through [`tracing`](https://docs.rs/tracing): pipeline
//! milestones at `info`, verbose per-cell diagnostics at `debug`, and repair
//! exhaustion or triangulation rebuilds at `warn`. Install any subscriber to
//! see them.

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

/// Triangulation data structures and the algorithms that maintain them.
///
/// [`Tds`](core::triangulation_data_structure::Tds) stores vertices and
/// cells with neighbor adjacency;
/// [`DelaunayTriangulation`](core::delaunay_triangulation::DelaunayTriangulation)
/// keeps it Delaunay under insertion and removal.
pub mod core {
    /// Triangulation algorithms for construction and maintenance
    pub mod algorithms {
        /// Incremental cavity-based insertion
        pub mod incremental_insertion;
        /// Point location algorithms (facet walking)
        pub mod locate;
        /// Vertex removal by re-triangulating the link
        pub mod removal;
    }
    pub mod cell;
    /// Collection aliases used throughout the engine
    pub mod collections;
    pub mod delaunay_triangulation;
    pub mod edge;
    pub mod facet;
    pub mod triangulation_data_structure;
    pub mod util;
    pub mod vertex;
    /// Traits for vertex payloads.
    pub mod traits {
        pub mod data_type;
        pub use data_type::*;
    }
    pub use cell::*;
    pub use delaunay_triangulation::*;
    pub use edge::*;
    pub use facet::*;
    pub use traits::*;
    pub use triangulation_data_structure::*;
    pub use vertex::*;
}

/// Points, exact predicates, and point-set utilities.
pub mod geometry {
    pub mod point;
    pub mod predicates;
    /// Sphere sampling and bounding volumes
    pub mod util;
    pub use point::*;
    pub use predicates::*;
    pub use util::*;
}

/// Foliated triangulations: time-sliced construction, repair, and
/// classification.
pub mod cdt {
    pub mod builder;
    pub mod classification;
    #[cfg(test)]
    pub(crate) mod fake;
    pub mod foliation;
    pub mod sphere;
    pub mod traits;
    pub use builder::*;
    pub use classification::*;
    pub use foliation::*;
    pub use sphere::*;
    pub use traits::*;
}

/// A prelude module that re-exports commonly used types and macros.
pub mod prelude {
    pub use crate::cdt::{
        builder::*, classification::*, foliation::*, sphere::*, traits::*,
    };
    pub use crate::core::{
        cell::*, delaunay_triangulation::*, edge::*, traits::data_type::*,
        triangulation_data_structure::*, vertex::*,
    };
    pub use crate::core::collections::{FastHashMap, FastHashSet};
    pub use crate::geometry::{point::*, predicates::*, util::*};

    pub use crate::vertex;
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}
