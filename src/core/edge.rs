//! Canonical edge identifiers.
//!
//! Edges are not stored explicitly; they are inferred from cells. An
//! [`EdgeKey`] identifies an edge by its two endpoint [`VertexKey`]s with the
//! endpoints reordered so that `(a, b)` and `(b, a)` map to the same edge.
//!
//! `EdgeKey` ordering follows internal slotmap key order and is not stable
//! across processes.

use crate::core::triangulation_data_structure::VertexKey;

/// Canonical identifier for an (undirected) edge.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::core::edge::EdgeKey;
/// use causal_dynamical_triangulations::core::triangulation_data_structure::VertexKey;
/// use slotmap::KeyData;
///
/// let a = VertexKey::from(KeyData::from_ffi(1));
/// let b = VertexKey::from(KeyData::from_ffi(2));
/// assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    v0: VertexKey,
    v1: VertexKey,
}

impl EdgeKey {
    /// Creates a new canonical edge key with `v0 <= v1`.
    #[must_use]
    pub fn new(a: VertexKey, b: VertexKey) -> Self {
        if a <= b {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// Returns the first (canonical) endpoint.
    #[inline]
    #[must_use]
    pub const fn v0(self) -> VertexKey {
        self.v0
    }

    /// Returns the second (canonical) endpoint.
    #[inline]
    #[must_use]
    pub const fn v1(self) -> VertexKey {
        self.v1
    }

    /// Returns the two endpoints as a tuple.
    #[inline]
    #[must_use]
    pub const fn endpoints(self) -> (VertexKey, VertexKey) {
        (self.v0, self.v1)
    }

    /// Whether `vertex` is an endpoint of this edge.
    #[inline]
    #[must_use]
    pub fn contains(self, vertex: VertexKey) -> bool {
        self.v0 == vertex || self.v1 == vertex
    }
}

impl From<(VertexKey, VertexKey)> for EdgeKey {
    #[inline]
    fn from((a, b): (VertexKey, VertexKey)) -> Self {
        Self::new(a, b)
    }
}
