//! Collection aliases tuned for triangulation bookkeeping.
//!
//! Centralizing these aliases keeps the storage backend and hashing strategy a
//! one-line change for the whole engine.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SecondaryMap;
use smallvec::SmallVec;

#[cfg(not(feature = "dense-slotmap"))]
use slotmap::SlotMap;

#[cfg(feature = "dense-slotmap")]
use slotmap::DenseSlotMap;

use crate::core::triangulation_data_structure::{CellKey, VertexKey};

/// Index of a facet within a cell (the index of the opposite vertex, `0..=3`).
pub type FacetIndex = u8;

/// Internal storage backend for vertices and cells.
///
/// `DenseSlotMap` (the default, via the `dense-slotmap` feature) iterates over a
/// packed array; `SlotMap` is selected with `--no-default-features`.
#[cfg(not(feature = "dense-slotmap"))]
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Internal storage backend for vertices and cells.
///
/// `DenseSlotMap` (the default, via the `dense-slotmap` feature) iterates over a
/// packed array; `SlotMap` is selected with `--no-default-features`.
#[cfg(feature = "dense-slotmap")]
pub type StorageMap<K, V> = DenseSlotMap<K, V>;

/// Fast non-cryptographic `HashMap` for internal keys.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// assert_eq!(map.get(&123), Some(&456));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast non-cryptographic `HashSet` for internal keys.
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized `Vec` that stays on the stack for up to `N` elements.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Buffer of cell keys sized for a typical conflict region.
pub type CellKeyBuffer = SmallBuffer<CellKey, 32>;

/// Set of cell keys.
pub type CellKeySet = FastHashSet<CellKey>;

/// Set of vertex keys.
pub type VertexKeySet = FastHashSet<VertexKey>;

/// Per-cell side table keyed by [`CellKey`].
pub type CellSecondaryMap<V> = SecondaryMap<CellKey, V>;

/// Canonical (sorted) vertex triple identifying a triangular facet.
pub type FacetVertices = [VertexKey; 3];

/// Sorts a facet's vertex keys into canonical order.
#[inline]
#[must_use]
pub fn canonical_facet(mut facet: FacetVertices) -> FacetVertices {
    facet.sort_unstable();
    facet
}
