//! Payload bounds for data attached to vertices.

use serde::{Serialize, de::DeserializeOwned};
use std::{fmt::Debug, hash::Hash};

/// Trait alias for payloads that can be stored on vertices.
///
/// Payloads are `Copy` so they can be read out of the storage map without
/// borrowing it. The foliation layer stores a [`TimeLabel`](crate::cdt::TimeLabel)
/// here; engine-internal triangulations store the key of the vertex they mirror.
///
/// ```rust
/// use causal_dynamical_triangulations::core::traits::DataType;
///
/// fn takes_payload<T: DataType>(_data: T) {}
/// takes_payload(3_u32);
/// takes_payload(());
/// ```
pub trait DataType:
    Copy + Eq + Hash + Ord + PartialEq + PartialOrd + Debug + Serialize + DeserializeOwned
{
}

impl<T> DataType for T where
    T: Copy + Eq + Hash + Ord + PartialEq + PartialOrd + Debug + Serialize + DeserializeOwned
{
}
