//! General helper utilities

pub mod hilbert;
