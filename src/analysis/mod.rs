//! Analysis modules.
//!
//! Ordering, filtering and counting over fetched race data.

pub mod races;

pub use races::*;
