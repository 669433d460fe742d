//! Heuristics module.
//!
//! Approximate tour construction used above the exact solver's size limit.

pub mod nearest_neighbor;

pub use nearest_neighbor::NearestNeighborHeuristic;
