//! Exact solvers module.

mod held_karp;

pub use held_karp::{HeldKarpSolver, MAX_EXACT_CITIES};
