//! TSP / Knapsack Solver Library
//!
//! Two classic combinatorial optimization solvers behind a memoizing front.
//!
//! # Features
//!
//! - Exact TSP via Held-Karp bitmask dynamic programming
//! - Nearest Neighbor TSP heuristic for instances above the exact threshold
//! - 0/1 Knapsack via tabular dynamic programming
//! - Content-addressed result cache with per-entry expiry
//! - Benchmarking of exact against approximate tours
//!
//! # Example
//!
//! ```
//! use tsp_knapsack_solver::cache::MemoryCache;
//! use tsp_knapsack_solver::config::SolverConfig;
//! use tsp_knapsack_solver::instance::{Item, KnapsackInput};
//! use tsp_knapsack_solver::service::CachedSolver;
//!
//! let cache = MemoryCache::new();
//! let solver = CachedSolver::new(&cache, SolverConfig::default());
//!
//! let input = KnapsackInput::new(5.0, vec![
//!     Item::new("Item1", 2.0, 3.0),
//!     Item::new("Item2", 3.0, 4.0),
//!     Item::new("Item3", 4.0, 5.0),
//! ]);
//! let solution = solver.solve_knapsack(&input).unwrap();
//! assert_eq!(solution.total_value, 7.0);
//! assert_eq!(solution.selected_items, vec!["Item1", "Item2"]);
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod exact;
pub mod heuristics;
pub mod tsp;
pub mod knapsack;
pub mod cache;
pub mod config;
pub mod service;
pub mod benchmark;

pub use error::{SolveError, ValidationError};
pub use instance::{KnapsackInput, TspInput};
pub use knapsack::KnapsackSolver;
pub use solution::{KnapsackSolution, TspSolution};
pub use tsp::TspSolver;
