//! Solution records for both problems.
//!
//! The serialized shape of each record is the response body callers receive
//! and what the result cache stores. Bookkeeping fields (algorithm label,
//! timing) are skipped on the wire.

use crate::instance::{City, TspInstance};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A closed tour over every city of a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspSolution {
    /// The tour as city labels, starting and ending at the start city
    pub route: Vec<City>,
    /// Sum of consecutive edge weights along `route`
    pub total_distance: f64,
    /// Algorithm that generated this solution
    #[serde(skip)]
    pub algorithm: String,
    /// Computation time in seconds
    #[serde(skip)]
    pub computation_time: f64,
}

impl TspSolution {
    pub fn new(route: Vec<City>, total_distance: f64, algorithm: &str) -> Self {
        TspSolution {
            route,
            total_distance,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
        }
    }

    /// Create a solution from a closed index route over `instance`
    pub fn from_tour(instance: &TspInstance, tour: &[usize], algorithm: &str) -> Self {
        TspSolution::new(
            instance.route_names(tour),
            instance.tour_length(tour),
            algorithm,
        )
    }

    /// Check the route starts and ends at the first city of `instance` and
    /// visits every other city exactly once in between.
    pub fn is_complete(&self, instance: &TspInstance) -> bool {
        let cities = instance.cities();
        if self.route.len() != cities.len() + 1 {
            return false;
        }
        if self.route.first() != cities.first() || self.route.last() != cities.first() {
            return false;
        }

        let inner = &self.route[1..self.route.len() - 1];
        let unique: HashSet<&City> = inner.iter().collect();
        unique.len() == inner.len()
            && inner.iter().all(|c| cities[1..].contains(c))
    }
}

/// Equality on the wire fields only
impl PartialEq for TspSolution {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route && self.total_distance == other.total_distance
    }
}

impl std::fmt::Display for TspSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Distance: {:.2}", self.total_distance)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Route: {}", self.route.join(" -> "))
    }
}

/// The chosen subset of a knapsack instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnapsackSolution {
    /// Selected item names in input order
    pub selected_items: Vec<String>,
    pub total_value: f64,
}

impl KnapsackSolution {
    pub fn empty() -> Self {
        KnapsackSolution {
            selected_items: Vec::new(),
            total_value: 0.0,
        }
    }
}

impl std::fmt::Display for KnapsackSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Knapsack solution")?;
        writeln!(f, "  Value: {:.2}", self.total_value)?;
        writeln!(f, "  Items: [{}]", self.selected_items.join(", "))
    }
}
