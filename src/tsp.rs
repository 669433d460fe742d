//! TSP solving policy.
//!
//! Small instances go to the exact bitmask DP; anything above the threshold
//! goes to the nearest-neighbour heuristic, since the exact state space grows
//! as 2^n · n.

use crate::error::Result;
use crate::exact::{HeldKarpSolver, MAX_EXACT_CITIES};
use crate::heuristics::NearestNeighborHeuristic;
use crate::instance::{TspInput, TspInstance};
use crate::solution::TspSolution;

/// Default largest city count solved exactly.
pub const DEFAULT_EXACT_THRESHOLD: usize = 10;

/// A strategy producing a closed tour for a validated instance.
pub trait TourSolver {
    fn solve(&self, instance: &TspInstance) -> Result<TspSolution>;
    fn name(&self) -> &str;
}

/// Chooses between the exact and the approximate solver by instance size.
pub struct TspSolver {
    exact_threshold: usize,
    exact: HeldKarpSolver,
    approximate: NearestNeighborHeuristic,
}

impl TspSolver {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_EXACT_THRESHOLD)
    }

    /// Instances with at most `threshold` cities are solved exactly.
    ///
    /// The threshold is capped at [`MAX_EXACT_CITIES`].
    pub fn with_threshold(threshold: usize) -> Self {
        TspSolver {
            exact_threshold: threshold.min(MAX_EXACT_CITIES),
            exact: HeldKarpSolver::new(),
            approximate: NearestNeighborHeuristic::new(),
        }
    }

    pub fn exact_threshold(&self) -> usize {
        self.exact_threshold
    }

    /// Validate the request body, then solve it.
    pub fn solve(&self, input: &TspInput) -> Result<TspSolution> {
        let instance = TspInstance::new(input)?;
        self.solve_instance(&instance)
    }

    /// Solve an instance that has already been validated.
    pub fn solve_instance(&self, instance: &TspInstance) -> Result<TspSolution> {
        let strategy = self.strategy_for(instance);
        log::debug!(
            "Solving TSP with {} cities using {}",
            instance.dimension(),
            strategy.name()
        );
        strategy.solve(instance)
    }

    fn strategy_for(&self, instance: &TspInstance) -> &dyn TourSolver {
        if instance.dimension() <= self.exact_threshold {
            &self.exact
        } else {
            &self.approximate
        }
    }
}

impl Default for TspSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SolveError, ValidationError};
    use std::collections::BTreeMap;

    fn uniform_input(n: usize, d: f64) -> TspInput {
        let cities: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let distances = cities
            .iter()
            .map(|c| {
                let row = cities
                    .iter()
                    .map(|o| (o.clone(), if c == o { 0.0 } else { d }))
                    .collect();
                (c.clone(), row)
            })
            .collect();
        TspInput::new(cities, distances)
    }

    fn small_input() -> TspInput {
        let json = r#"{
            "cities": ["A", "B", "C"],
            "distances": {
                "A": {"B": 10, "C": 15},
                "B": {"A": 10, "C": 20},
                "C": {"A": 15, "B": 20}
            }
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_small_tsp_is_exact() {
        let sol = TspSolver::new().solve(&small_input()).unwrap();
        assert_eq!(sol.route.len(), 4);
        assert_eq!(sol.route.first(), Some(&"A".to_string()));
        assert_eq!(sol.route.first(), sol.route.last());
        let mut visited = sol.route[..3].to_vec();
        visited.sort();
        assert_eq!(visited, vec!["A", "B", "C"]);
        assert_eq!(sol.algorithm, "HeldKarp");
    }

    #[test]
    fn test_large_tsp_is_approximate() {
        for n in [11, 15, 20] {
            let sol = TspSolver::new().solve(&uniform_input(n, 10.0)).unwrap();
            assert_eq!(sol.route.len(), n + 1);
            assert_eq!(sol.route.first(), sol.route.last());
            assert_eq!(sol.algorithm, "NearestNeighbor");
            assert!((sol.total_distance - 10.0 * n as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_threshold_boundary() {
        let solver = TspSolver::new();
        let at = solver.solve(&uniform_input(10, 1.0)).unwrap();
        assert_eq!(at.algorithm, "HeldKarp");
        let above = solver.solve(&uniform_input(11, 1.0)).unwrap();
        assert_eq!(above.algorithm, "NearestNeighbor");
    }

    #[test]
    fn test_threshold_is_capped() {
        assert_eq!(TspSolver::with_threshold(100).exact_threshold(), MAX_EXACT_CITIES);
        assert_eq!(TspSolver::with_threshold(4).exact_threshold(), 4);
    }

    #[test]
    fn test_invalid_distances() {
        let mut distances = BTreeMap::new();
        distances.insert("A".to_string(), BTreeMap::from([("B".to_string(), 10.0)]));
        let input = TspInput::new(vec!["A".into(), "B".into()], distances);
        let err = TspSolver::new().solve(&input).unwrap_err();
        assert!(matches!(
            err,
            SolveError::Validation(ValidationError::MissingCity(ref c)) if c == "B"
        ));
    }

    #[test]
    fn test_single_city_tsp() {
        let input: TspInput =
            serde_json::from_str(r#"{"cities": ["A"], "distances": {"A": {"A": 0}}}"#).unwrap();
        let sol = TspSolver::new().solve(&input).unwrap();
        assert_eq!(sol.route, vec!["A", "A"]);
        assert_eq!(sol.total_distance, 0.0);
    }

    #[test]
    fn test_asymmetric_distances_tsp() {
        let cases = [
            r#"{"A": {"B": 10, "C": 15}, "B": {"A": 5, "C": 20}, "C": {"A": 15, "B": 10}}"#,
            r#"{"A": {"B": 1, "C": 10}, "B": {"A": 10, "C": 1}, "C": {"A": 1, "B": 10}}"#,
        ];
        for distances in cases {
            let input = TspInput::new(
                vec!["A".into(), "B".into(), "C".into()],
                serde_json::from_str(distances).unwrap(),
            );
            let sol = TspSolver::new().solve(&input).unwrap();
            assert_eq!(sol.route.len(), 4);
            assert_eq!(sol.route.first(), sol.route.last());
        }
    }

    #[test]
    fn test_exact_never_worse_than_heuristic() {
        let input = TspInput::new(
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            serde_json::from_str(
                r#"{"A": {"B": 1, "C": 2, "D": 9},
                    "B": {"A": 1, "C": 9, "D": 2},
                    "C": {"A": 2, "B": 9, "D": 1},
                    "D": {"A": 9, "B": 2, "C": 1}}"#,
            )
            .unwrap(),
        );
        let instance = TspInstance::new(&input).unwrap();
        let exact = HeldKarpSolver::new().solve(&instance).unwrap();
        let approx = NearestNeighborHeuristic::new().solve(&instance).unwrap();
        assert!(exact.total_distance <= approx.total_distance);
        // NN walks A-B-D-C-A = 1 + 2 + 1 + 2 = 6, which is also optimal here
        assert_eq!(exact.total_distance, 6.0);
    }
}
