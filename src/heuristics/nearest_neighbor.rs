use crate::error::Result;
use crate::instance::TspInstance;
use crate::solution::TspSolution;
use crate::tsp::TourSolver;
use ordered_float::OrderedFloat;

/// Nearest Neighbor Heuristic
///
/// Builds a tour by repeatedly moving to the closest unvisited city, then
/// closes it with the edge back to the start city. O(n²), no optimality
/// guarantee.
///
/// Candidates are scanned in instance order and `min_by_key` keeps the first
/// minimum, so ties go to the city listed first.
pub struct NearestNeighborHeuristic;

impl NearestNeighborHeuristic {
    pub fn new() -> Self {
        NearestNeighborHeuristic
    }

    fn find_nearest(&self, instance: &TspInstance, current: usize, visited: &[bool]) -> Option<usize> {
        (0..visited.len())
            .filter(|&city| !visited[city])
            .min_by_key(|&city| OrderedFloat(instance.distance(current, city)))
    }
}

impl Default for NearestNeighborHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl TourSolver for NearestNeighborHeuristic {
    fn solve(&self, instance: &TspInstance) -> Result<TspSolution> {
        let start = std::time::Instant::now();
        let n = instance.dimension();

        let mut visited = vec![false; n];
        visited[0] = true;
        let mut tour = Vec::with_capacity(n + 1);
        tour.push(0);
        let mut total = 0.0;
        let mut current = 0;

        while let Some(next) = self.find_nearest(instance, current, &visited) {
            total += instance.distance(current, next);
            visited[next] = true;
            tour.push(next);
            current = next;
        }

        if n > 1 {
            total += instance.distance(current, 0);
        }
        tour.push(0);

        let mut solution = TspSolution::from_tour(instance, &tour, self.name());
        solution.total_distance = total;
        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }

    fn name(&self) -> &str {
        "NearestNeighbor"
    }
}
