use crate::error::{Result, SolveError};
use crate::instance::TspInstance;
use crate::solution::TspSolution;
use crate::tsp::TourSolver;

/// Largest instance the bitmask table is allowed to cover.
pub const MAX_EXACT_CITIES: usize = 16;

/// Held-Karp bitmask dynamic program.
///
/// `cost[mask][c]` is the cheapest way to finish the tour from city `c` when
/// the cities in `mask` are already visited: visit every remaining city and
/// return to city 0. The table is filled bottom-up from the full mask down,
/// so every state is computed exactly once.
///
/// Every reachable mask contains city 0, so masks are stored shifted right by
/// one bit, halving the table.
///
/// Ties between equal-cost continuations go to the lowest next-city index.
pub struct HeldKarpSolver;

impl HeldKarpSolver {
    pub fn new() -> Self {
        HeldKarpSolver
    }

    fn check_size(&self, n: usize) -> Result<()> {
        if n > MAX_EXACT_CITIES {
            return Err(SolveError::internal(format!(
                "exact solver called with {} cities, limit is {}",
                n, MAX_EXACT_CITIES
            )));
        }
        Ok(())
    }
}

impl Default for HeldKarpSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Filled DP tables for one instance.
struct Tables {
    n: usize,
    cost: Vec<f64>,
    next: Vec<u8>,
}

impl Tables {
    #[inline]
    fn slot(&self, mask: usize, city: usize) -> usize {
        (mask >> 1) * self.n + city
    }

    fn fill(instance: &TspInstance) -> Result<Self> {
        let n = instance.dimension();
        let matrix = instance.matrix();
        let states = 1usize << (n - 1);
        let full = (1usize << n) - 1;

        let mut tables = Tables {
            n,
            cost: vec![f64::INFINITY; states * n],
            next: vec![u8::MAX; states * n],
        };

        for cur in 0..n {
            let back = matrix
                .try_get(cur, 0)
                .ok_or_else(|| SolveError::internal(format!("no edge {} -> 0", cur)))?;
            let slot = tables.slot(full, cur);
            tables.cost[slot] = back;
        }

        // Masks with bit 0 set, from full - 2 down to 1.
        for shifted in (0..states - 1).rev() {
            let mask = (shifted << 1) | 1;
            for cur in (0..n).filter(|&c| mask & (1 << c) != 0) {
                let mut best = f64::INFINITY;
                let mut best_next = u8::MAX;

                for nxt in (0..n).filter(|&c| mask & (1 << c) == 0) {
                    let edge = matrix.try_get(cur, nxt).ok_or_else(|| {
                        SolveError::internal(format!("no edge {} -> {}", cur, nxt))
                    })?;
                    let candidate = edge + tables.cost[tables.slot(mask | (1 << nxt), nxt)];
                    if candidate < best {
                        best = candidate;
                        best_next = nxt as u8;
                    }
                }

                let slot = tables.slot(mask, cur);
                tables.cost[slot] = best;
                tables.next[slot] = best_next;
            }
        }

        Ok(tables)
    }

    /// Follow the recorded choices from the start state.
    fn walk(&self) -> Result<Vec<usize>> {
        let full = (1usize << self.n) - 1;
        let mut tour = Vec::with_capacity(self.n + 1);
        let mut mask = 1usize;
        let mut cur = 0usize;
        tour.push(cur);

        while mask != full {
            let nxt = self.next[self.slot(mask, cur)];
            if nxt == u8::MAX {
                return Err(SolveError::internal(format!(
                    "no continuation recorded for state ({:#b}, {})",
                    mask, cur
                )));
            }
            cur = nxt as usize;
            mask |= 1 << cur;
            tour.push(cur);
        }

        tour.push(0);
        Ok(tour)
    }
}

impl TourSolver for HeldKarpSolver {
    fn solve(&self, instance: &TspInstance) -> Result<TspSolution> {
        let start = std::time::Instant::now();
        let n = instance.dimension();
        self.check_size(n)?;

        if n <= 1 {
            let mut solution = TspSolution::from_tour(instance, &[0, 0], self.name());
            solution.total_distance = 0.0;
            solution.computation_time = start.elapsed().as_secs_f64();
            return Ok(solution);
        }

        let tables = Tables::fill(instance)?;
        let tour = tables.walk()?;

        let mut solution = TspSolution::from_tour(instance, &tour, self.name());
        // Report the DP value itself; it sums the edges in the same order the
        // recurrence does.
        solution.total_distance = tables.cost[tables.slot(1, 0)];
        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }

    fn name(&self) -> &str {
        "HeldKarp"
    }
}
